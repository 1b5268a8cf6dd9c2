//! End-to-end pipeline tests: producer → feed → consumer, including
//! completion, upstream-error forwarding, and shutdown.

use std::time::Duration;

use driftfeed::feed::DriftFeedBuilder;
use driftfeed::model::{DriftEvent, Mmsi, NavigationalStatus, PositionReport};
use driftfeed::{DriftConfig, QueueBacking};

fn drifting(mmsi: u64, time_ms: i64) -> PositionReport {
    PositionReport {
        mmsi: Mmsi(mmsi),
        time_ms,
        lat: -35.0,
        lon: 151.0,
        course_over_ground_deg: Some(90.0),
        heading_deg: Some(0.0),
        speed_over_ground_knots: Some(5.0),
        navigational_status: None,
    }
}

#[tokio::test]
async fn two_vessels_in_sequence() {
    let (mut feed, reports) = DriftFeedBuilder::new().build().unwrap();

    let producer = tokio::spawn(async move {
        // First vessel drifts for a minute.
        for i in 0..6 {
            reports.send(drifting(123456789, i * 10_000)).await.unwrap();
        }
        // Second vessel takes over the stream: one report only.
        reports.send(drifting(987654321, 60_000)).await.unwrap();
    });

    let mut candidates = Vec::new();
    while let Some(event) = feed.next_event().await {
        match event {
            DriftEvent::Candidate(c) => candidates.push(c),
            other => panic!("unexpected event: {other:?}"),
        }
    }
    producer.await.unwrap();

    // Only the first vessel emits; its successor never fills a window.
    assert_eq!(candidates.len(), 6);
    assert!(candidates.iter().all(|c| c.report.mmsi == Mmsi(123456789)));
    assert!(candidates.iter().all(|c| c.drifting_since_ms == 0));
}

#[tokio::test]
async fn moored_vessel_stays_silent_under_pressure() {
    // Small channels to exercise backpressure on the producer side.
    let (mut feed, reports) = DriftFeedBuilder::new()
        .report_channel_capacity(4)
        .event_channel_capacity(4)
        .build()
        .unwrap();

    let producer = tokio::spawn(async move {
        for i in 0..200 {
            let mut r = drifting(123456789, i * 10_000);
            r.navigational_status = Some(NavigationalStatus::Moored);
            reports.send(r).await.unwrap();
        }
    });

    assert!(feed.next_event().await.is_none());
    producer.await.unwrap();

    let snap = feed.metrics().snapshot();
    assert_eq!(snap.reports_received, 200);
    assert_eq!(snap.candidates_emitted, 0);
}

#[tokio::test]
async fn upstream_error_passes_through_after_candidates() {
    let (mut feed, reports) = DriftFeedBuilder::new().build().unwrap();

    for i in 0..3 {
        reports.send(drifting(123456789, i * 10_000)).await.unwrap();
    }
    reports.fail("antenna feed dropped").await.unwrap();

    let mut candidates = 0;
    let mut error = None;
    while let Some(event) = feed.next_event().await {
        match event {
            DriftEvent::Candidate(_) => candidates += 1,
            DriftEvent::UpstreamError(e) => error = Some(e),
        }
    }

    assert_eq!(candidates, 3);
    let error = error.expect("error should be forwarded");
    assert_eq!(error.message, "antenna feed dropped");
}

#[tokio::test]
async fn shutdown_mid_stream() {
    let (mut feed, reports) = DriftFeedBuilder::new().build().unwrap();
    reports.send(drifting(123456789, 0)).await.unwrap();

    feed.shutdown();

    let drained = tokio::time::timeout(Duration::from_secs(2), async {
        while feed.next_event().await.is_some() {}
    })
    .await;
    assert!(drained.is_ok(), "feed did not close after shutdown");

    // Producer eventually observes the closed channel.
    let closed = tokio::time::timeout(Duration::from_secs(2), async {
        loop {
            if reports.send(drifting(123456789, 10_000)).await.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(closed.is_ok());
}

#[tokio::test]
async fn fixed_capacity_backing_runs_the_same_pipeline() {
    let config = DriftConfig {
        queue_backing: QueueBacking::FixedCapacity,
        ..DriftConfig::default()
    };
    let (mut feed, reports) = DriftFeedBuilder::new().config(config).build().unwrap();

    for i in 0..6 {
        reports.send(drifting(123456789, i * 10_000)).await.unwrap();
    }
    drop(reports);

    let mut candidates = 0;
    while let Some(event) = feed.next_event().await {
        if let DriftEvent::Candidate(_) = event {
            candidates += 1;
        }
    }
    assert_eq!(candidates, 6);
}
