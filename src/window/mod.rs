//! Per-vessel window buffer: entries plus the FIFO store backing them.
//!
//! Two interchangeable backings sit behind one contract: a growable deque
//! (memory-friendly, capacity enforced externally by the engine's reset rule)
//! and a pre-sized ring buffer (allocation-free in steady state). The choice
//! is fixed at construction via [`QueueBacking`].

pub mod ring;

use std::collections::VecDeque;

use crate::config::QueueBacking;
use crate::model::PositionReport;

use ring::RingBuffer;

// ---------------------------------------------------------------------------
// WindowEntry
// ---------------------------------------------------------------------------

/// One buffered report plus its derived flags.
#[derive(Debug, Clone)]
pub struct WindowEntry {
    pub report: PositionReport,
    /// Classified once on acceptance; immutable afterwards.
    pub is_candidate: bool,
    /// Set true exactly once, when the entry is surfaced downstream.
    pub emitted: bool,
}

impl WindowEntry {
    pub fn new(report: PositionReport, is_candidate: bool) -> Self {
        Self {
            report,
            is_candidate,
            emitted: false,
        }
    }

    pub fn time_ms(&self) -> i64 {
        self.report.time_ms
    }
}

// ---------------------------------------------------------------------------
// WindowQueue
// ---------------------------------------------------------------------------

/// FIFO store of [`WindowEntry`] values, oldest first.
#[derive(Debug)]
pub enum WindowQueue {
    Growable(VecDeque<WindowEntry>),
    Fixed(RingBuffer<WindowEntry>),
}

impl WindowQueue {
    /// Create an empty queue. `capacity` bounds the fixed backing and
    /// pre-sizes the growable one.
    pub fn new(backing: QueueBacking, capacity: usize) -> Self {
        match backing {
            QueueBacking::Growable => Self::Growable(VecDeque::with_capacity(capacity.min(16))),
            QueueBacking::FixedCapacity => Self::Fixed(RingBuffer::with_capacity(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Growable(q) => q.len(),
            Self::Fixed(q) => q.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append the newest entry.
    pub fn push_back(&mut self, entry: WindowEntry) {
        match self {
            Self::Growable(q) => q.push_back(entry),
            Self::Fixed(q) => q.push_back(entry),
        }
    }

    /// Remove and return the oldest entry.
    pub fn pop_front(&mut self) -> Option<WindowEntry> {
        match self {
            Self::Growable(q) => q.pop_front(),
            Self::Fixed(q) => q.pop_front(),
        }
    }

    /// The newest entry, if any.
    pub fn back(&self) -> Option<&WindowEntry> {
        match self {
            Self::Growable(q) => q.back(),
            Self::Fixed(q) => q.back(),
        }
    }

    pub fn clear(&mut self) {
        match self {
            Self::Growable(q) => q.clear(),
            Self::Fixed(q) => q.clear(),
        }
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> WindowIter<'_> {
        match self {
            Self::Growable(q) => WindowIter::Growable(q.iter()),
            Self::Fixed(q) => WindowIter::Fixed(Box::new(q.iter())),
        }
    }

    /// Re-append retained entries in order after a trim pass.
    pub fn extend(&mut self, entries: impl IntoIterator<Item = WindowEntry>) {
        for entry in entries {
            self.push_back(entry);
        }
    }
}

/// Iterator over a [`WindowQueue`], oldest to newest.
pub enum WindowIter<'a> {
    Growable(std::collections::vec_deque::Iter<'a, WindowEntry>),
    Fixed(Box<dyn Iterator<Item = &'a WindowEntry> + 'a>),
}

impl<'a> Iterator for WindowIter<'a> {
    type Item = &'a WindowEntry;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Growable(it) => it.next(),
            Self::Fixed(it) => it.next(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mmsi;

    fn entry(time_ms: i64, is_candidate: bool) -> WindowEntry {
        WindowEntry::new(
            PositionReport {
                mmsi: Mmsi(123456789),
                time_ms,
                lat: 0.0,
                lon: 0.0,
                course_over_ground_deg: Some(90.0),
                heading_deg: Some(0.0),
                speed_over_ground_knots: Some(5.0),
                navigational_status: None,
            },
            is_candidate,
        )
    }

    fn both_backings(capacity: usize) -> [WindowQueue; 2] {
        [
            WindowQueue::new(QueueBacking::Growable, capacity),
            WindowQueue::new(QueueBacking::FixedCapacity, capacity),
        ]
    }

    #[test]
    fn fifo_contract_identical_across_backings() {
        for mut q in both_backings(8) {
            q.push_back(entry(0, true));
            q.push_back(entry(10, false));
            q.push_back(entry(20, true));

            assert_eq!(q.len(), 3);
            assert_eq!(q.back().map(WindowEntry::time_ms), Some(20));
            let times: Vec<i64> = q.iter().map(WindowEntry::time_ms).collect();
            assert_eq!(times, vec![0, 10, 20]);

            assert_eq!(q.pop_front().map(|e| e.time_ms()), Some(0));
            assert_eq!(q.pop_front().map(|e| e.time_ms()), Some(10));
            assert_eq!(q.len(), 1);
        }
    }

    #[test]
    fn clear_then_reuse() {
        for mut q in both_backings(4) {
            q.push_back(entry(0, true));
            q.push_back(entry(10, true));
            q.clear();
            assert!(q.is_empty());
            assert!(q.back().is_none());

            q.push_back(entry(20, false));
            assert_eq!(q.back().map(WindowEntry::time_ms), Some(20));
        }
    }

    #[test]
    fn bulk_reappend_preserves_order() {
        for mut q in both_backings(8) {
            let retained = vec![entry(5, true), entry(15, false), entry(25, true)];
            q.extend(retained);
            let times: Vec<i64> = q.iter().map(WindowEntry::time_ms).collect();
            assert_eq!(times, vec![5, 15, 25]);
        }
    }

    #[test]
    fn new_entry_starts_unemitted() {
        let e = entry(0, true);
        assert!(e.is_candidate);
        assert!(!e.emitted);
    }
}
