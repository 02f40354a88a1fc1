use std::collections::{HashSet, VecDeque};
use tracing::warn;

pub const DEFAULT_MAX_STORED: usize = 100;

pub trait SubmissionTracking {
    fn is_duplicate(&self, submission_id: &str) -> bool;
    fn start_processing(&mut self, submission_id: &str);
    fn cancel_processing(&mut self, submission_id: &str);
    fn complete_processing(&mut self, submission_id: &str);
    fn processing_count(&self) -> usize;
    fn processed_count(&self) -> usize;
}

/// Remembers which submissions are in flight and which have already been handled.
///
/// Completed ids are kept in insertion order and the oldest one is dropped once
/// more than `max_stored` have been recorded. Lookups never refresh an entry.
#[derive(Debug)]
pub struct SubmissionTracker {
    processing: HashSet<String>,
    processed: HashSet<String>,
    processed_order: VecDeque<String>,
    max_stored: usize,
}

impl SubmissionTracker {
    /// A capacity of zero is clamped to one.
    pub fn new(max_stored: usize) -> Self {
        let max_stored = if max_stored == 0 {
            warn!("max_stored must be positive, clamping to 1");
            1
        } else {
            max_stored
        };

        SubmissionTracker {
            processing: HashSet::new(),
            processed: HashSet::with_capacity(max_stored + 1),
            processed_order: VecDeque::with_capacity(max_stored + 1),
            max_stored,
        }
    }

    pub fn max_stored(&self) -> usize {
        self.max_stored
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest) = self.processed_order.pop_front() {
            self.processed.remove(&oldest);
        }
    }
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_STORED)
    }
}

impl SubmissionTracking for SubmissionTracker {
    fn is_duplicate(&self, submission_id: &str) -> bool {
        self.processing.contains(submission_id) || self.processed.contains(submission_id)
    }

    fn start_processing(&mut self, submission_id: &str) {
        self.processing.insert(submission_id.to_string());
    }

    fn cancel_processing(&mut self, submission_id: &str) {
        self.processing.remove(submission_id);
    }

    fn complete_processing(&mut self, submission_id: &str) {
        self.processing.remove(submission_id);

        if !self.processed.insert(submission_id.to_string()) {
            return;
        }
        self.processed_order.push_back(submission_id.to_string());

        // At most one entry was added, so at most one has to go.
        if self.processed.len() > self.max_stored {
            self.evict_oldest();
        }
    }

    fn processing_count(&self) -> usize {
        self.processing.len()
    }

    fn processed_count(&self) -> usize {
        self.processed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(tracker: &mut SubmissionTracker, id: &str) {
        tracker.start_processing(id);
        tracker.complete_processing(id);
    }

    #[test]
    fn test_unknown_ids_are_not_duplicates() {
        let tracker = SubmissionTracker::new(3);
        assert!(!tracker.is_duplicate("123"));
        assert!(!tracker.is_duplicate("456"));
    }

    #[test]
    fn test_processing_id_is_duplicate() {
        let mut tracker = SubmissionTracker::new(3);
        tracker.start_processing("123");
        assert!(tracker.is_duplicate("123"));
    }

    #[test]
    fn test_processed_id_is_duplicate() {
        let mut tracker = SubmissionTracker::new(3);
        complete(&mut tracker, "123");
        assert!(tracker.is_duplicate("123"));
    }

    #[test]
    fn test_cancel_releases_id() {
        let mut tracker = SubmissionTracker::new(3);
        tracker.start_processing("123");
        tracker.cancel_processing("123");
        assert!(!tracker.is_duplicate("123"));
        assert_eq!(tracker.processing_count(), 0);
    }

    #[test]
    fn test_cancel_does_not_touch_processed() {
        let mut tracker = SubmissionTracker::new(3);
        complete(&mut tracker, "123");
        tracker.cancel_processing("123");
        tracker.cancel_processing("never-seen");
        assert!(tracker.is_duplicate("123"));
        assert_eq!(tracker.processed_count(), 1);
    }

    #[test]
    fn test_processing_lifecycle_counts() {
        let mut tracker = SubmissionTracker::new(3);
        assert_eq!(tracker.processing_count(), 0);

        tracker.start_processing("123");
        assert_eq!(tracker.processing_count(), 1);

        tracker.complete_processing("123");
        assert_eq!(tracker.processing_count(), 0);
        assert_eq!(tracker.processed_count(), 1);
    }

    #[test]
    fn test_start_processing_is_idempotent() {
        let mut tracker = SubmissionTracker::new(3);
        tracker.start_processing("123");
        tracker.start_processing("123");
        assert_eq!(tracker.processing_count(), 1);
    }

    #[test]
    fn test_multiple_in_flight() {
        let mut tracker = SubmissionTracker::new(3);
        tracker.start_processing("123");
        tracker.start_processing("456");
        tracker.start_processing("789");

        assert_eq!(tracker.processing_count(), 3);
        assert!(tracker.is_duplicate("123"));
        assert!(tracker.is_duplicate("456"));
        assert!(tracker.is_duplicate("789"));

        tracker.complete_processing("456");
        assert_eq!(tracker.processing_count(), 2);
        assert_eq!(tracker.processed_count(), 1);
    }

    #[test]
    fn test_evicts_oldest_when_over_capacity() {
        let mut tracker = SubmissionTracker::new(3);
        complete(&mut tracker, "1");
        complete(&mut tracker, "2");
        complete(&mut tracker, "3");

        assert_eq!(tracker.processed_count(), 3);
        assert!(tracker.is_duplicate("1"));

        complete(&mut tracker, "4");

        assert_eq!(tracker.processed_count(), 3);
        assert!(!tracker.is_duplicate("1"));
        assert!(tracker.is_duplicate("2"));
        assert!(tracker.is_duplicate("3"));
        assert!(tracker.is_duplicate("4"));
    }

    #[test]
    fn test_lookups_do_not_refresh_eviction_order() {
        let mut tracker = SubmissionTracker::new(2);
        complete(&mut tracker, "a");
        complete(&mut tracker, "b");
        assert!(tracker.is_duplicate("a"));

        complete(&mut tracker, "c");
        assert!(!tracker.is_duplicate("a"));
        assert!(tracker.is_duplicate("b"));
    }

    #[test]
    fn test_recompleting_does_not_reorder() {
        let mut tracker = SubmissionTracker::new(2);
        complete(&mut tracker, "a");
        complete(&mut tracker, "b");

        tracker.complete_processing("a");
        assert_eq!(tracker.processed_count(), 2);

        complete(&mut tracker, "c");
        assert!(!tracker.is_duplicate("a"));
        assert!(tracker.is_duplicate("b"));
        assert!(tracker.is_duplicate("c"));
    }

    #[test]
    fn test_capacity_holds_under_bursts() {
        let mut tracker = SubmissionTracker::new(5);
        for i in 0..50 {
            tracker.complete_processing(&i.to_string());
            assert!(tracker.processed_count() <= 5);
        }
        for i in 0..45 {
            assert!(!tracker.is_duplicate(&i.to_string()));
        }
        for i in 45..50 {
            assert!(tracker.is_duplicate(&i.to_string()));
        }
    }

    #[test]
    fn test_start_on_processed_id_lands_in_both_sets() {
        let mut tracker = SubmissionTracker::new(3);
        complete(&mut tracker, "123");
        tracker.start_processing("123");

        assert_eq!(tracker.processing_count(), 1);
        assert_eq!(tracker.processed_count(), 1);

        tracker.cancel_processing("123");
        assert!(tracker.is_duplicate("123"));
    }

    #[test]
    fn test_zero_capacity_clamped_to_one() {
        let mut tracker = SubmissionTracker::new(0);
        assert_eq!(tracker.max_stored(), 1);

        complete(&mut tracker, "1");
        complete(&mut tracker, "2");
        assert_eq!(tracker.processed_count(), 1);
        assert!(!tracker.is_duplicate("1"));
        assert!(tracker.is_duplicate("2"));
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(SubmissionTracker::default().max_stored(), DEFAULT_MAX_STORED);
    }
}
