use serde::Serialize;
use std::collections::BTreeSet;

/// Unique-segment view of how much of the timeline has been watched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageState {
    pub visited_segments: BTreeSet<u64>,
    pub total_segments: Option<u64>,
    pub duration_secs: Option<f64>,
}

impl CoverageState {
    pub fn percent(&self) -> f64 {
        match self.total_segments {
            Some(total) if total > 0 => {
                let visited = self.visited_segments.len() as f64;
                (visited * 100.0 / total as f64).min(100.0)
            }
            _ => 0.0,
        }
    }
}

/// Buckets playback positions into fixed-width segments and reports the share
/// of distinct segments seen. Jumping between a handful of points only credits
/// the segments actually landed on.
#[derive(Debug, Clone)]
pub struct CoverageTracker {
    segment_length_secs: f64,
    state: CoverageState,
}

impl CoverageTracker {
    pub fn new(segment_length_secs: f64) -> Self {
        Self {
            segment_length_secs,
            state: CoverageState::default(),
        }
    }

    /// Fixes the segment count from the first usable duration. Returns true
    /// only on the call that actually captured it.
    pub fn capture_duration(&mut self, duration: f64) -> bool {
        if self.state.total_segments.is_some() || !is_usable_duration(duration) {
            return false;
        }
        let total = (duration / self.segment_length_secs).ceil() as u64;
        self.state.total_segments = Some(total.max(1));
        self.state.duration_secs = Some(duration);
        true
    }

    /// Records one playback sample and returns the coverage percentage.
    ///
    /// Only positions on the captured timeline count. A sample exactly at the
    /// end credits the last segment; anything past it is ignored.
    pub fn observe(&mut self, current_time: f64, duration: f64) -> f64 {
        if !is_usable_duration(duration) {
            return self.percent();
        }
        self.capture_duration(duration);

        let (Some(total), Some(captured)) = (self.state.total_segments, self.state.duration_secs)
        else {
            return self.percent();
        };
        if !current_time.is_finite() || current_time < 0.0 || current_time > captured {
            return self.percent();
        }

        let index = ((current_time / self.segment_length_secs).floor() as u64).min(total - 1);
        self.state.visited_segments.insert(index);
        self.percent()
    }

    pub fn percent(&self) -> f64 {
        self.state.percent()
    }

    pub fn display_percent(&self) -> u8 {
        self.percent().round() as u8
    }

    pub fn visited_count(&self) -> usize {
        self.state.visited_segments.len()
    }

    pub fn total_segments(&self) -> Option<u64> {
        self.state.total_segments
    }

    pub fn state(&self) -> &CoverageState {
        &self.state
    }
}

fn is_usable_duration(duration: f64) -> bool {
    duration.is_finite() && duration > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn expected(samples: &[f64], duration: f64) -> f64 {
        let total = (duration / 5.0).ceil();
        let last = total as u64 - 1;
        let unique: BTreeSet<u64> = samples
            .iter()
            .map(|t| ((t / 5.0).floor() as u64).min(last))
            .collect();
        (unique.len() as f64 / total * 100.0).min(100.0)
    }

    fn visited(tracker: &CoverageTracker) -> Vec<u64> {
        tracker.state().visited_segments.iter().copied().collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn coverage_follows_unique_segment_formula(
            duration in 0.1f64..7200.0,
            fractions in prop::collection::vec(0.0f64..1.0, 0..300),
        ) {
            let samples: Vec<f64> = fractions
                .iter()
                .map(|f| f * duration)
                .filter(|t| *t < duration)
                .collect();

            let mut tracker = CoverageTracker::new(5.0);
            tracker.capture_duration(duration);
            for t in &samples {
                tracker.observe(*t, duration);
            }
            let want = expected(&samples, duration);
            prop_assert!(
                (tracker.percent() - want).abs() < 1e-9,
                "got {} want {} over {}s",
                tracker.percent(),
                want,
                duration
            );
        }

        #[test]
        fn coverage_is_monotone_and_bounded(
            duration in 0.1f64..7200.0,
            samples in prop::collection::vec(-100.0f64..20000.0, 0..300),
        ) {
            let mut tracker = CoverageTracker::new(5.0);
            let mut previous = 0.0;
            for t in samples {
                let now = tracker.observe(t, duration);
                prop_assert!(now >= previous, "coverage dropped from {} to {}", previous, now);
                prop_assert!(now <= 100.0);
                previous = now;
            }
            let total = tracker.total_segments().unwrap_or(0);
            prop_assert!(visited(&tracker).iter().all(|index| *index < total));
        }
    }

    #[test]
    fn hundred_second_video_has_twenty_segments() {
        let mut tracker = CoverageTracker::new(5.0);
        assert_eq!(tracker.observe(0.0, 100.0), 5.0);
        assert_eq!(tracker.total_segments(), Some(20));
        assert_eq!(tracker.observe(5.0, 100.0), 10.0);
        assert_eq!(tracker.observe(10.0, 100.0), 15.0);
    }

    #[test]
    fn matches_unique_segment_formula() {
        let cases: &[(&[f64], f64)] = &[
            (&[0.0, 0.3, 0.6, 4.99, 5.0], 100.0),
            (&[0.0, 50.0, 99.9], 100.0),
            (&[1.0, 2.0, 3.0], 7.0),
            (&[0.0, 12.5, 12.6, 33.3, 61.0], 61.0),
        ];
        for (samples, duration) in cases {
            let mut tracker = CoverageTracker::new(5.0);
            let mut last = 0.0;
            for t in samples.iter() {
                last = tracker.observe(*t, *duration);
            }
            assert!(
                (last - expected(samples, *duration)).abs() < 1e-9,
                "samples {:?} over {}s",
                samples,
                duration
            );
        }
    }

    #[test]
    fn coverage_never_regresses() {
        let mut tracker = CoverageTracker::new(5.0);
        let samples = [40.0, 3.0, 40.1, 12.0, 3.0, 0.0, 12.0, 95.0, 1.0];
        let mut previous = 0.0;
        for t in samples {
            let now = tracker.observe(t, 100.0);
            assert!(now >= previous);
            previous = now;
        }
    }

    #[test]
    fn unknown_duration_is_ignored() {
        let mut tracker = CoverageTracker::new(5.0);
        assert_eq!(tracker.observe(3.0, f64::NAN), 0.0);
        assert_eq!(tracker.observe(3.0, 0.0), 0.0);
        assert_eq!(tracker.observe(3.0, -4.0), 0.0);
        assert_eq!(tracker.observe(3.0, f64::INFINITY), 0.0);
        assert_eq!(tracker.visited_count(), 0);
        assert_eq!(tracker.total_segments(), None);
    }

    #[test]
    fn duration_is_captured_once() {
        let mut tracker = CoverageTracker::new(5.0);
        assert!(tracker.capture_duration(100.0));
        assert!(!tracker.capture_duration(10.0));
        tracker.observe(0.0, 10.0);
        assert_eq!(tracker.total_segments(), Some(20));
        assert_eq!(tracker.percent(), 5.0);
    }

    #[test]
    fn end_of_video_credits_last_segment() {
        let mut tracker = CoverageTracker::new(5.0);
        assert_eq!(tracker.observe(10.0, 10.0), 50.0);
        assert_eq!(visited(&tracker), vec![1]);

        assert_eq!(tracker.observe(5.0, 10.0), 50.0);
        assert_eq!(tracker.observe(0.0, 10.0), 100.0);
        assert_eq!(tracker.visited_count(), 2);
    }

    #[test]
    fn samples_off_the_timeline_are_ignored() {
        let mut tracker = CoverageTracker::new(5.0);
        assert_eq!(tracker.observe(0.0, 100.0), 5.0);
        assert_eq!(tracker.observe(f64::INFINITY, 100.0), 5.0);
        assert_eq!(tracker.observe(f64::NAN, 100.0), 5.0);
        assert_eq!(tracker.observe(-3.0, 100.0), 5.0);
        // Stream turned out longer than the duration captured from metadata.
        assert_eq!(tracker.observe(400.0, 400.0), 5.0);
        assert_eq!(tracker.observe(100.01, 100.0), 5.0);
        assert_eq!(visited(&tracker), vec![0]);
    }

    #[test]
    fn display_rounds_but_keeps_precision() {
        let mut tracker = CoverageTracker::new(5.0);
        tracker.observe(0.0, 15.0);
        assert!((tracker.percent() - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(tracker.display_percent(), 33);
    }

    #[test]
    fn short_video_still_has_one_segment() {
        let mut tracker = CoverageTracker::new(5.0);
        assert_eq!(tracker.observe(0.2, 0.5), 100.0);
        assert_eq!(tracker.total_segments(), Some(1));
    }
}
