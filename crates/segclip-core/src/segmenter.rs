//! Wall-clock time to CDN segment index math.
//!
//! The CDN names each fixed-length chunk by `floor((t + skew) / duration)`,
//! so a time window maps to an inclusive index range per track.

/// Seconds added to a timestamp before indexing (CDN boundary lag).
pub const SKEW_OFFSET_SECS: i64 = 38;

/// Length of one segment in seconds.
pub const SEGMENT_DURATION_SECS: f64 = 3.840000074;

/// Inclusive range of segment indices covering a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentIndexRange {
    pub first_index: i64,
    pub last_index: i64,
}

impl SegmentIndexRange {
    /// Number of segments per track (0 if the range is inverted).
    pub fn len(&self) -> usize {
        if self.last_index < self.first_index {
            return 0;
        }
        (self.last_index - self.first_index + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = i64> {
        self.first_index..=self.last_index
    }
}

/// Segment index served at `timestamp` (whole seconds since the Unix epoch).
pub fn compute_index(timestamp: i64) -> i64 {
    ((timestamp + SKEW_OFFSET_SECS) as f64 / SEGMENT_DURATION_SECS).floor() as i64
}

/// Maps both ends of a time window independently. No clamping: a huge window
/// only costs more fetches.
pub fn compute_range(start: i64, end: i64) -> SegmentIndexRange {
    SegmentIndexRange {
        first_index: compute_index(start),
        last_index: compute_index(end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_formula() {
        for t in [0_i64, 1, 37, 38, 1_000, 1_700_000_000, 1_715_342_400] {
            let expected = ((t + 38) as f64 / 3.840000074).floor() as i64;
            assert_eq!(compute_index(t), expected, "t = {}", t);
        }
    }

    #[test]
    fn index_known_values() {
        // 38 + 0 = 38 -> 38 / 3.84 = 9.89
        assert_eq!(compute_index(0), 9);
        // 38 + 1 = 39 -> 10.156
        assert_eq!(compute_index(1), 10);
    }

    #[test]
    fn index_is_monotonic() {
        let base = 1_700_000_000_i64;
        let mut prev = compute_index(base);
        for t in base..base + 2_000 {
            let cur = compute_index(t);
            assert!(cur >= prev, "index went backwards at t = {}", t);
            assert!(cur - prev <= 1);
            prev = cur;
        }
    }

    #[test]
    fn range_is_ordered_for_forward_window() {
        let start = 1_715_342_400;
        for len in [0_i64, 1, 3, 4, 60, 3_600] {
            let r = compute_range(start, start + len);
            assert!(r.first_index <= r.last_index);
        }
    }

    #[test]
    fn range_len_and_indices() {
        let r = SegmentIndexRange {
            first_index: 10,
            last_index: 14,
        };
        assert_eq!(r.len(), 5);
        assert_eq!(r.indices().collect::<Vec<_>>(), vec![10, 11, 12, 13, 14]);

        let inverted = SegmentIndexRange {
            first_index: 3,
            last_index: 2,
        };
        assert!(inverted.is_empty());
    }
}
