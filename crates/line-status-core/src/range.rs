//! Changed-line interval value model.
//!
//! A [`Range`] pairs a half-open line interval in the current buffer with a half-open line
//! interval in the baseline. Unchanged text is represented by the *absence* of a range: the
//! gaps between consecutive ranges (and before the first / after the last) are implicitly
//! equal text.
//!
//! The range kind is never stored. It is a pure function of the four line bounds
//! ([`Range::kind`]), which keeps the "inserted ⇔ empty baseline interval" and
//! "deleted ⇔ empty current interval" relationships impossible to get out of sync.

/// Classification of a [`Range`], derived from its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// Lines present in the current buffer but not in the baseline (`vcs_line1 == vcs_line2`).
    Inserted,
    /// Lines present in the baseline but not in the current buffer (`line1 == line2`).
    Deleted,
    /// Both intervals are non-empty and their text differs.
    Modified,
}

/// A changed region: `[line1, line2)` in the current buffer aligned with
/// `[vcs_line1, vcs_line2)` in the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    /// First changed line in the current buffer (inclusive).
    pub line1: usize,
    /// End of the changed interval in the current buffer (exclusive).
    pub line2: usize,
    /// First aligned line in the baseline (inclusive).
    pub vcs_line1: usize,
    /// End of the aligned interval in the baseline (exclusive).
    pub vcs_line2: usize,
}

impl Range {
    /// Create a range from its four line bounds.
    ///
    /// Both intervals must be well-formed and at least one of them non-empty; a range with two
    /// empty intervals would describe "no change" and is a programming error.
    pub fn new(line1: usize, line2: usize, vcs_line1: usize, vcs_line2: usize) -> Self {
        debug_assert!(line1 <= line2, "current interval inverted: [{line1}, {line2})");
        debug_assert!(
            vcs_line1 <= vcs_line2,
            "baseline interval inverted: [{vcs_line1}, {vcs_line2})"
        );
        debug_assert!(
            line1 != line2 || vcs_line1 != vcs_line2,
            "range with two empty intervals"
        );
        Self {
            line1,
            line2,
            vcs_line1,
            vcs_line2,
        }
    }

    /// The kind of change this range describes, derived from the bounds.
    pub fn kind(&self) -> RangeKind {
        if self.vcs_line1 == self.vcs_line2 {
            RangeKind::Inserted
        } else if self.line1 == self.line2 {
            RangeKind::Deleted
        } else {
            RangeKind::Modified
        }
    }

    /// Whether `line` (current-buffer space) falls inside `[line1, line2)`.
    pub fn contains_line(&self, line: usize) -> bool {
        self.line1 <= line && line < self.line2
    }

    /// Number of lines covered in the current buffer.
    pub fn line_count(&self) -> usize {
        self.line2 - self.line1
    }

    /// Number of lines covered in the baseline.
    pub fn vcs_line_count(&self) -> usize {
        self.vcs_line2 - self.vcs_line1
    }

    /// This range with both current-buffer bounds shifted by `delta` lines.
    ///
    /// Baseline bounds are immutable by construction and never shift.
    pub(crate) fn shifted(&self, delta: isize) -> Self {
        Self {
            line1: (self.line1 as isize + delta).max(0) as usize,
            line2: (self.line2 as isize + delta).max(0) as usize,
            vcs_line1: self.vcs_line1,
            vcs_line2: self.vcs_line2,
        }
    }
}

/// Classification of an [`InnerRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InnerRangeKind {
    /// Lines equal to the aligned baseline lines up to whitespace.
    Equal,
    /// Lines with no aligned baseline counterpart.
    Inserted,
    /// A zero-width anchor where baseline lines were removed (`line1 == line2`).
    Deleted,
    /// Lines whose aligned baseline counterpart differs beyond whitespace.
    Modified,
}

/// One element of the sub-line partition of a modified [`Range`].
///
/// The inner ranges of a range are contiguous and exactly tile `[range.line1, range.line2)`
/// in current-buffer space. A [`InnerRangeKind::Deleted`] element is zero-width, anchored at
/// the current line where the removed baseline lines would reappear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InnerRange {
    /// First covered line in the current buffer (inclusive).
    pub line1: usize,
    /// End of the covered interval in the current buffer (exclusive).
    pub line2: usize,
    /// The kind of change this element describes.
    pub kind: InnerRangeKind,
}

impl InnerRange {
    /// Create an inner range.
    pub fn new(line1: usize, line2: usize, kind: InnerRangeKind) -> Self {
        debug_assert!(line1 <= line2);
        debug_assert!(
            (kind == InnerRangeKind::Deleted) == (line1 == line2),
            "only deleted inner ranges are zero-width"
        );
        Self { line1, line2, kind }
    }
}

/// Debug-build check of the range-list invariants: ordered, non-overlapping in both line
/// spaces, never touching in current-line space, every interval well-formed.
pub(crate) fn debug_check_range_list(ranges: &[Range]) {
    if cfg!(debug_assertions) {
        for r in ranges {
            debug_assert!(r.line1 <= r.line2, "inverted current interval: {r:?}");
            debug_assert!(r.vcs_line1 <= r.vcs_line2, "inverted baseline interval: {r:?}");
            debug_assert!(
                r.line1 != r.line2 || r.vcs_line1 != r.vcs_line2,
                "empty range: {r:?}"
            );
        }
        for pair in ranges.windows(2) {
            debug_assert!(
                pair[0].line2 != pair[1].line1,
                "unmerged adjacent ranges: {:?} / {:?}",
                pair[0],
                pair[1]
            );
            debug_assert!(
                pair[0].line2 < pair[1].line1,
                "overlapping or unordered ranges: {:?} / {:?}",
                pair[0],
                pair[1]
            );
            debug_assert!(
                pair[0].vcs_line2 <= pair[1].vcs_line1,
                "overlapping baseline intervals: {:?} / {:?}",
                pair[0],
                pair[1]
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_derived_from_bounds() {
        assert_eq!(Range::new(1, 2, 1, 1).kind(), RangeKind::Inserted);
        assert_eq!(Range::new(3, 3, 3, 6).kind(), RangeKind::Deleted);
        assert_eq!(Range::new(0, 2, 0, 1).kind(), RangeKind::Modified);
    }

    #[test]
    fn test_contains_line() {
        let r = Range::new(2, 5, 2, 4);
        assert!(!r.contains_line(1));
        assert!(r.contains_line(2));
        assert!(r.contains_line(4));
        assert!(!r.contains_line(5));
    }

    #[test]
    fn test_shifted() {
        let r = Range::new(2, 5, 2, 4);
        let s = r.shifted(3);
        assert_eq!((s.line1, s.line2), (5, 8));
        assert_eq!((s.vcs_line1, s.vcs_line2), (2, 4));

        let s = r.shifted(-2);
        assert_eq!((s.line1, s.line2), (0, 3));
    }

    #[test]
    fn test_inner_range_zero_width_is_deleted() {
        let d = InnerRange::new(4, 4, InnerRangeKind::Deleted);
        assert_eq!(d.line1, d.line2);
        let e = InnerRange::new(4, 6, InnerRangeKind::Equal);
        assert_eq!(e.line2 - e.line1, 2);
    }
}
