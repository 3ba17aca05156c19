//! Reverting tracked changes back to baseline content.
//!
//! Three granularities: one range ([`LineStatusTracker::rollback_range`]), an arbitrary set
//! of selected lines ([`LineStatusTracker::rollback_lines`]), and everything
//! ([`LineStatusTracker::revert_all`]). All of them reduce to line-interval replacements
//! routed through the tracker's normal edit path, so the range list updates incrementally
//! exactly as if the user had typed the baseline text back in.
//!
//! Line-set rollback applies per-line selections with sub-range precision: a range that is
//! only partially selected reverts just the inner pieces whose lines are all selected, using
//! the baseline span each piece is aligned with.

use std::collections::BTreeSet;

use crate::error::TrackError;
use crate::range::{InnerRangeKind, Range};
use crate::tracker::LineStatusTracker;

impl LineStatusTracker {
    /// Revert one tracked range to its baseline content.
    ///
    /// `range` must match a currently tracked range by value; a snapshot taken before a
    /// later edit fails with [`TrackError::StaleRange`] instead of corrupting unrelated
    /// lines.
    pub fn rollback_range(&mut self, range: &Range) -> Result<(), TrackError> {
        if !self.ranges.iter().any(|tr| tr.range == *range) {
            return Err(TrackError::StaleRange(*range));
        }
        let replacement = self.baseline().lines(range.vcs_line1, range.vcs_line2);
        self.replace_lines(range.line1, range.line2, &replacement);
        Ok(())
    }

    /// Revert the changes on the selected lines (current-buffer line numbers).
    ///
    /// A fully selected range is reverted whole. A partially selected range reverts only
    /// the inner pieces all of whose lines are selected; partially selected pieces are left
    /// alone. A deleted range, having no current lines, is selected through the line it is
    /// anchored at. Out-of-range line numbers are ignored.
    pub fn rollback_lines(&mut self, lines: &BTreeSet<usize>) {
        let line_count = self.document().line_count();
        // (line1, line2, replacement) plans, collected before any mutation.
        let mut plans: Vec<(usize, usize, Vec<String>)> = Vec::new();

        for idx in 0..self.ranges.len() {
            let r = self.ranges[idx].range;

            if r.line1 == r.line2 {
                let probe = r.line1.min(line_count.saturating_sub(1));
                if lines.contains(&probe) {
                    plans.push((r.line1, r.line2, self.baseline().lines(r.vcs_line1, r.vcs_line2)));
                }
                continue;
            }

            let covered = lines.range(r.line1..r.line2).count();
            if covered == 0 {
                continue;
            }
            if covered == r.line_count() {
                plans.push((r.line1, r.line2, self.baseline().lines(r.vcs_line1, r.vcs_line2)));
                continue;
            }

            self.ensure_inner(idx);
            let aligned = self.ranges[idx].inner.clone().unwrap_or_default();
            for piece in aligned {
                if piece.inner.kind == InnerRangeKind::Equal {
                    continue;
                }
                let selected = if piece.inner.line1 == piece.inner.line2 {
                    let probe = piece.inner.line1.min(r.line2 - 1);
                    lines.contains(&probe)
                } else {
                    (piece.inner.line1..piece.inner.line2).all(|l| lines.contains(&l))
                };
                if selected {
                    plans.push((
                        piece.inner.line1,
                        piece.inner.line2,
                        self.baseline().lines(piece.vcs_line1, piece.vcs_line2),
                    ));
                }
            }
        }

        // Bottom to top, so applying one plan never moves the lines of a pending one.
        plans.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        for (line1, line2, replacement) in plans {
            self.replace_lines(line1, line2, &replacement);
        }
    }

    /// Revert every tracked range, restoring the document to baseline content.
    ///
    /// Repeatedly reverts the first range until the list is empty. Each revert re-diffs the
    /// affected window and may merge neighbors, so the list shrinks by at least one range per
    /// step; the iteration cap only trips if that stops holding, which is a tracker bug, not
    /// a user error.
    pub fn revert_all(&mut self) -> Result<(), TrackError> {
        let cap = 2 * self.ranges.len() + 8;
        let mut iterations = 0;
        while let Some(range) = self.ranges.first().map(|tr| tr.range) {
            if iterations >= cap {
                tracing::error!(iterations, "revert-all failed to converge, aborting");
                return Err(TrackError::RevertLoop { iterations });
            }
            self.rollback_range(&range)?;
            iterations += 1;
        }
        Ok(())
    }

    /// Replace the line interval `[line1, line2)` with `replacement` lines, through the
    /// normal edit path. Handles the trailing-newline edge cases of whole-line editing:
    /// deleting through the last line must also consume the preceding line break, and
    /// appending past the last line must first add one.
    fn replace_lines(&mut self, line1: usize, line2: usize, replacement: &[String]) {
        let line_count = self.document().line_count();
        let line1 = line1.min(line_count);
        let line2 = line2.clamp(line1, line_count);

        if replacement.is_empty() {
            if line1 == line2 {
                return;
            }
            let (start, end) = if line2 < line_count {
                (self.document().line_to_char(line1), self.document().line_to_char(line2))
            } else if line1 > 0 {
                (self.document().line_to_char(line1) - 1, self.document().char_count())
            } else {
                (0, self.document().char_count())
            };
            self.replace(start, end, "");
            return;
        }

        let text = replacement.join("\n");
        if line1 == line2 {
            if line1 < line_count {
                let at = self.document().line_to_char(line1);
                self.replace(at, at, &format!("{text}\n"));
            } else {
                let at = self.document().char_count();
                self.replace(at, at, &format!("\n{text}"));
            }
        } else {
            let start = self.document().line_to_char(line1);
            let end = self.line_content_end(line2 - 1);
            self.replace(start, end, &text);
        }
    }

    /// Char offset just past the content of `line`, excluding its line break.
    fn line_content_end(&self, line: usize) -> usize {
        if line + 1 < self.document().line_count() {
            self.document().line_to_char(line + 1) - 1
        } else {
            self.document().char_count()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn tracker(current: &str, baseline: &str) -> LineStatusTracker {
        LineStatusTracker::create_on(Document::new(current), baseline)
    }

    fn set(lines: &[usize]) -> BTreeSet<usize> {
        lines.iter().copied().collect()
    }

    #[test]
    fn test_rollback_modified_range() {
        let mut t = tracker("a\nX\nc", "a\nb\nc");
        let r = t.ranges()[0];
        t.rollback_range(&r).unwrap();
        assert_eq!(t.text(), "a\nb\nc");
        assert!(t.ranges().is_empty());
    }

    #[test]
    fn test_rollback_inserted_range_deletes_lines() {
        let mut t = tracker("1\n2\n3", "1\n3");
        let r = t.ranges()[0];
        assert_eq!(r, Range::new(1, 2, 1, 1));
        t.rollback_range(&r).unwrap();
        assert_eq!(t.text(), "1\n3");
        assert!(t.ranges().is_empty());
    }

    #[test]
    fn test_rollback_deleted_range_restores_lines() {
        let mut t = tracker("a\na\na\nc\nc\nc", "a\na\na\nb\nb\nb\nc\nc\nc");
        let r = t.ranges()[0];
        assert_eq!(r, Range::new(3, 3, 3, 6));
        t.rollback_range(&r).unwrap();
        assert_eq!(t.text(), "a\na\na\nb\nb\nb\nc\nc\nc");
        assert!(t.ranges().is_empty());
    }

    #[test]
    fn test_rollback_deletion_at_end_of_file() {
        let mut t = tracker("a", "a\nb\nc");
        let r = t.ranges()[0];
        t.rollback_range(&r).unwrap();
        assert_eq!(t.text(), "a\nb\nc");
        assert!(t.ranges().is_empty());
    }

    #[test]
    fn test_rollback_whole_file_change() {
        let mut t = tracker("x\ny", "");
        let r = t.ranges()[0];
        t.rollback_range(&r).unwrap();
        assert_eq!(t.text(), "");
        assert!(t.ranges().is_empty());
    }

    #[test]
    fn test_stale_range_is_rejected() {
        let mut t = tracker("a\nX\nc", "a\nb\nc");
        let stale = t.ranges()[0];
        t.insert(0, "top\n");
        let err = t.rollback_range(&stale).unwrap_err();
        assert!(matches!(err, TrackError::StaleRange(_)));
        // The failed call must not have touched the document.
        assert_eq!(t.text(), "top\na\nX\nc");
    }

    #[test]
    fn test_rollback_lines_fully_covering_a_range() {
        let mut t = tracker("a\nX\nc\nY", "a\nb\nc\nd");
        t.rollback_lines(&set(&[1]));
        assert_eq!(t.text(), "a\nb\nc\nY");
        assert_eq!(t.ranges(), vec![Range::new(3, 4, 3, 4)]);
    }

    #[test]
    fn test_rollback_lines_partial_selection_uses_inner_ranges() {
        // One modified range covering lines 1..4; only line 3 is selected, so only the
        // inner piece on line 3 reverts.
        let mut t = tracker("a\nB\n  c\nD\ne", "a\nb\nc\nd\ne");
        assert_eq!(t.ranges(), vec![Range::new(1, 4, 1, 4)]);
        t.rollback_lines(&set(&[3]));
        assert_eq!(t.text(), "a\nB\n  c\nd\ne");
    }

    #[test]
    fn test_rollback_lines_partially_selected_piece_is_left_alone() {
        // Lines 1..3 form one inserted piece; selecting only line 1 must not revert it.
        let mut t = tracker("a\nnew1\nnew2\nb", "a\nb");
        assert_eq!(t.ranges(), vec![Range::new(1, 3, 1, 1)]);
        t.rollback_lines(&set(&[1]));
        assert_eq!(t.text(), "a\nnew1\nnew2\nb");
    }

    #[test]
    fn test_rollback_lines_selects_deleted_range_by_anchor() {
        let mut t = tracker("a\nc", "a\nb\nc");
        assert_eq!(t.ranges(), vec![Range::new(1, 1, 1, 2)]);
        t.rollback_lines(&set(&[1]));
        assert_eq!(t.text(), "a\nb\nc");
    }

    #[test]
    fn test_rollback_lines_ignores_out_of_range_lines() {
        let mut t = tracker("a\nX", "a\nb");
        t.rollback_lines(&set(&[100]));
        assert_eq!(t.text(), "a\nX");
    }

    #[test]
    fn test_rollback_lines_across_multiple_ranges() {
        let mut t = tracker("A\nb\nC\nd\nE", "a\nb\nc\nd\ne");
        assert_eq!(t.ranges().len(), 3);
        t.rollback_lines(&set(&[0, 4]));
        assert_eq!(t.text(), "a\nb\nC\nd\ne");
        assert_eq!(t.ranges(), vec![Range::new(2, 3, 2, 3)]);
    }

    #[test]
    fn test_revert_all() {
        let mut t = tracker("X\nb\nY\nd\nZ", "a\nb\nc\nd\ne");
        assert_eq!(t.ranges().len(), 3);
        t.revert_all().unwrap();
        assert_eq!(t.text(), "a\nb\nc\nd\ne");
        assert!(!t.is_modified());
    }

    #[test]
    fn test_revert_all_with_inserts_and_deletes() {
        let mut t = tracker("1\none and a half\n2\n4", "1\n2\n3\n4");
        t.revert_all().unwrap();
        assert_eq!(t.text(), "1\n2\n3\n4");
    }

    #[test]
    fn test_revert_all_on_clean_tracker_is_a_no_op() {
        let mut t = tracker("same", "same");
        t.revert_all().unwrap();
        assert_eq!(t.text(), "same");
    }
}
