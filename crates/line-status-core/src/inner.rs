//! Sub-line refinement of modified ranges.
//!
//! For a single modified [`Range`], computes a finer partition of its current-line interval
//! into equal / inserted / deleted / modified pieces, using whitespace-insensitive line
//! matching so that pure re-indentation shows as equal rather than modified.
//!
//! The matching is a greedy single pass: for each current line, a baseline search cursor
//! advances monotonically forward looking for the next whitespace-equal baseline line; a
//! consumed baseline line is never re-matched. This keeps the alignment order-stable and is
//! linear in practice (ranges are already diff-minimal, so the intervals are small).
//!
//! The output exactly tiles `[range.line1, range.line2)`: unmatched current lines become
//! inserted or modified pieces, and unmatched baseline spans become zero-width deleted
//! anchors. Each piece also records the baseline span it is aligned with (crate-internal),
//! which is what lets partial rollback substitute baseline text piece by piece.

use crate::range::{InnerRange, InnerRangeKind, Range, RangeKind};

/// An inner range together with the baseline interval it is aligned with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AlignedInner {
    pub inner: InnerRange,
    /// Aligned baseline interval `[vcs_line1, vcs_line2)`; empty for inserted/equal-width
    /// mismatches only when no baseline lines correspond.
    pub vcs_line1: usize,
    pub vcs_line2: usize,
}

/// Build the public inner-range partition for `range`.
///
/// `cur_lines` must be the current lines of `[range.line1, range.line2)` and `base_lines`
/// the baseline lines of `[range.vcs_line1, range.vcs_line2)`.
pub fn build_inner_ranges(range: &Range, cur_lines: &[String], base_lines: &[String]) -> Vec<InnerRange> {
    build_aligned(range, cur_lines, base_lines)
        .into_iter()
        .map(|a| a.inner)
        .collect()
}

pub(crate) fn build_aligned(
    range: &Range,
    cur_lines: &[String],
    base_lines: &[String],
) -> Vec<AlignedInner> {
    debug_assert_eq!(cur_lines.len(), range.line_count());
    debug_assert_eq!(base_lines.len(), range.vcs_line_count());

    if range.kind() != RangeKind::Modified {
        let kind = match range.kind() {
            RangeKind::Inserted => InnerRangeKind::Inserted,
            RangeKind::Deleted => InnerRangeKind::Deleted,
            RangeKind::Modified => unreachable!(),
        };
        return vec![AlignedInner {
            inner: InnerRange::new(range.line1, range.line2, kind),
            vcs_line1: range.vcs_line1,
            vcs_line2: range.vcs_line2,
        }];
    }

    // Greedy monotone matching of whitespace-collapsed lines.
    let collapsed_base: Vec<String> = base_lines.iter().map(|l| collapse_ws(l)).collect();
    let mut matches: Vec<(usize, usize)> = Vec::new();
    let mut cursor = 0;
    for (ci, line) in cur_lines.iter().enumerate() {
        let collapsed = collapse_ws(line);
        if let Some(offset) = collapsed_base[cursor..].iter().position(|b| *b == collapsed) {
            let bi = cursor + offset;
            matches.push((ci, bi));
            cursor = bi + 1;
        }
    }

    let mut out = Vec::new();
    let mut pc = 0;
    let mut pb = 0;
    let push_segment = |out: &mut Vec<AlignedInner>, pc: usize, ci: usize, pb: usize, bi: usize| {
        let kind = if pc < ci && pb < bi {
            InnerRangeKind::Modified
        } else if pc < ci {
            InnerRangeKind::Inserted
        } else if pb < bi {
            InnerRangeKind::Deleted
        } else {
            return;
        };
        out.push(AlignedInner {
            inner: InnerRange::new(range.line1 + pc, range.line1 + ci.max(pc), kind),
            vcs_line1: range.vcs_line1 + pb,
            vcs_line2: range.vcs_line1 + bi,
        });
    };

    for &(ci, bi) in &matches {
        push_segment(&mut out, pc, ci, pb, bi);
        // The matched line itself; coalesce with a preceding equal run.
        match out.last_mut() {
            Some(last) if last.inner.kind == InnerRangeKind::Equal && last.inner.line2 == range.line1 + ci => {
                last.inner.line2 += 1;
                last.vcs_line2 += 1;
            }
            _ => out.push(AlignedInner {
                inner: InnerRange::new(range.line1 + ci, range.line1 + ci + 1, InnerRangeKind::Equal),
                vcs_line1: range.vcs_line1 + bi,
                vcs_line2: range.vcs_line1 + bi + 1,
            }),
        }
        pc = ci + 1;
        pb = bi + 1;
    }
    push_segment(&mut out, pc, cur_lines.len(), pb, base_lines.len());

    debug_check_tiling(range, &out);
    out
}

fn collapse_ws(line: &str) -> String {
    line.split_whitespace().collect()
}

fn debug_check_tiling(range: &Range, inner: &[AlignedInner]) {
    if cfg!(debug_assertions) {
        let mut at = range.line1;
        for a in inner {
            debug_assert_eq!(a.inner.line1, at, "inner ranges must be contiguous: {inner:?}");
            debug_assert!(a.inner.line1 <= a.inner.line2);
            at = a.inner.line2;
        }
        debug_assert_eq!(at, range.line2, "inner ranges must tile the range: {inner:?}");
    }
}
