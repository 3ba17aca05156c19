//! Line-status tracking for one (baseline, buffer) pair.
//!
//! [`LineStatusTracker`] owns the mutable [`Document`] and the immutable baseline
//! [`LineBuffer`], and maintains the ordered changed-line [`Range`] list across edits. Every
//! edit goes through the tracker ([`insert`](LineStatusTracker::insert) /
//! [`delete`](LineStatusTracker::delete) / [`replace`](LineStatusTracker::replace)), which
//! applies the mutation and then re-diffs *only* the affected line window, splicing the fresh
//! ranges into the untouched ones and shifting everything below the edit by the net line
//! delta. This keeps edit handling proportional to the edit, not the file.
//!
//! Owning the document realizes the host-side "notify synchronously after each mutation"
//! contract by construction: notifications cannot be reordered, coalesced, or lost, and the
//! tracker never observes a buffer state it was not told about. `release` consumes the
//! tracker and hands the document back, so a released tracker is unrepresentable.
//!
//! Oversized inputs never crash tracking: the tracker degrades to shift-only bookkeeping
//! (ranges become approximate) and reports it via [`diff_too_large`](LineStatusTracker::diff_too_large).

use crate::diff::{self, DiffLimits};
use crate::document::Document;
use crate::error::TrackError;
use crate::inner::{self, AlignedInner};
use crate::line_buffer::LineBuffer;
use crate::range::{InnerRange, Range, debug_check_range_list};

/// How the tracker is currently maintaining its range list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerMode {
    /// Ranges are exact: every edit is re-diffed against the baseline.
    Exact,
    /// An input exceeded the diff ceiling; edits only shift line numbers and ranges are
    /// approximate until the tracker is re-based or recreated.
    ShiftOnly,
}

/// A tracked range plus its lazily computed inner alignment.
///
/// The cache is dropped whenever the range's bounds change (splice or shift); it is rebuilt
/// on the next inner-range query.
pub(crate) struct TrackedRange {
    pub(crate) range: Range,
    pub(crate) inner: Option<Vec<AlignedInner>>,
}

impl TrackedRange {
    fn new(range: Range) -> Self {
        Self { range, inner: None }
    }
}

/// Tracks the changed-line ranges of a document against an immutable baseline.
pub struct LineStatusTracker {
    document: Document,
    baseline: LineBuffer,
    pub(crate) ranges: Vec<TrackedRange>,
    limits: DiffLimits,
    mode: TrackerMode,
}

impl LineStatusTracker {
    /// Attach a tracker to `document`, diffing it against `baseline_text`.
    pub fn create_on(document: Document, baseline_text: &str) -> Self {
        Self::create_with_limits(document, baseline_text, DiffLimits::default())
    }

    /// Attach a tracker with explicit diff ceilings.
    pub fn create_with_limits(document: Document, baseline_text: &str, limits: DiffLimits) -> Self {
        let mut tracker = Self {
            document,
            baseline: LineBuffer::new(baseline_text),
            ranges: Vec::new(),
            limits,
            mode: TrackerMode::Exact,
        };
        tracker.rediff_all();
        tracker
    }

    /// Replace the baseline (e.g. after a commit) and re-diff the whole document.
    pub fn set_baseline(&mut self, text: &str) {
        self.baseline = LineBuffer::new(text);
        self.rediff_all();
    }

    /// Detach and return the document. The tracker ceases to exist.
    pub fn release(self) -> Document {
        self.document
    }

    /// Read access to the tracked document.
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Read access to the baseline.
    pub fn baseline(&self) -> &LineBuffer {
        &self.baseline
    }

    /// The current document text.
    pub fn text(&self) -> String {
        self.document.text()
    }

    /// Whether the document currently differs from the baseline.
    pub fn is_modified(&self) -> bool {
        !self.ranges.is_empty()
    }

    /// Whether the tracker had to give up exact diffing (see [`TrackerMode::ShiftOnly`]).
    pub fn diff_too_large(&self) -> bool {
        self.mode == TrackerMode::ShiftOnly
    }

    /// The current tracking mode.
    pub fn mode(&self) -> TrackerMode {
        self.mode
    }

    /// Snapshot of the tracked ranges, ordered by `line1`.
    pub fn ranges(&self) -> Vec<Range> {
        self.ranges.iter().map(|tr| tr.range).collect()
    }

    /// Snapshot of the tracked ranges with their inner partitions populated.
    ///
    /// Inner ranges are computed lazily on first access and cached until the owning range's
    /// bounds change.
    pub fn ranges_with_inner(&mut self) -> Vec<(Range, Vec<InnerRange>)> {
        (0..self.ranges.len())
            .map(|idx| {
                self.ensure_inner(idx);
                let tr = &self.ranges[idx];
                let inner = tr
                    .inner
                    .as_ref()
                    .map(|v| v.iter().map(|a| a.inner).collect())
                    .unwrap_or_default();
                (tr.range, inner)
            })
            .collect()
    }

    /// The range covering `line` in current-buffer space, if any. A deleted range matches
    /// the line it is anchored at.
    pub fn range_for_line(&self, line: usize) -> Option<Range> {
        let idx = self.ranges.partition_point(|tr| tr.range.line2 < line);
        for tr in &self.ranges[idx..] {
            let r = tr.range;
            if r.line1 > line {
                break;
            }
            if r.contains_line(line) || (r.line1 == r.line2 && r.line1 == line) {
                return Some(r);
            }
        }
        None
    }

    /// Insert `text` at char offset `offset` and update the range list.
    pub fn insert(&mut self, offset: usize, text: &str) {
        self.replace(offset, offset, text);
    }

    /// Delete the char span `[start, end)` and update the range list.
    pub fn delete(&mut self, start: usize, end: usize) {
        self.replace(start, end, "");
    }

    /// Replace the char span `[start, end)` with `text` and update the range list.
    /// Offsets are clamped to the document.
    pub fn replace(&mut self, start: usize, end: usize, text: &str) {
        let start = start.min(self.document.char_count());
        let end = end.clamp(start, self.document.char_count());

        // The affected line span must be captured in the pre-edit state: the edit may move
        // line breaks, and the splice below reasons in old line numbers.
        let first = self.document.char_to_line(start);
        let last = self.document.char_to_line(end);

        let edit = self.document.replace(start, end, text);
        self.update_after_edit(first, last, edit.line_delta);
    }

    pub(crate) fn ensure_inner(&mut self, idx: usize) {
        if self.ranges[idx].inner.is_none() {
            let r = self.ranges[idx].range;
            let cur = self.document.lines(r.line1, r.line2);
            let base = self.baseline.lines(r.vcs_line1, r.vcs_line2);
            self.ranges[idx].inner = Some(inner::build_aligned(&r, &cur, &base));
        }
    }

    fn rediff_all(&mut self) {
        self.mode = TrackerMode::Exact;
        let cur = self.document.all_lines();
        let base = self.baseline.all_lines();
        match diff::compute_ranges(&cur, &base, &self.limits) {
            Ok(ranges) => {
                self.ranges = ranges.into_iter().map(TrackedRange::new).collect();
            }
            Err(err) => {
                tracing::warn!(%err, "document too large for exact diff; tracking line shifts only");
                self.mode = TrackerMode::ShiftOnly;
                self.ranges = if cur == base {
                    Vec::new()
                } else {
                    vec![TrackedRange::new(Range::new(0, cur.len(), 0, base.len()))]
                };
            }
        }
    }

    /// Re-diff the affected window and splice the result back into the range list.
    ///
    /// `first`/`last` are the affected lines in the *pre-edit* document, `shift` the net
    /// line-count delta of the edit.
    fn update_after_edit(&mut self, first: usize, last: usize, shift: isize) {
        if self.mode == TrackerMode::ShiftOnly {
            self.shift_tail_only(last, shift);
            return;
        }

        let old_line_count = (self.document.line_count() as isize - shift).max(1) as usize;

        // One context line on each side: a single-character edit can move a line break and
        // with it a range boundary.
        let mut ws = first.saturating_sub(1);
        let mut we = (last + 2).min(old_line_count);

        // Expand the window over every range it overlaps or touches, remembering the splice
        // bounds. Touching ranges are pulled in so boundary merges see them.
        let mut bounds = None;
        for (i, tr) in self.ranges.iter().enumerate() {
            let r = tr.range;
            if r.line2 < ws {
                continue;
            }
            if r.line1 > we {
                break;
            }
            bounds = Some(match bounds {
                None => (i, i + 1),
                Some((i0, _)) => (i0, i + 1),
            });
            ws = ws.min(r.line1);
            we = we.max(r.line2);
        }
        let (i0, i1) = bounds.unwrap_or_else(|| {
            let pos = self
                .ranges
                .iter()
                .position(|tr| tr.range.line1 > we)
                .unwrap_or(self.ranges.len());
            (pos, pos)
        });

        // Map the window edges into baseline space. Lines outside any range are offset by
        // the cumulative line delta of the ranges above them.
        let before_delta = if i0 > 0 {
            let r = self.ranges[i0 - 1].range;
            r.line2 as isize - r.vcs_line2 as isize
        } else {
            0
        };
        let after_delta = if i1 > i0 {
            let r = self.ranges[i1 - 1].range;
            r.line2 as isize - r.vcs_line2 as isize
        } else {
            before_delta
        };
        let vs = ((ws as isize - before_delta).max(0) as usize).min(self.baseline.line_count());
        let ve = ((we as isize - after_delta).max(vs as isize) as usize).min(self.baseline.line_count());

        let new_we = ((we as isize + shift).max(ws as isize) as usize).min(self.document.line_count());
        let cur_lines = self.document.lines(ws, new_we);
        let base_lines = self.baseline.lines(vs, ve);

        match diff::compute_ranges(&cur_lines, &base_lines, &self.limits) {
            Ok(fresh) => {
                let tail = self.ranges.split_off(i1);
                self.ranges.truncate(i0);
                let mut list = std::mem::take(&mut self.ranges);
                list.extend(fresh.into_iter().map(|r| {
                    TrackedRange::new(Range::new(
                        r.line1 + ws,
                        r.line2 + ws,
                        r.vcs_line1 + vs,
                        r.vcs_line2 + vs,
                    ))
                }));
                list.extend(
                    tail.into_iter()
                        .map(|tr| TrackedRange::new(tr.range.shifted(shift))),
                );
                self.ranges = merge_adjacent_tracked(&self.document, &self.baseline, list);
                if cfg!(debug_assertions) {
                    let snapshot: Vec<Range> = self.ranges.iter().map(|tr| tr.range).collect();
                    debug_check_range_list(&snapshot);
                }
            }
            Err(err) => {
                tracing::warn!(%err, "edit window too large for exact diff; tracking line shifts only");
                self.mode = TrackerMode::ShiftOnly;
                self.shift_tail_only(last, shift);
            }
        }
    }

    /// Degraded bookkeeping: keep ranges approximately placed by shifting everything below
    /// the edit, without re-diffing.
    fn shift_tail_only(&mut self, last: usize, shift: isize) {
        if shift == 0 {
            return;
        }
        for tr in &mut self.ranges {
            if tr.range.line1 > last {
                tr.range = tr.range.shifted(shift);
                tr.inner = None;
            }
        }
    }

    /// Validation hook used by tests and hosts: errors if the tracker was degraded.
    pub fn require_exact(&self) -> Result<(), TrackError> {
        match self.mode {
            TrackerMode::Exact => Ok(()),
            TrackerMode::ShiftOnly => Err(TrackError::DiffTooLarge {
                lines: self.document.line_count(),
                bytes: self.document.byte_count(),
            }),
        }
    }
}

/// Merge ranges that ended up touching at a splice boundary, preserving inner caches of the
/// untouched entries.
fn merge_adjacent_tracked(
    document: &Document,
    baseline: &LineBuffer,
    list: Vec<TrackedRange>,
) -> Vec<TrackedRange> {
    let mut out: Vec<TrackedRange> = Vec::with_capacity(list.len());
    for tr in list {
        if let Some(a) = out.last().map(|t| t.range)
            && (a.line2 == tr.range.line1 || a.vcs_line2 == tr.range.vcs_line1)
        {
            out.pop();
            let merged = Range::new(a.line1, tr.range.line2, a.vcs_line1, tr.range.vcs_line2);
            let shrunk = diff::shrink_equal_edges(
                merged,
                |i| document.line_text(i),
                |i| baseline.line_text(i),
            );
            if let Some(m) = shrunk {
                out.push(TrackedRange::new(m));
            }
            continue;
        }
        out.push(tr);
    }
    out
}
