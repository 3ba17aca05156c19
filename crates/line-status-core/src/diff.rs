//! Line-granular diff engine.
//!
//! Computes a minimal ordered list of changed-line [`Range`]s between a current and a
//! baseline line sequence, using a Myers shortest-edit-script diff over whole-line equality.
//! The common prefix and suffix are trimmed before the O(ND) core runs, and inputs beyond the
//! configured [`DiffLimits`] (or whose edit distance blows past the quadratic-blowup guard)
//! are rejected with [`TrackError::DiffTooLarge`] so the caller can pick a fallback.
//!
//! Post-processing guarantees the range-list invariants:
//! - consecutive non-equal edit ops collapse into one maximal [`Range`]
//! - a modified range never starts or ends on a pair of equal aligned lines ("can't trim")
//! - slidable pure insert/delete blocks are centered in their freedom interval, pushing
//!   ambiguous changes toward the middle of the surrounding equal run
//! - two emitted ranges never touch in either line space ("can't merge")

use crate::error::TrackError;
use crate::range::{Range, RangeKind, debug_check_range_list};

/// Size ceilings protecting the diff engine from pathological inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffLimits {
    /// Maximum line count accepted per input sequence.
    pub max_lines: usize,
    /// Maximum byte size accepted per input sequence.
    pub max_bytes: usize,
}

impl Default for DiffLimits {
    fn default() -> Self {
        Self {
            max_lines: 50_000,
            max_bytes: 10_000_000,
        }
    }
}

/// Edit-distance budget for one diff. Inputs within [`DiffLimits`] can still be pairwise
/// unrelated; Myers is O((N+M)·D) in time and O(D²) in trace memory, so D is capped.
const MAX_EDIT_DISTANCE: usize = 2_000;

/// Compute the ordered changed-line ranges between `current` and `baseline`.
///
/// Returns an empty list for identical sequences. Fails with
/// [`TrackError::DiffTooLarge`] when an input exceeds `limits` or the edit distance
/// exceeds the internal budget; no partial result is produced in that case.
pub fn compute_ranges(
    current: &[String],
    baseline: &[String],
    limits: &DiffLimits,
) -> Result<Vec<Range>, TrackError> {
    check_limits(current, limits)?;
    check_limits(baseline, limits)?;

    // Trim the common prefix and suffix before the O(ND) core.
    let prefix = current
        .iter()
        .zip(baseline)
        .take_while(|(c, b)| c == b)
        .count();
    let suffix = current[prefix..]
        .iter()
        .rev()
        .zip(baseline[prefix..].iter().rev())
        .take_while(|(c, b)| c == b)
        .count();

    let cur_mid = &current[prefix..current.len() - suffix];
    let base_mid = &baseline[prefix..baseline.len() - suffix];
    if cur_mid.is_empty() && base_mid.is_empty() {
        return Ok(Vec::new());
    }

    let ops = myers(base_mid, cur_mid).ok_or_else(|| TrackError::DiffTooLarge {
        lines: current.len().max(baseline.len()),
        bytes: byte_size(current).max(byte_size(baseline)),
    })?;

    let mut ranges: Vec<Range> = ops_to_ranges(&ops, prefix)
        .into_iter()
        .filter_map(|r| {
            shrink_equal_edges(r, |i| current.get(i).cloned(), |i| baseline.get(i).cloned())
        })
        .collect();
    slide_to_middle(&mut ranges, current, baseline);
    let ranges = merge_touching(ranges, |i| current.get(i).cloned(), |i| baseline.get(i).cloned());

    debug_check_range_list(&ranges);
    Ok(ranges)
}

fn check_limits(lines: &[String], limits: &DiffLimits) -> Result<(), TrackError> {
    let bytes = byte_size(lines);
    if lines.len() > limits.max_lines || bytes > limits.max_bytes {
        return Err(TrackError::DiffTooLarge {
            lines: lines.len(),
            bytes,
        });
    }
    Ok(())
}

fn byte_size(lines: &[String]) -> usize {
    lines.iter().map(|l| l.len() + 1).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Insert,
    Delete,
}

/// One row of the Myers furthest-reaching trace: the `x` values for every feasible
/// diagonal `k` (step 2) at one edit distance.
struct Band {
    k_min: isize,
    xs: Vec<usize>,
}

impl Band {
    fn contains(&self, k: isize) -> bool {
        let k_max = self.k_min + 2 * (self.xs.len() as isize - 1);
        k >= self.k_min && k <= k_max && (k - self.k_min) % 2 == 0
    }

    fn get(&self, k: isize) -> usize {
        self.xs[((k - self.k_min) / 2) as usize]
    }
}

/// Whether the optimal step onto diagonal `k` is an insertion (down) rather than a
/// deletion (right), given the previous distance's trace row.
fn choose_down(prev: &Band, k: isize) -> bool {
    let can_down = prev.contains(k + 1);
    let can_up = prev.contains(k - 1);
    debug_assert!(can_down || can_up, "diagonal {k} unreachable");
    if !can_up {
        true
    } else if !can_down {
        false
    } else {
        prev.get(k - 1) < prev.get(k + 1)
    }
}

/// Myers O(ND) shortest edit script from `old` to `new`, as unit ops.
///
/// The k-band is restricted to grid-feasible diagonals, so every stored `x` belongs to a
/// real path. Returns `None` when the edit distance exceeds [`MAX_EDIT_DISTANCE`].
fn myers(old: &[String], new: &[String]) -> Option<Vec<Op>> {
    let n = old.len();
    let m = new.len();
    let (ni, mi) = (n as isize, m as isize);

    let mut rows: Vec<Band> = Vec::new();
    let max_d = (n + m).min(MAX_EDIT_DISTANCE);
    let mut d_final = None;

    'search: for d in 0..=max_d {
        let di = d as isize;
        let k_lo = (-di).max(di - 2 * mi);
        let k_hi = di.min(2 * ni - di);
        let mut xs = Vec::with_capacity(((k_hi - k_lo) / 2 + 1).max(0) as usize);

        let mut k = k_lo;
        while k <= k_hi {
            let start_x = if d == 0 {
                0
            } else {
                let prev = &rows[d - 1];
                if choose_down(prev, k) {
                    prev.get(k + 1)
                } else {
                    prev.get(k - 1) + 1
                }
            };
            let mut x = start_x;
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && old[x] == new[y] {
                x += 1;
                y += 1;
            }
            xs.push(x);
            if x == n && y == m {
                rows.push(Band { k_min: k_lo, xs });
                d_final = Some(d);
                break 'search;
            }
            k += 2;
        }
        rows.push(Band { k_min: k_lo, xs });
    }

    let d_final = d_final?;
    Some(backtrack(&rows, d_final, n, m))
}

fn backtrack(rows: &[Band], d_final: usize, n: usize, m: usize) -> Vec<Op> {
    let mut ops = Vec::with_capacity(n + m);
    let mut x = n;
    let mut y = m;

    for d in (1..=d_final).rev() {
        let k = x as isize - y as isize;
        let prev = &rows[d - 1];
        let down = choose_down(prev, k);
        let (prev_k, op) = if down {
            (k + 1, Op::Insert)
        } else {
            (k - 1, Op::Delete)
        };
        let prev_x = prev.get(prev_k);
        let prev_y = (prev_x as isize - prev_k) as usize;

        // Walk back over the snake that followed the non-diagonal step.
        let mid_x = if down { prev_x } else { prev_x + 1 };
        for _ in 0..(x - mid_x) {
            ops.push(Op::Equal);
        }
        ops.push(op);
        x = prev_x;
        y = prev_y;
    }

    debug_assert_eq!(x, y);
    for _ in 0..x {
        ops.push(Op::Equal);
    }
    ops.reverse();
    ops
}

/// Collapse runs of consecutive non-equal ops into maximal changed blocks.
fn ops_to_ranges(ops: &[Op], prefix: usize) -> Vec<Range> {
    let mut ranges = Vec::new();
    let mut cur = prefix;
    let mut base = prefix;
    let mut run: Option<(usize, usize)> = None;

    for op in ops {
        match op {
            Op::Equal => {
                if let Some((c, b)) = run.take() {
                    ranges.push(Range::new(c, cur, b, base));
                }
                cur += 1;
                base += 1;
            }
            Op::Insert => {
                run.get_or_insert((cur, base));
                cur += 1;
            }
            Op::Delete => {
                run.get_or_insert((cur, base));
                base += 1;
            }
        }
    }
    if let Some((c, b)) = run {
        ranges.push(Range::new(c, cur, b, base));
    }
    ranges
}

/// Shrink a range whose first or last aligned line pair is equal, moving the boundary
/// inward until the "can't trim" invariant holds. Returns `None` if the range vanishes.
pub(crate) fn shrink_equal_edges<C, B>(mut r: Range, cur_line: C, base_line: B) -> Option<Range>
where
    C: Fn(usize) -> Option<String>,
    B: Fn(usize) -> Option<String>,
{
    while r.line1 < r.line2 && r.vcs_line1 < r.vcs_line2 {
        match (cur_line(r.line1), base_line(r.vcs_line1)) {
            (Some(c), Some(b)) if c == b => {
                r.line1 += 1;
                r.vcs_line1 += 1;
            }
            _ => break,
        }
    }
    while r.line1 < r.line2 && r.vcs_line1 < r.vcs_line2 {
        match (cur_line(r.line2 - 1), base_line(r.vcs_line2 - 1)) {
            (Some(c), Some(b)) if c == b => {
                r.line2 -= 1;
                r.vcs_line2 -= 1;
            }
            _ => break,
        }
    }
    if r.line1 == r.line2 && r.vcs_line1 == r.vcs_line2 {
        None
    } else {
        Some(r)
    }
}

/// Center slidable pure insert/delete blocks inside their freedom interval.
///
/// When a block of inserted (or deleted) lines borders equal copies of its own edge lines,
/// several minimal alignments exist; the block is positioned so the leading and trailing
/// matched runs around it are as balanced as possible.
fn slide_to_middle(ranges: &mut [Range], current: &[String], baseline: &[String]) {
    for i in 0..ranges.len() {
        let r = ranges[i];
        let cur_floor = if i > 0 { ranges[i - 1].line2 } else { 0 };
        let vcs_floor = if i > 0 { ranges[i - 1].vcs_line2 } else { 0 };
        let cur_ceil = if i + 1 < ranges.len() {
            ranges[i + 1].line1
        } else {
            current.len()
        };
        let vcs_ceil = if i + 1 < ranges.len() {
            ranges[i + 1].vcs_line1
        } else {
            baseline.len()
        };

        let (up, down) = match r.kind() {
            RangeKind::Inserted => {
                let mut up = 0;
                while r.line1 - up > cur_floor
                    && r.vcs_line1 - up > vcs_floor
                    && current[r.line1 - up - 1] == current[r.line2 - up - 1]
                {
                    up += 1;
                }
                let mut down = 0;
                while r.line2 + down < cur_ceil
                    && r.vcs_line1 + down < vcs_ceil
                    && current[r.line1 + down] == current[r.line2 + down]
                {
                    down += 1;
                }
                (up, down)
            }
            RangeKind::Deleted => {
                let mut up = 0;
                while r.vcs_line1 - up > vcs_floor
                    && r.line1 - up > cur_floor
                    && baseline[r.vcs_line1 - up - 1] == baseline[r.vcs_line2 - up - 1]
                {
                    up += 1;
                }
                let mut down = 0;
                while r.vcs_line2 + down < vcs_ceil
                    && r.line1 + down < cur_ceil
                    && baseline[r.vcs_line1 + down] == baseline[r.vcs_line2 + down]
                {
                    down += 1;
                }
                (up, down)
            }
            RangeKind::Modified => (0, 0),
        };

        let shift = (down as isize - up as isize) / 2;
        if shift != 0 {
            ranges[i] = Range::new(
                (r.line1 as isize + shift) as usize,
                (r.line2 as isize + shift) as usize,
                (r.vcs_line1 as isize + shift) as usize,
                (r.vcs_line2 as isize + shift) as usize,
            );
        }
    }
}

/// Merge ranges that touch in either line space, re-shrinking the merged result so the
/// "can't trim" invariant survives the merge.
pub(crate) fn merge_touching<C, B>(ranges: Vec<Range>, cur_line: C, base_line: B) -> Vec<Range>
where
    C: Fn(usize) -> Option<String>,
    B: Fn(usize) -> Option<String>,
{
    let mut out: Vec<Range> = Vec::with_capacity(ranges.len());
    for r in ranges {
        if let Some(last) = out.last().copied()
            && (last.line2 == r.line1 || last.vcs_line2 == r.vcs_line1)
        {
            let merged = Range::new(last.line1, r.line2, last.vcs_line1, r.vcs_line2);
            out.pop();
            if let Some(m) = shrink_equal_edges(merged, &cur_line, &base_line) {
                out.push(m);
            }
            continue;
        }
        out.push(r);
    }
    out
}
