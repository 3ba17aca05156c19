//! Incremental-update consistency tests
//!
//! The tracker re-diffs only the edited window. These tests hammer that path with random
//! edit sequences and check it against a fresh full-document diff after every step.

use line_status_core::{
    Document, DiffLimits, LineStatusTracker, Range, RangeKind, compute_ranges,
};
use rand::prelude::*;
use rand::rngs::StdRng;

fn fresh_ranges(tracker: &LineStatusTracker) -> Vec<Range> {
    compute_ranges(
        &tracker.document().all_lines(),
        &tracker.baseline().all_lines(),
        &DiffLimits::default(),
    )
    .unwrap()
}

/// Apply one random edit through the tracker. Inserted text is globally unique so the
/// line alignment stays unambiguous.
fn random_edit(tracker: &mut LineStatusTracker, rng: &mut StdRng, counter: &mut usize) {
    let len = tracker.document().char_count();
    match rng.gen_range(0..3) {
        0 => {
            *counter += 1;
            let at = rng.gen_range(0..=len);
            tracker.insert(at, &format!("\nfresh-{counter}"));
        }
        // Deletions remove whole lines: a char-level deletion could mangle a line into an
        // exact copy of a baseline line and reintroduce alignment ambiguity.
        1 if tracker.document().line_count() > 1 => {
            let line = rng.gen_range(0..tracker.document().line_count() - 1);
            let start = tracker.document().line_to_char(line);
            let end = tracker.document().line_to_char(line + 1);
            tracker.delete(start, end);
        }
        _ => {
            *counter += 1;
            let start = rng.gen_range(0..=len);
            let end = (start + rng.gen_range(0..=6)).min(len);
            tracker.replace(start, end, &format!("edit-{counter}"));
        }
    }
}

/// After every random edit the incrementally maintained ranges must equal a from-scratch
/// diff of the same two texts.
#[test]
fn test_incremental_matches_full_diff_on_unique_lines() {
    let mut rng = StdRng::seed_from_u64(20_240_817);
    for round in 0..20 {
        let line_count = rng.gen_range(1..40);
        // Fixed-width bodies: no line is a prefix of another, so a split line can never
        // truncate into an exact copy of a different baseline line.
        let baseline: String = (0..line_count)
            .map(|i| format!("line-{round}-{i:02}e"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut tracker = LineStatusTracker::create_on(Document::new(&baseline), &baseline);
        let mut counter = 0;

        for _ in 0..30 {
            random_edit(&mut tracker, &mut rng, &mut counter);
            assert_eq!(
                tracker.ranges(),
                fresh_ranges(&tracker),
                "divergence in round {round} after {counter} unique edits\nbuffer: {:?}",
                tracker.text()
            );
        }
    }
}

/// With heavily repeated content the alignment is ambiguous, so instead of exact equality
/// the structural guarantees are checked: ordering, no touching, no trimmable edges, and
/// that substituting every range's baseline lines reconstructs the baseline.
#[test]
fn test_incremental_invariants_on_repetitive_content() {
    let mut rng = StdRng::seed_from_u64(99);
    let alphabet = ["a", "b", "", "a", "}"];

    for _ in 0..20 {
        let baseline: String = (0..rng.gen_range(1..30))
            .map(|_| *alphabet.choose(&mut rng).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let mut tracker = LineStatusTracker::create_on(Document::new(&baseline), &baseline);

        for step in 0..30 {
            let len = tracker.document().char_count();
            let start = rng.gen_range(0..=len);
            let end = (start + rng.gen_range(0..=3)).min(len);
            let piece = if rng.gen_bool(0.5) {
                format!("{}\n", alphabet.choose(&mut rng).unwrap())
            } else {
                (*alphabet.choose(&mut rng).unwrap()).to_string()
            };
            tracker.replace(start, end, &piece);

            check_invariants(&tracker, step);
        }
    }
}

fn check_invariants(tracker: &LineStatusTracker, step: usize) {
    let cur = tracker.document().all_lines();
    let base = tracker.baseline().all_lines();
    let ranges = tracker.ranges();

    for pair in ranges.windows(2) {
        assert!(pair[0].line2 < pair[1].line1, "step {step}: touching ranges {pair:?}");
        assert!(
            pair[0].vcs_line2 <= pair[1].vcs_line1,
            "step {step}: baseline overlap {pair:?}"
        );
    }
    for r in &ranges {
        if r.kind() == RangeKind::Modified {
            assert_ne!(cur[r.line1], base[r.vcs_line1], "step {step}: trimmable {r:?}");
            assert_ne!(
                cur[r.line2 - 1],
                base[r.vcs_line2 - 1],
                "step {step}: trimmable {r:?}"
            );
        }
    }

    // Substitute baseline lines into every range; the result must be the baseline.
    let mut reconstructed: Vec<String> = Vec::new();
    let mut cur_at = 0;
    for r in &ranges {
        reconstructed.extend(cur[cur_at..r.line1].iter().cloned());
        reconstructed.extend(base[r.vcs_line1..r.vcs_line2].iter().cloned());
        cur_at = r.line2;
    }
    reconstructed.extend(cur[cur_at..].iter().cloned());
    assert_eq!(reconstructed, base, "step {step}: ranges do not reconstruct the baseline");
}

/// Repeatedly rolling back a randomly chosen remaining range must terminate within
/// O(#ranges) iterations and restore the baseline.
#[test]
fn test_random_order_rollback_converges() {
    let mut rng = StdRng::seed_from_u64(4242);
    for round in 0..20 {
        let baseline: String = (0..rng.gen_range(1..25))
            .map(|i| format!("base-{round}-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut tracker = LineStatusTracker::create_on(Document::new(&baseline), &baseline);
        let mut counter = 0;
        for _ in 0..15 {
            random_edit(&mut tracker, &mut rng, &mut counter);
        }

        let cap = 2 * tracker.ranges().len() + 8;
        let mut iterations = 0;
        while !tracker.ranges().is_empty() {
            assert!(iterations < cap, "round {round}: rollback did not converge");
            let ranges = tracker.ranges();
            let pick = ranges[rng.gen_range(0..ranges.len())];
            tracker.rollback_range(&pick).unwrap();
            iterations += 1;
        }
        assert_eq!(tracker.text(), baseline, "round {round}");
    }
}

/// revert_all must restore the exact baseline text from any random edit state.
#[test]
fn test_revert_all_round_trip() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..20 {
        let baseline: String = (0..rng.gen_range(1..25))
            .map(|i| format!("base-{round}-{i}"))
            .collect::<Vec<_>>()
            .join("\n");
        let mut tracker = LineStatusTracker::create_on(Document::new(&baseline), &baseline);
        let mut counter = 0;
        for _ in 0..15 {
            random_edit(&mut tracker, &mut rng, &mut counter);
        }

        tracker.revert_all().unwrap();
        assert_eq!(tracker.text(), baseline, "round {round}");
        assert!(!tracker.is_modified());
    }
}
