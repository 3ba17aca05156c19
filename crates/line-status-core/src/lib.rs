#![warn(missing_docs)]
//! Line Status Core - Changed-Line Tracking Against a Baseline
//!
//! # Overview
//!
//! `line-status-core` tracks, line by line, how an editable text buffer differs from an
//! immutable baseline snapshot (typically the version-control HEAD content of a file). It
//! maintains an ordered list of changed-line [`Range`]s across arbitrary edits, refines
//! modified ranges into sub-line [`InnerRange`] partitions, and can roll any tracked change
//! back to its baseline content. It is headless: no rendering, no VCS integration, no file
//! watching. The host feeds it a baseline and edits; it answers "which lines changed, how,
//! and what would undo them".
//!
//! # Core Features
//!
//! - **Incremental Re-Diff**: edits re-diff only the affected line window, O(edit) not O(file)
//! - **Derived Range Kinds**: inserted/deleted/modified are pure functions of range bounds
//! - **Whitespace-Insensitive Inner Ranges**: pure re-indentation reads as equal
//! - **Partial Rollback**: revert one range, a set of selected lines, or everything
//! - **Bounded Diff Cost**: oversized inputs degrade to shift-only tracking, never crash
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  LineStatusTracker (+ rollback ops)         │  ← Public API
//! ├─────────────────────────────────────────────┤
//! │  Inner Ranges (whitespace-aware alignment)  │  ← Sub-line Detail
//! ├─────────────────────────────────────────────┤
//! │  Diff Engine (Myers + range normalization)  │  ← Changed-Line Ranges
//! ├─────────────────────────────────────────────┤
//! │  Document / LineBuffer (rope-backed)        │  ← Line Access
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use line_status_core::{Document, LineStatusTracker, Range, RangeKind};
//!
//! // The buffer has one line the baseline does not have.
//! let document = Document::new("1\n2\n3");
//! let mut tracker = LineStatusTracker::create_on(document, "1\n3");
//!
//! let ranges = tracker.ranges();
//! assert_eq!(ranges, vec![Range::new(1, 2, 1, 1)]);
//! assert_eq!(ranges[0].kind(), RangeKind::Inserted);
//!
//! // Rolling the range back restores the baseline content.
//! tracker.rollback_range(&ranges[0]).unwrap();
//! assert_eq!(tracker.text(), "1\n3");
//! assert!(!tracker.is_modified());
//! ```
//!
//! # Module Description
//!
//! - [`document`] - mutable rope-backed text buffer with structured edit records
//! - [`line_buffer`] - read-only line view of the baseline snapshot
//! - [`range`] - changed-line interval value model
//! - [`diff`] - line diff engine and range normalization
//! - [`inner`] - sub-line refinement of modified ranges
//! - [`tracker`] - the tracker itself: lifecycle, edits, incremental updates
//! - [`rollback`] - reverting tracked changes to baseline content
//! - [`error`] - error taxonomy
//!
//! # Coordinate Conventions
//!
//! - All line intervals are half-open and zero-based
//! - All text offsets are char offsets (Unicode scalar values)
//! - Lines are split on `\n` only; N newlines yield N+1 lines and a trailing newline
//!   produces a final empty line
//! - Nothing is normalized: `\r` is ordinary line content, so CRLF and LF renditions of a
//!   line compare unequal and rollback restores baseline text exactly

pub mod diff;
pub mod document;
pub mod error;
pub mod inner;
pub mod line_buffer;
pub mod range;
pub mod rollback;
pub mod tracker;

pub use diff::{DiffLimits, compute_ranges};
pub use document::{Document, DocumentEdit};
pub use error::TrackError;
pub use inner::build_inner_ranges;
pub use line_buffer::LineBuffer;
pub use range::{InnerRange, InnerRangeKind, Range, RangeKind};
pub use tracker::{LineStatusTracker, TrackerMode};
