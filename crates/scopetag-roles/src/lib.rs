//! scopetag-roles — Usage-role classification for extracted mentions.
//!
//! Deciding WHETHER a paper mentions a technique is the easy half; the tag
//! is only correct when the paper actually *used* it. Every classifiable
//! mention gets a context window around its span scored with section-prior
//! weights plus linguistic signal adjustments, then a role verdict: Used,
//! Referenced, Compared, Negated, or Ambiguous.

mod classifier;
mod signals;

pub use classifier::{RoleClassifier, TaggingDiagnostics};
pub use signals::{detect_signals, Signal, SignalHits};
