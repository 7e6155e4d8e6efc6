//! Configuration loading for scopetag.
//! Reads scopetag.toml; every empirically tuned constant lives here so the
//! defaults can be overridden without recompiling.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, ScopetagError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub segment: SegmentConfig,
    #[serde(default)]
    pub roles: RoleConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| ScopetagError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ScopetagError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&raw)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Strip numeric-bracket and author-year citations from section text.
    #[serde(default = "default_true")]
    pub strip_inline_citations: bool,
    /// Pre-parsed structured methods shorter than this are not trusted and
    /// the heuristic heading split runs instead.
    #[serde(default = "default_min_methods_chars")]
    pub structured_methods_min_chars: usize,
}

fn default_true() -> bool { true }
fn default_min_methods_chars() -> usize { 100 }

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            strip_inline_citations: true,
            structured_methods_min_chars: default_min_methods_chars(),
        }
    }
}

/// Tuned constants for role classification. The defaults were calibrated on
/// a hand-labelled corpus; treat them as parameters, not invariants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleConfig {
    /// Characters of context on each side of a mention used for signal
    /// detection.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    #[serde(default = "default_usage_adjustment")]
    pub usage_adjustment: f32,
    #[serde(default = "default_reference_adjustment")]
    pub reference_adjustment: f32,
    #[serde(default = "default_citation_adjustment")]
    pub citation_adjustment: f32,
    #[serde(default = "default_negation_adjustment")]
    pub negation_adjustment: f32,
    #[serde(default = "default_comparison_adjustment")]
    pub comparison_adjustment: f32,
    /// Score at or above which a mention with no dominating negative cue is
    /// Used.
    #[serde(default = "default_used_threshold")]
    pub used_threshold: f32,
    /// Score at or below which a mention without positive cues is
    /// Referenced. Between the two thresholds a mention is Ambiguous.
    #[serde(default = "default_referenced_threshold")]
    pub referenced_threshold: f32,
    /// Compared/Ambiguous verdicts above this survive the used-entity
    /// filter, flagged for review.
    #[serde(default = "default_review_threshold")]
    pub review_threshold: f32,
    /// Introduction+discussion share of Used confidence mass above which
    /// the over-tagging warning fires.
    #[serde(default = "default_over_tagging_cutoff")]
    pub over_tagging_cutoff: f32,
}

fn default_context_window()        -> usize { 240 }
fn default_usage_adjustment()      -> f32 { 0.25 }
fn default_reference_adjustment()  -> f32 { -0.20 }
fn default_citation_adjustment()   -> f32 { -0.15 }
fn default_negation_adjustment()   -> f32 { -0.60 }
fn default_comparison_adjustment() -> f32 { -0.25 }
fn default_used_threshold()        -> f32 { 0.75 }
fn default_referenced_threshold()  -> f32 { 0.45 }
fn default_review_threshold()      -> f32 { 0.50 }
fn default_over_tagging_cutoff()   -> f32 { 0.30 }

impl Default for RoleConfig {
    fn default() -> Self {
        Self {
            context_window: default_context_window(),
            usage_adjustment: default_usage_adjustment(),
            reference_adjustment: default_reference_adjustment(),
            citation_adjustment: default_citation_adjustment(),
            negation_adjustment: default_negation_adjustment(),
            comparison_adjustment: default_comparison_adjustment(),
            used_threshold: default_used_threshold(),
            referenced_threshold: default_referenced_threshold(),
            review_threshold: default_review_threshold(),
            over_tagging_cutoff: default_over_tagging_cutoff(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Batch sizes above this use the parallel path when the `parallel`
    /// feature is enabled.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
    /// Supplemental NER entities below this confidence are ignored.
    #[serde(default = "default_supplemental_min_confidence")]
    pub supplemental_min_confidence: f32,
}

fn default_parallel_threshold() -> usize { 8 }
fn default_supplemental_min_confidence() -> f32 { 0.5 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: default_parallel_threshold(),
            supplemental_min_confidence: default_supplemental_min_confidence(),
        }
    }
}
