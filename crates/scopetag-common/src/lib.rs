//! scopetag-common — Shared types, errors, and lookup tables used across all scopetag crates.

pub mod config;
pub mod confidence;
pub mod entities;
pub mod error;

pub use config::{Config, PipelineConfig, RoleConfig, SegmentConfig};
pub use entities::{
    ClassifiedExtraction, EntityLabel, Extraction, Role, SectionType, Span, dedupe_extractions,
};
pub use error::{Result, ScopetagError};
