//! scopetag-pipeline — End-to-end metadata extraction for microscopy papers.
//!
//! The pipeline wires the segmenter, the extraction agents, and the role
//! classifier into one pass over a paper record:
//!
//! 1. segment: title/abstract/methods/... sections, references dropped;
//! 2. extract: every agent over every section, institutions over
//!    affiliation strings;
//! 3. classify: a usage-role verdict per classifiable mention, consolidated
//!    per entity, filtered to the entities the paper actually used;
//! 4. assemble: the category-keyed result object with confidence and
//!    role-classification provenance blocks.
//!
//! [`ExtractionPipeline::extract`] is synchronous and deterministic. The
//! async [`ExtractionPipeline::process`] adds the optional collaborators —
//! a supplemental NER service and an LLM verification pass — both of which
//! degrade to a no-op when absent or failing.

mod collaborators;
mod pipeline;
mod report;

pub use collaborators::{LlmVerifier, SupplementalEntity, SupplementalNer, VerificationOutcome};
pub use pipeline::ExtractionPipeline;
pub use report::{ConfidenceReport, IdentifierRecord, PaperExtraction, RoleReport};
