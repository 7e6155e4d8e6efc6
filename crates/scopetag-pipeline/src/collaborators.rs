//! Optional async collaborators injected into the pipeline.
//!
//! Both are trait objects so the core never links a model runtime or an
//! HTTP client; a pipeline without collaborators is fully functional and
//! fully deterministic.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use scopetag_common::Result;
use scopetag_segment::PaperRecord;

use crate::report::PaperExtraction;

/// One entity proposed by an external NER service, keyed by the category it
/// belongs to (see `EntityLabel::category_key`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplementalEntity {
    pub text: String,
    /// Category key, e.g. "organisms" or "cell_lines".
    pub category: String,
    pub canonical: String,
    /// Source-database identifier (NCBI taxid, Cellosaurus accession, ...).
    pub database_id: Option<String>,
    pub confidence: f32,
}

/// External NER lookup keyed by paper identifier (DOI or PMID).
///
/// Results are strictly additive: a supplemental entity can introduce a
/// name the dictionaries missed, never overrule one they found.
#[async_trait]
pub trait SupplementalNer: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<Vec<SupplementalEntity>>;
}

/// Category-keyed edit set returned by a verification pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationOutcome {
    /// Entities the verifier confirmed; informational only.
    #[serde(default)]
    pub verified: BTreeMap<String, Vec<String>>,
    /// Entities to remove, by category key.
    #[serde(default)]
    pub removed: BTreeMap<String, Vec<String>>,
    /// Entities to add, by category key.
    #[serde(default)]
    pub added: BTreeMap<String, Vec<String>>,
}

/// Second-opinion verification of a finished extraction, typically backed
/// by an LLM. Failures degrade to a no-op; the dictionary result stands.
#[async_trait]
pub trait LlmVerifier: Send + Sync {
    async fn verify(
        &self,
        paper: &PaperRecord,
        extraction: &PaperExtraction,
    ) -> Result<VerificationOutcome>;
}
