//! The exported per-paper result object.
//!
//! Category fields hold canonical names in first-seen document order.
//! Identifier categories keep their resolvable link or accession instead of
//! a bare name. The `_confidence` and `_role_classification` blocks carry
//! provenance for downstream quality filters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use scopetag_common::{ClassifiedExtraction, Role};
use scopetag_roles::TaggingDiagnostics;

/// A structured identifier with its resolvable reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfidenceReport {
    /// "methods" or "title_abstract"; which evidence tier produced the tags.
    pub tag_source: String,
    /// Mean extraction confidence per non-empty category.
    pub mean_by_category: BTreeMap<String, f32>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RoleReport {
    /// Consolidated verdict counts across all classifiable entities.
    pub role_counts: BTreeMap<String, usize>,
    /// "category:canonical" pairs kept despite an uncertain verdict.
    pub needs_review: Vec<String>,
    pub methods_results_share: f32,
    pub intro_discussion_share: f32,
    pub over_tagging_warning: bool,
}

impl RoleReport {
    pub fn from_verdicts(
        consolidated: &[ClassifiedExtraction],
        kept: &[ClassifiedExtraction],
        diagnostics: TaggingDiagnostics,
    ) -> Self {
        let mut role_counts: BTreeMap<String, usize> = BTreeMap::new();
        for mention in consolidated {
            *role_counts.entry(mention.role.as_str().to_string()).or_default() += 1;
        }
        let needs_review = kept
            .iter()
            .filter(|m| m.needs_review)
            .map(|m| format!("{}:{}", m.label.category_key(), m.canonical))
            .collect();
        Self {
            role_counts,
            needs_review,
            methods_results_share: diagnostics.methods_results_share,
            intro_discussion_share: diagnostics.intro_discussion_share,
            over_tagging_warning: diagnostics.over_tagging_warning,
        }
    }

    pub fn count(&self, role: Role) -> usize {
        self.role_counts.get(role.as_str()).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaperExtraction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,

    pub microscopy_techniques: Vec<String>,
    pub equipment: Vec<String>,
    pub microscope_brands: Vec<String>,
    pub fluorophores: Vec<String>,
    pub organisms: Vec<String>,
    pub antibody_sources: Vec<String>,
    pub image_acquisition_software: Vec<String>,
    pub sample_preparation: Vec<String>,
    pub cell_lines: Vec<String>,
    pub institutions: Vec<String>,

    pub protocols: Vec<IdentifierRecord>,
    pub repositories: Vec<IdentifierRecord>,
    pub rrids: Vec<IdentifierRecord>,
    pub rors: Vec<IdentifierRecord>,

    #[serde(rename = "_confidence")]
    pub confidence: ConfidenceReport,
    #[serde(rename = "_role_classification")]
    pub role_classification: RoleReport,

    pub extracted_at: DateTime<Utc>,
}

impl PaperExtraction {
    pub fn new(doi: Option<String>, pmid: Option<String>) -> Self {
        Self {
            doi,
            pmid,
            microscopy_techniques: Vec::new(),
            equipment: Vec::new(),
            microscope_brands: Vec::new(),
            fluorophores: Vec::new(),
            organisms: Vec::new(),
            antibody_sources: Vec::new(),
            image_acquisition_software: Vec::new(),
            sample_preparation: Vec::new(),
            cell_lines: Vec::new(),
            institutions: Vec::new(),
            protocols: Vec::new(),
            repositories: Vec::new(),
            rrids: Vec::new(),
            rors: Vec::new(),
            confidence: ConfidenceReport::default(),
            role_classification: RoleReport::default(),
            extracted_at: Utc::now(),
        }
    }

    /// Name list for a category key, when the category holds bare names.
    /// Identifier categories are structured and return `None` here.
    pub fn names(&self, category: &str) -> Option<&Vec<String>> {
        match category {
            "microscopy_techniques"      => Some(&self.microscopy_techniques),
            "equipment"                  => Some(&self.equipment),
            "microscope_brands"          => Some(&self.microscope_brands),
            "fluorophores"               => Some(&self.fluorophores),
            "organisms"                  => Some(&self.organisms),
            "antibody_sources"           => Some(&self.antibody_sources),
            "image_acquisition_software" => Some(&self.image_acquisition_software),
            "sample_preparation"         => Some(&self.sample_preparation),
            "cell_lines"                 => Some(&self.cell_lines),
            "institutions"               => Some(&self.institutions),
            _                            => None,
        }
    }

    pub fn names_mut(&mut self, category: &str) -> Option<&mut Vec<String>> {
        match category {
            "microscopy_techniques"      => Some(&mut self.microscopy_techniques),
            "equipment"                  => Some(&mut self.equipment),
            "microscope_brands"          => Some(&mut self.microscope_brands),
            "fluorophores"               => Some(&mut self.fluorophores),
            "organisms"                  => Some(&mut self.organisms),
            "antibody_sources"           => Some(&mut self.antibody_sources),
            "image_acquisition_software" => Some(&mut self.image_acquisition_software),
            "sample_preparation"         => Some(&mut self.sample_preparation),
            "cell_lines"                 => Some(&mut self.cell_lines),
            "institutions"               => Some(&mut self.institutions),
            _                            => None,
        }
    }

    pub fn contains(&self, category: &str, canonical: &str) -> bool {
        self.names(category)
            .map(|names| names.iter().any(|n| n.eq_ignore_ascii_case(canonical)))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_block_serializes_with_underscore_keys() {
        let mut extraction = PaperExtraction::new(Some("10.1/abc".to_string()), None);
        extraction.microscopy_techniques.push("Confocal Microscopy".to_string());
        extraction.confidence.tag_source = "methods".to_string();

        let value = serde_json::to_value(&extraction).unwrap();
        assert_eq!(value["_confidence"]["tag_source"], "methods");
        assert!(value.get("_role_classification").is_some());
        assert!(value.get("pmid").is_none());
    }

    #[test]
    fn identifier_records_skip_missing_urls() {
        let record = IdentifierRecord { id: "EMPIAR-10087".to_string(), url: None };
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("url").is_none());
    }

    #[test]
    fn contains_is_case_insensitive() {
        let mut extraction = PaperExtraction::new(None, None);
        extraction.fluorophores.push("Alexa Fluor 488".to_string());
        assert!(extraction.contains("fluorophores", "alexa fluor 488"));
        assert!(!extraction.contains("fluorophores", "GFP"));
        assert!(!extraction.contains("rrids", "anything"));
    }
}
