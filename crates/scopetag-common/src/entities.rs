//! Core data model: section types, entity labels, extractions, and role verdicts.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Section types mapped from structured paper sections or inferred from headings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Title,
    Abstract,
    Introduction,
    Methods,
    Results,
    Discussion,
    FigureCaption,
    DataAvailability,
    References,
    FullText,
    Other,
}

impl SectionType {
    /// Infer section type from a heading string.
    ///
    /// References must be recognized before anything else: citation lists are
    /// dropped wholesale and nothing downstream may ever see their text.
    pub fn from_heading(heading: &str) -> Self {
        let h = heading.to_lowercase();
        if h.contains("reference") || h.contains("bibliograph") || h.contains("literature cited")
            || h.contains("works cited")
        {
            SectionType::References
        } else if h.contains("data availability") || h.contains("availability of data")
            || h.contains("code availability") || h.contains("data access")
        {
            SectionType::DataAvailability
        } else if h.contains("method") || h.contains("material") || h.contains("experimental")
            || h.contains("procedure") || h.contains("microscopy") || h.contains("imaging")
            || h.contains("sample prep") || h.contains("staining") || h.contains("cell culture")
        {
            SectionType::Methods
        } else if h.contains("result") || h.contains("finding") {
            SectionType::Results
        } else if h.contains("introduction") || h.starts_with("background") {
            SectionType::Introduction
        } else if h.contains("discussion") || h.contains("conclusion") {
            SectionType::Discussion
        } else if h.contains("figure") || h.contains("fig.") || h.contains("legend") {
            SectionType::FigureCaption
        } else if h.contains("abstract") || h == "summary" {
            SectionType::Abstract
        } else {
            SectionType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::Title            => "title",
            SectionType::Abstract         => "abstract",
            SectionType::Introduction     => "introduction",
            SectionType::Methods          => "methods",
            SectionType::Results          => "results",
            SectionType::Discussion       => "discussion",
            SectionType::FigureCaption    => "figure_caption",
            SectionType::DataAvailability => "data_availability",
            SectionType::References       => "references",
            SectionType::FullText         => "full_text",
            SectionType::Other            => "other",
        }
    }
}

/// Normalized entity type for microscopy-metadata extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityLabel {
    MicroscopyTechnique,
    Equipment,
    MicroscopeBrand,
    Fluorophore,
    Organism,
    AntibodySource,
    Software,
    SamplePrep,
    CellLine,
    Protocol,
    Repository,
    Rrid,
    Ror,
    Institution,
}

impl EntityLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLabel::MicroscopyTechnique => "MICROSCOPY_TECHNIQUE",
            EntityLabel::Equipment           => "EQUIPMENT",
            EntityLabel::MicroscopeBrand     => "MICROSCOPE_BRAND",
            EntityLabel::Fluorophore         => "FLUOROPHORE",
            EntityLabel::Organism            => "ORGANISM",
            EntityLabel::AntibodySource      => "ANTIBODY_SOURCE",
            EntityLabel::Software            => "SOFTWARE",
            EntityLabel::SamplePrep          => "SAMPLE_PREP",
            EntityLabel::CellLine            => "CELL_LINE",
            EntityLabel::Protocol            => "PROTOCOL",
            EntityLabel::Repository          => "REPOSITORY",
            EntityLabel::Rrid                => "RRID",
            EntityLabel::Ror                 => "ROR",
            EntityLabel::Institution         => "INSTITUTION",
        }
    }

    /// Key this category uses in the exported result object.
    pub fn category_key(&self) -> &'static str {
        match self {
            EntityLabel::MicroscopyTechnique => "microscopy_techniques",
            EntityLabel::Equipment           => "equipment",
            EntityLabel::MicroscopeBrand     => "microscope_brands",
            EntityLabel::Fluorophore         => "fluorophores",
            EntityLabel::Organism            => "organisms",
            EntityLabel::AntibodySource      => "antibody_sources",
            EntityLabel::Software            => "image_acquisition_software",
            EntityLabel::SamplePrep          => "sample_preparation",
            EntityLabel::CellLine            => "cell_lines",
            EntityLabel::Protocol            => "protocols",
            EntityLabel::Repository          => "repositories",
            EntityLabel::Rrid                => "rrids",
            EntityLabel::Ror                 => "rors",
            EntityLabel::Institution         => "institutions",
        }
    }

    pub fn from_category_key(key: &str) -> Option<Self> {
        [
            EntityLabel::MicroscopyTechnique,
            EntityLabel::Equipment,
            EntityLabel::MicroscopeBrand,
            EntityLabel::Fluorophore,
            EntityLabel::Organism,
            EntityLabel::AntibodySource,
            EntityLabel::Software,
            EntityLabel::SamplePrep,
            EntityLabel::CellLine,
            EntityLabel::Protocol,
            EntityLabel::Repository,
            EntityLabel::Rrid,
            EntityLabel::Ror,
            EntityLabel::Institution,
        ]
        .into_iter()
        .find(|l| l.category_key() == key)
    }

    /// Whether mentions of this family go through usage-role classification.
    ///
    /// Identifiers (protocols, repositories, RRIDs, RORs) are references by
    /// construction, institutions come from affiliation strings only, and
    /// antibody sources are a side-channel of organism extraction; none of
    /// these carry an ambiguous usage claim.
    pub fn role_classifiable(&self) -> bool {
        matches!(
            self,
            EntityLabel::MicroscopyTechnique
                | EntityLabel::Equipment
                | EntityLabel::MicroscopeBrand
                | EntityLabel::Fluorophore
                | EntityLabel::Organism
                | EntityLabel::Software
                | EntityLabel::SamplePrep
                | EntityLabel::CellLine
        )
    }
}

/// Character span of a mention within its section text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// One candidate entity mention produced by an extraction agent.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub text: String,
    pub label: EntityLabel,
    /// `None` when the producing agent could not attribute a position.
    pub span: Option<Span>,
    /// Section-conditioned prior from the confidence matrix.
    pub confidence: f32,
    pub source_agent: &'static str,
    pub section: SectionType,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Extraction {
    pub fn new(
        label: EntityLabel,
        text: impl Into<String>,
        section: SectionType,
        confidence: f32,
        source_agent: &'static str,
    ) -> Self {
        Self {
            text: text.into(),
            label,
            span: None,
            confidence,
            source_agent,
            section,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.span = Some(Span { start, end });
        self
    }

    pub fn with_canonical(mut self, canonical: impl Into<String>) -> Self {
        self.metadata
            .insert("canonical".to_string(), serde_json::Value::String(canonical.into()));
        self
    }

    pub fn with_meta(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    /// Normalized display name. Every consumer goes through this accessor so
    /// canonicalization stays centralized in agent output.
    pub fn canonical(&self) -> &str {
        self.metadata
            .get("canonical")
            .and_then(|v| v.as_str())
            .unwrap_or(&self.text)
    }
}

/// Collapse extractions sharing (label, canonical) to the single
/// highest-confidence instance, preserving first-seen order.
pub fn dedupe_extractions(extractions: Vec<Extraction>) -> Vec<Extraction> {
    let mut seen: BTreeMap<(EntityLabel, String), usize> = BTreeMap::new();
    let mut result: Vec<Extraction> = Vec::new();

    for extraction in extractions {
        let key = (extraction.label, extraction.canonical().to_lowercase());
        match seen.get(&key) {
            Some(&idx) => {
                if extraction.confidence > result[idx].confidence {
                    result[idx] = extraction;
                }
            }
            None => {
                seen.insert(key, result.len());
                result.push(extraction);
            }
        }
    }

    result
}

/// Why an entity was mentioned; decides tagging eligibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Used,
    Referenced,
    Compared,
    Negated,
    Ambiguous,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Used       => "used",
            Role::Referenced => "referenced",
            Role::Compared   => "compared",
            Role::Negated    => "negated",
            Role::Ambiguous  => "ambiguous",
        }
    }
}

/// An extraction augmented with a usage-role judgment.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedExtraction {
    pub text: String,
    pub label: EntityLabel,
    pub canonical: String,
    pub section: SectionType,
    pub confidence: f32,
    pub source_agent: &'static str,
    pub role: Role,
    pub role_confidence: f32,
    /// Names of the linguistic cues that fired for this mention.
    pub role_signals: Vec<String>,
    pub needs_review: bool,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_falls_back_to_surface_text() {
        let e = Extraction::new(
            EntityLabel::Fluorophore,
            "GFP",
            SectionType::Methods,
            0.9,
            "fluorophore",
        );
        assert_eq!(e.canonical(), "GFP");

        let e = e.with_canonical("Green Fluorescent Protein");
        assert_eq!(e.canonical(), "Green Fluorescent Protein");
        assert_eq!(e.text, "GFP");
    }

    #[test]
    fn dedupe_keeps_highest_confidence_instance() {
        let low = Extraction::new(
            EntityLabel::Fluorophore,
            "Alexa 488",
            SectionType::Discussion,
            0.3,
            "fluorophore",
        )
        .with_canonical("Alexa Fluor 488");
        let high = Extraction::new(
            EntityLabel::Fluorophore,
            "Alexa Fluor 488",
            SectionType::Methods,
            0.95,
            "fluorophore",
        )
        .with_canonical("Alexa Fluor 488");

        let deduped = dedupe_extractions(vec![low, high]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].confidence, 0.95);
        assert_eq!(deduped[0].section, SectionType::Methods);
    }

    #[test]
    fn dedupe_never_leaves_duplicate_label_canonical_pairs() {
        let mk = |text: &str, conf: f32| {
            Extraction::new(
                EntityLabel::Software,
                text,
                SectionType::Methods,
                conf,
                "software",
            )
            .with_canonical("ImageJ")
        };
        let deduped = dedupe_extractions(vec![mk("ImageJ", 0.9), mk("imagej", 0.8), mk("ImageJ", 0.7)]);
        assert_eq!(deduped.len(), 1);
    }

    #[test]
    fn heading_inference() {
        assert_eq!(SectionType::from_heading("Materials and Methods"), SectionType::Methods);
        assert_eq!(SectionType::from_heading("2. Results"), SectionType::Results);
        assert_eq!(SectionType::from_heading("REFERENCES"), SectionType::References);
        assert_eq!(SectionType::from_heading("Data Availability Statement"), SectionType::DataAvailability);
        assert_eq!(SectionType::from_heading("Sample preparation and imaging"), SectionType::Methods);
        assert_eq!(SectionType::from_heading("Acknowledgements"), SectionType::Other);
    }

    #[test]
    fn category_key_round_trip() {
        for label in [
            EntityLabel::MicroscopyTechnique,
            EntityLabel::MicroscopeBrand,
            EntityLabel::Software,
            EntityLabel::Rrid,
        ] {
            assert_eq!(EntityLabel::from_category_key(label.category_key()), Some(label));
        }
        assert_eq!(EntityLabel::from_category_key("not_a_category"), None);
    }
}
