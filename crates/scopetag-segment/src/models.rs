//! Input and output models for segmentation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use scopetag_common::SectionType;

/// A paper record as produced by the upstream scraping/DB layer.
/// Only `title`/`abstract` are required; everything else is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaperRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "abstract")]
    pub abstract_text: String,
    #[serde(default)]
    pub methods: String,
    #[serde(default)]
    pub results: String,
    #[serde(default)]
    pub full_text: String,
    /// Author-affiliation strings; the only input institution extraction
    /// ever reads.
    #[serde(default)]
    pub affiliations: Vec<String>,
    /// Pre-tagged sections from a prior JATS/GROBID parse, if any.
    #[serde(default)]
    pub sections: Vec<StructuredSection>,
    pub doi: Option<String>,
    pub pmid: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// One pre-tagged section from an upstream parser.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredSection {
    #[serde(default)]
    pub heading: String,
    #[serde(default)]
    pub text: String,
    /// Parser-supplied sec-type string (e.g. JATS `sec-type`), if present.
    #[serde(default, alias = "type")]
    pub sec_type: Option<String>,
}

/// A typed section after segmentation.
#[derive(Debug, Clone, Serialize)]
pub struct RawSection {
    pub heading: Option<String>,
    pub text: String,
    pub section_type: SectionType,
}

/// Normalized view of one paper's text. Built once immediately before
/// extraction and read-only thereafter; reference/bibliography text is
/// never present in any field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PaperSections {
    pub title: String,
    pub abstract_text: String,
    pub methods: String,
    pub results: String,
    pub introduction: String,
    pub discussion: String,
    /// Figure captions, concatenated.
    pub figures: String,
    pub data_availability: String,
    pub sections: Vec<RawSection>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl PaperSections {
    /// Where tagging evidence comes from: "methods" when a substantial
    /// methods section exists, otherwise the title/abstract fallback.
    pub fn tag_source(&self) -> &'static str {
        if self.methods.len() > 100 {
            "methods"
        } else {
            "title_abstract"
        }
    }

    /// Non-empty (section type, text) pairs in document order, for uniform
    /// agent dispatch.
    pub fn iter_texts(&self) -> Vec<(SectionType, &str)> {
        let mut texts: Vec<(SectionType, &str)> = Vec::new();
        let named: [(SectionType, &str); 8] = [
            (SectionType::Title, &self.title),
            (SectionType::Abstract, &self.abstract_text),
            (SectionType::Introduction, &self.introduction),
            (SectionType::Methods, &self.methods),
            (SectionType::Results, &self.results),
            (SectionType::Discussion, &self.discussion),
            (SectionType::FigureCaption, &self.figures),
            (SectionType::DataAvailability, &self.data_availability),
        ];
        for (section_type, text) in named {
            if !text.trim().is_empty() {
                texts.push((section_type, text));
            }
        }
        // The degenerate single-bucket case and anything the heading
        // classifier could not place.
        for section in &self.sections {
            if matches!(section.section_type, SectionType::FullText | SectionType::Other)
                && !section.text.trim().is_empty()
            {
                texts.push((section.section_type, section.text.as_str()));
            }
        }
        texts
    }

    /// Section text by type, for role-classification context lookup.
    pub fn text_for(&self, section: SectionType) -> Option<&str> {
        let text = match section {
            SectionType::Title            => &self.title,
            SectionType::Abstract         => &self.abstract_text,
            SectionType::Introduction     => &self.introduction,
            SectionType::Methods          => &self.methods,
            SectionType::Results          => &self.results,
            SectionType::Discussion       => &self.discussion,
            SectionType::FigureCaption    => &self.figures,
            SectionType::DataAvailability => &self.data_availability,
            SectionType::FullText | SectionType::Other => {
                return self
                    .sections
                    .iter()
                    .find(|s| s.section_type == section)
                    .map(|s| s.text.as_str());
            }
            SectionType::References => return None,
        };
        if text.trim().is_empty() { None } else { Some(text.as_str()) }
    }
}
