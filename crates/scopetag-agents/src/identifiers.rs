//! Structured identifier extraction: RRIDs, ROR ids, protocol DOIs and
//! data repository accessions. Every extraction carries a resolvable
//! "url" or "id" in its metadata.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::ExtractionAgent;

const AGENT_NAME: &str = "identifiers";

static RRID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"RRID:\s?([A-Za-z]+[_:][A-Za-z0-9_:-]+)").expect("RRID pattern")
});

static ROR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:https?://)?ror\.org/(0[0-9a-z]{8})").expect("ROR pattern")
});

static PROTOCOLS_IO_DOI: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"10\.17504/protocols\.io\.[0-9a-z.]+").expect("protocols.io DOI pattern")
});

static PROTOCOLS_IO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?protocols\.io/view/[A-Za-z0-9._~-]+").expect("protocols.io URL")
});

static ZENODO_DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.5281/zenodo\.(\d+)").expect("Zenodo DOI pattern"));

static ZENODO_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://zenodo\.org/(?:record|records)/(\d+)").expect("Zenodo URL pattern")
});

static FIGSHARE_DOI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"10\.6084/m9\.figshare\.\d+(?:\.v\d+)?").expect("figshare DOI"));

static EMPIAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bEMPIAR-(\d{5})\b").expect("EMPIAR pattern"));

static IDR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bidr(\d{4})\b").expect("IDR pattern"));

static BIOIMAGE_ARCHIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bS-BIAD\d+\b").expect("BioImage Archive pattern"));

static GITHUB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://github\.com/[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+").expect("GitHub URL pattern")
});

pub struct IdentifierAgent;

impl IdentifierAgent {
    pub fn new() -> Self {
        Self
    }

    fn emit(
        out: &mut Vec<Extraction>,
        label: EntityLabel,
        section: SectionType,
        text: &str,
        start: usize,
        end: usize,
        canonical: &str,
        meta_key: &str,
        meta_value: String,
    ) {
        let confidence = agent_confidence(label, section);
        out.push(
            Extraction::new(label, text, section, confidence, AGENT_NAME)
                .with_span(start, end)
                .with_canonical(canonical)
                .with_meta(meta_key, json!(meta_value)),
        );
    }
}

impl Default for IdentifierAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for IdentifierAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let mut out: Vec<Extraction> = Vec::new();

        for caps in RRID.captures_iter(text) {
            if let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) {
                Self::emit(
                    &mut out,
                    EntityLabel::Rrid,
                    section,
                    whole.as_str(),
                    whole.start(),
                    whole.end(),
                    id.as_str(),
                    "id",
                    format!("RRID:{}", id.as_str()),
                );
            }
        }

        for caps in ROR.captures_iter(text) {
            if let (Some(whole), Some(id)) = (caps.get(0), caps.get(1)) {
                Self::emit(
                    &mut out,
                    EntityLabel::Ror,
                    section,
                    whole.as_str(),
                    whole.start(),
                    whole.end(),
                    id.as_str(),
                    "url",
                    format!("https://ror.org/{}", id.as_str()),
                );
            }
        }

        for m in PROTOCOLS_IO_DOI.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Protocol,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "url",
                format!("https://doi.org/{}", m.as_str()),
            );
        }
        for m in PROTOCOLS_IO_URL.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Protocol,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "url",
                m.as_str().to_string(),
            );
        }

        for caps in ZENODO_DOI.captures_iter(text) {
            if let (Some(whole), Some(record)) = (caps.get(0), caps.get(1)) {
                Self::emit(
                    &mut out,
                    EntityLabel::Repository,
                    section,
                    whole.as_str(),
                    whole.start(),
                    whole.end(),
                    &format!("zenodo.{}", record.as_str()),
                    "url",
                    format!("https://doi.org/{}", whole.as_str()),
                );
            }
        }
        for caps in ZENODO_URL.captures_iter(text) {
            if let (Some(whole), Some(record)) = (caps.get(0), caps.get(1)) {
                Self::emit(
                    &mut out,
                    EntityLabel::Repository,
                    section,
                    whole.as_str(),
                    whole.start(),
                    whole.end(),
                    &format!("zenodo.{}", record.as_str()),
                    "url",
                    whole.as_str().to_string(),
                );
            }
        }
        for m in FIGSHARE_DOI.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Repository,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "url",
                format!("https://doi.org/{}", m.as_str()),
            );
        }
        for m in EMPIAR.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Repository,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "url",
                format!("https://www.ebi.ac.uk/empiar/{}", m.as_str()),
            );
        }
        for m in IDR.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Repository,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "id",
                m.as_str().to_string(),
            );
        }
        for m in BIOIMAGE_ARCHIVE.find_iter(text) {
            Self::emit(
                &mut out,
                EntityLabel::Repository,
                section,
                m.as_str(),
                m.start(),
                m.end(),
                m.as_str(),
                "id",
                m.as_str().to_string(),
            );
        }
        for m in GITHUB.find_iter(text) {
            let url = m.as_str().trim_end_matches(&['.', ',', ')'][..]);
            Self::emit(
                &mut out,
                EntityLabel::Repository,
                section,
                url,
                m.start(),
                m.start() + url.len(),
                url,
                "url",
                url.to_string(),
            );
        }

        dedupe_extractions(out)
    }
}
