//! Cell line extraction from a curated gazetteer, with an optional ATCC
//! catalogue number picked up from the trailing context.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::{tail_window, Gazetteer};
use crate::ExtractionAgent;

const AGENT_NAME: &str = "cell_line";

const CELL_LINES: &[(&str, &str)] = &[
    ("HeLa", "HeLa"),
    ("HEK293", "HEK293"),
    ("HEK 293", "HEK293"),
    ("HEK293T", "HEK293T"),
    ("HEK 293T", "HEK293T"),
    ("U2OS", "U2OS"),
    ("U-2 OS", "U2OS"),
    ("COS-7", "COS-7"),
    ("COS7", "COS-7"),
    ("NIH 3T3", "NIH 3T3"),
    ("NIH/3T3", "NIH 3T3"),
    ("NIH-3T3", "NIH 3T3"),
    ("3T3 cells", "NIH 3T3"),
    ("CHO cells", "CHO"),
    ("CHO-K1", "CHO-K1"),
    ("MDCK", "MDCK"),
    ("A549", "A549"),
    ("MCF-7", "MCF-7"),
    ("MCF7", "MCF-7"),
    ("HCT116", "HCT116"),
    ("SH-SY5Y", "SH-SY5Y"),
    ("PC12", "PC12"),
    ("PC-12", "PC12"),
    ("Jurkat", "Jurkat"),
    ("RPE-1", "RPE-1"),
    ("hTERT RPE-1", "RPE-1"),
    ("HUVEC", "HUVEC"),
    ("Caco-2", "Caco-2"),
    ("Vero", "Vero"),
    ("K562", "K562"),
    ("HepG2", "HepG2"),
    ("U87", "U87"),
    ("U-87 MG", "U87"),
    ("Neuro-2a", "Neuro-2a"),
    ("N2a cells", "Neuro-2a"),
    ("SW480", "SW480"),
    ("HT-29", "HT-29"),
    ("MDA-MB-231", "MDA-MB-231"),
    ("BHK-21", "BHK-21"),
    ("Sf9", "Sf9"),
    ("S2 cells", "Drosophila S2"),
];

/// ATCC catalogue reference shortly after the line name, e.g.
/// "HeLa (ATCC CCL-2)".
static ATCC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"ATCC[\s:#]*((?:[A-Z]{2,4}-)?[A-Z]*\d+(?:-\d+)?(?:\.\d+)?)").expect("ATCC pattern")
});

pub struct CellLineAgent {
    lines: Gazetteer,
}

impl CellLineAgent {
    pub fn new() -> Self {
        Self {
            lines: Gazetteer::new(CELL_LINES),
        }
    }
}

impl Default for CellLineAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for CellLineAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::CellLine, section);
        let mut out: Vec<Extraction> = Vec::new();

        for hit in self.lines.find(text) {
            let mut extraction =
                Extraction::new(EntityLabel::CellLine, hit.text, section, confidence, AGENT_NAME)
                    .with_span(hit.start, hit.end)
                    .with_canonical(hit.canonical);

            let tail = tail_window(text, hit.end, 40);
            if let Some(caps) = ATCC.captures(tail) {
                if let Some(id) = caps.get(1) {
                    extraction = extraction.with_meta("atcc", json!(id.as_str()));
                }
            }
            out.push(extraction);
        }

        dedupe_extractions(out)
    }
}
