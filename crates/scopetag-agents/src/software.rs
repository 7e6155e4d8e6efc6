//! Acquisition and analysis software extraction, with version capture.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::{tail_window, Gazetteer};
use crate::ExtractionAgent;

const AGENT_NAME: &str = "software";

const PACKAGES: &[(&str, &str)] = &[
    ("ImageJ", "ImageJ"),
    ("Fiji", "Fiji"),
    ("ZEN", "ZEN"),
    ("ZEN Blue", "ZEN"),
    ("ZEN Black", "ZEN"),
    ("Imaris", "Imaris"),
    ("LAS X", "LAS X"),
    ("LASX", "LAS X"),
    ("LAS AF", "LAS AF"),
    ("NIS-Elements", "NIS-Elements"),
    ("NIS Elements", "NIS-Elements"),
    ("MetaMorph", "MetaMorph"),
    ("Micro-Manager", "Micro-Manager"),
    ("MicroManager", "Micro-Manager"),
    ("micromanager", "Micro-Manager"),
    ("CellProfiler", "CellProfiler"),
    ("napari", "napari"),
    ("ilastik", "ilastik"),
    ("MATLAB", "MATLAB"),
    ("Python", "Python"),
    ("Huygens", "Huygens"),
    ("Volocity", "Volocity"),
    ("Amira", "Amira"),
    ("SlideBook", "SlideBook"),
    ("cellSens", "cellSens"),
    ("FlowJo", "FlowJo"),
    ("GraphPad Prism", "GraphPad Prism"),
    ("Prism", "GraphPad Prism"),
    ("ThunderSTORM", "ThunderSTORM"),
    ("TrackMate", "TrackMate"),
    ("StarDist", "StarDist"),
    ("Cellpose", "Cellpose"),
    ("DeconvolutionLab", "DeconvolutionLab"),
    ("ZEISS ZEN", "ZEN"),
];

/// Version token directly after a package name: "2.3", "v1.53c",
/// "version 10.1.2". A bare integer needs an explicit v/version marker.
static VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\s,(]*(?:v(?:ersion)?\.?\s*(\d[\w.]*)|(\d+\.\d[\w.]*))").expect("version pattern")
});

pub struct SoftwareAgent {
    packages: Gazetteer,
}

impl SoftwareAgent {
    pub fn new() -> Self {
        Self {
            packages: Gazetteer::new(PACKAGES),
        }
    }
}

impl Default for SoftwareAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for SoftwareAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::Software, section);
        let mut out: Vec<Extraction> = Vec::new();

        for hit in self.packages.find(text) {
            let mut extraction =
                Extraction::new(EntityLabel::Software, hit.text, section, confidence, AGENT_NAME)
                    .with_span(hit.start, hit.end)
                    .with_canonical(hit.canonical);

            let tail = tail_window(text, hit.end, 24);
            if let Some(caps) = VERSION.captures(tail) {
                let version = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                if !version.is_empty() {
                    extraction = extraction.with_meta("version", json!(version));
                }
            }
            out.push(extraction);
        }

        dedupe_extractions(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<Extraction> {
        SoftwareAgent::new().analyze(text, SectionType::Methods)
    }

    #[test]
    fn zen_blue_canonicalizes_to_zen() {
        let extractions = analyze("Images were acquired in ZEN Blue.");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "ZEN");
        assert_eq!(extractions[0].text, "ZEN Blue");
    }

    #[test]
    fn version_number_captured() {
        let extractions = analyze("processed in ImageJ 1.53c and Imaris v9.7");
        let imagej = extractions.iter().find(|e| e.canonical() == "ImageJ").unwrap();
        assert_eq!(imagej.metadata["version"], json!("1.53c"));
        let imaris = extractions.iter().find(|e| e.canonical() == "Imaris").unwrap();
        assert_eq!(imaris.metadata["version"], json!("9.7"));
    }

    #[test]
    fn bare_integer_is_not_a_version() {
        let extractions = analyze("analysed in Fiji 3 independent times");
        let fiji = extractions.iter().find(|e| e.canonical() == "Fiji").unwrap();
        assert!(!fiji.metadata.contains_key("version"));
    }

    #[test]
    fn multibyte_character_in_version_lookahead() {
        // The µ sits exactly where a byte-offset window would split it.
        let extractions = analyze("analysed in Fiji with pixel size of 0.5µm sections");
        let fiji = extractions.iter().find(|e| e.canonical() == "Fiji").unwrap();
        assert!(!fiji.metadata.contains_key("version"));
    }

    #[test]
    fn prism_aliases_to_graphpad() {
        let extractions = analyze("statistics in GraphPad Prism 9");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "GraphPad Prism");
    }
}
