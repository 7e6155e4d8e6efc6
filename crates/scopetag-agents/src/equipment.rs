//! Equipment and brand extraction.
//!
//! Brands come from a gazetteer; instrument models, objectives, lasers and
//! detectors come from templated patterns that also pull out structured
//! metadata (wavelength, magnification, numerical aperture, immersion).

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::Gazetteer;
use crate::ExtractionAgent;

const AGENT_NAME: &str = "equipment";

const BRANDS: &[(&str, &str)] = &[
    ("Zeiss", "Zeiss"),
    ("Carl Zeiss", "Zeiss"),
    ("Leica", "Leica"),
    ("Leica Microsystems", "Leica"),
    ("Nikon", "Nikon"),
    ("Olympus", "Olympus"),
    ("Andor", "Andor"),
    ("Hamamatsu", "Hamamatsu"),
    ("Photometrics", "Photometrics"),
    ("Yokogawa", "Yokogawa"),
    ("PerkinElmer", "PerkinElmer"),
    ("Bruker", "Bruker"),
    ("JEOL", "JEOL"),
    ("FEI", "FEI"),
    ("Thermo Fisher", "Thermo Fisher Scientific"),
    ("Thermo Fisher Scientific", "Thermo Fisher Scientific"),
    ("Chroma", "Chroma"),
    ("Semrock", "Semrock"),
    ("Coherent", "Coherent"),
    ("Thorlabs", "Thorlabs"),
];

const DETECTORS: &[(&str, &str)] = &[
    ("GaAsP detector", "GaAsP Detector"),
    ("GaAsP detectors", "GaAsP Detector"),
    ("photomultiplier tube", "Photomultiplier Tube"),
    ("photomultiplier tubes", "Photomultiplier Tube"),
    ("sCMOS camera", "sCMOS Camera"),
    ("sCMOS", "sCMOS Camera"),
    ("EMCCD camera", "EMCCD Camera"),
    ("EMCCD", "EMCCD Camera"),
    ("ORCA-Flash4.0", "Hamamatsu ORCA-Flash4.0"),
    ("ORCA-Fusion", "Hamamatsu ORCA-Fusion"),
    ("iXon", "Andor iXon"),
    ("Zyla", "Andor Zyla"),
    ("Prime 95B", "Photometrics Prime 95B"),
    ("CSU-W1", "Yokogawa CSU-W1"),
    ("CSU-X1", "Yokogawa CSU-X1"),
];

static LSM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bLSM\s?(\d{3})\b").expect("lsm pattern"));
static SP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Leica\s+)?TCS\s+SP(\d)\b|\bLeica\s+SP(\d)\b").expect("sp pattern"));
static STELLARIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bSTELLARIS\s?(\d)\b").expect("stellaris pattern"));
static ECLIPSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bEclipse\s+(Ti2?E?|TE\d{3,4}|Ni-?E?)\b").expect("eclipse pattern"));
static FLUOVIEW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:FluoView\s+)?FV(\d{3,4})\b").expect("fluoview pattern"));
static AXIO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bAxio\s?(Observer|Imager|Vert|Scan|Zoom)(?:\s?[A-Z0-9.]{1,4})?").expect("axio pattern")
});

static OBJECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d{1,3})\s?[x×]\s*/\s*(\d\.\d{1,2})(?:\s?NA)?(?:\s+(oil|water|glycerol|silicone|air))?",
    )
    .expect("objective pattern")
});

static LASER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{3,4})\s?nm\s+(?:laser|diode|excitation|line)").expect("laser pattern")
});

pub struct EquipmentAgent {
    brands: Gazetteer,
    detectors: Gazetteer,
}

impl EquipmentAgent {
    pub fn new() -> Self {
        Self {
            brands: Gazetteer::new(BRANDS),
            detectors: Gazetteer::new(DETECTORS),
        }
    }

    /// (canonical prefix including its joiner, pattern, brand).
    fn model_patterns() -> [(&'static str, &'static Regex, &'static str); 6] {
        [
            ("Zeiss LSM ", &LSM, "Zeiss"),
            ("Leica TCS SP", &SP, "Leica"),
            ("Leica STELLARIS ", &STELLARIS, "Leica"),
            ("Nikon Eclipse ", &ECLIPSE, "Nikon"),
            ("Olympus FluoView FV", &FLUOVIEW, "Olympus"),
            ("Zeiss Axio ", &AXIO, "Zeiss"),
        ]
    }

    fn model_matches(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let confidence = agent_confidence(EntityLabel::Equipment, section);
        for (prefix, regex, brand) in Self::model_patterns() {
            for caps in regex.captures_iter(text) {
                let Some(whole) = caps.get(0) else { continue };
                let number = caps
                    .iter()
                    .skip(1)
                    .flatten()
                    .next()
                    .map(|m| m.as_str())
                    .unwrap_or("");
                let canonical = format!("{prefix}{number}").trim_end().to_string();
                out.push(
                    Extraction::new(
                        EntityLabel::Equipment,
                        whole.as_str(),
                        section,
                        confidence,
                        AGENT_NAME,
                    )
                    .with_span(whole.start(), whole.end())
                    .with_canonical(canonical)
                    .with_meta("brand", json!(brand))
                    .with_meta("kind", json!("microscope")),
                );
            }
        }
    }

    fn objective_matches(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let confidence = agent_confidence(EntityLabel::Equipment, section);
        for caps in OBJECTIVE.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let magnification = &caps[1];
            let na = &caps[2];
            let mut extraction = Extraction::new(
                EntityLabel::Equipment,
                whole.as_str(),
                section,
                confidence,
                AGENT_NAME,
            )
            .with_span(whole.start(), whole.end())
            .with_canonical(format!("{magnification}x/{na} objective"))
            .with_meta("kind", json!("objective"))
            .with_meta("magnification", json!(magnification.parse::<u32>().ok()))
            .with_meta("numerical_aperture", json!(na.parse::<f64>().ok()));
            if let Some(immersion) = caps.get(3) {
                extraction = extraction.with_meta("immersion", json!(immersion.as_str().to_lowercase()));
            }
            out.push(extraction);
        }
    }

    fn laser_matches(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let confidence = agent_confidence(EntityLabel::Equipment, section);
        for caps in LASER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            let wavelength = &caps[1];
            out.push(
                Extraction::new(
                    EntityLabel::Equipment,
                    whole.as_str(),
                    section,
                    confidence,
                    AGENT_NAME,
                )
                .with_span(whole.start(), whole.end())
                .with_canonical(format!("{wavelength} nm laser"))
                .with_meta("kind", json!("laser"))
                .with_meta("wavelength_nm", json!(wavelength.parse::<u32>().ok())),
            );
        }
    }
}

impl Default for EquipmentAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for EquipmentAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let mut out: Vec<Extraction> = Vec::new();

        let brand_confidence = agent_confidence(EntityLabel::MicroscopeBrand, section);
        for hit in self.brands.find(text) {
            out.push(
                Extraction::new(
                    EntityLabel::MicroscopeBrand,
                    hit.text,
                    section,
                    brand_confidence,
                    AGENT_NAME,
                )
                .with_span(hit.start, hit.end)
                .with_canonical(hit.canonical),
            );
        }

        let detector_confidence = agent_confidence(EntityLabel::Equipment, section);
        for hit in self.detectors.find(text) {
            out.push(
                Extraction::new(
                    EntityLabel::Equipment,
                    hit.text,
                    section,
                    detector_confidence,
                    AGENT_NAME,
                )
                .with_span(hit.start, hit.end)
                .with_canonical(hit.canonical)
                .with_meta("kind", json!("detector")),
            );
        }

        self.model_matches(text, section, &mut out);
        self.objective_matches(text, section, &mut out);
        self.laser_matches(text, section, &mut out);
        dedupe_extractions(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<Extraction> {
        EquipmentAgent::new().analyze(text, SectionType::Methods)
    }

    fn canonicals(extractions: &[Extraction]) -> Vec<&str> {
        extractions.iter().map(|e| e.canonical()).collect()
    }

    #[test]
    fn brand_and_model_both_extracted() {
        let extractions = analyze("Images were collected on a Zeiss LSM 880 confocal microscope.");
        let names = canonicals(&extractions);
        assert!(names.contains(&"Zeiss"));
        assert!(names.contains(&"Zeiss LSM 880"));
        let model = extractions.iter().find(|e| e.canonical() == "Zeiss LSM 880").unwrap();
        assert_eq!(model.label, EntityLabel::Equipment);
        assert_eq!(model.metadata["brand"], json!("Zeiss"));
    }

    #[test]
    fn model_without_explicit_brand_still_resolves() {
        let extractions = analyze("acquired on a TCS SP8 system");
        assert!(canonicals(&extractions).contains(&"Leica TCS SP8"));
    }

    #[test]
    fn objective_metadata_parsed() {
        let extractions = analyze("using a 63x/1.4 NA oil objective");
        let objective = extractions
            .iter()
            .find(|e| e.metadata.get("kind") == Some(&json!("objective")))
            .unwrap();
        assert_eq!(objective.canonical(), "63x/1.4 objective");
        assert_eq!(objective.metadata["magnification"], json!(63));
        assert_eq!(objective.metadata["numerical_aperture"], json!(1.4));
        assert_eq!(objective.metadata["immersion"], json!("oil"));
    }

    #[test]
    fn laser_wavelength_captured() {
        let extractions = analyze("excited with a 488 nm laser");
        let laser = extractions
            .iter()
            .find(|e| e.metadata.get("kind") == Some(&json!("laser")))
            .unwrap();
        assert_eq!(laser.canonical(), "488 nm laser");
        assert_eq!(laser.metadata["wavelength_nm"], json!(488));
    }

    #[test]
    fn plain_wavelength_is_not_equipment() {
        // "488 nm" without an instrument word is a measurement, not a laser.
        let extractions = analyze("emission was collected at 525 nm.");
        assert!(extractions.is_empty());
    }

    #[test]
    fn detector_names_matched() {
        let extractions = analyze("detected with GaAsP detectors and an ORCA-Flash4.0 camera");
        let names = canonicals(&extractions);
        assert!(names.contains(&"GaAsP Detector"));
        assert!(names.contains(&"Hamamatsu ORCA-Flash4.0"));
    }
}
