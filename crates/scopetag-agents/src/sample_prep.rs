//! Sample preparation extraction: fixation, permeabilization, staining,
//! embedding and tissue clearing.
//!
//! Clearing protocol acronyms that collide with English words (CLARITY,
//! CUBIC) go through a case-sensitive pass instead of the gazetteer.

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::{word_bounded, Gazetteer};
use crate::ExtractionAgent;

const AGENT_NAME: &str = "sample_prep";

const PREPARATIONS: &[(&str, &str)] = &[
    ("paraformaldehyde", "Paraformaldehyde fixation"),
    ("PFA", "Paraformaldehyde fixation"),
    ("formaldehyde", "Formaldehyde fixation"),
    ("formalin", "Formalin fixation"),
    ("glutaraldehyde", "Glutaraldehyde fixation"),
    ("methanol fixation", "Methanol fixation"),
    ("methanol-fixed", "Methanol fixation"),
    ("acetone fixation", "Acetone fixation"),
    ("Triton X-100", "Triton X-100 permeabilization"),
    ("TritonX-100", "Triton X-100 permeabilization"),
    ("saponin", "Saponin permeabilization"),
    ("digitonin", "Digitonin permeabilization"),
    ("Tween 20", "Tween 20"),
    ("Tween-20", "Tween 20"),
    ("immunostaining", "Immunostaining"),
    ("immunohistochemistry", "Immunohistochemistry"),
    ("immunocytochemistry", "Immunocytochemistry"),
    ("immunofluorescence", "Immunofluorescence staining"),
    ("in situ hybridization", "In situ hybridization"),
    ("hematoxylin and eosin", "H&E staining"),
    ("H&E staining", "H&E staining"),
    ("Nissl staining", "Nissl staining"),
    ("negative staining", "Negative staining"),
    ("uranyl acetate", "Uranyl acetate staining"),
    ("osmium tetroxide", "Osmium tetroxide staining"),
    ("cryosection", "Cryosectioning"),
    ("cryosectioning", "Cryosectioning"),
    ("cryosections", "Cryosectioning"),
    ("vibratome", "Vibratome sectioning"),
    ("microtome", "Microtome sectioning"),
    ("ultramicrotome", "Ultramicrotome sectioning"),
    ("paraffin-embedded", "Paraffin embedding"),
    ("paraffin embedding", "Paraffin embedding"),
    ("OCT compound", "OCT embedding"),
    ("Epon", "Epon embedding"),
    ("LR White", "LR White embedding"),
    ("antigen retrieval", "Antigen retrieval"),
    ("high-pressure freezing", "High-pressure freezing"),
    ("freeze substitution", "Freeze substitution"),
    ("critical point drying", "Critical point drying"),
    ("sputter coating", "Sputter coating"),
    ("sputter-coated", "Sputter coating"),
    ("iDISCO", "iDISCO clearing"),
    ("uDISCO", "uDISCO clearing"),
    ("3DISCO", "3DISCO clearing"),
    ("Scale clearing", "ScaleS clearing"),
    ("ScaleS", "ScaleS clearing"),
    ("SeeDB", "SeeDB clearing"),
    ("tissue clearing", "Tissue clearing"),
    ("optical clearing", "Tissue clearing"),
    ("DAPI staining", "DAPI staining"),
    ("phalloidin staining", "Phalloidin staining"),
    ("Nile Red staining", "Nile Red staining"),
];

/// Case-sensitive protocols, matched literally so lowercase homographs
/// ("for clarity", "cubic micrometers") never fire.
const STRICT_CASE: &[(&str, &str)] = &[
    ("CLARITY", "CLARITY clearing"),
    ("CUBIC", "CUBIC clearing"),
    ("PACT", "PACT clearing"),
    ("SWITCH", "SWITCH clearing"),
];

pub struct SamplePrepAgent {
    preparations: Gazetteer,
}

impl SamplePrepAgent {
    pub fn new() -> Self {
        Self {
            preparations: Gazetteer::new(PREPARATIONS),
        }
    }

    fn strict_case_matches(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::SamplePrep, section);
        let mut out = Vec::new();
        for &(token, canonical) in STRICT_CASE {
            for (start, matched) in text.match_indices(token) {
                let end = start + matched.len();
                if !word_bounded(text, start, end) {
                    continue;
                }
                out.push(
                    Extraction::new(EntityLabel::SamplePrep, matched, section, confidence, AGENT_NAME)
                        .with_span(start, end)
                        .with_canonical(canonical),
                );
            }
        }
        out
    }
}

impl Default for SamplePrepAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for SamplePrepAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::SamplePrep, section);
        let mut out: Vec<Extraction> = self
            .preparations
            .find(text)
            .into_iter()
            .map(|hit| {
                Extraction::new(EntityLabel::SamplePrep, hit.text, section, confidence, AGENT_NAME)
                    .with_span(hit.start, hit.end)
                    .with_canonical(hit.canonical)
            })
            .collect();

        out.extend(self.strict_case_matches(text, section));
        dedupe_extractions(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<Extraction> {
        SamplePrepAgent::new().analyze(text, SectionType::Methods)
    }

    #[test]
    fn fixation_and_permeabilization() {
        let extractions =
            analyze("Cells were fixed in 4% paraformaldehyde and permeabilized with Triton X-100.");
        let canonicals: Vec<_> = extractions.iter().map(|e| e.canonical()).collect();
        assert!(canonicals.contains(&"Paraformaldehyde fixation"));
        assert!(canonicals.contains(&"Triton X-100 permeabilization"));
    }

    #[test]
    fn clarity_requires_uppercase() {
        assert!(analyze("For clarity, we omit the controls.").is_empty());
        let extractions = analyze("Brains were cleared with CLARITY.");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "CLARITY clearing");
    }

    #[test]
    fn cubic_homograph_is_ignored() {
        assert!(analyze("a volume of 2 cubic millimeters").is_empty());
    }

    #[test]
    fn idisco_is_case_preserving() {
        let extractions = analyze("whole-mount iDISCO clearing was performed");
        let canonicals: Vec<_> = extractions.iter().map(|e| e.canonical()).collect();
        assert!(canonicals.contains(&"iDISCO clearing"));
    }
}
