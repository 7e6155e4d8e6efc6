//! Microscopy-technique extraction.
//!
//! Full technique names come from the gazetteer. Acronyms are matched only
//! under the strict-context rule: the expansion must appear somewhere in
//! the text, or the acronym must sit immediately next to a microscopy
//! context word ("STED microscopy", "TEM grid"). A bare standalone acronym
//! never matches; incidental collisions ("SIM" as simulation) cost more
//! than the recall they would buy.

use std::sync::LazyLock;

use regex::Regex;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::{word_bounded, Gazetteer};
use crate::ExtractionAgent;

const AGENT_NAME: &str = "technique";

const TECHNIQUES: &[(&str, &str)] = &[
    ("confocal microscopy", "Confocal Microscopy"),
    ("confocal microscope", "Confocal Microscopy"),
    ("confocal imaging", "Confocal Microscopy"),
    ("confocal laser scanning microscopy", "Confocal Microscopy"),
    ("laser scanning confocal", "Confocal Microscopy"),
    ("spinning disk confocal", "Spinning Disk Confocal Microscopy"),
    ("spinning-disk confocal", "Spinning Disk Confocal Microscopy"),
    ("two-photon microscopy", "Two-Photon Microscopy"),
    ("two-photon imaging", "Two-Photon Microscopy"),
    ("2-photon microscopy", "Two-Photon Microscopy"),
    ("multiphoton microscopy", "Multiphoton Microscopy"),
    ("light sheet microscopy", "Light Sheet Microscopy"),
    ("light-sheet microscopy", "Light Sheet Microscopy"),
    ("lattice light sheet", "Lattice Light Sheet Microscopy"),
    ("lattice light-sheet", "Lattice Light Sheet Microscopy"),
    ("selective plane illumination microscopy", "Light Sheet Microscopy"),
    ("super-resolution microscopy", "Super-Resolution Microscopy"),
    ("super resolution microscopy", "Super-Resolution Microscopy"),
    ("stimulated emission depletion", "STED Microscopy"),
    ("structured illumination microscopy", "Structured Illumination Microscopy"),
    ("stochastic optical reconstruction microscopy", "STORM"),
    ("photoactivated localization microscopy", "PALM"),
    ("single-molecule localization microscopy", "Single-Molecule Localization Microscopy"),
    ("total internal reflection fluorescence", "TIRF Microscopy"),
    ("transmission electron microscopy", "Transmission Electron Microscopy"),
    ("scanning electron microscopy", "Scanning Electron Microscopy"),
    ("cryo-electron microscopy", "Cryo-Electron Microscopy"),
    ("cryo-electron tomography", "Cryo-Electron Tomography"),
    ("cryo-em", "Cryo-Electron Microscopy"),
    ("electron tomography", "Electron Tomography"),
    ("atomic force microscopy", "Atomic Force Microscopy"),
    ("fluorescence recovery after photobleaching", "FRAP"),
    ("fluorescence resonance energy transfer", "FRET"),
    ("förster resonance energy transfer", "FRET"),
    ("fluorescence lifetime imaging", "FLIM"),
    ("fluorescence correlation spectroscopy", "FCS"),
    ("expansion microscopy", "Expansion Microscopy"),
    ("widefield microscopy", "Widefield Microscopy"),
    ("wide-field microscopy", "Widefield Microscopy"),
    ("widefield fluorescence microscopy", "Widefield Microscopy"),
    ("epifluorescence microscopy", "Epifluorescence Microscopy"),
    ("epifluorescence", "Epifluorescence Microscopy"),
    ("fluorescence microscopy", "Fluorescence Microscopy"),
    ("phase contrast microscopy", "Phase Contrast Microscopy"),
    ("phase-contrast microscopy", "Phase Contrast Microscopy"),
    ("differential interference contrast", "DIC Microscopy"),
    ("airyscan", "Airyscan Microscopy"),
    ("immunofluorescence", "Immunofluorescence"),
    ("live-cell imaging", "Live-Cell Imaging"),
    ("live cell imaging", "Live-Cell Imaging"),
    ("time-lapse imaging", "Time-Lapse Imaging"),
    ("time-lapse microscopy", "Time-Lapse Imaging"),
    ("calcium imaging", "Calcium Imaging"),
    ("intravital microscopy", "Intravital Microscopy"),
    ("correlative light and electron microscopy", "Correlative Light and Electron Microscopy"),
    ("optical coherence tomography", "Optical Coherence Tomography"),
    ("raman microscopy", "Raman Microscopy"),
    ("second harmonic generation", "Second Harmonic Generation Imaging"),
];

/// (acronym, canonical, expansion fragment that licenses a bare match).
const ACRONYMS: &[(&str, &str, &str)] = &[
    ("STED", "STED Microscopy", "stimulated emission depletion"),
    ("SIM", "Structured Illumination Microscopy", "structured illumination"),
    ("STORM", "STORM", "stochastic optical reconstruction"),
    ("dSTORM", "STORM", "stochastic optical reconstruction"),
    ("PALM", "PALM", "photoactivated localization"),
    ("SMLM", "Single-Molecule Localization Microscopy", "single-molecule localization"),
    ("TIRF", "TIRF Microscopy", "total internal reflection"),
    ("TEM", "Transmission Electron Microscopy", "transmission electron"),
    ("SEM", "Scanning Electron Microscopy", "scanning electron"),
    ("AFM", "Atomic Force Microscopy", "atomic force"),
    ("FRET", "FRET", "resonance energy transfer"),
    ("FRAP", "FRAP", "recovery after photobleaching"),
    ("FLIM", "FLIM", "fluorescence lifetime"),
    ("FCS", "FCS", "fluorescence correlation"),
    ("DIC", "DIC Microscopy", "differential interference contrast"),
    ("ExM", "Expansion Microscopy", "expansion microscopy"),
    ("SPIM", "Light Sheet Microscopy", "selective plane illumination"),
    ("CLEM", "Correlative Light and Electron Microscopy", "correlative light and electron"),
    ("OCT", "Optical Coherence Tomography", "optical coherence"),
    ("SHG", "Second Harmonic Generation Imaging", "second harmonic"),
];

/// Words that license an adjacent acronym.
const CONTEXT_WORDS: &[&str] = &[
    "microscopy",
    "microscope",
    "imaging",
    "image",
    "images",
    "imaged",
    "nanoscopy",
    "resolution",
    "acquisition",
    "grid",
    "grids",
    "section",
    "sections",
    "micrograph",
    "micrographs",
    "experiment",
    "experiments",
    "measurement",
    "measurements",
];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z-]+").expect("word pattern"));

pub struct TechniqueAgent {
    gazetteer: Gazetteer,
}

impl TechniqueAgent {
    pub fn new() -> Self {
        Self {
            gazetteer: Gazetteer::new(TECHNIQUES),
        }
    }

    fn acronym_matches(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let lower = text.to_lowercase();
        let confidence = agent_confidence(EntityLabel::MicroscopyTechnique, section);

        for (acronym, canonical, expansion) in ACRONYMS {
            let expansion_present = lower.contains(expansion);
            // Acronyms are matched case-sensitively; "sim" the word is not
            // "SIM" the technique.
            for (start, _) in text.match_indices(acronym) {
                let end = start + acronym.len();
                if !word_bounded(text, start, end) {
                    continue;
                }
                if !expansion_present && !has_adjacent_context(text, start, end) {
                    continue;
                }
                out.push(
                    Extraction::new(
                        EntityLabel::MicroscopyTechnique,
                        *acronym,
                        section,
                        confidence,
                        AGENT_NAME,
                    )
                    .with_span(start, end)
                    .with_canonical(*canonical),
                );
            }
        }
    }
}

impl Default for TechniqueAgent {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the word directly before or after the span is a microscopy
/// context word.
fn has_adjacent_context(text: &str, start: usize, end: usize) -> bool {
    let after = &text[end..];
    if let Some(m) = WORD.find(after) {
        // Only immediate adjacency counts; a context word further along the
        // sentence does not license the acronym.
        if after[..m.start()].chars().all(|c| c.is_whitespace() || c == '-')
            && CONTEXT_WORDS.contains(&m.as_str().to_lowercase().as_str())
        {
            return true;
        }
    }
    let before = &text[..start];
    if let Some(m) = WORD.find_iter(before).last() {
        if before[m.end()..].chars().all(|c| c.is_whitespace() || c == '-')
            && CONTEXT_WORDS.contains(&m.as_str().to_lowercase().as_str())
        {
            return true;
        }
    }
    false
}

impl ExtractionAgent for TechniqueAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::MicroscopyTechnique, section);
        let mut out: Vec<Extraction> = self
            .gazetteer
            .find(text)
            .into_iter()
            .map(|hit| {
                Extraction::new(
                    EntityLabel::MicroscopyTechnique,
                    hit.text,
                    section,
                    confidence,
                    AGENT_NAME,
                )
                .with_span(hit.start, hit.end)
                .with_canonical(hit.canonical)
            })
            .collect();

        self.acronym_matches(text, section, &mut out);
        dedupe_extractions(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<Extraction> {
        TechniqueAgent::new().analyze(text, SectionType::Methods)
    }

    #[test]
    fn bare_acronym_never_matches() {
        assert!(analyze("STED resolves structures.").is_empty());
        assert!(analyze("The SIM results were inconclusive.").is_empty());
    }

    #[test]
    fn acronym_with_adjacent_context_matches_once() {
        let extractions = analyze("STED microscopy resolves structures.");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "STED Microscopy");
    }

    #[test]
    fn acronym_with_expansion_elsewhere_matches() {
        let extractions = analyze(
            "Stimulated emission depletion was applied. STED achieved 40 nm precision.",
        );
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "STED Microscopy");
    }

    #[test]
    fn acronym_inside_longer_token_is_ignored() {
        assert!(analyze("the SIMULATION parameters were fixed").is_empty());
    }

    #[test]
    fn tem_grid_is_enough_context() {
        let extractions = analyze("Samples were mounted on TEM grids.");
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "Transmission Electron Microscopy");
    }

    #[test]
    fn full_names_match_from_gazetteer() {
        let extractions = analyze("We performed confocal microscopy and light-sheet microscopy.");
        let canonicals: Vec<&str> = extractions.iter().map(|e| e.canonical()).collect();
        assert!(canonicals.contains(&"Confocal Microscopy"));
        assert!(canonicals.contains(&"Light Sheet Microscopy"));
    }

    #[test]
    fn confidence_tracks_section() {
        let methods = analyze("confocal microscopy");
        let discussion =
            TechniqueAgent::new().analyze("confocal microscopy", SectionType::Discussion);
        assert!(methods[0].confidence > discussion[0].confidence);
    }
}
