//! scopetag-agents — Entity-recognition agents for microscopy metadata.
//!
//! One agent per entity family, all behind the same [`ExtractionAgent`]
//! contract: dictionary/gazetteer match first, regex patterns for templated
//! names the dictionary cannot enumerate, strict-context rules for
//! ambiguous acronyms. Precision over recall throughout; a missed mention
//! is recoverable downstream, a false tag is not.

mod cell_line;
mod equipment;
mod fluorophore;
pub mod gazetteer;
mod identifiers;
mod institution;
mod organism;
mod sample_prep;
mod software;
mod technique;

pub use cell_line::CellLineAgent;
pub use equipment::EquipmentAgent;
pub use fluorophore::FluorophoreAgent;
pub use identifiers::IdentifierAgent;
pub use institution::InstitutionAgent;
pub use organism::OrganismAgent;
pub use sample_prep::SamplePrepAgent;
pub use software::SoftwareAgent;
pub use technique::TechniqueAgent;

use scopetag_common::{Extraction, SectionType};

/// Common contract for all entity-family agents.
///
/// `analyze` is pure and total: malformed text yields an empty list, never
/// a panic or an error, and identical inputs always produce identical
/// output.
pub trait ExtractionAgent: Send + Sync {
    fn name(&self) -> &'static str;
    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction>;
}

/// The fixed agent set the orchestrator dispatches over section text.
/// Institution extraction is not included: it runs over affiliation
/// strings only, via [`InstitutionAgent::analyze_affiliations`].
pub fn default_agents() -> Vec<Box<dyn ExtractionAgent>> {
    vec![
        Box::new(TechniqueAgent::new()),
        Box::new(EquipmentAgent::new()),
        Box::new(FluorophoreAgent::new()),
        Box::new(OrganismAgent::new()),
        Box::new(SoftwareAgent::new()),
        Box::new(SamplePrepAgent::new()),
        Box::new(CellLineAgent::new()),
        Box::new(IdentifierAgent::new()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agents_are_total_on_garbage_input() {
        for agent in default_agents() {
            assert!(agent.analyze("", SectionType::Methods).is_empty());
            // Non-English, control characters, unpaired brackets.
            let garbage = "\u{0000}\u{FFFD} 显微镜 [[[ ]]] ----";
            let _ = agent.analyze(garbage, SectionType::Methods);
        }
    }

    #[test]
    fn agent_output_is_idempotent() {
        let text = "We used STED microscopy with Alexa Fluor 488 on Mus musculus tissue in ImageJ.";
        for agent in default_agents() {
            let a = agent.analyze(text, SectionType::Methods);
            let b = agent.analyze(text, SectionType::Methods);
            assert_eq!(a.len(), b.len(), "agent {} not idempotent", agent.name());
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.canonical(), y.canonical());
                assert_eq!(x.confidence, y.confidence);
            }
        }
    }

    #[test]
    fn no_agent_emits_duplicate_label_canonical_pairs() {
        let text = "Confocal microscopy and confocal imaging with GFP, eGFP, Alexa 488 and Alexa Fluor 488 in ImageJ and Fiji.";
        for agent in default_agents() {
            let extractions = agent.analyze(text, SectionType::Methods);
            let mut keys: Vec<(scopetag_common::EntityLabel, String)> = extractions
                .iter()
                .map(|e| (e.label, e.canonical().to_lowercase()))
                .collect();
            let before = keys.len();
            keys.sort();
            keys.dedup();
            assert_eq!(before, keys.len(), "agent {} emitted duplicates", agent.name());
        }
    }
}
