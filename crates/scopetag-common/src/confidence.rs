//! Static confidence tables.
//!
//! Two consumers, two tables: extraction agents consult
//! [`agent_confidence`] ("is this mention plausible here"), the role
//! classifier consults [`section_usage_weight`] ("does this section imply
//! the entity was genuinely used"). The numbers are kept consistent in
//! spirit but are deliberately separate lookups.

use crate::entities::{EntityLabel, SectionType};

/// Prior confidence for an entity of `label` mentioned in `section`.
///
/// Specific (label, section) pairs override the per-section default;
/// unrecognized sections fall back to 0.70.
pub fn agent_confidence(label: EntityLabel, section: SectionType) -> f32 {
    use EntityLabel::*;
    use SectionType::*;

    match (label, section) {
        // Methods mentions are near-certain usage for hardware and dyes.
        (MicroscopyTechnique, Methods) => 0.95,
        (Equipment, Methods)           => 0.95,
        (MicroscopeBrand, Methods)     => 0.95,
        (Fluorophore, Methods)         => 0.95,
        (CellLine, Methods)            => 0.95,
        (Software, Methods)            => 0.90,
        (SamplePrep, Methods)          => 0.90,

        // Organisms named in the title or abstract are almost always the
        // study subject.
        (Organism, Title)    => 0.95,
        (Organism, Abstract) => 0.90,

        (MicroscopyTechnique, Title)    => 0.85,
        (MicroscopyTechnique, Abstract) => 0.85,

        // Figure captions are a disproportionately rich source of
        // equipment and technique detail.
        (Equipment, FigureCaption)           => 0.85,
        (MicroscopeBrand, FigureCaption)     => 0.85,
        (MicroscopyTechnique, FigureCaption) => 0.80,
        (Fluorophore, FigureCaption)         => 0.80,

        (MicroscopyTechnique, Results) => 0.85,
        (Fluorophore, Results)         => 0.80,

        // Antibody hosts sit in their own lower band regardless of section.
        (AntibodySource, Methods) => 0.70,
        (AntibodySource, _)       => 0.50,

        // Background sections are dominated by citations.
        (MicroscopyTechnique, Introduction) => 0.25,
        (MicroscopyTechnique, Discussion)   => 0.25,

        _ => default_section_confidence(section),
    }
}

/// Default prior by section when no (label, section) override exists.
fn default_section_confidence(section: SectionType) -> f32 {
    match section {
        SectionType::Methods          => 0.90,
        SectionType::Results          => 0.80,
        SectionType::Title            => 0.75,
        SectionType::Abstract         => 0.75,
        SectionType::FigureCaption    => 0.70,
        SectionType::Introduction     => 0.30,
        SectionType::Discussion       => 0.30,
        SectionType::DataAvailability => 0.20,
        SectionType::References       => 0.0,
        SectionType::FullText         => 0.70,
        SectionType::Other            => 0.70,
    }
}

/// Prior probability that a mention in `section` reflects genuine usage.
///
/// Consumed by the role classifier. References score 0.0 by
/// definition; the segmenter drops them upstream, this entry exists so the
/// table is total. Unknown sections get a default strictly between 0 and 1.
pub fn section_usage_weight(section: SectionType) -> f32 {
    match section {
        SectionType::Methods          => 1.0,
        SectionType::Results          => 0.85,
        SectionType::FigureCaption    => 0.80,
        SectionType::Abstract         => 0.70,
        SectionType::Title            => 0.70,
        SectionType::FullText         => 0.60,
        SectionType::Discussion       => 0.30,
        SectionType::Introduction     => 0.20,
        SectionType::DataAvailability => 0.20,
        SectionType::References       => 0.0,
        SectionType::Other            => 0.50,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_priors_in_unit_interval() {
        let labels = [
            EntityLabel::MicroscopyTechnique,
            EntityLabel::Equipment,
            EntityLabel::MicroscopeBrand,
            EntityLabel::Fluorophore,
            EntityLabel::Organism,
            EntityLabel::AntibodySource,
            EntityLabel::Software,
            EntityLabel::SamplePrep,
            EntityLabel::CellLine,
        ];
        let sections = [
            SectionType::Title,
            SectionType::Abstract,
            SectionType::Introduction,
            SectionType::Methods,
            SectionType::Results,
            SectionType::Discussion,
            SectionType::FigureCaption,
            SectionType::DataAvailability,
            SectionType::FullText,
            SectionType::Other,
        ];
        for label in labels {
            for section in sections {
                let c = agent_confidence(label, section);
                assert!((0.0..=1.0).contains(&c), "{label:?} x {section:?} = {c}");
            }
        }
    }

    #[test]
    fn methods_outweigh_discussion_everywhere() {
        for label in [
            EntityLabel::MicroscopyTechnique,
            EntityLabel::Equipment,
            EntityLabel::Fluorophore,
            EntityLabel::Software,
        ] {
            assert!(
                agent_confidence(label, SectionType::Methods)
                    > agent_confidence(label, SectionType::Discussion)
            );
        }
    }

    #[test]
    fn organism_in_title_is_study_subject() {
        assert_eq!(agent_confidence(EntityLabel::Organism, SectionType::Title), 0.95);
    }

    #[test]
    fn usage_weights_match_design() {
        assert_eq!(section_usage_weight(SectionType::Methods), 1.0);
        assert_eq!(section_usage_weight(SectionType::References), 0.0);
        let unknown = section_usage_weight(SectionType::Other);
        assert!(unknown > 0.0 && unknown < 1.0);
    }
}
