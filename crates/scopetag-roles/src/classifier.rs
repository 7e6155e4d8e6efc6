//! Scoring and verdicts.
//!
//! score = clamp(section_weight + sum(signal adjustments), 0, 1)
//!
//! Verdict precedence per mention: Negated > Compared > Used > Referenced
//! > Ambiguous. Consolidation across mentions of the same entity inverts
//! the top of that order: one genuine usage outweighs any number of
//! passing references.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use scopetag_common::config::RoleConfig;
use scopetag_common::confidence::section_usage_weight;
use scopetag_common::{ClassifiedExtraction, Extraction, Role};

use crate::signals::{detect_signals, SignalHits};

pub struct RoleClassifier {
    config: RoleConfig,
}

/// Corpus-level sanity check over the final tagged set.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct TaggingDiagnostics {
    /// Share of Used confidence mass from methods, results and captions.
    pub methods_results_share: f32,
    /// Share of Used confidence mass from introduction and discussion.
    pub intro_discussion_share: f32,
    pub over_tagging_warning: bool,
}

impl RoleClassifier {
    pub fn new(config: RoleConfig) -> Self {
        Self { config }
    }

    /// Classifies one mention against the text of the section it came from.
    /// Mentions without a span are judged on the whole section.
    pub fn classify(&self, extraction: &Extraction, section_text: &str) -> ClassifiedExtraction {
        let context = match extraction.span {
            Some(span) => context_window(section_text, span.start, span.end, self.config.context_window),
            None       => section_text,
        };
        let hits = detect_signals(context);
        let score = self.score(extraction, &hits);
        let role = self.verdict(score, &hits);
        let role_confidence = match role {
            Role::Negated | Role::Referenced => (1.0 - score).clamp(0.0, 1.0),
            _                                => score,
        };

        debug!(
            entity = extraction.canonical(),
            section = extraction.section.as_str(),
            role = role.as_str(),
            score,
            "classified mention"
        );

        ClassifiedExtraction {
            text: extraction.text.clone(),
            label: extraction.label,
            canonical: extraction.canonical().to_string(),
            section: extraction.section,
            confidence: extraction.confidence,
            source_agent: extraction.source_agent,
            role,
            role_confidence,
            role_signals: hits.names(),
            needs_review: false,
            metadata: extraction.metadata.clone(),
        }
    }

    fn score(&self, extraction: &Extraction, hits: &SignalHits) -> f32 {
        let mut score = section_usage_weight(extraction.section);
        if hits.usage_verb {
            score += self.config.usage_adjustment;
        }
        if hits.reference_verb {
            score += self.config.reference_adjustment;
        }
        if hits.citation_proximity {
            score += self.config.citation_adjustment;
        }
        if hits.negation {
            score += self.config.negation_adjustment;
        }
        if hits.comparison {
            score += self.config.comparison_adjustment;
        }
        score.clamp(0.0, 1.0)
    }

    fn verdict(&self, score: f32, hits: &SignalHits) -> Role {
        if hits.negation {
            Role::Negated
        } else if hits.comparison && !hits.usage_verb {
            Role::Compared
        } else if hits.usage_verb || (score >= self.config.used_threshold && !hits.any_negative()) {
            Role::Used
        } else if score <= self.config.referenced_threshold {
            Role::Referenced
        } else {
            Role::Ambiguous
        }
    }

    /// Collapses mentions of the same (label, canonical) entity into one
    /// verdict. A single Used mention dominates; Referenced only survives
    /// when nothing stronger was seen anywhere in the paper.
    pub fn consolidate(&self, classified: Vec<ClassifiedExtraction>) -> Vec<ClassifiedExtraction> {
        let mut best: BTreeMap<(scopetag_common::EntityLabel, String), usize> = BTreeMap::new();
        let mut result: Vec<ClassifiedExtraction> = Vec::new();

        for mention in classified {
            let key = (mention.label, mention.canonical.to_lowercase());
            match best.get(&key) {
                None => {
                    best.insert(key, result.len());
                    result.push(mention);
                }
                Some(&idx) => {
                    let incumbent = &result[idx];
                    let replace = consolidation_rank(mention.role) > consolidation_rank(incumbent.role)
                        || (mention.role == incumbent.role
                            && mention.role_confidence > incumbent.role_confidence);
                    if replace {
                        result[idx] = mention;
                    }
                }
            }
        }

        result
    }

    /// Keeps the entities that belong in the final tag set. Used verdicts
    /// pass outright; Compared and Ambiguous pass flagged for review when
    /// confident enough; Referenced and Negated never pass.
    pub fn filter_used_entities(
        &self,
        consolidated: &[ClassifiedExtraction],
    ) -> Vec<ClassifiedExtraction> {
        let mut out = Vec::new();
        for mention in consolidated {
            match mention.role {
                Role::Used => out.push(mention.clone()),
                Role::Compared | Role::Ambiguous => {
                    if mention.role_confidence >= self.config.review_threshold {
                        let mut kept = mention.clone();
                        kept.needs_review = true;
                        out.push(kept);
                    }
                }
                Role::Referenced | Role::Negated => {}
            }
        }
        out
    }

    /// Distribution check over Used confidence mass. A paper whose usage
    /// tags draw mostly on introduction/discussion text is a mis-tagging
    /// smell regardless of how each individual verdict was reached.
    pub fn validate_tagging_distribution(
        &self,
        consolidated: &[ClassifiedExtraction],
    ) -> TaggingDiagnostics {
        use scopetag_common::SectionType;

        let mut total = 0.0f32;
        let mut methods_results = 0.0f32;
        let mut intro_discussion = 0.0f32;

        for mention in consolidated.iter().filter(|m| m.role == Role::Used) {
            total += mention.confidence;
            match mention.section {
                SectionType::Methods | SectionType::Results | SectionType::FigureCaption => {
                    methods_results += mention.confidence;
                }
                SectionType::Introduction | SectionType::Discussion => {
                    intro_discussion += mention.confidence;
                }
                _ => {}
            }
        }

        if total <= f32::EPSILON {
            return TaggingDiagnostics::default();
        }

        let intro_discussion_share = intro_discussion / total;
        TaggingDiagnostics {
            methods_results_share: methods_results / total,
            intro_discussion_share,
            over_tagging_warning: intro_discussion_share > self.config.over_tagging_cutoff,
        }
    }
}

/// When mentions of one entity disagree, usage anywhere wins. Negation
/// beats the weaker reference-side verdicts so "we did not use X" is not
/// washed out by a background mention elsewhere.
fn consolidation_rank(role: Role) -> u8 {
    match role {
        Role::Used       => 4,
        Role::Negated    => 3,
        Role::Compared   => 2,
        Role::Ambiguous  => 1,
        Role::Referenced => 0,
    }
}

/// Byte window around a span, widened outward to char boundaries.
fn context_window(text: &str, start: usize, end: usize, window: usize) -> &str {
    let mut lo = start.saturating_sub(window).min(text.len());
    let mut hi = end.saturating_add(window).min(text.len());
    while lo > 0 && !text.is_char_boundary(lo) {
        lo -= 1;
    }
    while hi < text.len() && !text.is_char_boundary(hi) {
        hi += 1;
    }
    &text[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;
    use scopetag_common::{EntityLabel, SectionType};

    fn classifier() -> RoleClassifier {
        RoleClassifier::new(RoleConfig::default())
    }

    fn mention(
        canonical: &str,
        section: SectionType,
        text: &str,
        confidence: f32,
    ) -> ClassifiedExtraction {
        let start = text.find(canonical).unwrap_or(0);
        let extraction = Extraction::new(
            EntityLabel::MicroscopyTechnique,
            canonical,
            section,
            confidence,
            "technique",
        )
        .with_span(start, start + canonical.len())
        .with_canonical(canonical);
        classifier().classify(&extraction, text)
    }

    #[test]
    fn methods_usage_is_used() {
        let m = mention(
            "confocal microscopy",
            SectionType::Methods,
            "We used confocal microscopy with a 63x objective.",
            0.95,
        );
        assert_eq!(m.role, Role::Used);
        assert!(m.role_signals.contains(&"usage_verb".to_string()));
        assert!((m.role_confidence - 1.0).abs() < 1e-6);
    }

    #[test]
    fn discussion_reference_is_referenced() {
        let m = mention(
            "STED",
            SectionType::Discussion,
            "STED has also been used for similar studies.",
            0.25,
        );
        assert_eq!(m.role, Role::Referenced);
        // weight 0.30 + reference -0.20 = 0.10, verdict confidence 0.90
        assert!((m.role_confidence - 0.90).abs() < 1e-5);
    }

    #[test]
    fn negation_beats_section_weight() {
        let m = mention(
            "electron microscopy",
            SectionType::Methods,
            "Due to sample constraints, electron microscopy was not used.",
            0.95,
        );
        assert_eq!(m.role, Role::Negated);
    }

    #[test]
    fn comparison_without_usage_is_compared() {
        let m = mention(
            "STORM",
            SectionType::Results,
            "Our resolution is higher compared to STORM reconstructions.",
            0.8,
        );
        assert_eq!(m.role, Role::Compared);
    }

    #[test]
    fn bare_methods_mention_is_used_by_section_weight() {
        let m = mention(
            "confocal microscopy",
            SectionType::Methods,
            "Samples: confocal microscopy, 37C, phenol-red-free medium.",
            0.95,
        );
        assert_eq!(m.role, Role::Used);
    }

    #[test]
    fn intro_bare_mention_is_referenced() {
        let m = mention(
            "STED",
            SectionType::Introduction,
            "Advances such as STED pushed resolution below the diffraction limit.",
            0.25,
        );
        assert_eq!(m.role, Role::Referenced);
    }

    #[test]
    fn consolidation_prefers_used_over_referenced() {
        let used = mention(
            "STED",
            SectionType::Methods,
            "STED imaging was performed on the fixed samples.",
            0.95,
        );
        let referenced = mention(
            "STED",
            SectionType::Introduction,
            "STED has been used to resolve synaptic proteins.",
            0.25,
        );
        let consolidated = classifier().consolidate(vec![referenced, used]);
        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].role, Role::Used);
        assert_eq!(consolidated[0].section, SectionType::Methods);
    }

    #[test]
    fn filter_drops_negated_and_referenced() {
        let used = mention(
            "confocal microscopy",
            SectionType::Methods,
            "We used confocal microscopy.",
            0.95,
        );
        let negated = mention(
            "electron microscopy",
            SectionType::Methods,
            "electron microscopy was not used",
            0.95,
        );
        let referenced = mention(
            "STORM",
            SectionType::Discussion,
            "STORM has also been used elsewhere.",
            0.25,
        );
        let c = classifier();
        let consolidated = c.consolidate(vec![used, negated, referenced]);
        let kept = c.filter_used_entities(&consolidated);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].canonical, "confocal microscopy");
        assert!(!kept[0].needs_review);
    }

    #[test]
    fn confident_ambiguous_survives_flagged_for_review() {
        // Results weight 0.85 with a reference cue lands between the two
        // thresholds: ambiguous, above the review bar.
        let m = mention(
            "light sheet microscopy",
            SectionType::Results,
            "light sheet microscopy has also been used in parallel experiments here.",
            0.8,
        );
        assert_eq!(m.role, Role::Ambiguous);
        let c = classifier();
        let kept = c.filter_used_entities(&[m]);
        assert_eq!(kept.len(), 1);
        assert!(kept[0].needs_review);
    }

    #[test]
    fn over_tagging_warning_fires_on_intro_heavy_mass() {
        let intro = mention(
            "STED",
            SectionType::Introduction,
            "We used STED in a previous project.",
            0.70,
        );
        let methods = mention(
            "confocal microscopy",
            SectionType::Methods,
            "We used confocal microscopy.",
            0.20,
        );
        assert_eq!(intro.role, Role::Used);
        let c = classifier();
        let diag = c.validate_tagging_distribution(&[intro, methods]);
        assert!(diag.intro_discussion_share > 0.7);
        assert!(diag.over_tagging_warning);
    }

    #[test]
    fn methods_heavy_mass_passes_validation() {
        let a = mention(
            "confocal microscopy",
            SectionType::Methods,
            "We used confocal microscopy.",
            0.95,
        );
        let b = mention(
            "STED",
            SectionType::Results,
            "STED images were acquired with the same settings.",
            0.85,
        );
        let c_mention = mention(
            "widefield",
            SectionType::Discussion,
            "We also imaged widefield controls using the same cells.",
            0.10,
        );
        let c = classifier();
        let diag = c.validate_tagging_distribution(&[a, b, c_mention]);
        assert!(diag.methods_results_share > 0.9);
        assert!(!diag.over_tagging_warning);
    }

    #[test]
    fn empty_set_yields_quiet_diagnostics() {
        let diag = classifier().validate_tagging_distribution(&[]);
        assert!(!diag.over_tagging_warning);
        assert_eq!(diag.methods_results_share, 0.0);
    }
}
