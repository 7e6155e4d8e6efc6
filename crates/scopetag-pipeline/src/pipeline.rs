//! The orchestrator: segment, extract, role-classify, assemble.
//!
//! `extract` is pure and synchronous; everything network- or model-shaped
//! lives behind the optional collaborators and only runs in `process`.

use std::collections::BTreeMap;

use tracing::{info, warn};

use scopetag_agents::{default_agents, ExtractionAgent, InstitutionAgent};
use scopetag_common::{dedupe_extractions, Config, EntityLabel, Extraction, Result};
use scopetag_roles::RoleClassifier;
use scopetag_segment::{PaperRecord, Segmenter};

use crate::collaborators::{LlmVerifier, SupplementalEntity, SupplementalNer, VerificationOutcome};
use crate::report::{IdentifierRecord, PaperExtraction, RoleReport};

pub struct ExtractionPipeline {
    segmenter: Segmenter,
    agents: Vec<Box<dyn ExtractionAgent>>,
    institutions: InstitutionAgent,
    classifier: RoleClassifier,
    supplemental: Option<Box<dyn SupplementalNer>>,
    verifier: Option<Box<dyn LlmVerifier>>,
    config: Config,
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ExtractionPipeline {
    pub fn new(config: Config) -> Self {
        Self {
            segmenter: Segmenter::new(config.segment.clone()),
            agents: default_agents(),
            institutions: InstitutionAgent::new(),
            classifier: RoleClassifier::new(config.roles.clone()),
            supplemental: None,
            verifier: None,
            config,
        }
    }

    pub fn with_supplemental(mut self, ner: Box<dyn SupplementalNer>) -> Self {
        self.supplemental = Some(ner);
        self
    }

    pub fn with_verifier(mut self, verifier: Box<dyn LlmVerifier>) -> Self {
        self.verifier = Some(verifier);
        self
    }

    /// Dictionary extraction and role classification for one paper.
    /// Deterministic: identical input always yields identical categories.
    pub fn extract(&self, paper: &PaperRecord) -> PaperExtraction {
        let sections = self.segmenter.segment(paper);

        let mut raw: Vec<Extraction> = Vec::new();
        for (section, text) in sections.iter_texts() {
            for agent in &self.agents {
                raw.extend(agent.analyze(text, section));
            }
        }
        raw.extend(self.institutions.analyze_affiliations(&paper.affiliations));

        let (classifiable, direct): (Vec<Extraction>, Vec<Extraction>) = raw
            .into_iter()
            .partition(|e| e.label.role_classifiable());

        let classified: Vec<_> = classifiable
            .iter()
            .map(|extraction| {
                let context = sections.text_for(extraction.section).unwrap_or("");
                self.classifier.classify(extraction, context)
            })
            .collect();
        let consolidated = self.classifier.consolidate(classified);
        let kept = self.classifier.filter_used_entities(&consolidated);
        let diagnostics = self.classifier.validate_tagging_distribution(&consolidated);

        let mut result = PaperExtraction::new(paper.doi.clone(), paper.pmid.clone());
        result.confidence.tag_source = sections.tag_source().to_string();
        result.role_classification = RoleReport::from_verdicts(&consolidated, &kept, diagnostics);

        let mut confidence_sums: BTreeMap<&'static str, (f32, usize)> = BTreeMap::new();

        for mention in &kept {
            let key = mention.label.category_key();
            if let Some(names) = result.names_mut(key) {
                if !names.iter().any(|n| n.eq_ignore_ascii_case(&mention.canonical)) {
                    names.push(mention.canonical.clone());
                }
                let entry = confidence_sums.entry(key).or_insert((0.0, 0));
                entry.0 += mention.confidence;
                entry.1 += 1;
            }
        }

        // Identifiers, institutions, and antibody sources bypass role
        // classification; they are declarative, not usage claims.
        for extraction in dedupe_extractions(direct) {
            let key = extraction.label.category_key();
            let entry = confidence_sums.entry(key).or_insert((0.0, 0));
            entry.0 += extraction.confidence;
            entry.1 += 1;

            match extraction.label {
                EntityLabel::Protocol
                | EntityLabel::Repository
                | EntityLabel::Rrid
                | EntityLabel::Ror => {
                    let record = IdentifierRecord {
                        id: extraction.canonical().to_string(),
                        url: extraction
                            .metadata
                            .get("url")
                            .and_then(|v| v.as_str())
                            .map(str::to_string),
                    };
                    let bucket = match extraction.label {
                        EntityLabel::Protocol   => &mut result.protocols,
                        EntityLabel::Repository => &mut result.repositories,
                        EntityLabel::Rrid       => &mut result.rrids,
                        _                       => &mut result.rors,
                    };
                    if !bucket.contains(&record) {
                        bucket.push(record);
                    }
                }
                _ => {
                    if let Some(names) = result.names_mut(key) {
                        let canonical = extraction.canonical();
                        if !names.iter().any(|n| n.eq_ignore_ascii_case(canonical)) {
                            names.push(canonical.to_string());
                        }
                    }
                }
            }
        }

        for (key, (sum, count)) in confidence_sums {
            if count > 0 {
                result
                    .confidence
                    .mean_by_category
                    .insert(key.to_string(), sum / count as f32);
            }
        }

        info!(
            doi = ?paper.doi,
            tag_source = %result.confidence.tag_source,
            techniques = result.microscopy_techniques.len(),
            kept = kept.len(),
            over_tagging = result.role_classification.over_tagging_warning,
            "extracted paper"
        );
        result
    }

    /// Batch extraction; takes the data-parallel path for large batches
    /// when the `parallel` feature is enabled.
    pub fn extract_batch(&self, papers: &[PaperRecord]) -> Vec<PaperExtraction> {
        #[cfg(feature = "parallel")]
        {
            if papers.len() > self.config.pipeline.parallel_threshold {
                use rayon::prelude::*;
                return papers.par_iter().map(|p| self.extract(p)).collect();
            }
        }
        papers.iter().map(|p| self.extract(p)).collect()
    }

    /// Full pipeline including the optional collaborators. A collaborator
    /// failure is logged and skipped; the dictionary result always stands.
    pub async fn process(&self, paper: &PaperRecord) -> Result<PaperExtraction> {
        let mut result = self.extract(paper);

        if let Some(ner) = &self.supplemental {
            if let Some(identifier) = paper.doi.as_deref().or(paper.pmid.as_deref()) {
                match ner.fetch(identifier).await {
                    Ok(entities) => self.merge_supplemental(&mut result, entities),
                    Err(e) => {
                        warn!(identifier, error = %e, "supplemental NER unavailable, continuing")
                    }
                }
            }
        }

        if let Some(verifier) = &self.verifier {
            match verifier.verify(paper, &result).await {
                Ok(outcome) => apply_verification(&mut result, outcome),
                Err(e) => warn!(error = %e, "verification unavailable, keeping dictionary result"),
            }
        }

        Ok(result)
    }

    /// Additive merge: supplemental entities may introduce names, never
    /// replace or remove dictionary ones.
    fn merge_supplemental(&self, result: &mut PaperExtraction, entities: Vec<SupplementalEntity>) {
        let min = self.config.pipeline.supplemental_min_confidence;
        for entity in entities {
            if entity.confidence < min {
                continue;
            }
            if EntityLabel::from_category_key(&entity.category).is_none() {
                warn!(category = %entity.category, "ignoring unknown supplemental category");
                continue;
            }
            if result.contains(&entity.category, &entity.canonical) {
                continue;
            }
            if let Some(names) = result.names_mut(&entity.category) {
                names.push(entity.canonical);
            }
        }
    }
}

fn apply_verification(result: &mut PaperExtraction, outcome: VerificationOutcome) {
    for (category, names) in &outcome.removed {
        if EntityLabel::from_category_key(category).is_none() {
            warn!(category = %category, "ignoring removal for unknown category");
            continue;
        }
        if let Some(list) = result.names_mut(category) {
            list.retain(|n| !names.iter().any(|r| r.eq_ignore_ascii_case(n)));
        }
    }
    for (category, names) in &outcome.added {
        if EntityLabel::from_category_key(category).is_none() {
            warn!(category = %category, "ignoring addition for unknown category");
            continue;
        }
        for name in names {
            if !result.contains(category, name) {
                if let Some(list) = result.names_mut(category) {
                    list.push(name.clone());
                }
            }
        }
    }
}
