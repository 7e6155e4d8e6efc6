//! Institution extraction from author affiliation strings.
//!
//! Affiliations arrive pre-segmented from the publisher metadata, so this
//! agent never scans body text; it splits each affiliation on its
//! delimiters and keeps the fragments that look like an organization.

use std::sync::LazyLock;

use regex::Regex;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

const AGENT_NAME: &str = "institution";

static ORG_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:universit\w*|institut\w*|college|hospital|clinic|laborator\w*|school of|center|centre|academy|foundation|polytechnic|CNRS|INSERM|INRIA|RIKEN|Max Planck|EMBL|Janelia|Francis Crick|Karolinska|ETH|MIT|NIH)\b",
    )
    .expect("organization keyword pattern")
});

/// Fragments that are address components, not organizations.
static ADDRESS_ONLY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\d|po box|p\.o\.|street|str\.|avenue|ave\.|road|rd\.|suite|room|building|campus box)")
        .expect("address pattern")
});

pub struct InstitutionAgent;

impl InstitutionAgent {
    pub fn new() -> Self {
        Self
    }

    /// Extracts institutions from publisher affiliation strings. Each
    /// affiliation is split on semicolons, then commas; a fragment is kept
    /// when it carries an organization keyword and is not a bare address
    /// line. Departments subsume into their parent when both appear.
    pub fn analyze_affiliations(&self, affiliations: &[String]) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::Institution, SectionType::Other);
        let mut out: Vec<Extraction> = Vec::new();

        for affiliation in affiliations {
            for clause in affiliation.split(';') {
                let mut best: Option<&str> = None;
                for fragment in clause.split(',') {
                    let fragment = fragment.trim();
                    if fragment.len() < 4 || fragment.len() > 120 {
                        continue;
                    }
                    if ADDRESS_ONLY.is_match(fragment) || !ORG_KEYWORD.is_match(fragment) {
                        continue;
                    }
                    // Prefer the top-level organization over its department.
                    let is_department = fragment.to_ascii_lowercase().starts_with("department")
                        || fragment.to_ascii_lowercase().starts_with("dept");
                    match best {
                        None => best = Some(fragment),
                        Some(current) => {
                            let current_is_department =
                                current.to_ascii_lowercase().starts_with("department")
                                    || current.to_ascii_lowercase().starts_with("dept");
                            if current_is_department && !is_department {
                                best = Some(fragment);
                            }
                        }
                    }
                }
                if let Some(name) = best {
                    out.push(
                        Extraction::new(
                            EntityLabel::Institution,
                            name,
                            SectionType::Other,
                            confidence,
                            AGENT_NAME,
                        )
                        .with_canonical(name),
                    );
                }
            }
        }

        dedupe_extractions(out)
    }
}

impl Default for InstitutionAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(affiliations: &[&str]) -> Vec<Extraction> {
        let owned: Vec<String> = affiliations.iter().map(|s| s.to_string()).collect();
        InstitutionAgent::new().analyze_affiliations(&owned)
    }

    #[test]
    fn university_preferred_over_department() {
        let extractions = analyze(&[
            "Department of Cell Biology, Harvard University, Boston, MA, USA",
        ]);
        assert_eq!(extractions.len(), 1);
        assert_eq!(extractions[0].canonical(), "Harvard University");
    }

    #[test]
    fn department_kept_when_nothing_better() {
        let extractions = analyze(&["Department of Physics University Lab, Somewhere"]);
        assert_eq!(extractions.len(), 1);
    }

    #[test]
    fn multiple_affiliations_deduplicate() {
        let extractions = analyze(&[
            "Institute of Molecular Biology, University of Vienna, Austria",
            "University of Vienna, Vienna, Austria",
        ]);
        let canonicals: Vec<_> = extractions.iter().map(|e| e.canonical()).collect();
        assert_eq!(
            canonicals
                .iter()
                .filter(|c| **c == "University of Vienna")
                .count(),
            1
        );
    }

    #[test]
    fn plain_addresses_are_ignored() {
        assert!(analyze(&["221B Baker Street, London"]).is_empty());
    }

    #[test]
    fn named_research_organizations() {
        let extractions = analyze(&["Max Planck Institute of Biochemistry, Martinsried, Germany"]);
        assert_eq!(extractions.len(), 1);
        assert!(extractions[0].canonical().starts_with("Max Planck"));
    }
}
