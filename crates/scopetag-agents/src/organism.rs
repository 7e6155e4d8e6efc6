//! Organism extraction.
//!
//! Only Latin binomials (and their abbreviated-genus forms) trigger an
//! ORGANISM match. Common names never do: "rabbit anti-GFP" and "goat
//! secondary" describe antibody hosts, not study organisms, and tagging
//! them as organisms is the single worst over-tagging failure this agent
//! can produce. Antibody hosts are captured separately as ANTIBODY_SOURCE
//! in their own lower confidence band.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::Gazetteer;
use crate::ExtractionAgent;

const AGENT_NAME: &str = "organism";

/// Curated binomials and abbreviated-genus aliases.
const BINOMIALS: &[(&str, &str)] = &[
    ("Mus musculus", "Mus musculus"),
    ("M. musculus", "Mus musculus"),
    ("Homo sapiens", "Homo sapiens"),
    ("H. sapiens", "Homo sapiens"),
    ("Rattus norvegicus", "Rattus norvegicus"),
    ("R. norvegicus", "Rattus norvegicus"),
    ("Danio rerio", "Danio rerio"),
    ("D. rerio", "Danio rerio"),
    ("Drosophila melanogaster", "Drosophila melanogaster"),
    ("D. melanogaster", "Drosophila melanogaster"),
    ("Caenorhabditis elegans", "Caenorhabditis elegans"),
    ("C. elegans", "Caenorhabditis elegans"),
    ("Saccharomyces cerevisiae", "Saccharomyces cerevisiae"),
    ("S. cerevisiae", "Saccharomyces cerevisiae"),
    ("Schizosaccharomyces pombe", "Schizosaccharomyces pombe"),
    ("S. pombe", "Schizosaccharomyces pombe"),
    ("Escherichia coli", "Escherichia coli"),
    ("E. coli", "Escherichia coli"),
    ("Xenopus laevis", "Xenopus laevis"),
    ("X. laevis", "Xenopus laevis"),
    ("Xenopus tropicalis", "Xenopus tropicalis"),
    ("Arabidopsis thaliana", "Arabidopsis thaliana"),
    ("A. thaliana", "Arabidopsis thaliana"),
    ("Gallus gallus", "Gallus gallus"),
    ("Sus scrofa", "Sus scrofa"),
    ("Bos taurus", "Bos taurus"),
    ("Oryctolagus cuniculus", "Oryctolagus cuniculus"),
    ("Macaca mulatta", "Macaca mulatta"),
    ("Macaca fascicularis", "Macaca fascicularis"),
    ("Dictyostelium discoideum", "Dictyostelium discoideum"),
    ("Chlamydomonas reinhardtii", "Chlamydomonas reinhardtii"),
    ("Nicotiana benthamiana", "Nicotiana benthamiana"),
    ("Zea mays", "Zea mays"),
    ("Oryza sativa", "Oryza sativa"),
    ("Toxoplasma gondii", "Toxoplasma gondii"),
    ("Plasmodium falciparum", "Plasmodium falciparum"),
    ("Trypanosoma brucei", "Trypanosoma brucei"),
    ("Aequorea victoria", "Aequorea victoria"),
];

/// Genera accepted by the open binomial pattern, for species the curated
/// table does not enumerate.
static GENERA: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Mus", "Homo", "Rattus", "Danio", "Drosophila", "Caenorhabditis", "Saccharomyces",
        "Schizosaccharomyces", "Escherichia", "Xenopus", "Arabidopsis", "Gallus", "Sus", "Bos",
        "Oryctolagus", "Macaca", "Dictyostelium", "Chlamydomonas", "Nicotiana", "Zea", "Oryza",
        "Toxoplasma", "Plasmodium", "Trypanosoma", "Candida", "Aspergillus", "Bacillus",
        "Pseudomonas", "Staphylococcus", "Streptococcus", "Salmonella", "Vibrio", "Mycobacterium",
        "Neurospora", "Aequorea", "Physcomitrella", "Tetrahymena",
    ]
    .into_iter()
    .collect()
});

static BINOMIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][a-z]+)\s+([a-z]{3,})\b").expect("binomial pattern"));

static ANTIBODY_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(rabbit|mouse|goat|rat|donkey|sheep|chicken|guinea pig|llama|alpaca|human|horse)[\s-]+(anti[\s-]?\w*|monoclonal|polyclonal|igg|igm|serum|antibody|antibodies|secondary|primary)\b",
    )
    .expect("antibody host pattern")
});

static RAISED_IN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\braised in\s+(rabbit|mouse|goat|rat|donkey|sheep|chicken|guinea pig|llama|alpaca|horse)s?\b")
        .expect("raised-in pattern")
});

pub struct OrganismAgent {
    binomials: Gazetteer,
}

impl OrganismAgent {
    pub fn new() -> Self {
        Self {
            binomials: Gazetteer::new(BINOMIALS),
        }
    }

    fn open_binomials(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let confidence = agent_confidence(EntityLabel::Organism, section);
        for caps in BINOMIAL.captures_iter(text) {
            let (Some(whole), Some(genus)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !GENERA.contains(genus.as_str()) {
                continue;
            }
            out.push(
                Extraction::new(
                    EntityLabel::Organism,
                    whole.as_str(),
                    section,
                    confidence,
                    AGENT_NAME,
                )
                .with_span(whole.start(), whole.end())
                .with_canonical(whole.as_str().to_string()),
            );
        }
    }

    fn antibody_hosts(&self, text: &str, section: SectionType, out: &mut Vec<Extraction>) {
        let confidence = agent_confidence(EntityLabel::AntibodySource, section);
        let mut push_host = |host: regex::Match<'_>| {
            let mut canonical = host.as_str().to_lowercase();
            if let Some(first) = canonical.get_mut(0..1) {
                first.make_ascii_uppercase();
            }
            out.push(
                Extraction::new(
                    EntityLabel::AntibodySource,
                    host.as_str(),
                    section,
                    confidence,
                    AGENT_NAME,
                )
                .with_span(host.start(), host.end())
                .with_canonical(canonical),
            );
        };

        for caps in ANTIBODY_HOST.captures_iter(text) {
            if let Some(host) = caps.get(1) {
                push_host(host);
            }
        }
        for caps in RAISED_IN.captures_iter(text) {
            if let Some(host) = caps.get(1) {
                push_host(host);
            }
        }
    }
}

impl Default for OrganismAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for OrganismAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::Organism, section);
        let mut out: Vec<Extraction> = Vec::new();

        for hit in self.binomials.find(text) {
            // Latin names are capitalized; a lowercase surface form is
            // ordinary prose, not a binomial.
            if !hit.text.starts_with(|c: char| c.is_ascii_uppercase()) {
                continue;
            }
            out.push(
                Extraction::new(EntityLabel::Organism, hit.text, section, confidence, AGENT_NAME)
                    .with_span(hit.start, hit.end)
                    .with_canonical(hit.canonical),
            );
        }

        self.open_binomials(text, section, &mut out);
        self.antibody_hosts(text, section, &mut out);
        dedupe_extractions(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> Vec<Extraction> {
        OrganismAgent::new().analyze(text, SectionType::Methods)
    }

    fn organisms(extractions: &[Extraction]) -> Vec<&Extraction> {
        extractions
            .iter()
            .filter(|e| e.label == EntityLabel::Organism)
            .collect()
    }

    #[test]
    fn latin_binomial_matches() {
        let extractions = analyze("Mus musculus tissue was sectioned.");
        let orgs = organisms(&extractions);
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].canonical(), "Mus musculus");
    }

    #[test]
    fn common_name_alone_never_matches_organism() {
        let extractions = analyze("rabbit polyclonal antibody was used.");
        assert!(organisms(&extractions).is_empty());
        // But the antibody host is captured in its own band.
        let hosts: Vec<_> = extractions
            .iter()
            .filter(|e| e.label == EntityLabel::AntibodySource)
            .collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].canonical(), "Rabbit");
    }

    #[test]
    fn plain_common_names_yield_nothing() {
        assert!(analyze("The mouse was anesthetized and the rat was not.").is_empty());
    }

    #[test]
    fn abbreviated_genus_resolves_to_full_binomial() {
        let extractions = analyze("E. coli cultures expressing GFP");
        let orgs = organisms(&extractions);
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].canonical(), "Escherichia coli");
    }

    #[test]
    fn open_pattern_accepts_known_genus_only() {
        let extractions = analyze("Mus spretus samples were compared; Confocal microscopy was used.");
        let orgs = organisms(&extractions);
        assert_eq!(orgs.len(), 1);
        assert_eq!(orgs[0].canonical(), "Mus spretus");
    }

    #[test]
    fn goat_secondary_is_antibody_source() {
        let extractions = analyze("incubated with goat secondary antibodies for one hour");
        let hosts: Vec<_> = extractions
            .iter()
            .filter(|e| e.label == EntityLabel::AntibodySource)
            .collect();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].canonical(), "Goat");
    }
}
