//! Linguistic signal detection over the context window of a mention.
//!
//! Usage cues are restricted to past-tense first-person and passive forms;
//! generic present-tense claims ("X is widely used") land on the reference
//! side, which is exactly the distinction the tags need.

use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    UsageVerb,
    ReferenceVerb,
    CitationProximity,
    Negation,
    Comparison,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::UsageVerb         => "usage_verb",
            Signal::ReferenceVerb     => "reference_verb",
            Signal::CitationProximity => "citation_proximity",
            Signal::Negation          => "negation",
            Signal::Comparison        => "comparison",
        }
    }
}

static USAGE_VERB: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\bwe\s+(?:used|employed|performed|applied|conducted|acquired|imaged|carried\s+out)\b",
        r"(?i)\b(?:was|were)\s+(?:used|performed|acquired|imaged|employed|applied|conducted|captured|recorded|visuali[sz]ed|analy[sz]ed|processed|stained|fixed|mounted|cultured|transfected)\b",
        r"(?i)\b(?:acquired|imaged|captured|recorded|performed|analy[sz]ed|processed|visuali[sz]ed)\s+(?:with|using|on|in)\b",
        r"(?i)\busing\s+(?:a|an|the)\b",
        r"(?i)\b(?:was|were)\s+taken\b",
    ])
});

static REFERENCE_VERB: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(?:is|are)\s+(?:commonly|widely|typically|often|frequently|increasingly)\s+(?:used|employed|applied)\b",
        r"(?i)\bha(?:s|ve)\s+(?:also\s+|previously\s+|recently\s+)?been\s+(?:used|applied|employed|shown|demonstrated|reported)\b",
        r"(?i)\bcan\s+(?:also\s+)?be\s+(?:used|applied|employed)\b",
        r"(?i)\b(?:previous|prior|earlier|other)\s+(?:studies|work|reports|groups)\b",
    ])
});

static CITATION_PROXIMITY: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\[\d+(?:\s*[,\u{2013}-]\s*\d+)*\]",
        r"\bet\s+al\.",
        r"\(\s*[A-Z][A-Za-z-]+(?:\s+(?:et\s+al\.?|and\s+[A-Z][A-Za-z-]+))?,?\s+(?:19|20)\d{2}[a-z]?\s*\)",
    ])
});

static NEGATION: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\bdid\s+not\s+(?:use|employ|perform|apply|require)\b",
        r"(?i)\b(?:was|were)\s+not\s+(?:used|performed|employed|applied|required|possible|necessary)\b",
        r"(?i)\bwithout\s+(?:the\s+use\s+of|using|resorting\s+to)\b",
        r"(?i)\binstead\s+of\b",
        r"(?i)\bavoid(?:ed|ing)?\s+(?:the\s+use\s+of|using)\b",
    ])
});

static COMPARISON: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\bunlike\b",
        r"(?i)\bin\s+contrast\s+to\b",
        r"(?i)\bcompared\s+(?:to|with)\b",
        r"(?i)\bas\s+opposed\s+to\b",
        r"(?i)\brather\s+than\b",
        r"(?i)\bwhereas\b",
        r"(?i)\bsuperior\s+to\b",
        r"(?i)\binferior\s+to\b",
    ])
});

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).expect("signal pattern"))
        .collect()
}

/// Which signal families fired in one context window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalHits {
    pub usage_verb: bool,
    pub reference_verb: bool,
    pub citation_proximity: bool,
    pub negation: bool,
    pub comparison: bool,
}

impl SignalHits {
    pub fn fired(&self) -> Vec<Signal> {
        let mut out = Vec::new();
        if self.usage_verb {
            out.push(Signal::UsageVerb);
        }
        if self.reference_verb {
            out.push(Signal::ReferenceVerb);
        }
        if self.citation_proximity {
            out.push(Signal::CitationProximity);
        }
        if self.negation {
            out.push(Signal::Negation);
        }
        if self.comparison {
            out.push(Signal::Comparison);
        }
        out
    }

    pub fn names(&self) -> Vec<String> {
        self.fired().iter().map(|s| s.as_str().to_string()).collect()
    }

    pub fn any_negative(&self) -> bool {
        self.reference_verb || self.citation_proximity || self.negation || self.comparison
    }
}

/// Detects every signal family in a context window. Each family counts at
/// most once no matter how many of its patterns match.
pub fn detect_signals(context: &str) -> SignalHits {
    SignalHits {
        usage_verb: any_match(&USAGE_VERB, context),
        reference_verb: any_match(&REFERENCE_VERB, context),
        citation_proximity: any_match(&CITATION_PROXIMITY, context),
        negation: any_match(&NEGATION, context),
        comparison: any_match(&COMPARISON, context),
    }
}

fn any_match(patterns: &[Regex], text: &str) -> bool {
    patterns.iter().any(|p| p.is_match(text))
}
