//! Fluorophore extraction.
//!
//! Known dyes and fluorescent proteins come from the gazetteer; templated
//! dye families ("Alexa Fluor NNN", "Hoechst NNNNN") come from patterns and
//! canonicalize trade-name shorthand ("Alexa 488" → "Alexa Fluor 488").
//! Family matches outrank gazetteer hits they overlap, so "Hoechst 33342"
//! never also yields a bare "Hoechst".

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use scopetag_common::confidence::agent_confidence;
use scopetag_common::{dedupe_extractions, EntityLabel, Extraction, SectionType};

use crate::gazetteer::Gazetteer;
use crate::ExtractionAgent;

const AGENT_NAME: &str = "fluorophore";

const DYES: &[(&str, &str)] = &[
    ("DAPI", "DAPI"),
    ("Hoechst", "Hoechst"),
    ("GFP", "GFP"),
    ("green fluorescent protein", "GFP"),
    ("eGFP", "EGFP"),
    ("enhanced green fluorescent protein", "EGFP"),
    ("sfGFP", "sfGFP"),
    ("YFP", "YFP"),
    ("yellow fluorescent protein", "YFP"),
    ("CFP", "CFP"),
    ("cyan fluorescent protein", "CFP"),
    ("RFP", "RFP"),
    ("red fluorescent protein", "RFP"),
    ("mCherry", "mCherry"),
    ("mScarlet", "mScarlet"),
    ("tdTomato", "tdTomato"),
    ("DsRed", "DsRed"),
    ("mNeonGreen", "mNeonGreen"),
    ("mTurquoise2", "mTurquoise2"),
    ("mTurquoise", "mTurquoise"),
    ("mOrange", "mOrange"),
    ("FITC", "FITC"),
    ("fluorescein", "Fluorescein"),
    ("TRITC", "TRITC"),
    ("Texas Red", "Texas Red"),
    ("rhodamine", "Rhodamine"),
    ("phalloidin", "Phalloidin"),
    ("propidium iodide", "Propidium Iodide"),
    ("calcein", "Calcein"),
    ("Fluo-4", "Fluo-4"),
    ("Fura-2", "Fura-2"),
    ("SiR-tubulin", "SiR-tubulin"),
    ("SiR-actin", "SiR-actin"),
    ("MitoTracker", "MitoTracker"),
    ("LysoTracker", "LysoTracker"),
    ("CellMask", "CellMask"),
    ("TO-PRO-3", "TO-PRO-3"),
    ("SYTOX Green", "SYTOX Green"),
    ("DRAQ5", "DRAQ5"),
    ("BODIPY", "BODIPY"),
];

struct Family {
    regex: &'static LazyLock<Regex>,
    prefix: &'static str,
}

static ALEXA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bAlexa(?:\s?Fluor)?[\s-]?(\d{3})\b").expect("alexa pattern")
});
static HOECHST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bHoechst\s?(\d{5})\b").expect("hoechst pattern"));
static ATTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bATTO[\s-]?(\d{3})\b").expect("atto pattern"));
static DYLIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bDyLight[\s-]?(\d{3})\b").expect("dylight pattern"));
static CF_DYE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCF[\s-]?(\d{3})\b").expect("cf pattern"));
static CY_DYE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bCy[\s-]?(2|3|5\.5|5|7)\b").expect("cy pattern"));
static JANELIA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Janelia Fluor|JF)[\s-]?(\d{3})\b").expect("jf pattern"));
static GCAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bj?GCaMP(\d+[a-z]?)\b").expect("gcamp pattern"));

fn families() -> [Family; 8] {
    [
        Family { regex: &ALEXA, prefix: "Alexa Fluor " },
        Family { regex: &HOECHST, prefix: "Hoechst " },
        Family { regex: &ATTO, prefix: "ATTO " },
        Family { regex: &DYLIGHT, prefix: "DyLight " },
        Family { regex: &CF_DYE, prefix: "CF" },
        Family { regex: &CY_DYE, prefix: "Cy" },
        Family { regex: &JANELIA, prefix: "Janelia Fluor " },
        Family { regex: &GCAMP, prefix: "GCaMP" },
    ]
}

pub struct FluorophoreAgent {
    dyes: Gazetteer,
}

impl FluorophoreAgent {
    pub fn new() -> Self {
        Self {
            dyes: Gazetteer::new(DYES),
        }
    }
}

impl Default for FluorophoreAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionAgent for FluorophoreAgent {
    fn name(&self) -> &'static str {
        AGENT_NAME
    }

    fn analyze(&self, text: &str, section: SectionType) -> Vec<Extraction> {
        let confidence = agent_confidence(EntityLabel::Fluorophore, section);
        let mut out: Vec<Extraction> = Vec::new();
        let mut family_spans: Vec<(usize, usize)> = Vec::new();

        for family in families() {
            for caps in family.regex.captures_iter(text) {
                let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let number = number.as_str();
                family_spans.push((whole.start(), whole.end()));
                out.push(
                    Extraction::new(
                        EntityLabel::Fluorophore,
                        whole.as_str(),
                        section,
                        confidence,
                        AGENT_NAME,
                    )
                    .with_span(whole.start(), whole.end())
                    .with_canonical(format!("{}{}", family.prefix, number))
                    .with_meta("dye_number", json!(number)),
                );
            }
        }

        for hit in self.dyes.find(text) {
            // Family matches own their span; a bare "Hoechst" inside
            // "Hoechst 33342" is the same mention, not a second dye.
            let covered = family_spans
                .iter()
                .any(|&(start, end)| hit.start >= start && hit.end <= end);
            if covered {
                continue;
            }
            out.push(
                Extraction::new(
                    EntityLabel::Fluorophore,
                    hit.text,
                    section,
                    confidence,
                    AGENT_NAME,
                )
                .with_span(hit.start, hit.end)
                .with_canonical(hit.canonical),
            );
        }

        dedupe_extractions(out)
    }
}
