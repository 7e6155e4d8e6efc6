//! Tiered section segmentation.
//!
//! Priority for producing methods/results text:
//! 1. pre-tagged structured sections from a prior parse, trusted when the
//!    methods text is substantial;
//! 2. heuristic heading-based split of raw full text;
//! 3. title/abstract-only fallback.
//!
//! Reference sections are identified and dropped before anything else runs.
//! Malformed input degrades tier by tier; segmentation never fails.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use scopetag_common::{SectionType, SegmentConfig};

use crate::citations::strip_inline_citations;
use crate::models::{PaperRecord, PaperSections, RawSection};

/// Caption lines: "Figure 3.", "Fig. 2:", "Figure 1 |".
static FIGURE_CAPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^(?:Figure|Fig\.?)\s+S?\d+\s*[.:|]\s*(.+)$").expect("caption pattern")
});

/// XML/HTML tag run, for degrading markup we were handed by mistake.
static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("markup pattern"));

/// Candidate heading: a short line without terminal punctuation, optionally
/// numbered ("2.1 Methods").
static HEADING_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:\d+(?:\.\d+)*[.)]?\s+)?[A-Za-z][A-Za-z \t/&,-]{0,70}$").expect("heading pattern")
});

pub struct Segmenter {
    config: SegmentConfig,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentConfig::default())
    }
}

impl Segmenter {
    pub fn new(config: SegmentConfig) -> Self {
        Self { config }
    }

    /// Build the normalized section view for one paper.
    pub fn segment(&self, paper: &PaperRecord) -> PaperSections {
        let mut out = PaperSections {
            title: paper.title.trim().to_string(),
            abstract_text: self.clean(&paper.abstract_text),
            metadata: paper.metadata.clone(),
            ..Default::default()
        };

        // Tier 1: structured sections from a prior parse, plus any direct
        // methods/results fields the record carries.
        self.absorb_structured(paper, &mut out);
        if !paper.methods.trim().is_empty() && out.methods.is_empty() {
            out.methods = self.clean(&paper.methods);
        }
        if !paper.results.trim().is_empty() && out.results.is_empty() {
            out.results = self.clean(&paper.results);
        }

        let structured_ok = out.methods.len() > self.config.structured_methods_min_chars;

        // Tier 2: heuristic split of raw full text.
        if !structured_ok && !paper.full_text.trim().is_empty() {
            let body = degrade_markup(&paper.full_text);
            for section in heuristic_split(&body) {
                self.absorb_section(section, &mut out);
            }
        }

        // Figure captions and data-availability statements are harvested
        // even when structured sections exist; both are rich in equipment
        // and accession detail that never appears elsewhere.
        if out.figures.is_empty() {
            out.figures = self.harvest_captions(&paper.full_text);
        }
        if out.data_availability.is_empty() {
            out.data_availability = self.harvest_data_availability(&paper.full_text);
        }

        debug!(
            tag_source = out.tag_source(),
            methods_len = out.methods.len(),
            sections = out.sections.len(),
            "segmented paper"
        );
        out
    }

    fn absorb_structured(&self, paper: &PaperRecord, out: &mut PaperSections) {
        for section in &paper.sections {
            let section_type = section
                .sec_type
                .as_deref()
                .map(section_type_from_str)
                .filter(|t| *t != SectionType::Other)
                .unwrap_or_else(|| SectionType::from_heading(&section.heading));
            self.absorb_section(
                RawSection {
                    heading: if section.heading.is_empty() {
                        None
                    } else {
                        Some(section.heading.clone())
                    },
                    text: section.text.clone(),
                    section_type,
                },
                out,
            );
        }
    }

    /// Route one typed section into the named buckets. References are
    /// dropped here and never recorded anywhere.
    fn absorb_section(&self, section: RawSection, out: &mut PaperSections) {
        if section.section_type == SectionType::References {
            debug!(heading = ?section.heading, "dropping reference section");
            return;
        }
        let text = self.clean(&section.text);
        if text.trim().is_empty() {
            return;
        }

        let bucket = match section.section_type {
            SectionType::Abstract         => Some(&mut out.abstract_text),
            SectionType::Introduction     => Some(&mut out.introduction),
            SectionType::Methods          => Some(&mut out.methods),
            SectionType::Results          => Some(&mut out.results),
            SectionType::Discussion       => Some(&mut out.discussion),
            SectionType::FigureCaption    => Some(&mut out.figures),
            SectionType::DataAvailability => Some(&mut out.data_availability),
            _ => None,
        };
        if let Some(bucket) = bucket {
            if !bucket.is_empty() {
                bucket.push_str("\n\n");
            }
            bucket.push_str(&text);
        }

        out.sections.push(RawSection { text, ..section });
    }

    fn harvest_captions(&self, full_text: &str) -> String {
        let captions: Vec<String> = FIGURE_CAPTION
            .captures_iter(full_text)
            .map(|c| self.clean(c[0].trim()))
            .collect();
        captions.join("\n")
    }

    /// Availability statements live under their own heading near the end of
    /// the full text and rarely make it into structured parses.
    fn harvest_data_availability(&self, full_text: &str) -> String {
        if full_text.trim().is_empty() {
            return String::new();
        }
        let body = degrade_markup(full_text);
        heuristic_split(&body)
            .into_iter()
            .filter(|s| s.section_type == SectionType::DataAvailability)
            .map(|s| self.clean(&s.text))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn clean(&self, text: &str) -> String {
        let text = text.trim();
        if self.config.strip_inline_citations {
            strip_inline_citations(text)
        } else {
            text.to_string()
        }
    }
}

/// Map a parser-supplied sec-type string to a section type.
fn section_type_from_str(raw: &str) -> SectionType {
    match raw.to_lowercase().as_str() {
        "title"                           => SectionType::Title,
        "abstract"                        => SectionType::Abstract,
        "intro" | "introduction"          => SectionType::Introduction,
        "methods" | "materials|methods" | "materials-and-methods" => SectionType::Methods,
        "results"                         => SectionType::Results,
        "discussion" | "conclusions"      => SectionType::Discussion,
        "fig" | "figure" | "caption"      => SectionType::FigureCaption,
        "data-availability" | "availability" => SectionType::DataAvailability,
        "references" | "ref-list"         => SectionType::References,
        other                             => SectionType::from_heading(other),
    }
}

/// Split raw full text at recognized headings. A text with zero recognized
/// headings yields exactly one `FullText` section.
fn heuristic_split(text: &str) -> Vec<RawSection> {
    let mut sections: Vec<RawSection> = Vec::new();
    let mut current_heading: Option<String> = None;
    let mut current_type: Option<SectionType> = None;
    let mut current_text = String::new();

    let mut flush = |heading: &mut Option<String>,
                     section_type: &mut Option<SectionType>,
                     body: &mut String,
                     sections: &mut Vec<RawSection>| {
        if !body.trim().is_empty() {
            sections.push(RawSection {
                heading: heading.take(),
                text: std::mem::take(body).trim().to_string(),
                // Text before the first recognized heading.
                section_type: section_type.take().unwrap_or(SectionType::Other),
            });
        } else {
            *heading = None;
            *section_type = None;
            body.clear();
        }
    };

    for line in text.lines() {
        if let Some(heading_type) = classify_heading_line(line) {
            flush(&mut current_heading, &mut current_type, &mut current_text, &mut sections);
            current_heading = Some(line.trim().to_string());
            current_type = Some(heading_type);
        } else {
            current_text.push_str(line);
            current_text.push('\n');
        }
    }
    flush(&mut current_heading, &mut current_type, &mut current_text, &mut sections);

    let recognized = sections.iter().any(|s| {
        !matches!(s.section_type, SectionType::Other | SectionType::FullText)
    });
    if !recognized {
        // Degenerate single-bucket case, not an error.
        let whole = text.trim().to_string();
        return if whole.is_empty() {
            Vec::new()
        } else {
            vec![RawSection {
                heading: None,
                text: whole,
                section_type: SectionType::FullText,
            }]
        };
    }
    sections
}

/// Returns the section type when `line` reads as a recognized heading.
/// Headings that classify as `Other` do not start a new section; that keeps
/// short ordinary lines from fragmenting the text.
fn classify_heading_line(line: &str) -> Option<SectionType> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.len() > 80 || !HEADING_LINE.is_match(trimmed) {
        return None;
    }
    if trimmed.split_whitespace().count() > 8 {
        return None;
    }
    match SectionType::from_heading(trimmed) {
        SectionType::Other => None,
        section_type => Some(section_type),
    }
}

/// Strip markup tags when raw XML/HTML was handed in instead of plain text.
/// Never errors; worst case the text passes through unchanged.
fn degrade_markup(text: &str) -> String {
    if text.contains("</") || text.trim_start().starts_with("<?xml") {
        MARKUP_TAG.replace_all(text, " ").into_owned()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StructuredSection;

    fn record_with_full_text(full_text: &str) -> PaperRecord {
        PaperRecord {
            title: "Test paper".to_string(),
            abstract_text: "An abstract.".to_string(),
            full_text: full_text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn heading_split_routes_sections() {
        let text = "Introduction\nPrior work exists.\n\nMaterials and Methods\nWe used a confocal microscope with a 63x objective for all imaging.\n\nResults\nCells were bright.\n\nDiscussion\nIt worked.\n";
        let sections = Segmenter::default().segment(&record_with_full_text(text));
        assert!(sections.introduction.contains("Prior work"));
        assert!(sections.methods.contains("confocal microscope"));
        assert!(sections.results.contains("bright"));
        assert!(sections.discussion.contains("worked"));
    }

    #[test]
    fn references_never_reach_any_bucket() {
        let text = "Methods\nWe imaged samples on a spinning disk microscope at 37 degrees.\n\nReferences\n1. Smith J. Famous Microscope Methods. J Imaging 2019.\n2. Jones A. STED for everyone. Nat Methods 2020.\n";
        let sections = Segmenter::default().segment(&record_with_full_text(text));
        let tagged: String = format!(
            "{} {} {} {} {} {}",
            sections.methods,
            sections.results,
            sections.introduction,
            sections.discussion,
            sections.data_availability,
            sections
                .sections
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
        );
        assert!(!tagged.contains("Famous Microscope Methods"));
        assert!(!tagged.contains("STED for everyone"));
        assert!(sections.methods.contains("spinning disk"));
    }

    #[test]
    fn no_recognized_headings_yield_single_full_text_section() {
        let text = "Just one long undifferentiated blob of text about imaging experiments without any headings at all.";
        let sections = Segmenter::default().segment(&record_with_full_text(text));
        assert!(sections.methods.is_empty());
        let full: Vec<_> = sections
            .sections
            .iter()
            .filter(|s| s.section_type == SectionType::FullText)
            .collect();
        assert_eq!(full.len(), 1);
        assert!(full[0].text.contains("undifferentiated blob"));
    }

    #[test]
    fn structured_methods_trusted_over_heuristic() {
        let structured_methods =
            "Cells were fixed in 4% PFA and imaged on a Leica SP8 confocal microscope using a 63x/1.4 NA oil objective."
                .to_string();
        let record = PaperRecord {
            title: "T".to_string(),
            sections: vec![StructuredSection {
                heading: "Materials and Methods".to_string(),
                text: structured_methods.clone(),
                sec_type: Some("methods".to_string()),
            }],
            full_text: "Methods\nThis heuristic text must not win.\n".to_string(),
            ..Default::default()
        };
        let sections = Segmenter::default().segment(&record);
        assert!(sections.methods.contains("Leica SP8"));
        assert!(!sections.methods.contains("must not win"));
        assert_eq!(sections.tag_source(), "methods");
    }

    #[test]
    fn availability_statement_harvested_despite_structured_methods() {
        let record = PaperRecord {
            title: "T".to_string(),
            sections: vec![StructuredSection {
                heading: "Methods".to_string(),
                text: "Cells were fixed in 4% PFA and imaged on a Leica SP8 confocal microscope using a 63x/1.4 NA oil objective."
                    .to_string(),
                sec_type: Some("methods".to_string()),
            }],
            full_text: "Data Availability\nRaw images are deposited in the Image Data Resource under idr0042.\n"
                .to_string(),
            ..Default::default()
        };
        let sections = Segmenter::default().segment(&record);
        assert_eq!(sections.tag_source(), "methods");
        assert!(sections.data_availability.contains("idr0042"));
    }

    #[test]
    fn abstract_only_fallback() {
        let record = PaperRecord {
            title: "Imaging study".to_string(),
            abstract_text: "We describe confocal imaging of neurons.".to_string(),
            ..Default::default()
        };
        let sections = Segmenter::default().segment(&record);
        assert_eq!(sections.tag_source(), "title_abstract");
        assert!(sections.methods.is_empty());
        assert!(!sections.abstract_text.is_empty());
    }

    #[test]
    fn figure_captions_harvested_from_full_text() {
        let text = "Methods\nSamples were mounted in ProLong Gold and imaged the following day.\n\nFigure 1. Confocal image acquired on a Zeiss LSM 880 with Airyscan.\n";
        let sections = Segmenter::default().segment(&record_with_full_text(text));
        assert!(sections.figures.contains("LSM 880"));
    }

    #[test]
    fn malformed_xml_degrades_to_plain_text() {
        let text = "<?xml version=\"1.0\"?><article><body><sec>Methods</sec> unclosed and broken <p>imaging text";
        let sections = Segmenter::default().segment(&record_with_full_text(text));
        // No panic, and the text survived in some bucket.
        assert!(!sections.iter_texts().is_empty());
    }

    #[test]
    fn inline_citations_stripped_from_buckets() {
        let record = PaperRecord {
            methods: format!(
                "Confocal microscopy [1] was performed as described (Smith et al., 2020) with a 488 nm laser.{}",
                " Padding so the methods section is long enough to be trusted as structured text."
            ),
            ..Default::default()
        };
        let sections = Segmenter::default().segment(&record);
        assert!(!sections.methods.contains("[1]"));
        assert!(!sections.methods.contains("Smith et al."));
        assert!(sections.methods.contains("488 nm"));
    }
}
