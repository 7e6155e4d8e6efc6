//! scopetag-segment — Section segmentation for scientific paper text.
//!
//! Turns an upstream paper record (title/abstract plus whatever structured
//! sections or raw full text the parse produced) into the normalized
//! [`PaperSections`] view the extraction agents read, stripping reference
//! lists and inline citation markers so downstream dictionary matching never
//! tags citation text.

mod citations;
mod models;
mod segmenter;

pub use citations::strip_inline_citations;
pub use models::{PaperRecord, PaperSections, RawSection, StructuredSection};
pub use segmenter::Segmenter;
