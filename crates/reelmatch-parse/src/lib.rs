//! Filename parsing for movie and series releases.
//!
//! Turns raw file or folder names such as
//! `The.Matrix.1999.1080p.BluRay.x264-GROUP` into a clean title, release year,
//! quality tag and optional catalog identifier.

pub mod elements;
pub mod keyword;
pub mod parser;

pub use elements::{IdSource, ParsedMetadata};
pub use parser::parse;
