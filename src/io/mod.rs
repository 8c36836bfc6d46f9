//! I/O layer for product metadata: the Muscate and Sen2Cor XML extractors,
//! the normalized `Product` model they populate, and the shared document
//! navigation helpers.
use std::path::PathBuf;

use thiserror::Error;

pub mod muscate;
pub mod product;
pub mod sen2cor;
pub mod xml;

pub use muscate::MuscateExtractor;
pub use product::{BandFiles, MetadataExtractor, Product, RsrSource};
pub use sen2cor::Sen2corExtractor;

/// Errors encountered while reading product metadata documents.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("Unsupported metadata format: root tag `{0}`")]
    UnsupportedFormat(String),

    #[error("Missing element `{0}` in product metadata")]
    MissingElement(&'static str),

    #[error("Missing attribute `{0}` in product metadata")]
    MissingAttribute(&'static str),

    #[error("Path to Granule Metadata is invalid: {0}")]
    MissingGranuleMetadata(PathBuf),

    #[error("No band number found in image path `{0}`")]
    BandParse(String),

    #[error("Image format `{0}` is different than JPEG2000")]
    UnsupportedImageFormat(String),

    #[error("invalid number in `{field}`: `{value}`")]
    Number {
        field: &'static str,
        value: String,
    },

    #[error("spectral response error: {0}")]
    Rsr(#[from] crate::core::rsr::RsrError),
}
