#![warn(missing_docs)]
//! Beamline specific error structures
use std::{error::Error, fmt::Display};

/// Beamline application specific Result type
pub type BlResult<T> = std::result::Result<T, BeamlineError>;

/// Errors that can be returned by the ray transport engine.
///
/// None of these errors is transient. They are reported to the immediate caller, which decides
/// whether to skip a ray or abort the whole scenario.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum BeamlineError {
    /// normalization of a zero-length vector was requested (e.g. a zero incident direction)
    DegenerateVector(String),
    /// a ray is (anti-)parallel to the plane of an element during intersection
    DegenerateGeometry(String),
    /// malformed element construction parameters (unknown orientation, negative extents, ...)
    InvalidConfiguration(String),
    /// errors while reading or parsing a [`BeamlineDocument`](crate::beamline_document::BeamlineDocument)
    Document(String),
}

impl Display for BeamlineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DegenerateVector(m) => {
                write!(f, "DegenerateVector:{m}")
            }
            Self::DegenerateGeometry(m) => {
                write!(f, "DegenerateGeometry:{m}")
            }
            Self::InvalidConfiguration(m) => {
                write!(f, "InvalidConfiguration:{m}")
            }
            Self::Document(m) => write!(f, "Document:{m}"),
        }
    }
}
impl Error for BeamlineError {}

impl std::convert::From<String> for BeamlineError {
    fn from(msg: String) -> Self {
        Self::InvalidConfiguration(msg)
    }
}
