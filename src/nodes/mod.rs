//! This module contains the concrete beamline elements (collimators, mirrors) and the ray source.
mod collimator;
pub mod flat_mirror;
mod source;

pub use collimator::Collimator;
pub use flat_mirror::{FlatMirror, MirrorOrientation, MirrorPose, MotionEnvelope};
pub use source::{Source, SourceAperture, SourceShape};
