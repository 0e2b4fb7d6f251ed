//! This is the documentation for the **beamray** package, a geometric ray transport engine for X-ray
//! beamlines.
//!
//! A beamline is modelled as a chain of optical elements (annular [collimators](nodes::Collimator) and
//! [flat mirrors](nodes::FlatMirror)) ordered along the nominal beam axis (z). Rays generated by an extended
//! [`Source`](nodes::Source) are traced through the chain one at a time. Every element returns a new ray starting
//! at the intersection point with its working plane, which may be reflected, passed or stopped.
//!
//! ## Example
//!
//! ```rust
//! use beamray::{
//!     meter, radian,
//!     nodes::{Collimator, FlatMirror, MirrorOrientation},
//!     ray::Ray,
//!     Beamline,
//! };
//! use nalgebra::Vector3;
//!
//! let mut beamline = Beamline::new();
//! beamline
//!     .add_element(
//!         FlatMirror::new("M1K3", meter!(1.25, 0.0, 735.422), MirrorOrientation::XPlus, Vector3::z())
//!             .unwrap()
//!             .with_tilt(radian!(-0.0098468)),
//!     )
//!     .unwrap();
//! beamline
//!     .add_element(
//!         Collimator::from_diameters("PC1K3", meter!(0.0, 0.0, 744.0), meter!(0.008), meter!(0.084))
//!             .unwrap()
//!             .derived_from_mirror("M1K3"),
//!     )
//!     .unwrap();
//! let rays = beamline.trace(&Ray::along_z(meter!(1.25, 0.0, 690.0))).unwrap();
//! assert_eq!(rays.len(), 3);
//! assert!(!rays[2].stopped());
//! ```
#![allow(clippy::module_name_repetitions)]

pub mod beamline;
pub mod beamline_document;
pub mod error;
pub mod footprint;
pub mod nodes;
pub mod optic_element;
pub mod ray;
pub mod surface;
pub mod utils;

pub use beamline::Beamline;
pub use beamline_document::BeamlineDocument;
