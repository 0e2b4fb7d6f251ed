#![warn(missing_docs)]
//! Module for handling rays travelling through a beamline
use std::fmt::Display;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use uom::si::{f64::Length, length::meter};

use crate::{
    error::BlResult,
    utils::geom_transformation::{normalized_checked, point_from_meter, point_in_meter},
};

/// An oriented line segment (origin and direction) through the beamline.
///
/// A [`Ray`] is immutable by convention: every optical element creates a new [`Ray`] starting at the
/// intersection point with its working plane. A *stopped* ray has been absorbed at its origin. It carries
/// a zero direction vector, so its terminal segment has zero length.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Ray {
    /// origin of the ray
    pos: Point3<Length>,
    /// propagation direction (unit length, zero for a stopped ray)
    dir: Vector3<f64>,
    /// true if the ray has been blocked
    stopped: bool,
}
impl Ray {
    /// Creates a new [`Ray`].
    ///
    /// The direction vector is normalized before it is stored.
    ///
    /// # Errors
    ///
    /// This function returns [`BeamlineError::DegenerateVector`](crate::error::BeamlineError::DegenerateVector)
    /// if the direction vector has zero length.
    pub fn new(position: Point3<Length>, direction: Vector3<f64>) -> BlResult<Self> {
        Ok(Self {
            pos: position,
            dir: normalized_checked(&direction)?,
            stopped: false,
        })
    }
    /// Creates a new [`Ray`] propagating along the nominal beam axis (+z).
    #[must_use]
    pub fn along_z(position: Point3<Length>) -> Self {
        Self {
            pos: position,
            dir: Vector3::z(),
            stopped: false,
        }
    }
    /// Creates a stopped [`Ray`] which was absorbed at the given position.
    #[must_use]
    pub fn stopped_at(position: Point3<Length>) -> Self {
        Self {
            pos: position,
            dir: Vector3::zeros(),
            stopped: true,
        }
    }
    /// Returns a copy of this [`Ray`] moved to a new origin, keeping its direction.
    #[must_use]
    pub fn moved_to(&self, position: Point3<Length>) -> Self {
        Self {
            pos: position,
            ..self.clone()
        }
    }
    /// Returns the origin of this [`Ray`].
    #[must_use]
    pub fn position(&self) -> Point3<Length> {
        self.pos
    }
    /// Returns the (unit) direction of this [`Ray`].
    ///
    /// The direction of a stopped ray is the zero vector.
    #[must_use]
    pub const fn direction(&self) -> Vector3<f64> {
        self.dir
    }
    /// Returns `true` if this [`Ray`] has been blocked.
    #[must_use]
    pub const fn stopped(&self) -> bool {
        self.stopped
    }
    /// Returns the point at the given distance from the origin along the ray direction.
    ///
    /// This is mainly used to get the end point of a segment for drawing. A stopped ray always returns its origin.
    #[must_use]
    pub fn end_point(&self, length: Length) -> Point3<Length> {
        point_from_meter(&(point_in_meter(&self.pos) + length.get::<meter>() * self.dir))
    }
}
impl Display for Ray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = Length::format_args(meter, uom::fmt::DisplayStyle::Abbreviation);
        write!(
            f,
            "pos: ({}, {}, {}), dir: ({}, {}, {}), stopped: {}",
            m.with(self.pos[0]),
            m.with(self.pos[1]),
            m.with(self.pos[2]),
            self.dir[0],
            self.dir[1],
            self.dir[2],
            self.stopped
        )
    }
}
