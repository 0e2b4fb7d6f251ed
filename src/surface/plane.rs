//! Flat surface
//!
//! An infinitely large flat surface defined by an anchor point and a normal vector. This is the shared
//! intersection primitive of all optical elements.

use crate::{
    error::{BeamlineError, BlResult},
    ray::Ray,
    utils::geom_transformation::{normalized_checked, point_from_meter, point_in_meter},
};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

/// Lower limit of `|n·u|` (both unit vectors) below which a ray is treated as parallel to a plane.
pub const PARALLEL_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// An infinitely large flat surface.
pub struct Plane {
    anchor: Point3<Length>,
    normal: Vector3<f64>,
}
impl Plane {
    /// Create a new [`Plane`] through the given anchor point with the given normal vector.
    ///
    /// The normal vector is normalized before it is stored.
    /// # Errors
    ///
    /// This function will return an error if the normal vector has zero length.
    pub fn new(anchor: Point3<Length>, normal: Vector3<f64>) -> BlResult<Self> {
        Ok(Self {
            anchor,
            normal: normalized_checked(&normal)?,
        })
    }
    /// Returns the anchor point of this [`Plane`].
    #[must_use]
    pub fn anchor(&self) -> Point3<Length> {
        self.anchor
    }
    /// Returns the (unit) normal vector of this [`Plane`].
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }
    /// Calculate the intersection point of a [`Ray`] with this [`Plane`].
    ///
    /// The ray parameter is `s = n·(v0 - p0) / n·u`. It may be negative, i.e. the intersection point may lie
    /// behind the ray origin.
    ///
    /// # Errors
    ///
    /// This function will return [`BeamlineError::DegenerateGeometry`] if the ray direction is (anti-)parallel
    /// to the plane (this includes the zero direction of a stopped ray).
    pub fn intersect(&self, ray: &Ray) -> BlResult<Point3<Length>> {
        let direction = ray.direction();
        let denominator = self.normal.dot(&direction);
        if denominator.abs() < PARALLEL_TOLERANCE {
            return Err(BeamlineError::DegenerateGeometry(format!(
                "ray direction ({}, {}, {}) is parallel to plane with normal ({}, {}, {})",
                direction.x, direction.y, direction.z, self.normal.x, self.normal.y, self.normal.z
            )));
        }
        let origin = point_in_meter(&ray.position());
        let s = self.normal.dot(&(point_in_meter(&self.anchor) - origin)) / denominator;
        Ok(point_from_meter(&(origin + s * direction)))
    }
}
