#![warn(missing_docs)]
//! Axis-aligned bounding extent of the physical footprint of beamline elements.
//!
//! A [`Footprint`] is what a drawing collaborator needs to set up its axis limits. Footprints of several elements
//! can be merged and padded.
use log::warn;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::utils::geom_transformation::{point_component, point_from_meter, point_in_meter, Axis};

/// Axis-aligned box in the global (beamline) coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    min: Point3<Length>,
    max: Point3<Length>,
}
impl Footprint {
    /// Create the smallest [`Footprint`] containing all given points.
    ///
    /// Returns `None` if no points are given or a point has a non-finite coordinate.
    #[must_use]
    pub fn from_points(points: &[Point3<Length>]) -> Option<Self> {
        let first = point_in_meter(points.first()?);
        let (mut min, mut max) = (first, first);
        for point in points {
            if point.iter().any(|c| !c.is_finite()) {
                warn!("Cannot create footprint from non-finite point.");
                return None;
            }
            let point = point_in_meter(point);
            min = min.inf(&point);
            max = max.sup(&point);
        }
        Some(Self {
            min: point_from_meter(&min),
            max: point_from_meter(&max),
        })
    }
    /// Returns the minimum corner of this [`Footprint`].
    #[must_use]
    pub fn min(&self) -> Point3<Length> {
        self.min
    }
    /// Returns the maximum corner of this [`Footprint`].
    #[must_use]
    pub fn max(&self) -> Point3<Length> {
        self.max
    }
    /// Returns the `(min, max)` interval of this [`Footprint`] along the given axis.
    #[must_use]
    pub fn range(&self, axis: Axis) -> (Length, Length) {
        (
            point_component(&self.min, axis),
            point_component(&self.max, axis),
        )
    }
    /// Returns the smallest [`Footprint`] containing this and another [`Footprint`].
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: point_from_meter(&point_in_meter(&self.min).inf(&point_in_meter(&other.min))),
            max: point_from_meter(&point_in_meter(&self.max).sup(&point_in_meter(&other.max))),
        }
    }
    /// Returns `true` if the given point lies inside (or on the border of) this [`Footprint`].
    #[must_use]
    pub fn contains(&self, point: &Point3<Length>) -> bool {
        (0..3).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }
    /// Returns a copy of this [`Footprint`] whose extent along each axis is padded by `ratio` times its size on
    /// both sides.
    ///
    /// An invalid ratio (negative or not finite) returns the unpadded footprint.
    #[must_use]
    pub fn padded(&self, ratio: f64) -> Self {
        if !ratio.is_finite() || ratio.is_sign_negative() {
            warn!("Cannot pad footprint! Ratio must be finite and positive!");
            return *self;
        }
        let (min, max) = (point_in_meter(&self.min), point_in_meter(&self.max));
        let padding = (max - min) * ratio;
        Self {
            min: point_from_meter(&(min - padding)),
            max: point_from_meter(&(max + padding)),
        }
    }
}
