#![warn(missing_docs)]
//! Extended, divergent X-ray source
//!
//! The source is described by two reference apertures: an `upstream` disc representing the emitting area and a
//! `downstream` disc (typically the first collimator) which defines the divergence. A ray starts at a random point
//! on the upstream aperture and points to a random point on the downstream aperture.
use std::f64::consts::TAU;

use nalgebra::{Point3, Vector3};
use num::Zero;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::{BeamlineError, BlResult},
    footprint::Footprint,
    ray::Ray,
    utils::geom_transformation::{point_from_meter, point_in_meter},
};

/// Shape of a [`SourceAperture`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceShape {
    /// uniformly illuminated disc
    Circle {
        /// diameter of the disc
        diameter: Length,
    },
    /// uniformly illuminated rectangle
    Rectangle {
        /// full extent along x
        width: Length,
        /// full extent along y
        height: Length,
    },
}
impl SourceShape {
    fn validate(&self) -> BlResult<()> {
        let sizes = match self {
            Self::Circle { diameter } => vec![*diameter],
            Self::Rectangle { width, height } => vec![*width, *height],
        };
        if sizes
            .iter()
            .any(|s| s.is_sign_negative() || !s.is_finite())
        {
            return Err(BeamlineError::InvalidConfiguration(
                "source aperture size must be >= zero and finite".into(),
            ));
        }
        Ok(())
    }
    /// transverse half extent (x, y) in meter
    fn half_extent(&self) -> (f64, f64) {
        match self {
            Self::Circle { diameter } => (diameter.value / 2.0, diameter.value / 2.0),
            Self::Rectangle { width, height } => (width.value / 2.0, height.value / 2.0),
        }
    }
}

/// A reference aperture of a [`Source`] perpendicular to the beam axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceAperture {
    /// center of the aperture
    pub center: Point3<Length>,
    /// shape and size of the aperture
    pub shape: SourceShape,
}
impl SourceAperture {
    /// Creates a circular [`SourceAperture`].
    #[must_use]
    pub const fn circle(center: Point3<Length>, diameter: Length) -> Self {
        Self {
            center,
            shape: SourceShape::Circle { diameter },
        }
    }
    /// Creates a rectangular [`SourceAperture`].
    #[must_use]
    pub const fn rectangle(center: Point3<Length>, width: Length, height: Length) -> Self {
        Self {
            center,
            shape: SourceShape::Rectangle { width, height },
        }
    }
    /// Draw a uniformly distributed random point on this [`SourceAperture`].
    ///
    /// For a disc the radius is drawn first (`r = sqrt(U1)·D/2`), then the azimuth (`θ = 2π·U2`).
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point3<Length> {
        let center = point_in_meter(&self.center);
        let offset = match self.shape {
            SourceShape::Circle { diameter } => {
                let r = rng.random::<f64>().sqrt() * diameter.value / 2.0;
                let theta = TAU * rng.random::<f64>();
                let (sin_t, cos_t) = theta.sin_cos();
                Vector3::new(r * cos_t, r * sin_t, 0.0)
            }
            SourceShape::Rectangle { width, height } => Vector3::new(
                (rng.random::<f64>() - 0.5) * width.value,
                (rng.random::<f64>() - 0.5) * height.value,
                0.0,
            ),
        };
        point_from_meter(&(center + offset))
    }
    fn corners(&self) -> [Point3<Length>; 2] {
        let (hx, hy) = self.shape.half_extent();
        let center = point_in_meter(&self.center);
        let half = Vector3::new(hx, hy, 0.0);
        [
            point_from_meter(&(center - half)),
            point_from_meter(&(center + half)),
        ]
    }
}

/// Ray generator between two reference apertures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    upstream: SourceAperture,
    downstream: SourceAperture,
}
impl Source {
    /// Creates a new [`Source`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - an aperture size is negative or not finite.
    ///   - an aperture center is not finite.
    ///   - both apertures have the same center.
    pub fn new(upstream: SourceAperture, downstream: SourceAperture) -> BlResult<Self> {
        upstream.shape.validate()?;
        downstream.shape.validate()?;
        if upstream
            .center
            .iter()
            .chain(downstream.center.iter())
            .any(|c| !c.is_finite())
        {
            return Err(BeamlineError::InvalidConfiguration(
                "source aperture centers must be finite".into(),
            ));
        }
        if (point_in_meter(&downstream.center) - point_in_meter(&upstream.center))
            .norm()
            .is_zero()
        {
            return Err(BeamlineError::InvalidConfiguration(
                "upstream and downstream aperture of a source must not coincide".into(),
            ));
        }
        Ok(Self {
            upstream,
            downstream,
        })
    }
    /// Returns the upstream (emitting) aperture of this [`Source`].
    #[must_use]
    pub const fn upstream(&self) -> &SourceAperture {
        &self.upstream
    }
    /// Returns the downstream (divergence defining) aperture of this [`Source`].
    #[must_use]
    pub const fn downstream(&self) -> &SourceAperture {
        &self.downstream
    }
    /// Generate a single random [`Ray`].
    ///
    /// The origin is sampled on the upstream aperture, the direction points to a point sampled on the downstream
    /// aperture. The generator is owned by the caller. Use a seeded generator for reproducible results.
    ///
    /// # Errors
    ///
    /// This function will return [`BeamlineError::DegenerateVector`] if both sampled points coincide.
    pub fn get_one_ray<R: Rng + ?Sized>(&self, rng: &mut R) -> BlResult<Ray> {
        let start = self.upstream.sample(rng);
        let target = self.downstream.sample(rng);
        Ray::new(start, point_in_meter(&target) - point_in_meter(&start))
    }
    /// Returns the axis-aligned bounding box of both reference apertures.
    ///
    /// # Errors
    ///
    /// This function will return an error if the footprint cannot be calculated.
    pub fn footprint(&self) -> BlResult<Footprint> {
        let [a, b] = self.upstream.corners();
        let [c, d] = self.downstream.corners();
        Footprint::from_points(&[a, b, c, d]).ok_or_else(|| {
            BeamlineError::InvalidConfiguration("source footprint is not finite".into())
        })
    }
}
