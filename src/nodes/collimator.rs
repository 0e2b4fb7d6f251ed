#![warn(missing_docs)]
//! Annular (donut-shaped) collimator
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use num::Zero;
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use super::FlatMirror;
use crate::{
    error::{BeamlineError, BlResult},
    footprint::Footprint,
    optic_element::Transport,
    ray::Ray,
    surface::{Plane, PARALLEL_TOLERANCE},
    utils::geom_transformation::{normalized_checked, point_from_meter, point_in_meter},
};

/// An annular blocking stop.
///
/// The collimator is a disc of blocking material with a hole in its center. Rays hitting the plane of the
/// collimator with a distance from its center
///   - smaller than `inner_radius` pass through the hole,
///   - between `inner_radius` and `outer_radius` (both inclusive) are stopped,
///   - larger than `outer_radius` pass outside the material.
///
/// By default the collimator is oriented perpendicular to the nominal beam axis (+z). A collimator can be *derived*
/// from an upstream [`FlatMirror`] (see [`Collimator::align_to_mirror`]) so that it follows the reflected beam of that
/// mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collimator {
    name: String,
    center: Point3<Length>,
    normal: Vector3<f64>,
    inner_radius: Length,
    outer_radius: Length,
    derived_from: Option<String>,
}
impl Collimator {
    /// Creates a new [`Collimator`] perpendicular to the nominal beam axis.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a radius is negative or not finite.
    ///   - the outer radius is zero.
    ///   - the outer radius is smaller than the inner radius.
    ///   - the center point is not finite.
    pub fn new(
        name: &str,
        center: Point3<Length>,
        inner_radius: Length,
        outer_radius: Length,
    ) -> BlResult<Self> {
        if inner_radius.is_sign_negative() || !inner_radius.is_finite() {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{name}: inner radius must be >= zero and finite"
            )));
        }
        if outer_radius.is_zero() || outer_radius.is_sign_negative() || !outer_radius.is_finite() {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{name}: outer radius must be > zero and finite"
            )));
        }
        if outer_radius < inner_radius {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{name}: outer radius must be >= inner radius"
            )));
        }
        if center.iter().any(|c| !c.is_finite()) {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{name}: center must be finite"
            )));
        }
        Ok(Self {
            name: name.to_owned(),
            center,
            normal: Vector3::z(),
            inner_radius,
            outer_radius,
            derived_from: None,
        })
    }
    /// Creates a new [`Collimator`] from its inner and outer diameter.
    ///
    /// # Errors
    ///
    /// This function will return an error under the same conditions as [`Collimator::new`].
    pub fn from_diameters(
        name: &str,
        center: Point3<Length>,
        inner_diameter: Length,
        outer_diameter: Length,
    ) -> BlResult<Self> {
        Self::new(name, center, inner_diameter / 2.0, outer_diameter / 2.0)
    }
    /// Modifies the reference normal of a [`Collimator`]. This function can be used with the "builder pattern".
    ///
    /// # Errors
    ///
    /// This function will return an error if the given normal vector has zero length.
    pub fn with_normal(mut self, normal: Vector3<f64>) -> BlResult<Self> {
        self.normal = normalized_checked(&normal)?;
        Ok(self)
    }
    /// Registers the name of the [`FlatMirror`] this [`Collimator`] is derived from.
    ///
    /// The actual alignment is done by the [`Beamline`](crate::beamline::Beamline) holding both elements.
    #[must_use]
    pub fn derived_from_mirror(mut self, mirror_name: &str) -> Self {
        self.set_derived_from(Some(mirror_name));
        self
    }
    /// Sets (or removes) the name of the [`FlatMirror`] this [`Collimator`] is derived from.
    pub fn set_derived_from(&mut self, mirror_name: Option<&str>) {
        self.derived_from = mirror_name.map(ToOwned::to_owned);
    }
    /// Returns the name of this [`Collimator`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the center of this [`Collimator`].
    #[must_use]
    pub fn center(&self) -> Point3<Length> {
        self.center
    }
    /// Returns the reference normal of this [`Collimator`].
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }
    /// Returns the inner radius (radius of the hole) of this [`Collimator`].
    #[must_use]
    pub fn inner_radius(&self) -> Length {
        self.inner_radius
    }
    /// Returns the outer radius (radius of the material) of this [`Collimator`].
    #[must_use]
    pub fn outer_radius(&self) -> Length {
        self.outer_radius
    }
    /// Returns the name of the mirror this [`Collimator`] is derived from (if any).
    #[must_use]
    pub fn derived_from(&self) -> Option<&str> {
        self.derived_from.as_deref()
    }
    /// Returns the working plane of this [`Collimator`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the stored normal is degenerate.
    pub fn plane(&self) -> BlResult<Plane> {
        Plane::new(self.center, self.normal)
    }
    /// Align this [`Collimator`] to the nominal reflected beam of the given [`FlatMirror`].
    ///
    /// The position along the beam axis (z) is kept. The transverse position is moved onto the nominal reflected beam
    /// starting at the mirror center and the reference normal is set to the reflected direction.
    ///
    /// # Errors
    ///
    /// This function will return [`BeamlineError::DegenerateGeometry`] if the reflected beam of the mirror does not
    /// propagate along z at all.
    pub fn align_to_mirror(&mut self, mirror: &FlatMirror) -> BlResult<()> {
        let out = mirror.nominal_reflected();
        if out.z.abs() < PARALLEL_TOLERANCE {
            return Err(BeamlineError::DegenerateGeometry(format!(
                "{}: reflected beam of mirror {} is perpendicular to the beam axis",
                self.name,
                mirror.name()
            )));
        }
        if out.z.is_sign_negative() {
            warn!(
                "{}: reflected beam of mirror {} propagates backwards",
                self.name,
                mirror.name()
            );
        }
        let mirror_center = point_in_meter(&mirror.center());
        let distance = self.center.z.value - mirror_center.z;
        self.center = point_from_meter(&Vector3::new(
            (out.x / out.z).mul_add(distance, mirror_center.x),
            (out.y / out.z).mul_add(distance, mirror_center.y),
            self.center.z.value,
        ));
        self.normal = out;
        info!("aligned collimator {} to mirror {}", self.name, mirror.name());
        Ok(())
    }
    /// Returns the axis-aligned bounding box of the material disc of this [`Collimator`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the footprint cannot be calculated (non-finite geometry).
    pub fn footprint(&self) -> BlResult<Footprint> {
        let n = normalized_checked(&self.normal)?;
        let radius = self.outer_radius.value;
        let half_extent = n.map(|c| radius * (1.0 - c * c).max(0.0).sqrt());
        let center = point_in_meter(&self.center);
        Footprint::from_points(&[
            point_from_meter(&(center - half_extent)),
            point_from_meter(&(center + half_extent)),
        ])
        .ok_or_else(|| {
            BeamlineError::InvalidConfiguration(format!("{}: footprint is not finite", self.name))
        })
    }
}
impl Transport for Collimator {
    fn transport(&self, ray: &Ray) -> BlResult<Ray> {
        if ray.stopped() {
            return Ok(ray.clone());
        }
        let intersection = self.plane()?.intersect(ray)?;
        let distance = meter_distance(&intersection, &self.center);
        if self.inner_radius.value <= distance && distance <= self.outer_radius.value {
            Ok(Ray::stopped_at(intersection))
        } else {
            Ok(ray.moved_to(intersection))
        }
    }
}
fn meter_distance(a: &Point3<Length>, b: &Point3<Length>) -> f64 {
    (point_in_meter(a) - point_in_meter(b)).norm()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{meter, millimeter, nodes::MirrorOrientation, radian};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;

    fn collimator() -> Collimator {
        Collimator::new("PC", meter!(0.0, 0.0, 1.0), meter!(0.004), meter!(0.028)).unwrap()
    }
    fn ray_hitting_at(radial_distance: f64) -> Ray {
        Ray::along_z(meter!(radial_distance, 0.0, 0.0))
    }
    #[test]
    fn new() {
        let c = collimator();
        assert_eq!(c.name(), "PC");
        assert_eq!(c.center(), meter!(0.0, 0.0, 1.0));
        assert_eq!(c.normal(), Vector3::z());
        assert_eq!(c.inner_radius(), meter!(0.004));
        assert_eq!(c.outer_radius(), meter!(0.028));
        assert_eq!(c.derived_from(), None);
    }
    #[test]
    fn new_wrong() {
        let center = meter!(0.0, 0.0, 1.0);
        assert_matches!(
            Collimator::new("c", center, millimeter!(-1.0), millimeter!(28.0)),
            Err(BeamlineError::InvalidConfiguration(_))
        );
        assert!(Collimator::new("c", center, millimeter!(f64::NAN), millimeter!(28.0)).is_err());
        assert!(Collimator::new("c", center, millimeter!(4.0), millimeter!(0.0)).is_err());
        assert!(Collimator::new("c", center, millimeter!(4.0), millimeter!(f64::INFINITY)).is_err());
        assert!(Collimator::new("c", center, millimeter!(4.0), millimeter!(3.0)).is_err());
        assert!(Collimator::new("c", meter!(f64::NAN, 0.0, 0.0), millimeter!(1.0), millimeter!(3.0))
            .is_err());
        assert!(Collimator::new("c", center, millimeter!(0.0), millimeter!(3.0)).is_ok());
        assert!(Collimator::new("c", center, millimeter!(3.0), millimeter!(3.0)).is_ok());
    }
    #[test]
    fn from_diameters() {
        let c = Collimator::from_diameters(
            "PC2S",
            meter!(1.25, 0.0, 731.145),
            meter!(0.016),
            meter!(0.055),
        )
        .unwrap();
        assert_relative_eq!(c.inner_radius().value, 0.008);
        assert_relative_eq!(c.outer_radius().value, 0.0275);
    }
    #[test]
    fn with_normal() {
        let c = collimator().with_normal(Vector3::new(0.0, 0.0, 2.0)).unwrap();
        assert_eq!(c.normal(), Vector3::z());
        assert_matches!(
            collimator().with_normal(Vector3::zeros()),
            Err(BeamlineError::DegenerateVector(_))
        );
    }
    #[test]
    fn transport_blocked() {
        let ray = collimator().transport(&ray_hitting_at(0.01)).unwrap();
        assert!(ray.stopped());
        assert_eq!(ray.position(), meter!(0.01, 0.0, 1.0));
        assert_eq!(ray.end_point(meter!(1.0)), ray.position());
    }
    #[test]
    fn transport_through_hole() {
        let input = ray_hitting_at(0.002);
        let ray = collimator().transport(&input).unwrap();
        assert!(!ray.stopped());
        assert_eq!(ray.position(), meter!(0.002, 0.0, 1.0));
        assert_eq!(ray.direction(), input.direction());
    }
    #[test]
    fn transport_outside() {
        let ray = collimator().transport(&ray_hitting_at(0.05)).unwrap();
        assert!(!ray.stopped());
        assert_eq!(ray.position(), meter!(0.05, 0.0, 1.0));
    }
    #[test]
    fn transport_edges_are_blocking() {
        assert!(collimator()
            .transport(&ray_hitting_at(0.028))
            .unwrap()
            .stopped());
        assert!(collimator()
            .transport(&Ray::along_z(meter!(0.0, 0.004, 0.0)))
            .unwrap()
            .stopped());
    }
    #[test]
    fn transport_uses_3d_distance() {
        let c = Collimator::new(
            "c",
            meter!(3.0, 0.0, 0.0),
            meter!(1.0),
            meter!(3.0),
        )
        .unwrap()
        .with_normal(Vector3::new(1.0, 1.0, 0.0))
        .unwrap();
        let input = Ray::new(meter!(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        // intersection at (1.5, 1.5, 0) has a distance of sqrt(4.5) from the center
        let ray = c.transport(&input).unwrap();
        assert!(ray.stopped());
        assert_relative_eq!(ray.position().x.value, 1.5, epsilon = 1e-12);
    }
    #[test]
    fn transport_parallel() {
        let input = Ray::new(meter!(0.0, 0.0, 0.0), Vector3::x()).unwrap();
        assert_matches!(
            collimator().transport(&input),
            Err(BeamlineError::DegenerateGeometry(_))
        );
    }
    #[test]
    fn transport_stopped_ray() {
        let input = Ray::stopped_at(meter!(0.01, 0.0, 0.5));
        assert_eq!(collimator().transport(&input).unwrap(), input);
    }
    #[test]
    fn transport_does_not_mutate() {
        let c = collimator();
        let before = c.clone();
        let _ = c.transport(&ray_hitting_at(0.01)).unwrap();
        assert_eq!(c, before);
    }
    #[test]
    fn align_to_mirror() {
        testing_logger::setup();
        let mirror = FlatMirror::new(
            "M1K3",
            meter!(1.25, 0.0, 735.422),
            MirrorOrientation::XPlus,
            Vector3::z(),
        )
        .unwrap()
        .with_tilt(radian!(-0.0098468));
        let mut c = Collimator::from_diameters(
            "PC1K3",
            meter!(0.0, 0.0, 744.0),
            meter!(0.008),
            meter!(0.084),
        )
        .unwrap()
        .derived_from_mirror("M1K3");
        c.align_to_mirror(&mirror).unwrap();
        let out = mirror.nominal_reflected();
        assert_eq!(c.normal(), out);
        assert_relative_eq!(c.center().z.value, 744.0);
        assert_relative_eq!(
            c.center().x.value,
            1.25 + out.x / out.z * (744.0 - 735.422),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(c.center().y.value, 0.0);
        assert_eq!(c.derived_from(), Some("M1K3"));
        // a ray along the nominal reflected beam passes the center of the hole
        let ray = Ray::new(mirror.center(), out).unwrap();
        let through = c.transport(&ray).unwrap();
        assert!(!through.stopped());
        assert_relative_eq!(
            (point_in_meter(&through.position()) - point_in_meter(&c.center())).norm(),
            0.0,
            epsilon = 1e-9
        );
    }
    #[test]
    fn footprint() {
        let f = collimator().footprint().unwrap();
        assert_relative_eq!(f.min().x.value, -0.028);
        assert_relative_eq!(f.max().y.value, 0.028);
        assert_relative_eq!(f.min().z.value, 1.0);
        assert_relative_eq!(f.max().z.value, 1.0);
        let tilted = collimator().with_normal(Vector3::new(1.0, 0.0, 1.0)).unwrap();
        let f = tilted.footprint().unwrap();
        assert_relative_eq!(f.max().x.value, 0.028 * std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(f.max().z.value - 1.0, 0.028 * std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(f.max().y.value, 0.028, epsilon = 1e-12);
    }
}
