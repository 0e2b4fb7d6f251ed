#![warn(missing_docs)]
//! Flat grazing-incidence mirror
mod envelope;

pub use envelope::{MirrorPose, MotionEnvelope};

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Point3, Vector3};
use num::Zero;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uom::si::f64::{Angle, Length};

use crate::{
    error::{BeamlineError, BlResult},
    footprint::Footprint,
    meter,
    optic_element::Transport,
    radian,
    ray::Ray,
    surface::Plane,
    utils::geom_transformation::{
        normalized_checked, point_component, point_from_meter, point_in_meter, reflect,
        rotate_about_axis, Axis,
    },
};

/// Orientation of a [`FlatMirror`].
///
/// The first part denotes the plane of reflection (the axis along which the beam is deflected), the second part
/// the side of the working surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MirrorOrientation {
    /// horizontally reflecting, working surface facing +x
    #[serde(rename = "x+")]
    #[strum(serialize = "x+")]
    XPlus,
    /// horizontally reflecting, working surface facing -x
    #[serde(rename = "x-")]
    #[strum(serialize = "x-")]
    XMinus,
    /// vertically reflecting, working surface facing +y
    #[serde(rename = "y+")]
    #[strum(serialize = "y+")]
    YPlus,
    /// vertically reflecting, working surface facing -y
    #[serde(rename = "y-")]
    #[strum(serialize = "y-")]
    YMinus,
}
impl MirrorOrientation {
    /// Parse an orientation tag (`"x+"`, `"x-"`, `"y+"`, `"y-"`, case-insensitive).
    ///
    /// # Errors
    ///
    /// This function will return [`BeamlineError::InvalidConfiguration`] for any other tag.
    pub fn from_tag(tag: &str) -> BlResult<Self> {
        tag.trim().parse().map_err(|_| {
            BeamlineError::InvalidConfiguration(format!(
                "invalid mirror orientation '{tag}'. Use only x+, x-, y+, or y-"
            ))
        })
    }
    /// Returns the axis along which the beam is deflected.
    #[must_use]
    pub const fn reflection_axis(self) -> Axis {
        match self {
            Self::XPlus | Self::XMinus => Axis::X,
            Self::YPlus | Self::YMinus => Axis::Y,
        }
    }
    /// Returns the axis about which the mirror is tilted.
    #[must_use]
    pub const fn rotation_axis(self) -> Axis {
        match self {
            Self::XPlus | Self::XMinus => Axis::Y,
            Self::YPlus | Self::YMinus => Axis::X,
        }
    }
    /// Returns the side sign (`+1.0` or `-1.0`) of this orientation.
    #[must_use]
    pub const fn sign(self) -> f64 {
        match self {
            Self::XPlus | Self::YPlus => 1.0,
            Self::XMinus | Self::YMinus => -1.0,
        }
    }
}

/// A rectangular flat mirror with finite length, width and thickness.
///
/// The working normal is derived from the nominal incident direction, the orientation and the tilt angle: the
/// incident direction is first rotated by `sign·tilt` about the [rotation axis](MirrorOrientation::rotation_axis)
/// giving the direction along the mirror length, which is then rotated by another `sign·π/2`.
///
/// A ray is reflected if its intersection point with the working plane lies within the projection of the mirror
/// length onto the beam axis (z). Otherwise it passes the mirror unchanged. The lateral (width) extent is not
/// checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatMirror {
    name: String,
    center: Point3<Length>,
    orientation: MirrorOrientation,
    nominal_incidence: Vector3<f64>,
    half_length: Length,
    half_width: Length,
    thickness: Length,
    tilt: Angle,
    envelope: MotionEnvelope,
    normal: Vector3<f64>,
    nominal_reflected: Vector3<f64>,
}
impl FlatMirror {
    /// Creates a new [`FlatMirror`] with zero tilt.
    ///
    /// The mirror is 1 m long, 20 mm wide and 20 mm thick by default (see [`FlatMirror::with_size`]).
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the nominal incident direction has zero length.
    ///   - the center is not finite.
    pub fn new(
        name: &str,
        center: Point3<Length>,
        orientation: MirrorOrientation,
        nominal_incidence: Vector3<f64>,
    ) -> BlResult<Self> {
        if center.iter().any(|c| !c.is_finite()) {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{name}: center must be finite"
            )));
        }
        let mut mirror = Self {
            name: name.to_owned(),
            center,
            orientation,
            nominal_incidence: normalized_checked(&nominal_incidence)?,
            half_length: meter!(0.5),
            half_width: meter!(0.01),
            thickness: meter!(0.02),
            tilt: Angle::zero(),
            envelope: MotionEnvelope::default(),
            normal: Vector3::zeros(),
            nominal_reflected: Vector3::zeros(),
        };
        mirror.update_working_surface();
        Ok(mirror)
    }
    /// Modifies the dimensions of a [`FlatMirror`]. This function can be used with the "builder pattern".
    ///
    /// # Errors
    ///
    /// This function will return an error if one of the dimensions is not positive or not finite.
    pub fn with_size(mut self, length: Length, width: Length, thickness: Length) -> BlResult<Self> {
        for (label, value) in [("length", length), ("width", width), ("thickness", thickness)] {
            if value.is_zero() || value.is_sign_negative() || !value.is_finite() {
                return Err(BeamlineError::InvalidConfiguration(format!(
                    "{}: mirror {label} must be > zero and finite",
                    self.name
                )));
            }
        }
        self.half_length = length / 2.0;
        self.half_width = width / 2.0;
        self.thickness = thickness;
        Ok(self)
    }
    /// Modifies the tilt angle of a [`FlatMirror`]. This function can be used with the "builder pattern".
    #[must_use]
    pub fn with_tilt(mut self, tilt: Angle) -> Self {
        self.set_tilt(tilt);
        self
    }
    /// Modifies the motion envelope of a [`FlatMirror`]. This function can be used with the "builder pattern".
    #[must_use]
    pub fn with_envelope(mut self, envelope: MotionEnvelope) -> Self {
        self.envelope = envelope;
        self
    }
    /// Sets the tilt angle and recalculates the working normal and the nominal reflected direction.
    pub fn set_tilt(&mut self, tilt: Angle) {
        self.tilt = tilt;
        self.update_working_surface();
    }
    /// Permanently move this mirror by the given [`MirrorPose`].
    ///
    /// The tilt offset is added to the tilt angle and the center is shifted by `sign·translation` along the reflection
    /// axis. Transporting a ray through the moved mirror is equivalent to [`FlatMirror::transport_with_pose`].
    pub fn apply_pose(&mut self, pose: &MirrorPose) {
        self.center = self.shifted_center(pose.translation);
        self.set_tilt(self.tilt + pose.tilt_offset);
    }
    fn shifted_center(&self, translation: Length) -> Point3<Length> {
        let shift = self.orientation.reflection_axis().unit_vector()
            * (self.orientation.sign() * translation.value);
        point_from_meter(&(point_in_meter(&self.center) + shift))
    }
    fn length_direction(&self, tilt: Angle) -> Vector3<f64> {
        rotate_about_axis(
            &self.nominal_incidence,
            tilt * self.orientation.sign(),
            self.orientation.rotation_axis(),
        )
    }
    fn update_working_surface(&mut self) {
        let along = self.length_direction(self.tilt);
        self.normal = rotate_about_axis(
            &along,
            radian!(self.orientation.sign() * FRAC_PI_2),
            self.orientation.rotation_axis(),
        );
        // incidence and normal are unit vectors by construction
        self.nominal_reflected =
            self.nominal_incidence - 2.0 * self.nominal_incidence.dot(&self.normal) * self.normal;
    }
    /// Returns the name of this [`FlatMirror`].
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    /// Returns the center of this [`FlatMirror`].
    #[must_use]
    pub fn center(&self) -> Point3<Length> {
        self.center
    }
    /// Returns the orientation of this [`FlatMirror`].
    #[must_use]
    pub const fn orientation(&self) -> MirrorOrientation {
        self.orientation
    }
    /// Returns the (unit) nominal incident direction of this [`FlatMirror`].
    #[must_use]
    pub const fn nominal_incidence(&self) -> Vector3<f64> {
        self.nominal_incidence
    }
    /// Returns the current tilt angle of this [`FlatMirror`].
    #[must_use]
    pub fn tilt(&self) -> Angle {
        self.tilt
    }
    /// Returns the working normal of this [`FlatMirror`] at its current tilt.
    #[must_use]
    pub const fn normal(&self) -> Vector3<f64> {
        self.normal
    }
    /// Returns the nominal incident direction reflected at the working surface.
    #[must_use]
    pub const fn nominal_reflected(&self) -> Vector3<f64> {
        self.nominal_reflected
    }
    /// Returns the half length of this [`FlatMirror`].
    #[must_use]
    pub fn half_length(&self) -> Length {
        self.half_length
    }
    /// Returns the half width of this [`FlatMirror`].
    #[must_use]
    pub fn half_width(&self) -> Length {
        self.half_width
    }
    /// Returns the thickness of this [`FlatMirror`].
    #[must_use]
    pub fn thickness(&self) -> Length {
        self.thickness
    }
    /// Returns the motion envelope of this [`FlatMirror`].
    #[must_use]
    pub const fn envelope(&self) -> &MotionEnvelope {
        &self.envelope
    }
    /// Returns the eight corners of the mirror body at the current tilt.
    ///
    /// The first four corners belong to the upstream end, the last four to the downstream end. Each group runs
    /// over working surface and back side in the order (surface, +w), (back, +w), (back, -w), (surface, -w).
    #[must_use]
    pub fn vertices(&self) -> Vec<Point3<Length>> {
        let along = self.length_direction(self.tilt);
        let lateral = along.cross(&self.normal).normalize();
        let depth = self.normal * (self.orientation.sign() * self.thickness.value);
        let center = point_in_meter(&self.center);
        let half_width = lateral * self.half_width.value;
        let half_length = along * self.half_length.value;
        [-half_length, half_length]
            .iter()
            .flat_map(|end| {
                let front_plus = center + half_width + end;
                let front_minus = center - half_width + end;
                [
                    front_plus,
                    front_plus - depth,
                    front_minus - depth,
                    front_minus,
                ]
            })
            .map(|v| point_from_meter(&v))
            .collect()
    }
    /// Returns the axis-aligned bounding box of the mirror body at the current tilt.
    ///
    /// # Errors
    ///
    /// This function will return an error if the mirror geometry is not finite.
    pub fn footprint(&self) -> BlResult<Footprint> {
        Footprint::from_points(&self.vertices()).ok_or_else(|| {
            BeamlineError::InvalidConfiguration(format!("{}: footprint is not finite", self.name))
        })
    }
    /// Transport a [`Ray`] through this mirror perturbed by the given [`MirrorPose`].
    ///
    /// The working normal is rotated by `sign·tilt_offset` about the rotation axis and the center is shifted by
    /// `sign·translation` along the reflection axis. The mirror itself is not modified.
    ///
    /// # Errors
    ///
    /// This function will return an error if the ray is parallel to the perturbed working plane.
    pub fn transport_with_pose(&self, ray: &Ray, pose: &MirrorPose) -> BlResult<Ray> {
        let sign = self.orientation.sign();
        let normal = rotate_about_axis(
            &self.normal,
            pose.tilt_offset * sign,
            self.orientation.rotation_axis(),
        );
        self.reflect_within(ray, self.shifted_center(pose.translation), normal)
    }
    fn reflect_within(
        &self,
        ray: &Ray,
        center: Point3<Length>,
        normal: Vector3<f64>,
    ) -> BlResult<Ray> {
        if ray.stopped() {
            return Ok(ray.clone());
        }
        let intersection = Plane::new(center, normal)?.intersect(ray)?;
        let projected = self.half_length
            * self
                .orientation
                .reflection_axis()
                .component(&normal)
                .abs();
        let z = point_component(&intersection, Axis::Z);
        if center.z - projected <= z && z <= center.z + projected {
            Ray::new(intersection, reflect(&ray.direction(), &normal)?)
        } else {
            Ok(ray.moved_to(intersection))
        }
    }
}
impl Transport for FlatMirror {
    fn transport(&self, ray: &Ray) -> BlResult<Ray> {
        self.reflect_within(ray, self.center, self.normal)
    }
}
