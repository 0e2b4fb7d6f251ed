#![warn(missing_docs)]
//! Contains the basic trait representing an optical element of a beamline
//!
//! All elements placed in a [`Beamline`](crate::beamline::Beamline) implement [`Transport`]: they take an
//! incoming [`Ray`] and return the outgoing [`Ray`] starting at the intersection point with their working plane.
//!
//! ## Example
//!
//! ```rust
//! use beamray::{meter, nodes::Collimator, optic_element::Transport, ray::Ray};
//!
//! let pc = Collimator::new("PC", meter!(0.0, 0.0, 1.0), meter!(0.004), meter!(0.028)).unwrap();
//! let ray = pc.transport(&Ray::along_z(meter!(0.01, 0.0, 0.0))).unwrap();
//! assert!(ray.stopped());
//! ```
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use uom::si::f64::Length;

use crate::{
    error::BlResult,
    footprint::Footprint,
    nodes::{Collimator, FlatMirror},
    ray::Ray,
};

/// Trait for the propagation of a single [`Ray`] through an optical element.
pub trait Transport {
    /// Transport a [`Ray`] through this element.
    ///
    /// The element is not modified. A stopped ray is returned unchanged.
    ///
    /// # Errors
    ///
    /// This function will return an error if the ray does not intersect the working plane of the element
    /// (see [`Plane::intersect`](crate::surface::Plane::intersect)).
    fn transport(&self, ray: &Ray) -> BlResult<Ray>;
}

/// An optical element of a [`Beamline`](crate::beamline::Beamline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpticalElement {
    /// an annular stop
    Collimator(Collimator),
    /// a flat grazing incidence mirror
    FlatMirror(FlatMirror),
}
impl OpticalElement {
    /// Returns the name of this [`OpticalElement`].
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Collimator(c) => c.name(),
            Self::FlatMirror(m) => m.name(),
        }
    }
    /// Returns the center of this [`OpticalElement`].
    #[must_use]
    pub fn center(&self) -> Point3<Length> {
        match self {
            Self::Collimator(c) => c.center(),
            Self::FlatMirror(m) => m.center(),
        }
    }
    /// Returns the working plane normal of this [`OpticalElement`].
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        match self {
            Self::Collimator(c) => c.normal(),
            Self::FlatMirror(m) => m.normal(),
        }
    }
    /// Returns a string describing the type of this [`OpticalElement`].
    #[must_use]
    pub const fn element_type(&self) -> &'static str {
        match self {
            Self::Collimator(_) => "collimator",
            Self::FlatMirror(_) => "flat mirror",
        }
    }
    /// Returns the axis-aligned bounding box of this [`OpticalElement`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the geometry of the element is not finite.
    pub fn footprint(&self) -> BlResult<Footprint> {
        match self {
            Self::Collimator(c) => c.footprint(),
            Self::FlatMirror(m) => m.footprint(),
        }
    }
    /// Returns the inner [`FlatMirror`] if this element is a mirror.
    #[must_use]
    pub const fn as_mirror(&self) -> Option<&FlatMirror> {
        match self {
            Self::FlatMirror(m) => Some(m),
            Self::Collimator(_) => None,
        }
    }
    /// Returns the inner [`FlatMirror`] mutably if this element is a mirror.
    pub fn as_mirror_mut(&mut self) -> Option<&mut FlatMirror> {
        match self {
            Self::FlatMirror(m) => Some(m),
            Self::Collimator(_) => None,
        }
    }
    /// Returns the inner [`Collimator`] if this element is a collimator.
    #[must_use]
    pub const fn as_collimator(&self) -> Option<&Collimator> {
        match self {
            Self::Collimator(c) => Some(c),
            Self::FlatMirror(_) => None,
        }
    }
    /// Returns the inner [`Collimator`] mutably if this element is a collimator.
    pub fn as_collimator_mut(&mut self) -> Option<&mut Collimator> {
        match self {
            Self::Collimator(c) => Some(c),
            Self::FlatMirror(_) => None,
        }
    }
}
impl Transport for OpticalElement {
    fn transport(&self, ray: &Ray) -> BlResult<Ray> {
        match self {
            Self::Collimator(c) => c.transport(ray),
            Self::FlatMirror(m) => m.transport(ray),
        }
    }
}
impl From<Collimator> for OpticalElement {
    fn from(collimator: Collimator) -> Self {
        Self::Collimator(collimator)
    }
}
impl From<FlatMirror> for OpticalElement {
    fn from(mirror: FlatMirror) -> Self {
        Self::FlatMirror(mirror)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{meter, nodes::MirrorOrientation};

    fn collimator() -> OpticalElement {
        Collimator::new("PC", meter!(0.0, 0.0, 1.0), meter!(0.004), meter!(0.028))
            .unwrap()
            .into()
    }
    fn mirror() -> OpticalElement {
        FlatMirror::new(
            "M",
            meter!(0.0, 0.0, 2.0),
            MirrorOrientation::XPlus,
            Vector3::z(),
        )
        .unwrap()
        .into()
    }
    #[test]
    fn common_attributes() {
        let c = collimator();
        assert_eq!(c.name(), "PC");
        assert_eq!(c.center(), meter!(0.0, 0.0, 1.0));
        assert_eq!(c.normal(), Vector3::z());
        assert_eq!(c.element_type(), "collimator");
        let m = mirror();
        assert_eq!(m.name(), "M");
        assert_eq!(m.element_type(), "flat mirror");
        assert!(m.footprint().is_ok());
    }
    #[test]
    fn downcast() {
        let mut c = collimator();
        assert!(c.as_collimator().is_some());
        assert!(c.as_collimator_mut().is_some());
        assert!(c.as_mirror().is_none());
        assert!(c.as_mirror_mut().is_none());
        let mut m = mirror();
        assert!(m.as_mirror().is_some());
        assert!(m.as_mirror_mut().is_some());
        assert!(m.as_collimator().is_none());
    }
    #[test]
    fn transport_dispatch() {
        let ray = Ray::along_z(meter!(0.01, 0.0, 0.0));
        let c = collimator();
        assert_eq!(
            c.transport(&ray).unwrap(),
            c.as_collimator().unwrap().transport(&ray).unwrap()
        );
        assert!(c.transport(&ray).unwrap().stopped());
    }
}
