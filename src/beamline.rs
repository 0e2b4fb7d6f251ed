#![warn(missing_docs)]
//! The ordered chain of optical elements forming a beamline.
//!
//! A [`Beamline`] owns its elements and keeps them sorted by the z position of their centers. A ray is traced by
//! transporting it through every element in turn.
use std::collections::HashMap;

use log::warn;
use uom::si::f64::Angle;

use crate::{
    error::{BeamlineError, BlResult},
    footprint::Footprint,
    nodes::{Collimator, FlatMirror, MirrorPose},
    optic_element::{OpticalElement, Transport},
    ray::Ray,
};

/// An ordered list of [`OpticalElement`]s.
///
/// Element names are unique within a [`Beamline`]. Collimators derived from a mirror only store the name of that
/// mirror. The [`Beamline`] re-aligns them whenever it inserts them or modifies a mirror.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Beamline {
    elements: Vec<OpticalElement>,
}
impl Beamline {
    /// Creates a new, empty [`Beamline`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Add an element to this [`Beamline`].
    ///
    /// The element is inserted according to the z position of its center. Elements sharing the same z position keep
    /// their insertion order. A collimator derived from a mirror is aligned to it immediately.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - an element with the same name already exists.
    ///   - the element is a collimator derived from an element which is missing or not a mirror.
    ///   - the derived collimator cannot be aligned to its mirror.
    pub fn add_element(&mut self, element: impl Into<OpticalElement>) -> BlResult<()> {
        let mut element = element.into();
        if self.element(element.name()).is_some() {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "element with name '{}' already exists",
                element.name()
            )));
        }
        if let Some(collimator) = element.as_collimator_mut() {
            if let Some(mirror_name) = collimator.derived_from() {
                let mirror = self.mirror(mirror_name)?;
                warn_if_upstream(collimator, mirror);
                collimator.align_to_mirror(mirror)?;
            }
        }
        let z = element.center().z;
        if let Some(other) = self.elements.iter().find(|e| e.center().z == z) {
            warn!(
                "elements '{}' and '{}' share the same z position",
                other.name(),
                element.name()
            );
        }
        let idx = self.elements.partition_point(|e| e.center().z <= z);
        self.elements.insert(idx, element);
        Ok(())
    }
    /// Derive an already added collimator from an already added mirror and align it.
    ///
    /// # Errors
    ///
    /// This function will return an error if one of the elements is missing or of the wrong type or the collimator
    /// cannot be aligned. The [`Beamline`] is left unchanged in this case.
    pub fn derive_from_mirror(&mut self, collimator_name: &str, mirror_name: &str) -> BlResult<()> {
        let mut derived = self
            .element(collimator_name)
            .ok_or_else(|| unknown_element(collimator_name))?
            .as_collimator()
            .ok_or_else(|| wrong_type(collimator_name, "collimator"))?
            .clone();
        let mirror = self.mirror(mirror_name)?;
        warn_if_upstream(&derived, mirror);
        derived.set_derived_from(Some(mirror_name));
        derived.align_to_mirror(mirror)?;
        *self.collimator_mut(collimator_name)? = derived;
        Ok(())
    }
    /// Set the tilt angle of the given mirror and re-align all collimators derived from it.
    ///
    /// # Errors
    ///
    /// This function will return an error if there is no mirror with the given name or a derived collimator cannot be
    /// aligned. The [`Beamline`] is left unchanged in this case.
    pub fn set_mirror_tilt(&mut self, mirror_name: &str, tilt: Angle) -> BlResult<()> {
        let mut updated = self.clone();
        updated.mirror_mut(mirror_name)?.set_tilt(tilt);
        updated.refresh_derived()?;
        *self = updated;
        Ok(())
    }
    /// Move the given mirror by a [`MirrorPose`] and re-align all collimators derived from it.
    ///
    /// # Errors
    ///
    /// This function will return an error if there is no mirror with the given name or a derived collimator cannot be
    /// aligned. The [`Beamline`] is left unchanged in this case.
    pub fn set_mirror_pose(&mut self, mirror_name: &str, pose: &MirrorPose) -> BlResult<()> {
        let mut updated = self.clone();
        updated.mirror_mut(mirror_name)?.apply_pose(pose);
        updated.refresh_derived()?;
        *self = updated;
        Ok(())
    }
    /// Re-align all derived collimators to their mirrors.
    ///
    /// # Errors
    ///
    /// This function will return an error if a referenced mirror is missing or a collimator cannot be aligned. No
    /// collimator is modified in this case.
    pub fn refresh_derived(&mut self) -> BlResult<()> {
        let mut aligned = Vec::new();
        for (idx, element) in self.elements.iter().enumerate() {
            let Some(collimator) = element.as_collimator() else {
                continue;
            };
            let Some(mirror_name) = collimator.derived_from() else {
                continue;
            };
            let mirror = self
                .element(mirror_name)
                .and_then(OpticalElement::as_mirror)
                .ok_or_else(|| {
                    BeamlineError::InvalidConfiguration(format!(
                        "collimator '{}' is derived from unknown mirror '{mirror_name}'",
                        collimator.name()
                    ))
                })?;
            let mut collimator = collimator.clone();
            collimator.align_to_mirror(mirror)?;
            aligned.push((idx, collimator));
        }
        for (idx, collimator) in aligned {
            self.elements[idx] = collimator.into();
        }
        Ok(())
    }
    /// Returns the element with the given name (if any).
    #[must_use]
    pub fn element(&self, name: &str) -> Option<&OpticalElement> {
        self.elements.iter().find(|e| e.name() == name)
    }
    /// Returns all elements of this [`Beamline`] ordered by z position.
    #[must_use]
    pub fn elements(&self) -> &[OpticalElement] {
        &self.elements
    }
    /// Returns the number of elements of this [`Beamline`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }
    /// Returns `true` if this [`Beamline`] contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
    fn mirror(&self, name: &str) -> BlResult<&FlatMirror> {
        self.element(name)
            .ok_or_else(|| unknown_element(name))?
            .as_mirror()
            .ok_or_else(|| wrong_type(name, "flat mirror"))
    }
    fn mirror_mut(&mut self, name: &str) -> BlResult<&mut FlatMirror> {
        self.elements
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| unknown_element(name))?
            .as_mirror_mut()
            .ok_or_else(|| wrong_type(name, "flat mirror"))
    }
    fn collimator_mut(&mut self, name: &str) -> BlResult<&mut Collimator> {
        self.elements
            .iter_mut()
            .find(|e| e.name() == name)
            .ok_or_else(|| unknown_element(name))?
            .as_collimator_mut()
            .ok_or_else(|| wrong_type(name, "collimator"))
    }
    /// Trace a single [`Ray`] through all elements of this [`Beamline`].
    ///
    /// The result contains the input ray followed by the ray leaving each element, i.e. `len() + 1` rays. Once a
    /// ray has been stopped it is no longer transported. All subsequent entries are copies of the stopped ray.
    ///
    /// # Errors
    ///
    /// This function will return the first error of an element transport.
    pub fn trace(&self, ray: &Ray) -> BlResult<Vec<Ray>> {
        self.trace_with(ray, |element, ray| element.transport(ray))
    }
    /// Trace a single [`Ray`] with some mirrors perturbed by the given [`MirrorPose`]s.
    ///
    /// Mirrors not contained in `poses` are used in their nominal configuration. The beamline is not modified, so
    /// derived collimators stay aligned to the nominal mirrors.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a key of `poses` does not name a mirror of this beamline.
    ///   - an element transport fails.
    pub fn trace_with_poses(
        &self,
        ray: &Ray,
        poses: &HashMap<String, MirrorPose>,
    ) -> BlResult<Vec<Ray>> {
        for name in poses.keys() {
            self.mirror(name)?;
        }
        self.trace_with(ray, |element, ray| match element {
            OpticalElement::FlatMirror(m) => poses.get(m.name()).map_or_else(
                || m.transport(ray),
                |pose| m.transport_with_pose(ray, pose),
            ),
            OpticalElement::Collimator(c) => c.transport(ray),
        })
    }
    fn trace_with<F>(&self, ray: &Ray, transport: F) -> BlResult<Vec<Ray>>
    where
        F: Fn(&OpticalElement, &Ray) -> BlResult<Ray>,
    {
        let mut rays = Vec::with_capacity(self.elements.len() + 1);
        let mut current = ray.clone();
        rays.push(current.clone());
        for element in &self.elements {
            if !current.stopped() {
                current = transport(element, &current)?;
            }
            rays.push(current.clone());
        }
        Ok(rays)
    }
    /// Returns the combined bounding box of all elements or `None` for an empty [`Beamline`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the footprint of an element cannot be calculated.
    pub fn footprint(&self) -> BlResult<Option<Footprint>> {
        let mut footprint: Option<Footprint> = None;
        for element in &self.elements {
            let f = element.footprint()?;
            footprint = Some(footprint.map_or(f, |total| total.union(&f)));
        }
        Ok(footprint)
    }
}
fn warn_if_upstream(collimator: &Collimator, mirror: &FlatMirror) {
    if collimator.center().z < mirror.center().z {
        warn!(
            "collimator '{}' is located upstream of its mirror '{}'",
            collimator.name(),
            mirror.name()
        );
    }
}
fn unknown_element(name: &str) -> BeamlineError {
    BeamlineError::InvalidConfiguration(format!("no element with name '{name}'"))
}
fn wrong_type(name: &str, expected: &str) -> BeamlineError {
    BeamlineError::InvalidConfiguration(format!("element '{name}' is not a {expected}"))
}
