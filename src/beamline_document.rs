#![warn(missing_docs)]
//! Scenario description of a beamline.
//!
//! A [`BeamlineDocument`] holds the (optional) [`Source`] and the list of elements of a beamline as plain
//! configuration structures. It is read from and written to YAML files and builds the actual [`Beamline`].
//! All lengths are given in meter, all angles in radian.
//!
//! ```yaml
//! elements:
//!   - type: flat_mirror
//!     name: M1K3
//!     center: [1.25, 0.0, 735.422]
//!     orientation: x+
//!     tilt: -0.0098468
//!   - type: collimator
//!     name: PC1K3
//!     center: [0.0, 0.0, 744.0]
//!     inner_diameter: 0.008
//!     outer_diameter: 0.084
//!     derived_from: M1K3
//! ```
use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use log::info;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use uom::si::f64::{Angle, Length};

use crate::{
    beamline::Beamline,
    error::{BeamlineError, BlResult},
    meter,
    nodes::{Collimator, FlatMirror, MirrorOrientation, MotionEnvelope, Source, SourceAperture},
    optic_element::OpticalElement,
};

/// Configuration of a [`Source`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// emitting aperture
    pub upstream: SourceAperture,
    /// aperture defining the divergence
    pub downstream: SourceAperture,
}

/// Configuration of a [`Collimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollimatorConfig {
    /// unique name
    pub name: String,
    /// center of the collimator
    pub center: Point3<Length>,
    /// diameter of the hole
    pub inner_diameter: Length,
    /// outer diameter of the material
    pub outer_diameter: Length,
    /// reference normal (defaults to the beam axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal: Option<Vector3<f64>>,
    /// name of the mirror this collimator follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,
}

/// Configuration of a [`FlatMirror`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatMirrorConfig {
    /// unique name
    pub name: String,
    /// center of the working surface
    pub center: Point3<Length>,
    /// orientation tag (`x+`, `x-`, `y+`, `y-`)
    pub orientation: String,
    /// mirror length (default 1 m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Length>,
    /// mirror width (default 20 mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Length>,
    /// mirror thickness (default 20 mm)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thickness: Option<Length>,
    /// nominal incident direction (defaults to the beam axis)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominal_incidence: Option<Vector3<f64>>,
    /// name of an upstream mirror whose nominal reflected beam is the nominal incident direction of this mirror
    ///
    /// The direction is copied once by [`BeamlineDocument::build`]. Changing the upstream mirror of the built
    /// [`Beamline`] later (e.g. by [`Beamline::set_mirror_tilt`]) does not update it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_from: Option<String>,
    /// tilt angle (default 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt: Option<Angle>,
    /// tilt offset range (lower, upper)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tilt_range: Option<(Angle, Angle)>,
    /// translation range (lower, upper)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation_range: Option<(Length, Length)>,
}

/// Configuration of a single beamline element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ElementConfig {
    /// an annular collimator
    Collimator(CollimatorConfig),
    /// a flat mirror
    FlatMirror(FlatMirrorConfig),
}

/// Scenario description: the source and the elements of a beamline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BeamlineDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<SourceConfig>,
    #[serde(default)]
    elements: Vec<ElementConfig>,
}
impl BeamlineDocument {
    /// Creates a new [`BeamlineDocument`].
    #[must_use]
    pub const fn new(source: Option<SourceConfig>, elements: Vec<ElementConfig>) -> Self {
        Self { source, elements }
    }
    /// Returns the source configuration of this [`BeamlineDocument`] (if any).
    #[must_use]
    pub const fn source(&self) -> Option<&SourceConfig> {
        self.source.as_ref()
    }
    /// Returns the element configurations of this [`BeamlineDocument`].
    #[must_use]
    pub fn elements(&self) -> &[ElementConfig] {
        &self.elements
    }
    /// Create a new [`BeamlineDocument`] from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the given path is not found or readable.
    ///   - the parsing / deserialization of the file failed.
    pub fn from_file(path: &Path) -> BlResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            BeamlineError::Document(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_string(&contents)
    }
    /// Create a new [`BeamlineDocument`] from the given YAML string.
    ///
    /// # Errors
    ///
    /// This function will return an error if the parsing of the string failed.
    pub fn from_string(file_string: &str) -> BlResult<Self> {
        serde_yaml::from_str(file_string)
            .map_err(|e| BeamlineError::Document(format!("parsing of beamline failed: {e}")))
    }
    /// Return the YAML representation of this [`BeamlineDocument`].
    ///
    /// # Errors
    ///
    /// This function will return an error if the serialization fails.
    pub fn to_yaml_string(&self) -> BlResult<String> {
        serde_yaml::to_string(self).map_err(|e| {
            BeamlineError::Document(format!("serialization of BeamlineDocument failed: {e}"))
        })
    }
    /// Save this [`BeamlineDocument`] to a YAML file with the given path.
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - the serialization of the document failed.
    ///   - the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path) -> BlResult<()> {
        let serialized = self.to_yaml_string()?;
        let mut output = File::create(path).map_err(|e| {
            BeamlineError::Document(format!(
                "could not create file path: {}: {}",
                path.display(),
                e
            ))
        })?;
        write!(output, "{serialized}").map_err(|e| {
            BeamlineError::Document(format!(
                "writing to file path {} failed: {}",
                path.display(),
                e
            ))
        })
    }
    /// Build the [`Beamline`] and the [`Source`] (if configured) described by this document.
    ///
    /// Elements are created in document order, so a mirror referenced by `incident_from` must appear before the
    /// referencing mirror. Collimators with a `derived_from` link are added after all other elements.
    ///
    /// # Errors
    ///
    /// This function will return an error if an element cannot be created or added (see
    /// [`Beamline::add_element`]).
    pub fn build(&self) -> BlResult<(Beamline, Option<Source>)> {
        let mut beamline = Beamline::new();
        let mut derived = Vec::new();
        for element in &self.elements {
            match element {
                ElementConfig::FlatMirror(config) => {
                    beamline.add_element(build_mirror(config, &beamline)?)?;
                }
                ElementConfig::Collimator(config) => {
                    let collimator = build_collimator(config)?;
                    if collimator.derived_from().is_some() {
                        derived.push(collimator);
                    } else {
                        beamline.add_element(collimator)?;
                    }
                }
            }
        }
        for collimator in derived {
            beamline.add_element(collimator)?;
        }
        let source = self
            .source
            .as_ref()
            .map(|s| Source::new(s.upstream, s.downstream))
            .transpose()?;
        info!(
            "built beamline with {} elements ({} source)",
            beamline.len(),
            if source.is_some() { "with" } else { "without" }
        );
        Ok((beamline, source))
    }
}
fn build_collimator(config: &CollimatorConfig) -> BlResult<Collimator> {
    let mut collimator = Collimator::from_diameters(
        &config.name,
        config.center,
        config.inner_diameter,
        config.outer_diameter,
    )?;
    if let Some(normal) = config.normal {
        collimator = collimator.with_normal(normal)?;
    }
    if let Some(mirror_name) = &config.derived_from {
        collimator = collimator.derived_from_mirror(mirror_name);
    }
    Ok(collimator)
}
fn build_mirror(config: &FlatMirrorConfig, beamline: &Beamline) -> BlResult<FlatMirror> {
    let incidence = match (&config.nominal_incidence, &config.incident_from) {
        (Some(_), Some(_)) => {
            return Err(BeamlineError::InvalidConfiguration(format!(
                "{}: nominal_incidence and incident_from must not be given both",
                config.name
            )));
        }
        (Some(direction), None) => *direction,
        (None, Some(upstream)) => beamline
            .element(upstream)
            .and_then(OpticalElement::as_mirror)
            .map(FlatMirror::nominal_reflected)
            .ok_or_else(|| {
                BeamlineError::InvalidConfiguration(format!(
                    "{}: incident_from '{upstream}' does not name a preceding mirror",
                    config.name
                ))
            })?,
        (None, None) => Vector3::z(),
    };
    let orientation = MirrorOrientation::from_tag(&config.orientation)?;
    let mut mirror = FlatMirror::new(&config.name, config.center, orientation, incidence)?
        .with_size(
            config.length.unwrap_or_else(|| meter!(1.0)),
            config.width.unwrap_or_else(|| meter!(0.02)),
            config.thickness.unwrap_or_else(|| meter!(0.02)),
        )?;
    if let Some(tilt) = config.tilt {
        mirror.set_tilt(tilt);
    }
    if config.tilt_range.is_some() || config.translation_range.is_some() {
        let default = MotionEnvelope::default();
        let envelope = MotionEnvelope::new(
            config.tilt_range.unwrap_or_else(|| default.tilt_range()),
            config
                .translation_range
                .unwrap_or_else(|| default.translation_range()),
        )?;
        mirror = mirror.with_envelope(envelope);
    }
    Ok(mirror)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        nodes::MirrorPose, radian, ray::Ray,
        utils::test_helper::test_helper::check_logs,
    };
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;
    use log::Level;
    use rand::{rngs::StdRng, SeedableRng};
    use tempfile::NamedTempFile;

    const TXI_SXR: &str = include_str!("../scenarios/txi_sxr.yaml");

    #[test]
    fn from_string() {
        let document = BeamlineDocument::from_string(TXI_SXR).unwrap();
        assert!(document.source().is_some());
        assert_eq!(document.elements().len(), 5);
        assert_matches!(&document.elements()[1], ElementConfig::FlatMirror(m) if m.name == "M1K3");
        assert_matches!(
            BeamlineDocument::from_string("elements: 42"),
            Err(BeamlineError::Document(_))
        );
    }
    #[test]
    fn build() {
        testing_logger::setup();
        let (beamline, source) = BeamlineDocument::from_string(TXI_SXR)
            .unwrap()
            .build()
            .unwrap();
        check_logs(
            Level::Info,
            vec![
                "aligned collimator PC1K3 to mirror M2K3",
                "built beamline with 5 elements (with source)",
            ],
        );
        let names: Vec<&str> = beamline
            .elements()
            .iter()
            .map(OpticalElement::name)
            .collect();
        assert_eq!(names, vec!["PC2S", "M1K3", "M2K3", "PC1K3", "PC2K3"]);
        let m1 = beamline.element("M1K3").unwrap().as_mirror().unwrap();
        let m2 = beamline.element("M2K3").unwrap().as_mirror().unwrap();
        assert_eq!(m1.tilt(), radian!(-0.0098468));
        assert_abs_diff_eq!(m2.nominal_incidence(), m1.nominal_reflected(), epsilon = 1e-15);
        // the offset mirror pair restores the beam axis direction
        assert_abs_diff_eq!(m2.nominal_reflected(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(m1.envelope().translation_range().1.value, 0.001);
        let pc1k3 = beamline.element("PC1K3").unwrap();
        assert_abs_diff_eq!(pc1k3.center().x.value, 1.2184, epsilon = 1e-9);
        assert!(source.is_some());
    }
    #[test]
    fn trace_scenario() {
        let (beamline, source) = BeamlineDocument::from_string(TXI_SXR)
            .unwrap()
            .build()
            .unwrap();
        let rays = beamline.trace(&Ray::along_z(meter!(1.25, 0.0, 690.0))).unwrap();
        assert_eq!(rays.len(), 6);
        assert!(rays.iter().all(|r| !r.stopped()));
        assert_abs_diff_eq!(rays[3].direction(), Vector3::z(), epsilon = 1e-12);
        let source = source.unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let m1 = beamline.element("M1K3").unwrap().as_mirror().unwrap();
        for pose in m1.envelope().grid(3, 3).unwrap() {
            let mut poses = std::collections::HashMap::new();
            poses.insert("M1K3".to_owned(), pose);
            let ray = source.get_one_ray(&mut rng).unwrap();
            assert_eq!(beamline.trace_with_poses(&ray, &poses).unwrap().len(), 6);
        }
        assert!(m1.envelope().contains(&MirrorPose::nominal()));
    }
    #[test]
    fn incident_from_is_copied_at_build() {
        let (mut beamline, _) = BeamlineDocument::from_string(TXI_SXR)
            .unwrap()
            .build()
            .unwrap();
        let incidence = beamline
            .element("M2K3")
            .unwrap()
            .as_mirror()
            .unwrap()
            .nominal_incidence();
        beamline.set_mirror_tilt("M1K3", radian!(-0.012)).unwrap();
        let m2k3 = beamline.element("M2K3").unwrap().as_mirror().unwrap();
        assert_eq!(m2k3.nominal_incidence(), incidence);
        assert_ne!(
            beamline
                .element("M1K3")
                .unwrap()
                .as_mirror()
                .unwrap()
                .nominal_reflected(),
            incidence
        );
    }
    #[test]
    fn build_wrong() {
        let document = BeamlineDocument::from_string(
            "elements:
  - type: flat_mirror
    name: M
    center: [0.0, 0.0, 1.0]
    orientation: z+",
        )
        .unwrap();
        assert_matches!(document.build(), Err(BeamlineError::InvalidConfiguration(_)));
        let document = BeamlineDocument::from_string(
            "elements:
  - type: flat_mirror
    name: M2
    center: [0.0, 0.0, 1.0]
    orientation: x+
    incident_from: M1",
        )
        .unwrap();
        assert!(document.build().is_err());
        let document = BeamlineDocument::from_string(
            "elements:
  - type: collimator
    name: PC
    center: [0.0, 0.0, 1.0]
    inner_diameter: 0.01
    outer_diameter: 0.02
    derived_from: M1",
        )
        .unwrap();
        assert!(document.build().is_err());
        let document = BeamlineDocument::from_string(
            "elements:
  - type: flat_mirror
    name: M
    center: [0.0, 0.0, 1.0]
    orientation: x+
    tilt_range: [0.1, -0.1]",
        )
        .unwrap();
        assert!(document.build().is_err());
    }
    #[test]
    fn build_defaults() {
        let document = BeamlineDocument::from_string(
            "elements:
  - type: flat_mirror
    name: M
    center: [0.0, 0.0, 1.0]
    orientation: Y-",
        )
        .unwrap();
        let (beamline, source) = document.build().unwrap();
        assert!(source.is_none());
        let m = beamline.element("M").unwrap().as_mirror().unwrap();
        assert_eq!(m.orientation(), MirrorOrientation::YMinus);
        assert_eq!(m.nominal_incidence(), Vector3::z());
        assert_relative_eq!(m.half_length().value, 0.5);
        assert_eq!(m.envelope(), &MotionEnvelope::default());
    }
    #[test]
    fn save_and_reload() {
        let document = BeamlineDocument::from_string(TXI_SXR).unwrap();
        let file = NamedTempFile::new().unwrap();
        document.save_to_file(file.path()).unwrap();
        let reloaded = BeamlineDocument::from_file(file.path()).unwrap();
        assert_eq!(reloaded, document);
    }
    #[test]
    fn from_file_missing() {
        assert_matches!(
            BeamlineDocument::from_file(Path::new("./not_existing.yaml")),
            Err(BeamlineError::Document(_))
        );
    }
}
