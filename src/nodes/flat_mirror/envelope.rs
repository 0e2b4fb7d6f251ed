#![warn(missing_docs)]
//! Motion envelope of a mirror (tilt and translation range)
use itertools::Itertools;
use num::Zero;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uom::si::f64::{Angle, Length};

use crate::error::{BeamlineError, BlResult};

/// A perturbation of a mirror with respect to its nominal configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrorPose {
    /// additional rotation of the working surface
    pub tilt_offset: Angle,
    /// displacement of the mirror along its reflection axis (positive: into the beam)
    pub translation: Length,
}
impl MirrorPose {
    /// Returns the unperturbed [`MirrorPose`].
    #[must_use]
    pub fn nominal() -> Self {
        Self {
            tilt_offset: Angle::zero(),
            translation: Length::zero(),
        }
    }
}
impl Default for MirrorPose {
    fn default() -> Self {
        Self::nominal()
    }
}

/// The range of motion of a mirror around its nominal configuration.
///
/// Both ranges are given as `(lower, upper)` offsets from the nominal configuration. The envelope is not used by
/// the nominal mirror transport. It is sampled explicitly with [`MotionEnvelope::grid`] or [`MotionEnvelope::sample`]
/// and the resulting [`MirrorPose`]s are then passed to the pose-aware transport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionEnvelope {
    tilt_range: (Angle, Angle),
    translation_range: (Length, Length),
}
impl Default for MotionEnvelope {
    fn default() -> Self {
        Self {
            tilt_range: (Angle::zero(), Angle::zero()),
            translation_range: (Length::zero(), Length::zero()),
        }
    }
}
impl MotionEnvelope {
    /// Creates a new [`MotionEnvelope`].
    ///
    /// # Errors
    ///
    /// This function will return an error if
    ///   - a range limit is not finite.
    ///   - the lower limit of a range is larger than its upper limit.
    pub fn new(tilt_range: (Angle, Angle), translation_range: (Length, Length)) -> BlResult<Self> {
        if !tilt_range.0.is_finite() || !tilt_range.1.is_finite() || tilt_range.0 > tilt_range.1 {
            return Err(BeamlineError::InvalidConfiguration(
                "tilt range must be finite and ordered (lower, upper)".into(),
            ));
        }
        if !translation_range.0.is_finite()
            || !translation_range.1.is_finite()
            || translation_range.0 > translation_range.1
        {
            return Err(BeamlineError::InvalidConfiguration(
                "translation range must be finite and ordered (lower, upper)".into(),
            ));
        }
        Ok(Self {
            tilt_range,
            translation_range,
        })
    }
    /// Returns the tilt range of this [`MotionEnvelope`].
    #[must_use]
    pub const fn tilt_range(&self) -> (Angle, Angle) {
        self.tilt_range
    }
    /// Returns the translation range of this [`MotionEnvelope`].
    #[must_use]
    pub const fn translation_range(&self) -> (Length, Length) {
        self.translation_range
    }
    /// Returns `true` if the given pose lies within this [`MotionEnvelope`] (limits included).
    #[must_use]
    pub fn contains(&self, pose: &MirrorPose) -> bool {
        self.tilt_range.0 <= pose.tilt_offset
            && pose.tilt_offset <= self.tilt_range.1
            && self.translation_range.0 <= pose.translation
            && pose.translation <= self.translation_range.1
    }
    /// Sample this [`MotionEnvelope`] on a regular grid.
    ///
    /// Both ranges are divided into the given number of points including both limits. A single point samples the
    /// center of the range. The poses are ordered by tilt first, then by translation.
    ///
    /// # Errors
    ///
    /// This function will return an error if one of the number of divisions is zero.
    pub fn grid(&self, nr_of_tilts: usize, nr_of_translations: usize) -> BlResult<Vec<MirrorPose>> {
        if nr_of_tilts.is_zero() || nr_of_translations.is_zero() {
            return Err(BeamlineError::InvalidConfiguration(
                "number of grid divisions must be > 0".into(),
            ));
        }
        let tilts = divide(self.tilt_range, nr_of_tilts);
        let translations = divide(self.translation_range, nr_of_translations);
        Ok(tilts
            .into_iter()
            .cartesian_product(translations)
            .map(|(tilt_offset, translation)| MirrorPose {
                tilt_offset,
                translation,
            })
            .collect())
    }
    /// Draw a uniformly distributed random pose from this [`MotionEnvelope`].
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MirrorPose {
        let (t0, t1) = self.tilt_range;
        let (d0, d1) = self.translation_range;
        MirrorPose {
            tilt_offset: t0 + (t1 - t0) * rng.random::<f64>(),
            translation: d0 + (d1 - d0) * rng.random::<f64>(),
        }
    }
}
fn divide<D>(range: (D, D), nr_of_points: usize) -> Vec<D>
where
    D: Copy
        + std::ops::Add<Output = D>
        + std::ops::Sub<Output = D>
        + std::ops::Mul<f64, Output = D>,
{
    let (lower, upper) = range;
    if nr_of_points == 1 {
        return vec![lower + (upper - lower) * 0.5];
    }
    #[allow(clippy::cast_precision_loss)]
    let last = (nr_of_points - 1) as f64;
    (0..nr_of_points)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let fraction = i as f64 / last;
            lower + (upper - lower) * fraction
        })
        .collect()
}
