//!for all the functions, structs or traits used for the vector algebra of the beamline geometry
#![warn(missing_docs)]
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use uom::si::f64::{Angle, Length};

use crate::{
    error::{BeamlineError, BlResult},
    meter,
};

/// The principal axes of the global (beamline) coordinate system.
///
/// The z axis is the nominal propagation axis of the beam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumIter)]
pub enum Axis {
    /// horizontal transverse axis
    X,
    /// vertical transverse axis
    Y,
    /// nominal propagation axis
    Z,
}
impl Axis {
    /// Returns the unit vector of this [`Axis`].
    #[must_use]
    pub fn unit_vector(self) -> Vector3<f64> {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }
    /// Returns the component of the given vector along this [`Axis`].
    #[must_use]
    pub fn component(self, vector: &Vector3<f64>) -> f64 {
        match self {
            Self::X => vector.x,
            Self::Y => vector.y,
            Self::Z => vector.z,
        }
    }
}

/// Return a normalized copy of the given vector.
///
/// # Errors
///
/// This function will return [`BeamlineError::DegenerateVector`] if the vector has zero length or
/// contains non-finite entries.
pub fn normalized_checked(vector: &Vector3<f64>) -> BlResult<Vector3<f64>> {
    let length = vector.norm();
    if length.is_normal() {
        Ok(vector / length)
    } else {
        Err(BeamlineError::DegenerateVector(format!(
            "cannot normalize vector ({}, {}, {}) with length {length}",
            vector.x, vector.y, vector.z
        )))
    }
}

/// Rotate a vector about one of the principal axes by the given (signed) angle.
///
/// The closed-form rotation matrices follow the right-hand rule: a positive angle rotates
/// counter-clockwise when looking from the positive axis towards the origin.
#[must_use]
pub fn rotate_about_axis(vector: &Vector3<f64>, angle: Angle, axis: Axis) -> Vector3<f64> {
    let (sin_a, cos_a) = angle.value.sin_cos();
    match axis {
        Axis::X => Vector3::new(
            vector.x,
            cos_a.mul_add(vector.y, -sin_a * vector.z),
            sin_a.mul_add(vector.y, cos_a * vector.z),
        ),
        Axis::Y => Vector3::new(
            cos_a.mul_add(vector.x, sin_a * vector.z),
            vector.y,
            (-sin_a).mul_add(vector.x, cos_a * vector.z),
        ),
        Axis::Z => Vector3::new(
            cos_a.mul_add(vector.x, -sin_a * vector.y),
            sin_a.mul_add(vector.x, cos_a * vector.y),
            vector.z,
        ),
    }
}

/// Reflect a direction on a surface with the given normal vector.
///
/// Both vectors are normalized before the calculation, so the result `v - 2(v·n)n` is always of unit length.
///
/// # Errors
///
/// This function will return [`BeamlineError::DegenerateVector`] if one of the vectors has zero length.
pub fn reflect(incident: &Vector3<f64>, normal: &Vector3<f64>) -> BlResult<Vector3<f64>> {
    let incident = normalized_checked(incident)?;
    let normal = normalized_checked(normal)?;
    Ok(incident - 2.0 * incident.dot(&normal) * normal)
}

/// Return the coordinates of a position in meter.
#[must_use]
pub fn point_in_meter(point: &Point3<Length>) -> Vector3<f64> {
    Vector3::new(point.x.value, point.y.value, point.z.value)
}

/// Create a position from coordinates given in meter.
#[must_use]
pub fn point_from_meter(coordinates: &Vector3<f64>) -> Point3<Length> {
    meter!(coordinates.x, coordinates.y, coordinates.z)
}

/// Return the component of a position along the given axis.
#[must_use]
pub fn point_component(point: &Point3<Length>, axis: Axis) -> Length {
    match axis {
        Axis::X => point.x,
        Axis::Y => point.y,
        Axis::Z => point.z,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{degree, radian};
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use assert_matches::assert_matches;
    use std::f64::consts::FRAC_1_SQRT_2;
    use strum::IntoEnumIterator;

    #[test]
    fn axis_unit_vector() {
        assert_eq!(Axis::X.unit_vector(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(Axis::Y.unit_vector(), Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(Axis::Z.unit_vector(), Vector3::new(0.0, 0.0, 1.0));
        let v = Vector3::new(1.0, 2.0, 3.0);
        let components: Vec<f64> = Axis::iter().map(|a| a.component(&v)).collect();
        assert_eq!(components, vec![1.0, 2.0, 3.0]);
    }
    #[test]
    fn axis_display() {
        assert_eq!(format!("{}", Axis::Y), "Y");
    }
    #[test]
    fn normalized() {
        let v = normalized_checked(&Vector3::new(0.1, 0.2, 0.3)).unwrap();
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(v, Vector3::new(0.1, 0.2, 0.3) / 0.14_f64.sqrt(), epsilon = 1e-12);
        assert_matches!(
            normalized_checked(&Vector3::zeros()),
            Err(BeamlineError::DegenerateVector(_))
        );
        assert!(normalized_checked(&Vector3::new(f64::NAN, 0.0, 1.0)).is_err());
        assert!(normalized_checked(&Vector3::new(f64::INFINITY, 0.0, 1.0)).is_err());
    }
    #[test]
    fn rotate_quarter_turn() {
        let v = Vector3::new(0.1, 0.2, 0.3);
        assert_abs_diff_eq!(
            rotate_about_axis(&v, degree!(90.0), Axis::X),
            Vector3::new(0.1, -0.3, 0.2),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            rotate_about_axis(&v, degree!(90.0), Axis::Y),
            Vector3::new(0.3, 0.2, -0.1),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            rotate_about_axis(&v, degree!(90.0), Axis::Z),
            Vector3::new(-0.2, 0.1, 0.3),
            epsilon = 1e-12
        );
    }
    #[test]
    fn rotate_right_handed() {
        // x -> y about z, y -> z about x, z -> x about y
        assert_abs_diff_eq!(
            rotate_about_axis(&Vector3::x(), degree!(90.0), Axis::Z),
            Vector3::<f64>::y(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            rotate_about_axis(&Vector3::y(), degree!(90.0), Axis::X),
            Vector3::<f64>::z(),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            rotate_about_axis(&Vector3::z(), degree!(90.0), Axis::Y),
            Vector3::<f64>::x(),
            epsilon = 1e-12
        );
    }
    #[test]
    fn rotate_inverse() {
        let v = Vector3::new(-0.4, 1.2, 3.3);
        for axis in Axis::iter() {
            let rotated = rotate_about_axis(&v, radian!(0.37), axis);
            assert_relative_eq!(rotated.norm(), v.norm(), epsilon = 1e-12);
            assert_relative_eq!(
                rotate_about_axis(&rotated, radian!(-0.37), axis),
                v,
                epsilon = 1e-12
            );
        }
    }
    #[test]
    fn reflect_simple() {
        let r = reflect(&Vector3::new(1.0, -1.0, 0.0), &Vector3::new(0.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(
            r,
            Vector3::new(FRAC_1_SQRT_2, FRAC_1_SQRT_2, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            reflect(&Vector3::z(), &Vector3::new(0.0, 0.0, -1.0)).unwrap(),
            Vector3::new(0.0, 0.0, -1.0)
        );
    }
    #[test]
    fn reflection_law() {
        let normals = [
            Vector3::new(1.0, 0.0, 0.0098),
            Vector3::new(-0.3, 0.5, 0.8),
            Vector3::new(0.0, -1.0, 0.2),
        ];
        let incidents = [
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.2, -0.1, 0.9),
            Vector3::new(-1.0, 0.4, 0.1),
        ];
        for n in &normals {
            let n = normalized_checked(n).unwrap();
            for u in &incidents {
                let u = normalized_checked(u).unwrap();
                let r = reflect(&u, &n).unwrap();
                assert_relative_eq!(r.norm(), 1.0, epsilon = 1e-12);
                assert_relative_eq!(r.dot(&n), -u.dot(&n), epsilon = 1e-12);
            }
        }
    }
    #[test]
    fn reflect_degenerate() {
        assert_matches!(
            reflect(&Vector3::zeros(), &Vector3::x()),
            Err(BeamlineError::DegenerateVector(_))
        );
        assert_matches!(
            reflect(&Vector3::x(), &Vector3::zeros()),
            Err(BeamlineError::DegenerateVector(_))
        );
    }
    #[test]
    fn point_conversion() {
        let p = meter!(1.0, -2.0, 690.0);
        let v = point_in_meter(&p);
        assert_eq!(v, Vector3::new(1.0, -2.0, 690.0));
        assert_eq!(point_from_meter(&v), p);
        assert_eq!(point_component(&p, Axis::Y), meter!(-2.0));
        assert_eq!(point_component(&p, Axis::Z), meter!(690.0));
    }
}
