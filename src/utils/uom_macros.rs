#![warn(missing_docs)]
//! Unit macros for lengths, positions and angles used throughout the beamline model.
//!
//! A single argument creates a quantity, three arguments create a [`Point3`](nalgebra::Point3) of that quantity.
//! ```rust
//! use beamray::{meter, milliradian};
//!
//! let center = meter!(1.25, 0.0, 735.422);
//! let tilt = milliradian!(-9.8468);
//! assert_eq!(center.z.value, 735.422);
//! assert!(tilt.value < 0.0);
//! ```
/// helper macro to create the units
#[macro_export]
macro_rules! uom_unit_creator {
    ($unit:ident, $unit_type:ident, $val1:expr) => {
        $unit_type::new::<$unit>($val1)
    };
    ($unit:ident, $unit_type:ident, $val1:expr, $val2:expr, $val3:expr) => {{
        use nalgebra::Point3;
        Point3::new(
            $unit_type::new::<$unit>($val1),
            $unit_type::new::<$unit>($val2),
            $unit_type::new::<$unit>($val3),
        )
    }};
}

///macro to create a Length (or a position) in meter
#[macro_export]
macro_rules! meter {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::meter};
        $crate::uom_unit_creator![meter, Length, $( $x ),*]
    }};
}
///macro to create a Length (or a position) in millimeter
#[macro_export]
macro_rules! millimeter {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::millimeter};
        $crate::uom_unit_creator![millimeter, Length, $( $x ),*]
    }};
}
///macro to create a Length (or a position) in micrometer
#[macro_export]
macro_rules! micrometer {
    ($( $x:expr ),*) =>{{
        use uom::si::{f64::Length, length::micrometer};
        $crate::uom_unit_creator![micrometer, Length, $( $x ),*]
    }};
}
///macro to create an angle in radian
#[macro_export]
macro_rules! radian {
    ($x:expr) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, $x]
    }};
}
///macro to create an angle in milliradian
#[macro_export]
macro_rules! milliradian {
    ($x:expr) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, 1e-3 * $x]
    }};
}
///macro to create an angle in microradian
#[macro_export]
macro_rules! microradian {
    ($x:expr) =>{{
        use uom::si::{f64::Angle, angle::radian};
        $crate::uom_unit_creator![radian, Angle, 1e-6 * $x]
    }};
}
///macro to create an angle in degree
#[macro_export]
macro_rules! degree {
    ($x:expr) =>{{
        use uom::si::{f64::Angle, angle::degree};
        $crate::uom_unit_creator![degree, Angle, $x]
    }};
}
