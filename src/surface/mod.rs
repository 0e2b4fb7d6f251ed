//! Module for handling the working surfaces of optical elements

mod plane;

pub use plane::{Plane, PARALLEL_TOLERANCE};
