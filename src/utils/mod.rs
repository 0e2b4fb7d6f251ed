//! Module for additional computational capabilities
pub mod geom_transformation;
pub mod test_helper;
pub mod uom_macros;
