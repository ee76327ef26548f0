//! Mathematical functions module
//!
//! Linear algebra bridge, polynomial arithmetic and unit conversions.

pub mod conversions;
pub mod linalg;
pub mod polynomial;

pub use conversions::*;
