// extensions/mod.rs
//
// Optional extension modules. Games opt in by creating these systems
// next to their Scene.

pub mod transform;

pub use transform::{TransformGraph, LocalTransform};
