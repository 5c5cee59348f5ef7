//! Domain layer types and invariants.

pub mod error;
pub mod ids;
pub mod links;
pub mod path;
pub mod plugin;
pub mod tree;
