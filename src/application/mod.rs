//! Application layer: the overlay engine, the persistence contract and the
//! service hosts call when reading or saving link list configuration.

pub mod error;
pub mod link_lists;
pub mod overlay;
pub mod repos;
