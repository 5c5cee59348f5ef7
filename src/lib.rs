//! Per-locale configuration overlays for link lists.
//!
//! A link list owns one canonical configuration tree. Other locales store a
//! sparse overlay holding only the values at paths the selected strategy
//! plugins declare translatable; [`application::overlay::ConfigurationOverlayEngine`]
//! merges the two on read and extracts the overlay on write.
//!
//! [`domain::links::LinkCollection`] is the cacheable result container
//! strategies fill when a list is rendered.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
