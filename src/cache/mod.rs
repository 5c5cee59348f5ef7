//! Cache invalidation metadata.
//!
//! Link records and link collections carry [`CacheMetadata`] so downstream
//! rendering knows when a computed list must be rebuilt:
//!
//! - **tags**: opaque invalidation keys (`node:12`, `feed:3`), unioned on merge
//! - **contexts**: request variations (`languages`, `url.path`), unioned on merge
//! - **max-age**: seconds or permanent, minimum wins on merge

mod metadata;

pub use metadata::{CacheMetadata, Cacheable, MaxAge};
