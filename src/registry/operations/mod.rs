//! Registry and hub operations
//!
//! One struct per API surface, each holding a shared HTTP client, the base
//! address it talks to and a logger.

pub mod hub_operations;
pub mod manifest_operations;
pub mod repository_operations;

pub use hub_operations::HubOperations;
pub use manifest_operations::{Manifest, ManifestOperations, MANIFEST_V2_MEDIA_TYPE};
pub use repository_operations::{PREVIEW_TAG_PREFIX, RepositoryOperations, filter_preview_tags, is_preview_tag};
