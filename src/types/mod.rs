// linkmark shared type definitions
// Each submodule defines types used across the application.

pub mod bookmark;
pub mod category;
pub mod enrichment;
pub mod errors;
pub mod serde_helpers;
pub mod settings;
pub mod tags;
