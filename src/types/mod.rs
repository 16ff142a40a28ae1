// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Parsing happens once at the config boundary.

mod resource_ref;

pub use resource_ref::{ResourceRef, ResourceRefError};
