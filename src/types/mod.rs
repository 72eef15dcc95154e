// ABOUTME: Validated domain types for rollout targets and images.
// ABOUTME: Construction validates input so downstream code never re-checks it.

mod image_ref;
mod image_tag;
mod resource_name;
mod target;

pub use image_ref::{ImageRef, ParseImageRefError};
pub use image_tag::{ImageTag, ImageTagError};
pub use resource_name::{ResourceName, ResourceNameError};
pub use target::DeploymentTarget;
