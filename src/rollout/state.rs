// ABOUTME: Rollout state marker types for the type state pattern.
// ABOUTME: Zero-sized types enforce valid transitions at compile time.

/// Image is in the registry; the Deployment is untouched.
/// Available actions: `update()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Pending;

/// The Deployment was pointed at the new image.
/// Available actions: `observe()`, `roll_back()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Updated;

/// Every replica runs the new image and is available.
/// Available actions: `finish()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Live;
