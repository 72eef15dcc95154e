// ABOUTME: Rollout coordination using the type state pattern.
// ABOUTME: Exports state markers, the Rollout struct, the coordinator and outcomes.

mod convergence;
mod coordinator;
mod error;
mod outcome;
mod rollback;
#[allow(clippy::module_inception)]
mod rollout;
mod state;
mod tag;
mod transitions;

pub use convergence::{Convergence, assess};
pub use coordinator::{Coordinator, DEFAULT_POLL_INTERVAL};
pub use error::{RolloutError, RolloutStep};
pub use outcome::{Outcome, ReportJson, RolloutReport};
pub use rollback::manual_rollback;
pub use rollout::Rollout;
pub use state::{Live, Pending, Updated};
pub use tag::resolve_image_tag;
pub use transitions::TransitionResult;
