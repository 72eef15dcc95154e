// ABOUTME: Rollout struct parameterized by state marker.
// ABOUTME: Carries the target, the new image and the image it replaces.

use chrono::{DateTime, Utc};

use crate::types::{DeploymentTarget, ImageRef};

use super::state::Pending;

/// A rollout of one image to one Deployment container, parameterized by
/// its current state.
#[derive(Debug)]
pub struct Rollout<S> {
    pub(crate) target: DeploymentTarget,
    pub(crate) image: ImageRef,
    pub(crate) previous_image: Option<ImageRef>,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) state: S,
}

impl Rollout<Pending> {
    /// Start a rollout of `image`, already pushed, to `target`.
    pub fn new(target: DeploymentTarget, image: ImageRef) -> Self {
        Rollout {
            target,
            image,
            previous_image: None,
            started_at: Utc::now(),
            state: Pending,
        }
    }
}

impl<S> Rollout<S> {
    pub fn target(&self) -> &DeploymentTarget {
        &self.target
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// Image the container ran before the update, when it could be read.
    pub fn previous_image(&self) -> Option<&ImageRef> {
        self.previous_image.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// State marker of this rollout.
    pub fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn transition<T>(self, state: T) -> Rollout<T> {
        Rollout {
            target: self.target,
            image: self.image,
            previous_image: self.previous_image,
            started_at: self.started_at,
            state,
        }
    }
}
