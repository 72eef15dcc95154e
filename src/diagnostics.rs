// ABOUTME: Diagnostics accumulator for non-fatal warnings during a rollout.
// ABOUTME: Collects warnings that shouldn't fail a run but should be shown to users.

/// Collects non-fatal warnings during a run.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!(kind = ?warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// A non-fatal warning collected during a run.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn previous_image_unknown(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::PreviousImageUnknown,
            message: message.into(),
        }
    }

    pub fn hook_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HookFailed,
            message: message.into(),
        }
    }

    pub fn kubeconfig_update(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::KubeconfigUpdate,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// The image running before the update could not be read.
    PreviousImageUnknown,
    /// A post-deploy or on-error hook failed.
    HookFailed,
    /// Refreshing the kubeconfig failed; the existing one is used.
    KubeconfigUpdate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::previous_image_unknown("deployment has no such container"));
        diag.warn(Warning::hook_failed("post-deploy exited with 3"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(
            Warning::previous_image_unknown("x").kind,
            WarningKind::PreviousImageUnknown
        );
        assert_eq!(Warning::hook_failed("x").kind, WarningKind::HookFailed);
        assert_eq!(
            Warning::kubeconfig_update("x").kind,
            WarningKind::KubeconfigUpdate
        );
    }
}
