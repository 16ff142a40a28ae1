// ABOUTME: Diagnostics accumulator for non-fatal warnings during a watch.
// ABOUTME: Collects warnings that shouldn't fail the run but should be shown to users.

/// Collects non-fatal warnings during a deployment run.
#[derive(Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Get all collected warnings.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Check if any warnings were collected.
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
    /// Create a hook failure warning.
    pub fn hook_failed(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::HookFailed,
            message: message.into(),
        }
    }

    /// Create a warning for an error log that could not be fetched.
    pub fn error_log_unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ErrorLogUnavailable,
            message: message.into(),
        }
    }

    /// Create a warning for a dispatch protocol violation.
    pub fn protocol_violation(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProtocolViolation,
            message: message.into(),
        }
    }
}

/// Categories of warnings that can occur during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A post-run or on-error hook exited non-zero or could not start.
    HookFailed,
    /// The remote error log could not be fetched after a timeout.
    ErrorLogUnavailable,
    /// The event producer sent updates out of order.
    ProtocolViolation,
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

        diag.warn(Warning::hook_failed("post-install hook exited with 1"));
        diag.warn(Warning::error_log_unavailable("kubectl timed out"));

        assert!(diag.has_warnings());
        assert_eq!(diag.warnings().len(), 2);
    }

    #[test]
    fn warning_constructors_set_correct_kind() {
        assert_eq!(Warning::hook_failed("x").kind, WarningKind::HookFailed);
        assert_eq!(
            Warning::error_log_unavailable("x").kind,
            WarningKind::ErrorLogUnavailable
        );
        assert_eq!(
            Warning::protocol_violation("x").kind,
            WarningKind::ProtocolViolation
        );
    }
}
