//! Block enforcement: the output side of the controller.
//!
//! An enforcer receives the blocked and accessible lists and is responsible
//! for actually preventing or permitting navigation (overlay windows, OS
//! screen-time APIs, DNS rules). The controller never depends on it succeeding.

use crate::access::BlockTarget;
use crate::error::EnforcementError;

pub trait BlockEnforcer {
    fn apply(
        &mut self,
        blocked: &[BlockTarget],
        accessible: &[BlockTarget],
    ) -> Result<(), EnforcementError>;
}

/// Enforcer that only reports the lists through `tracing`.
///
/// Useful on hosts with no native blocking layer, and as a stand-in while the
/// platform integration is disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEnforcer;

impl LogEnforcer {
    pub fn new() -> Self {
        Self
    }
}

impl BlockEnforcer for LogEnforcer {
    fn apply(
        &mut self,
        blocked: &[BlockTarget],
        accessible: &[BlockTarget],
    ) -> Result<(), EnforcementError> {
        let ids = |targets: &[BlockTarget]| {
            targets
                .iter()
                .map(|t| t.id.as_str())
                .collect::<Vec<_>>()
                .join(",")
        };
        tracing::info!(
            blocked = %ids(blocked),
            accessible = %ids(accessible),
            "enforcement applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_enforcer_never_fails() {
        let mut enforcer = LogEnforcer::new();
        let targets = vec![BlockTarget::from_id("com.social.media")];
        assert!(enforcer.apply(&targets, &[]).is_ok());
        assert!(enforcer.apply(&[], &targets).is_ok());
    }
}
