use super::domain::ParticipantId;

/// Failures raised by the equity core.
///
/// Validation variants are raised before any computation starts; provider variants only
/// during the travel-time lookup stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EquityError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("at least {required} participant(s) required, got {actual}")]
    InsufficientParticipants { required: usize, actual: usize },
    #[error("unknown transport mode '{0}'")]
    UnknownMode(String),
    #[error("no travel time known for {} participant(s) and no travel-time provider configured", participants.len())]
    MissingTravelData { participants: Vec<ParticipantId> },
    #[error("travel-time provider unavailable for participant {participant}: {reason}")]
    ProviderUnavailable {
        participant: ParticipantId,
        reason: String,
    },
    #[error("travel-time provider timed out after {timeout_ms}ms for participant {participant}")]
    ProviderTimeout {
        participant: ParticipantId,
        timeout_ms: u64,
    },
    #[error("equity analysis cancelled")]
    Cancelled,
}

impl EquityError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Input must be fixed before retrying.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput { .. }
                | Self::InsufficientParticipants { .. }
                | Self::UnknownMode(_)
                | Self::MissingTravelData { .. }
        )
    }

    /// Raised by the injected travel-time capability; retrying may succeed.
    pub fn is_provider(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable { .. } | Self::ProviderTimeout { .. }
        )
    }
}
