use serde::{Deserialize, Serialize};

/// Recording session state.
///
/// `Idle → Requesting → Recording → Stopped → Reviewing → Submitting →
/// {Queued | Failed}`. Reset returns to Idle from any state and tears down
/// every live resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Idle,
    Requesting,
    Recording,
    Stopped,
    Reviewing,
    Submitting,
    Queued,
    Failed,
}

impl SessionState {
    /// Whether the state machine permits moving to `next`.
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;

        // Reset is always allowed.
        if next == Idle {
            return true;
        }

        matches!(
            (self, next),
            (Idle, Requesting)
                | (Requesting, Recording)
                | (Requesting, Failed)
                | (Recording, Stopped)
                | (Recording, Failed)
                | (Stopped, Reviewing)
                | (Reviewing, Submitting)
                | (Submitting, Queued)
                | (Submitting, Reviewing) // validation failure returns to review
                | (Submitting, Failed)
        )
    }

    /// States in which review-stage edits (trim, gain, enhancement) are
    /// allowed.
    pub fn allows_editing(self) -> bool {
        self == SessionState::Reviewing
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "Idle",
            SessionState::Requesting => "Requesting",
            SessionState::Recording => "Recording",
            SessionState::Stopped => "Stopped",
            SessionState::Reviewing => "Reviewing",
            SessionState::Submitting => "Submitting",
            SessionState::Queued => "Queued",
            SessionState::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}
