//! # Batch Lifecycle
//!
//! ```text
//! Accepted ──▶ Validating ──▶ Computing ──▶ Persisted (terminal)
//!                  │              │
//!                  └──▶ Rejected ◀┘  (terminal)
//! ```
//!
//! Rows move independently: `Pending ──▶ Computed | Failed`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use compa_core::Timestamp;

// ─── Batch State ─────────────────────────────────────────────────────

/// Lifecycle state of a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchState {
    /// Upload received.
    Accepted,
    /// Header and shape are being checked.
    Validating,
    /// Rows are being computed.
    Computing,
    /// Results replaced the tenant's previous results (terminal).
    Persisted,
    /// The batch was aborted; stored results are unchanged (terminal).
    Rejected,
}

impl BatchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Persisted | Self::Rejected)
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Accepted => "ACCEPTED",
            Self::Validating => "VALIDATING",
            Self::Computing => "COMPUTING",
            Self::Persisted => "PERSISTED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// Per-row processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RowState {
    Pending,
    Computed,
    Failed,
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Lifecycle misuse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchLifecycleError {
    /// Attempted transition is not valid from the current state.
    #[error("invalid batch transition: {from} -> {to}")]
    InvalidTransition {
        /// Current state.
        from: BatchState,
        /// Attempted target state.
        to: BatchState,
    },

    /// Batch is already finished.
    #[error("batch is in terminal state {state}")]
    TerminalState {
        /// The terminal state.
        state: BatchState,
    },
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a batch state transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTransitionRecord {
    pub from_state: BatchState,
    pub to_state: BatchState,
    pub timestamp: Timestamp,
    pub reason: String,
}

/// State plus transition log, embedded in a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchLifecycle {
    pub state: BatchState,
    pub transitions: Vec<BatchTransitionRecord>,
}

impl Default for BatchLifecycle {
    fn default() -> Self {
        Self {
            state: BatchState::Accepted,
            transitions: Vec::new(),
        }
    }
}

impl BatchLifecycle {
    /// ACCEPTED → VALIDATING.
    pub fn begin_validation(&mut self) -> Result<(), BatchLifecycleError> {
        self.require_state(BatchState::Accepted, BatchState::Validating)?;
        self.do_transition(BatchState::Validating, "upload received");
        Ok(())
    }

    /// VALIDATING → COMPUTING.
    pub fn begin_computing(&mut self, rows: usize) -> Result<(), BatchLifecycleError> {
        self.require_state(BatchState::Validating, BatchState::Computing)?;
        self.do_transition(BatchState::Computing, &format!("{rows} rows accepted"));
        Ok(())
    }

    /// COMPUTING → PERSISTED.
    pub fn mark_persisted(&mut self) -> Result<(), BatchLifecycleError> {
        self.require_state(BatchState::Computing, BatchState::Persisted)?;
        self.do_transition(BatchState::Persisted, "results replaced");
        Ok(())
    }

    /// VALIDATING or COMPUTING → REJECTED.
    pub fn reject(&mut self, reason: &str) -> Result<(), BatchLifecycleError> {
        if self.state.is_terminal() {
            return Err(BatchLifecycleError::TerminalState { state: self.state });
        }
        if !matches!(self.state, BatchState::Validating | BatchState::Computing) {
            return Err(BatchLifecycleError::InvalidTransition {
                from: self.state,
                to: BatchState::Rejected,
            });
        }
        self.do_transition(BatchState::Rejected, reason);
        Ok(())
    }

    fn require_state(
        &self,
        expected: BatchState,
        target: BatchState,
    ) -> Result<(), BatchLifecycleError> {
        if self.state.is_terminal() {
            return Err(BatchLifecycleError::TerminalState { state: self.state });
        }
        if self.state != expected {
            return Err(BatchLifecycleError::InvalidTransition {
                from: self.state,
                to: target,
            });
        }
        Ok(())
    }

    fn do_transition(&mut self, to: BatchState, reason: &str) {
        self.transitions.push(BatchTransitionRecord {
            from_state: self.state,
            to_state: to,
            timestamp: Timestamp::now(),
            reason: reason.to_string(),
        });
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut lc = BatchLifecycle::default();
        lc.begin_validation().unwrap();
        lc.begin_computing(5).unwrap();
        lc.mark_persisted().unwrap();
        assert_eq!(lc.state, BatchState::Persisted);
        assert!(lc.state.is_terminal());
        assert_eq!(lc.transitions.len(), 3);
        assert_eq!(lc.transitions[1].reason, "5 rows accepted");
    }

    #[test]
    fn test_reject_during_validation() {
        let mut lc = BatchLifecycle::default();
        lc.begin_validation().unwrap();
        lc.reject("bad header").unwrap();
        assert_eq!(lc.state, BatchState::Rejected);
        assert_eq!(lc.transitions.last().unwrap().reason, "bad header");
    }

    #[test]
    fn test_reject_during_computing() {
        let mut lc = BatchLifecycle::default();
        lc.begin_validation().unwrap();
        lc.begin_computing(1).unwrap();
        lc.reject("storage down").unwrap();
        assert_eq!(lc.state, BatchState::Rejected);
    }

    #[test]
    fn test_cannot_skip_validation() {
        let mut lc = BatchLifecycle::default();
        assert_eq!(
            lc.begin_computing(1),
            Err(BatchLifecycleError::InvalidTransition {
                from: BatchState::Accepted,
                to: BatchState::Computing,
            })
        );
        assert!(lc.reject("nope").is_err());
        assert!(lc.transitions.is_empty());
    }

    #[test]
    fn test_terminal_states_are_final() {
        let mut lc = BatchLifecycle::default();
        lc.begin_validation().unwrap();
        lc.reject("bad").unwrap();
        assert!(matches!(
            lc.begin_computing(1),
            Err(BatchLifecycleError::TerminalState { .. })
        ));
        assert!(matches!(lc.reject("again"), Err(BatchLifecycleError::TerminalState { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(BatchState::Persisted.to_string(), "PERSISTED");
    }
}
