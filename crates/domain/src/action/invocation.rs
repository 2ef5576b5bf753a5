//! Action invocation — one requested execution of an action.

use serde::{Deserialize, Serialize};

use crate::description::{InvocationDescription, child_href};
use crate::error::ValidationError;
use crate::id::InvocationId;
use crate::time::{Timestamp, now};

/// Lifecycle state of an invocation.
///
/// `Created → Started → {Completed, Error}`; the last two are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvocationStatus {
    Created,
    Started,
    Completed,
    Error,
}

impl InvocationStatus {
    /// Whether no further transition is possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Started => f.write_str("started"),
            Self::Completed => f.write_str("completed"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// A queued request to run an action, with its own lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionInvocation {
    id: InvocationId,
    action_id: String,
    input: serde_json::Value,
    status: InvocationStatus,
    time_requested: Timestamp,
    time_completed: Option<Timestamp>,
    error: Option<String>,
}

impl ActionInvocation {
    /// Create a new invocation in [`InvocationStatus::Created`].
    #[must_use]
    pub fn new(action_id: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: InvocationId::new(),
            action_id: action_id.into(),
            input,
            status: InvocationStatus::Created,
            time_requested: now(),
            time_completed: None,
            error: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> InvocationId {
        self.id
    }

    #[must_use]
    pub fn action_id(&self) -> &str {
        &self.action_id
    }

    #[must_use]
    pub fn input(&self) -> &serde_json::Value {
        &self.input
    }

    #[must_use]
    pub fn status(&self) -> InvocationStatus {
        self.status
    }

    #[must_use]
    pub fn time_requested(&self) -> Timestamp {
        self.time_requested
    }

    #[must_use]
    pub fn time_completed(&self) -> Option<Timestamp> {
        self.time_completed
    }

    /// Failure message recorded by [`fail`](Self::fail).
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `Created → Started`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] from any other state.
    pub fn start(&mut self) -> Result<(), ValidationError> {
        self.transition(InvocationStatus::Created, InvocationStatus::Started)
    }

    /// `Started → Completed`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] from any other state.
    pub fn complete(&mut self) -> Result<(), ValidationError> {
        self.transition(InvocationStatus::Started, InvocationStatus::Completed)?;
        self.time_completed = Some(now());
        Ok(())
    }

    /// `Started → Error`, recording `message`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTransition`] from any other state.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), ValidationError> {
        self.transition(InvocationStatus::Started, InvocationStatus::Error)?;
        self.time_completed = Some(now());
        self.error = Some(message.into());
        Ok(())
    }

    fn transition(
        &mut self,
        from: InvocationStatus,
        to: InvocationStatus,
    ) -> Result<(), ValidationError> {
        if self.status != from {
            return Err(ValidationError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        Ok(())
    }

    /// Build the wire snapshot of this invocation.
    #[must_use]
    pub fn describe(&self, thing_id: &str) -> InvocationDescription {
        let action_href = child_href(thing_id, "actions", &self.action_id);
        InvocationDescription {
            id: self.id,
            href: format!("{action_href}/{}", self.id),
            input: self.input.clone(),
            status: self.status,
            time_requested: self.time_requested,
            time_completed: self.time_completed,
            error: self.error.clone(),
        }
    }
}
