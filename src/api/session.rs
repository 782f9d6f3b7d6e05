//! Purpose: Drive the identify request lifecycle for one UI session.
//! Exports: `Session`, `Ticket`, `Settled`.
//! Role: Request orchestrator; the only writer of `RequestState`.
//! Invariants: `begin` always moves to `Submitting`, clearing any prior result or error.
//! Invariants: Only the most recently issued ticket may settle the state.
//! Invariants: Every failure is normalized to one user-facing string; detail goes to tracing.
use super::client::{ApiResult, IdentityEndpoint};
use super::{FormInput, RequestState};
use crate::core::error::ErrorKind;
use serde_json::Value;
use std::error::Error as StdError;

/// Handle for one in-flight submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct Ticket(u64);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Settled {
    Applied,
    /// A newer submission was started after this one; its outcome was dropped.
    Superseded,
}

#[derive(Debug, Default)]
pub struct Session {
    state: RequestState,
    issued: u64,
    failure: Option<ErrorKind>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Kind of the failure behind a `Failed` state, for exit-code mapping.
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        self.failure
    }

    /// Starts a submission. Overlapping calls are allowed; each gets a newer ticket.
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        if self.state.is_submitting() {
            tracing::debug!(ticket = ticket.0, "submission overlaps an in-flight request");
        }
        self.state = RequestState::Submitting;
        self.failure = None;
        ticket
    }

    pub fn settle(&mut self, ticket: Ticket, outcome: ApiResult<Value>) -> Settled {
        if ticket.0 != self.issued {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.issued,
                ok = outcome.is_ok(),
                "dropping outcome of superseded submission"
            );
            return Settled::Superseded;
        }

        self.state = match outcome {
            Ok(value) => {
                self.failure = None;
                RequestState::Succeeded(value)
            }
            Err(err) => {
                self.failure = Some(err.kind());
                let cause = err.source().map(|source| source.to_string());
                tracing::warn!(
                    kind = ?err.kind(),
                    status = err.status(),
                    cause = cause.as_deref(),
                    "identify request failed: {err}"
                );
                RequestState::Failed(err.user_message())
            }
        };
        Settled::Applied
    }

    pub fn submit(
        &mut self,
        endpoint: &impl IdentityEndpoint,
        input: &FormInput,
    ) -> &RequestState {
        let ticket = self.begin();
        let outcome = endpoint.identify(input);
        self.settle(ticket, outcome);
        &self.state
    }
}
