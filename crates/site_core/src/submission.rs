use std::{sync::Arc, time::Duration};

use shared::domain::{FormField, FormKind, FormRecord};
use thiserror::Error;
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    api::LeadApi, events::SiteEvent, form_store::FormStore, status::SubmissionStatus,
};

pub const SUBMITTING_MESSAGE: &str = "Submitting...";
pub const SUBMIT_FAILED_FALLBACK: &str = "Failed to submit. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("required fields are empty: {}", field_list(.0))]
    MissingRequired(Vec<FormField>),
    #[error("a submission is already in flight")]
    AlreadySubmitting,
}

fn field_list(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|field| field.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Succeeded {
        message: Option<String>,
        submission_id: Option<String>,
    },
    Failed {
        message: String,
    },
    /// The request completed after `abandon` moved the form on; its result was
    /// discarded.
    Superseded,
}

struct SubmissionState {
    generation: u64,
    revert_task: Option<JoinHandle<()>>,
}

/// Every status write happens under `state`, so transitions for one form are
/// strictly ordered. `generation` identifies the latest request; completions
/// and revert timers from older generations are dropped.
pub struct SubmissionController {
    kind: FormKind,
    api: Arc<dyn LeadApi>,
    form: FormStore,
    status: watch::Sender<SubmissionStatus>,
    events: broadcast::Sender<SiteEvent>,
    clear_delay: Duration,
    state: Mutex<SubmissionState>,
}

impl SubmissionController {
    pub fn new(
        kind: FormKind,
        api: Arc<dyn LeadApi>,
        clear_delay: Duration,
        events: broadcast::Sender<SiteEvent>,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(SubmissionStatus::idle());
        Arc::new(Self {
            kind,
            api,
            form: FormStore::new(),
            status,
            events,
            clear_delay,
            state: Mutex::new(SubmissionState {
                generation: 0,
                revert_task: None,
            }),
        })
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    pub fn form(&self) -> &FormStore {
        &self.form
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SubmissionStatus> {
        self.status.subscribe()
    }

    pub fn is_submitting(&self) -> bool {
        self.status.borrow().is_loading()
    }

    /// Empty required fields and overlapping calls are refused before any
    /// status change or network dispatch. The request and its status
    /// transition run on a spawned task, so dropping the returned future
    /// does not leave the form loading.
    pub async fn submit(self: &Arc<Self>) -> Result<SubmitOutcome, SubmitError> {
        let (generation, record) = {
            let mut state = self.state.lock().await;
            let record = self.form.snapshot();

            let missing = record.missing_required(self.kind);
            if !missing.is_empty() {
                debug!(form = %self.kind, missing = %field_list(&missing), "submission: blocked by empty required fields");
                return Err(SubmitError::MissingRequired(missing));
            }
            if self.status.borrow().is_loading() {
                warn!(form = %self.kind, "submission: ignoring submit while a request is in flight");
                return Err(SubmitError::AlreadySubmitting);
            }

            if let Some(task) = state.revert_task.take() {
                task.abort();
            }
            state.generation += 1;
            self.publish(SubmissionStatus::loading(SUBMITTING_MESSAGE));
            (state.generation, record)
        };

        let flight = tokio::spawn(Arc::clone(self).dispatch(generation, record));
        match flight.await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                warn!(form = %self.kind, generation, "submission: request task ended: {err}");
                let mut state = self.state.lock().await;
                if state.generation != generation {
                    return Ok(SubmitOutcome::Superseded);
                }
                let message = SUBMIT_FAILED_FALLBACK.to_string();
                self.publish(SubmissionStatus::error(message.clone()));
                self.schedule_revert(&mut state, generation);
                Ok(SubmitOutcome::Failed { message })
            }
        }
    }

    async fn dispatch(self: Arc<Self>, generation: u64, record: Arc<FormRecord>) -> SubmitOutcome {
        info!(form = %self.kind, generation, "submission: dispatching");
        let result = self.api.submit(self.kind, &record).await;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(
                form = %self.kind,
                generation,
                current = state.generation,
                "submission: dropping stale completion"
            );
            return SubmitOutcome::Superseded;
        }

        let outcome = match result {
            Ok(receipt) => {
                info!(
                    form = %self.kind,
                    generation,
                    submission_id = receipt.submission_id.as_deref().unwrap_or("-"),
                    "submission: accepted"
                );
                self.form.reset();
                self.publish(SubmissionStatus::success(receipt.message.clone()));
                SubmitOutcome::Succeeded {
                    message: receipt.message,
                    submission_id: receipt.submission_id,
                }
            }
            Err(failure) => {
                warn!(form = %self.kind, generation, "submission: failed: {failure}");
                let message = failure
                    .detail()
                    .unwrap_or(SUBMIT_FAILED_FALLBACK)
                    .to_string();
                self.publish(SubmissionStatus::error(message.clone()));
                SubmitOutcome::Failed { message }
            }
        };

        self.schedule_revert(&mut state, generation);
        outcome
    }

    /// Discards any in-flight request and pending auto-revert and returns the
    /// form to idle. The record is left as is.
    pub async fn abandon(&self) {
        let mut state = self.state.lock().await;
        state.generation += 1;
        if let Some(task) = state.revert_task.take() {
            task.abort();
        }
        if !self.status.borrow().is_idle() {
            debug!(form = %self.kind, "submission: abandoned");
            self.publish(SubmissionStatus::idle());
        }
    }

    fn schedule_revert(self: &Arc<Self>, state: &mut SubmissionState, generation: u64) {
        if let Some(task) = state.revert_task.take() {
            task.abort();
        }

        let controller = Arc::downgrade(self);
        let delay = self.clear_delay;
        state.revert_task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(controller) = controller.upgrade() else {
                return;
            };
            let mut state = controller.state.lock().await;
            if state.generation != generation {
                return;
            }
            state.revert_task = None;
            debug!(form = %controller.kind, generation, "submission: status cleared");
            controller.publish(SubmissionStatus::idle());
        }));
    }

    fn publish(&self, status: SubmissionStatus) {
        self.status.send_replace(status.clone());
        let _ = self.events.send(SiteEvent::SubmissionStatusChanged {
            form: self.kind,
            status,
        });
    }
}

impl Drop for SubmissionController {
    fn drop(&mut self) {
        if let Some(task) = self.state.get_mut().revert_task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
