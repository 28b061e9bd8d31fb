//! Step progression controller for multi-step forms.
//!
//! A [`WizardSession`] holds an ordered list of [`WizardStep`]s, each owning
//! its own [`FormState`] and a completion predicate over that form's
//! snapshot. Steps form a strict linear sequence: a step is unlocked only
//! when every step before it is complete, and navigation never discards the
//! data entered in any step.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::form::{FormSnapshot, FormState};
use crate::types::Timestamp;

/// Predicate deciding whether a step's data allows moving past it.
pub type CompletionPredicate = Arc<dyn Fn(&FormSnapshot) -> bool + Send + Sync>;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One page of a multi-page form.
#[derive(Clone)]
pub struct WizardStep {
    id: &'static str,
    label: &'static str,
    form: FormState,
    completion: CompletionPredicate,
}

impl std::fmt::Debug for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WizardStep")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

impl WizardStep {
    /// A step that is complete when its form is submittable.
    pub fn new(id: &'static str, label: &'static str, form: FormState) -> Self {
        Self {
            id,
            label,
            form,
            completion: Arc::new(FormSnapshot::is_submittable),
        }
    }

    /// Replace the completion predicate.
    pub fn with_completion(
        mut self,
        predicate: impl Fn(&FormSnapshot) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.completion = Arc::new(predicate);
        self
    }

    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn is_complete(&self) -> bool {
        (self.completion)(&self.form.snapshot())
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where the session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "index")]
pub enum WizardState {
    Active(usize),
    Submitted,
}

/// Outcome of a navigation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: usize, to: usize },
    /// The active step is incomplete; its errors are now populated.
    Blocked,
    /// Nothing to do (boundary reached, step locked, or session submitted).
    NoOp,
}

/// Display status of a step, for rendering a step indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Locked,
    Active,
    Complete,
    Unlocked,
}

/// Serializable form of an in-progress session, for transient persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedWizard {
    pub id: Uuid,
    pub active: usize,
    pub steps: Vec<FormSnapshot>,
}

/// Errors returned by [`WizardSession::submit`].
#[derive(Debug, thiserror::Error)]
pub enum WizardSubmitError<E> {
    #[error("Wizard has incomplete steps")]
    Incomplete,

    #[error("Wizard session already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Failed(E),
}

/// The single external call made when a wizard is submitted.
#[async_trait]
pub trait WizardSubmitter: Send + Sync {
    type Output: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Submit the snapshots of every step, in order.
    async fn submit(&self, steps: &[FormSnapshot]) -> Result<Self::Output, Self::Error>;
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// The full in-progress state of a multi-step form.
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    steps: Vec<WizardStep>,
    active: usize,
    submitted_at: Option<Timestamp>,
}

impl WizardSession {
    /// Start a session at the first step.
    pub fn new(steps: Vec<WizardStep>) -> Result<Self, CoreError> {
        if steps.is_empty() {
            return Err(CoreError::Validation(
                "A wizard needs at least one step".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            steps,
            active: 0,
            submitted_at: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    pub fn state(&self) -> WizardState {
        if self.submitted_at.is_some() {
            WizardState::Submitted
        } else {
            WizardState::Active(self.active)
        }
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_step(&self) -> &WizardStep {
        &self.steps[self.active]
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    pub fn submitted_at(&self) -> Option<Timestamp> {
        self.submitted_at
    }

    /// Index of the step with the given id.
    pub fn index_of(&self, step_id: &str) -> Result<usize, CoreError> {
        self.steps
            .iter()
            .position(|s| s.id == step_id)
            .ok_or_else(|| CoreError::NotFound {
                entity: "wizard step",
                id: step_id.to_string(),
            })
    }

    pub fn form(&self, index: usize) -> Option<&FormState> {
        self.steps.get(index).map(WizardStep::form)
    }

    /// Mutable access to the active step's form. Refused once submitted.
    pub fn active_form_mut(&mut self) -> Result<&mut FormState, CoreError> {
        if self.is_submitted() {
            return Err(CoreError::Conflict(
                "Wizard session has been submitted; start a new session to edit".to_string(),
            ));
        }
        Ok(&mut self.steps[self.active].form)
    }

    // -- lock state --

    /// A step is unlocked iff every step before it is complete.
    pub fn is_step_unlocked(&self, index: usize) -> bool {
        if index >= self.steps.len() {
            return false;
        }
        self.steps[..index].iter().all(WizardStep::is_complete)
    }

    pub fn step_status(&self, index: usize) -> StepStatus {
        if index == self.active && !self.is_submitted() {
            StepStatus::Active
        } else if !self.is_step_unlocked(index) {
            StepStatus::Locked
        } else if self.steps[index].is_complete() {
            StepStatus::Complete
        } else {
            StepStatus::Unlocked
        }
    }

    pub fn step_statuses(&self) -> Vec<StepStatus> {
        (0..self.steps.len()).map(|i| self.step_status(i)).collect()
    }

    // -- navigation --

    /// Advance one step if the active step is complete; otherwise surface
    /// its errors and stay.
    pub fn go_next(&mut self) -> Transition {
        if self.is_submitted() {
            return Transition::NoOp;
        }
        let from = self.active;
        if !self.steps[from].is_complete() {
            self.steps[from].form.validate_all();
            tracing::debug!(session = %self.id, step = self.steps[from].id, "Next blocked by incomplete step");
            return Transition::Blocked;
        }
        if from + 1 >= self.steps.len() {
            return Transition::NoOp;
        }
        self.active = from + 1;
        Transition::Moved {
            from,
            to: self.active,
        }
    }

    /// Go back one step. Data in later steps is kept.
    pub fn go_back(&mut self) -> Transition {
        if self.is_submitted() || self.active == 0 {
            return Transition::NoOp;
        }
        let from = self.active;
        self.active -= 1;
        Transition::Moved {
            from,
            to: self.active,
        }
    }

    /// Jump to an unlocked step; locked or out-of-range targets are ignored.
    pub fn jump_to(&mut self, index: usize) -> Transition {
        if self.is_submitted() || index == self.active || !self.is_step_unlocked(index) {
            return Transition::NoOp;
        }
        let from = self.active;
        self.active = index;
        Transition::Moved { from, to: index }
    }

    // -- submission --

    pub fn can_submit(&self) -> bool {
        !self.is_submitted() && self.steps.iter().all(WizardStep::is_complete)
    }

    pub fn snapshots(&self) -> Vec<FormSnapshot> {
        self.steps.iter().map(|s| s.form.snapshot()).collect()
    }

    /// Submit every step through `submitter`.
    ///
    /// Makes exactly one call when all steps are complete. On success the
    /// session is finalized; on failure it is left untouched so the user can
    /// retry.
    pub async fn submit<S>(&mut self, submitter: &S) -> Result<S::Output, WizardSubmitError<S::Error>>
    where
        S: WizardSubmitter + ?Sized,
    {
        if self.is_submitted() {
            return Err(WizardSubmitError::AlreadySubmitted);
        }
        if !self.can_submit() {
            self.steps[self.active].form.validate_all();
            return Err(WizardSubmitError::Incomplete);
        }

        let snapshots = self.snapshots();
        match submitter.submit(&snapshots).await {
            Ok(output) => {
                self.submitted_at = Some(chrono::Utc::now());
                tracing::info!(session = %self.id, steps = snapshots.len(), "Wizard submitted");
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(session = %self.id, error = %e, "Wizard submission failed");
                Err(WizardSubmitError::Failed(e))
            }
        }
    }

    // -- persistence --

    pub fn save(&self) -> SavedWizard {
        SavedWizard {
            id: self.id,
            active: self.active,
            steps: self.snapshots(),
        }
    }

    /// Restore a previously saved session into this (freshly built) one.
    ///
    /// The active index is clamped so a restored session never lands on a
    /// locked step.
    pub fn restore(&mut self, saved: &SavedWizard) -> Result<(), CoreError> {
        if saved.steps.len() != self.steps.len() {
            return Err(CoreError::Validation(format!(
                "Saved wizard has {} steps, expected {}",
                saved.steps.len(),
                self.steps.len()
            )));
        }
        for (step, snapshot) in self.steps.iter_mut().zip(&saved.steps) {
            step.form.restore(snapshot);
        }
        self.id = saved.id;
        self.active = 0;
        while self.active < saved.active && self.is_step_unlocked(self.active + 1) {
            self.active += 1;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
