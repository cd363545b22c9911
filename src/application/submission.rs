use chrono::{DateTime, Utc};
use std::sync::Arc;
use crate::domain::{
    build_threads, sanitize, validate_submission, Comment, CommentId, PageUrl, Thread,
    ValidationError, ValidationResult,
};
use crate::ports::{CommentGateway, RepositoryError};
use super::{MergeEngine, PendingStore};

/// What the user has typed so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComposeForm {
    pub name: String,
    pub text: String,
    pub reply_to: Option<CommentId>,
}

impl ComposeForm {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_submission(&self.name, &self.text)
    }

    /// A new unapproved comment from the form, with sanitized text.
    pub fn compose(&self, url: &PageUrl, now: DateTime<Utc>) -> Comment {
        Comment {
            id: CommentId::generate(),
            name: self.name.clone(),
            text: sanitize(&self.text),
            created_at: now,
            url: url.clone(),
            approved: false,
            parent_comment_id: self.reply_to.clone(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Validating,
    Rejected(ValidationError),
    Submitting(Comment),
    Confirmed(Comment),
    Failed {
        comment: Comment,
        error: RepositoryError,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionEvent {
    Submit,
    Invalid(ValidationError),
    Valid(Comment),
    Accepted,
    GatewayFailed(RepositoryError),
    Settled,
}

impl SubmissionState {
    /// Apply `event`. Events that make no sense in the current state leave
    /// it unchanged.
    pub fn next(self, event: SubmissionEvent) -> Self {
        use SubmissionEvent as E;
        use SubmissionState as S;

        match (self, event) {
            (S::Idle, E::Submit) => S::Validating,
            (S::Validating, E::Invalid(reason)) => S::Rejected(reason),
            (S::Validating, E::Valid(comment)) => S::Submitting(comment),
            (S::Submitting(comment), E::Accepted) => S::Confirmed(comment),
            (S::Submitting(comment), E::GatewayFailed(error)) => S::Failed { comment, error },
            (S::Rejected(_) | S::Confirmed(_) | S::Failed { .. }, E::Settled) => S::Idle,
            (state, _) => state,
        }
    }
}

/// Result of one submit attempt, for the caller to report.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// The form did not pass validation; nothing was sent.
    Rejected(ValidationError),
    /// The remote accepted the comment; it now waits for moderation.
    Confirmed(Comment),
    /// The remote call failed; the comment was not kept.
    Failed {
        comment: Comment,
        error: RepositoryError,
    },
}

/// Drives posting a comment on one page, and holds that page's display set.
pub struct SubmissionController {
    gateway: Arc<dyn CommentGateway>,
    merge_engine: Arc<MergeEngine>,
    pending: PendingStore,
    page: PageUrl,
    form: ComposeForm,
    state: SubmissionState,
    comments: Vec<Comment>,
}

impl SubmissionController {
    pub fn new(
        gateway: Arc<dyn CommentGateway>,
        merge_engine: Arc<MergeEngine>,
        pending: PendingStore,
        page: PageUrl,
    ) -> Self {
        Self {
            gateway,
            merge_engine,
            pending,
            page,
            form: ComposeForm::default(),
            state: SubmissionState::Idle,
            comments: Vec::new(),
        }
    }

    pub fn page(&self) -> &PageUrl {
        &self.page
    }

    pub fn form(&self) -> &ComposeForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ComposeForm {
        &mut self.form
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn threads(&self) -> Vec<Thread> {
        build_threads(self.comments.clone())
    }

    /// Replace the display set with a fresh reconciliation. Returns the
    /// fetch error, if the remote list was unavailable.
    pub async fn refresh(&mut self) -> Option<RepositoryError> {
        let reconciliation = self.merge_engine.reconcile(&self.page).await;
        self.comments = reconciliation.comments;
        reconciliation.fetch_error
    }

    pub async fn submit(&mut self) -> SubmissionOutcome {
        self.advance(SubmissionEvent::Submit);

        if let Err(reason) = self.form.validate() {
            tracing::debug!("Submission rejected: {}", reason);
            self.advance(SubmissionEvent::Invalid(reason.clone()));
            self.advance(SubmissionEvent::Settled);
            return SubmissionOutcome::Rejected(reason);
        }

        let comment = self.form.compose(&self.page, Utc::now());
        self.advance(SubmissionEvent::Valid(comment.clone()));
        self.comments.push(comment.clone());

        let outcome = match self.gateway.submit(&comment).await {
            Ok(()) => {
                tracing::info!("Comment {} submitted for {}", comment.id, self.page);
                self.advance(SubmissionEvent::Accepted);
                if let Err(e) = self.pending.append(&comment) {
                    tracing::warn!("Failed to remember pending comment {}: {}", comment.id, e);
                }
                SubmissionOutcome::Confirmed(comment)
            }
            Err(error) => {
                tracing::warn!("Failed to submit comment for {}: {}", self.page, error);
                self.advance(SubmissionEvent::GatewayFailed(error.clone()));
                SubmissionOutcome::Failed { comment, error }
            }
        };

        self.form.clear();
        self.advance(SubmissionEvent::Settled);
        outcome
    }

    fn advance(&mut self, event: SubmissionEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = state.next(event);
        tracing::debug!("Submission state: {:?}", self.state);
    }
}
