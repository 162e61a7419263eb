use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::context::SessionContext;
use crate::dto::exam_dto::{ActiveTestSummary, ExamSessionView};
use crate::models::skill_test::SkillTest;
use crate::models::test_applicant::PendingAssignment;
use crate::models::test_question::TestQuestion;
use crate::services::countdown::Countdown;

/// Remaining time at or below which the countdown is shown as an alert.
pub const ALERT_THRESHOLD_SECONDS: u32 = 300;

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamState {
    NotSelected,
    SelectingTest,
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual { confirmed: bool },
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running; the tick was late or stale.
    Ignored,
    Running(u32),
    /// Reached zero on this tick. Reported exactly once per countdown.
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("{0}")]
    Validation(String),
    #[error("Please confirm before you {0}")]
    ConfirmationRequired(&'static str),
    #[error("Cannot {action} while the exam is {state:?}")]
    InvalidState {
        action: &'static str,
        state: ExamState,
    },
    #[error("Test {0} is not one of your pending assignments")]
    UnknownTest(Uuid),
}

/// Everything the grading pipeline needs, captured when entering `Submitting`.
#[derive(Debug, Clone)]
pub struct SubmissionDraft {
    pub context: SessionContext,
    pub test_id: Uuid,
    pub answer: String,
    pub trigger: SubmitTrigger,
}

#[derive(Debug)]
pub struct ExamSession {
    id: Uuid,
    context: SessionContext,
    applicant_name: String,
    applicant_email: String,
    state: ExamState,
    options: Vec<PendingAssignment>,
    test: Option<SkillTest>,
    question: Option<TestQuestion>,
    answer: String,
    remaining_seconds: u32,
    countdown: Option<Countdown>,
    last_error: Option<String>,
    response_id: Option<Uuid>,
    touched_at: Instant,
}

impl ExamSession {
    pub fn new(
        id: Uuid,
        context: SessionContext,
        applicant_name: impl Into<String>,
        applicant_email: impl Into<String>,
    ) -> Self {
        Self {
            id,
            context,
            applicant_name: applicant_name.into(),
            applicant_email: applicant_email.into(),
            state: ExamState::NotSelected,
            options: Vec::new(),
            test: None,
            question: None,
            answer: String::new(),
            remaining_seconds: 0,
            countdown: None,
            last_error: None,
            response_id: None,
            touched_at: Instant::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn state(&self) -> ExamState {
        self.state
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn options(&self) -> &[PendingAssignment] {
        &self.options
    }

    pub fn timer_active(&self) -> bool {
        self.countdown.as_ref().is_some_and(Countdown::is_active)
    }

    pub fn touched_at(&self) -> Instant {
        self.touched_at
    }

    pub fn touch(&mut self) {
        self.touched_at = Instant::now();
    }

    /// An exam the applicant is sitting or that is being graded.
    pub fn is_mid_exam(&self) -> bool {
        matches!(self.state, ExamState::InProgress | ExamState::Submitting)
    }

    /// Submitted sessions expire after `submitted_ttl`, idle ones after
    /// `idle_ttl`. A running clock or an in-flight submission keeps it alive.
    pub fn is_stale(&self, now: Instant, idle_ttl: Duration, submitted_ttl: Duration) -> bool {
        let idle = now.saturating_duration_since(self.touched_at);
        match self.state {
            ExamState::Submitted => idle >= submitted_ttl,
            ExamState::Submitting => false,
            _ if self.timer_active() => false,
            _ => idle >= idle_ttl,
        }
    }

    fn expect_state(&self, action: &'static str, allowed: &[ExamState]) -> Result<(), TransitionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(TransitionError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    pub fn ensure_can_load_assignments(&self) -> Result<(), TransitionError> {
        self.expect_state(
            "load assignments",
            &[ExamState::NotSelected, ExamState::SelectingTest],
        )
    }

    pub fn offer_assignments(&mut self, options: Vec<PendingAssignment>) -> Result<(), TransitionError> {
        self.ensure_can_load_assignments()?;
        self.options = options;
        self.state = ExamState::SelectingTest;
        Ok(())
    }

    /// Checks a selection before the test and question are fetched.
    pub fn ensure_offered(&self, test_id: Uuid) -> Result<(), TransitionError> {
        self.expect_state("select a test", &[ExamState::SelectingTest])?;
        if self.options.iter().any(|o| o.test_id == test_id) {
            Ok(())
        } else {
            Err(TransitionError::UnknownTest(test_id))
        }
    }

    /// Loads the chosen test: the question text becomes the answer buffer and
    /// the countdown is reset to the full time limit.
    pub fn load_test(&mut self, test: SkillTest, question: TestQuestion) -> Result<(), TransitionError> {
        self.ensure_can_load_assignments()?;
        if self.state == ExamState::SelectingTest && !self.options.iter().any(|o| o.test_id == test.id) {
            return Err(TransitionError::UnknownTest(test.id));
        }
        self.remaining_seconds = test.time_limit_seconds();
        self.answer = question.question.clone();
        self.test = Some(test);
        self.question = Some(question);
        self.last_error = None;
        self.state = ExamState::NotStarted;
        Ok(())
    }

    pub fn start(&mut self, confirmed: bool) -> Result<(), TransitionError> {
        self.expect_state("start the test", &[ExamState::NotStarted])?;
        if !confirmed {
            return Err(TransitionError::ConfirmationRequired("start the test"));
        }
        self.state = ExamState::InProgress;
        Ok(())
    }

    /// Replaces any previous timer; the old one is cancelled on drop.
    pub fn attach_countdown(&mut self, countdown: Countdown) {
        self.countdown = Some(countdown);
    }

    pub fn edit_answer(&mut self, answer: String) -> Result<(), TransitionError> {
        self.expect_state("edit the answer", &[ExamState::InProgress])?;
        self.answer = answer;
        Ok(())
    }

    pub fn tick(&mut self) -> TickOutcome {
        if self.state != ExamState::InProgress || self.remaining_seconds == 0 {
            return TickOutcome::Ignored;
        }
        self.remaining_seconds -= 1;
        if self.remaining_seconds == 0 {
            self.countdown = None;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.remaining_seconds)
        }
    }

    /// `InProgress -> Submitting`. Rejections leave the state untouched.
    pub fn begin_submission(&mut self, trigger: SubmitTrigger) -> Result<SubmissionDraft, TransitionError> {
        self.expect_state("submit", &[ExamState::InProgress])?;

        if self.applicant_name.trim().is_empty() {
            return Err(TransitionError::Validation("Please enter your name".into()));
        }
        if self.applicant_email.trim().is_empty() {
            return Err(TransitionError::Validation("Please enter your email".into()));
        }
        if self.answer.trim().is_empty() {
            return Err(TransitionError::Validation("Please write an answer before submitting".into()));
        }
        if let SubmitTrigger::Manual { confirmed: false } = trigger {
            return Err(TransitionError::ConfirmationRequired("submit your answer"));
        }

        let test_id = match &self.test {
            Some(test) => test.id,
            None => {
                return Err(TransitionError::InvalidState {
                    action: "submit",
                    state: self.state,
                })
            }
        };

        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
        self.last_error = None;
        self.state = ExamState::Submitting;

        Ok(SubmissionDraft {
            context: self.context.clone(),
            test_id,
            answer: self.answer.clone(),
            trigger,
        })
    }

    pub fn complete_submission(&mut self, response_id: Uuid) -> Result<(), TransitionError> {
        self.expect_state("complete the submission", &[ExamState::Submitting])?;
        self.response_id = Some(response_id);
        self.state = ExamState::Submitted;
        self.touch();
        Ok(())
    }

    /// `Submitting -> InProgress`. Returns whether time is left to resume the
    /// countdown; at zero the applicant has to resubmit manually.
    pub fn fail_submission(&mut self, message: impl Into<String>) -> Result<bool, TransitionError> {
        self.expect_state("fail the submission", &[ExamState::Submitting])?;
        self.last_error = Some(message.into());
        self.state = ExamState::InProgress;
        self.touch();
        Ok(self.remaining_seconds > 0)
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    /// Releases the timer on teardown.
    pub fn teardown(&mut self) {
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    pub fn view(&self) -> ExamSessionView {
        ExamSessionView {
            id: self.id,
            state: self.state,
            applicant_name: self.applicant_name.clone(),
            applicant_email: self.applicant_email.clone(),
            options: self.options.clone(),
            test: self.test.as_ref().map(|t| ActiveTestSummary {
                test_id: t.id,
                title: t.title.clone(),
                category: t.category.clone(),
                programming_language: t.programming_language.clone(),
                experience_level: t.experience_level.clone(),
                difficulty: t.difficulty.clone(),
                time_limit: t.time_limit,
            }),
            question: self.question.as_ref().map(|q| q.question.clone()),
            answer: self.answer.clone(),
            editable: self.state == ExamState::InProgress,
            remaining_seconds: self.remaining_seconds,
            alert: self.test.is_some() && self.remaining_seconds <= ALERT_THRESHOLD_SECONDS,
            timer_active: self.timer_active(),
            last_error: self.last_error.clone(),
            response_id: self.response_id,
            redirect_to: (self.state == ExamState::Submitted).then(|| DASHBOARD_PATH.to_string()),
        }
    }
}
