use std::collections::HashMap;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;
use validator::Validate;

use crate::context::{Role, SessionContext};
use crate::dto::exam_dto::{ExamSessionView, OpenSessionRequest, SubmissionResponse};
use crate::error::{Error, Result};
use crate::models::test_response::TestResponse;
use crate::services::countdown::Countdown;
use crate::services::exam_session::{
    ExamSession, SubmissionDraft, SubmitTrigger, TickOutcome, DASHBOARD_PATH,
};
use crate::services::exam_store::ExamStore;
use crate::services::grading_client::GradingClient;
use crate::services::grading_service;

type SharedSession = Arc<Mutex<ExamSession>>;

fn lock(session: &SharedSession) -> MutexGuard<'_, ExamSession> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Bounds on the in-memory session registry.
#[derive(Debug, Clone, Copy)]
pub struct SessionLimits {
    pub idle_ttl: Duration,
    pub submitted_ttl: Duration,
    pub max_per_applicant: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_ttl: Duration::from_secs(60 * 60),
            submitted_ttl: Duration::from_secs(5 * 60),
            max_per_applicant: 5,
        }
    }
}

/// Application service for timed skill tests: validation, then grading, then
/// persistence. Sessions live in memory only.
#[derive(Clone)]
pub struct ExamService {
    store: Arc<dyn ExamStore>,
    grader: Arc<dyn GradingClient>,
    sessions: Arc<Mutex<HashMap<Uuid, SharedSession>>>,
    tick_period: Duration,
    limits: SessionLimits,
}

impl ExamService {
    pub fn new(store: Arc<dyn ExamStore>, grader: Arc<dyn GradingClient>) -> Self {
        Self::with_limits(store, grader, SessionLimits::default())
    }

    pub fn with_limits(store: Arc<dyn ExamStore>, grader: Arc<dyn GradingClient>, limits: SessionLimits) -> Self {
        Self {
            store,
            grader,
            sessions: Arc::new(Mutex::new(HashMap::new())),
            tick_period: Duration::from_secs(1),
            limits,
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<Uuid, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.registry().len()
    }

    fn session(&self, ctx: &SessionContext, session_id: Uuid) -> Result<SharedSession> {
        let shared = self
            .registry()
            .get(&session_id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Exam session not found".into()))?;
        {
            let mut session = lock(&shared);
            if session.context().user_id != ctx.user_id {
                return Err(Error::NotFound("Exam session not found".into()));
            }
            session.touch();
        }
        Ok(shared)
    }

    pub fn open_session(&self, ctx: &SessionContext, req: OpenSessionRequest) -> Result<ExamSessionView> {
        ctx.require_role(Role::Applicant)?;
        let req = req.normalized();
        req.validate()?;

        let id = Uuid::new_v4();
        let session = ExamSession::new(id, ctx.clone(), req.applicant_name, req.applicant_email);
        let view = session.view();
        {
            let mut registry = self.registry();
            self.make_room(&mut registry, ctx.user_id)?;
            registry.insert(id, Arc::new(Mutex::new(session)));
        }
        tracing::info!(session_id = %id, applicant_id = %ctx.user_id, "exam session opened");
        Ok(view)
    }

    pub fn view(&self, ctx: &SessionContext, session_id: Uuid) -> Result<ExamSessionView> {
        let shared = self.session(ctx, session_id)?;
        let view = lock(&shared).view();
        Ok(view)
    }

    /// Loads pending assignments: one goes straight to `NotStarted`, several
    /// open the selection list.
    pub async fn load_assignments(&self, ctx: &SessionContext, session_id: Uuid) -> Result<ExamSessionView> {
        let shared = self.session(ctx, session_id)?;
        lock(&shared).ensure_can_load_assignments()?;

        let mut options = self.store.list_pending_assignments(ctx).await?;
        match options.len() {
            0 => Err(Error::NotFound("You have no pending skill tests".into())),
            1 => {
                let only = options.remove(0);
                self.load_test(ctx, &shared, only.test_id).await
            }
            n => {
                tracing::info!(session_id = %session_id, count = n, "offering test selection");
                let mut session = lock(&shared);
                session.offer_assignments(options)?;
                Ok(session.view())
            }
        }
    }

    pub async fn select_test(&self, ctx: &SessionContext, session_id: Uuid, test_id: Uuid) -> Result<ExamSessionView> {
        let shared = self.session(ctx, session_id)?;
        lock(&shared).ensure_offered(test_id)?;
        self.load_test(ctx, &shared, test_id).await
    }

    async fn load_test(&self, ctx: &SessionContext, shared: &SharedSession, test_id: Uuid) -> Result<ExamSessionView> {
        let test = self.store.fetch_skill_test(ctx, test_id).await?;
        let question = self.store.fetch_question(ctx, test_id).await?;

        let mut session = lock(shared);
        session.load_test(test, question)?;
        tracing::info!(
            session_id = %session.id(),
            test_id = %test_id,
            remaining_seconds = session.remaining_seconds(),
            "skill test loaded"
        );
        Ok(session.view())
    }

    pub fn start(&self, ctx: &SessionContext, session_id: Uuid, confirmed: bool) -> Result<ExamSessionView> {
        let shared = self.session(ctx, session_id)?;
        let mut session = lock(&shared);
        session.start(confirmed)?;
        self.arm_countdown(&shared, &mut session);
        tracing::info!(
            session_id = %session_id,
            remaining_seconds = session.remaining_seconds(),
            "exam started"
        );
        Ok(session.view())
    }

    pub fn update_answer(&self, ctx: &SessionContext, session_id: Uuid, answer: String) -> Result<ExamSessionView> {
        let shared = self.session(ctx, session_id)?;
        let mut session = lock(&shared);
        session.edit_answer(answer)?;
        Ok(session.view())
    }

    pub async fn submit(&self, ctx: &SessionContext, session_id: Uuid, confirmed: bool) -> Result<SubmissionResponse> {
        let shared = self.session(ctx, session_id)?;
        let draft = {
            let mut session = lock(&shared);
            match session.begin_submission(SubmitTrigger::Manual { confirmed }) {
                Ok(draft) => draft,
                Err(err) => {
                    tracing::warn!(session_id = %session_id, error = %err, "submission rejected");
                    return Err(err.into());
                }
            }
        };
        let response = self.run_pipeline(shared, draft).await?;
        Ok(submission_response(response))
    }

    /// Explicit cancellation and teardown: the session and its timer go away.
    pub fn close_session(&self, ctx: &SessionContext, session_id: Uuid) -> Result<()> {
        let shared = self.session(ctx, session_id)?;
        self.registry().remove(&session_id);
        lock(&shared).teardown();
        tracing::info!(session_id = %session_id, "exam session closed");
        Ok(())
    }

    /// Evicts the applicant's least recently used session once they hit the
    /// cap. Sessions mid-exam are never evicted to make room.
    fn make_room(&self, registry: &mut HashMap<Uuid, SharedSession>, user_id: Uuid) -> Result<()> {
        let owned: Vec<(Uuid, Instant, bool)> = registry
            .iter()
            .filter_map(|(id, shared)| {
                let session = lock(shared);
                (session.context().user_id == user_id)
                    .then(|| (*id, session.touched_at(), session.is_mid_exam()))
            })
            .collect();
        if owned.len() < self.limits.max_per_applicant.max(1) {
            return Ok(());
        }

        let oldest = owned
            .iter()
            .filter(|(_, _, busy)| !busy)
            .min_by_key(|(_, touched_at, _)| *touched_at)
            .map(|(id, _, _)| *id)
            .ok_or_else(|| Error::Conflict("Too many exam sessions in progress".into()))?;
        if let Some(evicted) = registry.remove(&oldest) {
            lock(&evicted).teardown();
            tracing::info!(session_id = %oldest, applicant_id = %user_id, "exam session evicted to make room");
        }
        Ok(())
    }

    /// Drops submitted and idle sessions past their TTL. Returns how many
    /// were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let evicted: Vec<(Uuid, SharedSession)> = {
            let mut registry = self.registry();
            let stale: Vec<Uuid> = registry
                .iter()
                .filter(|(_, shared)| {
                    lock(shared).is_stale(now, self.limits.idle_ttl, self.limits.submitted_ttl)
                })
                .map(|(id, _)| *id)
                .collect();
            stale
                .into_iter()
                .filter_map(|id| registry.remove(&id).map(|shared| (id, shared)))
                .collect()
        };
        for (id, shared) in &evicted {
            lock(shared).teardown();
            tracing::debug!(session_id = %id, "stale exam session evicted");
        }
        evicted.len()
    }

    /// Runs `sweep` every `period` for the life of the process.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let evicted = service.sweep();
                if evicted > 0 {
                    tracing::info!(evicted, "evicted stale exam sessions");
                }
            }
        })
    }

    /// Starts the single live timer for an `InProgress` entry. Ticks hold only
    /// a weak reference so a closed session stops its own timer.
    fn arm_countdown(&self, shared: &SharedSession, session: &mut ExamSession) {
        if session.remaining_seconds() == 0 {
            return;
        }
        let weak = Arc::downgrade(shared);
        let service = self.clone();
        let countdown = Countdown::start(self.tick_period, move || {
            let Some(shared) = weak.upgrade() else {
                return ControlFlow::Break(());
            };
            let draft = {
                let mut session = lock(&shared);
                match session.tick() {
                    TickOutcome::Running(_) => return ControlFlow::Continue(()),
                    TickOutcome::Ignored => return ControlFlow::Break(()),
                    TickOutcome::Expired => match session.begin_submission(SubmitTrigger::Timeout) {
                        Ok(draft) => draft,
                        Err(err) => {
                            tracing::warn!(session_id = %session.id(), error = %err, "automatic submission rejected");
                            session.record_error(err.to_string());
                            return ControlFlow::Break(());
                        }
                    },
                }
            };
            tracing::info!(test_id = %draft.test_id, "time is up, submitting automatically");
            let service = service.clone();
            tokio::spawn(async move {
                let _ = service.run_pipeline(shared, draft).await;
            });
            ControlFlow::Break(())
        });
        session.attach_countdown(countdown);
    }

    async fn run_pipeline(&self, shared: SharedSession, draft: SubmissionDraft) -> Result<TestResponse> {
        match self.grade_and_persist(&draft).await {
            Ok(response) => {
                let mut session = lock(&shared);
                session.complete_submission(response.id)?;
                tracing::info!(
                    session_id = %session.id(),
                    response_id = %response.id,
                    score = response.score,
                    trigger = ?draft.trigger,
                    "submission graded and saved"
                );
                Ok(response)
            }
            Err(err) => {
                let mut session = lock(&shared);
                tracing::error!(session_id = %session.id(), error = %err, "submission failed");
                if session.fail_submission(err.to_string())? {
                    self.arm_countdown(&shared, &mut session);
                }
                Err(err)
            }
        }
    }

    async fn grade_and_persist(&self, draft: &SubmissionDraft) -> Result<TestResponse> {
        let ctx = &draft.context;
        let prompt = grading_service::build_grading_prompt(&draft.answer);
        let reply = self.grader.grade(ctx, &prompt).await?;
        let report = grading_service::parse_grading_reply(&reply)?;

        let assignment = self
            .store
            .find_pending_assignment(ctx, draft.test_id)
            .await?
            .ok_or_else(|| {
                Error::Attribution(format!(
                    "no pending assignment of test {} for applicant {}",
                    draft.test_id, ctx.user_id
                ))
            })?;

        let row = report.into_new_response(draft.test_id, draft.answer.clone(), Utc::now());
        self.store.record_submission(ctx, assignment.id, row).await
    }
}

fn submission_response(response: TestResponse) -> SubmissionResponse {
    SubmissionResponse {
        response_id: response.id,
        score: response.score,
        code_quality: response.code_quality,
        maintainability: response.maintainability,
        algorithm: response.algorithm,
        readability: response.readability,
        performance: response.performance,
        review_comments: response.review_comments,
        redirect_to: DASHBOARD_PATH.to_string(),
    }
}
