use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::applications::domain::{
    Application, ApplicationStatus, Interview, InterviewRequest, NewApplication,
};
use super::jobs::domain::{Job, JobSearch, JobUpdate, NewJob};
use super::jobs::JobSearchPage;
use super::reminders::ReminderOutcome;
use super::users::{EmailPreferences, NewUser, User, UserError};
use super::Board;
use crate::error::BoardError;
use crate::policy::{require_owner, Actor};
use crate::store::RecordStore;

/// Router exposing the board's HTTP endpoints. The acting account is
/// conveyed by an `x-actor-id` header resolved against the user service;
/// the original build's mock session works the same way.
pub fn board_router<S>(board: Board<S>) -> Router
where
    S: RecordStore + 'static,
{
    Router::new()
        .route("/api/v1/users", post(register::<S>))
        .route("/api/v1/users/:user_id", get(get_user::<S>))
        .route(
            "/api/v1/users/:user_id/email-preferences",
            put(update_email_preferences::<S>),
        )
        .route("/api/v1/jobs", get(search_jobs::<S>).post(post_job::<S>))
        .route(
            "/api/v1/jobs/:job_id",
            get(view_job::<S>).put(update_job::<S>).delete(delete_job::<S>),
        )
        .route("/api/v1/jobs/:job_id/applications", get(job_applications::<S>))
        .route("/api/v1/employers/:user_id/jobs", get(employer_jobs::<S>))
        .route("/api/v1/applications", post(apply::<S>))
        .route("/api/v1/applications/:application_id", get(get_application::<S>))
        .route(
            "/api/v1/applications/:application_id/status",
            put(update_application_status::<S>),
        )
        .route(
            "/api/v1/applications/:application_id/interview",
            post(schedule_interview::<S>),
        )
        .route(
            "/api/v1/candidates/:user_id/applications",
            get(candidate_applications::<S>),
        )
        .route("/api/v1/reminders/run", post(run_reminders::<S>))
        .with_state(board)
}

fn resolve_actor<S: RecordStore>(
    board: &Board<S>,
    headers: &HeaderMap,
) -> Result<Actor, BoardError> {
    let user_id = headers
        .get("x-actor-id")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            BoardError::User(UserError::Validation(
                "missing x-actor-id header".to_string(),
            ))
        })?;
    let user = board.users.get(user_id)?;
    Ok(Actor {
        user_id: user.id,
        role: user.role,
    })
}

async fn register<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Json(payload): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), BoardError> {
    let user = board.users.register(payload)?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<User>, BoardError> {
    Ok(Json(board.users.get(&user_id)?))
}

async fn update_email_preferences<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(preferences): Json<EmailPreferences>,
) -> Result<Json<User>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let user = board
        .users
        .update_email_preferences(&actor, &user_id, preferences)?;
    Ok(Json(user))
}

async fn search_jobs<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Query(search): Query<JobSearch>,
) -> Result<Json<JobSearchPage>, BoardError> {
    Ok(Json(board.jobs.search(&search)?))
}

async fn view_job<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, BoardError> {
    Ok(Json(board.jobs.view(&job_id)?))
}

async fn post_job<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    headers: HeaderMap,
    Json(payload): Json<NewJob>,
) -> Result<(StatusCode, Json<Job>), BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let job = board.jobs.post(&actor, payload)?;
    Ok((StatusCode::CREATED, Json(job)))
}

async fn update_job<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<JobUpdate>,
) -> Result<Json<Job>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    Ok(Json(board.jobs.update(&actor, &job_id, payload)?))
}

/// Response for a soft delete: the closed listing plus how many open
/// applications were transitioned to `job_closed`.
#[derive(Debug, Serialize)]
pub struct JobDeleted {
    pub job: Job,
    pub closed_applications: usize,
}

async fn delete_job<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<JobDeleted>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let (job, closed_applications) = board.jobs.delete(&actor, &job_id)?;
    Ok(Json(JobDeleted {
        job,
        closed_applications,
    }))
}

async fn employer_jobs<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Job>>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    require_owner(&actor, &user_id).map_err(UserError::from)?;
    Ok(Json(board.jobs.list_for_employer(&actor)?))
}

async fn apply<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    headers: HeaderMap,
    Json(payload): Json<NewApplication>,
) -> Result<(StatusCode, Json<Application>), BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let application = board.applications.apply(&actor, payload)?;
    Ok((StatusCode::CREATED, Json(application)))
}

async fn get_application<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Application>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    Ok(Json(board.applications.get_for(&actor, &application_id)?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: ApplicationStatus,
    #[serde(default)]
    pub note: Option<String>,
}

async fn update_application_status<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<Json<Application>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let application =
        board
            .applications
            .update_status(&actor, &application_id, payload.status, payload.note)?;
    Ok(Json(application))
}

/// Response for the compound scheduling operation.
#[derive(Debug, Serialize)]
pub struct InterviewScheduled {
    pub interview: Interview,
    pub application: Application,
}

async fn schedule_interview<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(application_id): Path<String>,
    headers: HeaderMap,
    Json(payload): Json<InterviewRequest>,
) -> Result<(StatusCode, Json<InterviewScheduled>), BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let (interview, application) =
        board
            .applications
            .schedule_interview(&actor, &application_id, payload)?;
    Ok((
        StatusCode::CREATED,
        Json(InterviewScheduled {
            interview,
            application,
        }),
    ))
}

async fn candidate_applications<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Application>>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    require_owner(&actor, &user_id).map_err(UserError::from)?;
    Ok(Json(board.applications.list_for_candidate(&actor)?))
}

async fn job_applications<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Application>>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    Ok(Json(board.applications.list_for_job(&actor, &job_id)?))
}

/// Fetch-time trigger for the deadline check, run for the acting candidate.
async fn run_reminders<S: RecordStore + 'static>(
    State(board): State<Board<S>>,
    headers: HeaderMap,
) -> Result<Json<ReminderOutcome>, BoardError> {
    let actor = resolve_actor(&board, &headers)?;
    let user = board.users.get(&actor.user_id)?;
    Ok(Json(board.reminders.run_check(&user, chrono::Utc::now())))
}
