//! API route handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::auth::models::{AuthRecord, LoginRequest, RegisterRequest, SessionInfo};
use crate::auth::{CurrentUser, RequestAuth};
use crate::content::pages::{self, parse_id, CoursePage, HomePage, LessonPage, QuizPage};
use crate::error::{Error, Result};

// Request/Response types

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

// Health check

pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok("healthy"))
}

// Content routes

pub async fn list_courses(State(state): State<SharedState>) -> Result<Json<ApiResponse<HomePage>>> {
    let page = pages::load_home(&state.content).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_course(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CoursePage>>> {
    let id = parse_id(&id).ok_or(Error::CourseNotFound(id))?;
    let page = pages::load_course_page(&state.content, id).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_lesson(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<LessonPage>>> {
    let id = parse_id(&id).ok_or(Error::LessonNotFound(id))?;
    let page = pages::load_lesson_page(&state.content, id).await?;
    Ok(Json(ApiResponse::ok(page)))
}

pub async fn get_quiz(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<QuizPage>>> {
    let id = parse_id(&id).ok_or(Error::QuizNotFound(id))?;
    let page = pages::load_quiz_page(&state.content, id).await?;
    Ok(Json(ApiResponse::ok(page)))
}

// Auth routes

pub async fn me(CurrentUser(user): CurrentUser) -> Json<ApiResponse<SessionInfo>> {
    Json(ApiResponse::ok(SessionInfo::from(user)))
}

pub async fn login(
    RequestAuth(client): RequestAuth,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<SessionInfo>>> {
    let auth = client.login(&req.identity, &req.password).await?;
    Ok(Json(ApiResponse::ok(SessionInfo::from(Some(auth.record)))))
}

pub async fn register(
    RequestAuth(client): RequestAuth,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthRecord>>)> {
    let record = client.create(&req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(record))))
}

pub async fn logout(RequestAuth(client): RequestAuth) -> Json<ApiResponse<SessionInfo>> {
    client.logout();
    Json(ApiResponse::ok(SessionInfo::from(None)))
}
