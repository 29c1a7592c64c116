//! HTTP handlers for the query, auth, stats, and ingest-trigger endpoints
//!
//! Thin glue over the store and the scraper: handlers translate HTTP shapes
//! to store calls and map errors to status codes. A triggered ingest returns
//! 200 with its report even when categories partially failed; failures are
//! data in the report.

use crate::model::IngestReport;
use crate::server::auth::{AuthError, Identity};
use crate::server::AppState;
use crate::storage::{BookFilter, BookStore};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

type HandlerError = (StatusCode, Json<Value>);

fn error_body(status: StatusCode, detail: &str) -> HandlerError {
    (status, Json(json!({ "detail": detail })))
}

fn internal(context: &str, err: impl std::fmt::Display) -> HandlerError {
    tracing::error!(error = %err, "{context}");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

/// Liveness plus store reachability
pub async fn healthz(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let count = {
        let store = state.store.lock().unwrap();
        store.count_books().map_err(|e| internal("health check", e))?
    };
    Ok(Json(json!({ "status": "ok", "books": count })))
}

// ===== Auth =====

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

pub async fn register(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<Value>), HandlerError> {
    let username = credentials.username.trim();
    if username.is_empty() || credentials.password.is_empty() {
        return Err(error_body(
            StatusCode::BAD_REQUEST,
            "username and password are required",
        ));
    }

    let hash = state.auth.hash_password(username, &credentials.password);
    let created = {
        let mut store = state.store.lock().unwrap();
        store
            .create_user(username, &hash)
            .map_err(|e| internal("register", e))?
    };

    if !created {
        return Err(error_body(StatusCode::CONFLICT, "username already exists"));
    }

    tracing::info!(username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "user registered" })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<TokenResponse>, HandlerError> {
    let username = credentials.username.trim();
    let user = {
        let store = state.store.lock().unwrap();
        store.get_user(username).map_err(|e| internal("login", e))?
    };

    let valid = user
        .map(|u| {
            state
                .auth
                .verify_password(&u.username, &credentials.password, &u.password_hash)
        })
        .unwrap_or(false);
    if !valid {
        return Err(error_body(
            StatusCode::UNAUTHORIZED,
            "invalid username or password",
        ));
    }

    Ok(Json(TokenResponse {
        access_token: state.auth.issue(username),
        token_type: "bearer",
    }))
}

pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, HandlerError> {
    let identity = authorize_bearer(&state, &headers)?;
    Ok(Json(TokenResponse {
        access_token: state.auth.issue(&identity.username),
        token_type: "bearer",
    }))
}

/// Resolves the Authorization header through the auth gate
fn authorize_bearer(state: &AppState, headers: &HeaderMap) -> Result<Identity, HandlerError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error_body(StatusCode::UNAUTHORIZED, "missing bearer token"))?;

    state.auth.authorize(token).map_err(|e| match e {
        AuthError::Expired => error_body(StatusCode::UNAUTHORIZED, "token expired"),
        AuthError::Unauthorized => error_body(StatusCode::UNAUTHORIZED, "invalid token"),
    })
}

// ===== Books =====

pub async fn list_books(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let books = {
        let store = state.store.lock().unwrap();
        store.list_books().map_err(|e| internal("list books", e))?
    };
    if books.is_empty() {
        return Err(error_body(StatusCode::NOT_FOUND, "no books found"));
    }
    Ok(Json(json!(books)))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, HandlerError> {
    let book = {
        let store = state.store.lock().unwrap();
        store.get_book(id).map_err(|e| internal("get book", e))?
    };
    match book {
        Some(book) => Ok(Json(json!(book))),
        None => Err(error_body(StatusCode::NOT_FOUND, "book not found")),
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub category: Option<String>,
}

pub async fn search_books(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Value>, HandlerError> {
    let filter = BookFilter {
        title: query.title,
        category: query.category,
    };
    let books = {
        let store = state.store.lock().unwrap();
        store
            .search_books(&filter)
            .map_err(|e| internal("search books", e))?
    };
    if books.is_empty() {
        return Err(error_body(StatusCode::NOT_FOUND, "no books found"));
    }
    Ok(Json(json!(books)))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let categories = {
        let store = state.store.lock().unwrap();
        store
            .list_categories()
            .map_err(|e| internal("list categories", e))?
    };
    if categories.is_empty() {
        return Err(error_body(StatusCode::NOT_FOUND, "no categories found"));
    }
    Ok(Json(json!(categories)))
}

// ===== Statistics =====

pub async fn stats_overview(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let stats = {
        let store = state.store.lock().unwrap();
        store
            .overview_stats()
            .map_err(|e| internal("stats overview", e))?
    };
    Ok(Json(json!(stats)))
}

pub async fn stats_categories(State(state): State<AppState>) -> Result<Json<Value>, HandlerError> {
    let stats = {
        let store = state.store.lock().unwrap();
        store
            .category_stats()
            .map_err(|e| internal("stats categories", e))?
    };
    Ok(Json(json!(stats)))
}

// ===== Ingest trigger =====

pub async fn trigger_ingest(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<IngestReport>, HandlerError> {
    let identity = authorize_bearer(&state, &headers)?;
    tracing::info!(username = %identity.username, "ingest triggered");

    // One ingest at a time; concurrent triggers are turned away rather than
    // queued against a long-running crawl.
    let Ok(_running) = state.ingest_gate.try_lock() else {
        return Err(error_body(
            StatusCode::CONFLICT,
            "an ingest run is already in progress",
        ));
    };

    let report = crate::scraper::run_ingest(&state.config, &state.store, &state.cancel)
        .await
        .map_err(|e| internal("ingest run", e))?;

    Ok(Json(report))
}
