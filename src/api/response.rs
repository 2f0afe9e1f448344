use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

// ============================================================================
// JSend status enum
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JSendStatus {
    Error,
    Fail,
    Success,
}

// ============================================================================
// JSend success envelope
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSend<T: Serialize> {
    pub data: T,
    pub status: JSendStatus,
}

impl<T: Serialize> JSend<T> {
    pub fn success(data: T) -> Json<JSend<T>> {
        Json(JSend {
            data,
            status: JSendStatus::Success,
        })
    }
}

// ============================================================================
// JSend fail envelope (client errors, 4xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendFail {
    pub data: FailData,
    pub status: JSendStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FailData {
    pub message: String,
    /// Machine-readable reason, e.g. "expired" or "password_required"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl JSendFail {
    pub fn response(
        status_code: StatusCode,
        message: impl Into<String>,
        reason: Option<String>,
    ) -> (StatusCode, Json<JSendFail>) {
        (
            status_code,
            Json(JSendFail {
                data: FailData {
                    message: message.into(),
                    reason,
                },
                status: JSendStatus::Fail,
            }),
        )
    }
}

// ============================================================================
// JSend error envelope (server errors, 5xx)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct JSendError {
    pub message: String,
    pub status: JSendStatus,
}

impl JSendError {
    pub fn response(
        status_code: StatusCode,
        message: impl Into<String>,
    ) -> (StatusCode, Json<JSendError>) {
        (
            status_code,
            Json(JSendError {
                message: message.into(),
                status: JSendStatus::Error,
            }),
        )
    }
}

// ============================================================================
// Unified error type for handlers
// ============================================================================

/// A JSend-compatible error that can be a fail (4xx), an error (5xx), or a
/// throttle rejection carrying a Retry-After hint.
/// Used as the error type in handler Result returns.
#[derive(Debug)]
pub enum ApiError {
    Error(StatusCode, String),
    Fail(StatusCode, String, Option<String>),
    RateLimited { retry_after_seconds: u64 },
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Fail(code, msg, reason) => {
                let (status, json) = JSendFail::response(code, msg, reason);
                (status, json).into_response()
            }
            ApiError::Error(code, msg) => {
                let (status, json) = JSendError::response(code, msg);
                (status, json).into_response()
            }
            ApiError::RateLimited {
                retry_after_seconds,
            } => {
                let (status, json) = JSendFail::response(
                    StatusCode::TOO_MANY_REQUESTS,
                    format!("Rate limit exceeded. Retry in {retry_after_seconds}s."),
                    Some("rate_limited".to_string()),
                );
                (
                    status,
                    [(header::RETRY_AFTER, retry_after_seconds.to_string())],
                    json,
                )
                    .into_response()
            }
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::BAD_REQUEST, message.into(), None)
    }

    pub fn conflict(message: impl Into<String>, reason: &str) -> Self {
        ApiError::Fail(StatusCode::CONFLICT, message.into(), Some(reason.to_string()))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Error(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::Fail(StatusCode::NOT_FOUND, message.into(), None)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::Fail(
            StatusCode::PAYLOAD_TOO_LARGE,
            message.into(),
            Some("too_large".to_string()),
        )
    }

    pub fn unauthorized(message: impl Into<String>, reason: &str) -> Self {
        ApiError::Fail(
            StatusCode::UNAUTHORIZED,
            message.into(),
            Some(reason.to_string()),
        )
    }

    /// Not-found with the "expired" reason, distinguishable from a plain 404
    pub fn expired(message: impl Into<String>) -> Self {
        ApiError::Fail(
            StatusCode::NOT_FOUND,
            message.into(),
            Some("expired".to_string()),
        )
    }
}

// ============================================================================
// Extractors with JSend rejections
// ============================================================================

/// `Json` extractor whose rejection is a JSend fail instead of plain text
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(AppJson(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}

/// `Query` extractor whose rejection is a JSend fail instead of plain text
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(AppQuery(value)),
            Err(rejection) => Err(ApiError::bad_request(rejection.body_text())),
        }
    }
}
