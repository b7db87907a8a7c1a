//! REST API module.
//!
//! Contains all API handlers. Each handler validates its path parameters, calls the
//! repository and turns the result into a JSON response.

mod artists;
mod export;
mod filmography;
mod photos;

pub use artists::*;
pub use export::*;
pub use filmography::*;
pub use photos::*;

use axum::{
    extract::FromRequest,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::{codes, AppError, ErrorResponse};

/// Acknowledgement envelope for mutations: `{ "success": true, ...data }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(flatten)]
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }

    /// Same body, answered with `201 Created`.
    pub fn created(self) -> (StatusCode, Self) {
        (StatusCode::CREATED, self)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Handler result type.
pub type ApiResult<T> = Result<T, AppError>;

/// JSON body extractor whose rejections use the API error body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Fallback for requests no route matches: `{ "error": "Not found", "message": "<METHOD> <path>" }`.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    tracing::debug!("No route for {} {}", method, uri.path());
    let body = ErrorResponse {
        error: "Not found".to_string(),
        message: Some(format!("{} {}", method, uri.path())),
        code: codes::NOT_FOUND.to_string(),
    };
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
