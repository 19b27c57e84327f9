use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::format::FormatError;

/// The error union handlers return. Callers distinguish missing rows from
/// storage failures from boundary validation errors, and each kind maps to
/// its own response status.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error")]
    DbErr(#[from] DbErr),

    #[error("Not found")]
    NotFound(Option<DbErr>),

    #[error("Bad request")]
    BadRequest(Option<String>),

    #[error("Conflict")]
    Conflict(String),

    #[error("Could not format a timestamp")]
    Format(#[from] FormatError),
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::DbErr(_) | Error::Format(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct SerializableError {
    pub status: u16,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error! {error = %self, "Request failed"};
        }
        let err = SerializableError {
            status: u16::from(status),
            title: self.to_string(),
            detail: match self {
                Error::DbErr(e) => Some(e.to_string()),
                Error::NotFound(o) => o.map(|e| e.to_string()),
                Error::BadRequest(o) => o,
                Error::Conflict(detail) => Some(detail),
                Error::Format(e) => Some(e.to_string()),
            },
        };
        (status, Json(err)).into_response()
    }
}
