use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use flood_core::{ErrorCode, FloodError, FloodResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const DEFAULT_PAGE_SIZE: usize = 100;
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl ListQuery {
    pub fn page(&self) -> (usize, usize) {
        (
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE),
            self.offset.unwrap_or(0),
        )
    }
}

fn error_body(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: message.into(),
        code: code.as_str(),
    })
}

pub fn bad_request(message: impl Into<String>) -> HttpResponse {
    error_body(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, message)
}

pub fn unauthorized(message: impl Into<String>) -> HttpResponse {
    error_body(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, message)
}

pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::IllegalTransition
        | ErrorCode::ResourceUnavailable
        | ErrorCode::InsufficientStock
        | ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: &FloodError) -> HttpResponse {
    let code = err.code();
    error_body(status_for(code), code, err.to_string())
}

pub fn respond<T: Serialize>(result: FloodResult<T>) -> HttpResponse {
    match result {
        Ok(value) => HttpResponse::Ok().json(value),
        Err(err) => error_response(&err),
    }
}

pub fn parse_uuid(value: &str) -> Result<Uuid, HttpResponse> {
    Uuid::parse_str(value.trim()).map_err(|_| bad_request("invalid UUID"))
}
