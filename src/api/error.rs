use crate::core::normalizer::contract_error_code;
use crate::domain::model::ErrorBody;
use crate::utils::error::GatewayError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// handler 邊界上的錯誤：每種錯誤都轉成 `{detail}` 的 HTTP 回應
#[derive(Debug)]
pub enum ApiError {
    Gateway(GatewayError),
    /// 請求本文無法解析；尚未呼叫 CLI
    InvalidBody(JsonRejection),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Gateway(GatewayError::NotFoundError { .. }) => StatusCode::NOT_FOUND,
            ApiError::Gateway(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InvalidBody(rejection) => rejection.status(),
        }
    }

    pub fn detail(&self) -> String {
        let err = match self {
            ApiError::Gateway(err) => err,
            ApiError::InvalidBody(rejection) => return rejection.body_text(),
        };

        match err {
            GatewayError::InvocationError { .. } => format!("Unexpected error: {}", err),
            GatewayError::CommandError { stderr, stdout, .. } => {
                match contract_error_code(stderr).or_else(|| contract_error_code(stdout)) {
                    Some(code) => format!("{} (contract error: {})", err, code),
                    None => err.to_string(),
                }
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.detail();

        if status.is_server_error() {
            tracing::error!("❌ Request failed ({}): {}", status, detail);
        } else if let ApiError::InvalidBody(_) = &self {
            tracing::debug!("Rejected request body ({}): {}", status, detail);
        }

        (status, Json(ErrorBody { detail })).into_response()
    }
}
