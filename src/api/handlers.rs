use crate::api::error::ApiError;
use crate::core::gateway::LedgerGateway;
use crate::domain::model::{
    OwnershipTransfer, ProductDetails, ProductRegistration, WelcomeMessage, WriteReceipt,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

pub const WELCOME_MESSAGE: &str = "Welcome to Product Authenticity Backend API";

pub struct AppState {
    pub gateway: LedgerGateway,
}

pub async fn read_root() -> Json<WelcomeMessage> {
    Json(WelcomeMessage {
        message: WELCOME_MESSAGE.to_string(),
    })
}

pub async fn register_product(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ProductRegistration>, JsonRejection>,
) -> Result<Json<WriteReceipt>, ApiError> {
    let Json(request) = payload?;
    let cli_output = state.gateway.register_product(&request).await?;
    Ok(Json(WriteReceipt::success(
        "Product registration initiated",
        cli_output,
    )))
}

/// 注意：交易一律由設定中的身分簽署，`current_owner_public_key` 只作為合約參數
pub async fn transfer_ownership(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<OwnershipTransfer>, JsonRejection>,
) -> Result<Json<WriteReceipt>, ApiError> {
    let Json(request) = payload?;
    let cli_output = state.gateway.transfer_ownership(&request).await?;
    Ok(Json(WriteReceipt::success(
        "Ownership transfer initiated",
        cli_output,
    )))
}

pub async fn get_product_details(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductDetails>, ApiError> {
    let details = state.gateway.get_product_details(&product_id).await?;
    Ok(Json(details))
}
