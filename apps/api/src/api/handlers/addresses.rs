use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;
use crate::domain::user::{Address, NewAddress};

/// GET /api/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<Address>>, ApiError> {
    Ok(Json(state.addresses.list_for_user(auth.id).await?))
}

/// POST /api/addresses
pub async fn create_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    let address = Address::new(auth.id, req)?;
    state.addresses.create(&address).await?;
    Ok((StatusCode::CREATED, Json(address)))
}

/// DELETE /api/addresses/:id
pub async fn delete_address(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.addresses.delete(auth.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
