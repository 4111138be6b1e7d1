use axum::{
    extract::{Path, State},
    response::Response,
};
use uuid::Uuid;

use super::common::success_response;
use crate::{errors::ServiceError, fields::EntityType, AppState};

/// Blank form for creating a record
#[utoipa::path(
    get,
    path = "/api/forms/{table}",
    params(("table" = String, Path, description = "phones, customers, orders or inquiries")),
    responses(
        (status = 200, description = "Form layout", body = crate::ApiResponse<crate::fields::FormLayout>),
        (status = 400, description = "Unknown table", body = crate::errors::ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn blank_form(
    State(state): State<AppState>,
    Path(table): Path<String>,
) -> Result<Response, ServiceError> {
    let entity_type: EntityType = table.parse()?;
    let form = state.services.forms.blank(entity_type).await?;
    Ok(success_response(form))
}

/// Edit form pre-filled with a stored record's values
#[utoipa::path(
    get,
    path = "/api/forms/{table}/{id}",
    params(
        ("table" = String, Path, description = "phones, customers, orders or inquiries"),
        ("id" = Uuid, Path, description = "Record id")
    ),
    responses(
        (status = 200, description = "Form layout", body = crate::ApiResponse<crate::fields::FormLayout>),
        (status = 404, description = "Unknown record", body = crate::errors::ErrorResponse)
    ),
    tag = "Forms"
)]
pub async fn record_form(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, Uuid)>,
) -> Result<Response, ServiceError> {
    let entity_type: EntityType = table.parse()?;
    let form = state.services.forms.for_record(entity_type, id).await?;
    Ok(success_response(form))
}
