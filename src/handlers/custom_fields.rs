use axum::{
    extract::{Query, State},
    response::Response,
    Json,
};

use super::common::{created_response, success_response, Deleted, IdQuery, TableQuery};
use crate::{errors::ServiceError, services::custom_fields::CreateFieldDefinitionRequest, AppState};

/// List custom field definitions of an entity type
#[utoipa::path(
    get,
    path = "/api/custom-fields",
    params(TableQuery),
    responses(
        (status = 200, description = "Definitions in creation order", body = crate::ApiResponse<Vec<crate::entities::custom_field::Model>>),
        (status = 400, description = "Unknown table", body = crate::errors::ErrorResponse)
    ),
    tag = "Custom Fields"
)]
pub async fn list_custom_fields(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Response, ServiceError> {
    let definitions = state
        .services
        .custom_fields
        .list(query.entity_type()?)
        .await?;
    Ok(success_response(definitions))
}

/// Define a new custom field
#[utoipa::path(
    post,
    path = "/api/custom-fields",
    request_body = CreateFieldDefinitionRequest,
    responses(
        (status = 201, description = "Definition created", body = crate::ApiResponse<crate::entities::custom_field::Model>),
        (status = 400, description = "Invalid definition", body = crate::errors::ErrorResponse),
        (status = 409, description = "Field name already used", body = crate::errors::ErrorResponse)
    ),
    tag = "Custom Fields"
)]
pub async fn create_custom_field(
    State(state): State<AppState>,
    Json(request): Json<CreateFieldDefinitionRequest>,
) -> Result<Response, ServiceError> {
    let definition = state.services.custom_fields.create(request).await?;
    Ok(created_response(definition))
}

/// Delete a custom field definition
#[utoipa::path(
    delete,
    path = "/api/custom-fields",
    params(IdQuery),
    responses(
        (status = 200, description = "Definition deleted"),
        (status = 404, description = "Unknown id", body = crate::errors::ErrorResponse)
    ),
    tag = "Custom Fields"
)]
pub async fn delete_custom_field(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ServiceError> {
    state.services.custom_fields.delete(query.id).await?;
    Ok(success_response(Deleted { id: query.id }))
}
