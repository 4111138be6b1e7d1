use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::common::{created_response, success_response, Deleted, IdQuery, TableQuery};
use crate::{
    errors::ServiceError,
    services::field_config::{
        CreateFieldConfigRequest, FieldConfigPatch, MoveDirection, UpdateFieldConfigRequest,
    },
    AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MoveFieldRequest {
    pub direction: MoveDirection,
}

/// Field configs of an entity type in render order
#[utoipa::path(
    get,
    path = "/api/field-config",
    params(TableQuery),
    responses(
        (status = 200, description = "Configs in render order", body = crate::ApiResponse<Vec<crate::entities::field_config::Model>>),
        (status = 400, description = "Unknown table", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn list_field_configs(
    State(state): State<AppState>,
    Query(query): Query<TableQuery>,
) -> Result<Response, ServiceError> {
    let configs = state
        .services
        .field_config
        .list(query.entity_type()?)
        .await?;
    Ok(success_response(configs))
}

#[utoipa::path(
    post,
    path = "/api/field-config",
    request_body = CreateFieldConfigRequest,
    responses(
        (status = 201, description = "Config created", body = crate::ApiResponse<crate::entities::field_config::Model>),
        (status = 400, description = "Invalid config", body = crate::errors::ErrorResponse),
        (status = 409, description = "Field name already used", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn create_field_config(
    State(state): State<AppState>,
    Json(request): Json<CreateFieldConfigRequest>,
) -> Result<Response, ServiceError> {
    let config = state.services.field_config.create(request).await?;
    Ok(created_response(config))
}

/// Save the settings screen: a batch of partial updates applied atomically
#[utoipa::path(
    put,
    path = "/api/field-config",
    request_body = Vec<FieldConfigPatch>,
    responses(
        (status = 200, description = "Updated configs", body = crate::ApiResponse<Vec<crate::entities::field_config::Model>>),
        (status = 404, description = "Unknown id in batch", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn bulk_save_field_configs(
    State(state): State<AppState>,
    Json(patches): Json<Vec<FieldConfigPatch>>,
) -> Result<Response, ServiceError> {
    let updated = state.services.field_config.bulk_save(patches).await?;
    Ok(success_response(updated))
}

#[utoipa::path(
    patch,
    path = "/api/field-config/{id}",
    params(("id" = Uuid, Path, description = "Field config id")),
    request_body = UpdateFieldConfigRequest,
    responses(
        (status = 200, description = "Updated config", body = crate::ApiResponse<crate::entities::field_config::Model>),
        (status = 404, description = "Unknown id", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn update_field_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateFieldConfigRequest>,
) -> Result<Response, ServiceError> {
    let updated = state.services.field_config.update(id, changes).await?;
    Ok(success_response(updated))
}

/// Delete a custom field config; built-in fields answer 403
#[utoipa::path(
    delete,
    path = "/api/field-config",
    params(IdQuery),
    responses(
        (status = 200, description = "Config deleted"),
        (status = 403, description = "Built-in field", body = crate::errors::ErrorResponse),
        (status = 404, description = "Unknown id", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn delete_field_config(
    State(state): State<AppState>,
    Query(query): Query<IdQuery>,
) -> Result<Response, ServiceError> {
    state.services.field_config.delete(query.id).await?;
    Ok(success_response(Deleted { id: query.id }))
}

/// Move a field one slot up or down
#[utoipa::path(
    post,
    path = "/api/field-config/{id}/move",
    params(("id" = Uuid, Path, description = "Field config id")),
    request_body = MoveFieldRequest,
    responses(
        (status = 200, description = "Configs of the entity type in their new order", body = crate::ApiResponse<Vec<crate::entities::field_config::Model>>),
        (status = 404, description = "Unknown id", body = crate::errors::ErrorResponse)
    ),
    tag = "Field Config"
)]
pub async fn move_field_config(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<MoveFieldRequest>,
) -> Result<Response, ServiceError> {
    let configs = state
        .services
        .field_config
        .move_field(id, request.direction)
        .await?;
    Ok(success_response(configs))
}
