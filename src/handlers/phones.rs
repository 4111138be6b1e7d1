use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use super::common::{
    created_response, page_bounds, paginated, parse_status, success_response, Deleted,
};
use crate::{
    errors::ServiceError,
    services::phones::{CreatePhoneRequest, PhoneFilter, UpdatePhoneRequest},
    AppState, ListQuery,
};

/// Storefront inventory, newest first
#[utoipa::path(
    get,
    path = "/api/phones",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of phones", body = crate::ApiResponse<crate::PaginatedResponse<crate::entities::phone::Model>>)
    ),
    tag = "Phones"
)]
pub async fn list_phones(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = page_bounds(&state, &query);
    let filter = PhoneFilter {
        search: query.search,
        brand: query.brand,
        status: parse_status(query.status.as_deref())?,
    };
    let phones = state.services.phones.list(filter, page, limit).await?;
    Ok(success_response(paginated(phones)))
}

#[utoipa::path(
    get,
    path = "/api/phones/{id}",
    params(("id" = Uuid, Path, description = "Phone id")),
    responses(
        (status = 200, description = "Phone", body = crate::ApiResponse<crate::entities::phone::Model>),
        (status = 404, description = "Unknown phone", body = crate::errors::ErrorResponse)
    ),
    tag = "Phones"
)]
pub async fn get_phone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let phone = state.services.phones.get(id).await?;
    Ok(success_response(phone))
}

#[utoipa::path(
    post,
    path = "/api/phones",
    request_body = CreatePhoneRequest,
    responses(
        (status = 201, description = "Phone listed", body = crate::ApiResponse<crate::entities::phone::Model>),
        (status = 400, description = "Invalid phone or custom data", body = crate::errors::ErrorResponse)
    ),
    tag = "Phones"
)]
pub async fn create_phone(
    State(state): State<AppState>,
    Json(request): Json<CreatePhoneRequest>,
) -> Result<Response, ServiceError> {
    let phone = state.services.phones.create(request).await?;
    Ok(created_response(phone))
}

#[utoipa::path(
    put,
    path = "/api/phones/{id}",
    params(("id" = Uuid, Path, description = "Phone id")),
    request_body = UpdatePhoneRequest,
    responses(
        (status = 200, description = "Phone updated", body = crate::ApiResponse<crate::entities::phone::Model>),
        (status = 404, description = "Unknown phone", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse)
    ),
    tag = "Phones"
)]
pub async fn update_phone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePhoneRequest>,
) -> Result<Response, ServiceError> {
    let phone = state.services.phones.update(id, request).await?;
    Ok(success_response(phone))
}

#[utoipa::path(
    delete,
    path = "/api/phones/{id}",
    params(("id" = Uuid, Path, description = "Phone id")),
    responses(
        (status = 200, description = "Phone deleted"),
        (status = 404, description = "Unknown phone", body = crate::errors::ErrorResponse)
    ),
    tag = "Phones"
)]
pub async fn delete_phone(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.phones.delete(id).await?;
    Ok(success_response(Deleted { id }))
}
