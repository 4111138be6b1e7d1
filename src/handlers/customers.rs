use axum::{
    extract::{Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use super::common::{created_response, page_bounds, paginated, success_response, Deleted};
use crate::{
    errors::ServiceError,
    services::customers::{CreateCustomerRequest, UpdateCustomerRequest},
    AppState, ListQuery,
};

#[utoipa::path(
    get,
    path = "/api/customers",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of customers", body = crate::ApiResponse<crate::PaginatedResponse<crate::entities::customer::Model>>)
    ),
    tag = "Customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = page_bounds(&state, &query);
    let customers = state
        .services
        .customers
        .list(query.search, page, limit)
        .await?;
    Ok(success_response(paginated(customers)))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer", body = crate::ApiResponse<crate::entities::customer::Model>),
        (status = 404, description = "Unknown customer", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.get(id).await?;
    Ok(success_response(customer))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Customer created", body = crate::ApiResponse<crate::entities::customer::Model>),
        (status = 400, description = "Invalid customer or custom data", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CreateCustomerRequest>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.create(request).await?;
    Ok(created_response(customer))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Customer updated", body = crate::ApiResponse<crate::entities::customer::Model>),
        (status = 404, description = "Unknown customer", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCustomerRequest>,
) -> Result<Response, ServiceError> {
    let customer = state.services.customers.update(id, request).await?;
    Ok(success_response(customer))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer id")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Unknown customer", body = crate::errors::ErrorResponse)
    ),
    tag = "Customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.customers.delete(id).await?;
    Ok(success_response(Deleted { id }))
}
