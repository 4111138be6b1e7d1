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
    services::orders::{CreateOrderRequest, OrderFilter, UpdateOrderRequest},
    AppState, ListQuery,
};

#[utoipa::path(
    get,
    path = "/api/orders",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of orders", body = crate::ApiResponse<crate::PaginatedResponse<crate::entities::order::Model>>)
    ),
    tag = "Orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = page_bounds(&state, &query);
    let filter = OrderFilter {
        search: query.search,
        status: parse_status(query.status.as_deref())?,
        customer_id: query.customer_id,
    };
    let orders = state.services.orders.list(filter, page, limit).await?;
    Ok(success_response(paginated(orders)))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order", body = crate::ApiResponse<crate::entities::order::Model>),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.get(id).await?;
    Ok(success_response(order))
}

#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = crate::ApiResponse<crate::entities::order::Model>),
        (status = 400, description = "Invalid order or custom data", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.create(request).await?;
    Ok(created_response(order))
}

#[utoipa::path(
    put,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = crate::ApiResponse<crate::entities::order::Model>),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn update_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<Response, ServiceError> {
    let order = state.services.orders.update(id, request).await?;
    Ok(success_response(order))
}

#[utoipa::path(
    delete,
    path = "/api/orders/{id}",
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order deleted"),
        (status = 404, description = "Unknown order", body = crate::errors::ErrorResponse)
    ),
    tag = "Orders"
)]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.orders.delete(id).await?;
    Ok(success_response(Deleted { id }))
}
