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
    services::inquiries::{CreateInquiryRequest, UpdateInquiryRequest},
    AppState, ListQuery,
};

#[utoipa::path(
    get,
    path = "/api/inquiries",
    params(ListQuery),
    responses(
        (status = 200, description = "Page of inquiries", body = crate::ApiResponse<crate::PaginatedResponse<crate::entities::inquiry::Model>>)
    ),
    tag = "Inquiries"
)]
pub async fn list_inquiries(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ServiceError> {
    let (page, limit) = page_bounds(&state, &query);
    let status = parse_status(query.status.as_deref())?;
    let inquiries = state
        .services
        .inquiries
        .list(query.search, status, page, limit)
        .await?;
    Ok(success_response(paginated(inquiries)))
}

#[utoipa::path(
    get,
    path = "/api/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 200, description = "Inquiry", body = crate::ApiResponse<crate::entities::inquiry::Model>),
        (status = 404, description = "Unknown inquiry", body = crate::errors::ErrorResponse)
    ),
    tag = "Inquiries"
)]
pub async fn get_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    let inquiry = state.services.inquiries.get(id).await?;
    Ok(success_response(inquiry))
}

#[utoipa::path(
    post,
    path = "/api/inquiries",
    request_body = CreateInquiryRequest,
    responses(
        (status = 201, description = "Inquiry recorded", body = crate::ApiResponse<crate::entities::inquiry::Model>),
        (status = 400, description = "Invalid inquiry or custom data", body = crate::errors::ErrorResponse)
    ),
    tag = "Inquiries"
)]
pub async fn create_inquiry(
    State(state): State<AppState>,
    Json(request): Json<CreateInquiryRequest>,
) -> Result<Response, ServiceError> {
    let inquiry = state.services.inquiries.create(request).await?;
    Ok(created_response(inquiry))
}

#[utoipa::path(
    put,
    path = "/api/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    request_body = UpdateInquiryRequest,
    responses(
        (status = 200, description = "Inquiry updated", body = crate::ApiResponse<crate::entities::inquiry::Model>),
        (status = 404, description = "Unknown inquiry", body = crate::errors::ErrorResponse),
        (status = 409, description = "Stale version", body = crate::errors::ErrorResponse)
    ),
    tag = "Inquiries"
)]
pub async fn update_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInquiryRequest>,
) -> Result<Response, ServiceError> {
    let inquiry = state.services.inquiries.update(id, request).await?;
    Ok(success_response(inquiry))
}

#[utoipa::path(
    delete,
    path = "/api/inquiries/{id}",
    params(("id" = Uuid, Path, description = "Inquiry id")),
    responses(
        (status = 200, description = "Inquiry deleted"),
        (status = 404, description = "Unknown inquiry", body = crate::errors::ErrorResponse)
    ),
    tag = "Inquiries"
)]
pub async fn delete_inquiry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ServiceError> {
    state.services.inquiries.delete(id).await?;
    Ok(success_response(Deleted { id }))
}
