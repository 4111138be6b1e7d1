use crate::{
    errors::ServiceError, fields::EntityType, services::Page, ApiResponse, AppState, ListQuery,
    PaginatedResponse,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::IntoParams;
use uuid::Uuid;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Standard created response
pub fn created_response<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiResponse::success(data))).into_response()
}

/// `?table=` selector of the field configuration endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct TableQuery {
    /// phones, customers, orders or inquiries
    pub table: String,
}

impl TableQuery {
    pub fn entity_type(&self) -> Result<EntityType, ServiceError> {
        self.table.parse()
    }
}

/// `?id=` selector of the field configuration delete endpoints
#[derive(Debug, Deserialize, IntoParams)]
pub struct IdQuery {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

/// Page number and clamped page size for a list request
pub fn page_bounds(state: &AppState, query: &ListQuery) -> (u64, u64) {
    (query.page.max(1), state.config.page_size(query.limit))
}

/// Parses a `?status=` filter into the entity's status enum
pub fn parse_status<T: DeserializeOwned>(raw: Option<&str>) -> Result<Option<T>, ServiceError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    serde_json::from_value(serde_json::Value::String(raw.to_ascii_lowercase()))
        .map(Some)
        .map_err(|_| ServiceError::ValidationError(format!("unknown status '{}'", raw)))
}

pub fn paginated<T>(page: Page<T>) -> PaginatedResponse<T> {
    let total_pages = page.total_pages();
    PaginatedResponse {
        items: page.items,
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn table_query_parses_entity_type() {
        let query = TableQuery {
            table: "Orders".into(),
        };
        assert_eq!(query.entity_type().unwrap(), EntityType::Order);

        let bad = TableQuery {
            table: "suppliers".into(),
        };
        assert_matches!(bad.entity_type(), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn paginated_carries_page_metadata() {
        let response = paginated(Page {
            items: vec![1, 2],
            total: 5,
            page: 1,
            limit: 2,
        });
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.items, vec![1, 2]);
    }

    #[test]
    fn status_filters_parse_case_insensitively() {
        use crate::entities::order::OrderStatus;

        assert_eq!(
            parse_status::<OrderStatus>(Some("Shipped")).unwrap(),
            Some(OrderStatus::Shipped)
        );
        assert_eq!(parse_status::<OrderStatus>(Some("  ")).unwrap(), None);
        assert_eq!(parse_status::<OrderStatus>(None).unwrap(), None);
        assert_matches!(
            parse_status::<OrderStatus>(Some("lost")),
            Err(ServiceError::ValidationError(_))
        );
    }
}
