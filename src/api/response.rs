//! Response envelope and pagination query parameters.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Largest page size a client may request.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Standard `{ "success": true, "data": T }` envelope, with pagination on
/// list endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination: Some(pagination),
        }
    }
}

impl ApiResponse<serde_json::Value> {
    /// `data: {}`, returned by deletes.
    pub fn empty() -> Self {
        Self::ok(serde_json::json!({}))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u64,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            pages: total.div_ceil(u64::from(limit.max(1))),
        }
    }
}

/// `?page=&limit=&search=` on list endpoints.
///
/// Values are kept as strings so junk input falls back to defaults instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

impl PageQuery {
    /// `(page, limit)`: page is at least 1, limit is clamped to
    /// `1..=MAX_PAGE_SIZE` and defaults to `default_limit`.
    pub fn resolve(&self, default_limit: u32) -> (u32, u32) {
        let page = parse_number(self.page.as_deref()).unwrap_or(1).max(1);
        let limit = parse_number(self.limit.as_deref())
            .unwrap_or(i64::from(default_limit))
            .clamp(1, i64::from(MAX_PAGE_SIZE));
        (
            u32::try_from(page).unwrap_or(u32::MAX),
            u32::try_from(limit).unwrap_or(MAX_PAGE_SIZE),
        )
    }

    /// The trimmed search term, if any.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse().ok())
}
