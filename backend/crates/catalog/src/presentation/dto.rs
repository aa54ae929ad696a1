//! Data Transfer Objects

use serde::{Deserialize, Serialize};

/// `{message, data}` envelope of successful catalog responses
#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub message: &'static str,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            message: "Success.",
            data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Raw query of `GET /items`; parsing into a filter happens in the domain
#[derive(Debug, Default, Deserialize)]
pub struct ListItemsQuery {
    pub brand: Option<String>,
    pub prices: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LookupRequest {
    pub name: String,
}
