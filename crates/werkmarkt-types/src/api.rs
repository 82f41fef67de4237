//! Wire envelopes of the JSON contract
//!
//! List endpoints return `{ data, meta }`; everything else returns
//! `{ success, data, message? }`.

use serde::{Deserialize, Serialize};

/// Single-object response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current_page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Paginated list envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

/// Page selection query parameters
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageParams {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl PageParams {
    pub const MAX_PER_PAGE: u32 = 100;

    /// Paginate an already-filtered, already-ordered collection.
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, Self::MAX_PER_PAGE);
        let total_items = items.len() as u64;
        let total_pages = (total_items.div_ceil(per_page as u64)) as u32;

        // Offset in u64: `page` comes straight off the query string and
        // `(page - 1) * per_page` can overflow u32.
        let start = (page as u64 - 1) * per_page as u64;
        let data: Vec<T> = items
            .into_iter()
            .skip(start.min(total_items) as usize)
            .take(per_page as usize)
            .collect();

        Paginated {
            data,
            meta: PageMeta {
                current_page: page,
                per_page,
                total_items,
                total_pages,
                has_next: page < total_pages,
                has_prev: page > 1 && total_pages > 0,
            },
        }
    }
}
