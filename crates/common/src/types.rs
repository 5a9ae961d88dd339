use serde::{Deserialize, Serialize};

/// Response envelope shared by the internal services.
///
/// Successful calls answer `{"code": "ok", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: String,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wraps `data` in a successful envelope.
    pub fn success(data: T) -> Self {
        Self {
            code: "ok".to_string(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A successful envelope without payload (`"data": null`).
    pub fn empty() -> Self {
        Self {
            code: "ok".to_string(),
            data: None,
        }
    }
}

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// 1-based paging parameters, usable directly as an axum `Query`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Page number, never below 1.
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Page size; zero falls back to the default.
    pub fn size(&self) -> u32 {
        if self.size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.size
        }
    }

    /// Number of items to skip.
    pub fn offset(&self) -> usize {
        (self.page() as usize - 1) * self.size() as usize
    }
}

/// A page of items plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
    pub current_page: u32,
    pub items_per_page: u32,
}

impl<T> PageResponse<T> {
    /// Cuts the requested page out of an already sorted collection.
    pub fn paginate(all: Vec<T>, request: &PageRequest) -> Self {
        let size = request.size();
        let total_items = all.len() as u64;
        let total_pages = total_items.div_ceil(size as u64) as u32;
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(size as usize)
            .collect();

        Self {
            items,
            total_items,
            total_pages,
            current_page: request.page(),
            items_per_page: size,
        }
    }

    /// Converts every item, keeping the paging totals.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            items_per_page: self.items_per_page,
        }
    }
}
