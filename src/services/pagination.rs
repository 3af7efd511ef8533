use serde::Serialize;

use crate::filter::FilterData;

use super::{ServiceError, ServiceResult};

pub const DEFAULT_PAGE_SIZE: i64 = 5;

/// Requested page. `page` is 1-based; non-positive inputs fall back to defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub size: i64,
    pub page: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { size: DEFAULT_PAGE_SIZE, page: 1 }
    }
}

impl PageRequest {
    pub fn new(size: Option<i64>, page: Option<i64>, default_size: i64) -> Self {
        let default_size = if default_size > 0 { default_size } else { DEFAULT_PAGE_SIZE };
        Self {
            size: size.filter(|s| *s > 0).unwrap_or(default_size),
            page: page.filter(|p| *p > 0).unwrap_or(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// Applies this window, ordered by id, to `filter`.
    pub fn apply(&self, filter: FilterData) -> FilterData {
        filter.order_by("id asc").window(self.size, self.offset())
    }
}

/// Envelope metadata. `offset` echoes the 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub size: i64,
    pub offset: i64,
    #[serde(rename = "totalCount")]
    pub total_count: i64,
    #[serde(rename = "totalPage")]
    pub total_page: i64,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
    pub total_count: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_count: i64) -> Self {
        Self { items, request, total_count }
    }

    pub fn total_page(&self) -> i64 {
        if self.request.size <= 0 {
            return 0;
        }
        let size = self.request.size;
        self.total_count / size + i64::from(self.total_count % size != 0)
    }

    pub fn meta(&self) -> PageMeta {
        PageMeta {
            size: self.request.size,
            offset: self.request.page,
            total_count: self.total_count,
            total_page: self.total_page(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total_count: self.total_count,
        }
    }

    /// Fails with `NotFound(message)` when the page holds no items.
    pub fn non_empty(self, message: &str) -> ServiceResult<Self> {
        if self.items.is_empty() {
            return Err(ServiceError::NotFound(message.to_string()));
        }
        Ok(self)
    }
}
