//! 分页
//!
//! `{ meta: { current, pageSize, pages, total }, result: [...] }`

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Raw query parameters. Kept as strings so unparsable values fall back to
/// the defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub current: Option<String>,
    #[serde(default)]
    pub page_size: Option<String>,
}

impl PageQuery {
    pub fn new(current: u64, page_size: u64) -> Self {
        Self {
            current: Some(current.to_string()),
            page_size: Some(page_size.to_string()),
        }
    }

    pub fn resolve(&self) -> Page {
        Page {
            current: parse_positive(self.current.as_deref()).unwrap_or(DEFAULT_PAGE),
            page_size: parse_positive(self.page_size.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }
}

fn parse_positive(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub current: u64,
    pub page_size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            current: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    pub fn new(current: u64, page_size: u64) -> Self {
        Self {
            current: current.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn skip(&self) -> usize {
        ((self.current - 1) * self.page_size) as usize
    }

    pub fn limit(&self) -> usize {
        self.page_size as usize
    }

    /// Apply skip/limit to an already sorted, filtered set
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let total = items.len() as u64;
        let result = items.into_iter().skip(self.skip()).take(self.limit()).collect();
        Paginated::new(result, total, *self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub current: u64,
    pub page_size: u64,
    pub pages: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub meta: PageMeta,
    pub result: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(result: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            meta: PageMeta {
                current: page.current,
                page_size: page.page_size,
                pages: total.div_ceil(page.page_size),
                total,
            },
            result,
        }
    }

    pub fn empty(page: Page) -> Self {
        Self::new(Vec::new(), 0, page)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            meta: self.meta,
            result: self.result.into_iter().map(f).collect(),
        }
    }
}
