//! Page-number pagination with silent recovery.
//!
//! A requested page that is not an integer, or is below 1, resolves to the
//! first page. A page past the end resolves to the last page. A result set
//! with no items still has one (empty) page.

use std::num::IntErrorKind;

use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u64 = 4;

/// A page request as received from the caller, not yet clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub number: u64,
    pub size: u64,
}

impl PageRequest {
    pub fn new(number: u64, size: u64) -> Self {
        Self {
            number: number.max(1),
            size: size.max(1),
        }
    }

    /// Parse a raw `page` parameter. Integers too large to represent are
    /// still past the end, so they saturate and clamp to the last page.
    pub fn parse(raw: Option<&str>, size: u64) -> Self {
        let number = match raw.map(|s| s.trim().parse::<i64>()) {
            Some(Ok(n)) if n > 1 => n as u64,
            Some(Err(e)) if *e.kind() == IntErrorKind::PosOverflow => u64::MAX,
            _ => 1,
        };
        Self::new(number, size)
    }

    pub fn first(size: u64) -> Self {
        Self::new(1, size)
    }

    /// Resolve the page number against the total item count.
    pub fn clamp(&self, total_items: u64) -> u64 {
        self.number.min(total_pages(total_items, self.size))
    }
}

/// Number of pages for `total_items`; never less than one.
pub fn total_pages(total_items: u64, size: u64) -> u64 {
    total_items.div_ceil(size.max(1)).max(1)
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, size: u64, total_items: u64) -> Self {
        Self {
            items,
            number,
            size,
            total_items,
            total_pages: total_pages(total_items, size),
        }
    }

    /// Slice an already ordered in-memory sequence.
    pub fn from_vec(all: Vec<T>, request: PageRequest) -> Self {
        let total_items = all.len() as u64;
        let number = request.clamp(total_items);
        let offset = ((number - 1) * request.size) as usize;
        let items = all
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Self::new(items, number, request.size, total_items)
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}
