//! Filter criteria for order and return listings.
//!
//! Plain data with optional fields. The store implementations translate these into
//! their own query language; `matches` gives the reference semantics.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::domain::aggregates::{Order, OrderStatus, RefundStatus, ReturnRequest, ReturnStatus};

pub const DEFAULT_PAGE_LIMIT: u32 = 10;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Inclusive creation-time window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Whole-day bounds: `start` from 00:00:00.000, `end` through 23:59:59.999 (UTC).
    pub fn days(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, QueryError> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e { return Err(QueryError::InvertedRange { start: s, end: e }); }
        }
        Ok(Self {
            from: start.and_then(|d| d.and_hms_milli_opt(0, 0, 0, 0)).map(|dt| dt.and_utc()),
            to: end.and_then(|d| d.and_hms_milli_opt(23, 59, 59, 999)).map(|dt| dt.and_utc()),
        })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| at >= from) && self.to.map_or(true, |to| at <= to)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderFilter {
    /// Case-insensitive substring of the shipping name or phone.
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub created: DateRange,
}

impl OrderFilter {
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, order: &Order) -> bool {
        self.search_term().map_or(true, |term| order.shipping_address().matches(term))
            && self.status.map_or(true, |status| order.status() == status)
            && self.created.contains(order.created_at())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageRequest {
    fn default() -> Self { Self { page: 1, limit: DEFAULT_PAGE_LIMIT } }
}

impl PageRequest {
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 { u64::from(self.page - 1) * u64::from(self.limit) }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReturnFilter {
    pub status: Option<ReturnStatus>,
    pub refund_status: Option<RefundStatus>,
    pub page: PageRequest,
}

impl ReturnFilter {
    pub fn matches(&self, request: &ReturnRequest) -> bool {
        self.status.map_or(true, |s| request.status() == s)
            && self.refund_status.map_or(true, |s| request.refund_status() == s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, request: PageRequest) -> Self {
        Self { total, page: request.page, limit: request.limit, total_pages: total.div_ceil(u64::from(request.limit)) }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { data: self.data.into_iter().map(f).collect(), meta: self.meta }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("startDate {start} is after endDate {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its UTC date is used).
pub fn parse_day(value: &str) -> Result<NaiveDate, QueryError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|ts| ts.with_timezone(&Utc).date_naive()))
        .map_err(|_| QueryError::InvalidDate(value.to_string()))
}
