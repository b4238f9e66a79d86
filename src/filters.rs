//! Reporting window and hotel scope derived from URL query parameters.
//!
//! The query string is the only source of truth for the active filter:
//! [`resolve_filters`] reads it, [`apply_filters`] writes a new one.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::QueryError;
use crate::queries::{FinancialReportVariables, HotelAnalyticsVariables};

/// Length of the default trailing window.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Decoded URL query parameters, in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Parse a query string such as `?from=2024-01-01&hotelId=5`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|part| !part.is_empty())
            .map(|part| match part.split_once('=') {
                Some((key, value)) => (decode_component(key), decode_component(value)),
                None => (decode_component(part), String::new()),
            })
            .collect();
        Self { pairs }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, treating an empty (or blank) value as absent.
    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Active reporting window and optional hotel scope for one page view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// `YYYY-MM-DD`
    pub from: String,
    /// `YYYY-MM-DD`
    pub to: String,
    /// `None` means all hotels.
    pub hotel_id: Option<i64>,
}

impl FilterParams {
    /// Variables for the analytics query.
    pub fn analytics_variables(&self) -> Result<HotelAnalyticsVariables, QueryError> {
        Ok(HotelAnalyticsVariables {
            fecha_inicio: parse_date("from", &self.from)?,
            fecha_fin: parse_date("to", &self.to)?,
            hotel_id_erp: self.hotel_id,
        })
    }

    /// Variables for the financial-report query.
    pub fn financial_variables(&self) -> Result<FinancialReportVariables, QueryError> {
        Ok(FinancialReportVariables {
            fecha_inicio: parse_date("from", &self.from)?,
            fecha_fin: parse_date("to", &self.to)?,
            hotel_id: self.hotel_id,
        })
    }
}

fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, QueryError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| QueryError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Resolve filters against today's UTC date.
pub fn resolve_filters(params: &QueryParams) -> FilterParams {
    resolve_filters_at(params, Utc::now().date_naive())
}

/// Resolve filters, falling back to the trailing window ending at `today`.
///
/// No check is made that `from <= to`.
pub fn resolve_filters_at(params: &QueryParams, today: NaiveDate) -> FilterParams {
    let from = params
        .non_empty("from")
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today - Duration::days(DEFAULT_WINDOW_DAYS)));
    let to = params
        .non_empty("to")
        .map(str::to_string)
        .unwrap_or_else(|| format_date(today));

    FilterParams {
        from,
        to,
        hotel_id: parse_hotel_id(params),
    }
}

/// Filters for views that require an explicit window.
///
/// Returns `None` while either bound is missing: the view is awaiting input.
pub fn resolve_report_filters(params: &QueryParams) -> Option<FilterParams> {
    let from = params.non_empty("from")?;
    let to = params.non_empty("to")?;
    Some(FilterParams {
        from: from.to_string(),
        to: to.to_string(),
        hotel_id: parse_hotel_id(params),
    })
}

fn parse_hotel_id(params: &QueryParams) -> Option<i64> {
    params.non_empty("hotelId").and_then(leading_integer)
}

/// Leading integer of `raw`: `"5abc"` is 5, `"1.5"` is 1, `"abc"` is `None`.
fn leading_integer(raw: &str) -> Option<i64> {
    let raw = raw.trim_start();
    let sign_len = usize::from(raw.starts_with(['+', '-']));
    let digits_len = raw[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len() - sign_len);
    if digits_len == 0 {
        return None;
    }
    raw[..sign_len + digits_len].parse().ok()
}

/// Serialize filter inputs into the navigation target for `path`.
///
/// Empty values are omitted.
pub fn apply_filters(path: &str, from: &str, to: &str, hotel_id: &str) -> String {
    let query = [("from", from), ("to", to), ("hotelId", hotel_id)]
        .into_iter()
        .map(|(key, value)| (key, value.trim()))
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}
