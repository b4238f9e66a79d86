//! Shared filter + fetch lifecycle for every dashboard view.
//!
//! Each load takes a request token per view. A load that finishes after a
//! newer one for the same view was started is reported as stale and its
//! data is dropped, so the last request issued always wins.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::api::analytics::{AnalyticsSource, HotelAnalytics};
use crate::error::{FetchError, QueryError};
use crate::filters::{resolve_filters, resolve_report_filters, FilterParams, QueryParams};
use crate::queries::{FinancialReportQuery, GraphQLQuery, HotelAnalyticsQuery};
use crate::views::{DashboardKind, DashboardView};

/// Message shown for any failed fetch; the cause only goes to the log.
pub const FAILED_TO_LOAD: &str = "Failed to load analytics";

/// Data state of one view after a load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum ViewState<T> {
    /// The view needs an explicit window before it fetches anything.
    AwaitingInput,
    Loaded(T),
    NoData,
    Failed { message: String },
}

impl<T> ViewState<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::AwaitingInput => ViewState::AwaitingInput,
            ViewState::Loaded(value) => ViewState::Loaded(f(value)),
            ViewState::NoData => ViewState::NoData,
            ViewState::Failed { message } => ViewState::Failed { message },
        }
    }
}

/// Result of one load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LoadOutcome<T> {
    Current {
        /// `None` while the view is awaiting input.
        filters: Option<FilterParams>,
        view: ViewState<T>,
    },
    /// A newer load for the same view was started while this one ran.
    Stale { token: u64 },
}

impl<T> LoadOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadOutcome<U> {
        match self {
            LoadOutcome::Current { filters, view } => LoadOutcome::Current {
                filters,
                view: view.map(f),
            },
            LoadOutcome::Stale { token } => LoadOutcome::Stale { token },
        }
    }
}

/// Runs view loads against an analytics source.
pub struct DashboardLoader {
    source: Arc<dyn AnalyticsSource>,
    tokens: [AtomicU64; DashboardKind::ALL.len()],
}

impl DashboardLoader {
    pub fn new(source: Arc<dyn AnalyticsSource>) -> Self {
        Self {
            source,
            tokens: Default::default(),
        }
    }

    /// Load a view and build its widgets.
    pub async fn load(
        &self,
        kind: DashboardKind,
        params: &QueryParams,
    ) -> Result<LoadOutcome<DashboardView>, QueryError> {
        let outcome = self.load_snapshot(kind, params).await?;
        Ok(outcome.map(|analytics| kind.build(&analytics)))
    }

    /// Resolve filters for `kind`, fetch the matching query and settle the
    /// view state.
    pub async fn load_snapshot(
        &self,
        kind: DashboardKind,
        params: &QueryParams,
    ) -> Result<LoadOutcome<HotelAnalytics>, QueryError> {
        let token = self.begin(kind);

        let (filters, view) = if kind.requires_explicit_window() {
            match resolve_report_filters(params) {
                None => (None, ViewState::AwaitingInput),
                Some(filters) => {
                    let variables = filters.financial_variables()?;
                    let result = self.source.financial_report(&variables).await;
                    (Some(filters), settle(kind.title(), result))
                }
            }
        } else {
            let filters = resolve_filters(params);
            let variables = filters.analytics_variables()?;
            let result = self.source.hotel_analytics(&variables).await;
            (Some(filters), settle(kind.title(), result))
        };

        if !self.is_current(kind, token) {
            tracing::debug!(dashboard = ?kind, token, "Discarding stale load");
            return Ok(LoadOutcome::Stale { token });
        }

        Ok(LoadOutcome::Current { filters, view })
    }

    /// Run a catalog operation by name with untyped variables.
    ///
    /// Variables are validated against the operation before any fetch.
    pub async fn fetch_operation(
        &self,
        operation: &str,
        variables: Map<String, Value>,
    ) -> Result<ViewState<HotelAnalytics>, QueryError> {
        let result = match operation {
            name if name == HotelAnalyticsQuery::OPERATION_NAME => {
                let variables = HotelAnalyticsQuery::variables_from_map(variables)?;
                self.source.hotel_analytics(&variables).await
            }
            name if name == FinancialReportQuery::OPERATION_NAME => {
                let variables = FinancialReportQuery::variables_from_map(variables)?;
                self.source.financial_report(&variables).await
            }
            other => return Err(QueryError::UnknownOperation(other.to_string())),
        };

        Ok(settle(operation, result))
    }

    fn token_slot(&self, kind: DashboardKind) -> &AtomicU64 {
        &self.tokens[kind as usize]
    }

    fn begin(&self, kind: DashboardKind) -> u64 {
        self.token_slot(kind).fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, kind: DashboardKind, token: u64) -> bool {
        self.token_slot(kind).load(Ordering::SeqCst) == token
    }
}

fn settle(
    context: &str,
    result: Result<Option<HotelAnalytics>, FetchError>,
) -> ViewState<HotelAnalytics> {
    match result {
        Ok(Some(analytics)) => ViewState::Loaded(analytics),
        Ok(None) => ViewState::NoData,
        Err(error) => {
            tracing::error!(context, error = %error, "{}", FAILED_TO_LOAD);
            ViewState::Failed {
                message: FAILED_TO_LOAD.to_string(),
            }
        }
    }
}

impl std::fmt::Debug for DashboardLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardLoader").finish()
    }
}
