//! MCP Server implementation with hotel analytics dashboard tools.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, ErrorCode, ErrorData as McpError, Implementation,
        ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    schemars::{self, JsonSchema},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::dashboard::DashboardLoader;
use crate::debug::DebugLogger;
use crate::error::QueryError;
use crate::filters::{self, QueryParams};
use crate::views::{dashboard_catalog, DashboardKind};

/// Hotel analytics MCP Server.
#[derive(Clone)]
pub struct HotelAnalyticsServer {
    loader: Arc<DashboardLoader>,
    debug: Arc<DebugLogger>,
    tool_router: ToolRouter<Self>,
}

impl HotelAnalyticsServer {
    pub fn new(loader: Arc<DashboardLoader>, debug: Arc<DebugLogger>) -> Self {
        Self {
            loader,
            debug,
            tool_router: Self::tool_router(),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Convert any error to McpError
fn to_mcp_error<E: std::fmt::Display>(e: E) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

fn to_params_error(e: QueryError) -> McpError {
    McpError {
        code: ErrorCode::INVALID_PARAMS,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

fn json_result(value: &Value) -> Result<CallToolResult, McpError> {
    let text = serde_json::to_string_pretty(value).map_err(to_mcp_error)?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}

// ============================================================================
// Tool Parameter Structs
// ============================================================================

/// ERP hotel id as sent by the client: a JSON number or the raw query value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum HotelIdParam {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for HotelIdParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HotelIdParam::Number(id) => write!(f, "{}", id),
            HotelIdParam::Text(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DashboardParams {
    /// Start of the reporting window (YYYY-MM-DD). Dashboards default to 30 days before `to`.
    pub from: Option<String>,
    /// End of the reporting window (YYYY-MM-DD). Dashboards default to today.
    pub to: Option<String>,
    /// ERP hotel id (number or string); omit for all hotels
    pub hotel_id: Option<HotelIdParam>,
}

impl DashboardParams {
    /// Same shape as the page URL query: `from`, `to`, `hotelId`.
    fn to_query(&self) -> QueryParams {
        let pairs = [
            ("from", self.from.clone()),
            ("to", self.to.clone()),
            ("hotelId", self.hotel_id.as_ref().map(ToString::to_string)),
        ];
        QueryParams::from_pairs(
            pairs
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key, v))),
        )
    }
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ApplyFiltersParams {
    /// Target dashboard: executive, revenue, forecast, cancellations, operations or financial_report
    pub dashboard: DashboardKind,
    /// Start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    pub to: Option<String>,
    /// ERP hotel id (number or string)
    pub hotel_id: Option<HotelIdParam>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct OpenDashboardParams {
    /// Navigation target as returned by apply_filters, e.g. /dashboards/revenue?from=2024-01-01&hotelId=5
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct QueryAnalyticsParams {
    /// Catalog operation: HotelAnalytics or ReporteFinancieroPrincipal
    pub operation: String,
    /// Operation variables, e.g. {"fechaInicio": "2024-01-01", "fechaFin": "2024-01-31", "hotelIdErp": 5}
    #[serde(default)]
    pub variables: Map<String, Value>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

impl HotelAnalyticsServer {
    async fn load_dashboard(
        &self,
        tool_name: &str,
        kind: DashboardKind,
        query: &QueryParams,
    ) -> Result<Value, McpError> {
        let outcome = self
            .loader
            .load(kind, query)
            .await
            .map_err(|e| {
                self.debug.log_error(tool_name, &e.to_string());
                to_params_error(e)
            })?;
        let json = serde_json::to_value(&outcome).map_err(to_mcp_error)?;

        self.debug.log_tool_result(tool_name, &json);

        Ok(json)
    }

    async fn dashboard_tool(
        &self,
        tool_name: &str,
        kind: DashboardKind,
        params: &DashboardParams,
    ) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call(tool_name, &json!(params));
        let json = self.load_dashboard(tool_name, kind, &params.to_query()).await?;
        json_result(&json)
    }

    async fn open_target(&self, target: &str) -> Result<Value, McpError> {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        let kind = DashboardKind::from_path(path).ok_or_else(|| McpError {
            code: ErrorCode::INVALID_PARAMS,
            message: Cow::from(format!("No dashboard at '{}'", path)),
            data: None,
        })?;
        self.load_dashboard("open_dashboard", kind, &QueryParams::parse(query))
            .await
    }
}

#[tool_router]
impl HotelAnalyticsServer {
    #[tool(description = "List the available dashboards with their titles, descriptions and paths.")]
    async fn list_dashboards(&self) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("list_dashboards", &json!({}));

        let json = serde_json::to_value(dashboard_catalog()).map_err(to_mcp_error)?;

        self.debug.log_tool_result("list_dashboards", &json);

        json_result(&json)
    }

    #[tool(description = "Executive dashboard: revenue, occupancy, ADR and RevPAR KPIs with channel revenue and booking status charts. Window defaults to the last 30 days.")]
    async fn executive_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("executive_dashboard", DashboardKind::Executive, &params).await
    }

    #[tool(description = "Revenue dashboard: revenue per channel, ADR, RevPAR and average booking value. Window defaults to the last 30 days.")]
    async fn revenue_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("revenue_dashboard", DashboardKind::Revenue, &params).await
    }

    #[tool(description = "Forecast dashboard: fixed-ratio projections of revenue (+15%) and occupancy (+10%, capped at 100). Illustrative only, not a statistical forecast.")]
    async fn forecast_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("forecast_dashboard", DashboardKind::Forecast, &params).await
    }

    #[tool(description = "Cancellations dashboard: cancellation rate, estimated lost revenue and approximate per-channel cancellation estimates.")]
    async fn cancellations_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("cancellations_dashboard", DashboardKind::Cancellations, &params).await
    }

    #[tool(description = "Operations dashboard: active bookings, nights sold versus available and status breakdown.")]
    async fn operations_dashboard(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("operations_dashboard", DashboardKind::Operations, &params).await
    }

    #[tool(description = "Financial report over an explicit window. Both from and to are required; without them the report stays awaiting input and nothing is fetched.")]
    async fn financial_report(&self, Parameters(params): Parameters<DashboardParams>) -> Result<CallToolResult, McpError> {
        self.dashboard_tool("financial_report", DashboardKind::FinancialReport, &params).await
    }

    #[tool(description = "Build the navigation target for a dashboard with the given filters, e.g. /dashboards/revenue?from=2024-01-01&to=2024-01-31&hotelId=5. Empty values are omitted.")]
    async fn apply_filters(&self, Parameters(params): Parameters<ApplyFiltersParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("apply_filters", &json!(params));

        let target = filters::apply_filters(
            params.dashboard.path(),
            params.from.as_deref().unwrap_or_default(),
            params.to.as_deref().unwrap_or_default(),
            &params
                .hotel_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        );
        let json = json!({ "dashboard": params.dashboard, "target": target });

        self.debug.log_tool_result("apply_filters", &json);

        json_result(&json)
    }

    #[tool(description = "Run a catalog operation (HotelAnalytics or ReporteFinancieroPrincipal) with raw variables and return the snapshot without building a view. Variables are validated before anything is sent.")]
    async fn query_analytics(&self, Parameters(params): Parameters<QueryAnalyticsParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("query_analytics", &json!(params));

        let state = self
            .loader
            .fetch_operation(&params.operation, params.variables)
            .await
            .map_err(|e| {
                self.debug.log_error("query_analytics", &e.to_string());
                to_params_error(e)
            })?;
        let json = serde_json::to_value(&state).map_err(to_mcp_error)?;

        self.debug.log_tool_result("query_analytics", &json);

        json_result(&json)
    }

    #[tool(description = "Open a dashboard from a navigation target such as /dashboards/cancellations?from=2024-01-01&to=2024-01-31. Same result as calling the dashboard's own tool with those filters.")]
    async fn open_dashboard(&self, Parameters(params): Parameters<OpenDashboardParams>) -> Result<CallToolResult, McpError> {
        self.debug.log_tool_call("open_dashboard", &json!(params));
        let json = self.open_target(&params.target).await.map_err(|e| {
            self.debug.log_error("open_dashboard", &e.message);
            e
        })?;
        json_result(&json)
    }
}

// ============================================================================
// Server Handler Implementation
// ============================================================================

#[tool_handler]
impl ServerHandler for HotelAnalyticsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Hotel Analytics MCP Server - Executive, Revenue, Forecast, Cancellations and \
                Operations dashboards plus the Financial Report, built from the hotel analytics \
                GraphQL service. Filter with from/to dates (YYYY-MM-DD) and an ERP hotel_id."
                    .to_string(),
            ),
        }
    }
}
