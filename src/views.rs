//! Dashboard view models: KPI cards, chart series and tables built from a
//! snapshot and the derived metrics. Rendering is left to the consumer.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use crate::api::analytics::HotelAnalytics;
use crate::metrics::{self, ChannelCancellationEstimate, StatusShare};

/// How a KPI value should be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Currency,
    Percentage,
    Number,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCard {
    pub title: &'static str,
    pub value: f64,
    pub format: ValueFormat,
}

impl KpiCard {
    fn new(title: &'static str, value: f64, format: ValueFormat) -> Self {
        Self {
            title,
            value,
            format,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

/// A `{category, value}` pair. `value` is absent where a line has no point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: &'static str,
    pub points: Vec<ChartPoint>,
}

impl Series {
    fn from_values<I, C>(name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = (C, f64)>,
        C: Into<String>,
    {
        Self::from_optional(name, values.into_iter().map(|(c, v)| (c, Some(v))))
    }

    fn from_optional<I, C>(name: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = (C, Option<f64>)>,
        C: Into<String>,
    {
        Self {
            name,
            points: values
                .into_iter()
                .map(|(category, value)| ChartPoint {
                    category: category.into(),
                    value,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: &'static str,
    pub description: &'static str,
    pub kind: ChartKind,
    pub series: Vec<Series>,
}

/// One row of the channel performance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRow {
    pub channel: String,
    pub bookings: u64,
    pub revenue: f64,
    pub share: f64,
    pub average_value: f64,
}

/// Everything a dashboard page needs to draw itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub dashboard: DashboardKind,
    pub title: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    pub kpis: Vec<KpiCard>,
    pub charts: Vec<Chart>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_performance: Vec<ChannelRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub status_overview: Vec<StatusShare>,
    /// Uniformly distributed estimates, not per-channel data.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub channel_cancellation_estimates: Vec<ChannelCancellationEstimate>,
}

/// The dashboard pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Executive,
    Revenue,
    Forecast,
    Cancellations,
    Operations,
    FinancialReport,
}

impl DashboardKind {
    pub const ALL: [DashboardKind; 6] = [
        DashboardKind::Executive,
        DashboardKind::Revenue,
        DashboardKind::Forecast,
        DashboardKind::Cancellations,
        DashboardKind::Operations,
        DashboardKind::FinancialReport,
    ];

    pub fn title(self) -> &'static str {
        match self {
            DashboardKind::Executive => "Executive Dashboard",
            DashboardKind::Revenue => "Revenue Dashboard",
            DashboardKind::Forecast => "Forecast Dashboard",
            DashboardKind::Cancellations => "Cancellations Dashboard",
            DashboardKind::Operations => "Operations Dashboard",
            DashboardKind::FinancialReport => "Financial Report",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            DashboardKind::Executive => "High-level KPIs and revenue overview",
            DashboardKind::Revenue => "Revenue per channel, ADR, RevPAR and booking value",
            DashboardKind::Forecast => "Fixed-ratio revenue, occupancy and booking projections",
            DashboardKind::Cancellations => "Cancellation rates and estimated impact",
            DashboardKind::Operations => "On-the-books, capacity and booking status",
            DashboardKind::FinancialReport => {
                "Detailed financial performance and channel analysis"
            }
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            DashboardKind::Executive => "/dashboards/executive",
            DashboardKind::Revenue => "/dashboards/revenue",
            DashboardKind::Forecast => "/dashboards/forecast",
            DashboardKind::Cancellations => "/dashboards/cancellations",
            DashboardKind::Operations => "/dashboards/operations",
            DashboardKind::FinancialReport => "/reports/financial",
        }
    }

    /// Dashboard served at `path`, ignoring any query string or trailing slash.
    pub fn from_path(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let path = path.trim_end_matches('/');
        DashboardKind::ALL.into_iter().find(|kind| kind.path() == path)
    }

    /// The report view waits for an explicit window instead of defaulting.
    pub fn requires_explicit_window(self) -> bool {
        matches!(self, DashboardKind::FinancialReport)
    }

    pub fn build(self, analytics: &HotelAnalytics) -> DashboardView {
        match self {
            DashboardKind::Executive => executive(analytics),
            DashboardKind::Revenue => revenue(analytics),
            DashboardKind::Forecast => forecast(analytics),
            DashboardKind::Cancellations => cancellations(analytics),
            DashboardKind::Operations => operations(analytics),
            DashboardKind::FinancialReport => financial_report(analytics),
        }
    }
}

/// Catalog entry for the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardEntry {
    pub dashboard: DashboardKind,
    pub title: &'static str,
    pub description: &'static str,
    pub path: &'static str,
}

pub fn dashboard_catalog() -> Vec<DashboardEntry> {
    DashboardKind::ALL
        .iter()
        .map(|&kind| DashboardEntry {
            dashboard: kind,
            title: kind.title(),
            description: kind.description(),
            path: kind.path(),
        })
        .collect()
}

fn view(kind: DashboardKind, analytics: &HotelAnalytics) -> DashboardView {
    DashboardView {
        dashboard: kind,
        title: kind.title(),
        hotel_name: analytics.hotel_nombre.clone(),
        kpis: Vec::new(),
        charts: Vec::new(),
        channel_performance: Vec::new(),
        status_overview: Vec::new(),
        channel_cancellation_estimates: Vec::new(),
    }
}

fn chart(
    title: &'static str,
    description: &'static str,
    kind: ChartKind,
    series: Vec<Series>,
) -> Chart {
    Chart {
        title,
        description,
        kind,
        series,
    }
}

fn channel_revenue(analytics: &HotelAnalytics) -> Series {
    Series::from_values(
        "Revenue",
        analytics
            .reservas_por_canal
            .iter()
            .map(|c| (c.canal_nombre.as_str(), c.ingresos_totales)),
    )
}

fn channel_bookings(analytics: &HotelAnalytics) -> Series {
    Series::from_values(
        "Bookings",
        analytics
            .reservas_por_canal
            .iter()
            .map(|c| (c.canal_nombre.as_str(), c.cantidad_reservas as f64)),
    )
}

fn status_counts(analytics: &HotelAnalytics) -> Series {
    Series::from_values(
        "Count",
        analytics
            .reservas_por_estado
            .iter()
            .map(|s| (s.estado.as_str(), s.cantidad as f64)),
    )
}

fn channel_rows(analytics: &HotelAnalytics) -> Vec<ChannelRow> {
    analytics
        .reservas_por_canal
        .iter()
        .map(|c| ChannelRow {
            channel: c.canal_nombre.clone(),
            bookings: c.cantidad_reservas,
            revenue: c.ingresos_totales,
            share: c.porcentaje,
            average_value: metrics::average_channel_value(c),
        })
        .collect()
}

fn executive(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let mut view = view(DashboardKind::Executive, analytics);
    view.kpis = vec![
        KpiCard::new("Occupancy Rate", analytics.tasa_ocupacion, Percentage),
        KpiCard::new("ADR (Average Daily Rate)", analytics.adr, Currency),
        KpiCard::new("RevPAR", analytics.revpar, Currency),
        KpiCard::new("Total Revenue", analytics.ingresos_totales_habitaciones, Currency),
        KpiCard::new("Total Bookings", analytics.total_reservas as f64, Number),
        KpiCard::new("Nights Sold", analytics.total_noches_vendidas as f64, Number),
        KpiCard::new(
            "Available Nights",
            analytics.total_noches_disponibles.unwrap_or(0) as f64,
            Number,
        ),
    ];
    view.charts = vec![
        chart(
            "Revenue by Channel",
            "Distribution of revenue across booking channels",
            ChartKind::Bar,
            vec![channel_revenue(analytics)],
        ),
        chart(
            "Bookings by Channel",
            "Distribution of bookings across channels",
            ChartKind::Pie,
            vec![channel_bookings(analytics)],
        ),
        chart(
            "Bookings by Status",
            "Current status distribution of all bookings",
            ChartKind::Bar,
            vec![status_counts(analytics)],
        ),
    ];
    view
}

fn revenue(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let mut view = view(DashboardKind::Revenue, analytics);
    view.kpis = vec![
        KpiCard::new("Total Revenue", analytics.ingresos_totales_habitaciones, Currency),
        KpiCard::new("ADR", analytics.adr, Currency),
        KpiCard::new("RevPAR", analytics.revpar, Currency),
        KpiCard::new(
            "Avg Revenue/Booking",
            metrics::average_revenue_per_booking(analytics),
            Currency,
        ),
    ];
    view.charts = vec![
        chart(
            "Revenue by Channel",
            "Total revenue generated from each booking channel",
            ChartKind::Bar,
            vec![channel_revenue(analytics)],
        ),
        chart(
            "Bookings by Channel",
            "Number of bookings from each channel",
            ChartKind::Bar,
            vec![channel_bookings(analytics)],
        ),
        chart(
            "Channel Revenue Share",
            "Percentage of total revenue by channel",
            ChartKind::Bar,
            vec![Series::from_values(
                "Share %",
                analytics
                    .reservas_por_canal
                    .iter()
                    .map(|c| (c.canal_nombre.as_str(), c.porcentaje)),
            )],
        ),
    ];
    view
}

fn forecast(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let series = metrics::forecast_series(analytics);
    let mut view = view(DashboardKind::Forecast, analytics);
    view.kpis = vec![
        KpiCard::new("Current Occupancy", analytics.tasa_ocupacion, Percentage),
        KpiCard::new(
            "Projected Occupancy",
            metrics::projected_occupancy(analytics),
            Percentage,
        ),
        KpiCard::new("Current Revenue", analytics.ingresos_totales_habitaciones, Currency),
        KpiCard::new("Projected Revenue", metrics::projected_revenue(analytics), Currency),
    ];
    view.charts = vec![
        chart(
            "Revenue Forecast",
            "Projected revenue based on current trends",
            ChartKind::Line,
            vec![
                Series::from_optional("Actual", series.iter().map(|p| (p.month, p.actual))),
                Series::from_optional("Forecast", series.iter().map(|p| (p.month, p.forecast))),
            ],
        ),
        chart(
            "Occupancy Forecast",
            "Projected occupancy rates",
            ChartKind::Line,
            vec![Series::from_values(
                "Occupancy %",
                series.iter().map(|p| (p.month, p.occupancy)),
            )],
        ),
        chart(
            "Booking Pace",
            "Projected booking velocity",
            ChartKind::Line,
            vec![Series::from_values(
                "Bookings",
                series.iter().map(|p| (p.month, p.bookings as f64)),
            )],
        ),
    ];
    view
}

fn cancellations(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let cancelled = metrics::cancelled_count(analytics);
    let rate = metrics::cancellation_rate(analytics);

    let mut view = view(DashboardKind::Cancellations, analytics);
    view.kpis = vec![
        KpiCard::new("Cancellation Rate", rate, Percentage),
        KpiCard::new("Cancelled Bookings", cancelled as f64, Number),
        KpiCard::new(
            "Estimated Lost Revenue",
            metrics::estimated_lost_revenue(analytics, cancelled),
            Currency,
        ),
        KpiCard::new(
            "Active Bookings",
            metrics::active_bookings(analytics, cancelled) as f64,
            Number,
        ),
    ];
    view.charts = vec![
        chart(
            "Booking Status Distribution",
            "Current status of all bookings",
            ChartKind::Bar,
            vec![status_counts(analytics)],
        ),
        chart(
            "Status Breakdown",
            "Percentage distribution by status",
            ChartKind::Pie,
            vec![Series::from_values(
                "Share %",
                metrics::status_percentages(analytics)
                    .into_iter()
                    .map(|s| (s.estado, s.porcentaje)),
            )],
        ),
    ];
    view.channel_cancellation_estimates = analytics
        .reservas_por_canal
        .iter()
        .map(|c| metrics::per_channel_cancellation_estimate(c, rate))
        .collect();
    view
}

fn operations(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let mut view = view(DashboardKind::Operations, analytics);
    view.kpis = vec![
        KpiCard::new("Total Bookings", analytics.total_reservas as f64, Number),
        KpiCard::new("Nights Sold", analytics.total_noches_vendidas as f64, Number),
        KpiCard::new(
            "Avg Nights/Booking",
            metrics::average_nights_per_booking(analytics),
            Number,
        ),
        KpiCard::new("Occupancy Rate", analytics.tasa_ocupacion, Percentage),
        KpiCard::new(
            "Approx. Rooms Occupied/Day",
            metrics::approximate_daily_rooms_occupied(analytics) as f64,
            Number,
        ),
    ];

    let mut capacity = vec![("Nights Sold", analytics.total_noches_vendidas as f64)];
    if let Some(unsold) = metrics::unsold_nights(analytics) {
        capacity.push(("Available Nights", unsold as f64));
    }
    view.charts = vec![
        chart(
            "Capacity Utilization",
            "Nights sold vs available capacity",
            ChartKind::Bar,
            vec![Series::from_values("Capacity", capacity)],
        ),
        chart(
            "Bookings by Channel",
            "Operational load by booking source",
            ChartKind::Bar,
            vec![channel_bookings(analytics)],
        ),
    ];
    view.status_overview = metrics::status_percentages(analytics);
    view.channel_performance = channel_rows(analytics);
    view
}

fn financial_report(analytics: &HotelAnalytics) -> DashboardView {
    use ValueFormat::*;

    let mut view = view(DashboardKind::FinancialReport, analytics);
    view.kpis = vec![
        KpiCard::new("Total Revenue", analytics.ingresos_totales_habitaciones, Currency),
        KpiCard::new("Occupancy Rate", analytics.tasa_ocupacion, Percentage),
        KpiCard::new("ADR", analytics.adr, Currency),
        KpiCard::new("RevPAR", analytics.revpar, Currency),
        KpiCard::new("Nights Sold", analytics.total_noches_vendidas as f64, Number),
        KpiCard::new("Confirmed Reservations", analytics.total_reservas as f64, Number),
        KpiCard::new(
            "Cancellation Rate",
            metrics::report_cancellation_rate(analytics),
            Percentage,
        ),
    ];
    view.charts = vec![chart(
        "Revenue Breakdown by Channel",
        "Total revenue per booking channel",
        ChartKind::Bar,
        vec![channel_revenue(analytics)],
    )];
    view.channel_performance = channel_rows(analytics);
    view.status_overview = metrics::status_percentages(analytics);
    view
}
