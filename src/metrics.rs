//! Presentation metrics derived from a fetched analytics snapshot.
//!
//! Every function here is pure and total. Ratios over an empty denominator
//! are 0, and no NaN or infinite value is ever returned.

use serde::Serialize;

use crate::api::analytics::{ChannelBreakdown, HotelAnalytics};

/// Lower-cased label fragments that mark a cancelled booking.
const CANCELLATION_MARKERS: [&str; 2] = ["cancel", "anulad"];

/// Exact label the financial report counts as cancelled.
const REPORT_CANCELLATION_LABEL: &str = "cancelada";

/// Month labels for the forecast chart. Not derived from the window.
pub const FORECAST_MONTHS: [&str; 6] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];

const ACTUAL_GROWTH_STEP: f64 = 0.10;
const FORECAST_GROWTH_STEP: f64 = 0.15;
const OCCUPANCY_GROWTH_STEP: f64 = 0.05;
const BOOKINGS_GROWTH_STEP: f64 = 0.08;
/// Last index with an actual value; first index with a forecast value.
const ACTUAL_LAST_INDEX: usize = 2;
const FORECAST_FIRST_INDEX: usize = 2;

const PROJECTED_REVENUE_FACTOR: f64 = 1.15;
const PROJECTED_OCCUPANCY_FACTOR: f64 = 1.10;
const OCCUPANCY_CAP: f64 = 100.0;

/// Days the operations view spreads sold nights over.
const DAILY_OCCUPANCY_DAYS: f64 = 30.0;

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        sanitize(numerator / denominator)
    }
}

fn percent(part: f64, whole: f64) -> f64 {
    ratio(part * 100.0, whole)
}

fn round_count(value: f64) -> u64 {
    sanitize(value).round().max(0.0) as u64
}

/// Count of the first status whose label looks like a cancellation.
///
/// Only the first match counts, even if several labels qualify.
pub fn cancelled_count(analytics: &HotelAnalytics) -> u64 {
    analytics
        .reservas_por_estado
        .iter()
        .find(|status| {
            let label = status.estado.to_lowercase();
            CANCELLATION_MARKERS
                .iter()
                .any(|marker| label.contains(marker))
        })
        .map(|status| status.cantidad)
        .unwrap_or(0)
}

/// Cancellation rate over all bookings (substring-match variant), 0-100.
pub fn cancellation_rate(analytics: &HotelAnalytics) -> f64 {
    percent(
        cancelled_count(analytics) as f64,
        analytics.total_reservas as f64,
    )
}

/// Cancellation rate as the financial report computes it: the status
/// labelled exactly "cancelada" over the sum of all status counts.
pub fn report_cancellation_rate(analytics: &HotelAnalytics) -> f64 {
    let cancelled = analytics
        .reservas_por_estado
        .iter()
        .find(|status| status.estado.to_lowercase() == REPORT_CANCELLATION_LABEL)
        .map(|status| status.cantidad)
        .unwrap_or(0);
    let total: u64 = analytics
        .reservas_por_estado
        .iter()
        .map(|status| status.cantidad)
        .sum();
    percent(cancelled as f64, total as f64)
}

/// Average booking value times the cancelled count.
pub fn estimated_lost_revenue(analytics: &HotelAnalytics, cancelled: u64) -> f64 {
    average_revenue_per_booking(analytics) * cancelled as f64
}

pub fn average_revenue_per_booking(analytics: &HotelAnalytics) -> f64 {
    ratio(
        analytics.ingresos_totales_habitaciones,
        analytics.total_reservas as f64,
    )
}

pub fn average_nights_per_booking(analytics: &HotelAnalytics) -> f64 {
    ratio(
        analytics.total_noches_vendidas as f64,
        analytics.total_reservas as f64,
    )
}

/// Bookings that were not cancelled.
pub fn active_bookings(analytics: &HotelAnalytics, cancelled: u64) -> u64 {
    analytics.total_reservas.saturating_sub(cancelled)
}

/// Estimated cancellations for one channel.
///
/// The overall rate is spread uniformly across channels; no per-channel
/// cancellation data exists, so this is always an approximation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelCancellationEstimate {
    pub channel: String,
    pub bookings: u64,
    pub estimated_cancellations: u64,
    /// Estimated cancellations over the channel's bookings, 0-100.
    pub estimated_rate: f64,
    pub approximate: bool,
}

pub fn per_channel_cancellation_estimate(
    channel: &ChannelBreakdown,
    overall_rate_percent: f64,
) -> ChannelCancellationEstimate {
    let estimated = round_count(channel.cantidad_reservas as f64 * overall_rate_percent / 100.0);
    ChannelCancellationEstimate {
        channel: channel.canal_nombre.clone(),
        bookings: channel.cantidad_reservas,
        estimated_cancellations: estimated,
        estimated_rate: percent(estimated as f64, channel.cantidad_reservas as f64),
        approximate: true,
    }
}

/// A status entry with a percentage that is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusShare {
    pub estado: String,
    pub cantidad: u64,
    pub porcentaje: f64,
}

/// Status breakdown with missing percentages computed locally from the
/// sum of all status counts. Percentages supplied by the source are kept.
pub fn status_percentages(analytics: &HotelAnalytics) -> Vec<StatusShare> {
    let total: u64 = analytics
        .reservas_por_estado
        .iter()
        .map(|status| status.cantidad)
        .sum();

    analytics
        .reservas_por_estado
        .iter()
        .map(|status| StatusShare {
            estado: status.estado.clone(),
            cantidad: status.cantidad,
            porcentaje: status
                .porcentaje
                .map(sanitize)
                .unwrap_or_else(|| percent(status.cantidad as f64, total as f64)),
        })
        .collect()
}

/// Revenue per booking for a single channel.
pub fn average_channel_value(channel: &ChannelBreakdown) -> f64 {
    ratio(channel.ingresos_totales, channel.cantidad_reservas as f64)
}

/// Rough count of rooms occupied per day, assuming a 30-day window.
pub fn approximate_daily_rooms_occupied(analytics: &HotelAnalytics) -> u64 {
    round_count(analytics.total_noches_vendidas as f64 / DAILY_OCCUPANCY_DAYS)
}

/// Available nights left unsold; `None` when availability was not fetched.
pub fn unsold_nights(analytics: &HotelAnalytics) -> Option<u64> {
    analytics
        .total_noches_disponibles
        .map(|available| available.saturating_sub(analytics.total_noches_vendidas))
}

/// One month of the fixed-ratio projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub month: &'static str,
    pub actual: Option<f64>,
    pub forecast: Option<f64>,
    pub occupancy: f64,
    pub bookings: u64,
}

/// Six-month linear projection from the current snapshot.
///
/// This is a fixed-ratio extrapolation, not a statistical model: no
/// historical series is consulted.
pub fn forecast_series(analytics: &HotelAnalytics) -> Vec<ForecastPoint> {
    let periods = FORECAST_MONTHS.len() as f64;
    let base_revenue = analytics.ingresos_totales_habitaciones / periods;
    let base_bookings = analytics.total_reservas as f64 / periods;
    let base_occupancy = analytics.tasa_ocupacion;

    FORECAST_MONTHS
        .iter()
        .enumerate()
        .map(|(index, &month)| {
            let step = index as f64;
            ForecastPoint {
                month,
                actual: (index <= ACTUAL_LAST_INDEX)
                    .then(|| sanitize(base_revenue * (1.0 + step * ACTUAL_GROWTH_STEP))),
                forecast: (index >= FORECAST_FIRST_INDEX)
                    .then(|| sanitize(base_revenue * (1.0 + step * FORECAST_GROWTH_STEP))),
                occupancy: sanitize(base_occupancy * (1.0 + step * OCCUPANCY_GROWTH_STEP)),
                bookings: round_count(base_bookings * (1.0 + step * BOOKINGS_GROWTH_STEP)),
            }
        })
        .collect()
}

pub fn projected_revenue(analytics: &HotelAnalytics) -> f64 {
    sanitize(analytics.ingresos_totales_habitaciones * PROJECTED_REVENUE_FACTOR)
}

/// Projected occupancy, capped at 100%.
pub fn projected_occupancy(analytics: &HotelAnalytics) -> f64 {
    sanitize(analytics.tasa_ocupacion * PROJECTED_OCCUPANCY_FACTOR).min(OCCUPANCY_CAP)
}
