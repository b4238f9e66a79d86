//! Hotel analytics API client over the GraphQL catalog.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;
use crate::graphql::GraphQLClient;
use crate::queries::{
    FinancialReportQuery, FinancialReportVariables, HotelAnalyticsQuery, HotelAnalyticsVariables,
};

/// Aggregate snapshot for one hotel (or all hotels) over a date range.
///
/// The financial-report projection leaves out the identity, the dates and
/// the available nights, so those fields are optional.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelAnalytics {
    pub hotel_id_erp: Option<i64>,
    pub hotel_nombre: Option<String>,
    pub fecha_inicio: Option<String>,
    pub fecha_fin: Option<String>,
    pub total_reservas: u64,
    pub total_noches_vendidas: u64,
    pub total_noches_disponibles: Option<u64>,
    pub ingresos_totales_habitaciones: f64,
    /// 0-100 scale.
    pub tasa_ocupacion: f64,
    pub adr: f64,
    pub revpar: f64,
    #[serde(default)]
    pub reservas_por_canal: Vec<ChannelBreakdown>,
    #[serde(default)]
    pub reservas_por_estado: Vec<StatusBreakdown>,
}

/// Bookings attributed to one distribution channel.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelBreakdown {
    pub canal_nombre: String,
    pub cantidad_reservas: u64,
    pub ingresos_totales: f64,
    #[serde(default)]
    pub porcentaje: f64,
}

/// Bookings in one status. Labels are free text from the source, e.g.
/// "Confirmada" or "Cancelada".
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub estado: String,
    pub cantidad: u64,
    #[serde(default)]
    pub porcentaje: Option<f64>,
}

/// Anything that can produce analytics snapshots for the dashboards.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Full snapshot; `None` when the service has nothing for the window.
    async fn hotel_analytics(
        &self,
        variables: &HotelAnalyticsVariables,
    ) -> Result<Option<HotelAnalytics>, FetchError>;

    /// Reduced financial-report projection.
    async fn financial_report(
        &self,
        variables: &FinancialReportVariables,
    ) -> Result<Option<HotelAnalytics>, FetchError>;
}

/// Analytics API client.
#[derive(Clone)]
pub struct AnalyticsClient {
    graphql_client: GraphQLClient,
}

impl AnalyticsClient {
    pub fn new(graphql_client: GraphQLClient) -> Self {
        Self { graphql_client }
    }
}

#[async_trait]
impl AnalyticsSource for AnalyticsClient {
    async fn hotel_analytics(
        &self,
        variables: &HotelAnalyticsVariables,
    ) -> Result<Option<HotelAnalytics>, FetchError> {
        let data = self
            .graphql_client
            .run::<HotelAnalyticsQuery>(variables)
            .await?;
        Ok(data.hotel_analytics)
    }

    async fn financial_report(
        &self,
        variables: &FinancialReportVariables,
    ) -> Result<Option<HotelAnalytics>, FetchError> {
        let data = self
            .graphql_client
            .run::<FinancialReportQuery>(variables)
            .await?;
        Ok(data.hotel_analytics)
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("endpoint", &self.graphql_client.endpoint())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reduced_projection_decodes() {
        let analytics: HotelAnalytics = serde_json::from_value(json!({
            "ingresosTotalesHabitaciones": 50000.0,
            "tasaOcupacion": 72.5,
            "adr": 120.0,
            "revpar": 87.0,
            "totalNochesVendidas": 410,
            "totalReservas": 130,
            "reservasPorCanal": [
                {"canalNombre": "Direct", "cantidadReservas": 30, "ingresosTotales": 12000.0, "porcentaje": 23.1}
            ],
            "reservasPorEstado": [
                {"estado": "Confirmada", "cantidad": 110},
                {"estado": "Cancelada", "cantidad": 20}
            ]
        }))
        .unwrap();

        assert_eq!(analytics.hotel_id_erp, None);
        assert_eq!(analytics.total_noches_disponibles, None);
        assert_eq!(analytics.reservas_por_estado[1].porcentaje, None);
        assert_eq!(analytics.reservas_por_canal[0].canal_nombre, "Direct");
    }

    #[test]
    fn test_missing_breakdowns_default_to_empty() {
        let analytics: HotelAnalytics = serde_json::from_value(json!({
            "totalReservas": 0,
            "totalNochesVendidas": 0,
            "ingresosTotalesHabitaciones": 0.0,
            "tasaOcupacion": 0.0,
            "adr": 0.0,
            "revpar": 0.0
        }))
        .unwrap();
        assert!(analytics.reservas_por_canal.is_empty());
        assert!(analytics.reservas_por_estado.is_empty());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let status = StatusBreakdown {
            estado: "Confirmada".to_string(),
            cantidad: 3,
            porcentaje: Some(75.0),
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            json!({"estado": "Confirmada", "cantidad": 3, "porcentaje": 75.0})
        );
    }
}
