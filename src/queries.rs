//! Query catalog for the hotel analytics GraphQL service.
//!
//! Each query pairs its document with strongly typed variables, so callers
//! never build variable maps by hand. Untyped maps coming from the outside
//! are checked here before anything is sent.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::api::analytics::HotelAnalytics;
use crate::error::QueryError;

/// A named GraphQL operation with typed variables and response data.
pub trait GraphQLQuery {
    const OPERATION_NAME: &'static str;
    const QUERY: &'static str;

    type Variables: Serialize + DeserializeOwned + Send + Sync;
    type ResponseData: DeserializeOwned;

    /// Build typed variables from an untyped mapping.
    ///
    /// Unknown keys, missing required keys and malformed dates are rejected.
    fn variables_from_map(map: Map<String, Value>) -> Result<Self::Variables, QueryError> {
        serde_json::from_value(Value::Object(map)).map_err(|source| {
            QueryError::InvalidVariables {
                operation: Self::OPERATION_NAME,
                source,
            }
        })
    }
}

/// `data` payload shared by both queries: one root `hotelAnalytics` field.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelAnalyticsData {
    pub hotel_analytics: Option<HotelAnalytics>,
}

/// Full analytics snapshot with channel and status breakdowns.
#[derive(Debug, Clone, Copy)]
pub struct HotelAnalyticsQuery;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HotelAnalyticsVariables {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id_erp: Option<i64>,
}

impl GraphQLQuery for HotelAnalyticsQuery {
    const OPERATION_NAME: &'static str = "HotelAnalytics";
    const QUERY: &'static str = r#"
  query HotelAnalytics($fechaInicio: Date!, $fechaFin: Date!, $hotelIdErp: Int) {
    hotelAnalytics(fechaInicio: $fechaInicio, fechaFin: $fechaFin, hotelIdErp: $hotelIdErp) {
      hotelIdErp
      hotelNombre
      fechaInicio
      fechaFin
      totalReservas
      totalNochesVendidas
      totalNochesDisponibles
      ingresosTotalesHabitaciones
      tasaOcupacion
      adr
      revpar
      reservasPorCanal {
        canalNombre
        cantidadReservas
        ingresosTotales
        porcentaje
      }
      reservasPorEstado {
        estado
        cantidad
        porcentaje
      }
    }
  }
"#;

    type Variables = HotelAnalyticsVariables;
    type ResponseData = HotelAnalyticsData;
}

/// Reduced projection for the financial report. Status entries come back
/// without `porcentaje`.
#[derive(Debug, Clone, Copy)]
pub struct FinancialReportQuery;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FinancialReportVariables {
    pub fecha_inicio: NaiveDate,
    pub fecha_fin: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_id: Option<i64>,
}

impl GraphQLQuery for FinancialReportQuery {
    const OPERATION_NAME: &'static str = "ReporteFinancieroPrincipal";
    const QUERY: &'static str = r#"
  query ReporteFinancieroPrincipal($fechaInicio: Date!, $fechaFin: Date!, $hotelId: Int) {
    hotelAnalytics(fechaInicio: $fechaInicio, fechaFin: $fechaFin, hotelIdErp: $hotelId) {
      ingresosTotalesHabitaciones
      tasaOcupacion
      adr
      revpar
      totalNochesVendidas
      totalReservas
      reservasPorCanal {
        canalNombre
        cantidadReservas
        ingresosTotales
        porcentaje
      }
      reservasPorEstado {
        estado
        cantidad
      }
    }
  }
"#;

    type Variables = FinancialReportVariables;
    type ResponseData = HotelAnalyticsData;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_analytics_variables_wire_shape() {
        let vars = HotelAnalyticsVariables {
            fecha_inicio: date("2024-01-01"),
            fecha_fin: date("2024-01-31"),
            hotel_id_erp: Some(5),
        };
        assert_eq!(
            serde_json::to_value(&vars).unwrap(),
            json!({"fechaInicio": "2024-01-01", "fechaFin": "2024-01-31", "hotelIdErp": 5})
        );
    }

    #[test]
    fn test_all_hotels_omits_hotel_variable() {
        let vars = FinancialReportVariables {
            fecha_inicio: date("2024-01-01"),
            fecha_fin: date("2024-01-31"),
            hotel_id: None,
        };
        let value = serde_json::to_value(&vars).unwrap();
        assert!(value.get("hotelId").is_none());
        assert_eq!(value["fechaInicio"], "2024-01-01");
    }

    #[test]
    fn test_map_validation_accepts_declared_fields() {
        let vars = HotelAnalyticsQuery::variables_from_map(as_map(json!({
            "fechaInicio": "2024-02-01",
            "fechaFin": "2024-02-29",
        })))
        .unwrap();
        assert_eq!(vars.fecha_fin, date("2024-02-29"));
        assert_eq!(vars.hotel_id_erp, None);
    }

    #[test]
    fn test_map_validation_rejects_unknown_field() {
        let err = HotelAnalyticsQuery::variables_from_map(as_map(json!({
            "fechaInicio": "2024-01-01",
            "fechaFin": "2024-01-31",
            "hotelId": 5,
        })))
        .unwrap_err();
        assert!(err.to_string().contains("HotelAnalytics"));
        assert!(err.to_string().contains("hotelId"));
    }

    #[test]
    fn test_map_validation_rejects_missing_required_field() {
        let err = FinancialReportQuery::variables_from_map(as_map(json!({
            "fechaInicio": "2024-01-01",
        })))
        .unwrap_err();
        assert!(err.to_string().contains("fechaFin"));
    }

    #[test]
    fn test_map_validation_rejects_impossible_date() {
        let result = FinancialReportQuery::variables_from_map(as_map(json!({
            "fechaInicio": "2024-02-30",
            "fechaFin": "2024-03-01",
        })));
        assert!(matches!(result, Err(QueryError::InvalidVariables { .. })));
    }

    #[test]
    fn test_inverted_range_passes_through() {
        let vars = HotelAnalyticsQuery::variables_from_map(as_map(json!({
            "fechaInicio": "2024-03-01",
            "fechaFin": "2024-01-01",
        })))
        .unwrap();
        assert!(vars.fecha_inicio > vars.fecha_fin);
    }

    #[test]
    fn test_financial_query_binds_hotel_id_to_root_argument() {
        assert!(FinancialReportQuery::QUERY.contains("hotelIdErp: $hotelId"));
        assert!(HotelAnalyticsQuery::QUERY.contains("hotelIdErp: $hotelIdErp"));
    }

    #[test]
    fn test_response_data_tolerates_null_root() {
        let data: HotelAnalyticsData =
            serde_json::from_value(json!({"hotelAnalytics": null})).unwrap();
        assert!(data.hotel_analytics.is_none());
    }
}
