//! Minimal GraphQL-over-HTTP client.
//!
//! One POST per call, no retries, no caching. Failures of any kind come back
//! as a [`FetchError`].

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::Config;
use crate::error::FetchError;
use crate::queries::GraphQLQuery;

/// Logged response bodies are cut at this many characters.
const LOG_BODY_LIMIT: usize = 500;

/// Request body sent to the endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequest<'a, V: ?Sized> {
    query: &'a str,
    variables: &'a V,
    #[serde(skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
}

/// Response envelope. `data` is decoded into the caller's type only after
/// the error array has been checked.
#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLErrorItem>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorItem {
    message: String,
}

/// GraphQL client bound to a single endpoint.
#[derive(Clone)]
pub struct GraphQLClient {
    endpoint: String,
    http_client: Client,
    timeout_seconds: u64,
}

impl GraphQLClient {
    /// Create a new client from an already resolved configuration.
    ///
    /// # Errors
    /// Returns `FetchError::HttpClientInit` if the HTTP client cannot be created.
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::HttpClientInit(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            http_client,
            timeout_seconds: config.timeout_seconds,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run a catalog query with its typed variables.
    pub async fn run<Q: GraphQLQuery>(
        &self,
        variables: &Q::Variables,
    ) -> Result<Q::ResponseData, FetchError> {
        self.execute(Q::QUERY, variables).await
    }

    /// Execute a query document.
    ///
    /// `operationName` is sent when the document names its operation.
    pub async fn execute<V, T>(&self, query: &str, variables: &V) -> Result<T, FetchError>
    where
        V: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let operation_name = operation_name(query);
        tracing::debug!(
            endpoint = %self.endpoint,
            operation = operation_name.unwrap_or("anonymous"),
            "GraphQL request"
        );

        let body = GraphQLRequest {
            query,
            variables,
            operation_name,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Handle HTTP response and decode the GraphQL envelope.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, FetchError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        tracing::debug!(
            status = status.as_u16(),
            body = %truncate(&body, LOG_BODY_LIMIT),
            "GraphQL response"
        );

        if !status.is_success() {
            return Err(parse_error_response(status, &body));
        }

        let envelope: GraphQLResponse = serde_json::from_str(&body).map_err(|e| {
            FetchError::Decode(format!("{} - Body: {}", e, truncate(&body, 200)))
        })?;

        if let Some(errors) = envelope.errors.filter(|errors| !errors.is_empty()) {
            return Err(FetchError::GraphQL {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        match envelope.data {
            None | Some(Value::Null) => Err(FetchError::MissingData),
            Some(data) => serde_json::from_value(data).map_err(|e| FetchError::Decode(e.to_string())),
        }
    }

    fn transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.timeout_seconds)
        } else {
            FetchError::Request(error)
        }
    }
}

/// Name of the first operation in `query`, if it has one.
fn operation_name(query: &str) -> Option<&str> {
    let query = query.trim_start();
    let rest = ["query", "mutation", "subscription"]
        .into_iter()
        .find_map(|keyword| query.strip_prefix(keyword))?
        .trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    Some(&rest[..end]).filter(|name| !name.is_empty())
}

/// Prefer the GraphQL error messages when a non-2xx body carries them.
fn parse_error_response(status: StatusCode, body: &str) -> FetchError {
    match serde_json::from_str::<GraphQLResponse>(body) {
        Ok(GraphQLResponse {
            errors: Some(errors),
            ..
        }) if !errors.is_empty() => FetchError::GraphQL {
            messages: errors.into_iter().map(|e| e.message).collect(),
        },
        _ => FetchError::HttpError {
            status,
            body: body.to_string(),
        },
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...(truncated)", &s[..idx]),
        None => s.to_string(),
    }
}

impl std::fmt::Debug for GraphQLClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQLClient")
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{HotelAnalyticsQuery, HotelAnalyticsVariables};
    use axum::{http::StatusCode as AxumStatus, routing::post, Json, Router};
    use chrono::NaiveDate;
    use serde_json::json;

    async fn spawn_stub(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/graphql")
    }

    fn client_for(endpoint: String, timeout_seconds: u64) -> GraphQLClient {
        GraphQLClient::new(&Config {
            endpoint,
            debug: false,
            timeout_seconds,
        })
        .unwrap()
    }

    fn january(hotel: Option<i64>) -> HotelAnalyticsVariables {
        HotelAnalyticsVariables {
            fecha_inicio: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            fecha_fin: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            hotel_id_erp: hotel,
        }
    }

    fn analytics_payload() -> Value {
        json!({
            "hotelIdErp": 5,
            "hotelNombre": "Hotel Centro",
            "fechaInicio": "2024-01-01",
            "fechaFin": "2024-01-31",
            "totalReservas": 200,
            "totalNochesVendidas": 600,
            "totalNochesDisponibles": 900,
            "ingresosTotalesHabitaciones": 100000.0,
            "tasaOcupacion": 66.7,
            "adr": 166.67,
            "revpar": 111.11,
            "reservasPorCanal": [],
            "reservasPorEstado": [{"estado": "Cancelada", "cantidad": 20, "porcentaje": 10.0}]
        })
    }

    #[tokio::test]
    async fn test_run_sends_typed_variables_and_decodes_data() {
        let app = Router::new().route(
            "/graphql",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["operationName"], "HotelAnalytics");
                assert_eq!(body["variables"]["fechaInicio"], "2024-01-01");
                assert_eq!(body["variables"]["hotelIdErp"], 5);
                assert!(body["query"].as_str().unwrap().contains("hotelAnalytics("));
                Json(json!({"data": {"hotelAnalytics": analytics_payload()}}))
            }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let data = client
            .run::<HotelAnalyticsQuery>(&january(Some(5)))
            .await
            .unwrap();
        let analytics = data.hotel_analytics.unwrap();
        assert_eq!(analytics.total_reservas, 200);
        assert_eq!(analytics.hotel_nombre.as_deref(), Some("Hotel Centro"));
        assert_eq!(analytics.reservas_por_estado[0].cantidad, 20);
    }

    #[tokio::test]
    async fn test_all_hotels_request_omits_hotel_variable() {
        let app = Router::new().route(
            "/graphql",
            post(|Json(body): Json<Value>| async move {
                assert!(body["variables"].get("hotelIdErp").is_none());
                Json(json!({"data": {"hotelAnalytics": null}}))
            }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let data = client
            .run::<HotelAnalyticsQuery>(&january(None))
            .await
            .unwrap();
        assert!(data.hotel_analytics.is_none());
    }

    #[tokio::test]
    async fn test_graphql_error_array_is_a_failure() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                Json(json!({
                    "data": null,
                    "errors": [{"message": "Variable \"$fechaInicio\" got invalid value"}]
                }))
            }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let err = client
            .run::<HotelAnalyticsQuery>(&january(None))
            .await
            .unwrap_err();
        match err {
            FetchError::GraphQL { messages } => {
                assert_eq!(messages.len(), 1);
                assert!(messages[0].contains("fechaInicio"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_errors_win_over_partial_data() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                Json(json!({
                    "data": {"hotelAnalytics": analytics_payload()},
                    "errors": [{"message": "channel resolver failed"}]
                }))
            }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let result = client.run::<HotelAnalyticsQuery>(&january(None)).await;
        assert!(matches!(result, Err(FetchError::GraphQL { .. })));
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let app = Router::new().route(
            "/graphql",
            post(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "database unavailable") }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        match client.run::<HotelAnalyticsQuery>(&january(None)).await {
            Err(FetchError::HttpError { status, body }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(body, "database unavailable");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_success_status_with_graphql_errors() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                (
                    AxumStatus::BAD_REQUEST,
                    Json(json!({"errors": [{"message": "Syntax Error"}]})),
                )
            }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let err = client
            .execute::<_, Value>("{ broken", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "GraphQL error: Syntax Error");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let app = Router::new().route(
            "/graphql",
            post(|| async { Json(json!({"data": {"hotelAnalytics": {"totalReservas": "many"}}})) }),
        );
        let client = client_for(spawn_stub(app).await, 5);

        let result = client.run::<HotelAnalyticsQuery>(&january(None)).await;
        assert!(matches!(result, Err(FetchError::Decode(_))));
    }

    #[tokio::test]
    async fn test_missing_data_is_reported() {
        let app = Router::new().route("/graphql", post(|| async { Json(json!({})) }));
        let client = client_for(spawn_stub(app).await, 5);

        let result = client.run::<HotelAnalyticsQuery>(&january(None)).await;
        assert!(matches!(result, Err(FetchError::MissingData)));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let app = Router::new().route(
            "/graphql",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                Json(json!({"data": {"hotelAnalytics": null}}))
            }),
        );
        let client = client_for(spawn_stub(app).await, 1);

        let result = client.run::<HotelAnalyticsQuery>(&january(None)).await;
        assert!(matches!(result, Err(FetchError::Timeout(1))));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let client = client_for(format!("http://127.0.0.1:{port}/graphql"), 2);

        let result = client.run::<HotelAnalyticsQuery>(&january(None)).await;
        assert!(matches!(result, Err(FetchError::Request(_))));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("Anulada", 10), "Anulada");
        assert_eq!(truncate("ñññ", 2), "ññ...(truncated)");
    }

    #[test]
    fn test_operation_name_from_document() {
        assert_eq!(
            operation_name(HotelAnalyticsQuery::QUERY),
            Some("HotelAnalytics")
        );
        assert_eq!(
            operation_name("query ReporteFinancieroPrincipal($fechaInicio: Date!) { x }"),
            Some("ReporteFinancieroPrincipal")
        );
        assert_eq!(operation_name("query { hotelAnalytics { adr } }"), None);
        assert_eq!(operation_name("{ broken"), None);
    }
}
