//! HTTP API extraction
//!
//! One authenticated GET against the transactions endpoint. The response
//! body must be a JSON array of row objects; objects may disagree on their
//! key sets, in which case the columns are unioned and missing cells are
//! null.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use txp_common::config::ApiConfig;
use txp_common::table::{Field, Table};
use txp_common::{EtlError, Result};

/// Build the HTTP client used for API extraction.
pub fn build_client(config: &ApiConfig) -> Result<Client> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch transaction rows from the configured endpoint.
pub async fn fetch(client: &Client, config: &ApiConfig) -> Result<Table> {
    let response = client
        .get(&config.endpoint)
        .bearer_auth(&config.api_key)
        .send()
        .await?
        .error_for_status()?;

    let body: Value = response.json().await?;
    let rows = body.as_array().ok_or_else(|| {
        EtlError::source_unavailable("api", "response body is not a JSON array")
    })?;

    debug!(rows = rows.len(), endpoint = %config.endpoint, "api returned");
    table_from_objects(rows)
}

/// Stack JSON row objects into a table, unioning their key sets.
fn table_from_objects(rows: &[Value]) -> Result<Table> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        let object = row.as_object().ok_or_else(|| {
            EtlError::source_unavailable("api", "array element is not an object")
        })?;
        for key in object.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for row in rows {
        // Validated as an object above.
        let object = row.as_object().ok_or_else(|| {
            EtlError::source_unavailable("api", "array element is not an object")
        })?;
        let cells = table
            .columns()
            .iter()
            .map(|col| object.get(col).map(json_to_field).unwrap_or(Field::Null))
            .collect();
        table.push_row(cells)?;
    }
    Ok(table)
}

fn json_to_field(value: &Value) -> Field {
    match value {
        Value::Null => Field::Null,
        Value::String(s) => Field::Text(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Field::Int(i)
            } else {
                n.as_f64().map(Field::Number).unwrap_or(Field::Null)
            }
        },
        Value::Bool(b) => Field::Text(b.to_string()),
        other => Field::Text(other.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(endpoint: String) -> ApiConfig {
        ApiConfig {
            endpoint,
            api_key: "secret-key".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_fetch_parses_row_objects() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ecommerce_data"))
            .and(header("authorization", "Bearer secret-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"transaction_id": "T1", "transaction_value": 12.5, "quantity": 2},
                {"transaction_id": "T2", "customer_id": "C7"}
            ])))
            .mount(&server)
            .await;

        let config = test_config(format!("{}/ecommerce_data", server.uri()));
        let client = build_client(&config).unwrap();
        let table = fetch(&client, &config).await.unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "transaction_value"), Some(&Field::Number(12.5)));
        assert_eq!(table.get(0, "quantity"), Some(&Field::Int(2)));
        // Column missing from the first object is unioned in as null.
        assert_eq!(table.get(0, "customer_id"), Some(&Field::Null));
        assert_eq!(table.get(1, "customer_id"), Some(&Field::Text("C7".into())));
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let client = build_client(&config).unwrap();
        assert!(fetch(&client, &config).await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_non_array_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": []})))
            .mount(&server)
            .await;

        let config = test_config(server.uri());
        let client = build_client(&config).unwrap();
        let err = fetch(&client, &config).await.unwrap_err();
        assert!(matches!(err, EtlError::SourceUnavailable { .. }));
    }
}
