//! End-to-end queries against in-process fake indexers served by axum.

use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use cardano_query::{
    Backend, Config, FetchConfig, Network, QueryApi, QueryClient, QueryError, QueryStatus,
};
use num_bigint::BigUint;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const PROJECT_ID: &str = "preprodTestProject";
const ADDRESS: &str = "addr_test1qrgpjmyy8zk9nuza24a0f4e7mgp9gd6h3uayp0rqnjnkl54v4dlyj0kwfs0x4e38a7047lymzp37tx0y42glslcdtzhqzp57km";

fn fixture(path: &str) -> serde_json::Value {
    let full = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../testdata")
        .join(path);
    let s = std::fs::read_to_string(&full).unwrap_or_else(|e| panic!("read {}: {}", full.display(), e));
    serde_json::from_str(&s).unwrap_or_else(|e| panic!("parse {}: {}", path, e))
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("project_id")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == PROJECT_ID)
}

async fn bf_utxos(
    UrlPath(address): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, "Invalid project token.").into_response();
    }
    if address != ADDRESS {
        return (
            StatusCode::NOT_FOUND,
            r#"{"status_code":404,"error":"Not Found","message":"The requested component has not been found."}"#,
        )
            .into_response();
    }
    match params.get("page").map(String::as_str) {
        Some("1") => Json(fixture("blockfrost_utxos.json")).into_response(),
        _ => Json(serde_json::json!([])).into_response(),
    }
}

async fn bf_parameters(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return (StatusCode::FORBIDDEN, "Invalid project token.").into_response();
    }
    Json(fixture("blockfrost_parameters.json")).into_response()
}

async fn blockfrost_server() -> String {
    let app = Router::new()
        .route("/api/v0/addresses/:address/utxos", get(bf_utxos))
        .route("/api/v0/epochs/latest/parameters", get(bf_parameters));
    format!("{}/api/v0", serve(app).await)
}

async fn gql(Json(body): Json<serde_json::Value>) -> Response {
    let query = body["query"].as_str().unwrap_or_default();
    if query.contains("UTxOsByAddress") {
        if body["variables"]["address"].as_str().is_none() {
            return (StatusCode::BAD_REQUEST, "missing $address").into_response();
        }
        return Json(fixture("graphql_utxos.json")).into_response();
    }
    if query.contains("PaymentAddressByAddresses") {
        return Json(fixture("graphql_payment_addresses.json")).into_response();
    }
    if query.contains("getProtocolParameters") {
        return Json(fixture("graphql_protocol_params.json")).into_response();
    }
    (StatusCode::BAD_REQUEST, "unknown operation").into_response()
}

async fn gql_errors() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "data": null,
        "errors": [{ "message": "Cannot query field \"utxos\" on type \"Query\"." }]
    }))
}

async fn graphql_server() -> String {
    let app = Router::new()
        .route("/graphql", post(gql))
        .route("/broken", post(gql_errors));
    serve(app).await
}

fn utxo_page(start: usize, len: usize) -> serde_json::Value {
    (start..start + len)
        .map(|i| {
            serde_json::json!({
                "tx_hash": format!("{i:064x}"),
                "output_index": 0,
                "amount": [{ "unit": "lovelace", "quantity": "1000000" }]
            })
        })
        .collect()
}

#[derive(Clone)]
struct PagingFake {
    total: usize,
    honor_page: bool,
    requests: Arc<AtomicUsize>,
}

async fn paged_utxos(
    State(fake): State<PagingFake>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    let page: usize = if fake.honor_page {
        params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1)
    } else {
        1
    };
    let start = (page - 1) * 100;
    let len = fake.total.saturating_sub(start).min(100);
    Json(utxo_page(start, len))
}

async fn paging_server(fake: PagingFake) -> String {
    let app = Router::new()
        .route("/api/v0/addresses/:address/utxos", get(paged_utxos))
        .with_state(fake);
    format!("{}/api/v0", serve(app).await)
}

fn blockfrost_config(base_url: String, project_id: Option<&str>) -> Config {
    Config {
        query_api: QueryApi::Blockfrost {
            base_url,
            project_id: project_id.map(String::from),
        },
        ..Config::defaults(Network::Testnet)
    }
}

fn graphql_config(uri: String) -> Config {
    Config {
        query_api: QueryApi::GraphQl { uri },
        ..Config::defaults(Network::Mainnet)
    }
}

#[tokio::test]
async fn blockfrost_balance_and_parameters() {
    let base = blockfrost_server().await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, Some(PROJECT_ID)), FetchConfig::default())
            .unwrap();
    assert_eq!(client.backend(), Backend::Blockfrost);

    let utxos = client.utxos(ADDRESS).await.data.unwrap();
    assert_eq!(utxos.len(), 2);
    assert!(utxos.iter().all(|u| u.address == ADDRESS));

    let value = client.utxo_balance(ADDRESS).await.data.unwrap();
    assert_eq!(value.lovelace, BigUint::from(3_500_000u32));
    assert_eq!(value.assets.len(), 2);

    let params = client.protocol_parameters().await.data.unwrap();
    assert_eq!(params.coins_per_utxo_word, Some(34480));
}

#[tokio::test]
async fn blockfrost_walks_every_page() {
    let requests = Arc::new(AtomicUsize::new(0));
    let base = paging_server(PagingFake {
        total: 250,
        honor_page: true,
        requests: Arc::clone(&requests),
    })
    .await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, None), FetchConfig::default()).unwrap();
    let utxos = client.utxos(ADDRESS).await.data.unwrap();
    assert_eq!(utxos.len(), 250);
    assert_eq!(requests.load(Ordering::SeqCst), 3);
    let value = client.utxo_balance(ADDRESS).await.data.unwrap();
    assert_eq!(value.lovelace, BigUint::from(250_000_000u32));
}

#[tokio::test]
async fn blockfrost_stops_when_paging_is_ignored() {
    let requests = Arc::new(AtomicUsize::new(0));
    let base = paging_server(PagingFake {
        total: 100,
        honor_page: false,
        requests: Arc::clone(&requests),
    })
    .await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, None), FetchConfig::default()).unwrap();
    let state = tokio::time::timeout(std::time::Duration::from_secs(10), client.utxos(ADDRESS))
        .await
        .expect("paging loop did not terminate");
    assert_eq!(state.data.unwrap().len(), 100);
    assert_eq!(requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn blockfrost_upstream_error_keeps_status_and_body() {
    let base = blockfrost_server().await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, Some(PROJECT_ID)), FetchConfig::default())
            .unwrap();
    let state = client.utxos("addr_test1_unknown").await;
    assert_eq!(state.status(), QueryStatus::Failed);
    let err = state.error.unwrap();
    assert_eq!(err.status(), Some(404));
    assert!(err.to_string().contains("The requested component has not been found."));
}

#[tokio::test]
async fn blockfrost_missing_credential_is_forbidden() {
    let base = blockfrost_server().await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, None), FetchConfig::default()).unwrap();
    let state = client.protocol_parameters().await;
    assert_eq!(
        state.error,
        Some(QueryError::UpstreamHttp {
            status: 403,
            body: "Invalid project token.".into()
        })
    );
}

#[tokio::test]
async fn blockfrost_rejects_balance_summary() {
    let base = blockfrost_server().await;
    let client =
        QueryClient::from_config(&blockfrost_config(base, Some(PROJECT_ID)), FetchConfig::default())
            .unwrap();
    let state = client.balance_summary(&[ADDRESS.to_string()]).await;
    assert!(matches!(state.error, Some(QueryError::MisconfiguredBackend(_))));
}

#[tokio::test]
async fn graphql_queries() {
    let base = graphql_server().await;
    let client =
        QueryClient::from_config(&graphql_config(format!("{base}/graphql")), FetchConfig::default())
            .unwrap();
    assert_eq!(client.backend(), Backend::GraphQl);

    let value = client.utxo_balance("addr1q9").await.data.unwrap();
    assert_eq!(value.lovelace, BigUint::from(4_000_000u32));

    let addresses = vec!["addr1q9".to_string(), "addr1vx".to_string()];
    let summary = client.balance_summary(&addresses).await.data.unwrap();
    assert_eq!(summary.lovelace, BigUint::from(5_000_000u32));
    assert!(summary.assets.keys().all(|k| k.as_str() != "ada"));

    let params = client.protocol_parameters().await.data.unwrap();
    assert_eq!(params.coins_per_utxo_word, Some(34482));
    assert_eq!(params.max_val_size, "5000");
}

#[tokio::test]
async fn graphql_error_envelope_fails_query() {
    let base = graphql_server().await;
    let client =
        QueryClient::from_config(&graphql_config(format!("{base}/broken")), FetchConfig::default())
            .unwrap();
    let state = client.utxos("addr1q9").await;
    assert!(matches!(state.error, Some(QueryError::GraphQl(ref m)) if m.contains("Cannot query field")));
}

#[tokio::test]
async fn unreachable_indexer_is_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = QueryClient::from_config(
        &graphql_config(format!("http://{addr}/graphql")),
        FetchConfig::default(),
    )
    .unwrap();
    let state = client.protocol_parameters().await;
    assert!(matches!(state.error, Some(QueryError::Network(_))));
}
