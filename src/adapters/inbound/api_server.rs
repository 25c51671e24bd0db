//! Reporting API Server
//!
//! Exposes the connection counter over HTTP: read-only snapshots,
//! snapshot-and-reset, and the endpoint-set update feed used by the
//! upstream discovery pipeline.

use crate::application::CounterService;
use crate::domain::entities::{EndpointSet, ServiceConnections};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tracked_services: usize,
}

/// Response to an endpoint-set update.
#[derive(Debug, Serialize)]
pub struct EndpointsUpdateResponse {
    pub registered_addresses: usize,
}

/// API server state.
#[derive(Clone)]
pub struct ApiState {
    /// Shared counter service backing all routes
    pub service: Arc<CounterService>,
}

/// API server for the reporting and endpoint-update boundaries.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, service: Arc<CounterService>) -> Self {
        Self {
            listen_addr,
            state: ApiState { service },
        }
    }

    /// Build the router. Exposed so tests can drive it in-process.
    pub fn router(&self) -> Router {
        Router::new()
            // Service banner
            .route("/", get(root_handler))
            // Health endpoint
            .route("/health", get(health_handler))
            // Read-only snapshot
            .route("/connections/count", get(connections_count_handler))
            // Snapshot, then reset the window
            .route("/connections", get(connections_and_reset_handler))
            // Full-replacement endpoint-set update
            .route("/endpoints", post(update_endpoints_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the API server.
    ///
    /// The final Ok(()) is excluded from coverage since axum::serve runs forever.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = self.router();

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("reporting API listening on {}", self.listen_addr);

        axum::serve(listener, app).await?;
        Ok(())
    }
}

// Handler functions

async fn root_handler() -> &'static str {
    "conntrack-agent connection counting service"
}

async fn health_handler(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tracked_services: state.service.counter().tracked_services(),
    })
}

async fn connections_count_handler(
    State(state): State<ApiState>,
) -> Json<Vec<ServiceConnections>> {
    Json(state.service.snapshot())
}

async fn connections_and_reset_handler(
    State(state): State<ApiState>,
) -> Json<Vec<ServiceConnections>> {
    // Build the document first; the reset happens after.
    Json(state.service.snapshot_and_reset())
}

async fn update_endpoints_handler(
    State(state): State<ApiState>,
    Json(endpoint_sets): Json<Vec<EndpointSet>>,
) -> Json<EndpointsUpdateResponse> {
    let registered = state.service.on_endpoints_update(&endpoint_sets).await;

    tracing::info!(
        "endpoint update applied: {} sets, {} addresses",
        endpoint_sets.len(),
        registered
    );
    Json(EndpointsUpdateResponse {
        registered_addresses: registered,
    })
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::adapters::outbound::StaticConntrackSource;
    use crate::domain::entities::TcpConnection;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_server(connections: Vec<TcpConnection>) -> (ApiServer, Arc<CounterService>) {
        let source = Arc::new(StaticConntrackSource::new(connections));
        let service = Arc::new(CounterService::new(source));
        let server = ApiServer::new("127.0.0.1:0".to_string(), service.clone());
        (server, service)
    }

    fn endpoints_body() -> String {
        serde_json::json!([
            {
                "service": {"namespace": "default", "name": "svc-x"},
                "subsets": [{"addresses": ["10.0.0.1"]}]
            },
            {
                "service": {"namespace": "default", "name": "svc-y"},
                "subsets": [{"addresses": ["10.0.0.2"]}]
            }
        ])
        .to_string()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root_handler() {
        let (server, _) = test_server(vec![]);

        let response = server
            .router()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let (server, _) = test_server(vec![]);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["tracked_services"], 0);
    }

    #[tokio::test]
    async fn test_update_endpoints_registers_addresses() {
        let (server, _) = test_server(vec![]);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/endpoints")
                    .header("content-type", "application/json")
                    .body(Body::from(endpoints_body()))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["registered_addresses"], 2);
    }

    #[tokio::test]
    async fn test_update_endpoints_rejects_malformed_body() {
        let (server, _) = test_server(vec![]);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/endpoints")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_connections_count_empty_before_first_reset() {
        let (server, service) = test_server(vec![TcpConnection::new("10.0.0.1", "10.0.0.2")]);

        // Endpoints registered and synced, but no reset has happened yet.
        let update = Request::builder()
            .method("POST")
            .uri("/endpoints")
            .header("content-type", "application/json")
            .body(Body::from(endpoints_body()))
            .unwrap();
        server.router().oneshot(update).await.unwrap();
        assert_eq!(service.counter().registered_addresses(), 2);

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/connections/count")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_connections_count_reports_counts() {
        let (server, service) = test_server(vec![TcpConnection::new("10.0.0.1", "10.0.0.2")]);
        service.counter().reset();

        let update = Request::builder()
            .method("POST")
            .uri("/endpoints")
            .header("content-type", "application/json")
            .body(Body::from(endpoints_body()))
            .unwrap();
        server.router().oneshot(update).await.unwrap();

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/connections/count")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let json = body_json(response).await;
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 2);

        let svc_x = records
            .iter()
            .find(|r| r["serviceID"] == "default/svc-x")
            .unwrap();
        assert_eq!(svc_x["endpointAbs"]["10.0.0.1"], 1);
    }

    #[tokio::test]
    async fn test_connections_resets_after_reporting() {
        let (server, service) = test_server(vec![TcpConnection::new("10.0.0.1", "10.0.0.2")]);
        service.counter().reset();

        let update = Request::builder()
            .method("POST")
            .uri("/endpoints")
            .header("content-type", "application/json")
            .body(Body::from(endpoints_body()))
            .unwrap();
        server.router().oneshot(update).await.unwrap();

        // First read returns the counts and resets the window.
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/connections")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json.as_array().unwrap().len(), 2);

        // Second read sees the cleared table.
        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/connections")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(body_json(response).await, serde_json::json!([]));
    }
}
