//! Full gateway tests with a mock CRUD service

use axum::body::Body;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::Response;
use clinica_gate::access_control::AccessResolver;
use clinica_gate::auth::create_identity_provider;
use clinica_gate::config::{AuthConfig, ServerConfig, UpstreamConfig};
use clinica_gate::server::{AppState, build_router};
use clinica_gate::upstream::UpstreamClient;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a gateway pointing to the mock server
fn create_test_app(upstream_url: &str) -> axum::Router {
    create_app_with(UpstreamConfig {
        url: upstream_url.to_string(),
        ..Default::default()
    })
}

fn create_app_with(upstream: UpstreamConfig) -> axum::Router {
    let state = AppState {
        resolver: AccessResolver::clinical_default(),
        upstream: Arc::new(UpstreamClient::new(&upstream).unwrap()),
        identity: create_identity_provider(&AuthConfig::default()).unwrap(),
    };
    build_router(state, &ServerConfig::default())
}

fn request(method: &str, uri: &str, role: Option<&str>) -> Request {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("x-user-role", role).header("x-user-id", "42");
    }
    builder.body(Body::empty()).unwrap()
}

async fn read_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_needs_no_identity() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri());

    let response = app.oneshot(request("GET", "/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ok");
}

// =============================================================================
// Introspection
// =============================================================================

#[tokio::test]
async fn test_permissions_for_enfermera() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri());

    let response = app
        .oneshot(request("GET", "/api/v1/user/permissions", Some("enfermera")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["user_type"], "enfermera");
    assert_eq!(body["permissions"].as_array().unwrap().len(), 5);
    assert_eq!(
        body["permissions"][1],
        json!({ "Resource": "consultas", "Actions": ["read", "create", "update"] })
    );
}

#[tokio::test]
async fn test_permissions_for_unknown_role_is_empty() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri());

    let response = app
        .oneshot(request("GET", "/api/v1/user/permissions", Some("visitante")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({ "user_type": "visitante", "permissions": [] })
    );
}

#[tokio::test]
async fn test_permissions_need_identity() {
    let mock_server = MockServer::start().await;
    let app = create_test_app(&mock_server.uri());

    let response = app
        .oneshot(request("GET", "/api/v1/user/permissions", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(response).await, json!({ "error": "Tipo de usuario no válido" }));
}

#[tokio::test]
async fn test_permissions_path_follows_prefix() {
    let mock_server = MockServer::start().await;
    let state = AppState {
        resolver: AccessResolver::clinical_default(),
        upstream: Arc::new(
            UpstreamClient::new(&UpstreamConfig {
                url: mock_server.uri(),
                ..Default::default()
            })
            .unwrap(),
        ),
        identity: create_identity_provider(&AuthConfig::default()).unwrap(),
    };
    let server = ServerConfig {
        api_prefix: "/clinica/".to_string(),
        ..Default::default()
    };
    let app = build_router(state, &server);

    let response = app
        .oneshot(request("GET", "/clinica/user/permissions", Some("admin")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["permissions"][6]["Resource"], "logs");
}

// =============================================================================
// Relaying
// =============================================================================

#[tokio::test]
async fn test_allowed_request_relayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/recetas"))
        .and(query_param("paciente_id", "42"))
        .and(header("x-user-role", "paciente"))
        .and(header("x-user-id", "42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "medicamento": "paracetamol" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request(
            "GET",
            "/api/v1/recetas?paciente_id=42",
            Some("paciente"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body[0]["medicamento"], "paracetamol");
}

#[tokio::test]
async fn test_request_body_relayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/consultas"))
        .and(body_json(json!({ "paciente_id": 5, "motivo": "control" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 99 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/consultas")
        .header("x-user-role", "medico")
        .header("x-user-id", "7")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"paciente_id":5,"motivo":"control"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(read_json(response).await["id"], 99);
}

#[tokio::test]
async fn test_denied_request_never_reaches_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("DELETE", "/api/v1/recetas/3", Some("paciente")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        read_json(response).await["details"],
        json!({ "user_type": "paciente", "resource": "recetas", "action": "delete" })
    );
}

#[tokio::test]
async fn test_anonymous_request_never_reaches_service() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("GET", "/api/v1/reportes", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ungoverned_route_relayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/reportes/mensual"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "total": 12 })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("GET", "/api/v1/reportes/mensual", Some("paciente")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["total"], 12);
}

#[tokio::test]
async fn test_downstream_status_relayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/expedientes/404"))
        .respond_with(
            ResponseTemplate::new(404)
                .insert_header("x-request-id", "abc-123")
                .set_body_json(json!({ "error": "Expediente no encontrado" })),
        )
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("GET", "/api/v1/expedientes/404", Some("medico")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(
        read_json(response).await["error"],
        "Expediente no encontrado"
    );
}

#[tokio::test]
async fn test_unreachable_service_is_bad_gateway() {
    // Nothing listens on port 1
    let app = create_test_app("http://127.0.0.1:1");

    let response = app
        .oneshot(request("GET", "/api/v1/consultas", Some("medico")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(
        read_json(response).await,
        json!({ "error": "Servicio no disponible" })
    );
}

#[tokio::test]
async fn test_slow_service_is_gateway_timeout() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/horarios"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let app = create_app_with(UpstreamConfig {
        url: mock_server.uri(),
        timeout_secs: 1,
        ..Default::default()
    });
    let response = app
        .oneshot(request("GET", "/api/v1/horarios", Some("admin")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

// =============================================================================
// Path Traversal
// =============================================================================

#[tokio::test]
async fn test_dot_segments_cannot_switch_resource() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());

    // medico may delete recetas but has no rule for usuarios
    for uri in [
        "/api/v1/recetas/../usuarios/5",
        "/api/v1/recetas/%2e%2e/usuarios/5",
        "/api/v1/recetas/.%2E/usuarios/5",
        "/api/v1/./usuarios/5",
    ] {
        let response = app
            .clone()
            .oneshot(request("DELETE", uri, Some("medico")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(
            read_json(response).await,
            json!({ "error": "Ruta de solicitud no válida" }),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_dot_segments_rejected_on_ungoverned_route() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("GET", "/api/v1/reportes/../logs", Some("paciente")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dotted_file_names_still_relayed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/recetas/receta.v2.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let app = create_test_app(&mock_server.uri());
    let response = app
        .oneshot(request("GET", "/api/v1/recetas/receta.v2.pdf", Some("paciente")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
