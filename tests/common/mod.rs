#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use std::sync::Arc;
use tower::ServiceExt;

use employee_registry::audit::{AuditStore, MemoryAuditStore};
use employee_registry::config::{AppConfig, AuditConfig, AuditFailurePolicy};
use employee_registry::database::Database;
use employee_registry::{router, AppState, EmployeeRegistry};

pub const AUDIT_TABLE: &str = "FuncionarioLog";

pub struct TestApp {
    pub router: Router,
    pub database: Database,
}

pub fn test_config(policy: AuditFailurePolicy) -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        audit: AuditConfig {
            connection_string: "sqlite::memory:".to_string(),
            table_name: AUDIT_TABLE.to_string(),
            cache_table_ready: false,
            failure_policy: policy,
        },
    }
}

/// Router over an in-memory database and the given audit store.
pub async fn setup_app(
    audit: Arc<dyn AuditStore>,
    policy: AuditFailurePolicy,
) -> anyhow::Result<TestApp> {
    let database = Database::new_in_memory().await?;
    let registry = EmployeeRegistry::new(Arc::new(database.clone()), audit, policy);
    let router = router(AppState {
        config: test_config(policy),
        registry,
    });

    Ok(TestApp { router, database })
}

pub async fn setup_memory_app() -> anyhow::Result<(TestApp, Arc<MemoryAuditStore>)> {
    let audit = Arc::new(MemoryAuditStore::new());
    let app = setup_app(audit.clone(), AuditFailurePolicy::Propagate).await?;
    Ok((app, audit))
}

pub fn employee_json(name: &str, department: &str, salary: f64) -> serde_json::Value {
    serde_json::json!({
        "Nome": name,
        "DataAdmissao": "2024-01-15",
        "Salario": salary,
        "Departamento": department,
        "Ramal": "4321"
    })
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> TestResponse {
    send_raw(router, method, uri, body.map(|value| value.to_string())).await
}

/// Send a JSON content-typed request whose body is taken verbatim.
pub async fn send_raw(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<String>,
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(text) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(text)
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse {
        status,
        location,
        body,
    }
}
