//! HTTP and stdio front-ends for the tool catalogue

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::adapter::OperationResult;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::tools::{dispatch, tool_definitions};

/// Response wrapper for the catalogue endpoints
#[derive(Debug, Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// One stdio request line
#[derive(Debug, Deserialize)]
struct ToolCall {
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// Routes over a shared session
pub fn router(session: Arc<Session>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(list_tools))
        .route("/connections", get(list_connections))
        .route("/tools/:name", post(call_tool))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(session)
}

/// Start the HTTP server
pub async fn serve(session: Arc<Session>, port: u16) -> Result<()> {
    let app = router(Arc::clone(&session));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    session.shutdown().await;
    Ok(())
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_tools() -> impl IntoResponse {
    Json(ApiResponse::success(tool_definitions()))
}

async fn list_connections(State(session): State<Arc<Session>>) -> impl IntoResponse {
    Json(ApiResponse::success(session.describe_profiles().await))
}

async fn call_tool(
    State(session): State<Arc<Session>>,
    Path(name): Path<String>,
    arguments: Option<Json<Value>>,
) -> impl IntoResponse {
    let arguments = arguments.map_or(Value::Null, |Json(value)| value);
    let result = dispatch(&session, &name, arguments).await;
    Json(result.to_value())
}

// ============================================================================
// Stdio
// ============================================================================

/// Answer one `{"tool", "arguments"}` line
pub async fn handle_line(session: &Session, line: &str) -> OperationResult {
    match serde_json::from_str::<ToolCall>(line) {
        Ok(call) => dispatch(session, &call.tool, call.arguments).await,
        Err(e) => OperationResult::failure(format!("Invalid request line: {e}")),
    }
}

/// Read tool calls from stdin until EOF, one JSON result line per call
pub async fn serve_stdio(session: Arc<Session>) -> Result<()> {
    tracing::info!("Serving tool calls on stdio");
    let stdin = BufReader::new(tokio::io::stdin());
    let outcome = run_lines(&session, stdin, tokio::io::stdout()).await;
    session.shutdown().await;
    outcome
}

async fn run_lines<R, W>(session: &Session, reader: R, mut writer: W) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let result = handle_line(session, &line).await;
        let mut out = serde_json::to_vec(&result.to_value())?;
        out.push(b'\n');
        writer.write_all(&out).await?;
        writer.flush().await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn session() -> Arc<Session> {
        Arc::new(Session::new(BridgeConfig::default()))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = router(session())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_tools_endpoint_lists_catalogue() {
        let response = router(session())
            .oneshot(Request::get("/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"].as_array().map(Vec::len), Some(17));
    }

    #[tokio::test]
    async fn test_call_unknown_tool() {
        let request = Request::post("/tools/enterprise_nope")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = router(session()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn test_stdio_lines() {
        let input = b"{\"tool\": \"enterprise_list_connections\"}\n\nnot json\n".as_slice();
        let mut output = Vec::new();
        run_lines(&session(), input, &mut output).await.unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["success"], json!(true));
        assert_eq!(lines[0]["data"], json!([]));
        assert_eq!(lines[1]["success"], json!(false));
        assert!(lines[1]["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request line"));
    }
}
