//! SAP S/4HANA / ECC adapter (OData v2 over the Gateway)

use super::odata_metadata::parse_metadata;
use super::result::{ConnectionStatus, OperationResult};
use super::shared::{array_at, count_value, encode_id, parse_method, run_query, AdapterCore};
use super::SystemAdapter;
use crate::config::ConnectionProfile;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::query::{ODataTranslator, QuerySpec, VendorQuery};
use crate::types::{JsonValue, Method, SystemKind};
use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;

/// Gateway service root
const SERVICE_ROOT: &str = "/sap/opu/odata/sap/";

const CSRF_HEADER: &str = "X-CSRF-Token";

/// OData v2 adapter. Mutating calls carry an `X-CSRF-Token` fetched once per connection.
#[derive(Debug)]
pub struct SapAdapter {
    core: AdapterCore,
    csrf_token: Mutex<Option<String>>,
}

impl SapAdapter {
    pub fn new(profile: &ConnectionProfile) -> Self {
        Self {
            core: AdapterCore::new(profile, &[]),
            csrf_token: Mutex::new(None),
        }
    }

    fn collection_path(entity: &str) -> String {
        format!("{SERVICE_ROOT}{}", entity.trim_start_matches('/'))
    }

    fn record_path(entity: &str, id: &str) -> String {
        format!("{}('{}')", Self::collection_path(entity), encode_id(id))
    }

    fn json_format() -> RequestConfig {
        RequestConfig::new().query("$format", "json")
    }

    /// CSRF token for mutating calls, fetched on first use.
    ///
    /// An empty token is not cached, so the next write asks again.
    async fn csrf_token(&self) -> Result<Option<String>> {
        let mut slot = self.csrf_token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(Some(token.clone()));
        }

        debug!("Fetching SAP CSRF token");
        let response = self
            .core
            .send(
                Method::GET,
                "/",
                RequestConfig::new().header(CSRF_HEADER, "Fetch"),
            )
            .await?;
        let token = response
            .header(CSRF_HEADER)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        *slot = token.clone();
        Ok(token)
    }

    async fn clear_csrf(&self) {
        *self.csrf_token.lock().await = None;
    }

    async fn csrf_request(&self, request: RequestConfig) -> Result<RequestConfig> {
        Ok(match self.csrf_token().await? {
            Some(token) => request.header(CSRF_HEADER, token),
            None => request,
        })
    }

    async fn fetch_page(&self, spec: &QuerySpec, query: VendorQuery) -> Result<OperationResult> {
        let request = Self::json_format().query_pairs(query.params().iter().cloned());
        let body = self
            .core
            .get_json(&Self::collection_path(&spec.entity), request)
            .await?;

        let d = body.get("d").cloned().unwrap_or(JsonValue::Null);
        let rows = match &d {
            JsonValue::Array(rows) => rows.clone(),
            other => array_at(other, "results"),
        };
        let total = count_value(d.get("__count"));
        let has_more = total
            .as_u64()
            .is_some_and(|total| u64::from(spec.offset) + (rows.len() as u64) < total);

        Ok(OperationResult::success(rows)
            .with_metadata("query", query.rendered())
            .with_metadata("total_count", total)
            .with_metadata("has_more", has_more)
            .with_metadata("entity", spec.entity.as_str()))
    }

    async fn fetch_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(&Self::record_path(entity, id), Self::json_format())
            .await?;
        Ok(OperationResult::success(unwrap_d(body)))
    }

    async fn insert_record(&self, entity: &str, data: JsonValue) -> Result<OperationResult> {
        let request = self.csrf_request(Self::json_format().json(data)).await?;
        let response = self
            .core
            .send_ok(Method::POST, &Self::collection_path(entity), request)
            .await?;
        Ok(OperationResult::success(unwrap_d(response.json_or_text()))
            .with_message("Record created"))
    }

    async fn patch_record(&self, entity: &str, id: &str, data: JsonValue) -> Result<OperationResult> {
        let request = self.csrf_request(Self::json_format().json(data)).await?;
        self.core
            .send_ok(Method::PATCH, &Self::record_path(entity, id), request)
            .await?;
        Ok(OperationResult::ok().with_message("Record updated"))
    }

    async fn remove_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        let request = self.csrf_request(RequestConfig::new()).await?;
        self.core
            .send_ok(Method::DELETE, &Self::record_path(entity, id), request)
            .await?;
        Ok(OperationResult::ok().with_message("Record deleted"))
    }

    async fn entity_sets(&self) -> Result<OperationResult> {
        let body = self.core.get_json(SERVICE_ROOT, Self::json_format()).await?;
        let sets: Vec<JsonValue> = body
            .pointer("/d/EntitySets")
            .and_then(JsonValue::as_array)
            .map(|sets| {
                sets.iter()
                    .filter_map(JsonValue::as_str)
                    .map(|name| json!({ "name": name }))
                    .collect()
            })
            .unwrap_or_default();
        Ok(OperationResult::success(sets))
    }

    async fn metadata(&self, entity: &str) -> Result<OperationResult> {
        let path = format!("{}/$metadata", Self::collection_path(entity));
        let response = self
            .core
            .send_ok(
                Method::GET,
                &path,
                RequestConfig::new().header("Accept", "application/xml"),
            )
            .await?;
        let schema = parse_metadata(response.text(), entity)?;
        Ok(OperationResult::success(schema.to_value()))
    }

    async fn passthrough(
        &self,
        method: Method,
        path: &str,
        body: Option<JsonValue>,
    ) -> Result<OperationResult> {
        let mut headers = Vec::new();
        if method.is_mutating() {
            if let Some(token) = self.csrf_token().await? {
                headers.push((CSRF_HEADER.to_string(), token));
            }
        }
        self.core.raw(method, path, body, headers).await
    }
}

/// OData v2 wraps payloads in `{"d": ...}`
fn unwrap_d(body: JsonValue) -> JsonValue {
    match body {
        JsonValue::Object(mut map) if map.contains_key("d") => {
            map.remove("d").unwrap_or(JsonValue::Null)
        }
        other => other,
    }
}

#[async_trait]
impl SystemAdapter for SapAdapter {
    fn system(&self) -> SystemKind {
        SystemKind::Sap
    }

    fn status(&self) -> ConnectionStatus {
        self.core.status()
    }

    async fn connect(&self) -> OperationResult {
        self.clear_csrf().await;
        self.core.connect(SERVICE_ROOT).await
    }

    async fn disconnect(&self) -> OperationResult {
        self.clear_csrf().await;
        self.core.disconnect().await
    }

    async fn health_check(&self) -> OperationResult {
        self.core.health_check(SERVICE_ROOT).await
    }

    async fn query(&self, spec: &QuerySpec) -> OperationResult {
        run_query(&ODataTranslator, spec, |query| self.fetch_page(spec, query)).await
    }

    async fn get_record(&self, entity: &str, id: &str) -> OperationResult {
        OperationResult::from_outcome(self.fetch_record(entity, id).await)
    }

    async fn create_record(&self, entity: &str, data: JsonValue) -> OperationResult {
        OperationResult::from_outcome(self.insert_record(entity, data).await)
    }

    async fn update_record(&self, entity: &str, id: &str, data: JsonValue) -> OperationResult {
        OperationResult::from_outcome(self.patch_record(entity, id, data).await)
    }

    async fn delete_record(&self, entity: &str, id: &str) -> OperationResult {
        OperationResult::from_outcome(self.remove_record(entity, id).await)
    }

    async fn list_entities(&self) -> OperationResult {
        OperationResult::from_outcome(self.entity_sets().await)
    }

    async fn describe_entity(&self, entity: &str) -> OperationResult {
        OperationResult::from_outcome(self.metadata(entity).await)
    }

    async fn execute_raw(&self, method: &str, path: &str, body: Option<JsonValue>) -> OperationResult {
        let method = match parse_method(method) {
            Ok(method) => method,
            Err(failure) => return failure,
        };
        OperationResult::from_outcome(self.passthrough(method, path, body).await)
    }
}
