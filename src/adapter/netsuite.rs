//! NetSuite adapter (REST record API + SuiteQL)

use super::result::{ConnectionStatus, OperationResult};
use super::shared::{array_at, bool_at, encode_id, parse_method, run_query, str_at, AdapterCore};
use super::SystemAdapter;
use crate::config::ConnectionProfile;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::query::{QuerySpec, SuiteQlTranslator, VendorQuery};
use crate::schema::{EntitySchema, FieldInfo};
use crate::types::{JsonValue, Method, SystemKind};
use async_trait::async_trait;
use serde_json::json;

const RECORD_BASE: &str = "/services/rest/record/v1";
const SUITEQL_PATH: &str = "/services/rest/query/v1/suiteql";

#[derive(Debug)]
pub struct NetSuiteAdapter {
    core: AdapterCore,
    account_id: Option<String>,
}

impl NetSuiteAdapter {
    pub fn new(profile: &ConnectionProfile) -> Self {
        Self {
            core: AdapterCore::new(profile, &[]),
            account_id: profile.options.account_id.clone(),
        }
    }

    /// Record types are addressed in lower case
    fn record_type_path(entity: &str) -> String {
        format!("{RECORD_BASE}/{}", entity.to_lowercase())
    }

    fn record_path(entity: &str, id: &str) -> String {
        format!("{}/{}", Self::record_type_path(entity), encode_id(id))
    }

    async fn fetch_page(&self, query: VendorQuery) -> Result<OperationResult> {
        let suiteql = query.rendered();
        let request = RequestConfig::new()
            .header("Prefer", "transient")
            .json(json!({ "q": suiteql }));
        let body: JsonValue = self
            .core
            .send_ok(Method::POST, SUITEQL_PATH, request)
            .await?
            .json()?;

        Ok(OperationResult::success(array_at(&body, "items"))
            .with_metadata("query", suiteql)
            .with_metadata(
                "total_count",
                body.get("totalResults").cloned().unwrap_or_default(),
            )
            .with_metadata("has_more", bool_at(&body, "hasMore", false)))
    }

    async fn fetch_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(&Self::record_path(entity, id), RequestConfig::new())
            .await?;
        Ok(OperationResult::success(body))
    }

    async fn insert_record(&self, entity: &str, data: JsonValue) -> Result<OperationResult> {
        let response = self
            .core
            .send_ok(
                Method::POST,
                &Self::record_type_path(entity),
                RequestConfig::new().json(data),
            )
            .await?;

        // New records are announced in Location: .../record/v1/customer/1234
        let id = match response.header("Location").and_then(trailing_segment) {
            Some(id) => JsonValue::from(id),
            None => response
                .json_or_text()
                .get("id")
                .cloned()
                .unwrap_or_default(),
        };
        Ok(OperationResult::success(json!({ "id": id })).with_message("Record created"))
    }

    async fn patch_record(&self, entity: &str, id: &str, data: JsonValue) -> Result<OperationResult> {
        self.core
            .send_ok(
                Method::PATCH,
                &Self::record_path(entity, id),
                RequestConfig::new().json(data),
            )
            .await?;
        Ok(OperationResult::ok().with_message("Record updated"))
    }

    async fn remove_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        self.core
            .send_ok(Method::DELETE, &Self::record_path(entity, id), RequestConfig::new())
            .await?;
        Ok(OperationResult::ok().with_message("Record deleted"))
    }

    async fn record_types(&self) -> Result<OperationResult> {
        let body = self.core.get_json(RECORD_BASE, RequestConfig::new()).await?;
        let entities: Vec<JsonValue> = array_at(&body, "items")
            .iter()
            .map(|item| {
                let name = str_at(item, "name", "");
                json!({ "name": name, "label": name })
            })
            .collect();
        Ok(OperationResult::success(entities))
    }

    async fn describe(&self, entity: &str) -> Result<OperationResult> {
        let path = format!("{RECORD_BASE}/metadata-catalog/{}", entity.to_lowercase());
        let body = self
            .core
            .get_json(
                &path,
                RequestConfig::new().header("Accept", "application/schema+json"),
            )
            .await?;

        let required: Vec<&str> = body
            .get("required")
            .and_then(JsonValue::as_array)
            .map(|names| names.iter().filter_map(JsonValue::as_str).collect())
            .unwrap_or_default();

        let fields: Vec<FieldInfo> = body
            .get("properties")
            .and_then(JsonValue::as_object)
            .map(|properties| {
                properties
                    .iter()
                    .map(|(name, prop)| {
                        FieldInfo::new(name.as_str(), str_at(prop, "type", "string"))
                            .label(str_at(prop, "title", name))
                            .required(required.contains(&name.as_str()))
                            .read_only(bool_at(prop, "readOnly", false))
                            .description(str_at(prop, "description", ""))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let mut schema = EntitySchema::new(entity);
        schema.label = str_at(&body, "title", entity).to_string();
        schema.description = str_at(&body, "description", "").to_string();
        schema.key_field = "id".to_string();
        schema.fields = fields;
        Ok(OperationResult::success(schema.to_value()))
    }
}

fn trailing_segment(location: &str) -> Option<&str> {
    location
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}

#[async_trait]
impl SystemAdapter for NetSuiteAdapter {
    fn system(&self) -> SystemKind {
        SystemKind::Netsuite
    }

    fn status(&self) -> ConnectionStatus {
        self.core.status()
    }

    async fn connect(&self) -> OperationResult {
        let result = self.core.connect(RECORD_BASE).await;
        match &self.account_id {
            Some(account) => result.with_metadata("account_id", account.as_str()),
            None => result,
        }
    }

    async fn disconnect(&self) -> OperationResult {
        self.core.disconnect().await
    }

    async fn health_check(&self) -> OperationResult {
        self.core.health_check(RECORD_BASE).await
    }

    async fn query(&self, spec: &QuerySpec) -> OperationResult {
        run_query(&SuiteQlTranslator, spec, |query| self.fetch_page(query)).await
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
        OperationResult::from_outcome(self.record_types().await)
    }

    async fn describe_entity(&self, entity: &str) -> OperationResult {
        OperationResult::from_outcome(self.describe(entity).await)
    }

    async fn execute_raw(&self, method: &str, path: &str, body: Option<JsonValue>) -> OperationResult {
        let method = match parse_method(method) {
            Ok(method) => method,
            Err(failure) => return failure,
        };
        OperationResult::from_outcome(self.core.raw(method, path, body, Vec::new()).await)
    }
}
