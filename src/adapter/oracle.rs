//! Oracle Fusion Cloud adapter (REST resources with finder queries)

use super::result::{ConnectionStatus, OperationResult};
use super::shared::{array_at, bool_at, encode_id, parse_method, run_query, str_at, AdapterCore};
use super::SystemAdapter;
use crate::config::ConnectionProfile;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::query::{FinderTranslator, QuerySpec, VendorQuery};
use crate::schema::{EntitySchema, FieldInfo};
use crate::types::{JsonValue, Method, SystemKind};
use async_trait::async_trait;
use serde_json::json;

/// Resource version used when the profile does not set one
pub const DEFAULT_API_VERSION: &str = "v1";

#[derive(Debug)]
pub struct OracleAdapter {
    core: AdapterCore,
    rest_base: String,
}

impl OracleAdapter {
    pub fn new(profile: &ConnectionProfile) -> Self {
        let version = profile
            .options
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION);
        Self {
            core: AdapterCore::new(profile, &[("REST-Framework-Version", "4")]),
            rest_base: format!("/fscmRestApi/resources/{version}"),
        }
    }

    fn resource_path(&self, entity: &str) -> String {
        format!("{}/{entity}", self.rest_base)
    }

    fn record_path(&self, entity: &str, id: &str) -> String {
        format!("{}/{}", self.resource_path(entity), encode_id(id))
    }

    async fn fetch_page(&self, entity: &str, query: VendorQuery) -> Result<OperationResult> {
        let request = RequestConfig::new().query_pairs(query.params().iter().cloned());
        let body = self
            .core
            .get_json(&self.resource_path(entity), request)
            .await?;

        Ok(OperationResult::success(array_at(&body, "items"))
            .with_metadata("query", query.rendered())
            .with_metadata(
                "total_count",
                body.get("totalResults").cloned().unwrap_or_default(),
            )
            .with_metadata("has_more", bool_at(&body, "hasMore", false))
            .with_metadata("entity", entity))
    }

    async fn fetch_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(&self.record_path(entity, id), RequestConfig::new())
            .await?;
        Ok(OperationResult::success(body))
    }

    async fn insert_record(&self, entity: &str, data: JsonValue) -> Result<OperationResult> {
        let response = self
            .core
            .send_ok(
                Method::POST,
                &self.resource_path(entity),
                RequestConfig::new().json(data),
            )
            .await?;
        Ok(OperationResult::success(response.json_or_text()).with_message("Record created"))
    }

    async fn patch_record(&self, entity: &str, id: &str, data: JsonValue) -> Result<OperationResult> {
        self.core
            .send_ok(
                Method::PATCH,
                &self.record_path(entity, id),
                RequestConfig::new().json(data),
            )
            .await?;
        Ok(OperationResult::ok().with_message("Record updated"))
    }

    async fn remove_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        self.core
            .send_ok(Method::DELETE, &self.record_path(entity, id), RequestConfig::new())
            .await?;
        Ok(OperationResult::ok().with_message("Record deleted"))
    }

    async fn resources(&self) -> Result<OperationResult> {
        let body = self.core.get_json(&self.rest_base, RequestConfig::new()).await?;
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
        let body = self
            .core
            .get_json(
                &format!("{}/describe", self.resource_path(entity)),
                RequestConfig::new(),
            )
            .await?;

        let resource = describe_resource(&body, entity);
        let fields: Vec<FieldInfo> = array_at(resource, "attributes")
            .iter()
            .map(describe_attribute)
            .collect();
        let key_field = resource
            .get("primaryKey")
            .or_else(|| body.get("primaryKey"))
            .and_then(JsonValue::as_array)
            .and_then(|keys| keys.first())
            .and_then(JsonValue::as_str)
            .map(str::to_string)
            .or_else(|| fields.first().map(|f| f.name.clone()));

        let mut schema = EntitySchema::new(entity);
        schema.label = str_at(resource, "title", str_at(&body, "title", entity)).to_string();
        schema.description = str_at(resource, "description", "").to_string();
        if let Some(key_field) = key_field {
            schema.key_field = key_field;
        }
        schema.fields = fields;
        Ok(OperationResult::success(schema.to_value()))
    }
}

/// The describe payload nests attributes under `Resources.{entity}`; older
/// versions put them at the top level.
fn describe_resource<'a>(body: &'a JsonValue, entity: &str) -> &'a JsonValue {
    let Some(resources) = body.get("Resources").and_then(JsonValue::as_object) else {
        return body;
    };
    resources
        .get(entity)
        .or_else(|| resources.values().next())
        .filter(|resource| resource.get("attributes").is_some())
        .unwrap_or(body)
}

fn describe_attribute(attr: &JsonValue) -> FieldInfo {
    let name = str_at(attr, "name", "");
    let required = bool_at(attr, "mandatory", false) || bool_at(attr, "required", false);
    let description = attr
        .pointer("/annotations/description")
        .and_then(JsonValue::as_str)
        .unwrap_or_default();

    FieldInfo::new(name, str_at(attr, "type", "string"))
        .label(str_at(attr, "title", name))
        .required(required)
        .read_only(!bool_at(attr, "updatable", true))
        .description(description)
}

#[async_trait]
impl SystemAdapter for OracleAdapter {
    fn system(&self) -> SystemKind {
        SystemKind::Oracle
    }

    fn status(&self) -> ConnectionStatus {
        self.core.status()
    }

    async fn connect(&self) -> OperationResult {
        self.core.connect(&self.rest_base).await
    }

    async fn disconnect(&self) -> OperationResult {
        self.core.disconnect().await
    }

    async fn health_check(&self) -> OperationResult {
        self.core.health_check(&self.rest_base).await
    }

    async fn query(&self, spec: &QuerySpec) -> OperationResult {
        run_query(&FinderTranslator, spec, |query| {
            self.fetch_page(&spec.entity, query)
        })
        .await
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
        OperationResult::from_outcome(self.resources().await)
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
