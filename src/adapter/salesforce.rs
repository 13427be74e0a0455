//! Salesforce adapter (REST sObject API + SOQL)

use super::result::{ConnectionStatus, OperationResult};
use super::shared::{array_at, bool_at, encode_id, parse_method, run_query, str_at, AdapterCore};
use super::SystemAdapter;
use crate::config::ConnectionProfile;
use crate::error::Result;
use crate::http::RequestConfig;
use crate::query::{QuerySpec, SoqlTranslator, VendorQuery};
use crate::schema::{EntitySchema, FieldInfo};
use crate::types::{JsonValue, Method, SystemKind};
use async_trait::async_trait;
use serde_json::json;

/// API version used when the profile does not set one
pub const DEFAULT_API_VERSION: &str = "v59.0";

#[derive(Debug)]
pub struct SalesforceAdapter {
    core: AdapterCore,
    api_base: String,
}

impl SalesforceAdapter {
    pub fn new(profile: &ConnectionProfile) -> Self {
        let version = profile
            .options
            .api_version
            .as_deref()
            .unwrap_or(DEFAULT_API_VERSION);
        Self {
            core: AdapterCore::new(profile, &[]),
            api_base: format!("/services/data/{version}"),
        }
    }

    fn sobject_path(&self, entity: &str) -> String {
        format!("{}/sobjects/{entity}", self.api_base)
    }

    fn record_path(&self, entity: &str, id: &str) -> String {
        format!("{}/{}", self.sobject_path(entity), encode_id(id))
    }

    async fn fetch_page(&self, query: VendorQuery) -> Result<OperationResult> {
        let soql = query.rendered();
        let body = self
            .core
            .get_json(
                &format!("{}/query", self.api_base),
                RequestConfig::new().query("q", soql.as_str()),
            )
            .await?;

        let records: Vec<JsonValue> = array_at(&body, "records")
            .into_iter()
            .map(strip_attributes)
            .collect();
        let done = bool_at(&body, "done", true);

        Ok(OperationResult::success(records)
            .with_metadata("query", soql)
            .with_metadata("total_count", body.get("totalSize").cloned().unwrap_or_default())
            .with_metadata("has_more", !done)
            .with_metadata("done", done)
            .with_metadata(
                "next_url",
                body.get("nextRecordsUrl").cloned().unwrap_or_default(),
            ))
    }

    async fn fetch_record(&self, entity: &str, id: &str) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(&self.record_path(entity, id), RequestConfig::new())
            .await?;
        Ok(OperationResult::success(strip_attributes(body)))
    }

    async fn insert_record(&self, entity: &str, data: JsonValue) -> Result<OperationResult> {
        let response = self
            .core
            .send_ok(
                Method::POST,
                &self.sobject_path(entity),
                RequestConfig::new().json(data),
            )
            .await?;
        let body = response.json_or_text();

        if !bool_at(&body, "success", true) {
            let errors = body.get("errors").cloned().unwrap_or_default();
            return Ok(OperationResult::failure(format!("Salesforce rejected the record: {errors}"))
                .with_metadata("errors", errors));
        }

        let id = body.get("id").cloned().unwrap_or_default();
        Ok(OperationResult::success(json!({ "id": id })).with_message("Record created"))
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

    async fn sobjects(&self) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(&format!("{}/sobjects", self.api_base), RequestConfig::new())
            .await?;
        let entities: Vec<JsonValue> = array_at(&body, "sobjects")
            .iter()
            .map(|obj| {
                let name = str_at(obj, "name", "");
                json!({
                    "name": name,
                    "label": str_at(obj, "label", name),
                    "queryable": bool_at(obj, "queryable", false),
                    "createable": bool_at(obj, "createable", false),
                })
            })
            .collect();
        Ok(OperationResult::success(entities))
    }

    async fn describe(&self, entity: &str) -> Result<OperationResult> {
        let body = self
            .core
            .get_json(
                &format!("{}/describe", self.sobject_path(entity)),
                RequestConfig::new(),
            )
            .await?;

        let mut schema = EntitySchema::new(str_at(&body, "name", entity));
        schema.label = str_at(&body, "label", entity).to_string();
        schema.description = str_at(&body, "labelPlural", "").to_string();
        schema.fields = array_at(&body, "fields").iter().map(describe_field).collect();
        Ok(OperationResult::success(schema.to_value()))
    }
}

fn describe_field(field: &JsonValue) -> FieldInfo {
    let name = str_at(field, "name", "");
    let reference_to = field
        .get("referenceTo")
        .and_then(JsonValue::as_array)
        .and_then(|targets| targets.first())
        .and_then(JsonValue::as_str)
        .map(str::to_string);
    let picklist: Vec<String> = array_at(field, "picklistValues")
        .iter()
        .filter(|pv| bool_at(pv, "active", false))
        .filter_map(|pv| pv.get("value").and_then(JsonValue::as_str))
        .map(str::to_string)
        .collect();

    FieldInfo::new(name, str_at(field, "type", "string"))
        .label(str_at(field, "label", name))
        .required(!bool_at(field, "nillable", true) && bool_at(field, "createable", true))
        .read_only(!bool_at(field, "updateable", true))
        .reference_to(reference_to)
        .picklist_values(picklist)
        .description(str_at(field, "inlineHelpText", ""))
}

/// Drop the per-record `attributes` block Salesforce adds
fn strip_attributes(mut record: JsonValue) -> JsonValue {
    if let Some(map) = record.as_object_mut() {
        map.remove("attributes");
    }
    record
}

#[async_trait]
impl SystemAdapter for SalesforceAdapter {
    fn system(&self) -> SystemKind {
        SystemKind::Salesforce
    }

    fn status(&self) -> ConnectionStatus {
        self.core.status()
    }

    async fn connect(&self) -> OperationResult {
        self.core.connect(&self.api_base).await
    }

    async fn disconnect(&self) -> OperationResult {
        self.core.disconnect().await
    }

    async fn health_check(&self) -> OperationResult {
        self.core
            .health_check(&format!("{}/limits", self.api_base))
            .await
    }

    async fn query(&self, spec: &QuerySpec) -> OperationResult {
        run_query(&SoqlTranslator, spec, |query| self.fetch_page(query)).await
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
        OperationResult::from_outcome(self.sobjects().await)
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
