//! Tool catalogue and dispatch
//!
//! Each `enterprise_*` tool takes a JSON argument object, runs against a
//! [`Session`] connection and answers with an [`OperationResult`]. Lookup and
//! argument errors are folded into failed results as well.

use crate::adapter::OperationResult;
use crate::config::BridgeConfig;
use crate::error::{Error, Result};
use crate::query::{Filters, QuerySpec};
use crate::session::{Connection, Session};
use crate::types::JsonValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// One entry of the tool catalogue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonValue,
}

impl ToolDefinition {
    fn new(name: &'static str, description: &'static str, input_schema: JsonValue) -> Self {
        Self {
            name,
            description,
            input_schema,
        }
    }
}

// ============================================================================
// Catalogue
// ============================================================================

fn object_schema(properties: JsonValue, required: &[&str]) -> JsonValue {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn connection_prop() -> JsonValue {
    json!({ "type": "string", "description": "Connection profile name" })
}

fn entity_prop() -> JsonValue {
    json!({ "type": "string", "description": "Entity, object, record type or resource name" })
}

fn filters_prop() -> JsonValue {
    json!({
        "type": "object",
        "description": "Field filters. Suffix keys with __gt, __gte, __lt, __lte, __ne, \
                        __like, __in or __null to change the comparison"
    })
}

/// Every tool the bridge exposes, in catalogue order
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition::new(
            "enterprise_configure",
            "Load a configuration file and list its connection profiles. \
             Open connections are closed.",
            object_schema(
                json!({
                    "config_path": {
                        "type": "string",
                        "description": "Path to a YAML or JSON config; the default location when omitted"
                    }
                }),
                &[],
            ),
        ),
        ToolDefinition::new(
            "enterprise_list_connections",
            "List configured enterprise connections",
            object_schema(json!({}), &[]),
        ),
        ToolDefinition::new(
            "enterprise_connect",
            "Open a connection and verify credentials",
            object_schema(json!({ "connection": connection_prop() }), &["connection"]),
        ),
        ToolDefinition::new(
            "enterprise_list_entities",
            "List the entities a connection exposes",
            object_schema(json!({ "connection": connection_prop() }), &["connection"]),
        ),
        ToolDefinition::new(
            "enterprise_describe_entity",
            "Describe the fields of an entity",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "refresh": { "type": "boolean", "description": "Bypass the schema cache" }
                }),
                &["connection", "entity"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_search_fields",
            "Find fields of an entity by keyword",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "keyword": { "type": "string" }
                }),
                &["connection", "entity", "keyword"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_query",
            "Query records with portable filters",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "filters": filters_prop(),
                    "fields": { "type": "array", "items": { "type": "string" } },
                    "order_by": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Prefix a field with '-' for descending order"
                    },
                    "limit": { "type": "integer", "default": 100 },
                    "offset": { "type": "integer", "default": 0 }
                }),
                &["connection", "entity"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_get_record",
            "Fetch one record by id",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "id": { "type": "string" }
                }),
                &["connection", "entity", "id"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_create_record",
            "Create a record",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "data": { "type": "object" }
                }),
                &["connection", "entity", "data"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_update_record",
            "Update fields of a record",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "id": { "type": "string" },
                    "data": { "type": "object" }
                }),
                &["connection", "entity", "id", "data"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_delete_record",
            "Delete a record",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "id": { "type": "string" }
                }),
                &["connection", "entity", "id"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_count",
            "Count records matching filters",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "filters": filters_prop()
                }),
                &["connection", "entity"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_aggregate",
            "Compute count, sum, avg, min or max of a field",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "entity": entity_prop(),
                    "field": { "type": "string" },
                    "function": { "type": "string", "enum": ["count", "sum", "avg", "min", "max"] },
                    "filters": filters_prop()
                }),
                &["connection", "entity", "field", "function"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_raw_request",
            "Send a raw request through the authenticated connection",
            object_schema(
                json!({
                    "connection": connection_prop(),
                    "method": { "type": "string", "enum": ["GET", "POST", "PUT", "PATCH", "DELETE"] },
                    "path": { "type": "string" },
                    "body": { "type": "object" }
                }),
                &["connection", "method", "path"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_health_check",
            "Check that a connection is reachable",
            object_schema(json!({ "connection": connection_prop() }), &["connection"]),
        ),
        ToolDefinition::new(
            "enterprise_invalidate_cache",
            "Drop cached schemas for one entity or all of them",
            object_schema(
                json!({ "connection": connection_prop(), "entity": entity_prop() }),
                &["connection"],
            ),
        ),
        ToolDefinition::new(
            "enterprise_generate_config",
            "Return a commented configuration template",
            object_schema(json!({}), &[]),
        ),
    ]
}

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Deserialize)]
struct ConfigureArgs {
    #[serde(default)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ConnectionArgs {
    connection: String,
}

#[derive(Debug, Deserialize)]
struct DescribeArgs {
    connection: String,
    entity: String,
    #[serde(default)]
    refresh: bool,
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    connection: String,
    entity: String,
    keyword: String,
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    connection: String,
    #[serde(flatten)]
    spec: QuerySpec,
}

#[derive(Debug, Deserialize)]
struct RecordArgs {
    connection: String,
    entity: String,
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreateArgs {
    connection: String,
    entity: String,
    data: JsonValue,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    connection: String,
    entity: String,
    id: String,
    data: JsonValue,
}

#[derive(Debug, Deserialize)]
struct CountArgs {
    connection: String,
    entity: String,
    #[serde(default)]
    filters: Filters,
}

#[derive(Debug, Deserialize)]
struct AggregateArgs {
    connection: String,
    entity: String,
    field: String,
    function: String,
    #[serde(default)]
    filters: Filters,
}

#[derive(Debug, Deserialize)]
struct RawArgs {
    connection: String,
    method: String,
    path: String,
    #[serde(default)]
    body: Option<JsonValue>,
}

#[derive(Debug, Deserialize)]
struct InvalidateArgs {
    connection: String,
    #[serde(default)]
    entity: Option<String>,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: JsonValue) -> Result<T> {
    serde_json::from_value(arguments)
        .map_err(|e| Error::Other(format!("Invalid arguments for {tool}: {e}")))
}

// ============================================================================
// Dispatch
// ============================================================================

/// Run tool `name` with `arguments`
pub async fn dispatch(session: &Session, name: &str, arguments: JsonValue) -> OperationResult {
    debug!("Dispatching tool {}", name);
    let arguments = match arguments {
        JsonValue::Null => json!({}),
        other => other,
    };
    OperationResult::from_outcome(run(session, name, arguments).await)
}

async fn run(session: &Session, name: &str, arguments: JsonValue) -> Result<OperationResult> {
    match name {
        "enterprise_configure" => {
            let args: ConfigureArgs = parse_args(name, arguments)?;
            let config = BridgeConfig::load(args.config_path.as_deref())?;
            let profiles = config.profile_names();
            let message = format!("Loaded {} connection profile(s).", profiles.len());
            session.reload(config).await;
            Ok(OperationResult::success(json!({ "profiles": profiles })).with_message(message))
        }
        "enterprise_generate_config" => Ok(OperationResult::success(
            BridgeConfig::generate_template(),
        )
        .with_message("Configuration template")),
        "enterprise_list_connections" => {
            let profiles = session.describe_profiles().await;
            let count = profiles.len();
            Ok(OperationResult::success(profiles).with_metadata("count", count))
        }
        "enterprise_connect" => {
            let args: ConnectionArgs = parse_args(name, arguments)?;
            let conn = session.connection(&args.connection).await?;
            Ok(OperationResult::ok()
                .with_message(format!("Connected to {}", args.connection))
                .with_metadata("system", conn.adapter.system().as_str())
                .with_metadata("status", conn.adapter.status().as_str()))
        }
        "enterprise_list_entities" => {
            let args: ConnectionArgs = parse_args(name, arguments)?;
            Ok(open(session, &args.connection).await?.discovery.list_entities().await)
        }
        "enterprise_describe_entity" => {
            let args: DescribeArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.discovery.describe(&args.entity, args.refresh).await)
        }
        "enterprise_search_fields" => {
            let args: SearchArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.discovery.search_fields(&args.entity, &args.keyword).await)
        }
        "enterprise_query" => {
            let args: QueryArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.engine.execute(&args.spec).await)
        }
        "enterprise_get_record" => {
            let args: RecordArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.adapter.get_record(&args.entity, &args.id).await)
        }
        "enterprise_create_record" => {
            let args: CreateArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.adapter.create_record(&args.entity, args.data).await)
        }
        "enterprise_update_record" => {
            let args: UpdateArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn
                .adapter
                .update_record(&args.entity, &args.id, args.data)
                .await)
        }
        "enterprise_delete_record" => {
            let args: RecordArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.adapter.delete_record(&args.entity, &args.id).await)
        }
        "enterprise_count" => {
            let args: CountArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            let spec = QuerySpec::new(args.entity).with_filters(args.filters);
            Ok(conn.engine.count(&spec).await)
        }
        "enterprise_aggregate" => {
            let args: AggregateArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn
                .engine
                .aggregate(&args.entity, &args.field, &args.function, args.filters)
                .await)
        }
        "enterprise_raw_request" => {
            let args: RawArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn
                .adapter
                .execute_raw(&args.method, &args.path, args.body)
                .await)
        }
        "enterprise_health_check" => {
            let args: ConnectionArgs = parse_args(name, arguments)?;
            Ok(open(session, &args.connection).await?.adapter.health_check().await)
        }
        "enterprise_invalidate_cache" => {
            let args: InvalidateArgs = parse_args(name, arguments)?;
            let conn = open(session, &args.connection).await?;
            Ok(conn.discovery.invalidate(args.entity.as_deref()).await)
        }
        other => Err(Error::Other(format!("Unknown tool: {other}"))),
    }
}

async fn open(session: &Session, name: &str) -> Result<Arc<Connection>> {
    session.connection(name).await
}
