//! Tests for the vendor adapters

use super::*;
use crate::auth::AuthConfig;
use crate::config::AdapterOptions;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_key() -> AuthConfig {
    AuthConfig::ApiKey {
        api_key: "secret".to_string(),
        header_name: "Authorization".to_string(),
        prefix: "Bearer".to_string(),
    }
}

fn profile(system: SystemKind, server: &MockServer) -> ConnectionProfile {
    ConnectionProfile::new("test", system, server.uri(), api_key())
}

fn adapter(system: SystemKind, server: &MockServer) -> Arc<dyn SystemAdapter> {
    create_adapter(&profile(system, server))
}

// ============================================================================
// Result envelope
// ============================================================================

#[test]
fn test_operation_result_wire_form() {
    let result = OperationResult::success(json!([1, 2])).with_metadata("total_count", 2);
    assert_eq!(
        result.to_value(),
        json!({
            "success": true,
            "data": [1, 2],
            "message": "",
            "metadata": { "total_count": 2 }
        })
    );
    assert_eq!(serde_json::to_value(&result).unwrap(), result.to_value());
}

#[test]
fn test_failure_defaults() {
    let failure = OperationResult::failure("");
    assert!(!failure.is_success());
    assert_eq!(failure.message(), "Operation failed");
    assert_eq!(failure.data(), &JsonValue::Null);

    // An empty replacement message does not blank a failure
    let failure = OperationResult::failure("boom").with_message("");
    assert_eq!(failure.message(), "boom");
}

#[test]
fn test_from_error_marks_retryable() {
    let result = OperationResult::from_error(&crate::error::Error::http_status(503, "busy"));
    assert!(!result.is_success());
    assert_eq!(result.meta("retryable"), Some(&json!(true)));

    let result = OperationResult::from_error(&crate::error::Error::http_status(400, "bad"));
    assert_eq!(result.meta("retryable"), Some(&json!(false)));
}

#[test]
fn test_connection_status_serialization() {
    assert_eq!(
        serde_json::to_value(ConnectionStatus::Connected).unwrap(),
        json!("connected")
    );
    assert_eq!(ConnectionStatus::default(), ConnectionStatus::Disconnected);
    assert_eq!(ConnectionStatus::Error.to_string(), "error");
}

#[test]
fn test_create_adapter_dispatches_on_system() {
    for system in SystemKind::ALL {
        let profile = ConnectionProfile::new("p", system, "https://example.com", api_key());
        let adapter = create_adapter(&profile);
        assert_eq!(adapter.system(), system);
        assert_eq!(adapter.status(), ConnectionStatus::Disconnected);
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test]
async fn test_connect_and_disconnect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sap/opu/odata/sap/"))
        .and(header("Authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "d": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let sap = adapter(SystemKind::Sap, &server);
    let result = sap.connect().await;
    assert!(result.is_success());
    assert_eq!(result.message(), "Connected to SAP");
    assert_eq!(sap.status(), ConnectionStatus::Connected);

    let result = sap.disconnect().await;
    assert!(result.is_success());
    assert_eq!(result.message(), "Disconnected from SAP");
    assert_eq!(sap.status(), ConnectionStatus::Disconnected);
}

#[tokio::test]
async fn test_connect_rejected_sets_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let salesforce = adapter(SystemKind::Salesforce, &server);
    let result = salesforce.connect().await;
    assert!(!result.is_success());
    assert_eq!(result.message(), "Salesforce returned 503");
    assert_eq!(result.meta("status"), Some(&json!(503)));
    assert_eq!(result.meta("retryable"), Some(&json!(true)));
    assert_eq!(salesforce.status(), ConnectionStatus::Error);
}

#[tokio::test]
async fn test_connect_unreachable_host() {
    let profile = ConnectionProfile::new("down", SystemKind::Oracle, "http://127.0.0.1:1", api_key());
    let oracle = create_adapter(&profile);

    let result = oracle.connect().await;
    assert!(!result.is_success());
    assert!(!result.message().is_empty());
    assert_eq!(oracle.status(), ConnectionStatus::Error);
}

#[tokio::test]
async fn test_netsuite_connect_reports_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest/record/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let options = AdapterOptions {
        account_id: Some("1234567".to_string()),
        ..AdapterOptions::default()
    };
    let netsuite = create_adapter(&profile(SystemKind::Netsuite, &server).with_options(options));
    let result = netsuite.connect().await;
    assert!(result.is_success());
    assert_eq!(result.meta("account_id"), Some(&json!("1234567")));
}

#[tokio::test]
async fn test_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/limits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Salesforce, &server).health_check().await;
    assert!(result.is_success());
    assert_eq!(result.message(), "healthy");
    assert_eq!(result.meta("status"), Some(&json!(200)));
}

#[tokio::test]
async fn test_token_failure_sets_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": "invalid_client" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthConfig::Oauth2ClientCredentials {
        token_url: format!("{}/oauth/token", server.uri()),
        client_id: "id".to_string(),
        client_secret: "wrong".to_string(),
        scope: String::new(),
        extra_params: BTreeMap::new(),
    };
    let profile = ConnectionProfile::new("sf", SystemKind::Salesforce, server.uri(), auth);
    let salesforce = create_adapter(&profile);

    let result = salesforce.query(&QuerySpec::new("Account")).await;
    assert!(!result.is_success());
    assert_eq!(salesforce.status(), ConnectionStatus::Error);
}

#[tokio::test]
async fn test_connect_gives_up_on_hanging_token_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": "late", "expires_in": 3600 }))
                .set_delay(std::time::Duration::from_secs(8)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/services/rest/record/v1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&server)
        .await;

    let auth = AuthConfig::Oauth2ClientCredentials {
        token_url: format!("{}/token", server.uri()),
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        scope: String::new(),
        extra_params: BTreeMap::new(),
    };
    let options = AdapterOptions {
        timeout_secs: Some(1),
        ..AdapterOptions::default()
    };
    let profile = ConnectionProfile::new("ns", SystemKind::Netsuite, server.uri(), auth)
        .with_options(options);
    let netsuite = create_adapter(&profile);

    let started = std::time::Instant::now();
    let result = netsuite.connect().await;

    assert!(!result.is_success());
    assert_eq!(result.meta("retryable"), Some(&json!(true)));
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
    assert_eq!(netsuite.status(), ConnectionStatus::Error);
}

// ============================================================================
// SAP
// ============================================================================

#[tokio::test]
async fn test_sap_query_reads_results_and_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sap/opu/odata/sap/A_BusinessPartner"))
        .and(query_param("$format", "json"))
        .and(query_param("$filter", "Category eq '2'"))
        .and(query_param("$top", "2"))
        .and(query_param("$inlinecount", "allpages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": {
                "results": [{ "BusinessPartner": "1" }, { "BusinessPartner": "2" }],
                "__count": "5"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("A_BusinessPartner")
        .filter("Category", "2")
        .limit(2);
    let result = adapter(SystemKind::Sap, &server).query(&spec).await;

    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data().as_array().map(Vec::len), Some(2));
    assert_eq!(result.meta("total_count"), Some(&json!(5)));
    assert_eq!(result.meta("has_more"), Some(&json!(true)));
    assert_eq!(result.meta("entity"), Some(&json!("A_BusinessPartner")));
    let query = result.meta("query").and_then(JsonValue::as_str).unwrap();
    assert!(query.contains("$filter=Category eq '2'"));
}

#[tokio::test]
async fn test_sap_csrf_token_fetched_once_per_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("X-CSRF-Token", "Fetch"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-CSRF-Token", "tok-1"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/sap/opu/odata/sap/A_BusinessPartner"))
        .and(header("X-CSRF-Token", "tok-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "d": { "BusinessPartner": "17" }
        })))
        .expect(3)
        .mount(&server)
        .await;

    let sap = adapter(SystemKind::Sap, &server);
    for _ in 0..2 {
        let result = sap
            .create_record("A_BusinessPartner", json!({ "FirstName": "Ada" }))
            .await;
        assert!(result.is_success(), "{}", result.message());
        assert_eq!(result.data(), &json!({ "BusinessPartner": "17" }));
        assert_eq!(result.message(), "Record created");
    }

    // Disconnecting forgets the token
    sap.disconnect().await;
    let result = sap.create_record("A_BusinessPartner", json!({})).await;
    assert!(result.is_success());
}

#[tokio::test]
async fn test_sap_update_and_delete_use_keyed_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-CSRF-Token", "tok"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/sap/opu/odata/sap/A_BusinessPartner('17')"))
        .and(header("X-CSRF-Token", "tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/sap/opu/odata/sap/A_BusinessPartner('17')"))
        .and(header("X-CSRF-Token", "tok"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let sap = adapter(SystemKind::Sap, &server);
    let updated = sap
        .update_record("A_BusinessPartner", "17", json!({ "FirstName": "Grace" }))
        .await;
    assert!(updated.is_success(), "{}", updated.message());
    assert_eq!(updated.message(), "Record updated");

    let deleted = sap.delete_record("A_BusinessPartner", "17").await;
    assert!(deleted.is_success(), "{}", deleted.message());
    assert_eq!(deleted.message(), "Record deleted");
}

#[tokio::test]
async fn test_sap_describe_parses_metadata_document() {
    let server = MockServer::start().await;
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<edmx:Edmx Version="1.0" xmlns:edmx="http://schemas.microsoft.com/ado/2007/06/edmx">
  <edmx:DataServices>
    <Schema Namespace="API_BUSINESS_PARTNER" xmlns="http://schemas.microsoft.com/ado/2008/09/edm">
      <EntityType Name="A_BusinessPartnerType">
        <Key><PropertyRef Name="BusinessPartner"/></Key>
        <Property Name="BusinessPartner" Type="Edm.String" Nullable="false"/>
        <Property Name="FirstName" Type="Edm.String"/>
      </EntityType>
    </Schema>
  </edmx:DataServices>
</edmx:Edmx>"#;
    Mock::given(method("GET"))
        .and(path("/sap/opu/odata/sap/A_BusinessPartner/$metadata"))
        .and(header("Accept", "application/xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(xml))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Sap, &server)
        .describe_entity("A_BusinessPartner")
        .await;
    assert!(result.is_success(), "{}", result.message());
    let data = result.data();
    assert_eq!(data["key_field"], json!("BusinessPartner"));
    assert_eq!(data["label"], json!("A_BusinessPartnerType"));
    assert_eq!(data["field_count"], json!(2));
    assert_eq!(data["fields"][0]["type"], json!("String"));
    assert_eq!(data["fields"][0]["required"], json!(true));
}

#[tokio::test]
async fn test_sap_list_entity_sets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sap/opu/odata/sap/"))
        .and(query_param("$format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "d": { "EntitySets": ["A_BusinessPartner", "A_SalesOrder"] }
        })))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Sap, &server).list_entities().await;
    assert_eq!(
        result.data(),
        &json!([{ "name": "A_BusinessPartner" }, { "name": "A_SalesOrder" }])
    );
}

// ============================================================================
// Salesforce
// ============================================================================

#[tokio::test]
async fn test_salesforce_query_strips_attributes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .and(query_param(
            "q",
            "SELECT Id, Name FROM Account WHERE Industry = 'Tech' LIMIT 10",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 20,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01g-2000",
            "records": [
                { "attributes": { "type": "Account" }, "Id": "001", "Name": "Acme" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("Account")
        .filter("Industry", "Tech")
        .fields(["Id", "Name"])
        .limit(10);
    let result = adapter(SystemKind::Salesforce, &server).query(&spec).await;

    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!([{ "Id": "001", "Name": "Acme" }]));
    assert_eq!(result.meta("total_count"), Some(&json!(20)));
    assert_eq!(result.meta("has_more"), Some(&json!(true)));
    assert_eq!(
        result.meta("next_url"),
        Some(&json!("/services/data/v59.0/query/01g-2000"))
    );
}

#[tokio::test]
async fn test_translation_error_never_reaches_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("Account").filter("Region__in", "EMEA");
    let result = adapter(SystemKind::Salesforce, &server).query(&spec).await;

    assert!(!result.is_success());
    assert!(result.message().contains("Region__in"));
    assert_eq!(result.meta("retryable"), Some(&json!(false)));
    assert!(result.meta("query").is_none());
}

#[tokio::test]
async fn test_query_failure_keeps_rendered_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Salesforce, &server)
        .query(&QuerySpec::new("Contact").limit(0))
        .await;

    assert!(!result.is_success());
    assert_eq!(result.data(), &JsonValue::Null);
    assert_eq!(result.meta("retryable"), Some(&json!(true)));
    assert_eq!(
        result.meta("query"),
        Some(&json!("SELECT FIELDS(ALL) FROM Contact"))
    );
}

#[tokio::test]
async fn test_salesforce_create_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/data/v59.0/sobjects/Account"))
        .and(body_json(json!({ "Name": "Acme" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": null,
            "success": false,
            "errors": ["DUPLICATE_VALUE"]
        })))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Salesforce, &server)
        .create_record("Account", json!({ "Name": "Acme" }))
        .await;
    assert!(!result.is_success());
    assert!(result.message().contains("DUPLICATE_VALUE"));
    assert_eq!(result.meta("errors"), Some(&json!(["DUPLICATE_VALUE"])));
}

#[tokio::test]
async fn test_salesforce_get_record_encodes_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/sobjects/Account/001%2F2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attributes": { "type": "Account" },
            "Id": "001/2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Salesforce, &server)
        .get_record("Account", "001/2")
        .await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!({ "Id": "001/2" }));
}

#[tokio::test]
async fn test_salesforce_describe_maps_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/sobjects/Account/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Account",
            "label": "Account",
            "labelPlural": "Accounts",
            "fields": [
                {
                    "name": "Id", "label": "Account ID", "type": "id",
                    "nillable": false, "createable": false, "updateable": false
                },
                {
                    "name": "Name", "label": "Account Name", "type": "string",
                    "nillable": false, "createable": true, "updateable": true
                },
                {
                    "name": "OwnerId", "label": "Owner", "type": "reference",
                    "nillable": true, "createable": true, "updateable": true,
                    "referenceTo": ["User"]
                },
                {
                    "name": "Rating", "label": "Rating", "type": "picklist",
                    "nillable": true, "createable": true, "updateable": true,
                    "inlineHelpText": "Prospect temperature",
                    "picklistValues": [
                        { "value": "Hot", "active": true },
                        { "value": "Retired", "active": false }
                    ]
                }
            ]
        })))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Salesforce, &server)
        .describe_entity("Account")
        .await;
    assert!(result.is_success(), "{}", result.message());
    let data = result.data();
    assert_eq!(data["description"], json!("Accounts"));
    assert_eq!(data["field_count"], json!(4));
    assert_eq!(
        data["fields"][0],
        json!({ "name": "Id", "label": "Account ID", "type": "id", "required": false, "read_only": true })
    );
    assert_eq!(data["fields"][1]["required"], json!(true));
    assert_eq!(data["fields"][2]["reference_to"], json!("User"));
    assert_eq!(data["fields"][3]["picklist_values"], json!(["Hot"]));
    assert_eq!(data["fields"][3]["description"], json!("Prospect temperature"));
}

// ============================================================================
// NetSuite
// ============================================================================

#[tokio::test]
async fn test_netsuite_query_posts_suiteql() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/rest/query/v1/suiteql"))
        .and(header("Prefer", "transient"))
        .and(body_json(json!({
            "q": "SELECT * FROM customer WHERE isinactive = 'F' FETCH NEXT 100 ROWS ONLY"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "1" }],
            "totalResults": 250,
            "hasMore": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("customer").filter("isinactive", "F");
    let result = adapter(SystemKind::Netsuite, &server).query(&spec).await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!([{ "id": "1" }]));
    assert_eq!(result.meta("total_count"), Some(&json!(250)));
    assert_eq!(result.meta("has_more"), Some(&json!(true)));
}

#[tokio::test]
async fn test_netsuite_create_reads_location() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/rest/record/v1/customer"))
        .respond_with(ResponseTemplate::new(204).insert_header(
            "Location",
            "https://1234567.suitetalk.api.netsuite.com/services/rest/record/v1/customer/1234",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Netsuite, &server)
        .create_record("Customer", json!({ "companyName": "Acme" }))
        .await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!({ "id": "1234" }));
}

#[tokio::test]
async fn test_netsuite_describe_metadata_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/services/rest/record/v1/metadata-catalog/customer"))
        .and(header("Accept", "application/schema+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Customer",
            "required": ["companyName"],
            "properties": {
                "companyName": { "title": "Company Name", "type": "string" },
                "id": { "title": "Internal ID", "type": "string", "readOnly": true }
            }
        })))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Netsuite, &server)
        .describe_entity("Customer")
        .await;
    assert!(result.is_success(), "{}", result.message());
    let schema = crate::schema::EntitySchema::from_value(result.into_data()).unwrap();
    assert_eq!(schema.key_field, "id");
    assert_eq!(schema.label, "Customer");
    assert!(schema.field("companyName").unwrap().required);
    assert!(schema.field("id").unwrap().read_only);
}

// ============================================================================
// Oracle
// ============================================================================

#[tokio::test]
async fn test_oracle_query_sends_framework_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fscmRestApi/resources/v1/invoices"))
        .and(header("REST-Framework-Version", "4"))
        .and(query_param("q", "Status = 'OPEN'"))
        .and(query_param("limit", "100"))
        .and(query_param("totalResults", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "InvoiceId": 1 }],
            "totalResults": 1,
            "hasMore": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spec = QuerySpec::new("invoices").filter("Status", "OPEN");
    let result = adapter(SystemKind::Oracle, &server).query(&spec).await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!([{ "InvoiceId": 1 }]));
    assert_eq!(result.meta("total_count"), Some(&json!(1)));
    assert_eq!(result.meta("has_more"), Some(&json!(false)));
}

#[tokio::test]
async fn test_oracle_describe_nested_resource() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fscmRestApi/resources/v1/invoices/describe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Resources": {
                "invoices": {
                    "title": "Invoices",
                    "attributes": [
                        { "name": "InvoiceId", "type": "integer", "updatable": false, "mandatory": true },
                        {
                            "name": "Description", "type": "string",
                            "annotations": { "description": "Free text" }
                        }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;

    let result = adapter(SystemKind::Oracle, &server)
        .describe_entity("invoices")
        .await;
    assert!(result.is_success(), "{}", result.message());
    let schema = crate::schema::EntitySchema::from_value(result.into_data()).unwrap();
    assert_eq!(schema.label, "Invoices");
    assert_eq!(schema.key_field, "InvoiceId");
    let id = schema.field("InvoiceId").unwrap();
    assert!(id.required && id.read_only);
    assert_eq!(schema.field("Description").unwrap().description, "Free text");
}

// ============================================================================
// Raw passthrough
// ============================================================================

#[tokio::test]
async fn test_execute_raw_rejects_unknown_method() {
    let server = MockServer::start().await;
    let result = adapter(SystemKind::Oracle, &server)
        .execute_raw("TRACE", "/anything", None)
        .await;
    assert!(!result.is_success());
    assert_eq!(result.data(), &JsonValue::Null);
}

#[tokio::test]
async fn test_execute_raw_text_and_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/custom/ping"))
        .respond_with(ResponseTemplate::new(200).set_body_string("pong"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/custom/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such thing"))
        .mount(&server)
        .await;

    let netsuite = adapter(SystemKind::Netsuite, &server);
    let result = netsuite.execute_raw("get", "/custom/ping", None).await;
    assert!(result.is_success(), "{}", result.message());
    assert_eq!(result.data(), &json!("pong"));
    assert_eq!(result.meta("status"), Some(&json!(200)));

    let result = netsuite.execute_raw("GET", "/custom/missing", None).await;
    assert!(!result.is_success());
    assert_eq!(result.meta("status"), Some(&json!(404)));
    assert!(result.message().contains("no such thing"));
}
