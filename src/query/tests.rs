//! Tests for filter parsing and the vendor translators

use super::*;
use crate::error::Error;
use crate::types::SystemKind;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

fn params(pairs: &[(&str, &str)]) -> VendorQuery {
    VendorQuery::Params(
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    )
}

// ============================================================================
// Filter keys
// ============================================================================

#[test_case("Revenue__gt", "Revenue", FilterOp::Gt)]
#[test_case("Amount__gte", "Amount", FilterOp::Gte)]
#[test_case("Amount__lt", "Amount", FilterOp::Lt)]
#[test_case("Amount__lte", "Amount", FilterOp::Lte)]
#[test_case("Status__ne", "Status", FilterOp::Ne)]
#[test_case("Region__in", "Region", FilterOp::In)]
#[test_case("Name__like", "Name", FilterOp::Like)]
#[test_case("Email__null", "Email", FilterOp::Null)]
#[test_case("Name", "Name", FilterOp::Eq)]
#[test_case("Name__regex", "Name__regex", FilterOp::Eq)]
#[test_case("Some__Field__gt", "Some__Field", FilterOp::Gt)]
fn test_parse_filter_key(key: &str, field: &str, op: FilterOp) {
    assert_eq!(parse_filter_key(key), (field, op));
}

#[test]
fn test_truthiness() {
    assert!(is_truthy(&json!(true)));
    assert!(is_truthy(&json!(1)));
    assert!(is_truthy(&json!("yes")));
    assert!(!is_truthy(&json!(false)));
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!("")));
    assert!(!is_truthy(&json!([])));
    assert!(!is_truthy(&json!(null)));
}

#[test]
fn test_query_spec_from_value_defaults() {
    let spec = QuerySpec::from_value(json!({"entity": "Account"})).unwrap();
    assert_eq!(spec.entity, "Account");
    assert_eq!(spec.limit, DEFAULT_LIMIT);
    assert_eq!(spec.offset, 0);
    assert!(spec.filters.is_empty());
    assert!(spec.fields.is_empty());

    let spec = QuerySpec::from_value(json!({
        "entity": "Account",
        "filters": {"Industry": "Tech", "Revenue__gt": 5},
        "fields": ["Id"],
        "limit": 5,
        "offset": 10
    }))
    .unwrap();
    let keys: Vec<&str> = spec.filters.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Industry", "Revenue__gt"]);
    assert_eq!(spec.limit, 5);
    assert_eq!(spec.offset, 10);

    assert!(QuerySpec::from_value(json!({"filters": {}})).is_err());
}

// ============================================================================
// Cross-vendor properties
// ============================================================================

#[test]
fn test_numeric_literals_unquoted_everywhere() {
    for system in SystemKind::ALL {
        let translator = translator_for(system);
        let spec = QuerySpec::new("Account").filter("Revenue__gt", 1000);
        let rendered = translator.translate(&spec).unwrap().rendered();
        assert!(rendered.contains("1000"), "{system}: {rendered}");
        assert!(!rendered.contains("'1000'"), "{system}: {rendered}");

        let spec = QuerySpec::new("Account").filter("Revenue__gt", "1000");
        let rendered = translator.translate(&spec).unwrap().rendered();
        assert!(rendered.contains("'1000'"), "{system}: {rendered}");
    }
}

#[test]
fn test_in_requires_a_list_everywhere() {
    for system in SystemKind::ALL {
        let translator = translator_for(system);
        let spec = QuerySpec::new("Account").filter("Region__in", "EMEA");
        let err = translator.translate(&spec).unwrap_err();
        assert!(
            matches!(err, Error::Translation { ref key, .. } if key == "Region__in"),
            "{system}: {err}"
        );
    }
}

#[test]
fn test_translator_dialects() {
    let dialects: Vec<&str> = SystemKind::ALL
        .into_iter()
        .map(|s| translator_for(s).dialect())
        .collect();
    assert_eq!(dialects, vec!["odata", "soql", "suiteql", "finder"]);
}

// ============================================================================
// OData
// ============================================================================

#[test]
fn test_odata_full_render() {
    let spec = QuerySpec::new("API_BUSINESS_PARTNER/A_BusinessPartner")
        .filter("CompanyName", "Acme")
        .filter("Revenue__gte", 1000)
        .fields(["BusinessPartner", "CompanyName"])
        .limit(10)
        .offset(20);

    let query = ODataTranslator.translate(&spec).unwrap();
    assert_eq!(
        query,
        params(&[
            ("$filter", "CompanyName eq 'Acme' and Revenue ge 1000"),
            ("$select", "BusinessPartner,CompanyName"),
            ("$top", "10"),
            ("$skip", "20"),
            ("$inlinecount", "allpages"),
        ])
    );
}

#[test]
fn test_odata_special_operators() {
    let spec = QuerySpec::new("Orders")
        .filter("Status__in", json!(["A", 2]))
        .filter("Name__like", "Ac")
        .filter("Email__null", true)
        .filter("Phone__null", false)
        .filter("Amount__lte", 5)
        .filter("Kind__ne", "X")
        .limit(0);

    let query = ODataTranslator.translate(&spec).unwrap();
    assert_eq!(
        query.param("$filter"),
        Some(
            "(Status eq 'A' or Status eq 2) and substringof('Ac',Name) and Email eq null \
             and Phone ne null and Amount le 5 and Kind ne 'X'"
        )
    );
    assert_eq!(query.param("$top"), None);
}

#[test]
fn test_odata_minimal_and_ordering() {
    let spec = QuerySpec::new("Orders")
        .order_by(["-CreatedAt", "Id"])
        .limit(0);
    let query = ODataTranslator.translate(&spec).unwrap();
    assert_eq!(
        query,
        params(&[("$orderby", "CreatedAt desc,Id"), ("$inlinecount", "allpages")])
    );
    assert_eq!(
        query.rendered(),
        "$orderby=CreatedAt desc,Id&$inlinecount=allpages"
    );
}

#[test]
fn test_odata_escapes_quotes() {
    let spec = QuerySpec::new("Partners").filter("Name", "O'Brien");
    let query = ODataTranslator.translate(&spec).unwrap();
    assert_eq!(query.param("$filter"), Some("Name eq 'O''Brien'"));
}

// ============================================================================
// SOQL
// ============================================================================

#[test]
fn test_soql_full_render() {
    let spec = QuerySpec::new("Account")
        .filter("Industry", "Technology")
        .filter("AnnualRevenue__gte", 1_000_000)
        .fields(["Id", "Name"])
        .limit(50);

    let query = SoqlTranslator.translate(&spec).unwrap();
    assert_eq!(
        query.statement(),
        Some(
            "SELECT Id, Name FROM Account WHERE Industry = 'Technology' \
             AND AnnualRevenue >= 1000000 LIMIT 50"
        )
    );
}

#[test]
fn test_soql_all_fields_no_window() {
    let spec = QuerySpec::new("Contact").limit(0);
    let query = SoqlTranslator.translate(&spec).unwrap();
    assert_eq!(query.rendered(), "SELECT FIELDS(ALL) FROM Contact");
}

#[test]
fn test_soql_special_operators() {
    let spec = QuerySpec::new("Account")
        .filter("Region__in", json!(["EMEA", 3]))
        .filter("Email__null", true)
        .filter("Phone__null", false)
        .filter("Name__like", "Acme%")
        .filter("IsDeleted", false)
        .filter("Name__ne", "O'Brien")
        .order_by(["-CreatedDate", "Name"])
        .limit(10)
        .offset(30);

    let query = SoqlTranslator.translate(&spec).unwrap();
    assert_eq!(
        query.rendered(),
        "SELECT FIELDS(ALL) FROM Account WHERE Region IN ('EMEA', 3) AND Email = null \
         AND Phone != null AND Name LIKE 'Acme%' AND IsDeleted = false \
         AND Name != 'O\\'Brien' ORDER BY CreatedDate DESC, Name LIMIT 10 OFFSET 30"
    );
}

// ============================================================================
// SuiteQL
// ============================================================================

#[test]
fn test_suiteql_full_render() {
    let spec = QuerySpec::new("customer")
        .filter("companyname__like", "Acme")
        .filter("balance__lt", 500.5)
        .filter("email__null", false)
        .limit(25)
        .offset(50);

    let query = SuiteQlTranslator.translate(&spec).unwrap();
    assert_eq!(
        query.rendered(),
        "SELECT * FROM customer WHERE companyname LIKE '%Acme%' AND balance < 500.5 \
         AND email IS NOT NULL OFFSET 50 ROWS FETCH NEXT 25 ROWS ONLY"
    );
}

#[test]
fn test_suiteql_projection_and_order() {
    let spec = QuerySpec::new("transaction")
        .fields(["id", "tranid"])
        .filter("type__in", json!(["SalesOrd", "CustInvc"]))
        .order_by(["-trandate"])
        .limit(10);

    let query = SuiteQlTranslator.translate(&spec).unwrap();
    assert_eq!(
        query.rendered(),
        "SELECT id, tranid FROM transaction WHERE type IN ('SalesOrd', 'CustInvc') \
         ORDER BY trandate DESC FETCH NEXT 10 ROWS ONLY"
    );
}

#[test]
fn test_suiteql_offset_without_limit() {
    // limit 0 means no FETCH clause; the offset is still applied
    let spec = QuerySpec::new("customer").limit(0).offset(5);
    let query = SuiteQlTranslator.translate(&spec).unwrap();
    assert_eq!(query.rendered(), "SELECT * FROM customer OFFSET 5 ROWS");
}

// ============================================================================
// REST finder
// ============================================================================

#[test]
fn test_finder_full_render() {
    let spec = QuerySpec::new("invoices")
        .filter("Status", "OPEN")
        .filter("Amount__lte", 100)
        .filter("Supplier__null", true)
        .fields(["InvoiceId", "Amount"])
        .order_by(["-InvoiceDate"])
        .limit(5)
        .offset(10);

    let query = FinderTranslator.translate(&spec).unwrap();
    assert_eq!(
        query,
        params(&[
            ("q", "Status = 'OPEN' AND Amount <= 100 AND Supplier IS NULL"),
            ("orderBy", "InvoiceDate:desc"),
            ("fields", "InvoiceId,Amount"),
            ("limit", "5"),
            ("offset", "10"),
            ("totalResults", "true"),
        ])
    );
}

#[test]
fn test_finder_without_filters() {
    let spec = QuerySpec::new("invoices");
    let query = FinderTranslator.translate(&spec).unwrap();
    assert_eq!(query, params(&[("limit", "100"), ("totalResults", "true")]));
    assert!(query.statement().is_none());
}
