//! Integration tests for the form encoder
//!
//! Exercises nested structs, maps, lists and extras the way request
//! parameter types compose them.

#![cfg(feature = "foundation")]

use std::collections::BTreeMap;

use paywire_common::form::{
    append_field, encode_params, format_url_path, ExtraValues, Filters, FormEncode, Values,
};
use paywire_common::idempotency::{new_idempotency_key, normalize_idempotency_key};

#[derive(Debug, Default)]
struct Address {
    line1: Option<String>,
    city: Option<String>,
}

impl FormEncode for Address {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "line1", &self.line1);
        append_field(values, keys, "city", &self.city);
    }
}

#[derive(Debug, Default)]
struct CustomerParams {
    email: Option<String>,
    address: Option<Address>,
    preferred_locales: Option<Vec<String>>,
    metadata: BTreeMap<String, String>,
    balance: Option<i64>,
    tax_exempt: Option<bool>,
}

impl FormEncode for CustomerParams {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "email", &self.email);
        append_field(values, keys, "address", &self.address);
        append_field(values, keys, "preferred_locales", &self.preferred_locales);
        append_field(values, keys, "metadata", &self.metadata);
        append_field(values, keys, "balance", &self.balance);
        append_field(values, keys, "tax_exempt", &self.tax_exempt);
    }
}

#[derive(Debug, Default)]
struct SearchParams {
    filters: BTreeMap<String, String>,
    expand: Vec<String>,
}

impl FormEncode for SearchParams {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "filters", &self.filters);
        append_field(values, keys, "expand", &self.expand);
    }
}

/// Validates that a realistic nested parameter struct encodes with bracketed
/// keys, indexed lists and sorted map keys, omitting unset fields.
#[test]
fn test_nested_struct_encoding() {
    let mut metadata = BTreeMap::new();
    metadata.insert("plan".to_string(), "gold".to_string());
    metadata.insert("order_id".to_string(), "6735".to_string());

    let params = CustomerParams {
        email: Some("jenny.rosen@example.com".to_string()),
        address: Some(Address { line1: Some("1 Main St".to_string()), city: None }),
        preferred_locales: Some(vec!["en".to_string(), "fr".to_string()]),
        metadata,
        balance: Some(-500),
        tax_exempt: None,
    };

    let encoded = encode_params(&params).encode();
    assert_eq!(
        encoded,
        "email=jenny.rosen%40example.com\
         &address[line1]=1+Main+St\
         &preferred_locales[0]=en&preferred_locales[1]=fr\
         &metadata[order_id]=6735&metadata[plan]=gold\
         &balance=-500"
    );
}

/// Validates the GET request shape: map filters and an expand list end up as
/// bracketed query keys.
#[test]
fn test_query_shape_for_list_requests() {
    let mut filters = BTreeMap::new();
    filters.insert("status".to_string(), "active".to_string());
    let params = SearchParams { filters, expand: vec!["foo".to_string()] };

    assert_eq!(encode_params(&params).encode(), "filters[status]=active&expand[0]=foo");
}

/// Validates that encoding the same value twice produces identical output,
/// which keeps retried requests byte-for-byte stable.
#[test]
fn test_encoding_is_deterministic() {
    let mut metadata = BTreeMap::new();
    for key in ["zeta", "alpha", "mu"] {
        metadata.insert(key.to_string(), key.to_uppercase());
    }
    let params = CustomerParams { metadata, ..Default::default() };

    let first = encode_params(&params).encode();
    let second = encode_params(&params).encode();
    assert_eq!(first, second);
    assert_eq!(first, "metadata[alpha]=ALPHA&metadata[mu]=MU&metadata[zeta]=ZETA");
}

/// Validates that an explicitly empty list is sent as `key=` so the server
/// can clear the field, while an unset list is omitted entirely.
#[test]
fn test_empty_list_clears_field() {
    let cleared = CustomerParams { preferred_locales: Some(Vec::new()), ..Default::default() };
    assert_eq!(encode_params(&cleared).encode(), "preferred_locales=");

    let unset = CustomerParams::default();
    assert!(encode_params(&unset).is_empty());
}

/// Validates extras and filters layered under a parent key.
#[test]
fn test_extras_and_filters_compose() {
    let mut values = Values::new();

    let mut extra = ExtraValues::new();
    extra.add("beta_feature", "on");
    extra.append_to(&mut values, &[]);

    let mut filters = Filters::new();
    filters.add_filter("created", "gte", "1700000000");
    filters.add_filter("status", "", "paid");
    filters.append_to(&mut values, &[]);

    assert_eq!(values.encode(), "beta_feature=on&created[gte]=1700000000&status=paid");
}

/// Validates that path segments are percent-encoded when substituted.
#[test]
fn test_path_formatting() {
    assert_eq!(format_url_path("/v1/customers/%s", &["cus_123"]), "/v1/customers/cus_123");
    assert_eq!(
        format_url_path("/v1/customers/%s/sources/%s", &["cus 1", "card/2"]),
        "/v1/customers/cus%201/sources/card%2F2"
    );
}

/// Validates key generation and normalisation together.
#[test]
fn test_idempotency_keys() {
    let key = new_idempotency_key();
    assert_eq!(normalize_idempotency_key(&format!("  {key}  ")).as_deref(), Ok(key.as_str()));
    assert!(normalize_idempotency_key(&"k".repeat(256)).is_err());
    assert!(normalize_idempotency_key(&"k".repeat(255)).is_ok());
}
