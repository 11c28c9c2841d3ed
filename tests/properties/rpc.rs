//! Properties of RPC endpoint normalization.
//!
//! Every historical endpoint shape must normalize into the canonical form,
//! and normalizing already-normalized endpoints must be a no-op.

use blockwatcher_runner::repositories::normalize_rpc_urls;
use proptest::prelude::*;
use serde_json::{json, Value};

fn url() -> impl Strategy<Value = String> {
	"[a-z][a-z0-9]{2,11}".prop_map(|host| format!("https://{}.example.com", host))
}

/// One endpoint in any of the shapes seen in relational rows: a plain
/// string, a flat object, or a nested value object, each with or without
/// an explicit weight.
fn endpoint() -> impl Strategy<Value = Value> {
	prop_oneof![
		url().prop_map(Value::String),
		(url(), proptest::option::of(0u32..=100)).prop_map(|(url, weight)| {
			match weight {
				Some(weight) => json!({"url": url, "weight": weight}),
				None => json!({"url": url}),
			}
		}),
		(url(), proptest::option::of(0u32..=100)).prop_map(|(url, weight)| {
			match weight {
				Some(weight) => json!({"url": {"value": url}, "weight": weight}),
				None => json!({"url": {"value": url}}),
			}
		}),
	]
}

proptest! {
	#[test]
	fn normalization_is_idempotent(entries in proptest::collection::vec(endpoint(), 0..8)) {
		let raw = Value::Array(entries);
		let once = normalize_rpc_urls(&raw);
		let reencoded = serde_json::to_value(&once).unwrap();
		let twice = normalize_rpc_urls(&reencoded);
		prop_assert_eq!(once, twice);
	}

	#[test]
	fn every_shape_normalizes_to_canonical_form(entries in proptest::collection::vec(endpoint(), 1..8)) {
		let count = entries.len();
		let normalized = normalize_rpc_urls(&Value::Array(entries));
		prop_assert_eq!(normalized.len(), count);
		for rpc_url in &normalized {
			prop_assert_eq!(&rpc_url.type_, "rpc");
			prop_assert!(rpc_url.url.as_plain().is_some());
			prop_assert!(rpc_url.weight <= 100);
		}
	}

	#[test]
	fn missing_weight_defaults_to_100(raw_url in url()) {
		let normalized = normalize_rpc_urls(&json!([raw_url.clone(), {"url": raw_url}]));
		prop_assert_eq!(normalized[0].weight, 100);
		prop_assert_eq!(normalized[1].weight, 100);
	}
}
