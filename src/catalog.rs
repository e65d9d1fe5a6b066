//! Catalog document advertised to the platform.
//!
//! The catalog is a pure function of [`BrokerConfig`]: identifiers are derived from the base
//! GUID and the configured names, so repeated reads serialize to identical bytes.

// self
use crate::{_prelude::*, config::BrokerConfig};

/// Capability advertised when bindings carry a syslog drain URL.
pub const SYSLOG_DRAIN_REQUIREMENT: &str = "syslog_drain";

/// Top-level catalog document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
	/// Advertised services.
	pub services: Vec<Service>,
}

/// Service offering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
	/// Stable identifier: `<base>-service-<name>`.
	pub id: String,
	/// Service name.
	pub name: String,
	/// Service description.
	pub description: String,
	/// Whether applications can bind to instances.
	pub bindable: bool,
	/// Whether instances can be fetched back.
	pub instances_retrievable: bool,
	/// Whether bindings can be fetched back.
	pub bindings_retrievable: bool,
	/// Whether instances may switch plans.
	pub plan_updateable: bool,
	/// Free-form tags; omitted when empty.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub tags: Vec<String>,
	/// Platform capabilities the service needs; omitted when empty.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub requires: Vec<String>,
	/// Presentation metadata.
	pub metadata: ServiceMetadata,
	/// Plans offered by the service.
	pub plans: Vec<Plan>,
}

/// Presentation metadata; unset fields are omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMetadata {
	/// Display name.
	pub display_name: String,
	/// Icon URL.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub image_url: Option<String>,
	/// Long description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub long_description: Option<String>,
	/// Provider name.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub provider_display_name: Option<String>,
	/// Documentation link.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub documentation_url: Option<String>,
	/// Support link.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub support_url: Option<String>,
}

/// Service plan.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
	/// Stable identifier: `<base>-plan-<name>`.
	pub id: String,
	/// Plan name.
	pub name: String,
	/// Plan description.
	pub description: String,
	/// Whether the plan is free of charge.
	pub free: bool,
}

/// Builds the catalog for the provided configuration.
pub fn build_catalog(config: &BrokerConfig) -> Catalog {
	let metadata = &config.metadata;
	let requires = match config.syslog_drain_url {
		Some(_) => vec![SYSLOG_DRAIN_REQUIREMENT.to_owned()],
		None => Vec::new(),
	};
	let service = Service {
		id: config.service_id(),
		name: config.service_name.clone(),
		description: config.service_description.clone(),
		bindable: true,
		instances_retrievable: config.fake_stateful,
		bindings_retrievable: config.fake_stateful,
		plan_updateable: true,
		tags: split_tags(&config.tags),
		requires,
		metadata: ServiceMetadata {
			display_name: config.service_name.clone(),
			image_url: metadata.image_url.as_ref().map(Url::to_string),
			long_description: metadata.long_description.clone(),
			provider_display_name: metadata.provider_display_name.clone(),
			documentation_url: metadata.documentation_url.as_ref().map(Url::to_string),
			support_url: metadata.support_url.as_ref().map(Url::to_string),
		},
		plans: vec![Plan {
			id: config.plan_id(),
			name: config.plan_name.clone(),
			description: config.service_description.clone(),
			free: config.free,
		}],
	};

	Catalog { services: vec![service] }
}

/// Splits a comma-separated tag list, trimming entries and dropping empty ones.
pub fn split_tags(raw: &str) -> Vec<String> {
	raw.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn config() -> BrokerConfig {
		BrokerConfig::builder()
			.base_guid("ABC")
			.service_name("demo")
			.plan_name("shared")
			.build()
			.expect("Catalog configuration fixture should build.")
	}

	#[test]
	fn identifiers_derive_from_base_guid() {
		let catalog = build_catalog(&config());

		assert_eq!(catalog.services.len(), 1);

		let service = &catalog.services[0];

		assert_eq!(service.id, "ABC-service-demo");
		assert_eq!(service.plans.len(), 1);
		assert_eq!(service.plans[0].id, "ABC-plan-shared");
		assert_eq!(service.metadata.display_name, "demo");
		assert!(service.bindable);
	}

	#[test]
	fn tags_are_trimmed_and_empties_dropped() {
		assert_eq!(split_tags(" shared, ,worlds-simplest-service-broker,"), [
			"shared",
			"worlds-simplest-service-broker"
		]);
		assert!(split_tags("").is_empty());
		assert!(split_tags(" , ").is_empty());
	}

	#[test]
	fn empty_lists_are_omitted_from_the_document() {
		let document =
			serde_json::to_value(build_catalog(&config())).expect("Catalog should serialize.");
		let service = &document["services"][0];

		assert!(service.get("tags").is_none());
		assert!(service.get("requires").is_none());
		assert!(service["metadata"].get("imageUrl").is_none());
	}

	#[test]
	fn syslog_drain_adds_requirement() {
		let config = BrokerConfig::builder()
			.syslog_drain_url(
				Url::parse("syslog://logs.example.com:514").expect("Drain fixture should parse."),
			)
			.tags("shared")
			.build()
			.expect("Syslog configuration fixture should build.");
		let document =
			serde_json::to_value(build_catalog(&config)).expect("Catalog should serialize.");
		let service = &document["services"][0];

		assert_eq!(service["requires"], serde_json::json!(["syslog_drain"]));
		assert_eq!(service["tags"], serde_json::json!(["shared"]));
	}

	#[test]
	fn repeated_builds_are_byte_identical() {
		let config = config();
		let first = serde_json::to_vec(&build_catalog(&config)).expect("Catalog should serialize.");
		let second =
			serde_json::to_vec(&build_catalog(&config)).expect("Catalog should serialize.");

		assert_eq!(first, second);
	}
}
