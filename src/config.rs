//! Immutable broker configuration consumed by the catalog builder and the state machine.
//!
//! Parsing the process environment is left to the host binary; it feeds values into
//! [`BrokerConfigBuilder`], which validates them once and produces a [`BrokerConfig`].

/// Builder API for assembling broker configuration.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::BrokerCredentials, model::Credentials};

/// Validated broker configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct BrokerConfig {
	/// Prefix shared by every catalog identifier.
	pub base_guid: String,
	/// Service name advertised in the catalog.
	pub service_name: String,
	/// Plan name advertised in the catalog.
	pub plan_name: String,
	/// Service and plan description.
	pub service_description: String,
	/// Comma-separated tag list, split by the catalog builder.
	pub tags: String,
	/// Whether the plan is free of charge.
	pub free: bool,
	/// Presentation metadata advertised alongside the service.
	pub metadata: MetadataConfig,
	/// Dashboard URL returned by provision and update calls.
	pub dashboard_url: Option<Url>,
	/// Syslog drain URL issued with every binding.
	pub syslog_drain_url: Option<Url>,
	/// Static credentials issued to every binding.
	pub credentials: Credentials,
	/// Answer instance operations asynchronously and report success on the first poll.
	pub fake_async: bool,
	/// Serve instance and binding retrieval.
	pub fake_stateful: bool,
	/// Credential pair the platform must present, if any.
	pub auth: Option<BrokerCredentials>,
}
impl BrokerConfig {
	/// Creates a new builder seeded with the broker defaults.
	pub fn builder() -> BrokerConfigBuilder {
		BrokerConfigBuilder::default()
	}

	/// Catalog identifier of the advertised service.
	pub fn service_id(&self) -> String {
		format!("{}-service-{}", self.base_guid, self.service_name)
	}

	/// Catalog identifier of the advertised plan.
	pub fn plan_id(&self) -> String {
		format!("{}-plan-{}", self.base_guid, self.plan_name)
	}
}

/// Optional presentation metadata for the catalog entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataConfig {
	/// Icon shown by platform marketplaces.
	pub image_url: Option<Url>,
	/// Long-form description.
	pub long_description: Option<String>,
	/// Name of the organization providing the service.
	pub provider_display_name: Option<String>,
	/// Documentation link.
	pub documentation_url: Option<Url>,
	/// Support link.
	pub support_url: Option<Url>,
}
