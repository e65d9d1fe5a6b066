// self
use crate::{
	_prelude::*,
	auth::BrokerCredentials,
	config::{BrokerConfig, MetadataConfig},
	error::ConfigError,
	model::Credentials,
};

/// Builder for [`BrokerConfig`] values.
#[derive(Debug)]
pub struct BrokerConfigBuilder {
	/// Prefix shared by every catalog identifier.
	pub base_guid: String,
	/// Service name advertised in the catalog.
	pub service_name: String,
	/// Plan name advertised in the catalog.
	pub plan_name: String,
	/// Explicit description; defaults to `Shared service for <service name>`.
	pub service_description: Option<String>,
	/// Comma-separated tag list.
	pub tags: String,
	/// Whether the plan is free of charge.
	pub free: bool,
	/// Presentation metadata.
	pub metadata: MetadataConfig,
	/// Dashboard URL returned by provision and update calls.
	pub dashboard_url: Option<Url>,
	/// Syslog drain URL issued with every binding.
	pub syslog_drain_url: Option<Url>,
	/// Credentials source, decoded at build time.
	pub credentials: CredentialsSource,
	/// Fake asynchronous instance operations.
	pub fake_async: bool,
	/// Serve instance and binding retrieval.
	pub fake_stateful: bool,
	/// Broker username and password; both empty disables authentication.
	pub auth: Option<(String, String)>,
}
impl BrokerConfigBuilder {
	/// Default identifier prefix.
	pub const DEFAULT_BASE_GUID: &'static str = "29140B3F-0E69-4C7E-8A35";
	/// Default service name.
	pub const DEFAULT_SERVICE_NAME: &'static str = "some-service-name";
	/// Default plan name.
	pub const DEFAULT_PLAN_NAME: &'static str = "shared";
	/// Default credentials document.
	pub const DEFAULT_CREDENTIALS: &'static str = "{\"port\": \"4000\"}";

	/// Sets the identifier prefix.
	pub fn base_guid(mut self, value: impl Into<String>) -> Self {
		self.base_guid = value.into();

		self
	}

	/// Sets the service name.
	pub fn service_name(mut self, value: impl Into<String>) -> Self {
		self.service_name = value.into();

		self
	}

	/// Sets the plan name.
	pub fn plan_name(mut self, value: impl Into<String>) -> Self {
		self.plan_name = value.into();

		self
	}

	/// Overrides the generated service description.
	pub fn service_description(mut self, value: impl Into<String>) -> Self {
		self.service_description = Some(value.into());

		self
	}

	/// Sets the comma-separated tag list.
	pub fn tags(mut self, value: impl Into<String>) -> Self {
		self.tags = value.into();

		self
	}

	/// Marks the plan as free or paid.
	pub fn free(mut self, free: bool) -> Self {
		self.free = free;

		self
	}

	/// Overrides the presentation metadata.
	pub fn metadata(mut self, metadata: MetadataConfig) -> Self {
		self.metadata = metadata;

		self
	}

	/// Sets the marketplace icon.
	pub fn image_url(mut self, url: Url) -> Self {
		self.metadata.image_url = Some(url);

		self
	}

	/// Sets the dashboard URL.
	pub fn dashboard_url(mut self, url: Url) -> Self {
		self.dashboard_url = Some(url);

		self
	}

	/// Sets the syslog drain URL; the catalog then requires `syslog_drain`.
	pub fn syslog_drain_url(mut self, url: Url) -> Self {
		self.syslog_drain_url = Some(url);

		self
	}

	/// Uses an already-decoded credentials document.
	pub fn credentials(mut self, credentials: Credentials) -> Self {
		self.credentials = CredentialsSource::Decoded(credentials);

		self
	}

	/// Uses a credentials document given as JSON text; decoded by [`Self::build`].
	pub fn credentials_json(mut self, raw: impl Into<String>) -> Self {
		self.credentials = CredentialsSource::Json(raw.into());

		self
	}

	/// Enables or disables fake asynchronous instance operations.
	pub fn fake_async(mut self, enabled: bool) -> Self {
		self.fake_async = enabled;

		self
	}

	/// Enables or disables instance and binding retrieval.
	pub fn fake_stateful(mut self, enabled: bool) -> Self {
		self.fake_stateful = enabled;

		self
	}

	/// Requires the platform to present this username/password pair.
	pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
		self.auth = Some((username.into(), password.into()));

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<BrokerConfig, ConfigError> {
		validate_segment("base_guid", &self.base_guid)?;
		validate_segment("service_name", &self.service_name)?;
		validate_segment("plan_name", &self.plan_name)?;

		let credentials = match self.credentials {
			CredentialsSource::Decoded(credentials) => credentials,
			CredentialsSource::Json(raw) =>
				Credentials::from_json(&raw).map_err(ConfigError::Credentials)?,
		};
		let auth = match self.auth {
			None => None,
			Some((username, password)) if username.is_empty() && password.is_empty() => None,
			Some((username, password)) if username.is_empty() || password.is_empty() =>
				return Err(ConfigError::IncompleteAuth),
			Some((username, password)) => Some(BrokerCredentials::new(username, password)),
		};
		let service_description = self
			.service_description
			.unwrap_or_else(|| format!("Shared service for {}", self.service_name));

		Ok(BrokerConfig {
			base_guid: self.base_guid,
			service_name: self.service_name,
			plan_name: self.plan_name,
			service_description,
			tags: self.tags,
			free: self.free,
			metadata: self.metadata,
			dashboard_url: self.dashboard_url,
			syslog_drain_url: self.syslog_drain_url,
			credentials,
			fake_async: self.fake_async,
			fake_stateful: self.fake_stateful,
			auth,
		})
	}
}
impl Default for BrokerConfigBuilder {
	fn default() -> Self {
		Self {
			base_guid: Self::DEFAULT_BASE_GUID.into(),
			service_name: Self::DEFAULT_SERVICE_NAME.into(),
			plan_name: Self::DEFAULT_PLAN_NAME.into(),
			service_description: None,
			tags: String::new(),
			free: true,
			metadata: MetadataConfig::default(),
			dashboard_url: None,
			syslog_drain_url: None,
			credentials: CredentialsSource::Json(Self::DEFAULT_CREDENTIALS.into()),
			fake_async: false,
			fake_stateful: false,
			auth: None,
		}
	}
}

/// Where the static credentials document comes from.
#[derive(Clone, Debug)]
pub enum CredentialsSource {
	/// Already decoded.
	Decoded(Credentials),
	/// JSON text decoded at build time.
	Json(String),
}

fn validate_segment(field: &'static str, value: &str) -> Result<(), ConfigError> {
	if value.is_empty() {
		Err(ConfigError::EmptyField { field })
	} else if value.chars().any(char::is_whitespace) {
		Err(ConfigError::ContainsWhitespace { field })
	} else {
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn defaults_build_a_usable_config() {
		let config = BrokerConfig::builder().build().expect("Default configuration should build.");

		assert_eq!(config.service_id(), "29140B3F-0E69-4C7E-8A35-service-some-service-name");
		assert_eq!(config.plan_id(), "29140B3F-0E69-4C7E-8A35-plan-shared");
		assert_eq!(config.service_description, "Shared service for some-service-name");
		assert_eq!(config.credentials.get("port"), Some(&JsonValue::from("4000")));
		assert!(config.free);
		assert!(config.auth.is_none());
	}

	#[test]
	fn identifier_segments_are_validated() {
		assert!(matches!(
			BrokerConfig::builder().service_name("").build(),
			Err(ConfigError::EmptyField { field: "service_name" })
		));
		assert!(matches!(
			BrokerConfig::builder().plan_name("two words").build(),
			Err(ConfigError::ContainsWhitespace { field: "plan_name" })
		));
	}

	#[test]
	fn malformed_credentials_fail_the_build() {
		let err = BrokerConfig::builder()
			.credentials_json("{\"port\": ")
			.build()
			.expect_err("Truncated credentials must be rejected.");

		assert!(matches!(err, ConfigError::Credentials(_)));
	}

	#[test]
	fn auth_pair_must_be_complete() {
		assert!(matches!(
			BrokerConfig::builder().basic_auth("broker", "").build(),
			Err(ConfigError::IncompleteAuth)
		));

		let disabled = BrokerConfig::builder()
			.basic_auth("", "")
			.build()
			.expect("An empty pair should disable authentication.");

		assert!(disabled.auth.is_none());

		let enabled = BrokerConfig::builder()
			.basic_auth("broker", "s3cr3t")
			.build()
			.expect("A complete pair should build.");

		assert!(enabled.auth.is_some_and(|auth| auth.verify("broker", "s3cr3t")));
	}
}
