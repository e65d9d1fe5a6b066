//! Broker state machine serving catalog, instance, and binding lifecycle calls.

pub mod binding;
pub mod instance;

mod metrics;

pub use binding::*;
pub use instance::*;
pub use metrics::LifecycleMetrics;

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	catalog::{self, Catalog},
	config::BrokerConfig,
	model::{OperationKind, OperationRecord, OperationState, OperationToken},
	obs::{self, Call, CallOutcome, CallSpan},
	store::{LifecycleStore, MemoryStore},
};

/// Provider side of the service broker protocol.
///
/// The broker owns its configuration, the catalog built from it, and the lifecycle store.
/// Every operation is a single store step, so a call either commits its whole record or
/// nothing, and cloning the broker shares the same store.
#[derive(Clone)]
pub struct Broker {
	/// Shared lifecycle counters.
	pub lifecycle_metrics: Arc<LifecycleMetrics>,
	config: Arc<BrokerConfig>,
	catalog: Arc<Catalog>,
	store: Arc<dyn LifecycleStore>,
	operation_sequence: Arc<AtomicU64>,
}
impl Broker {
	/// Creates a broker backed by a fresh in-memory store.
	pub fn new(config: BrokerConfig) -> Self {
		Self::with_store(config, Arc::new(MemoryStore::default()))
	}

	/// Creates a broker backed by the provided store.
	pub fn with_store(config: BrokerConfig, store: Arc<dyn LifecycleStore>) -> Self {
		let catalog = catalog::build_catalog(&config);

		Self {
			lifecycle_metrics: Default::default(),
			config: Arc::new(config),
			catalog: Arc::new(catalog),
			store,
			operation_sequence: Default::default(),
		}
	}

	/// Configuration the broker was built from.
	pub fn config(&self) -> &BrokerConfig {
		&self.config
	}

	/// Dashboard URL handed out by provision and update calls.
	pub fn dashboard_url(&self) -> Option<&Url> {
		self.config.dashboard_url.as_ref()
	}

	/// Checks the platform's `Authorization` header; always passes when no pair is configured.
	pub fn authorize(&self, header: Option<&str>) -> bool {
		match (&self.config.auth, header) {
			(None, _) => true,
			(Some(credentials), Some(value)) => credentials.verify_header(value),
			(Some(_), None) => false,
		}
	}

	/// Returns the service catalog.
	pub async fn catalog(&self) -> Result<Catalog> {
		self.observe(Call::Catalog, None, async { Ok(self.catalog.as_ref().clone()) }).await
	}

	/// Decides whether a mutating call answers asynchronously.
	fn async_mode(&self, accepts_incomplete: bool) -> Result<bool> {
		match (self.config.fake_async, accepts_incomplete) {
			(false, _) => Ok(false),
			(true, true) => Ok(true),
			(true, false) => Err(Error::AsyncRequired),
		}
	}

	/// Starts the operation record for a mutating call.
	fn begin_operation(&self, kind: OperationKind, is_async: bool) -> OperationRecord {
		if is_async {
			let sequence = self.operation_sequence.fetch_add(1, Ordering::Relaxed) + 1;

			OperationRecord::fake_async(kind, OperationToken::new(kind, sequence))
		} else {
			OperationRecord::completed(kind)
		}
	}

	fn ensure_stateful(&self, call: Call) -> Result<()> {
		if self.config.fake_stateful {
			Ok(())
		} else {
			Err(Error::Unsupported { operation: call.as_str() })
		}
	}

	async fn observe<T, Fut>(&self, call: Call, instance_id: Option<&str>, fut: Fut) -> Result<T>
	where
		Fut: Future<Output = Result<T>>,
	{
		let span = CallSpan::new(call, instance_id);

		obs::record_call_outcome(call, CallOutcome::Attempt);

		let result = span.instrument(fut).await;

		match &result {
			Ok(_) => obs::record_call_outcome(call, CallOutcome::Success),
			Err(e) => {
				#[cfg(not(feature = "tracing"))]
				let _ = e;

				obs::debug_event!(
					call = call.as_str(),
					status = e.status_code_for(call),
					error = %e,
					"broker call failed"
				);
				obs::record_call_outcome(call, CallOutcome::Failure);
			},
		}

		result
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("service_id", &self.config.service_id())
			.field("fake_async", &self.config.fake_async)
			.field("fake_stateful", &self.config.fake_stateful)
			.field("auth_set", &self.config.auth.is_some())
			.finish()
	}
}

/// Last-operation poll result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LastOperation {
	/// Current state.
	pub state: OperationState,
	/// Human-readable description; omitted when absent.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
}
impl LastOperation {
	/// Protocol status code for a successful poll.
	pub fn status_code(&self) -> u16 {
		200
	}
}
impl From<&OperationRecord> for LastOperation {
	fn from(record: &OperationRecord) -> Self {
		Self { state: record.state, description: record.description.clone() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn broker(fake_async: bool) -> Broker {
		Broker::new(
			BrokerConfig::builder()
				.fake_async(fake_async)
				.basic_auth("broker", "s3cr3t")
				.build()
				.expect("Broker configuration fixture should build."),
		)
	}

	#[test]
	fn async_mode_follows_configuration() {
		assert!(!broker(false).async_mode(false).expect("Sync brokers never require async."));
		assert!(!broker(false).async_mode(true).expect("Sync brokers never answer async."));
		assert!(broker(true).async_mode(true).expect("Async brokers answer async."));
		assert!(matches!(broker(true).async_mode(false), Err(Error::AsyncRequired)));
	}

	#[test]
	fn async_operations_receive_distinct_tokens() {
		let broker = broker(true);
		let first = broker.begin_operation(OperationKind::Provision, true);
		let second = broker.begin_operation(OperationKind::Update, true);

		assert_eq!(first.token.as_ref().map(OperationToken::as_str), Some("provision-1"));
		assert_eq!(second.token.as_ref().map(OperationToken::as_str), Some("update-2"));
		assert!(broker.begin_operation(OperationKind::Update, false).token.is_none());
	}

	#[test]
	fn authorize_checks_configured_pair() {
		let guarded = broker(false);
		let open = Broker::new(
			BrokerConfig::builder().build().expect("Open configuration fixture should build."),
		);

		assert!(open.authorize(None));
		assert!(!guarded.authorize(None));
		assert!(guarded.authorize(Some("Basic YnJva2VyOnMzY3IzdA==")));
		assert!(!format!("{guarded:?}").contains("s3cr3t"));
	}
}
