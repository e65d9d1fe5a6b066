//! Binding lifecycle: bind, unbind, retrieval, and last-operation polls.
//!
//! Every binding receives the configured credentials document verbatim; the syslog drain URL
//! travels next to it only when one is configured.

// self
use crate::{
	_prelude::*,
	broker::{Broker, LastOperation},
	model::{
		BindingId, BindingRecord, Credentials, InstanceId, OperationKind, OperationRecord,
		Parameters, PlanId, ServiceId,
	},
	obs::{self, Call},
	store::{CreateOutcome, LifecycleStore},
};

/// Bind request body.
#[derive(Clone, Debug)]
pub struct BindRequest {
	/// Service the instance was provisioned from.
	pub service_id: ServiceId,
	/// Plan the instance is on.
	pub plan_id: PlanId,
	/// Raw `parameters` document, if the request carried one.
	pub raw_parameters: Option<Vec<u8>>,
}
impl BindRequest {
	/// Creates a request without parameters.
	pub fn new(service_id: ServiceId, plan_id: PlanId) -> Self {
		Self { service_id, plan_id, raw_parameters: None }
	}

	/// Attaches the raw `parameters` document.
	pub fn with_raw_parameters(mut self, raw: impl Into<Vec<u8>>) -> Self {
		self.raw_parameters = Some(raw.into());

		self
	}
}

/// Credentials issued by a bind call.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Binding {
	/// Configured credentials document.
	pub credentials: Credentials,
	/// Syslog drain URL; omitted unless configured.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub syslog_drain_url: Option<Url>,
	/// Whether an identical binding already existed.
	#[serde(skip)]
	pub already_exists: bool,
}
impl Binding {
	/// Protocol status code: `200` for an identical repeat, else `201`.
	pub fn status_code(&self) -> u16 {
		if self.already_exists { 200 } else { 201 }
	}
}

/// Unbind acknowledgement; serializes to `{}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Unbound {}
impl Unbound {
	/// Protocol status code for a successful unbind.
	pub fn status_code(&self) -> u16 {
		200
	}
}

/// Stored binding as returned by binding retrieval.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BindingDetails {
	/// Credentials issued at bind time.
	pub credentials: Credentials,
	/// Syslog drain URL issued at bind time.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub syslog_drain_url: Option<Url>,
	/// Parameters from the bind request.
	#[serde(skip_serializing_if = "Parameters::is_empty")]
	pub parameters: Parameters,
}
impl From<BindingRecord> for BindingDetails {
	fn from(record: BindingRecord) -> Self {
		Self {
			credentials: record.credentials,
			syslog_drain_url: record.syslog_drain_url,
			parameters: record.parameters,
		}
	}
}

impl Broker {
	/// Issues credentials for an application bound to a provisioned instance.
	pub async fn bind(
		&self,
		instance_id: &InstanceId,
		binding_id: &BindingId,
		request: BindRequest,
	) -> Result<Binding> {
		self.observe(Call::Bind, Some(instance_id.as_ref()), async move {
			let parameters = Parameters::decode(request.raw_parameters.as_deref())?;
			let record = BindingRecord {
				service_id: request.service_id,
				plan_id: request.plan_id,
				credentials: self.config.credentials.clone(),
				syslog_drain_url: self.config.syslog_drain_url.clone(),
				parameters,
				last_operation: OperationRecord::completed(OperationKind::Bind),
				bound_at: OffsetDateTime::now_utc(),
			};

			match <dyn LifecycleStore>::create_binding(
				self.store.as_ref(),
				instance_id,
				binding_id,
				record.clone(),
			)
			.await?
			{
				CreateOutcome::Created => {
					self.lifecycle_metrics.record_bound();

					Ok(Binding {
						credentials: record.credentials,
						syslog_drain_url: record.syslog_drain_url,
						already_exists: false,
					})
				},
				CreateOutcome::Identical(existing) => {
					obs::debug_event!(%instance_id, %binding_id, "identical bind replayed");

					Ok(Binding {
						credentials: existing.credentials,
						syslog_drain_url: existing.syslog_drain_url,
						already_exists: true,
					})
				},
				CreateOutcome::Conflict(_) => {
					self.lifecycle_metrics.record_conflict();

					Err(Error::BindingAlreadyExists {
						instance_id: instance_id.clone(),
						binding_id: binding_id.clone(),
					})
				},
				CreateOutcome::MissingInstance | CreateOutcome::Retired =>
					Err(Error::InstanceNotFound { instance_id: instance_id.clone() }),
			}
		})
		.await
	}

	/// Revokes a binding.
	pub async fn unbind(
		&self,
		instance_id: &InstanceId,
		binding_id: &BindingId,
	) -> Result<Unbound> {
		self.observe(Call::Unbind, Some(instance_id.as_ref()), async move {
			<dyn LifecycleStore>::remove_binding(self.store.as_ref(), instance_id, binding_id)
				.await?
				.ok_or_else(|| binding_not_found(instance_id, binding_id))?;

			self.lifecycle_metrics.record_unbound();

			Ok(Unbound {})
		})
		.await
	}

	/// Returns the stored binding; requires stateful retrieval.
	pub async fn get_binding(
		&self,
		instance_id: &InstanceId,
		binding_id: &BindingId,
	) -> Result<BindingDetails> {
		self.observe(Call::GetBinding, Some(instance_id.as_ref()), async move {
			self.ensure_stateful(Call::GetBinding)?;

			<dyn LifecycleStore>::fetch_binding(self.store.as_ref(), instance_id, binding_id)
				.await?
				.map(BindingDetails::from)
				.ok_or_else(|| binding_not_found(instance_id, binding_id))
		})
		.await
	}

	/// Reports the state of the binding's last operation.
	pub async fn last_binding_operation(
		&self,
		instance_id: &InstanceId,
		binding_id: &BindingId,
		operation: Option<&str>,
	) -> Result<LastOperation> {
		self.observe(Call::LastBindingOperation, Some(instance_id.as_ref()), async move {
			let record =
				<dyn LifecycleStore>::fetch_binding(self.store.as_ref(), instance_id, binding_id)
					.await?
					.ok_or_else(|| binding_not_found(instance_id, binding_id))?;

			if !record.last_operation.matches(operation) {
				return Err(Error::UnknownOperation {
					token: operation.unwrap_or_default().to_owned(),
				});
			}

			Ok(LastOperation::from(&record.last_operation))
		})
		.await
	}
}

fn binding_not_found(instance_id: &InstanceId, binding_id: &BindingId) -> Error {
	Error::BindingNotFound { instance_id: instance_id.clone(), binding_id: binding_id.clone() }
}
