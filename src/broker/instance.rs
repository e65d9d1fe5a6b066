//! Instance lifecycle: provision, update, deprovision, retrieval, and last-operation polls.
//!
//! With fake-async enabled every mutating call demands `accepts_incomplete`, answers with an
//! operation token, and the first poll already reports `succeeded`. Otherwise each call is
//! final when it returns.

// self
use crate::{
	_prelude::*,
	broker::{Broker, LastOperation},
	model::{
		InstanceChange, InstanceId, InstanceRecord, OperationKind, OperationRecord, OperationToken,
		Parameters, PlanId, ServiceId,
	},
	obs::{self, Call},
	store::{CreateOutcome, LifecycleStore},
};

/// Provision request body plus the `accepts_incomplete` flag.
#[derive(Clone, Debug)]
pub struct ProvisionRequest {
	/// Service selected from the catalog.
	pub service_id: ServiceId,
	/// Plan selected from the catalog.
	pub plan_id: PlanId,
	/// Raw `parameters` document, if the request carried one.
	pub raw_parameters: Option<Vec<u8>>,
	/// Whether the platform tolerates an asynchronous answer.
	pub accepts_incomplete: bool,
}
impl ProvisionRequest {
	/// Creates a synchronous request without parameters.
	pub fn new(service_id: ServiceId, plan_id: PlanId) -> Self {
		Self { service_id, plan_id, raw_parameters: None, accepts_incomplete: false }
	}

	/// Attaches the raw `parameters` document.
	pub fn with_raw_parameters(mut self, raw: impl Into<Vec<u8>>) -> Self {
		self.raw_parameters = Some(raw.into());

		self
	}

	/// Overrides the `accepts_incomplete` flag.
	pub fn accepts_incomplete(mut self, accepts: bool) -> Self {
		self.accepts_incomplete = accepts;

		self
	}
}

/// Provision acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProvisionedInstance {
	/// Dashboard URL for the instance.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dashboard_url: Option<Url>,
	/// Token to echo on last-operation polls.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation: Option<OperationToken>,
	/// Whether provisioning continues after the response.
	#[serde(skip)]
	pub is_async: bool,
	/// Whether an identical instance already existed.
	#[serde(skip)]
	pub already_exists: bool,
}
impl ProvisionedInstance {
	fn from_record(record: &InstanceRecord, already_exists: bool) -> Self {
		Self {
			dashboard_url: record.dashboard_url.clone(),
			operation: record.last_operation.token.clone(),
			is_async: record.last_operation.is_async(),
			already_exists,
		}
	}

	/// Protocol status code: `200` for an identical repeat, `202` when async, else `201`.
	pub fn status_code(&self) -> u16 {
		if self.already_exists {
			200
		} else if self.is_async {
			202
		} else {
			201
		}
	}
}

/// Deprovision query plus the `accepts_incomplete` flag.
#[derive(Clone, Debug)]
pub struct DeprovisionRequest {
	/// Service the instance was provisioned from.
	pub service_id: ServiceId,
	/// Plan the instance is on.
	pub plan_id: PlanId,
	/// Whether the platform tolerates an asynchronous answer.
	pub accepts_incomplete: bool,
}
impl DeprovisionRequest {
	/// Creates a synchronous request.
	pub fn new(service_id: ServiceId, plan_id: PlanId) -> Self {
		Self { service_id, plan_id, accepts_incomplete: false }
	}

	/// Overrides the `accepts_incomplete` flag.
	pub fn accepts_incomplete(mut self, accepts: bool) -> Self {
		self.accepts_incomplete = accepts;

		self
	}
}

/// Deprovision acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeprovisionedInstance {
	/// Token to echo on last-operation polls.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation: Option<OperationToken>,
	/// Whether deprovisioning continues after the response.
	#[serde(skip)]
	pub is_async: bool,
}
impl DeprovisionedInstance {
	/// Protocol status code: `202` when async, else `200`.
	pub fn status_code(&self) -> u16 {
		if self.is_async { 202 } else { 200 }
	}
}

/// Update request body plus the `accepts_incomplete` flag.
#[derive(Clone, Debug)]
pub struct UpdateRequest {
	/// Service the instance was provisioned from.
	pub service_id: ServiceId,
	/// New plan, when the platform requests a plan change.
	pub plan_id: Option<PlanId>,
	/// Raw replacement `parameters` document, if the request carried one.
	pub raw_parameters: Option<Vec<u8>>,
	/// Whether the platform tolerates an asynchronous answer.
	pub accepts_incomplete: bool,
}
impl UpdateRequest {
	/// Creates a synchronous request that changes nothing yet.
	pub fn new(service_id: ServiceId) -> Self {
		Self { service_id, plan_id: None, raw_parameters: None, accepts_incomplete: false }
	}

	/// Requests a plan change.
	pub fn with_plan(mut self, plan_id: PlanId) -> Self {
		self.plan_id = Some(plan_id);

		self
	}

	/// Attaches the raw replacement `parameters` document.
	pub fn with_raw_parameters(mut self, raw: impl Into<Vec<u8>>) -> Self {
		self.raw_parameters = Some(raw.into());

		self
	}

	/// Overrides the `accepts_incomplete` flag.
	pub fn accepts_incomplete(mut self, accepts: bool) -> Self {
		self.accepts_incomplete = accepts;

		self
	}
}

/// Update acknowledgement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UpdatedInstance {
	/// Dashboard URL for the instance.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dashboard_url: Option<Url>,
	/// Token to echo on last-operation polls.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub operation: Option<OperationToken>,
	/// Whether the update continues after the response.
	#[serde(skip)]
	pub is_async: bool,
}
impl UpdatedInstance {
	/// Protocol status code: `202` when async, else `200`.
	pub fn status_code(&self) -> u16 {
		if self.is_async { 202 } else { 200 }
	}
}

/// Stored instance as returned by instance retrieval.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InstanceDetails {
	/// Service the instance was provisioned from.
	pub service_id: ServiceId,
	/// Current plan.
	pub plan_id: PlanId,
	/// Dashboard URL for the instance.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub dashboard_url: Option<Url>,
	/// Parameters currently applied to the instance.
	#[serde(skip_serializing_if = "Parameters::is_empty")]
	pub parameters: Parameters,
}
impl From<InstanceRecord> for InstanceDetails {
	fn from(record: InstanceRecord) -> Self {
		Self {
			service_id: record.service_id,
			plan_id: record.plan_id,
			dashboard_url: record.dashboard_url,
			parameters: record.parameters,
		}
	}
}

impl Broker {
	/// Creates an instance, or replays the earlier answer for an identical repeat.
	pub async fn provision(
		&self,
		instance_id: &InstanceId,
		request: ProvisionRequest,
	) -> Result<ProvisionedInstance> {
		self.observe(Call::Provision, Some(instance_id.as_ref()), async move {
			let is_async = self.async_mode(request.accepts_incomplete)?;
			let parameters = Parameters::decode(request.raw_parameters.as_deref())?;
			let operation = self.begin_operation(OperationKind::Provision, is_async);
			let record =
				InstanceRecord::new(request.service_id, request.plan_id, parameters, operation)
					.with_dashboard_url(self.config.dashboard_url.clone());

			match <dyn LifecycleStore>::create_instance(
				self.store.as_ref(),
				instance_id,
				record.clone(),
			)
			.await?
			{
				CreateOutcome::Created => {
					self.lifecycle_metrics.record_provisioned();

					Ok(ProvisionedInstance::from_record(&record, false))
				},
				CreateOutcome::Identical(existing) => {
					obs::debug_event!(%instance_id, "identical provision replayed");

					Ok(ProvisionedInstance::from_record(&existing, true))
				},
				CreateOutcome::Conflict(_) | CreateOutcome::Retired => {
					self.lifecycle_metrics.record_conflict();

					Err(Error::InstanceAlreadyExists { instance_id: instance_id.clone() })
				},
				CreateOutcome::MissingInstance =>
					Err(Error::InstanceNotFound { instance_id: instance_id.clone() }),
			}
		})
		.await
	}

	/// Erases an instance together with its bindings.
	pub async fn deprovision(
		&self,
		instance_id: &InstanceId,
		request: DeprovisionRequest,
	) -> Result<DeprovisionedInstance> {
		self.observe(Call::Deprovision, Some(instance_id.as_ref()), async move {
			let is_async = self.async_mode(request.accepts_incomplete)?;

			obs::debug_event!(
				%instance_id,
				service_id = %request.service_id,
				plan_id = %request.plan_id,
				"deprovisioning instance"
			);

			let operation = self.begin_operation(OperationKind::Deprovision, is_async);
			let token = operation.token.clone();

			<dyn LifecycleStore>::remove_instance(self.store.as_ref(), instance_id, operation)
				.await?
				.ok_or_else(|| Error::InstanceNotFound { instance_id: instance_id.clone() })?;

			self.lifecycle_metrics.record_deprovisioned();

			Ok(DeprovisionedInstance { operation: token, is_async })
		})
		.await
	}

	/// Returns the stored instance; requires stateful retrieval.
	pub async fn get_instance(&self, instance_id: &InstanceId) -> Result<InstanceDetails> {
		self.observe(Call::GetInstance, Some(instance_id.as_ref()), async move {
			self.ensure_stateful(Call::GetInstance)?;

			<dyn LifecycleStore>::fetch_instance(self.store.as_ref(), instance_id)
				.await?
				.map(InstanceDetails::from)
				.ok_or_else(|| Error::InstanceNotFound { instance_id: instance_id.clone() })
		})
		.await
	}

	/// Changes the plan and/or parameters of an existing instance.
	pub async fn update(
		&self,
		instance_id: &InstanceId,
		request: UpdateRequest,
	) -> Result<UpdatedInstance> {
		self.observe(Call::Update, Some(instance_id.as_ref()), async move {
			let is_async = self.async_mode(request.accepts_incomplete)?;

			obs::debug_event!(
				%instance_id,
				service_id = %request.service_id,
				plan_change = request.plan_id.is_some(),
				"updating instance"
			);

			let parameters = match request.raw_parameters.as_deref() {
				Some(raw) => Some(Parameters::decode(Some(raw))?),
				None => None,
			};
			let operation = self.begin_operation(OperationKind::Update, is_async);
			let change = InstanceChange { plan_id: request.plan_id, parameters, operation };
			let record =
				<dyn LifecycleStore>::update_instance(self.store.as_ref(), instance_id, change)
					.await?
					.ok_or_else(|| Error::InstanceNotFound { instance_id: instance_id.clone() })?;

			self.lifecycle_metrics.record_updated();

			Ok(UpdatedInstance {
				dashboard_url: record.dashboard_url,
				operation: record.last_operation.token,
				is_async,
			})
		})
		.await
	}

	/// Reports the state of the instance's last operation.
	///
	/// An asynchronous deprovision stays pollable after the instance is erased; any other
	/// unknown instance is `InstanceNotFound`. A token that does not match the last operation
	/// is `UnknownOperation`.
	pub async fn last_operation(
		&self,
		instance_id: &InstanceId,
		operation: Option<&str>,
	) -> Result<LastOperation> {
		self.observe(Call::LastOperation, Some(instance_id.as_ref()), async move {
			let last = match <dyn LifecycleStore>::fetch_instance(self.store.as_ref(), instance_id)
				.await?
			{
				Some(record) => record.last_operation,
				None => <dyn LifecycleStore>::fetch_retired(self.store.as_ref(), instance_id)
					.await?
					.filter(OperationRecord::is_async)
					.ok_or_else(|| Error::InstanceNotFound { instance_id: instance_id.clone() })?,
			};

			if !last.matches(operation) {
				return Err(Error::UnknownOperation {
					token: operation.unwrap_or_default().to_owned(),
				});
			}

			Ok(LastOperation::from(&last))
		})
		.await
	}
}
