//! Instance and binding records kept by the lifecycle store.

// self
use crate::{
	_prelude::*,
	model::{Credentials, OperationRecord, Parameters, PlanId, ServiceId},
};

/// State kept for a provisioned service instance.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceRecord {
	/// Service the instance was provisioned from.
	pub service_id: ServiceId,
	/// Current plan.
	pub plan_id: PlanId,
	/// Parameters from the provision request, replaced by updates that carry parameters.
	pub parameters: Parameters,
	/// Dashboard URL issued at provisioning time.
	pub dashboard_url: Option<Url>,
	/// Most recent lifecycle operation.
	pub last_operation: OperationRecord,
	/// Instant the instance was provisioned.
	pub provisioned_at: OffsetDateTime,
}
impl InstanceRecord {
	/// Creates a record stamped with the current clock.
	pub fn new(
		service_id: ServiceId,
		plan_id: PlanId,
		parameters: Parameters,
		last_operation: OperationRecord,
	) -> Self {
		Self {
			service_id,
			plan_id,
			parameters,
			dashboard_url: None,
			last_operation,
			provisioned_at: OffsetDateTime::now_utc(),
		}
	}

	/// Attaches the dashboard URL returned to the platform.
	pub fn with_dashboard_url(mut self, url: Option<Url>) -> Self {
		self.dashboard_url = url;

		self
	}

	/// Compares the platform-visible attributes a repeated provision must match.
	///
	/// Bookkeeping fields (timestamps, operation records) are ignored.
	pub fn same_attributes(&self, other: &Self) -> bool {
		self.service_id == other.service_id
			&& self.plan_id == other.plan_id
			&& self.parameters == other.parameters
	}

	/// Applies an update in place.
	pub fn apply(&mut self, change: InstanceChange) {
		if let Some(plan_id) = change.plan_id {
			self.plan_id = plan_id;
		}
		if let Some(parameters) = change.parameters {
			self.parameters = parameters;
		}

		self.last_operation = change.operation;
	}
}

/// Modification requested by an update call.
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceChange {
	/// New plan, if the platform requested a plan change.
	pub plan_id: Option<PlanId>,
	/// Replacement parameters, if the request carried any.
	pub parameters: Option<Parameters>,
	/// Operation record describing the update.
	pub operation: OperationRecord,
}

/// State kept for a binding issued against an instance.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingRecord {
	/// Service named by the bind request.
	pub service_id: ServiceId,
	/// Plan named by the bind request.
	pub plan_id: PlanId,
	/// Credentials issued to the bound application.
	pub credentials: Credentials,
	/// Syslog drain URL issued alongside the credentials, if configured.
	pub syslog_drain_url: Option<Url>,
	/// Parameters from the bind request.
	pub parameters: Parameters,
	/// Most recent lifecycle operation.
	pub last_operation: OperationRecord,
	/// Instant the binding was created.
	pub bound_at: OffsetDateTime,
}
impl BindingRecord {
	/// Compares the platform-visible attributes a repeated bind must match.
	pub fn same_attributes(&self, other: &Self) -> bool {
		self.service_id == other.service_id
			&& self.plan_id == other.plan_id
			&& self.parameters == other.parameters
	}
}
