//! Optional observability helpers for broker calls.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (on by default) to emit structured spans named `service_broker.call` with
//!   the `call` and `instance_id` fields.
//! - Enable `metrics` to increment the `service_broker_call_total` counter for every
//!   attempt/success/failure, labeled by `call` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Lifecycle calls served by the broker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Call {
	/// Catalog read.
	Catalog,
	/// Instance creation.
	Provision,
	/// Instance removal.
	Deprovision,
	/// Instance retrieval.
	GetInstance,
	/// Plan or parameter change.
	Update,
	/// Binding creation.
	Bind,
	/// Binding removal.
	Unbind,
	/// Binding retrieval.
	GetBinding,
	/// Instance last-operation poll.
	LastOperation,
	/// Binding last-operation poll.
	LastBindingOperation,
}
impl Call {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Call::Catalog => "catalog",
			Call::Provision => "provision",
			Call::Deprovision => "deprovision",
			Call::GetInstance => "get_instance",
			Call::Update => "update",
			Call::Bind => "bind",
			Call::Unbind => "unbind",
			Call::GetBinding => "get_binding",
			Call::LastOperation => "last_operation",
			Call::LastBindingOperation => "last_binding_operation",
		}
	}
}
impl Display for Call {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallOutcome {
	/// Entry to a broker operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl CallOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallOutcome::Attempt => "attempt",
			CallOutcome::Success => "success",
			CallOutcome::Failure => "failure",
		}
	}
}
impl Display for CallOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
