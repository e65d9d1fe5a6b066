//! Lifecycle store contract and the built-in in-memory implementation.
//!
//! Every method is a single check-and-mutate step. Implementations must make each call atomic
//! with respect to the records it touches so concurrent calls on the same identifier are
//! linearizable and a dropped future never leaves half a record behind.

pub mod memory;

pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	model::{
		BindingId, BindingRecord, InstanceChange, InstanceId, InstanceRecord, OperationRecord,
	},
};

/// Boxed future returned by [`LifecycleStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for instance and binding records.
pub trait LifecycleStore
where
	Self: Send + Sync,
{
	/// Inserts a new instance unless the identifier is taken or retired.
	fn create_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		record: InstanceRecord,
	) -> StoreFuture<'a, CreateOutcome<InstanceRecord>>;

	/// Fetches the instance record, if present.
	fn fetch_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
	) -> StoreFuture<'a, Option<InstanceRecord>>;

	/// Applies an update and returns the updated record, or `None` if the instance is unknown.
	fn update_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		change: InstanceChange,
	) -> StoreFuture<'a, Option<InstanceRecord>>;

	/// Erases the instance together with its bindings and retires the identifier, keeping the
	/// deprovision operation for later polls.
	fn remove_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		operation: OperationRecord,
	) -> StoreFuture<'a, Option<InstanceRecord>>;

	/// Fetches the deprovision operation of a retired identifier, if it was retired.
	fn fetch_retired<'a>(
		&'a self,
		instance_id: &'a InstanceId,
	) -> StoreFuture<'a, Option<OperationRecord>>;

	/// Inserts a new binding under an existing instance.
	fn create_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
		record: BindingRecord,
	) -> StoreFuture<'a, CreateOutcome<BindingRecord>>;

	/// Fetches the binding record, if present.
	fn fetch_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
	) -> StoreFuture<'a, Option<BindingRecord>>;

	/// Erases the binding and returns it, or `None` if it was not bound.
	fn remove_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
	) -> StoreFuture<'a, Option<BindingRecord>>;
}

/// Result of a create call.
#[derive(Clone, Debug, PartialEq)]
pub enum CreateOutcome<T> {
	/// The record was inserted.
	Created,
	/// A record with identical attributes already exists; it is returned unchanged.
	Identical(T),
	/// A record with different attributes already exists; nothing was written.
	Conflict(T),
	/// The instance identifier was deprovisioned earlier and cannot be reused.
	Retired,
	/// The parent instance of a binding does not exist.
	MissingInstance,
}

/// Error type produced by [`LifecycleStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_broker_error_with_source() {
		let store_error = StoreError::Backend { message: "lock poisoned".into() };
		let broker_error: Error = store_error.clone().into();

		assert!(matches!(broker_error, Error::Storage(_)));
		assert!(broker_error.to_string().contains("lock poisoned"));
		assert_eq!(broker_error.status_code(), 500);

		let source = StdError::source(&broker_error)
			.expect("Broker error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}
}
