//! Thread-safe in-memory [`LifecycleStore`] that lives for the process lifetime.

// self
use crate::{
	_prelude::*,
	model::{
		BindingId, BindingRecord, InstanceChange, InstanceId, InstanceRecord, OperationRecord,
	},
	store::{CreateOutcome, LifecycleStore, StoreFuture},
};

type StoreState = Arc<RwLock<Lifecycle>>;

#[derive(Debug, Default)]
struct Lifecycle {
	instances: HashMap<InstanceId, InstanceEntry>,
	retired: HashMap<InstanceId, OperationRecord>,
}

#[derive(Debug)]
struct InstanceEntry {
	record: InstanceRecord,
	bindings: HashMap<BindingId, BindingRecord>,
}

/// Storage backend guarding every record behind a single lock.
///
/// Deprovisioned instances are erased; only their identifiers and the deprovision operation
/// are kept so they cannot be provisioned again and the operation can still be polled.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreState);
impl MemoryStore {
	/// Number of provisioned instances.
	pub fn instance_count(&self) -> usize {
		self.0.read().instances.len()
	}

	/// Number of bindings across all instances.
	pub fn binding_count(&self) -> usize {
		self.0.read().instances.values().map(|entry| entry.bindings.len()).sum()
	}

	/// Returns `true` if the identifier was deprovisioned.
	pub fn is_retired(&self, instance_id: &InstanceId) -> bool {
		self.0.read().retired.contains_key(instance_id)
	}

	fn create_instance_now(
		state: StoreState,
		instance_id: InstanceId,
		record: InstanceRecord,
	) -> CreateOutcome<InstanceRecord> {
		let mut guard = state.write();

		if guard.retired.contains_key(&instance_id) {
			return CreateOutcome::Retired;
		}

		match guard.instances.get(&instance_id) {
			Some(existing) if existing.record.same_attributes(&record) =>
				CreateOutcome::Identical(existing.record.clone()),
			Some(existing) => CreateOutcome::Conflict(existing.record.clone()),
			None => {
				guard
					.instances
					.insert(instance_id, InstanceEntry { record, bindings: HashMap::new() });

				CreateOutcome::Created
			},
		}
	}

	fn update_instance_now(
		state: StoreState,
		instance_id: InstanceId,
		change: InstanceChange,
	) -> Option<InstanceRecord> {
		let mut guard = state.write();

		match guard.instances.get_mut(&instance_id) {
			Some(entry) => {
				entry.record.apply(change);

				Some(entry.record.clone())
			},
			None => None,
		}
	}

	fn remove_instance_now(
		state: StoreState,
		instance_id: InstanceId,
		operation: OperationRecord,
	) -> Option<InstanceRecord> {
		let mut guard = state.write();
		let entry = guard.instances.remove(&instance_id)?;

		guard.retired.insert(instance_id, operation);

		Some(entry.record)
	}

	fn create_binding_now(
		state: StoreState,
		instance_id: InstanceId,
		binding_id: BindingId,
		record: BindingRecord,
	) -> CreateOutcome<BindingRecord> {
		let mut guard = state.write();
		let Some(entry) = guard.instances.get_mut(&instance_id) else {
			return CreateOutcome::MissingInstance;
		};

		match entry.bindings.get(&binding_id) {
			Some(existing) if existing.same_attributes(&record) =>
				CreateOutcome::Identical(existing.clone()),
			Some(existing) => CreateOutcome::Conflict(existing.clone()),
			None => {
				entry.bindings.insert(binding_id, record);

				CreateOutcome::Created
			},
		}
	}

	fn fetch_binding_now(
		state: StoreState,
		instance_id: InstanceId,
		binding_id: BindingId,
	) -> Option<BindingRecord> {
		state.read().instances.get(&instance_id)?.bindings.get(&binding_id).cloned()
	}

	fn remove_binding_now(
		state: StoreState,
		instance_id: InstanceId,
		binding_id: BindingId,
	) -> Option<BindingRecord> {
		state.write().instances.get_mut(&instance_id)?.bindings.remove(&binding_id)
	}
}
impl LifecycleStore for MemoryStore {
	fn create_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		record: InstanceRecord,
	) -> StoreFuture<'a, CreateOutcome<InstanceRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();

		Box::pin(async move { Ok(Self::create_instance_now(state, instance_id, record)) })
	}

	fn fetch_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
	) -> StoreFuture<'a, Option<InstanceRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();

		Box::pin(async move {
			Ok(state.read().instances.get(&instance_id).map(|entry| entry.record.clone()))
		})
	}

	fn update_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		change: InstanceChange,
	) -> StoreFuture<'a, Option<InstanceRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();

		Box::pin(async move { Ok(Self::update_instance_now(state, instance_id, change)) })
	}

	fn remove_instance<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		operation: OperationRecord,
	) -> StoreFuture<'a, Option<InstanceRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();

		Box::pin(async move { Ok(Self::remove_instance_now(state, instance_id, operation)) })
	}

	fn fetch_retired<'a>(
		&'a self,
		instance_id: &'a InstanceId,
	) -> StoreFuture<'a, Option<OperationRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();

		Box::pin(async move { Ok(state.read().retired.get(&instance_id).cloned()) })
	}

	fn create_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
		record: BindingRecord,
	) -> StoreFuture<'a, CreateOutcome<BindingRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();
		let binding_id = binding_id.to_owned();

		Box::pin(
			async move { Ok(Self::create_binding_now(state, instance_id, binding_id, record)) },
		)
	}

	fn fetch_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
	) -> StoreFuture<'a, Option<BindingRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();
		let binding_id = binding_id.to_owned();

		Box::pin(async move { Ok(Self::fetch_binding_now(state, instance_id, binding_id)) })
	}

	fn remove_binding<'a>(
		&'a self,
		instance_id: &'a InstanceId,
		binding_id: &'a BindingId,
	) -> StoreFuture<'a, Option<BindingRecord>> {
		let state = self.0.clone();
		let instance_id = instance_id.to_owned();
		let binding_id = binding_id.to_owned();

		Box::pin(async move { Ok(Self::remove_binding_now(state, instance_id, binding_id)) })
	}
}
