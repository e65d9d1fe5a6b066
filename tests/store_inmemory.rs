// self
use service_broker::{
	model::{
		BindingId, BindingRecord, Credentials, InstanceChange, InstanceId, InstanceRecord,
		OperationKind, OperationRecord, OperationToken, Parameters, PlanId, ServiceId,
	},
	store::{CreateOutcome, LifecycleStore, MemoryStore},
};
use time::OffsetDateTime;

fn instance_id(value: &str) -> InstanceId {
	InstanceId::new(value).expect("Failed to build instance identifier for memory store tests.")
}

fn binding_id(value: &str) -> BindingId {
	BindingId::new(value).expect("Failed to build binding identifier for memory store tests.")
}

fn instance_record(plan: &str) -> InstanceRecord {
	InstanceRecord::new(
		ServiceId::new("ABC-service-demo").expect("Service fixture should be valid."),
		PlanId::new(plan).expect("Plan fixture should be valid."),
		Parameters::default(),
		OperationRecord::completed(OperationKind::Provision),
	)
}

fn binding_record(parameters: &[u8]) -> BindingRecord {
	BindingRecord {
		service_id: ServiceId::new("ABC-service-demo").expect("Service fixture should be valid."),
		plan_id: PlanId::new("ABC-plan-shared").expect("Plan fixture should be valid."),
		credentials: Credentials::from_json("{\"port\": \"4000\"}")
			.expect("Credentials fixture should decode."),
		syslog_drain_url: None,
		parameters: Parameters::decode(Some(parameters)).expect("Parameter fixture should decode."),
		last_operation: OperationRecord::completed(OperationKind::Bind),
		bound_at: OffsetDateTime::now_utc(),
	}
}

#[tokio::test]
async fn create_and_fetch_round_trip() {
	let store = MemoryStore::default();
	let id = instance_id("i1");
	let record = instance_record("ABC-plan-shared");
	let outcome = store
		.create_instance(&id, record.clone())
		.await
		.expect("Creating an instance in the memory store should succeed.");

	assert_eq!(outcome, CreateOutcome::Created);

	let fetched = store
		.fetch_instance(&id)
		.await
		.expect("Fetching an instance from the memory store should succeed.")
		.expect("Stored instance should remain present.");

	assert_eq!(fetched, record);
	assert_eq!(store.instance_count(), 1);
}

#[tokio::test]
async fn create_reports_identical_and_conflicting_repeats() {
	let store = MemoryStore::default();
	let id = instance_id("i1");
	let original = instance_record("ABC-plan-shared");

	store.create_instance(&id, original.clone()).await.expect("Initial create should succeed.");

	let identical = store
		.create_instance(&id, instance_record("ABC-plan-shared"))
		.await
		.expect("Identical create should not error.");

	assert_eq!(identical, CreateOutcome::Identical(original.clone()));

	let conflict = store
		.create_instance(&id, instance_record("ABC-plan-dedicated"))
		.await
		.expect("Conflicting create should not error.");

	assert_eq!(conflict, CreateOutcome::Conflict(original.clone()));

	let fetched = store
		.fetch_instance(&id)
		.await
		.expect("Fetching after conflict should succeed.")
		.expect("Original instance should remain present.");

	assert_eq!(fetched, original);
}

#[tokio::test]
async fn remove_erases_bindings_and_retires_identifier() {
	let store = MemoryStore::default();
	let id = instance_id("i1");

	store
		.create_instance(&id, instance_record("ABC-plan-shared"))
		.await
		.expect("Initial create should succeed.");
	store
		.create_binding(&id, &binding_id("b1"), binding_record(b"{}"))
		.await
		.expect("Binding create should succeed.");

	assert_eq!(store.binding_count(), 1);

	let operation = OperationRecord::fake_async(
		OperationKind::Deprovision,
		OperationToken::new(OperationKind::Deprovision, 7),
	);
	let removed = store
		.remove_instance(&id, operation.clone())
		.await
		.expect("Removing an instance should not error.");

	assert!(removed.is_some());
	assert_eq!(store.instance_count(), 0);
	assert_eq!(store.binding_count(), 0);
	assert!(store.is_retired(&id));
	assert_eq!(
		store.fetch_retired(&id).await.expect("Fetching a retired operation should not error."),
		Some(operation)
	);
	assert!(
		store
			.fetch_retired(&instance_id("i2"))
			.await
			.expect("Fetching an unknown identifier should not error.")
			.is_none()
	);

	let again = store
		.create_instance(&id, instance_record("ABC-plan-shared"))
		.await
		.expect("Re-creating a retired instance should not error.");

	assert_eq!(again, CreateOutcome::Retired);
	assert!(
		store
			.remove_instance(&id, OperationRecord::completed(OperationKind::Deprovision))
			.await
			.expect("Second removal should not error.")
			.is_none()
	);
	assert_eq!(
		store
			.fetch_retired(&id)
			.await
			.expect("Fetching a retired operation should not error.")
			.and_then(|operation| operation.token),
		Some(OperationToken::new(OperationKind::Deprovision, 7))
	);
}

#[tokio::test]
async fn update_applies_change_to_existing_instance_only() {
	let store = MemoryStore::default();
	let id = instance_id("i1");
	let change = InstanceChange {
		plan_id: Some(PlanId::new("ABC-plan-dedicated").expect("Plan fixture should be valid.")),
		parameters: None,
		operation: OperationRecord::completed(OperationKind::Update),
	};

	assert!(
		store
			.update_instance(&id, change.clone())
			.await
			.expect("Updating a missing instance should not error.")
			.is_none()
	);

	store
		.create_instance(&id, instance_record("ABC-plan-shared"))
		.await
		.expect("Initial create should succeed.");

	let updated = store
		.update_instance(&id, change)
		.await
		.expect("Updating an instance should succeed.")
		.expect("Updated instance should be returned.");

	assert_eq!(updated.plan_id.as_ref(), "ABC-plan-dedicated");
	assert_eq!(updated.last_operation.kind, OperationKind::Update);
}

#[tokio::test]
async fn bindings_require_parent_instance() {
	let store = MemoryStore::default();
	let id = instance_id("i1");
	let binding = binding_id("b1");
	let outcome = store
		.create_binding(&id, &binding, binding_record(b"{}"))
		.await
		.expect("Binding against a missing instance should not error.");

	assert_eq!(outcome, CreateOutcome::MissingInstance);
	assert_eq!(store.binding_count(), 0);

	store
		.create_instance(&id, instance_record("ABC-plan-shared"))
		.await
		.expect("Initial create should succeed.");

	let original = binding_record(b"{\"role\": \"reader\"}");

	assert_eq!(
		store
			.create_binding(&id, &binding, original.clone())
			.await
			.expect("Binding create should succeed."),
		CreateOutcome::Created
	);
	assert_eq!(
		store
			.create_binding(&id, &binding, binding_record(b"{\"role\": \"writer\"}"))
			.await
			.expect("Conflicting binding create should not error."),
		CreateOutcome::Conflict(original.clone())
	);
	assert_eq!(
		store
			.remove_binding(&id, &binding)
			.await
			.expect("Removing a binding should not error."),
		Some(original)
	);
	assert!(
		store
			.fetch_binding(&id, &binding)
			.await
			.expect("Fetching a removed binding should not error.")
			.is_none()
	);
}

#[tokio::test]
async fn concurrent_creates_allow_single_winner() {
	let store = MemoryStore::default();
	let id = instance_id("i-race");
	let tasks = ["ABC-plan-a", "ABC-plan-b", "ABC-plan-c", "ABC-plan-d"].map(|plan| {
		let store = store.clone();
		let id = id.clone();

		tokio::spawn(async move {
			store
				.create_instance(&id, instance_record(plan))
				.await
				.expect("Concurrent create should complete successfully.")
		})
	});
	let mut created = 0;
	let mut conflicts = 0;

	for task in tasks {
		match task.await.expect("Create task should not panic.") {
			CreateOutcome::Created => created += 1,
			CreateOutcome::Conflict(_) => conflicts += 1,
			other => panic!("Unexpected create outcome: {other:?}."),
		}
	}

	assert_eq!(created, 1, "only one create should win");
	assert_eq!(conflicts, 3);
	assert_eq!(store.instance_count(), 1);
}
