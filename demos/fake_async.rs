//! Walks one instance through provision, bind, and deprovision on a broker that fakes
//! asynchronous operations, polling the last operation after each mutating call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
// self
use service_broker::{
	broker::{BindRequest, Broker, DeprovisionRequest, ProvisionRequest, UpdateRequest},
	config::BrokerConfig,
	model::{BindingId, InstanceId, PlanId, ServiceId},
	store::{LifecycleStore, MemoryStore},
	url::Url,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = BrokerConfig::builder()
		.base_guid("ABC")
		.service_name("demo")
		.plan_name("shared")
		.tags("demo, fake")
		.dashboard_url(Url::parse("https://broker.example.com/dashboard")?)
		.fake_async(true)
		.fake_stateful(true)
		.build()?;
	let store: Arc<dyn LifecycleStore> = Arc::new(MemoryStore::default());
	let broker = Broker::with_store(config, store);
	let catalog = broker.catalog().await?;

	println!("Catalog: {}.", serde_json::to_string(&catalog)?);

	let service_id = ServiceId::new(broker.config().service_id())?;
	let plan_id = PlanId::new(broker.config().plan_id())?;
	let instance_id = InstanceId::new("instance-1")?;
	let binding_id = BindingId::new("binding-1")?;
	let provisioned = broker
		.provision(
			&instance_id,
			ProvisionRequest::new(service_id.clone(), plan_id.clone())
				.with_raw_parameters("{\"size\": \"small\"}")
				.accepts_incomplete(true),
		)
		.await?;
	let token = provisioned.operation.as_ref().map(|token| token.as_str());
	let polled = broker.last_operation(&instance_id, token).await?;

	println!(
		"Provision answered {} and the first poll reports {:?}.",
		provisioned.status_code(),
		polled.state
	);

	let updated = broker
		.update(
			&instance_id,
			UpdateRequest::new(service_id.clone())
				.with_raw_parameters("{\"size\": \"large\"}")
				.accepts_incomplete(true),
		)
		.await?;

	let token = updated.operation.as_ref().map(|token| token.as_str());
	let polled = broker.last_operation(&instance_id, token).await?;

	println!(
		"Update answered {} and the first poll reports {:?}.",
		updated.status_code(),
		polled.state
	);

	let binding = broker
		.bind(&instance_id, &binding_id, BindRequest::new(service_id.clone(), plan_id.clone()))
		.await?;

	println!("Binding credentials: {}.", serde_json::to_string(&binding.credentials.expose())?);

	broker.unbind(&instance_id, &binding_id).await?;

	let deprovisioned = broker
		.deprovision(
			&instance_id,
			DeprovisionRequest::new(service_id, plan_id).accepts_incomplete(true),
		)
		.await?;

	let token = deprovisioned.operation.as_ref().map(|token| token.as_str());
	let polled = broker.last_operation(&instance_id, token).await?;

	println!(
		"Deprovision answered {}, first poll {:?}; {} instance(s) provisioned so far.",
		deprovisioned.status_code(),
		polled.state,
		broker.lifecycle_metrics.provisioned()
	);

	Ok(())
}
