//! Last-operation bookkeeping shared by instances and bindings.

// self
use crate::_prelude::*;

/// Lifecycle call that produced an operation record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
	/// Instance creation.
	Provision,
	/// Plan or parameter change.
	Update,
	/// Instance removal.
	Deprovision,
	/// Binding creation.
	Bind,
	/// Binding removal.
	Unbind,
}
impl OperationKind {
	/// Returns a stable label used in operation tokens.
	pub const fn as_str(self) -> &'static str {
		match self {
			OperationKind::Provision => "provision",
			OperationKind::Update => "update",
			OperationKind::Deprovision => "deprovision",
			OperationKind::Bind => "bind",
			OperationKind::Unbind => "unbind",
		}
	}
}
impl Display for OperationKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// State reported to the platform by last-operation polls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationState {
	/// Work is still running; the platform keeps polling.
	#[serde(rename = "in progress")]
	InProgress,
	/// Terminal success.
	#[serde(rename = "succeeded")]
	Succeeded,
	/// Terminal failure.
	#[serde(rename = "failed")]
	Failed,
}

/// Opaque token returned with asynchronous responses and echoed back on polls.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationToken(String);
impl OperationToken {
	/// Builds the token for the `sequence`-th operation of the given kind.
	pub fn new(kind: OperationKind, sequence: u64) -> Self {
		Self(format!("{kind}-{sequence}"))
	}

	/// Returns the token text.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}
impl Display for OperationToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

/// Most recent lifecycle operation recorded against an instance or binding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationRecord {
	/// Call that produced the record.
	pub kind: OperationKind,
	/// Token issued for asynchronous responses; `None` when the call answered synchronously.
	pub token: Option<OperationToken>,
	/// Current state.
	pub state: OperationState,
	/// Human-readable description returned to pollers.
	pub description: Option<String>,
	/// Instant the record was last written.
	#[serde(with = "time::serde::rfc3339")]
	pub updated_at: OffsetDateTime,
}
impl OperationRecord {
	/// Description attached to simulated asynchronous operations.
	pub const FAKE_ASYNC_DESCRIPTION: &'static str = "fake async in action";

	/// Records an operation that completed before the response was sent.
	pub fn completed(kind: OperationKind) -> Self {
		Self {
			kind,
			token: None,
			state: OperationState::Succeeded,
			description: None,
			updated_at: OffsetDateTime::now_utc(),
		}
	}

	/// Records a simulated asynchronous operation.
	///
	/// Nothing runs in the background, so the very first poll already observes `succeeded`.
	pub fn fake_async(kind: OperationKind, token: OperationToken) -> Self {
		Self {
			kind,
			token: Some(token),
			state: OperationState::Succeeded,
			description: Some(Self::FAKE_ASYNC_DESCRIPTION.into()),
			updated_at: OffsetDateTime::now_utc(),
		}
	}

	/// Returns `true` if the operation was answered asynchronously.
	pub fn is_async(&self) -> bool {
		self.token.is_some()
	}

	/// Checks a token echoed by the platform; `None` matches any operation.
	pub fn matches(&self, token: Option<&str>) -> bool {
		match token {
			None => true,
			Some(value) => self.token.as_ref().is_some_and(|own| own.as_str() == value),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn states_serialize_with_protocol_spelling() {
		assert_eq!(
			serde_json::to_string(&OperationState::InProgress).expect("State should serialize."),
			"\"in progress\""
		);
		assert_eq!(
			serde_json::to_string(&OperationState::Succeeded).expect("State should serialize."),
			"\"succeeded\""
		);
		assert_eq!(
			serde_json::from_str::<OperationState>("\"failed\"").expect("State should parse."),
			OperationState::Failed
		);
	}

	#[test]
	fn token_matching_is_optional() {
		let record = OperationRecord::fake_async(
			OperationKind::Provision,
			OperationToken::new(OperationKind::Provision, 3),
		);

		assert!(record.is_async());
		assert!(record.matches(None));
		assert!(record.matches(Some("provision-3")));
		assert!(!record.matches(Some("update-3")));
		assert!(!OperationRecord::completed(OperationKind::Bind).matches(Some("bind-1")));
	}
}
