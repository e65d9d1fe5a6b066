//! Broker-level error types and their mapping onto protocol status codes.

// self
use crate::{
	_prelude::*,
	model::{BindingId, InstanceId},
	obs::Call,
};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical broker error exposed by every lifecycle operation.
///
/// A failed operation never leaves a partial mutation behind in the lifecycle store.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A parameter or credentials document could not be decoded.
	#[error(transparent)]
	MalformedInput(#[from] MalformedInputError),

	/// The instance identifier was never provisioned (or was already deprovisioned).
	#[error("Instance `{instance_id}` does not exist.")]
	InstanceNotFound {
		/// Instance identifier supplied by the platform.
		instance_id: InstanceId,
	},
	/// The binding identifier is not bound to the instance.
	#[error("Binding `{binding_id}` does not exist for instance `{instance_id}`.")]
	BindingNotFound {
		/// Instance identifier supplied by the platform.
		instance_id: InstanceId,
		/// Binding identifier supplied by the platform.
		binding_id: BindingId,
	},
	/// The instance identifier is already taken by a record with different attributes.
	#[error("Instance `{instance_id}` already exists with different attributes.")]
	InstanceAlreadyExists {
		/// Instance identifier supplied by the platform.
		instance_id: InstanceId,
	},
	/// The binding identifier is already bound with different attributes.
	#[error("Binding `{binding_id}` already exists with different attributes.")]
	BindingAlreadyExists {
		/// Instance identifier supplied by the platform.
		instance_id: InstanceId,
		/// Binding identifier supplied by the platform.
		binding_id: BindingId,
	},
	/// The broker only answers asynchronously but the caller did not accept incomplete results.
	#[error("This service plan requires client support for asynchronous service operations.")]
	AsyncRequired,
	/// The broker is not configured to serve the requested operation.
	#[error("The {operation} operation is not supported by this broker.")]
	Unsupported {
		/// Operation label.
		operation: &'static str,
	},
	/// The polled operation token does not match the resource's last operation.
	#[error("Operation `{token}` is unknown for this resource.")]
	UnknownOperation {
		/// Token echoed by the platform.
		token: String,
	},
}
impl Error {
	/// Protocol status code for this failure, independent of the call that raised it.
	pub fn status_code(&self) -> u16 {
		match self {
			Error::Storage(_) | Error::Config(_) => 500,
			Error::MalformedInput(e) => match e.document {
				DocumentKind::Parameters => 400,
				DocumentKind::Credentials => 500,
			},
			Error::InstanceNotFound { .. } | Error::BindingNotFound { .. } => 404,
			Error::InstanceAlreadyExists { .. } | Error::BindingAlreadyExists { .. } => 409,
			Error::AsyncRequired => 422,
			Error::Unsupported { .. } => 501,
			Error::UnknownOperation { .. } => 400,
		}
	}

	/// Protocol status code for this failure when returned from `call`.
	///
	/// Deletions and polls report a vanished resource as `410 Gone`.
	pub fn status_code_for(&self, call: Call) -> u16 {
		let not_found =
			matches!(self, Error::InstanceNotFound { .. } | Error::BindingNotFound { .. });

		match call {
			Call::Deprovision
			| Call::Unbind
			| Call::LastOperation
			| Call::LastBindingOperation
				if not_found =>
				410,
			_ => self.status_code(),
		}
	}

	/// Machine-readable error code defined by the protocol, when one applies.
	pub fn error_code(&self) -> Option<&'static str> {
		match self {
			Error::AsyncRequired => Some("AsyncRequired"),
			_ => None,
		}
	}

	/// Builds the failure body the transport layer serializes.
	pub fn body(&self) -> ErrorBody {
		ErrorBody { error: self.error_code(), description: self.to_string() }
	}
}

/// Serialized failure body: `{"error": "...", "description": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
	/// Machine-readable code; omitted when the protocol defines none.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<&'static str>,
	/// Human-readable description.
	pub description: String,
}

/// Configuration and validation failures raised while building a broker.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// A required text field was empty.
	#[error("The {field} setting cannot be empty.")]
	EmptyField {
		/// Setting name.
		field: &'static str,
	},
	/// A text field that becomes part of a catalog identifier contains whitespace.
	#[error("The {field} setting cannot contain whitespace.")]
	ContainsWhitespace {
		/// Setting name.
		field: &'static str,
	},
	/// Static credentials document could not be decoded.
	#[error("Configured credentials are invalid.")]
	Credentials(#[source] MalformedInputError),
	/// Only one half of the broker credential pair was supplied.
	#[error("Broker authentication requires both a username and a password.")]
	IncompleteAuth,
}

/// Which opaque document failed to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
	/// Platform-supplied `parameters` object.
	Parameters,
	/// Configured static credentials.
	Credentials,
}
impl DocumentKind {
	/// Returns a stable label for messages.
	pub const fn as_str(self) -> &'static str {
		match self {
			DocumentKind::Parameters => "parameters",
			DocumentKind::Credentials => "credentials",
		}
	}
}

/// Failure to decode an opaque JSON document into an object.
#[derive(Debug, ThisError)]
#[error("The {} document is malformed at `{path}`: {message}.", .document.as_str())]
pub struct MalformedInputError {
	/// Document that failed to decode.
	pub document: DocumentKind,
	/// Path inside the document where decoding stopped (`.` for the root).
	pub path: String,
	/// Decoder message.
	pub message: String,
}
impl MalformedInputError {
	/// Wraps a structured decoding failure for the provided document.
	pub fn from_decode(
		document: DocumentKind,
		err: serde_path_to_error::Error<serde_json::Error>,
	) -> Self {
		Self { document, path: err.path().to_string(), message: err.into_inner().to_string() }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn instance(id: &str) -> InstanceId {
		InstanceId::new(id).expect("Instance fixture should be valid.")
	}

	#[test]
	fn status_codes_follow_protocol_contract() {
		assert_eq!(Error::AsyncRequired.status_code(), 422);
		assert_eq!(Error::InstanceAlreadyExists { instance_id: instance("i1") }.status_code(), 409);
		assert_eq!(Error::InstanceNotFound { instance_id: instance("i1") }.status_code(), 404);
		assert_eq!(Error::Unsupported { operation: "get_instance" }.status_code(), 501);
	}

	#[test]
	fn vanished_resources_are_gone_for_deletes_and_polls() {
		let err = Error::InstanceNotFound { instance_id: instance("i1") };

		assert_eq!(err.status_code_for(Call::GetInstance), 404);
		assert_eq!(err.status_code_for(Call::Deprovision), 410);
		assert_eq!(err.status_code_for(Call::LastOperation), 410);
		assert_eq!(Error::AsyncRequired.status_code_for(Call::Deprovision), 422);
	}

	#[test]
	fn body_carries_async_required_code() {
		let body = serde_json::to_value(Error::AsyncRequired.body())
			.expect("Error body should serialize to JSON.");

		assert_eq!(body["error"], "AsyncRequired");
		assert!(body["description"].as_str().is_some_and(|text| text.contains("asynchronous")));

		let body = serde_json::to_value(
			Error::InstanceNotFound { instance_id: instance("missing") }.body(),
		)
		.expect("Error body should serialize to JSON.");

		assert!(body.get("error").is_none());
		assert_eq!(body["description"], "Instance `missing` does not exist.");
	}

	#[test]
	fn malformed_parameters_keep_decoder_path() {
		let mut de = serde_json::Deserializer::from_str("[1, 2]");
		let err = serde_path_to_error::deserialize::<_, JsonMap<String, JsonValue>>(&mut de)
			.expect_err("A JSON array should not decode into an object.");
		let malformed = MalformedInputError::from_decode(DocumentKind::Parameters, err);

		assert_eq!(malformed.path, ".");
		assert_eq!(Error::from(malformed).status_code(), 400);
	}
}
