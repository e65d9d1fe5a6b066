//! Opaque JSON documents carried verbatim through the broker.
//!
//! Neither document is interpreted; the broker only requires that each decodes to a JSON
//! object so a malformed payload is rejected instead of silently becoming an empty record.

// self
use crate::{
	_prelude::*,
	error::{DocumentKind, MalformedInputError},
};

fn decode_object(
	document: DocumentKind,
	raw: &[u8],
) -> Result<JsonMap<String, JsonValue>, MalformedInputError> {
	let mut de = serde_json::Deserializer::from_slice(raw);
	let map = serde_path_to_error::deserialize(&mut de)
		.map_err(|e| MalformedInputError::from_decode(document, e))?;

	de.end().map_err(|e| MalformedInputError {
		document,
		path: ".".into(),
		message: e.to_string(),
	})?;

	Ok(map)
}

/// Static credentials handed to every binding.
///
/// Values are kept out of `Debug` output; only the key names are shown.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credentials(JsonMap<String, JsonValue>);
impl Credentials {
	/// Wraps an already-decoded credentials object.
	pub fn new(map: JsonMap<String, JsonValue>) -> Self {
		Self(map)
	}

	/// Decodes a credentials document from JSON text; the document must be an object.
	pub fn from_json(raw: &str) -> Result<Self, MalformedInputError> {
		decode_object(DocumentKind::Credentials, raw.as_bytes()).map(Self)
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}

	/// Returns the underlying object. Callers must avoid logging the values.
	pub fn expose(&self) -> &JsonMap<String, JsonValue> {
		&self.0
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials").field("keys", &self.0.keys().collect::<Vec<_>>()).finish()
	}
}

/// Platform-supplied `parameters` object attached to a provision, update, or bind request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(JsonMap<String, JsonValue>);
impl Parameters {
	/// Decodes raw request parameters.
	///
	/// A missing, blank, or `null` document yields empty parameters; anything else must be a
	/// JSON object.
	pub fn decode(raw: Option<&[u8]>) -> Result<Self, MalformedInputError> {
		let Some(raw) = raw else {
			return Ok(Self::default());
		};
		let trimmed = raw.trim_ascii();

		if trimmed.is_empty() || trimmed == b"null" {
			return Ok(Self::default());
		}

		decode_object(DocumentKind::Parameters, trimmed).map(Self)
	}

	/// Returns `true` if no parameters were supplied.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Returns the value stored under `key`.
	pub fn get(&self, key: &str) -> Option<&JsonValue> {
		self.0.get(key)
	}
}
impl From<JsonMap<String, JsonValue>> for Parameters {
	fn from(map: JsonMap<String, JsonValue>) -> Self {
		Self(map)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn credentials_debug_hides_values() {
		let credentials = Credentials::from_json("{\"port\": \"4000\", \"password\": \"hunter2\"}")
			.expect("Credentials fixture should decode.");
		let rendered = format!("{credentials:?}");

		assert!(rendered.contains("port"));
		assert!(!rendered.contains("hunter2"));
		assert_eq!(credentials.get("port"), Some(&JsonValue::from("4000")));
	}

	#[test]
	fn credentials_must_be_an_object() {
		let err = Credentials::from_json("[\"port\"]").expect_err("Arrays are not credentials.");

		assert_eq!(err.document, DocumentKind::Credentials);
		assert!(Credentials::from_json("{\"port\": 4000} trailing").is_err());
	}

	#[test]
	fn absent_parameters_decode_to_empty() {
		assert!(Parameters::decode(None).expect("Missing parameters are allowed.").is_empty());
		assert!(Parameters::decode(Some(b"  ")).expect("Blank parameters are allowed.").is_empty());
		assert!(Parameters::decode(Some(b"null")).expect("Null is allowed.").is_empty());
	}

	#[test]
	fn parameters_keep_structure_verbatim() {
		let parameters = Parameters::decode(Some(br#"{"size": {"gb": 10}, "tags": ["a"]}"#))
			.expect("Object parameters should decode.");

		assert_eq!(parameters.get("size"), Some(&serde_json::json!({ "gb": 10 })));
		assert_eq!(
			serde_json::to_value(&parameters).expect("Parameters should serialize."),
			serde_json::json!({ "size": { "gb": 10 }, "tags": ["a"] })
		);
	}

	#[test]
	fn malformed_parameters_are_rejected() {
		let err =
			Parameters::decode(Some(b"{\"size\": ")).expect_err("Truncated JSON must not decode.");

		assert_eq!(err.document, DocumentKind::Parameters);
		assert!(Parameters::decode(Some(b"42")).is_err());
	}
}
