//! Strongly typed platform identifiers used as lifecycle store keys.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "String", into = "String")]
		pub struct $name(String);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: impl AsRef<str>) -> Result<Self, IdentifierError> {
				let view = value.as_ref();

				validate_view($kind, view)?;

				Ok(Self(view.to_owned()))
			}
		}
		impl Deref for $name {
			type Target = str;

			fn deref(&self) -> &Self::Target {
				&self.0
			}
		}
		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
		impl From<$name> for String {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<String> for $name {
			type Error = IdentifierError;

			fn try_from(value: String) -> Result<Self, Self::Error> {
				validate_view($kind, &value)?;

				Ok(Self(value))
			}
		}
		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				f.write_str(&self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				Self::new(s)
			}
		}
	};
}

const IDENTIFIER_MAX_LEN: usize = 255;

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier was empty.
	#[error("{kind} identifier cannot be empty.")]
	Empty {
		/// Kind of identifier (instance, binding, service, plan).
		kind: &'static str,
	},
	/// The identifier contains control characters and cannot be a path segment.
	#[error("{kind} identifier contains control characters.")]
	ContainsControl {
		/// Kind of identifier (instance, binding, service, plan).
		kind: &'static str,
	},
	/// The identifier exceeded the allowed byte length.
	#[error("{kind} identifier exceeds {max} bytes.")]
	TooLong {
		/// Kind of identifier (instance, binding, service, plan).
		kind: &'static str,
		/// Maximum permitted byte length.
		max: usize,
	},
}

def_id! { InstanceId, "Platform-supplied identifier of a service instance.", "Instance" }
def_id! { BindingId, "Platform-supplied identifier of a binding, unique per instance.", "Binding" }
def_id! { ServiceId, "Catalog service identifier echoed by the platform.", "Service" }
def_id! { PlanId, "Catalog plan identifier echoed by the platform.", "Plan" }

fn validate_view(kind: &'static str, view: &str) -> Result<(), IdentifierError> {
	if view.is_empty() {
		return Err(IdentifierError::Empty { kind });
	}
	if view.chars().any(char::is_control) {
		return Err(IdentifierError::ContainsControl { kind });
	}
	if view.len() > IDENTIFIER_MAX_LEN {
		return Err(IdentifierError::TooLong { kind, max: IDENTIFIER_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_are_opaque_but_validated() {
		let instance = InstanceId::new("6b9b6d33-2c1c-4c62-9d55-1c2c0ad5e0e1")
			.expect("GUID-shaped instance identifiers should be valid.");

		assert_eq!(instance.as_ref(), "6b9b6d33-2c1c-4c62-9d55-1c2c0ad5e0e1");
		assert!(InstanceId::new("").is_err());
		assert!(BindingId::new("line\nbreak").is_err());
		assert_eq!(
			PlanId::new("a".repeat(IDENTIFIER_MAX_LEN + 1)),
			Err(IdentifierError::TooLong { kind: "Plan", max: IDENTIFIER_MAX_LEN })
		);
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let service: ServiceId = serde_json::from_str("\"ABC-service-demo\"")
			.expect("Service identifier should deserialize successfully.");

		assert_eq!(format!("{service:?}"), "Service(ABC-service-demo)");
		assert!(serde_json::from_str::<ServiceId>("\"\"").is_err());
	}

	#[test]
	fn borrow_supports_fast_lookup() {
		let map: HashMap<InstanceId, u8> = HashMap::from_iter([(
			InstanceId::new("i1").expect("Instance used for lookup should be valid."),
			7_u8,
		)]);

		assert_eq!(map.get("i1"), Some(&7));
	}
}
