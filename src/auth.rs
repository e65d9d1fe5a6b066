//! Shared basic-auth credential pair the platform presents on every broker call.
//!
//! Request filtering itself belongs to the transport layer; this module only answers whether
//! a presented username/password (or an `Authorization` header) matches the configured pair.

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use sha2::{Digest, Sha256};
// self
use crate::_prelude::*;

/// Redacted secret wrapper keeping the broker password out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);
impl Secret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Secret").field(&"<redacted>").finish()
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Username/password pair guarding the broker API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrokerCredentials {
	/// Expected username.
	pub username: String,
	/// Expected password.
	pub password: Secret,
}
impl BrokerCredentials {
	/// Creates a credential pair.
	pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
		Self { username: username.into(), password: Secret::new(password) }
	}

	/// Checks a presented username/password pair.
	///
	/// Both sides are hashed with SHA-256 and the digests compared in constant time.
	pub fn verify(&self, username: &str, password: &str) -> bool {
		let user_ok = digest_eq(&self.username, username);
		let pass_ok = digest_eq(self.password.expose(), password);

		user_ok & pass_ok
	}

	/// Checks an `Authorization: Basic <base64(user:pass)>` header value.
	pub fn verify_header(&self, header: &str) -> bool {
		let Some((scheme, encoded)) = header.trim().split_once(' ') else {
			return false;
		};

		if !scheme.eq_ignore_ascii_case("basic") {
			return false;
		}

		let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
			return false;
		};
		let Ok(decoded) = String::from_utf8(decoded) else {
			return false;
		};

		match decoded.split_once(':') {
			Some((username, password)) => self.verify(username, password),
			None => false,
		}
	}
}

fn digest_eq(expected: &str, presented: &str) -> bool {
	let expected = Sha256::digest(expected.as_bytes());
	let presented = Sha256::digest(presented.as_bytes());

	expected.iter().zip(presented.iter()).fold(0_u8, |acc, (a, b)| acc | (a ^ b)) == 0
}
