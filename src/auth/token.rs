//! Token material returned by the provider's token endpoint.
//!
//! [`TokenResponse`] is the single internal shape every wire format is normalized into.
//! Secrets are wrapped in [`TokenSecret`] so they never reach logs.

// crates.io
use serde::{Deserializer, de::Error as DeError};
// self
use crate::{_prelude::*, error::ParseError, provider::EndpointKind};

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Successful token exchange result.
///
/// Held in memory for the duration of one login attempt only; the engine never persists it.
#[derive(Clone)]
pub struct TokenResponse {
	/// Access token secret.
	pub access_token: TokenSecret,
	/// Token type reported by the provider (usually `bearer`).
	pub token_type: Option<String>,
	/// Relative lifetime reported by the provider.
	pub expires_in: Option<Duration>,
	/// Refresh token, when the provider issued one. The engine never uses it.
	pub refresh_token: Option<TokenSecret>,
	/// Granted scope string exactly as the provider returned it.
	pub scope: Option<String>,
	/// Remaining non-secret fields (e.g. `openid`, `douban_user_id`).
	pub extra: JsonMap<String, Value>,
	/// Instant the response was parsed.
	pub received_at: OffsetDateTime,
}
impl TokenResponse {
	const ACCESS_TOKEN: &'static str = "access_token";
	const REFRESH_TOKEN: &'static str = "refresh_token";

	/// Builds a response from a normalized field map, regardless of the original wire format.
	pub fn from_fields(mut fields: JsonMap<String, Value>) -> Result<Self, ParseError> {
		match fields.get(Self::ACCESS_TOKEN) {
			None | Some(Value::Null) => return Err(ParseError::MissingAccessToken),
			Some(Value::String(token)) if token.is_empty() =>
				return Err(ParseError::MissingAccessToken),
			_ => (),
		}

		let wire: WireToken =
			serde_path_to_error::deserialize(Value::Object(fields.clone())).map_err(|source| {
				ParseError::Json { endpoint: EndpointKind::Token, source }
			})?;

		fields.remove(Self::ACCESS_TOKEN);
		fields.remove(Self::REFRESH_TOKEN);

		Ok(Self {
			access_token: TokenSecret::new(wire.access_token),
			token_type: wire.token_type,
			expires_in: wire
				.expires_in
				.map(|secs| Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))),
			refresh_token: wire.refresh_token.filter(|s| !s.is_empty()).map(TokenSecret::new),
			scope: wire.scope,
			extra: fields,
			received_at: OffsetDateTime::now_utc(),
		})
	}

	/// Returns a non-secret field as a string (numbers are rendered in decimal).
	pub fn extra_str(&self, key: &str) -> Option<String> {
		match self.extra.get(key)? {
			Value::String(value) if !value.is_empty() => Some(value.clone()),
			Value::Number(value) => Some(value.to_string()),
			_ => None,
		}
	}

	/// Absolute expiry instant, when the provider reported a lifetime.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.expires_in.and_then(|ttl| self.received_at.checked_add(ttl))
	}
}
impl Debug for TokenResponse {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResponse")
			.field("access_token", &self.access_token)
			.field("token_type", &self.token_type)
			.field("expires_in", &self.expires_in)
			.field("refresh_token_set", &self.refresh_token.is_some())
			.field("scope", &self.scope)
			.field("extra", &self.extra)
			.finish()
	}
}

#[derive(Deserialize)]
struct WireToken {
	access_token: String,
	#[serde(default)]
	token_type: Option<String>,
	#[serde(default, deserialize_with = "lenient_seconds")]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	scope: Option<String>,
}

// Query-string bodies carry every value as text.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	#[derive(Deserialize)]
	#[serde(untagged)]
	enum Raw {
		Number(u64),
		Text(String),
	}

	match <Option<Raw>>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Raw::Number(secs)) => Ok(Some(secs)),
		Some(Raw::Text(text)) if text.trim().is_empty() => Ok(None),
		Some(Raw::Text(text)) => text.trim().parse().map(Some).map_err(DeError::custom),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn fields(value: Value) -> JsonMap<String, Value> {
		match value {
			Value::Object(map) => map,
			other => panic!("Fixture must be an object, got {other:?}."),
		}
	}

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn numeric_and_textual_lifetimes_are_equivalent() {
		let numeric = TokenResponse::from_fields(fields(serde_json::json!({
			"access_token": "T",
			"expires_in": 7776000
		})))
		.expect("Numeric lifetime should parse.");
		let textual = TokenResponse::from_fields(fields(serde_json::json!({
			"access_token": "T",
			"expires_in": "7776000"
		})))
		.expect("Textual lifetime should parse.");

		assert_eq!(numeric.expires_in, Some(Duration::seconds(7_776_000)));
		assert_eq!(numeric.expires_in, textual.expires_in);
		assert!(numeric.expires_at().is_some());
	}

	#[test]
	fn secrets_are_removed_from_extra_fields() {
		let response = TokenResponse::from_fields(fields(serde_json::json!({
			"access_token": "T",
			"refresh_token": "R",
			"douban_user_id": "1000",
			"uid": 42
		})))
		.expect("Token fields should parse.");

		assert_eq!(response.access_token.expose(), "T");
		assert_eq!(response.refresh_token.as_ref().map(TokenSecret::expose), Some("R"));
		assert!(!response.extra.contains_key("access_token"));
		assert!(!response.extra.contains_key("refresh_token"));
		assert_eq!(response.extra_str("douban_user_id").as_deref(), Some("1000"));
		assert_eq!(response.extra_str("uid").as_deref(), Some("42"));
		assert!(!format!("{response:?}").contains("\"T\""));
	}

	#[test]
	fn missing_or_mistyped_tokens_fail() {
		let err = TokenResponse::from_fields(fields(serde_json::json!({ "expires_in": 3600 })))
			.expect_err("Missing access tokens must fail.");

		assert!(matches!(err, ParseError::MissingAccessToken));

		let err = TokenResponse::from_fields(fields(serde_json::json!({ "access_token": 5 })))
			.expect_err("Non-string access tokens must fail.");

		match err {
			ParseError::Json { endpoint, source } => {
				assert_eq!(endpoint, EndpointKind::Token);
				assert_eq!(source.path().to_string(), "access_token");
			},
			other => panic!("Unexpected parse error: {other:?}."),
		}

		let err = TokenResponse::from_fields(fields(serde_json::json!({
			"access_token": "T",
			"expires_in": "soon"
		})))
		.expect_err("Non-numeric lifetimes must fail.");

		assert!(matches!(err, ParseError::Json { .. }));
	}
}
