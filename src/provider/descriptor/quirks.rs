// self
use crate::_prelude::*;

/// Wire formats accepted from the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenWireFormat {
	/// Standard JSON object body.
	#[default]
	Json,
	/// `key=value&key2=value2` body despite an OAuth 2.0 token endpoint.
	FormEncoded,
	/// Detects JSON, `callback(...)`-wrapped JSON, or a query-string body.
	Lenient,
}

/// How the access token travels to the profile endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccessTokenTransport {
	/// Query parameter with the given name.
	Query {
		/// Parameter name (usually `access_token`).
		parameter: String,
	},
	/// `Authorization: Bearer <token>` header.
	Bearer,
}
impl Default for AccessTokenTransport {
	fn default() -> Self {
		Self::Query { parameter: "access_token".into() }
	}
}

/// Parameters of the subject-then-profile resolution used by two-step providers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwoStepProfile {
	/// Field of the subject endpoint payload holding the subject identifier.
	pub subject_field: String,
	/// Form field carrying the subject identifier in the profile request.
	pub subject_param: String,
	/// Form field carrying the client identifier in the profile request.
	pub client_id_param: String,
	/// Profile key the subject identifier is merged under before normalization.
	pub merged_key: String,
}
impl Default for TwoStepProfile {
	fn default() -> Self {
		Self {
			subject_field: "openid".into(),
			subject_param: "openid".into(),
			client_id_param: "oauth_consumer_key".into(),
			merged_key: "id".into(),
		}
	}
}

/// Profile resolution strategy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProfileMode {
	/// One GET to the profile endpoint.
	Direct {
		/// Token placement on the profile request.
		#[serde(default)]
		token_transport: AccessTokenTransport,
	},
	/// Subject endpoint (callback-wrapped JSON) followed by a profile POST.
	TwoStep(TwoStepProfile),
}
impl Default for ProfileMode {
	fn default() -> Self {
		Self::Direct { token_transport: AccessTokenTransport::default() }
	}
}

/// Provider-specific quirks that influence how flows behave.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Character used to join scopes when constructing `scope` parameters.
	pub scope_delimiter: char,
	/// Wire format of the token endpoint body.
	pub token_format: TokenWireFormat,
	/// Whether the token request must send `Accept: application/json`.
	pub token_accept_json: bool,
	/// Profile resolution strategy.
	pub profile: ProfileMode,
}
impl Default for ProviderQuirks {
	fn default() -> Self {
		Self {
			scope_delimiter: ' ',
			token_format: TokenWireFormat::default(),
			token_accept_json: false,
			profile: ProfileMode::default(),
		}
	}
}
