//! Engine-level error types shared across flows, providers, and the state codec.

// self
use crate::{_prelude::*, provider::EndpointKind};

/// Engine-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical login error exposed by public APIs.
///
/// Every variant aborts the login attempt; the engine never retries and never returns a
/// partial identity.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected before any network call.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Round-trip state could not be validated.
	#[error(transparent)]
	State(#[from] StateError),
	/// Network failure or unsuccessful provider response.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider response did not match any supported wire format.
	#[error(transparent)]
	Parse(#[from] ParseError),
	/// Profile resolved but no stable subject identifier could be derived.
	#[error(transparent)]
	Identity(#[from] IdentityError),

	/// The ticket hook stopped the flow.
	#[error("Login was aborted by the ticket hook: {reason}.")]
	AbortedByCaller {
		/// Caller-supplied reason string.
		reason: String,
	},
}
impl Error {
	/// Returns true when the failure was requested by the caller's ticket hook rather than
	/// caused by the provider or the network.
	pub fn is_caller_abort(&self) -> bool {
		matches!(self, Self::AbortedByCaller { .. })
	}

	/// Returns the upstream HTTP status attached to the failure, if any.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			Self::Transport(TransportError::Status { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before contacting the provider.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Client identifier is empty.
	#[error("Client identifier must not be empty.")]
	MissingClientId,
	/// Client secret is missing or empty.
	#[error("Client secret must not be empty.")]
	MissingClientSecret,
	/// Callback query lacks a required parameter.
	#[error("Callback is missing the `{name}` parameter.")]
	MissingCallbackParameter {
		/// Parameter name.
		name: &'static str,
	},
	/// Configured preset name is unknown.
	#[error("Unknown provider preset `{name}`.")]
	UnknownPreset {
		/// Preset name supplied by the configuration.
		name: String,
	},
	/// State signing key is too short.
	#[error("State signing key must be at least {min} bytes.")]
	InvalidStateKey {
		/// Minimum key length in bytes.
		min: usize,
	},
	/// State protector could not serialize the flow state.
	#[error("Flow state could not be serialized.")]
	StateEncode(#[source] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while validating a protected `state` value.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum StateError {
	/// Value is not in the `payload.signature` shape or is not valid base64/JSON.
	#[error("State value is malformed.")]
	Malformed,
	/// Signature does not match the payload.
	#[error("State value failed integrity verification.")]
	Tampered,
	/// State is older than the protector's lifetime.
	#[error("State value expired at {expired_at}.")]
	Expired {
		/// Instant the state stopped being valid.
		expired_at: OffsetDateTime,
	},
	/// State has already been accepted once.
	#[error("State value has already been used.")]
	Replayed,
	/// Correlation marker does not match the value held by the caller.
	#[error("State correlation marker does not match.")]
	CorrelationMismatch,
}

/// Transport-level failures (network, cancellation, unsuccessful responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the {endpoint} endpoint.")]
	Network {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the {endpoint} endpoint.")]
	Io {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// IO failure.
		#[source]
		source: std::io::Error,
	},
	/// The surrounding request was cancelled before the call completed.
	#[error("Call to the {endpoint} endpoint was aborted.")]
	Aborted {
		/// Endpoint being called.
		endpoint: EndpointKind,
	},
	/// Provider answered with a non-success HTTP status.
	#[error("The {endpoint} endpoint returned HTTP {status}: {body}.")]
	Status {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// HTTP status code.
		status: u16,
		/// Truncated response body for diagnostics.
		body: String,
	},
	/// Provider answered successfully on the wire but reported an error in the payload.
	#[error("The {endpoint} endpoint rejected the request with `{error}`.")]
	Rejected {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Provider error code.
		error: String,
		/// Provider error description, when supplied.
		description: Option<String>,
	},
	/// Transport reported a failure it could not classify.
	#[error("HTTP client error occurred while calling the {endpoint} endpoint: {message}.")]
	Other {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Transport-supplied message.
		message: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(
		endpoint: EndpointKind,
		src: impl 'static + Send + Sync + std::error::Error,
	) -> Self {
		Self::Network { endpoint, source: Box::new(src) }
	}
}

/// Response bodies that match none of the supported wire formats.
#[derive(Debug, ThisError)]
pub enum ParseError {
	/// Body could not be decoded as JSON into the expected structure.
	#[error("The {endpoint} endpoint returned malformed JSON.")]
	Json {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Query-string shaped token body lacked an access token.
	#[error("Token endpoint response does not contain an access token.")]
	MissingAccessToken,
	/// Body was expected to be wrapped in `callback(...)` but was not.
	#[error("The {endpoint} endpoint response is not wrapped in a callback envelope.")]
	MissingEnvelope {
		/// Endpoint being called.
		endpoint: EndpointKind,
	},
	/// Body parsed but did not have the expected top-level shape.
	#[error("The {endpoint} endpoint returned {found} where an object was expected.")]
	UnexpectedShape {
		/// Endpoint being called.
		endpoint: EndpointKind,
		/// JSON type that was found instead.
		found: &'static str,
	},
	/// Body is not valid UTF-8.
	#[error("The {endpoint} endpoint returned a body that is not valid UTF-8.")]
	InvalidUtf8 {
		/// Endpoint being called.
		endpoint: EndpointKind,
	},
}

/// Failures deriving a stable identity from a resolved profile.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum IdentityError {
	/// No subject identifier could be extracted.
	#[error("Provider `{provider}` did not supply a subject identifier.")]
	MissingSubject {
		/// Provider identifier string.
		provider: String,
	},
}
