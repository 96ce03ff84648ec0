//! Shared helpers for flow stages (backchannel dispatch, body decoding, input checks).

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, ParseError, TransportError},
	flows::LoginBroker,
	http::Backchannel,
	oauth::TransportErrorMapper,
	provider::EndpointKind,
};

const BODY_PREVIEW_LIMIT: usize = 256;
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Sends one request through the broker's backchannel and returns the decoded 2xx body.
///
/// The call is dropped as soon as `cancel` fires. Non-2xx responses become
/// [`TransportError::Status`] with a truncated body preview.
pub(crate) async fn dispatch<C, M>(
	broker: &LoginBroker<C, M>,
	endpoint: EndpointKind,
	request: HttpRequest,
	cancel: &CancellationToken,
) -> Result<String>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	if cancel.is_cancelled() {
		return Err(TransportError::Aborted { endpoint }.into());
	}

	let handle = broker.backchannel.handle();
	let response = match cancel.run_until_cancelled(handle.call(request)).await {
		Some(result) =>
			result.map_err(|e| broker.transport_mapper.map_transport_error(endpoint, e))?,
		None => return Err(TransportError::Aborted { endpoint }.into()),
	};
	let status = response.status();
	let body = response.into_body();

	if !status.is_success() {
		return Err(TransportError::Status {
			endpoint,
			status: status.as_u16(),
			body: truncate_preview(&String::from_utf8_lossy(&body)),
		}
		.into());
	}

	String::from_utf8(body).map_err(|_| ParseError::InvalidUtf8 { endpoint }.into())
}

/// Builds a GET request, optionally carrying a bearer token.
pub(crate) fn get_request(url: &Url, bearer: Option<&str>) -> Result<HttpRequest> {
	let mut builder = Request::builder().method(Method::GET).uri(url.as_str());

	if let Some(token) = bearer {
		builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
	}

	Ok(builder.body(Vec::new()).map_err(ConfigError::from)?)
}

/// Builds a form-encoded POST request.
pub(crate) fn form_request<'a, I>(url: &Url, fields: I, accept_json: bool) -> Result<HttpRequest>
where
	I: IntoIterator<Item = (&'a str, &'a str)>,
{
	let body = url::form_urlencoded::Serializer::new(String::new()).extend_pairs(fields).finish();
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

	if accept_json {
		builder = builder.header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
	}

	Ok(builder.body(body.into_bytes()).map_err(ConfigError::from)?)
}

/// Parses a body that must be a JSON object, keeping the failing path for diagnostics.
pub(crate) fn parse_json_object(
	endpoint: EndpointKind,
	text: &str,
) -> Result<JsonMap<String, Value>, ParseError> {
	let mut de = serde_json::Deserializer::from_str(text);
	let value: Value = serde_path_to_error::deserialize(&mut de)
		.map_err(|source| ParseError::Json { endpoint, source })?;

	match value {
		Value::Object(map) => Ok(map),
		other => Err(ParseError::UnexpectedShape { endpoint, found: json_kind(&other) }),
	}
}

/// Renders a scalar payload value as claim or form text.
///
/// Empty strings, nulls, objects, and arrays yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		Value::Bool(flag) => Some(flag.to_string()),
		_ => None,
	}
}

/// Requires a non-empty client identifier.
pub(crate) fn ensure_client_id(client_id: &str) -> Result<(), ConfigError> {
	if client_id.trim().is_empty() { Err(ConfigError::MissingClientId) } else { Ok(()) }
}

/// Requires an absolute redirect URI.
///
/// Only validation happens here; providers receive the caller's text unchanged.
pub(crate) fn ensure_redirect_uri(redirect_uri: &str) -> Result<(), ConfigError> {
	Url::parse(redirect_uri).map(|_| ()).map_err(|source| ConfigError::InvalidRedirect { source })
}

fn truncate_preview(body: &str) -> String {
	if body.chars().count() <= BODY_PREVIEW_LIMIT {
		return body.to_owned();
	}

	let mut buf = body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
