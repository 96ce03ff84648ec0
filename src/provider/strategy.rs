//! Provider strategy hooks that absorb per-provider protocol deviations.
//!
//! The flow pipeline is written once; strategies supply the small pure pieces that differ
//! between providers (authorization extensions, token form tweaks, token body parsing, and
//! payload-level error detection) without tying flows to any particular HTTP client.

// self
use crate::{
	_prelude::*,
	auth::TokenResponse,
	error::TransportError,
	flows::{common::scalar_text, parse_token_response},
	provider::{EndpointKind, LoginOptions, TokenWireFormat},
};

/// Strategy hook that allows providers to decorate requests and validate responses.
///
/// Implementors are required to be `Send + Sync` and only see crate-owned data types.
/// Every method has a default, so a strategy overrides only what its provider needs.
pub trait ProviderStrategy: Send + Sync {
	/// Appends non-standard authorization parameters derived from the login options.
	///
	/// Unset options must not add anything.
	fn authorization_extensions(&self, options: &LoginOptions, params: &mut Vec<(String, String)>) {
		push_login_options(options, params);
	}

	/// Gives providers a chance to add custom form parameters before the token exchange.
	///
	/// The method works on a plain `BTreeMap` so implementations remain HTTP client agnostic.
	fn augment_token_request(&self, _form: &mut BTreeMap<String, String>) {}

	/// Parses a successful token endpoint body.
	fn parse_token_response(&self, format: TokenWireFormat, body: &str) -> Result<TokenResponse> {
		parse_token_response(format, body)
	}

	/// Rejects 2xx payloads that still describe a provider-side failure.
	fn inspect_profile(&self, endpoint: EndpointKind, payload: &JsonMap<String, Value>) -> Result<()> {
		reject_error_fields(endpoint, payload)
	}
}

/// Strategy for providers that follow the common conventions.
///
/// Options map onto `display`, `force_login`, `confirm_login`, and `login_type`; payloads with
/// a top-level `error` or `error_code` field are rejected.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {}

/// Strategy for Tencent QQ, whose payloads report failures through a non-zero `ret`.
#[derive(Debug, Default)]
pub struct TencentStrategy;
impl Display for TencentStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("tencent-strategy")
	}
}
impl ProviderStrategy for TencentStrategy {
	fn inspect_profile(&self, endpoint: EndpointKind, payload: &JsonMap<String, Value>) -> Result<()> {
		reject_error_fields(endpoint, payload)?;

		let code = match payload.get("ret") {
			Some(Value::Number(n)) => n.as_i64(),
			Some(Value::String(s)) => s.trim().parse().ok(),
			_ => None,
		};

		match code {
			Some(0) | None => Ok(()),
			Some(code) => Err(TransportError::Rejected {
				endpoint,
				error: code.to_string(),
				description: payload.get("msg").and_then(Value::as_str).map(ToOwned::to_owned),
			}
			.into()),
		}
	}
}

/// Maps [`LoginOptions`] onto the conventional extension parameters.
pub fn push_login_options(options: &LoginOptions, params: &mut Vec<(String, String)>) {
	if let Some(mode) = options.display {
		params.push(("display".into(), mode.as_str().into()));
	} else if options.mobile_layout {
		params.push(("display".into(), "mobile".into()));
	}
	if options.force_reauth {
		params.push(("force_login".into(), "1".into()));
	}
	if options.require_confirm {
		params.push(("confirm_login".into(), "1".into()));
	}
	if options.sms_login {
		params.push(("login_type".into(), "sms".into()));
	}
}

fn reject_error_fields(endpoint: EndpointKind, payload: &JsonMap<String, Value>) -> Result<()> {
	let error = ["error", "error_code"]
		.iter()
		.find_map(|key| payload.get(*key).and_then(scalar_text));

	match error {
		Some(error) => {
			let description = ["error_description", "error_msg"]
				.iter()
				.find_map(|key| payload.get(*key).and_then(Value::as_str))
				.map(ToOwned::to_owned);

			Err(TransportError::Rejected { endpoint, error, description }.into())
		},
		None => Ok(()),
	}
}
