//! Authorization code exchange and token body parsing.
//!
//! Token endpoints in the wild answer with JSON, with `key=value&...` bodies, or with
//! `callback(...)`-wrapped JSON. Every accepted shape is normalized into the same field map
//! before [`TokenResponse`] is built, so later stages never see the wire format.

// self
use crate::{
	_prelude::*,
	auth::TokenResponse,
	error::{ConfigError, TransportError},
	flows::{
		LoginBroker,
		common::{self, scalar_text},
		profile::extract_callback_envelope,
	},
	http::Backchannel,
	oauth::TransportErrorMapper,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{EndpointKind, TokenWireFormat},
};

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges an authorization code for a token with one form-encoded POST.
	///
	/// Nothing is retried. Cancelling `cancel` aborts the call with
	/// [`TransportError::Aborted`].
	pub async fn exchange_code(
		&self,
		code: &str,
		redirect_uri: &str,
		cancel: &CancellationToken,
	) -> Result<TokenResponse> {
		const STAGE: FlowStage = FlowStage::Exchange;

		let span = FlowSpan::new(&self.descriptor.id, STAGE);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				common::ensure_client_id(&self.client_id)?;

				let secret = self
					.client_secret
					.as_deref()
					.filter(|secret| !secret.trim().is_empty())
					.ok_or(ConfigError::MissingClientSecret)?;

				common::ensure_redirect_uri(redirect_uri)?;

				let mut form = BTreeMap::new();

				form.insert("client_id".to_owned(), self.client_id.clone());
				form.insert("client_secret".to_owned(), secret.to_owned());
				form.insert("code".to_owned(), code.to_owned());
				form.insert("redirect_uri".to_owned(), redirect_uri.to_owned());
				form.insert("grant_type".to_owned(), "authorization_code".to_owned());

				self.strategy.augment_token_request(&mut form);

				let request = common::form_request(
					&self.descriptor.endpoints.token,
					form.iter().map(|(k, v)| (k.as_str(), v.as_str())),
					self.descriptor.quirks.token_accept_json,
				)?;
				let body = common::dispatch(self, EndpointKind::Token, request, cancel).await?;

				self.strategy.parse_token_response(self.descriptor.quirks.token_format, &body)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Failure),
		}

		result
	}
}

/// Parses a 2xx token endpoint body according to `format`.
///
/// A body that carries an `error` field and no access token is a provider rejection, not a
/// parse failure.
pub fn parse_token_response(format: TokenWireFormat, body: &str) -> Result<TokenResponse> {
	let body = body.trim_start_matches('\u{feff}').trim();
	let fields = match format {
		TokenWireFormat::Json => common::parse_json_object(EndpointKind::Token, body)?,
		TokenWireFormat::FormEncoded => parse_form_fields(body),
		TokenWireFormat::Lenient =>
			if body.starts_with('{') {
				common::parse_json_object(EndpointKind::Token, body)?
			} else if body.starts_with("callback") {
				let inner = extract_callback_envelope(EndpointKind::Token, body)?;

				common::parse_json_object(EndpointKind::Token, inner)?
			} else {
				parse_form_fields(body)
			},
	};

	reject_error_fields(&fields)?;

	Ok(TokenResponse::from_fields(fields)?)
}

fn parse_form_fields(body: &str) -> JsonMap<String, Value> {
	url::form_urlencoded::parse(body.as_bytes())
		.into_owned()
		.map(|(key, value)| (key, Value::String(value)))
		.collect()
}

fn reject_error_fields(fields: &JsonMap<String, Value>) -> Result<()> {
	if fields.get("access_token").and_then(scalar_text).is_some() {
		return Ok(());
	}

	match fields.get("error").and_then(scalar_text) {
		Some(error) => Err(TransportError::Rejected {
			endpoint: EndpointKind::Token,
			error,
			description: fields.get("error_description").and_then(scalar_text),
		}
		.into()),
		None => Ok(()),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::ParseError;

	#[test]
	fn json_and_query_bodies_agree() {
		let json = parse_token_response(TokenWireFormat::Json, r#"{"access_token":"T"}"#)
			.expect("JSON body should parse.");
		let form = parse_token_response(TokenWireFormat::FormEncoded, "access_token=T")
			.expect("Query body should parse.");
		let lenient_json = parse_token_response(TokenWireFormat::Lenient, r#"{"access_token":"T"}"#)
			.expect("Lenient JSON body should parse.");
		let lenient_form = parse_token_response(TokenWireFormat::Lenient, "access_token=T")
			.expect("Lenient query body should parse.");

		for parsed in [&json, &form, &lenient_json, &lenient_form] {
			assert_eq!(parsed.access_token.expose(), "T");
		}
	}

	#[test]
	fn tencent_query_bodies_keep_every_field() {
		let parsed = parse_token_response(
			TokenWireFormat::Lenient,
			"access_token=FE04C&expires_in=7776000&refresh_token=88E4B\n",
		)
		.expect("Query body should parse.");

		assert_eq!(parsed.access_token.expose(), "FE04C");
		assert_eq!(parsed.expires_in, Some(Duration::seconds(7_776_000)));
		assert_eq!(parsed.refresh_token.as_ref().map(|t| t.expose()), Some("88E4B"));
	}

	#[test]
	fn query_bodies_mentioning_callback_stay_query_bodies() {
		let parsed = parse_token_response(
			TokenWireFormat::Lenient,
			"access_token=T&expires_in=3600&state=callback",
		)
		.expect("Query body should parse.");

		assert_eq!(parsed.access_token.expose(), "T");
		assert_eq!(parsed.expires_in, Some(Duration::seconds(3_600)));

		let wrapped =
			parse_token_response(TokenWireFormat::Lenient, r#"callback({"access_token":"W"});"#)
				.expect("Wrapped body should parse.");

		assert_eq!(wrapped.access_token.expose(), "W");
	}

	#[test]
	fn callback_wrapped_errors_are_rejections() {
		let err = parse_token_response(
			TokenWireFormat::Lenient,
			r#"callback( {"error":100019,"error_description":"code to access token error"} );"#,
		)
		.expect_err("Error body must fail.");

		match err {
			Error::Transport(TransportError::Rejected { endpoint, error, description }) => {
				assert_eq!(endpoint, EndpointKind::Token);
				assert_eq!(error, "100019");
				assert_eq!(description.as_deref(), Some("code to access token error"));
			},
			other => panic!("Unexpected error: {other:?}"),
		}

		assert!(matches!(
			parse_token_response(TokenWireFormat::Json, r#"{"error":"invalid_grant"}"#),
			Err(Error::Transport(TransportError::Rejected { .. }))
		));
	}

	#[test]
	fn unrecognized_bodies_are_parse_errors() {
		assert!(matches!(
			parse_token_response(TokenWireFormat::Json, "access_token=T"),
			Err(Error::Parse(ParseError::Json { .. }))
		));
		assert!(matches!(
			parse_token_response(TokenWireFormat::Lenient, "<html>bad gateway</html>"),
			Err(Error::Parse(ParseError::MissingAccessToken))
		));
		assert!(matches!(
			parse_token_response(TokenWireFormat::FormEncoded, ""),
			Err(Error::Parse(ParseError::MissingAccessToken))
		));
	}
}
