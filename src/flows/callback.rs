//! Callback handling: from the provider redirect to a finished [`IdentityRecord`].

// self
use crate::{
	_prelude::*,
	auth::IdentityRecord,
	error::{ConfigError, StateError, TransportError},
	flows::{LoginBroker, normalize, ticket},
	http::Backchannel,
	oauth::TransportErrorMapper,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::EndpointKind,
};

/// Query parameters received on the redirect URI.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// Authorization code.
	pub code: Option<String>,
	/// Sealed state value.
	pub state: Option<String>,
	/// Provider error code, when the user denied access or the request was invalid.
	pub error: Option<String>,
	/// Provider error description.
	pub error_description: Option<String>,
	/// Correlation marker the caller kept from the challenge (e.g. in a cookie).
	#[serde(skip)]
	pub expected_correlation: Option<String>,
}
impl CallbackParams {
	/// Reads the parameters from a raw query string (with or without a leading `?`).
	///
	/// Empty values are treated as absent; unknown parameters are ignored.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (key, value) in
			url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes()).into_owned()
		{
			if value.is_empty() {
				continue;
			}

			let slot = match key.as_str() {
				"code" => &mut params.code,
				"state" => &mut params.state,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			slot.get_or_insert(value);
		}

		params
	}

	/// Reads the parameters from the full redirect URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}

	/// Requires the opened state to carry this correlation marker.
	pub fn expect_correlation(mut self, correlation: impl Into<String>) -> Self {
		self.expected_correlation = Some(correlation.into());

		self
	}
}

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Completes a login from the provider's redirect.
	///
	/// Stages run in order: provider error check, state validation, code exchange, profile
	/// resolution, claim normalization, then the ticket hook. The first failure ends the
	/// attempt; nothing partial is returned. `redirect_uri` must be the value used for the
	/// challenge.
	pub async fn complete(
		&self,
		callback: &CallbackParams,
		redirect_uri: &str,
		cancel: &CancellationToken,
	) -> Result<IdentityRecord> {
		const STAGE: FlowStage = FlowStage::Callback;

		let span = FlowSpan::new(&self.descriptor.id, STAGE);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				if let Some(error) = callback.error.clone() {
					return Err(TransportError::Rejected {
						endpoint: EndpointKind::Authorization,
						error,
						description: callback.error_description.clone(),
					}
					.into());
				}

				let code = callback
					.code
					.as_deref()
					.ok_or(ConfigError::MissingCallbackParameter { name: "code" })?;
				let sealed = callback
					.state
					.as_deref()
					.ok_or(ConfigError::MissingCallbackParameter { name: "state" })?;
				let state = self.state_protector.unprotect(sealed)?;

				if callback
					.expected_correlation
					.as_deref()
					.is_some_and(|expected| expected != state.correlation)
				{
					return Err(StateError::CorrelationMismatch.into());
				}

				let token = self.exchange_code(code, redirect_uri, cancel).await?;
				let profile = self.resolve_profile(&token, cancel).await?;
				let claims = normalize(
					&self.descriptor.namespace,
					&self.descriptor.claims_issuer,
					&profile,
					&self.descriptor.claim_rules,
				);

				ticket::assemble(
					&self.descriptor,
					state,
					claims,
					profile,
					token,
					self.ticket_hook.as_ref(),
				)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn queries_parse_with_or_without_prefix() {
		let params = CallbackParams::from_query("?code=C1&state=S.1&extra=x");

		assert_eq!(params.code.as_deref(), Some("C1"));
		assert_eq!(params.state.as_deref(), Some("S.1"));
		assert_eq!(params.error, None);
		assert_eq!(CallbackParams::from_query("code=C1&state=S.1"), params);
	}

	#[test]
	fn empty_values_count_as_missing_and_first_value_wins() {
		let params = CallbackParams::from_query("code=&state=A&state=B&error_description=x%20y");

		assert_eq!(params.code, None);
		assert_eq!(params.state.as_deref(), Some("A"));
		assert_eq!(params.error_description.as_deref(), Some("x y"));
	}

	#[test]
	fn urls_and_correlation_markers() {
		let url = Url::parse("https://app.example.com/signin-qq?error=access_denied")
			.expect("Fixture URL is valid.");
		let params = CallbackParams::from_url(&url).expect_correlation("corr");

		assert_eq!(params.error.as_deref(), Some("access_denied"));
		assert_eq!(params.expected_correlation.as_deref(), Some("corr"));
		assert_eq!(
			CallbackParams::from_url(
				&Url::parse("https://app.example.com/cb").expect("Fixture URL is valid.")
			),
			CallbackParams::default()
		);
	}
}
