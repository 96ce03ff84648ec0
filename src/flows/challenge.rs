//! Authorization challenge: sealing the flow state and building the provider redirect URL.

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::{LoginBroker, common},
	http::Backchannel,
	oauth::TransportErrorMapper,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{ProviderDescriptor, ProviderStrategy},
	state::FlowState,
};

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the URL the user agent should be redirected to.
	///
	/// `state` is sealed with the broker's [`StateProtector`](crate::state::StateProtector);
	/// callers that compare correlation markers should keep `state.correlation` (e.g. in a
	/// cookie) before redirecting. No network call is made.
	pub fn challenge_url(&self, state: &FlowState, redirect_uri: &str) -> Result<Url> {
		const STAGE: FlowStage = FlowStage::Challenge;

		let _guard = FlowSpan::new(&self.descriptor.id, STAGE).entered();

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = self.seal_challenge(state, redirect_uri);

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Failure),
		}

		result
	}

	fn seal_challenge(&self, state: &FlowState, redirect_uri: &str) -> Result<Url> {
		common::ensure_client_id(&self.client_id)?;

		common::ensure_redirect_uri(redirect_uri)?;

		self.descriptor.validate().map_err(ConfigError::from)?;

		let sealed = self.state_protector.protect(state)?;

		Ok(build_challenge_url(
			&self.descriptor,
			self.strategy.as_ref(),
			&self.client_id,
			redirect_uri,
			&sealed,
		))
	}
}

/// Renders the authorization URL from already validated inputs.
///
/// `redirect_uri` is sent verbatim so providers that match registered URIs byte for byte
/// accept it.
///
/// Parameters are appended after any query the authorization endpoint already carries, in the
/// order `client_id`, `scope`, `response_type`, `redirect_uri`, `state`, then the strategy's
/// extensions. The `scope` parameter is omitted when no scope is requested.
pub fn build_challenge_url(
	descriptor: &ProviderDescriptor,
	strategy: &dyn ProviderStrategy,
	client_id: &str,
	redirect_uri: &str,
	state: &str,
) -> Url {
	let mut extensions = Vec::new();

	strategy.authorization_extensions(&descriptor.options, &mut extensions);

	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("client_id", client_id);

	if let Some(scope) = descriptor.scope.join(descriptor.quirks.scope_delimiter) {
		pairs.append_pair("scope", &scope);
	}

	pairs.append_pair("response_type", "code");
	pairs.append_pair("redirect_uri", redirect_uri);
	pairs.append_pair("state", state);

	for (key, value) in &extensions {
		pairs.append_pair(key, value);
	}

	drop(pairs);

	url
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{
		auth::ProviderId,
		provider::{DefaultProviderStrategy, DisplayMode, LoginOptions, Preset},
	};

	fn query(url: &Url) -> Vec<(String, String)> {
		url.query_pairs().into_owned().collect()
	}

	#[test]
	fn parameters_follow_the_documented_order() {
		let descriptor = Preset::Baidu.descriptor().expect("Baidu preset should build.");
		let url = build_challenge_url(
			&descriptor,
			&DefaultProviderStrategy,
			"abc",
			"https://app.example.com/signin-baidu",
			"S",
		);
		let keys = query(&url).into_iter().map(|(k, _)| k).collect::<Vec<_>>();

		assert_eq!(keys, ["client_id", "scope", "response_type", "redirect_uri", "state"]);
		assert!(
			url.as_str().contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fsignin-baidu")
		);
	}

	#[test]
	fn empty_scope_is_omitted_and_options_are_appended() {
		let mut descriptor = ProviderDescriptor::builder(
			ProviderId::new("custom").expect("Provider fixture should be valid."),
		)
		.authorization_endpoint(
			Url::parse("https://id.example.com/authorize?lang=en").expect("Fixture URL is valid."),
		)
		.token_endpoint(Url::parse("https://id.example.com/token").expect("Fixture URL is valid."))
		.profile_endpoint(Url::parse("https://id.example.com/me").expect("Fixture URL is valid."))
		.build()
		.expect("Descriptor should build.");

		descriptor.options =
			LoginOptions { display: Some(DisplayMode::Mobile), force_reauth: true, ..Default::default() };

		let url = build_challenge_url(
			&descriptor,
			&DefaultProviderStrategy,
			"abc",
			"https://app.example.com/cb",
			"S",
		);
		let pairs = query(&url);

		assert_eq!(pairs.first().map(|(k, v)| (k.as_str(), v.as_str())), Some(("lang", "en")));
		assert!(pairs.iter().all(|(k, _)| k != "scope"));
		assert_eq!(
			pairs.iter().rev().take(2).map(|(k, v)| format!("{k}={v}")).collect::<Vec<_>>(),
			["force_login=1", "display=mobile"]
		);
	}

	#[test]
	fn scope_uses_the_provider_delimiter() {
		let descriptor = Preset::Tencent.descriptor().expect("Tencent preset should build.");
		let url = build_challenge_url(
			&descriptor,
			&DefaultProviderStrategy,
			"abc",
			"https://app.example.com/cb",
			"S",
		);
		let scope = query(&url).into_iter().find(|(k, _)| k == "scope").map(|(_, v)| v);

		assert_eq!(scope.as_deref(), Some("get_user_info"));
	}
}
