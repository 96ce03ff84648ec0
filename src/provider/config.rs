//! Serde-facing provider configuration resolved against a built-in preset.

// self
use crate::{
	_prelude::*,
	auth::ScopeSet,
	error::ConfigError,
	provider::{DisplayMode, LoginOptions, Preset, ProviderDescriptor, ProviderStrategy},
};

/// Per-provider settings as they appear in application configuration.
///
/// Endpoint and scope fields override the preset; unset booleans send no parameter.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
	/// Built-in provider the configuration starts from.
	pub preset: Preset,
	/// OAuth client identifier.
	pub client_id: String,
	/// OAuth client secret.
	#[serde(default)]
	pub client_secret: Option<String>,
	/// Authorization endpoint override.
	#[serde(default)]
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint override.
	#[serde(default)]
	pub token_endpoint: Option<Url>,
	/// Profile endpoint override.
	#[serde(default)]
	pub profile_endpoint: Option<Url>,
	/// Subject endpoint override (two-step providers).
	#[serde(default)]
	pub subject_endpoint: Option<Url>,
	/// Requested scopes, as a list or a comma/space delimited string; replaces the preset's
	/// default scope when present.
	#[serde(default)]
	pub scope: Option<ScopeSet>,
	/// Claims issuer override.
	#[serde(default)]
	pub claims_issuer: Option<String>,
	/// Layout hint for the provider's login page.
	#[serde(default)]
	pub display_mode: Option<DisplayMode>,
	/// Show the login form even with an active provider session.
	#[serde(default)]
	pub force_reauth: bool,
	/// Show an authorization confirmation step.
	#[serde(default)]
	pub require_confirm: bool,
	/// Offer SMS login.
	#[serde(default)]
	pub sms_login: bool,
	/// Use the provider's mobile layout.
	#[serde(default)]
	pub mobile_layout: bool,
}
impl ProviderConfig {
	/// Creates a configuration for `preset` with no overrides.
	pub fn new(preset: Preset, client_id: impl Into<String>) -> Self {
		Self {
			preset,
			client_id: client_id.into(),
			client_secret: None,
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			subject_endpoint: None,
			scope: None,
			claims_issuer: None,
			display_mode: None,
			force_reauth: false,
			require_confirm: false,
			sms_login: false,
			mobile_layout: false,
		}
	}

	/// Returns the login option flags carried by this configuration.
	pub fn login_options(&self) -> LoginOptions {
		LoginOptions {
			display: self.display_mode,
			force_reauth: self.force_reauth,
			require_confirm: self.require_confirm,
			sms_login: self.sms_login,
			mobile_layout: self.mobile_layout,
		}
	}

	/// Applies the overrides to the preset and validates the result.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		let mut builder = self.preset.builder()?.options(self.login_options());

		if let Some(url) = self.authorization_endpoint.clone() {
			builder = builder.authorization_endpoint(url);
		}
		if let Some(url) = self.token_endpoint.clone() {
			builder = builder.token_endpoint(url);
		}
		if let Some(url) = self.profile_endpoint.clone() {
			builder = builder.profile_endpoint(url);
		}
		if let Some(url) = self.subject_endpoint.clone() {
			builder = builder.subject_endpoint(url);
		}
		if let Some(scope) = self.scope.clone() {
			builder = builder.scope(scope);
		}
		if let Some(issuer) = self.claims_issuer.as_ref() {
			builder = builder.claims_issuer(issuer.clone());
		}

		Ok(builder.build()?)
	}

	/// Returns the strategy for the configured preset.
	pub fn strategy(&self) -> Arc<dyn ProviderStrategy> {
		self.preset.strategy()
	}
}
impl Debug for ProviderConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ProviderConfig")
			.field("preset", &self.preset)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("scope", &self.scope)
			.field("options", &self.login_options())
			.finish_non_exhaustive()
	}
}
