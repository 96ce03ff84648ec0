//! Provider descriptor data structures and helpers shared by all flows.
//!
//! The module exposes validated metadata, supporting builder utilities, login option
//! flags, and wire-format quirks so providers can describe their behavior in a
//! transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Login option flags that become non-standard authorization parameters.
pub mod options;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use options::*;
pub use quirks::*;

// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, ProviderId, ScopeSet},
	provider::ClaimRules,
};

/// Provider endpoints the engine talks to, used to label diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Browser-facing authorization endpoint.
	Authorization,
	/// Code-for-token exchange endpoint.
	Token,
	/// Intermediate subject identifier endpoint used by two-step providers.
	Subject,
	/// User profile endpoint.
	Profile,
}
impl EndpointKind {
	/// Returns a stable label suitable for messages and metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorization => "authorization",
			EndpointKind::Token => "token",
			EndpointKind::Subject => "subject",
			EndpointKind::Profile => "profile",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the browser is redirected to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// Profile endpoint queried with the access token.
	pub profile: Url,
	/// Subject identifier endpoint (two-step providers only).
	pub subject: Option<Url>,
}

/// Immutable provider descriptor consumed by flows.
///
/// Built once at startup and shared read-only by every concurrent login attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Namespace for provider-prefixed claims (`urn:<namespace>:...`).
	pub namespace: ClaimNamespace,
	/// Issuer recorded on every emitted claim.
	pub claims_issuer: String,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Scopes requested during authorization.
	pub scope: ScopeSet,
	/// Login option flags.
	pub options: LoginOptions,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
	/// Claim extraction table.
	pub claim_rules: ClaimRules,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Returns true when the profile is resolved through a subject endpoint first.
	pub fn is_two_step(&self) -> bool {
		matches!(self.quirks.profile, ProfileMode::TwoStep(_))
	}
}
