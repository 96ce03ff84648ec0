//! Identity claims and the terminal identity record handed back to callers.

// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, ProviderId},
};

/// Provider-agnostic claim types emitted next to the provider-namespaced ones.
pub mod standard {
	/// Stable subject identifier.
	pub const SUBJECT: &str = "sub";
	/// Display name.
	pub const NAME: &str = "name";
	/// Avatar or portrait URL.
	pub const PICTURE: &str = "picture";
}

/// A `(type, value, issuer)` fact about an authenticated identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
	/// Claim type (`sub`, `urn:qq:figure`, ...).
	pub kind: String,
	/// Claim value.
	pub value: String,
	/// Issuer the claim is attributed to.
	pub issuer: String,
}
impl Claim {
	/// Creates a new claim.
	pub fn new(kind: impl Into<String>, value: impl Into<String>, issuer: impl Into<String>) -> Self {
		Self { kind: kind.into(), value: value.into(), issuer: issuer.into() }
	}
}

/// Ordered claim collection; the same type may appear more than once.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimSet(Vec<Claim>);
impl ClaimSet {
	/// Appends a claim.
	pub fn push(&mut self, claim: Claim) {
		self.0.push(claim);
	}

	/// Appends a claim built from its parts.
	pub fn add(&mut self, kind: impl Into<String>, value: impl Into<String>, issuer: &str) {
		self.push(Claim::new(kind, value, issuer));
	}

	/// Replaces every claim of `kind` with a single new value.
	pub fn set(&mut self, kind: &str, value: impl Into<String>, issuer: &str) {
		self.remove(kind);
		self.add(kind, value, issuer);
	}

	/// Removes every claim of `kind`, returning how many were dropped.
	pub fn remove(&mut self, kind: &str) -> usize {
		let before = self.0.len();

		self.0.retain(|claim| claim.kind != kind);

		before - self.0.len()
	}

	/// First value recorded for `kind`.
	pub fn first(&self, kind: &str) -> Option<&str> {
		self.0.iter().find(|claim| claim.kind == kind).map(|claim| claim.value.as_str())
	}

	/// Returns true if at least one claim of `kind` exists.
	pub fn contains(&self, kind: &str) -> bool {
		self.first(kind).is_some()
	}

	/// Iterator over claims in insertion order.
	pub fn iter(&self) -> impl Iterator<Item = &Claim> {
		self.0.iter()
	}

	/// Number of claims.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Returns true when no claims are present.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl<'a> IntoIterator for &'a ClaimSet {
	type IntoIter = std::slice::Iter<'a, Claim>;
	type Item = &'a Claim;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}
impl IntoIterator for ClaimSet {
	type IntoIter = std::vec::IntoIter<Claim>;
	type Item = Claim;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Terminal artifact of a successful login.
///
/// Owned by the caller once returned; the engine keeps no reference to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Namespace the provider-prefixed claims were published under.
	pub namespace: ClaimNamespace,
	/// Normalized (and hook-adjusted) claims.
	pub claims: ClaimSet,
	/// Post-login redirect intent carried through the flow state.
	pub redirect: Option<String>,
	/// Caller-defined items carried through the flow state.
	pub items: BTreeMap<String, String>,
}
impl IdentityRecord {
	/// Stable subject identifier, preferring the standard claim.
	pub fn subject(&self) -> Option<&str> {
		self.claims
			.first(standard::SUBJECT)
			.or_else(|| self.claims.first(&self.namespace.claim_type("id")))
	}

	/// Display name, when the provider supplied one.
	pub fn name(&self) -> Option<&str> {
		self.claims.first(standard::NAME)
	}
}
