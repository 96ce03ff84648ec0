//! Claim normalization from a raw profile payload.

// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, ClaimSet, standard},
	flows::common::scalar_text,
	provider::{ClaimPath, ClaimRules},
};

/// Maps a raw profile onto standard and provider-prefixed claims.
///
/// Each field is checked on its own: a missing or empty value skips only that field's claims,
/// so the result may be empty. Emission order is subject, name, avatar, then extras.
pub fn normalize(
	namespace: &ClaimNamespace,
	issuer: &str,
	profile: &Value,
	rules: &ClaimRules,
) -> ClaimSet {
	let mut claims = ClaimSet::default();

	if let Some(subject) = lookup(profile, &rules.subject) {
		claims.add(standard::SUBJECT, subject.clone(), issuer);
		claims.add(namespace.claim_type("id"), subject, issuer);
	}
	if let Some(name) = rules.name.as_ref().and_then(|path| lookup(profile, path)) {
		claims.add(standard::NAME, name.clone(), issuer);
		claims.add(namespace.claim_type("name"), name, issuer);
	}
	if let Some(avatar) = rules.avatar.as_ref().and_then(|path| lookup(profile, path)) {
		claims.add(standard::PICTURE, avatar.clone(), issuer);
		claims.add(namespace.claim_type(&rules.avatar_field), avatar, issuer);
	}

	for extra in &rules.extras {
		if let Some(value) = lookup(profile, &extra.path) {
			claims.add(namespace.claim_type(&extra.field), value, issuer);
		}
	}

	claims
}

fn lookup(profile: &Value, path: &ClaimPath) -> Option<String> {
	path.resolve(profile).and_then(scalar_text)
}
