//! Ticket assembly and the caller hook that may adjust or veto it.

// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, ClaimSet, IdentityRecord, ProviderId, TokenResponse, standard},
	error::IdentityError,
	provider::ProviderDescriptor,
	state::FlowState,
};

/// Everything the ticket hook may inspect before an identity is handed back.
///
/// The hook owns a mutable view of the claims and the flow state; token and profile are
/// provided for reference and any change to them is ignored.
#[derive(Clone, Debug)]
pub struct TicketContext {
	/// Provider that authenticated the user.
	pub provider: ProviderId,
	/// Claim namespace of the provider.
	pub namespace: ClaimNamespace,
	/// Default issuer for claims added by the hook.
	pub issuer: String,
	/// Normalized claims; the hook may add, replace, or remove entries.
	pub claims: ClaimSet,
	/// Raw profile payload.
	pub profile: Value,
	/// Token obtained from the code exchange.
	pub token: TokenResponse,
	/// Flow state opened from the callback; redirect and items may be rewritten.
	pub state: FlowState,
}
impl TicketContext {
	/// Appends a claim attributed to the provider's issuer.
	pub fn add_claim(&mut self, kind: impl Into<String>, value: impl Into<String>) {
		self.claims.add(kind, value, &self.issuer);
	}

	/// Appends a provider-prefixed claim (`urn:<namespace>:<field>`).
	pub fn add_namespaced_claim(&mut self, field: &str, value: impl Into<String>) {
		let kind = self.namespace.claim_type(field);

		self.claims.add(kind, value, &self.issuer);
	}
}

/// Verdict returned by a [`TicketHook`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HookOutcome {
	/// Continue and return the (possibly adjusted) identity.
	Proceed,
	/// Stop the login; surfaced as [`Error::AbortedByCaller`].
	Abort {
		/// Caller-facing reason.
		reason: String,
	},
}
impl HookOutcome {
	/// Convenience constructor for [`HookOutcome::Abort`].
	pub fn abort(reason: impl Into<String>) -> Self {
		Self::Abort { reason: reason.into() }
	}
}

/// Caller hook invoked exactly once per successful login, before the identity is returned.
///
/// Any `Fn(&mut TicketContext) -> HookOutcome` closure that is `Send + Sync` is a hook.
pub trait TicketHook: Send + Sync {
	/// Inspects and optionally adjusts the pending ticket.
	fn on_ticket(&self, ctx: &mut TicketContext) -> HookOutcome;
}
impl<F> TicketHook for F
where
	F: Send + Sync + Fn(&mut TicketContext) -> HookOutcome,
{
	fn on_ticket(&self, ctx: &mut TicketContext) -> HookOutcome {
		self(ctx)
	}
}

/// Hook that accepts every ticket unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTicketHook;
impl TicketHook for NoopTicketHook {
	fn on_ticket(&self, _ctx: &mut TicketContext) -> HookOutcome {
		HookOutcome::Proceed
	}
}

/// Runs the hook and turns the adjusted context into an [`IdentityRecord`].
///
/// The subject check runs after the hook so it may supply a missing identifier; the record is
/// refused only when neither `sub` nor `urn:<namespace>:id` survives.
pub fn assemble(
	descriptor: &ProviderDescriptor,
	state: FlowState,
	claims: ClaimSet,
	profile: Value,
	token: TokenResponse,
	hook: &dyn TicketHook,
) -> Result<IdentityRecord> {
	let mut ctx = TicketContext {
		provider: descriptor.id.clone(),
		namespace: descriptor.namespace.clone(),
		issuer: descriptor.claims_issuer.clone(),
		claims,
		profile,
		token,
		state,
	};

	if let HookOutcome::Abort { reason } = hook.on_ticket(&mut ctx) {
		return Err(Error::AbortedByCaller { reason });
	}

	let TicketContext { provider, namespace, claims, state, .. } = ctx;

	if !claims.contains(standard::SUBJECT) && !claims.contains(&namespace.claim_type("id")) {
		return Err(IdentityError::MissingSubject { provider: provider.to_string() }.into());
	}

	Ok(IdentityRecord { provider, namespace, claims, redirect: state.redirect, items: state.items })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::Preset;

	fn fixture() -> (ProviderDescriptor, TokenResponse) {
		let descriptor = Preset::Baidu.descriptor().expect("Baidu preset should build.");
		let mut fields = JsonMap::new();

		fields.insert("access_token".into(), Value::from("AT"));

		(descriptor, TokenResponse::from_fields(fields).expect("Token fixture should parse."))
	}

	fn subject_claims(descriptor: &ProviderDescriptor) -> ClaimSet {
		let mut claims = ClaimSet::default();

		claims.add(standard::SUBJECT, "42", &descriptor.claims_issuer);

		claims
	}

	#[test]
	fn noop_hook_keeps_claims_and_state() {
		let (descriptor, token) = fixture();
		let state = FlowState::new().with_redirect("/home").with_item("k", "v");
		let record = assemble(
			&descriptor,
			state,
			subject_claims(&descriptor),
			Value::Null,
			token,
			&NoopTicketHook,
		)
		.expect("Ticket should assemble.");

		assert_eq!(record.subject(), Some("42"));
		assert_eq!(record.redirect.as_deref(), Some("/home"));
		assert_eq!(record.items.get("k").map(String::as_str), Some("v"));
	}

	#[test]
	fn closures_can_rewrite_claims_and_redirect() {
		let (descriptor, token) = fixture();
		let hook = |ctx: &mut TicketContext| {
			ctx.add_namespaced_claim("tier", "gold");
			ctx.claims.set(standard::NAME, "Override", "App");
			ctx.state.redirect = Some("/welcome".into());

			HookOutcome::Proceed
		};
		let record = assemble(
			&descriptor,
			FlowState::new(),
			subject_claims(&descriptor),
			Value::Null,
			token,
			&hook,
		)
		.expect("Ticket should assemble.");

		assert_eq!(record.claims.first("urn:baidu:tier"), Some("gold"));
		assert_eq!(record.name(), Some("Override"));
		assert_eq!(record.redirect.as_deref(), Some("/welcome"));
	}

	#[test]
	fn abort_wins_over_everything() {
		let (descriptor, token) = fixture();
		let hook = |_: &mut TicketContext| HookOutcome::abort("banned");
		let err = assemble(
			&descriptor,
			FlowState::new(),
			subject_claims(&descriptor),
			Value::Null,
			token,
			&hook,
		)
		.expect_err("Aborting hook must fail the login.");

		assert!(err.is_caller_abort());
		assert!(matches!(err, Error::AbortedByCaller { ref reason } if reason == "banned"));
	}

	#[test]
	fn subject_is_required_after_the_hook() {
		let (descriptor, token) = fixture();
		let err = assemble(
			&descriptor,
			FlowState::new(),
			ClaimSet::default(),
			Value::Null,
			token.clone(),
			&NoopTicketHook,
		)
		.expect_err("Identity without subject must fail.");

		assert!(matches!(err, Error::Identity(IdentityError::MissingSubject { .. })));

		let hook = |ctx: &mut TicketContext| {
			ctx.add_namespaced_claim("id", "from-hook");

			HookOutcome::Proceed
		};
		let record = assemble(
			&descriptor,
			FlowState::new(),
			ClaimSet::default(),
			Value::Null,
			token,
			&hook,
		)
		.expect("Hook-supplied subject should satisfy the check.");

		assert_eq!(record.subject(), Some("from-hook"));
	}
}
