//! Signed, expiring encoding of [`FlowState`] for the `state` parameter.

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha2::Sha256;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, StateError},
	state::{FlowState, MemoryReplayGuard, ReplayGuard},
};

type HmacSha256 = Hmac<Sha256>;

/// Seals and opens [`FlowState`] values.
///
/// Flows treat the produced string as opaque.
pub trait StateProtector: Send + Sync {
	/// Serializes and protects a state value.
	fn protect(&self, state: &FlowState) -> Result<String>;

	/// Validates and opens a protected value. Must not accept the same value twice.
	fn unprotect(&self, value: &str) -> Result<FlowState, StateError>;
}

/// HMAC-SHA256 protector producing `base64url(json).base64url(mac)`.
///
/// States older than the configured lifetime are refused, and every accepted signature is
/// recorded in a [`ReplayGuard`].
#[derive(Clone)]
pub struct HmacStateProtector {
	mac: HmacSha256,
	ttl: Duration,
	replay: Arc<dyn ReplayGuard>,
}
impl HmacStateProtector {
	/// Shortest accepted signing key, in bytes.
	pub const MIN_KEY_LEN: usize = 32;
	/// Default state lifetime.
	pub const DEFAULT_TTL: Duration = Duration::minutes(15);

	/// Creates a protector with the default lifetime and an in-memory replay ledger.
	pub fn new(key: impl AsRef<[u8]>) -> Result<Self, ConfigError> {
		let key = key.as_ref();

		if key.len() < Self::MIN_KEY_LEN {
			return Err(ConfigError::InvalidStateKey { min: Self::MIN_KEY_LEN });
		}

		let mac = HmacSha256::new_from_slice(key)
			.map_err(|_| ConfigError::InvalidStateKey { min: Self::MIN_KEY_LEN })?;

		Ok(Self {
			mac,
			ttl: Self::DEFAULT_TTL,
			replay: Arc::new(MemoryReplayGuard::default()),
		})
	}

	/// Overrides the state lifetime. Negative values are clamped to zero.
	pub fn with_ttl(mut self, ttl: Duration) -> Self {
		self.ttl = if ttl.is_negative() { Duration::ZERO } else { ttl };

		self
	}

	/// Replaces the replay ledger, e.g. with one shared across processes.
	pub fn with_replay_guard(mut self, guard: Arc<dyn ReplayGuard>) -> Self {
		self.replay = guard;

		self
	}

	/// Configured state lifetime.
	pub fn ttl(&self) -> Duration {
		self.ttl
	}

	fn sign(&self, payload: &str) -> Vec<u8> {
		let mut mac = self.mac.clone();

		mac.update(payload.as_bytes());

		mac.finalize().into_bytes().to_vec()
	}
}
impl StateProtector for HmacStateProtector {
	fn protect(&self, state: &FlowState) -> Result<String> {
		let json = serde_json::to_vec(state).map_err(ConfigError::StateEncode)?;
		let payload = URL_SAFE_NO_PAD.encode(json);
		let signature = URL_SAFE_NO_PAD.encode(self.sign(&payload));

		Ok(format!("{payload}.{signature}"))
	}

	fn unprotect(&self, value: &str) -> Result<FlowState, StateError> {
		let (payload, signature) = value.split_once('.').ok_or(StateError::Malformed)?;
		let signature_bytes = URL_SAFE_NO_PAD.decode(signature).map_err(|_| StateError::Malformed)?;
		let mut mac = self.mac.clone();

		mac.update(payload.as_bytes());
		mac.verify_slice(&signature_bytes).map_err(|_| StateError::Tampered)?;

		let json = URL_SAFE_NO_PAD.decode(payload).map_err(|_| StateError::Malformed)?;
		let state: FlowState = serde_json::from_slice(&json).map_err(|_| StateError::Malformed)?;
		let expired_at = state.issued_at.checked_add(self.ttl).ok_or(StateError::Malformed)?;

		if OffsetDateTime::now_utc() >= expired_at {
			return Err(StateError::Expired { expired_at });
		}
		if !self.replay.claim(signature, expired_at) {
			return Err(StateError::Replayed);
		}

		Ok(state)
	}
}
impl Debug for HmacStateProtector {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HmacStateProtector").field("ttl", &self.ttl).finish_non_exhaustive()
	}
}
