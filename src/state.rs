//! Round-trip state carried through the provider redirect.
//!
//! A [`FlowState`] is sealed into the authorization request's `state` parameter by a
//! [`StateProtector`] and opened exactly once when the provider redirects back. The default
//! [`HmacStateProtector`] signs the serialized state, bounds its lifetime, and consults a
//! [`ReplayGuard`] so a value is never accepted twice.

pub mod protector;
pub mod replay;

pub use protector::*;
pub use replay::*;

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const CORRELATION_LEN: usize = 32;

/// Caller intent and anti-forgery data threaded through the redirect round trip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
	/// Where the caller wants to send the user after login.
	pub redirect: Option<String>,
	/// Random marker the caller may also keep (e.g. in a cookie) and compare on return.
	pub correlation: String,
	/// Free-form caller data.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub items: BTreeMap<String, String>,
	/// Instant the state was created.
	pub issued_at: OffsetDateTime,
}
impl FlowState {
	/// Creates a state with a fresh correlation marker.
	pub fn new() -> Self {
		Self {
			redirect: None,
			correlation: random_string(CORRELATION_LEN),
			items: BTreeMap::new(),
			issued_at: OffsetDateTime::now_utc(),
		}
	}

	/// Sets the post-login redirect intent.
	pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
		self.redirect = Some(redirect.into());

		self
	}

	/// Adds a free-form item.
	pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.items.insert(key.into(), value.into());

		self
	}
}
impl Default for FlowState {
	fn default() -> Self {
		Self::new()
	}
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}
