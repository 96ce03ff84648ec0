//! Provider-parameterized OAuth 2.0 login engine.
//!
//! One pipeline drives the authorization-code round trip for providers that bend the protocol
//! in different ways. Per-provider differences live in a [`provider::ProviderDescriptor`] and
//! a [`provider::ProviderStrategy`]; [`flows::LoginBroker`] runs the shared steps and returns an
//! [`auth::IdentityRecord`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod state;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::LoginBroker,
		http::ReqwestBackchannel,
		oauth::ReqwestTransportErrorMapper,
		provider::ProviderDescriptor,
		state::HmacStateProtector,
	};

	/// Broker type alias used by reqwest-backed integration tests.
	pub type ReqwestTestBroker = LoginBroker<ReqwestBackchannel, ReqwestTransportErrorMapper>;

	/// Signing key shared by the test brokers so tests can seal their own state values.
	pub const TEST_STATE_KEY: &[u8] = b"oauth2-federation-test-state-key";

	/// Builds a reqwest backchannel that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_backchannel() -> ReqwestBackchannel {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestBackchannel::with_client(client)
	}

	/// Constructs a [`LoginBroker`] backed by the reqwest backchannel and an HMAC state
	/// protector keyed with [`TEST_STATE_KEY`].
	pub fn build_reqwest_test_broker(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
	) -> ReqwestTestBroker {
		let protector = Arc::new(
			HmacStateProtector::new(TEST_STATE_KEY).expect("Test state key should be accepted."),
		);

		LoginBroker::with_backchannel(
			descriptor,
			client_id,
			protector,
			test_reqwest_backchannel(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(client_secret)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use serde_json::{Map as JsonMap, Value};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use tokio_util::sync::CancellationToken;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use tokio_util::sync::CancellationToken;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
