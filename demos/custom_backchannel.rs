//! Demonstrates plugging a non-reqwest transport into the login broker.
//!
//! 1. Implement [`Backchannel`] so each call gets an [`AsyncHttpClient`] handle.
//! 2. Reuse [`GenericTransportErrorMapper`] for the transport's error type.
//! 3. Drive a full login; the canned transport answers the token and profile calls.

// std
use std::{
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_federation::{
	CancellationToken,
	auth::ProviderId,
	flows::{CallbackParams, LoginBroker},
	http::Backchannel,
	oauth::{
		GenericTransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{ClaimPath, ClaimRules, ProviderDescriptor},
	state::{FlowState, HmacStateProtector, StateProtector},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let descriptor = ProviderDescriptor::builder(ProviderId::new("canned")?)
		.claims_issuer("Canned")
		.authorization_endpoint(Url::parse("https://id.example.com/authorize")?)
		.token_endpoint(Url::parse("https://id.example.com/token")?)
		.profile_endpoint(Url::parse("https://id.example.com/me")?)
		.claim_rules(ClaimRules::new(ClaimPath::key("id")).name(ClaimPath::key("name")))
		.build()?;
	let protector = Arc::new(HmacStateProtector::new(b"demo-only-state-signing-key-0002")?);
	let sealed = protector.protect(&FlowState::new().with_redirect("/home"))?;
	let broker: LoginBroker<CannedBackchannel, GenericTransportErrorMapper> =
		LoginBroker::with_backchannel(
			descriptor,
			"demo-client",
			protector,
			CannedBackchannel,
			GenericTransportErrorMapper,
		)
		.with_client_secret("demo-secret");
	let callback =
		CallbackParams { code: Some("demo-code".into()), state: Some(sealed), ..Default::default() };
	let identity =
		broker.complete(&callback, "https://app.example.com/cb", &CancellationToken::new()).await?;

	println!("Signed in as {:?} ({:?}).", identity.subject(), identity.name());

	for claim in &identity.claims {
		println!("{} = {} (issued by {})", claim.kind, claim.value, claim.issuer);
	}

	Ok(())
}

#[derive(Debug)]
struct CannedError(String);
impl Display for CannedError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "no canned response for {}", self.0)
	}
}
impl std::error::Error for CannedError {}

#[derive(Clone, Copy, Debug)]
struct CannedBackchannel;
impl Backchannel for CannedBackchannel {
	type Handle = CannedBackchannel;
	type TransportError = CannedError;

	fn handle(&self) -> Self::Handle {
		*self
	}
}
impl<'c> AsyncHttpClient<'c> for CannedBackchannel {
	type Error = HttpClientError<CannedError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			let body = match request.uri().path() {
				"/token" => r#"{"access_token":"canned-token","token_type":"bearer"}"#,
				"/me" => r#"{"id":"u-1","name":"Demo User"}"#,
				other => return Err(HttpClientError::Reqwest(Box::new(CannedError(other.into())))),
			};

			Ok(HttpResponse::new(body.as_bytes().to_vec()))
		})
	}
}
