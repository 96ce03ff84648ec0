//! Walks through a QQ login from configuration to the callback handler.
//!
//! The provider is never contacted: the demo prints the challenge URL and then feeds the broker
//! a simulated "user denied access" redirect, which fails before any backchannel call.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use oauth2_federation::{
	CancellationToken,
	flows::{CallbackParams, HookOutcome, LoginBroker, TicketContext},
	provider::{DisplayMode, Preset, ProviderConfig},
	state::{FlowState, HmacStateProtector},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let mut config = ProviderConfig::new(Preset::Tencent, "101000001");

	config.client_secret = Some("demo-secret".into());
	config.display_mode = Some(DisplayMode::Mobile);

	let protector = Arc::new(HmacStateProtector::new(b"demo-only-state-signing-key-0001")?);
	let broker = LoginBroker::from_config(&config, protector)?.with_ticket_hook(
		|ctx: &mut TicketContext| {
			ctx.add_claim("role", "member");

			HookOutcome::Proceed
		},
	);
	let redirect_uri = "https://app.example.com/signin-qq";
	let state = FlowState::new().with_redirect("/dashboard");
	let challenge = broker.challenge_url(&state, redirect_uri)?;

	println!("Send your user to {challenge}.");
	println!("Keep correlation marker {} in a cookie.", &state.correlation);

	// Simulate the provider redirecting back after the user declined.
	let returned = Url::parse(&format!(
		"{redirect_uri}?error=access_denied&error_description=user%20cancelled"
	))?;
	let callback = CallbackParams::from_url(&returned).expect_correlation(state.correlation.clone());

	match broker.complete(&callback, redirect_uri, &CancellationToken::new()).await {
		Ok(identity) => println!("Signed in as {:?}.", identity.subject()),
		Err(e) => eprintln!("Login failed: {e}."),
	}

	Ok(())
}
