//! Login flow stages driven by the [`LoginBroker`] facade.

pub mod callback;
pub mod challenge;
pub mod common;
pub mod exchange;
pub mod normalize;
pub mod profile;
pub mod ticket;

pub use callback::*;
pub use challenge::*;
pub use common::*;
pub use exchange::*;
pub use normalize::*;
pub use profile::*;
pub use ticket::*;

// self
use crate::{
	_prelude::*,
	http::Backchannel,
	oauth::TransportErrorMapper,
	provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
	state::StateProtector,
};
#[cfg(feature = "reqwest")]
use crate::{
	error::ConfigError, http::ReqwestBackchannel, oauth::ReqwestTransportErrorMapper,
	provider::ProviderConfig,
};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestLoginBroker = LoginBroker<ReqwestBackchannel, ReqwestTransportErrorMapper>;

/// Coordinates login attempts against a single provider descriptor.
///
/// The broker owns the backchannel, descriptor, strategy, state protector, and ticket hook
/// so each stage can focus on its own step. It holds no per-login state: concurrent logins
/// share one broker, and each call runs its stages strictly in sequence.
#[derive(Clone)]
pub struct LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Transport used for every server-to-server provider request.
	pub backchannel: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor that defines endpoints, quirks, and claim rules.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for provider-specific request and response handling.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Seals and opens the `state` parameter.
	pub state_protector: Arc<dyn StateProtector>,
	/// Caller hook invoked once per successful login.
	pub ticket_hook: Arc<dyn TicketHook>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// Client secret sent with the code exchange.
	pub client_secret: Option<String>,
}
impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_backchannel(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		state_protector: Arc<dyn StateProtector>,
		backchannel: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			backchannel: backchannel.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy: Arc::new(DefaultProviderStrategy),
			state_protector,
			ticket_hook: Arc::new(NoopTicketHook),
			client_id: client_id.into(),
			client_secret: None,
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Replaces the provider strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}

	/// Installs the ticket hook invoked before an identity is returned.
	pub fn with_ticket_hook(mut self, hook: impl 'static + TicketHook) -> Self {
		self.ticket_hook = Arc::new(hook);

		self
	}
}
#[cfg(feature = "reqwest")]
impl LoginBroker<ReqwestBackchannel, ReqwestTransportErrorMapper> {
	/// Creates a new broker for the provided descriptor and client identifier.
	///
	/// The broker provisions its own reqwest-backed transport. Use
	/// [`LoginBroker::with_client_secret`] to attach the client secret.
	pub fn new(
		descriptor: ProviderDescriptor,
		client_id: impl Into<String>,
		state_protector: Arc<dyn StateProtector>,
	) -> Self {
		Self::with_backchannel(
			descriptor,
			client_id,
			state_protector,
			ReqwestBackchannel::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds a broker from application configuration.
	pub fn from_config(
		config: &ProviderConfig,
		state_protector: Arc<dyn StateProtector>,
	) -> Result<Self> {
		let descriptor = config.descriptor()?;
		let mut broker = Self::new(descriptor, config.client_id.clone(), state_protector)
			.with_strategy(config.strategy());

		if let Some(secret) = config.client_secret.as_ref() {
			broker = broker.with_client_secret(secret.clone());
		}
		if broker.client_id.trim().is_empty() {
			return Err(ConfigError::MissingClientId.into());
		}

		Ok(broker)
	}
}
impl<C, M> Debug for LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LoginBroker")
			.field("descriptor", &self.descriptor)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.finish()
	}
}
