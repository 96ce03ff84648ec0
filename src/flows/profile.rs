//! Profile resolution, either directly or through a subject endpoint first.

// self
use crate::{
	_prelude::*,
	auth::TokenResponse,
	error::{ConfigError, IdentityError, ParseError},
	flows::{
		LoginBroker,
		common::{self, scalar_text},
	},
	http::Backchannel,
	oauth::TransportErrorMapper,
	obs::{self, FlowOutcome, FlowSpan, FlowStage},
	provider::{AccessTokenTransport, EndpointKind, ProfileMode, ProviderDescriptorError, TwoStepProfile},
};

const ENVELOPE: &str = "callback";

impl<C, M> LoginBroker<C, M>
where
	C: ?Sized + Backchannel,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Fetches the authenticated user's raw profile.
	///
	/// Calls run strictly in sequence; a non-2xx answer at any step ends the flow. The
	/// returned value is always a JSON object.
	pub async fn resolve_profile(
		&self,
		token: &TokenResponse,
		cancel: &CancellationToken,
	) -> Result<Value> {
		const STAGE: FlowStage = FlowStage::Profile;

		let span = FlowSpan::new(&self.descriptor.id, STAGE);

		obs::record_flow_outcome(STAGE, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let profile = match &self.descriptor.quirks.profile {
					ProfileMode::Direct { token_transport } =>
						self.fetch_direct_profile(token, token_transport, cancel).await?,
					ProfileMode::TwoStep(two_step) =>
						self.fetch_two_step_profile(token, two_step, cancel).await?,
				};

				Ok(Value::Object(profile))
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(STAGE, FlowOutcome::Failure),
		}

		result
	}

	async fn fetch_direct_profile(
		&self,
		token: &TokenResponse,
		transport: &AccessTokenTransport,
		cancel: &CancellationToken,
	) -> Result<JsonMap<String, Value>> {
		let mut url = self.descriptor.endpoints.profile.clone();
		let request = match transport {
			AccessTokenTransport::Query { parameter } => {
				url.query_pairs_mut().append_pair(parameter, token.access_token.expose());

				common::get_request(&url, None)?
			},
			AccessTokenTransport::Bearer =>
				common::get_request(&url, Some(token.access_token.expose()))?,
		};
		let body = common::dispatch(self, EndpointKind::Profile, request, cancel).await?;

		self.parse_payload(EndpointKind::Profile, &body)
	}

	async fn fetch_two_step_profile(
		&self,
		token: &TokenResponse,
		two_step: &TwoStepProfile,
		cancel: &CancellationToken,
	) -> Result<JsonMap<String, Value>> {
		let mut subject_url = self
			.descriptor
			.endpoints
			.subject
			.clone()
			.ok_or(ConfigError::from(ProviderDescriptorError::MissingSubjectEndpoint))?;

		subject_url.query_pairs_mut().append_pair("access_token", token.access_token.expose());

		let request = common::get_request(&subject_url, None)?;
		let body = common::dispatch(self, EndpointKind::Subject, request, cancel).await?;
		let envelope = extract_callback_envelope(EndpointKind::Subject, &body)?;
		let subject_payload = self.parse_payload(EndpointKind::Subject, envelope)?;
		let subject = subject_payload
			.get(&two_step.subject_field)
			.and_then(scalar_text)
			.ok_or_else(|| IdentityError::MissingSubject { provider: self.descriptor.id.to_string() })?;
		let request = common::form_request(
			&self.descriptor.endpoints.profile,
			[
				(two_step.client_id_param.as_str(), self.client_id.as_str()),
				("access_token", token.access_token.expose()),
				(two_step.subject_param.as_str(), subject.as_str()),
			],
			false,
		)?;
		let body = common::dispatch(self, EndpointKind::Profile, request, cancel).await?;
		let mut profile = self.parse_payload(EndpointKind::Profile, &body)?;

		profile.insert(two_step.merged_key.clone(), Value::String(subject));

		Ok(profile)
	}

	fn parse_payload(&self, endpoint: EndpointKind, text: &str) -> Result<JsonMap<String, Value>> {
		let payload = common::parse_json_object(endpoint, text)?;

		self.strategy.inspect_profile(endpoint, &payload)?;

		Ok(payload)
	}
}

/// Extracts the JSON text from a `callback( ... );` envelope.
///
/// Fails with [`ParseError::MissingEnvelope`] when the marker, either parenthesis, or the
/// payload between them is missing.
pub fn extract_callback_envelope(endpoint: EndpointKind, body: &str) -> Result<&str, ParseError> {
	let missing = || ParseError::MissingEnvelope { endpoint };
	let start = body.find(ENVELOPE).ok_or_else(missing)?;
	let rest = body[start + ENVELOPE.len()..].trim_start().strip_prefix('(').ok_or_else(missing)?;
	let end = rest.rfind(')').ok_or_else(missing)?;
	let inner = rest[..end].trim();

	if inner.is_empty() { Err(missing()) } else { Ok(inner) }
}
