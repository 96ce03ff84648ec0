#![cfg(feature = "reqwest")]

// crates.io
use httpmock::{Mock, prelude::*};
// self
use oauth2_federation::{
	_preludet::*,
	auth::ProviderId,
	error::{ConfigError, ParseError, StateError, TransportError},
	flows::CallbackParams,
	provider::{ClaimPath, ClaimRules, EndpointKind, Preset, ProviderDescriptor},
	state::FlowState,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const REDIRECT_URI: &str = "https://app.example.com/signin";

fn mock_url(server: &MockServer, path: &str) -> Url {
	Url::parse(&server.url(path))
		.expect("Mock endpoint should parse successfully.")
}

fn single_step_descriptor(server: &MockServer) -> ProviderDescriptor {
	Preset::Baidu
		.builder()
		.expect("Baidu preset should build.")
		.authorization_endpoint(mock_url(server, "/authorize"))
		.token_endpoint(mock_url(server, "/token"))
		.profile_endpoint(mock_url(server, "/me"))
		.claim_rules(ClaimRules::new(ClaimPath::key("id")).name(ClaimPath::key("name")))
		.build()
		.expect("Single-step descriptor should build.")
}

fn two_step_descriptor(server: &MockServer) -> ProviderDescriptor {
	Preset::Tencent
		.builder()
		.expect("Tencent preset should build.")
		.authorization_endpoint(mock_url(server, "/oauth2.0/authorize"))
		.token_endpoint(mock_url(server, "/oauth2.0/token"))
		.subject_endpoint(mock_url(server, "/oauth2.0/me"))
		.profile_endpoint(mock_url(server, "/user/get_user_info"))
		.build()
		.expect("Two-step descriptor should build.")
}

fn sealed_state(broker: &ReqwestTestBroker, state: &FlowState) -> String {
	let url = broker
		.challenge_url(state, REDIRECT_URI)
		.expect("Challenge URL should build successfully.");

	url.query_pairs()
		.find(|(key, _)| key == "state")
		.map(|(_, value)| value.into_owned())
		.expect("Challenge URL should carry a state parameter.")
}

fn callback(code: &str, state: String) -> CallbackParams {
	CallbackParams { code: Some(code.into()), state: Some(state), ..Default::default() }
}

#[tokio::test]
async fn challenge_url_carries_standard_parameters() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let state = FlowState::new().with_redirect("/home");
	let url = broker
		.challenge_url(&state, REDIRECT_URI)
		.expect("Challenge URL should build successfully.");
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert!(url.as_str().starts_with(&mock_url(&server, "/authorize").to_string()));
	assert_eq!(pairs.get("client_id"), Some(&CLIENT_ID.into()));
	assert_eq!(pairs.get("scope"), Some(&"basic".into()));
	assert_eq!(pairs.get("response_type"), Some(&"code".into()));
	assert_eq!(pairs.get("redirect_uri"), Some(&REDIRECT_URI.into()));

	let opened = broker
		.state_protector
		.unprotect(pairs.get("state").expect("State parameter should be present."))
		.expect("Sealed state should open with the broker's protector.");

	assert_eq!(opened, state);
}

#[tokio::test]
async fn challenge_url_rejects_relative_redirects_and_empty_client_ids() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);

	assert!(matches!(
		broker.challenge_url(&FlowState::new(), "/signin"),
		Err(Error::Config(ConfigError::InvalidRedirect { .. }))
	));

	let broker = build_reqwest_test_broker(single_step_descriptor(&server), "", CLIENT_SECRET);

	assert!(matches!(
		broker.challenge_url(&FlowState::new(), REDIRECT_URI),
		Err(Error::Config(ConfigError::MissingClientId))
	));
}

#[tokio::test]
async fn single_step_login_yields_identity() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let state = FlowState::new().with_redirect("/home").with_item("tenant", "t1");
	let sealed = sealed_state(&broker, &state);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("code=C1")
				.body_includes("client_secret=secret-it")
				.body_includes("grant_type=authorization_code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"AT\",\"expires_in\":2592000}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me").query_param("access_token", "AT");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"id\":\"42\",\"name\":\"Alice\"}");
		})
		.await;
	let record = broker
		.complete(&callback("C1", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect("Login should complete successfully.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(record.provider, ProviderId::new("baidu").expect("Provider id is valid."));
	assert_eq!(record.subject(), Some("42"));
	assert_eq!(record.name(), Some("Alice"));
	assert_eq!(record.claims.first("urn:baidu:id"), Some("42"));
	assert_eq!(record.claims.first("urn:baidu:name"), Some("Alice"));
	assert!(record.claims.iter().all(|claim| claim.issuer == "Baidu"));
	assert_eq!(record.redirect.as_deref(), Some("/home"));
	assert_eq!(record.items.get("tenant").map(String::as_str), Some("t1"));
}

#[tokio::test]
async fn two_step_login_merges_subject_into_profile() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(two_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET)
		.with_strategy(Preset::Tencent.strategy());
	let sealed = sealed_state(&broker, &FlowState::new());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oauth2.0/token")
				.header("accept", "application/json")
				.body_includes("code=C2");
			then.status(200).body("access_token=AT2&expires_in=7776000&refresh_token=RT2");
		})
		.await;
	let subject_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/me").query_param("access_token", "AT2");
			then.status(200).body("callback( {\"client_id\":\"client-it\",\"openid\":\"OID\"} );\n");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/user/get_user_info")
				.body_includes("oauth_consumer_key=client-it")
				.body_includes("access_token=AT2")
				.body_includes("openid=OID");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"ret\":0,\"nickname\":\"Carol\",\"figureurl_qq_1\":\"https://q.qlogo.cn/c\"}");
		})
		.await;
	let record = broker
		.complete(&callback("C2", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect("Two-step login should complete successfully.");

	token_mock.assert_async().await;
	subject_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert_eq!(record.subject(), Some("OID"));
	assert_eq!(record.claims.first("urn:qq:id"), Some("OID"));
	assert_eq!(record.name(), Some("Carol"));
	assert_eq!(record.claims.first("picture"), Some("https://q.qlogo.cn/c"));
	assert_eq!(record.claims.first("urn:qq:figure"), Some("https://q.qlogo.cn/c"));
}

#[tokio::test]
async fn token_endpoint_failures_surface_status_and_skip_profile() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let sealed = sealed_state(&broker, &FlowState::new());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(500).body("upstream exploded");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200).body("{\"id\":\"42\"}");
		})
		.await;
	let err = broker
		.complete(&callback("C3", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect_err("Server errors must fail the login.");

	token_mock.assert_async().await;
	profile_mock.assert_calls_async(0).await;

	assert_eq!(err.upstream_status(), Some(500));

	match err {
		Error::Transport(TransportError::Status { endpoint, body, .. }) => {
			assert_eq!(endpoint, EndpointKind::Token);
			assert_eq!(body, "upstream exploded");
		},
		other => panic!("Unexpected error: {other:?}"),
	}
}

#[tokio::test]
async fn profile_payload_errors_are_rejections() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(two_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET)
		.with_strategy(Preset::Tencent.strategy());
	let sealed = sealed_state(&broker, &FlowState::new());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2.0/token");
			then.status(200).body("access_token=AT4");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/me");
			then.status(200).body("callback( {\"openid\":\"OID\"} );");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/user/get_user_info");
			then.status(200).body("{\"ret\":1002,\"msg\":\"please login\"}");
		})
		.await;

	let err = broker
		.complete(&callback("C4", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect_err("Non-zero return codes must fail the login.");

	assert!(matches!(
		err,
		Error::Transport(TransportError::Rejected { endpoint: EndpointKind::Profile, ref error, .. })
			if error == "1002"
	));
}

#[tokio::test]
async fn callback_checks_run_before_any_network_call() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"AT\"}");
		})
		.await;
	let cancel = CancellationToken::new();
	let denied = CallbackParams {
		error: Some("access_denied".into()),
		error_description: Some("user cancelled".into()),
		..Default::default()
	};

	assert!(matches!(
		broker.complete(&denied, REDIRECT_URI, &cancel).await,
		Err(Error::Transport(TransportError::Rejected { endpoint: EndpointKind::Authorization, .. }))
	));

	let missing_state = CallbackParams { code: Some("C5".into()), ..Default::default() };

	assert!(matches!(
		broker.complete(&missing_state, REDIRECT_URI, &cancel).await,
		Err(Error::Config(ConfigError::MissingCallbackParameter { name: "state" }))
	));
	assert!(matches!(
		broker.complete(&callback("C5", "garbage".into()), REDIRECT_URI, &cancel).await,
		Err(Error::State(StateError::Malformed))
	));

	let sealed = sealed_state(&broker, &FlowState::new());
	let mismatched = callback("C5", sealed).expect_correlation("someone-else");

	assert!(matches!(
		broker.complete(&mismatched, REDIRECT_URI, &cancel).await,
		Err(Error::State(StateError::CorrelationMismatch))
	));

	token_mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn sealed_state_is_accepted_only_once() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let state = FlowState::new();
	let sealed = sealed_state(&broker, &state);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"AT\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(200).body("{\"id\":\"42\"}");
		})
		.await;

	let cancel = CancellationToken::new();
	let first = callback("C6", sealed.clone()).expect_correlation(state.correlation.clone());

	broker
		.complete(&first, REDIRECT_URI, &cancel)
		.await
		.expect("First completion should succeed.");

	assert!(matches!(
		broker.complete(&callback("C6", sealed), REDIRECT_URI, &cancel).await,
		Err(Error::State(StateError::Replayed))
	));
}

#[tokio::test]
async fn redirect_uris_are_sent_as_given() {
	const VERBATIM_REDIRECT: &str = "https://App.Example.com:443/signin";

	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let url = broker
		.challenge_url(&FlowState::new(), VERBATIM_REDIRECT)
		.expect("Challenge URL should build successfully.");
	let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("redirect_uri"), Some(&VERBATIM_REDIRECT.into()));

	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.body_includes("redirect_uri=https%3A%2F%2FApp.Example.com%3A443%2Fsignin");
			then.status(200).body("{\"access_token\":\"AT\"}");
		})
		.await;

	broker
		.exchange_code("C7", VERBATIM_REDIRECT, &CancellationToken::new())
		.await
		.expect("Exchange should succeed.");
	token_mock.assert_async().await;
}

#[tokio::test]
async fn direct_profile_failures_surface_status() {
	let server = MockServer::start_async().await;
	let broker = build_reqwest_test_broker(single_step_descriptor(&server), CLIENT_ID, CLIENT_SECRET);
	let sealed = sealed_state(&broker, &FlowState::new());
	let token_mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).body("{\"access_token\":\"AT\"}");
		})
		.await;
	let profile_mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/me");
			then.status(500).body("boom");
		})
		.await;
	let err = broker
		.complete(&callback("C8", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect_err("Profile server errors must fail the login.");

	token_mock.assert_async().await;
	profile_mock.assert_async().await;

	assert!(matches!(
		err,
		Error::Transport(TransportError::Status { endpoint: EndpointKind::Profile, status: 500, ref body })
			if body == "boom"
	));
}

struct TwoStepMocks<'a> {
	token: Mock<'a>,
	subject: Mock<'a>,
	profile: Mock<'a>,
}

async fn mount_two_step<'a>(
	server: &'a MockServer,
	subject: (u16, &str),
	profile: (u16, &str),
) -> TwoStepMocks<'a> {
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth2.0/token");
			then.status(200).body("access_token=AT9&expires_in=7776000");
		})
		.await;
	let subject = server
		.mock_async(|when, then| {
			when.method(GET).path("/oauth2.0/me");
			then.status(subject.0).body(subject.1);
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(POST).path("/user/get_user_info");
			then.status(profile.0).body(profile.1);
		})
		.await;

	TwoStepMocks { token, subject, profile }
}

async fn complete_two_step(server: &MockServer) -> Error {
	let broker = build_reqwest_test_broker(two_step_descriptor(server), CLIENT_ID, CLIENT_SECRET)
		.with_strategy(Preset::Tencent.strategy());
	let sealed = sealed_state(&broker, &FlowState::new());

	broker
		.complete(&callback("C9", sealed), REDIRECT_URI, &CancellationToken::new())
		.await
		.expect_err("Two-step login must fail.")
}

#[tokio::test]
async fn subject_endpoint_failures_skip_the_profile_call() {
	let server = MockServer::start_async().await;
	let mocks =
		mount_two_step(&server, (500, "subject down"), (200, "{\"ret\":0,\"nickname\":\"Eve\"}"))
			.await;
	let err = complete_two_step(&server).await;

	mocks.token.assert_async().await;
	mocks.subject.assert_async().await;
	mocks.profile.assert_calls_async(0).await;

	assert!(matches!(
		err,
		Error::Transport(TransportError::Status { endpoint: EndpointKind::Subject, status: 500, .. })
	));
}

#[tokio::test]
async fn two_step_profile_failures_surface_status() {
	let server = MockServer::start_async().await;
	let mocks =
		mount_two_step(&server, (200, "callback( {\"openid\":\"OID\"} );"), (500, "profile down"))
			.await;
	let err = complete_two_step(&server).await;

	mocks.token.assert_async().await;
	mocks.subject.assert_async().await;
	mocks.profile.assert_async().await;

	assert!(matches!(
		err,
		Error::Transport(TransportError::Status { endpoint: EndpointKind::Profile, status: 500, .. })
	));
}

#[tokio::test]
async fn unwrapped_subject_bodies_fail_before_the_profile_call() {
	let server = MockServer::start_async().await;
	let mocks = mount_two_step(
		&server,
		(200, "callback( {\"openid\":\"OID\"}"),
		(200, "{\"ret\":0,\"nickname\":\"Eve\"}"),
	)
	.await;
	let err = complete_two_step(&server).await;

	mocks.token.assert_async().await;
	mocks.subject.assert_async().await;
	mocks.profile.assert_calls_async(0).await;

	assert!(matches!(
		err,
		Error::Parse(ParseError::MissingEnvelope { endpoint: EndpointKind::Subject })
	));
}
