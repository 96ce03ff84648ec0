//! Built-in descriptors for the providers the engine ships support for.

// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, ProviderId},
	error::ConfigError,
	provider::{
		AccessTokenTransport, ClaimPath, ClaimRules, DefaultProviderStrategy, ProfileMode,
		ProviderDescriptor, ProviderDescriptorBuilder, ProviderDescriptorError, ProviderQuirks,
		ProviderStrategy, TencentStrategy, TokenWireFormat, TwoStepProfile, parse_endpoint,
	},
};

/// Providers with a built-in descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
	/// Baidu OpenAPI.
	Baidu,
	/// Tencent QQ Connect.
	#[serde(alias = "qq")]
	Tencent,
	/// Yixin open platform.
	Yixin,
	/// Douban.
	Douban,
	/// NetEase passport.
	NetEase,
}
impl Preset {
	/// Every preset, in declaration order.
	pub const ALL: [Preset; 5] =
		[Preset::Baidu, Preset::Tencent, Preset::Yixin, Preset::Douban, Preset::NetEase];

	/// Returns the preset's canonical name.
	pub const fn as_str(self) -> &'static str {
		match self {
			Preset::Baidu => "baidu",
			Preset::Tencent => "tencent",
			Preset::Yixin => "yixin",
			Preset::Douban => "douban",
			Preset::NetEase => "netease",
		}
	}

	/// Returns a builder pre-populated with the provider's endpoints, quirks, and claim rules.
	///
	/// Callers may override any field before building, e.g. to point endpoints at a proxy.
	pub fn builder(self) -> Result<ProviderDescriptorBuilder, ProviderDescriptorError> {
		let builder = ProviderDescriptor::builder(ProviderId::new(self.as_str())?);
		let builder = match self {
			Preset::Baidu => builder
				.namespace(ClaimNamespace::new("baidu")?)
				.claims_issuer("Baidu")
				.authorization_endpoint(parse_endpoint(
					"authorization",
					"https://openapi.baidu.com/oauth/2.0/authorize",
				)?)
				.token_endpoint(parse_endpoint("token", "https://openapi.baidu.com/oauth/2.0/token")?)
				.profile_endpoint(parse_endpoint(
					"profile",
					"https://openapi.baidu.com/rest/2.0/passport/users/getLoggedInUser",
				)?)
				.scopes(["basic"])?
				.claim_rules(
					ClaimRules::new(ClaimPath::key("uid"))
						.name(ClaimPath::key("uname"))
						.avatar("portrait", ClaimPath::key("portrait")),
				),
			Preset::Tencent => {
				let two_step = TwoStepProfile::default();
				let subject = ClaimPath::key(two_step.merged_key.clone());

				builder
					.namespace(ClaimNamespace::new("qq")?)
					.claims_issuer("QQ")
					.authorization_endpoint(parse_endpoint(
						"authorization",
						"https://graph.qq.com/oauth2.0/authorize",
					)?)
					.token_endpoint(parse_endpoint("token", "https://graph.qq.com/oauth2.0/token")?)
					.subject_endpoint(parse_endpoint("subject", "https://graph.qq.com/oauth2.0/me")?)
					.profile_endpoint(parse_endpoint(
						"profile",
						"https://graph.qq.com/user/get_user_info",
					)?)
					.scopes(["get_user_info"])?
					.quirks(ProviderQuirks {
						scope_delimiter: ',',
						token_format: TokenWireFormat::Lenient,
						token_accept_json: true,
						profile: ProfileMode::TwoStep(two_step),
					})
					.claim_rules(
						ClaimRules::new(subject)
							.name(ClaimPath::key("nickname"))
							.avatar("figure", ClaimPath::key("figureurl_qq_1"))
							.extra("gender", ClaimPath::key("gender")),
					)
			},
			Preset::Yixin => builder
				.namespace(ClaimNamespace::new("yixin")?)
				.claims_issuer("Yixin")
				.authorization_endpoint(parse_endpoint(
					"authorization",
					"https://open.yixin.im/oauth/authorize",
				)?)
				.token_endpoint(parse_endpoint("token", "https://open.yixin.im/oauth/token")?)
				.profile_endpoint(parse_endpoint("profile", "https://open.yixin.im/api/userinfo")?)
				.scopes(["userinfo"])?
				.claim_rules(
					ClaimRules::new(userinfo_path("accountId"))
						.name(userinfo_path("nick"))
						.avatar("icon", userinfo_path("icon")),
				),
			Preset::Douban => builder
				.namespace(ClaimNamespace::new("douban")?)
				.claims_issuer("Douban")
				.authorization_endpoint(parse_endpoint(
					"authorization",
					"https://www.douban.com/service/auth2/auth",
				)?)
				.token_endpoint(parse_endpoint("token", "https://www.douban.com/service/auth2/token")?)
				.profile_endpoint(parse_endpoint("profile", "https://api.douban.com/v2/user/~me")?)
				.scopes(["douban_basic_common"])?
				.quirks(ProviderQuirks {
					profile: ProfileMode::Direct { token_transport: AccessTokenTransport::Bearer },
					..Default::default()
				})
				.claim_rules(
					ClaimRules::new(ClaimPath::key("id"))
						.name(ClaimPath::key("name"))
						.avatar("avatar", ClaimPath::key("avatar")),
				),
			Preset::NetEase => builder
				.namespace(ClaimNamespace::new("netease")?)
				.claims_issuer("NetEase")
				.authorization_endpoint(parse_endpoint(
					"authorization",
					"https://reg.163.com/open/oauth2/authorize.do",
				)?)
				.token_endpoint(parse_endpoint("token", "https://reg.163.com/open/oauth2/token.do")?)
				.profile_endpoint(parse_endpoint(
					"profile",
					"https://reg.163.com/open/oauth2/getUserInfo.do",
				)?)
				.claim_rules(
					ClaimRules::new(ClaimPath::key("userId")).name(ClaimPath::key("username")),
				),
		};

		Ok(builder)
	}

	/// Builds the preset descriptor without overrides.
	pub fn descriptor(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		self.builder()?.build()
	}

	/// Returns the strategy matching the provider's response conventions.
	pub fn strategy(self) -> Arc<dyn ProviderStrategy> {
		match self {
			Preset::Tencent => Arc::new(TencentStrategy),
			_ => Arc::new(DefaultProviderStrategy),
		}
	}
}
impl Display for Preset {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Preset {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"baidu" => Ok(Preset::Baidu),
			"tencent" | "qq" => Ok(Preset::Tencent),
			"yixin" => Ok(Preset::Yixin),
			"douban" => Ok(Preset::Douban),
			"netease" => Ok(Preset::NetEase),
			_ => Err(ConfigError::UnknownPreset { name: s.to_owned() }),
		}
	}
}

fn userinfo_path(field: &str) -> ClaimPath {
	ClaimPath::key("userinfo").child(field)
}
