// self
use crate::{
	_prelude::*,
	auth::{ClaimNamespace, IdentifierError, ProviderId, ScopeSet, ScopeValidationError},
	provider::{
		ClaimRules, LoginOptions, ProfileMode, ProviderDescriptor, ProviderEndpoints,
		ProviderQuirks,
	},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// Authorization endpoint is required.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is required.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// Profile endpoint is required.
	#[error("Missing profile endpoint.")]
	MissingProfileEndpoint,
	/// Two-step profile resolution needs a subject endpoint.
	#[error("Two-step profile resolution requires a subject endpoint.")]
	MissingSubjectEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// Endpoint text could not be parsed.
	#[error("The {endpoint} endpoint is not a valid URL.")]
	InvalidEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Reject scope delimiters that are control characters.
	#[error("Scope delimiter must be a printable character.")]
	InvalidScopeDelimiter {
		/// Invalid delimiter that was supplied.
		delimiter: char,
	},
	/// Requested scopes failed validation.
	#[error(transparent)]
	InvalidScope(#[from] ScopeValidationError),
	/// Provider identifier or namespace failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] IdentifierError),
	/// Both a display mode and the mobile layout flag target the `display` parameter.
	#[error("The display mode and mobile layout options are mutually exclusive.")]
	ConflictingDisplay,
	/// Claims issuer must not be blank.
	#[error("Claims issuer cannot be empty.")]
	EmptyClaimsIssuer,
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Claim namespace (defaults to the identifier).
	pub namespace: Option<ClaimNamespace>,
	/// Claims issuer (defaults to the identifier).
	pub claims_issuer: Option<String>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Token endpoint.
	pub token_endpoint: Option<Url>,
	/// Profile endpoint.
	pub profile_endpoint: Option<Url>,
	/// Subject identifier endpoint for two-step providers.
	pub subject_endpoint: Option<Url>,
	/// Requested scopes.
	pub scope: ScopeSet,
	/// Login option flags.
	pub options: LoginOptions,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
	/// Claim extraction table.
	pub claim_rules: ClaimRules,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			namespace: None,
			claims_issuer: None,
			authorization_endpoint: None,
			token_endpoint: None,
			profile_endpoint: None,
			subject_endpoint: None,
			scope: ScopeSet::default(),
			options: LoginOptions::default(),
			quirks: ProviderQuirks::default(),
			claim_rules: ClaimRules::default(),
		}
	}

	/// Overrides the claim namespace.
	pub fn namespace(mut self, namespace: ClaimNamespace) -> Self {
		self.namespace = Some(namespace);

		self
	}

	/// Overrides the claims issuer.
	pub fn claims_issuer(mut self, issuer: impl Into<String>) -> Self {
		self.claims_issuer = Some(issuer.into());

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Sets the subject identifier endpoint.
	pub fn subject_endpoint(mut self, url: Url) -> Self {
		self.subject_endpoint = Some(url);

		self
	}

	/// Replaces the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Replaces the requested scopes from raw strings.
	pub fn scopes<I, S>(mut self, scopes: I) -> Result<Self, ProviderDescriptorError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.scope = ScopeSet::new(scopes)?;

		Ok(self)
	}

	/// Overrides the login option flags.
	pub fn options(mut self, options: LoginOptions) -> Self {
		self.options = options;

		self
	}

	/// Overrides the provider quirks.
	pub fn quirks(mut self, quirks: ProviderQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Overrides the claim extraction table.
	pub fn claim_rules(mut self, rules: ClaimRules) -> Self {
		self.claim_rules = rules;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let profile =
			self.profile_endpoint.ok_or(ProviderDescriptorError::MissingProfileEndpoint)?;
		let namespace = match self.namespace {
			Some(namespace) => namespace,
			None => ClaimNamespace::new(&*self.id)?,
		};
		let claims_issuer = self.claims_issuer.unwrap_or_else(|| self.id.to_string());
		let endpoints =
			ProviderEndpoints { authorization, token, profile, subject: self.subject_endpoint };
		let descriptor = ProviderDescriptor {
			id: self.id,
			namespace,
			claims_issuer,
			endpoints,
			scope: self.scope,
			options: self.options,
			quirks: self.quirks,
			claim_rules: self.claim_rules,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	///
	/// Descriptors loaded through serde bypass the builder, so flows call this again before
	/// first use.
	pub fn validate(&self) -> Result<(), ProviderDescriptorError> {
		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("token", &self.endpoints.token)?;
		validate_endpoint("profile", &self.endpoints.profile)?;

		if let Some(subject) = self.endpoints.subject.as_ref() {
			validate_endpoint("subject", subject)?;
		}
		if matches!(self.quirks.profile, ProfileMode::TwoStep(_))
			&& self.endpoints.subject.is_none()
		{
			return Err(ProviderDescriptorError::MissingSubjectEndpoint);
		}
		if self.options.display.is_some() && self.options.mobile_layout {
			return Err(ProviderDescriptorError::ConflictingDisplay);
		}
		if self.claims_issuer.trim().is_empty() {
			return Err(ProviderDescriptorError::EmptyClaimsIssuer);
		}

		validate_scope_delimiter(self.quirks.scope_delimiter)?;

		Ok(())
	}
}

/// Parses endpoint text, labeling failures with the endpoint name.
pub fn parse_endpoint(name: &'static str, raw: &str) -> Result<Url, ProviderDescriptorError> {
	Url::parse(raw).map_err(|source| ProviderDescriptorError::InvalidEndpoint { endpoint: name, source })
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}

fn validate_scope_delimiter(delimiter: char) -> Result<(), ProviderDescriptorError> {
	if delimiter.is_control() {
		Err(ProviderDescriptorError::InvalidScopeDelimiter { delimiter })
	} else {
		Ok(())
	}
}
