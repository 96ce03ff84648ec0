//! Claim extraction rules: small per-provider tables mapping logical identity fields to
//! paths inside the raw profile payload.

// std
use std::slice::Iter;
// crates.io
use serde::{Deserializer, Serializer, de::Error as DeError};
// self
use crate::_prelude::*;

/// Errors emitted when parsing a dotted claim path.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ClaimPathError {
	/// Path has no segments.
	#[error("Claim path cannot be empty.")]
	Empty,
	/// Path contains an empty segment (`a..b`, leading or trailing dot).
	#[error("Claim path `{path}` contains an empty segment.")]
	EmptySegment {
		/// Offending path.
		path: String,
	},
}

/// Sequence of object keys leading to a value in a nested payload.
///
/// Rendered and parsed as dotted text (`userinfo.accountId`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClaimPath(Vec<String>);
impl ClaimPath {
	/// Single top-level key.
	pub fn key(key: impl Into<String>) -> Self {
		Self(vec![key.into()])
	}

	/// Nested keys, outermost first.
	pub fn nested<I, S>(keys: I) -> Result<Self, ClaimPathError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let keys = keys.into_iter().map(Into::into).collect::<Vec<String>>();

		if keys.is_empty() {
			return Err(ClaimPathError::Empty);
		}
		if keys.iter().any(String::is_empty) {
			return Err(ClaimPathError::EmptySegment { path: keys.join(".") });
		}

		Ok(Self(keys))
	}

	/// Extends the path by one key.
	pub fn child(mut self, key: impl Into<String>) -> Self {
		self.0.push(key.into());

		self
	}

	/// Walks the payload; `None` when any segment is missing or not an object.
	pub fn resolve<'a>(&self, payload: &'a Value) -> Option<&'a Value> {
		self.0.iter().try_fold(payload, |node, key| node.as_object()?.get(key))
	}

	/// Iterator over path segments.
	pub fn segments(&self) -> Iter<'_, String> {
		self.0.iter()
	}
}
impl Debug for ClaimPath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "ClaimPath({})", self)
	}
}
impl Display for ClaimPath {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0.join("."))
	}
}
impl FromStr for ClaimPath {
	type Err = ClaimPathError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Err(ClaimPathError::Empty);
		}

		Self::nested(s.split('.'))
	}
}
impl Serialize for ClaimPath {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}
impl<'de> Deserialize<'de> for ClaimPath {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;

		raw.parse().map_err(DeError::custom)
	}
}

/// Provider-prefixed field copied verbatim into a `urn:<namespace>:<field>` claim.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraClaim {
	/// Claim suffix after the namespace.
	pub field: String,
	/// Location of the value.
	pub path: ClaimPath,
}

/// Per-provider claim extraction table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRules {
	/// Location of the stable subject identifier.
	pub subject: ClaimPath,
	/// Location of the display name.
	#[serde(default)]
	pub name: Option<ClaimPath>,
	/// Location of the avatar URL.
	#[serde(default)]
	pub avatar: Option<ClaimPath>,
	/// Suffix of the provider-prefixed avatar claim (`portrait`, `figure`, ...).
	#[serde(default = "default_avatar_field")]
	pub avatar_field: String,
	/// Additional provider-prefixed fields.
	#[serde(default)]
	pub extras: Vec<ExtraClaim>,
}
impl ClaimRules {
	/// Creates rules that only extract the subject identifier.
	pub fn new(subject: ClaimPath) -> Self {
		Self {
			subject,
			name: None,
			avatar: None,
			avatar_field: default_avatar_field(),
			extras: Vec::new(),
		}
	}

	/// Sets the display name location.
	pub fn name(mut self, path: ClaimPath) -> Self {
		self.name = Some(path);

		self
	}

	/// Sets the avatar location and its provider-prefixed claim suffix.
	pub fn avatar(mut self, field: impl Into<String>, path: ClaimPath) -> Self {
		self.avatar_field = field.into();
		self.avatar = Some(path);

		self
	}

	/// Adds a provider-prefixed field.
	pub fn extra(mut self, field: impl Into<String>, path: ClaimPath) -> Self {
		self.extras.push(ExtraClaim { field: field.into(), path });

		self
	}
}
impl Default for ClaimRules {
	fn default() -> Self {
		Self::new(ClaimPath::key("id"))
	}
}

fn default_avatar_field() -> String {
	"avatar".into()
}
