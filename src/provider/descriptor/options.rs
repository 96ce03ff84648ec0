// self
use crate::_prelude::*;

/// Page layout hints understood by providers that accept a `display` parameter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
	/// Full-page layout.
	Page,
	/// Pop-up window layout.
	Popup,
	/// Floating dialog layout.
	Dialog,
	/// Mobile browser layout.
	Mobile,
	/// Television layout.
	Tv,
	/// Tablet layout.
	Pad,
}
impl DisplayMode {
	/// Returns the wire value sent in the `display` parameter.
	pub fn as_str(self) -> &'static str {
		match self {
			DisplayMode::Page => "page",
			DisplayMode::Popup => "popup",
			DisplayMode::Dialog => "dialog",
			DisplayMode::Mobile => "mobile",
			DisplayMode::Tv => "tv",
			DisplayMode::Pad => "pad",
		}
	}
}
impl Display for DisplayMode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Optional login behavior flags.
///
/// Unset values never reach the wire: leaving a flag off is an explicit opt-out, not a
/// default value sent to the provider.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginOptions {
	/// Layout hint for the provider's login page.
	pub display: Option<DisplayMode>,
	/// Ask the provider to show the login form even with an active session.
	pub force_reauth: bool,
	/// Ask the provider to show an authorization confirmation step.
	pub require_confirm: bool,
	/// Ask the provider to offer SMS login.
	pub sms_login: bool,
	/// Ask the provider for its mobile layout.
	pub mobile_layout: bool,
}

