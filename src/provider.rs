//! Provider-facing descriptors (data), strategies (behavior), and built-in presets.
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering HTTPS-only
//! endpoints, requested scopes, login options, and wire-format quirks (scope delimiter,
//! token body format, one- or two-step profile resolution). `rules` holds the per-provider
//! claim extraction table. `strategy` defines [`ProviderStrategy`], the hook that adds
//! non-standard authorization parameters and parses or vets provider responses. `presets`
//! and `config` assemble all of the above for known providers.

pub mod config;
pub mod descriptor;
pub mod presets;
pub mod rules;
pub mod strategy;

pub use config::*;
pub use descriptor::*;
pub use presets::*;
pub use rules::*;
pub use strategy::*;
