//! Bridges `oauth2` transport errors into the engine taxonomy.

pub use oauth2;

// crates.io
use oauth2::HttpClientError;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
	provider::EndpointKind,
};

/// Maps HTTP transport failures into engine [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted while calling `endpoint` into an engine error.
	fn map_transport_error(&self, endpoint: EndpointKind, error: HttpClientError<E>) -> Error;
}

/// Mapper for transports whose errors carry no extra classification.
///
/// Client errors become [`TransportError::Network`]; request construction failures become
/// configuration errors.
#[derive(Clone, Debug, Default)]
pub struct GenericTransportErrorMapper;
impl<E> TransportErrorMapper<E> for GenericTransportErrorMapper
where
	E: 'static + Send + Sync + StdError,
{
	fn map_transport_error(&self, endpoint: EndpointKind, err: HttpClientError<E>) -> Error {
		match err {
			HttpClientError::Reqwest(inner) =>
				TransportError::Network { endpoint, source: inner }.into(),
			other => map_common(endpoint, other),
		}
	}
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		endpoint: EndpointKind,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(endpoint, *inner),
			other => map_common(endpoint, other),
		}
	}
}

fn map_common<E>(endpoint: EndpointKind, err: HttpClientError<E>) -> Error
where
	E: 'static + Send + Sync + StdError,
{
	match err {
		HttpClientError::Reqwest(inner) => TransportError::Network { endpoint, source: inner }.into(),
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(source) => TransportError::Io { endpoint, source }.into(),
		HttpClientError::Other(message) => TransportError::Other { endpoint, message }.into(),
		_ => TransportError::Other { endpoint, message: "unrecognized transport failure".into() }
			.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(endpoint: EndpointKind, err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::network(endpoint, err).into()
}
