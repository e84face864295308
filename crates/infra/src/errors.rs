//! Conversions from external infrastructure errors into domain errors.

use statbridge_domain::StatBridgeError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub StatBridgeError);

impl From<InfraError> for StatBridgeError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<StatBridgeError> for InfraError {
    fn from(value: StatBridgeError) -> Self {
        Self(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error -> StatBridgeError */
/* -------------------------------------------------------------------------- */

impl From<reqwest::Error> for InfraError {
    fn from(err: reqwest::Error) -> Self {
        let mapped = if err.is_timeout() {
            StatBridgeError::Network(format!("request timed out: {err}"))
        } else if err.is_connect() {
            StatBridgeError::Network(format!("connection failed: {err}"))
        } else if err.is_decode() {
            StatBridgeError::Internal(format!("failed to decode response body: {err}"))
        } else if err.is_builder() {
            StatBridgeError::Config(format!("invalid request configuration: {err}"))
        } else {
            StatBridgeError::Network(err.to_string())
        };

        Self(mapped)
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error -> StatBridgeError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(err: std::io::Error) -> Self {
        Self(StatBridgeError::Io(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_io_variant() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: StatBridgeError = InfraError::from(io).into();
        assert!(matches!(err, StatBridgeError::Io(_)));
    }

    #[test]
    fn round_trips_domain_errors() {
        let original = StatBridgeError::Config("bad timezone".to_string());
        let infra: InfraError = original.into();
        let back: StatBridgeError = infra.into();
        assert!(matches!(back, StatBridgeError::Config(_)));
    }
}
