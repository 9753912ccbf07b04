//! Error handling for the application

use thiserror::Error;

/// Failures while fetching a day's schedule from the booking service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Booking service rejected the query: {0}")]
    Api(String),
}

impl FetchError {
    /// Transport-level failures (network, timeout, non-2xx)
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Status(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Payload(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Failures while locating the watched departure inside a snapshot
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Route not found: {start} -> {arrival}")]
    RouteNotFound { start: String, arrival: String },

    #[error("Departure {0} not found on this route")]
    DepartureNotFound(String),

    #[error("Class list could not be decoded: {0}")]
    Payload(String),
}

/// Notification delivery failures
#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Email notifications are disabled")]
    Disabled,

    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("Authentication rejected, check the sender address and authorization code: {0}")]
    Authentication(String),

    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schedule unavailable: {0}")]
    Schedule(String),

    #[error("Notification failed: {0}")]
    Notification(String),
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        AppError::Schedule(err.to_string())
    }
}

impl From<LocateError> for AppError {
    fn from(err: LocateError) -> Self {
        AppError::Schedule(err.to_string())
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        AppError::Notification(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        assert_eq!(FetchError::Status(502).to_string(), "Unexpected HTTP status: 502");
        assert_eq!(
            FetchError::Api("token expired".into()).to_string(),
            "Booking service rejected the query: token expired"
        );
    }

    #[test]
    fn test_transport_classification() {
        assert!(FetchError::Transport("timeout".into()).is_transport());
        assert!(FetchError::Status(500).is_transport());
        assert!(!FetchError::Payload("eof".into()).is_transport());
        assert!(!FetchError::Api("bad".into()).is_transport());
    }

    #[test]
    fn test_locate_error_wraps_fetch_error() {
        let err: LocateError = FetchError::Transport("connection reset".into()).into();
        assert!(matches!(err, LocateError::Fetch(FetchError::Transport(_))));
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }

    #[test]
    fn test_route_not_found_display() {
        let err = LocateError::RouteNotFound {
            start: "North Gate".into(),
            arrival: "Airport".into(),
        };
        assert_eq!(err.to_string(), "Route not found: North Gate -> Airport");
    }

    #[test]
    fn test_app_error_from_notification_error() {
        let err: AppError = NotificationError::Disabled.into();
        assert!(matches!(err, AppError::Notification(_)));
        assert!(err.to_string().contains("disabled"));
    }
}
