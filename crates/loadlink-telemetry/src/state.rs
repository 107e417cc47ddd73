use std::fmt;

use serde::Serialize;

/// Where the controller link stands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ConnectionState {
    /// Never connected, or closed by the host.
    #[default]
    Disconnected,
    Connected,
    /// Opening failed or the link dropped while reading.
    ConnectFailed(String),
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => f.write_str("disconnected"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::ConnectFailed(reason) => write!(f, "connect failed: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_disconnected() {
        let state = ConnectionState::default();
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(!state.is_connected());
    }

    #[test]
    fn display_and_json() {
        let state = ConnectionState::ConnectFailed("port busy".into());
        assert_eq!(state.to_string(), "connect failed: port busy");

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "connect_failed");
        assert_eq!(json["reason"], "port busy");

        let json = serde_json::to_value(ConnectionState::Connected).unwrap();
        assert_eq!(json["state"], "connected");
    }
}
