// Connection target validation

use std::fmt;

use crate::errors::SendError;

/// Where a command goes. Validated on construction so a bad port is
/// rejected before any socket is opened.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionTarget {
    ip: String,
    port: u16,
}

impl ConnectionTarget {
    /// Build a target from an address and an integer port in `1..=65535`
    pub fn new(ip: impl Into<String>, port: i64) -> Result<Self, SendError> {
        let ip = ip.into().trim().to_string();
        if ip.is_empty() {
            return Err(SendError::InvalidInput("Invalid address".to_string()));
        }

        let port = u16::try_from(port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(SendError::invalid_port)?;

        Ok(Self { ip, port })
    }

    /// Build a target from form text, e.g. the contents of a port field
    pub fn parse(ip: &str, port: &str) -> Result<Self, SendError> {
        let port = port
            .trim()
            .parse::<i64>()
            .map_err(|_| SendError::invalid_port())?;
        Self::new(ip, port)
    }

    pub fn ip(&self) -> &str {
        &self.ip
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.contains(':') && !self.ip.starts_with('[') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_bounds() {
        assert!(ConnectionTarget::new("127.0.0.1", 1).is_ok());
        assert!(ConnectionTarget::new("127.0.0.1", 65535).is_ok());

        for port in [0, -1, 65536, i64::MAX] {
            let err = ConnectionTarget::new("127.0.0.1", port).unwrap_err();
            assert!(err.is_invalid_input(), "port {} should be rejected", port);
            assert_eq!(err.status_message(), "Invalid port");
        }
    }

    #[test]
    fn test_parse_form_text() {
        let target = ConnectionTarget::parse(" 10.0.0.5 ", " 5555 ").unwrap();
        assert_eq!(target.ip(), "10.0.0.5");
        assert_eq!(target.port(), 5555);

        assert!(ConnectionTarget::parse("10.0.0.5", "").is_err());
        assert!(ConnectionTarget::parse("10.0.0.5", "abc").is_err());
        assert!(ConnectionTarget::parse("10.0.0.5", "70000").is_err());
    }

    #[test]
    fn test_empty_address_rejected() {
        let err = ConnectionTarget::new("   ", 5555).unwrap_err();
        assert_eq!(err.status_message(), "Invalid address");
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ConnectionTarget::new("10.0.0.5", 5555).unwrap().to_string(),
            "10.0.0.5:5555"
        );
        assert_eq!(
            ConnectionTarget::new("::1", 5555).unwrap().to_string(),
            "[::1]:5555"
        );
    }
}
