use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// HTTP server settings
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// Load from BIND_ADDR and PORT, falling back to defaults for unset or
    /// unparsable values
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(value) if !value.trim().is_empty() => value.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid BIND_ADDR {:?}", value);
                defaults.bind_addr
            }),
            _ => defaults.bind_addr,
        };

        let port = match std::env::var("PORT") {
            Ok(value) if !value.trim().is_empty() => value.trim().parse().unwrap_or_else(|_| {
                tracing::warn!("Ignoring invalid PORT {:?}", value);
                defaults.port
            }),
            _ => defaults.port,
        };

        Self { bind_addr, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}
