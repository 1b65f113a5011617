//! Server Configuration

use crate::error::ServerError;

/// Which Polar environment to list products from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PolarServer {
    #[default]
    Sandbox,
    Production,
}

impl PolarServer {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Sandbox,
        }
    }

    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => "https://sandbox-api.polar.sh",
            Self::Production => "https://api.polar.sh",
        }
    }
}

/// Credentials for the Polar products API
#[derive(Clone, Debug)]
pub struct PolarConfig {
    pub access_token: String,
    pub organization_id: String,
    pub base_url: String,
}

/// Process configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub static_dir: String,
    pub polar_access_token: Option<String>,
    pub polar_organization_id: Option<String>,
    pub polar_server: PolarServer,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".into(),
            static_dir: "static".into(),
            polar_access_token: None,
            polar_organization_id: None,
            polar_server: PolarServer::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            static_dir: non_empty("STATIC_DIR").unwrap_or(defaults.static_dir),
            polar_access_token: non_empty("POLAR_ACCESS_TOKEN"),
            polar_organization_id: non_empty("POLAR_ORGANIZATION_ID"),
            polar_server: non_empty("POLAR_SERVER")
                .map(|s| PolarServer::parse(&s))
                .unwrap_or_default(),
        }
    }

    /// Polar credentials, or the first missing variable
    pub fn polar(&self) -> Result<PolarConfig, ServerError> {
        let access_token = self
            .polar_access_token
            .clone()
            .ok_or_else(|| ServerError::Config("POLAR_ACCESS_TOKEN is not set".into()))?;
        let organization_id = self
            .polar_organization_id
            .clone()
            .ok_or_else(|| ServerError::Config("POLAR_ORGANIZATION_ID is not set".into()))?;

        Ok(PolarConfig {
            access_token,
            organization_id,
            base_url: self.polar_server.base_url().into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polar_requires_token_first() {
        let config = ServerConfig::default();
        let err = config.polar().unwrap_err();
        assert_eq!(err.to_string(), "POLAR_ACCESS_TOKEN is not set");

        let config = ServerConfig {
            polar_access_token: Some("polar_oat_123".into()),
            ..ServerConfig::default()
        };
        let err = config.polar().unwrap_err();
        assert_eq!(err.to_string(), "POLAR_ORGANIZATION_ID is not set");
    }

    #[test]
    fn test_polar_server_selection() {
        assert_eq!(PolarServer::parse("production"), PolarServer::Production);
        assert_eq!(PolarServer::parse("Sandbox"), PolarServer::Sandbox);
        assert_eq!(PolarServer::parse("anything"), PolarServer::Sandbox);

        let config = ServerConfig {
            polar_access_token: Some("t".into()),
            polar_organization_id: Some("org".into()),
            polar_server: PolarServer::Production,
            ..ServerConfig::default()
        };
        assert_eq!(config.polar().unwrap().base_url, "https://api.polar.sh");
    }
}
