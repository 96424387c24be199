use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POOL_INITIAL_SIZE: usize = 1;
pub const DEFAULT_POOL_MAX_CAPACITY: usize = 5;

/// A single node endpoint: `grpc://host:port` (plaintext) or `grpcs://host:port` (TLS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    tls: bool,
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let (tls, rest) = if let Some(rest) = s.strip_prefix("grpcs://") {
            (true, rest)
        } else if let Some(rest) = s.strip_prefix("grpc://") {
            (false, rest)
        } else {
            return Err(Error::InvalidEndpoint(format!(
                "{s}: expected grpc://host:port or grpcs://host:port"
            )));
        };

        let rest = rest.trim_end_matches('/');
        let (host, port) = rest
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidEndpoint(format!("{s}: missing port")))?;
        if host.is_empty() || host.contains('/') {
            return Err(Error::InvalidEndpoint(format!("{s}: missing host")));
        }
        let port: u16 = port
            .parse()
            .map_err(|_| Error::InvalidEndpoint(format!("{s}: invalid port {port:?}")))?;
        if port == 0 {
            return Err(Error::InvalidEndpoint(format!("{s}: port must be non-zero")));
        }

        Ok(Self {
            tls,
            host: host.to_string(),
            port,
        })
    }

    pub fn tls(&self) -> bool {
        self.tls
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// URI understood by the HTTP/2 transport.
    pub fn http_uri(&self) -> String {
        let scheme = if self.tls { "https" } else { "http" };
        format!("{scheme}://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scheme = if self.tls { "grpcs" } else { "grpc" };
        write!(f, "{scheme}://{}:{}", self.host, self.port)
    }
}

/// Bounds of the connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Advisory. Validated against `max_capacity` and logged, but the pool always starts
    /// empty and dials on demand.
    pub initial_size: usize,
    pub max_capacity: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: DEFAULT_POOL_INITIAL_SIZE,
            max_capacity: DEFAULT_POOL_MAX_CAPACITY,
        }
    }
}

impl PoolConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_capacity < 1 {
            return Err(Error::InvalidParameter(
                "pool max capacity must be at least 1".to_string(),
            ));
        }
        if self.initial_size > self.max_capacity {
            return Err(Error::InvalidParameter(format!(
                "pool initial size {} exceeds max capacity {}",
                self.initial_size, self.max_capacity
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: Endpoint,
    pub api_key: Option<String>,
    /// Applied per RPC when the caller's context has no deadline.
    pub timeout: Duration,
    pub pool: PoolConfig,
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> Result<Self> {
        Ok(Self {
            endpoint: Endpoint::parse(endpoint)?,
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            pool: PoolConfig::default(),
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pool(mut self, initial_size: usize, max_capacity: usize) -> Self {
        self.pool = PoolConfig {
            initial_size,
            max_capacity,
        };
        self
    }

    /// Loads `TRON_GRPC_URL`, `TRON_API_KEY`, `TRON_TIMEOUT_SECS`, `TRON_POOL_INITIAL_SIZE`
    /// and `TRON_POOL_MAX_CAPACITY`, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let env: Env = envy::prefixed("TRON_")
            .from_env()
            .map_err(|e| Error::InvalidParameter(format!("load tron env config: {e}")))?;
        Self::from_parts(env)
    }

    fn from_parts(env: Env) -> Result<Self> {
        if env.grpc_url.trim().is_empty() {
            return Err(Error::InvalidParameter(
                "TRON_GRPC_URL must be set".to_string(),
            ));
        }
        let timeout = match env.timeout_secs {
            0 => DEFAULT_TIMEOUT,
            secs => Duration::from_secs(secs),
        };
        let cfg = Self {
            endpoint: Endpoint::parse(&env.grpc_url)?,
            api_key: env.api_key.filter(|k| !k.trim().is_empty()),
            timeout,
            pool: PoolConfig {
                initial_size: env.pool_initial_size,
                max_capacity: env.pool_max_capacity,
            },
        };
        cfg.pool.validate()?;
        Ok(cfg)
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Env {
    grpc_url: String,
    api_key: Option<String>,
    timeout_secs: u64,
    pool_initial_size: usize,
    pool_max_capacity: usize,
}

impl Default for Env {
    fn default() -> Self {
        Self {
            grpc_url: String::new(),
            api_key: None,
            timeout_secs: 0,
            pool_initial_size: DEFAULT_POOL_INITIAL_SIZE,
            pool_max_capacity: DEFAULT_POOL_MAX_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plaintext_and_tls_endpoints() {
        let e = Endpoint::parse("grpc://127.0.0.1:50051").unwrap();
        assert!(!e.tls());
        assert_eq!(e.host(), "127.0.0.1");
        assert_eq!(e.port(), 50051);
        assert_eq!(e.http_uri(), "http://127.0.0.1:50051");

        let e = Endpoint::parse("grpcs://grpc.trongrid.io:443").unwrap();
        assert!(e.tls());
        assert_eq!(e.to_string(), "grpcs://grpc.trongrid.io:443");
        assert_eq!(e.http_uri(), "https://grpc.trongrid.io:443");
    }

    #[test]
    fn rejects_bad_endpoints() {
        for s in [
            "http://127.0.0.1:50051",
            "127.0.0.1:50051",
            "grpc://",
            "grpc://host",
            "grpc://:50051",
            "grpc://host:abc",
            "grpc://host:0",
        ] {
            assert!(
                matches!(Endpoint::parse(s), Err(Error::InvalidEndpoint(_))),
                "{s} should be rejected"
            );
        }
    }

    #[test]
    fn pool_config_validation() {
        assert!(PoolConfig::default().validate().is_ok());
        assert!(
            PoolConfig {
                initial_size: 0,
                max_capacity: 0
            }
            .validate()
            .is_err()
        );
        assert!(
            PoolConfig {
                initial_size: 3,
                max_capacity: 2
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn env_parts_apply_defaults() {
        let cfg = ClientConfig::from_parts(Env {
            grpc_url: "grpc://localhost:50051".to_string(),
            api_key: Some("  ".to_string()),
            ..Env::default()
        })
        .unwrap();
        assert_eq!(cfg.timeout, DEFAULT_TIMEOUT);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.pool, PoolConfig::default());

        assert!(ClientConfig::from_parts(Env::default()).is_err());
    }
}
