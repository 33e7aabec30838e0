//! Server configuration layered from built-in defaults and `HABITRACK_*`
//! environment variables.
//!
//! `HABITRACK_BIND`, `HABITRACK_DATABASE`, `HABITRACK_LOG_LEVEL`,
//! `HABITRACK_LOG_DIR`, `HABITRACK_SECURE_COOKIES`,
//! `HABITRACK_ARGON2_MEMORY_KIB` and `HABITRACK_ARGON2_ITERATIONS` map onto
//! the fields of [`ServerConfig`] with the prefix stripped and lowercased.
//! A set but malformed value is an error naming the variable, never a silent
//! fallback.

use figment::providers::{Env, Serialized};
use figment::Figment;
use habitrack_core::{default_log_level, HashingCost};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "HABITRACK_";

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE: &str = "habitrack.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub database: PathBuf,
    pub log_level: String,
    /// Absolute directory for rotated log files; `None` (or blank) logs to
    /// stderr.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
    /// Adds the `Secure` attribute to the session cookie.
    #[serde(default)]
    pub secure_cookies: bool,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let hashing = HashingCost::default();
        Self {
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            database: PathBuf::from(DEFAULT_DATABASE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            secure_cookies: false,
            argon2_memory_kib: hashing.memory_kib,
            argon2_iterations: hashing.iterations,
        }
    }
}

/// A configuration value that could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable at fault, or `HABITRACK_*` when no single one is.
    pub variable: String,
    pub message: String,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: {}", self.variable, self.message)
    }
}

impl Error for ConfigError {}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        let variable = if err.path.is_empty() {
            format!("{ENV_PREFIX}*")
        } else {
            format!("{ENV_PREFIX}{}", err.path.join("_").to_ascii_uppercase())
        };
        Self {
            variable,
            message: err.kind.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config: Self = Self::figment().extract()?;
        if config
            .log_dir
            .as_deref()
            .is_some_and(|dir| dir.trim().is_empty())
        {
            config.log_dir = None;
        }
        Ok(config)
    }

    /// Provider chain behind [`ServerConfig::from_env`]; environment wins.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// Argon2 cost for the credential hasher.
    pub fn hashing(&self) -> HashingCost {
        HashingCost {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn empty_environment_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.bind, "127.0.0.1:8000".parse().unwrap());
            assert_eq!(config.database, PathBuf::from("habitrack.sqlite3"));
            assert_eq!(config.log_level, default_log_level());
            assert_eq!(config.log_dir, None);
            assert!(!config.secure_cookies);
            assert_eq!(config.hashing(), HashingCost::default());
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("HABITRACK_BIND", "0.0.0.0:9000");
            jail.set_env("HABITRACK_DATABASE", "/var/lib/habitrack/db.sqlite3");
            jail.set_env("HABITRACK_LOG_LEVEL", "warn");
            jail.set_env("HABITRACK_LOG_DIR", "/var/log/habitrack");
            jail.set_env("HABITRACK_SECURE_COOKIES", "true");
            jail.set_env("HABITRACK_ARGON2_MEMORY_KIB", "8192");
            jail.set_env("HABITRACK_ARGON2_ITERATIONS", "3");

            let config = ServerConfig::from_env().unwrap();
            assert_eq!(config.bind.port(), 9000);
            assert_eq!(
                config.database,
                PathBuf::from("/var/lib/habitrack/db.sqlite3")
            );
            assert_eq!(config.log_level, "warn");
            assert_eq!(config.log_dir.as_deref(), Some("/var/log/habitrack"));
            assert!(config.secure_cookies);
            assert_eq!(
                config.hashing(),
                HashingCost {
                    memory_kib: 8192,
                    iterations: 3
                }
            );
            Ok(())
        });
    }

    #[test]
    fn blank_log_dir_means_stderr() {
        Jail::expect_with(|jail| {
            jail.set_env("HABITRACK_LOG_DIR", "  ");
            assert_eq!(ServerConfig::from_env().unwrap().log_dir, None);
            Ok(())
        });
    }

    #[test]
    fn malformed_values_name_the_variable() {
        Jail::expect_with(|jail| {
            jail.set_env("HABITRACK_BIND", "localhost");
            assert_eq!(ServerConfig::from_env().unwrap_err().variable, "HABITRACK_BIND");
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.set_env("HABITRACK_SECURE_COOKIES", "maybe");
            assert_eq!(
                ServerConfig::from_env().unwrap_err().variable,
                "HABITRACK_SECURE_COOKIES"
            );
            Ok(())
        });

        Jail::expect_with(|jail| {
            jail.set_env("HABITRACK_ARGON2_ITERATIONS", "-1");
            let err = ServerConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("HABITRACK_ARGON2_ITERATIONS"));
            Ok(())
        });
    }
}
