// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2025 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Connection configuration for the Redis-backed store: host/port/username
//! /password/ssl plus connection-retry backoff, deserializable from the
//! ambient config layer.

use serde::{Deserialize, Serialize};

/// Configuration for a Redis connection backing the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// The database host address; `None` uses `127.0.0.1`.
    pub host: Option<String>,
    /// The database port; `None` uses `6379`.
    pub port: Option<u16>,
    /// The account username for the connection, if any.
    pub username: Option<String>,
    /// The account password for the connection, if any.
    pub password: Option<String>,
    /// Whether to use an SSL-enabled (`rediss://`) connection.
    pub ssl: bool,
    /// Timeout (seconds) to wait for a new connection.
    pub connection_timeout: u16,
    /// Timeout (seconds) to wait for a command response.
    pub response_timeout: u16,
    /// Number of retry attempts with exponential backoff for connection
    /// attempts.
    pub number_of_retries: usize,
    /// Base value for the exponential backoff calculation.
    pub exponent_base: u64,
    /// Maximum delay (milliseconds) between retry attempts.
    pub max_delay_ms: u64,
    /// Multiplication factor for the retry delay calculation.
    pub factor: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            ssl: false,
            connection_timeout: 20,
            response_timeout: 20,
            number_of_retries: 6,
            exponent_base: 2,
            max_delay_ms: 5_000,
            factor: 2,
        }
    }
}

/// Parses a Redis connection URL from `config`, returning `(url,
/// redacted_url)`. The redacted form keeps only the first and last two
/// characters of the password, for safe inclusion in log lines.
///
/// # Panics
///
/// Panics if a username is supplied without a password.
#[must_use]
pub fn get_redis_url(config: &DatabaseConfig) -> (String, String) {
    let host = config.host.clone().unwrap_or_else(|| "127.0.0.1".to_string());
    let port = config.port.unwrap_or(6379);
    let username = config.username.clone().unwrap_or_default();
    let password = config.password.clone().unwrap_or_default();

    let redact = |pw: &str| {
        if pw.len() > 4 {
            format!("{}...{}", &pw[..2], &pw[pw.len() - 2..])
        } else {
            pw.to_owned()
        }
    };

    let (auth, auth_redacted) = match (username.is_empty(), password.is_empty()) {
        (false, false) => (
            format!("{username}:{password}@"),
            format!("{username}:{}@", redact(&password)),
        ),
        (true, false) => (format!(":{password}@"), format!(":{}@", redact(&password))),
        (false, true) => panic!(
            "redis config error: username supplied without password; \
             either supply a password or omit the username"
        ),
        (true, true) => (String::new(), String::new()),
    };

    let scheme = if config.ssl { "rediss" } else { "redis" };
    (
        format!("{scheme}://{auth}{host}:{port}"),
        format!("{scheme}://{auth_redacted}{host}:{port}"),
    )
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_default_url_has_no_auth() {
        let (url, redacted) = get_redis_url(&DatabaseConfig::default());
        assert_eq!(url, "redis://127.0.0.1:6379");
        assert_eq!(redacted, url);
    }

    #[rstest]
    fn test_password_only_is_redacted() {
        let config = DatabaseConfig {
            password: Some("supersecret".to_string()),
            ..Default::default()
        };
        let (url, redacted) = get_redis_url(&config);
        assert_eq!(url, "redis://:supersecret@127.0.0.1:6379");
        assert_eq!(redacted, "redis://:su...et@127.0.0.1:6379");
    }

    #[rstest]
    fn test_ssl_uses_rediss_scheme() {
        let config = DatabaseConfig {
            ssl: true,
            ..Default::default()
        };
        let (url, _) = get_redis_url(&config);
        assert!(url.starts_with("rediss://"));
    }
}
