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

//! Provider authentication descriptors.
//!
//! Each variant owns its own credential shape; there is deliberately no
//! shared `credentials: HashMap<String, String>` bag, so a missing field on
//! one auth scheme can never silently satisfy another.

use serde::{Deserialize, Serialize};

use crate::ProviderKind;

/// An OAuth2 access token cached by the dispatch client, refreshed on
/// expiry or a single reactive 401.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CachedToken {
    /// The bearer token to send on the `Authorization` header.
    pub access_token: String,
    /// Unix seconds at which the token was minted.
    pub issued_at: u64,
    /// Seconds from `issued_at` the token is valid for.
    pub expires_in: u64,
}

impl CachedToken {
    /// Margin subtracted from `issued_at + expires_in` so a token in-flight
    /// is never presented within a few seconds of its real expiry.
    pub const EXPIRY_MARGIN_SECS: u64 = 300;

    /// Returns `true` if the token is still usable at `now` (unix seconds).
    #[must_use]
    pub fn is_valid_at(&self, now: u64) -> bool {
        let expiry = self
            .issued_at
            .saturating_add(self.expires_in)
            .saturating_sub(Self::EXPIRY_MARGIN_SECS);
        now < expiry
    }
}

/// Provider authentication descriptor, tagged by scheme.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Auth {
    /// Client-credentials (or refresh-token) OAuth2 flow.
    OAuth2 {
        /// Token endpoint used for the client-credentials/refresh-token grant.
        token_url: String,
        /// OAuth2 client identifier.
        client_id: String,
        /// OAuth2 client secret.
        client_secret: String,
        /// Refresh token, when the refresh-token grant should be used
        /// instead of client-credentials.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        refresh_token: Option<String>,
    },
    /// A static API key sent as a bearer token or a custom header,
    /// depending on provider kind.
    ApiKey {
        /// The API key value.
        key: String,
    },
    /// HTTP Basic authentication.
    Basic {
        /// Basic auth username.
        username: String,
        /// Basic auth password.
        password: String,
    },
}

impl Auth {
    /// Formats the `(header_name, header_value)` pair for a static scheme.
    ///
    /// Returns `None` for [`Auth::OAuth2`], whose header depends on a
    /// cached token the dispatch client must first obtain or refresh.
    #[must_use]
    pub fn static_header(&self, kind: ProviderKind) -> Option<(&'static str, String)> {
        match self {
            Self::OAuth2 { .. } => None,
            Self::ApiKey { key } => Some(match kind {
                ProviderKind::Salesforce | ProviderKind::Hubspot => {
                    ("Authorization", format!("Bearer {key}"))
                }
                ProviderKind::Pipedrive | ProviderKind::Custom => ("X-API-Key", key.clone()),
            }),
            Self::Basic { username, password } => {
                use base64::Engine;
                let encoded =
                    base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
                Some(("Authorization", format!("Basic {encoded}")))
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_cached_token_validity() {
        let token = CachedToken {
            access_token: "abc".into(),
            issued_at: 1_000,
            expires_in: 3_600,
        };
        assert!(token.is_valid_at(1_100));
        assert!(!token.is_valid_at(1_000 + 3_600 - 299));
    }

    #[rstest]
    fn test_api_key_header_selection() {
        let auth = Auth::ApiKey { key: "k".into() };
        assert_eq!(
            auth.static_header(ProviderKind::Salesforce),
            Some(("Authorization", "Bearer k".to_string()))
        );
        assert_eq!(
            auth.static_header(ProviderKind::Custom),
            Some(("X-API-Key", "k".to_string()))
        );
    }

    #[rstest]
    fn test_basic_header() {
        let auth = Auth::Basic {
            username: "user".into(),
            password: "pass".into(),
        };
        let (name, value) = auth.static_header(ProviderKind::Custom).unwrap();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Basic dXNlcjpwYXNz");
    }

    #[rstest]
    fn test_oauth2_has_no_static_header() {
        let auth = Auth::OAuth2 {
            token_url: "https://example.com/token".into(),
            client_id: "id".into(),
            client_secret: "secret".into(),
            refresh_token: None,
        };
        assert!(auth.static_header(ProviderKind::Salesforce).is_none());
    }
}
