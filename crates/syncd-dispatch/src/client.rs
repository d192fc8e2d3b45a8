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

//! The dispatch client: turns one `(operation, provider config)` pair into
//! an outbound HTTP request, honoring the rate limiter and the per-provider
//! auth descriptor.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use reqwest::{Method, StatusCode};
use syncd_model::{Auth, CachedToken, DispatchOutcome, Operation, OperationKind, ProviderConfig};
use syncd_network::{ExponentialBackoff, RateLimiterManager};
use syncd_transform::{TransformerRegistry, transform};

use crate::{error::DispatchError, registry::ProviderRegistry, urls};

/// Transport-level retries on connection/timeout errors, per §4.4's HTTP
/// retry envelope (base 1s, min 4s, max 10s).
const TRANSPORT_RETRY_ATTEMPTS: u32 = 3;

/// Produces outbound HTTP requests from `(operation, provider)` pairs,
/// consulting the rate limiter before every attempt and caching OAuth2
/// tokens across dispatches.
pub struct DispatchClient {
    http: reqwest::Client,
    registry: Arc<ProviderRegistry>,
    rate_limiter: Arc<RateLimiterManager>,
    transformers: TransformerRegistry,
    tokens: DashMap<String, CachedToken>,
}

impl std::fmt::Debug for DispatchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DispatchClient").finish_non_exhaustive()
    }
}

impl DispatchClient {
    /// Builds a client over `registry` and `rate_limiter`, using the default
    /// built-in transformer registry (callers needing extension transformers
    /// should use [`Self::with_transformers`]).
    #[must_use]
    pub fn new(registry: Arc<ProviderRegistry>, rate_limiter: Arc<RateLimiterManager>) -> Self {
        Self::with_transformers(registry, rate_limiter, TransformerRegistry::new())
    }

    /// Builds a client with a caller-supplied transformer registry.
    #[must_use]
    pub fn with_transformers(
        registry: Arc<ProviderRegistry>,
        rate_limiter: Arc<RateLimiterManager>,
        transformers: TransformerRegistry,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            registry,
            rate_limiter,
            transformers,
            tokens: DashMap::new(),
        }
    }

    /// Attempts to dispatch `op` at wallclock `now` (unix seconds).
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] per §7's taxonomy; the worker loop is
    /// responsible for routing the failure to retry or dead-letter.
    pub async fn dispatch(&self, op: &Operation, now: u64) -> Result<DispatchOutcome, DispatchError> {
        let config = self
            .registry
            .get(&op.provider)
            .ok_or_else(|| DispatchError::UnknownProvider(op.provider.clone()))?;

        if !self
            .rate_limiter
            .try_acquire(&config.name, 1.0, now as f64)
            .await
            .map_err(DispatchError::Unexpected)?
        {
            return Err(DispatchError::RateLimited);
        }

        let body = self.build_body(op, &config)?;
        let (method, path) = urls::resolve(op.kind, config.kind, op.record_id.as_deref())
            .ok_or_else(|| DispatchError::MissingField("record_id".to_string()))?;
        let url = format!(
            "{}{}",
            config.base_endpoint.trim_end_matches('/'),
            path
        );

        self.send_with_retries(&config, method, &url, body.as_ref(), now, false)
            .await
    }

    fn build_body(
        &self,
        op: &Operation,
        config: &ProviderConfig,
    ) -> Result<Option<serde_json::Value>, DispatchError> {
        if !op.kind.requires_record() {
            return Ok(None);
        }
        let record = op.record.as_ref().ok_or_else(|| {
            DispatchError::MissingField("record".to_string())
        })?;
        let mappings = syncd_model::default_mappings(config.kind);
        let projected = transform(
            record,
            &mappings,
            syncd_model::Direction::InternalToExternal,
            &self.transformers,
        )?;
        Ok(Some(serde_json::to_value(&projected).map_err(|e| {
            DispatchError::Unexpected(anyhow::anyhow!(e))
        })?))
    }

    /// Sends one request, applying the transport-retry envelope for
    /// connection/timeout errors and handling the §4.4 status-code table.
    /// `reauthed` prevents more than one reactive re-auth-and-retry on 401.
    async fn send_with_retries(
        &self,
        config: &ProviderConfig,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        now: u64,
        reauthed: bool,
    ) -> Result<DispatchOutcome, DispatchError> {
        let mut backoff = ExponentialBackoff::new(
            Duration::from_secs(1),
            Duration::from_secs(10),
            4.0,
            0,
            false,
        )
        .expect("backoff factor 4.0 is within the valid [1.0, 100.0] range");

        let mut last_transport_err = None;
        for attempt in 0..TRANSPORT_RETRY_ATTEMPTS {
            let mut request = self.http.request(method.clone(), url).timeout(config.timeout);
            if let Some(body) = body {
                request = request.json(body);
            }
            request = self.apply_auth(request, config, now).await?;

            match request.send().await {
                Ok(response) => {
                    return self
                        .handle_response(config, method, url, body, now, reauthed, response)
                        .await;
                }
                Err(err) if err.is_timeout() || err.is_connect() => {
                    last_transport_err = Some(err);
                    if attempt + 1 < TRANSPORT_RETRY_ATTEMPTS {
                        tokio::time::sleep(backoff.next_duration()).await;
                    }
                }
                Err(err) => return Err(DispatchError::Transport(err)),
            }
        }
        Err(DispatchError::Transport(last_transport_err.expect(
            "loop always sets last_transport_err before exhausting retries",
        )))
    }

    async fn handle_response(
        &self,
        config: &ProviderConfig,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        now: u64,
        reauthed: bool,
        response: reqwest::Response,
    ) -> Result<DispatchOutcome, DispatchError> {
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DispatchError::RateLimited);
        }

        if status == StatusCode::UNAUTHORIZED {
            if reauthed {
                return Err(DispatchError::AuthenticationError(
                    "re-authentication did not resolve a second 401".to_string(),
                ));
            }
            if let Auth::OAuth2 { .. } = &config.auth {
                self.tokens.remove(&config.name);
            }
            return Box::pin(self.send_with_retries(config, method, url, body, now, true)).await;
        }

        let response_body = response.text().await.map_err(DispatchError::Transport)?;

        if status.is_success() {
            let decoded = serde_json::from_str::<serde_json::Value>(&response_body)
                .unwrap_or_else(|_| serde_json::json!({"status": "success", "data": response_body}));
            return Ok(DispatchOutcome::from_body(decoded));
        }

        Err(DispatchError::ApiError {
            status,
            body: response_body,
        })
    }

    async fn apply_auth(
        &self,
        request: reqwest::RequestBuilder,
        config: &ProviderConfig,
        now: u64,
    ) -> Result<reqwest::RequestBuilder, DispatchError> {
        if let Some((name, value)) = config.auth.static_header(config.kind) {
            return Ok(request.header(name, value));
        }

        let Auth::OAuth2 { .. } = &config.auth else {
            unreachable!("static_header returns Some for every non-OAuth2 variant")
        };
        let token = self.token_for(config, now).await?;
        Ok(request.bearer_auth(token))
    }

    async fn token_for(&self, config: &ProviderConfig, now: u64) -> Result<String, DispatchError> {
        if let Some(cached) = self.tokens.get(&config.name) {
            if cached.is_valid_at(now) {
                return Ok(cached.access_token.clone());
            }
        }

        let Auth::OAuth2 {
            token_url,
            client_id,
            client_secret,
            refresh_token,
        } = &config.auth
        else {
            unreachable!("token_for is only called for an OAuth2 descriptor")
        };

        let mut form = vec![("client_id", client_id.as_str()), ("client_secret", client_secret.as_str())];
        if let Some(refresh_token) = refresh_token {
            form.push(("grant_type", "refresh_token"));
            form.push(("refresh_token", refresh_token.as_str()));
        } else {
            form.push(("grant_type", "client_credentials"));
        }

        let response = self
            .http
            .post(token_url)
            .form(&form)
            .send()
            .await
            .map_err(DispatchError::Transport)?;

        if !response.status().is_success() {
            return Err(DispatchError::AuthenticationError(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let payload: serde_json::Value = response.json().await.map_err(DispatchError::Transport)?;
        let access_token = payload
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                DispatchError::AuthenticationError("token response missing access_token".to_string())
            })?
            .to_string();
        let expires_in = payload
            .get("expires_in")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(3_600);

        let cached = CachedToken {
            access_token: access_token.clone(),
            issued_at: now,
            expires_in,
        };
        self.tokens.insert(config.name.clone(), cached);
        Ok(access_token)
    }
}

////////////////////////////////////////////////////////////////////////////////
// Tests
////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{Json, Router, extract::State, routing::post};
    use rstest::rstest;
    use serde_json::json;
    use syncd_model::{FieldValue, OperationKind, ProviderKind};

    use super::*;

    fn sf_config(base_endpoint: String) -> ProviderConfig {
        ProviderConfig {
            name: "sf".to_string(),
            kind: ProviderKind::Salesforce,
            base_endpoint,
            rate_per_minute: 6_000.0,
            burst: 10,
            timeout: Duration::from_secs(5),
            max_retries: 3,
            auth: Auth::ApiKey { key: "test-key".to_string() },
        }
    }

    async fn spawn_create_echo() -> String {
        async fn handler(State(_): State<()>, Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
            Json(json!({"id": "sf-123", "echo": body}))
        }
        let app = Router::new()
            .route("/services/data/v52.0/sobjects/Contact", post(handler))
            .with_state(());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[rstest]
    #[tokio::test]
    async fn test_happy_path_create_dispatch() {
        let base = spawn_create_echo().await;
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(sf_config(base));
        let rate_limiter = Arc::new(RateLimiterManager::new(Arc::new(
            syncd_network::InMemoryBucketBackend::new(),
        )));
        rate_limiter.register("sf", syncd_network::ProviderBudget { capacity: 10.0, refill_rate: 100.0 });
        let client = DispatchClient::new(registry, rate_limiter);

        let record = HashMap::from([
            ("first_name".to_string(), FieldValue::from("A")),
            ("last_name".to_string(), FieldValue::from("B")),
        ]);
        let op = Operation::new(OperationKind::Create, "sf", None, Some(record), 5, 0).unwrap();

        let outcome = client.dispatch(&op, 0).await.unwrap();
        assert_eq!(outcome.external_id.as_deref(), Some("sf-123"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_unknown_provider_errors() {
        let registry = Arc::new(ProviderRegistry::new());
        let rate_limiter = Arc::new(RateLimiterManager::new(Arc::new(
            syncd_network::InMemoryBucketBackend::new(),
        )));
        let client = DispatchClient::new(registry, rate_limiter);

        let op = Operation::new(OperationKind::Read, "ghost", Some("1".into()), None, 5, 0).unwrap();
        let err = client.dispatch(&op, 0).await.unwrap_err();
        assert!(matches!(err, DispatchError::UnknownProvider(name) if name == "ghost"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_record_id_surfaces_missing_field() {
        // record_id is unvalidated at construction (`Operation::new` only
        // checks CREATE/UPDATE's `record`), so a READ missing one reaches
        // dispatch and must fail there instead of silently hitting `.../`.
        let base = spawn_create_echo().await;
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(sf_config(base));
        let rate_limiter = Arc::new(RateLimiterManager::new(Arc::new(
            syncd_network::InMemoryBucketBackend::new(),
        )));
        rate_limiter.register("sf", syncd_network::ProviderBudget { capacity: 10.0, refill_rate: 10.0 });
        let client = DispatchClient::new(registry, rate_limiter);

        let op = Operation::new(OperationKind::Read, "sf", None, None, 5, 0).unwrap();
        let err = client.dispatch(&op, 0).await.unwrap_err();
        assert!(matches!(err, DispatchError::MissingField(field) if field == "record_id"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_rate_limited_when_bucket_empty() {
        let base = spawn_create_echo().await;
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(sf_config(base));
        let rate_limiter = Arc::new(RateLimiterManager::new(Arc::new(
            syncd_network::InMemoryBucketBackend::new(),
        )));
        rate_limiter.register("sf", syncd_network::ProviderBudget { capacity: 0.0, refill_rate: 0.0 });
        let client = DispatchClient::new(registry, rate_limiter);

        let record = HashMap::from([("last_name".to_string(), FieldValue::from("B"))]);
        let op = Operation::new(OperationKind::Create, "sf", None, Some(record), 5, 0).unwrap();
        let err = client.dispatch(&op, 0).await.unwrap_err();
        assert!(matches!(err, DispatchError::RateLimited));
    }

    #[rstest]
    #[tokio::test]
    async fn test_missing_required_field_surfaces_transformation_error() {
        let base = spawn_create_echo().await;
        let registry = Arc::new(ProviderRegistry::new());
        registry.register(sf_config(base));
        let rate_limiter = Arc::new(RateLimiterManager::new(Arc::new(
            syncd_network::InMemoryBucketBackend::new(),
        )));
        rate_limiter.register("sf", syncd_network::ProviderBudget { capacity: 10.0, refill_rate: 10.0 });
        let client = DispatchClient::new(registry, rate_limiter);

        let record = HashMap::from([("first_name".to_string(), FieldValue::from("A"))]);
        let op = Operation::new(OperationKind::Create, "sf", None, Some(record), 5, 0).unwrap();
        let err = client.dispatch(&op, 0).await.unwrap_err();
        assert!(matches!(err, DispatchError::TransformationError(_)));
    }
}
