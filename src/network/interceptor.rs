// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Network that answers page traffic from mocks or passthrough

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::exchange::{CapturedRequest, CapturedResponse, InterceptedExchange};
use super::registry::AliasRegistry;
use super::rule::{InterceptSpec, RouteHandle, RulePrecedence};
use crate::error::Result;
use crate::http::{HttpClient, Request, Response};

/// Where requests go when no rule mocks them
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response>;
}

/// Every request the page makes flows through here
#[derive(Clone)]
pub struct Network {
    transport: Arc<dyn Transport>,
    registry: Arc<AliasRegistry>,
    precedence: RulePrecedence,
}

impl Network {
    pub fn new(
        transport: Arc<dyn Transport>,
        registry: Arc<AliasRegistry>,
        precedence: RulePrecedence,
    ) -> Self {
        Self {
            transport,
            registry,
            precedence,
        }
    }

    /// Network over a reqwest client with a fresh registry
    pub fn with_client(client: HttpClient) -> Self {
        Self::new(
            Arc::new(client),
            Arc::new(AliasRegistry::default()),
            RulePrecedence::default(),
        )
    }

    /// Validate and install an interception rule
    pub fn intercept(&self, spec: InterceptSpec) -> Result<RouteHandle> {
        let rule = spec.build()?;
        info!(
            rule_id = %rule.id,
            pattern = %rule.pattern,
            method = ?rule.method,
            alias = ?rule.alias,
            mocked = rule.mock.is_some(),
            "interception rule registered"
        );
        Ok(self.registry.add_rule(rule))
    }

    /// Execute a request, answering from the winning mock when there is one
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let start = Instant::now();
        let captured = CapturedRequest::from_request(&request);
        let url = request.url.clone();
        let rule_match = self
            .registry
            .claim(&request.method, url.as_str(), self.precedence);

        let result = match rule_match.responder {
            Some((rule_id, ref mock)) => {
                if let Some(delay) = mock.delay {
                    tokio::time::sleep(delay).await;
                }
                debug!(rule_id = %rule_id, url = %url, status = mock.status, "serving mock response");
                Ok(mock.to_response(&url))
            }
            None => self.transport.send(request).await,
        };

        let duration = start.elapsed();
        let sequence = self.registry.next_sequence();
        let mut exchange = InterceptedExchange {
            id: format!("exc_{}", sequence),
            sequence,
            alias: None,
            rule_id: None,
            request: captured,
            response: None,
            error: None,
            mocked: rule_match.responder.is_some(),
            captured_at: Utc::now(),
            duration,
        };

        let result = match result {
            Ok(mut response) => {
                response.response_time_ms = duration.as_millis() as u64;
                exchange.response = Some(CapturedResponse::from_response(&response));
                Ok(response)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "passthrough request failed");
                exchange.error = Some(e.to_string());
                Err(e)
            }
        };

        self.registry.record(exchange, &rule_match.aliases);
        result
    }

    /// GET through the network
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.execute(Request::get(url)?).await
    }

    /// POST through the network
    pub async fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<Response> {
        self.execute(Request::post(url)?.body(body)).await
    }

    pub fn registry(&self) -> &Arc<AliasRegistry> {
        &self.registry
    }

    pub fn precedence(&self) -> RulePrecedence {
        self.precedence
    }

    /// Every captured exchange, oldest first
    pub fn exchanges(&self) -> Vec<InterceptedExchange> {
        self.registry.history()
    }

    pub fn exchange_count(&self) -> usize {
        self.registry.history().len()
    }

    /// Drop rules and captured exchanges
    pub fn clear(&self) {
        self.registry.clear();
    }
}

impl std::fmt::Debug for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Network")
            .field("registry", &self.registry)
            .field("precedence", &self.precedence)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::test_support::FixedTransport;
    use crate::error::Error;
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    struct FailingTransport;

    #[async_trait]
    impl Transport for FailingTransport {
        async fn send(&self, _request: Request) -> Result<Response> {
            Err(Error::other("connection refused"))
        }
    }

    fn network(transport: Arc<dyn Transport>) -> Network {
        Network::new(transport, Arc::new(AliasRegistry::default()), RulePrecedence::default())
    }

    #[tokio::test]
    async fn test_mock_answers_instead_of_transport() {
        let transport = FixedTransport::new("real");
        let net = network(transport.clone());
        net.intercept(
            InterceptSpec::new("**/x")
                .method("POST")
                .response(json!({ "shelly": "go" }))
                .alias("postX"),
        )
        .unwrap();

        let response = net.post("https://api.test/x", "{}").await.unwrap();
        assert!(response.mocked);
        assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({ "shelly": "go" }));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);

        let exchange = net.registry().latest("postX").unwrap();
        assert!(exchange.mocked);
        assert_eq!(exchange.request.method, "POST");
        assert_eq!(exchange.status(), Some(200));
    }

    #[tokio::test]
    async fn test_unmocked_rule_passes_through_and_records() {
        let transport = FixedTransport::new("real");
        let net = network(transport.clone());
        net.intercept(InterceptSpec::new("**/watch*").alias("watched")).unwrap();

        let response = net.get("https://api.test/watch?id=3").await.unwrap();
        assert!(!response.mocked);
        assert_eq!(response.text().unwrap(), "real");
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);

        let exchange = net.registry().latest("watched").unwrap();
        assert!(!exchange.mocked);
        assert_eq!(exchange.request.query_param("id"), Some("3"));
        assert_eq!(exchange.response.unwrap().body.as_deref(), Some("real"));
    }

    #[tokio::test]
    async fn test_method_mismatch_not_intercepted() {
        let transport = FixedTransport::new("real");
        let net = network(transport.clone());
        net.intercept(InterceptSpec::new("**/x").method("POST").response(json!(1)).alias("x"))
            .unwrap();

        let response = net.get("https://api.test/x").await.unwrap();
        assert!(!response.mocked);
        assert_eq!(net.registry().count("x"), 0);
        assert_eq!(net.exchange_count(), 1);
    }

    #[tokio::test]
    async fn test_exchange_recorded_under_every_matching_alias() {
        let net = network(FixedTransport::new("real"));
        net.intercept(InterceptSpec::new("**/y").response(json!({ "n": 1 })).alias("first"))
            .unwrap();
        net.intercept(InterceptSpec::new("**/y").response(json!({ "n": 2 })).alias("second"))
            .unwrap();

        let response = net.get("https://api.test/y").await.unwrap();
        assert_eq!(response.json::<serde_json::Value>().unwrap(), json!({ "n": 2 }));

        let first = net.registry().latest("first").unwrap();
        let second = net.registry().latest("second").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.alias.as_deref(), Some("first"));
        assert_ne!(first.rule_id, second.rule_id);
    }

    #[tokio::test]
    async fn test_delay_defers_mock() {
        let net = network(FixedTransport::new("real"));
        net.intercept(
            InterceptSpec::new("**/slow")
                .response(json!(true))
                .delay(Duration::from_millis(40)),
        )
        .unwrap();

        let start = Instant::now();
        net.get("https://api.test/slow").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_transport_failure_recorded_and_returned() {
        let net = network(Arc::new(FailingTransport));
        net.intercept(InterceptSpec::new("**/down").alias("down")).unwrap();

        let err = net.get("https://api.test/down").await.unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        let exchange = net.registry().latest("down").unwrap();
        assert!(exchange.response.is_none());
        assert_eq!(exchange.error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_invalid_spec_installs_nothing() {
        let net = network(FixedTransport::new("real"));
        assert!(net.intercept(InterceptSpec::new("**/x").method("BREW")).is_err());
        assert_eq!(net.registry().rule_count(), 0);
    }
}
