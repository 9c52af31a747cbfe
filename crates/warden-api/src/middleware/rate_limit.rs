// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Per-client fixed window rate limiting.
//!
//! Clients are keyed by socket peer address. Forwarding headers are never
//! consulted, since any caller can set them.

use std::future::Future;
use std::net::{IpAddr, Ipv4Addr};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tower::{Layer, Service};

use crate::config::duration_secs;
use crate::error::ApiError;
use crate::extractors::peer_ip;

/// Bucket shared by requests whose client address cannot be determined.
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

// =============================================================================
// RateLimitConfig
// =============================================================================

/// Configuration for rate limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Whether rate limiting is enabled.
    pub enabled: bool,
    /// Limit for login attempts.
    pub login: WindowRule,
    /// Limit for every request.
    pub global: WindowRule,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login: WindowRule::new(10, Duration::from_secs(60)),
            global: WindowRule::new(60, Duration::from_secs(60)),
        }
    }
}

impl RateLimitConfig {
    /// Creates a disabled configuration.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Default::default()
        }
    }

    /// Returns the login rule, or `None` if limiting is disabled.
    pub fn login_rule(&self) -> Option<WindowRule> {
        self.enabled.then_some(self.login)
    }

    /// Returns the global rule, or `None` if limiting is disabled.
    pub fn global_rule(&self) -> Option<WindowRule> {
        self.enabled.then_some(self.global)
    }
}

/// Allows `permits` requests per client per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRule {
    /// Requests allowed in one window.
    pub permits: u32,
    /// Window length.
    #[serde(with = "duration_secs")]
    pub window: Duration,
}

impl WindowRule {
    /// Creates a rule.
    pub fn new(permits: u32, window: Duration) -> Self {
        Self { permits, window }
    }
}

// =============================================================================
// Fixed Window
// =============================================================================

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, count: 0 }
    }

    fn is_over(&self, window: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= window
    }

    fn retry_after(&self, window: Duration, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        let remaining = window.saturating_sub(elapsed);
        // Round up so clients never retry early.
        let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
        secs.max(1)
    }
}

// =============================================================================
// Rate Limiter State
// =============================================================================

/// Shared state for one rate limit rule.
#[derive(Debug)]
pub struct RateLimiterState {
    rule: WindowRule,
    windows: DashMap<IpAddr, Window>,
    last_cleanup: Mutex<Instant>,
}

impl RateLimiterState {
    /// Creates limiter state for `rule`.
    pub fn new(rule: WindowRule) -> Self {
        Self {
            rule,
            windows: DashMap::new(),
            last_cleanup: Mutex::new(Instant::now()),
        }
    }

    /// Records a request from `client` and decides whether it may proceed.
    pub fn check(&self, client: Option<IpAddr>) -> RateLimitResult {
        self.check_at(client, Instant::now())
    }

    /// Like [`check`](Self::check) at an explicit instant.
    pub fn check_at(&self, client: Option<IpAddr>, now: Instant) -> RateLimitResult {
        self.maybe_cleanup(now);

        let ip = client.unwrap_or(UNKNOWN_CLIENT);
        let mut entry = self.windows.entry(ip).or_insert_with(|| Window::new(now));
        let window = entry.value_mut();

        if window.is_over(self.rule.window, now) {
            *window = Window::new(now);
        }

        if window.count < self.rule.permits {
            window.count += 1;
            RateLimitResult::Allowed
        } else {
            RateLimitResult::Limited {
                retry_after: window.retry_after(self.rule.window, now),
            }
        }
    }

    /// Drops windows that have ended. Returns how many were removed.
    pub fn cleanup(&self, now: Instant) -> usize {
        let before = self.windows.len();
        let window = self.rule.window;
        self.windows.retain(|_, w| !w.is_over(window, now));
        before.saturating_sub(self.windows.len())
    }

    /// Number of tracked clients.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Returns the rule this state enforces.
    pub fn rule(&self) -> WindowRule {
        self.rule
    }

    fn maybe_cleanup(&self, now: Instant) {
        let due = {
            let mut last = self.last_cleanup.lock();
            if now.saturating_duration_since(*last) >= self.rule.window {
                *last = now;
                true
            } else {
                false
            }
        };
        if due {
            let removed = self.cleanup(now);
            if removed > 0 {
                tracing::trace!(removed, "Rate limit windows reclaimed");
            }
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed,
    /// Request is rate limited.
    Limited {
        /// Seconds until the client's window resets.
        retry_after: u64,
    },
}

// =============================================================================
// RateLimitLayer
// =============================================================================

/// Layer enforcing one [`WindowRule`] per client address.
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Option<Arc<RateLimiterState>>,
}

impl RateLimitLayer {
    /// Creates a layer enforcing `rule`.
    pub fn new(rule: WindowRule) -> Self {
        Self {
            state: Some(Arc::new(RateLimiterState::new(rule))),
        }
    }

    /// Creates a layer from an optional rule; `None` disables limiting.
    pub fn from_rule(rule: Option<WindowRule>) -> Self {
        rule.map(Self::new).unwrap_or_else(Self::disabled)
    }

    /// Creates a pass-through layer.
    pub fn disabled() -> Self {
        Self { state: None }
    }

    /// Returns the shared state, if enabled.
    pub fn state(&self) -> Option<Arc<RateLimiterState>> {
        self.state.clone()
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitMiddleware {
            inner,
            state: self.state.clone(),
        }
    }
}

// =============================================================================
// RateLimitMiddleware
// =============================================================================

/// Middleware for rate limiting.
#[derive(Clone)]
pub struct RateLimitMiddleware<S> {
    inner: S,
    state: Option<Arc<RateLimiterState>>,
}

impl<S> Service<Request<Body>> for RateLimitMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let Some(state) = state else {
                return inner.call(req).await;
            };

            let client = peer_ip(req.extensions());

            match state.check(client) {
                RateLimitResult::Allowed => inner.call(req).await,
                RateLimitResult::Limited { retry_after } => {
                    tracing::warn!(
                        client_ip = ?client,
                        path = %req.uri().path(),
                        permits = state.rule().permits,
                        retry_after,
                        "Rate limit exceeded"
                    );
                    Ok(ApiError::rate_limit_exceeded(Some(retry_after)).into_response())
                }
            }
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
