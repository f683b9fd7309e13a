// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Transports for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

use super::Transport;
use crate::error::Result;
use crate::http::{Request, Response};

/// Answers every request with a fixed plain-text body
pub(crate) struct FixedTransport {
    pub body: &'static str,
    pub calls: AtomicUsize,
}

impl FixedTransport {
    pub(crate) fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Transport for FixedTransport {
    async fn send(&self, request: Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Response::new(
            StatusCode::OK,
            HeaderMap::new(),
            Bytes::from(self.body),
            request.url,
        ))
    }
}
