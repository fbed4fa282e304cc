// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake transport for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Transport, TransportError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded transport call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    Send(String),
    Query(String),
}

impl TransportCall {
    pub fn command(&self) -> &str {
        match self {
            TransportCall::Send(c) | TransportCall::Query(c) => c,
        }
    }
}

#[derive(Default)]
struct FakeTransportState {
    /// One-shot replies, consumed before sticky ones
    queued: HashMap<String, VecDeque<String>>,
    sticky: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Vec<TransportCall>,
}

/// Fake transport with scripted replies
#[derive(Clone, Default)]
pub struct FakeTransport {
    inner: Arc<Mutex<FakeTransportState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply to `command` with `reply` every time
    pub fn set_reply(&self, command: &str, reply: &str) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.sticky.insert(command.to_string(), reply.to_string());
    }

    /// Reply to the next `command` with `reply`, once
    pub fn push_reply(&self, command: &str, reply: &str) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state
            .queued
            .entry(command.to_string())
            .or_default()
            .push_back(reply.to_string());
    }

    /// Make every exchange with `command` time out
    pub fn fail(&self, command: &str) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.failing.insert(command.to_string());
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<TransportCall> {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .clone()
    }

    /// Commands written without expecting a reply
    pub fn sent(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                TransportCall::Send(cmd) => Some(cmd),
                TransportCall::Query(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, command: &str) -> Result<(), TransportError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(TransportCall::Send(command.to_string()));
        if state.failing.contains(command) {
            return Err(TransportError::Timeout {
                command: command.to_string(),
            });
        }
        Ok(())
    }

    async fn query(&self, command: &str) -> Result<String, TransportError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.calls.push(TransportCall::Query(command.to_string()));
        if state.failing.contains(command) {
            return Err(TransportError::Timeout {
                command: command.to_string(),
            });
        }
        if let Some(reply) = state.queued.get_mut(command).and_then(|q| q.pop_front()) {
            return Ok(reply);
        }
        state
            .sticky
            .get(command)
            .cloned()
            .ok_or_else(|| TransportError::NoResponse {
                command: command.to_string(),
            })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
