// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions

use std::collections::BTreeSet;

use axum::http::StatusCode;
use serde_json::Value;

use super::harness::TestResponse;

// =============================================================================
// Response Assertions
// =============================================================================

/// Assertion extensions for [`TestResponse`].
pub trait ResponseAssertions {
    /// Assert the status code.
    fn assert_status(&self, expected: StatusCode) -> &Self;

    /// Assert an error body: status, public code and message.
    fn assert_error(&self, status: StatusCode, code: &str, message: &str) -> &Self;

    /// Assert the `message` field.
    fn assert_message(&self, expected: &str) -> &Self;
}

impl ResponseAssertions for TestResponse {
    fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status, expected,
            "Expected status {}, got {} with body {}",
            expected, self.status, self.body
        );
        self
    }

    fn assert_error(&self, status: StatusCode, code: &str, message: &str) -> &Self {
        self.assert_status(status);
        assert_eq!(self.code(), code, "Unexpected error code in {}", self.body);
        self.assert_message(message)
    }

    fn assert_message(&self, expected: &str) -> &Self {
        assert_eq!(
            self.message(),
            expected,
            "Unexpected message in {}",
            self.body
        );
        self
    }
}

// =============================================================================
// Name Set Assertions
// =============================================================================

/// Assert that a JSON array holds exactly `expected`, ignoring order.
pub fn assert_names(actual: &Value, expected: &[&str]) {
    let actual: BTreeSet<&str> = actual
        .as_array()
        .unwrap_or_else(|| panic!("Expected a JSON array, got {}", actual))
        .iter()
        .map(|v| v.as_str().expect("Expected string names"))
        .collect();
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    assert_eq!(actual, expected);
}
