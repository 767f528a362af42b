//! Shared test harness for storage backend testing
//!
//! Provides payload builders, fixed clocks and drafts for exercising any
//! `OrderStore`, plus the `order_store_tests!` and `rest_integration_tests!`
//! macros that run the same behavioural suite against every backend.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! order_store_tests!(InMemoryOrderStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod order_store_tests;

#[macro_use]
pub mod integration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use toro::core::order::{NewOrder, OrderDraft, Priority};
use toro::core::service::FixedClock;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// The canonical valid create payload
pub fn sample_payload() -> Value {
    json!({
        "equipment_type": "Станок ЧПУ",
        "equipment_id": "CNC-001",
        "issue_description": "Не включается шпиндель, на панели ошибка E-17",
        "priority": "high",
        "requester_name": "Иванов И.И.",
        "department": "Цех №1",
        "contact_phone": "+7-900-123-45-67",
        "contact_email": "ivanov@example.com"
    })
}

/// `sample_payload` with some keys replaced
pub fn payload_with(overrides: Value) -> Value {
    let mut payload = sample_payload();
    if let (Some(target), Some(source)) = (payload.as_object_mut(), overrides.as_object()) {
        for (key, value) in source {
            target.insert(key.clone(), value.clone());
        }
    }
    payload
}

/// `sample_payload` with one key removed
pub fn payload_without(field: &str) -> Value {
    let mut payload = sample_payload();
    if let Some(body) = payload.as_object_mut() {
        body.remove(field);
    }
    payload
}

// ---------------------------------------------------------------------------
// Clocks and drafts
// ---------------------------------------------------------------------------

/// Noon on March 1st of `year`
pub fn instant_in(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 3, 1, 12, 0, 0).unwrap()
}

pub fn clock_in(year: i32) -> FixedClock {
    FixedClock::at(instant_in(year))
}

/// A ready-to-insert draft dated in `year`
pub fn sample_draft(year: i32, priority: Priority, department: &str) -> OrderDraft {
    let content = NewOrder {
        equipment_type: "Станок ЧПУ".to_string(),
        equipment_id: "CNC-001".to_string(),
        issue_description: "Не включается шпиндель".to_string(),
        priority,
        requester_name: "Иванов И.И.".to_string(),
        department: department.to_string(),
        contact_phone: "+7-900-123-45-67".to_string(),
        contact_email: "ivanov@example.com".to_string(),
    };
    OrderDraft::new(content, instant_in(year))
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Assert every order number in `numbers` is distinct
pub fn assert_unique(numbers: &[String]) {
    let mut seen = std::collections::HashSet::new();
    for number in numbers {
        assert!(seen.insert(number), "order number {number} issued twice");
    }
}
