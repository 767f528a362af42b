//! Order service: the operations exposed to the HTTP layer

use crate::core::error::{OrderError, ToroResult};
use crate::core::order::{Order, OrderDraft};
use crate::core::query::{OrderFilter, OrderListResponse};
use crate::core::store::OrderStore;
use crate::core::validation::validate_order_payload;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Create, get, list and delete orders
///
/// The service owns validation, timestamping and the retry policy for
/// contended inserts. Numbering itself is delegated to the store, which
/// runs it in the same transaction as the insert.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    clock: Arc<dyn Clock>,
    max_create_attempts: u32,
}

impl OrderService {
    pub const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 5;

    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            max_create_attempts: Self::DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Clamped to at least one attempt
    pub fn with_max_create_attempts(mut self, attempts: u32) -> Self {
        self.max_create_attempts = attempts.max(1);
        self
    }

    pub fn store(&self) -> &Arc<dyn OrderStore> {
        &self.store
    }

    /// Validate a payload and persist it as a new order in `created` state.
    ///
    /// Nothing is written when validation fails. Lock contention is retried
    /// with a linear back-off; once `max_create_attempts` is spent the
    /// caller gets `OrderError::AllocationExhausted`.
    pub async fn create(&self, payload: &Value) -> ToroResult<Order> {
        let content = validate_order_payload(payload).inspect_err(|e| {
            tracing::warn!(violations = e.violations.len(), error = %e, "order rejected");
        })?;
        let created_at = self.clock.now().trunc_subsecs(6);

        let mut attempt = 1;
        loop {
            let draft = OrderDraft::new(content.clone(), created_at);
            match self.store.insert(draft).await {
                Ok(order) => {
                    tracing::info!(
                        id = order.id,
                        order_number = %order.order_number,
                        priority = %order.priority,
                        "order created"
                    );
                    return Ok(order);
                }
                Err(e) if e.is_transient() && attempt < self.max_create_attempts => {
                    tracing::warn!(attempt, error = %e, "order insert contended, retrying");
                    tokio::time::sleep(Duration::from_millis(10 * u64::from(attempt))).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    tracing::error!(attempts = attempt, error = %e, "order number allocation exhausted");
                    return Err(OrderError::AllocationExhausted { attempts: attempt }.into());
                }
                Err(e) => {
                    tracing::error!(backend = self.store.backend(), error = %e, "order insert failed");
                    return Err(e);
                }
            }
        }
    }

    pub async fn get(&self, id: i64) -> ToroResult<Order> {
        self.store.get(id).await
    }

    /// List orders matching raw query parameters.
    ///
    /// Invalid or unknown parameters fail with a validation error before
    /// the store is queried.
    pub async fn list(&self, params: &[(String, String)]) -> ToroResult<OrderListResponse> {
        let filter = OrderFilter::from_query(params).inspect_err(|e| {
            tracing::warn!(error = %e, "list filter rejected");
        })?;
        self.list_filtered(&filter).await
    }

    pub async fn list_filtered(&self, filter: &OrderFilter) -> ToroResult<OrderListResponse> {
        let orders = self.store.list(filter).await?;
        Ok(OrderListResponse::new(orders))
    }

    pub async fn delete(&self, id: i64) -> ToroResult<()> {
        self.store.delete(id).await?;
        tracing::info!(id, "order deleted");
        Ok(())
    }
}
