//! In-memory implementation of OrderStore for testing and development

use crate::core::error::{OrderError, ToroResult};
use crate::core::order::{Order, OrderDraft};
use crate::core::order_number::{OrderNumber, OrderNumberGenerator};
use crate::core::query::OrderFilter;
use crate::core::store::OrderStore;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    orders: BTreeMap<i64, Order>,
    last_id: i64,
    sequences: HashMap<i32, u32>,
    /// Every number ever issued, including deleted orders. Guards the
    /// uniqueness of `order_number` the way the SQL UNIQUE constraint does.
    issued: HashSet<OrderNumber>,
}

/// In-memory order store
///
/// Useful for testing and development. One async mutex guards the whole
/// state, so numbering and the insert form a single critical section.
/// Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryOrderStore {
    /// Create an empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, draft: OrderDraft) -> ToroResult<Order> {
        let mut state = self.state.lock().await;
        let State {
            orders,
            last_id,
            sequences,
            issued,
        } = &mut *state;

        let order_number = OrderNumberGenerator::next(sequences, draft.year()).await?;
        if !issued.insert(order_number) {
            return Err(OrderError::NumberConflict {
                order_number: order_number.to_string(),
            }
            .into());
        }

        *last_id += 1;
        let order = draft.into_order(*last_id, order_number);
        orders.insert(order.id, order.clone());

        Ok(order)
    }

    async fn get(&self, id: i64) -> ToroResult<Order> {
        let state = self.state.lock().await;
        state
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| OrderError::NotFound { id }.into())
    }

    async fn list(&self, filter: &OrderFilter) -> ToroResult<Vec<Order>> {
        let state = self.state.lock().await;
        Ok(state
            .orders
            .values()
            .filter(|order| filter.matches(order))
            .cloned()
            .collect())
    }

    async fn delete(&self, id: i64) -> ToroResult<()> {
        let mut state = self.state.lock().await;
        state
            .orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| OrderError::NotFound { id }.into())
    }

    async fn count(&self) -> ToroResult<u64> {
        let state = self.state.lock().await;
        Ok(state.orders.len() as u64)
    }
}
