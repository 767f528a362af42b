//! HTTP handlers for the order resource

use crate::core::error::{RequestError, ToroError};
use crate::core::order::Order;
use crate::core::query::OrderListResponse;
use crate::core::service::OrderService;
use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde_json::Value;

/// State shared by every order handler
#[derive(Clone)]
pub struct AppState {
    pub service: OrderService,
}

fn parse_id(raw: &str) -> Result<i64, ToroError> {
    raw.parse::<i64>().map_err(|_| {
        RequestError::InvalidId {
            value: raw.to_string(),
        }
        .into()
    })
}

/// POST /api/v1/orders
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), ToroError> {
    let Json(payload) = payload.map_err(|e| RequestError::InvalidBody {
        message: e.body_text(),
    })?;
    let order = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/v1/orders
pub async fn list_orders(
    State(state): State<AppState>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<OrderListResponse>, ToroError> {
    let Query(params) = params.map_err(|e| RequestError::InvalidQuery {
        message: e.body_text(),
    })?;
    let response = state.service.list(&params).await?;
    Ok(Json(response))
}

/// GET /api/v1/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ToroError> {
    let id = parse_id(&id)?;
    let order = state.service.get(id).await?;
    Ok(Json(order))
}

/// DELETE /api/v1/orders/{id}
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ToroError> {
    let id = parse_id(&id)?;
    state.service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
