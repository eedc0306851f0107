//! Order records and the order status state machine.
//!
//! An order is proofed before it can be submitted, and a submitted order is final.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use crate::error::{QuoteError, Result};
use crate::pricing::parse_qty;

/// Most recent orders kept per account.
pub const MAX_ORDER_HISTORY: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Draft,
    Proofed,
    Submitted,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [
        OrderStatus::Draft,
        OrderStatus::Proofed,
        OrderStatus::Submitted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Draft => "draft",
            OrderStatus::Proofed => "proofed",
            OrderStatus::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|st| st.as_str() == lower)
    }

    /// Read a status string, defaulting to draft.
    ///
    /// An unrecognized non-empty status is a caller bug and is logged.
    pub fn normalize(s: &str) -> Self {
        if s.trim().is_empty() {
            return OrderStatus::Draft;
        }
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(status = s, "unrecognized order status, treating as draft");
            OrderStatus::Draft
        })
    }

    pub fn allowed_next(&self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Draft => &[OrderStatus::Proofed],
            OrderStatus::Proofed => &[OrderStatus::Submitted, OrderStatus::Draft],
            OrderStatus::Submitted => &[],
        }
    }

    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.allowed_next().is_empty()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a string-level transition request. Failures never change state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub ok: bool,
    pub from: OrderStatus,
    pub to: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// String-facing entry point for callers holding raw status values.
pub struct OrderStateMachine;

impl OrderStateMachine {
    pub fn states() -> &'static [OrderStatus] {
        &OrderStatus::ALL
    }

    pub fn normalize(status: &str) -> OrderStatus {
        OrderStatus::normalize(status)
    }

    pub fn can_transition(from: &str, to: &str) -> bool {
        Self::normalize(from).can_transition_to(Self::normalize(to))
    }

    pub fn transition(from: &str, to: &str) -> TransitionResult {
        let from = Self::normalize(from);
        let to = Self::normalize(to);
        if from.can_transition_to(to) {
            TransitionResult {
                ok: true,
                from,
                to,
                status: Some(to),
                error: None,
            }
        } else {
            TransitionResult {
                ok: false,
                from,
                to,
                status: None,
                error: Some(if from.is_terminal() {
                    format!("Invalid transition: {} -> {} ({} is final)", from, to, from)
                } else {
                    format!("Invalid transition: {} -> {}", from, to)
                }),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    #[default]
    Custom,
    Stock,
}

/// A persisted order, owned by one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub kind: OrderKind,
    pub title: String,
    pub qty: u64,
    pub total: Option<f64>,
    pub summary: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub config: Option<Value>,
}

/// Order submission payload. Field aliases match older clients.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub kind: Option<OrderKind>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "quantity")]
    pub qty: Option<Value>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default, alias = "detail")]
    pub summary: Option<String>,
    #[serde(default)]
    pub config: Option<Value>,
}

pub fn generate_order_id() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("ord-{}", &hex[..16])
}

impl Order {
    /// Create a draft order from a submission, stamped now.
    pub fn from_submission(submission: NewOrder) -> Self {
        Self::from_submission_at(submission, Utc::now())
    }

    pub fn from_submission_at(submission: NewOrder, created_at: DateTime<Utc>) -> Self {
        let qty = submission
            .qty
            .as_ref()
            .and_then(parse_qty)
            .filter(|q| *q > 0)
            .unwrap_or(0) as u64;
        Self {
            id: submission
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(generate_order_id),
            created_at,
            kind: submission.kind.unwrap_or_default(),
            title: submission
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Order".to_string()),
            qty,
            total: submission.total,
            summary: submission.summary.unwrap_or_default(),
            status: OrderStatus::Draft,
            config: submission.config,
        }
    }

    /// Move to `to`, leaving the order untouched when the move is illegal.
    pub fn advance(&mut self, to: OrderStatus) -> Result<()> {
        if !self.status.can_transition_to(to) {
            return Err(QuoteError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        tracing::debug!(order = %self.id, from = %self.status, to = %to, "order transition");
        self.status = to;
        Ok(())
    }
}

/// An account's orders, newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderHistory {
    #[serde(default)]
    orders: Vec<Order>,
}

impl OrderHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an order at the front, dropping the oldest past the cap.
    pub fn record(&mut self, order: Order) -> &Order {
        self.orders.insert(0, order);
        self.orders.truncate(MAX_ORDER_HISTORY);
        &self.orders[0]
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn get(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn advance(&mut self, id: &str, to: OrderStatus) -> Result<&Order> {
        let order = self
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| QuoteError::OrderNotFound(id.to_string()))?;
        order.advance(to)?;
        Ok(&*order)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Flattened audit line for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLogEntry {
    pub id: String,
    pub user_id: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub total: Option<f64>,
    pub qty: u64,
    pub kind: OrderKind,
}

impl OrderLogEntry {
    pub fn new(order: &Order, user_id: &str) -> Self {
        Self {
            id: order.id.clone(),
            user_id: user_id.to_string(),
            status: order.status,
            created_at: order.created_at,
            title: order.title.clone(),
            total: order.total,
            qty: order.qty,
            kind: order.kind,
        }
    }
}
