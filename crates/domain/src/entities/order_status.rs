//! Workflow statuses shared by sales and delivery orders.

use common::{EntityId, Timestamps};
use repository::{Column, Entity, Invalidation};
use serde::{Deserialize, Serialize};

use super::DETAIL_NAMESPACES;

/// The workflow an order status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    SalesOrder,
    DeliveryOrder,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::SalesOrder => "sales_order",
            OrderType::DeliveryOrder => "delivery_order",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the status lookup table.
///
/// Statuses of a workflow are ordered by `sequence`; an order may move to
/// a status of equal or higher sequence in the same workflow. Terminal
/// statuses admit no transition other than to themselves.
///
/// ```text
/// sequence        0      1         2            3
/// sales_order     open   partial   closed       cancelled*, rejected*
/// delivery_order  open   shipped   delivered*   cancelled*
/// ```
///
/// (`*` terminal)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderStatus {
    pub id: EntityId,
    pub order_type: String,
    pub name: String,
    pub sequence: i64,
    pub terminal: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl OrderStatus {
    pub const OPEN: &'static str = "open";
    pub const PARTIAL: &'static str = "partial";
    pub const CLOSED: &'static str = "closed";
    pub const CANCELLED: &'static str = "cancelled";
    pub const REJECTED: &'static str = "rejected";
    pub const SHIPPED: &'static str = "shipped";
    pub const DELIVERED: &'static str = "delivered";

    /// The statuses seeded for every deployment: `(type, name, sequence, terminal)`.
    pub const DEFAULTS: &'static [(OrderType, &'static str, i64, bool)] = &[
        (OrderType::SalesOrder, Self::OPEN, 0, false),
        (OrderType::SalesOrder, Self::PARTIAL, 1, false),
        (OrderType::SalesOrder, Self::CLOSED, 2, false),
        (OrderType::SalesOrder, Self::CANCELLED, 3, true),
        (OrderType::SalesOrder, Self::REJECTED, 3, true),
        (OrderType::DeliveryOrder, Self::OPEN, 0, false),
        (OrderType::DeliveryOrder, Self::SHIPPED, 1, false),
        (OrderType::DeliveryOrder, Self::DELIVERED, 2, true),
        (OrderType::DeliveryOrder, Self::CANCELLED, 3, true),
    ];

    pub fn new(order_type: OrderType, name: &str, sequence: i64, terminal: bool) -> Self {
        Self {
            order_type: order_type.as_str().to_string(),
            name: name.to_string(),
            sequence,
            terminal,
            ..Default::default()
        }
    }

    /// Returns true if an order in this status may move to `next`.
    pub fn permits(&self, next: &OrderStatus) -> bool {
        if self.order_type != next.order_type {
            return false;
        }
        if self.terminal {
            return self.id == next.id;
        }
        next.sequence >= self.sequence
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }
}

impl Entity for OrderStatus {
    const NAME: &'static str = "order_status";
    const TABLE: &'static str = "order_statuses";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("order_type", &self.order_type),
            Column::value("name", &self.name),
            Column::value("sequence", self.sequence),
            Column::value("terminal", self.terminal),
        ]
    }
}
