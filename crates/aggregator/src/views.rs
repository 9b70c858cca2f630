//! Composite read views.

use domain::{Agent, Brand, DeliveryOrder, OrderStatus, SalesOrder, Salesman, Store, User, Warehouse};
use serde::{Deserialize, Serialize};

/// A sales order with every record it references.
///
/// A relation is None when the order's foreign key is zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrderDetail {
    pub sales_order: SalesOrder,
    pub status: Option<OrderStatus>,
    pub agent: Option<Agent>,
    pub store: Option<Store>,
    pub brand: Option<Brand>,
    pub user: Option<User>,
    pub salesman: Option<Salesman>,
    pub warehouse: Option<Warehouse>,
}

impl SalesOrderDetail {
    pub const NAMESPACE: &'static str = "sales_order_detail";

    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.name.as_str())
    }
}

/// A delivery order with its sales order and the records it references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOrderDetail {
    pub delivery_order: DeliveryOrder,
    pub status: Option<OrderStatus>,
    pub sales_order: Option<SalesOrder>,
    pub agent: Option<Agent>,
    pub store: Option<Store>,
    pub warehouse: Option<Warehouse>,
}

impl DeliveryOrderDetail {
    pub const NAMESPACE: &'static str = "delivery_order_detail";

    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.name.as_str())
    }
}
