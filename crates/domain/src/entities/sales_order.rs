use cache::CacheKey;
use common::{EntityId, Timestamps};
use repository::{Column, Entity, Invalidation, JourneyNote};
use serde::{Deserialize, Serialize};

/// An order placed by a store with an agent.
///
/// Status-bearing: every write that sets `order_status_id` is journaled,
/// with `journey` supplying the remark and reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesOrder {
    pub id: EntityId,
    pub agent_id: EntityId,
    pub store_id: EntityId,
    pub brand_id: EntityId,
    pub user_id: EntityId,
    pub salesman_id: EntityId,
    pub warehouse_id: EntityId,
    pub order_status_id: EntityId,
    pub so_code: String,
    pub so_date: String,
    pub so_ref_code: String,
    pub note: String,
    pub internal_comment: String,
    pub total_amount: f64,
    pub total_tonase: f64,
    pub created_by: EntityId,
    pub latest_updated_by: EntityId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    #[serde(skip)]
    pub journey: JourneyNote,
}

impl Entity for SalesOrder {
    const NAME: &'static str = "sales_order";
    const TABLE: &'static str = "sales_orders";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    // Delivery views embed their sales order.
    const DEPENDENT_NAMESPACES: &'static [&'static str] = &["delivery_order_detail"];
    const STATUS_COLUMN: Option<&'static str> = Some("order_status_id");
    const TERMINAL_STATUS: Option<&'static str> = Some("cancelled");

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("agent_id", self.agent_id),
            Column::value("store_id", self.store_id),
            Column::value("brand_id", self.brand_id),
            Column::value("user_id", self.user_id),
            Column::value("salesman_id", self.salesman_id),
            Column::value("warehouse_id", self.warehouse_id),
            Column::value("order_status_id", self.order_status_id),
            Column::value("so_code", &self.so_code),
            Column::value("so_date", &self.so_date),
            Column::value("so_ref_code", &self.so_ref_code),
            Column::value("note", &self.note),
            Column::value("internal_comment", &self.internal_comment),
            Column::value("total_amount", self.total_amount),
            Column::value("total_tonase", self.total_tonase),
            Column::value("created_by", self.created_by),
            Column::value("latest_updated_by", self.latest_updated_by),
        ]
    }

    fn dependent_keys(id: EntityId) -> Vec<CacheKey> {
        vec![CacheKey::by_id("sales_order_detail", id)]
    }

    fn status_id(&self) -> Option<EntityId> {
        (!self.order_status_id.is_zero()).then_some(self.order_status_id)
    }

    fn set_status_id(&mut self, status_id: EntityId) {
        self.order_status_id = status_id;
    }

    fn journey_note(&self) -> JourneyNote {
        self.journey.clone()
    }
}
