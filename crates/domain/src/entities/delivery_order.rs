use cache::CacheKey;
use common::{EntityId, Timestamps};
use repository::{Column, Entity, Invalidation, JourneyNote};
use serde::{Deserialize, Serialize};

/// A shipment fulfilling (part of) a sales order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryOrder {
    pub id: EntityId,
    pub sales_order_id: EntityId,
    pub agent_id: EntityId,
    pub store_id: EntityId,
    pub warehouse_id: EntityId,
    pub order_status_id: EntityId,
    pub do_code: String,
    pub do_date: String,
    pub do_ref_code: String,
    pub note: String,
    pub driver_name: String,
    pub plate_number: String,
    pub created_by: EntityId,
    pub latest_updated_by: EntityId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
    #[serde(skip)]
    pub journey: JourneyNote,
}

impl Entity for DeliveryOrder {
    const NAME: &'static str = "delivery_order";
    const TABLE: &'static str = "delivery_orders";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    const STATUS_COLUMN: Option<&'static str> = Some("order_status_id");
    const TERMINAL_STATUS: Option<&'static str> = Some("cancelled");

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("sales_order_id", self.sales_order_id),
            Column::value("agent_id", self.agent_id),
            Column::value("store_id", self.store_id),
            Column::value("warehouse_id", self.warehouse_id),
            Column::value("order_status_id", self.order_status_id),
            Column::value("do_code", &self.do_code),
            Column::value("do_date", &self.do_date),
            Column::value("do_ref_code", &self.do_ref_code),
            Column::value("note", &self.note),
            Column::value("driver_name", &self.driver_name),
            Column::value("plate_number", &self.plate_number),
            Column::value("created_by", self.created_by),
            Column::value("latest_updated_by", self.latest_updated_by),
        ]
    }

    fn dependent_keys(id: EntityId) -> Vec<CacheKey> {
        vec![CacheKey::by_id("delivery_order_detail", id)]
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
