//! Entity records, one per table.

/// Implements the identity and timestamp accessors of [`repository::Entity`]
/// for a record with `id` and `timestamps` fields.
macro_rules! record_accessors {
    () => {
        fn id(&self) -> common::EntityId {
            self.id
        }

        fn set_id(&mut self, id: common::EntityId) {
            self.id = id;
        }

        fn timestamps_mut(&mut self) -> &mut common::Timestamps {
            &mut self.timestamps
        }
    };
}

mod delivery_order;
mod master;
mod order_status;
mod sales_order;

pub use delivery_order::DeliveryOrder;
pub use master::{Agent, Brand, Salesman, Store, User, Warehouse};
pub use order_status::{OrderStatus, OrderType};
pub use sales_order::SalesOrder;

/// Composite views that embed master data.
pub(crate) const DETAIL_NAMESPACES: &[&str] = &["sales_order_detail", "delivery_order_detail"];
