//! Composite order views for the distribution backend.
//!
//! - [`OrderAggregator`]: reads a root order, fans its foreign-key lookups
//!   out to spawned tasks and joins them in a fixed order
//! - [`Pending`]: task handle that aborts its task when dropped
//! - [`SalesOrderDetail`] and [`DeliveryOrderDetail`]: the assembled views,
//!   cached under `sales_order_detail:<id>` and `delivery_order_detail:<id>`

pub mod aggregator;
pub mod error;
pub mod task;
pub mod views;

pub use aggregator::OrderAggregator;
pub use error::{AggregateError, Result};
pub use task::Pending;
pub use views::{DeliveryOrderDetail, SalesOrderDetail};
