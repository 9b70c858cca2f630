pub mod delivery_orders;
pub mod health;
pub mod metrics;
pub mod sales_orders;
