//! Use cases for the distribution backend.
//!
//! Each operation opens one [`UnitOfWork`](repository::UnitOfWork), runs
//! its reads and writes, and commits, or rolls back on the first failure.
//! Cache invalidations recorded by the writes are replayed after commit.

pub mod delivery_order;
pub mod error;
pub mod sales_order;
mod transaction;

pub use delivery_order::DeliveryOrderUseCase;
pub use error::{Result, UseCaseError};
pub use sales_order::SalesOrderUseCase;
