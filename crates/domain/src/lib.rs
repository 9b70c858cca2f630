//! Domain layer for the distribution backend.
//!
//! This crate provides:
//! - Entity records for master data (agents, stores, brands, users,
//!   salesmen, warehouses) and orders (sales and delivery)
//! - Entity-specific lookups as extension traits on the generic repository
//! - The order-status catalog and its transition rules
//! - [`Repositories`], the bundle every use case and aggregator is built on

pub mod entities;
pub mod error;
pub mod lookups;
pub mod repositories;
pub mod status;

pub use entities::{
    Agent, Brand, DeliveryOrder, OrderStatus, OrderType, SalesOrder, Salesman, Store, User,
    Warehouse,
};
pub use error::DomainError;
pub use lookups::{
    DeliveryOrderLookups, OrderStatusLookups, SalesOrderLookups, SalesmanLookups, StoreLookups,
    WarehouseLookups,
};
pub use repositories::{
    AgentRepository, BrandRepository, DeliveryOrderRepository, OrderStatusRepository,
    Repositories, SalesOrderRepository, SalesmanRepository, StoreRepository, UserRepository,
    WarehouseRepository,
};
pub use status::{OrderStatusCatalog, seed_default_statuses};
