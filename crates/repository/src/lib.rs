//! Data-access substrate for the distribution backend.
//!
//! - [`EntityRepository`]: cache-aside reads (`GET`, then `COUNT`, then
//!   `SELECT`, then `SET`) and sparse writes with cache invalidation and
//!   journaled status changes
//! - [`RelationalStore`]: transactional storage, backed by PostgreSQL
//!   ([`PgRelationalStore`]) or memory ([`InMemoryRelationalStore`])
//! - [`UnitOfWork`]: one transaction spanning several repository writes
//! - [`SparseWrite`]: the column set of one insert or update

pub mod entity;
pub mod envelope;
pub mod error;
pub mod invalidation;
pub mod memory;
pub mod postgres;
pub mod relational;
pub mod repository;
pub mod sparse;
pub mod unit_of_work;

#[doc(hidden)]
pub use common as __common;

pub use common::{EntityId, ErrorKind, ErrorLog, Timestamps};
pub use entity::{Entity, Invalidation, JourneyNote};
pub use envelope::Envelope;
pub use error::{RepositoryError, Result, StoreError, StoreResult};
pub use invalidation::InvalidationPlan;
pub use memory::{InMemoryRelationalStore, InMemoryTx};
pub use postgres::PgRelationalStore;
pub use relational::{Filter, RelationalStore};
pub use repository::{EntityRepository, Journal, Lookup};
pub use sparse::{Column, ColumnValue, SparseWrite};
pub use unit_of_work::UnitOfWork;
