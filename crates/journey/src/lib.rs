pub mod error;
pub mod event;
pub mod log;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod status;

pub use common::EntityId;
pub use error::{JourneyError, Result};
pub use event::{JourneyEvent, JourneyEventBuilder, JourneyEventId};
pub use log::{JourneyLog, JourneyLogExt};
pub use memory::InMemoryJourneyLog;
pub use postgres::PostgresJourneyLog;
pub use query::JourneyQuery;
pub use status::{ResolvedStatus, StaticStatusResolver, StatusResolver};
