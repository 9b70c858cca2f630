use common::{EntityId, Timestamps};
use repository::{Column, Entity, Invalidation};
use serde::{Deserialize, Serialize};

use super::DETAIL_NAMESPACES;

/// A distributor that owns salesmen, warehouses and orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    pub id: EntityId,
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone_number: String,
    pub main_mobile_phone: String,
    pub province_id: EntityId,
    pub city_id: EntityId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Agent {
    const NAME: &'static str = "agent";
    const TABLE: &'static str = "agents";
    const INVALIDATION: Invalidation = Invalidation::ExactKey;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("name", &self.name),
            Column::value("address", &self.address),
            Column::value("email", &self.email),
            Column::value("phone_number", &self.phone_number),
            Column::value("main_mobile_phone", &self.main_mobile_phone),
            Column::value("province_id", self.province_id),
            Column::value("city_id", self.city_id),
        ]
    }
}

/// A retail outlet that places sales orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Store {
    pub id: EntityId,
    pub store_code: String,
    pub name: String,
    pub owner_name: String,
    pub address: String,
    pub phone_number: String,
    pub province_id: EntityId,
    pub city_id: EntityId,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Store {
    const NAME: &'static str = "store";
    const TABLE: &'static str = "stores";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("store_code", &self.store_code),
            Column::value("name", &self.name),
            Column::value("owner_name", &self.owner_name),
            Column::value("address", &self.address),
            Column::value("phone_number", &self.phone_number),
            Column::value("province_id", self.province_id),
            Column::value("city_id", self.city_id),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Brand {
    pub id: EntityId,
    pub name: String,
    pub image_url: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Brand {
    const NAME: &'static str = "brand";
    const TABLE: &'static str = "brands";
    const INVALIDATION: Invalidation = Invalidation::ExactKey;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("name", &self.name),
            Column::value("image_url", &self.image_url),
        ]
    }
}

/// A back-office user who creates and approves orders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: EntityId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for User {
    const NAME: &'static str = "user";
    const TABLE: &'static str = "users";
    const INVALIDATION: Invalidation = Invalidation::ExactKey;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("first_name", &self.first_name),
            Column::value("last_name", &self.last_name),
            Column::value("email", &self.email),
            Column::value("phone", &self.phone),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Salesman {
    pub id: EntityId,
    pub agent_id: EntityId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Salesman {
    const NAME: &'static str = "salesman";
    const TABLE: &'static str = "salesmans";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("agent_id", self.agent_id),
            Column::value("name", &self.name),
            Column::value("email", &self.email),
            Column::value("phone_number", &self.phone_number),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Warehouse {
    pub id: EntityId,
    pub agent_id: EntityId,
    pub code: String,
    pub name: String,
    pub address: String,
    /// The agent's default shipping warehouse.
    pub is_main: bool,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Warehouse {
    const NAME: &'static str = "warehouse";
    const TABLE: &'static str = "warehouses";
    const INVALIDATION: Invalidation = Invalidation::Namespace;
    const DEPENDENT_NAMESPACES: &'static [&'static str] = DETAIL_NAMESPACES;

    record_accessors!();

    fn columns(&self) -> Vec<Column> {
        vec![
            Column::value("agent_id", self.agent_id),
            Column::value("code", &self.code),
            Column::value("name", &self.name),
            Column::value("address", &self.address),
            Column::value("is_main", self.is_main),
        ]
    }
}

#[cfg(test)]
mod tests {
    use repository::SparseWrite;

    use super::*;

    #[test]
    fn store_write_skips_blank_fields() {
        let store = Store {
            store_code: "ST-01".to_string(),
            name: "Toko Maju".to_string(),
            ..Default::default()
        };

        let write = SparseWrite::new(Store::TABLE, store.columns());
        assert_eq!(write.columns(), vec!["store_code", "name"]);
    }

    #[test]
    fn warehouse_main_flag_is_written_only_when_set() {
        let mut warehouse = Warehouse {
            agent_id: EntityId::new(1),
            ..Default::default()
        };
        assert!(!SparseWrite::new(Warehouse::TABLE, warehouse.columns()).contains("is_main"));

        warehouse.is_main = true;
        assert!(SparseWrite::new(Warehouse::TABLE, warehouse.columns()).contains("is_main"));
    }

    #[test]
    fn rows_decode_with_missing_columns() {
        let agent: Agent = serde_json::from_value(serde_json::json!({
            "id": 3,
            "name": "Agen Jaya",
            "created_at": "2024-05-01T08:00:00Z",
            "deleted_at": null
        }))
        .unwrap();

        assert_eq!(agent.id, EntityId::new(3));
        assert_eq!(agent.email, "");
        assert!(agent.timestamps.created_at.is_some());
        assert!(!agent.timestamps.is_deleted());
    }
}
