use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog record for every stockable or sellable item. Capability flags
/// (`is_raw_material`, `track_lots`, `track_serials`, `requires_qc`) drive
/// consumption behavior instead of per-type branching in the services.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub item_id: i64,
    pub item_number: String,
    pub description: Option<String>,
    /// finished_good | component | supply | service
    pub item_type: String,
    /// make | buy
    pub procurement_type: String,
    pub is_raw_material: bool,
    pub track_lots: bool,
    pub track_serials: bool,
    pub requires_qc: bool,
    /// Set for raw materials; keyed against `material_inventory`.
    pub material_type: Option<String>,
    pub color: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bom_header::Entity")]
    BomHeaders,
    #[sea_orm(has_many = "super::inventory_balance::Entity")]
    InventoryBalances,
}

impl Related<super::bom_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomHeaders.def()
    }
}

impl Related<super::inventory_balance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryBalances.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
