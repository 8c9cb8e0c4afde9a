use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bom_lines")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub bom_line_id: i64,
    pub bom_id: i64,
    pub component_item_id: i64,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_per_unit: Decimal,
    /// Expected waste fraction; requirements scale by (1 + scrap_factor).
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub scrap_factor: Decimal,
    /// production | shipping
    pub consume_stage: String,
    /// Costing-only lines never touch inventory.
    pub is_cost_only: bool,
    pub uom_code: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bom_header::Entity",
        from = "Column::BomId",
        to = "super::bom_header::Column::BomId"
    )]
    BomHeader,
    #[sea_orm(
        belongs_to = "super::item_master::Entity",
        from = "Column::ComponentItemId",
        to = "super::item_master::Column::ItemId"
    )]
    ComponentItem,
}

impl Related<super::bom_header::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BomHeader.def()
    }
}

impl Related<super::item_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ComponentItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
