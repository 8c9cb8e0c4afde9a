use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Authoritative raw-material (filament) stock, tracked at material type +
/// color granularity. The generic `inventory_balances` row for a raw material
/// is a replica of this table and is overwritten to match, never the reverse.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "material_inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub material_inventory_id: i64,
    pub material_type: String,
    pub color: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_kg: Decimal,
    pub in_stock: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
