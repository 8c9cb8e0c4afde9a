use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Machine-time cost entries, recorded at completion and kept separate from
/// the material ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_costs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub cost_id: i64,
    pub production_order_id: i64,
    /// machine_time is the only type recorded today.
    pub cost_type: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub hours: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub hourly_rate: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_order::Entity",
        from = "Column::ProductionOrderId",
        to = "super::production_order::Column::ProductionOrderId"
    )]
    ProductionOrder,
}

impl Related<super::production_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
