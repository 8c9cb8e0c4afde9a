use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub production_order_id: i64,
    pub order_number: String,
    pub sales_order_id: Option<i64>,
    pub item_id: i64,
    /// See `state::ProductionStatus`.
    pub status: String,
    /// pending | passed | failed, set once the order reaches QC.
    pub qc_status: Option<String>,
    pub qc_failure_reason: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_ordered: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_completed: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub quantity_scrapped: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub actual_hours: Option<Decimal>,
    /// Remakes spawned by QC failures get elevated priority.
    pub priority: i32,
    /// Original order this remake replaces, when spawned by a QC scrap.
    pub source_order_id: Option<i64>,
    pub location_id: i32,
    pub started_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_order::Entity",
        from = "Column::SalesOrderId",
        to = "super::sales_order::Column::SalesOrderId"
    )]
    SalesOrder,
    #[sea_orm(
        belongs_to = "super::item_master::Entity",
        from = "Column::ItemId",
        to = "super::item_master::Column::ItemId"
    )]
    ItemMaster,
}

impl Related<super::sales_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SalesOrder.def()
    }
}

impl Related<super::item_master::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ItemMaster.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
