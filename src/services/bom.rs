use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::instrument;

use crate::{
    entities::{
        bom_header::{self, Entity as BomHeaderEntity},
        bom_line::{self, Entity as BomLineEntity},
        item_master::Entity as ItemMasterEntity,
    },
    errors::ServiceError,
    state::{parse_status, ConsumeStage, ProcurementType},
};

pub const BOM_STATUS_ACTIVE: &str = "ACTIVE";

/// One exploded component requirement, carrying the raw-material identity so
/// downstream inventory writes never need a second catalog lookup.
#[derive(Debug, Clone)]
pub struct ComponentRequirement {
    pub item_id: i64,
    pub consume_stage: ConsumeStage,
    /// line.quantity_per_unit * (1 + scrap_factor)
    pub per_unit_quantity: Decimal,
    /// per_unit_quantity * order quantity
    pub required_quantity: Decimal,
    pub is_raw_material: bool,
    pub material_type: Option<String>,
    pub color: Option<String>,
}

/// Result of exploding a product BOM for an order quantity, split by the
/// stage at which each line is consumed. Cost-only lines are excluded.
#[derive(Debug, Clone)]
pub struct BomExplosion {
    pub bom_id: Option<i64>,
    pub production: Vec<ComponentRequirement>,
    pub shipping: Vec<ComponentRequirement>,
}

/// Resolves products into component requirements. Pure query/compute: this
/// service never writes.
#[derive(Clone)]
pub struct BomService {
    db: Arc<DatabaseConnection>,
}

impl BomService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Explodes the active BOM revision for `item_id` at `order_quantity`.
    ///
    /// A manufactured item (`procurement_type = make`) without an active BOM
    /// is a `NotFound` error; a purchased item simply explodes to nothing.
    #[instrument(skip(self))]
    pub async fn explode(
        &self,
        item_id: i64,
        order_quantity: Decimal,
    ) -> Result<BomExplosion, ServiceError> {
        self.explode_on(&*self.db, item_id, order_quantity).await
    }

    /// Same as [`explode`](Self::explode) but inside the caller's
    /// transaction, so reservation and consumption read the BOM they act on.
    pub async fn explode_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        order_quantity: Decimal,
    ) -> Result<BomExplosion, ServiceError> {
        let item = ItemMasterEntity::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("item {} not found", item_id)))?;

        let bom = BomHeaderEntity::find()
            .filter(bom_header::Column::ItemId.eq(item_id))
            .filter(bom_header::Column::StatusCode.eq(BOM_STATUS_ACTIVE))
            .one(conn)
            .await?;

        let bom = match bom {
            Some(bom) => bom,
            None => {
                let procurement: ProcurementType =
                    parse_status(&item.procurement_type, "procurement type")?;
                if procurement == ProcurementType::Make {
                    return Err(ServiceError::NotFound(format!(
                        "no active BOM for manufactured item {} ({})",
                        item_id, item.item_number
                    )));
                }
                return Ok(BomExplosion {
                    bom_id: None,
                    production: Vec::new(),
                    shipping: Vec::new(),
                });
            }
        };

        let lines = BomLineEntity::find()
            .filter(bom_line::Column::BomId.eq(bom.bom_id))
            .all(conn)
            .await?;

        let mut production = Vec::new();
        let mut shipping = Vec::new();

        for line in lines {
            if line.is_cost_only {
                continue;
            }
            let stage: ConsumeStage = parse_status(&line.consume_stage, "consume stage")?;
            let component = ItemMasterEntity::find_by_id(line.component_item_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!(
                        "component item {} on BOM {} not found",
                        line.component_item_id, bom.bom_id
                    ))
                })?;

            let per_unit = line.quantity_per_unit * (Decimal::ONE + line.scrap_factor);
            let requirement = ComponentRequirement {
                item_id: component.item_id,
                consume_stage: stage,
                per_unit_quantity: per_unit,
                required_quantity: per_unit * order_quantity,
                is_raw_material: component.is_raw_material,
                material_type: component.material_type,
                color: component.color,
            };

            match stage {
                ConsumeStage::Production => production.push(requirement),
                ConsumeStage::Shipping => shipping.push(requirement),
            }
        }

        Ok(BomExplosion {
            bom_id: Some(bom.bom_id),
            production,
            shipping,
        })
    }
}
