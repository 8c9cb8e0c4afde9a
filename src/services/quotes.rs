use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::FulfillmentSettings,
    entities::{
        bom_header, bom_line,
        item_master::{self, Entity as ItemMasterEntity},
        production_order,
        quote::{self, Entity as QuoteEntity},
        sales_order,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::bom::BOM_STATUS_ACTIVE,
    state::{
        parse_status, ConsumeStage, FulfillmentStatus, ItemType, ProcurementType,
        ProductionStatus, QuoteStatus, SalesOrderStatus,
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct QuoteAcceptance {
    pub quote_id: i64,
    pub item_id: i64,
    pub bom_id: i64,
    pub sales_order_id: i64,
    pub production_order_id: i64,
}

/// Turns accepted quotes into everything fulfillment needs: a custom catalog
/// item, an active single-level BOM sized from the quoted unit weight, a
/// confirmed sales order, and a draft production order.
#[derive(Clone)]
pub struct QuoteService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
    settings: FulfillmentSettings,
}

impl QuoteService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Option<EventSender>,
        settings: FulfillmentSettings,
    ) -> Self {
        Self {
            db,
            event_sender,
            settings,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_quote(&self, quote_id: i64) -> Result<quote::Model, ServiceError> {
        QuoteEntity::find_by_id(quote_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("quote {} not found", quote_id)))
    }

    /// open -> accepted, atomically with the records acceptance spawns.
    /// Fails with `NotFound` when no raw-material item matches the quoted
    /// material/color, leaving the quote open.
    #[instrument(skip(self))]
    pub async fn accept_quote(&self, quote_id: i64) -> Result<QuoteAcceptance, ServiceError> {
        let txn = self.db.begin().await?;

        let quote = QuoteEntity::find_by_id(quote_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("quote {} not found", quote_id)))?;
        let status: QuoteStatus = parse_status(&quote.status, "quote")?;
        if status != QuoteStatus::Open {
            return Err(ServiceError::InvalidState(format!(
                "quote {} is {}, only open quotes can be accepted",
                quote_id, status
            )));
        }

        let raw_material = self
            .find_raw_material(&txn, &quote.material_type, &quote.color)
            .await?;

        let now = Utc::now();
        let item = item_master::ActiveModel {
            item_number: Set(format!("CUST-{}", quote.quote_number)),
            description: Set(Some(format!(
                "Custom print, {} {}",
                quote.material_type, quote.color
            ))),
            item_type: Set(ItemType::FinishedGood.to_string()),
            procurement_type: Set(ProcurementType::Make.to_string()),
            is_raw_material: Set(false),
            track_lots: Set(false),
            track_serials: Set(false),
            requires_qc: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let bom = bom_header::ActiveModel {
            bom_name: Set(format!("BOM {}", item.item_number)),
            item_id: Set(item.item_id),
            revision: Set(Some("A".to_string())),
            status_code: Set(BOM_STATUS_ACTIVE.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Material line sized from the quoted per-unit weight; the default
        // scrap factor covers purge and failed first layers.
        bom_line::ActiveModel {
            bom_id: Set(bom.bom_id),
            component_item_id: Set(raw_material.item_id),
            quantity_per_unit: Set(quote.unit_weight_kg),
            scrap_factor: Set(self.settings.default_scrap_factor),
            consume_stage: Set(ConsumeStage::Production.to_string()),
            is_cost_only: Set(false),
            uom_code: Set(Some("kg".to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(packaging_item_id) = self.settings.packaging_item_id {
            bom_line::ActiveModel {
                bom_id: Set(bom.bom_id),
                component_item_id: Set(packaging_item_id),
                quantity_per_unit: Set(Decimal::ONE),
                scrap_factor: Set(Decimal::ZERO),
                consume_stage: Set(ConsumeStage::Shipping.to_string()),
                is_cost_only: Set(false),
                uom_code: Set(Some("ea".to_string())),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        let so = sales_order::ActiveModel {
            order_number: Set(format!("SO-{}", quote.quote_number)),
            customer_id: Set(quote.customer_id),
            item_id: Set(item.item_id),
            quantity: Set(quote.quantity),
            status: Set(SalesOrderStatus::Confirmed.to_string()),
            fulfillment_status: Set(FulfillmentStatus::Pending.to_string()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let po = production_order::ActiveModel {
            order_number: Set(format!("PO-{}", quote.quote_number)),
            sales_order_id: Set(Some(so.sales_order_id)),
            item_id: Set(item.item_id),
            status: Set(ProductionStatus::Draft.to_string()),
            quantity_ordered: Set(quote.quantity),
            quantity_completed: Set(Decimal::ZERO),
            quantity_scrapped: Set(Decimal::ZERO),
            priority: Set(0),
            location_id: Set(self.settings.default_location_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: quote::ActiveModel = quote.into();
        active.status = Set(QuoteStatus::Accepted.to_string());
        active.item_id = Set(Some(item.item_id));
        active.updated_at = Set(now.into());
        active.update(&txn).await?;

        txn.commit().await?;

        counter!("fulfillment.quotes.accepted", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::QuoteAccepted {
                    quote_id,
                    item_id: item.item_id,
                    sales_order_id: so.sales_order_id,
                })
                .await;
        }
        info!(
            quote_id,
            item_id = item.item_id,
            sales_order_id = so.sales_order_id,
            production_order_id = po.production_order_id,
            "quote accepted"
        );

        Ok(QuoteAcceptance {
            quote_id,
            item_id: item.item_id,
            bom_id: bom.bom_id,
            sales_order_id: so.sales_order_id,
            production_order_id: po.production_order_id,
        })
    }

    async fn find_raw_material<C: ConnectionTrait>(
        &self,
        conn: &C,
        material_type: &str,
        color: &str,
    ) -> Result<item_master::Model, ServiceError> {
        ItemMasterEntity::find()
            .filter(item_master::Column::IsRawMaterial.eq(true))
            .filter(item_master::Column::MaterialType.eq(material_type))
            .filter(item_master::Column::Color.eq(color))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no raw material stocked for {} / {}",
                    material_type, color
                ))
            })
    }
}
