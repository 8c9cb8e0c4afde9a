use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
    QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    config::FulfillmentSettings,
    db,
    entities::sales_order::{self, Entity as SalesOrderEntity},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        bom::BomService,
        inventory_sync::{InventorySyncService, LedgerRef},
    },
    state::{parse_status, FulfillmentStatus, SalesOrderStatus},
};

#[derive(Debug, Clone, Serialize)]
pub struct ShipmentResult {
    pub sales_order_id: i64,
    pub fulfillment_status: String,
    pub packaging_consumed: Vec<PackagingConsumed>,
    pub finished_goods_issued: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackagingConsumed {
    pub item_id: i64,
    pub quantity: Decimal,
}

/// Ships sales orders. The `shipped_at IS NULL` check plus the
/// `ready_to_ship` guard is what makes shipping-stage consumption fire
/// exactly once per order; tracking edits afterwards are metadata only.
#[derive(Clone)]
pub struct ShippingService {
    db: Arc<DatabaseConnection>,
    bom: Arc<BomService>,
    inventory: Arc<InventorySyncService>,
    event_sender: Option<EventSender>,
    settings: FulfillmentSettings,
}

impl ShippingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        bom: Arc<BomService>,
        inventory: Arc<InventorySyncService>,
        event_sender: Option<EventSender>,
        settings: FulfillmentSettings,
    ) -> Self {
        Self {
            db,
            bom,
            inventory,
            event_sender,
            settings,
        }
    }

    async fn find_order_for_update<C: ConnectionTrait>(
        conn: &C,
        sales_order_id: i64,
    ) -> Result<sales_order::Model, ServiceError> {
        let mut query = SalesOrderEntity::find_by_id(sales_order_id);
        if db::supports_row_locks(conn.get_database_backend()) {
            query = query.lock_exclusive();
        }
        query.one(conn).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("sales order {} not found", sales_order_id))
        })
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        sales_order_id: i64,
    ) -> Result<sales_order::Model, ServiceError> {
        SalesOrderEntity::find_by_id(sales_order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("sales order {} not found", sales_order_id))
            })
    }

    /// ready_to_ship -> shipped. Consumes shipping-stage BOM lines (packaging
    /// and the like), issues the finished goods, and stamps carrier/tracking.
    #[instrument(skip(self))]
    pub async fn ship_order(
        &self,
        sales_order_id: i64,
        carrier: String,
        tracking_number: String,
    ) -> Result<ShipmentResult, ServiceError> {
        let location_id = self.settings.default_location_id;
        let txn = self.db.begin().await?;

        let order = Self::find_order_for_update(&txn, sales_order_id).await?;
        let fulfillment: FulfillmentStatus =
            parse_status(&order.fulfillment_status, "fulfillment")?;
        if fulfillment != FulfillmentStatus::ReadyToShip {
            return Err(ServiceError::InvalidState(format!(
                "sales order {} is not ready to ship (status {})",
                sales_order_id, fulfillment
            )));
        }
        if order.shipped_at.is_some() {
            return Err(ServiceError::InvalidState(format!(
                "sales order {} was already shipped",
                sales_order_id
            )));
        }

        let reference = LedgerRef::sales_order(sales_order_id);
        let explosion = self
            .bom
            .explode_on(&txn, order.item_id, order.quantity)
            .await?;

        let mut packaging = Vec::new();
        for requirement in &explosion.shipping {
            self.inventory
                .consume(
                    &txn,
                    requirement,
                    location_id,
                    requirement.required_quantity,
                    Decimal::ZERO,
                    reference,
                )
                .await?;
            packaging.push(PackagingConsumed {
                item_id: requirement.item_id,
                quantity: requirement.required_quantity,
            });
        }

        self.inventory
            .issue(&txn, order.item_id, location_id, order.quantity, reference)
            .await?;

        let quantity = order.quantity;
        let mut active: sales_order::ActiveModel = order.into();
        active.fulfillment_status = Set(FulfillmentStatus::Shipped.to_string());
        active.shipped_at = Set(Some(Utc::now().into()));
        active.carrier = Set(Some(carrier.clone()));
        active.tracking_number = Set(Some(tracking_number.clone()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        counter!("fulfillment.orders.shipped", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::OrderShipped {
                    sales_order_id,
                    carrier,
                    tracking_number,
                })
                .await;
        }
        info!(sales_order_id, %quantity, "order shipped");

        Ok(ShipmentResult {
            sales_order_id,
            fulfillment_status: updated.fulfillment_status,
            packaging_consumed: packaging,
            finished_goods_issued: quantity,
        })
    }

    /// Corrects carrier/tracking on an order that already shipped. Metadata
    /// only; no inventory movement, ever.
    #[instrument(skip(self))]
    pub async fn update_tracking(
        &self,
        sales_order_id: i64,
        carrier: Option<String>,
        tracking_number: Option<String>,
    ) -> Result<sales_order::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order_for_update(&txn, sales_order_id).await?;
        if order.shipped_at.is_none() {
            return Err(ServiceError::InvalidState(format!(
                "sales order {} has not shipped; nothing to correct",
                sales_order_id
            )));
        }

        let mut active: sales_order::ActiveModel = order.into();
        if let Some(carrier) = carrier {
            active.carrier = Set(Some(carrier));
        }
        if let Some(tracking_number) = tracking_number {
            active.tracking_number = Set(Some(tracking_number));
        }
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(sales_order_id, "tracking details updated");
        Ok(updated)
    }

    /// shipped -> closed; terminal bookkeeping with no inventory effect.
    #[instrument(skip(self))]
    pub async fn close_order(
        &self,
        sales_order_id: i64,
    ) -> Result<sales_order::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order_for_update(&txn, sales_order_id).await?;
        let fulfillment: FulfillmentStatus =
            parse_status(&order.fulfillment_status, "fulfillment")?;
        if !fulfillment.can_transition_to(FulfillmentStatus::Closed) {
            return Err(ServiceError::InvalidState(format!(
                "sales order {} cannot close from fulfillment status {}",
                sales_order_id, fulfillment
            )));
        }

        let mut active: sales_order::ActiveModel = order.into();
        active.fulfillment_status = Set(FulfillmentStatus::Closed.to_string());
        active.status = Set(SalesOrderStatus::Closed.to_string());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        info!(sales_order_id, "order closed");
        Ok(updated)
    }
}
