use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, histogram};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::{
    config::FulfillmentSettings,
    db,
    entities::{
        item_master::Entity as ItemMasterEntity,
        production_cost,
        production_order::{self, Entity as ProductionOrderEntity},
        sales_order::{self, Entity as SalesOrderEntity},
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        bom::BomService,
        inventory_sync::{InventorySyncService, LedgerRef, MaterialSync, ReservationOutcome},
    },
    state::{
        ensure_production_transition, parse_status, FulfillmentStatus, ProductionStatus, QcStatus,
    },
};

#[derive(Debug, Clone, Serialize)]
pub struct ReservedMaterial {
    pub item_id: i64,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsufficientMaterial {
    pub item_id: i64,
    pub required: Decimal,
    pub available: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsumedMaterial {
    pub item_id: i64,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartProductionResult {
    pub materials_synced: Vec<MaterialSync>,
    pub materials_reserved: Vec<ReservedMaterial>,
    pub materials_insufficient: Vec<InsufficientMaterial>,
    pub new_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletionResult {
    pub materials_consumed: Vec<ConsumedMaterial>,
    pub finished_goods_added: Decimal,
    pub scrap_recorded: Decimal,
    pub new_status: String,
}

/// Owns the production-order state machine: release, start (reservation),
/// complete (the only path allowed to decrement raw material and increment
/// finished goods), and cancel.
#[derive(Clone)]
pub struct ProductionService {
    db: Arc<DatabaseConnection>,
    bom: Arc<BomService>,
    inventory: Arc<InventorySyncService>,
    event_sender: Option<EventSender>,
    settings: FulfillmentSettings,
}

impl ProductionService {
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

    /// Loads the order inside the caller's transaction, taking an exclusive
    /// row lock where the backend supports one so concurrent transitions on
    /// the same order serialize.
    pub(crate) async fn find_order_for_update<C: ConnectionTrait>(
        conn: &C,
        order_id: i64,
    ) -> Result<production_order::Model, ServiceError> {
        let mut query = ProductionOrderEntity::find_by_id(order_id);
        if db::supports_row_locks(conn.get_database_backend()) {
            query = query.lock_exclusive();
        }
        query
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("production order {} not found", order_id))
            })
    }

    #[instrument(skip(self))]
    pub async fn get_order(
        &self,
        order_id: i64,
    ) -> Result<production_order::Model, ServiceError> {
        ProductionOrderEntity::find_by_id(order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("production order {} not found", order_id))
            })
    }

    /// draft -> released; no inventory effect.
    #[instrument(skip(self))]
    pub async fn release_order(
        &self,
        order_id: i64,
    ) -> Result<production_order::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let order = Self::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        ensure_production_transition(order_id, status, ProductionStatus::Released)?;

        let mut active: production_order::ActiveModel = order.into();
        active.status = Set(ProductionStatus::Released.to_string());
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ProductionReleased {
                    production_order_id: order_id,
                })
                .await;
        }
        Ok(updated)
    }

    /// Starts production: syncs raw-material balances, soft-allocates every
    /// production-stage requirement, and moves the order to `in_progress`.
    /// All of it commits or none of it does.
    ///
    /// Shortfalls are warnings by default; `strict_reservations` turns them
    /// into a hard `InsufficientInventory` error that rolls the whole start
    /// back.
    #[instrument(skip(self))]
    pub async fn start_production(
        &self,
        order_id: i64,
    ) -> Result<StartProductionResult, ServiceError> {
        let location_id = self.settings.default_location_id;
        let txn = self.db.begin().await?;

        let order = Self::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        if !status.can_start_production() {
            return Err(ServiceError::InvalidState(format!(
                "production order {} cannot start from status {}",
                order_id, status
            )));
        }

        let explosion = self
            .bom
            .explode_on(&txn, order.item_id, order.quantity_ordered)
            .await?;
        let reference = LedgerRef::production_order(order_id);

        let mut synced = Vec::new();
        let mut reserved = Vec::new();
        let mut insufficient = Vec::new();

        // Sync enforcer runs before any reservation touches a raw material.
        for requirement in &explosion.production {
            if let Some(sync) = self
                .inventory
                .sync_raw_material(&txn, requirement, location_id)
                .await?
            {
                synced.push(sync);
            }
        }

        for requirement in &explosion.production {
            match self
                .inventory
                .reserve(
                    &txn,
                    requirement.item_id,
                    location_id,
                    requirement.required_quantity,
                    reference,
                )
                .await?
            {
                ReservationOutcome::Reserved => reserved.push(ReservedMaterial {
                    item_id: requirement.item_id,
                    quantity: requirement.required_quantity,
                }),
                ReservationOutcome::Insufficient { available } => {
                    if self.settings.strict_reservations {
                        return Err(ServiceError::InsufficientInventory(format!(
                            "item {} requires {} but only {} available",
                            requirement.item_id, requirement.required_quantity, available
                        )));
                    }
                    warn!(
                        item_id = requirement.item_id,
                        required = %requirement.required_quantity,
                        %available,
                        "starting production with insufficient stock"
                    );
                    insufficient.push(InsufficientMaterial {
                        item_id: requirement.item_id,
                        required: requirement.required_quantity,
                        available,
                    });
                }
            }
        }

        let mut active: production_order::ActiveModel = order.clone().into();
        active.status = Set(ProductionStatus::InProgress.to_string());
        active.started_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        if let Some(sales_order_id) = order.sales_order_id {
            Self::advance_fulfillment(
                &txn,
                sales_order_id,
                FulfillmentStatus::InProduction,
            )
            .await?;
        }

        txn.commit().await?;

        counter!("fulfillment.production.started", 1);
        counter!("fulfillment.materials.synced", synced.len() as u64);
        if !insufficient.is_empty() {
            counter!("fulfillment.production.started_short", 1);
        }

        if let Some(sender) = &self.event_sender {
            if !synced.is_empty() {
                sender
                    .send_or_log(Event::MaterialsSynced {
                        production_order_id: order_id,
                        item_count: synced.len(),
                    })
                    .await;
            }
            for shortfall in &insufficient {
                sender
                    .send_or_log(Event::ReservationShortfall {
                        production_order_id: order_id,
                        item_id: shortfall.item_id,
                        required: shortfall.required,
                        available: shortfall.available,
                    })
                    .await;
            }
            sender
                .send_or_log(Event::ProductionStarted {
                    production_order_id: order_id,
                    materials_reserved: reserved.len(),
                    materials_insufficient: insufficient.len(),
                })
                .await;
        }

        info!(
            order_id,
            reserved = reserved.len(),
            insufficient = insufficient.len(),
            "production started"
        );

        Ok(StartProductionResult {
            materials_synced: synced,
            materials_reserved: reserved,
            materials_insufficient: insufficient,
            new_status: updated.status,
        })
    }

    /// Completes production. The `in_progress` guard is what makes duplicate
    /// consumption structurally impossible: a second call finds the order
    /// already `printed`/`completed`, fails, and writes zero ledger rows.
    #[instrument(skip(self))]
    pub async fn complete_production(
        &self,
        order_id: i64,
        quantity_good: Decimal,
        quantity_bad: Decimal,
        actual_hours: Decimal,
    ) -> Result<CompletionResult, ServiceError> {
        if quantity_good < Decimal::ZERO || quantity_bad < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "quantities cannot be negative".to_string(),
            ));
        }
        if quantity_good + quantity_bad == Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "completion must report at least one good or bad unit".to_string(),
            ));
        }
        if actual_hours < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "actual hours cannot be negative".to_string(),
            ));
        }

        let location_id = self.settings.default_location_id;
        let txn = self.db.begin().await?;

        let order = Self::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        if status != ProductionStatus::InProgress {
            return Err(ServiceError::InvalidState(format!(
                "production order {} is not in progress (status {}); completion already recorded or order never started",
                order_id, status
            )));
        }

        let item = ItemMasterEntity::find_by_id(order.item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("item {} not found", order.item_id))
            })?;

        let produced = quantity_good + quantity_bad;
        let explosion = self.bom.explode_on(&txn, order.item_id, produced).await?;
        let reference = LedgerRef::production_order(order_id);

        // 1. Consume production-stage components; reservations release as
        //    their material is consumed, and raw-material rows mirror the
        //    decrement.
        let mut consumed = Vec::new();
        for requirement in &explosion.production {
            let outstanding = self
                .inventory
                .outstanding_reservation(&txn, requirement.item_id, reference)
                .await?;
            self.inventory
                .consume(
                    &txn,
                    requirement,
                    location_id,
                    requirement.required_quantity,
                    outstanding.min(requirement.required_quantity).max(Decimal::ZERO),
                    reference,
                )
                .await?;
            // Any reservation beyond what was consumed (under-production)
            // is released rather than left dangling.
            let leftover = outstanding - requirement.required_quantity;
            if leftover > Decimal::ZERO {
                self.inventory
                    .release_reservation(
                        &txn,
                        requirement.item_id,
                        location_id,
                        leftover,
                        reference,
                    )
                    .await?;
            }
            consumed.push(ConsumedMaterial {
                item_id: requirement.item_id,
                quantity: requirement.required_quantity,
            });
        }

        // 2. Finished-goods receipt: good units only, never bad.
        let mut finished_goods_added = Decimal::ZERO;
        if quantity_good > Decimal::ZERO {
            self.inventory
                .receive(&txn, order.item_id, location_id, quantity_good, reference)
                .await?;
            finished_goods_added = quantity_good;
        }

        // 3. Scrap entry is informational; finished-goods stock untouched.
        if quantity_bad > Decimal::ZERO {
            self.inventory
                .record_scrap(&txn, order.item_id, location_id, quantity_bad, reference, None)
                .await?;
        }

        // 4. Machine-time cost, independent of the material ledger.
        let rate = self.settings.work_center_hourly_rate;
        production_cost::ActiveModel {
            production_order_id: Set(order_id),
            cost_type: Set("machine_time".to_string()),
            hours: Set(actual_hours),
            hourly_rate: Set(rate),
            amount: Set(actual_hours * rate),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 5. printed when QC is required, straight to completed otherwise.
        let new_status = if item.requires_qc {
            ProductionStatus::Printed
        } else {
            ProductionStatus::Completed
        };
        ensure_production_transition(order_id, status, new_status)?;

        let sales_order_id = order.sales_order_id;
        let mut active: production_order::ActiveModel = order.into();
        active.status = Set(new_status.to_string());
        active.qc_status = Set(item
            .requires_qc
            .then(|| QcStatus::Pending.to_string()));
        active.quantity_completed = Set(quantity_good);
        active.quantity_scrapped = Set(quantity_bad);
        active.actual_hours = Set(Some(actual_hours));
        active.completed_at = Set(Some(Utc::now().into()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        if new_status == ProductionStatus::Completed {
            if let Some(sales_order_id) = sales_order_id {
                cascade_ready_to_ship(&txn, sales_order_id).await?;
            }
        }

        txn.commit().await?;

        counter!("fulfillment.production.completed", 1);
        histogram!(
            "fulfillment.production.quantity_good",
            quantity_good.to_f64().unwrap_or(0.0)
        );
        if quantity_bad > Decimal::ZERO {
            histogram!(
                "fulfillment.production.quantity_scrapped",
                quantity_bad.to_f64().unwrap_or(0.0)
            );
        }

        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ProductionCompleted {
                    production_order_id: order_id,
                    quantity_good,
                    quantity_bad,
                })
                .await;
        }

        info!(
            order_id,
            %quantity_good,
            %quantity_bad,
            new_status = %updated.status,
            "production completed"
        );

        Ok(CompletionResult {
            materials_consumed: consumed,
            finished_goods_added,
            scrap_recorded: quantity_bad,
            new_status: updated.status,
        })
    }

    /// Cancels an order. Before production start this is purely a status
    /// change; an `in_progress` order additionally releases its outstanding
    /// reservations. Completed consumption is never reversed.
    #[instrument(skip(self))]
    pub async fn cancel_production(
        &self,
        order_id: i64,
        reason: Option<String>,
    ) -> Result<production_order::Model, ServiceError> {
        let location_id = self.settings.default_location_id;
        let txn = self.db.begin().await?;

        let order = Self::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        ensure_production_transition(order_id, status, ProductionStatus::Cancelled)?;

        if status == ProductionStatus::InProgress {
            let explosion = self
                .bom
                .explode_on(&txn, order.item_id, order.quantity_ordered)
                .await?;
            let reference = LedgerRef::production_order(order_id);
            for requirement in &explosion.production {
                let outstanding = self
                    .inventory
                    .outstanding_reservation(&txn, requirement.item_id, reference)
                    .await?;
                self.inventory
                    .release_reservation(
                        &txn,
                        requirement.item_id,
                        location_id,
                        outstanding,
                        reference,
                    )
                    .await?;
            }
        }

        let mut active: production_order::ActiveModel = order.into();
        active.status = Set(ProductionStatus::Cancelled.to_string());
        active.qc_failure_reason = Set(reason);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        counter!("fulfillment.production.cancelled", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::ProductionCancelled {
                    production_order_id: order_id,
                })
                .await;
        }
        info!(order_id, "production order cancelled");
        Ok(updated)
    }

    async fn advance_fulfillment<C: ConnectionTrait>(
        conn: &C,
        sales_order_id: i64,
        target: FulfillmentStatus,
    ) -> Result<(), ServiceError> {
        let Some(so) = SalesOrderEntity::find_by_id(sales_order_id).one(conn).await? else {
            return Ok(());
        };
        let current: FulfillmentStatus = parse_status(&so.fulfillment_status, "fulfillment")?;
        if current.can_transition_to(target) {
            let mut active: sales_order::ActiveModel = so.into();
            active.fulfillment_status = Set(target.to_string());
            active.updated_at = Set(Utc::now().into());
            active.update(conn).await?;
        }
        Ok(())
    }
}

/// Marks the sales order `ready_to_ship` once every live production line has
/// completed. Scrapped and cancelled lines do not block readiness: a scrap
/// spawned its own remake line, which must itself complete.
pub(crate) async fn cascade_ready_to_ship<C: ConnectionTrait>(
    conn: &C,
    sales_order_id: i64,
) -> Result<Option<FulfillmentStatus>, ServiceError> {
    let Some(so) = SalesOrderEntity::find_by_id(sales_order_id).one(conn).await? else {
        return Ok(None);
    };
    let current: FulfillmentStatus = parse_status(&so.fulfillment_status, "fulfillment")?;
    if !current.can_transition_to(FulfillmentStatus::ReadyToShip) {
        return Ok(Some(current));
    }

    let lines = ProductionOrderEntity::find()
        .filter(production_order::Column::SalesOrderId.eq(sales_order_id))
        .all(conn)
        .await?;

    let mut any_completed = false;
    for line in &lines {
        let status: ProductionStatus = parse_status(&line.status, "production order")?;
        match status {
            ProductionStatus::Completed => any_completed = true,
            ProductionStatus::Scrapped | ProductionStatus::Cancelled => {}
            _ => return Ok(Some(current)),
        }
    }
    if !any_completed {
        return Ok(Some(current));
    }

    let mut active: sales_order::ActiveModel = so.into();
    active.fulfillment_status = Set(FulfillmentStatus::ReadyToShip.to_string());
    active.updated_at = Set(Utc::now().into());
    active.update(conn).await?;
    Ok(Some(FulfillmentStatus::ReadyToShip))
}
