use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    entities::{
        inventory_balance::{self, Entity as InventoryBalanceEntity},
        inventory_transaction::{self, Entity as InventoryTransactionEntity},
        material_inventory::{self, Entity as MaterialInventoryEntity},
    },
    errors::ServiceError,
    services::bom::ComponentRequirement,
    state::LedgerEntryType,
};

/// Ledger reference: which order a transaction belongs to.
#[derive(Debug, Clone, Copy)]
pub struct LedgerRef<'a> {
    pub reference_type: &'a str,
    pub reference_id: i64,
}

impl<'a> LedgerRef<'a> {
    pub fn production_order(id: i64) -> Self {
        Self {
            reference_type: "production_order",
            reference_id: id,
        }
    }

    pub fn sales_order(id: i64) -> Self {
        Self {
            reference_type: "sales_order",
            reference_id: id,
        }
    }
}

/// Record of one generic-table overwrite performed by the sync enforcer.
#[derive(Debug, Clone, Serialize)]
pub struct MaterialSync {
    pub item_id: i64,
    pub material_type: String,
    pub color: String,
    /// None when the generic row had to be created from scratch.
    pub previous_on_hand: Option<Decimal>,
    pub synced_quantity: Decimal,
}

#[derive(Debug, Clone)]
pub enum ReservationOutcome {
    Reserved,
    Insufficient { available: Decimal },
}

/// Keeps the generic stock table consistent with the authoritative
/// raw-material table and owns every write to balances and the ledger.
/// All methods are generic over [`ConnectionTrait`] so a transition handler
/// can run its whole step set inside a single transaction.
#[derive(Clone, Default)]
pub struct InventorySyncService;

impl InventorySyncService {
    pub fn new() -> Self {
        Self
    }

    pub async fn balance_on<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
    ) -> Result<Option<inventory_balance::Model>, ServiceError> {
        Ok(InventoryBalanceEntity::find()
            .filter(inventory_balance::Column::ItemId.eq(item_id))
            .filter(inventory_balance::Column::LocationId.eq(location_id))
            .one(conn)
            .await?)
    }

    pub async fn material_record<C: ConnectionTrait>(
        &self,
        conn: &C,
        material_type: &str,
        color: &str,
    ) -> Result<material_inventory::Model, ServiceError> {
        MaterialInventoryEntity::find()
            .filter(material_inventory::Column::MaterialType.eq(material_type))
            .filter(material_inventory::Column::Color.eq(color))
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no material inventory record for {} / {}",
                    material_type, color
                ))
            })
    }

    /// The dual-table sync enforcer. For a raw-material component, if the
    /// generic balance row is missing or its on-hand disagrees with the
    /// authoritative `material_inventory.quantity_kg`, the generic row is
    /// created or overwritten to match. Returns `None` when nothing needed
    /// fixing (or the component is not a raw material).
    ///
    /// Without this step the generic table silently drifts toward zero and
    /// production blocks despite real stock on the shelf.
    pub async fn sync_raw_material<C: ConnectionTrait>(
        &self,
        conn: &C,
        requirement: &ComponentRequirement,
        location_id: i32,
    ) -> Result<Option<MaterialSync>, ServiceError> {
        if !requirement.is_raw_material {
            return Ok(None);
        }
        let (material_type, color) = match (&requirement.material_type, &requirement.color) {
            (Some(t), Some(c)) => (t.clone(), c.clone()),
            _ => {
                return Err(ServiceError::InternalError(format!(
                    "raw material item {} is missing material_type/color",
                    requirement.item_id
                )))
            }
        };

        let material = self.material_record(conn, &material_type, &color).await?;
        let balance = self
            .balance_on(conn, requirement.item_id, location_id)
            .await?;

        match balance {
            Some(existing) if existing.quantity_on_hand == material.quantity_kg => Ok(None),
            Some(existing) => {
                let previous = existing.quantity_on_hand;
                let allocated = existing.quantity_allocated;
                warn!(
                    item_id = requirement.item_id,
                    %previous,
                    authoritative = %material.quantity_kg,
                    "generic stock drifted from material inventory; overwriting"
                );
                let mut active: inventory_balance::ActiveModel = existing.into();
                active.quantity_on_hand = Set(material.quantity_kg);
                active.quantity_available = Set(material.quantity_kg - allocated);
                active.updated_at = Set(Utc::now().into());
                active.update(conn).await?;
                Ok(Some(MaterialSync {
                    item_id: requirement.item_id,
                    material_type,
                    color,
                    previous_on_hand: Some(previous),
                    synced_quantity: material.quantity_kg,
                }))
            }
            None => {
                let now = Utc::now();
                inventory_balance::ActiveModel {
                    item_id: Set(requirement.item_id),
                    location_id: Set(location_id),
                    quantity_on_hand: Set(material.quantity_kg),
                    quantity_allocated: Set(Decimal::ZERO),
                    quantity_available: Set(material.quantity_kg),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                Ok(Some(MaterialSync {
                    item_id: requirement.item_id,
                    material_type,
                    color,
                    previous_on_hand: None,
                    synced_quantity: material.quantity_kg,
                }))
            }
        }
    }

    /// Soft-allocates stock: increments `quantity_allocated` and logs a
    /// `reservation` ledger row, leaving on-hand untouched. Availability is
    /// re-checked inside the caller's transaction, so two near-simultaneous
    /// starts cannot reserve more than truly exists.
    pub async fn reserve<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
    ) -> Result<ReservationOutcome, ServiceError> {
        let balance = self.balance_on(conn, item_id, location_id).await?;
        let Some(balance) = balance else {
            return Ok(ReservationOutcome::Insufficient {
                available: Decimal::ZERO,
            });
        };

        let available = balance.quantity_on_hand - balance.quantity_allocated;
        if available < quantity {
            return Ok(ReservationOutcome::Insufficient { available });
        }

        let new_allocated = balance.quantity_allocated + quantity;
        let new_available = balance.quantity_on_hand - new_allocated;
        let mut active: inventory_balance::ActiveModel = balance.into();
        active.quantity_allocated = Set(new_allocated);
        active.quantity_available = Set(new_available);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;

        self.record_entry(
            conn,
            LedgerEntryType::Reservation,
            item_id,
            location_id,
            quantity,
            reference,
            None,
        )
        .await?;

        Ok(ReservationOutcome::Reserved)
    }

    /// Outstanding reserved quantity for an order + item: reservation rows
    /// minus whatever a later consumption or release already resolved.
    pub async fn outstanding_reservation<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        reference: LedgerRef<'_>,
    ) -> Result<Decimal, ServiceError> {
        let rows = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::ItemId.eq(item_id))
            .filter(inventory_transaction::Column::ReferenceType.eq(reference.reference_type))
            .filter(inventory_transaction::Column::ReferenceId.eq(reference.reference_id))
            .all(conn)
            .await?;

        let mut outstanding = Decimal::ZERO;
        for row in rows {
            match row.entry_type.as_str() {
                "reservation" => outstanding += row.quantity,
                "release" | "consumption" => outstanding -= row.quantity,
                _ => {}
            }
        }
        Ok(outstanding.max(Decimal::ZERO))
    }

    /// Drops an allocation without consuming it (order cancellation). Writes
    /// a `release` ledger row so the earlier reservation stays paired in the
    /// audit trail.
    pub async fn release_reservation<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
    ) -> Result<(), ServiceError> {
        if quantity <= Decimal::ZERO {
            return Ok(());
        }
        self.deallocate(conn, item_id, location_id, quantity).await?;
        self.record_entry(
            conn,
            LedgerEntryType::Release,
            item_id,
            location_id,
            quantity,
            reference,
            None,
        )
        .await?;
        Ok(())
    }

    /// Consumes material: releases the outstanding allocation, decrements
    /// on-hand, logs a `consumption` row, and mirrors the decrement into the
    /// authoritative raw-material table so the two stay synchronized going
    /// forward rather than only at start time.
    ///
    /// Consumption records what the printer physically used, so it may drive
    /// on-hand negative when the order started short; the raw-material mirror
    /// flips `in_stock` off at zero or below.
    pub async fn consume<C: ConnectionTrait>(
        &self,
        conn: &C,
        requirement: &ComponentRequirement,
        location_id: i32,
        quantity: Decimal,
        release_allocation: Decimal,
        reference: LedgerRef<'_>,
    ) -> Result<(), ServiceError> {
        let balance = self
            .balance_on(conn, requirement.item_id, location_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no inventory balance for item {} at location {}",
                    requirement.item_id, location_id
                ))
            })?;

        let new_on_hand = balance.quantity_on_hand - quantity;
        if new_on_hand < Decimal::ZERO {
            warn!(
                item_id = requirement.item_id,
                on_hand = %balance.quantity_on_hand,
                %quantity,
                "consumption drives on-hand negative"
            );
        }
        let new_allocated = (balance.quantity_allocated - release_allocation).max(Decimal::ZERO);
        let mut active: inventory_balance::ActiveModel = balance.into();
        active.quantity_on_hand = Set(new_on_hand);
        active.quantity_allocated = Set(new_allocated);
        active.quantity_available = Set(new_on_hand - new_allocated);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;

        self.record_entry(
            conn,
            LedgerEntryType::Consumption,
            requirement.item_id,
            location_id,
            quantity,
            reference,
            None,
        )
        .await?;

        if requirement.is_raw_material {
            self.decrement_material(conn, requirement, quantity).await?;
        }

        Ok(())
    }

    /// Finished-goods receipt; the balance row is created on demand so
    /// make-to-order products with no pre-existing stock record still land.
    pub async fn receive<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
    ) -> Result<Decimal, ServiceError> {
        let now = Utc::now();
        let new_on_hand = match self.balance_on(conn, item_id, location_id).await? {
            Some(balance) => {
                let new_on_hand = balance.quantity_on_hand + quantity;
                let allocated = balance.quantity_allocated;
                let mut active: inventory_balance::ActiveModel = balance.into();
                active.quantity_on_hand = Set(new_on_hand);
                active.quantity_available = Set(new_on_hand - allocated);
                active.updated_at = Set(now.into());
                active.update(conn).await?;
                new_on_hand
            }
            None => {
                inventory_balance::ActiveModel {
                    item_id: Set(item_id),
                    location_id: Set(location_id),
                    quantity_on_hand: Set(quantity),
                    quantity_allocated: Set(Decimal::ZERO),
                    quantity_available: Set(quantity),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                }
                .insert(conn)
                .await?;
                quantity
            }
        };

        self.record_entry(
            conn,
            LedgerEntryType::Receipt,
            item_id,
            location_id,
            quantity,
            reference,
            None,
        )
        .await?;

        info!(item_id, %quantity, %new_on_hand, "finished goods received");
        Ok(new_on_hand)
    }

    /// Issues finished goods at shipment: decrements on-hand and logs a
    /// `shipment` row.
    pub async fn issue<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
    ) -> Result<(), ServiceError> {
        let balance = self
            .balance_on(conn, item_id, location_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no finished goods balance for item {} at location {}",
                    item_id, location_id
                ))
            })?;

        let new_on_hand = balance.quantity_on_hand - quantity;
        if new_on_hand < Decimal::ZERO {
            return Err(ServiceError::InsufficientInventory(format!(
                "cannot issue {} of item {}; only {} on hand",
                quantity, item_id, balance.quantity_on_hand
            )));
        }
        let allocated = balance.quantity_allocated;
        let mut active: inventory_balance::ActiveModel = balance.into();
        active.quantity_on_hand = Set(new_on_hand);
        active.quantity_available = Set(new_on_hand - allocated);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;

        self.record_entry(
            conn,
            LedgerEntryType::Shipment,
            item_id,
            location_id,
            quantity,
            reference,
            None,
        )
        .await?;
        Ok(())
    }

    /// Informational scrap entry; never touches stock levels.
    pub async fn record_scrap<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
        reason: Option<String>,
    ) -> Result<(), ServiceError> {
        self.record_entry(
            conn,
            LedgerEntryType::Scrap,
            item_id,
            location_id,
            quantity,
            reference,
            reason,
        )
        .await
    }

    async fn deallocate<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
    ) -> Result<(), ServiceError> {
        let balance = self
            .balance_on(conn, item_id, location_id)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "no inventory balance for item {} at location {}",
                    item_id, location_id
                ))
            })?;
        let new_allocated = balance.quantity_allocated - quantity;
        if new_allocated < Decimal::ZERO {
            return Err(ServiceError::InternalError(format!(
                "release of {} exceeds allocation {} for item {}",
                quantity, balance.quantity_allocated, item_id
            )));
        }
        let on_hand = balance.quantity_on_hand;
        let mut active: inventory_balance::ActiveModel = balance.into();
        active.quantity_allocated = Set(new_allocated);
        active.quantity_available = Set(on_hand - new_allocated);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }

    async fn decrement_material<C: ConnectionTrait>(
        &self,
        conn: &C,
        requirement: &ComponentRequirement,
        quantity: Decimal,
    ) -> Result<(), ServiceError> {
        let (material_type, color) = match (&requirement.material_type, &requirement.color) {
            (Some(t), Some(c)) => (t.as_str(), c.as_str()),
            _ => {
                return Err(ServiceError::InternalError(format!(
                    "raw material item {} is missing material_type/color",
                    requirement.item_id
                )))
            }
        };
        let material = self.material_record(conn, material_type, color).await?;
        let new_quantity = material.quantity_kg - quantity;
        let mut active: material_inventory::ActiveModel = material.into();
        active.quantity_kg = Set(new_quantity);
        active.in_stock = Set(new_quantity > Decimal::ZERO);
        active.updated_at = Set(Utc::now().into());
        active.update(conn).await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn record_entry<C: ConnectionTrait>(
        &self,
        conn: &C,
        entry_type: LedgerEntryType,
        item_id: i64,
        location_id: i32,
        quantity: Decimal,
        reference: LedgerRef<'_>,
        notes: Option<String>,
    ) -> Result<(), ServiceError> {
        inventory_transaction::ActiveModel {
            entry_type: Set(entry_type.to_string()),
            item_id: Set(item_id),
            location_id: Set(location_id),
            quantity: Set(quantity),
            reference_type: Set(reference.reference_type.to_string()),
            reference_id: Set(reference.reference_id),
            notes: Set(notes),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        }
        .insert(conn)
        .await?;
        Ok(())
    }
}
