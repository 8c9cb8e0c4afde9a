use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use strum::Display;
use tracing::{info, instrument};

use crate::{
    entities::{
        inventory_transaction::{self, Entity as InventoryTransactionEntity},
        production_order::{self, Entity as ProductionOrderEntity},
        sales_order::Entity as SalesOrderEntity,
    },
    errors::ServiceError,
    services::{bom::BomService, inventory_sync::LedgerRef},
    state::{parse_status, LedgerEntryType, ProductionStatus},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    /// Order completed but a component has no consumption entry.
    MissingConsumption,
    /// Good units reported but no finished-goods receipt entry.
    MissingReceipt,
    /// Reservation never resolved on an order past the point of consumption.
    OrphanedReservation,
    /// Ledger entries exist but their total disagrees with the BOM math.
    QuantityMismatch,
    /// Sales order shipped but the finished-goods shipment entry is absent.
    MissingShipment,
}

#[derive(Debug, Clone, Serialize)]
pub struct LedgerGap {
    pub production_order_id: i64,
    pub item_id: i64,
    pub gap_type: GapType,
    pub expected: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderReconciliation {
    pub production_order_id: i64,
    pub status: String,
    pub gaps: Vec<LedgerGap>,
}

impl OrderReconciliation {
    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub orders_checked: usize,
    pub orders_with_gaps: usize,
    pub gaps: Vec<LedgerGap>,
    /// 1.0 when every audited order's ledger matches its expected movement
    /// set; degrades by the fraction of orders with at least one gap.
    pub health_score: f64,
}

/// Read-only audit: recomputes the inventory movements each order should
/// have produced and diffs them against the ledger. Reports gaps, never
/// repairs them.
#[derive(Clone)]
pub struct ReconciliationService {
    db: Arc<DatabaseConnection>,
    bom: Arc<BomService>,
}

impl ReconciliationService {
    pub fn new(db: Arc<DatabaseConnection>, bom: Arc<BomService>) -> Self {
        Self { db, bom }
    }

    /// Audits one production order.
    #[instrument(skip(self))]
    pub async fn reconcile_order(
        &self,
        production_order_id: i64,
    ) -> Result<OrderReconciliation, ServiceError> {
        let order = ProductionOrderEntity::find_by_id(production_order_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "production order {} not found",
                    production_order_id
                ))
            })?;
        self.reconcile_order_model(&*self.db, &order).await
    }

    /// Audits every production order and aggregates into a health score.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self) -> Result<ReconciliationReport, ServiceError> {
        let orders = ProductionOrderEntity::find().all(&*self.db).await?;
        let orders_checked = orders.len();

        let mut orders_with_gaps = 0;
        let mut gaps = Vec::new();
        for order in &orders {
            let result = self.reconcile_order_model(&*self.db, order).await?;
            if !result.is_clean() {
                orders_with_gaps += 1;
            }
            gaps.extend(result.gaps);
        }

        let health_score = if orders_checked == 0 {
            1.0
        } else {
            1.0 - (orders_with_gaps as f64 / orders_checked as f64)
        };

        info!(orders_checked, orders_with_gaps, health_score, "ledger audit finished");
        Ok(ReconciliationReport {
            orders_checked,
            orders_with_gaps,
            gaps,
            health_score,
        })
    }

    async fn reconcile_order_model<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: &production_order::Model,
    ) -> Result<OrderReconciliation, ServiceError> {
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        let reference = LedgerRef::production_order(order.production_order_id);
        let mut gaps = Vec::new();

        // Consumption and receipt are only expected once completion recorded
        // quantities; the completion handler sets both together.
        let produced = order.quantity_completed + order.quantity_scrapped;
        if status.is_past_completion() && produced > Decimal::ZERO {
            let explosion = self.bom.explode_on(conn, order.item_id, produced).await?;
            for requirement in &explosion.production {
                let consumed = self
                    .ledger_total(conn, requirement.item_id, reference, LedgerEntryType::Consumption)
                    .await?;
                if consumed == Decimal::ZERO {
                    gaps.push(LedgerGap {
                        production_order_id: order.production_order_id,
                        item_id: requirement.item_id,
                        gap_type: GapType::MissingConsumption,
                        expected: requirement.required_quantity,
                        actual: Decimal::ZERO,
                    });
                } else if consumed != requirement.required_quantity {
                    gaps.push(LedgerGap {
                        production_order_id: order.production_order_id,
                        item_id: requirement.item_id,
                        gap_type: GapType::QuantityMismatch,
                        expected: requirement.required_quantity,
                        actual: consumed,
                    });
                }
            }

            if order.quantity_completed > Decimal::ZERO {
                let received = self
                    .ledger_total(conn, order.item_id, reference, LedgerEntryType::Receipt)
                    .await?;
                if received == Decimal::ZERO {
                    gaps.push(LedgerGap {
                        production_order_id: order.production_order_id,
                        item_id: order.item_id,
                        gap_type: GapType::MissingReceipt,
                        expected: order.quantity_completed,
                        actual: Decimal::ZERO,
                    });
                } else if received != order.quantity_completed {
                    gaps.push(LedgerGap {
                        production_order_id: order.production_order_id,
                        item_id: order.item_id,
                        gap_type: GapType::QuantityMismatch,
                        expected: order.quantity_completed,
                        actual: received,
                    });
                }
            }
        }

        // A reservation still open once the order can no longer consume it
        // is stranded allocation.
        if status.is_past_completion() || status == ProductionStatus::Cancelled {
            let rows = InventoryTransactionEntity::find()
                .filter(inventory_transaction::Column::ReferenceType.eq(reference.reference_type))
                .filter(inventory_transaction::Column::ReferenceId.eq(reference.reference_id))
                .all(conn)
                .await?;
            let mut reserved_items: Vec<i64> = rows
                .iter()
                .filter(|r| r.entry_type == LedgerEntryType::Reservation.to_string())
                .map(|r| r.item_id)
                .collect();
            reserved_items.sort_unstable();
            reserved_items.dedup();
            for item_id in reserved_items {
                let mut outstanding = Decimal::ZERO;
                for row in rows.iter().filter(|r| r.item_id == item_id) {
                    match row.entry_type.as_str() {
                        "reservation" => outstanding += row.quantity,
                        "release" | "consumption" => outstanding -= row.quantity,
                        _ => {}
                    }
                }
                if outstanding > Decimal::ZERO {
                    gaps.push(LedgerGap {
                        production_order_id: order.production_order_id,
                        item_id,
                        gap_type: GapType::OrphanedReservation,
                        expected: Decimal::ZERO,
                        actual: outstanding,
                    });
                }
            }
        }

        // Shipment entries live under the sales-order reference.
        if let Some(sales_order_id) = order.sales_order_id {
            if let Some(so) = SalesOrderEntity::find_by_id(sales_order_id).one(conn).await? {
                if so.shipped_at.is_some() {
                    let so_ref = LedgerRef::sales_order(sales_order_id);
                    let shipped = self
                        .ledger_total(conn, so.item_id, so_ref, LedgerEntryType::Shipment)
                        .await?;
                    if shipped == Decimal::ZERO {
                        gaps.push(LedgerGap {
                            production_order_id: order.production_order_id,
                            item_id: so.item_id,
                            gap_type: GapType::MissingShipment,
                            expected: so.quantity,
                            actual: Decimal::ZERO,
                        });
                    }
                }
            }
        }

        Ok(OrderReconciliation {
            production_order_id: order.production_order_id,
            status: order.status.clone(),
            gaps,
        })
    }

    async fn ledger_total<C: ConnectionTrait>(
        &self,
        conn: &C,
        item_id: i64,
        reference: LedgerRef<'_>,
        entry_type: LedgerEntryType,
    ) -> Result<Decimal, ServiceError> {
        let rows = InventoryTransactionEntity::find()
            .filter(inventory_transaction::Column::ItemId.eq(item_id))
            .filter(inventory_transaction::Column::ReferenceType.eq(reference.reference_type))
            .filter(inventory_transaction::Column::ReferenceId.eq(reference.reference_id))
            .filter(inventory_transaction::Column::EntryType.eq(entry_type.to_string()))
            .all(conn)
            .await?;
        Ok(rows.into_iter().map(|r| r.quantity).sum())
    }
}
