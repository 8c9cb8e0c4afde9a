use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{info, instrument};

use crate::{
    entities::production_order,
    errors::ServiceError,
    events::{Event, EventSender},
    services::production::{cascade_ready_to_ship, ProductionService},
    state::{ensure_production_transition, parse_status, ProductionStatus, QcStatus},
};

/// What happens to a print that fails inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureDisposition {
    /// Keep the order on hold for rework or a supervisor decision.
    Hold,
    /// Write the order off and spawn a remake for the shortfall.
    Scrap,
}

#[derive(Debug, Clone, Serialize)]
pub struct QcPassResult {
    pub production_order_id: i64,
    pub new_status: String,
    pub sales_order_fulfillment_status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QcFailResult {
    pub production_order_id: i64,
    pub new_status: String,
    pub remake_order_id: Option<i64>,
}

/// Quality-control verdicts on printed orders. QC never moves inventory:
/// consumption and receipt were already recorded at completion, so a pass is
/// purely a status change and a fail either holds the order or scraps it and
/// spawns a remake.
#[derive(Clone)]
pub struct QcService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl QcService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// printed -> completed. Cascades sales-order readiness when this was the
    /// last live production line.
    #[instrument(skip(self))]
    pub async fn pass_qc(
        &self,
        order_id: i64,
        notes: Option<String>,
    ) -> Result<QcPassResult, ServiceError> {
        let txn = self.db.begin().await?;

        let order = ProductionService::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        if !matches!(status, ProductionStatus::Printed | ProductionStatus::QcHold) {
            return Err(ServiceError::InvalidState(format!(
                "production order {} is not awaiting QC (status {})",
                order_id, status
            )));
        }
        ensure_production_transition(order_id, status, ProductionStatus::Completed)?;

        let sales_order_id = order.sales_order_id;
        let mut active: production_order::ActiveModel = order.into();
        active.status = Set(ProductionStatus::Completed.to_string());
        active.qc_status = Set(Some(QcStatus::Passed.to_string()));
        active.qc_failure_reason = Set(notes);
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        let mut fulfillment = None;
        if let Some(sales_order_id) = sales_order_id {
            fulfillment = cascade_ready_to_ship(&txn, sales_order_id).await?;
        }

        txn.commit().await?;

        counter!("fulfillment.qc.passed", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::QcPassed {
                    production_order_id: order_id,
                })
                .await;
            if let (Some(id), Some(status)) = (sales_order_id, fulfillment) {
                if status == crate::state::FulfillmentStatus::ReadyToShip {
                    sender
                        .send_or_log(Event::OrderReadyToShip { sales_order_id: id })
                        .await;
                }
            }
        }
        info!(order_id, "QC passed");

        Ok(QcPassResult {
            production_order_id: order_id,
            new_status: updated.status,
            sales_order_fulfillment_status: fulfillment.map(|s| s.to_string()),
        })
    }

    /// Records a QC failure. `Hold` parks the order in `qc_hold`; `Scrap`
    /// writes it off and spawns a remake production order for the shortfall
    /// (ordered minus good units), at elevated priority and linked back via
    /// `source_order_id`. The remake re-reserves material when it starts, so
    /// rebuild cost is visible in the ledger rather than hidden.
    #[instrument(skip(self))]
    pub async fn fail_qc(
        &self,
        order_id: i64,
        failure_reason: String,
        disposition: FailureDisposition,
    ) -> Result<QcFailResult, ServiceError> {
        if failure_reason.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "QC failure requires a reason".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let order = ProductionService::find_order_for_update(&txn, order_id).await?;
        let status: ProductionStatus = parse_status(&order.status, "production order")?;
        let target = match disposition {
            FailureDisposition::Hold => ProductionStatus::QcHold,
            FailureDisposition::Scrap => ProductionStatus::Scrapped,
        };
        ensure_production_transition(order_id, status, target)?;

        let mut remake_order_id = None;
        let mut remake_quantity = Decimal::ZERO;
        if disposition == FailureDisposition::Scrap {
            let shortfall = order.quantity_ordered - order.quantity_completed;
            if shortfall > Decimal::ZERO {
                let now = Utc::now();
                let remake = production_order::ActiveModel {
                    order_number: Set(format!("{}-R", order.order_number)),
                    sales_order_id: Set(order.sales_order_id),
                    item_id: Set(order.item_id),
                    status: Set(ProductionStatus::Draft.to_string()),
                    quantity_ordered: Set(shortfall),
                    quantity_completed: Set(Decimal::ZERO),
                    quantity_scrapped: Set(Decimal::ZERO),
                    priority: Set(order.priority + 1),
                    source_order_id: Set(Some(order_id)),
                    location_id: Set(order.location_id),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
                remake_order_id = Some(remake.production_order_id);
                remake_quantity = shortfall;
            }
        }

        let mut active: production_order::ActiveModel = order.into();
        active.status = Set(target.to_string());
        active.qc_status = Set(Some(QcStatus::Failed.to_string()));
        active.qc_failure_reason = Set(Some(failure_reason.clone()));
        active.updated_at = Set(Utc::now().into());
        let updated = active.update(&txn).await?;

        txn.commit().await?;

        counter!("fulfillment.qc.failed", 1);
        if let Some(sender) = &self.event_sender {
            sender
                .send_or_log(Event::QcFailed {
                    production_order_id: order_id,
                    reason: failure_reason,
                })
                .await;
            if let Some(remake_id) = remake_order_id {
                sender
                    .send_or_log(Event::RemakeCreated {
                        production_order_id: remake_id,
                        source_order_id: order_id,
                        quantity: remake_quantity,
                    })
                    .await;
            }
        }
        info!(order_id, ?disposition, remake = ?remake_order_id, "QC failed");

        Ok(QcFailResult {
            production_order_id: order_id,
            new_status: updated.status,
            remake_order_id,
        })
    }
}
