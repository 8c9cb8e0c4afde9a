//! Status enums and the allowed-transition tables for the fulfillment
//! lifecycle. Entities persist these as strings; services parse them back
//! through `FromStr` and refuse any transition not listed here.

use std::str::FromStr;

use strum::{Display, EnumIter, EnumString};

use crate::errors::ServiceError;

/// Manufacturing-facing state machine for a production order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ProductionStatus {
    Draft,
    Released,
    Scheduled,
    Confirmed,
    InProgress,
    /// Finished printing, awaiting QC.
    Printed,
    Completed,
    QcHold,
    Scrapped,
    Cancelled,
}

impl ProductionStatus {
    /// The explicit allowed-transition table. Anything not listed is illegal.
    pub fn can_transition_to(self, next: ProductionStatus) -> bool {
        use ProductionStatus::*;
        matches!(
            (self, next),
            (Draft, Released)
                | (Draft, Cancelled)
                | (Released, Scheduled)
                | (Released, InProgress)
                | (Released, Cancelled)
                | (Scheduled, Confirmed)
                | (Scheduled, InProgress)
                | (Scheduled, Cancelled)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (InProgress, Printed)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Printed, Completed)
                | (Printed, QcHold)
                | (Printed, Scrapped)
                | (QcHold, Completed)
                | (QcHold, Scrapped)
        )
    }

    /// Statuses from which production may be started (reservation made).
    pub fn can_start_production(self) -> bool {
        matches!(
            self,
            ProductionStatus::Released | ProductionStatus::Scheduled | ProductionStatus::Confirmed
        )
    }

    /// True once the order has recorded consumption and receipt.
    pub fn is_past_completion(self) -> bool {
        matches!(
            self,
            ProductionStatus::Printed
                | ProductionStatus::Completed
                | ProductionStatus::QcHold
                | ProductionStatus::Scrapped
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ProductionStatus::Completed | ProductionStatus::Scrapped | ProductionStatus::Cancelled
        )
    }
}

/// Internal logistics status on a sales order, distinct from the
/// customer-facing order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FulfillmentStatus {
    Pending,
    InProduction,
    ReadyToShip,
    Shipped,
    Closed,
}

impl FulfillmentStatus {
    pub fn can_transition_to(self, next: FulfillmentStatus) -> bool {
        use FulfillmentStatus::*;
        matches!(
            (self, next),
            (Pending, InProduction)
                | (InProduction, ReadyToShip)
                | (ReadyToShip, Shipped)
                | (Shipped, Closed)
        )
    }
}

/// Customer-facing sales order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum SalesOrderStatus {
    Draft,
    Confirmed,
    Cancelled,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum QuoteStatus {
    Open,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum QcStatus {
    Pending,
    Passed,
    Failed,
}

/// Lifecycle point at which a BOM line is deducted from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ConsumeStage {
    Production,
    Shipping,
}

/// Item category; consumption behavior is driven by the capability flags on
/// the item record rather than by type checks scattered through services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ItemType {
    FinishedGood,
    Component,
    Supply,
    Service,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ProcurementType {
    Make,
    Buy,
}

/// Ledger entry types for the append-only inventory transaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum LedgerEntryType {
    Reservation,
    Release,
    Consumption,
    Receipt,
    Shipment,
    Scrap,
}

/// Parses a persisted status string, surfacing corrupt rows as internal
/// errors rather than panics.
pub fn parse_status<T: FromStr>(raw: &str, entity: &str) -> Result<T, ServiceError> {
    T::from_str(raw)
        .map_err(|_| ServiceError::InternalError(format!("unknown {} status '{}'", entity, raw)))
}

/// Guard used by every transition handler: errors unless `from -> to` is in
/// the allowed-transition table.
pub fn ensure_production_transition(
    order_id: i64,
    from: ProductionStatus,
    to: ProductionStatus,
) -> Result<(), ServiceError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(format!(
            "production order {} cannot move from {} to {}",
            order_id, from, to
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn production_transitions_follow_table() {
        use ProductionStatus::*;
        assert!(Draft.can_transition_to(Released));
        assert!(Released.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Printed));
        assert!(Printed.can_transition_to(Completed));
        assert!(Printed.can_transition_to(Scrapped));
        assert!(QcHold.can_transition_to(Completed));

        // Completion is one-way: no route back into in_progress.
        assert!(!Printed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Completed.can_transition_to(Printed));
        // Cancellation never reverses consumption.
        assert!(!Printed.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Draft.can_transition_to(InProgress));
    }

    #[test]
    fn start_guard_allows_schedulable_states() {
        use ProductionStatus::*;
        for status in [Released, Scheduled, Confirmed] {
            assert!(status.can_start_production());
        }
        for status in [Draft, InProgress, Printed, Completed, Cancelled] {
            assert!(!status.can_start_production());
        }
    }

    #[test]
    fn fulfillment_is_strictly_forward() {
        use FulfillmentStatus::*;
        assert!(Pending.can_transition_to(InProduction));
        assert!(ReadyToShip.can_transition_to(Shipped));
        assert!(!Shipped.can_transition_to(ReadyToShip));
        assert!(!Pending.can_transition_to(Shipped));
    }

    #[test]
    fn status_strings_round_trip() {
        assert_eq!(ProductionStatus::InProgress.to_string(), "in_progress");
        assert_eq!(
            parse_status::<ProductionStatus>("in_progress", "production order").unwrap(),
            ProductionStatus::InProgress
        );
        assert_eq!(LedgerEntryType::Reservation.to_string(), "reservation");
        assert_eq!(ConsumeStage::Shipping.to_string(), "shipping");
        assert!(parse_status::<ProductionStatus>("bogus", "production order").is_err());
    }
}
