//! SeaORM entities backing the fulfillment core.

pub mod bom_header;
pub mod bom_line;
pub mod inventory_balance;
pub mod inventory_transaction;
pub mod item_master;
pub mod material_inventory;
pub mod production_cost;
pub mod production_order;
pub mod quote;
pub mod sales_order;
