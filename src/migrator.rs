//! Inline migrations for the fulfillment schema.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_items_table::Migration),
            Box::new(m20240101_000002_create_bom_tables::Migration),
            Box::new(m20240101_000003_create_quotes_table::Migration),
            Box::new(m20240101_000004_create_sales_orders_table::Migration),
            Box::new(m20240101_000005_create_production_orders_table::Migration),
            Box::new(m20240101_000006_create_inventory_tables::Migration),
            Box::new(m20240101_000007_create_ledger_table::Migration),
            Box::new(m20240101_000008_create_production_costs_table::Migration),
        ]
    }
}

mod m20240101_000001_create_items_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_items_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Items::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Items::ItemId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Items::ItemNumber).string().not_null())
                        .col(ColumnDef::new(Items::Description).string())
                        .col(ColumnDef::new(Items::ItemType).string().not_null())
                        .col(ColumnDef::new(Items::ProcurementType).string().not_null())
                        .col(ColumnDef::new(Items::IsRawMaterial).boolean().not_null())
                        .col(ColumnDef::new(Items::TrackLots).boolean().not_null())
                        .col(ColumnDef::new(Items::TrackSerials).boolean().not_null())
                        .col(ColumnDef::new(Items::RequiresQc).boolean().not_null())
                        .col(ColumnDef::new(Items::MaterialType).string())
                        .col(ColumnDef::new(Items::Color).string())
                        .col(
                            ColumnDef::new(Items::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Items::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Items::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Items {
        Table,
        ItemId,
        ItemNumber,
        Description,
        ItemType,
        ProcurementType,
        IsRawMaterial,
        TrackLots,
        TrackSerials,
        RequiresQc,
        MaterialType,
        Color,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_bom_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_bom_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(BomHeaders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomHeaders::BomId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BomHeaders::BomName).string().not_null())
                        .col(ColumnDef::new(BomHeaders::ItemId).big_integer().not_null())
                        .col(ColumnDef::new(BomHeaders::Revision).string())
                        .col(ColumnDef::new(BomHeaders::StatusCode).string().not_null())
                        .col(
                            ColumnDef::new(BomHeaders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomHeaders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(BomLines::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(BomLines::BomLineId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(BomLines::BomId).big_integer().not_null())
                        .col(
                            ColumnDef::new(BomLines::ComponentItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomLines::QuantityPerUnit)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomLines::ScrapFactor)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(BomLines::ConsumeStage).string().not_null())
                        .col(ColumnDef::new(BomLines::IsCostOnly).boolean().not_null())
                        .col(ColumnDef::new(BomLines::UomCode).string())
                        .col(
                            ColumnDef::new(BomLines::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(BomLines::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(BomLines::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(BomHeaders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum BomHeaders {
        Table,
        BomId,
        BomName,
        ItemId,
        Revision,
        StatusCode,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum BomLines {
        Table,
        BomLineId,
        BomId,
        ComponentItemId,
        QuantityPerUnit,
        ScrapFactor,
        ConsumeStage,
        IsCostOnly,
        UomCode,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_quotes_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_quotes_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Quotes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Quotes::QuoteId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Quotes::QuoteNumber).string().not_null())
                        .col(ColumnDef::new(Quotes::CustomerId).big_integer().not_null())
                        .col(ColumnDef::new(Quotes::Status).string().not_null())
                        .col(ColumnDef::new(Quotes::MaterialType).string().not_null())
                        .col(ColumnDef::new(Quotes::Color).string().not_null())
                        .col(
                            ColumnDef::new(Quotes::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotes::UnitPrice)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotes::UnitWeightKg)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Quotes::ItemId).big_integer())
                        .col(
                            ColumnDef::new(Quotes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Quotes::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Quotes::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum Quotes {
        Table,
        QuoteId,
        QuoteNumber,
        CustomerId,
        Status,
        MaterialType,
        Color,
        Quantity,
        UnitPrice,
        UnitWeightKg,
        ItemId,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_sales_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_sales_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SalesOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SalesOrders::SalesOrderId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(SalesOrders::OrderNumber).string().not_null())
                        .col(
                            ColumnDef::new(SalesOrders::CustomerId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesOrders::ItemId).big_integer().not_null())
                        .col(
                            ColumnDef::new(SalesOrders::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesOrders::Status).string().not_null())
                        .col(
                            ColumnDef::new(SalesOrders::FulfillmentStatus)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SalesOrders::ShippedAt).timestamp_with_time_zone())
                        .col(ColumnDef::new(SalesOrders::Carrier).string())
                        .col(ColumnDef::new(SalesOrders::TrackingNumber).string())
                        .col(
                            ColumnDef::new(SalesOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SalesOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SalesOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum SalesOrders {
        Table,
        SalesOrderId,
        OrderNumber,
        CustomerId,
        ItemId,
        Quantity,
        Status,
        FulfillmentStatus,
        ShippedAt,
        Carrier,
        TrackingNumber,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_production_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_production_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionOrders::ProductionOrderId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::OrderNumber)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::SalesOrderId).big_integer())
                        .col(
                            ColumnDef::new(ProductionOrders::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::Status).string().not_null())
                        .col(ColumnDef::new(ProductionOrders::QcStatus).string())
                        .col(ColumnDef::new(ProductionOrders::QcFailureReason).string())
                        .col(
                            ColumnDef::new(ProductionOrders::QuantityOrdered)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::QuantityCompleted)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::QuantityScrapped)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::ActualHours).decimal())
                        .col(
                            ColumnDef::new(ProductionOrders::Priority)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::SourceOrderId).big_integer())
                        .col(
                            ColumnDef::new(ProductionOrders::LocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionOrders::StartedAt).timestamp_with_time_zone())
                        .col(
                            ColumnDef::new(ProductionOrders::CompletedAt)
                                .timestamp_with_time_zone(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionOrders::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProductionOrders {
        Table,
        ProductionOrderId,
        OrderNumber,
        SalesOrderId,
        ItemId,
        Status,
        QcStatus,
        QcFailureReason,
        QuantityOrdered,
        QuantityCompleted,
        QuantityScrapped,
        ActualHours,
        Priority,
        SourceOrderId,
        LocationId,
        StartedAt,
        CompletedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_inventory_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryBalances::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryBalances::InventoryBalanceId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::LocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::QuantityOnHand)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::QuantityAllocated)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::QuantityAvailable)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryBalances::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(MaterialInventory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialInventory::MaterialInventoryId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(MaterialInventory::MaterialType)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialInventory::Color).string().not_null())
                        .col(
                            ColumnDef::new(MaterialInventory::QuantityKg)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInventory::InStock)
                                .boolean()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInventory::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialInventory::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialInventory::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(InventoryBalances::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryBalances {
        Table,
        InventoryBalanceId,
        ItemId,
        LocationId,
        QuantityOnHand,
        QuantityAllocated,
        QuantityAvailable,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    pub enum MaterialInventory {
        Table,
        MaterialInventoryId,
        MaterialType,
        Color,
        QuantityKg,
        InStock,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000007_create_ledger_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_ledger_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(InventoryTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(InventoryTransactions::TransactionId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::EntryType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ItemId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::LocationId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::Quantity)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ReferenceType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(InventoryTransactions::ReferenceId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(InventoryTransactions::Notes).string())
                        .col(
                            ColumnDef::new(InventoryTransactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_inventory_transactions_reference")
                        .table(InventoryTransactions::Table)
                        .col(InventoryTransactions::ReferenceType)
                        .col(InventoryTransactions::ReferenceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum InventoryTransactions {
        Table,
        TransactionId,
        EntryType,
        ItemId,
        LocationId,
        Quantity,
        ReferenceType,
        ReferenceId,
        Notes,
        CreatedAt,
    }
}

mod m20240101_000008_create_production_costs_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000008_create_production_costs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionCosts::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionCosts::CostId)
                                .big_integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductionCosts::ProductionOrderId)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionCosts::CostType).string().not_null())
                        .col(
                            ColumnDef::new(ProductionCosts::Hours)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionCosts::HourlyRate)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionCosts::Amount)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionCosts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionCosts::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    pub enum ProductionCosts {
        Table,
        CostId,
        ProductionOrderId,
        CostType,
        Hours,
        HourlyRate,
        Amount,
        CreatedAt,
    }
}
