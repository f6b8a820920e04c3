use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_vendors_table::Migration),
            Box::new(m20240301_000002_create_materials_table::Migration),
            Box::new(m20240301_000003_create_material_orders_table::Migration),
            Box::new(m20240301_000004_create_material_length_adjustments_table::Migration),
            Box::new(m20240301_000005_create_tickets_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_vendors_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_vendors_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Vendors::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Vendors::Email).string().null())
                        .col(ColumnDef::new(Vendors::Phone).string().null())
                        .col(ColumnDef::new(Vendors::Website).string().null())
                        .col(ColumnDef::new(Vendors::Notes).text().null())
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vendors::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Website,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_materials_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_materials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            let feet = |col: Materials| {
                ColumnDef::new(col)
                    .decimal()
                    .not_null()
                    .default(0)
                    .to_owned()
            };

            manager
                .create_table(
                    Table::create()
                        .table(Materials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Materials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Materials::Name).string().not_null())
                        .col(
                            ColumnDef::new(Materials::MaterialId)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Materials::Category).string().not_null())
                        .col(ColumnDef::new(Materials::VendorId).uuid().null())
                        .col(ColumnDef::new(Materials::Description).text().null())
                        .col(ColumnDef::new(Materials::Color).string().null())
                        .col(ColumnDef::new(Materials::Thickness).decimal().null())
                        .col(ColumnDef::new(Materials::Weight).decimal().null())
                        .col(ColumnDef::new(Materials::Width).decimal().null())
                        .col(ColumnDef::new(Materials::CostPerMsiCents).big_integer().null())
                        .col(
                            ColumnDef::new(Materials::FreightCostPerMsiCents)
                                .big_integer()
                                .null(),
                        )
                        .col(&mut feet(Materials::LowStockThreshold))
                        .col(&mut feet(Materials::LowStockBuffer))
                        .col(&mut feet(Materials::NetLengthAvailable))
                        .col(&mut feet(Materials::LengthArrived))
                        .col(&mut feet(Materials::LengthNotArrived))
                        .col(&mut feet(Materials::SumOfLengthAdjustments))
                        .col(
                            ColumnDef::new(Materials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Materials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_materials_vendor_id")
                                .from(Materials::Table, Materials::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_vendor_id")
                        .table(Materials::Table)
                        .col(Materials::VendorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_materials_category")
                        .table(Materials::Table)
                        .col(Materials::Category)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Materials::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum Materials {
        Table,
        Id,
        Name,
        MaterialId,
        Category,
        VendorId,
        Description,
        Color,
        Thickness,
        Weight,
        Width,
        CostPerMsiCents,
        FreightCostPerMsiCents,
        LowStockThreshold,
        LowStockBuffer,
        NetLengthAvailable,
        LengthArrived,
        LengthNotArrived,
        SumOfLengthAdjustments,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
    }
}

mod m20240301_000003_create_material_orders_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_material_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialOrders::MaterialId).uuid().not_null())
                        .col(ColumnDef::new(MaterialOrders::VendorId).uuid().null())
                        .col(
                            ColumnDef::new(MaterialOrders::PurchaseOrderNumber)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::OrderDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::ArrivalDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::FeetPerRoll)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::TotalRolls)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::HasArrived)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::FreightChargeCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::FuelChargeCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(MaterialOrders::Notes).text().null())
                        .col(
                            ColumnDef::new(MaterialOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_material_orders_material_id")
                                .from(MaterialOrders::Table, MaterialOrders::MaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_material_orders_vendor_id")
                                .from(MaterialOrders::Table, MaterialOrders::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_orders_material_id")
                        .table(MaterialOrders::Table)
                        .col(MaterialOrders::MaterialId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_orders_has_arrived")
                        .table(MaterialOrders::Table)
                        .col(MaterialOrders::HasArrived)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(MaterialOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaterialOrders {
        Table,
        Id,
        MaterialId,
        VendorId,
        PurchaseOrderNumber,
        OrderDate,
        ArrivalDate,
        FeetPerRoll,
        TotalRolls,
        HasArrived,
        FreightChargeCents,
        FuelChargeCents,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }

    #[derive(DeriveIden)]
    enum Vendors {
        Table,
        Id,
    }
}

mod m20240301_000004_create_material_length_adjustments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_material_length_adjustments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(MaterialLengthAdjustments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(MaterialLengthAdjustments::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialLengthAdjustments::MaterialId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(MaterialLengthAdjustments::Length)
                                .decimal()
                                .not_null(),
                        )
                        .col(ColumnDef::new(MaterialLengthAdjustments::Notes).text().null())
                        .col(
                            ColumnDef::new(MaterialLengthAdjustments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_material_length_adjustments_material_id")
                                .from(
                                    MaterialLengthAdjustments::Table,
                                    MaterialLengthAdjustments::MaterialId,
                                )
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_material_length_adjustments_material_id")
                        .table(MaterialLengthAdjustments::Table)
                        .col(MaterialLengthAdjustments::MaterialId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(
                    Table::drop()
                        .table(MaterialLengthAdjustments::Table)
                        .to_owned(),
                )
                .await
        }
    }

    #[derive(DeriveIden)]
    enum MaterialLengthAdjustments {
        Table,
        Id,
        MaterialId,
        Length,
        Notes,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }
}

mod m20240301_000005_create_tickets_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_tickets_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Tickets::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Tickets::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Tickets::TicketNumber)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Tickets::PrimaryMaterialId).uuid().null())
                        .col(ColumnDef::new(Tickets::Department).string().not_null())
                        .col(ColumnDef::new(Tickets::DepartmentStatus).string().null())
                        .col(
                            ColumnDef::new(Tickets::TotalMaterialLength)
                                .decimal()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Tickets::Notes).text().null())
                        .col(
                            ColumnDef::new(Tickets::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Tickets::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_tickets_primary_material_id")
                                .from(Tickets::Table, Tickets::PrimaryMaterialId)
                                .to(Materials::Table, Materials::Id)
                                .on_delete(ForeignKeyAction::SetNull)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tickets_primary_material_id")
                        .table(Tickets::Table)
                        .col(Tickets::PrimaryMaterialId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_tickets_department")
                        .table(Tickets::Table)
                        .col(Tickets::Department)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Tickets::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Tickets {
        Table,
        Id,
        TicketNumber,
        PrimaryMaterialId,
        Department,
        DepartmentStatus,
        TotalMaterialLength,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum Materials {
        Table,
        Id,
    }
}
