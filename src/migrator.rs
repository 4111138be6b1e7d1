use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_custom_fields_table::Migration),
            Box::new(m20240101_000002_create_field_configs_table::Migration),
            Box::new(m20240101_000003_create_phones_table::Migration),
            Box::new(m20240101_000004_create_customers_table::Migration),
            Box::new(m20240101_000005_create_orders_table::Migration),
            Box::new(m20240101_000006_create_inquiries_table::Migration),
        ]
    }
}

mod m20240101_000001_create_custom_fields_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_custom_fields_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(CustomFields::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(CustomFields::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(CustomFields::TableName).string_len(20).not_null())
                        .col(ColumnDef::new(CustomFields::FieldName).string().not_null())
                        .col(ColumnDef::new(CustomFields::FieldLabel).string().not_null())
                        .col(ColumnDef::new(CustomFields::FieldType).string_len(16).not_null())
                        .col(ColumnDef::new(CustomFields::Options).json().null())
                        .col(
                            ColumnDef::new(CustomFields::Required)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(CustomFields::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // One definition per (entity type, field name)
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_custom_fields_table_field")
                        .table(CustomFields::Table)
                        .col(CustomFields::TableName)
                        .col(CustomFields::FieldName)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(CustomFields::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum CustomFields {
        Table,
        Id,
        TableName,
        FieldName,
        FieldLabel,
        FieldType,
        Options,
        Required,
        CreatedAt,
    }
}

mod m20240101_000002_create_field_configs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_field_configs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FieldConfigs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FieldConfigs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FieldConfigs::TableName).string_len(20).not_null())
                        .col(ColumnDef::new(FieldConfigs::FieldName).string().not_null())
                        .col(ColumnDef::new(FieldConfigs::FieldLabel).string().not_null())
                        .col(ColumnDef::new(FieldConfigs::FieldType).string_len(16).not_null())
                        .col(
                            ColumnDef::new(FieldConfigs::IsSystem)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(FieldConfigs::IsVisible)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(FieldConfigs::IsRequired)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(FieldConfigs::DisplayOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(FieldConfigs::Options).json().null())
                        .col(ColumnDef::new(FieldConfigs::Placeholder).string().null())
                        .col(ColumnDef::new(FieldConfigs::Section).string().null())
                        .col(
                            ColumnDef::new(FieldConfigs::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(FieldConfigs::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .unique()
                        .name("idx_field_configs_table_field")
                        .table(FieldConfigs::Table)
                        .col(FieldConfigs::TableName)
                        .col(FieldConfigs::FieldName)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_field_configs_table_order")
                        .table(FieldConfigs::Table)
                        .col(FieldConfigs::TableName)
                        .col(FieldConfigs::DisplayOrder)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FieldConfigs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum FieldConfigs {
        Table,
        Id,
        TableName,
        FieldName,
        FieldLabel,
        FieldType,
        IsSystem,
        IsVisible,
        IsRequired,
        DisplayOrder,
        Options,
        Placeholder,
        Section,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_phones_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_phones_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Phones::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Phones::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Phones::Brand).string().not_null())
                        .col(ColumnDef::new(Phones::Model).string().not_null())
                        .col(ColumnDef::new(Phones::Storage).string().null())
                        .col(ColumnDef::new(Phones::Color).string().null())
                        .col(
                            ColumnDef::new(Phones::Condition)
                                .string_len(16)
                                .not_null()
                                .default("good"),
                        )
                        .col(
                            ColumnDef::new(Phones::Price)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Phones::Stock).integer().not_null().default(1))
                        .col(
                            ColumnDef::new(Phones::Status)
                                .string_len(16)
                                .not_null()
                                .default("available"),
                        )
                        .col(ColumnDef::new(Phones::Imei).string().null())
                        .col(ColumnDef::new(Phones::Description).text().null())
                        .col(ColumnDef::new(Phones::ImageUrl).string().null())
                        .col(ColumnDef::new(Phones::CustomData).json().not_null())
                        .col(ColumnDef::new(Phones::Version).integer().not_null().default(1))
                        .col(
                            ColumnDef::new(Phones::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Phones::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_phones_brand")
                        .table(Phones::Table)
                        .col(Phones::Brand)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_phones_status")
                        .table(Phones::Table)
                        .col(Phones::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Phones::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Phones {
        Table,
        Id,
        Brand,
        Model,
        Storage,
        Color,
        Condition,
        Price,
        Stock,
        Status,
        Imei,
        Description,
        ImageUrl,
        CustomData,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_customers_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_customers_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Customers::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Customers::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Customers::Name).string().not_null())
                        .col(ColumnDef::new(Customers::Email).string().null())
                        .col(ColumnDef::new(Customers::Phone).string().null())
                        .col(ColumnDef::new(Customers::Address).text().null())
                        .col(ColumnDef::new(Customers::Notes).text().null())
                        .col(ColumnDef::new(Customers::CustomData).json().not_null())
                        .col(
                            ColumnDef::new(Customers::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Customers::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Customers::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_customers_email")
                        .table(Customers::Table)
                        .col(Customers::Email)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Customers::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Customers {
        Table,
        Id,
        Name,
        Email,
        Phone,
        Address,
        Notes,
        CustomData,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_orders_table {

    use super::m20240101_000003_create_phones_table::Phones;
    use super::m20240101_000004_create_customers_table::Customers;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_orders_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::CustomerId).uuid().null())
                        .col(ColumnDef::new(Orders::PhoneId).uuid().null())
                        .col(ColumnDef::new(Orders::Quantity).integer().not_null().default(1))
                        .col(
                            ColumnDef::new(Orders::TotalAmount)
                                .decimal_len(12, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::Status)
                                .string_len(16)
                                .not_null()
                                .default("pending"),
                        )
                        .col(ColumnDef::new(Orders::PaymentMethod).string().null())
                        .col(ColumnDef::new(Orders::Notes).text().null())
                        .col(ColumnDef::new(Orders::CustomData).json().not_null())
                        .col(ColumnDef::new(Orders::Version).integer().not_null().default(1))
                        .col(
                            ColumnDef::new(Orders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Orders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_customer_id")
                                .from(Orders::Table, Orders::CustomerId)
                                .to(Customers::Table, Customers::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_orders_phone_id")
                                .from(Orders::Table, Orders::PhoneId)
                                .to(Phones::Table, Phones::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_customer_id")
                        .table(Orders::Table)
                        .col(Orders::CustomerId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Orders {
        Table,
        Id,
        CustomerId,
        PhoneId,
        Quantity,
        TotalAmount,
        Status,
        PaymentMethod,
        Notes,
        CustomData,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_inquiries_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_inquiries_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Inquiries::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Inquiries::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Inquiries::Name).string().not_null())
                        .col(ColumnDef::new(Inquiries::Email).string().null())
                        .col(ColumnDef::new(Inquiries::Phone).string().null())
                        .col(ColumnDef::new(Inquiries::PhoneModel).string().null())
                        .col(ColumnDef::new(Inquiries::Message).text().not_null())
                        .col(
                            ColumnDef::new(Inquiries::Status)
                                .string_len(16)
                                .not_null()
                                .default("new"),
                        )
                        .col(ColumnDef::new(Inquiries::Source).string().null())
                        .col(ColumnDef::new(Inquiries::CustomData).json().not_null())
                        .col(
                            ColumnDef::new(Inquiries::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .col(
                            ColumnDef::new(Inquiries::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Inquiries::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_inquiries_status")
                        .table(Inquiries::Table)
                        .col(Inquiries::Status)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Inquiries::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Inquiries {
        Table,
        Id,
        Name,
        Email,
        Phone,
        PhoneModel,
        Message,
        Status,
        Source,
        CustomData,
        Version,
        CreatedAt,
        UpdatedAt,
    }
}
