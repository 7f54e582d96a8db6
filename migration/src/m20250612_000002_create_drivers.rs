use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250612_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create driver verification status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(DriverStatus::Enum)
                    .values([
                        DriverStatus::Unsubmitted,
                        DriverStatus::Pending,
                        DriverStatus::Verified,
                        DriverStatus::Rejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Driver::Table)
                    .if_not_exists()
                    // Driver id doubles as the account id
                    .col(uuid(Driver::Id).primary_key())
                    .col(string_len(Driver::FullName, 100).not_null())
                    .col(string_len(Driver::PassportNumber, 32).not_null())
                    .col(string_len(Driver::VehicleModel, 100).not_null())
                    .col(string_len(Driver::VehiclePlate, 16).not_null())
                    .col(ColumnDef::new(Driver::VehiclePhotoRef).text().null())
                    .col(
                        ColumnDef::new(Driver::Status)
                            .custom(DriverStatus::Enum)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Driver::RejectionReason).text().null())
                    .col(
                        timestamp_with_time_zone(Driver::SubmittedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Driver::ReviewedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_driver_user")
                            .from(Driver::Table, Driver::Id)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Driver::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(DriverStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Driver {
    Table,
    Id,
    FullName,
    PassportNumber,
    VehicleModel,
    VehiclePlate,
    VehiclePhotoRef,
    Status,
    RejectionReason,
    SubmittedAt,
    ReviewedAt,
}

#[derive(DeriveIden)]
pub enum DriverStatus {
    #[sea_orm(iden = "driver_status")]
    Enum,
    #[sea_orm(iden = "unsubmitted")]
    Unsubmitted,
    #[sea_orm(iden = "pending")]
    Pending,
    #[sea_orm(iden = "verified")]
    Verified,
    #[sea_orm(iden = "rejected")]
    Rejected,
}
