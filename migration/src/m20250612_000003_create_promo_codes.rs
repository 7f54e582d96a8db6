use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create promo code status enum
        manager
            .create_type(
                Type::create()
                    .as_enum(PromoStatus::Enum)
                    .values([PromoStatus::Active, PromoStatus::Depleted])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PromoCode::Table)
                    .if_not_exists()
                    .col(uuid(PromoCode::Id).primary_key())
                    .col(string_len(PromoCode::Code, 32).not_null().unique_key())
                    .col(integer(PromoCode::UsageLimit).not_null())
                    .col(integer(PromoCode::UsageCount).not_null().default(0))
                    .col(timestamp_with_time_zone(PromoCode::ExpiresAt).not_null())
                    .col(
                        ColumnDef::new(PromoCode::Status)
                            .custom(PromoStatus::Enum)
                            .not_null(),
                    )
                    .col(
                        timestamp_with_time_zone(PromoCode::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PromoCode::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(PromoStatus::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PromoCode {
    Table,
    Id,
    Code,
    UsageLimit,
    UsageCount,
    ExpiresAt,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum PromoStatus {
    #[sea_orm(iden = "promo_status")]
    Enum,
    #[sea_orm(iden = "active")]
    Active,
    #[sea_orm(iden = "depleted")]
    Depleted,
}
