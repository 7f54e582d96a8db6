use sea_orm_migration::{prelude::*, schema::*, sea_orm::sea_query::extension::postgres::Type};

use super::m20250612_000001_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create message kind enum
        manager
            .create_type(
                Type::create()
                    .as_enum(MessageKind::Enum)
                    .values([
                        MessageKind::RegistrationPending,
                        MessageKind::RegistrationApproved,
                        MessageKind::RegistrationRejected,
                        MessageKind::AccountBlocked,
                        MessageKind::RideCreated,
                        MessageKind::RideApproved,
                        MessageKind::RideRejected,
                        MessageKind::OrderAccepted,
                        MessageKind::OrderRejected,
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(uuid(Message::Id).primary_key())
                    .col(uuid(Message::RecipientId).not_null())
                    .col(
                        ColumnDef::new(Message::Kind)
                            .custom(MessageKind::Enum)
                            .not_null(),
                    )
                    .col(json_binary(Message::Params).not_null())
                    .col(
                        timestamp_with_time_zone(Message::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_message_recipient")
                            .from(Message::Table, Message::RecipientId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await?;

        manager
            .drop_type(Type::drop().name(MessageKind::Enum).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Message {
    Table,
    Id,
    RecipientId,
    Kind,
    Params,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum MessageKind {
    #[sea_orm(iden = "message_kind")]
    Enum,
    #[sea_orm(iden = "registration_pending")]
    RegistrationPending,
    #[sea_orm(iden = "registration_approved")]
    RegistrationApproved,
    #[sea_orm(iden = "registration_rejected")]
    RegistrationRejected,
    #[sea_orm(iden = "account_blocked")]
    AccountBlocked,
    #[sea_orm(iden = "ride_created")]
    RideCreated,
    #[sea_orm(iden = "ride_approved")]
    RideApproved,
    #[sea_orm(iden = "ride_rejected")]
    RideRejected,
    #[sea_orm(iden = "order_accepted")]
    OrderAccepted,
    #[sea_orm(iden = "order_rejected")]
    OrderRejected,
}
