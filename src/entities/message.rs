use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "message_kind")]
pub enum MessageKind {
    #[sea_orm(string_value = "registration_pending")]
    RegistrationPending,
    #[sea_orm(string_value = "registration_approved")]
    RegistrationApproved,
    #[sea_orm(string_value = "registration_rejected")]
    RegistrationRejected,
    #[sea_orm(string_value = "account_blocked")]
    AccountBlocked,
    #[sea_orm(string_value = "ride_created")]
    RideCreated,
    #[sea_orm(string_value = "ride_approved")]
    RideApproved,
    #[sea_orm(string_value = "ride_rejected")]
    RideRejected,
    #[sea_orm(string_value = "order_accepted")]
    OrderAccepted,
    #[sea_orm(string_value = "order_rejected")]
    OrderRejected,
}

/// Append-only notification record. Title/body are rendered from `kind` and
/// `params` at read time, never stored.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: MessageKind,
    pub params: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::RecipientId",
        to = "super::user::Column::Id"
    )]
    Recipient,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipient.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
