use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "promo_status")]
pub enum PromoStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "depleted")]
    Depleted,
}

/// A limited-use promo code. `expired` is a derived display state, the stored
/// status only tracks depletion.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promo_code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub expires_at: DateTimeWithTimeZone,
    pub status: PromoStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
