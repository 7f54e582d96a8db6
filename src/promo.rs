use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::promo_code::{self, PromoStatus};
use crate::error::{AppError, AppResult};

const CODE_LEN: usize = 8;
const CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CREATE_ATTEMPTS: usize = 5;

/// Generate a random uppercase alphanumeric code.
pub fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

/// Codes are stored and matched in uppercase.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Display status of a code. `Expired` is derived from the clock; the stored
/// status only ever moves active -> depleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromoDisplayStatus {
    Active,
    Expired,
    Depleted,
}

pub fn display_status(promo: &promo_code::Model, now: DateTime<Utc>) -> PromoDisplayStatus {
    if now >= promo.expires_at.with_timezone(&Utc) {
        PromoDisplayStatus::Expired
    } else if promo.status == PromoStatus::Depleted || promo.usage_count >= promo.usage_limit {
        PromoDisplayStatus::Depleted
    } else {
        PromoDisplayStatus::Active
    }
}

/// Create a new code, retrying generation on the rare unique-key collision.
pub async fn create_code(
    db: &DatabaseConnection,
    usage_limit: i32,
    validity_hours: i64,
) -> AppResult<promo_code::Model> {
    if usage_limit <= 0 {
        return Err(AppError::Validation("Usage limit must be positive".to_string()));
    }
    if validity_hours <= 0 {
        return Err(AppError::Validation("Validity must be positive".to_string()));
    }

    let expires_at = Utc::now() + Duration::hours(validity_hours);

    for _ in 0..CREATE_ATTEMPTS {
        let code = generate_code();

        let taken = promo_code::Entity::find()
            .filter(promo_code::Column::Code.eq(&code))
            .one(db)
            .await?;
        if taken.is_some() {
            continue;
        }

        let new_code = promo_code::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            usage_limit: Set(usage_limit),
            usage_count: Set(0),
            expires_at: Set(expires_at.into()),
            status: Set(PromoStatus::Active),
            ..Default::default()
        };

        return Ok(new_code.insert(db).await?);
    }

    Err(AppError::Internal("Could not generate a unique promo code".to_string()))
}

/// Redeem one use of `code` inside the caller's transaction.
///
/// The row is locked for the duration of the transaction, so the count
/// increment and the depletion flip commit together and two concurrent
/// redemptions of the last use cannot both succeed.
pub async fn redeem(txn: &DatabaseTransaction, raw_code: &str) -> AppResult<promo_code::Model> {
    let code = normalize_code(raw_code);
    let now = Utc::now();

    let promo = promo_code::Entity::find()
        .filter(promo_code::Column::Code.eq(&code))
        .lock_exclusive()
        .one(txn)
        .await?
        .ok_or(AppError::PromoNotFound)?;

    if now >= promo.expires_at.with_timezone(&Utc) {
        return Err(AppError::PromoExpired);
    }
    if promo.status == PromoStatus::Depleted || promo.usage_count >= promo.usage_limit {
        return Err(AppError::PromoDepleted);
    }

    let usage_limit = promo.usage_limit;
    let next_count = promo.usage_count + 1;

    let mut active: promo_code::ActiveModel = promo.into();
    active.usage_count = Set(next_count);
    if next_count >= usage_limit {
        active.status = Set(PromoStatus::Depleted);
    }

    Ok(active.update(txn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn promo(usage_limit: i32, usage_count: i32, status: PromoStatus, expires_at: DateTime<Utc>) -> promo_code::Model {
        promo_code::Model {
            id: Uuid::new_v4(),
            code: "SAVE24".to_string(),
            usage_limit,
            usage_count,
            expires_at: expires_at.into(),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap().into(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 13, 8, 0, 0).unwrap()
    }

    #[test]
    fn generated_codes_are_uppercase_alphanumeric() {
        for _ in 0..50 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn normalization_uppercases_and_trims() {
        assert_eq!(normalize_code(" save24 "), "SAVE24");
        assert_eq!(normalize_code("Save24"), "SAVE24");
    }

    #[test]
    fn fresh_code_displays_active() {
        let p = promo(5, 0, PromoStatus::Active, now() + Duration::hours(1));
        assert_eq!(display_status(&p, now()), PromoDisplayStatus::Active);
    }

    #[test]
    fn past_expiry_displays_expired_even_while_stored_active() {
        let p = promo(5, 0, PromoStatus::Active, now() - Duration::seconds(1));
        assert_eq!(p.status, PromoStatus::Active);
        assert_eq!(display_status(&p, now()), PromoDisplayStatus::Expired);
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let p = promo(5, 0, PromoStatus::Active, now());
        assert_eq!(display_status(&p, now()), PromoDisplayStatus::Expired);
    }

    #[test]
    fn used_up_code_displays_depleted() {
        let flagged = promo(3, 3, PromoStatus::Depleted, now() + Duration::hours(1));
        assert_eq!(display_status(&flagged, now()), PromoDisplayStatus::Depleted);

        // Count at the limit wins even if the stored flag never flipped
        let unflagged = promo(3, 3, PromoStatus::Active, now() + Duration::hours(1));
        assert_eq!(display_status(&unflagged, now()), PromoDisplayStatus::Depleted);
    }

    #[test]
    fn expired_takes_precedence_over_depleted() {
        let p = promo(1, 1, PromoStatus::Depleted, now() - Duration::hours(1));
        assert_eq!(display_status(&p, now()), PromoDisplayStatus::Expired);
    }
}
