use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::entities::ride::{self, RideStatus};

/// Hours an approved ride stays on the public board.
pub const BASE_WINDOW_HOURS: i64 = 12;
/// Extended window for rides published with a promo code.
pub const PROMO_WINDOW_HOURS: i64 = 24;

/// Visibility window for a ride, measured from its approval time.
pub fn visibility_window(has_promo: bool) -> Duration {
    if has_promo {
        Duration::hours(PROMO_WINDOW_HOURS)
    } else {
        Duration::hours(BASE_WINDOW_HOURS)
    }
}

/// An approved ride is expired strictly after its window has elapsed.
/// Expiry is never written back; the stored status stays `approved`.
/// A missing approval timestamp counts as not yet expired.
pub fn is_expired(ride: &ride::Model, now: DateTime<Utc>) -> bool {
    if ride.status != RideStatus::Approved {
        return false;
    }
    match ride.approved_at {
        Some(approved_at) => {
            now - approved_at.with_timezone(&Utc) > visibility_window(ride.promo_code.is_some())
        }
        None => false,
    }
}

/// A ride is publicly listed while it is approved, unexpired and owned by a
/// driver who is still verified.
pub fn is_listed(ride: &ride::Model, verified_drivers: &HashSet<Uuid>, now: DateTime<Utc>) -> bool {
    ride.status == RideStatus::Approved
        && !is_expired(ride, now)
        && verified_drivers.contains(&ride.driver_id)
}

/// Project raw ride rows onto the public board, newest first. Pure, so the
/// same snapshot always yields the same board.
pub fn public_board(
    mut rides: Vec<ride::Model>,
    verified_drivers: &HashSet<Uuid>,
    now: DateTime<Utc>,
) -> Vec<ride::Model> {
    rides.retain(|r| is_listed(r, verified_drivers, now));
    // Stable sort keeps insertion order for equal timestamps
    rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    rides
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ride_at(
        status: RideStatus,
        promo: Option<&str>,
        approved_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> ride::Model {
        ride::Model {
            id: Uuid::new_v4(),
            driver_id: Uuid::new_v4(),
            origin: "Tashkent".to_string(),
            destination: "Samarkand".to_string(),
            price: 100_000,
            seats: 3,
            departure_time: None,
            departure_note: None,
            promo_code: promo.map(|c| c.to_string()),
            status,
            rejection_reason: None,
            created_at: created_at.into(),
            approved_at: approved_at.map(Into::into),
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, 8, 0, 0).unwrap()
    }

    #[test]
    fn window_depends_on_promo() {
        assert_eq!(visibility_window(false), Duration::hours(12));
        assert_eq!(visibility_window(true), Duration::hours(24));
    }

    #[test]
    fn ride_without_promo_expires_after_12h() {
        let ride = ride_at(RideStatus::Approved, None, Some(t0()), t0());

        assert!(!is_expired(&ride, t0() + Duration::hours(11)));
        // Boundary is strict: at exactly +12h the ride is still live
        assert!(!is_expired(&ride, t0() + Duration::hours(12)));
        assert!(is_expired(&ride, t0() + Duration::hours(12) + Duration::seconds(1)));
        assert!(is_expired(&ride, t0() + Duration::hours(13)));
    }

    #[test]
    fn promo_ride_expires_after_24h() {
        let ride = ride_at(RideStatus::Approved, Some("SAVE24"), Some(t0()), t0());

        assert!(!is_expired(&ride, t0() + Duration::hours(23)));
        assert!(!is_expired(&ride, t0() + Duration::hours(24)));
        assert!(is_expired(&ride, t0() + Duration::hours(24) + Duration::seconds(1)));
    }

    #[test]
    fn missing_approval_timestamp_is_not_expired() {
        let ride = ride_at(RideStatus::Approved, None, None, t0());
        assert!(!is_expired(&ride, t0() + Duration::days(30)));
    }

    #[test]
    fn only_approved_rides_can_expire() {
        let pending = ride_at(RideStatus::Pending, None, Some(t0()), t0());
        let rejected = ride_at(RideStatus::Rejected, None, Some(t0()), t0());

        assert!(!is_expired(&pending, t0() + Duration::days(2)));
        assert!(!is_expired(&rejected, t0() + Duration::days(2)));
    }

    #[test]
    fn board_filters_and_orders() {
        let now = t0() + Duration::hours(11);

        let live = ride_at(RideStatus::Approved, None, Some(t0()), t0());
        let newer = ride_at(
            RideStatus::Approved,
            None,
            Some(t0() + Duration::hours(1)),
            t0() + Duration::hours(1),
        );
        let expired = ride_at(
            RideStatus::Approved,
            None,
            Some(t0() - Duration::hours(13)),
            t0() - Duration::hours(13),
        );
        let pending = ride_at(RideStatus::Pending, None, None, t0());
        let unverified = ride_at(RideStatus::Approved, None, Some(t0()), t0());

        let verified: HashSet<Uuid> =
            [live.driver_id, newer.driver_id, expired.driver_id, pending.driver_id]
                .into_iter()
                .collect();
        let (live_id, newer_id) = (live.id, newer.id);

        let board = public_board(
            vec![live, expired, pending, unverified, newer],
            &verified,
            now,
        );

        let ids: Vec<Uuid> = board.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![newer_id, live_id]);
    }

    #[test]
    fn expired_ride_keeps_stored_status() {
        let ride = ride_at(RideStatus::Approved, None, Some(t0()), t0());
        let later = t0() + Duration::hours(13);

        assert!(is_expired(&ride, later));
        assert_eq!(ride.status, RideStatus::Approved);
    }
}
