//! The per-user loyalty ledger.
//!
//! One document per user: lifetime spend, the unlocked tier set, the
//! currently selected tier, the points balance with its history, coupons,
//! and a stable referral code. The struct here is pure state and
//! mechanics; policy checks (positive amounts, debit limits, tier gating)
//! live in the loyalty service, which mutates ledgers inside the store's
//! atomic update.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use atelier_core::{Money, Tier, TierId, UserId};

/// Points granted once when a ledger is first created.
pub const SIGNUP_BONUS_POINTS: i64 = 100;

/// Whole currency units of spend that earn one point.
pub const SPEND_PER_POINT: i64 = 100;

/// Validity window of the welcome coupon, in days.
const WELCOME_COUPON_DAYS: i64 = 30;

/// A user's loyalty/rewards state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoyaltyLedger {
    pub user_id: UserId,
    /// Cumulative lifetime spend; monotonically non-decreasing.
    pub total_spent: Money,
    /// Tiers whose requirement `total_spent` has met. Never shrinks.
    pub unlocked_tiers: BTreeSet<TierId>,
    /// The tier whose discount applies at checkout, if any.
    ///
    /// Always a member of `unlocked_tiers` when set.
    pub selected_tier: Option<TierId>,
    pub points: i64,
    /// Append-only, newest first.
    pub points_history: Vec<PointsEntry>,
    pub coupons: Vec<Coupon>,
    /// Derived once at creation, stable for the user's lifetime.
    pub referral_code: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

/// One entry in the points history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointsEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PointsKind,
    pub title: String,
    /// Always positive; direction is carried by `kind`.
    pub amount: u64,
    pub date: DateTime<Utc>,
}

/// Direction of a points movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointsKind {
    Earn,
    Spent,
}

/// A percentage-off coupon attached to a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount_percent: u8,
    pub description: String,
    pub expiry_date: DateTime<Utc>,
    pub used: bool,
}

impl Coupon {
    /// Whether the coupon has expired as of `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expiry_date
    }
}

impl LoyaltyLedger {
    /// Build the default ledger minted on a user's first load: zero
    /// spend, bronze unlocked, the signup points bonus, one welcome
    /// coupon, and a fresh referral code.
    #[must_use]
    pub fn new_for(user_id: UserId, now: DateTime<Utc>) -> Self {
        let mut ledger = Self {
            user_id,
            total_spent: Money::ZERO,
            unlocked_tiers: BTreeSet::from([TierId::Bronze]),
            selected_tier: None,
            points: 0,
            points_history: Vec::new(),
            coupons: vec![Coupon {
                code: "WELCOME10".to_owned(),
                discount_percent: 10,
                description: "10% off your first order".to_owned(),
                expiry_date: now + Duration::days(WELCOME_COUPON_DAYS),
                used: false,
            }],
            referral_code: generate_referral_code(),
            created_at: now,
            last_updated: now,
        };
        ledger.record_points(SIGNUP_BONUS_POINTS, "Signup Bonus", now);
        ledger
    }

    /// Record a points movement that has already passed policy checks.
    ///
    /// Appends a history entry (newest first) and moves the balance.
    /// `amount` must be non-zero; callers enforce that and the
    /// no-negative-balance policy.
    pub fn record_points(&mut self, amount: i64, title: &str, now: DateTime<Utc>) {
        let kind = if amount > 0 {
            PointsKind::Earn
        } else {
            PointsKind::Spent
        };
        self.points_history.insert(
            0,
            PointsEntry {
                id: Uuid::new_v4().to_string(),
                kind,
                title: title.to_owned(),
                amount: amount.unsigned_abs(),
                date: now,
            },
        );
        self.points += amount;
    }

    /// Re-derive the unlocked tier set from lifetime spend.
    ///
    /// Only ever inserts; a tier once unlocked stays unlocked.
    pub fn recompute_unlocked(&mut self) {
        for tier in Tier::all() {
            if tier.unlocked_by(self.total_spent) {
                self.unlocked_tiers.insert(tier.id);
            }
        }
    }

    /// Progress toward unlocking a tier, as a percentage 0-100.
    ///
    /// Unlocked tiers report 100; locked tiers report spend over
    /// requirement, rounded half-up, capped at 100.
    #[must_use]
    pub fn card_progress(&self, tier_id: TierId) -> u8 {
        if self.unlocked_tiers.contains(&tier_id) {
            return 100;
        }
        let tier = Tier::get(tier_id);
        if tier.requirement == 0 {
            return 100;
        }
        let pct = (self.total_spent.amount() * rust_decimal::Decimal::from(100u8)
            / rust_decimal::Decimal::from(tier.requirement))
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
        use rust_decimal::prelude::ToPrimitive;
        pct.to_u8().map_or(100, |p| p.min(100))
    }
}

/// Generate a fresh referral code: fixed prefix plus eight random
/// uppercase alphanumerics.
fn generate_referral_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(8)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();
    format!("ATL-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_new_ledger_defaults() {
        let ledger = LoyaltyLedger::new_for(UserId::new("u1"), now());
        assert_eq!(ledger.total_spent, Money::ZERO);
        assert_eq!(ledger.unlocked_tiers, BTreeSet::from([TierId::Bronze]));
        assert_eq!(ledger.selected_tier, None);
        assert_eq!(ledger.points, SIGNUP_BONUS_POINTS);
        assert_eq!(ledger.points_history.len(), 1);
        assert_eq!(ledger.points_history[0].title, "Signup Bonus");
        assert_eq!(ledger.points_history[0].kind, PointsKind::Earn);
        assert_eq!(ledger.coupons.len(), 1);
        assert!(!ledger.coupons[0].is_expired(now()));
        assert!(ledger.referral_code.starts_with("ATL-"));
        assert_eq!(ledger.referral_code.len(), 12);
    }

    #[test]
    fn test_record_points_prepends_history() {
        let t = now();
        let mut ledger = LoyaltyLedger::new_for(UserId::new("u1"), t);
        ledger.record_points(20, "Order Purchase", t);
        ledger.record_points(-15, "Voucher Redemption", t);

        assert_eq!(ledger.points, SIGNUP_BONUS_POINTS + 20 - 15);
        // Newest first
        assert_eq!(ledger.points_history[0].title, "Voucher Redemption");
        assert_eq!(ledger.points_history[0].kind, PointsKind::Spent);
        assert_eq!(ledger.points_history[0].amount, 15);
        assert_eq!(ledger.points_history[1].title, "Order Purchase");
        assert_eq!(ledger.points_history[2].title, "Signup Bonus");
    }

    #[test]
    fn test_recompute_unlocked_inserts_never_removes() {
        let mut ledger = LoyaltyLedger::new_for(UserId::new("u1"), now());
        ledger.total_spent = Money::from_major(30_000);
        ledger.recompute_unlocked();
        assert_eq!(
            ledger.unlocked_tiers,
            BTreeSet::from([TierId::Bronze, TierId::Silver, TierId::Gold])
        );

        // Spend never decreases in practice; even if it did, unlocked
        // tiers are sticky
        ledger.total_spent = Money::ZERO;
        ledger.recompute_unlocked();
        assert!(ledger.unlocked_tiers.contains(&TierId::Gold));
    }

    #[test]
    fn test_card_progress() {
        let mut ledger = LoyaltyLedger::new_for(UserId::new("u1"), now());
        ledger.total_spent = Money::from_major(7500);
        ledger.recompute_unlocked();

        assert_eq!(ledger.card_progress(TierId::Bronze), 100);
        // 7500 / 15000 = 50%
        assert_eq!(ledger.card_progress(TierId::Silver), 50);
        // 7500 / 30000 = 25%
        assert_eq!(ledger.card_progress(TierId::Gold), 25);
        // 7500 / 60000 = 12.5% -> 13 (half-up)
        assert_eq!(ledger.card_progress(TierId::Platinum), 13);
    }

    #[test]
    fn test_coupon_expiry() {
        let t = now();
        let coupon = Coupon {
            code: "WELCOME10".to_owned(),
            discount_percent: 10,
            description: String::new(),
            expiry_date: t + Duration::days(1),
            used: false,
        };
        assert!(!coupon.is_expired(t));
        assert!(coupon.is_expired(t + Duration::days(2)));
    }

    #[test]
    fn test_points_history_serde_uses_type_field() {
        let t = now();
        let ledger = LoyaltyLedger::new_for(UserId::new("u1"), t);
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["points_history"][0]["type"], "earn");
    }
}
