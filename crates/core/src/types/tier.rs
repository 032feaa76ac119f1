//! The static loyalty tier catalog.
//!
//! Four tiers, totally ordered by their lifetime-spend requirement.
//! The catalog is compile-time data; nothing in the system mutates it.
//! Iteration via [`Tier::all`] is always ascending by requirement, which
//! "next tier" progress computations rely on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::money::Money;

/// Error parsing a tier id string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tier: {0}")]
pub struct TierParseError(pub String);

/// Identifier of a loyalty tier.
///
/// Declaration order matches ascending spend requirement, so the derived
/// `Ord` agrees with the catalog ordering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum TierId {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl std::fmt::Display for TierId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
            Self::Platinum => "platinum",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for TierId {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bronze" => Ok(Self::Bronze),
            "silver" => Ok(Self::Silver),
            "gold" => Ok(Self::Gold),
            "platinum" => Ok(Self::Platinum),
            other => Err(TierParseError(other.to_owned())),
        }
    }
}

/// A loyalty tier: spend threshold, discount rate, and member benefits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tier {
    pub id: TierId,
    pub title: &'static str,
    /// Lifetime spend (whole currency units) required to unlock the tier.
    pub requirement: u64,
    /// Discount applied to the cart subtotal when this tier is selected.
    pub discount_percent: u8,
    pub benefits: &'static [&'static str],
}

/// The tier catalog, ascending by `requirement`.
const CATALOG: [Tier; 4] = [
    Tier {
        id: TierId::Bronze,
        title: "Bronze Member",
        requirement: 0,
        discount_percent: 5,
        benefits: &[
            "5% off every order",
            "Birthday surprise voucher",
            "Early sale notifications",
        ],
    },
    Tier {
        id: TierId::Silver,
        title: "Silver Member",
        requirement: 15_000,
        discount_percent: 10,
        benefits: &[
            "10% off every order",
            "Free standard shipping",
            "Seasonal lookbook access",
        ],
    },
    Tier {
        id: TierId::Gold,
        title: "Gold Member",
        requirement: 30_000,
        discount_percent: 15,
        benefits: &[
            "15% off every order",
            "Free express shipping",
            "Priority customer support",
            "Exclusive capsule drops",
        ],
    },
    Tier {
        id: TierId::Platinum,
        title: "Platinum Member",
        requirement: 60_000,
        discount_percent: 20,
        benefits: &[
            "20% off every order",
            "Free express shipping",
            "Personal stylist sessions",
            "Invitations to runway events",
        ],
    },
];

impl Tier {
    /// All tiers, ascending by spend requirement.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &CATALOG
    }

    /// Look up a tier by id.
    #[must_use]
    pub const fn get(id: TierId) -> &'static Self {
        match id {
            TierId::Bronze => &CATALOG[0],
            TierId::Silver => &CATALOG[1],
            TierId::Gold => &CATALOG[2],
            TierId::Platinum => &CATALOG[3],
        }
    }

    /// The spend requirement as a monetary amount.
    #[must_use]
    pub fn requirement_amount(&self) -> Money {
        Money::from_major(i64::try_from(self.requirement).unwrap_or(i64::MAX))
    }

    /// Whether a lifetime spend unlocks this tier.
    #[must_use]
    pub fn unlocked_by(&self, total_spent: Money) -> bool {
        total_spent >= self.requirement_amount()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_strictly_ascending() {
        let tiers = Tier::all();
        for pair in tiers.windows(2) {
            assert!(
                pair[0].requirement < pair[1].requirement,
                "{} must require less than {}",
                pair[0].id,
                pair[1].id
            );
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn test_bronze_is_free() {
        assert_eq!(Tier::get(TierId::Bronze).requirement, 0);
        assert!(Tier::get(TierId::Bronze).unlocked_by(Money::ZERO));
    }

    #[test]
    fn test_get_returns_matching_tier() {
        for id in [TierId::Bronze, TierId::Silver, TierId::Gold, TierId::Platinum] {
            assert_eq!(Tier::get(id).id, id);
        }
    }

    #[test]
    fn test_unlocked_by_threshold_is_inclusive() {
        let silver = Tier::get(TierId::Silver);
        assert!(silver.unlocked_by(Money::from_major(15_000)));
        assert!(!silver.unlocked_by(Money::from_major(14_999)));
    }

    #[test]
    fn test_tier_id_parse() {
        assert_eq!("gold".parse::<TierId>(), Ok(TierId::Gold));
        assert!("diamond".parse::<TierId>().is_err());
    }

    #[test]
    fn test_discount_rates() {
        assert_eq!(Tier::get(TierId::Gold).discount_percent, 15);
        assert_eq!(Tier::get(TierId::Platinum).discount_percent, 20);
    }
}
