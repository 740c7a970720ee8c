//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and integration tests.

use chrono::{DateTime, TimeZone, Utc};
use core_kernel::{Points, UserId};

/// Fixture for user identifiers
pub struct UserFixtures;

impl UserFixtures {
    /// The default user in single-user scenarios
    pub fn primary() -> UserId {
        UserId::new(1)
    }

    /// A second, unrelated user
    pub fn secondary() -> UserId {
        UserId::new(2)
    }

    /// A user that never appears in any store
    pub fn unknown() -> UserId {
        UserId::new(404)
    }
}

/// Fixture for point amounts
pub struct PointFixtures;

impl PointFixtures {
    pub fn small() -> Points {
        Points::new(100)
    }

    pub fn standard_charge() -> Points {
        Points::new(3_000)
    }

    pub fn starting_balance() -> Points {
        Points::new(10_000)
    }

    /// The largest amount a single charge can ever carry
    pub fn limit() -> Points {
        domain_point::MAX_BALANCE
    }
}

/// Fixture for timestamps
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Fixed instant for entries built outside the engine
    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }
}
