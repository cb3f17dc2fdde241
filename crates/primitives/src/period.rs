//! Period keys.

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use crate::Date;

/// Ordered period key of a panel.
///
/// Date-keyed panels store days since 1970-01-01, the physical
/// representation of a polars `Date` column.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
pub struct Period(pub i64);

impl Period {
    /// Create a new period.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw period value.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    /// Period for a calendar date.
    #[must_use]
    pub fn from_date(date: Date) -> Self {
        Self((date - Date::default()).num_days())
    }

    /// Calendar date for a date-keyed period.
    #[must_use]
    pub fn to_date(self) -> Option<Date> {
        Date::default().checked_add_signed(chrono::Duration::try_days(self.0)?)
    }
}
