//! Temporal buckets for date and time columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::metadata::BaseType;

/// A time-granularity transform applied to a date/time column reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemporalBucket {
    // Truncation
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,

    // Extraction
    MinuteOfHour,
    HourOfDay,
    DayOfWeek,
    DayOfMonth,
    DayOfYear,
    WeekOfYear,
    MonthOfYear,
    QuarterOfYear,
}

const DATE_BUCKETS: &[TemporalBucket] = &[
    TemporalBucket::Day,
    TemporalBucket::Week,
    TemporalBucket::Month,
    TemporalBucket::Quarter,
    TemporalBucket::Year,
    TemporalBucket::DayOfWeek,
    TemporalBucket::DayOfMonth,
    TemporalBucket::DayOfYear,
    TemporalBucket::WeekOfYear,
    TemporalBucket::MonthOfYear,
    TemporalBucket::QuarterOfYear,
];

const TIME_BUCKETS: &[TemporalBucket] = &[
    TemporalBucket::Minute,
    TemporalBucket::Hour,
    TemporalBucket::MinuteOfHour,
    TemporalBucket::HourOfDay,
];

impl TemporalBucket {
    pub const ALL: &'static [TemporalBucket] = &[
        TemporalBucket::Minute,
        TemporalBucket::Hour,
        TemporalBucket::Day,
        TemporalBucket::Week,
        TemporalBucket::Month,
        TemporalBucket::Quarter,
        TemporalBucket::Year,
        TemporalBucket::MinuteOfHour,
        TemporalBucket::HourOfDay,
        TemporalBucket::DayOfWeek,
        TemporalBucket::DayOfMonth,
        TemporalBucket::DayOfYear,
        TemporalBucket::WeekOfYear,
        TemporalBucket::MonthOfYear,
        TemporalBucket::QuarterOfYear,
    ];

    /// Name shown next to a bucketed column, e.g. `Created At: Month`.
    pub fn display_name(&self) -> &'static str {
        match self {
            TemporalBucket::Minute => "Minute",
            TemporalBucket::Hour => "Hour",
            TemporalBucket::Day => "Day",
            TemporalBucket::Week => "Week",
            TemporalBucket::Month => "Month",
            TemporalBucket::Quarter => "Quarter",
            TemporalBucket::Year => "Year",
            TemporalBucket::MinuteOfHour => "Minute of hour",
            TemporalBucket::HourOfDay => "Hour of day",
            TemporalBucket::DayOfWeek => "Day of week",
            TemporalBucket::DayOfMonth => "Day of month",
            TemporalBucket::DayOfYear => "Day of year",
            TemporalBucket::WeekOfYear => "Week of year",
            TemporalBucket::MonthOfYear => "Month of year",
            TemporalBucket::QuarterOfYear => "Quarter of year",
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            TemporalBucket::Minute => "minute",
            TemporalBucket::Hour => "hour",
            TemporalBucket::Day => "day",
            TemporalBucket::Week => "week",
            TemporalBucket::Month => "month",
            TemporalBucket::Quarter => "quarter",
            TemporalBucket::Year => "year",
            TemporalBucket::MinuteOfHour => "minute-of-hour",
            TemporalBucket::HourOfDay => "hour-of-day",
            TemporalBucket::DayOfWeek => "day-of-week",
            TemporalBucket::DayOfMonth => "day-of-month",
            TemporalBucket::DayOfYear => "day-of-year",
            TemporalBucket::WeekOfYear => "week-of-year",
            TemporalBucket::MonthOfYear => "month-of-year",
            TemporalBucket::QuarterOfYear => "quarter-of-year",
        }
    }

    /// Extraction buckets produce a number rather than a truncated instant.
    pub fn is_extraction(&self) -> bool {
        !matches!(
            self,
            TemporalBucket::Minute
                | TemporalBucket::Hour
                | TemporalBucket::Day
                | TemporalBucket::Week
                | TemporalBucket::Month
                | TemporalBucket::Quarter
                | TemporalBucket::Year
        )
    }

    /// Buckets that make sense for a column of the given base type.
    pub fn available_for(base_type: BaseType) -> &'static [TemporalBucket] {
        match base_type {
            BaseType::DateTime => Self::ALL,
            BaseType::Date => DATE_BUCKETS,
            BaseType::Time => TIME_BUCKETS,
            _ => &[],
        }
    }

    pub fn is_available_for(&self, base_type: BaseType) -> bool {
        Self::available_for(base_type).contains(self)
    }
}

impl fmt::Display for TemporalBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for TemporalBucket {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        Self::ALL
            .iter()
            .find(|b| b.short_name() == normalized)
            .copied()
            .ok_or_else(|| format!("unknown temporal bucket '{}'", s))
    }
}
