//! Calendar-aware durations.

use std::fmt;

const NANOS_PER_MICRO: i64 = 1_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: i64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: i64 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: i64 = 7 * NANOS_PER_DAY;

/// Units a duration literal may be written in (`1y2mo3w4d5h6m7s8ms9us10ns`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DurationUnit {
    Year,
    Month,
    Week,
    Day,
    Hour,
    Minute,
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl DurationUnit {
    pub fn suffix(self) -> &'static str {
        match self {
            DurationUnit::Year => "y",
            DurationUnit::Month => "mo",
            DurationUnit::Week => "w",
            DurationUnit::Day => "d",
            DurationUnit::Hour => "h",
            DurationUnit::Minute => "m",
            DurationUnit::Second => "s",
            DurationUnit::Millisecond => "ms",
            DurationUnit::Microsecond => "us",
            DurationUnit::Nanosecond => "ns",
        }
    }
}

/// A duration split into a month component and a fixed nanosecond component.
///
/// Months vary in length, so they are kept apart from the fixed part and
/// only resolved against a concrete time. Both components carry the sign.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Duration {
    pub months: i64,
    pub nanoseconds: i64,
}

impl Duration {
    pub const ZERO: Duration = Duration {
        months: 0,
        nanoseconds: 0,
    };

    pub const fn from_nanos(nanoseconds: i64) -> Self {
        Duration {
            months: 0,
            nanoseconds,
        }
    }

    /// Sum a sequence of magnitude/unit pairs. Returns `None` on overflow.
    pub fn from_units(parts: &[(i64, DurationUnit)]) -> Option<Self> {
        let mut d = Duration::ZERO;
        for &(magnitude, unit) in parts {
            let part = match unit {
                DurationUnit::Year => Duration {
                    months: magnitude.checked_mul(12)?,
                    nanoseconds: 0,
                },
                DurationUnit::Month => Duration {
                    months: magnitude,
                    nanoseconds: 0,
                },
                DurationUnit::Week => Duration::from_nanos(magnitude.checked_mul(NANOS_PER_WEEK)?),
                DurationUnit::Day => Duration::from_nanos(magnitude.checked_mul(NANOS_PER_DAY)?),
                DurationUnit::Hour => Duration::from_nanos(magnitude.checked_mul(NANOS_PER_HOUR)?),
                DurationUnit::Minute => {
                    Duration::from_nanos(magnitude.checked_mul(NANOS_PER_MINUTE)?)
                }
                DurationUnit::Second => {
                    Duration::from_nanos(magnitude.checked_mul(NANOS_PER_SECOND)?)
                }
                DurationUnit::Millisecond => {
                    Duration::from_nanos(magnitude.checked_mul(NANOS_PER_MILLI)?)
                }
                DurationUnit::Microsecond => {
                    Duration::from_nanos(magnitude.checked_mul(NANOS_PER_MICRO)?)
                }
                DurationUnit::Nanosecond => Duration::from_nanos(magnitude),
            };
            d = d.checked_add(part)?;
        }
        Some(d)
    }

    pub fn checked_add(self, other: Duration) -> Option<Duration> {
        Some(Duration {
            months: self.months.checked_add(other.months)?,
            nanoseconds: self.nanoseconds.checked_add(other.nanoseconds)?,
        })
    }

    pub fn checked_sub(self, other: Duration) -> Option<Duration> {
        Some(Duration {
            months: self.months.checked_sub(other.months)?,
            nanoseconds: self.nanoseconds.checked_sub(other.nanoseconds)?,
        })
    }

    pub fn checked_neg(self) -> Option<Duration> {
        Some(Duration {
            months: self.months.checked_neg()?,
            nanoseconds: self.nanoseconds.checked_neg()?,
        })
    }

    pub fn is_negative(self) -> bool {
        self.months < 0 || self.nanoseconds < 0
    }

    pub fn is_zero(self) -> bool {
        self.months == 0 && self.nanoseconds == 0
    }
}

impl fmt::Display for Duration {
    /// Largest units first: `1y2mo`, `1h30m`, `-5s`, `0ns`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0ns");
        }
        if self.is_negative() {
            f.write_str("-")?;
        }
        let months = self.months.unsigned_abs();
        let mut nanos = self.nanoseconds.unsigned_abs();
        for (amount, unit) in [(months / 12, DurationUnit::Year), (months % 12, DurationUnit::Month)] {
            if amount > 0 {
                write!(f, "{amount}{}", unit.suffix())?;
            }
        }
        for (size, unit) in [
            (NANOS_PER_WEEK, DurationUnit::Week),
            (NANOS_PER_DAY, DurationUnit::Day),
            (NANOS_PER_HOUR, DurationUnit::Hour),
            (NANOS_PER_MINUTE, DurationUnit::Minute),
            (NANOS_PER_SECOND, DurationUnit::Second),
            (NANOS_PER_MILLI, DurationUnit::Millisecond),
            (NANOS_PER_MICRO, DurationUnit::Microsecond),
            (1, DurationUnit::Nanosecond),
        ] {
            let size = size.unsigned_abs();
            let amount = nanos / size;
            if amount > 0 {
                write!(f, "{amount}{}", unit.suffix())?;
                nanos %= size;
            }
        }
        Ok(())
    }
}
