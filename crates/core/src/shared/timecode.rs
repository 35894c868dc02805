use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimecodeError {
    #[error("timecode '{0}' must look like HH:MM:SS or HH:MM:SS:FF")]
    Malformed(String),
    #[error("timecode field '{field}' is not a number in '{input}'")]
    NotANumber { input: String, field: String },
    #[error("{unit} out of range in '{input}'")]
    OutOfRange { input: String, unit: &'static str },
}

/// A wall-clock style position, split into hours, minutes, seconds and
/// milliseconds.
///
/// Used to parse and display human timestamps; playback itself works with
/// [`Duration`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    hours: u64,
    minutes: u8,
    seconds: u8,
    millis: u16,
}

impl Timecode {
    /// Builds a timecode, normalizing overflowing fields into larger units.
    pub fn new(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Self {
        Self::from_millis(
            hours * MILLIS_PER_HOUR
                + minutes * MILLIS_PER_MINUTE
                + seconds * MILLIS_PER_SECOND
                + millis,
        )
    }

    pub fn from_millis(ms: u64) -> Self {
        let hours = ms / MILLIS_PER_HOUR;
        let rest = ms % MILLIS_PER_HOUR;
        let minutes = rest / MILLIS_PER_MINUTE;
        let rest = rest % MILLIS_PER_MINUTE;
        Self {
            hours,
            minutes: minutes as u8,
            seconds: (rest / MILLIS_PER_SECOND) as u8,
            millis: (rest % MILLIS_PER_SECOND) as u16,
        }
    }

    pub fn hours(&self) -> u64 {
        self.hours
    }

    pub fn minutes(&self) -> u8 {
        self.minutes
    }

    pub fn seconds(&self) -> u8 {
        self.seconds
    }

    pub fn millis(&self) -> u16 {
        self.millis
    }

    pub fn as_millis(&self) -> u64 {
        self.hours * MILLIS_PER_HOUR
            + self.minutes as u64 * MILLIS_PER_MINUTE
            + self.seconds as u64 * MILLIS_PER_SECOND
            + self.millis as u64
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.as_millis() as f64 / MILLIS_PER_SECOND as f64
    }

    pub fn as_minutes_f64(&self) -> f64 {
        self.as_millis() as f64 / MILLIS_PER_MINUTE as f64
    }

    pub fn as_hours_f64(&self) -> f64 {
        self.as_millis() as f64 / MILLIS_PER_HOUR as f64
    }

    /// Expands `%H`, `%M`, `%S` and `%F` (hours, minutes, seconds,
    /// milliseconds). Lowercase variants are accepted as aliases.
    pub fn format(&self, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 8);
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }
            match chars.peek().copied() {
                Some('H' | 'h') => out.push_str(&format!("{:02}", self.hours)),
                Some('M' | 'm') => out.push_str(&format!("{:02}", self.minutes)),
                Some('S' | 's') => out.push_str(&format!("{:02}", self.seconds)),
                Some('F' | 'f') => out.push_str(&format!("{:03}", self.millis)),
                _ => {
                    out.push('%');
                    continue;
                }
            }
            chars.next();
        }
        out
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format("%H:%M:%S:%F"))
    }
}

impl FromStr for Timecode {
    type Err = TimecodeError;

    /// Parses `HH:MM:SS` or `HH:MM:SS:FF`, where the last field is
    /// milliseconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(':').collect();
        if !(3..=4).contains(&fields.len()) {
            return Err(TimecodeError::Malformed(s.to_string()));
        }

        let mut values = [0u64; 4];
        for (slot, field) in values.iter_mut().zip(&fields) {
            *slot = field
                .trim()
                .parse::<u64>()
                .map_err(|_| TimecodeError::NotANumber {
                    input: s.to_string(),
                    field: field.to_string(),
                })?;
        }

        let [hours, minutes, seconds, millis] = values;
        let limits = [
            (minutes, 60, "minutes"),
            (seconds, 60, "seconds"),
            (millis, 1000, "milliseconds"),
        ];
        for (value, limit, unit) in limits {
            if value >= limit {
                return Err(TimecodeError::OutOfRange {
                    input: s.to_string(),
                    unit,
                });
            }
        }

        Ok(Self::new(hours, minutes, seconds, millis))
    }
}

impl From<Duration> for Timecode {
    fn from(value: Duration) -> Self {
        Self::from_millis(value.as_millis() as u64)
    }
}

impl From<Timecode> for Duration {
    fn from(value: Timecode) -> Self {
        Duration::from_millis(value.as_millis())
    }
}

impl Add for Timecode {
    type Output = Timecode;

    fn add(self, rhs: Timecode) -> Timecode {
        Timecode::from_millis(self.as_millis().saturating_add(rhs.as_millis()))
    }
}

impl Sub for Timecode {
    type Output = Timecode;

    /// Saturates at zero.
    fn sub(self, rhs: Timecode) -> Timecode {
        Timecode::from_millis(self.as_millis().saturating_sub(rhs.as_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[test]
    fn test_from_millis_splits_units() {
        let tc = Timecode::from_millis(3_723_004);
        assert_eq!(tc.hours(), 1);
        assert_eq!(tc.minutes(), 2);
        assert_eq!(tc.seconds(), 3);
        assert_eq!(tc.millis(), 4);
        assert_eq!(tc.as_millis(), 3_723_004);
    }

    #[test]
    fn test_new_normalizes_overflow() {
        assert_eq!(Timecode::new(0, 0, 90, 1500), Timecode::from_millis(91_500));
    }

    #[test]
    fn test_fractional_units() {
        let tc = Timecode::from_millis(5_400_000); // 1.5h
        assert_relative_eq!(tc.as_hours_f64(), 1.5);
        assert_relative_eq!(tc.as_minutes_f64(), 90.0);
        assert_relative_eq!(tc.as_secs_f64(), 5400.0);
    }

    #[rstest]
    #[case("%H:%M:%S:%F", "01:02:03:004")]
    #[case("%h:%m:%s", "01:02:03")]
    #[case("%M min", "02 min")]
    #[case("100%", "100%")]
    #[case("%Q", "%Q")]
    fn test_format(#[case] pattern: &str, #[case] expected: &str) {
        let tc = Timecode::new(1, 2, 3, 4);
        assert_eq!(tc.format(pattern), expected);
    }

    #[test]
    fn test_display() {
        assert_eq!(Timecode::new(0, 1, 5, 250).to_string(), "00:01:05:250");
    }

    #[rstest]
    #[case("00:00:01:500", 1_500)]
    #[case("01:00:00", 3_600_000)]
    #[case(" 00:10:00:05 ", 600_005)]
    fn test_parse(#[case] input: &str, #[case] expected_ms: u64) {
        let tc: Timecode = input.parse().unwrap();
        assert_eq!(tc.as_millis(), expected_ms);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            "12:30".parse::<Timecode>(),
            Err(TimecodeError::Malformed(_))
        ));
        assert!(matches!(
            "aa:00:00".parse::<Timecode>(),
            Err(TimecodeError::NotANumber { .. })
        ));
        assert!(matches!(
            "00:61:00".parse::<Timecode>(),
            Err(TimecodeError::OutOfRange { unit: "minutes", .. })
        ));
        assert!(matches!(
            "00:00:00:1000".parse::<Timecode>(),
            Err(TimecodeError::OutOfRange { unit: "milliseconds", .. })
        ));
    }

    #[test]
    fn test_arithmetic_saturates() {
        let a = Timecode::from_millis(1_000);
        let b = Timecode::from_millis(2_500);
        assert_eq!((a + b).as_millis(), 3_500);
        assert_eq!((b - a).as_millis(), 1_500);
        assert_eq!((a - b).as_millis(), 0);
    }

    #[test]
    fn test_duration_conversions() {
        let tc = Timecode::from(Duration::from_millis(61_250));
        assert_eq!(tc.to_string(), "00:01:01:250");
        assert_eq!(Duration::from(tc), Duration::from_millis(61_250));
    }
}
