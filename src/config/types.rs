use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};

/// A duration that deserializes from an integer number of seconds or from a
/// compact human form like `2h`, `45s`, or `1d 12h`.
#[derive(Debug, Clone, Copy)]
pub struct Duration(std::time::Duration);

impl Duration {
    pub fn from_secs(seconds: u64) -> Self {
        Self(std::time::Duration::from_secs(seconds))
    }
}

impl From<std::time::Duration> for Duration {
    fn from(duration: std::time::Duration) -> Self {
        Self(duration)
    }
}

impl From<Duration> for std::time::Duration {
    fn from(duration: Duration) -> Self {
        duration.0
    }
}

fn parse_human(s: &str) -> Option<std::time::Duration> {
    let mut total: u64 = 0;
    let mut value: Option<u64> = None;
    let mut saw_unit = false;

    for ch in s.chars() {
        match ch {
            '0'..='9' => {
                let digit = u64::from(ch) - u64::from('0');
                value = Some(value.unwrap_or(0).checked_mul(10)?.checked_add(digit)?);
            }

            'd' | 'h' | 'm' | 's' => {
                let factor = match ch {
                    'd' => 86_400,
                    'h' => 3_600,
                    'm' => 60,
                    _ => 1,
                };

                total = total.checked_add(value.take()?.checked_mul(factor)?)?;
                saw_unit = true;
            }

            // Whitespace may separate groups, but not a number from its unit.
            c if c.is_whitespace() && value.is_none() => {}

            _ => return None,
        }
    }

    if value.is_some() || !saw_unit {
        return None;
    }

    Some(std::time::Duration::from_secs(total))
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> Visitor<'de> for DurationVisitor {
            type Value = Duration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                write!(formatter, "a duration")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                self.visit_u64(v.try_into().map_err(E::custom)?)
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(Duration::from_secs(v))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                parse_human(v)
                    .map(Duration::from)
                    .ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &"a duration"))
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}
