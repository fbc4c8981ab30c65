//! Calendar-time portals in three wire encodings.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::Value;

use crate::data::{iso_text, truncate_to_i64};
use crate::error::{PortalError, PortalResult};
use crate::portal::Portal;
use crate::primitive::parse_number;

const NANOS_PER_MILLI: u32 = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Iso,
    UnixSecs,
    UnixMillis,
}

#[derive(Debug, Clone, Copy)]
pub struct DatePortal {
    encoding: Encoding,
}

/// ISO-8601 text such as `2020-01-01T00:00:00.000Z`.
pub fn date_iso() -> DatePortal {
    DatePortal {
        encoding: Encoding::Iso,
    }
}

/// Seconds since the Unix epoch; fractions carry milliseconds.
pub fn date_unix_secs() -> DatePortal {
    DatePortal {
        encoding: Encoding::UnixSecs,
    }
}

pub fn date_unix_millis() -> DatePortal {
    DatePortal {
        encoding: Encoding::UnixMillis,
    }
}

impl DatePortal {
    fn parse(&self, input: &Value) -> Option<DateTime<Utc>> {
        match self.encoding {
            Encoding::Iso => {
                let text = input.as_str()?;
                DateTime::parse_from_rfc3339(text)
                    .ok()
                    .map(|d| d.with_timezone(&Utc).trunc_subsecs(3))
            }
            Encoding::UnixSecs => {
                // Round at the microsecond first so 0.123 s does not land on 122 ms.
                let secs = parse_number(input)?;
                let millis = ((secs * 1_000_000.0).round() / 1000.0).trunc();
                DateTime::from_timestamp_millis(truncate_to_i64(millis)?)
            }
            Encoding::UnixMillis => {
                let millis = parse_number(input)?;
                DateTime::from_timestamp_millis(truncate_to_i64(millis)?)
            }
        }
    }
}

impl Portal for DatePortal {
    type Value = DateTime<Utc>;

    fn read(&self, input: &Value) -> PortalResult<DateTime<Utc>> {
        self.parse(input)
            .ok_or_else(|| PortalError::new(input.clone(), self.description()))
    }

    /// Fails on instants finer than a millisecond, which no encoding carries.
    fn write(&self, value: &DateTime<Utc>) -> PortalResult<Value> {
        if value.timestamp_subsec_nanos() % NANOS_PER_MILLI != 0 {
            let exact = value.to_rfc3339_opts(SecondsFormat::Nanos, true);
            return Err(PortalError::new(Value::String(exact), self.description()));
        }
        let out = match self.encoding {
            Encoding::Iso => Value::String(iso_text(value)),
            Encoding::UnixSecs => {
                let millis = value.timestamp_millis();
                if millis % 1000 == 0 {
                    Value::from(millis / 1000)
                } else {
                    Value::from(millis as f64 / 1000.0)
                }
            }
            Encoding::UnixMillis => Value::from(value.timestamp_millis()),
        };
        Ok(out)
    }

    fn description(&self) -> String {
        match self.encoding {
            Encoding::Iso => "dateIso",
            Encoding::UnixSecs => "dateUnixSecs",
            Encoding::UnixMillis => "dateUnixMillis",
        }
        .into()
    }
}
