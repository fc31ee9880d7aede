//! String formats shared by the builder plugins and the JSON Schema
//! evaluator.
//!
//! Supported: `email`, `uri` (alias `url`), `uuid`, `ipv4`, `ipv6`,
//! `hostname`, `date-time`, `date`, `time`.

use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

use crate::error::codes;
use crate::plugin::{Args, Category, HoistedValidator, Outcome, Plugin, Rule};
use crate::value::{TypeSet, TypeTag};

/// A known string format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Email,
    Uri,
    Uuid,
    Ipv4,
    Ipv6,
    Hostname,
    DateTime,
    Date,
    Time,
}

impl Format {
    pub const ALL: [Format; 9] = [
        Format::Email,
        Format::Uri,
        Format::Uuid,
        Format::Ipv4,
        Format::Ipv6,
        Format::Hostname,
        Format::DateTime,
        Format::Date,
        Format::Time,
    ];

    /// Looks up a format by its JSON Schema name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "email" => Format::Email,
            "uri" | "url" => Format::Uri,
            "uuid" => Format::Uuid,
            "ipv4" => Format::Ipv4,
            "ipv6" => Format::Ipv6,
            "hostname" => Format::Hostname,
            "date-time" => Format::DateTime,
            "date" => Format::Date,
            "time" => Format::Time,
            _ => return None,
        })
    }

    /// JSON Schema name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Uri => "uri",
            Format::Uuid => "uuid",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Hostname => "hostname",
            Format::DateTime => "date-time",
            Format::Date => "date",
            Format::Time => "time",
        }
    }

    /// Builder method checking this format.
    #[must_use]
    pub const fn method(self) -> &'static str {
        match self {
            Format::Email => "email",
            Format::Uri => "url",
            Format::Uuid => "uuid",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::Hostname => "hostname",
            Format::DateTime => "datetime",
            Format::Date => "isoDate",
            Format::Time => "isoTime",
        }
    }

    const fn noun(self) -> &'static str {
        match self {
            Format::Email => "email address",
            Format::Uri => "URI",
            Format::Uuid => "UUID",
            Format::Ipv4 => "IPv4 address",
            Format::Ipv6 => "IPv6 address",
            Format::Hostname => "hostname",
            Format::DateTime => "RFC 3339 date-time",
            Format::Date => "date (YYYY-MM-DD)",
            Format::Time => "time (HH:MM:SS)",
        }
    }

    /// Message reported for a string not in this format.
    #[must_use]
    pub fn message(self) -> String {
        format!("Must be a valid {}", self.noun())
    }

    /// Returns true if `s` is in this format.
    #[must_use]
    pub fn check(self, s: &str) -> bool {
        match self {
            Format::Email => is_email(s),
            Format::Uri => url::Url::parse(s).is_ok(),
            Format::Uuid => uuid::Uuid::parse_str(s).is_ok(),
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Hostname => is_hostname(s),
            Format::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            Format::Date => parse_date(s).is_some(),
            Format::Time => is_time(s),
        }
    }
}

/// Hostname per RFC 1123: dot-separated labels of `[A-Za-z0-9-]`, 1 to 63
/// characters each, not starting or ending with a hyphen. A trailing dot is
/// allowed.
#[must_use]
pub fn is_hostname(s: &str) -> bool {
    let host = s.strip_suffix('.').unwrap_or(s);
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            (1..=63).contains(&label.len())
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

/// `local@domain.tld`: a non-empty local part without whitespace and a
/// hostname domain with at least two labels.
#[must_use]
pub fn is_email(s: &str) -> bool {
    let Some((local, domain)) = s.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && local.len() <= 64
        && !local.contains(['@', ' ', '\t', '\n', '\r'])
        && !local.starts_with('.')
        && !local.ends_with('.')
        && domain.contains('.')
        && !domain.ends_with('.')
        && is_hostname(domain)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn is_time(s: &str) -> bool {
    DateTime::parse_from_rfc3339(&format!("1970-01-01T{s}")).is_ok()
}

/// Parses an RFC 3339 date-time or a `YYYY-MM-DD` date (midnight UTC).
#[must_use]
pub fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
        return Some(instant.with_timezone(&Utc));
    }
    parse_date(s)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ============================================================================
// RULE & PLUGINS
// ============================================================================

/// Checks that a string is in a known format.
#[derive(Debug, Clone, Copy)]
pub struct FormatRule(pub Format);

impl Rule for FormatRule {
    fn check(&self, value: Option<&Value>, _root: &Value) -> Outcome {
        match value.and_then(Value::as_str) {
            Some(s) => Outcome::from_bool(self.0.check(s)),
            None => Outcome::Valid,
        }
    }

    fn message(&self, _value: Option<&Value>, _path: &str) -> std::borrow::Cow<'static, str> {
        self.0.message().into()
    }
}

/// One plugin per format, e.g. `string.email` exposing `email()`.
pub(crate) fn plugins() -> Vec<Plugin> {
    Format::ALL
        .into_iter()
        .map(|format| {
            Plugin::new(
                format!("string.{}", format.method()),
                format.method(),
                move |params| {
                    let args = Args::new(format.method(), params);
                    args.between(0, 1)?;
                    let rule = HoistedValidator::new(codes::FORMAT, FormatRule(format))
                        .with_params([Value::from(format.name())])
                        .skip_for_undefined();
                    Ok(match args.opt_string(0)? {
                        Some(message) => rule.with_message(message.to_owned()),
                        None => rule,
                    })
                },
            )
            .for_types(TypeSet::of(&[TypeTag::String]))
            .with_category(Category::Format)
            .with_description(format!("String must be a valid {}", format.noun()))
        })
        .collect()
}
