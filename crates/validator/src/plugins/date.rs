//! Date rules over RFC 3339 / `YYYY-MM-DD` strings.

use chrono::{DateTime, Utc};

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Plugin};
use crate::plugins::format::parse_instant;
use crate::plugins::string::finish;
use crate::value::{TypeSet, TypeTag};

crate::rule! {
    /// Not before `min`.
    pub MinDate { min: DateTime<Utc> } for string;
    check(self, input) { parse_instant(input).is_none_or(|instant| instant >= self.min) }
    message(self, input) { format!("Must be on or after {}", self.min.to_rfc3339()) }
}

crate::rule! {
    /// Not after `max`.
    pub MaxDate { max: DateTime<Utc> } for string;
    check(self, input) { parse_instant(input).is_none_or(|instant| instant <= self.max) }
    message(self, input) { format!("Must be on or before {}", self.max.to_rfc3339()) }
}

fn bound(args: &Args<'_>) -> Result<DateTime<Utc>, BuildError> {
    let raw = args.string(0)?;
    parse_instant(raw).ok_or_else(|| args.error(format!("`{raw}` is not a date")))
}

fn date_plugin<F>(method: &'static str, description: &'static str, build: F) -> Plugin
where
    F: Fn(&Args<'_>) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
{
    Plugin::new(format!("date.{method}"), method, move |params| {
        let args = Args::new(method, params);
        build(&args)
    })
    .for_types(TypeSet::of(&[TypeTag::Date]))
    .with_category(Category::Date)
    .with_description(description)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        date_plugin("min", "Earliest allowed instant", |args| {
            args.between(1, 2)?;
            let min = bound(args)?;
            finish(args, 1, HoistedValidator::new(codes::MIN_DATE, MinDate { min }))
        }),
        date_plugin("max", "Latest allowed instant", |args| {
            args.between(1, 2)?;
            let max = bound(args)?;
            finish(args, 1, HoistedValidator::new(codes::MAX_DATE, MaxDate { max }))
        }),
    ]
}
