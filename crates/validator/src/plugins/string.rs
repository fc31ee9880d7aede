//! String rules. Lengths count Unicode scalar values.

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Plugin};
use crate::value::{char_len, TypeSet, TypeTag};

crate::rule! {
    /// At least `min` characters.
    pub MinLength { min: usize } for string;
    check(self, input) { char_len(input) >= self.min }
    message(self, input) { format!("Must be at least {} characters", self.min) }
}

crate::rule! {
    /// At most `max` characters.
    pub MaxLength { max: usize } for string;
    check(self, input) { char_len(input) <= self.max }
    message(self, input) { format!("Must be at most {} characters", self.max) }
}

crate::rule! {
    /// Exactly `length` characters.
    pub ExactLength { length: usize } for string;
    check(self, input) { char_len(input) == self.length }
    message(self, input) { format!("Must be exactly {} characters", self.length) }
}

crate::rule! {
    /// At least one non-whitespace character.
    pub NotEmpty for string;
    check(input) { !input.trim().is_empty() }
    message(input) { "Must not be empty" }
}

crate::rule! {
    /// Unanchored regular expression match.
    pub Pattern { regex: regex::Regex } for string;
    check(self, input) { self.regex.is_match(input) }
    message(self, input) { format!("Must match pattern `{}`", self.regex.as_str()) }
}

crate::rule! {
    pub StartsWith { prefix: String } for string;
    check(self, input) { input.starts_with(self.prefix.as_str()) }
    message(self, input) { format!("Must start with \"{}\"", self.prefix) }
}

crate::rule! {
    pub EndsWith { suffix: String } for string;
    check(self, input) { input.ends_with(self.suffix.as_str()) }
    message(self, input) { format!("Must end with \"{}\"", self.suffix) }
}

crate::rule! {
    pub Includes { needle: String } for string;
    check(self, input) { input.contains(self.needle.as_str()) }
    message(self, input) { format!("Must include \"{}\"", self.needle) }
}

/// Compiles a pattern, mapping failures to [`BuildError::InvalidPattern`].
pub fn compile_pattern(pattern: &str) -> Result<regex::Regex, BuildError> {
    regex::Regex::new(pattern).map_err(|e| BuildError::InvalidPattern {
        pattern: pattern.to_owned(),
        reason: e.to_string(),
    })
}

/// Applies an optional custom message at `index`.
pub(crate) fn finish(
    args: &Args<'_>,
    index: usize,
    rule: HoistedValidator,
) -> Result<HoistedValidator, BuildError> {
    Ok(match args.opt_string(index)? {
        Some(message) => rule.with_message(message.to_owned()),
        None => rule,
    }
    .with_params(args.values())
    .skip_for_undefined())
}

const STRING: TypeSet = TypeSet::of(&[TypeTag::String]);

fn string_plugin<F>(method: &'static str, description: &'static str, build: F) -> Plugin
where
    F: Fn(&Args<'_>) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
{
    Plugin::new(format!("string.{method}"), method, move |params| {
        let args = Args::new(method, params);
        build(&args)
    })
    .for_types(STRING)
    .with_category(Category::String)
    .with_description(description)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        string_plugin("min", "Minimum length in characters", |args| {
            args.between(1, 2)?;
            let min = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MIN_LENGTH, MinLength { min }))
        }),
        string_plugin("max", "Maximum length in characters", |args| {
            args.between(1, 2)?;
            let max = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MAX_LENGTH, MaxLength { max }))
        }),
        string_plugin("length", "Exact length in characters", |args| {
            args.between(1, 2)?;
            let length = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::LENGTH, ExactLength { length }))
        }),
        string_plugin("notEmpty", "At least one non-whitespace character", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::NOT_EMPTY, NotEmpty))
        }),
        string_plugin("pattern", "Unanchored regular expression match", |args| {
            args.between(1, 2)?;
            let regex = compile_pattern(args.string(0)?)?;
            finish(args, 1, HoistedValidator::new(codes::PATTERN, Pattern { regex }))
        }),
        string_plugin("startsWith", "Required prefix", |args| {
            args.between(1, 2)?;
            let prefix = args.string(0)?.to_owned();
            finish(args, 1, HoistedValidator::new(codes::STARTS_WITH, StartsWith { prefix }))
        }),
        string_plugin("endsWith", "Required suffix", |args| {
            args.between(1, 2)?;
            let suffix = args.string(0)?.to_owned();
            finish(args, 1, HoistedValidator::new(codes::ENDS_WITH, EndsWith { suffix }))
        }),
        string_plugin("includes", "Required substring", |args| {
            args.between(1, 2)?;
            let needle = args.string(0)?.to_owned();
            finish(args, 1, HoistedValidator::new(codes::INCLUDES, Includes { needle }))
        }),
    ]
}
