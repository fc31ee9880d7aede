//! Numeric rules.

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Plugin};
use crate::plugins::string::finish;
use crate::value::{format_number, is_multiple_of, TypeSet, TypeTag};

crate::rule! {
    /// Inclusive lower bound.
    pub Minimum { min: f64 } for number;
    check(self, input) { input >= self.min }
    message(self, input) { format!("Must be greater than or equal to {}", format_number(self.min)) }
}

crate::rule! {
    /// Inclusive upper bound.
    pub Maximum { max: f64 } for number;
    check(self, input) { input <= self.max }
    message(self, input) { format!("Must be less than or equal to {}", format_number(self.max)) }
}

crate::rule! {
    /// Exclusive lower bound.
    pub GreaterThan { bound: f64 } for number;
    check(self, input) { input > self.bound }
    message(self, input) { format!("Must be greater than {}", format_number(self.bound)) }
}

crate::rule! {
    /// Exclusive upper bound.
    pub LessThan { bound: f64 } for number;
    check(self, input) { input < self.bound }
    message(self, input) { format!("Must be less than {}", format_number(self.bound)) }
}

crate::rule! {
    pub MultipleOf { divisor: f64 } for number;
    check(self, input) { is_multiple_of(input, self.divisor) }
    message(self, input) { format!("Must be a multiple of {}", format_number(self.divisor)) }
}

crate::rule! {
    /// No fractional part.
    pub Integer for number;
    check(input) { input.fract() == 0.0 }
    message(input) { "Must be an integer" }
}

const NUMBER: TypeSet = TypeSet::of(&[TypeTag::Number]);

fn number_plugin<F>(method: &'static str, description: &'static str, build: F) -> Plugin
where
    F: Fn(&Args<'_>) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
{
    Plugin::new(format!("number.{method}"), method, move |params| {
        let args = Args::new(method, params);
        build(&args)
    })
    .for_types(NUMBER)
    .with_category(Category::Number)
    .with_description(description)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        number_plugin("min", "Inclusive minimum", |args| {
            args.between(1, 2)?;
            let min = args.number(0)?;
            finish(args, 1, HoistedValidator::new(codes::MINIMUM, Minimum { min }))
        }),
        number_plugin("max", "Inclusive maximum", |args| {
            args.between(1, 2)?;
            let max = args.number(0)?;
            finish(args, 1, HoistedValidator::new(codes::MAXIMUM, Maximum { max }))
        }),
        number_plugin("gt", "Exclusive minimum", |args| {
            args.between(1, 2)?;
            let bound = args.number(0)?;
            finish(args, 1, HoistedValidator::new(codes::EXCLUSIVE_MINIMUM, GreaterThan { bound }))
        }),
        number_plugin("lt", "Exclusive maximum", |args| {
            args.between(1, 2)?;
            let bound = args.number(0)?;
            finish(args, 1, HoistedValidator::new(codes::EXCLUSIVE_MAXIMUM, LessThan { bound }))
        }),
        number_plugin("positive", "Greater than zero", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::EXCLUSIVE_MINIMUM, GreaterThan { bound: 0.0 }))
        }),
        number_plugin("negative", "Less than zero", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::EXCLUSIVE_MAXIMUM, LessThan { bound: 0.0 }))
        }),
        number_plugin("multipleOf", "Integer multiple of a divisor", |args| {
            args.between(1, 2)?;
            let divisor = args.number(0)?;
            if divisor <= 0.0 {
                return Err(args.error("divisor must be greater than zero"));
            }
            finish(args, 1, HoistedValidator::new(codes::MULTIPLE_OF, MultipleOf { divisor }))
        }),
        number_plugin("int", "No fractional part", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::INTEGER, Integer))
        }),
    ]
}
