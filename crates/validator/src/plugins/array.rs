//! Array rules.

use serde_json::Value;

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Plugin};
use crate::plugins::string::finish;
use crate::value::{all_unique, json_equal, TypeSet, TypeTag};

crate::rule! {
    pub MinItems { min: usize } for array;
    check(self, input) { input.len() >= self.min }
    message(self, input) { format!("Must contain at least {} items", self.min) }
}

crate::rule! {
    pub MaxItems { max: usize } for array;
    check(self, input) { input.len() <= self.max }
    message(self, input) { format!("Must contain at most {} items", self.max) }
}

crate::rule! {
    pub ExactItems { length: usize } for array;
    check(self, input) { input.len() == self.length }
    message(self, input) { format!("Must contain exactly {} items", self.length) }
}

crate::rule! {
    /// No two items equal under JSON Schema equality.
    pub UniqueItems for array;
    check(input) { all_unique(input) }
    message(input) { "Items must be unique" }
}

crate::rule! {
    pub ArrayIncludes { item: Value } for array;
    check(self, input) { input.iter().any(|v| json_equal(v, &self.item)) }
    message(self, input) { format!("Must include {}", self.item) }
}

const ARRAY: TypeSet = TypeSet::of(&[TypeTag::Array]);

fn array_plugin<F>(method: &'static str, description: &'static str, build: F) -> Plugin
where
    F: Fn(&Args<'_>) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
{
    Plugin::new(format!("array.{method}"), method, move |params| {
        let args = Args::new(method, params);
        build(&args)
    })
    .for_types(ARRAY)
    .with_category(Category::Array)
    .with_description(description)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        array_plugin("min", "Minimum number of items", |args| {
            args.between(1, 2)?;
            let min = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MIN_ITEMS, MinItems { min }))
        }),
        array_plugin("max", "Maximum number of items", |args| {
            args.between(1, 2)?;
            let max = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MAX_ITEMS, MaxItems { max }))
        }),
        array_plugin("length", "Exact number of items", |args| {
            args.between(1, 2)?;
            let length = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::LENGTH, ExactItems { length }))
        }),
        array_plugin("notEmpty", "At least one item", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::MIN_ITEMS, MinItems { min: 1 }))
        }),
        array_plugin("unique", "Items are pairwise distinct", |args| {
            args.between(0, 1)?;
            finish(args, 0, HoistedValidator::new(codes::UNIQUE_ITEMS, UniqueItems))
        }),
        array_plugin("includes", "Contains the given item", |args| {
            args.between(1, 2)?;
            let item = args.value(0)?.clone();
            finish(args, 1, HoistedValidator::new(codes::CONTAINS, ArrayIncludes { item }))
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Rule;
    use serde_json::json;

    #[test]
    fn item_counts() {
        let input = json!([1, 2, 3]);
        assert!(MinItems { min: 3 }.check(Some(&input), &Value::Null).is_valid());
        assert!(!MaxItems { max: 2 }.check(Some(&input), &Value::Null).is_valid());
        assert!(ExactItems { length: 3 }.check(Some(&input), &Value::Null).is_valid());
    }

    #[test]
    fn uniqueness_treats_one_and_one_point_zero_as_equal() {
        assert!(!UniqueItems.check(Some(&json!([1, 1.0])), &Value::Null).is_valid());
        assert!(UniqueItems.check(Some(&json!([{"a": 1}, {"a": 2}])), &Value::Null).is_valid());
    }

    #[test]
    fn includes_compares_structurally() {
        let rule = ArrayIncludes { item: json!({"id": 1}) };
        assert!(rule.check(Some(&json!([{"id": 1.0}])), &Value::Null).is_valid());
        assert_eq!(rule.message(Some(&json!([])), "tags"), r#"Must include {"id":1}"#);
    }
}
