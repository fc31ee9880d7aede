//! Object rules.

use crate::error::{codes, BuildError};
use crate::plugin::{Args, Category, HoistedValidator, Plugin};
use crate::plugins::string::finish;
use crate::value::{TypeSet, TypeTag};

crate::rule! {
    pub MinProperties { min: usize } for object;
    check(self, input) { input.len() >= self.min }
    message(self, input) { format!("Must have at least {} properties", self.min) }
}

crate::rule! {
    pub MaxProperties { max: usize } for object;
    check(self, input) { input.len() <= self.max }
    message(self, input) { format!("Must have at most {} properties", self.max) }
}

crate::rule! {
    /// Every listed key is present.
    pub HasKeys { keys: Vec<String> } for object;
    check(self, input) { self.keys.iter().all(|k| input.contains_key(k)) }
    message(self, input) {
        let missing: Vec<&str> = self
            .keys
            .iter()
            .filter(|k| !input.contains_key(*k))
            .map(String::as_str)
            .collect();
        format!("Missing properties: {}", missing.join(", "))
    }
}

const OBJECT: TypeSet = TypeSet::of(&[TypeTag::Object]);

fn object_plugin<F>(method: &'static str, description: &'static str, build: F) -> Plugin
where
    F: Fn(&Args<'_>) -> Result<HoistedValidator, BuildError> + Send + Sync + 'static,
{
    Plugin::new(format!("object.{method}"), method, move |params| {
        let args = Args::new(method, params);
        build(&args)
    })
    .for_types(OBJECT)
    .with_category(Category::Object)
    .with_description(description)
}

pub(crate) fn plugins() -> Vec<Plugin> {
    vec![
        object_plugin("min", "Minimum number of properties", |args| {
            args.between(1, 2)?;
            let min = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MIN_PROPERTIES, MinProperties { min }))
        }),
        object_plugin("max", "Maximum number of properties", |args| {
            args.between(1, 2)?;
            let max = args.count(0)?;
            finish(args, 1, HoistedValidator::new(codes::MAX_PROPERTIES, MaxProperties { max }))
        }),
        object_plugin("hasKeys", "Every listed key is present", |args| {
            args.between(1, 2)?;
            let keys = args
                .array(0)?
                .iter()
                .map(|k| k.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| args.error("keys must be strings"))?;
            finish(args, 1, HoistedValidator::new(codes::REQUIRED, HasKeys { keys }))
        }),
    ]
}
