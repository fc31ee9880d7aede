// Strategy benchmarks for sift-validator
// Run with: cargo bench --bench strategies

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use sift_validator::prelude::*;

fn name_field(registry: &Registry) -> Vec<FieldDefinition> {
    registry
        .schema()
        .v("name", |f| f.string().required().min(3))
        .into_definitions()
        .unwrap()
}

// ================================
// Strategy Benchmarks
// ================================

fn benchmark_single_field(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy/single_field");
    let registry = Registry::with_builtins();
    let valid = json!({"name": "Ada Lovelace"});
    let invalid = json!({"name": "Al"});

    for (label, hint) in [
        ("single", StrategyHint::Auto),
        ("general", StrategyHint::General),
        ("raw", StrategyHint::Raw),
    ] {
        let validator =
            ValidatorFactory::compile(name_field(&registry), ValidatorOptions::default().with_strategy(hint))
                .unwrap();

        group.bench_with_input(BenchmarkId::new("is_valid", label), &validator, |b, v| {
            b.iter(|| v.is_valid(black_box(&valid)))
        });

        let mut result = ValidationResult::default();
        group.bench_with_input(BenchmarkId::new("validate_into", label), &validator, |b, v| {
            b.iter(|| v.validate_into(black_box(&invalid), &mut result))
        });
    }

    group.finish();
}

fn benchmark_many_fields(c: &mut Criterion) {
    let mut group = c.benchmark_group("strategy/many_fields");
    let registry = Registry::with_builtins();

    let validator = registry
        .schema()
        .v("user.name", |f| f.string().required().min(2))
        .v("user.email", |f| f.string().required().email())
        .v("user.age", |f| f.number().int().min(0))
        .v("items[*].sku", |f| f.string().required().pattern("^SKU-[0-9]+$"))
        .v("items[*].qty", |f| f.number().int().positive())
        .build()
        .unwrap();

    for count in [1usize, 10, 100] {
        let items: Vec<Value> = (0..count).map(|i| json!({"sku": format!("SKU-{i}"), "qty": i + 1})).collect();
        let input = json!({
            "user": {"name": "Ada", "email": "ada@example.com", "age": 36},
            "items": items
        });
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| validator.is_valid(black_box(input)))
        });
    }

    group.finish();
}

// ================================
// JSON Schema Benchmarks
// ================================

fn benchmark_json_schema(c: &mut Criterion) {
    let mut group = c.benchmark_group("json_schema");
    let registry = Registry::with_builtins();
    let schema = json!({
        "type": "object",
        "required": ["id", "name"],
        "properties": {
            "id": {"type": "integer", "minimum": 1},
            "name": {"type": "string", "minLength": 1, "maxLength": 64},
            "contact": {"oneOf": [
                {"type": "string", "format": "email"},
                {"type": "object", "required": ["phone"]}
            ]}
        }
    });
    let input = json!({"id": 7, "name": "Ada", "contact": "ada@example.com"});

    group.bench_function("compile", |b| {
        b.iter(|| from_json_schema(black_box(&schema), &registry, JsonSchemaOptions::default()))
    });

    let validator = from_json_schema(&schema, &registry, JsonSchemaOptions::default()).unwrap();
    group.bench_function("compiled", |b| b.iter(|| validator.is_valid(black_box(&input))));
    group.bench_function("evaluate", |b| b.iter(|| evaluate(black_box(&input), &schema, &schema)));

    group.finish();
}

criterion_group!(
    benches,
    benchmark_single_field,
    benchmark_many_fields,
    benchmark_json_schema
);
criterion_main!(benches);
