// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for `understory_props` + `understory_cascade`.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use understory_cascade::{Cascade, ConfigNode, ResolveCx, ScopeId};
use understory_props::{
    ComponentDefinition, InstanceValues, PropDefinitionBuilder, PropSpec, PropValue,
};

fn select_props() -> Vec<(&'static str, PropSpec)> {
    vec![
        (
            "size",
            PropDefinitionBuilder::new()
                .default_value("default")
                .validator(|v| matches!(v.as_str(), Some("small" | "default" | "large")))
                .into(),
        ),
        ("options", PropSpec::factory(|| PropValue::from(Vec::<PropValue>::new()))),
        ("placeholder", PropSpec::from("Select")),
        ("clearable", PropSpec::from(false)),
        ("disabled", PropSpec::from(false)),
        ("value", PropSpec::Null),
        ("onChange", PropSpec::Null),
        (
            "tabIndex",
            PropDefinitionBuilder::new()
                .default_value(0)
                .is_static(true)
                .into(),
        ),
    ]
}

fn select() -> ComponentDefinition {
    ComponentDefinition::new("Select", select_props())
}

fn root_overrides(size: &str) -> ConfigNode {
    ConfigNode::builder()
        .default("size", size)
        .default("disabled", false)
        .set("Select", "clearable", true)
        .set("Input", "clearable", true)
        .build()
}

fn bench_resolve_all(c: &mut Criterion) {
    let definition = select();
    let node = ConfigNode::merged(
        &root_overrides("small"),
        &ConfigNode::builder()
            .set("Select", "placeholder", "Pick one")
            .build(),
    );
    let values: InstanceValues = [("value", "a"), ("size", "large")].into_iter().collect();

    c.bench_function("cascade/resolve_all_select", |b| {
        let cx = ResolveCx::new(&node);
        b.iter(|| black_box(cx.resolve_all(black_box(&definition), black_box(&values))));
    });
}

fn bench_merge(c: &mut Criterion) {
    let ancestor = root_overrides("small");
    let nearer = ConfigNode::builder()
        .default("size", "large")
        .set("Select", "placeholder", "Pick one")
        .build();
    c.bench_function("cascade/merge_nodes", |b| {
        b.iter(|| black_box(ConfigNode::merged(black_box(&ancestor), black_box(&nearer))));
    });
}

fn bench_flush_after_root_publish(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade/flush_after_root_publish");
    for &instances in &[16_u32, 256, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(instances), &instances, |b, &n| {
            b.iter_batched(
                || {
                    let mut cascade = Cascade::builder().validate(false).build();
                    cascade.define("Select", select_props());
                    let mut scopes = vec![ScopeId::ROOT];
                    for depth in 0..4 {
                        let parent = scopes[depth];
                        let overrides = ConfigNode::builder()
                            .set("Select", "placeholder", format!("level {depth}"))
                            .build();
                        scopes.push(cascade.publish_scoped(parent, overrides).unwrap());
                    }
                    for i in 0..n {
                        let scope = scopes[i as usize % scopes.len()];
                        cascade
                            .mount("Select", scope, InstanceValues::new())
                            .unwrap();
                    }
                    cascade.publish_root(root_overrides("large"));
                    cascade
                },
                |mut cascade| black_box(cascade.flush()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_resolve_all,
    bench_merge,
    bench_flush_after_root_publish
);
criterion_main!(benches);
