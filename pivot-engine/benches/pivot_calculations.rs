//! FILENAME: pivot-engine/benches/pivot_calculations.rs
//! Aggregation benchmarks over a synthetic tasks/projects data set.
//!
//! Run with: cargo bench --bench pivot_calculations

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use model::constraint::{NumberConfig, TextConfig};
use model::{
    AttributeDefinition, AttributesResource, Constraint, DataAggregationType, DataRecord,
    ResourcePath, Snapshot,
};
use pivot_engine::{
    aggregate_bucket, DataAggregator, GroupingAttribute, PivotNode, PivotRequest, RecordGraph,
    TreeRequest, ValueAttribute,
};
use serde_json::json;

const CATEGORIES: [&str; 8] = ["Sport", "Dance", "Music", "Art", "Food", "Travel", "Work", "Home"];

/// `tasks` records linked round-robin to `projects`, three links per task.
fn build_snapshot(task_count: usize) -> Snapshot {
    let text = || Constraint::Text(TextConfig::default());
    let number = || Constraint::Number(NumberConfig::default());

    let resources = vec![
        AttributesResource::collection(
            "tasks",
            vec![
                AttributeDefinition::new("category", "Category", text()),
                AttributeDefinition::new("score", "Score", number()),
            ],
        ),
        AttributesResource::collection(
            "projects",
            vec![AttributeDefinition::new("name", "Name", text())],
        ),
        AttributesResource::link_type(
            "assigned",
            "tasks",
            "projects",
            vec![AttributeDefinition::new("hours", "Hours", number())],
        ),
    ];
    let mut snapshot = Snapshot::new(resources, ResourcePath::new(["tasks", "assigned", "projects"]));

    let project_count = (task_count / 20).max(1);
    for p in 0..project_count {
        snapshot.add_record(
            DataRecord::new(format!("P{}", p), "projects").with_value("name", json!(format!("Project {}", p % 50))),
        );
    }

    for t in 0..task_count {
        snapshot.add_record(
            DataRecord::new(format!("T{}", t), "tasks")
                .with_value("category", json!(CATEGORIES[t % CATEGORIES.len()]))
                .with_value("score", json!(t % 100)),
        );
        for k in 0..3 {
            let project = (t * 7 + k * 13) % project_count;
            snapshot.add_link_record(
                DataRecord::new_link(format!("L{}_{}", t, k), "assigned", format!("T{}", t), format!("P{}", project))
                    .with_value("hours", json!((t + k) % 9)),
            );
        }
    }

    snapshot
}

fn bench_graph_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph_build");
    for size in [1_000, 10_000] {
        let snapshot = build_snapshot(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, s| {
            b.iter(|| RecordGraph::build(black_box(s)))
        });
    }
    group.finish();
}

fn bench_pivot(c: &mut Criterion) {
    let request = PivotRequest {
        rows: vec![GroupingAttribute::new("name", 2)],
        columns: vec![GroupingAttribute::new("category", 0)],
        values: vec![ValueAttribute::new("hours", 1, DataAggregationType::Sum)],
    };

    let mut group = c.benchmark_group("pivot_rows_and_columns");
    for size in [1_000, 10_000] {
        let snapshot = build_snapshot(size);
        let aggregator = DataAggregator::new(&snapshot);
        group.bench_with_input(BenchmarkId::from_parameter(size), &request, |b, r| {
            b.iter(|| aggregator.aggregate_pivot(black_box(r)))
        });
    }
    group.finish();
}

fn bench_tree(c: &mut Criterion) {
    let request = TreeRequest {
        levels: vec![GroupingAttribute::new("category", 0), GroupingAttribute::new("name", 2)],
        values: vec![ValueAttribute::new("score", 0, DataAggregationType::Avg)],
    };
    let snapshot = build_snapshot(5_000);
    let aggregator = DataAggregator::new(&snapshot);

    c.bench_function("tree_two_levels_5000", |b| {
        b.iter(|| aggregator.aggregate_tree(black_box(&request)))
    });
}

fn bench_bucket_aggregation(c: &mut Criterion) {
    let snapshot = build_snapshot(10_000);
    let value = ValueAttribute::new("hours", 1, DataAggregationType::Median);
    let result = DataAggregator::new(&snapshot).aggregate_pivot(&PivotRequest {
        rows: vec![GroupingAttribute::new("category", 0)],
        columns: vec![],
        values: vec![value.clone()],
    });
    let leaves: Vec<&PivotNode> = result.map.values().collect();

    c.bench_function("aggregate_bucket_median", |b| {
        b.iter(|| {
            for leaf in &leaves {
                if let Some(buckets) = leaf.buckets() {
                    black_box(aggregate_bucket(buckets, &value, &snapshot));
                }
            }
        })
    });
}

criterion_group!(
    benches,
    bench_graph_build,
    bench_pivot,
    bench_tree,
    bench_bucket_aggregation
);
criterion_main!(benches);
