//! FILENAME: tests/common/mod.rs
//! Fixtures for pivot-engine integration tests.

use engine::{Aggregation, AggregationPolicies, Record};

/// Benchmark observations for a handful of databases and operations.
pub struct DatabaseFixture;

impl DatabaseFixture {
    /// (database, operation, dataset, operations_per_second)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64)> {
        vec![
            ("MongoDB", "insert", "Movie Ratings", 1200.0),
            ("MongoDB", "insert", "Patent Citations", 1000.0),
            ("MongoDB", "read", "Movie Ratings", 5000.0),
            ("Postgres", "insert", "Movie Ratings", 2500.0),
            ("Postgres", "read", "Movie Ratings", 9000.0),
            ("Postgres", "read", "Patent Citations", 11000.0),
            ("SQLite", "insert", "Movie Ratings", 800.0),
            ("SQLite", "read", "Movie Ratings", 150000.0),
        ]
    }

    pub fn records() -> Vec<Record> {
        Self::data()
            .into_iter()
            .map(|(database, operation, dataset, ops)| {
                Record::new()
                    .with("database_name", database)
                    .with("operation_name", operation)
                    .with("dataset_name", dataset)
                    .with("operations_per_second", ops)
            })
            .collect()
    }

    /// Keeps the grouping keys and averages the throughput.
    pub fn mean_policies() -> AggregationPolicies {
        AggregationPolicies::new()
            .with("database_name", Aggregation::First)
            .with("operation_name", Aggregation::First)
            .with("operations_per_second", Aggregation::Mean)
    }
}
