/// Benchmark for snapshot reads and commit throughput
///
/// Measures name lookups against a published snapshot, snapshot acquisition
/// from several reader threads while a writer commits, and the cost of a
/// commit as the catalog grows.

use polystore::{CatalogConfig, CatalogManager, ColumnSpec, DataModel, EntityType, Pattern, PolyType};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("=== Snapshot Throughput Benchmark ===\n");

    let catalog = CatalogManager::open(CatalogConfig::testing()).expect("Failed to open catalog");

    // Setup: 10 namespaces with 20 tables of 5 columns each
    println!("📋 Setup: Creating namespaces and tables...");
    let setup_start = Instant::now();
    let mut namespaces = Vec::new();
    for i in 0..10 {
        let ns = catalog
            .create_namespace(&format!("bench_ns_{}", i), DataModel::Relational, false)
            .expect("Failed to create namespace");
        namespaces.push(ns);
    }
    catalog.commit().expect("Failed to commit namespaces");
    for ns in &namespaces {
        for j in 0..20 {
            let table = catalog
                .create_table(*ns, &format!("bench_table_{}", j), EntityType::Entity, true)
                .expect("Failed to create table");
            for k in 0..5 {
                catalog
                    .add_column(table, ColumnSpec::new(format!("c{}", k), PolyType::Integer))
                    .expect("Failed to add column");
            }
        }
    }
    catalog.commit().expect("Failed to commit tables");
    println!(
        "  Created 200 tables with 1000 columns in {:?}\n",
        setup_start.elapsed()
    );

    // Benchmark: exact name lookups on one snapshot
    println!("📊 Benchmark: get_table_by_name() - Repeated Calls");
    let snapshot = catalog.snapshot();
    let iterations = 100_000;
    let start = Instant::now();
    let mut hits = 0usize;
    for i in 0..iterations {
        let ns = namespaces[i % namespaces.len()];
        let name = format!("BENCH_TABLE_{}", i % 20);
        if snapshot.rel().get_table_by_name(ns, &name).is_some() {
            hits += 1;
        }
    }
    report(iterations, start.elapsed(), "lookups");
    assert_eq!(hits, iterations);

    // Benchmark: pattern scans
    println!("📊 Benchmark: get_tables() with patterns");
    let iterations = 1_000;
    let ns_pattern = Pattern::new("bench_ns_1%");
    let table_pattern = Pattern::new("bench_table_1_");
    let start = Instant::now();
    for _ in 0..iterations {
        let tables = snapshot
            .rel()
            .get_tables(Some(&ns_pattern), Some(&table_pattern));
        assert_eq!(tables.len(), 10);
    }
    report(iterations, start.elapsed(), "scans");

    // Benchmark: commit cost with readers running
    println!("📊 Benchmark: commits while 4 readers acquire snapshots");
    let catalog = Arc::clone(&catalog);
    let readers: Vec<_> = (0..4)
        .map(|_| {
            let catalog = Arc::clone(&catalog);
            thread::spawn(move || {
                let mut reads = 0u64;
                while reads < 200_000 {
                    let snapshot = catalog.snapshot();
                    if snapshot.id().as_u64() > 0 {
                        reads += 1;
                    }
                }
                reads
            })
        })
        .collect();

    let commits = 200;
    let start = Instant::now();
    for i in 0..commits {
        let ns = namespaces[i % namespaces.len()];
        catalog
            .create_table(ns, &format!("late_{}", i), EntityType::Entity, true)
            .expect("Failed to create table");
        catalog.commit().expect("Failed to commit");
    }
    report(commits, start.elapsed(), "commits");

    let reads: u64 = readers
        .into_iter()
        .map(|r| r.join().expect("Reader panicked"))
        .sum();
    println!("  Snapshot reads completed: {}\n", reads);

    println!("✅ Done");
}

fn report(iterations: usize, elapsed: std::time::Duration, unit: &str) {
    println!("  Iterations: {}", iterations);
    println!("  Time: {:?}", elapsed);
    println!(
        "  Throughput: {:.0} {}/sec\n",
        iterations as f64 / elapsed.as_secs_f64(),
        unit
    );
}
