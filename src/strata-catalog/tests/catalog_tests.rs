//! Property tests for partition listing through the catalog interface.

use std::sync::Arc;

use proptest::prelude::*;

use strata_catalog::{MemoryCatalog, PartitionCatalog};
use strata_core::{
    CatalogPartition, CatalogTable, ColumnInfo, DataType, PartitionSpec, Schema, TableIdentifier,
    TimeZone, Value,
};
use strata_logical::{CatalogScanOp, LogicalOp, col, lit};

fn numbered_table() -> CatalogTable {
    CatalogTable::new(
        TableIdentifier::new("numbered"),
        Schema::with_columns(vec![
            ColumnInfo::new("body", DataType::String),
            ColumnInfo::new("bucket", DataType::Int64),
        ]),
        vec!["bucket".to_string()],
    )
}

fn catalog_with(buckets: &[i64]) -> MemoryCatalog {
    let catalog = MemoryCatalog::new();
    let id = numbered_table().identifier;
    for b in buckets {
        catalog.add_partition(
            &id,
            CatalogPartition::new(PartitionSpec::new().with("bucket", b.to_string())),
        );
    }
    catalog
}

#[test]
fn test_catalog_is_shareable_as_trait_object() {
    let catalog: Arc<dyn PartitionCatalog> = Arc::new(catalog_with(&[1, 2]));
    let listed = catalog.list_partitions(&numbered_table()).unwrap();
    assert_eq!(listed.len(), 2);
}

proptest! {
    #[test]
    fn prop_filtered_listing_matches_manual_filter(
        buckets in proptest::collection::vec(-50i64..50, 0..20),
        threshold in -50i64..50,
    ) {
        let table = numbered_table();
        let catalog = catalog_with(&buckets);
        let bucket = LogicalOp::catalog_scan(CatalogScanOp::new(table.clone()))
            .output_attr("bucket")
            .unwrap();

        let listed = catalog
            .list_partitions_by_filter(&table, &[col(&bucket).gt_eq(lit(threshold))], &TimeZone::utc())
            .unwrap();

        let expected = buckets.iter().filter(|b| **b >= threshold).count();
        prop_assert_eq!(listed.len(), expected);
        for partition in &listed {
            let raw = partition.spec.get("bucket").unwrap();
            prop_assert!(raw.parse::<i64>().unwrap() >= threshold);
        }
    }

    #[test]
    fn prop_tautology_lists_everything(buckets in proptest::collection::vec(any::<i64>(), 0..20)) {
        let table = numbered_table();
        let catalog = catalog_with(&buckets);
        let bucket = LogicalOp::catalog_scan(CatalogScanOp::new(table.clone()))
            .output_attr("bucket")
            .unwrap();

        let tautology = col(&bucket).is_null().or(col(&bucket).is_not_null());
        let listed = catalog
            .list_partitions_by_filter(&table, &[tautology], &TimeZone::utc())
            .unwrap();
        let all = catalog.list_partitions(&table).unwrap();

        prop_assert_eq!(listed, all);
        prop_assert_eq!(catalog.listing_stats().filtered_listings, 1);
    }
}

#[test]
fn test_null_partition_is_rejected_by_comparison() {
    let table = numbered_table();
    let catalog = MemoryCatalog::new();
    catalog.add_partition(
        &table.identifier,
        CatalogPartition::new(PartitionSpec::new().with("bucket", "__HIVE_DEFAULT_PARTITION__")),
    );
    let bucket = LogicalOp::catalog_scan(CatalogScanOp::new(table.clone()))
        .output_attr("bucket")
        .unwrap();

    let eq = catalog
        .list_partitions_by_filter(&table, &[col(&bucket).eq(lit(Value::Null))], &TimeZone::utc())
        .unwrap();
    assert!(eq.is_empty());

    let is_null = catalog
        .list_partitions_by_filter(&table, &[col(&bucket).is_null()], &TimeZone::utc())
        .unwrap();
    assert_eq!(is_null.len(), 1);
}
