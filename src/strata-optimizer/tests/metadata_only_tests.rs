//! End-to-end behavior of the metadata-only aggregate rewrite.

use std::sync::Arc;

use proptest::prelude::*;

use common_config::{METADATA_ONLY_QUERY_KEY, SESSION_TIME_ZONE_KEY, StrataConfig};
use common_error::StrataError;
use strata_catalog::{ListingStats, MemoryCatalog, PartitionCatalog};
use strata_core::{
    CatalogPartition, CatalogTable, ColumnInfo, DataType, PartitionDirectory, PartitionSpec,
    Schema, StorageFormat, TableIdentifier, TimeZone, Value,
};
use strata_logical::{
    AggExpr, AggregateOp, AttributeRef, CatalogScanOp, FileScanOp, FilterOp, LocalRelationOp,
    LogicalExpr, LogicalOp, LogicalPlan, ProjectOp, SortKey, SortOp, UnionOp, col, lit,
};
use strata_optimizer::{
    MetadataOnlyQuery, OptimizationRule, Optimizer, ScanReplacer, match_partitioned_relation,
    optimize,
};

const SALES: &str = "/warehouse/sales";

/// `sales(amount)` partitioned by `(p int, q string)`.
fn sales_relation() -> FileScanOp {
    FileScanOp::new(
        SALES,
        Schema::with_columns(vec![ColumnInfo::new("amount", DataType::Int64)]),
        Schema::with_columns(vec![
            ColumnInfo::new("p", DataType::Int32),
            ColumnInfo::new("q", DataType::String),
        ]),
    )
}

fn sales_partitions() -> Vec<PartitionDirectory> {
    [(1, "a"), (1, "b"), (2, "a"), (3, "c")]
        .into_iter()
        .map(|(p, q)| {
            PartitionDirectory::new(
                vec![Value::from(p), Value::from(q)],
                vec![format!("{SALES}/p={p}/q={q}/part-0.parquet")],
            )
        })
        .collect()
}

fn sales_catalog() -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    catalog.register_file_relation(SALES, sales_partitions());
    Arc::new(catalog)
}

fn enabled() -> StrataConfig {
    StrataConfig::default()
        .with(METADATA_ONLY_QUERY_KEY, "true")
        .unwrap()
}

fn rule(config: &StrataConfig, catalog: &Arc<MemoryCatalog>) -> MetadataOnlyQuery {
    MetadataOnlyQuery::new(config, catalog.clone()).unwrap()
}

fn local_relations(plan: &LogicalPlan) -> Vec<LocalRelationOp> {
    plan.find_ops(|op| matches!(op, LogicalOp::LocalRelation(_)))
        .into_iter()
        .filter_map(|op| match op {
            LogicalOp::LocalRelation(local) => Some(local.clone()),
            _ => None,
        })
        .collect()
}

fn scans_left(plan: &LogicalPlan) -> usize {
    plan.find_ops(|op| matches!(op, LogicalOp::FileScan(_) | LogicalOp::CatalogScan(_)))
        .len()
}

struct Sales {
    scan: LogicalOp,
    p: AttributeRef,
    q: AttributeRef,
    amount: AttributeRef,
}

fn sales() -> Sales {
    let scan = LogicalOp::file_scan(sales_relation());
    Sales {
        p: scan.output_attr("p").unwrap(),
        q: scan.output_attr("q").unwrap(),
        amount: scan.output_attr("amount").unwrap(),
        scan,
    }
}

#[test]
fn test_group_by_partition_column_reads_one_row_per_partition() {
    let catalog = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));
    let output_before = plan.output();

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();

    assert!(result.changed);
    assert_eq!(scans_left(&result.plan), 0);
    assert_eq!(result.plan.output(), output_before);

    let locals = local_relations(&result.plan);
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].rows.len(), sales_partitions().len());
    assert_eq!(locals[0].output[0], p);
    assert!(!locals[0].is_streaming);
}

#[test]
fn test_count_distinct_is_rewritten() {
    let catalog = sales_catalog();
    let Sales { scan, p, q, .. } = sales();
    let aggregate =
        AggregateOp::group_by([&p]).with_agg(AggExpr::count(col(&q)).with_distinct(true));
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, aggregate));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(result.changed);
    assert_eq!(scans_left(&result.plan), 0);
}

#[test]
fn test_sum_is_not_rewritten() {
    let catalog = sales_catalog();
    let Sales { scan, p, q, .. } = sales();
    let aggregate = AggregateOp::group_by([&p]).with_agg(AggExpr::sum(col(&q)));
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, aggregate));

    let result = rule(&enabled(), &catalog).apply(plan.clone()).unwrap();
    assert!(!result.changed);
    assert_eq!(result.plan, plan);
    assert_eq!(catalog.listing_stats(), ListingStats::default());
}

#[test]
fn test_one_sensitive_call_in_a_combined_expression_blocks_rewrite() {
    let catalog = sales_catalog();
    let Sales { scan, p, .. } = sales();

    let spread: LogicalExpr = LogicalExpr::from(AggExpr::max(col(&p)))
        .sub_expr(AggExpr::min(col(&p)).into());
    let ok = AggregateOp::new(vec![], vec![spread]);
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan.clone(), ok));
    assert!(rule(&enabled(), &catalog).apply(plan).unwrap().changed);

    let mixed: LogicalExpr = LogicalExpr::from(AggExpr::max(col(&p)))
        .add_expr(AggExpr::avg(col(&p)).into());
    let blocked = AggregateOp::new(vec![], vec![mixed]);
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, blocked));
    assert!(!rule(&enabled(), &catalog).apply(plan).unwrap().changed);
}

#[test]
fn test_data_column_reference_blocks_rewrite() {
    let catalog = sales_catalog();
    let Sales { scan, p, amount, .. } = sales();
    let aggregate = AggregateOp::group_by([&p]).with_agg(AggExpr::max(col(&amount)));
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, aggregate));

    assert!(!rule(&enabled(), &catalog).apply(plan).unwrap().changed);
}

#[test]
fn test_filter_on_data_column_blocks_rewrite() {
    let catalog = sales_catalog();
    let Sales { scan, p, amount, .. } = sales();
    let filtered = LogicalOp::filter(scan, FilterOp::new(col(&amount).gt(lit(100i64))));
    let plan = LogicalPlan::new(LogicalOp::aggregate(filtered, AggregateOp::group_by([&p])));

    let result = rule(&enabled(), &catalog).apply(plan.clone()).unwrap();
    assert!(!result.changed);
    assert_eq!(result.plan, plan);
}

#[test]
fn test_partition_filters_prune_listed_partitions() {
    let catalog = sales_catalog();
    let Sales { scan, p, q, .. } = sales();

    let condition = col(&p).gt(lit(1i32)).and(col(&q).eq(lit("a")));
    let inner = col(&p).lt_eq(lit(3i32));
    let filtered = LogicalOp::filter(
        LogicalOp::filter(scan, FilterOp::new(inner.clone())),
        FilterOp::new(condition.clone()),
    );

    let matched = match_partitioned_relation(&filtered).unwrap().unwrap();
    let mut conjuncts: Vec<String> = matched.filters.iter().map(ToString::to_string).collect();
    conjuncts.sort();
    let mut expected: Vec<String> = [col(&p).gt(lit(1i32)), col(&q).eq(lit("a")), inner]
        .iter()
        .map(ToString::to_string)
        .collect();
    expected.sort();
    assert_eq!(conjuncts, expected);

    let plan = LogicalPlan::new(LogicalOp::aggregate(filtered, AggregateOp::group_by([&p])));
    let result = rule(&enabled(), &catalog).apply(plan).unwrap();

    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].rows, vec![vec![Value::from(2i32), Value::from("a")]]);
    assert_eq!(catalog.listing_stats().file_listings, 1);

    // The filters stay in the plan above the replacement.
    assert_eq!(
        result
            .plan
            .find_ops(|op| matches!(op, LogicalOp::Filter { .. }))
            .len(),
        2
    );
}

#[test]
fn test_other_operators_stop_the_match() {
    let catalog = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let sorted = LogicalOp::sort(scan, SortOp::new(vec![SortKey::asc(col(&p))]));
    let plan = LogicalPlan::new(LogicalOp::aggregate(sorted, AggregateOp::group_by([&p])));

    let result = rule(&enabled(), &catalog).apply(plan.clone()).unwrap();
    assert!(!result.changed);
    assert_eq!(result.plan, plan);
}

#[test]
fn test_renaming_projection_is_looked_through() {
    let catalog = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let project = LogicalOp::project(scan, ProjectOp::new(vec![col(&p).alias("part")]));
    let part = project.output_attr("part").unwrap();
    let aggregate = AggregateOp::new(vec![], vec![AggExpr::first(col(&part)).into()]);
    let plan = LogicalPlan::new(LogicalOp::aggregate(project, aggregate));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(result.changed);
    assert_eq!(
        result
            .plan
            .find_ops(|op| matches!(op, LogicalOp::Project { .. }))
            .len(),
        1
    );
}

#[test]
fn test_every_aggregate_under_a_union_is_rewritten() {
    let catalog = sales_catalog();
    let left = sales();
    let right = sales();

    let plan = LogicalPlan::new(LogicalOp::union(
        LogicalOp::aggregate(left.scan, AggregateOp::group_by([&left.p])),
        LogicalOp::aggregate(
            right.scan,
            AggregateOp::new(vec![], vec![AggExpr::max(col(&right.p)).into()]),
        ),
        UnionOp::all(),
    ));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(result.changed);
    assert_eq!(scans_left(&result.plan), 0);
    assert_eq!(local_relations(&result.plan).len(), 2);
    assert_eq!(catalog.listing_stats().file_listings, 2);
}

#[test]
fn test_streaming_flag_is_kept() {
    let catalog = sales_catalog();
    let scan = LogicalOp::file_scan(sales_relation().with_streaming(true));
    let p = scan.output_attr("p").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(local_relations(&result.plan)[0].is_streaming);
}

#[test]
fn test_rewrite_is_idempotent_under_the_optimizer() {
    let catalog = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));

    let optimizer = Optimizer::from_config(&enabled(), catalog.clone()).unwrap();
    let first = optimizer.optimize(plan).unwrap();
    assert_eq!(first.rules_applied, 1);
    assert_eq!(first.iterations, 2);

    let second = optimizer.optimize(first.plan.clone()).unwrap();
    assert_eq!(second.rules_applied, 0);
    assert_eq!(second.plan, first.plan);
    assert_eq!(catalog.listing_stats().file_listings, 1);
}

#[test]
fn test_optimize_follows_the_configured_flag() {
    let catalog: Arc<dyn PartitionCatalog> = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));

    let off = optimize(plan.clone(), &StrataConfig::default(), catalog.clone()).unwrap();
    assert_eq!(off, plan);

    let on = optimize(plan, &enabled(), catalog).unwrap();
    assert_eq!(scans_left(&on), 0);
}

#[test]
fn test_listing_failure_is_propagated() {
    let catalog = Arc::new(MemoryCatalog::new());
    let Sales { scan, p, .. } = sales();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));

    let err = rule(&enabled(), &catalog).apply(plan).unwrap_err();
    assert!(matches!(err, StrataError::CatalogError(_)));
}

fn events_table() -> CatalogTable {
    CatalogTable::new(
        TableIdentifier::qualified("db", "events"),
        Schema::with_columns(vec![
            ColumnInfo::new("payload", DataType::String),
            ColumnInfo::new("ds", DataType::Date),
            ColumnInfo::new("ts", DataType::Timestamp),
        ]),
        vec!["ds".to_string(), "ts".to_string()],
    )
}

fn events_catalog(table: &CatalogTable) -> Arc<MemoryCatalog> {
    let catalog = MemoryCatalog::new();
    for (ds, ts) in [
        ("1970-01-01", "1970-01-01 01:00:00"),
        ("1970-01-02", "1970-01-02 01:00:00"),
        ("1970-01-02", "__HIVE_DEFAULT_PARTITION__"),
    ] {
        catalog.add_partition(
            &table.identifier,
            CatalogPartition::new(PartitionSpec::new().with("ds", ds).with("ts", ts)),
        );
    }
    Arc::new(catalog)
}

#[test]
fn test_catalog_table_lists_everything_without_filters() {
    let table = events_table();
    let catalog = events_catalog(&table);
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let ds = scan.output_attr("ds").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&ds])));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(result.changed);
    assert_eq!(
        catalog.listing_stats(),
        ListingStats {
            full_listings: 1,
            ..ListingStats::default()
        }
    );

    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].rows.len(), 3);
    assert_eq!(locals[0].rows[2], vec![Value::Date(1), Value::Null]);
}

#[test]
fn test_catalog_table_filters_through_the_catalog() {
    let table = events_table();
    let catalog = events_catalog(&table);
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let ds = scan.output_attr("ds").unwrap();
    let filtered = LogicalOp::filter(scan, FilterOp::new(col(&ds).eq(lit(Value::Date(1)))));
    let plan = LogicalPlan::new(LogicalOp::aggregate(filtered, AggregateOp::group_by([&ds])));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert_eq!(
        catalog.listing_stats(),
        ListingStats {
            filtered_listings: 1,
            ..ListingStats::default()
        }
    );
    assert_eq!(local_relations(&result.plan)[0].rows.len(), 2);
}

#[test]
fn test_partition_values_use_table_time_zone() {
    let table = events_table()
        .with_storage(StorageFormat::default().with_property("timeZone", "+01:00"));
    let catalog = events_catalog(&table);
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let ts = scan.output_attr("ts").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(
        scan,
        AggregateOp::new(vec![], vec![AggExpr::min(col(&ts)).into()]),
    ));

    let config = enabled().with(SESSION_TIME_ZONE_KEY, "-08:00").unwrap();
    let result = rule(&config, &catalog).apply(plan).unwrap();

    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].rows[0][1], Value::Timestamp(0));
}

#[test]
fn test_partition_values_fall_back_to_session_time_zone() {
    let table = events_table();
    let catalog = events_catalog(&table);
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let ts = scan.output_attr("ts").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(
        scan,
        AggregateOp::new(vec![], vec![AggExpr::min(col(&ts)).into()]),
    ));

    let config = enabled().with(SESSION_TIME_ZONE_KEY, "UTC+01:00").unwrap();
    let result = rule(&config, &catalog).apply(plan).unwrap();

    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].rows[0][1], Value::Timestamp(0));
}

#[test]
fn test_region_time_zones_are_accepted() {
    let table = events_table()
        .with_storage(StorageFormat::default().with_property("timeZone", "America/Los_Angeles"));
    let catalog = events_catalog(&table);
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let ts = scan.output_attr("ts").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(
        scan,
        AggregateOp::new(vec![], vec![AggExpr::min(col(&ts)).into()]),
    ));

    let config = enabled().with(SESSION_TIME_ZONE_KEY, "Asia/Tokyo").unwrap();
    let result = rule(&config, &catalog).apply(plan).unwrap();

    // 01:00 in Los Angeles during January 1970 is 09:00 UTC.
    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].rows[0][1], Value::Timestamp(9 * 3600 * 1_000_000_000));
}

#[test]
fn test_disabled_optimize_ignores_the_session_time_zone() {
    let catalog: Arc<dyn PartitionCatalog> = sales_catalog();
    let Sales { scan, p, .. } = sales();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&p])));

    for zone in ["America/Los_Angeles", "Mars/Olympus"] {
        let config = StrataConfig::default()
            .with(SESSION_TIME_ZONE_KEY, zone)
            .unwrap();
        let optimized = optimize(plan.clone(), &config, catalog.clone()).unwrap();
        assert_eq!(optimized, plan);
    }

    let config = enabled().with(SESSION_TIME_ZONE_KEY, "Mars/Olympus").unwrap();
    assert!(optimize(plan, &config, catalog).is_err());
}

#[test]
fn test_file_partition_filter_casts_in_session_time_zone() {
    let relation = FileScanOp::new(
        "/warehouse/ticks",
        Schema::with_columns(vec![ColumnInfo::new("price", DataType::Float64)]),
        Schema::with_columns(vec![ColumnInfo::new("slot", DataType::String)]),
    );
    let catalog = MemoryCatalog::new();
    catalog.register_file_relation(
        "/warehouse/ticks",
        ["1970-01-01 01:00:00", "1970-01-01 02:00:00"]
            .into_iter()
            .map(|slot| PartitionDirectory::new(vec![Value::from(slot)], vec![]))
            .collect(),
    );
    let catalog = Arc::new(catalog);

    let scan = LogicalOp::file_scan(relation);
    let slot = scan.output_attr("slot").unwrap();
    let at_epoch =
        LogicalExpr::cast(col(&slot), DataType::Timestamp).eq(lit(Value::Timestamp(0)));
    let plan = LogicalPlan::new(LogicalOp::aggregate(
        LogicalOp::filter(scan, FilterOp::new(at_epoch)),
        AggregateOp::group_by([&slot]),
    ));

    let config = enabled().with(SESSION_TIME_ZONE_KEY, "+01:00").unwrap();
    let result = rule(&config, &catalog).apply(plan).unwrap();
    assert_eq!(
        local_relations(&result.plan)[0].rows,
        vec![vec![Value::from("1970-01-01 01:00:00")]]
    );
}

/// `orders(amount)` whose partition column is declared as `Region` but
/// exposed as `region`.
fn mixed_case_orders() -> CatalogTable {
    CatalogTable::new(
        TableIdentifier::new("orders"),
        Schema::with_columns(vec![
            ColumnInfo::new("amount", DataType::Int64),
            ColumnInfo::new("region", DataType::String),
        ]),
        vec!["Region".to_string()],
    )
}

#[test]
fn test_catalog_partition_column_resolves_ignoring_case() {
    let table = mixed_case_orders();
    let catalog = Arc::new(MemoryCatalog::new());
    for region in ["eu", "us", "apac"] {
        catalog.add_partition(
            &table.identifier,
            CatalogPartition::new(PartitionSpec::new().with("Region", region)),
        );
    }

    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let region = scan.output_attr("region").unwrap();
    let grouped = LogicalPlan::new(LogicalOp::aggregate(
        scan.clone(),
        AggregateOp::group_by([&region]),
    ));
    let result = rule(&enabled(), &catalog).apply(grouped).unwrap();
    assert!(result.changed);
    assert_eq!(
        local_relations(&result.plan)[0].rows,
        vec![
            vec![Value::from("eu")],
            vec![Value::from("us")],
            vec![Value::from("apac")],
        ]
    );

    let filtered = LogicalPlan::new(LogicalOp::aggregate(
        LogicalOp::filter(scan, FilterOp::new(col(&region).eq(lit("us")))),
        AggregateOp::group_by([&region]),
    ));
    let result = rule(&enabled(), &catalog).apply(filtered).unwrap();
    assert!(result.changed);
    assert_eq!(
        local_relations(&result.plan)[0].rows,
        vec![vec![Value::from("us")]]
    );
    assert_eq!(catalog.listing_stats().filtered_listings, 1);
}

#[test]
fn test_file_partition_column_resolves_ignoring_case() {
    let mut relation = sales_relation();
    relation.output = relation
        .output
        .into_iter()
        .map(|attr| {
            if matches!(attr.name.as_str(), "p" | "q") {
                attr.with_name(attr.name.to_uppercase())
            } else {
                attr
            }
        })
        .collect();
    let catalog = sales_catalog();

    let scan = LogicalOp::file_scan(relation);
    let p = scan.output_attr("P").unwrap();
    let q = scan.output_attr("Q").unwrap();
    let filtered = LogicalOp::filter(scan, FilterOp::new(col(&q).eq(lit("a"))));
    let aggregate = AggregateOp::group_by([&p]).with_agg(AggExpr::max(col(&q)));
    let plan = LogicalPlan::new(LogicalOp::aggregate(filtered, aggregate));

    let result = rule(&enabled(), &catalog).apply(plan).unwrap();
    assert!(result.changed);

    let locals = local_relations(&result.plan);
    assert_eq!(locals[0].output, vec![p, q]);
    assert_eq!(
        locals[0].rows,
        vec![
            vec![Value::from(1i32), Value::from("a")],
            vec![Value::from(2i32), Value::from("a")],
        ]
    );
}

#[test]
fn test_missing_partition_column_names_the_column() {
    let table = CatalogTable::new(
        TableIdentifier::new("orders"),
        Schema::with_columns(vec![
            ColumnInfo::new("id", DataType::Int64),
            ColumnInfo::new("amount", DataType::Int64),
        ]),
        vec!["region".to_string()],
    );
    let scan = LogicalOp::catalog_scan(CatalogScanOp::new(table));
    let id = scan.output_attr("id").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&id])));

    let catalog = Arc::new(MemoryCatalog::new());
    let err = rule(&enabled(), &catalog).apply(plan).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ColumnNotFound: unable to find the column `region` given [id, amount]"
    );
}

#[test]
fn test_replacer_rejects_unpartitioned_relations() {
    let schema = Schema::with_columns(vec![ColumnInfo::new("a", DataType::Int64)]);
    let scan = LogicalOp::scan(strata_logical::ScanOp::new(TableIdentifier::new("t"), &schema));
    let catalog = MemoryCatalog::new();

    let err = ScanReplacer::new(&catalog, TimeZone::utc())
        .replace(&scan, scan.clone(), &[])
        .unwrap_err();
    assert!(matches!(err, StrataError::OptimizerInvariant { .. }));
    assert!(err.to_string().contains(METADATA_ONLY_QUERY_KEY));

    // Through the rule the same plan is simply left alone.
    let a = scan.output_attr("a").unwrap();
    let plan = LogicalPlan::new(LogicalOp::aggregate(scan, AggregateOp::group_by([&a])));
    let result = rule(&enabled(), &Arc::new(catalog)).apply(plan).unwrap();
    assert!(!result.changed);
}

#[derive(Debug, Clone)]
struct Case {
    partition_filter: Option<i32>,
    data_filter: bool,
    rename: bool,
    aggregate: u8,
}

fn cases() -> impl Strategy<Value = Case> {
    (
        proptest::option::of(0i32..4),
        any::<bool>(),
        any::<bool>(),
        0u8..5,
    )
        .prop_map(|(partition_filter, data_filter, rename, aggregate)| Case {
            partition_filter,
            data_filter,
            rename,
            aggregate,
        })
}

fn build(case: &Case) -> LogicalPlan {
    let Sales { scan, p, q, amount } = sales();
    let mut op = scan;

    if let Some(min) = case.partition_filter {
        op = LogicalOp::filter(op, FilterOp::new(col(&p).gt_eq(lit(min))));
    }
    if case.data_filter {
        op = LogicalOp::filter(op, FilterOp::new(col(&amount).gt(lit(0i64))));
    }

    let key = if case.rename {
        op = LogicalOp::project(
            op,
            ProjectOp::new(vec![col(&p).alias("p2"), col(&q)]),
        );
        op.output_attr("p2").unwrap()
    } else {
        p
    };

    let aggregate = match case.aggregate {
        0 => AggregateOp::group_by([&key]),
        1 => AggregateOp::group_by([&key]).with_agg(AggExpr::count(col(&q)).with_distinct(true)),
        2 => AggregateOp::group_by([&key]).with_agg(AggExpr::sum(col(&q))),
        3 => AggregateOp::group_by([&key]).with_agg(AggExpr::last(col(&q))),
        _ => AggregateOp::group_by([&key]).with_agg(AggExpr::count(col(&q))),
    };
    LogicalPlan::new(LogicalOp::aggregate(op, aggregate))
}

proptest! {
    #[test]
    fn prop_disabled_rule_is_identity(case in cases()) {
        let catalog = sales_catalog();
        let plan = build(&case);

        let result = rule(&StrataConfig::default(), &catalog).apply(plan.clone()).unwrap();
        prop_assert!(!result.changed);
        prop_assert_eq!(result.plan, plan);
        prop_assert_eq!(catalog.listing_stats(), ListingStats::default());
    }

    #[test]
    fn prop_rewrite_preserves_output_and_is_idempotent(case in cases()) {
        let catalog = sales_catalog();
        let plan = build(&case);
        let output = plan.output();
        let rule = rule(&enabled(), &catalog);

        let first = rule.apply(plan).unwrap();
        let expected = !case.data_filter && matches!(case.aggregate, 0 | 1 | 3);
        prop_assert_eq!(first.changed, expected);
        prop_assert_eq!(first.plan.output(), output);

        let second = rule.apply(first.plan.clone()).unwrap();
        prop_assert!(!second.changed);
        prop_assert_eq!(second.plan, first.plan);
    }
}
