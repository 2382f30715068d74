//! In-memory partition catalog.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use parking_lot::RwLock;

use common_error::{StrataError, StrataResult};
use strata_core::types::cast_partition_value;
use strata_core::{
    CatalogPartition, CatalogTable, PartitionDirectory, TableIdentifier, TimeZone,
};
use strata_logical::{FileScanOp, LogicalExpr};

use crate::catalog::PartitionCatalog;
use crate::eval::{PartitionEvaluator, PartitionValues};

/// Number of listing calls served, per capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingStats {
    /// `list_file_partitions` calls.
    pub file_listings: usize,
    /// `list_partitions_by_filter` calls.
    pub filtered_listings: usize,
    /// `list_partitions` calls.
    pub full_listings: usize,
}

#[derive(Debug, Default)]
struct ListingCounters {
    file_listings: AtomicUsize,
    filtered_listings: AtomicUsize,
    full_listings: AtomicUsize,
}

/// Partition catalog backed by in-memory maps.
///
/// Catalog tables are keyed by identifier, file-based relations by their
/// root location.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tables: RwLock<HashMap<TableIdentifier, Vec<CatalogPartition>>>,
    file_relations: RwLock<HashMap<String, Vec<PartitionDirectory>>>,
    counters: ListingCounters,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the partitions of a catalog table.
    pub fn register_table(&self, table: &TableIdentifier, partitions: Vec<CatalogPartition>) {
        self.tables.write().insert(table.clone(), partitions);
    }

    /// Append a partition to a catalog table, registering the table if needed.
    pub fn add_partition(&self, table: &TableIdentifier, partition: CatalogPartition) {
        self.tables
            .write()
            .entry(table.clone())
            .or_default()
            .push(partition);
    }

    /// Register (or replace) the partition directories under `location`.
    pub fn register_file_relation(
        &self,
        location: impl Into<String>,
        directories: Vec<PartitionDirectory>,
    ) {
        self.file_relations.write().insert(location.into(), directories);
    }

    /// Listing calls served so far.
    pub fn listing_stats(&self) -> ListingStats {
        ListingStats {
            file_listings: self.counters.file_listings.load(Ordering::Relaxed),
            filtered_listings: self.counters.filtered_listings.load(Ordering::Relaxed),
            full_listings: self.counters.full_listings.load(Ordering::Relaxed),
        }
    }

    fn table_partitions(&self, table: &TableIdentifier) -> StrataResult<Vec<CatalogPartition>> {
        self.tables
            .read()
            .get(table)
            .cloned()
            .ok_or_else(|| StrataError::catalog(format!("table `{table}` is not registered")))
    }
}

impl PartitionCatalog for MemoryCatalog {
    fn list_file_partitions(
        &self,
        relation: &FileScanOp,
        predicates: &[LogicalExpr],
        time_zone: &TimeZone,
    ) -> StrataResult<Vec<PartitionDirectory>> {
        self.counters.file_listings.fetch_add(1, Ordering::Relaxed);

        let directories = self
            .file_relations
            .read()
            .get(&relation.location)
            .cloned()
            .ok_or_else(|| {
                StrataError::catalog(format!(
                    "no partition directories under `{}`",
                    relation.location
                ))
            })?;

        let names = relation.partition_schema.column_names();
        let evaluator = PartitionEvaluator::new(*time_zone);
        let mut selected = Vec::with_capacity(directories.len());
        for directory in directories {
            if directory.values.len() != names.len() {
                return Err(StrataError::catalog(format!(
                    "partition directory under `{}` has {} values for {} partition columns",
                    relation.location,
                    directory.values.len(),
                    names.len()
                )));
            }
            let values = PartitionValues::new(
                names
                    .iter()
                    .map(|n| n.to_string())
                    .zip(directory.values.iter().cloned()),
            );
            if evaluator.matches_all(predicates, &values)? {
                selected.push(directory);
            }
        }

        debug!(
            "Listed {} partition directories under '{}' ({} predicates)",
            selected.len(),
            relation.location,
            predicates.len()
        );
        Ok(selected)
    }

    fn list_partitions_by_filter(
        &self,
        table: &CatalogTable,
        predicates: &[LogicalExpr],
        time_zone: &TimeZone,
    ) -> StrataResult<Vec<CatalogPartition>> {
        self.counters.filtered_listings.fetch_add(1, Ordering::Relaxed);

        let time_zone = match table.time_zone_property() {
            Some(id) => TimeZone::parse(id)?,
            None => *time_zone,
        };
        let partition_schema = table.partition_schema()?;
        let evaluator = PartitionEvaluator::new(time_zone);

        let mut selected = Vec::new();
        for partition in self.table_partitions(&table.identifier)? {
            let typed = partition_schema
                .columns
                .iter()
                .map(|c| {
                    cast_partition_value(partition.spec.get(&c.name), c.data_type, &time_zone)
                        .map(|v| (c.name.clone(), v))
                })
                .collect::<StrataResult<Vec<_>>>()?;
            if evaluator.matches_all(predicates, &PartitionValues::new(typed))? {
                selected.push(partition);
            }
        }

        debug!(
            "Listed {} partitions of {} ({} predicates)",
            selected.len(),
            table.identifier,
            predicates.len()
        );
        Ok(selected)
    }

    fn list_partitions(&self, table: &CatalogTable) -> StrataResult<Vec<CatalogPartition>> {
        self.counters.full_listings.fetch_add(1, Ordering::Relaxed);
        let partitions = self.table_partitions(&table.identifier)?;
        debug!("Listed all {} partitions of {}", partitions.len(), table.identifier);
        Ok(partitions)
    }
}
