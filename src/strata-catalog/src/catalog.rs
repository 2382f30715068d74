//! The partition metadata capability consumed by the optimizer.

use common_error::StrataResult;
use strata_core::{CatalogPartition, CatalogTable, PartitionDirectory, TimeZone};
use strata_logical::{FileScanOp, LogicalExpr};

/// Enumerates the partitions of partitioned relations.
///
/// Predicates passed to the filtered listings are deterministic and
/// reference partition columns only, by the names the relation records.
/// Implementations may return a superset of the matching partitions but
/// never drop a matching one.
pub trait PartitionCatalog: Send + Sync {
    /// Partition directories of a file-based relation that satisfy all
    /// `predicates`. Values in each directory follow the relation's
    /// partition schema order. `time_zone` is the session time zone, used
    /// when predicates cast strings to timestamps.
    fn list_file_partitions(
        &self,
        relation: &FileScanOp,
        predicates: &[LogicalExpr],
        time_zone: &TimeZone,
    ) -> StrataResult<Vec<PartitionDirectory>>;

    /// Catalog partitions of `table` that satisfy all `predicates`.
    ///
    /// `time_zone` is the session time zone, for tables that do not record
    /// their own.
    fn list_partitions_by_filter(
        &self,
        table: &CatalogTable,
        predicates: &[LogicalExpr],
        time_zone: &TimeZone,
    ) -> StrataResult<Vec<CatalogPartition>>;

    /// Every catalog partition of `table`.
    fn list_partitions(&self, table: &CatalogTable) -> StrataResult<Vec<CatalogPartition>>;
}
