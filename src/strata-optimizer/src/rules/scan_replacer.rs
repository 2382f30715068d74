//! Replaces a partitioned relation with the rows of its partition values.

use log::debug;

use common_config::METADATA_ONLY_QUERY_KEY;
use common_error::{StrataError, StrataResult};
use strata_catalog::PartitionCatalog;
use strata_core::types::cast_partition_value;
use strata_core::{TimeZone, Value};
use strata_logical::{AttributeRef, AttributeSet, LocalRelationOp, LogicalExpr, LogicalOp};

use super::partitioned_relation::partition_attributes;

/// Builds the local relation that stands in for a partitioned relation.
pub struct ScanReplacer<'a> {
    catalog: &'a dyn PartitionCatalog,
    session_time_zone: TimeZone,
}

impl<'a> ScanReplacer<'a> {
    /// Create a replacer listing partitions through `catalog`.
    ///
    /// `session_time_zone` applies to catalog tables that do not record a
    /// time zone of their own.
    pub fn new(catalog: &'a dyn PartitionCatalog, session_time_zone: TimeZone) -> Self {
        Self {
            catalog,
            session_time_zone,
        }
    }

    /// Replace `relation` inside `subtree` with one row per partition that
    /// satisfies every predicate in `filters`.
    ///
    /// The replacement exposes the relation's partition attributes, with
    /// their identities, in partition-column order. No other node changes.
    pub fn replace(
        &self,
        relation: &LogicalOp,
        subtree: LogicalOp,
        filters: &[LogicalExpr],
    ) -> StrataResult<LogicalOp> {
        let predicates = remap_to_relation_names(filters, &relation.output());
        let replacement = self.local_relation(relation, &predicates)?;
        debug!(
            "Replacing {} with {} partition rows",
            relation.name(),
            replacement.rows.len()
        );

        let replacement = LogicalOp::local_relation(replacement);
        Ok(subtree.transform_up(&|op| {
            if &op == relation {
                replacement.clone()
            } else {
                op
            }
        }))
    }

    fn local_relation(
        &self,
        relation: &LogicalOp,
        predicates: &[LogicalExpr],
    ) -> StrataResult<LocalRelationOp> {
        let attrs = match partition_attributes(relation)? {
            Some(attrs) => attrs,
            None => return Err(unexpected_relation(relation)),
        };

        match relation {
            LogicalOp::FileScan(scan) => {
                let directories = self.catalog.list_file_partitions(
                    scan,
                    predicates,
                    &self.session_time_zone,
                )?;
                let rows = directories
                    .into_iter()
                    .map(|dir| {
                        if dir.values.len() == attrs.len() {
                            Ok(dir.values)
                        } else {
                            Err(StrataError::catalog(format!(
                                "partition under `{}` has {} values for {} partition columns",
                                scan.location,
                                dir.values.len(),
                                attrs.len()
                            )))
                        }
                    })
                    .collect::<StrataResult<Vec<_>>>()?;
                Ok(LocalRelationOp::new(attrs, rows).with_streaming(scan.is_streaming))
            }
            LogicalOp::CatalogScan(scan) => {
                let time_zone = match scan.table.time_zone_property() {
                    Some(id) => TimeZone::parse(id)?,
                    None => self.session_time_zone,
                };
                let partitions = if predicates.is_empty() {
                    self.catalog.list_partitions(&scan.table)?
                } else {
                    self.catalog.list_partitions_by_filter(
                        &scan.table,
                        predicates,
                        &self.session_time_zone,
                    )?
                };
                let rows = partitions
                    .iter()
                    .map(|partition| {
                        attrs
                            .iter()
                            .map(|attr| {
                                cast_partition_value(
                                    partition.spec.get(&attr.name),
                                    attr.data_type,
                                    &time_zone,
                                )
                            })
                            .collect::<StrataResult<Vec<Value>>>()
                    })
                    .collect::<StrataResult<Vec<_>>>()?;
                Ok(LocalRelationOp::new(attrs, rows))
            }
            other => Err(unexpected_relation(other)),
        }
    }
}

fn unexpected_relation(relation: &LogicalOp) -> StrataError {
    StrataError::optimizer_invariant(
        format!(
            "unexpected plan node {} in place of a partitioned relation",
            relation.name()
        ),
        METADATA_ONLY_QUERY_KEY,
    )
}

/// Rename every column reference to the name the relation itself records
/// for that attribute, so listings can resolve predicates by name.
fn remap_to_relation_names(filters: &[LogicalExpr], output: &[AttributeRef]) -> Vec<LogicalExpr> {
    let by_id: AttributeSet = output.iter().cloned().collect();
    filters
        .iter()
        .map(|filter| {
            filter.clone().transform_up(&|expr| match expr {
                LogicalExpr::Column(attr) => match by_id.get(&attr) {
                    Some(own) if own.name != attr.name => {
                        LogicalExpr::Column(attr.with_name(own.name.clone()))
                    }
                    _ => LogicalExpr::Column(attr),
                },
                other => other,
            })
        })
        .collect()
}
