//! The driver that applies rules to logical plans.
//!
//! Rules are applied in order, repeatedly, until an iteration changes
//! nothing or the configured iteration limit is reached.

use std::sync::Arc;

use common_config::{OptimizerConfig, StrataConfig};
use common_error::StrataResult;
use log::debug;
use strata_catalog::PartitionCatalog;
use strata_logical::LogicalPlan;

use super::metadata_only::MetadataOnlyQuery;
use super::rule::{OptimizationRule, OptimizedPlan, RuleTrace};

/// Applies a fixed list of rules to logical plans.
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizationRule>>,
    config: OptimizerConfig,
}

impl Optimizer {
    /// Create a new optimizer with the given rules.
    pub fn new(rules: Vec<Box<dyn OptimizationRule>>) -> Self {
        Self {
            rules,
            config: OptimizerConfig::default(),
        }
    }

    /// Create a new optimizer with custom config.
    pub fn with_config(rules: Vec<Box<dyn OptimizationRule>>, config: OptimizerConfig) -> Self {
        Self { rules, config }
    }

    /// Build the standard rule set for a session.
    pub fn from_config(
        config: &StrataConfig,
        catalog: Arc<dyn PartitionCatalog>,
    ) -> StrataResult<Self> {
        let metadata_only = MetadataOnlyQuery::new(config, catalog)?;
        Ok(Self::with_config(
            vec![Box::new(metadata_only)],
            config.optimizer.clone(),
        ))
    }

    /// Add a rule to the optimizer.
    pub fn add_rule<R: OptimizationRule + 'static>(&mut self, rule: R) {
        self.rules.push(Box::new(rule));
    }

    /// Names of the registered rules, in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Optimize a logical plan, iterating until a fixpoint.
    pub fn optimize(&self, plan: LogicalPlan) -> StrataResult<OptimizedPlan> {
        let mut current_plan = plan;
        let mut iterations = 0;
        let mut rules_applied = 0;
        let mut trace = Vec::new();

        loop {
            if iterations >= self.config.max_iterations {
                debug!(
                    "Optimizer reached max iterations ({}), stopping",
                    self.config.max_iterations
                );
                break;
            }

            iterations += 1;
            let (plan, applied) = self.run_rules(current_plan, iterations, &mut trace)?;
            current_plan = plan;
            rules_applied += applied;

            if applied == 0 {
                debug!("No changes in iteration {iterations}, reached fixpoint");
                break;
            }
        }

        Ok(OptimizedPlan {
            plan: current_plan,
            iterations,
            rules_applied,
            trace,
        })
    }

    /// Optimize with a single pass (no fixpoint iteration).
    pub fn optimize_once(&self, plan: LogicalPlan) -> StrataResult<OptimizedPlan> {
        let mut trace = Vec::new();
        let (plan, rules_applied) = self.run_rules(plan, 1, &mut trace)?;
        Ok(OptimizedPlan {
            plan,
            iterations: 1,
            rules_applied,
            trace,
        })
    }

    /// Apply every rule once, returning the plan and how many rules changed it.
    fn run_rules(
        &self,
        plan: LogicalPlan,
        iteration: usize,
        trace: &mut Vec<RuleTrace>,
    ) -> StrataResult<(LogicalPlan, usize)> {
        let mut current_plan = plan;
        let mut applied = 0;

        for rule in &self.rules {
            let before = self.config.enable_trace.then(|| current_plan.explain());

            let result = rule.apply(current_plan)?;
            if result.changed {
                applied += 1;
                debug!("Rule '{}' applied in iteration {iteration}", rule.name());

                if let Some(before) = before {
                    trace.push(RuleTrace::new(
                        rule.name(),
                        before,
                        result.plan.explain(),
                        true,
                    ));
                }
            }
            current_plan = result.plan;
        }

        Ok((current_plan, applied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::rule::Transformed;
    use strata_core::{ColumnInfo, DataType, Schema, TableIdentifier};
    use strata_logical::{LimitOp, LogicalOp, PlanBuilder, ScanOp};

    struct AddLimitRule;

    impl OptimizationRule for AddLimitRule {
        fn name(&self) -> &'static str {
            "AddLimit"
        }

        fn apply(&self, plan: LogicalPlan) -> StrataResult<Transformed> {
            if matches!(plan.root(), LogicalOp::Limit { .. }) {
                return Ok(Transformed::no(plan));
            }
            Ok(Transformed::yes(LogicalPlan::new(LogicalOp::limit(
                plan.into_root(),
                LimitOp::new(1000),
            ))))
        }
    }

    struct NoChangeRule;

    impl OptimizationRule for NoChangeRule {
        fn name(&self) -> &'static str {
            "NoChange"
        }

        fn apply(&self, plan: LogicalPlan) -> StrataResult<Transformed> {
            Ok(Transformed::no(plan))
        }
    }

    fn scan() -> ScanOp {
        let schema = Schema::with_columns(vec![ColumnInfo::new("age", DataType::Int64)]);
        ScanOp::new(TableIdentifier::new("people"), &schema)
    }

    #[test]
    fn test_optimizer_basic() {
        let optimizer = Optimizer::new(vec![Box::new(AddLimitRule)]);
        let result = optimizer.optimize(PlanBuilder::scan(scan()).build()).unwrap();

        assert_eq!(result.rules_applied, 1);
        assert_eq!(result.iterations, 2);
        assert!(
            result
                .plan
                .contains_op(|op| matches!(op, LogicalOp::Limit { .. }))
        );
    }

    #[test]
    fn test_optimizer_fixpoint() {
        let optimizer = Optimizer::new(vec![Box::new(NoChangeRule)]);
        let result = optimizer.optimize(PlanBuilder::scan(scan()).build()).unwrap();

        assert_eq!(result.iterations, 1);
        assert_eq!(result.rules_applied, 0);
    }

    #[test]
    fn test_optimizer_max_iterations() {
        struct AlwaysChange;

        impl OptimizationRule for AlwaysChange {
            fn name(&self) -> &'static str {
                "AlwaysChange"
            }

            fn apply(&self, plan: LogicalPlan) -> StrataResult<Transformed> {
                Ok(Transformed::yes(plan))
            }
        }

        let config = OptimizerConfig::default().with_max_iterations(3);
        let optimizer = Optimizer::with_config(vec![Box::new(AlwaysChange)], config);
        let result = optimizer.optimize(PlanBuilder::scan(scan()).build()).unwrap();

        assert_eq!(result.iterations, 3);
        assert_eq!(result.rules_applied, 3);
    }

    #[test]
    fn test_optimizer_with_trace() {
        let config = OptimizerConfig::default().with_trace(true);
        let optimizer = Optimizer::with_config(vec![Box::new(AddLimitRule)], config);
        let result = optimizer.optimize(PlanBuilder::scan(scan()).build()).unwrap();

        assert_eq!(result.trace.len(), 1);
        assert!(result.trace[0].changed);
        assert!(result.trace[0].after.contains("Limit"));
    }

    #[test]
    fn test_optimize_once() {
        let mut optimizer = Optimizer::new(vec![]);
        optimizer.add_rule(AddLimitRule);
        optimizer.add_rule(NoChangeRule);
        assert_eq!(optimizer.rule_names(), vec!["AddLimit", "NoChange"]);

        let result = optimizer
            .optimize_once(PlanBuilder::scan(scan()).build())
            .unwrap();
        assert_eq!(result.iterations, 1);
        assert_eq!(result.rules_applied, 1);
    }
}
