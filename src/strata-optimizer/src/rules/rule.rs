//! Optimization rule trait and the results rules report.

use common_error::StrataResult;
use strata_logical::LogicalPlan;

/// A single optimization rule that can transform a logical plan.
///
/// A rewrite must leave the multiset of rows the plan produces unchanged,
/// including the identity of every output attribute.
pub trait OptimizationRule: Send + Sync {
    /// Get the name of this rule.
    fn name(&self) -> &'static str;

    /// Get a description of what this rule does.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Apply this rule to the plan.
    ///
    /// A rule that does not apply returns the plan unchanged via
    /// [`Transformed::no`].
    fn apply(&self, plan: LogicalPlan) -> StrataResult<Transformed>;
}

/// The result of applying an optimization rule.
#[derive(Debug, Clone)]
pub struct Transformed {
    /// The (potentially transformed) plan.
    pub plan: LogicalPlan,
    /// Whether the plan was actually changed.
    pub changed: bool,
}

impl Transformed {
    /// The plan was changed.
    pub fn yes(plan: LogicalPlan) -> Self {
        Self {
            plan,
            changed: true,
        }
    }

    /// The plan was left as is.
    pub fn no(plan: LogicalPlan) -> Self {
        Self {
            plan,
            changed: false,
        }
    }
}

impl From<LogicalPlan> for Transformed {
    fn from(plan: LogicalPlan) -> Self {
        Self::no(plan)
    }
}

/// A trace entry for a single rule application.
#[derive(Debug, Clone)]
pub struct RuleTrace {
    /// The name of the rule that was applied.
    pub rule_name: String,
    /// The plan before the rule was applied (as explain string).
    pub before: String,
    /// The plan after the rule was applied (as explain string).
    pub after: String,
    /// Whether the rule actually changed the plan.
    pub changed: bool,
}

impl RuleTrace {
    /// Create a new trace entry.
    pub fn new(
        rule_name: impl Into<String>,
        before: impl Into<String>,
        after: impl Into<String>,
        changed: bool,
    ) -> Self {
        Self {
            rule_name: rule_name.into(),
            before: before.into(),
            after: after.into(),
            changed,
        }
    }
}

/// The result of optimization with optional trace information.
#[derive(Debug, Clone)]
pub struct OptimizedPlan {
    /// The final optimized plan.
    pub plan: LogicalPlan,
    /// Number of optimization iterations performed.
    pub iterations: usize,
    /// Number of rule applications that changed the plan.
    pub rules_applied: usize,
    /// Rule applications, recorded when tracing is enabled.
    pub trace: Vec<RuleTrace>,
}

impl OptimizedPlan {
    /// Wrap a plan no rule has touched yet.
    pub fn new(plan: LogicalPlan) -> Self {
        Self {
            plan,
            iterations: 0,
            rules_applied: 0,
            trace: Vec::new(),
        }
    }

    /// Format the trace as a human-readable string.
    pub fn format_trace(&self) -> String {
        let mut output = format!(
            "Optimization completed in {} iterations, {} rules applied\n",
            self.iterations, self.rules_applied
        );

        if self.trace.is_empty() {
            output.push_str("  (no trace available)\n");
            return output;
        }

        for (i, entry) in self.trace.iter().filter(|t| t.changed).enumerate() {
            output.push_str(&format!(
                "\n--- Rule {} applied: {} ---\n",
                i + 1,
                entry.rule_name
            ));
            output.push_str("Before:\n");
            output.push_str(&entry.before);
            output.push_str("\nAfter:\n");
            output.push_str(&entry.after);
        }
        output
    }
}
