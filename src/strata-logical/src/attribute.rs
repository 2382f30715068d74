//! Column attributes and their identity.
//!
//! An [`AttributeRef`] names a column produced by some operator. Two attribute
//! values refer to the same column exactly when their [`ExprId`]s match; the
//! display name may differ (for example after case-insensitive resolution).

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use common_error::{StrataError, StrataResult};
use strata_core::{ColumnInfo, DataType};

static NEXT_EXPR_ID: AtomicU64 = AtomicU64::new(0);

/// Globally unique identity of a named expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExprId(u64);

impl ExprId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_EXPR_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw id.
    pub const fn id(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ExprId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A reference to a column produced somewhere in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Display name.
    pub name: String,
    /// Data type of the column.
    pub data_type: DataType,
    /// Whether the column can contain nulls.
    pub nullable: bool,
    /// Identity of the column.
    pub id: ExprId,
}

impl AttributeRef {
    /// Create an attribute with a fresh identity.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            id: ExprId::next(),
        }
    }

    /// Create an attribute with a fresh identity from a schema column.
    pub fn from_column(column: &ColumnInfo) -> Self {
        Self::new(column.name.clone(), column.data_type).with_nullable(column.nullable)
    }

    /// Set nullability.
    #[must_use]
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// The same attribute under another name.
    #[must_use]
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Whether both values refer to the same column.
    pub fn semantic_eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Display for AttributeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// A set of attributes compared by identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    attrs: BTreeMap<ExprId, AttributeRef>,
}

impl AttributeSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an attribute; an attribute with the same id is kept as is.
    pub fn insert(&mut self, attr: AttributeRef) {
        self.attrs.entry(attr.id).or_insert(attr);
    }

    /// Whether an attribute with the same identity is present.
    pub fn contains(&self, attr: &AttributeRef) -> bool {
        self.attrs.contains_key(&attr.id)
    }

    /// Look up the member sharing `attr`'s identity.
    pub fn get(&self, attr: &AttributeRef) -> Option<&AttributeRef> {
        self.attrs.get(&attr.id)
    }

    /// Whether every member of `self` is in `other`.
    pub fn is_subset(&self, other: &Self) -> bool {
        self.attrs.keys().all(|id| other.attrs.contains_key(id))
    }

    /// Members of `self` missing from `other`.
    pub fn difference<'a>(&'a self, other: &'a Self) -> impl Iterator<Item = &'a AttributeRef> {
        self.attrs
            .iter()
            .filter(|(id, _)| !other.attrs.contains_key(id))
            .map(|(_, a)| a)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeRef> {
        self.attrs.values()
    }
}

impl FromIterator<AttributeRef> for AttributeSet {
    fn from_iter<T: IntoIterator<Item = AttributeRef>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl Extend<AttributeRef> for AttributeSet {
    fn extend<T: IntoIterator<Item = AttributeRef>>(&mut self, iter: T) {
        for attr in iter {
            self.insert(attr);
        }
    }
}

impl std::fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items: Vec<String> = self.iter().map(ToString::to_string).collect();
        write!(f, "{{{}}}", items.join(", "))
    }
}

/// Case-insensitive name lookup over an operator's output.
///
/// Built once per relation; lookups do not rescan the output.
#[derive(Debug, Clone)]
pub struct AttributeResolver {
    by_name: HashMap<String, AttributeRef>,
    ambiguous: HashSet<String>,
    names: Vec<String>,
}

impl AttributeResolver {
    /// Index the given output attributes by lower-cased name.
    pub fn new(output: &[AttributeRef]) -> Self {
        let mut by_name = HashMap::with_capacity(output.len());
        let mut ambiguous = HashSet::new();
        for attr in output {
            let key = attr.name.to_lowercase();
            if by_name.contains_key(&key) {
                ambiguous.insert(key);
            } else {
                by_name.insert(key, attr.clone());
            }
        }

        Self {
            by_name,
            ambiguous,
            names: output.iter().map(|a| a.name.clone()).collect(),
        }
    }

    /// Resolve a column name, ignoring case.
    pub fn resolve(&self, name: &str) -> StrataResult<AttributeRef> {
        let key = name.to_lowercase();
        if self.ambiguous.contains(&key) {
            return Err(StrataError::schema_error(format!(
                "reference `{name}` is ambiguous, could be any of [{}]",
                self.names.join(", ")
            )));
        }
        self.by_name
            .get(&key)
            .cloned()
            .ok_or_else(|| StrataError::column_not_found(name, self.names.iter().cloned()))
    }

    /// Resolve several names, preserving their order.
    pub fn resolve_all<S: AsRef<str>>(&self, names: &[S]) -> StrataResult<Vec<AttributeRef>> {
        names.iter().map(|n| self.resolve(n.as_ref())).collect()
    }
}
