//! Composable filters for Rexster vertex and edge queries.
//!
//! A [`QueryExpression`] is a conjunction of property constraints plus
//! optional label and paging. It compiles to two targets:
//! - [`QueryExpression::to_query_parameters`] for the plain REST endpoints
//!   (`_skip`, `_take`, `_label`, `_properties`)
//! - [`QueryExpression::to_traversal_fragment`] for Gremlin scripts sent to
//!   the `tp/gremlin` extension

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{QueryError, Result};
use crate::value::TypedValue;

pub const SKIP_KEY: &str = "_skip";
pub const TAKE_KEY: &str = "_take";
pub const LABEL_KEY: &str = "_label";
pub const PROPERTIES_KEY: &str = "_properties";

/// Query-string arguments in emission order
pub type QueryParameters = IndexMap<String, String>;

/// Property comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    LessThan,
    LessThanEqual,
    Equal,
    NotEqual,
    GreaterThanEqual,
    GreaterThan,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::LessThan,
        Comparison::LessThanEqual,
        Comparison::Equal,
        Comparison::NotEqual,
        Comparison::GreaterThanEqual,
        Comparison::GreaterThan,
    ];

    /// Symbol used inside `_properties`
    pub const fn symbol(self) -> &'static str {
        match self {
            Comparison::LessThan => "<",
            Comparison::LessThanEqual => "<=",
            Comparison::Equal => "=",
            Comparison::NotEqual => "<>",
            Comparison::GreaterThanEqual => ">=",
            Comparison::GreaterThan => ">",
        }
    }

    /// Blueprints `Compare` constant used in Gremlin `has` steps
    pub const fn gremlin_token(self) -> &'static str {
        match self {
            Comparison::LessThan => "Compare.LESS_THAN",
            Comparison::LessThanEqual => "Compare.LESS_THAN_EQUAL",
            Comparison::Equal => "Compare.EQUAL",
            Comparison::NotEqual => "Compare.NOT_EQUAL",
            Comparison::GreaterThanEqual => "Compare.GREATER_THAN_EQUAL",
            Comparison::GreaterThan => "Compare.GREATER_THAN",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Comparison {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Comparison::ALL
            .into_iter()
            .find(|c| c.symbol() == s)
            .ok_or_else(|| QueryError::InvalidArgument(format!("unknown comparison '{}'", s)))
    }
}

/// A single `key <cmp> value` predicate
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyConstraint {
    pub key: String,
    pub comparison: Comparison,
    pub value: TypedValue,
}

impl PropertyConstraint {
    pub fn new(key: impl Into<String>, comparison: Comparison, value: impl Into<TypedValue>) -> Self {
        Self {
            key: key.into(),
            comparison,
            value: value.into(),
        }
    }

    pub fn equal(key: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        Self::new(key, Comparison::Equal, value)
    }

    /// `[key,cmp,value]` with the value in typed-literal form
    fn to_bracketed(&self) -> String {
        format!("[{},{},{}]", self.key, self.comparison, self.value.encode())
    }

    fn to_has_step(&self) -> String {
        format!(
            "has({},{},{})",
            quote_double(&self.key),
            self.comparison.gremlin_token(),
            self.value.to_script_literal()
        )
    }
}

/// Immutable conjunction of filters with optional label and paging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExpression {
    skip: Option<u64>,
    take: Option<u64>,
    label: Option<String>,
    constraints: Vec<PropertyConstraint>,
}

impl QueryExpression {
    /// Expression with no filter at all
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> QueryBuilder {
        QueryBuilder::default()
    }

    pub fn skip(&self) -> Option<u64> {
        self.skip
    }

    pub fn take(&self) -> Option<u64> {
        self.take
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn constraints(&self) -> &[PropertyConstraint] {
        &self.constraints
    }

    /// True when a label or property constraint narrows the selection
    pub fn has_filters(&self) -> bool {
        self.label.is_some() || !self.constraints.is_empty()
    }

    /// True when `take` is zero, so no element can match
    pub fn selects_nothing(&self) -> bool {
        self.take == Some(0)
    }

    /// Combine two expressions into a new one.
    ///
    /// Skip, take and label come from `self` when set, otherwise from `other`.
    /// Constraints are concatenated, `self` first.
    pub fn merge(&self, other: &QueryExpression) -> QueryExpression {
        let mut constraints = Vec::with_capacity(self.constraints.len() + other.constraints.len());
        constraints.extend(self.constraints.iter().cloned());
        constraints.extend(other.constraints.iter().cloned());

        QueryExpression {
            skip: self.skip.or(other.skip),
            take: self.take.or(other.take),
            label: self.label.clone().or_else(|| other.label.clone()),
            constraints,
        }
    }

    /// Query-string arguments for the REST neighbour endpoints
    pub fn to_query_parameters(&self) -> QueryParameters {
        let mut params = QueryParameters::new();
        if let Some(skip) = self.skip {
            params.insert(SKIP_KEY.to_string(), skip.to_string());
        }
        if let Some(take) = self.take {
            params.insert(TAKE_KEY.to_string(), take.to_string());
        }
        if let Some(label) = &self.label {
            params.insert(LABEL_KEY.to_string(), label.clone());
        }
        let properties = self.properties_string();
        if !properties.is_empty() {
            params.insert(PROPERTIES_KEY.to_string(), properties);
        }
        params
    }

    /// Empty with no constraints, `[k,c,v]` for one, `[[k,c,v],...]` for several
    fn properties_string(&self) -> String {
        match self.constraints.as_slice() {
            [] => String::new(),
            [single] => single.to_bracketed(),
            many => {
                let inner: Vec<String> = many.iter().map(PropertyConstraint::to_bracketed).collect();
                format!("[{}]", inner.join(","))
            }
        }
    }

    /// Gremlin steps selecting the filtered elements.
    ///
    /// Returns an empty string when nothing is filtered; callers then use
    /// the unfiltered traversal instead of splicing the fragment in.
    /// A zero `take` yields `[start..start-1]`, which Gremlin does not read
    /// as empty; check [`QueryExpression::selects_nothing`] before sending.
    pub fn to_traversal_fragment(&self) -> String {
        let mut steps = Vec::with_capacity(self.constraints.len() + 1);
        if let Some(label) = &self.label {
            steps.push(format!("has(\"label\", {})", quote_double(label)));
        }
        steps.extend(self.constraints.iter().map(PropertyConstraint::to_has_step));

        let mut fragment = steps.join(".");
        if self.skip.is_some() || self.take.is_some() {
            let start = self.skip.unwrap_or(0) as i128;
            let end = match self.take {
                Some(take) => start + take as i128 - 1,
                None => -1,
            };
            fragment.push_str(&format!("[{}..{}]", start, end));
        }
        fragment
    }
}

impl TryFrom<QueryBuilder> for QueryExpression {
    type Error = QueryError;

    fn try_from(builder: QueryBuilder) -> Result<Self> {
        builder.build()
    }
}

/// Collects the parts of a [`QueryExpression`] and validates them on `build`.
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    skip: Option<i64>,
    take: Option<i64>,
    label: Option<String>,
    constraints: Vec<PropertyConstraint>,
    shorthand: Vec<(String, TypedValue)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: i64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: i64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Add an explicit constraint
    pub fn constraint(mut self, key: impl Into<String>, comparison: Comparison, value: impl Into<TypedValue>) -> Self {
        self.constraints.push(PropertyConstraint::new(key, comparison, value));
        self
    }

    pub fn constraints<I>(mut self, constraints: I) -> Self
    where
        I: IntoIterator<Item = PropertyConstraint>,
    {
        self.constraints.extend(constraints);
        self
    }

    /// Shorthand equality filter
    pub fn property(mut self, key: impl Into<String>, value: impl Into<TypedValue>) -> Self {
        self.shorthand.push((key.into(), value.into()));
        self
    }

    /// Shorthand equality filters, in iteration order
    pub fn properties<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<TypedValue>,
    {
        self.shorthand
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> Result<QueryExpression> {
        let skip = non_negative("skip", self.skip)?;
        let take = non_negative("take", self.take)?;
        if !self.constraints.is_empty() && !self.shorthand.is_empty() {
            return Err(QueryError::InvalidArgument(
                "explicit constraints and shorthand properties cannot be combined".to_string(),
            ));
        }

        let constraints = if self.shorthand.is_empty() {
            self.constraints
        } else {
            self.shorthand
                .into_iter()
                .map(|(key, value)| PropertyConstraint::equal(key, value))
                .collect()
        };

        Ok(QueryExpression {
            skip,
            take,
            label: self.label,
            constraints,
        })
    }
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<u64>> {
    match value {
        None => Ok(None),
        Some(v) => u64::try_from(v)
            .map(Some)
            .map_err(|_| QueryError::InvalidArgument(format!("{} must not be negative, got {}", name, v))),
    }
}

fn quote_double(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '$' => out.push_str("\\$"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
