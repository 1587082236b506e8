//! Where-clause filters
//!
//! A [`Filter`] is what a filtered-allow decision carries. It can be handed
//! to the document store as a where-clause ([`Filter::to_where`]) or
//! evaluated against an already fetched document ([`Filter::matches`]).
//! Both paths normalise relation values the same way, so a document that
//! the store would return is exactly a document `matches` accepts.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::identity::RecordId;
use crate::models::{value_ids, Document};

/// Typed filter tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Field equals value; on a has-many relation any element may match
    Equals { field: String, value: String },
    /// Field equals one of the values
    In { field: String, values: Vec<String> },
    /// At least one clause holds (empty is false)
    Or(Vec<Filter>),
    /// Every clause holds (empty is true)
    And(Vec<Filter>),
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Field references the record `id`
    pub fn references(field: impl Into<String>, id: &RecordId) -> Self {
        Filter::equals(field, id.as_str())
    }

    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Filter::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Disjunction, flattening a single clause
    pub fn any(mut clauses: Vec<Filter>) -> Self {
        if clauses.len() == 1 {
            return clauses.remove(0);
        }
        Filter::Or(clauses)
    }

    pub fn all(mut clauses: Vec<Filter>) -> Self {
        if clauses.len() == 1 {
            return clauses.remove(0);
        }
        Filter::And(clauses)
    }

    /// Evaluate against a fetched document
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Equals { field, value } => field_values(doc, field).iter().any(|v| v == value),
            Filter::In { field, values } => field_values(doc, field)
                .iter()
                .any(|v| values.iter().any(|candidate| candidate == v)),
            Filter::Or(clauses) => clauses.iter().any(|clause| clause.matches(doc)),
            Filter::And(clauses) => clauses.iter().all(|clause| clause.matches(doc)),
        }
    }

    /// Where-clause JSON understood by the document store
    pub fn to_where(&self) -> Value {
        match self {
            Filter::Equals { field, value } => json!({ field.as_str(): { "equals": value } }),
            Filter::In { field, values } => json!({ field.as_str(): { "in": values } }),
            Filter::Or(clauses) => {
                json!({ "or": clauses.iter().map(Filter::to_where).collect::<Vec<_>>() })
            }
            Filter::And(clauses) => {
                json!({ "and": clauses.iter().map(Filter::to_where).collect::<Vec<_>>() })
            }
        }
    }
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_where().serialize(serializer)
    }
}

/// Comparable string forms of a field value
///
/// Scalars compare by their text, relations by their id, arrays by each
/// element.
fn field_values(doc: &Document, field: &str) -> Vec<String> {
    match doc.field(field) {
        None => Vec::new(),
        Some(Value::Bool(b)) => vec![b.to_string()],
        Some(value) => value_ids(value).into_iter().map(String::from).collect(),
    }
}
