//! Document query model.
//!
//! Queries serialize to the backend's JSON wire form, one object per query:
//!
//! ```text
//! {"method":"equal","attribute":"owners","values":["6650..."]}
//! {"method":"or","values":[{...},{...}]}
//! {"method":"limit","values":[10]}
//! {"method":"orderDesc","attribute":"$createdAt"}
//! ```
//!
//! Field order is fixed (`method`, `attribute`, `values`) so the encoded
//! form is stable.

use std::fmt;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use serde_json::Value;

/// A filter, pagination or ordering clause of a document list request.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Attribute equals any of the values.
    Equal { attribute: String, values: Vec<Value> },
    /// String attribute contains any value as a substring, or array
    /// attribute contains any of the values as an element.
    Contains { attribute: String, values: Vec<Value> },
    /// Any of the nested queries matches.
    Or(Vec<Query>),
    /// All nested queries match.
    And(Vec<Query>),
    /// Maximum number of documents returned.
    Limit(u64),
    /// Ascending order by attribute.
    OrderAsc(String),
    /// Descending order by attribute.
    OrderDesc(String),
}

impl Query {
    pub fn equal<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Equal {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Query::Contains {
            attribute: attribute.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn or(queries: Vec<Query>) -> Self {
        Query::Or(queries)
    }

    pub fn and(queries: Vec<Query>) -> Self {
        Query::And(queries)
    }

    pub fn limit(limit: u64) -> Self {
        Query::Limit(limit)
    }

    pub fn order_asc(attribute: impl Into<String>) -> Self {
        Query::OrderAsc(attribute.into())
    }

    pub fn order_desc(attribute: impl Into<String>) -> Self {
        Query::OrderDesc(attribute.into())
    }

    /// Wire name of the query method.
    pub fn method(&self) -> &'static str {
        match self {
            Query::Equal { .. } => "equal",
            Query::Contains { .. } => "contains",
            Query::Or(_) => "or",
            Query::And(_) => "and",
            Query::Limit(_) => "limit",
            Query::OrderAsc(_) => "orderAsc",
            Query::OrderDesc(_) => "orderDesc",
        }
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = match self {
            Query::Equal { .. } | Query::Contains { .. } => 3,
            _ => 2,
        };
        let mut state = serializer.serialize_struct("Query", len)?;
        state.serialize_field("method", self.method())?;
        match self {
            Query::Equal { attribute, values } | Query::Contains { attribute, values } => {
                state.serialize_field("attribute", attribute)?;
                state.serialize_field("values", values)?;
            }
            Query::Or(queries) | Query::And(queries) => {
                state.serialize_field("values", queries)?;
            }
            Query::Limit(limit) => {
                state.serialize_field("values", &[limit])?;
            }
            Query::OrderAsc(attribute) | Query::OrderDesc(attribute) => {
                state.serialize_field("attribute", attribute)?;
            }
        }
        state.end()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoded = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&encoded)
    }
}
