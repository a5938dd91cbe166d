//! Query-string building blocks for row selection.
//!
//! Filters are conjunctions of equality terms on named columns, rendered
//! into the `column=eq.value` parameters the store understands. Column names
//! come from trusted schema descriptors; values are percent-encoded.
use std::fmt::Write;

/// A conjunctive equality filter. An empty filter matches every row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    terms: Vec<(String, String)>,
}

impl Filter {
    #[must_use]
    pub fn new() -> Self {
        Filter { terms: Vec::new() }
    }

    #[must_use]
    pub fn eq<C, V>(mut self, column: C, value: V) -> Self
    where
        C: Into<String>,
        V: Into<String>,
    {
        self.terms.push((column.into(), value.into()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    #[must_use]
    pub fn terms(&self) -> &[(String, String)] {
        &self.terms
    }

    #[must_use]
    pub fn to_query(&self) -> String {
        let mut query = String::new();
        for (i, (column, value)) in self.terms.iter().enumerate() {
            if i > 0 {
                query.push('&');
            }
            let _ = write!(query, "{column}=eq.{}", urlencoding::encode(value));
        }
        query
    }
}

/// Server-side ordering on a single column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    column: String,
    descending: bool,
}

impl Order {
    #[must_use]
    pub fn asc<C: Into<String>>(column: C) -> Self {
        Order {
            column: column.into(),
            descending: false,
        }
    }

    #[must_use]
    pub fn desc<C: Into<String>>(column: C) -> Self {
        Order {
            column: column.into(),
            descending: true,
        }
    }

    #[must_use]
    pub fn to_query(&self) -> String {
        let direction = if self.descending { "desc" } else { "asc" };
        format!("order={}.{direction}", self.column)
    }
}
