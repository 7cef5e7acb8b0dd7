// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fluent query builder for PostgREST tables.
//!
//! A [`Query`] is plain data: the REST backend renders it as a PostgREST
//! request and the in-memory backend evaluates it directly, so both see
//! exactly the same filters and ordering.

use serde_json::Value;
use std::cmp::Ordering;

/// What the query does to the matched rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Select,
    Insert(Value),
    Update(Value),
    Delete,
}

/// Row filter (all filters are ANDed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    IsNull(String),
    NotNull(String),
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// How many rows the caller expects back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cardinality {
    #[default]
    Many,
    /// Exactly one row; zero or several is an error
    Single,
    /// Zero or one row; several is an error
    MaybeSingle,
}

impl Cardinality {
    /// Whether `rows` results satisfy this expectation.
    pub fn accepts(self, rows: usize) -> bool {
        match self {
            Cardinality::Many => true,
            Cardinality::Single => rows == 1,
            Cardinality::MaybeSingle => rows <= 1,
        }
    }
}

/// Query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: String,
    action: Action,
    filters: Vec<Filter>,
    order: Vec<Order>,
    cardinality: Cardinality,
}

impl Query {
    /// Start a `select *` on `table`.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: "*".to_string(),
            action: Action::Select,
            filters: Vec::new(),
            order: Vec::new(),
            cardinality: Cardinality::Many,
        }
    }

    /// Columns to return (also used for the representation of writes).
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = columns.split_whitespace().collect();
        self
    }

    pub fn insert(mut self, row: Value) -> Self {
        self.action = Action::Insert(row);
        self
    }

    pub fn update(mut self, patch: Value) -> Self {
        self.action = Action::Update(patch);
        self
    }

    pub fn delete(mut self) -> Self {
        self.action = Action::Delete;
        self
    }

    pub fn eq(mut self, column: &str, value: impl ToString) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::IsNull(column.to_string()));
        self
    }

    pub fn not_null(mut self, column: &str) -> Self {
        self.filters.push(Filter::NotNull(column.to_string()));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn single(mut self) -> Self {
        self.cardinality = Cardinality::Single;
        self
    }

    pub fn maybe_single(mut self) -> Self {
        self.cardinality = Cardinality::MaybeSingle;
        self
    }

    // ─── Accessors ───────────────────────────────────────────────

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_write(&self) -> bool {
        !matches!(self.action, Action::Select)
    }

    // ─── PostgREST Rendering ─────────────────────────────────────

    /// Render as a PostgREST query string (without the leading `?`).
    ///
    /// Inserts only carry `select` (the representation to return); filters
    /// and ordering are meaningless there.
    pub fn to_query_string(&self) -> String {
        let mut params = vec![format!("select={}", urlencoding::encode(&self.columns))];

        if !matches!(self.action, Action::Insert(_)) {
            for filter in &self.filters {
                params.push(match filter {
                    Filter::Eq { column, value } => {
                        format!("{}=eq.{}", column, urlencoding::encode(value))
                    }
                    Filter::IsNull(column) => format!("{}=is.null", column),
                    Filter::NotNull(column) => format!("{}=not.is.null", column),
                });
            }

            if !self.order.is_empty() {
                let order: Vec<String> = self
                    .order
                    .iter()
                    .map(|o| {
                        format!(
                            "{}.{}",
                            o.column,
                            if o.ascending { "asc" } else { "desc" }
                        )
                    })
                    .collect();
                params.push(format!("order={}", order.join(",")));
            }
        }

        params.join("&")
    }

    // ─── In-Process Evaluation ───────────────────────────────────

    /// Whether `row` passes every filter.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|filter| match filter {
            Filter::Eq { column, value } => match row.get(column) {
                Some(Value::String(s)) => s == value,
                Some(Value::Null) | None => false,
                Some(other) => other.to_string() == *value,
            },
            Filter::IsNull(column) => row.get(column).map_or(true, Value::is_null),
            Filter::NotNull(column) => row.get(column).is_some_and(|v| !v.is_null()),
        })
    }

    /// Sort rows by the query's order keys.
    ///
    /// Nulls sort last ascending and first descending, as in Postgres.
    pub fn sort(&self, rows: &mut [Value]) {
        rows.sort_by(|a, b| {
            for key in &self.order {
                let ordering = compare_values(a.get(&key.column), b.get(&key.column));
                let ordering = if key.ascending {
                    ordering
                } else {
                    ordering.reverse()
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}
