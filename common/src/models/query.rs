//! SQL query models.
//!
//! Contains the request and result bodies of the remote query endpoint.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;

/// How the caller wants result rows shaped.
///
/// Passed through verbatim to the remote endpoint; the client never
/// interprets it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum QueryMethod {
    /// Fetch a single row.
    Get,
    /// Fetch all rows.
    All,
    /// Execute without a result set.
    Run,
    /// Fetch column values only.
    Values,
}

impl QueryMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMethod::Get => "get",
            QueryMethod::All => "all",
            QueryMethod::Run => "run",
            QueryMethod::Values => "values",
        }
    }
}

impl fmt::Display for QueryMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(QueryMethod::Get),
            "all" => Ok(QueryMethod::All),
            "run" => Ok(QueryMethod::Run),
            "values" => Ok(QueryMethod::Values),
            other => Err(AppError::Config(format!("unknown query method: {}", other))),
        }
    }
}

/// Request body POSTed to the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryRequest {
    /// SQL statement, opaque to the client.
    pub sql: String,

    /// Ordered bind parameters.
    pub params: Vec<serde_json::Value>,

    /// Result shape requested from the remote.
    pub method: QueryMethod,
}

impl QueryRequest {
    pub fn new(sql: impl Into<String>, params: Vec<serde_json::Value>, method: QueryMethod) -> Self {
        Self {
            sql: sql.into(),
            params,
            method,
        }
    }
}

/// Successful response body of the query endpoint.
///
/// `rows` is either a flat sequence of values (`get`) or a sequence of
/// row sequences (`all`, `values`); which one arrived is not checked.
/// Any other top-level fields are kept in `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// Row data. Absent or `null` reads as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rows: Vec<serde_json::Value>,

    /// Remaining fields of the response body.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl QueryResult {
    /// Creates an empty query result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a result holding only `rows`.
    pub fn from_rows(rows: Vec<serde_json::Value>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Rows handed back to the database handle's callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RowSet {
    pub rows: Vec<serde_json::Value>,
}

impl From<QueryResult> for RowSet {
    fn from(result: QueryResult) -> Self {
        Self { rows: result.rows }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = QueryRequest::new("SELECT ?", vec![json!(1), json!("a")], QueryMethod::All);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "sql": "SELECT ?", "params": [1, "a"], "method": "all" })
        );
    }

    #[test]
    fn test_method_wire_names() {
        for (method, name) in [
            (QueryMethod::Get, "\"get\""),
            (QueryMethod::All, "\"all\""),
            (QueryMethod::Run, "\"run\""),
            (QueryMethod::Values, "\"values\""),
        ] {
            assert_eq!(serde_json::to_string(&method).unwrap(), name);
        }
        assert_eq!("values".parse::<QueryMethod>().unwrap(), QueryMethod::Values);
        assert!("fetch".parse::<QueryMethod>().is_err());
    }

    #[test]
    fn test_result_accepts_nested_and_flat_rows() {
        let nested: QueryResult = serde_json::from_value(json!({ "rows": [[1, "a"]] })).unwrap();
        assert_eq!(nested.row_count(), 1);
        assert_eq!(serde_json::to_value(&nested).unwrap(), json!({ "rows": [[1, "a"]] }));

        let flat: QueryResult = serde_json::from_value(json!({ "rows": [1, "a"] })).unwrap();
        assert_eq!(flat.row_count(), 2);
    }

    #[test]
    fn test_result_without_rows_is_empty() {
        let result: QueryResult = serde_json::from_value(json!({})).unwrap();
        assert_eq!(result, QueryResult::empty());

        let null_rows: QueryResult = serde_json::from_value(json!({ "rows": null })).unwrap();
        assert_eq!(null_rows, QueryResult::empty());
    }

    #[test]
    fn test_result_keeps_extra_fields() {
        let body = json!({ "rows": [[1, "a"]], "meta": { "changes": 3 } });
        let result: QueryResult = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(result.extra.get("meta"), Some(&json!({ "changes": 3 })));
        assert_eq!(serde_json::to_value(&result).unwrap(), body);
        assert_eq!(RowSet::from(result).rows, vec![json!([1, "a"])]);
    }
}
