//! Flattening of search and count responses.
//!
//! Xapiand wraps search results in an envelope keyed by reserved `#` names:
//!
//! ```text
//! { "#query": { "#hits": [...], "#total_count": n, "#matches_estimated": m, ... },
//!   "#aggregations": {...}, "#took": t }
//! ```
//!
//! [`SearchResults`] is the flat shape handed back to callers.

use std::convert::TryFrom;

use tracing::debug;

use crate::error::{Error, Result};
use crate::value::{Map, Value};

pub const QUERY_KEY: &str = "#query";
pub const HITS_KEY: &str = "#hits";
pub const TOTAL_COUNT_KEY: &str = "#total_count";
pub const MATCHES_ESTIMATED_KEY: &str = "#matches_estimated";
pub const AGGREGATIONS_KEY: &str = "#aggregations";
pub const TOOK_KEY: &str = "#took";

/// A normalized search or count result.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchResults {
    /// Matching documents, in ranked order.
    pub hits: Vec<Map>,
    /// Taken from `#total_count`.
    pub count: u64,
    /// Taken from `#matches_estimated`.
    pub total: u64,
    /// `None` when the server sent no aggregations, or an empty set of them.
    pub aggregations: Option<Map>,
    /// Any other keys the server put inside `#query`, in wire order.
    pub extra: Map,
}

/// True if a decoded response carries a `#query` envelope and should be normalized.
pub fn is_search_envelope(value: &Value) -> bool {
    value.get(QUERY_KEY).is_some()
}

impl SearchResults {
    /// Flatten a decoded search/count envelope.
    ///
    /// Missing `#hits` is a count-only response and yields no hits. Missing `#aggregations` is
    /// fine too. Missing counts, or any reserved key with the wrong shape, fail with a schema
    /// error.
    pub fn from_envelope(envelope: Value) -> Result<SearchResults> {
        let mut envelope = match envelope {
            Value::Map(map) => map,
            _ => return Err(Error::MissingKey(QUERY_KEY)),
        };
        let mut query = match envelope.shift_remove(QUERY_KEY) {
            Some(Value::Map(map)) => map,
            Some(_) => {
                return Err(Error::BadEnvelope {
                    key: QUERY_KEY,
                    expected: "a map",
                })
            }
            None => return Err(Error::MissingKey(QUERY_KEY)),
        };

        let hits = take_hits(&mut query)?;
        let count = take_count(&mut query, TOTAL_COUNT_KEY)?;
        let total = take_count(&mut query, MATCHES_ESTIMATED_KEY)?;

        // The server puts aggregations beside #query, but accept them inside it as well
        let outer = take_aggregations(&mut envelope)?;
        let inner = take_aggregations(&mut query)?;
        let aggregations = outer.or(inner);

        // Server timing is not part of the result
        let took = envelope.shift_remove(TOOK_KEY);

        debug!(
            hits = hits.len(),
            count,
            total,
            aggregations = aggregations.is_some(),
            extra = query.len(),
            took = ?took,
            "normalized search envelope"
        );

        Ok(SearchResults {
            hits,
            count,
            total,
            aggregations,
            extra: query,
        })
    }
}

fn take_hits(query: &mut Map) -> Result<Vec<Map>> {
    let bad = Error::BadEnvelope {
        key: HITS_KEY,
        expected: "a list of maps",
    };
    match query.shift_remove(HITS_KEY) {
        None => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::Map(hit) => Ok(hit),
                _ => Err(bad.clone()),
            })
            .collect(),
        Some(_) => Err(bad),
    }
}

fn take_count(query: &mut Map, key: &'static str) -> Result<u64> {
    match query.shift_remove(key) {
        None => Err(Error::MissingKey(key)),
        Some(value) => value.as_u64().ok_or(Error::BadEnvelope {
            key,
            expected: "a non-negative integer",
        }),
    }
}

fn take_aggregations(map: &mut Map) -> Result<Option<Map>> {
    match map.shift_remove(AGGREGATIONS_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Map(aggs)) if aggs.is_empty() => Ok(None),
        Some(Value::Map(aggs)) => Ok(Some(aggs)),
        Some(_) => Err(Error::BadEnvelope {
            key: AGGREGATIONS_KEY,
            expected: "a map",
        }),
    }
}

impl TryFrom<Value> for SearchResults {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        SearchResults::from_envelope(value)
    }
}

impl From<SearchResults> for Value {
    fn from(results: SearchResults) -> Self {
        let mut map = Map::with_capacity(4 + results.extra.len());
        map.insert(
            "hits".into(),
            Value::Array(results.hits.into_iter().map(Value::Map).collect()),
        );
        map.insert("count".into(), Value::from(results.count));
        map.insert("total".into(), Value::from(results.total));
        if let Some(aggs) = results.aggregations {
            map.insert("aggregations".into(), Value::Map(aggs));
        }
        for (key, value) in results.extra {
            map.entry(key).or_insert(value);
        }
        Value::Map(map)
    }
}
