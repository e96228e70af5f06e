//! The decode half of a client call: turning a status-checked response body into what the caller
//! gets back.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::envelope::{is_search_envelope, SearchResults};
use crate::error::{Error, Result};
use crate::format::WireFormat;
use crate::value::Value;

/// A backend operation, as far as encoding and decoding care.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Search,
    Count,
    Stats,
    Get,
    Delete,
    Head,
    Post,
    Put,
    Patch,
    Merge,
    Store,
}

impl Action {
    pub const ALL: [Action; 11] = [
        Action::Search,
        Action::Count,
        Action::Stats,
        Action::Get,
        Action::Delete,
        Action::Head,
        Action::Post,
        Action::Put,
        Action::Patch,
        Action::Merge,
        Action::Store,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Search => "search",
            Action::Count => "count",
            Action::Stats => "stats",
            Action::Get => "get",
            Action::Delete => "delete",
            Action::Head => "head",
            Action::Post => "post",
            Action::Put => "put",
            Action::Patch => "patch",
            Action::Merge => "merge",
            Action::Store => "store",
        }
    }

    /// HTTP verb for the request. A search (or count) that carries a query body is sent as a POST.
    pub fn method(self, has_body: bool) -> &'static str {
        match self {
            Action::Search | Action::Count if has_body => "POST",
            Action::Search | Action::Count | Action::Stats | Action::Get => "GET",
            Action::Delete => "DELETE",
            Action::Head => "HEAD",
            Action::Post => "POST",
            Action::Put => "PUT",
            Action::Patch => "PATCH",
            Action::Merge => "MERGE",
            Action::Store => "STORE",
        }
    }

    /// Whether responses to this action go through envelope normalization.
    pub fn normalizes(self) -> bool {
        matches!(self, Action::Search | Action::Count)
    }

    /// Whether a 404 from this action means "no such document" rather than a failure.
    pub fn tolerates_not_found(self) -> bool {
        matches!(
            self,
            Action::Get | Action::Delete | Action::Patch | Action::Merge
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Action::ALL
            .iter()
            .copied()
            .find(|a| a.name() == s)
            .ok_or_else(|| Error::BadConfig(format!("unknown action {:?}", s)))
    }
}

/// A decoded response.
#[derive(Clone, Debug, PartialEq)]
pub enum Response {
    /// The body had a content type other than JSON or msgpack, and is returned untouched.
    Raw(Vec<u8>),
    /// A decoded body that was not a search envelope.
    Document(Value),
    /// A normalized search or count envelope.
    Results(SearchResults),
}

impl Response {
    pub fn as_document(&self) -> Option<&Value> {
        match self {
            Response::Document(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_results(&self) -> Option<&SearchResults> {
        match self {
            Response::Results(r) => Some(r),
            _ => None,
        }
    }

    /// The response as a value tree. Normalized results are flattened; raw bodies have no tree.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Response::Raw(_) => None,
            Response::Document(v) => Some(v),
            Response::Results(r) => Some(Value::from(r)),
        }
    }
}

/// Decode a response body for the given action.
///
/// The content type picks the decoder. Anything not JSON or msgpack comes back as
/// [`Response::Raw`]. For search and count, a body carrying a `#query` envelope is normalized;
/// every other body is handed back as-is.
pub fn decode_response(action: Action, content_type: &str, body: &[u8]) -> Result<Response> {
    let format = match WireFormat::from_content_type(content_type) {
        Some(format) => format,
        None => {
            debug!(%action, content_type, bytes = body.len(), "passing through raw body");
            return Ok(Response::Raw(body.to_vec()));
        }
    };
    let value = format.decode(body)?;
    if action.normalizes() && is_search_envelope(&value) {
        return Ok(Response::Results(SearchResults::from_envelope(value)?));
    }
    Ok(Response::Document(value))
}
