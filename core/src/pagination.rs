//! Offset pagination over DodoIS list endpoints.
//!
//! List endpoints take `skip`/`take` and answer with an item array plus an
//! `isEndOfListReached` flag. A single-page fetch returns that page's items;
//! exhaustive mode keeps advancing `skip` by `take` until the flag is set.

use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::http::HttpRequest;

pub const SKIP: &str = "skip";
pub const TAKE: &str = "take";
pub const END_OF_LIST: &str = "isEndOfListReached";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    pub skip: u32,
    pub take: u32,
}

impl PageCursor {
    pub fn new(skip: u32, take: u32) -> Self {
        Self { skip, take }
    }

    /// Cursor for exhaustive mode: from the first record, largest page.
    pub fn exhaustive(max_take: u32) -> Self {
        Self {
            skip: 0,
            take: max_take,
        }
    }

    /// The following page. Fails once `skip` would pass `u32::MAX`.
    pub fn next(self) -> Result<Self> {
        let skip = self
            .skip
            .checked_add(self.take)
            .ok_or_else(|| ApiError::invalid("skip", format!("{} + {} overflows", self.skip, self.take)))?;
        Ok(Self { skip, take: self.take })
    }

    /// Copy of `request` with this cursor's `skip` and `take` set.
    pub fn apply(self, request: &HttpRequest) -> HttpRequest {
        let mut request = request.clone();
        request.set_query(SKIP, self.skip);
        request.set_query(TAKE, self.take);
        request
    }
}

/// One decoded page of a list endpoint.
#[derive(Debug, Clone)]
pub struct Page {
    pub items: Vec<Value>,
    pub is_end_of_list_reached: bool,
}

impl Page {
    /// Split a response body into the array under `items_key` and the end
    /// flag. Both must be present.
    pub fn from_body(mut body: Value, items_key: &str) -> Result<Self> {
        let is_end_of_list_reached = body
            .get(END_OF_LIST)
            .and_then(Value::as_bool)
            .ok_or_else(|| ApiError::Deserialization(format!("page has no boolean `{END_OF_LIST}`")))?;
        let items = match body.get_mut(items_key).map(Value::take) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(ApiError::Deserialization(format!(
                    "page has no `{items_key}` array"
                )))
            }
        };
        Ok(Self {
            items,
            is_end_of_list_reached,
        })
    }
}
