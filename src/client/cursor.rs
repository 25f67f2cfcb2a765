//! Paginated result sets
//!
//! A [`Segment`] is one page of items plus the link to the next page. A
//! [`SegmentEnumerator`] starts from a page that has already been fetched and
//! requests each following page only when the consumer asks for it. A
//! [`Cursor`] flattens the pages into a single item iterator.
//!
//! # Continuation links
//!
//! The next-page link is read from a `Link` header entry with `rel="next"`
//! and, failing that, from a `next` field in the body. An empty link ends the
//! sequence.
//!
//! # Failures
//!
//! A page fetch that fails yields one `Err(ClientError::Api)` and then the
//! iterator ends. Items from earlier pages have already been yielded by then.

use crate::client::request::{Method, Request};
use crate::client::response::{decode_json, Response};
use crate::client::transport::{RawResponse, Transport};
use crate::client::ClientResult;
use crate::query::{Rollup, Zone};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// One page of a paginated response
#[derive(Debug, Clone, PartialEq)]
pub struct Segment<T> {
    data: Vec<T>,
    next: String,
    rollup: Option<Rollup>,
    zone: Option<Zone>,
}

/// Body shape shared by every paginated endpoint
#[derive(Deserialize)]
struct SegmentBody<T> {
    data: Vec<T>,
    #[serde(default)]
    next: Option<String>,
    #[serde(default)]
    rollup: Option<Rollup>,
    #[serde(default)]
    tz: Option<Zone>,
}

impl<T> Segment<T> {
    /// Create a page from items and a continuation link (empty for the last page)
    pub fn new(data: Vec<T>, next: impl Into<String>) -> Self {
        Self {
            data,
            next: next.into(),
            rollup: None,
            zone: None,
        }
    }

    /// Attach the rollup the service applied
    pub fn with_rollup(mut self, rollup: Option<Rollup>) -> Self {
        self.rollup = rollup;
        self
    }

    /// Items on this page
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Continuation link, empty when this is the last page
    pub fn next_url(&self) -> &str {
        &self.next
    }

    /// True when another page follows
    pub fn has_next(&self) -> bool {
        !self.next.is_empty()
    }

    /// Rollup reported by the service, if any
    pub fn rollup(&self) -> Option<&Rollup> {
        self.rollup.as_ref()
    }

    /// Time zone reported by the service, if any
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// Take the items
    pub fn into_data(self) -> Vec<T> {
        self.data
    }
}

impl<T: DeserializeOwned> Segment<T> {
    /// Decode a page from a successful response
    ///
    /// # Errors
    /// Returns `ClientError::Parse` if the body is not `{"data": [...]}`
    pub fn from_raw(raw: &RawResponse) -> ClientResult<Self> {
        let body: SegmentBody<T> = decode_json(raw)?;
        let next = raw
            .header("Link")
            .and_then(parse_next_link)
            .or(body.next)
            .unwrap_or_default();

        Ok(Self {
            data: body.data,
            next,
            rollup: body.rollup,
            zone: body.tz,
        })
    }
}

/// Extract the `rel="next"` target from a `Link` header value
///
/// `</v1/series/?page=2>; rel="next"` yields `/v1/series/?page=2`.
pub fn parse_next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|p| {
            let p = p.trim();
            p == "rel=\"next\"" || p == "rel=next"
        });
        if !is_next {
            return None;
        }
        target
            .strip_prefix('<')
            .and_then(|t| t.strip_suffix('>'))
            .map(str::to_string)
    })
}

/// Lazily walks the pages of a result set
///
/// The first page is supplied at construction; each later page costs one
/// blocking GET issued from [`Iterator::next`].
pub struct SegmentEnumerator<T> {
    transport: Arc<dyn Transport>,
    pending: Option<Segment<T>>,
    next: String,
    fetches: usize,
}

impl<T> SegmentEnumerator<T> {
    /// Start from an already fetched first page
    pub fn new(transport: Arc<dyn Transport>, first: Segment<T>) -> Self {
        Self {
            transport,
            pending: Some(first),
            next: String::new(),
            fetches: 0,
        }
    }

    /// Number of follow-up pages requested so far
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

impl<T: DeserializeOwned> Iterator for SegmentEnumerator<T> {
    type Item = ClientResult<Segment<T>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segment) = self.pending.take() {
            self.next = segment.next.clone();
            return Some(Ok(segment));
        }

        if self.next.is_empty() {
            return None;
        }
        let url = std::mem::take(&mut self.next);

        self.fetches += 1;
        debug!("Fetching page {} from {}", self.fetches + 1, url);

        let request = Request::build(Method::Get, url);
        let response = Response::<Segment<T>>::from_transport(self.transport.execute(&request));
        match response.into_result() {
            Ok(segment) => {
                self.next = segment.next.clone();
                Some(Ok(segment))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Single-pass iterator over every item of a paginated result set
///
/// Iteration is forward-only. A partially consumed cursor resumes where it
/// stopped; build a new query to start over.
pub struct Cursor<T> {
    segments: SegmentEnumerator<T>,
    current: std::vec::IntoIter<T>,
}

impl<T> Cursor<T> {
    /// Flatten a segment enumerator
    pub fn new(segments: SegmentEnumerator<T>) -> Self {
        Self {
            segments,
            current: Vec::new().into_iter(),
        }
    }

    /// Number of follow-up pages requested so far
    pub fn fetches(&self) -> usize {
        self.segments.fetches()
    }
}

impl<T: DeserializeOwned> Iterator for Cursor<T> {
    type Item = ClientResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(Ok(item));
            }
            match self.segments.next()? {
                Ok(segment) => self.current = segment.into_data().into_iter(),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Paginated read result carrying the rollup reported by the first page
pub struct QueryResult<T> {
    rollup: Option<Rollup>,
    zone: Option<Zone>,
    cursor: Cursor<T>,
}

impl<T> QueryResult<T> {
    /// Wrap a cursor with first-page metadata
    pub fn new(rollup: Option<Rollup>, zone: Option<Zone>, cursor: Cursor<T>) -> Self {
        Self {
            rollup,
            zone,
            cursor,
        }
    }

    /// Rollup the service applied
    pub fn rollup(&self) -> Option<&Rollup> {
        self.rollup.as_ref()
    }

    /// Time zone the service applied
    pub fn zone(&self) -> Option<&Zone> {
        self.zone.as_ref()
    }

    /// Borrow the underlying cursor
    pub fn cursor(&mut self) -> &mut Cursor<T> {
        &mut self.cursor
    }
}

impl<T: DeserializeOwned> IntoIterator for QueryResult<T> {
    type Item = ClientResult<T>;
    type IntoIter = Cursor<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.cursor
    }
}
