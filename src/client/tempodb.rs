//! TempoDB API facade
//!
//! One method per API capability. Every method follows the same recipe:
//! build a request for a fixed resource template, apply the parameter
//! encoders, execute it, and wrap the outcome. Single-entity reads and
//! writes return a [`Response`]. Paginated reads fetch the first page
//! eagerly (failing immediately with `ClientError::Api` if it fails) and
//! return a [`Cursor`] or [`QueryResult`] over the rest.

use crate::client::config::ClientConfig;
use crate::client::cursor::{Cursor, QueryResult, Segment, SegmentEnumerator};
use crate::client::params::ParamEncoder;
use crate::client::request::{Method, Request};
use crate::client::response::{FromResponse, Response, TRANSPORT_FAILURE_CODE};
use crate::client::transport::{HttpTransport, Transport};
use crate::client::ClientResult;
use crate::credentials::Credentials;
use crate::model::{
    DataPoint, DataPointFound, DeleteSummary, MultiDataPoint, Nothing, Series, SingleValue,
    Summary, WriteRequest,
};
use crate::query::{
    Aggregation, Direction, Filter, Interpolation, Interval, MultiRollup, Predicate, Rollup, Zone,
};
use chrono::{DateTime, FixedOffset};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

const SERIES: &str = "/{version}/series/";
const SERIES_KEY: &str = "/{version}/series/key/{key}/";
const SERIES_DATA: &str = "/{version}/series/key/{key}/data/";
const SERIES_DATA_SEGMENT: &str = "/{version}/series/key/{key}/data/segment/";
const SERIES_ROLLUPS_SEGMENT: &str = "/{version}/series/key/{key}/data/rollups/segment/";
const SERIES_FIND: &str = "/{version}/series/key/{key}/find/";
const SERIES_SINGLE: &str = "/{version}/series/key/{key}/single/";
const SERIES_SUMMARY: &str = "/{version}/series/key/{key}/summary/";
const SEGMENT: &str = "/{version}/segment/";
const MULTI: &str = "/{version}/multi/";
const SINGLE: &str = "/{version}/single/";

/// Client for one TempoDB database
///
/// The HTTP transport is built on first use and shared by every call,
/// including follow-up page fetches made by cursors.
pub struct TempoDb {
    config: ClientConfig,
    credentials: Credentials,
    transport: OnceCell<Arc<dyn Transport>>,
}

impl TempoDb {
    /// Client for the default host (`https://api.tempo-db.com:443/v1`)
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    /// Client with explicit connection settings
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        Self {
            config,
            credentials,
            transport: OnceCell::new(),
        }
    }

    /// Client that sends every request through `transport`
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport: OnceCell::with_value(transport),
        }
    }

    /// Connection settings
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Credentials used for authentication
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Create a series
    pub fn create_series(&self, series: &Series) -> Response<Series> {
        match self.request_with_body(Method::Post, SERIES, series) {
            Ok(request) => self.execute(&request),
            Err(e) => Response::failure(TRANSPORT_FAILURE_CODE, e.to_string()),
        }
    }

    /// Fetch one series by key
    pub fn get_series_by_key(&self, key: &str) -> Response<Series> {
        let mut request = self.request(Method::Get, SERIES_KEY);
        request.add_url_segment("key", key);
        self.execute(&request)
    }

    /// List every series matching `filter`
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn get_series_by_filter(&self, filter: &Filter) -> ClientResult<Cursor<Series>> {
        let mut request = self.request(Method::Get, SERIES);
        ParamEncoder::apply_filter(&mut request, Some(filter));
        let first = self.first_segment::<Series>(&request)?;
        self.cursor(first)
    }

    /// Replace a series' name, tags and attributes
    pub fn update_series(&self, series: &Series) -> Response<Series> {
        match self.request_with_body(Method::Put, SERIES_KEY, series) {
            Ok(mut request) => {
                request.add_url_segment("key", series.key.as_str());
                self.execute(&request)
            }
            Err(e) => Response::failure(TRANSPORT_FAILURE_CODE, e.to_string()),
        }
    }

    /// Delete one series
    pub fn delete_series(&self, series: &Series) -> Response<Nothing> {
        let mut request = self.request(Method::Delete, SERIES_KEY);
        request.add_url_segment("key", series.key.as_str());
        self.execute(&request)
    }

    /// Delete every series matching `filter`
    pub fn delete_series_by_filter(&self, filter: &Filter) -> Response<DeleteSummary> {
        let mut request = self.request(Method::Delete, SERIES);
        ParamEncoder::apply_filter(&mut request, Some(filter));
        self.execute(&request)
    }

    /// Delete every series in the database
    pub fn delete_all_series(&self) -> Response<DeleteSummary> {
        let mut request = self.request(Method::Delete, SERIES);
        request.add_parameter("allow_truncation", "true");
        self.execute(&request)
    }

    /// Write points to one series
    pub fn write_data_points(&self, series: &Series, data: &[DataPoint]) -> Response<Nothing> {
        match self.request_with_body(Method::Post, SERIES_DATA, data) {
            Ok(mut request) => {
                request.add_url_segment("key", series.key.as_str());
                self.execute(&request)
            }
            Err(e) => Response::failure(TRANSPORT_FAILURE_CODE, e.to_string()),
        }
    }

    /// Write points to several series in one request
    pub fn write_multi(&self, write: &WriteRequest) -> Response<Nothing> {
        match self.request_with_body(Method::Post, MULTI, write) {
            Ok(request) => self.execute(&request),
            Err(e) => Response::failure(TRANSPORT_FAILURE_CODE, e.to_string()),
        }
    }

    /// Delete a series' points within `interval`
    pub fn delete_data_points(&self, series: &Series, interval: &Interval) -> Response<Nothing> {
        let mut request = self.request(Method::Delete, SERIES_DATA);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_interval(&mut request, interval);
        self.execute(&request)
    }

    /// Read one series' points, optionally rolled up and interpolated
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn read_data_points(
        &self,
        series: &Series,
        interval: &Interval,
        zone: Option<&Zone>,
        rollup: Option<&Rollup>,
        interpolation: Option<&Interpolation>,
    ) -> ClientResult<QueryResult<DataPoint>> {
        let mut request = self.request(Method::Get, SERIES_DATA_SEGMENT);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_interpolation(&mut request, interpolation);
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_zone(&mut request, zone);
        ParamEncoder::apply_rollup(&mut request, rollup);
        self.query(&request)
    }

    /// Read points aggregated across every series matching `filter`
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    #[allow(clippy::too_many_arguments)]
    pub fn read_data_points_by_filter(
        &self,
        filter: &Filter,
        interval: &Interval,
        aggregation: &Aggregation,
        zone: Option<&Zone>,
        rollup: Option<&Rollup>,
        interpolation: Option<&Interpolation>,
    ) -> ClientResult<QueryResult<DataPoint>> {
        let mut request = self.request(Method::Get, SEGMENT);
        ParamEncoder::apply_filter(&mut request, Some(filter));
        ParamEncoder::apply_interpolation(&mut request, interpolation);
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_aggregation(&mut request, Some(aggregation));
        ParamEncoder::apply_zone(&mut request, zone);
        ParamEncoder::apply_rollup(&mut request, rollup);
        self.query(&request)
    }

    /// Read several series side by side, one value per series per timestamp
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn read_multi_data_points(
        &self,
        filter: &Filter,
        interval: &Interval,
        zone: Option<&Zone>,
        rollup: Option<&Rollup>,
        interpolation: Option<&Interpolation>,
    ) -> ClientResult<QueryResult<MultiDataPoint>> {
        let mut request = self.request(Method::Get, MULTI);
        ParamEncoder::apply_filter(&mut request, Some(filter));
        ParamEncoder::apply_interpolation(&mut request, interpolation);
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_zone(&mut request, zone);
        ParamEncoder::apply_rollup(&mut request, rollup);
        self.query(&request)
    }

    /// Read one series with several folds over the same period
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn read_multi_rollup_data_points(
        &self,
        series: &Series,
        interval: &Interval,
        zone: Option<&Zone>,
        rollup: &MultiRollup,
        interpolation: Option<&Interpolation>,
    ) -> ClientResult<Cursor<MultiDataPoint>> {
        let mut request = self.request(Method::Get, SERIES_ROLLUPS_SEGMENT);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_interpolation(&mut request, interpolation);
        ParamEncoder::apply_multi_rollup(&mut request, Some(rollup));
        ParamEncoder::apply_zone(&mut request, zone);
        let first = self.first_segment(&request)?;
        self.cursor(first)
    }

    /// Find the points matching a rolling predicate
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn find_data_points(
        &self,
        series: &Series,
        interval: &Interval,
        predicate: &Predicate,
        zone: Option<&Zone>,
    ) -> ClientResult<Cursor<DataPointFound>> {
        let mut request = self.request(Method::Get, SERIES_FIND);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_zone(&mut request, zone);
        ParamEncoder::apply_predicate(&mut request, Some(predicate));
        let first = self.first_segment(&request)?;
        self.cursor(first)
    }

    /// Read the value of one series at (or near) a timestamp
    pub fn read_single_value(
        &self,
        series: &Series,
        timestamp: &DateTime<FixedOffset>,
        zone: Option<&Zone>,
        direction: Direction,
    ) -> Response<SingleValue> {
        let mut request = self.request(Method::Get, SERIES_SINGLE);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_direction(&mut request, direction);
        ParamEncoder::apply_timestamp(&mut request, timestamp);
        ParamEncoder::apply_zone(&mut request, zone);
        self.execute(&request)
    }

    /// Read the value at (or near) a timestamp for every series matching `filter`
    ///
    /// # Errors
    /// Returns `ClientError::Api` if the first page cannot be fetched
    pub fn read_single_value_by_filter(
        &self,
        filter: &Filter,
        timestamp: &DateTime<FixedOffset>,
        zone: Option<&Zone>,
        direction: Direction,
    ) -> ClientResult<Cursor<SingleValue>> {
        let mut request = self.request(Method::Get, SINGLE);
        ParamEncoder::apply_filter(&mut request, Some(filter));
        ParamEncoder::apply_direction(&mut request, direction);
        ParamEncoder::apply_timestamp(&mut request, timestamp);
        ParamEncoder::apply_zone(&mut request, zone);
        let first = self.first_segment(&request)?;
        self.cursor(first)
    }

    /// Summary statistics for one series over `interval`
    pub fn read_summary(
        &self,
        series: &Series,
        interval: &Interval,
        zone: Option<&Zone>,
    ) -> Response<Summary> {
        let mut request = self.request(Method::Get, SERIES_SUMMARY);
        request.add_url_segment("key", series.key.as_str());
        ParamEncoder::apply_interval(&mut request, interval);
        ParamEncoder::apply_zone(&mut request, zone);
        self.execute(&request)
    }

    /// Shared transport, built on first use
    fn transport(&self) -> ClientResult<&Arc<dyn Transport>> {
        self.transport.get_or_try_init(|| {
            debug!("Creating HTTP transport for {}", self.config.base_url());
            let transport = HttpTransport::new(&self.config, self.credentials.clone())?;
            Ok(Arc::new(transport) as Arc<dyn Transport>)
        })
    }

    /// Standard request for `resource` with the version segment filled in
    fn request(&self, method: Method, resource: &str) -> Request {
        let mut request = Request::build(method, resource);
        request.add_url_segment("version", self.config.version.as_str());
        request
    }

    fn request_with_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        resource: &str,
        body: &B,
    ) -> ClientResult<Request> {
        let mut request = Request::build(method, resource).with_json_body(body)?;
        request.add_url_segment("version", self.config.version.as_str());
        Ok(request)
    }

    fn execute<T: FromResponse>(&self, request: &Request) -> Response<T> {
        debug!(
            "{} {} with {} params",
            request.method(),
            request.resource(),
            request.params().len()
        );
        let outcome = self
            .transport()
            .and_then(|transport| transport.execute(request));
        Response::from_transport(outcome)
    }

    fn first_segment<T: DeserializeOwned>(&self, request: &Request) -> ClientResult<Segment<T>> {
        self.execute::<Segment<T>>(request).into_result()
    }

    fn cursor<T>(&self, first: Segment<T>) -> ClientResult<Cursor<T>> {
        let transport = Arc::clone(self.transport()?);
        Ok(Cursor::new(SegmentEnumerator::new(transport, first)))
    }

    fn query<T: DeserializeOwned>(&self, request: &Request) -> ClientResult<QueryResult<T>> {
        let first = self.first_segment::<T>(request)?;
        let rollup = first.rollup().copied();
        let zone = first.zone().cloned();
        Ok(QueryResult::new(rollup, zone, self.cursor(first)?))
    }
}
