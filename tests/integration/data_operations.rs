//! Data point reads and writes through the facade

use crate::support::mock_transport::MockTransport;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use tempodb::client::Method;
use tempodb::{
    Aggregation, ClientError, DataPoint, Direction, Filter, Fold, Interpolation,
    InterpolationFunction, Interval, MultiRollup, Period, Predicate, Rollup, Series, State,
    WriteRequest, Zone,
};

fn interval() -> Interval {
    let start = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2012, 1, 2, 0, 0, 0).unwrap();
    Interval::new(start, end)
}

fn timestamp() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2012, 1, 1, 12, 0, 0).unwrap().fixed_offset()
}

#[test]
fn test_write_data_points() {
    let transport = MockTransport::new();
    transport.respond(200, "");

    let points = vec![
        DataPoint::new(Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap(), 12.34),
        DataPoint::new(Utc.with_ymd_and_hms(2012, 1, 1, 0, 1, 0).unwrap(), 56.78),
    ];
    let response = transport
        .client()
        .write_data_points(&Series::new("temp-1"), &points);
    assert!(response.is_success());

    let request = transport.last_request();
    assert_eq!(request.method(), Method::Post);
    assert_eq!(request.path(), "/v1/series/key/temp-1/data/");
    let body: serde_json::Value = serde_json::from_str(request.body().unwrap()).unwrap();
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["v"], 56.78);
}

#[test]
fn test_write_data_points_failure() {
    let transport = MockTransport::new();
    transport.respond(400, "bad points");

    let response = transport
        .client()
        .write_data_points(&Series::new("temp-1"), &[]);
    assert_eq!(response.state(), State::Failure);
    assert_eq!(response.code(), 400);
}

#[test]
fn test_write_multi() {
    let transport = MockTransport::new();
    transport.respond(200, "");

    let ts = Utc.with_ymd_and_hms(2012, 1, 1, 0, 0, 0).unwrap();
    let write = WriteRequest::new()
        .add(&Series::new("a"), DataPoint::new(ts, 1.0))
        .add(&Series::new("b"), DataPoint::new(ts, 2.0));
    assert!(transport.client().write_multi(&write).is_success());

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/multi/");
    let body: serde_json::Value = serde_json::from_str(request.body().unwrap()).unwrap();
    assert_eq!(body[0]["key"], "a");
    assert_eq!(body[1]["key"], "b");
}

#[test]
fn test_delete_data_points() {
    let transport = MockTransport::new();
    transport.respond(200, "");

    let response = transport
        .client()
        .delete_data_points(&Series::new("temp-1"), &interval());
    assert!(response.is_success());

    let request = transport.last_request();
    assert_eq!(request.method(), Method::Delete);
    assert_eq!(request.path(), "/v1/series/key/temp-1/data/");
    assert_eq!(request.param("start"), Some("2012-01-01T00:00:00.000+00:00"));
    assert_eq!(request.param("end"), Some("2012-01-02T00:00:00.000+00:00"));
}

#[test]
fn test_read_data_points_parameters() {
    let transport = MockTransport::new();
    transport.respond(200, r#"{"data":[]}"#);

    let rollup = Rollup::new(Fold::Mean, Period::minutes(5));
    let interpolation = Interpolation::new(Period::minutes(1), InterpolationFunction::Linear);
    let zone = Zone::new("America/Chicago");
    let result = transport
        .client()
        .read_data_points(
            &Series::new("temp-1"),
            &interval(),
            Some(&zone),
            Some(&rollup),
            Some(&interpolation),
        )
        .unwrap();
    assert_eq!(result.into_iter().count(), 0);

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/series/key/temp-1/data/segment/");
    assert_eq!(request.param("tz"), Some("America/Chicago"));
    assert_eq!(request.param("rollup.fold"), Some("mean"));
    assert_eq!(request.param("rollup.period"), Some("PT5M"));
    assert_eq!(request.param("interpolation.function"), Some("linear"));
    assert_eq!(request.param("interpolation.period"), Some("PT1M"));
}

#[test]
fn test_read_data_points_defaults() {
    let transport = MockTransport::new();
    transport.respond(200, r#"{"data":[]}"#);

    let result = transport
        .client()
        .read_data_points(&Series::new("temp-1"), &interval(), None, None, None)
        .unwrap();
    assert!(result.rollup().is_none());

    let request = transport.last_request();
    assert_eq!(request.param("tz"), Some("UTC"));
    assert!(request.param("rollup.fold").is_none());
    assert!(request.param("interpolation.period").is_none());
}

#[test]
fn test_read_data_points_by_filter() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"data":[{"t":"2012-01-01T00:00:00.000+00:00","v":3.0}]}"#,
    );

    let filter = Filter::new().add_tag("outdoor");
    let result = transport
        .client()
        .read_data_points_by_filter(
            &filter,
            &interval(),
            &Aggregation::new(Fold::Sum),
            None,
            None,
            None,
        )
        .unwrap();
    let points: Vec<DataPoint> = result.into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(points.len(), 1);

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/segment/");
    assert_eq!(request.param("aggregation.fold"), Some("sum"));
    assert_eq!(request.param("tag"), Some("outdoor"));
}

#[test]
fn test_read_multi_data_points() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"data":[{"t":"2012-01-01T00:00:00.000+00:00","v":{"a":1.0,"b":2.0}}]}"#,
    );

    let filter = Filter::new().add_key("a").add_key("b");
    let result = transport
        .client()
        .read_multi_data_points(&filter, &interval(), None, None, None)
        .unwrap();
    let points: Vec<_> = result.into_iter().collect::<Result<_, _>>().unwrap();
    assert_eq!(points[0].get("b"), Some(2.0));
    assert_eq!(transport.last_request().path(), "/v1/multi/");
    assert_eq!(transport.last_request().params_named("key").len(), 2);
}

#[test]
fn test_read_multi_rollup_data_points() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"data":[{"t":"2012-01-01T00:00:00.000+00:00","v":{"max":9.0,"min":1.0}}]}"#,
    );

    let rollup = MultiRollup::new([Fold::Max, Fold::Min], Period::days(1));
    let cursor = transport
        .client()
        .read_multi_rollup_data_points(&Series::new("temp-1"), &interval(), None, &rollup, None)
        .unwrap();
    let points: Vec<_> = cursor.collect::<Result<_, _>>().unwrap();
    assert_eq!(points[0].get("max"), Some(9.0));

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/series/key/temp-1/data/rollups/segment/");
    let mut folds = request.params_named("rollup.fold");
    folds.sort_unstable();
    assert_eq!(folds, vec!["max", "min"]);
    assert_eq!(request.params_named("rollup.period"), vec!["P1D"]);
}

#[test]
fn test_find_data_points() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"data":[{"interval":{"start":"2012-01-01T00:00:00.000+00:00","end":"2012-01-02T00:00:00.000+00:00"},"found":{"t":"2012-01-01T13:00:00.000+00:00","v":42.0}}]}"#,
    );

    let predicate = Predicate::new(Period::days(1), "Max");
    let cursor = transport
        .client()
        .find_data_points(&Series::new("temp-1"), &interval(), &predicate, None)
        .unwrap();
    let found: Vec<_> = cursor.collect::<Result<_, _>>().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].found.value, 42.0);

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/series/key/temp-1/find/");
    assert_eq!(request.param("predicate.function"), Some("max"));
    assert_eq!(request.param("predicate.period"), Some("P1D"));
}

#[test]
fn test_find_data_points_first_page_failure() {
    let transport = MockTransport::new();
    transport.respond(500, "internal");

    let predicate = Predicate::new(Period::days(1), "max");
    let result = transport
        .client()
        .find_data_points(&Series::new("temp-1"), &interval(), &predicate, None);
    assert!(matches!(result, Err(ClientError::Api { code: 500, .. })));
}

#[test]
fn test_read_single_value() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"series":{"key":"temp-1"},"data":{"t":"2012-01-01T12:00:00.000+00:00","v":7.5}}"#,
    );

    let response = transport.client().read_single_value(
        &Series::new("temp-1"),
        &timestamp(),
        None,
        Direction::Before,
    );
    let value = response.value().unwrap();
    assert_eq!(value.data.as_ref().map(|d| d.value), Some(7.5));

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/series/key/temp-1/single/");
    assert_eq!(request.param("direction"), Some("before"));
    assert_eq!(request.param("ts"), Some("2012-01-01T12:00:00.000+00:00"));
    assert_eq!(request.param("tz"), Some("UTC"));
}

#[test]
fn test_read_single_value_by_filter() {
    let transport = MockTransport::new();
    transport
        .respond(
            200,
            r#"{"data":[{"series":{"key":"a"},"data":null}],"next":"/v1/single/?page=2"}"#,
        )
        .respond(200, r#"{"data":[{"series":{"key":"b"},"data":null}]}"#);

    let cursor = transport
        .client()
        .read_single_value_by_filter(&Filter::new(), &timestamp(), None, Direction::default())
        .unwrap();
    let values: Vec<_> = cursor.collect::<Result<_, _>>().unwrap();
    assert_eq!(values.len(), 2);
    assert_eq!(values[1].series.key, "b");

    let requests = transport.requests();
    assert_eq!(requests[0].path(), "/v1/single/");
    assert_eq!(requests[0].param("direction"), Some("exact"));
}

#[test]
fn test_read_summary() {
    let transport = MockTransport::new();
    transport.respond(
        200,
        r#"{"series":{"key":"temp-1"},"summary":{"mean":3.5,"count":10}}"#,
    );

    let response = transport
        .client()
        .read_summary(&Series::new("temp-1"), &interval(), None);
    let summary = response.value().unwrap();
    assert_eq!(summary.summary.get("count"), Some(&10.0));

    let request = transport.last_request();
    assert_eq!(request.path(), "/v1/series/key/temp-1/summary/");
    assert_eq!(request.params().len(), 3);
}
