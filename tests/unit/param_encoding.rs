//! Parameter encoder properties over a range of inputs

use chrono::{DateTime, FixedOffset, TimeZone};
use tempodb::client::params::ParamEncoder;
use tempodb::client::{Method, Request};
use tempodb::{Filter, Interval};

fn request() -> Request {
    Request::build(Method::Get, "/{version}/series/")
}

#[test]
fn test_filter_parameter_counts_match_collections() {
    for (keys, tags, attrs) in [(0, 0, 0), (1, 0, 0), (0, 3, 0), (2, 2, 2), (5, 1, 4)] {
        let mut filter = Filter::new();
        for i in 0..keys {
            filter = filter.add_key(format!("key-{i}"));
        }
        for i in 0..tags {
            filter = filter.add_tag(format!("tag-{i}"));
        }
        for i in 0..attrs {
            filter = filter.add_attribute(format!("attr{i}"), format!("value-{i}"));
        }

        let mut req = request();
        ParamEncoder::apply_filter(&mut req, Some(&filter));

        assert_eq!(req.params_named("key").len(), keys);
        assert_eq!(req.params_named("tag").len(), tags);
        let attr_params: Vec<_> = req
            .params()
            .iter()
            .filter(|(name, _)| name.starts_with("attr["))
            .collect();
        assert_eq!(attr_params.len(), attrs);
        for i in 0..attrs {
            assert_eq!(
                req.param(&format!("attr[attr{i}]")),
                Some(format!("value-{i}").as_str())
            );
        }
        for i in 0..keys {
            assert!(req.params_named("key").contains(&format!("key-{i}").as_str()));
        }
    }
}

#[test]
fn test_empty_filter_adds_nothing() {
    let mut req = request();
    ParamEncoder::apply_filter(&mut req, Some(&Filter::new()));
    assert!(req.params().is_empty());
}

#[test]
fn test_interval_always_utc_and_round_trips() {
    for offset_hours in [-11, -6, 0, 3, 9, 13] {
        let zone = FixedOffset::east_opt(offset_hours * 3600).unwrap();
        let start = zone.with_ymd_and_hms(2013, 6, 30, 23, 15, 0).unwrap();
        let end = zone.with_ymd_and_hms(2013, 7, 1, 4, 0, 0).unwrap();

        let mut req = request();
        ParamEncoder::apply_interval(&mut req, &Interval::new(start, end));

        assert_eq!(req.params().len(), 2);
        let start_text = req.param("start").unwrap();
        let end_text = req.param("end").unwrap();
        assert!(start_text.ends_with("+00:00"), "{start_text}");
        assert!(end_text.ends_with("+00:00"), "{end_text}");

        assert_eq!(DateTime::parse_from_rfc3339(start_text).unwrap(), start);
        assert_eq!(DateTime::parse_from_rfc3339(end_text).unwrap(), end);
    }
}

#[test]
fn test_millisecond_precision_is_kept() {
    let utc = FixedOffset::east_opt(0).unwrap();
    let ts = utc
        .with_ymd_and_hms(2012, 1, 1, 0, 0, 0)
        .unwrap()
        .checked_add_signed(chrono::Duration::milliseconds(123))
        .unwrap();
    assert_eq!(
        ParamEncoder::format_timestamp(&ts),
        "2012-01-01T00:00:00.123+00:00"
    );
}
