//! Range filter integration tests.

mod common;

use chrono::NaiveDate;
use ecom_dashboard::{filter, DateBounds};

#[test]
fn no_bounds_is_identity() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let all = dataset.filter(None).rows().unwrap();
    assert_eq!(all.len(), 7);
    assert_eq!(filter(&dataset, None).rows().unwrap(), all);
}

#[test]
fn bounded_view_is_subset_split_exactly_by_date() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let all = dataset.filter(None).rows().unwrap();
    let b = common::bounds("2023-01-10", "2023-02-05").unwrap();
    let kept = dataset.filter(Some(b)).rows().unwrap();

    for row in &kept {
        assert!(all.contains(row));
        assert!(b.contains(row.purchase_date().unwrap()));
    }
    for row in all.iter().filter(|r| !kept.contains(r)) {
        assert!(!b.contains(row.purchase_date().unwrap()));
    }
    assert_eq!(kept.len(), 3);
}

#[test]
fn end_date_includes_whole_day_and_excludes_next_midnight() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let rows = dataset
        .filter(common::bounds("2023-01-01", "2023-01-31"))
        .rows()
        .unwrap();
    let ids: Vec<&str> = rows.iter().map(|r| r.order_id.as_str()).collect();
    assert!(ids.contains(&"o3"), "row at 2023-01-31 23:59 must be included");
    assert!(!ids.contains(&"o4"), "row at 2023-02-01 00:00 must be excluded");
}

#[test]
fn reversed_bounds_yield_empty_view() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let view = dataset.filter(common::bounds("2023-03-01", "2023-01-01"));
    assert!(view.is_empty().unwrap());
    assert!(view.rows().unwrap().is_empty());
}

#[test]
fn bounds_outside_data_yield_empty_or_full_view() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    assert_eq!(
        dataset.filter(common::bounds("2030-01-01", "2030-12-31")).len().unwrap(),
        0
    );
    assert_eq!(
        dataset.filter(common::bounds("2000-01-01", "2099-12-31")).len().unwrap(),
        7
    );
}

#[test]
fn single_day_bounds() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let view = dataset.filter(common::bounds("2023-01-01", "2023-01-01"));
    assert_eq!(view.len().unwrap(), 2);
}

#[test]
fn partial_selection_falls_back_to_everything() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let bounds = DateBounds::from_selection(&[common::date("2023-01-01")]);
    assert_eq!(dataset.filter(bounds).len().unwrap(), 7);

    let bounds = DateBounds::parse(Some("2023-01-01"), Some("not-a-date"));
    assert_eq!(dataset.filter(bounds).len().unwrap(), 7);
}

#[test]
fn undated_rows_only_appear_unfiltered() {
    let (dataset, _tmp) = common::load_rows(&[
        "o1,pA,recife,1,2023-05-01 10:00:00,10.0,5,True",
        "o2,pB,recife,1,,20.0,4,False",
    ]);
    assert_eq!(dataset.filter(None).len().unwrap(), 2);
    assert_eq!(
        dataset.filter(common::bounds("1970-01-01", "2099-12-31")).len().unwrap(),
        1
    );
}

#[test]
fn filtering_never_changes_the_dataset() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let before = dataset.filter(None).rows().unwrap();
    let _ = dataset.filter(common::bounds("2023-02-01", "2023-02-28")).rows().unwrap();
    assert_eq!(dataset.filter(None).rows().unwrap(), before);
}

#[test]
fn five_digit_years_filter_instead_of_failing() {
    let (dataset, _tmp) = common::setup_sample_dataset();
    let far = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();

    let open_ended = DateBounds::from_selection(&[common::date("2023-01-01"), far]);
    let whole = dataset.filter(open_ended);
    assert_eq!(whole.metrics().total_sales().unwrap(), 280.0);
    assert_eq!(whole.len().unwrap(), 7);

    let beyond = Some(DateBounds::new(far, NaiveDate::from_ymd_opt(10001, 12, 31).unwrap()));
    let view = dataset.filter(beyond);
    assert_eq!(view.len().unwrap(), 0);
    assert_eq!(view.metrics().total_sales().unwrap(), 0.0);
}
