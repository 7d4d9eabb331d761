//! Unit tests for the SqlBuilder query construction.

use chrono::NaiveDate;
use ecom_dashboard::SqlBuilder;

#[test]
fn new_creates_select_star_from_table() {
    let (sql, params) = SqlBuilder::new("transactions").build();
    assert_eq!(sql, "SELECT *\nFROM transactions");
    assert!(params.is_empty());
}

#[test]
fn select_replaces_default_star() {
    let (sql, _) = SqlBuilder::new("transactions")
        .select(&["product_id", "payment_value"])
        .build();
    assert!(sql.starts_with("SELECT product_id, payment_value\n"));
}

#[test]
fn where_date_between_casts_and_binds_both_ends() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
    let (sql, params) = SqlBuilder::new("transactions")
        .where_date_between("ts", start, end)
        .build();
    assert!(sql.contains("CAST(ts AS DATE) >= make_date("));
    assert!(sql.contains("CAST(ts AS DATE) <= make_date("));
    assert_eq!(sql.matches('?').count(), 6);
    assert_eq!(params, vec!["2023", "1", "1", "2023", "1", "31"]);
}

#[test]
fn where_date_between_binds_five_digit_years_as_integers() {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
    let (_, params) = SqlBuilder::new("transactions")
        .where_date_between("ts", start, end)
        .build();
    assert_eq!(params[3..], ["10000", "1", "1"]);
    assert!(params.iter().all(|p| !p.starts_with('+')));
}

#[test]
fn conditions_are_parenthesized_and_anded() {
    let (sql, params) = SqlBuilder::new("transactions")
        .where_clause("payment_value > ?", &["10"])
        .where_not_null("review_score")
        .build();
    assert!(sql.contains("WHERE (payment_value > ?) AND (review_score IS NOT NULL)"));
    assert_eq!(params, vec!["10"]);
}

#[test]
fn full_query_orders_clauses() {
    let (sql, _) = SqlBuilder::new("transactions")
        .select(&["product_id AS key", "SUM(payment_value) AS value"])
        .where_not_null("product_id")
        .group_by(&["product_id"])
        .order_by(&["value DESC", "MIN(rowid) ASC"])
        .limit(5)
        .build();
    let where_pos = sql.find("WHERE").unwrap();
    let group_pos = sql.find("GROUP BY").unwrap();
    let order_pos = sql.find("ORDER BY").unwrap();
    let limit_pos = sql.find("LIMIT 5").unwrap();
    assert!(where_pos < group_pos && group_pos < order_pos && order_pos < limit_pos);
    assert!(sql.contains("ORDER BY value DESC, MIN(rowid) ASC"));
}
