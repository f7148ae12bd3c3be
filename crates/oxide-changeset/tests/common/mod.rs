#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use oxide_changeset::prelude::*;
use sqlparser::ast::Statement;
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;
use uuid::Uuid;

pub const FIRST_GUID: &str = "0456AEF1-B7FC-47AA-8102-975D6BA3A9BF";
pub const SECOND_GUID: &str = "0456AEF1-B7FC-47AA-8102-975D6BA3A9BE";

pub fn blog_schema() -> Schema {
    Schema::new().entity(
        EntityMapping::new("Blog", "Blog")
            .column(ColumnMapping::new("Id", "int").identity())
            .column(ColumnMapping::new("AndChew", "varbinary(max)"))
            .column(ColumnMapping::new("Away", "real"))
            .column(ColumnMapping::new("Fuse", "smallint"))
            .column(ColumnMapping::new("George", "bit"))
            .column(ColumnMapping::new("Name", "nvarchar(max)"))
            .column(ColumnMapping::new("NotFigTime", "datetime2"))
            .column(ColumnMapping::new("OrNothing", "float"))
            .column(ColumnMapping::new("TheGu", "uniqueidentifier"))
            .column(ColumnMapping::new("ToEat", "tinyint"))
            .column(ColumnMapping::new("WayRound", "bigint")),
    )
}

/// A tracker holding the two persisted blogs `Blog1` (Id 1) and `Blog2` (Id 2).
pub fn seeded_tracker() -> (ChangeTracker, EntryId, EntryId) {
    let mut tracker = ChangeTracker::new(blog_schema());
    let first = tracker
        .attach("Blog", persisted_blog(1, "Blog1"))
        .unwrap_or_else(|e| panic!("Failed to attach Blog1: {e}"));
    let second = tracker
        .attach("Blog", persisted_blog(2, "Blog2"))
        .unwrap_or_else(|e| panic!("Failed to attach Blog2: {e}"));
    (tracker, first, second)
}

pub fn persisted_blog(id: i32, name: &str) -> Vec<(&'static str, SqlValue)> {
    vec![
        ("Id", id.to_sql_value()),
        ("AndChew", vec![0_u8; 4].to_sql_value()),
        ("Away", 1.5_f32.to_sql_value()),
        ("Fuse", 1_i16.to_sql_value()),
        ("George", false.to_sql_value()),
        ("Name", name.to_sql_value()),
        ("NotFigTime", timestamp(2017, 1, 1, 0, 0, 0, 0).to_sql_value()),
        ("OrNothing", 2.5_f64.to_sql_value()),
        ("TheGu", Uuid::nil().to_sql_value()),
        ("ToEat", 1_u8.to_sql_value()),
        ("WayRound", 1_i64.to_sql_value()),
    ]
}

pub fn blog_to_insert() -> Vec<(&'static str, SqlValue)> {
    vec![
        ("Name", "Blog to Insert".to_sql_value()),
        ("George", true.to_sql_value()),
        ("TheGu", guid(FIRST_GUID).to_sql_value()),
        ("NotFigTime", timestamp(1973, 9, 3, 0, 10, 33, 777).to_sql_value()),
        ("ToEat", 64_u8.to_sql_value()),
        ("OrNothing", 0.123_456_789_f64.to_sql_value()),
        ("Fuse", 777_i16.to_sql_value()),
        ("WayRound", 9_876_543_210_i64.to_sql_value()),
        ("Away", 0.123_45_f32.to_sql_value()),
        ("AndChew", [0_u8; 16].to_sql_value()),
    ]
}

pub fn another_blog_to_insert() -> Vec<(&'static str, SqlValue)> {
    vec![
        ("Name", "Another Blog to Insert".to_sql_value()),
        ("George", true.to_sql_value()),
        ("TheGu", guid(SECOND_GUID).to_sql_value()),
        ("NotFigTime", timestamp(1974, 9, 3, 0, 10, 33, 777).to_sql_value()),
        ("ToEat", 65_u8.to_sql_value()),
        ("OrNothing", 0.123_456_789_f64.to_sql_value()),
        ("Fuse", 777_i16.to_sql_value()),
        ("WayRound", 9_876_543_210_i64.to_sql_value()),
        ("Away", 0.123_45_f32.to_sql_value()),
        ("AndChew", vec![1_u8, 2, 3, 4, 5, 6, 7, 8, 9, 10].to_sql_value()),
    ]
}

pub fn guid(text: &str) -> Uuid {
    Uuid::parse_str(text).unwrap_or_else(|e| panic!("Bad guid {text}: {e}"))
}

pub fn timestamp(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_milli_opt(hour, minute, second, milli))
        .unwrap_or_else(|| panic!("Bad timestamp {year}-{month}-{day}"))
}

/// Parses a batch as T-SQL, panicking with the batch on any syntax error.
pub fn parse_batch(sql: &str) -> Vec<Statement> {
    Parser::parse_sql(&MsSqlDialect {}, sql)
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn generate_batch(tracker: &ChangeTracker) -> String {
    BatchGenerator::new()
        .generate_from(tracker)
        .unwrap_or_else(|e| panic!("Failed to generate: {e}"))
}
