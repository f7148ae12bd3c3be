//! End-to-end batches for the blog model: tracked entities in, parsed T-SQL out.

mod common;

use common::*;
use oxide_changeset::prelude::*;

const INSERT_BLOG: &str = "EXECUTE sp_executesql N'INSERT INTO Blog ([AndChew], [Away], [Fuse], [George], [Name], [NotFigTime], [OrNothing], [TheGu], [ToEat], [WayRound]) VALUES (@p0,@p1,@p2,@p3,@p4,@p5,@p6,@p7,@p8,@p9)', N'@p0 varbinary(max),@p1 real,@p2 smallint,@p3 bit,@p4 nvarchar(max),@p5 datetime2,@p6 float,@p7 uniqueidentifier,@p8 tinyint,@p9 bigint', @p0 = 0x00000000000000000000000000000000,@p1 = 0.12345,@p2 = 777,@p3 = 1,@p4 = 'Blog to Insert',@p5 = '1973-09-03T00:10:33.777',@p6 = 0.123456789,@p7 = '0456aef1-b7fc-47aa-8102-975d6ba3a9bf',@p8 = 64,@p9 = 9876543210;";

const UPDATE_BLOG1: &str = "EXECUTE sp_executesql N'UPDATE Blog SET [Name] = @p0 WHERE [Id]=@p1', N'@p0 nvarchar(max),@p1 int', @p0 = 'Blog is Updated',@p1 = 1;";

const DELETE_BLOG2: &str =
    "EXECUTE sp_executesql N'DELETE FROM Blog WHERE [Id] = @p0', N'@p0 int', @p0 = 2;";

#[test]
fn test_insert_single_entity() {
    let (mut tracker, _, _) = seeded_tracker();
    tracker.add("Blog", blog_to_insert()).unwrap();

    let sql = generate_batch(&tracker);

    assert_eq!(sql, INSERT_BLOG);
    assert_eq!(parse_batch(&sql).len(), 1);
}

#[test]
fn test_update_single_entity() {
    let (mut tracker, first, _) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();

    let sql = generate_batch(&tracker);

    assert_eq!(sql, UPDATE_BLOG1);
    assert_eq!(parse_batch(&sql).len(), 1);
}

#[test]
fn test_delete_single_entity() {
    let (mut tracker, _, second) = seeded_tracker();
    tracker.set(second, "Name", "Blog to delete").unwrap();
    tracker.set_state(second, EntityState::Deleted).unwrap();

    let sql = generate_batch(&tracker);

    assert_eq!(sql, DELETE_BLOG2);
    assert_eq!(parse_batch(&sql).len(), 1);
}

#[test]
fn test_mixed_dml() {
    let (mut tracker, first, second) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    tracker.set(second, "Name", "Blog to delete").unwrap();
    tracker.remove(second).unwrap();
    tracker.add("Blog", blog_to_insert()).unwrap();

    let sql = generate_batch(&tracker);

    assert_eq!(sql, format!("{INSERT_BLOG}{UPDATE_BLOG1}{DELETE_BLOG2}"));
    assert_eq!(parse_batch(&sql).len(), 3);
}

#[test]
fn test_insert_multiple_entities() {
    let (mut tracker, _, _) = seeded_tracker();
    tracker.add("Blog", blog_to_insert()).unwrap();
    tracker.add("Blog", another_blog_to_insert()).unwrap();

    let sql = generate_batch(&tracker);

    assert!(sql.starts_with(INSERT_BLOG));
    let second = &sql[INSERT_BLOG.len()..];
    assert!(second.contains("@p0 = 0x0102030405060708090A"));
    assert!(second.contains("@p4 = 'Another Blog to Insert'"));
    assert!(second.contains("@p7 = '0456aef1-b7fc-47aa-8102-975d6ba3a9be'"));
    assert_eq!(parse_batch(&sql).len(), 2);
}

#[test]
fn test_forced_modified_state_updates_every_column() {
    let (mut tracker, first, _) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    tracker.set_state(first, EntityState::Modified).unwrap();

    let sql = generate_batch(&tracker);

    assert!(sql.starts_with(
        "EXECUTE sp_executesql N'UPDATE Blog SET [AndChew] = @p0, [Away] = @p1, [Fuse] = @p2, \
         [George] = @p3, [Name] = @p4, [NotFigTime] = @p5, [OrNothing] = @p6, [TheGu] = @p7, \
         [ToEat] = @p8, [WayRound] = @p9 WHERE [Id]=@p10'"
    ));
    assert!(sql.contains("@p4 = 'Blog is Updated'"));
    assert!(sql.ends_with(",@p10 = 1;"));
    assert_eq!(parse_batch(&sql).len(), 1);
}

#[test]
fn test_nothing_pending() {
    let (tracker, _, _) = seeded_tracker();
    assert_eq!(generate_batch(&tracker), "");
}

#[test]
fn test_accepted_changes_are_not_generated_again() {
    let (mut tracker, first, _) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    assert_eq!(generate_batch(&tracker), UPDATE_BLOG1);

    tracker.accept_changes();
    assert_eq!(generate_batch(&tracker), "");
}

#[test]
fn test_statement_per_line_batch_parses() {
    let (mut tracker, first, second) = seeded_tracker();
    tracker.set(first, "Name", "O'Brien's Blog").unwrap();
    tracker.remove(second).unwrap();
    tracker.add("Blog", blog_to_insert()).unwrap();

    let generator = BatchGenerator::with_options(GeneratorOptions::new().statement_per_line(true));
    let sql = generator.generate_from(&tracker).unwrap();

    assert_eq!(sql.lines().count(), 3);
    assert!(sql.contains("@p0 = 'O''Brien''s Blog'"));
    assert_eq!(parse_batch(&sql).len(), 3);
}

#[test]
fn test_stream_to_file() {
    let (mut tracker, first, _) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    tracker.add("Blog", blog_to_insert()).unwrap();
    let records = tracker.enumerate_changes().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.sql");
    let file = std::fs::File::create(&path).unwrap();

    let generator =
        BatchGenerator::with_options(GeneratorOptions::new().flush_each_statement(true));
    let summary = generator.write_to(&records, file).unwrap();

    assert_eq!(summary.inserts, 1);
    assert_eq!(summary.updates, 1);
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written, format!("{INSERT_BLOG}{UPDATE_BLOG1}"));
}

#[derive(Default)]
struct FlushCounter {
    bytes: Vec<u8>,
    flushes: usize,
}

impl std::io::Write for FlushCounter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flushes += 1;
        Ok(())
    }
}

#[test]
fn test_flush_each_statement_flushes_the_writer() {
    let (mut tracker, first, second) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    tracker.remove(second).unwrap();
    tracker.add("Blog", blog_to_insert()).unwrap();
    let records = tracker.enumerate_changes().unwrap();

    let mut flushed = FlushCounter::default();
    let generator =
        BatchGenerator::with_options(GeneratorOptions::new().flush_each_statement(true));
    let summary = generator.write_to(&records, &mut flushed).unwrap();

    assert_eq!(summary.statements(), 3);
    assert_eq!(flushed.flushes, 3);
    assert_eq!(
        String::from_utf8(flushed.bytes).unwrap(),
        format!("{INSERT_BLOG}{UPDATE_BLOG1}{DELETE_BLOG2}")
    );
}

#[test]
fn test_writer_is_not_flushed_by_default() {
    let (mut tracker, first, _) = seeded_tracker();
    tracker.set(first, "Name", "Blog is Updated").unwrap();
    let records = tracker.enumerate_changes().unwrap();

    let mut flushed = FlushCounter::default();
    BatchGenerator::new().write_to(&records, &mut flushed).unwrap();

    assert_eq!(flushed.flushes, 0);
    assert_eq!(String::from_utf8(flushed.bytes).unwrap(), UPDATE_BLOG1);
}
