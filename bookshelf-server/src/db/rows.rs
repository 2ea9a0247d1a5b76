//! Query-row shapes and the join aggregator
//!
//! The single-book query is a LEFT JOIN of `books` onto `chapters`, which
//! comes back flat: one row per chapter, each repeating the book columns,
//! or exactly one row with NULL chapter columns for a book without chapters.
//! [`aggregate`] folds those rows back into one [`Book`].
//!
//! Nullable columns stay `Option` here; the domain types only see `Option`
//! where the field itself is optional.

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::FromRow;

use crate::models::{Book, Chapter};

/// Book columns as stored. Timestamps are `TIMESTAMP` (no zone) and are
/// read as UTC.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookRow {
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub year: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl BookRow {
    /// Convert to a domain book without chapters (list view).
    pub fn into_book(self) -> Book {
        Book {
            id: self.id,
            title: self.title,
            author: self.author,
            description: self.description,
            cover_url: self.cover_url,
            year: self.year,
            chapters: None,
            created_at: self.created_at.map(utc),
            updated_at: self.updated_at.map(utc),
        }
    }
}

/// One row of the book/chapter LEFT JOIN.
///
/// Every chapter column is NULL when the book has no chapters.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct BookChapterRow {
    #[sqlx(flatten)]
    pub book: BookRow,
    pub chapter_id: Option<String>,
    pub chapter_title: Option<String>,
    pub chapter_summary: Option<String>,
    pub chapter_audio_url: Option<String>,
    pub chapter_order_num: Option<i32>,
    pub chapter_created_at: Option<NaiveDateTime>,
}

impl BookChapterRow {
    /// Row for a book with no chapters.
    pub fn without_chapter(book: BookRow) -> Self {
        Self {
            book,
            chapter_id: None,
            chapter_title: None,
            chapter_summary: None,
            chapter_audio_url: None,
            chapter_order_num: None,
            chapter_created_at: None,
        }
    }

    /// The chapter carried by this row, if any.
    ///
    /// A NULL `order_num` on a present chapter was never set at storage time
    /// and reads as 0.
    fn chapter(&self) -> Option<Chapter> {
        let id = self.chapter_id.clone()?;
        Some(Chapter {
            id,
            book_id: self.book.id.clone(),
            title: self.chapter_title.clone().unwrap_or_default(),
            summary: self.chapter_summary.clone(),
            audio_url: self.chapter_audio_url.clone(),
            order_num: self.chapter_order_num.unwrap_or(0),
            created_at: self.chapter_created_at.map(utc),
        })
    }
}

/// Fold join rows into one book with its chapters.
///
/// Returns `None` for an empty input: the book does not exist. Otherwise
/// the book fields come from the first row and chapters are collected in
/// row order. Rows are not re-sorted; the query orders them.
pub fn aggregate(rows: Vec<BookChapterRow>) -> Option<Book> {
    let chapters: Vec<Chapter> = rows.iter().filter_map(BookChapterRow::chapter).collect();
    let first = rows.into_iter().next()?;

    let mut book = first.book.into_book();
    book.chapters = Some(chapters);
    Some(book)
}

fn utc(ts: NaiveDateTime) -> DateTime<Utc> {
    ts.and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn book_row(id: &str) -> BookRow {
        BookRow {
            id: id.into(),
            title: "The Hobbit".into(),
            author: "J. R. R. Tolkien".into(),
            description: Some("There and back again".into()),
            cover_url: None,
            year: Some("1937".into()),
            created_at: Some(ts(1)),
            updated_at: Some(ts(2)),
        }
    }

    fn chapter_row(book: &str, id: &str, order: Option<i32>) -> BookChapterRow {
        BookChapterRow {
            chapter_id: Some(id.into()),
            chapter_title: Some(format!("Chapter {id}")),
            chapter_summary: None,
            chapter_audio_url: Some(format!("{id}.mp3")),
            chapter_order_num: order,
            chapter_created_at: Some(ts(10)),
            ..BookChapterRow::without_chapter(book_row(book))
        }
    }

    #[test]
    fn empty_rows_is_not_found() {
        assert_eq!(aggregate(vec![]), None);
    }

    #[test]
    fn book_without_chapters_has_empty_list() {
        let book = aggregate(vec![BookChapterRow::without_chapter(book_row("b1"))]).unwrap();
        assert_eq!(book.id, "b1");
        assert_eq!(book.chapters, Some(vec![]));
        assert_eq!(book.year.as_deref(), Some("1937"));
    }

    #[test]
    fn keeps_row_order() {
        let rows = vec![
            chapter_row("b1", "c-late", Some(9)),
            chapter_row("b1", "c-early", Some(1)),
        ];
        let book = aggregate(rows).unwrap();
        let ids: Vec<_> = book.chapters().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-late", "c-early"]);
    }

    #[test]
    fn chapters_take_book_id_and_stored_timestamp() {
        let book = aggregate(vec![chapter_row("b1", "c1", Some(1))]).unwrap();
        let chapter = &book.chapters()[0];
        assert_eq!(chapter.book_id, "b1");
        assert_eq!(chapter.created_at, Some(ts(10).and_utc()));
        assert_eq!(chapter.audio_url.as_deref(), Some("c1.mp3"));
    }

    #[test]
    fn null_order_reads_as_zero() {
        let book = aggregate(vec![chapter_row("b1", "c1", None)]).unwrap();
        assert_eq!(book.chapters()[0].order_num, 0);
    }

    #[test]
    fn null_chapter_rows_are_skipped() {
        let rows = vec![
            chapter_row("b1", "c1", Some(1)),
            BookChapterRow::without_chapter(book_row("b1")),
            chapter_row("b1", "c2", Some(2)),
        ];
        let book = aggregate(rows).unwrap();
        assert_eq!(book.chapters().len(), 2);
    }

    #[test]
    fn list_view_conversion_has_no_chapters() {
        let book = book_row("b1").into_book();
        assert!(book.chapters.is_none());
        assert_eq!(book.created_at, Some(ts(1).and_utc()));
    }
}
