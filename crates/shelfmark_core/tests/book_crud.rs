use chrono::NaiveDate;
use rusqlite::Connection;
use shelfmark_core::db::open_db_in_memory;
use shelfmark_core::{
    Author, Book, BookSearchField, BookService, Format, Genre, Publisher, RepoError, Repository,
    SqliteAuthorRepository, SqliteBookRepository, SqliteGenreRepository,
    SqlitePublisherRepository, ValidationError,
};

struct Fixture {
    author: Author,
    publisher: Publisher,
    fiction: Genre,
    essay: Genre,
}

fn seed(conn: &Connection) -> Fixture {
    let author = SqliteAuthorRepository::new(conn)
        .create(&Author::new("Ursula K. Le Guin", "American"))
        .unwrap();
    let publisher = SqlitePublisherRepository::new(conn)
        .create(&Publisher::new("Harper Voyager"))
        .unwrap();
    let mut genres = SqliteGenreRepository::new(conn);
    let fiction = genres.create(&Genre::new("Science Fiction")).unwrap();
    let essay = genres.create(&Genre::new("Essay")).unwrap();

    Fixture {
        author,
        publisher,
        fiction,
        essay,
    }
}

fn dispossessed(fixture: &Fixture) -> Book {
    let mut book = Book::new(
        "The Dispossessed",
        "9780061054884",
        Format::Paperback,
        fixture.author.clone(),
        fixture.publisher.clone(),
    );
    book.pages = 387;
    book.price = 18.99;
    book.add_genre(fixture.fiction.clone());
    book
}

#[test]
fn create_assigns_id_and_populates_derived_counts() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let created = SqliteBookRepository::new(&mut conn)
        .create(&dispossessed(&fixture))
        .unwrap();

    assert!(created.id > 0);
    assert_eq!(created.title, "The Dispossessed");
    assert_eq!(created.pages, 387);
    assert_eq!(created.price, 18.99);
    assert_eq!(created.format, Format::Paperback);
    assert_eq!(created.author, fixture.author);
    assert_eq!(created.publisher, fixture.publisher);
    assert_eq!(created.genres.len(), 1);
    assert!(created.genres.contains(&fixture.fiction));

    // The returned aggregate is a fresh read: store-computed counters
    // already reflect the insert.
    assert_eq!(created.author.books_owned, 1);
    assert_eq!(created.publisher.books_owned, 1);
    let counted = SqliteAuthorRepository::new(&conn)
        .get_by_id(fixture.author.id)
        .unwrap();
    assert_eq!(counted.books_owned, 1);
}

#[test]
fn create_then_get_by_id_round_trips_every_column() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut book = dispossessed(&fixture);
    book.isbn_10 = Some("0306406152".to_string());
    book.isbn_13 = "9780306406157".to_string();
    book.read = true;
    book.purchase_date = NaiveDate::from_ymd_opt(2024, 11, 3);
    book.review = Some("Slow start, great payoff.".to_string());
    book.add_genre(fixture.essay.clone());

    let mut repo = SqliteBookRepository::new(&mut conn);
    let created = repo.create(&book).unwrap();
    let loaded = repo.get_by_id(created.id).unwrap();

    assert_eq!(loaded, created);
    assert_eq!(loaded.isbn_10.as_deref(), Some("0306406152"));
    assert_eq!(loaded.isbn_13, "9780306406157");
    assert!(loaded.read);
    assert_eq!(loaded.purchase_date, NaiveDate::from_ymd_opt(2024, 11, 3));
    assert_eq!(loaded.review.as_deref(), Some("Slow start, great payoff."));
    assert_eq!(loaded.genres.len(), 2);
}

#[test]
fn optional_columns_stay_unset_when_absent() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let created = SqliteBookRepository::new(&mut conn)
        .create(&dispossessed(&fixture))
        .unwrap();

    assert_eq!(created.isbn_10, None);
    assert_eq!(created.purchase_date, None);
    assert_eq!(created.review, None);
}

#[test]
fn create_rejects_invalid_isbn13_before_writing() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut book = dispossessed(&fixture);
    book.isbn_13 = "9780061054885".to_string();

    let mut repo = SqliteBookRepository::new(&mut conn);
    let err = repo.create(&book).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidIsbn13(_))
    ));
    assert!(repo.get_all().unwrap().is_empty());
}

#[test]
fn create_rejects_isbn_pair_naming_different_editions() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut book = dispossessed(&fixture);
    // Valid ISBN-10, but it derives 9780306406157, not the stored ISBN-13.
    book.isbn_10 = Some("0306406152".to_string());

    let err = SqliteBookRepository::new(&mut conn).create(&book).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::IsbnMismatch { .. })
    ));
}

#[test]
fn create_rejects_out_of_range_genre_count() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut none = dispossessed(&fixture);
    none.genres.clear();
    let err = SqliteBookRepository::new(&mut conn).create(&none).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::GenreCount(0))
    ));

    let extra: Vec<Genre> = {
        let mut genres = SqliteGenreRepository::new(&conn);
        ["Utopia", "Politics", "Anarchism"]
            .iter()
            .map(|name| genres.create(&Genre::new(*name)).unwrap())
            .collect()
    };
    let mut four = dispossessed(&fixture);
    four.add_genre(fixture.essay.clone());
    for genre in extra {
        four.add_genre(genre);
    }
    let err = SqliteBookRepository::new(&mut conn).create(&four).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::GenreCount(5))
    ));
}

#[test]
fn get_by_id_missing_book_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&conn);

    let err = SqliteBookRepository::new(&mut conn).get_by_id(7).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "book",
            id: 7
        }
    ));
}

#[test]
fn update_overwrites_all_mutable_columns() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut repo = SqliteBookRepository::new(&mut conn);
    let mut book = repo.create(&dispossessed(&fixture)).unwrap();

    book.title = "The Dispossessed: An Ambiguous Utopia".to_string();
    book.pages = 400;
    book.read = true;
    book.format = Format::Hardcover;
    book.price = 29.5;
    book.review = Some("Re-read in hardcover.".to_string());
    book.purchase_date = NaiveDate::from_ymd_opt(2025, 1, 15);

    let updated = repo.update(&book).unwrap();
    assert_eq!(updated, book);

    let loaded = repo.get_by_id(book.id).unwrap();
    assert_eq!(loaded.title, "The Dispossessed: An Ambiguous Utopia");
    assert_eq!(loaded.pages, 400);
    assert_eq!(loaded.format, Format::Hardcover);
    assert_eq!(loaded.price, 29.5);
    assert_eq!(loaded.purchase_date, NaiveDate::from_ymd_opt(2025, 1, 15));
    assert!(loaded.read);
}

#[test]
fn update_missing_book_is_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut ghost = dispossessed(&fixture);
    ghost.id = 404;

    let err = SqliteBookRepository::new(&mut conn).update(&ghost).unwrap_err();
    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: "book",
            id: 404
        }
    ));
}

#[test]
fn update_read_status_writes_only_the_flag() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut repo = SqliteBookRepository::new(&mut conn);
    let mut book = repo.create(&dispossessed(&fixture)).unwrap();

    // Local drift on another column must not leak through the narrow write.
    book.title = "locally renamed".to_string();
    book.read = true;
    repo.update_read_status(&book).unwrap();

    let loaded = repo.get_by_id(book.id).unwrap();
    assert!(loaded.read);
    assert_eq!(loaded.title, "The Dispossessed");
}

#[test]
fn delete_removes_book_and_its_links() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let created = {
        let mut repo = SqliteBookRepository::new(&mut conn);
        let mut book = dispossessed(&fixture);
        book.add_genre(fixture.essay.clone());
        let created = repo.create(&book).unwrap();
        repo.delete(created.id).unwrap();

        let err = repo.get_by_id(created.id).unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        created
    };

    assert_eq!(link_count(&conn, created.id), 0);
}

#[test]
fn reference_queries_match_exactly_by_id() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let other_author = SqliteAuthorRepository::new(&conn)
        .create(&Author::new("Stanislaw Lem", "Polish"))
        .unwrap();

    let mut repo = SqliteBookRepository::new(&mut conn);
    let le_guin_book = repo.create(&dispossessed(&fixture)).unwrap();

    let mut solaris = Book::new(
        "Solaris",
        "9780802130303",
        Format::Paperback,
        other_author.clone(),
        fixture.publisher.clone(),
    );
    solaris.add_genre(fixture.fiction.clone());
    solaris.add_genre(fixture.essay.clone());
    let solaris = repo.create(&solaris).unwrap();

    let by_author = repo.get_by_author(&fixture.author).unwrap();
    assert_eq!(by_author.len(), 1);
    assert_eq!(by_author[0].id, le_guin_book.id);

    let by_publisher = repo.get_by_publisher(&fixture.publisher).unwrap();
    assert_eq!(by_publisher.len(), 2);

    // Matching on one genre still returns the complete genre set.
    let by_genre = repo.get_by_genre(&fixture.essay).unwrap();
    assert_eq!(by_genre.len(), 1);
    assert_eq!(by_genre[0].id, solaris.id);
    assert_eq!(by_genre[0].genres.len(), 2);
}

#[test]
fn filters_match_substrings() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut repo = SqliteBookRepository::new(&mut conn);
    let mut book = dispossessed(&fixture);
    book.isbn_10 = Some("0306406152".to_string());
    book.isbn_13 = "9780306406157".to_string();
    repo.create(&book).unwrap();

    assert_eq!(repo.filter_by_title("possess").unwrap().len(), 1);
    assert!(repo.filter_by_title("Left Hand").unwrap().is_empty());

    assert_eq!(repo.filter_by_author_name("Le Guin").unwrap().len(), 1);
    assert_eq!(repo.filter_by_isbn("0306406").unwrap().len(), 1);
}

#[test]
fn service_search_strips_dashes_from_isbn_input() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut book = dispossessed(&fixture);
    book.isbn_10 = Some("0306406152".to_string());
    book.isbn_13 = "9780306406157".to_string();

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    service.create(&book).unwrap();

    let hits = service
        .search(BookSearchField::Isbn, "978-0-306-40615-7")
        .unwrap();
    assert_eq!(hits.len(), 1);

    let by_title = service.search(BookSearchField::Title, "Dispossessed").unwrap();
    assert_eq!(by_title.len(), 1);

    let by_author = service.search(BookSearchField::AuthorName, "Ursula").unwrap();
    assert_eq!(by_author.len(), 1);
}

#[test]
fn service_toggle_read_flips_and_persists() {
    let mut conn = open_db_in_memory().unwrap();
    let fixture = seed(&conn);

    let mut service = BookService::new(SqliteBookRepository::new(&mut conn));
    let mut book = service.create(&dispossessed(&fixture)).unwrap();
    assert!(!book.read);

    service.toggle_read(&mut book).unwrap();
    assert!(book.read);
    assert!(service.get(book.id).unwrap().read);

    service.toggle_read(&mut book).unwrap();
    assert!(!service.get(book.id).unwrap().read);
}

fn link_count(conn: &Connection, book_id: i64) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM book_genre WHERE book_id = ?1;",
        [book_id],
        |row| row.get(0),
    )
    .unwrap()
}
