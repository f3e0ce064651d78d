//! End-to-end tests over real flat files

use std::fs;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tempfile::TempDir;

use library_manager::{
    clock::FixedClock,
    config::AuthConfig,
    models::{Book, LoanPolicy, Member, TransactionStatus},
    repository::CsvPersistence,
    AppError, Library,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn open(dir: &TempDir, clock: Arc<FixedClock>) -> Library {
    Library::new(
        Box::new(CsvPersistence::in_dir(dir.path())),
        LoanPolicy::default(),
        clock,
        AuthConfig::default(),
    )
}

#[test]
fn test_fresh_directory_gets_headers() {
    let dir = TempDir::new().unwrap();
    let library = open(&dir, Arc::new(FixedClock::new(date(2025, 5, 1))));
    assert!(library.repository().books().is_empty());

    let books = fs::read_to_string(dir.path().join("books.csv")).unwrap();
    let members = fs::read_to_string(dir.path().join("members.csv")).unwrap();
    let transactions = fs::read_to_string(dir.path().join("transactions.csv")).unwrap();
    assert_eq!(books.trim_end(), "ISBN,Title,Author,Quantity");
    assert_eq!(members.trim_end(), "ID,NamaLengkap,Jurusan,Email,Password");
    assert_eq!(
        transactions.trim_end(),
        "TransactionID,MemberID,ISBN,BorrowDate,DueDate,ActualReturnDate,Status,Fine"
    );
}

#[test]
fn test_borrow_return_and_reload() {
    let dir = TempDir::new().unwrap();
    let clock = Arc::new(FixedClock::new(date(2025, 5, 1)));
    let mut library = open(&dir, clock.clone());

    library
        .members()
        .add_member(Member::new("M001", "Ani Lestari", Some("Informatika".into()), "ani@kampus.ac.id", "rahasia"))
        .unwrap();
    library
        .catalog()
        .add_book(Book::new("978-0132350884", "Clean Code", "Robert C. Martin", 1))
        .unwrap();

    let loan = library.loans().borrow_book("M001", "978-0132350884").unwrap();
    assert_eq!(loan.due_date, date(2025, 5, 8));

    let second = library.loans().borrow_book("M001", "978-0132350884");
    assert!(matches!(second, Err(AppError::OutOfStock { .. })));

    clock.set(date(2025, 5, 10));
    let returned = library.loans().return_book(&loan.transaction_id).unwrap();
    assert_eq!(returned.fine, Decimal::from(2000));

    let ledger = fs::read_to_string(dir.path().join("transactions.csv")).unwrap();
    let row = ledger.lines().nth(1).unwrap();
    assert_eq!(
        row,
        format!(
            "{},M001,978-0132350884,2025-05-01,2025-05-08,2025-05-10,Returned,2000.0",
            loan.transaction_id
        )
    );

    // A second session sees everything the first one wrote
    let mut reopened = open(&dir, clock);
    let book = reopened.catalog().find_by_isbn("978-0132350884").unwrap();
    assert_eq!(book.quantity(), 1);
    let member = reopened.members().find_by_id("m001").unwrap();
    assert_eq!(member.major.as_deref(), Some("Informatika"));
    assert_eq!(member.password, "rahasia");

    let stored = reopened.loans().find_by_id(&loan.transaction_id).unwrap();
    assert_eq!(stored.status, TransactionStatus::Returned);
    assert_eq!(stored.fine, Decimal::from(2000));

    let stats = reopened.stats().monthly_statistics();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total_borrows, 1);
    assert_eq!(stats[0].total_returns, 1);
    assert_eq!(stats[0].total_fines, Decimal::from(2000));
}

#[test]
fn test_reads_files_written_by_older_builds() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("books.csv"),
        "ISBN,Title,Author,Quantity\n978-1,Laskar Pelangi,Andrea Hirata,3\nbroken-row\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("members.csv"),
        "ID,NamaLengkap,Jurusan,Email,Password\nM1,Budi,,budi@x.com,pw\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("transactions.csv"),
        "TransactionID,MemberID,ISBN,BorrowDate,DueDate,ActualReturnDate,Status,Fine\n\
         T-1A2B3C4D,M1,978-1,2025-01-02,2025-01-09,null,Overdue,0.0\n\
         T-5E6F7A8B,M1,978-1,2024-12-01,2024-12-08,2024-12-20,Returned,1.2E4\n",
    )
    .unwrap();

    let clock = Arc::new(FixedClock::new(date(2025, 1, 15)));
    let mut library = open(&dir, clock);

    assert_eq!(library.catalog().list_books().len(), 1);
    assert_eq!(library.members().find_by_id("M1").unwrap().major, None);

    let open_loans = library.loans().open_loans();
    assert_eq!(open_loans.len(), 1);
    assert_eq!(open_loans[0].actual_return_date, None);
    assert_eq!(
        library.loans().preview_fine("t-1a2b3c4d").unwrap(),
        Decimal::from(6000)
    );

    let old = library.loans().find_by_id("T-5E6F7A8B").unwrap();
    assert_eq!(old.fine, Decimal::from(12000));

    // Still an open loan, so the same book cannot be borrowed twice
    assert!(matches!(
        library.loans().borrow_book("M1", "978-1"),
        Err(AppError::AlreadyBorrowed { .. })
    ));

    let returned = library.loans().return_book("T-1A2B3C4D").unwrap();
    assert_eq!(returned.fine, Decimal::from(6000));
    assert_eq!(library.catalog().find_by_isbn("978-1").unwrap().quantity(), 4);
}

#[test]
fn test_login_against_stored_members() {
    let dir = TempDir::new().unwrap();
    let mut library = open(&dir, Arc::new(FixedClock::new(date(2025, 5, 1))));
    library
        .members()
        .add_member(Member::new("M7", "Citra", None, "citra@x.com", "s3cret"))
        .unwrap();

    assert!(library.auth().login("admin", "admin123").unwrap().is_admin());
    assert_eq!(library.auth().login("M7", "s3cret").unwrap().display_name, "Citra");
    assert!(library.auth().login("M7", "wrong").is_err());
}
