//! Comma-separated flat-file persistence
//!
//! One file per collection, each starting with a fixed header line. Fields
//! are split on plain commas with no quoting or escaping, so values must not
//! contain commas. Dates are ISO-8601 (`YYYY-MM-DD`); an empty or `null`
//! return date means the loan is still open.
//!
//! Rows that cannot be parsed are logged and skipped. A missing file is
//! created with its header only; a file that exists but cannot be read is an
//! error and is left untouched.

use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, StringRecord, Trim, WriterBuilder};
use rust_decimal::Decimal;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use super::Persistence;
use crate::{
    config::StorageConfig,
    error::AppResult,
    models::{Book, Member, Transaction, TransactionStatus},
};

pub const BOOKS_HEADER: [&str; 4] = ["ISBN", "Title", "Author", "Quantity"];
pub const MEMBERS_HEADER: [&str; 5] = ["ID", "NamaLengkap", "Jurusan", "Email", "Password"];
pub const TRANSACTIONS_HEADER: [&str; 8] = [
    "TransactionID",
    "MemberID",
    "ISBN",
    "BorrowDate",
    "DueDate",
    "ActualReturnDate",
    "Status",
    "Fine",
];

/// Flat-file persistence rooted in a data directory
#[derive(Debug, Clone)]
pub struct CsvPersistence {
    books_path: PathBuf,
    members_path: PathBuf,
    transactions_path: PathBuf,
}

impl CsvPersistence {
    pub fn new(config: &StorageConfig) -> Self {
        if let Err(e) = fs::create_dir_all(&config.data_dir) {
            tracing::error!(dir = %config.data_dir.display(), error = %e, "Failed to create data directory");
        }
        Self {
            books_path: config.books_path(),
            members_path: config.members_path(),
            transactions_path: config.transactions_path(),
        }
    }

    /// Default file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(&StorageConfig {
            data_dir: dir.as_ref().to_path_buf(),
            ..StorageConfig::default()
        })
    }

    pub fn books_path(&self) -> &Path {
        &self.books_path
    }

    pub fn members_path(&self) -> &Path {
        &self.members_path
    }

    pub fn transactions_path(&self) -> &Path {
        &self.transactions_path
    }
}

impl Persistence for CsvPersistence {
    fn load_books(&self) -> AppResult<Vec<Book>> {
        load(&self.books_path, &BOOKS_HEADER, parse_book)
    }

    fn save_books(&self, books: &[Book]) -> AppResult<()> {
        save(&self.books_path, &BOOKS_HEADER, books.iter().map(book_row))
    }

    fn load_members(&self) -> AppResult<Vec<Member>> {
        load(&self.members_path, &MEMBERS_HEADER, parse_member)
    }

    fn save_members(&self, members: &[Member]) -> AppResult<()> {
        save(&self.members_path, &MEMBERS_HEADER, members.iter().map(member_row))
    }

    fn load_transactions(&self) -> AppResult<Vec<Transaction>> {
        load(&self.transactions_path, &TRANSACTIONS_HEADER, parse_transaction)
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> AppResult<()> {
        save(
            &self.transactions_path,
            &TRANSACTIONS_HEADER,
            transactions.iter().map(transaction_row),
        )
    }
}

fn load<T, F>(path: &Path, header: &[&str], parse: F) -> AppResult<Vec<T>>
where
    F: Fn(&StringRecord) -> Result<T, String>,
{
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::info!(file = %path.display(), "Data file missing, creating it with header");
            save(path, header, std::iter::empty())?;
            return Ok(Vec::new());
        }
        // Never overwrite a file that exists but cannot be read
        Err(e) => return Err(e.into()),
    };

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(Trim::All)
        .from_reader(file);

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "Skipping unreadable row");
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if index == 0 {
            if is_header(&record, header) {
                continue;
            }
            let found = record.iter().collect::<Vec<_>>().join(",");
            tracing::warn!(
                file = %path.display(),
                %found,
                "Unexpected header, reading first line as data"
            );
        }

        if record.iter().all(str::is_empty) {
            continue;
        }

        match parse(&record) {
            Ok(item) => records.push(item),
            Err(reason) => {
                tracing::warn!(file = %path.display(), line, %reason, "Skipping malformed row");
            }
        }
    }

    Ok(records)
}

/// Rewrite the whole file through a temporary sibling
fn save<I>(path: &Path, header: &[&str], rows: I) -> AppResult<()>
where
    I: Iterator<Item = Vec<String>>,
{
    let temp_path = path.with_extension("tmp");
    {
        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Never)
            .from_path(&temp_path)?;
        writer.write_record(header)?;
        for row in rows {
            writer.write_record(&row)?;
        }
        writer.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn is_header(record: &StringRecord, header: &[&str]) -> bool {
    record.len() >= header.len()
        && header
            .iter()
            .zip(record.iter())
            .all(|(expected, found)| expected.eq_ignore_ascii_case(found))
}

fn field<'r>(record: &'r StringRecord, index: usize) -> &'r str {
    record.get(index).unwrap_or("")
}

fn require_fields(record: &StringRecord, count: usize) -> Result<(), String> {
    if record.len() < count {
        return Err(format!("expected {} columns, found {}", count, record.len()));
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("bad date '{}': {}", value, e))
}

/// Accepts plain decimals and the `1.0E7` form
fn parse_fine(value: &str) -> Result<Decimal, String> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .map_err(|e| format!("bad fine '{}': {}", value, e))
}

/// Whole amounts keep one decimal place (`2000.0`)
fn format_fine(fine: Decimal) -> String {
    let fine = fine.normalize();
    if fine.scale() == 0 {
        format!("{}.0", fine)
    } else {
        fine.to_string()
    }
}

fn parse_book(record: &StringRecord) -> Result<Book, String> {
    require_fields(record, BOOKS_HEADER.len())?;
    let quantity = field(record, 3)
        .parse::<i32>()
        .map_err(|e| format!("bad quantity '{}': {}", field(record, 3), e))?;
    Ok(Book::new(field(record, 0), field(record, 1), field(record, 2), quantity))
}

fn book_row(book: &Book) -> Vec<String> {
    vec![
        book.isbn.clone(),
        book.title.clone(),
        book.author.clone(),
        book.quantity().to_string(),
    ]
}

fn parse_member(record: &StringRecord) -> Result<Member, String> {
    require_fields(record, MEMBERS_HEADER.len())?;
    let major = Some(field(record, 2).to_string());
    Ok(Member::new(
        field(record, 0),
        field(record, 1),
        major,
        field(record, 3),
        field(record, 4),
    ))
}

fn member_row(member: &Member) -> Vec<String> {
    vec![
        member.id.clone(),
        member.full_name.clone(),
        member.major.clone().unwrap_or_default(),
        member.email.clone(),
        member.password.clone(),
    ]
}

fn parse_transaction(record: &StringRecord) -> Result<Transaction, String> {
    require_fields(record, TRANSACTIONS_HEADER.len())?;
    let returned = field(record, 5);
    let actual_return_date = if returned.is_empty() || returned.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(parse_date(returned)?)
    };

    Ok(Transaction {
        transaction_id: field(record, 0).to_string(),
        member_id: field(record, 1).to_string(),
        isbn: field(record, 2).to_string(),
        borrow_date: parse_date(field(record, 3))?,
        due_date: parse_date(field(record, 4))?,
        actual_return_date,
        status: field(record, 6).parse::<TransactionStatus>()?,
        fine: parse_fine(field(record, 7))?,
    })
}

fn transaction_row(t: &Transaction) -> Vec<String> {
    vec![
        t.transaction_id.clone(),
        t.member_id.clone(),
        t.isbn.clone(),
        t.borrow_date.to_string(),
        t.due_date.to_string(),
        t.actual_return_date.map(|d| d.to_string()).unwrap_or_default(),
        t.status.to_string(),
        format_fine(t.fine),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LoanPolicy;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_missing_files_created_with_header() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path().join("data"));

        assert!(persistence.load_books().unwrap().is_empty());
        assert!(persistence.load_members().unwrap().is_empty());
        assert!(persistence.load_transactions().unwrap().is_empty());

        let books = fs::read_to_string(persistence.books_path()).unwrap();
        assert_eq!(books, "ISBN,Title,Author,Quantity\n");
        let members = fs::read_to_string(persistence.members_path()).unwrap();
        assert_eq!(members, "ID,NamaLengkap,Jurusan,Email,Password\n");
        let transactions = fs::read_to_string(persistence.transactions_path()).unwrap();
        assert_eq!(
            transactions,
            "TransactionID,MemberID,ISBN,BorrowDate,DueDate,ActualReturnDate,Status,Fine\n"
        );
    }

    #[test]
    fn test_unreadable_file_is_not_replaced() {
        let dir = TempDir::new().unwrap();
        let storage = CsvPersistence::in_dir(dir.path());
        // A directory where the file should be cannot be read as CSV
        fs::create_dir(storage.books_path()).unwrap();

        assert!(storage.load_books().is_err());
        assert!(storage.books_path().is_dir());
        assert!(!storage.books_path().with_extension("tmp").exists());
    }

    #[test]
    fn test_written_layout() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path());

        let policy = LoanPolicy::default();
        let mut returned = Transaction::new("T-AB12CD34", "M1", "978-1", date(2025, 5, 1), &policy);
        returned.mark_returned(date(2025, 5, 10), &policy);
        let open = Transaction::new("T-0000FFFF", "M2", "978-2", date(2025, 5, 3), &policy);
        persistence.save_transactions(&[returned, open]).unwrap();

        let content = fs::read_to_string(persistence.transactions_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[1], "T-AB12CD34,M1,978-1,2025-05-01,2025-05-08,2025-05-10,Returned,2000.0");
        assert_eq!(lines[2], "T-0000FFFF,M2,978-2,2025-05-03,2025-05-10,,Borrowed,0.0");

        persistence
            .save_members(&[Member::new("M1", "Ani", None, "a@x.com", "pw")])
            .unwrap();
        let content = fs::read_to_string(persistence.members_path()).unwrap();
        assert_eq!(content.lines().nth(1), Some("M1,Ani,,a@x.com,pw"));
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path());
        let policy = LoanPolicy::default();

        let books = vec![
            Book::new("978-1", "Clean Code", "Robert Martin", 3),
            Book::new("978-2", "Refactoring", "Martin Fowler", 0),
        ];
        let members = vec![
            Member::new("M1", "Ani Lestari", Some("Informatika".into()), "ani@x.com", "pw1"),
            Member::new("M2", "Budi", None, "budi@x.com", "pw2"),
        ];
        let mut returned = Transaction::new("T-1", "M1", "978-1", date(2025, 1, 20), &policy);
        returned.mark_returned(date(2025, 2, 3), &policy);
        let transactions = vec![
            returned,
            Transaction::new("T-2", "M2", "978-2", date(2025, 2, 1), &policy),
        ];

        persistence.save_books(&books).unwrap();
        persistence.save_members(&members).unwrap();
        persistence.save_transactions(&transactions).unwrap();

        assert_eq!(persistence.load_books().unwrap(), books);
        assert_eq!(persistence.load_transactions().unwrap(), transactions);

        let loaded = persistence.load_members().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].major.as_deref(), Some("Informatika"));
        assert_eq!(loaded[1].major, None);
        assert_eq!(loaded[1].password, "pw2");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path());
        fs::write(
            persistence.transactions_path(),
            "TransactionID,MemberID,ISBN,BorrowDate,DueDate,ActualReturnDate,Status,Fine\n\
             T-1,M1,978-1,2025-13-01,2025-05-08,,Borrowed,0.0\n\
             T-2,M1,978-1,2025-05-01,2025-05-08,null,Borrowed,0.0\n\
             T-3,M1,978-1,2025-05-01,2025-05-08,,Borrowed,lots\n\
             T-4,M1,978-1\n\
             \n\
             T-5,M2,978-2,2025-05-01,2025-05-08,2025-05-09,returned,1.0E3\n",
        )
        .unwrap();

        let loaded = persistence.load_transactions().unwrap();
        let ids: Vec<&str> = loaded.iter().map(|t| t.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["T-2", "T-5"]);
        assert_eq!(loaded[0].actual_return_date, None);
        assert_eq!(loaded[1].status, TransactionStatus::Returned);
        assert_eq!(loaded[1].fine, Decimal::from(1000));
    }

    #[test]
    fn test_bad_quantity_skipped() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path());
        fs::write(
            persistence.books_path(),
            "ISBN,Title,Author,Quantity\n978-1,A,X,two\n978-2, B , Y ,4\n",
        )
        .unwrap();

        let books = persistence.load_books().unwrap();
        assert_eq!(books, vec![Book::new("978-2", "B", "Y", 4)]);
    }

    #[test]
    fn test_headerless_file_reads_first_line() {
        let dir = TempDir::new().unwrap();
        let persistence = CsvPersistence::in_dir(dir.path());
        fs::write(persistence.members_path(), "M1,Ani,TI,a@x.com,pw\nM2,Budi,,b@x.com,pw\n").unwrap();

        let members = persistence.load_members().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, "M1");
    }
}
