//! Command-line front end over [`Library`]
//!
//! Every command prints either a short text rendering or, with `--json`, the
//! serialized result. Rejected requests print the error on stderr and exit
//! with the matching [`ErrorCode`](crate::error::ErrorCode).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::{
    error::AppError,
    models::{Book, LoanDetails, Member, MonthlyStat, Transaction},
    services::Library,
};

#[derive(Parser)]
#[command(name = "library-manager")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage books, members and loans of a small library")]
pub struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Directory holding books.csv, members.csv and transactions.csv
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Book catalog
    Books {
        #[command(subcommand)]
        action: BookCommand,
    },
    /// Member registry
    Members {
        #[command(subcommand)]
        action: MemberCommand,
    },
    /// Lend a book to a member
    Borrow { member_id: String, isbn: String },
    /// Return a borrowed book
    Return { transaction_id: String },
    /// Loan ledger queries
    Loans {
        #[command(subcommand)]
        action: LoanCommand,
    },
    /// Fine owed on a loan if returned today
    Fine { transaction_id: String },
    /// Monthly borrow, return and fine statistics
    Stats {
        /// Headline counts instead of the monthly table
        #[arg(long)]
        summary: bool,
    },
    /// Check credentials
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum BookCommand {
    List,
    Show {
        isbn: String,
    },
    Add {
        isbn: String,
        title: String,
        author: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i32,
    },
    /// Change the given fields, keep the others
    Update {
        isbn: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        quantity: Option<i32>,
    },
    Delete {
        isbn: String,
    },
}

#[derive(Subcommand)]
pub enum MemberCommand {
    List,
    Show {
        id: String,
    },
    Add {
        id: String,
        full_name: String,
        email: String,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        password: String,
    },
    /// Change the given fields, keep the others
    Update {
        id: String,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
pub enum LoanCommand {
    /// Loans not yet returned
    Open,
    /// Loans of one member, most recent first
    Member { member_id: String },
    /// The whole ledger
    All,
    /// Open loans with names, titles and fines due
    Report,
}

/// Run one command. Library rejections become a non-zero exit code, other
/// failures are returned.
pub fn run(library: &mut Library, command: Command, json: bool) -> anyhow::Result<ExitCode> {
    match execute(library, command, json) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => match err.downcast_ref::<AppError>() {
            Some(app_err) => {
                eprintln!("error: {}", app_err);
                Ok(ExitCode::from(app_err.code() as u8))
            }
            None => Err(err),
        },
    }
}

fn execute(library: &mut Library, command: Command, json: bool) -> anyhow::Result<()> {
    match command {
        Command::Books { action } => books(library, action, json),
        Command::Members { action } => members(library, action, json),
        Command::Borrow { member_id, isbn } => {
            let loan = library.loans().borrow_book(&member_id, &isbn)?;
            emit(json, &loan, |t| {
                format!(
                    "Borrowed: {} ({} -> {}), due {}",
                    t.transaction_id, t.isbn, t.member_id, t.due_date
                )
            })
        }
        Command::Return { transaction_id } => {
            let loan = library.loans().return_book(&transaction_id)?;
            emit(json, &loan, |t| {
                format!("Returned: {} (fine {})", t.transaction_id, t.fine)
            })
        }
        Command::Loans { action } => loans(library, action, json),
        Command::Fine { transaction_id } => {
            let fine = library.loans().preview_fine(&transaction_id)?;
            emit(json, &fine, |f| format!("Fine due: {}", f))
        }
        Command::Stats { summary: true } => {
            let summary = library.stats().summary();
            emit(json, &summary, |s| {
                format!(
                    "Titles: {}\nCopies on shelf: {}\nMembers: {}\nTransactions: {}\nOpen loans: {}\nOverdue loans: {}",
                    s.total_titles,
                    s.copies_on_shelf,
                    s.total_members,
                    s.total_transactions,
                    s.open_loans,
                    s.overdue_loans
                )
            })
        }
        Command::Stats { summary: false } => {
            let stats = library.stats().monthly_statistics();
            emit(json, &stats, |rows| lines(rows, stat_line))
        }
        Command::Login { username, password } => {
            let session = library.auth().login(&username, &password)?;
            emit(json, &session, |s| {
                format!("Logged in as {} ({:?})", s.display_name, s.role)
            })
        }
    }
}

fn books(library: &mut Library, action: BookCommand, json: bool) -> anyhow::Result<()> {
    match action {
        BookCommand::List => {
            let books = library.catalog().list_books();
            emit(json, &books, |rows| lines(rows, book_line))
        }
        BookCommand::Show { isbn } => {
            let book = library
                .catalog()
                .find_by_isbn(&isbn)
                .ok_or(AppError::NoSuchBook(isbn))?;
            emit(json, &book, book_line)
        }
        BookCommand::Add {
            isbn,
            title,
            author,
            quantity,
        } => {
            let book = Book::new(isbn, title, author, quantity);
            library.catalog().add_book(book.clone())?;
            emit(json, &book, |b| format!("Added: {}", book_line(b)))
        }
        BookCommand::Update {
            isbn,
            title,
            author,
            quantity,
        } => {
            let current = library
                .catalog()
                .find_by_isbn(&isbn)
                .ok_or(AppError::NoSuchBook(isbn))?;
            let quantity = quantity.unwrap_or(current.quantity());
            let changed = Book::new(
                current.isbn,
                title.unwrap_or(current.title),
                author.unwrap_or(current.author),
                quantity,
            );
            library.catalog().update_book(&changed)?;
            let stored = library.catalog().find_by_isbn(&changed.isbn).unwrap_or(changed);
            emit(json, &stored, |b| format!("Updated: {}", book_line(b)))
        }
        BookCommand::Delete { isbn } => {
            let removed = library.catalog().delete_book(&isbn)?;
            emit(json, &removed, |b| format!("Deleted: {}", book_line(b)))
        }
    }
}

fn members(library: &mut Library, action: MemberCommand, json: bool) -> anyhow::Result<()> {
    match action {
        MemberCommand::List => {
            let members = library.members().list_members();
            emit(json, &members, |rows| lines(rows, member_line))
        }
        MemberCommand::Show { id } => {
            let member = library
                .members()
                .find_by_id(&id)
                .ok_or(AppError::NoSuchMember(id))?;
            emit(json, &member, member_line)
        }
        MemberCommand::Add {
            id,
            full_name,
            email,
            major,
            password,
        } => {
            let member = Member::new(id, full_name, major, email, password);
            library.members().add_member(member.clone())?;
            emit(json, &member, |m| format!("Added: {}", member_line(m)))
        }
        MemberCommand::Update {
            id,
            full_name,
            major,
            email,
            password,
        } => {
            let current = library
                .members()
                .find_by_id(&id)
                .ok_or(AppError::NoSuchMember(id))?;
            // An empty password leaves the stored one in place
            let changed = Member::new(
                current.id,
                full_name.unwrap_or(current.full_name),
                major.or(current.major),
                email.unwrap_or(current.email),
                password.unwrap_or_default(),
            );
            library.members().update_member(&changed)?;
            let stored = library.members().find_by_id(&changed.id).unwrap_or(changed);
            emit(json, &stored, |m| format!("Updated: {}", member_line(m)))
        }
        MemberCommand::Delete { id } => {
            let removed = library.members().delete_member(&id)?;
            emit(json, &removed, |m| format!("Deleted: {}", member_line(m)))
        }
    }
}

fn loans(library: &mut Library, action: LoanCommand, json: bool) -> anyhow::Result<()> {
    let today = library.today();
    match action {
        LoanCommand::Open => {
            let open = library.loans().open_loans();
            emit(json, &open, |rows| {
                lines(rows, |t| transaction_line(t, &t.effective_status(today).to_string()))
            })
        }
        LoanCommand::All => {
            let all = library.loans().all_transactions();
            emit(json, &all, |rows| {
                lines(rows, |t| transaction_line(t, &t.effective_status(today).to_string()))
            })
        }
        LoanCommand::Member { member_id } => {
            let details = library.loans().member_loan_details(&member_id);
            emit(json, &details, |rows| lines(rows, details_line))
        }
        LoanCommand::Report => {
            let report = library.loans().borrowed_books_report();
            emit(json, &report, |rows| lines(rows, details_line))
        }
    }
}

fn emit<T: Serialize + ?Sized>(
    json: bool,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", text(value));
    }
    Ok(())
}

fn lines<T>(rows: &[T], line: impl Fn(&T) -> String) -> String {
    if rows.is_empty() {
        return "(none)".to_string();
    }
    rows.iter().map(line).collect::<Vec<_>>().join("\n")
}

fn book_line(book: &Book) -> String {
    format!(
        "{}  {} by {}  [{} in stock]",
        book.isbn,
        book.title,
        book.author,
        book.quantity()
    )
}

fn member_line(member: &Member) -> String {
    format!(
        "{}  {} <{}>  {}",
        member.id,
        member.full_name,
        member.email,
        member.major.as_deref().unwrap_or("-")
    )
}

fn transaction_line(t: &Transaction, status: &str) -> String {
    let returned = t
        .actual_return_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {} -> {}  borrowed {}  due {}  returned {}  {}  fine {}",
        t.transaction_id, t.isbn, t.member_id, t.borrow_date, t.due_date, returned, status, t.fine
    )
}

fn details_line(d: &LoanDetails) -> String {
    format!(
        "{}  \"{}\" -> {}  due {}  {}  fine due {}",
        d.transaction.transaction_id,
        d.book_title.as_deref().unwrap_or(&d.transaction.isbn),
        d.member_name.as_deref().unwrap_or(&d.transaction.member_id),
        d.transaction.due_date,
        d.current_status,
        d.fine_due
    )
}

fn stat_line(stat: &MonthlyStat) -> String {
    format!(
        "{:<16} borrows {:>4}  returns {:>4}  fines {}",
        stat.month_year.label(),
        stat.total_borrows,
        stat.total_returns,
        stat.total_fines
    )
}
