use anyhow::Context;
use colored::Colorize;
use libris_sdk::{
    Book, CheckoutReceipt, Library, LibraryConfig, LibraryStatus, ListMode, SdkError, User,
};
use serde::Serialize;
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let mut library = Library::open(config.clone())
        .with_context(|| format!("cannot open storage at {}", config.storage_dir.display()))?;
    let out = Output {
        format: cli.format,
        verbose: cli.verbose,
    };

    match cli.command {
        Command::AddBook(args) => cmd_add_book(&mut library, &out, args)?,
        Command::Books(args) => cmd_books(&library, &out, args)?,
        Command::AddUser(args) => cmd_add_user(&mut library, &out, args)?,
        Command::Users(args) => cmd_users(&library, &out, args)?,
        Command::Checkout(args) => cmd_checkout(&mut library, &out, args)?,
        Command::Status => cmd_status(&library, &out, &config)?,
    }

    // A one-shot run must not lose records added with autosave off.
    library.save()?;
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<LibraryConfig> {
    let config = LibraryConfig::load(cli.config.as_deref())?;
    Ok(match &cli.data_dir {
        Some(dir) => config.with_storage_dir(dir),
        None => config,
    })
}

/// Print a failed run to stderr, with a corrective hint where one exists.
pub fn report(err: &anyhow::Error) {
    eprintln!("{} {err:#}", "error:".red().bold());
    if let Some(sdk) = err.downcast_ref::<SdkError>() {
        if let Some(example) = sdk.example() {
            eprintln!("  example of a valid ISBN: {}", example.green());
        }
        if !sdk.is_recoverable() {
            eprintln!("  {}", "storage failure; check the data directory".yellow());
        }
    }
}

struct Output {
    format: OutputFormat,
    verbose: bool,
}

impl Output {
    fn json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> anyhow::Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

fn mode(all: bool) -> Option<ListMode> {
    all.then_some(ListMode::Union)
}

fn cmd_add_book(library: &mut Library, out: &Output, args: AddBookArgs) -> anyhow::Result<()> {
    let book = library.add_book(&args.title, &args.author, &args.isbn)?;
    if out.json() {
        return out.print_json(&book);
    }
    println!("{} Added book {}", "✓".green().bold(), book.to_string().bold());
    Ok(())
}

fn cmd_books(library: &Library, out: &Output, args: ListArgs) -> anyhow::Result<()> {
    let books = match mode(args.all) {
        Some(mode) => library.list_books_with(mode)?,
        None => library.list_books()?,
    };
    if out.json() {
        return out.print_json(&books);
    }
    if books.is_empty() {
        println!("No books.");
    }
    for book in &books {
        println!("  {}  {}", book, availability(book));
    }
    Ok(())
}

fn availability(book: &Book) -> colored::ColoredString {
    if book.is_available() {
        "available".green()
    } else {
        "checked out".yellow()
    }
}

fn cmd_add_user(library: &mut Library, out: &Output, args: AddUserArgs) -> anyhow::Result<()> {
    let user = library.add_user(&args.name, &args.id)?;
    if out.json() {
        return out.print_json(&user);
    }
    println!("{} Added user {}", "✓".green().bold(), user.to_string().bold());
    Ok(())
}

fn cmd_users(library: &Library, out: &Output, args: ListArgs) -> anyhow::Result<()> {
    let users = match mode(args.all) {
        Some(mode) => library.list_users_with(mode)?,
        None => library.list_users()?,
    };
    if out.json() {
        return out.print_json(&users);
    }
    if users.is_empty() {
        println!("No users.");
    }
    for user in &users {
        println!("  {}{}", user, holdings(user));
    }
    Ok(())
}

fn holdings(user: &User) -> String {
    if user.held_books().is_empty() {
        String::new()
    } else {
        format!("  holds {}", user.held_books().join(", ").cyan())
    }
}

fn cmd_checkout(library: &mut Library, out: &Output, args: CheckoutArgs) -> anyhow::Result<()> {
    let receipt = library.checkout(&args.user_id, &args.isbn)?;
    if out.json() {
        return out.print_json(&receipt_json(&receipt));
    }
    println!(
        "{} Checked out {} to {}",
        "✓".green().bold(),
        receipt.book.title().bold(),
        receipt.user.name().bold()
    );
    println!("  ISBN: {}", receipt.book.isbn().yellow());
    println!("  User ID: {}", receipt.user.id());
    if out.verbose {
        for stage in &receipt.stage_results {
            println!(
                "  {} {:<12} {:?}",
                "✓".green(),
                stage.stage_name,
                stage.elapsed
            );
        }
    }
    Ok(())
}

fn receipt_json(receipt: &CheckoutReceipt) -> serde_json::Value {
    let stages: Vec<_> = receipt
        .stage_results
        .iter()
        .map(|stage| {
            json!({
                "stage": stage.stage_name,
                "passed": stage.passed,
                "elapsed_us": stage.elapsed.as_micros() as u64,
            })
        })
        .collect();
    json!({
        "book": receipt.book,
        "user": receipt.user,
        "checkout": receipt.checkout,
        "stages": stages,
    })
}

fn cmd_status(library: &Library, out: &Output, config: &LibraryConfig) -> anyhow::Result<()> {
    let status = library.status()?;
    if out.json() {
        return out.print_json(&json!({
            "storage_dir": config.storage_dir,
            "status": status,
        }));
    }
    print_status(&status, config);
    Ok(())
}

fn print_status(status: &LibraryStatus, config: &LibraryConfig) {
    println!("Storage: {}", config.storage_dir.display().to_string().bold());
    println!(
        "Books: {} ({} available)",
        status.books.to_string().bold(),
        status.books_available.to_string().green()
    );
    println!("Users: {}", status.users.to_string().bold());
    let unsaved = status.unsaved_books + status.unsaved_users;
    if unsaved > 0 {
        println!("Unsaved records: {}", unsaved.to_string().yellow());
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use clap::Parser;
    use libris_sdk::ErrorKind;

    use super::*;

    fn run(dir: &Path, args: &[&str]) -> anyhow::Result<()> {
        let data_dir = dir.to_string_lossy().into_owned();
        let mut argv = vec!["libris", "--data-dir", data_dir.as_str()];
        argv.extend_from_slice(args);
        run_command(Cli::try_parse_from(argv)?)
    }

    fn sdk_kind(err: &anyhow::Error) -> Option<ErrorKind> {
        err.downcast_ref::<SdkError>().map(SdkError::kind)
    }

    #[test]
    fn checkout_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["add-user", "Alice", "1"]).unwrap();
        run(dir.path(), &["add-book", "T", "A", "978-0-123456-78-9"]).unwrap();
        run(dir.path(), &["checkout", "01", "978-0-123456-78-9"]).unwrap();

        let err = run(dir.path(), &["checkout", "1", "978-0-123456-78-9"]).unwrap_err();
        assert_eq!(sdk_kind(&err), Some(ErrorKind::AlreadyCheckedOut));

        let books = std::fs::read_to_string(dir.path().join("books.csv")).unwrap();
        assert!(books.contains(",No,"));
    }

    #[test]
    fn invalid_isbn_surfaces_example() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(dir.path(), &["add-book", "T", "A", "invalid_isbn"]).unwrap_err();
        let sdk = err.downcast_ref::<SdkError>().unwrap();
        assert_eq!(sdk.example(), Some("978-0-123456-78-9"));
    }

    #[test]
    fn duplicate_user_across_invocations() {
        let dir = tempfile::tempdir().unwrap();
        run(dir.path(), &["add-user", "Alice", "1"]).unwrap();
        let err = run(dir.path(), &["add-user", "Bob", "001"]).unwrap_err();
        assert_eq!(sdk_kind(&err), Some(ErrorKind::DuplicateKey));
        run(dir.path(), &["--format", "json", "users", "--all"]).unwrap();
        run(dir.path(), &["status"]).unwrap();
    }

    #[test]
    fn data_dir_overrides_config() {
        let cli = Cli::try_parse_from(["libris", "--data-dir", "elsewhere", "status"]).unwrap();
        let config = load_config(&cli).unwrap();
        assert_eq!(config.storage_dir, Path::new("elsewhere"));
    }
}
