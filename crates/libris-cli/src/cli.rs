use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "libris",
    about = "Libris: a small library catalog with checkout",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ./libris.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding books.csv and users.csv; overrides all config
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Add a book to the catalog
    AddBook(AddBookArgs),
    /// List books
    Books(ListArgs),
    /// Register a user
    AddUser(AddUserArgs),
    /// List users
    Users(ListArgs),
    /// Lend a book to a user
    Checkout(CheckoutArgs),
    /// Show catalog counts
    Status,
}

#[derive(Args)]
pub struct AddBookArgs {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

#[derive(Args)]
pub struct AddUserArgs {
    pub name: String,
    pub id: String,
}

#[derive(Args)]
pub struct ListArgs {
    /// Show every in-memory and stored row, duplicates included
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct CheckoutArgs {
    pub user_id: String,
    pub isbn: String,
}
