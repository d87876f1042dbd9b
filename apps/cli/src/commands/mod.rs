//! Command-line surface. Each subcommand module owns its clap arguments and
//! a `run` function over the shared [`FinanceQueries`].

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use finboard_core::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use finboard_core::format::parse_date_input;
use finboard_core::models::PageRequest;
use finboard_query::FinanceQueries;

use crate::config::Config;

pub mod bills;
pub mod cards;
pub mod categories;
pub mod export;
pub mod import;
pub mod invoices;
pub mod search;

#[derive(Parser, Debug)]
#[command(
    name = "finboard",
    version,
    about = "Command-line client for the Finboard personal finance API"
)]
pub struct Cli {
    /// API base URL (overrides FINBOARD_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bills
    #[command(subcommand)]
    Bills(bills::BillsCommand),
    /// Categories
    #[command(subcommand)]
    Categories(categories::CategoriesCommand),
    /// Credit cards and their available limits
    #[command(subcommand)]
    Cards(cards::CardsCommand),
    /// Credit card invoices
    #[command(subcommand)]
    Invoices(invoices::InvoicesCommand),
    /// Export data to CSV or xlsx files
    Export(export::ExportArgs),
    /// Import a JSON backup
    Import(import::ImportArgs),
    /// Search bills by name as you type (one search term per line on stdin)
    Search(search::SearchArgs),
}

/// Pagination flags shared by every list command.
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Zero-based page index
    #[arg(long, default_value_t = DEFAULT_PAGE)]
    pub page: u32,
    /// Page size
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    pub size: u32,
    /// Sort as `field,direction` (defaults to the resource's own order)
    #[arg(long)]
    pub sort: Option<String>,
}

impl PageArgs {
    pub fn request(&self) -> PageRequest {
        let request = PageRequest::new(self.page, self.size);
        match &self.sort {
            Some(sort) => request.with_sort(sort.clone()),
            None => request,
        }
    }
}

pub(crate) fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date_input(value)
        .ok_or_else(|| format!("'{}' is not a date (expected yyyy-mm-dd)", value))
}

pub async fn run(command: Command, queries: &FinanceQueries, config: &Config) -> Result<()> {
    match command {
        Command::Bills(cmd) => bills::run(cmd, queries).await,
        Command::Categories(cmd) => categories::run(cmd, queries).await,
        Command::Cards(cmd) => cards::run(cmd, queries).await,
        Command::Invoices(cmd) => invoices::run(cmd, queries).await,
        Command::Export(args) => export::run(args, queries, config).await,
        Command::Import(args) => import::run(args, queries).await,
        Command::Search(args) => search::run(args, queries).await,
    }
}
