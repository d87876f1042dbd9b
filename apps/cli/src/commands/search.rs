use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use finboard_core::bills::BillFilter;
use finboard_core::debounce::DebouncedValue;
use finboard_query::{BillQueries, FinanceQueries};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, warn};

use super::bills::bill_rows;
use crate::render::render_table;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Milliseconds of quiet before a search is sent
    #[arg(long, default_value_t = 400)]
    pub delay_ms: u64,
    /// Results per search
    #[arg(long, default_value_t = 10)]
    pub size: u32,
}

/// Runs one search per settled term until the term channel closes.
async fn search_loop(mut terms: watch::Receiver<String>, bills: BillQueries, size: u32) {
    while terms.changed().await.is_ok() {
        let term = terms.borrow_and_update().clone();
        let mut filter = BillFilter::default().with_name(term.clone());
        filter.page.size = size;
        debug!("Searching bills for '{}'", term);

        match bills.list(&filter).await {
            Ok(page) if page.is_empty() => println!("'{}': nenhuma conta encontrada.", term),
            Ok(page) => {
                println!("'{}': {} resultado(s)", term, page.total_elements);
                print!("{}", render_table(&bill_rows(&page.content)));
            }
            Err(e) => warn!("Search for '{}' failed: {}", term, e),
        }
    }
}

pub async fn run(args: SearchArgs, queries: &FinanceQueries) -> Result<()> {
    let delay = Duration::from_millis(args.delay_ms);
    let term = DebouncedValue::new(String::new(), delay);
    let searcher = tokio::spawn(search_loop(term.subscribe(), queries.bills.clone(), args.size));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        term.set(line.trim().to_string());
    }

    // Let the last term settle before closing the channel.
    while term.is_pending() {
        tokio::time::sleep(delay).await;
    }
    drop(term);
    searcher.await.context("search task failed")?;
    Ok(())
}
