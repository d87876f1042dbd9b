use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use finboard_core::categories::{Category, CategoryFilter};
use finboard_core::export::ExportRecord;
use finboard_query::FinanceQueries;

use super::PageArgs;
use crate::render::print_page;

#[derive(Subcommand, Debug)]
pub enum CategoriesCommand {
    /// List categories
    List(CategoriesArgs),
}

#[derive(Args, Debug)]
pub struct CategoriesArgs {
    /// Name contains
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub page: PageArgs,
}

fn category_row(category: &Category) -> ExportRecord {
    ExportRecord::new()
        .with("Id", category.id)
        .with("Nome", category.name.as_str())
        .with("Descrição", category.description.as_deref())
        .with("Cor", category.color.as_deref())
}

pub async fn run(command: CategoriesCommand, queries: &FinanceQueries) -> Result<()> {
    match command {
        CategoriesCommand::List(args) => {
            let filter = CategoryFilter {
                name: args.name.filter(|n| !n.trim().is_empty()),
                page: args.page.request(),
            };
            let page = queries
                .categories
                .list(&filter)
                .await
                .context("failed to list categories")?;
            let rows: Vec<ExportRecord> = page.content.iter().map(category_row).collect();
            print_page(&*page, &rows, "Nenhuma categoria encontrada.");
        }
    }
    Ok(())
}
