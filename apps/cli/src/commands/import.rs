use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use finboard_core::export::ExportRecord;
use finboard_core::unified::{DuplicateStrategy, ImportCounts, ImportResult};
use finboard_query::FinanceQueries;

use crate::render::render_table;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// JSON backup produced by the unified export
    pub file: PathBuf,
    /// What to do with records that already exist: skip or create-duplicate
    #[arg(long, default_value = "skip")]
    pub strategy: DuplicateStrategy,
}

fn counts_row(entity: &str, counts: &ImportCounts) -> ExportRecord {
    ExportRecord::new()
        .with("Tipo", entity)
        .with("Processados", counts.processed)
        .with("Criados", counts.created)
        .with("Ignorados", counts.skipped)
        .with("Erros", counts.errors)
}

pub(crate) fn summary_rows(result: &ImportResult) -> Vec<ExportRecord> {
    vec![
        counts_row("Categorias", &result.categories),
        counts_row("Cartões", &result.credit_cards),
        counts_row("Contas", &result.bills),
        counts_row("Faturas", &result.invoices),
    ]
}

pub async fn run(args: ImportArgs, queries: &FinanceQueries) -> Result<()> {
    let bytes = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "import.json".to_string());

    let result = queries
        .import_data(&file_name, bytes, args.strategy)
        .await
        .with_context(|| format!("failed to import {}", args.file.display()))?;

    print!("{}", render_table(&summary_rows(&result)));
    for message in &result.messages {
        println!("- {}", message);
    }
    if !result.has_changes() {
        println!("Nenhum registro novo foi criado.");
    }
    Ok(())
}
