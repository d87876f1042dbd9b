use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use finboard_core::export::formatters::{
    bill_records, category_records, credit_card_records, invoice_records, unified_sheets,
};
use finboard_core::export::{
    export_records, export_workbook, DirectorySink, ExportFormat, ExportOptions, ExportRecord,
};
use finboard_core::unified::UnifiedExport;
use finboard_query::FinanceQueries;
use tracing::info;

use crate::config::Config;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    All,
    Bills,
    Categories,
    Cards,
    Invoices,
}

impl Dataset {
    const SINGLE: [Dataset; 4] = [
        Dataset::Categories,
        Dataset::Cards,
        Dataset::Bills,
        Dataset::Invoices,
    ];

    /// Base file name used when `--name` is not given.
    fn file_stem(&self) -> &'static str {
        match self {
            Dataset::All => "finboard",
            Dataset::Bills => "contas",
            Dataset::Categories => "categorias",
            Dataset::Cards => "cartoes",
            Dataset::Invoices => "faturas",
        }
    }
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Dataset to export
    #[arg(long, value_enum, default_value_t = Dataset::All)]
    pub dataset: Dataset,
    /// Output format: csv or xlsx
    #[arg(long, default_value = "xlsx")]
    pub format: ExportFormat,
    /// Output directory (defaults to FINBOARD_EXPORT_DIR)
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Base file name; the date and extension are appended
    #[arg(long)]
    pub name: Option<String>,
}

fn records_for(dataset: Dataset, data: &UnifiedExport) -> Vec<ExportRecord> {
    match dataset {
        Dataset::Bills => bill_records(&data.bills),
        Dataset::Categories => category_records(&data.categories),
        Dataset::Cards => credit_card_records(&data.credit_cards),
        Dataset::Invoices => invoice_records(&data.invoices, &data.credit_cards),
        Dataset::All => Vec::new(),
    }
}

/// Writes the requested files and returns the names of those written.
///
/// A workbook of every dataset holds one sheet each; as CSV every dataset
/// goes to its own file.
pub fn write_export(
    args: &ExportArgs,
    data: &UnifiedExport,
    sink: &DirectorySink,
) -> Vec<String> {
    let base = args
        .name
        .clone()
        .unwrap_or_else(|| args.dataset.file_stem().to_string());

    let mut written = Vec::new();
    match (args.dataset, args.format) {
        (Dataset::All, ExportFormat::Workbook) => {
            let options = ExportOptions::new(base, ExportFormat::Workbook);
            if export_workbook(&unified_sheets(data), &options, sink) {
                written.push(options.file_name());
            }
        }
        (Dataset::All, ExportFormat::Csv) => {
            for dataset in Dataset::SINGLE {
                let options = ExportOptions::new(
                    format!("{}_{}", base, dataset.file_stem()),
                    ExportFormat::Csv,
                );
                if export_records(&records_for(dataset, data), &options, sink) {
                    written.push(options.file_name());
                }
            }
        }
        (dataset, format) => {
            let options = ExportOptions::new(base, format);
            if export_records(&records_for(dataset, data), &options, sink) {
                written.push(options.file_name());
            }
        }
    }
    written
}

pub async fn run(args: ExportArgs, queries: &FinanceQueries, config: &Config) -> Result<()> {
    let data = queries
        .export_data()
        .await
        .context("failed to download data for export")?;
    let dir = args.out.clone().unwrap_or_else(|| config.export_dir.clone());
    let sink = DirectorySink::new(&dir);

    let written = write_export(&args, &data, &sink);
    if written.is_empty() {
        bail!("nothing was exported to {}", dir.display());
    }
    for file_name in &written {
        info!("Wrote {}", sink.path_for(file_name).display());
        println!("{}", sink.path_for(file_name).display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finboard_core::categories::Category;
    use finboard_core::credit_cards::CreditCard;
    use rust_decimal_macros::dec;

    fn data() -> UnifiedExport {
        UnifiedExport {
            categories: vec![Category {
                id: 1,
                name: "Casa".to_string(),
                description: None,
                color: Some("#00ff00".to_string()),
            }],
            credit_cards: vec![CreditCard {
                id: 2,
                name: "Nubank".to_string(),
                credit_limit: dec!(5000),
                closing_day: 3,
                due_day: 10,
                allows_partial_payment: true,
            }],
            ..Default::default()
        }
    }

    fn args(dataset: Dataset, format: ExportFormat) -> ExportArgs {
        ExportArgs {
            dataset,
            format,
            out: None,
            name: None,
        }
    }

    fn today() -> String {
        chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
    }

    #[test]
    fn test_csv_of_everything_skips_empty_datasets() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());

        let written = write_export(&args(Dataset::All, ExportFormat::Csv), &data(), &sink);

        assert_eq!(
            written,
            vec![
                format!("finboard_categorias_{}.csv", today()),
                format!("finboard_cartoes_{}.csv", today()),
            ]
        );
        let csv = std::fs::read_to_string(sink.path_for(&written[0])).unwrap();
        assert!(csv.starts_with("Nome,Descrição,Cor"));
    }

    #[test]
    fn test_single_dataset_with_custom_name() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path());
        let mut export = args(Dataset::Cards, ExportFormat::Workbook);
        export.name = Some("meus_cartoes".to_string());

        let written = write_export(&export, &data(), &sink);

        assert_eq!(written, vec![format!("meus_cartoes_{}.xlsx", today())]);
        assert!(sink.path_for(&written[0]).exists());
    }

    #[test]
    fn test_empty_dataset_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("out"));

        let written = write_export(&args(Dataset::Bills, ExportFormat::Csv), &data(), &sink);

        assert!(written.is_empty());
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_dataset_names() {
        assert_eq!(Dataset::from_str("cards", true), Ok(Dataset::Cards));
        assert!(Dataset::from_str("accounts", true).is_err());
    }
}
