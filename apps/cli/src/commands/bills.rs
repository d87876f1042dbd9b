use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use finboard_core::bills::{Bill, BillFilter};
use finboard_core::export::ExportRecord;
use finboard_core::format::{format_currency, format_date};
use finboard_core::models::EntityId;
use finboard_query::FinanceQueries;

use super::{parse_date_arg, PageArgs};
use crate::render::{print_page, render_table};

#[derive(Subcommand, Debug)]
pub enum BillsCommand {
    /// List bills
    List(BillsArgs),
    /// Show one bill with its installment schedule
    Show {
        /// Bill id
        id: EntityId,
    },
}

#[derive(Args, Debug)]
pub struct BillsArgs {
    /// Name contains
    #[arg(long)]
    pub name: Option<String>,
    /// Category id
    #[arg(long)]
    pub category: Option<EntityId>,
    /// Credit card id
    #[arg(long)]
    pub card: Option<EntityId>,
    /// Earliest execution date (yyyy-mm-dd)
    #[arg(long, value_parser = parse_date_arg)]
    pub from: Option<NaiveDate>,
    /// Latest execution date (yyyy-mm-dd)
    #[arg(long, value_parser = parse_date_arg)]
    pub to: Option<NaiveDate>,
    #[command(flatten)]
    pub page: PageArgs,
}

impl BillsArgs {
    pub fn filter(&self) -> BillFilter {
        let mut filter = BillFilter::default().with_page(self.page.request());
        if let Some(name) = &self.name {
            filter = filter.with_name(name.clone());
        }
        filter.category_id = self.category;
        filter.credit_card_id = self.card;
        filter.start_date = self.from;
        filter.end_date = self.to;
        filter
    }
}

pub(crate) fn bill_row(bill: &Bill) -> ExportRecord {
    let installments = if bill.is_installment_purchase() {
        format!(
            "{}x {}",
            bill.number_of_installments,
            format_currency(bill.installment_amount())
        )
    } else {
        "à vista".to_string()
    };
    ExportRecord::new()
        .with("Id", bill.id)
        .with("Nome", bill.name.as_str())
        .with("Data", format_date(bill.execution_date))
        .with("Valor", format_currency(bill.total_amount))
        .with("Parcelas", installments)
        .with("Categoria", bill.category_name())
        .with("Cartão", bill.credit_card_name())
}

pub(crate) fn bill_rows(bills: &[Bill]) -> Vec<ExportRecord> {
    bills.iter().map(bill_row).collect()
}

fn schedule_rows(bill: &Bill) -> Vec<ExportRecord> {
    bill.installment_schedule()
        .into_iter()
        .enumerate()
        .map(|(i, amount)| {
            ExportRecord::new()
                .with("Parcela", format!("{}/{}", i + 1, bill.number_of_installments.max(1)))
                .with("Valor", format_currency(amount))
        })
        .collect()
}

pub async fn run(command: BillsCommand, queries: &FinanceQueries) -> Result<()> {
    match command {
        BillsCommand::List(args) => {
            let page = queries
                .bills
                .list(&args.filter())
                .await
                .context("failed to list bills")?;
            print_page(&*page, &bill_rows(&page.content), "Nenhuma conta encontrada.");
        }
        BillsCommand::Show { id } => {
            let bill = queries
                .bills
                .get(id)
                .await
                .with_context(|| format!("failed to load bill {}", id))?;
            print!("{}", render_table(&[bill_row(&bill)]));
            if let Some(description) = bill.description.as_deref().filter(|d| !d.is_empty()) {
                println!("\n{}", description);
            }
            println!();
            print!("{}", render_table(&schedule_rows(&bill)));
        }
    }
    Ok(())
}
