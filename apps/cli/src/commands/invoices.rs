use std::collections::HashMap;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use finboard_core::export::ExportRecord;
use finboard_core::format::{format_currency, format_month_reference, parse_currency};
use finboard_core::invoices::{Invoice, InvoiceFilter, InvoicePayment};
use finboard_core::models::{EntityId, YearMonth};
use finboard_query::FinanceQueries;
use rust_decimal::Decimal;
use tracing::warn;

use super::PageArgs;
use crate::render::{print_page, render_table};

#[derive(Subcommand, Debug)]
pub enum InvoicesCommand {
    /// List invoices
    List(InvoicesArgs),
    /// Register a payment against an invoice
    Pay {
        /// Invoice id
        id: EntityId,
        /// Amount paid, e.g. `1.234,56`
        amount: String,
    },
}

#[derive(Args, Debug)]
pub struct InvoicesArgs {
    /// Credit card id
    #[arg(long)]
    pub card: Option<EntityId>,
    /// Reference month (yyyy-mm)
    #[arg(long, value_parser = parse_month_arg)]
    pub month: Option<YearMonth>,
    /// Only paid (true) or unpaid (false) invoices
    #[arg(long)]
    pub paid: Option<bool>,
    #[command(flatten)]
    pub page: PageArgs,
}

fn parse_month_arg(value: &str) -> std::result::Result<YearMonth, String> {
    value.parse::<YearMonth>().map_err(|e| e.to_string())
}

fn invoice_row(invoice: &Invoice, card_name: Option<&str>) -> ExportRecord {
    let card = card_name
        .map(str::to_string)
        .unwrap_or_else(|| format!("#{}", invoice.credit_card_id));
    ExportRecord::new()
        .with("Id", invoice.id)
        .with("Cartão", card)
        .with("Mês", format_month_reference(invoice.reference_month))
        .with("Total", format_currency(invoice.total_amount))
        .with("Saldo anterior", format_currency(invoice.previous_balance))
        .with("Devido", format_currency(invoice.amount_due()))
        .with("Status", invoice.status().label())
}

/// Parses a payment amount typed in the display locale. Zero, negative and
/// unparseable amounts are rejected.
fn parse_amount(text: &str) -> Result<Decimal> {
    let amount = parse_currency(text);
    if amount <= Decimal::ZERO {
        bail!("'{}' is not a valid payment amount", text);
    }
    Ok(amount)
}

/// Card names for the invoices on screen, `None` for cards that failed to
/// load. Each card is requested at most once.
async fn card_names(
    queries: &FinanceQueries,
    invoices: &[Invoice],
) -> HashMap<EntityId, Option<String>> {
    let mut names = HashMap::new();
    for invoice in invoices {
        let id = invoice.credit_card_id;
        if names.contains_key(&id) {
            continue;
        }
        let name = match queries.credit_cards.get(id).await {
            Ok(card) => Some(card.name.clone()),
            Err(e) => {
                warn!("Could not load card {}: {}", id, e);
                None
            }
        };
        names.insert(id, name);
    }
    names
}

pub async fn run(command: InvoicesCommand, queries: &FinanceQueries) -> Result<()> {
    match command {
        InvoicesCommand::List(args) => {
            let filter = InvoiceFilter {
                credit_card_id: args.card,
                reference_month: args.month,
                paid: args.paid,
                page: args.page.request(),
            };
            let page = queries
                .invoices
                .list(&filter)
                .await
                .context("failed to list invoices")?;
            let names = card_names(queries, &page.content).await;
            let rows: Vec<ExportRecord> = page
                .content
                .iter()
                .map(|invoice| {
                    let name = names.get(&invoice.credit_card_id).and_then(Option::as_deref);
                    invoice_row(invoice, name)
                })
                .collect();
            print_page(&*page, &rows, "Nenhuma fatura encontrada.");
        }
        InvoicesCommand::Pay { id, amount } => {
            let payment = InvoicePayment::new(parse_amount(&amount)?);
            let invoice = queries
                .invoices
                .get(id)
                .await
                .with_context(|| format!("failed to load invoice {}", id))?;
            let card = queries
                .credit_cards
                .get(invoice.credit_card_id)
                .await
                .with_context(|| format!("failed to load card {}", invoice.credit_card_id))?;
            payment.validate_for(&invoice, &card)?;

            let updated = queries
                .invoices
                .pay(id, &payment)
                .await
                .with_context(|| format!("failed to pay invoice {}", id))?;
            println!("Pagamento de {} registrado.", format_currency(payment.amount));
            print!("{}", render_table(&[invoice_row(&updated, Some(card.name.as_str()))]));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amount_uses_display_locale() {
        assert_eq!(parse_amount("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("R$ 10").unwrap(), dec!(10));
        assert!(parse_amount("0,00").is_err());
        assert!(parse_amount("dez reais").is_err());
        assert!(parse_amount("-5").is_err());
    }

    #[test]
    fn test_row_falls_back_to_card_id() {
        let invoice = Invoice {
            id: 4,
            credit_card_id: 9,
            reference_month: YearMonth::new(2024, 2).unwrap(),
            total_amount: dec!(800),
            previous_balance: dec!(50.5),
            paid: false,
            closed: true,
        };
        let row = invoice_row(&invoice, None);
        assert_eq!(row.get("Cartão").unwrap().to_text(), "#9");
        assert_eq!(row.get("Mês").unwrap().to_text(), "02/2024");
        assert_eq!(row.get("Devido").unwrap().to_text(), "R$\u{a0}850,50");
        assert_eq!(row.get("Status").unwrap().to_text(), "Fechada");
    }

    #[tokio::test]
    async fn test_failed_card_is_requested_once() {
        use std::sync::Arc;

        use finboard_api::mock::MockTransport;
        use finboard_api::{ApiClient, ApiConfig};
        use finboard_query::{CacheConfig, QueryCache};

        let mock = MockTransport::new();
        let client = ApiClient::with_transport(ApiConfig::default(), Arc::new(mock.clone()));
        let queries = FinanceQueries::new(client, QueryCache::new(CacheConfig::default()));
        let invoice = |id| Invoice {
            id,
            credit_card_id: 9,
            reference_month: YearMonth::new(2024, 2).unwrap(),
            total_amount: dec!(100),
            previous_balance: dec!(0),
            paid: false,
            closed: false,
        };

        let names = card_names(&queries, &[invoice(1), invoice(2), invoice(3)]).await;

        assert_eq!(mock.count_for("GET", "/credit-cards/9"), 1);
        assert_eq!(names.get(&9), Some(&None));
    }

    #[test]
    fn test_month_argument() {
        assert_eq!(parse_month_arg("2024-03"), Ok(YearMonth::new(2024, 3).unwrap()));
        assert!(parse_month_arg("2024-13").is_err());
    }
}
