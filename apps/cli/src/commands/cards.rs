use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use finboard_core::credit_cards::{AvailableLimit, CreditCard, CreditCardFilter};
use finboard_core::export::ExportRecord;
use finboard_core::format::format_currency;
use finboard_core::models::EntityId;
use finboard_query::FinanceQueries;
use tracing::warn;

use super::PageArgs;
use crate::render::{print_page, render_table};

#[derive(Subcommand, Debug)]
pub enum CardsCommand {
    /// List credit cards
    List(CardsArgs),
    /// Show the available limit of one card
    Limit {
        /// Credit card id
        id: EntityId,
    },
}

#[derive(Args, Debug)]
pub struct CardsArgs {
    /// Name contains
    #[arg(long)]
    pub name: Option<String>,
    /// Also fetch the available limit of each listed card
    #[arg(long)]
    pub limits: bool,
    #[command(flatten)]
    pub page: PageArgs,
}

fn card_row(card: &CreditCard, limit: Option<&AvailableLimit>) -> ExportRecord {
    let mut row = ExportRecord::new()
        .with("Id", card.id)
        .with("Nome", card.name.as_str())
        .with("Limite", format_currency(card.credit_limit))
        .with("Fechamento", u32::from(card.closing_day))
        .with("Vencimento", u32::from(card.due_day))
        .with(
            "Pagamento parcial",
            if card.allows_partial_payment { "Sim" } else { "Não" },
        );
    if let Some(limit) = limit {
        row.insert("Disponível", format_currency(limit.available_limit));
        row.insert("Uso", format!("{}%", limit.usage_percent().normalize()));
    }
    row
}

fn limit_row(limit: &AvailableLimit) -> ExportRecord {
    ExportRecord::new()
        .with("Cartão", limit.credit_card_id)
        .with("Limite", format_currency(limit.credit_limit))
        .with("Utilizado", format_currency(limit.used_limit))
        .with("Disponível", format_currency(limit.available_limit))
        .with("Uso", format!("{}%", limit.usage_percent().normalize()))
}

pub async fn run(command: CardsCommand, queries: &FinanceQueries) -> Result<()> {
    match command {
        CardsCommand::List(args) => {
            let filter = CreditCardFilter {
                name: args.name.filter(|n| !n.trim().is_empty()),
                page: args.page.request(),
            };
            let page = queries
                .credit_cards
                .list(&filter)
                .await
                .context("failed to list credit cards")?;

            let mut rows = Vec::with_capacity(page.content.len());
            for card in &page.content {
                let limit = if args.limits {
                    match queries.credit_cards.available_limit(card.id).await {
                        Ok(limit) => Some(limit),
                        Err(e) => {
                            warn!("Could not load available limit of card {}: {}", card.id, e);
                            None
                        }
                    }
                } else {
                    None
                };
                rows.push(card_row(card, limit.as_deref()));
            }
            print_page(&*page, &rows, "Nenhum cartão encontrado.");
        }
        CardsCommand::Limit { id } => {
            let limit = queries
                .credit_cards
                .available_limit(id)
                .await
                .with_context(|| format!("failed to load available limit of card {}", id))?;
            print!("{}", render_table(&[limit_row(&limit)]));
        }
    }
    Ok(())
}
