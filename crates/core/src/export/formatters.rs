//! Typed entity to [`ExportRecord`] mappings with localized column names.

use std::collections::HashMap;

use super::record::ExportRecord;
use super::ExportSheet;
use crate::bills::Bill;
use crate::categories::Category;
use crate::credit_cards::CreditCard;
use crate::format::{format_currency, format_date, format_month_reference};
use crate::invoices::Invoice;
use crate::models::EntityId;
use crate::unified::UnifiedExport;

fn yes_no(value: bool) -> &'static str {
    if value {
        "Sim"
    } else {
        "Não"
    }
}

pub fn bill_record(bill: &Bill) -> ExportRecord {
    ExportRecord::new()
        .with("Nome", bill.name.as_str())
        .with("Descrição", bill.description.as_deref())
        .with("Data", format_date(bill.execution_date))
        .with("Valor total", format_currency(bill.total_amount))
        .with("Parcelas", bill.number_of_installments)
        .with("Valor da parcela", format_currency(bill.installment_amount()))
        .with("Categoria", bill.category_name())
        .with("Cartão", bill.credit_card_name())
        .with("Recorrente", yes_no(bill.recurring))
}

pub fn category_record(category: &Category) -> ExportRecord {
    ExportRecord::new()
        .with("Nome", category.name.as_str())
        .with("Descrição", category.description.as_deref())
        .with("Cor", category.color.as_deref())
}

pub fn credit_card_record(card: &CreditCard) -> ExportRecord {
    ExportRecord::new()
        .with("Nome", card.name.as_str())
        .with("Limite", format_currency(card.credit_limit))
        .with("Dia de fechamento", u32::from(card.closing_day))
        .with("Dia de vencimento", u32::from(card.due_day))
        .with("Pagamento parcial", yes_no(card.allows_partial_payment))
}

/// `card_name` is the parent card's display name when known.
pub fn invoice_record(invoice: &Invoice, card_name: Option<&str>) -> ExportRecord {
    ExportRecord::new()
        .with("Cartão", card_name)
        .with("Mês de referência", format_month_reference(invoice.reference_month))
        .with("Valor total", format_currency(invoice.total_amount))
        .with("Saldo anterior", format_currency(invoice.previous_balance))
        .with("Valor devido", format_currency(invoice.amount_due()))
        .with("Status", invoice.status().label())
}

pub fn bill_records(bills: &[Bill]) -> Vec<ExportRecord> {
    bills.iter().map(bill_record).collect()
}

pub fn category_records(categories: &[Category]) -> Vec<ExportRecord> {
    categories.iter().map(category_record).collect()
}

pub fn credit_card_records(cards: &[CreditCard]) -> Vec<ExportRecord> {
    cards.iter().map(credit_card_record).collect()
}

/// Maps invoices, resolving card names from `cards`.
pub fn invoice_records(invoices: &[Invoice], cards: &[CreditCard]) -> Vec<ExportRecord> {
    let names: HashMap<EntityId, &str> = cards.iter().map(|c| (c.id, c.name.as_str())).collect();
    invoices
        .iter()
        .map(|i| invoice_record(i, names.get(&i.credit_card_id).copied()))
        .collect()
}

/// One sheet per dataset of a full export, in a fixed order.
pub fn unified_sheets(export: &UnifiedExport) -> Vec<ExportSheet<'static>> {
    vec![
        ExportSheet::owned("Categorias", category_records(&export.categories)),
        ExportSheet::owned("Cartões", credit_card_records(&export.credit_cards)),
        ExportSheet::owned("Contas", bill_records(&export.bills)),
        ExportSheet::owned(
            "Faturas",
            invoice_records(&export.invoices, &export.credit_cards),
        ),
    ]
}
