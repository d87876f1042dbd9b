/// Currency symbol used by every formatted amount (pt-BR, BRL)
pub const CURRENCY_SYMBOL: &str = "R$";

/// Separator between the currency symbol and the amount (non-breaking space)
pub const CURRENCY_SPACING: char = '\u{a0}';

/// Thousands grouping separator for the display locale
pub const THOUSANDS_SEPARATOR: char = '.';

/// Decimal separator for the display locale
pub const DECIMAL_SEPARATOR: char = ',';

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Display format for dates (dd/mm/yyyy)
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format used by date input controls and the REST API
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default page index for list queries
pub const DEFAULT_PAGE: u32 = 0;

/// Default page size for list queries
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest installment count accepted for a bill
pub const MAX_INSTALLMENTS: u32 = 480;
