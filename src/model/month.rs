use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// The twelve fixed month names used by both ledger shapes.
///
/// The flat ledger derives the month from the `Data Atual` column at load
/// time; the matrix ledger uses the names directly as column headers. The
/// enum order is calendar order, which is also the order summaries are
/// reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Month {
    Janeiro,
    Fevereiro,
    #[serde(rename = "Março")]
    Marco,
    Abril,
    Maio,
    Junho,
    Julho,
    Agosto,
    Setembro,
    Outubro,
    Novembro,
    Dezembro,
}

serde_plain::derive_display_from_serialize!(Month);
serde_plain::derive_fromstr_from_deserialize!(Month);

impl Month {
    /// All twelve months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::Janeiro,
        Month::Fevereiro,
        Month::Marco,
        Month::Abril,
        Month::Maio,
        Month::Junho,
        Month::Julho,
        Month::Agosto,
        Month::Setembro,
        Month::Outubro,
        Month::Novembro,
        Month::Dezembro,
    ];

    /// Maps a month number (1-12) to its name. `None` outside that range.
    pub fn from_number(number: u32) -> Option<Month> {
        match number {
            1..=12 => Some(Month::ALL[(number - 1) as usize]),
            _ => None,
        }
    }

    /// The month of a calendar date. Total: every date has a month.
    pub fn from_date(date: NaiveDate) -> Month {
        Month::ALL[date.month0() as usize]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Month::Janeiro => "Janeiro",
            Month::Fevereiro => "Fevereiro",
            Month::Marco => "Março",
            Month::Abril => "Abril",
            Month::Maio => "Maio",
            Month::Junho => "Junho",
            Month::Julho => "Julho",
            Month::Agosto => "Agosto",
            Month::Setembro => "Setembro",
            Month::Outubro => "Outubro",
            Month::Novembro => "Novembro",
            Month::Dezembro => "Dezembro",
        }
    }

    /// Zero-based calendar position, used to index month cell arrays.
    pub fn index(&self) -> usize {
        *self as usize
    }
}
