use chrono::NaiveDate;

const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// Inclusive calendar-day range of a report request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Parse two `YYYY-MM-DD` strings. The error names the offending value.
    pub fn parse(from: &str, to: &str) -> Result<Self, String> {
        let from = parse_date(from).ok_or_else(|| from.trim().to_string())?;
        let to = parse_date(to).ok_or_else(|| to.trim().to_string())?;
        Ok(Self { from, to })
    }

    /// Start day as a `YYYY-MM-DD` query parameter.
    pub fn from_param(&self) -> String {
        self.from.format(DATE_FORMAT).to_string()
    }

    pub fn to_param(&self) -> String {
        self.to.format(DATE_FORMAT).to_string()
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Calendar day of a stored document date, which may carry a time part
/// (`2024-03-05 14:20:00` or `2024-03-05T14:20:00`).
pub fn parse_doc_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    s.get(..10).and_then(parse_date)
}

/// `YYYY-MM` bucket label of a date.
pub fn month_label(date: NaiveDate) -> String {
    date.format(MONTH_FORMAT).to_string()
}
