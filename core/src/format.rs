//! Input masks and display formatting.
//!
//! Masks are applied as the user types: each function accepts whatever text
//! the field currently holds, keeps its digits and re-inserts the pattern,
//! so partial input renders partially masked (`"1234"` → `"123.4"` for CPF).

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

const CPF_MASK: &str = "###.###.###-##";
const CNPJ_MASK: &str = "##.###.###/####-##";
const PHONE_MASK: &str = "(##) ####-####";
const MOBILE_MASK: &str = "(##) #####-####";
const CEP_MASK: &str = "#####-###";
const DATE_MASK: &str = "##/##/####";

/// Longest digit run accepted by the currency mask; keeps cents inside `i64`.
const MAX_CURRENCY_DIGITS: usize = 15;

pub fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Lay `digits` over `pattern`, where `#` consumes one digit. Literals are
/// only emitted while digits remain, so partial input is never padded.
fn apply_mask(digits: &str, pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut remaining = digits.chars().peekable();
    for slot in pattern.chars() {
        if remaining.peek().is_none() {
            break;
        }
        if slot == '#' {
            if let Some(d) = remaining.next() {
                out.push(d);
            }
        } else {
            out.push(slot);
        }
    }
    out
}

/// CPF for up to 11 digits, CNPJ beyond that (capped at 14).
pub fn format_cpf_cnpj(input: &str) -> String {
    let d = digits(input);
    if d.len() <= 11 {
        apply_mask(&d, CPF_MASK)
    } else {
        apply_mask(&d[..d.len().min(14)], CNPJ_MASK)
    }
}

/// Landline for up to 10 digits, mobile for 11.
pub fn format_phone(input: &str) -> String {
    let d = digits(input);
    if d.len() <= 10 {
        apply_mask(&d, PHONE_MASK)
    } else {
        apply_mask(&d[..11], MOBILE_MASK)
    }
}

pub fn format_cep(input: &str) -> String {
    let d = digits(input);
    apply_mask(&d[..d.len().min(8)], CEP_MASK)
}

pub fn format_date_input(input: &str) -> String {
    let d = digits(input);
    apply_mask(&d[..d.len().min(8)], DATE_MASK)
}

/// Chart-of-accounts code: one leading digit, then groups of two.
///
/// `"10101"` → `"1.01.01"`; an already formatted code passes through.
pub fn format_account_code(input: &str) -> String {
    let d = digits(input);
    let mut out = String::with_capacity(d.len() + d.len() / 2);
    for (i, c) in d.chars().enumerate() {
        if i > 0 && i % 2 == 1 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Masked currency input: the digits typed so far, read as cents.
///
/// `"12345"` → `"123,45"`. Empty input stays empty.
pub fn format_currency_input(input: &str) -> String {
    match Cents::from_input(input) {
        Some(cents) => cents.to_input(),
        None => String::new(),
    }
}

/// Display a decimal string from the API as Brazilian reais.
///
/// Unparseable input is returned unchanged.
pub fn format_brl(decimal: &str) -> String {
    match Cents::parse_decimal(decimal) {
        Some(cents) => cents.to_brl(),
        None => decimal.to_string(),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Accepts `dd/mm/yyyy` (as typed in forms) or ISO `yyyy-mm-dd`.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

/// Accepts `dd/mm/yyyy hh:mm` or ISO `yyyy-mm-ddThh:mm[:ss]`.
pub fn parse_datetime(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    ["%d/%m/%Y %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(input, layout).ok())
}

/// Whole years between `birth` and `today`; one less while this year's
/// birthday has not been reached. Future birth dates give zero.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }
    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// Money as integer cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Cents(pub i64);

impl Cents {
    /// Parse an API decimal string: `"1234"`, `"1234.5"`, `"-10.05"`.
    /// More than two fractional digits is rejected.
    pub fn parse_decimal(input: &str) -> Option<Self> {
        let input = input.trim();
        let (negative, unsigned) = match input.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, input),
        };
        let (whole, frac) = unsigned.split_once('.').unwrap_or((unsigned, ""));
        if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let whole: i64 = whole.parse().ok()?;
        let frac: i64 = match frac.len() {
            0 => 0,
            1 => frac.parse::<i64>().ok()? * 10,
            _ => frac.parse().ok()?,
        };
        let cents = whole.checked_mul(100)?.checked_add(frac)?;
        Some(Cents(if negative { -cents } else { cents }))
    }

    /// Read masked currency input: every digit typed counts as a cent.
    pub fn from_input(input: &str) -> Option<Self> {
        let all = digits(input);
        if all.is_empty() {
            return None;
        }
        let d = all.trim_start_matches('0');
        let d = &d[..d.len().min(MAX_CURRENCY_DIGITS)];
        if d.is_empty() {
            return Some(Cents(0));
        }
        d.parse().ok().map(Cents)
    }

    pub fn to_decimal_string(self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!("{sign}{}.{:02}", abs / 100, abs % 100)
    }

    /// `1.234,56` without currency symbol.
    pub fn to_input(self) -> String {
        let abs = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{sign}{},{:02}", group_thousands(abs / 100), abs % 100)
    }

    pub fn to_brl(self) -> String {
        if self.0 < 0 {
            format!("-R$ {}", Cents(self.0.saturating_neg()).to_input())
        } else {
            format!("R$ {}", self.to_input())
        }
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_brl())
    }
}

impl std::ops::Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Cents) -> Cents {
        Cents(self.0.saturating_add(rhs.0))
    }
}

impl std::iter::Sum for Cents {
    fn sum<I: Iterator<Item = Cents>>(iter: I) -> Cents {
        iter.fold(Cents(0), |acc, c| acc + c)
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, c) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
