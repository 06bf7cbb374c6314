//! Field-level form validation.
//!
//! A [`Validator`] collects one message per failing field while a form maps
//! its raw text into a typed payload. Checks return a usable placeholder on
//! failure so the mapping code stays linear; [`Validator::finish`] then
//! discards the payload if anything was recorded.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::format::{self, Cents};

pub const REQUIRED: &str = "Campo obrigatório";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field-local error found in one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message recorded for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Keep only errors for the listed fields.
    pub fn only(&self, fields: &[&str]) -> ValidationErrors {
        ValidationErrors {
            errors: self
                .errors
                .iter()
                .filter(|e| fields.contains(&e.field))
                .cloned()
                .collect(),
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trim, and treat blank input as absent.
pub fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Default)]
pub struct Validator {
    errors: ValidationErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` unless `field` already has one.
    pub fn error(&mut self, field: &'static str, message: impl Into<String>) {
        if !self.errors.contains(field) {
            self.errors.errors.push(FieldError {
                field,
                message: message.into(),
            });
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn required(&mut self, field: &'static str, value: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.error(field, REQUIRED);
        }
        trimmed.to_string()
    }

    pub fn max_len(&mut self, field: &'static str, value: &str, max: usize) {
        if value.trim().chars().count() > max {
            self.error(field, format!("Máximo de {max} caracteres"));
        }
    }

    pub fn required_text(&mut self, field: &'static str, value: &str, max: usize) -> String {
        let text = self.required(field, value);
        self.max_len(field, &text, max);
        text
    }

    pub fn optional_text(&mut self, field: &'static str, value: &str, max: usize) -> Option<String> {
        self.max_len(field, value, max);
        optional_text(value)
    }

    /// Required CPF (11 digits) or CNPJ (14 digits), returned masked.
    pub fn cpf_cnpj(&mut self, field: &'static str, value: &str) -> String {
        if self.required(field, value).is_empty() {
            return String::new();
        }
        match format::digits(value).len() {
            11 | 14 => format::format_cpf_cnpj(value),
            _ => {
                self.error(field, "CPF/CNPJ inválido");
                String::new()
            }
        }
    }

    pub fn cpf(&mut self, field: &'static str, value: &str) -> Option<String> {
        optional_text(value)?;
        if format::digits(value).len() == 11 {
            Some(format::format_cpf_cnpj(value))
        } else {
            self.error(field, "CPF inválido");
            None
        }
    }

    pub fn phone(&mut self, field: &'static str, value: &str) -> Option<String> {
        optional_text(value)?;
        match format::digits(value).len() {
            10 | 11 => Some(format::format_phone(value)),
            _ => {
                self.error(field, "Telefone inválido");
                None
            }
        }
    }

    pub fn cep(&mut self, field: &'static str, value: &str) -> Option<String> {
        optional_text(value)?;
        if format::digits(value).len() == 8 {
            Some(format::format_cep(value))
        } else {
            self.error(field, "CEP inválido");
            None
        }
    }

    pub fn email(&mut self, field: &'static str, value: &str) -> Option<String> {
        let email = optional_text(value)?;
        let valid = match email.split_once('@') {
            Some((user, domain)) => {
                !user.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
            }
            None => false,
        };
        if valid && !email.contains(char::is_whitespace) {
            Some(email)
        } else {
            self.error(field, "E-mail inválido");
            None
        }
    }

    pub fn uf(&mut self, field: &'static str, value: &str) -> Option<String> {
        let uf = optional_text(value)?.to_uppercase();
        if uf.len() == 2 && uf.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(uf)
        } else {
            self.error(field, "UF inválida");
            None
        }
    }

    /// Required reference to another record.
    pub fn required_id(&mut self, field: &'static str, value: &str) -> i64 {
        if self.required(field, value).is_empty() {
            return 0;
        }
        match value.trim().parse::<i64>() {
            Ok(id) if id > 0 => id,
            _ => {
                self.error(field, "Selecione um registro válido");
                0
            }
        }
    }

    /// Optional number within `min..=max`.
    pub fn number_in_range<T>(&mut self, field: &'static str, value: &str, min: T, max: T) -> Option<T>
    where
        T: FromStr + PartialOrd + fmt::Display,
    {
        let text = optional_text(value)?;
        match text.replace(',', ".").parse::<T>() {
            Ok(n) if n >= min && n <= max => Some(n),
            Ok(_) => {
                self.error(field, format!("Valor deve estar entre {min} e {max}"));
                None
            }
            Err(_) => {
                self.error(field, "Número inválido");
                None
            }
        }
    }

    /// Required, strictly positive amount typed through the currency mask.
    pub fn required_money(&mut self, field: &'static str, value: &str) -> Cents {
        match Cents::from_input(value) {
            None => {
                self.error(field, REQUIRED);
                Cents(0)
            }
            Some(Cents(0)) => {
                self.error(field, "Valor deve ser maior que zero");
                Cents(0)
            }
            Some(cents) => cents,
        }
    }

    pub fn optional_money(&mut self, value: &str) -> Option<Cents> {
        Cents::from_input(value)
    }

    pub fn required_date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        if self.required(field, value).is_empty() {
            return None;
        }
        self.optional_date(field, value)
    }

    pub fn optional_date(&mut self, field: &'static str, value: &str) -> Option<NaiveDate> {
        optional_text(value)?;
        let date = format::parse_date(value);
        if date.is_none() {
            self.error(field, "Data inválida");
        }
        date
    }

    /// Hand back `value` only if no check failed.
    pub fn finish<T>(self, value: T) -> Result<T, ValidationErrors> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }
}
