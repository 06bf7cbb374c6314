//! Plain-text tables for list screens.

use chrono::NaiveDate;

use crate::format::{format_brl, format_date, Cents};
use crate::ledger::LedgerRow;
use crate::types::{
    ChartAccount, DocumentType, EntryType, LedgerEntry, Medication, Patient, PatientNote, PaymentMethod, Supplier,
    VitalSigns,
};

/// A record that can be shown as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    /// One cell per header, already formatted for display.
    fn cells(&self) -> Vec<String>;
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn yes_no(flag: bool) -> String {
    if flag { "Sim" } else { "Não" }.to_string()
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(format_date).unwrap_or_default()
}

fn num<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl TableRow for Supplier {
    const HEADERS: &'static [&'static str] = &["ID", "Nome", "CNPJ/CPF", "Telefone", "Cidade", "UF"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nome.clone(),
            self.cnpj_cpf.clone(),
            text(&self.telefone),
            text(&self.cidade),
            text(&self.uf),
        ]
    }
}

impl TableRow for ChartAccount {
    const HEADERS: &'static [&'static str] = &["ID", "Código", "Nome", "Tipo", "Conta pai"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.codigo.clone(),
            self.nome.clone(),
            self.tipo.label().to_string(),
            num(self.conta_pai),
        ]
    }
}

macro_rules! named_row {
    ($($ty:ty),*) => {
        $(
            impl TableRow for $ty {
                const HEADERS: &'static [&'static str] = &["ID", "Nome", "Descrição"];

                fn cells(&self) -> Vec<String> {
                    vec![self.id.to_string(), self.nome.clone(), text(&self.descricao)]
                }
            }
        )*
    };
}

named_row!(PaymentMethod, DocumentType, EntryType);

impl TableRow for LedgerRow {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Fornecedor",
        "Conta",
        "Documento",
        "Nº",
        "Plano de contas",
        "Vencimento",
        "Valor",
        "Pagamento",
        "Valor pago",
        "Forma",
        "Status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.fornecedor.clone(),
            self.tipo_conta.clone(),
            self.tipo_documento.clone(),
            self.numero_documento.clone(),
            self.plano_conta.clone(),
            self.vencimento.clone(),
            self.valor.clone(),
            self.pagamento.clone(),
            self.valor_pago.clone(),
            self.forma_pagamento.clone(),
            self.status.label().to_string(),
        ]
    }
}

/// Raw entry with foreign keys as ids; the ledger screen uses [`LedgerRow`].
impl TableRow for LedgerEntry {
    const HEADERS: &'static [&'static str] = &[
        "ID",
        "Fornecedor",
        "Conta",
        "Documento",
        "Nº",
        "Plano",
        "Vencimento",
        "Valor",
        "Forma",
        "Status",
    ];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.fornecedor.to_string(),
            self.tipo_conta.to_string(),
            self.tipo_documento.to_string(),
            text(&self.numero_documento),
            self.plano_conta.to_string(),
            format_date(self.data_vencimento),
            format_brl(&self.valor),
            self.forma_pagamento.to_string(),
            self.status.label().to_string(),
        ]
    }
}

impl TableRow for Medication {
    const HEADERS: &'static [&'static str] = &["ID", "Nome", "Princípio ativo", "Dosagem", "Estoque", "Controlado"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nome.clone(),
            text(&self.principio_ativo),
            text(&self.dosagem),
            self.estoque.to_string(),
            yes_no(self.controlado),
        ]
    }
}

impl TableRow for Patient {
    const HEADERS: &'static [&'static str] = &["ID", "Nome", "CPF", "Nascimento", "Idade", "Telefone", "Ativo"];

    fn cells(&self) -> Vec<String> {
        let today = chrono::Local::now().date_naive();
        vec![
            self.id.to_string(),
            self.nome.clone(),
            text(&self.cpf),
            date(self.data_nascimento),
            num(self.age_on(today)),
            text(&self.telefone),
            yes_no(self.ativo),
        ]
    }
}

impl TableRow for VitalSigns {
    const HEADERS: &'static [&'static str] =
        &["ID", "Paciente", "Data/hora", "PA", "FC", "FR", "Temp.", "SpO2", "Glicemia"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.paciente.to_string(),
            self.data_hora.format("%d/%m/%Y %H:%M").to_string(),
            self.blood_pressure().unwrap_or_default(),
            num(self.frequencia_cardiaca),
            num(self.frequencia_respiratoria),
            text(&self.temperatura),
            num(self.saturacao),
            num(self.glicemia),
        ]
    }
}

impl TableRow for PatientNote {
    const HEADERS: &'static [&'static str] = &["ID", "Paciente", "Data", "Título"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.paciente.to_string(),
            format_date(self.data),
            self.titulo.clone(),
        ]
    }
}

/// Render rows under a header line, columns padded to the widest cell.
pub fn render_table<R: TableRow>(rows: &[R]) -> String {
    let body: Vec<Vec<String>> = rows.iter().map(TableRow::cells).collect();
    let mut widths: Vec<usize> = R::HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = R::HEADERS.iter().map(|h| h.to_string()).collect();
    push_line(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in &body {
        push_line(&mut out, row, &widths);
    }
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect();
    out.push_str(padded.join("  ").trim_end());
    out.push('\n');
}

/// Footer line for the ledger screen.
pub fn ledger_totals(pending: Cents, paid: Cents) -> String {
    format!("Pendente: {pending}  Pago: {paid}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountType;

    #[test]
    fn one_line_per_row_plus_header() {
        let rows = vec![
            PaymentMethod {
                id: 1,
                nome: "Dinheiro".to_string(),
                descricao: None,
            },
            PaymentMethod {
                id: 12,
                nome: "PIX".to_string(),
                descricao: Some("Instantâneo".to_string()),
            },
        ];
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ID  Nome      Descrição");
        assert_eq!(lines[2], "1   Dinheiro");
        assert_eq!(lines[3], "12  PIX       Instantâneo");
    }

    #[test]
    fn empty_list_renders_header_only() {
        let table = render_table::<Supplier>(&[]);
        assert_eq!(table.lines().count(), 2);
    }

    #[test]
    fn chart_account_shows_type_label() {
        let account = ChartAccount {
            id: 4,
            codigo: "1.01.01".to_string(),
            nome: "Caixa".to_string(),
            tipo: AccountType::Analytic,
            conta_pai: Some(2),
        };
        let cells = account.cells();
        assert_eq!(cells.len(), ChartAccount::HEADERS.len());
        assert_eq!(cells[3], AccountType::Analytic.label());
        assert_eq!(cells[4], "2");
    }

    #[test]
    fn totals_line_uses_brl() {
        assert_eq!(
            ledger_totals(Cents(123_450), Cents(9_800)),
            "Pendente: R$ 1.234,50  Pago: R$ 98,00"
        );
    }

    #[test]
    fn raw_ledger_entry_formats_amount_and_date() {
        let entry: LedgerEntry = serde_json::from_str(
            r#"{"id":3,"fornecedor":1,"tipo_conta":2,"tipo_documento":3,"plano_conta":4,
                "forma_pagamento":5,"data_vencimento":"2024-03-10","valor":"1234.5"}"#,
        )
        .unwrap();
        let cells = entry.cells();
        assert_eq!(cells.len(), LedgerEntry::HEADERS.len());
        assert_eq!(cells[6], "10/03/2024");
        assert_eq!(cells[7], "R$ 1.234,50");
        assert_eq!(cells[9], "Pendente");
    }
}
