//! Ledger screen data: a page of entries with every foreign key replaced by
//! the referenced record's display name.
//!
//! # Design
//! After the list call, each distinct referenced id is fetched on its own
//! scoped thread (one outer thread per entity kind, one inner thread per
//! id). Lookups fail independently: a missing or unreachable record renders
//! as `"<Label> #<id>"` and the row is still shown. Only a failure of the
//! list call itself fails the view.

use std::collections::{BTreeSet, HashMap};
use std::thread;

use crate::error::ApiError;
use crate::format::{format_brl, format_date, Cents};
use crate::http::Transport;
use crate::resource::Resource;
use crate::session::Session;
use crate::types::{ChartAccount, DocumentType, EntryType, LedgerEntry, LedgerStatus, PaymentMethod, Supplier};

/// One ledger entry ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRow {
    pub id: i64,
    pub fornecedor: String,
    pub tipo_conta: String,
    pub tipo_documento: String,
    pub plano_conta: String,
    pub forma_pagamento: String,
    pub numero_documento: String,
    pub descricao: String,
    pub vencimento: String,
    pub pagamento: String,
    pub valor: String,
    pub valor_pago: String,
    pub status: LedgerStatus,
}

#[derive(Debug, Clone, Default)]
pub struct LedgerView {
    pub rows: Vec<LedgerRow>,
    pub count: u64,
    pub total_pending: Cents,
    pub total_paid: Cents,
    /// Raw entries, for seeding edit forms.
    pub entries: Vec<LedgerEntry>,
}

/// Resolved display names, keyed by id, per referenced entity.
#[derive(Debug, Clone, Default)]
pub struct LedgerNames {
    pub suppliers: HashMap<i64, String>,
    pub entry_types: HashMap<i64, String>,
    pub document_types: HashMap<i64, String>,
    pub accounts: HashMap<i64, String>,
    pub payment_methods: HashMap<i64, String>,
}

pub fn fetch_ledger_view<T>(session: &Session<T>, page: Option<u32>) -> Result<LedgerView, ApiError>
where
    T: Transport + Sync,
{
    let listed = session.list::<LedgerEntry>(page)?;
    let names = resolve_names(session, &listed.results);
    Ok(build_view(listed.results, listed.count, &names))
}

/// Fetch every referenced record concurrently. Never fails.
pub fn resolve_names<T>(session: &Session<T>, entries: &[LedgerEntry]) -> LedgerNames
where
    T: Transport + Sync,
{
    thread::scope(|s| {
        let suppliers = s.spawn(|| lookup::<Supplier, T>(session, entries.iter().map(|e| e.fornecedor)));
        let entry_types = s.spawn(|| lookup::<EntryType, T>(session, entries.iter().map(|e| e.tipo_conta)));
        let document_types =
            s.spawn(|| lookup::<DocumentType, T>(session, entries.iter().map(|e| e.tipo_documento)));
        let accounts = s.spawn(|| lookup::<ChartAccount, T>(session, entries.iter().map(|e| e.plano_conta)));
        let payment_methods =
            s.spawn(|| lookup::<PaymentMethod, T>(session, entries.iter().map(|e| e.forma_pagamento)));

        LedgerNames {
            suppliers: suppliers.join().unwrap_or_default(),
            entry_types: entry_types.join().unwrap_or_default(),
            document_types: document_types.join().unwrap_or_default(),
            accounts: accounts.join().unwrap_or_default(),
            payment_methods: payment_methods.join().unwrap_or_default(),
        }
    })
}

fn lookup<R, T>(session: &Session<T>, ids: impl Iterator<Item = i64>) -> HashMap<i64, String>
where
    R: Resource,
    T: Transport + Sync,
{
    let ids: BTreeSet<i64> = ids.collect();
    thread::scope(|s| {
        let handles: Vec<_> = ids
            .into_iter()
            .map(|id| (id, s.spawn(move || session.get::<R>(id))))
            .collect();

        handles
            .into_iter()
            .map(|(id, handle)| {
                let name = match handle.join() {
                    Ok(Ok(record)) => record.display_name(),
                    Ok(Err(err)) => {
                        tracing::warn!(resource = R::DETAIL, id, error = %err, "lookup failed, using fallback name");
                        R::fallback_name(id)
                    }
                    Err(_) => {
                        tracing::warn!(resource = R::DETAIL, id, "lookup thread panicked, using fallback name");
                        R::fallback_name(id)
                    }
                };
                (id, name)
            })
            .collect()
    })
}

fn name_of<R: Resource>(names: &HashMap<i64, String>, id: i64) -> String {
    names.get(&id).cloned().unwrap_or_else(|| R::fallback_name(id))
}

/// Amount for the totals. Unparseable amounts are left out.
fn money(entry_id: i64, decimal: &str) -> Option<Cents> {
    let cents = Cents::parse_decimal(decimal);
    if cents.is_none() {
        tracing::warn!(entry_id, amount = decimal, "unparseable amount left out of totals");
    }
    cents
}

pub fn build_view(entries: Vec<LedgerEntry>, count: u64, names: &LedgerNames) -> LedgerView {
    let rows = entries.iter().map(|entry| build_row(entry, names)).collect();
    let total_pending = entries
        .iter()
        .filter(|e| e.status == LedgerStatus::Pendente)
        .filter_map(|e| money(e.id, &e.valor))
        .sum();
    let total_paid = entries
        .iter()
        .filter(|e| e.status == LedgerStatus::Pago)
        .filter_map(|e| money(e.id, e.valor_pago.as_deref().unwrap_or(&e.valor)))
        .sum();
    LedgerView {
        rows,
        count,
        total_pending,
        total_paid,
        entries,
    }
}

fn build_row(entry: &LedgerEntry, names: &LedgerNames) -> LedgerRow {
    LedgerRow {
        id: entry.id,
        fornecedor: name_of::<Supplier>(&names.suppliers, entry.fornecedor),
        tipo_conta: name_of::<EntryType>(&names.entry_types, entry.tipo_conta),
        tipo_documento: name_of::<DocumentType>(&names.document_types, entry.tipo_documento),
        plano_conta: name_of::<ChartAccount>(&names.accounts, entry.plano_conta),
        forma_pagamento: name_of::<PaymentMethod>(&names.payment_methods, entry.forma_pagamento),
        numero_documento: entry.numero_documento.clone().unwrap_or_default(),
        descricao: entry.descricao.clone().unwrap_or_default(),
        vencimento: format_date(entry.data_vencimento),
        pagamento: entry.data_pagamento.map(format_date).unwrap_or_default(),
        valor: format_brl(&entry.valor),
        valor_pago: entry.valor_pago.as_deref().map(format_brl).unwrap_or_default(),
        status: entry.status,
    }
}
