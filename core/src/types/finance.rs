use chrono::NaiveDate;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: i64,
    pub nome: String,
    pub cnpj_cpf: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub cep: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub uf: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierPayload {
    pub nome: String,
    pub cnpj_cpf: String,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
}

impl Resource for Supplier {
    const COLLECTION: &'static str = "fornecedores";
    const DETAIL: &'static str = "fornecedor";
    const LABEL: &'static str = "Fornecedor";
    type Payload = SupplierPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.nome.clone()
    }
}

/// Level of a chart-of-accounts node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Category node; groups analytic accounts.
    #[serde(rename = "sintetica")]
    Synthetic,
    /// Leaf node; the only kind a ledger entry may post to.
    #[serde(rename = "analitica")]
    Analytic,
}

impl AccountType {
    pub fn label(self) -> &'static str {
        match self {
            AccountType::Synthetic => "Sintética",
            AccountType::Analytic => "Analítica",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartAccount {
    pub id: i64,
    pub codigo: String,
    pub nome: String,
    pub tipo: AccountType,
    #[serde(default)]
    pub conta_pai: Option<i64>,
}

impl ChartAccount {
    pub fn is_root(&self) -> bool {
        self.conta_pai.is_none()
    }
}

impl Resource for ChartAccount {
    const COLLECTION: &'static str = "planos-contas";
    const DETAIL: &'static str = "plano-conta";
    const LABEL: &'static str = "Plano de contas";
    type Payload = ChartAccountPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} - {}", self.codigo, self.nome)
    }
}

/// Chart-of-accounts body. Analytic nodes always carry their synthetic
/// parent and synthetic nodes never do.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartAccountPayload {
    Synthetic { codigo: String, nome: String },
    Analytic { codigo: String, nome: String, parent: i64 },
}

impl Serialize for ChartAccountPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ChartAccountPayload", 4)?;
        match self {
            ChartAccountPayload::Synthetic { codigo, nome } => {
                s.serialize_field("codigo", codigo)?;
                s.serialize_field("nome", nome)?;
                s.serialize_field("tipo", &AccountType::Synthetic)?;
                s.serialize_field("conta_pai", &Option::<i64>::None)?;
            }
            ChartAccountPayload::Analytic { codigo, nome, parent } => {
                s.serialize_field("codigo", codigo)?;
                s.serialize_field("nome", nome)?;
                s.serialize_field("tipo", &AccountType::Analytic)?;
                s.serialize_field("conta_pai", &Some(*parent))?;
            }
        }
        s.end()
    }
}

/// Name/description body shared by the small lookup tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPayload {
    pub nome: String,
    pub descricao: Option<String>,
}

macro_rules! named_resource {
    ($(#[$meta:meta])* $name:ident, $collection:literal, $detail:literal, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $name {
            pub id: i64,
            pub nome: String,
            #[serde(default)]
            pub descricao: Option<String>,
        }

        impl Resource for $name {
            const COLLECTION: &'static str = $collection;
            const DETAIL: &'static str = $detail;
            const LABEL: &'static str = $label;
            type Payload = NamedPayload;

            fn id(&self) -> i64 {
                self.id
            }

            fn display_name(&self) -> String {
                self.nome.clone()
            }
        }
    };
}

named_resource!(PaymentMethod, "formas-pagamento", "forma-pagamento", "Forma de pagamento");
named_resource!(DocumentType, "tipos-documento", "tipo-documento", "Documento");
named_resource!(
    /// Payable/receivable category of a ledger entry ("tipo de conta").
    EntryType,
    "tipos-conta",
    "tipo-conta",
    "Conta"
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerStatus {
    #[default]
    Pendente,
    Pago,
}

impl LedgerStatus {
    pub fn label(self) -> &'static str {
        match self {
            LedgerStatus::Pendente => "Pendente",
            LedgerStatus::Pago => "Pago",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub fornecedor: i64,
    pub tipo_conta: i64,
    pub tipo_documento: i64,
    pub plano_conta: i64,
    pub forma_pagamento: i64,
    #[serde(default)]
    pub numero_documento: Option<String>,
    #[serde(default)]
    pub descricao: Option<String>,
    pub data_vencimento: NaiveDate,
    #[serde(default)]
    pub data_pagamento: Option<NaiveDate>,
    pub valor: String,
    #[serde(default)]
    pub valor_pago: Option<String>,
    #[serde(default)]
    pub status: LedgerStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntryPayload {
    pub fornecedor: i64,
    pub tipo_conta: i64,
    pub tipo_documento: i64,
    pub plano_conta: i64,
    pub forma_pagamento: i64,
    pub numero_documento: Option<String>,
    pub descricao: Option<String>,
    pub data_vencimento: NaiveDate,
    pub data_pagamento: Option<NaiveDate>,
    pub valor: String,
    pub valor_pago: Option<String>,
    pub status: LedgerStatus,
}

impl Resource for LedgerEntry {
    const COLLECTION: &'static str = "lancamentos";
    const DETAIL: &'static str = "lancamento";
    const LABEL: &'static str = "Lançamento";
    type Payload = LedgerEntryPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        match &self.numero_documento {
            Some(number) => format!("{} {number}", Self::LABEL),
            None => Self::fallback_name(self.id),
        }
    }
}
