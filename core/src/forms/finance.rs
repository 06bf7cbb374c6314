use std::marker::PhantomData;

use chrono::NaiveDate;

use super::{parse_flag, unknown, Form, FormError};
use crate::format::{self, Cents};
use crate::resource::Resource;
use crate::types::{
    AccountType, ChartAccount, ChartAccountPayload, DocumentType, EntryType, LedgerEntry, LedgerEntryPayload,
    LedgerStatus, NamedPayload, PaymentMethod, Supplier, SupplierPayload,
};
use crate::validation::{optional_text, ValidationErrors, Validator};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplierForm {
    pub nome: String,
    pub cnpj_cpf: String,
    pub email: String,
    pub telefone: String,
    pub cep: String,
    pub endereco: String,
    pub cidade: String,
    pub uf: String,
}

impl Form for SupplierForm {
    type Resource = Supplier;

    const FIELDS: &'static [&'static str] =
        &["nome", "cnpj_cpf", "email", "telefone", "cep", "endereco", "cidade", "uf"];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nome" => self.nome = value.to_string(),
            "cnpj_cpf" => self.cnpj_cpf = format::format_cpf_cnpj(value),
            "email" => self.email = value.to_string(),
            "telefone" => self.telefone = format::format_phone(value),
            "cep" => self.cep = format::format_cep(value),
            "endereco" => self.endereco = value.to_string(),
            "cidade" => self.cidade = value.to_string(),
            "uf" => self.uf = value.to_uppercase(),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &Supplier) -> Self {
        Self {
            nome: record.nome.clone(),
            cnpj_cpf: record.cnpj_cpf.clone(),
            email: record.email.clone().unwrap_or_default(),
            telefone: record.telefone.clone().unwrap_or_default(),
            cep: record.cep.clone().unwrap_or_default(),
            endereco: record.endereco.clone().unwrap_or_default(),
            cidade: record.cidade.clone().unwrap_or_default(),
            uf: record.uf.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<SupplierPayload, ValidationErrors> {
        let mut v = Validator::new();
        let payload = SupplierPayload {
            nome: v.required_text("nome", &self.nome, 150),
            cnpj_cpf: v.cpf_cnpj("cnpj_cpf", &self.cnpj_cpf),
            email: v.email("email", &self.email),
            telefone: v.phone("telefone", &self.telefone),
            cep: v.cep("cep", &self.cep),
            endereco: v.optional_text("endereco", &self.endereco, 255),
            cidade: v.optional_text("cidade", &self.cidade, 100),
            uf: v.uf("uf", &self.uf),
        };
        v.finish(payload)
    }
}

/// Account level as chosen in the form. The parent field only exists for
/// analytic accounts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccountKindInput {
    #[default]
    Unset,
    Synthetic,
    Analytic {
        parent: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartAccountForm {
    pub codigo: String,
    pub nome: String,
    pub kind: AccountKindInput,
}

impl Form for ChartAccountForm {
    type Resource = ChartAccount;

    const FIELDS: &'static [&'static str] = &["codigo", "nome", "tipo", "conta_pai"];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "codigo" => self.codigo = format::format_account_code(value),
            "nome" => self.nome = value.to_string(),
            "tipo" => {
                self.kind = match value.trim().to_lowercase().as_str() {
                    "sintetica" | "sintética" => AccountKindInput::Synthetic,
                    "analitica" | "analítica" => match &self.kind {
                        AccountKindInput::Analytic { parent } => AccountKindInput::Analytic {
                            parent: parent.clone(),
                        },
                        _ => AccountKindInput::Analytic { parent: String::new() },
                    },
                    "" => AccountKindInput::Unset,
                    _ => {
                        return Err(FormError::InvalidChoice {
                            field: field.to_string(),
                            value: value.to_string(),
                        })
                    }
                }
            }
            "conta_pai" => match &mut self.kind {
                AccountKindInput::Analytic { parent } => *parent = value.trim().to_string(),
                _ => {
                    return Err(FormError::HiddenField {
                        field: "conta_pai",
                        depends_on: "tipo",
                    })
                }
            },
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &ChartAccount) -> Self {
        let kind = match record.tipo {
            AccountType::Synthetic => AccountKindInput::Synthetic,
            AccountType::Analytic => AccountKindInput::Analytic {
                parent: record.conta_pai.map(|id| id.to_string()).unwrap_or_default(),
            },
        };
        Self {
            codigo: record.codigo.clone(),
            nome: record.nome.clone(),
            kind,
        }
    }

    fn validate(&self) -> Result<ChartAccountPayload, ValidationErrors> {
        let mut v = Validator::new();
        let codigo = v.required_text("codigo", &self.codigo, 20);
        let nome = v.required_text("nome", &self.nome, 150);
        let payload = match &self.kind {
            AccountKindInput::Unset => {
                v.error("tipo", crate::validation::REQUIRED);
                ChartAccountPayload::Synthetic { codigo, nome }
            }
            AccountKindInput::Synthetic => ChartAccountPayload::Synthetic { codigo, nome },
            AccountKindInput::Analytic { parent } => {
                let parent = v.required_id("conta_pai", parent);
                ChartAccountPayload::Analytic { codigo, nome, parent }
            }
        };
        v.finish(payload)
    }
}

/// Records edited through [`NamedForm`].
pub trait NamedRecord: Resource<Payload = NamedPayload> {
    fn nome(&self) -> &str;
    fn descricao(&self) -> Option<&str>;
}

macro_rules! named_record {
    ($($ty:ty),*) => {
        $(impl NamedRecord for $ty {
            fn nome(&self) -> &str {
                &self.nome
            }

            fn descricao(&self) -> Option<&str> {
                self.descricao.as_deref()
            }
        })*
    };
}

named_record!(PaymentMethod, DocumentType, EntryType);

/// Name + description form shared by the small lookup tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedForm<R> {
    pub nome: String,
    pub descricao: String,
    _record: PhantomData<R>,
}

impl<R> Default for NamedForm<R> {
    fn default() -> Self {
        Self {
            nome: String::new(),
            descricao: String::new(),
            _record: PhantomData,
        }
    }
}

pub type PaymentMethodForm = NamedForm<PaymentMethod>;
pub type DocumentTypeForm = NamedForm<DocumentType>;
pub type EntryTypeForm = NamedForm<EntryType>;

impl<R: NamedRecord + Clone> Form for NamedForm<R> {
    type Resource = R;

    const FIELDS: &'static [&'static str] = &["nome", "descricao"];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nome" => self.nome = value.to_string(),
            "descricao" => self.descricao = value.to_string(),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &R) -> Self {
        Self {
            nome: record.nome().to_string(),
            descricao: record.descricao().unwrap_or_default().to_string(),
            _record: PhantomData,
        }
    }

    fn validate(&self) -> Result<NamedPayload, ValidationErrors> {
        let mut v = Validator::new();
        let payload = NamedPayload {
            nome: v.required_text("nome", &self.nome, 100),
            descricao: v.optional_text("descricao", &self.descricao, 255),
        };
        v.finish(payload)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerEntryForm {
    pub fornecedor: String,
    pub tipo_conta: String,
    pub tipo_documento: String,
    pub plano_conta: String,
    pub forma_pagamento: String,
    pub numero_documento: String,
    pub descricao: String,
    pub data_vencimento: String,
    pub data_pagamento: String,
    pub valor: String,
    pub valor_pago: String,
    pub pago: bool,
}

fn date_input(date: NaiveDate) -> String {
    format::format_date(date)
}

fn money_input(decimal: &str) -> String {
    Cents::parse_decimal(decimal)
        .map(Cents::to_input)
        .unwrap_or_default()
}

impl Form for LedgerEntryForm {
    type Resource = LedgerEntry;

    const FIELDS: &'static [&'static str] = &[
        "fornecedor",
        "tipo_conta",
        "tipo_documento",
        "plano_conta",
        "forma_pagamento",
        "numero_documento",
        "descricao",
        "data_vencimento",
        "data_pagamento",
        "valor",
        "valor_pago",
        "pago",
    ];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "fornecedor" => self.fornecedor = value.trim().to_string(),
            "tipo_conta" => self.tipo_conta = value.trim().to_string(),
            "tipo_documento" => self.tipo_documento = value.trim().to_string(),
            "plano_conta" => self.plano_conta = value.trim().to_string(),
            "forma_pagamento" => self.forma_pagamento = value.trim().to_string(),
            "numero_documento" => self.numero_documento = value.to_string(),
            "descricao" => self.descricao = value.to_string(),
            "data_vencimento" => self.data_vencimento = masked_date(value),
            "data_pagamento" => self.data_pagamento = masked_date(value),
            "valor" => self.valor = format::format_currency_input(value),
            "valor_pago" => self.valor_pago = format::format_currency_input(value),
            "pago" | "status" => {
                self.pago = match value.trim().to_lowercase().as_str() {
                    "pago" => true,
                    "pendente" => false,
                    _ => parse_flag(field, value)?,
                }
            }
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &LedgerEntry) -> Self {
        Self {
            fornecedor: record.fornecedor.to_string(),
            tipo_conta: record.tipo_conta.to_string(),
            tipo_documento: record.tipo_documento.to_string(),
            plano_conta: record.plano_conta.to_string(),
            forma_pagamento: record.forma_pagamento.to_string(),
            numero_documento: record.numero_documento.clone().unwrap_or_default(),
            descricao: record.descricao.clone().unwrap_or_default(),
            data_vencimento: date_input(record.data_vencimento),
            data_pagamento: record.data_pagamento.map(date_input).unwrap_or_default(),
            valor: money_input(&record.valor),
            valor_pago: record.valor_pago.as_deref().map(money_input).unwrap_or_default(),
            pago: record.status == LedgerStatus::Pago,
        }
    }

    fn validate(&self) -> Result<LedgerEntryPayload, ValidationErrors> {
        let mut v = Validator::new();
        let fornecedor = v.required_id("fornecedor", &self.fornecedor);
        let tipo_conta = v.required_id("tipo_conta", &self.tipo_conta);
        let tipo_documento = v.required_id("tipo_documento", &self.tipo_documento);
        let plano_conta = v.required_id("plano_conta", &self.plano_conta);
        let forma_pagamento = v.required_id("forma_pagamento", &self.forma_pagamento);
        let numero_documento = v.optional_text("numero_documento", &self.numero_documento, 50);
        let descricao = v.optional_text("descricao", &self.descricao, 255);
        let data_vencimento = v.required_date("data_vencimento", &self.data_vencimento);
        let valor = v.required_money("valor", &self.valor);

        let (status, data_pagamento, valor_pago) = if self.pago {
            let paid_on = v.required_date("data_pagamento", &self.data_pagamento);
            let paid = v.optional_money(&self.valor_pago).unwrap_or(valor);
            (LedgerStatus::Pago, paid_on, Some(paid.to_decimal_string()))
        } else {
            (LedgerStatus::Pendente, None, None)
        };

        let payload = LedgerEntryPayload {
            fornecedor,
            tipo_conta,
            tipo_documento,
            plano_conta,
            forma_pagamento,
            numero_documento,
            descricao,
            data_vencimento: data_vencimento.unwrap_or_default(),
            data_pagamento,
            valor: valor.to_decimal_string(),
            valor_pago,
            status,
        };
        v.finish(payload)
    }
}

/// Dates may be typed as digits (`05032024`) or pasted in ISO form.
fn masked_date(value: &str) -> String {
    if format::parse_date(value).is_some() && value.contains('-') {
        value.trim().to_string()
    } else if optional_text(value).is_none() {
        String::new()
    } else {
        format::format_date_input(value)
    }
}
