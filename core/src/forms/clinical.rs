use serde_json::{Map, Value};

use super::{parse_flag, unknown, Form, FormError};
use crate::format;
use crate::types::{
    Medication, MedicationPayload, Mobility, Patient, PatientNote, PatientNotePayload, PatientPayload, Sex,
    VitalSigns, VitalSignsPayload,
};
use crate::validation::{ValidationErrors, Validator};

const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];
const DIABETES_TYPES: &[&str] = &["tipo 1", "tipo 2", "gestacional"];

/// A yes/no question with a follow-up detail that only exists on "yes".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Flagged {
    #[default]
    No,
    Yes(String),
}

impl Flagged {
    pub fn from_record(flag: bool, detail: Option<&str>) -> Self {
        if flag {
            Flagged::Yes(detail.unwrap_or_default().to_string())
        } else {
            Flagged::No
        }
    }

    pub fn is_yes(&self) -> bool {
        matches!(self, Flagged::Yes(_))
    }

    /// Turning the flag off discards the detail; turning it on keeps any
    /// detail already typed.
    fn set_flag(&mut self, on: bool) {
        match (on, &*self) {
            (true, Flagged::No) => *self = Flagged::Yes(String::new()),
            (false, _) => *self = Flagged::No,
            (true, Flagged::Yes(_)) => {}
        }
    }

    fn set_detail(&mut self, field: &'static str, depends_on: &'static str, value: &str) -> Result<(), FormError> {
        match self {
            Flagged::Yes(detail) => {
                *detail = value.to_string();
                Ok(())
            }
            Flagged::No => Err(FormError::HiddenField { field, depends_on }),
        }
    }

    /// Wire pair `(flag, detail)`; the detail is required when flagged.
    fn validate(&self, v: &mut Validator, field: &'static str, max: usize) -> (bool, Option<String>) {
        match self {
            Flagged::No => (false, None),
            Flagged::Yes(detail) => (true, Some(v.required_text(field, detail, max))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicationForm {
    pub nome: String,
    pub principio_ativo: String,
    pub dosagem: String,
    pub forma_farmaceutica: String,
    pub fabricante: String,
    pub estoque: String,
    pub controlado: bool,
}

impl Form for MedicationForm {
    type Resource = Medication;

    const FIELDS: &'static [&'static str] = &[
        "nome",
        "principio_ativo",
        "dosagem",
        "forma_farmaceutica",
        "fabricante",
        "estoque",
        "controlado",
    ];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nome" => self.nome = value.to_string(),
            "principio_ativo" => self.principio_ativo = value.to_string(),
            "dosagem" => self.dosagem = value.to_string(),
            "forma_farmaceutica" => self.forma_farmaceutica = value.to_string(),
            "fabricante" => self.fabricante = value.to_string(),
            "estoque" => self.estoque = format::digits(value),
            "controlado" => self.controlado = parse_flag(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &Medication) -> Self {
        Self {
            nome: record.nome.clone(),
            principio_ativo: record.principio_ativo.clone().unwrap_or_default(),
            dosagem: record.dosagem.clone().unwrap_or_default(),
            forma_farmaceutica: record.forma_farmaceutica.clone().unwrap_or_default(),
            fabricante: record.fabricante.clone().unwrap_or_default(),
            estoque: record.estoque.to_string(),
            controlado: record.controlado,
        }
    }

    fn validate(&self) -> Result<MedicationPayload, ValidationErrors> {
        let mut v = Validator::new();
        let payload = MedicationPayload {
            nome: v.required_text("nome", &self.nome, 150),
            principio_ativo: v.optional_text("principio_ativo", &self.principio_ativo, 150),
            dosagem: v.optional_text("dosagem", &self.dosagem, 50),
            forma_farmaceutica: v.optional_text("forma_farmaceutica", &self.forma_farmaceutica, 50),
            fabricante: v.optional_text("fabricante", &self.fabricante, 100),
            estoque: v
                .number_in_range::<u32>("estoque", &self.estoque, 0, 1_000_000)
                .unwrap_or(0),
            controlado: self.controlado,
        };
        v.finish(payload)
    }
}

/// Patient create/edit form, also driven step by step by the intake wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientForm {
    pub nome: String,
    pub cpf: String,
    pub rg: String,
    pub data_nascimento: String,
    pub sexo: Option<Sex>,
    pub estado_civil: String,
    pub telefone: String,
    pub telefone_emergencia: String,
    pub contato_emergencia: String,
    pub email: String,
    pub cep: String,
    pub endereco: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub uf: String,
    pub convenio: String,
    pub numero_carteirinha: String,
    pub tipo_sanguineo: String,
    pub peso: String,
    pub altura: String,
    pub alergia: Flagged,
    pub diabetes: Flagged,
    pub hipertenso: bool,
    pub cardiopatia: Flagged,
    pub medicacao_continua: Flagged,
    pub fumante: bool,
    pub etilista: bool,
    pub atividade_fisica: Flagged,
    pub mobilidade: Option<Mobility>,
    pub observacoes: String,
    pub ativo: bool,
    /// Stored fields with no input here, carried from `seed` to the payload.
    pub extra: Map<String, Value>,
}

impl Default for PatientForm {
    fn default() -> Self {
        Self {
            nome: String::new(),
            cpf: String::new(),
            rg: String::new(),
            data_nascimento: String::new(),
            sexo: None,
            estado_civil: String::new(),
            telefone: String::new(),
            telefone_emergencia: String::new(),
            contato_emergencia: String::new(),
            email: String::new(),
            cep: String::new(),
            endereco: String::new(),
            numero: String::new(),
            bairro: String::new(),
            cidade: String::new(),
            uf: String::new(),
            convenio: String::new(),
            numero_carteirinha: String::new(),
            tipo_sanguineo: String::new(),
            peso: String::new(),
            altura: String::new(),
            alergia: Flagged::No,
            diabetes: Flagged::No,
            hipertenso: false,
            cardiopatia: Flagged::No,
            medicacao_continua: Flagged::No,
            fumante: false,
            etilista: false,
            atividade_fisica: Flagged::No,
            mobilidade: None,
            observacoes: String::new(),
            ativo: true,
            extra: Map::new(),
        }
    }
}

fn invalid(field: &str, value: &str) -> FormError {
    FormError::InvalidChoice {
        field: field.to_string(),
        value: value.to_string(),
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl Form for PatientForm {
    type Resource = Patient;

    const FIELDS: &'static [&'static str] = &[
        "nome",
        "cpf",
        "rg",
        "data_nascimento",
        "sexo",
        "estado_civil",
        "telefone",
        "telefone_emergencia",
        "contato_emergencia",
        "email",
        "cep",
        "endereco",
        "numero",
        "bairro",
        "cidade",
        "uf",
        "convenio",
        "numero_carteirinha",
        "tipo_sanguineo",
        "peso",
        "altura",
        "possui_alergia",
        "quais_alergias",
        "possui_diabetes",
        "tipo_diabetes",
        "hipertenso",
        "possui_cardiopatia",
        "qual_cardiopatia",
        "usa_medicacao_continua",
        "quais_medicacoes",
        "fumante",
        "etilista",
        "pratica_atividade_fisica",
        "qual_atividade",
        "mobilidade",
        "observacoes",
        "ativo",
    ];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nome" => self.nome = value.to_string(),
            "cpf" => {
                let d = format::digits(value);
                self.cpf = format::format_cpf_cnpj(&d[..d.len().min(11)]);
            }
            "rg" => self.rg = value.to_string(),
            "data_nascimento" => self.data_nascimento = format::format_date_input(value),
            "sexo" => {
                self.sexo = match value.trim() {
                    "" => None,
                    v => Some(Sex::parse(v).ok_or_else(|| invalid(field, value))?),
                }
            }
            "estado_civil" => self.estado_civil = value.to_string(),
            "telefone" => self.telefone = format::format_phone(value),
            "telefone_emergencia" => self.telefone_emergencia = format::format_phone(value),
            "contato_emergencia" => self.contato_emergencia = value.to_string(),
            "email" => self.email = value.to_string(),
            "cep" => self.cep = format::format_cep(value),
            "endereco" => self.endereco = value.to_string(),
            "numero" => self.numero = value.to_string(),
            "bairro" => self.bairro = value.to_string(),
            "cidade" => self.cidade = value.to_string(),
            "uf" => self.uf = value.to_uppercase(),
            "convenio" => self.convenio = value.to_string(),
            "numero_carteirinha" => self.numero_carteirinha = value.to_string(),
            "tipo_sanguineo" => self.tipo_sanguineo = value.trim().to_uppercase(),
            "peso" => self.peso = value.trim().to_string(),
            "altura" => self.altura = value.trim().to_string(),
            "possui_alergia" => self.alergia.set_flag(parse_flag(field, value)?),
            "quais_alergias" => self.alergia.set_detail("quais_alergias", "possui_alergia", value)?,
            "possui_diabetes" => self.diabetes.set_flag(parse_flag(field, value)?),
            "tipo_diabetes" => self
                .diabetes
                .set_detail("tipo_diabetes", "possui_diabetes", &value.trim().to_lowercase())?,
            "hipertenso" => self.hipertenso = parse_flag(field, value)?,
            "possui_cardiopatia" => self.cardiopatia.set_flag(parse_flag(field, value)?),
            "qual_cardiopatia" => self
                .cardiopatia
                .set_detail("qual_cardiopatia", "possui_cardiopatia", value)?,
            "usa_medicacao_continua" => self.medicacao_continua.set_flag(parse_flag(field, value)?),
            "quais_medicacoes" => {
                self.medicacao_continua
                    .set_detail("quais_medicacoes", "usa_medicacao_continua", value)?
            }
            "fumante" => self.fumante = parse_flag(field, value)?,
            "etilista" => self.etilista = parse_flag(field, value)?,
            "pratica_atividade_fisica" => self.atividade_fisica.set_flag(parse_flag(field, value)?),
            "qual_atividade" => {
                self.atividade_fisica
                    .set_detail("qual_atividade", "pratica_atividade_fisica", value)?
            }
            "mobilidade" => {
                self.mobilidade = match value.trim() {
                    "" => None,
                    v => Some(Mobility::parse(v).ok_or_else(|| invalid(field, value))?),
                }
            }
            "observacoes" => self.observacoes = value.to_string(),
            "ativo" => self.ativo = parse_flag(field, value)?,
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &Patient) -> Self {
        Self {
            nome: record.nome.clone(),
            cpf: opt(&record.cpf),
            rg: opt(&record.rg),
            data_nascimento: record.data_nascimento.map(format::format_date).unwrap_or_default(),
            sexo: record.sexo,
            estado_civil: opt(&record.estado_civil),
            telefone: opt(&record.telefone),
            telefone_emergencia: opt(&record.telefone_emergencia),
            contato_emergencia: opt(&record.contato_emergencia),
            email: opt(&record.email),
            cep: opt(&record.cep),
            endereco: opt(&record.endereco),
            numero: opt(&record.numero),
            bairro: opt(&record.bairro),
            cidade: opt(&record.cidade),
            uf: opt(&record.uf),
            convenio: opt(&record.convenio),
            numero_carteirinha: opt(&record.numero_carteirinha),
            tipo_sanguineo: opt(&record.tipo_sanguineo),
            peso: opt(&record.peso),
            altura: opt(&record.altura),
            alergia: Flagged::from_record(record.possui_alergia, record.quais_alergias.as_deref()),
            diabetes: Flagged::from_record(record.possui_diabetes, record.tipo_diabetes.as_deref()),
            hipertenso: record.hipertenso,
            cardiopatia: Flagged::from_record(record.possui_cardiopatia, record.qual_cardiopatia.as_deref()),
            medicacao_continua: Flagged::from_record(
                record.usa_medicacao_continua,
                record.quais_medicacoes.as_deref(),
            ),
            fumante: record.fumante,
            etilista: record.etilista,
            atividade_fisica: Flagged::from_record(record.pratica_atividade_fisica, record.qual_atividade.as_deref()),
            mobilidade: record.mobilidade,
            observacoes: opt(&record.observacoes),
            ativo: record.ativo,
            extra: record.extra.clone(),
        }
    }

    fn validate(&self) -> Result<PatientPayload, ValidationErrors> {
        let mut v = Validator::new();

        let tipo_sanguineo = crate::validation::optional_text(&self.tipo_sanguineo);
        if let Some(blood) = &tipo_sanguineo {
            if !BLOOD_TYPES.contains(&blood.as_str()) {
                v.error("tipo_sanguineo", "Tipo sanguíneo inválido");
            }
        }

        let convenio = v.optional_text("convenio", &self.convenio, 100);
        let numero_carteirinha = if convenio.is_some() {
            Some(v.required_text("numero_carteirinha", &self.numero_carteirinha, 50))
        } else {
            v.optional_text("numero_carteirinha", &self.numero_carteirinha, 50)
        };

        let (possui_diabetes, tipo_diabetes) = self.diabetes.validate(&mut v, "tipo_diabetes", 20);
        if let Some(kind) = &tipo_diabetes {
            if !kind.is_empty() && !DIABETES_TYPES.contains(&kind.as_str()) {
                v.error("tipo_diabetes", "Informe tipo 1, tipo 2 ou gestacional");
            }
        }
        let (possui_alergia, quais_alergias) = self.alergia.validate(&mut v, "quais_alergias", 255);
        let (possui_cardiopatia, qual_cardiopatia) = self.cardiopatia.validate(&mut v, "qual_cardiopatia", 255);
        let (usa_medicacao_continua, quais_medicacoes) =
            self.medicacao_continua.validate(&mut v, "quais_medicacoes", 500);
        let (pratica_atividade_fisica, qual_atividade) =
            self.atividade_fisica.validate(&mut v, "qual_atividade", 100);

        let payload = PatientPayload {
            nome: v.required_text("nome", &self.nome, 150),
            cpf: v.cpf("cpf", &self.cpf),
            rg: v.optional_text("rg", &self.rg, 20),
            data_nascimento: v.optional_date("data_nascimento", &self.data_nascimento),
            sexo: self.sexo,
            estado_civil: v.optional_text("estado_civil", &self.estado_civil, 30),
            telefone: v.phone("telefone", &self.telefone),
            telefone_emergencia: v.phone("telefone_emergencia", &self.telefone_emergencia),
            contato_emergencia: v.optional_text("contato_emergencia", &self.contato_emergencia, 150),
            email: v.email("email", &self.email),
            cep: v.cep("cep", &self.cep),
            endereco: v.optional_text("endereco", &self.endereco, 255),
            numero: v.optional_text("numero", &self.numero, 10),
            bairro: v.optional_text("bairro", &self.bairro, 100),
            cidade: v.optional_text("cidade", &self.cidade, 100),
            uf: v.uf("uf", &self.uf),
            convenio,
            numero_carteirinha,
            tipo_sanguineo,
            peso: v
                .number_in_range::<f64>("peso", &self.peso, 0.5, 400.0)
                .map(|kg| format!("{kg:.1}")),
            altura: v
                .number_in_range::<f64>("altura", &self.altura, 0.3, 2.5)
                .map(|m| format!("{m:.2}")),
            possui_alergia,
            quais_alergias,
            possui_diabetes,
            tipo_diabetes,
            hipertenso: self.hipertenso,
            possui_cardiopatia,
            qual_cardiopatia,
            usa_medicacao_continua,
            quais_medicacoes,
            fumante: self.fumante,
            etilista: self.etilista,
            pratica_atividade_fisica,
            qual_atividade,
            mobilidade: self.mobilidade,
            observacoes: v.optional_text("observacoes", &self.observacoes, 2000),
            ativo: self.ativo,
            extra: self.extra.clone(),
        };
        v.finish(payload)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VitalSignsForm {
    pub paciente: String,
    pub data_hora: String,
    pub pressao_sistolica: String,
    pub pressao_diastolica: String,
    pub frequencia_cardiaca: String,
    pub frequencia_respiratoria: String,
    pub temperatura: String,
    pub saturacao: String,
    pub glicemia: String,
    pub observacoes: String,
}

impl Form for VitalSignsForm {
    type Resource = VitalSigns;

    const FIELDS: &'static [&'static str] = &[
        "paciente",
        "data_hora",
        "pressao_sistolica",
        "pressao_diastolica",
        "frequencia_cardiaca",
        "frequencia_respiratoria",
        "temperatura",
        "saturacao",
        "glicemia",
        "observacoes",
    ];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        let numeric = || format::digits(value);
        match field {
            "paciente" => self.paciente = value.trim().to_string(),
            "data_hora" => self.data_hora = value.trim().to_string(),
            "pressao_sistolica" => self.pressao_sistolica = numeric(),
            "pressao_diastolica" => self.pressao_diastolica = numeric(),
            "frequencia_cardiaca" => self.frequencia_cardiaca = numeric(),
            "frequencia_respiratoria" => self.frequencia_respiratoria = numeric(),
            "temperatura" => self.temperatura = value.trim().replace(',', "."),
            "saturacao" => self.saturacao = numeric(),
            "glicemia" => self.glicemia = numeric(),
            "observacoes" => self.observacoes = value.to_string(),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &VitalSigns) -> Self {
        let text = |n: Option<u16>| n.map(|n| n.to_string()).unwrap_or_default();
        Self {
            paciente: record.paciente.to_string(),
            data_hora: record.data_hora.format("%d/%m/%Y %H:%M").to_string(),
            pressao_sistolica: text(record.pressao_sistolica),
            pressao_diastolica: text(record.pressao_diastolica),
            frequencia_cardiaca: text(record.frequencia_cardiaca),
            frequencia_respiratoria: text(record.frequencia_respiratoria),
            temperatura: record.temperatura.clone().unwrap_or_default(),
            saturacao: record.saturacao.map(|n| n.to_string()).unwrap_or_default(),
            glicemia: text(record.glicemia),
            observacoes: record.observacoes.clone().unwrap_or_default(),
        }
    }

    fn validate(&self) -> Result<VitalSignsPayload, ValidationErrors> {
        let mut v = Validator::new();
        let paciente = v.required_id("paciente", &self.paciente);

        let data_hora = if v.required("data_hora", &self.data_hora).is_empty() {
            None
        } else {
            let parsed = format::parse_datetime(&self.data_hora);
            if parsed.is_none() {
                v.error("data_hora", "Data/hora inválida");
            }
            parsed
        };

        let sistolica = v.number_in_range::<u16>("pressao_sistolica", &self.pressao_sistolica, 50, 300);
        let diastolica = v.number_in_range::<u16>("pressao_diastolica", &self.pressao_diastolica, 30, 200);
        let sys_typed = !self.pressao_sistolica.trim().is_empty();
        let dia_typed = !self.pressao_diastolica.trim().is_empty();
        if sys_typed && !dia_typed {
            v.error("pressao_diastolica", "Informe as duas medidas da pressão");
        } else if dia_typed && !sys_typed {
            v.error("pressao_sistolica", "Informe as duas medidas da pressão");
        }

        let payload = VitalSignsPayload {
            paciente,
            data_hora: data_hora.unwrap_or_default(),
            pressao_sistolica: sistolica,
            pressao_diastolica: diastolica,
            frequencia_cardiaca: v.number_in_range::<u16>("frequencia_cardiaca", &self.frequencia_cardiaca, 20, 250),
            frequencia_respiratoria: v.number_in_range::<u16>(
                "frequencia_respiratoria",
                &self.frequencia_respiratoria,
                5,
                80,
            ),
            temperatura: v
                .number_in_range::<f64>("temperatura", &self.temperatura, 30.0, 45.0)
                .map(|t| format!("{t:.1}")),
            saturacao: v.number_in_range::<u8>("saturacao", &self.saturacao, 50, 100),
            glicemia: v.number_in_range::<u16>("glicemia", &self.glicemia, 20, 800),
            observacoes: v.optional_text("observacoes", &self.observacoes, 500),
        };
        v.finish(payload)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientNoteForm {
    pub paciente: String,
    pub titulo: String,
    pub conteudo: String,
    pub data: String,
}

impl Form for PatientNoteForm {
    type Resource = PatientNote;

    const FIELDS: &'static [&'static str] = &["paciente", "titulo", "conteudo", "data"];

    fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "paciente" => self.paciente = value.trim().to_string(),
            "titulo" => self.titulo = value.to_string(),
            "conteudo" => self.conteudo = value.to_string(),
            "data" => {
                self.data = if value.contains('-') {
                    value.trim().to_string()
                } else {
                    format::format_date_input(value)
                }
            }
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    fn seed(record: &PatientNote) -> Self {
        Self {
            paciente: record.paciente.to_string(),
            titulo: record.titulo.clone(),
            conteudo: record.conteudo.clone(),
            data: format::format_date(record.data),
        }
    }

    fn validate(&self) -> Result<PatientNotePayload, ValidationErrors> {
        let mut v = Validator::new();
        let payload = PatientNotePayload {
            paciente: v.required_id("paciente", &self.paciente),
            titulo: v.required_text("titulo", &self.titulo, 120),
            conteudo: v.required_text("conteudo", &self.conteudo, 5000),
            data: v.required_date("data", &self.data).unwrap_or_default(),
        };
        v.finish(payload)
    }
}
