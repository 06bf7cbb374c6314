use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format;
use crate::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: i64,
    pub nome: String,
    #[serde(default)]
    pub principio_ativo: Option<String>,
    #[serde(default)]
    pub dosagem: Option<String>,
    #[serde(default)]
    pub forma_farmaceutica: Option<String>,
    #[serde(default)]
    pub fabricante: Option<String>,
    #[serde(default)]
    pub estoque: u32,
    #[serde(default)]
    pub controlado: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationPayload {
    pub nome: String,
    pub principio_ativo: Option<String>,
    pub dosagem: Option<String>,
    pub forma_farmaceutica: Option<String>,
    pub fabricante: Option<String>,
    pub estoque: u32,
    pub controlado: bool,
}

impl Resource for Medication {
    const COLLECTION: &'static str = "medicamentos";
    const DETAIL: &'static str = "medicamento";
    const LABEL: &'static str = "Medicamento";
    type Payload = MedicationPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        match &self.dosagem {
            Some(dose) => format!("{} {dose}", self.nome),
            None => self.nome.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl Sex {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "M" | "MASCULINO" => Some(Sex::Male),
            "F" | "FEMININO" => Some(Sex::Female),
            "O" | "OUTRO" => Some(Sex::Other),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mobility {
    Independente,
    Parcial,
    Dependente,
}

impl Mobility {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "independente" => Some(Mobility::Independente),
            "parcial" => Some(Mobility::Parcial),
            "dependente" => Some(Mobility::Dependente),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Mobility::Independente => "independente",
            Mobility::Parcial => "parcial",
            Mobility::Dependente => "dependente",
        }
    }
}

fn default_true() -> bool {
    true
}

/// Patient record as stored by the API. Almost everything is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Patient {
    pub id: i64,
    pub nome: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub sexo: Option<Sex>,
    pub estado_civil: Option<String>,
    pub telefone: Option<String>,
    pub telefone_emergencia: Option<String>,
    pub contato_emergencia: Option<String>,
    pub email: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub convenio: Option<String>,
    pub numero_carteirinha: Option<String>,
    pub tipo_sanguineo: Option<String>,
    pub peso: Option<String>,
    pub altura: Option<String>,
    pub possui_alergia: bool,
    pub quais_alergias: Option<String>,
    pub possui_diabetes: bool,
    pub tipo_diabetes: Option<String>,
    pub hipertenso: bool,
    pub possui_cardiopatia: bool,
    pub qual_cardiopatia: Option<String>,
    pub usa_medicacao_continua: bool,
    pub quais_medicacoes: Option<String>,
    pub fumante: bool,
    pub etilista: bool,
    pub pratica_atividade_fisica: bool,
    pub qual_atividade: Option<String>,
    pub mobilidade: Option<Mobility>,
    pub observacoes: Option<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
    /// Clinical fields without a form input. Sent back untouched on edit.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Patient {
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.data_nascimento.map(|birth| format::age_on(birth, today))
    }
}

impl Resource for Patient {
    const COLLECTION: &'static str = "pacientes";
    const DETAIL: &'static str = "paciente";
    const LABEL: &'static str = "Paciente";
    type Payload = PatientPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.nome.clone()
    }
}

/// Flat patient body. Built only from `PatientForm`, whose conditional
/// groups guarantee every detail field is `None` when its flag is false.
/// `extra` carries the record's remaining fields so a PUT replaces nothing
/// the form does not show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientPayload {
    pub nome: String,
    pub cpf: Option<String>,
    pub rg: Option<String>,
    pub data_nascimento: Option<NaiveDate>,
    pub sexo: Option<Sex>,
    pub estado_civil: Option<String>,
    pub telefone: Option<String>,
    pub telefone_emergencia: Option<String>,
    pub contato_emergencia: Option<String>,
    pub email: Option<String>,
    pub cep: Option<String>,
    pub endereco: Option<String>,
    pub numero: Option<String>,
    pub bairro: Option<String>,
    pub cidade: Option<String>,
    pub uf: Option<String>,
    pub convenio: Option<String>,
    pub numero_carteirinha: Option<String>,
    pub tipo_sanguineo: Option<String>,
    pub peso: Option<String>,
    pub altura: Option<String>,
    pub possui_alergia: bool,
    pub quais_alergias: Option<String>,
    pub possui_diabetes: bool,
    pub tipo_diabetes: Option<String>,
    pub hipertenso: bool,
    pub possui_cardiopatia: bool,
    pub qual_cardiopatia: Option<String>,
    pub usa_medicacao_continua: bool,
    pub quais_medicacoes: Option<String>,
    pub fumante: bool,
    pub etilista: bool,
    pub pratica_atividade_fisica: bool,
    pub qual_atividade: Option<String>,
    pub mobilidade: Option<Mobility>,
    pub observacoes: Option<String>,
    pub ativo: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub id: i64,
    pub paciente: i64,
    pub data_hora: NaiveDateTime,
    #[serde(default)]
    pub pressao_sistolica: Option<u16>,
    #[serde(default)]
    pub pressao_diastolica: Option<u16>,
    #[serde(default)]
    pub frequencia_cardiaca: Option<u16>,
    #[serde(default)]
    pub frequencia_respiratoria: Option<u16>,
    #[serde(default)]
    pub temperatura: Option<String>,
    #[serde(default)]
    pub saturacao: Option<u8>,
    #[serde(default)]
    pub glicemia: Option<u16>,
    #[serde(default)]
    pub observacoes: Option<String>,
}

impl VitalSigns {
    /// Blood pressure as `120/80`, when both readings exist.
    pub fn blood_pressure(&self) -> Option<String> {
        match (self.pressao_sistolica, self.pressao_diastolica) {
            (Some(sys), Some(dia)) => Some(format!("{sys}/{dia}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSignsPayload {
    pub paciente: i64,
    pub data_hora: NaiveDateTime,
    pub pressao_sistolica: Option<u16>,
    pub pressao_diastolica: Option<u16>,
    pub frequencia_cardiaca: Option<u16>,
    pub frequencia_respiratoria: Option<u16>,
    pub temperatura: Option<String>,
    pub saturacao: Option<u8>,
    pub glicemia: Option<u16>,
    pub observacoes: Option<String>,
}

impl Resource for VitalSigns {
    const COLLECTION: &'static str = "sinais-vitais";
    const DETAIL: &'static str = "sinal-vital";
    const LABEL: &'static str = "Sinais vitais";
    type Payload = VitalSignsPayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        format!("{} {}", Self::LABEL, self.data_hora.format("%d/%m/%Y %H:%M"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientNote {
    pub id: i64,
    pub paciente: i64,
    pub titulo: String,
    pub conteudo: String,
    pub data: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientNotePayload {
    pub paciente: i64,
    pub titulo: String,
    pub conteudo: String,
    pub data: NaiveDate,
}

impl Resource for PatientNote {
    const COLLECTION: &'static str = "anotacoes";
    const DETAIL: &'static str = "anotacao";
    const LABEL: &'static str = "Anotação";
    type Payload = PatientNotePayload;

    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> String {
        self.titulo.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_patient_record_deserializes() {
        let patient: Patient = serde_json::from_str(r#"{"id":3,"nome":"Maria"}"#).unwrap();
        assert_eq!(patient.nome, "Maria");
        assert!(patient.ativo);
        assert!(!patient.possui_alergia);
        assert!(patient.data_nascimento.is_none());
        assert!(patient.extra.is_empty());
    }

    #[test]
    fn unlisted_patient_fields_are_kept() {
        let patient: Patient = serde_json::from_str(
            r#"{"id":3,"nome":"Maria","grau_dependencia":"II","usa_fralda":true,"alergia_alimentar":null}"#,
        )
        .unwrap();
        assert_eq!(patient.extra.len(), 3);
        assert_eq!(patient.extra["grau_dependencia"], "II");
        assert!(!patient.extra.contains_key("nome"));
    }

    #[test]
    fn patient_age_uses_birth_date() {
        let patient: Patient =
            serde_json::from_str(r#"{"id":3,"nome":"Maria","data_nascimento":"1950-06-15"}"#).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 14).unwrap();
        assert_eq!(patient.age_on(today), Some(73));
    }

    #[test]
    fn sex_codes_round_trip_through_parse() {
        for sex in [Sex::Male, Sex::Female, Sex::Other] {
            assert_eq!(Sex::parse(sex.code()), Some(sex));
        }
        assert_eq!(Sex::parse("feminino"), Some(Sex::Female));
        assert_eq!(Sex::parse("x"), None);
    }

    #[test]
    fn blood_pressure_needs_both_readings() {
        let vitals: VitalSigns = serde_json::from_str(
            r#"{"id":1,"paciente":2,"data_hora":"2024-05-10T08:30:00","pressao_sistolica":120}"#,
        )
        .unwrap();
        assert_eq!(vitals.blood_pressure(), None);
        let vitals = VitalSigns {
            pressao_diastolica: Some(80),
            ..vitals
        };
        assert_eq!(vitals.blood_pressure().as_deref(), Some("120/80"));
    }
}
