//! Multi-step patient intake.
//!
//! The wizard is a step counter over one [`PatientForm`]. Moving forward
//! only checks the fields of the step being left, moving back never checks
//! anything, and the final submit validates the whole form.

use crate::forms::{Form, FormError, PatientForm};
use crate::types::PatientPayload;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStep {
    Identification,
    Contact,
    ClinicalHistory,
    Habits,
    Review,
}

impl IntakeStep {
    pub const ALL: &'static [IntakeStep] = &[
        IntakeStep::Identification,
        IntakeStep::Contact,
        IntakeStep::ClinicalHistory,
        IntakeStep::Habits,
        IntakeStep::Review,
    ];

    pub fn title(self) -> &'static str {
        match self {
            IntakeStep::Identification => "Identificação",
            IntakeStep::Contact => "Contato e endereço",
            IntakeStep::ClinicalHistory => "Histórico clínico",
            IntakeStep::Habits => "Hábitos e mobilidade",
            IntakeStep::Review => "Revisão",
        }
    }

    pub fn fields(self) -> &'static [&'static str] {
        match self {
            IntakeStep::Identification => &["nome", "cpf", "rg", "data_nascimento", "sexo", "estado_civil"],
            IntakeStep::Contact => &[
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
            ],
            IntakeStep::ClinicalHistory => &[
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
            ],
            IntakeStep::Habits => &[
                "fumante",
                "etilista",
                "pratica_atividade_fisica",
                "qual_atividade",
                "mobilidade",
                "observacoes",
                "ativo",
            ],
            IntakeStep::Review => &[],
        }
    }

    fn index(self) -> usize {
        IntakeStep::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    /// The step a field is entered on.
    pub fn of_field(field: &str) -> Option<IntakeStep> {
        IntakeStep::ALL.iter().copied().find(|s| s.fields().contains(&field))
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntakeWizard {
    form: PatientForm,
    step: usize,
}

impl IntakeWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> IntakeStep {
        IntakeStep::ALL[self.step.min(IntakeStep::ALL.len() - 1)]
    }

    /// 1-based position and total, for a "2 de 5" header.
    pub fn progress(&self) -> (usize, usize) {
        (self.step + 1, IntakeStep::ALL.len())
    }

    pub fn form(&self) -> &PatientForm {
        &self.form
    }

    pub fn is_review(&self) -> bool {
        self.step() == IntakeStep::Review
    }

    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        self.form.set(field, value)
    }

    /// Errors that belong to the current step, if any.
    pub fn step_errors(&self) -> ValidationErrors {
        match self.form.validate() {
            Ok(_) => ValidationErrors::default(),
            Err(errors) => errors.only(self.step().fields()),
        }
    }

    /// Advance when the current step is clean. Staying on the last step is
    /// not an error.
    pub fn next(&mut self) -> Result<IntakeStep, ValidationErrors> {
        let errors = self.step_errors();
        if !errors.is_empty() {
            tracing::debug!(step = self.step().title(), errors = errors.len(), "intake step blocked");
            return Err(errors);
        }
        if self.step + 1 < IntakeStep::ALL.len() {
            self.step += 1;
        }
        Ok(self.step())
    }

    pub fn back(&mut self) -> IntakeStep {
        self.step = self.step.saturating_sub(1);
        self.step()
    }

    /// Jump back to an earlier step, e.g. from the review screen. Jumping
    /// forward is refused.
    pub fn go_to(&mut self, step: IntakeStep) -> bool {
        if step.index() > self.step {
            return false;
        }
        self.step = step.index();
        true
    }

    /// Validate everything. On failure the wizard moves to the first step
    /// holding an error.
    pub fn submit(&mut self) -> Result<PatientPayload, ValidationErrors> {
        match self.form.validate() {
            Ok(payload) => Ok(payload),
            Err(errors) => {
                if let Some(step) = errors
                    .iter()
                    .filter_map(|e| IntakeStep::of_field(e.field))
                    .min_by_key(|step| step.index())
                {
                    self.step = step.index();
                }
                Err(errors)
            }
        }
    }
}
