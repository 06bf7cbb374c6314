use clap::ValueEnum;
use clinica_core::Route;

/// Entities reachable from the command line, named by their collection path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EntityKind {
    #[value(name = "fornecedores")]
    Suppliers,
    #[value(name = "planos-contas")]
    ChartAccounts,
    #[value(name = "formas-pagamento")]
    PaymentMethods,
    #[value(name = "tipos-documento")]
    DocumentTypes,
    #[value(name = "tipos-conta")]
    EntryTypes,
    #[value(name = "lancamentos")]
    LedgerEntries,
    #[value(name = "medicamentos")]
    Medications,
    #[value(name = "pacientes")]
    Patients,
    #[value(name = "sinais-vitais")]
    VitalSigns,
    #[value(name = "anotacoes")]
    PatientNotes,
}

impl EntityKind {
    pub fn route(self) -> Route {
        match self {
            EntityKind::Suppliers => Route::Suppliers,
            EntityKind::ChartAccounts => Route::ChartAccounts,
            EntityKind::PaymentMethods => Route::PaymentMethods,
            EntityKind::DocumentTypes => Route::DocumentTypes,
            EntityKind::EntryTypes => Route::EntryTypes,
            EntityKind::LedgerEntries => Route::Ledger,
            EntityKind::Medications => Route::Medications,
            EntityKind::Patients => Route::Patients,
            EntityKind::VitalSigns => Route::VitalSigns,
            EntityKind::PatientNotes => Route::PatientNotes,
        }
    }
}

/// Bind `$form` to the entity's form type and evaluate `$body` with it.
macro_rules! with_form {
    ($kind:expr, $form:ident => $body:expr) => {{
        use clinica_core::forms;
        match $kind {
            $crate::entity::EntityKind::Suppliers => {
                type $form = forms::SupplierForm;
                $body
            }
            $crate::entity::EntityKind::ChartAccounts => {
                type $form = forms::ChartAccountForm;
                $body
            }
            $crate::entity::EntityKind::PaymentMethods => {
                type $form = forms::PaymentMethodForm;
                $body
            }
            $crate::entity::EntityKind::DocumentTypes => {
                type $form = forms::DocumentTypeForm;
                $body
            }
            $crate::entity::EntityKind::EntryTypes => {
                type $form = forms::EntryTypeForm;
                $body
            }
            $crate::entity::EntityKind::LedgerEntries => {
                type $form = forms::LedgerEntryForm;
                $body
            }
            $crate::entity::EntityKind::Medications => {
                type $form = forms::MedicationForm;
                $body
            }
            $crate::entity::EntityKind::Patients => {
                type $form = forms::PatientForm;
                $body
            }
            $crate::entity::EntityKind::VitalSigns => {
                type $form = forms::VitalSignsForm;
                $body
            }
            $crate::entity::EntityKind::PatientNotes => {
                type $form = forms::PatientNoteForm;
                $body
            }
        }
    }};
}

pub(crate) use with_form;
