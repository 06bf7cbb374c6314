//! Routes, sidebar menu state and the auth gate in front of the dashboard.

use std::fmt;

use crate::auth::AuthStore;
use crate::types::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Suppliers,
    ChartAccounts,
    PaymentMethods,
    DocumentTypes,
    EntryTypes,
    Ledger,
    Patients,
    PatientIntake,
    VitalSigns,
    PatientNotes,
    Medications,
    Profile,
}

impl Route {
    pub const ALL: &'static [Route] = &[
        Route::Home,
        Route::Suppliers,
        Route::ChartAccounts,
        Route::PaymentMethods,
        Route::DocumentTypes,
        Route::EntryTypes,
        Route::Ledger,
        Route::Patients,
        Route::PatientIntake,
        Route::VitalSigns,
        Route::PatientNotes,
        Route::Medications,
        Route::Profile,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Suppliers => "/fornecedores",
            Route::ChartAccounts => "/planos-contas",
            Route::PaymentMethods => "/formas-pagamento",
            Route::DocumentTypes => "/tipos-documento",
            Route::EntryTypes => "/tipos-conta",
            Route::Ledger => "/lancamentos",
            Route::Patients => "/pacientes",
            Route::PatientIntake => "/pacientes/novo",
            Route::VitalSigns => "/sinais-vitais",
            Route::PatientNotes => "/anotacoes",
            Route::Medications => "/medicamentos",
            Route::Profile => "/perfil",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Home => "Início",
            Route::Suppliers => "Fornecedores",
            Route::ChartAccounts => "Plano de contas",
            Route::PaymentMethods => "Formas de pagamento",
            Route::DocumentTypes => "Tipos de documento",
            Route::EntryTypes => "Tipos de conta",
            Route::Ledger => "Lançamentos",
            Route::Patients => "Pacientes",
            Route::PatientIntake => "Novo paciente",
            Route::VitalSigns => "Sinais vitais",
            Route::PatientNotes => "Anotações",
            Route::Medications => "Medicamentos",
            Route::Profile => "Meu perfil",
        }
    }

    /// Exact match, ignoring a trailing slash.
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim();
        let trimmed = if trimmed.len() > 1 {
            trimmed.trim_end_matches('/')
        } else {
            trimmed
        };
        Route::ALL.iter().copied().find(|route| route.path() == trimmed)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuGroup {
    pub title: &'static str,
    pub routes: &'static [Route],
    pub expanded: bool,
}

impl MenuGroup {
    pub fn contains(&self, route: Route) -> bool {
        self.routes.contains(&route)
    }
}

const GROUPS: &[(&str, &[Route])] = &[
    (
        "Financeiro",
        &[
            Route::Ledger,
            Route::Suppliers,
            Route::ChartAccounts,
            Route::PaymentMethods,
            Route::DocumentTypes,
            Route::EntryTypes,
        ],
    ),
    (
        "Clínica",
        &[
            Route::Patients,
            Route::PatientIntake,
            Route::VitalSigns,
            Route::PatientNotes,
            Route::Medications,
        ],
    ),
    ("Conta", &[Route::Profile]),
];

/// Collapsible menu. The group holding the current route is expanded on
/// navigation; other groups keep whatever state the user left them in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sidebar {
    groups: Vec<MenuGroup>,
    current: Route,
}

impl Sidebar {
    pub fn new(current: Route) -> Self {
        let groups = GROUPS
            .iter()
            .map(|&(title, routes)| MenuGroup {
                title,
                routes,
                expanded: routes.contains(&current),
            })
            .collect();
        Self { groups, current }
    }

    pub fn groups(&self) -> &[MenuGroup] {
        &self.groups
    }

    pub fn current(&self) -> Route {
        self.current
    }

    pub fn navigate(&mut self, route: Route) {
        self.current = route;
        for group in &mut self.groups {
            if group.contains(route) {
                group.expanded = true;
            }
        }
    }

    /// Flip a group by title; returns the new state, or `None` if unknown.
    pub fn toggle(&mut self, title: &str) -> Option<bool> {
        let group = self.groups.iter_mut().find(|g| g.title == title)?;
        group.expanded = !group.expanded;
        Some(group.expanded)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for group in &self.groups {
            let marker = if group.expanded { "▾" } else { "▸" };
            out.push_str(&format!("{marker} {}\n", group.title));
            if !group.expanded {
                continue;
            }
            for route in group.routes {
                let pointer = if *route == self.current { ">" } else { " " };
                out.push_str(&format!("  {pointer} {:<22}{}\n", route.title(), route.path()));
            }
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen<'a> {
    SignIn,
    Dashboard {
        user: &'a User,
        route: Route,
        sidebar: Sidebar,
    },
}

pub struct Layout;

impl Layout {
    /// Nothing behind the layout renders without a signed-in user.
    pub fn gate(auth: &AuthStore, route: Route) -> Screen<'_> {
        match auth.current_user() {
            Some(user) if auth.token().is_some() => Screen::Dashboard {
                user,
                route,
                sidebar: Sidebar::new(route),
            },
            _ => Screen::SignIn,
        }
    }
}
