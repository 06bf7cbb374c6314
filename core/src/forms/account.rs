use super::{unknown, FormError};
use crate::types::{Credentials, ProfilePayload, User};
use crate::validation::{ValidationErrors, Validator};

const MIN_PASSWORD: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<Credentials, ValidationErrors> {
        let mut v = Validator::new();
        let email = if v.required("email", &self.email).is_empty() {
            String::new()
        } else {
            v.email("email", &self.email).unwrap_or_default()
        };
        if self.password.is_empty() {
            v.error("password", crate::validation::REQUIRED);
        }
        v.finish(Credentials {
            email,
            password: self.password.clone(),
        })
    }
}

/// Profile drawer. Blank fields are left unchanged on the server; a new
/// password must be typed twice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub nome: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl ProfileForm {
    pub const FIELDS: &'static [&'static str] = &["nome", "email", "password", "password_confirm"];

    pub fn seed(user: &User) -> Self {
        Self {
            nome: user.nome.clone(),
            email: user.email.clone(),
            ..Default::default()
        }
    }

    pub fn set(&mut self, field: &str, value: &str) -> Result<(), FormError> {
        match field {
            "nome" => self.nome = value.to_string(),
            "email" => self.email = value.to_string(),
            "password" => self.password = value.to_string(),
            "password_confirm" => self.password_confirm = value.to_string(),
            _ => return Err(unknown(field)),
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<ProfilePayload, ValidationErrors> {
        let mut v = Validator::new();
        let nome = v.optional_text("nome", &self.nome, 150);
        let email = v.email("email", &self.email);
        // Not trimmed. An all-blank value leaves the password unchanged.
        let password = (!self.password.trim().is_empty()).then(|| self.password.clone());
        if let Some(password) = &password {
            if password.chars().count() < MIN_PASSWORD {
                v.error("password", format!("Mínimo de {MIN_PASSWORD} caracteres"));
            }
            if &self.password_confirm != password {
                v.error("password_confirm", "As senhas não conferem");
            }
        }
        v.finish(ProfilePayload { nome, email, password })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::REQUIRED;

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some(REQUIRED));
        assert_eq!(errors.get("password"), Some(REQUIRED));
    }

    #[test]
    fn login_checks_email_shape() {
        let errors = LoginForm::new("admin", "x").validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("E-mail inválido"));
        let creds = LoginForm::new(" admin@clinica.com ", "segredo").validate().unwrap();
        assert_eq!(creds.email, "admin@clinica.com");
    }

    #[test]
    fn profile_password_must_be_confirmed() {
        let mut form = ProfileForm::default();
        form.set("password", "segredo1").unwrap();
        form.set("password_confirm", "segredo2").unwrap();
        assert_eq!(
            form.validate().unwrap_err().get("password_confirm"),
            Some("As senhas não conferem")
        );
        form.set("password_confirm", "segredo1").unwrap();
        assert_eq!(form.validate().unwrap().password.as_deref(), Some("segredo1"));
    }

    #[test]
    fn profile_password_matches_what_login_sends() {
        let mut form = ProfileForm::default();
        form.set("password", " segredo1 ").unwrap();
        form.set("password_confirm", " segredo1 ").unwrap();
        let stored = form.validate().unwrap().password;
        let sent = LoginForm::new("ana@clinica.com", " segredo1 ").validate().unwrap().password;
        assert_eq!(stored.as_deref(), Some(sent.as_str()));

        form.set("password", "   ").unwrap();
        form.set("password_confirm", "").unwrap();
        assert_eq!(form.validate().unwrap().password, None);
    }

    #[test]
    fn profile_blank_fields_are_omitted() {
        let user = User {
            id: 1,
            nome: "Ana".to_string(),
            email: "ana@clinica.com".to_string(),
            avatar: None,
        };
        let mut form = ProfileForm::seed(&user);
        form.set("nome", "").unwrap();
        let payload = form.validate().unwrap();
        assert_eq!(payload.nome, None);
        assert_eq!(payload.email.as_deref(), Some("ana@clinica.com"));
        assert_eq!(payload.password, None);
    }
}
