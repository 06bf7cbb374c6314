//! Command handlers. Each one drives the same core state the dashboard
//! screens use (`CrudPage`, forms, the ledger view, the intake wizard) and
//! prints the outcome.

use std::path::Path;

use anyhow::{anyhow, bail, Context};
use clinica_core::forms::{LoginForm, ProfileForm};
use clinica_core::table::ledger_totals;
use clinica_core::types::Patient;
use clinica_core::{
    fetch_ledger_view, render_table, ApiError, CrudPage, Form, IntakeWizard, Layout, Notice, Resource, Route,
    Screen, Session, TableRow, Transport,
};

/// A `campo=valor` pair from the command line.
pub type FieldInput = (String, String);

pub fn parse_field(raw: &str) -> Result<FieldInput, String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("esperado campo=valor, recebido {raw:?}"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("nome de campo vazio em {raw:?}"));
    }
    Ok((field.to_string(), value.to_string()))
}

fn fail_on(notice: Notice) -> anyhow::Result<()> {
    if notice.is_error() {
        bail!("{}", notice.message);
    }
    println!("{notice}");
    Ok(())
}

fn apply<F: Form>(form: &mut F, fields: &[FieldInput]) -> anyhow::Result<()> {
    for (field, value) in fields {
        form.set(field, value)?;
    }
    Ok(())
}

/// Fetch one record and put it on a fresh page, the way opening a detail
/// route does.
fn page_with<R, T>(session: &Session<T>, id: i64) -> anyhow::Result<CrudPage<R>>
where
    R: Resource,
    T: Transport,
{
    let record = session
        .get::<R>(id)
        .map_err(|err| anyhow!("{}: {}", R::fallback_name(id), err.user_message()))?;
    let mut page = CrudPage::new();
    page.track(record);
    Ok(page)
}

// -- account ---------------------------------------------------------------

pub const PASSWORD_VAR: &str = "CLINICA_PASSWORD";

/// Password from `CLINICA_PASSWORD`, else one line of stdin. Never argv.
pub fn read_password() -> anyhow::Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_VAR) {
        return Ok(password);
    }
    read_answer("Senha: ")
}

pub fn login<T: Transport>(session: &mut Session<T>, email: &str, password: &str) -> anyhow::Result<()> {
    let credentials = LoginForm::new(email, password).validate()?;
    let user = session.login(&credentials).map_err(|err| match err {
        ApiError::Unauthorized(_) => anyhow!("Falha no login: e-mail ou senha inválidos."),
        other => anyhow!("Falha no login: {}", other.user_message()),
    })?;
    println!("{}", Notice::success(format!("Bem-vindo(a), {}.", user.nome)));
    Ok(())
}

pub fn logout<T: Transport>(session: &mut Session<T>) -> anyhow::Result<()> {
    session.logout()?;
    println!("{}", Notice::success("Sessão encerrada."));
    Ok(())
}

pub fn whoami<T: Transport>(session: &Session<T>) -> anyhow::Result<()> {
    match session.current_user() {
        Some(user) => {
            println!("{} <{}>", user.nome, user.email);
            if let Some(avatar) = &user.avatar {
                println!("avatar: {avatar}");
            }
        }
        None => println!("Nenhum usuário conectado."),
    }
    Ok(())
}

pub fn update_profile<T: Transport>(session: &mut Session<T>, fields: &[FieldInput]) -> anyhow::Result<()> {
    let user = session
        .current_user()
        .cloned()
        .ok_or_else(|| anyhow!("Faça login para editar o perfil."))?;
    let mut form = ProfileForm::seed(&user);
    for (field, value) in fields {
        form.set(field, value)?;
    }
    let payload = form.validate()?;
    let user = session
        .update_profile(&payload)
        .map_err(|err| anyhow!("Erro ao salvar: {}", err.user_message()))?;
    println!("{}", Notice::success(format!("Perfil atualizado: {}.", user.nome)));
    Ok(())
}

fn image_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        _ => "application/octet-stream",
    }
}

pub fn upload_avatar<T: Transport>(session: &mut Session<T>, path: &Path) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("lendo {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("nome de arquivo inválido: {}", path.display()))?;
    let user = session
        .upload_avatar(file_name, image_content_type(path), bytes)
        .map_err(|err| anyhow!("Erro ao enviar foto: {}", err.user_message()))?;
    println!(
        "{}",
        Notice::success(format!("Foto atualizada: {}", user.avatar.unwrap_or_default()))
    );
    Ok(())
}

// -- navigation ------------------------------------------------------------

pub fn menu<T: Transport>(session: &Session<T>, route: Route, toggles: &[String]) -> anyhow::Result<()> {
    match Layout::gate(session.auth(), route) {
        Screen::SignIn => println!("Faça login para continuar."),
        Screen::Dashboard {
            user,
            route,
            mut sidebar,
        } => {
            for title in toggles {
                if sidebar.toggle(title).is_none() {
                    bail!("grupo desconhecido: {title}");
                }
            }
            println!("{}  ·  {}", route.title(), user.nome);
            print!("{}", sidebar.render());
        }
    }
    Ok(())
}

// -- generic CRUD ------------------------------------------------------------

pub fn list<F, T>(session: &Session<T>, route: Route, page: u32) -> anyhow::Result<()>
where
    F: Form,
    F::Resource: TableRow,
    T: Transport,
{
    let mut screen = CrudPage::<F::Resource>::new();
    let requested = screen.begin_load(page);
    if let Some(notice) = screen.finish_load(session.list(Some(requested).filter(|p| *p > 1))) {
        bail!("{}", notice.message);
    }
    println!("{}", route.title());
    print!("{}", render_table(screen.items()));
    println!("{} registro(s), página {}", screen.count(), screen.page());
    Ok(())
}

pub fn show<F, T>(session: &Session<T>, id: i64) -> anyhow::Result<()>
where
    F: Form,
    F::Resource: TableRow,
    T: Transport,
{
    let mut screen = page_with::<F::Resource, T>(session, id)?;
    let record = screen
        .open_view(id)
        .ok_or_else(|| anyhow!("{} não encontrado.", <F::Resource as Resource>::fallback_name(id)))?;
    println!("{}", record.display_name());
    print!("{}", render_table(std::slice::from_ref(record)));
    Ok(())
}

pub fn create<F, T>(session: &Session<T>, fields: &[FieldInput]) -> anyhow::Result<()>
where
    F: Form,
    T: Transport,
{
    let mut form = F::default();
    apply(&mut form, fields)?;
    let payload = form.validate()?;

    let mut screen = CrudPage::<F::Resource>::new();
    screen.open_create();
    if screen.begin_submit().is_none() {
        bail!("envio já em andamento");
    }
    let notice = screen.finish_submit(session.create::<F::Resource>(&payload));
    fail_on(notice)?;
    if let Some(record) = screen.items().first() {
        println!("id: {}", record.id());
    }
    Ok(())
}

/// Edit drawer: seed from the stored record, apply the changes, save.
pub fn update<F, T>(session: &Session<T>, id: i64, fields: &[FieldInput]) -> anyhow::Result<()>
where
    F: Form,
    T: Transport,
{
    let mut screen = page_with::<F::Resource, T>(session, id)?;
    let record = screen
        .open_edit(id)
        .ok_or_else(|| anyhow!("{} não encontrado.", <F::Resource as Resource>::fallback_name(id)))?;
    let mut form = F::seed(record);
    apply(&mut form, fields)?;
    let payload = form.validate()?;

    if screen.begin_submit().is_none() {
        bail!("envio já em andamento");
    }
    let notice = screen.finish_submit(session.update::<F::Resource>(id, &payload));
    fail_on(notice)
}

pub fn delete<F, T>(session: &Session<T>, id: i64, confirmed: bool) -> anyhow::Result<()>
where
    F: Form,
    T: Transport,
{
    let mut screen = page_with::<F::Resource, T>(session, id)?;
    screen.request_delete(id);
    let name = screen.find(id).map(Resource::display_name).unwrap_or_default();
    if !confirmed && !confirm(&format!("Excluir {name}?"))? {
        screen.cancel_delete();
        println!("Exclusão cancelada.");
        return Ok(());
    }
    let target = screen
        .begin_delete()
        .ok_or_else(|| anyhow!("nenhuma exclusão pendente"))?;
    let notice = screen.finish_delete(session.delete::<F::Resource>(target));
    fail_on(notice)
}

fn read_answer(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;

    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = read_answer(&format!("{question} [s/N] "))?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}

pub fn fields<F: Form>() {
    for field in F::FIELDS {
        println!("{field}");
    }
}

// -- ledger ----------------------------------------------------------------

pub fn ledger<T: Transport + Sync>(session: &Session<T>, page: u32) -> anyhow::Result<()> {
    let view = fetch_ledger_view(session, Some(page).filter(|p| *p > 1))
        .map_err(|err| anyhow!("Erro ao carregar lançamentos: {}", err.user_message()))?;
    println!("{}", Route::Ledger.title());
    print!("{}", render_table(&view.rows));
    println!("{} registro(s), página {}", view.count, page.max(1));
    println!("{}", ledger_totals(view.total_pending, view.total_paid));
    Ok(())
}

// -- intake ----------------------------------------------------------------

/// Walk the intake wizard step by step, stopping at the first step with
/// errors, then save the patient.
pub fn intake<T: Transport>(session: &Session<T>, fields: &[FieldInput]) -> anyhow::Result<()> {
    let mut wizard = IntakeWizard::new();
    for (field, value) in fields {
        wizard.set(field, value)?;
    }

    while !wizard.is_review() {
        let (position, total) = wizard.progress();
        let title = wizard.step().title();
        if let Err(errors) = wizard.next() {
            bail!("[{position}/{total}] {title}\n{errors}");
        }
        println!("[{position}/{total}] {title} ✓");
    }

    let payload = wizard.submit()?;
    let mut screen = CrudPage::<Patient>::new();
    screen.open_create();
    screen.begin_submit();
    fail_on(screen.finish_submit(session.create::<Patient>(&payload)))?;
    if let Some(patient) = screen.items().first() {
        println!("id: {}", patient.id);
    }
    Ok(())
}
