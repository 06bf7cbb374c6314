//! Drive the `clinica` binary against the live mock server.
//!
//! Each test gets its own server on a random port and its own auth file, so
//! the stored session carries over between invocations exactly as it does
//! for a user at a terminal.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

struct Env {
    api_url: String,
    auth_file: PathBuf,
    _dir: tempfile::TempDir,
}

impl Env {
    fn start() -> Self {
        let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = std_listener.local_addr().unwrap();
        std_listener.set_nonblocking(true).unwrap();

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async {
                let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
                mock_server::run(listener).await
            })
            .unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        Self {
            api_url: format!("http://{addr}/api"),
            auth_file: dir.path().join("auth.json"),
            _dir: dir,
        }
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_clinica"));
        command
            .args(args)
            .env("CLINICA_API_URL", &self.api_url)
            .env("CLINICA_AUTH_FILE", &self.auth_file)
            .env("RUST_LOG", "off")
            .env_remove("CLINICA_PASSWORD");
        command
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command(args).output().unwrap()
    }

    /// Run with `input` piped to stdin.
    fn run_with_input(&self, args: &[&str], input: &str) -> Output {
        let mut child = self
            .command(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .unwrap();
        child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
        child.wait_with_output().unwrap()
    }

    /// Run and require success; returns stdout.
    fn ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "{args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    /// Run and require failure; returns stderr.
    fn err(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(!output.status.success(), "{args:?} unexpectedly succeeded");
        String::from_utf8(output.stderr).unwrap()
    }

    fn login(&self) {
        let output = self
            .command(&["login", "--email", mock_server::ADMIN_EMAIL])
            .env("CLINICA_PASSWORD", mock_server::ADMIN_PASSWORD)
            .output()
            .unwrap();
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    }
}

fn created_id(stdout: &str) -> String {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("id: "))
        .unwrap()
        .to_string()
}

#[test]
fn session_persists_between_invocations() {
    let env = Env::start();
    assert!(env.ok(&["whoami"]).contains("Nenhum usuário"));
    assert!(env.ok(&["menu"]).contains("Faça login"));

    env.login();
    assert!(env.ok(&["whoami"]).contains(mock_server::ADMIN_EMAIL));

    let menu = env.ok(&["menu", "--route", "/lancamentos"]);
    assert!(menu.contains("▾ Financeiro"));
    assert!(menu.contains("▸ Clínica"));
    assert!(menu.contains("> Lançamentos"));

    env.ok(&["logout"]);
    assert!(env.ok(&["whoami"]).contains("Nenhum usuário"));
    assert!(env.err(&["list", "fornecedores"]).contains("Sessão expirada"));
}

#[test]
fn password_is_prompted_on_stdin() {
    let env = Env::start();
    let output = env.run_with_input(&["login", "--email", mock_server::ADMIN_EMAIL], "errada\n");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Senha:"));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Falha no login"));

    let input = format!("{}\n", mock_server::ADMIN_PASSWORD);
    let output = env.run_with_input(&["login", "--email", mock_server::ADMIN_EMAIL], &input);
    assert!(output.status.success());
    assert!(env.ok(&["whoami"]).contains(mock_server::ADMIN_EMAIL));
}

#[test]
fn password_flag_is_not_accepted() {
    let env = Env::start();
    let stderr = env.err(&["login", "--email", mock_server::ADMIN_EMAIL, "--password", "admin123"]);
    assert!(stderr.contains("--password"));
}

#[test]
fn supplier_crud_through_the_cli() {
    let env = Env::start();
    env.login();

    let out = env.ok(&[
        "create",
        "fornecedores",
        "-f",
        "nome=Farmácia Central",
        "-f",
        "cnpj_cpf=12345678000190",
        "-f",
        "telefone=1134567890",
    ]);
    assert!(out.contains("Fornecedor: cadastro realizado com sucesso."));
    let id = created_id(&out);

    let listed = env.ok(&["list", "fornecedores"]);
    assert!(listed.contains("12.345.678/0001-90"));
    assert!(listed.contains("(11) 3456-7890"));
    assert!(listed.contains("1 registro(s)"));

    let out = env.ok(&["update", "fornecedores", &id, "-f", "nome=Farmácia Central Ltda"]);
    assert!(out.contains("alterações salvas"));
    let shown = env.ok(&["show", "fornecedores", &id]);
    assert!(shown.starts_with("Farmácia Central Ltda"));
    assert!(shown.contains("12.345.678/0001-90"));

    assert!(env.ok(&["delete", "fornecedores", &id, "--yes"]).contains("registro excluído"));
    assert!(env.ok(&["list", "fornecedores"]).contains("0 registro(s)"));
    assert!(env.err(&["show", "fornecedores", &id]).contains("Fornecedor #"));
}

#[test]
fn invalid_form_is_not_submitted() {
    let env = Env::start();
    env.login();

    let stderr = env.err(&["create", "fornecedores", "-f", "cnpj_cpf=123"]);
    assert!(stderr.contains("nome"));
    assert!(env.ok(&["list", "fornecedores"]).contains("0 registro(s)"));

    assert!(env.err(&["create", "fornecedores", "-f", "cor=azul"]).contains("campo desconhecido"));
}

#[test]
fn ledger_shows_names_and_totals() {
    let env = Env::start();
    env.login();

    let supplier = created_id(&env.ok(&[
        "create",
        "fornecedores",
        "-f",
        "nome=Distribuidora Vida",
        "-f",
        "cnpj_cpf=12345678901",
    ]));
    let entry_type = created_id(&env.ok(&["create", "tipos-conta", "-f", "nome=A pagar"]));
    let document = created_id(&env.ok(&["create", "tipos-documento", "-f", "nome=Nota fiscal"]));
    let method = created_id(&env.ok(&["create", "formas-pagamento", "-f", "nome=Boleto"]));
    let root = created_id(&env.ok(&[
        "create",
        "planos-contas",
        "-f",
        "codigo=2",
        "-f",
        "nome=Passivo",
        "-f",
        "tipo=sintetica",
    ]));
    let account = created_id(&env.ok(&[
        "create",
        "planos-contas",
        "-f",
        "codigo=20101",
        "-f",
        "nome=Fornecedores",
        "-f",
        "tipo=analitica",
        "-f",
        &format!("conta_pai={root}"),
    ]));

    env.ok(&[
        "create",
        "lancamentos",
        "-f",
        &format!("fornecedor={supplier}"),
        "-f",
        &format!("tipo_conta={entry_type}"),
        "-f",
        &format!("tipo_documento={document}"),
        "-f",
        &format!("plano_conta={account}"),
        "-f",
        &format!("forma_pagamento={method}"),
        "-f",
        "data_vencimento=10032024",
        "-f",
        "valor=123450",
    ]);

    let ledger = env.ok(&["ledger"]);
    assert!(ledger.contains("Distribuidora Vida"));
    assert!(ledger.contains("2.01.01 - Fornecedores"));
    assert!(ledger.contains("10/03/2024"));
    assert!(ledger.contains("Pendente: R$ 1.234,50  Pago: R$ 0,00"));

    env.ok(&["delete", "fornecedores", &supplier, "--yes"]);
    let ledger = env.ok(&["ledger"]);
    assert!(ledger.contains(&format!("Fornecedor #{supplier}")));
    assert!(ledger.contains("Boleto"));
}

#[test]
fn intake_stops_at_the_first_incomplete_step() {
    let env = Env::start();
    env.login();

    let stderr = env.err(&["intake", "-f", "cpf=12345678901"]);
    assert!(stderr.contains("[1/5]"));
    assert!(stderr.contains("nome"));

    let out = env.ok(&["intake", "-f", "nome=Maria das Dores", "-f", "data_nascimento=15071942"]);
    assert!(out.contains("[1/5]"));
    assert!(out.contains("Paciente: cadastro realizado com sucesso."));
    assert!(env.ok(&["list", "pacientes"]).contains("Maria das Dores"));
}

#[test]
fn profile_and_avatar() {
    let env = Env::start();
    env.login();

    assert!(env.ok(&["profile", "-f", "nome=Dra. Ana"]).contains("Perfil atualizado: Dra. Ana."));
    assert!(env.ok(&["whoami"]).starts_with("Dra. Ana"));

    let picture = env.auth_file.with_file_name("eu.png");
    std::fs::write(&picture, [0x89, b'P', b'N', b'G']).unwrap();
    let out = env.ok(&["avatar", picture.to_str().unwrap()]);
    assert!(out.contains("/media/avatars/1/eu.png"));
    assert!(env.ok(&["whoami"]).contains("avatar: /media/avatars/1/eu.png"));
}

#[test]
fn fields_lists_form_inputs_without_a_server() {
    let out = Command::new(env!("CARGO_BIN_EXE_clinica"))
        .args(["fields", "formas-pagamento"])
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), "nome\ndescricao\n");
}
