mod commands;
mod entity;

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use clinica_core::{Config, Route, Session, UreqTransport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commands::FieldInput;
use entity::{with_form, EntityKind};

#[derive(Parser)]
#[command(name = "clinica")]
#[command(about = "Clinic and bookkeeping admin client")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session. The password is read from
    /// CLINICA_PASSWORD, or prompted for on stdin.
    Login {
        /// Account e-mail
        #[arg(long)]
        email: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the navigation menu for a route
    Menu {
        /// Current route, e.g. /lancamentos
        #[arg(long, default_value = "/")]
        route: String,
        /// Collapse or expand a group by title (repeatable)
        #[arg(long)]
        toggle: Vec<String>,
    },
    /// List a page of records
    List {
        entity: EntityKind,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show one record
    Show { entity: EntityKind, id: i64 },
    /// Create a record from campo=valor pairs
    Create {
        entity: EntityKind,
        /// Field value, e.g. -f nome="Farmácia Central" (repeatable)
        #[arg(short = 'f', long = "field", value_parser = commands::parse_field)]
        fields: Vec<FieldInput>,
    },
    /// Edit a record; unspecified fields keep their stored values
    Update {
        entity: EntityKind,
        id: i64,
        #[arg(short = 'f', long = "field", value_parser = commands::parse_field)]
        fields: Vec<FieldInput>,
    },
    /// Delete a record
    Delete {
        entity: EntityKind,
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// List the form fields of an entity
    Fields { entity: EntityKind },
    /// Ledger entries with names resolved and totals
    Ledger {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Register a patient through the intake wizard
    Intake {
        #[arg(short = 'f', long = "field", value_parser = commands::parse_field)]
        fields: Vec<FieldInput>,
    },
    /// Update the signed-in user's name, e-mail or password
    Profile {
        #[arg(short = 'f', long = "field", value_parser = commands::parse_field)]
        fields: Vec<FieldInput>,
    },
    /// Upload a new profile picture
    Avatar { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("clinica=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'clinica --help' for commands");
        return Ok(());
    };

    if let Commands::Fields { entity } = command {
        with_form!(entity, F => commands::fields::<F>());
        return Ok(());
    }

    let config = Config::from_env()?;
    tracing::debug!(api_url = config.api_url(), auth_file = %config.auth_file().display(), "configuration loaded");
    let mut session = Session::from_config(&config, UreqTransport::new(config.timeout()))?;

    match command {
        Commands::Login { email } => {
            let password = commands::read_password()?;
            commands::login(&mut session, &email, &password)
        }
        Commands::Logout => commands::logout(&mut session),
        Commands::Whoami => commands::whoami(&session),
        Commands::Menu { route, toggle } => {
            let route = Route::from_path(&route).ok_or_else(|| anyhow!("rota desconhecida: {route}"))?;
            commands::menu(&session, route, &toggle)
        }
        Commands::List { entity, page } => {
            with_form!(entity, F => commands::list::<F, _>(&session, entity.route(), page))
        }
        Commands::Show { entity, id } => with_form!(entity, F => commands::show::<F, _>(&session, id)),
        Commands::Create { entity, fields } => {
            with_form!(entity, F => commands::create::<F, _>(&session, &fields))
        }
        Commands::Update { entity, id, fields } => {
            with_form!(entity, F => commands::update::<F, _>(&session, id, &fields))
        }
        Commands::Delete { entity, id, yes } => {
            with_form!(entity, F => commands::delete::<F, _>(&session, id, yes))
        }
        Commands::Ledger { page } => commands::ledger(&session, page),
        Commands::Intake { fields } => commands::intake(&session, &fields),
        Commands::Profile { fields } => commands::update_profile(&mut session, &fields),
        Commands::Avatar { file } => commands::upload_avatar(&mut session, &file),
        Commands::Fields { .. } => Ok(()),
    }
}
