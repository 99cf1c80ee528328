use std::fmt::Display;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};
use yansi::Paint;

use devportal::api::{self, get_application, get_service_package, load_registrations};
use devportal::catalog::{CatalogViewModel, PageDirection, QueryOutcome, QueryTicket, ViewMode};
use devportal::config::PortalConfig;
use devportal::models::{ApplicationDraft, OneTimeSecret};
use devportal::render;
use devportal::services::{
    ApplicationList, CredentialManager, PortalSession, RegistrationState, RegistrationWorkflow,
};

#[derive(Parser)]
#[command(
    name = "devportal",
    author,
    version,
    about = "Developer portal command-line client",
    long_about = r#"Browse a developer portal's service catalog and manage your applications, credentials and service registrations.

Configuration is read from the environment or a .env file:
  PORTAL_API_URL       portal API base URL (default http://localhost:8080/portal_api)
  PORTAL_TOKEN         bearer token of the signed-in developer
  CATALOG_PAGE_SIZE    catalog page size (default 12)
  PORTAL_TIMEOUT_SECS  request timeout in seconds (default 30)

Examples:
  devportal catalog list --text bar --view table
  devportal catalog browse
  devportal apps create "My App" --generate-reference-id
  devportal apps register --service-package <id> --app <application-id>
"#,
    after_help = "Use `devportal <subcommand> --help` to get subcommand specific options."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Disable colorized output
    #[arg(long, global = true)]
    no_color: bool,
    /// Disable request logging
    #[arg(long, global = true)]
    silent: bool,
    /// Path to .env file
    #[arg(long, global = true)]
    env_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration and portal connectivity
    CheckConfig,
    /// Search and browse the service catalog
    Catalog {
        #[command(subcommand)]
        sub: CatalogCommands,
    },
    /// Manage your applications
    Apps {
        #[command(subcommand)]
        sub: AppCommands,
    },
    /// Manage key-auth credentials of an application
    Credentials {
        #[command(subcommand)]
        sub: CredentialCommands,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Print one page of search results
    List {
        /// Search text; empty lists the whole catalog
        #[arg(long, default_value = "")]
        text: String,
        /// Page number (1-indexed)
        #[arg(long, short = 'p', default_value_t = 1)]
        page: u64,
        /// card or table
        #[arg(long, default_value = "card")]
        view: String,
    },
    /// Interactive browsing: /text to search, n/p/f/l to page, v to switch view, r to retry, q to quit
    Browse {
        #[arg(long, default_value = "")]
        text: String,
        #[arg(long, default_value = "card")]
        view: String,
    },
}

#[derive(Subcommand)]
enum AppCommands {
    List,
    /// Show an application with its registrations
    Show { application_id: String },
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        reference_id: Option<String>,
        /// Generate a random reference id when none is given
        #[arg(long)]
        generate_reference_id: bool,
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    Update {
        application_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        reference_id: Option<String>,
        #[arg(long)]
        redirect_uri: Option<String>,
    },
    Delete { application_id: String },
    /// Issue a new client secret (DCR portals only)
    RefreshSecret { application_id: String },
    /// Register an application for a service version
    Register {
        #[arg(long)]
        service_package: String,
        /// Version id or name; defaults to the most recent version
        #[arg(long)]
        version: Option<String>,
        /// Application to register; defaults to the first eligible one
        #[arg(long)]
        app: Option<String>,
        /// Create this application first when none is eligible
        #[arg(long)]
        create: Option<String>,
    },
}

#[derive(Subcommand)]
enum CredentialCommands {
    List { application_id: String },
    Create { application_id: String, display_name: String },
    Rename { application_id: String, credential_id: String, display_name: String },
    Revoke { application_id: String, credential_id: String },
}

fn fail(context: &str, err: impl Display) -> ! {
    tracing::error!(%err, "{}", context);
    eprintln!("{}: {}", context.red(), err);
    process::exit(1);
}

/// A spinner while waiting on the portal. Hidden when requests are being
/// logged, the curl lines already show progress.
fn spinner(message: &str) -> ProgressBar {
    if !api::is_silent() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn parse_view(view: &str) -> ViewMode {
    ViewMode::from_str(view).unwrap_or_else(|| fail("Invalid view", format!("{} (expected card or table)", view)))
}

async fn start_session(env_file: Option<&str>) -> PortalSession {
    let config = PortalConfig::from_env(env_file);
    let pb = spinner("Connecting to portal");
    let session = PortalSession::start(config).await;
    pb.finish_and_clear();
    session.unwrap_or_else(|e| fail("Failed to reach portal", e))
}

async fn run_ticket(vm: &mut CatalogViewModel, session: &PortalSession, ticket: QueryTicket) -> QueryOutcome {
    let pb = spinner("Loading services");
    let outcome = vm.run(&session.client, ticket).await;
    pb.finish_and_clear();
    render::print_notices(&vm.take_notices());
    outcome
}

fn print_catalog(vm: &CatalogViewModel) {
    println!("\n{}", render::catalog_page(vm.page(), vm.view_mode()));
    if let Some(range) = render::range_line(vm.pagination()) {
        println!("{}", range.as_str().cyan());
    }
}

async fn catalog_list(session: &PortalSession, text: &str, page: u64, view: ViewMode) {
    let mut vm = session.catalog().with_view_mode(view);
    let ticket = vm.submit_query(text);
    if run_ticket(&mut vm, session, ticket).await == QueryOutcome::Failed {
        process::exit(1);
    }
    if page > 1 {
        match vm.jump_to_page(page - 1) {
            Some(ticket) => {
                if run_ticket(&mut vm, session, ticket).await == QueryOutcome::Failed {
                    process::exit(1);
                }
            }
            None => fail("Invalid page", format!("{} is past the last page", page)),
        }
    }
    print_catalog(&vm);
}

async fn catalog_browse(session: &PortalSession, text: &str, view: ViewMode) {
    let mut vm = session.catalog().with_view_mode(view);
    let ticket = vm.submit_query(text);
    run_ticket(&mut vm, session, ticket).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        print_catalog(&vm);
        let hint = render::navigation_hint(vm.pagination());
        let toggle = if vm.can_toggle_view() { "  [v]iew" } else { "" };
        let prompt = format!("{}{}  [r]etry  /search  [q]uit > ", hint, toggle);
        if stdout.write_all(prompt.as_bytes()).await.is_err() || stdout.flush().await.is_err() {
            break;
        }
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            _ => break,
        };
        let input = line.trim();
        let ticket = if let Some(query) = input.strip_prefix('/') {
            Some(vm.submit_query(query))
        } else {
            match input {
                "n" => vm.change_page(PageDirection::Next),
                "p" => vm.change_page(PageDirection::Prev),
                "f" => vm.change_page(PageDirection::First),
                "l" => vm.change_page(PageDirection::Last),
                "v" => vm.toggle_view_mode(),
                "r" => Some(vm.refresh()),
                "q" => break,
                _ => None,
            }
        };
        if let Some(ticket) = ticket {
            run_ticket(&mut vm, session, ticket).await;
        }
    }
}

async fn load_app_list(session: &PortalSession) -> ApplicationList {
    let pb = spinner("Loading applications");
    let list = ApplicationList::load(&session.client).await;
    pb.finish_and_clear();
    list.unwrap_or_else(|e| fail("Failed to load applications", e))
}

async fn apps_command(session: &PortalSession, sub: AppCommands) {
    let client = &session.client;
    match sub {
        AppCommands::List => {
            let list = load_app_list(session).await;
            if list.applications().is_empty() {
                println!("No applications yet. Create one with `devportal apps create <name>`.");
                return;
            }
            println!("\n{}", render::applications_table(list.applications(), &session.context));
            let stale = list.incompatible(&session.context).count();
            if stale > 0 {
                println!(
                    "{}",
                    format!("{} application(s) were created under a different registration mode and can no longer access services.", stale).yellow()
                );
            }
        }
        AppCommands::Show { application_id } => {
            let mut app = get_application(client, &application_id)
                .await
                .unwrap_or_else(|e| fail("Failed to load application", e));
            if app.registrations.is_empty() {
                match load_registrations(client, &application_id).await {
                    Ok(regs) => app.registrations = regs,
                    Err(e) => tracing::warn!(error = %e, "could not load registrations"),
                }
            }
            println!("\n{}", render::application_detail(&app));
            if !app.registrations.is_empty() {
                println!("{}", render::registrations_table(&app));
            }
        }
        AppCommands::Create { name, description, reference_id, generate_reference_id, redirect_uri } => {
            let mut list = load_app_list(session).await;
            let draft = ApplicationDraft { name, description, reference_id, redirect_uri };
            let result = list.create(client, &draft, generate_reference_id).await;
            render::print_notices(&list.take_notices());
            let created = result.unwrap_or_else(|e| fail("Failed to create application", e));
            println!("{} {}", "Application id:".green(), created.id);
            if let Some(creds) = created.credentials {
                let mut manager = CredentialManager::new(created.id.clone(), vec![]);
                match manager.show_created_application_credentials(creds) {
                    Ok(secret) => render::print_secret(secret),
                    Err(e) => fail("Failed to show credentials", e),
                }
            }
        }
        AppCommands::Update { application_id, name, description, reference_id, redirect_uri } => {
            let mut list = load_app_list(session).await;
            let current = match list.find(&application_id) {
                Some(app) => ApplicationDraft::from_application(app),
                None => fail("Unknown application", &application_id),
            };
            let draft = ApplicationDraft {
                name: name.unwrap_or(current.name),
                description: description.or(current.description),
                reference_id: reference_id.or(current.reference_id),
                redirect_uri: redirect_uri.or(current.redirect_uri),
            };
            let result = list.update(client, &application_id, &draft).await.map(|app| render::application_detail(app));
            render::print_notices(&list.take_notices());
            match result {
                Ok(table) => println!("\n{}", table),
                Err(e) => fail("Failed to update application", e),
            }
        }
        AppCommands::Delete { application_id } => {
            let mut list = load_app_list(session).await;
            let result = list.delete(client, &application_id).await;
            render::print_notices(&list.take_notices());
            if let Err(e) = result {
                fail("Failed to delete application", e);
            }
            println!("{} application(s) remaining", list.applications().len());
        }
        AppCommands::RefreshSecret { application_id } => {
            let app = get_application(client, &application_id)
                .await
                .unwrap_or_else(|e| fail("Failed to load application", e));
            let mut manager = CredentialManager::new(application_id, vec![]);
            let result = manager
                .refresh_secret(client, &session.context, &app)
                .await
                .map(|secret| secret.clone());
            render::print_notices(&manager.take_notices());
            match result {
                Ok(secret) => render::print_secret(&secret),
                Err(e) => fail("Failed to refresh secret", e),
            }
        }
        AppCommands::Register { service_package, version, app, create } => {
            register(session, &service_package, version.as_deref(), app.as_deref(), create).await;
        }
    }
}

async fn register(session: &PortalSession, package_id: &str, version: Option<&str>, app: Option<&str>, create: Option<String>) {
    let client = &session.client;
    let package = get_service_package(client, package_id)
        .await
        .unwrap_or_else(|e| fail("Failed to load service package", e));
    let version = match package.find_version(version) {
        Some(v) if !v.id.is_empty() => v.clone(),
        _ => fail("Unknown version", format!("{} has no matching version", package.name)),
    };
    println!("{} {} {}", "Registering for".bold(), package.name, version.version.as_str().cyan());

    let mut workflow = RegistrationWorkflow::open(client, &version.id)
        .await
        .unwrap_or_else(|e| fail("Cannot register", e));
    for registered in workflow.registered_applications() {
        println!("{}", format!("{} is already registered for this version", registered.name).dim());
    }

    if let Some(name) = create {
        let mut list = ApplicationList::new(vec![]);
        let created = list
            .create(client, &ApplicationDraft::new(name), false)
            .await
            .unwrap_or_else(|e| fail("Failed to create application", e));
        render::print_notices(&list.take_notices());
        if let Some(creds) = created.credentials {
            render::print_secret(&OneTimeSecret::ClientCredentials(creds));
        }
        if let Err(e) = workflow.application_created(list.applications().to_vec(), &created.id) {
            fail("Cannot register", e);
        }
    }

    if workflow.only_create_available() {
        fail("No eligible application", "create one with --create <name>");
    }
    if let Some(id) = app {
        if let Err(e) = workflow.select(id) {
            fail("Cannot register", e);
        }
    }

    let result = workflow.submit(client).await.map(|state| state.clone());
    render::print_notices(&workflow.take_notices());
    match result {
        Ok(RegistrationState::Approved(_)) => {
            if let Some(app_id) = workflow.redirect_target() {
                match get_application(client, app_id).await {
                    Ok(app) => println!("\n{}", render::application_detail(&app)),
                    Err(e) => tracing::warn!(error = %e, "could not load approved application"),
                }
            }
        }
        Ok(RegistrationState::Pending(reg)) => {
            println!("{} {}", "Registration id:".dim(), reg.id);
        }
        Ok(_) => {}
        Err(e) => fail("Registration failed", e),
    }
}

async fn wait_for_enter(prompt: &str) {
    let mut stdout = tokio::io::stdout();
    let line = format!("{} ", prompt.yellow());
    if stdout.write_all(line.as_bytes()).await.is_ok() && stdout.flush().await.is_ok() {
        let _ = BufReader::new(tokio::io::stdin()).lines().next_line().await;
    }
}

async fn credentials_command(session: &PortalSession, sub: CredentialCommands) {
    let client = &session.client;
    let application_id = match &sub {
        CredentialCommands::List { application_id }
        | CredentialCommands::Create { application_id, .. }
        | CredentialCommands::Rename { application_id, .. }
        | CredentialCommands::Revoke { application_id, .. } => application_id.clone(),
    };
    let mut manager = CredentialManager::load(client, &application_id)
        .await
        .unwrap_or_else(|e| fail("Failed to load credentials", e));
    let result = match sub {
        CredentialCommands::List { .. } => Ok(()),
        CredentialCommands::Create { display_name, .. } => {
            match manager.generate(client, &display_name).await {
                Ok(secret) => {
                    render::print_secret(secret);
                    wait_for_enter("Press Enter once the key is stored safely; it will not be shown again").await;
                    manager.dismiss(client).await.map(|_| ())
                }
                Err(e) => Err(e),
            }
        }
        CredentialCommands::Rename { credential_id, display_name, .. } => {
            manager.rename(client, &credential_id, &display_name).await
        }
        CredentialCommands::Revoke { credential_id, .. } => manager.revoke(client, &credential_id).await,
    };
    render::print_notices(&manager.take_notices());
    if let Err(e) = result {
        fail("Credential operation failed", e);
    }
    if manager.credentials().is_empty() {
        println!("No credentials");
    } else {
        println!("\n{}", render::credentials_table(manager.credentials()));
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        yansi::whenever(yansi::Condition::NEVER);
    }
    if cli.silent {
        api::set_silent(true);
    }

    let session = start_session(cli.env_file.as_deref()).await;
    match cli.command {
        Commands::CheckConfig => {
            if session.config.token.is_empty() {
                println!("{}", "PORTAL_TOKEN is not set; only public catalog access will work".yellow());
            }
            let mut vm = session.catalog();
            let ticket = vm.refresh();
            match vm.run(&session.client, ticket).await {
                QueryOutcome::Updated => {
                    println!(
                        "{} ({}, {} services, {})",
                        "Configuration looks valid".green(),
                        session.client.base_url(),
                        vm.pagination().total_count(),
                        if session.context.is_dcr { "DCR portal" } else { "key-auth portal" }
                    );
                }
                _ => {
                    let err = vm.error().map(|e| e.to_string()).unwrap_or_default();
                    fail("Configuration appears invalid", err);
                }
            }
        }
        Commands::Catalog { sub } => match sub {
            CatalogCommands::List { text, page, view } => {
                catalog_list(&session, &text, page, parse_view(&view)).await;
            }
            CatalogCommands::Browse { text, view } => {
                catalog_browse(&session, &text, parse_view(&view)).await;
            }
        },
        Commands::Apps { sub } => apps_command(&session, sub).await,
        Commands::Credentials { sub } => credentials_command(&session, sub).await,
    }
}
