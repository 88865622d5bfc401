use anyhow::Context;
use clap::{Parser, Subcommand};
use coursehub_backend_api::{build_router, AppState};
use coursehub_backend_runtime::{seed, shutdown_signal, telemetry, BackendServices};
use coursehub_config::load as load_config;
use coursehub_database::UserRole;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "coursehub-backend")]
#[command(about = "CourseHub course marketplace backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Insert the sample course catalog when no courses exist yet
    SeedCatalog,
    /// Create an additional administrator account
    CreateAdmin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "Admin User")]
        name: String,
    },
    /// Print every account with its role
    ListUsers,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(services, &config.http).await,
        Commands::SeedCatalog => seed_catalog(&services).await,
        Commands::CreateAdmin {
            email,
            password,
            name,
        } => create_admin(&services, &email, &password, &name).await,
        Commands::ListUsers => list_users(&services).await,
    }
}

async fn run_server(
    services: BackendServices,
    http: &coursehub_config::HttpConfig,
) -> anyhow::Result<()> {
    info!("starting CourseHub backend");

    let state = AppState::new(
        services.db_pool.clone(),
        services.authenticator.clone(),
        services.gateway.clone(),
        services.webhook.clone(),
    );
    let app = build_router(state);

    let address = format!("{}:{}", http.address, http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    services.db_pool.close().await;
    info!("backend shut down");
    Ok(())
}

async fn seed_catalog(services: &BackendServices) -> anyhow::Result<()> {
    let inserted = seed::seed_catalog(services)
        .await
        .context("failed to seed course catalog")?;

    if inserted == 0 {
        println!("Catalog already has courses; nothing seeded");
    } else {
        println!("Seeded {inserted} sample courses");
    }
    Ok(())
}

async fn create_admin(
    services: &BackendServices,
    email: &str,
    password: &str,
    name: &str,
) -> anyhow::Result<()> {
    let user = services
        .authenticator
        .create_user(email, password, name, UserRole::Admin)
        .await
        .context("failed to create administrator")?;

    info!(user = %user.public_id, "administrator created from the command line");
    println!("Created administrator {} ({})", user.email, user.public_id);
    Ok(())
}

async fn list_users(services: &BackendServices) -> anyhow::Result<()> {
    let users = services
        .authenticator
        .users()
        .list()
        .await
        .context("failed to fetch users")?;

    if users.is_empty() {
        println!("No users found in database");
        return Ok(());
    }

    println!("Found {} users:", users.len());
    println!(
        "{:<26} {:<32} {:<24} {:<12} {:<10} {:<28}",
        "Public ID", "Email", "Name", "Role", "Bootstrap", "Created At"
    );
    println!("{}", "-".repeat(136));
    for user in users {
        println!(
            "{:<26} {:<32} {:<24} {:<12} {:<10} {:<28}",
            user.public_id,
            user.email,
            user.name,
            user.role.as_str(),
            user.is_bootstrap,
            user.created_at
        );
    }
    Ok(())
}
