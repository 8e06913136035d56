use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use smlt::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "smlt=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => cli::commands::init().await,
        Commands::Serve { host, port } => cli::commands::serve(host, port).await,
        Commands::Login { identity, password } => cli::commands::login(&identity, password).await,
        Commands::Register {
            username,
            email,
            password,
        } => cli::commands::register(&username, &email, password).await,
        Commands::Logout => cli::commands::logout().await,
        Commands::Whoami { format } => cli::commands::whoami(format).await,
        Commands::Courses { format } => cli::commands::courses(format).await,
        Commands::Course { id, format } => cli::commands::course(&id, format).await,
        Commands::Lesson { id, format } => cli::commands::lesson(&id, format).await,
        Commands::Quiz {
            id,
            answers,
            format,
        } => cli::commands::quiz(&id, answers, format).await,
    }
}
