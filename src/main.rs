mod config;
mod handlers;
mod middleware;
mod models;
mod routes;
mod state;

use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use config::AppConfig;
use handlers::password::hash_password;
use log::info;
use middleware::request_logger::RequestLogger;
use routes::config_routes;
use state::AppState;

#[derive(Parser)]
#[command(name = "feed-server", version, about = "Feed API with JWT login and role-gated routes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print an argon2 hash for use as `password_hash` in a directory file
    HashPassword {
        #[arg(env = "FEED_PASSWORD")]
        password: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::HashPassword { password } => {
            println!("{}", hash_password(&password)?);
            Ok(())
        }
    }
}

fn build_cors(allowed_origin: Option<&str>) -> Cors {
    let cors = match allowed_origin {
        Some(origin) => Cors::default().allowed_origin(origin),
        None => Cors::default().allowed_origin_fn(|_origin, _req_head| true),
    };
    cors.allow_any_method().allow_any_header().max_age(3600)
}

async fn serve() -> anyhow::Result<()> {
    info!("=== Feed API Server Starting ===");

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    let cors_origin = config.cors_allowed_origin.clone();

    info!("Listening on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .wrap(build_cors(cors_origin.as_deref()))
            .wrap(RequestLogger)
            .wrap(Logger::new("%t [%s] \"%r\" %b %D ms \"%{User-Agent}i\" %a"))
            .configure(|cfg| state.configure(cfg))
            .configure(config_routes)
    })
    .bind((config.host.as_str(), config.port))
    .with_context(|| format!("Failed to bind {}:{}", config.host, config.port))?
    .run()
    .await
    .context("Server terminated with an error")
}
