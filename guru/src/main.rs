use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::{Arg, Command};
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crowdguru::config::AppConfig;
use crowdguru::database::Database;
use crowdguru::error::AppResult;
use crowdguru::handlers::AppState;
use crowdguru::routes::configure_routes;
use crowdguru::xmpp::{GatewayClient, XmppSender};

#[actix_web::main]
async fn main() -> AppResult<()> {
    // Parse command line arguments
    let matches = Command::new("crowdguru")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Crowd Guru - crowd-sourced question answering over an XMPP gateway")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file")
                .value_name("FILE"),
        )
        .get_matches();

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("crowdguru=info".parse().unwrap()))
        .init();

    tracing::info!("Starting crowdguru daemon");

    // Load configuration
    let config = match matches.get_one::<String>("config") {
        Some(path) => AppConfig::load_from_file(Path::new(path))?,
        None => AppConfig::load()?,
    };

    // Initialize database
    let database = Arc::new(Database::new(&config.database.path)?);
    tracing::info!("Database initialized at {:?}", config.database.path);

    // Outbound chat goes through the gateway's send endpoint
    let xmpp: Arc<dyn XmppSender> = Arc::new(GatewayClient::new(config.xmpp.clone()));
    tracing::info!("Gateway send endpoint: {}", config.xmpp.send_url);

    let app_state = web::Data::new(AppState {
        database,
        xmpp,
        start_time: SystemTime::now(),
    });

    // Start HTTP server
    let server_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting HTTP server on {}", server_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(Logger::default())
            .configure(configure_routes)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
