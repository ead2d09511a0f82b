use humanizer_api::config::Config;
use humanizer_api::routes;
use humanizer_api::{InnerAppState, Result, SharedAppState};

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::classify::ServerErrorsFailureClass;
use tracing::Level;
use tracing::Span;
use tracing_subscriber::{field::MakeExt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(version = "0.1.0", about = "Token issuing and text humanizing HTTP service")]
pub struct Opts {
    #[command(subcommand)]
    /// Subcommand to run
    pub command: Command,
}

#[derive(Debug, Parser)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Optional yaml configuration file, environment variables take precedence
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

async fn inner() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "humanizer_api=debug,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .map_fmt_fields(|f| f.display_messages())
                .event_format(tracing_subscriber::fmt::format::Format::default()),
        )
        .init();

    let opts = Opts::parse();

    match opts.command {
        Command::Serve { config } => {
            let config = Config::load(config.as_deref())?;
            let listen = SocketAddr::new(config.listen_addr, config.listen_port);

            let state = SharedAppState::from(InnerAppState::from_config(&config)?);

            let app = routes::router(state).layer(
                tower_http::trace::TraceLayer::new_for_http()
                    .make_span_with(tower_http::trace::DefaultMakeSpan::new().level(Level::INFO))
                    .on_failure(
                        |_error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {},
                    )
                    .on_response(
                        |rsp: &axum::response::Response, latency: Duration, _span: &Span| {
                            tracing::info!("{} {}ms", rsp.status(), latency.as_millis());
                        },
                    ),
            );

            tracing::info!("listening on {listen}");
            Ok(axum::Server::bind(&listen)
                .serve(app.into_make_service())
                .await?)
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = inner().await {
        eprintln!("Execution failed - {}", e);
        std::process::exit(1);
    }
}
