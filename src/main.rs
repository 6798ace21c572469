//! trace-director operator CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!     inbound call ──▶ ┌──────────────────────────────────────────────┐
//!     (method, md)     │                  Director                    │
//!                      │  ┌──────────┐   ┌─────────┐   ┌───────────┐  │
//!                      │  │ metadata │──▶│ routing │──▶│   lazy    │──┼──▶ backend
//!                      │  │  copy    │   │  table  │   │connection │  │    (OTLP collector)
//!                      │  └──────────┘   └─────────┘   └───────────┘  │
//!                      │        config · resilience · observability   │
//!                      └──────────────────────────────────────────────┘
//! ```
//!
//! The proxy engine that relays frames lives outside this crate; this binary
//! exercises the director against a real backend for operators.

use std::path::PathBuf;

use bytes::Bytes;
use clap::{Parser, Subcommand};
use http::header::{HeaderMap, HeaderName, HeaderValue};

use trace_director::config::load_config;
use trace_director::director::forward_unary;
use trace_director::observability::{init_logging, metrics, DiagnosticSink};
use trace_director::{CallContext, Director};

#[derive(Parser)]
#[command(name = "trace-director")]
#[command(about = "Routing decisions for the OTLP gRPC reverse proxy", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "trace-director.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and print the route table
    Check,
    /// Run one routing decision and report the outcome
    Route {
        /// Full method name, e.g. /pkg.Service/Method
        method: String,

        /// Inbound metadata entry (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Simulate a call with no metadata attached
        #[arg(long)]
        no_metadata: bool,
    },
    /// Route a call and relay a raw message payload to the backend
    Forward {
        /// Full method name, e.g. /pkg.Service/Method
        method: String,

        /// File holding the serialized request message
        payload: PathBuf,

        /// Inbound metadata entry (repeatable)
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,
    },
}

fn parse_header(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))
}

fn call_context(headers: &[(String, String)]) -> Result<CallContext, Box<dyn std::error::Error>> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        map.append(
            HeaderName::from_bytes(key.as_bytes())?,
            HeaderValue::from_str(value)?,
        );
    }
    Ok(CallContext::from_headers(&map))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;
    init_logging(&config.observability)?;

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?)?;
    }

    tracing::info!(
        config_path = %cli.config.display(),
        backend = %config.backend.target,
        routes = config.routes.len(),
        tls = config.backend.tls.is_some(),
        "Configuration loaded"
    );

    let director = Director::from_config(&config, DiagnosticSink::current())?;

    match cli.command {
        Commands::Check => {
            println!("backend: {}", director.target());
            println!(
                "transport: {}",
                if config.backend.tls.is_some() { "tls" } else { "plaintext" }
            );
            println!("connect timeout: {}ms", config.backend.connect_timeout_ms);
            for route in director.routes().routes() {
                println!("route {}: {}", route.name, route.method);
            }
        }
        Commands::Route {
            method,
            headers,
            no_metadata,
        } => {
            let call = if no_metadata {
                CallContext::without_metadata()
            } else {
                call_context(&headers)?
            };

            match director.direct(&call, &method).await {
                Ok(decision) => {
                    println!(
                        "forward {} via route '{}' to {}",
                        method,
                        decision.route.name,
                        director.target()
                    );
                }
                Err(err) => {
                    eprintln!("rejected {}: {:?}: {}", method, err.code(), err);
                    return Err(tonic::Status::from(err).into());
                }
            }
        }
        Commands::Forward {
            method,
            payload,
            headers,
        } => {
            let call = call_context(&headers)?;
            let decision = director
                .direct(&call, &method)
                .await
                .map_err(tonic::Status::from)?;

            let body = Bytes::from(tokio::fs::read(&payload).await?);
            let sent = body.len();
            let response =
                forward_unary(decision.channel.clone(), &decision.context, &method, body).await?;

            println!(
                "forwarded {} bytes to {}, received {} bytes",
                sent,
                director.target(),
                response.get_ref().len()
            );
        }
    }

    Ok(())
}
