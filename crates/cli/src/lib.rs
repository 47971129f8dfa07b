use anyhow::{Context as AnyhowContext, Result};
use axum::{
    body::Bytes,
    http::{HeaderMap, StatusCode},
    response::Response,
    routing::{get, post},
    Router,
};
use clap::{Args, Parser, Subcommand};
use command::{CommandAction, CommandHandler, CommandRequest};
use config::{Overrides, Settings};
use grantscope_protocol::{serialize_json, serialize_json_pretty, ErrorCode};
use grantscope_query::QueryEngine;
use grantscope_record_store::FileProvider;
use serde_json::{json, Map, Value};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub mod command;
pub mod config;
mod http_api;
mod server_security;

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "grantscope")]
#[command(about = "Query private-foundation grant disbursements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for JSON)
    #[arg(long, global = true)]
    quiet: bool,

    /// Config file (overrides GRANTSCOPE_CONFIG and ./grantscope.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record snapshot JSON (overrides GRANTSCOPE_DATA and the config file)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a JSON Command API request
    Command(CommandArgs),

    /// Dataset-wide statistics
    Stats,

    /// Search grants
    Search(SearchArgs),

    /// Search foundations by aggregate statistics
    Foundations(FoundationsArgs),

    /// Full detail for one foundation
    Foundation(EinArgs),

    /// Statistics report for one foundation
    #[command(name = "foundation-stats")]
    FoundationStats(EinArgs),

    /// Officers from the latest filing
    Officers(EinArgs),

    /// Grant count and total per recipient state
    States(EinArgs),

    /// Foundation names for autocomplete
    Names(NamesArgs),

    /// Serve the Command API over HTTP
    #[command(name = "serve-http")]
    ServeHttp(ServeArgs),
}

#[derive(Args)]
struct CommandArgs {
    /// Inline JSON request
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Read the request from a file
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct PageArgs {
    /// 1-based page number
    #[arg(long)]
    page: Option<usize>,

    /// Results per page
    #[arg(long)]
    per_page: Option<usize>,
}

#[derive(Args)]
struct SearchArgs {
    /// Foundation name fragment
    #[arg(long)]
    foundation: Option<String>,

    #[arg(long)]
    min_amount: Option<u64>,

    #[arg(long)]
    max_amount: Option<u64>,

    /// Recipient state
    #[arg(long)]
    state: Option<String>,

    /// Recipient city fragment
    #[arg(long)]
    city: Option<String>,

    #[command(flatten)]
    paging: PageArgs,
}

#[derive(Args)]
struct FoundationsArgs {
    /// Foundation name fragment
    #[arg(long)]
    name: Option<String>,

    /// State the foundation has funded
    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    min_total: Option<u64>,

    #[arg(long)]
    max_total: Option<u64>,

    #[arg(long)]
    min_grants: Option<usize>,

    #[arg(long)]
    min_median: Option<u64>,

    #[arg(long)]
    max_median: Option<u64>,

    #[command(flatten)]
    paging: PageArgs,
}

#[derive(Args)]
struct EinArgs {
    /// Employer identification number, with or without the dash
    ein: String,
}

#[derive(Args)]
struct NamesArgs {
    /// Case-insensitive name fragment
    query: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1:7700")]
    bind: String,

    /// Allow binding to non-loopback addresses (requires an auth token)
    #[arg(long)]
    public: bool,

    /// Bearer token required on every request (or GRANTSCOPE_AUTH_TOKEN)
    #[arg(long)]
    auth_token: Option<String>,

    /// Rebuild the aggregate snapshot every N seconds (0 disables)
    #[arg(long)]
    refresh_secs: Option<u64>,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    // Every subcommand but serve-http writes JSON on stdout.
    if !matches!(cli.command, Commands::ServeHttp(_)) {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet && !cli.verbose {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let settings = Settings::load(&Overrides {
        config: cli.config.clone(),
        data: cli.data.clone(),
    })?;
    if let Some(path) = &settings.config_path {
        log::debug!("using config {}", path.display());
    }

    let provider = FileProvider::open(&settings.data_path)
        .await
        .with_context(|| format!("Failed to open record snapshot {}", settings.data_path.display()))?;
    let engine = Arc::new(QueryEngine::new(Arc::new(provider)));
    let handler = CommandHandler::new(engine, settings.paging);
    let pretty = cli.pretty;

    let request = match cli.command {
        Commands::ServeHttp(args) => return serve_http(args, handler, &settings).await,
        Commands::Command(args) => {
            let raw = read_payload(&args)?;
            serde_json::from_str(&raw).context("Invalid JSON passed to --json/--file")?
        }
        Commands::Stats => action_request(CommandAction::GetStats, json!({})),
        Commands::Search(args) => action_request(
            CommandAction::SearchGrants,
            compact(json!({
                "foundation": args.foundation,
                "min_amount": args.min_amount,
                "max_amount": args.max_amount,
                "state": args.state,
                "city": args.city,
                "page": args.paging.page,
                "per_page": args.paging.per_page,
            })),
        ),
        Commands::Foundations(args) => action_request(
            CommandAction::SearchFoundations,
            compact(json!({
                "foundation_name": args.name,
                "state": args.state,
                "min_total": args.min_total,
                "max_total": args.max_total,
                "min_grants": args.min_grants,
                "min_median": args.min_median,
                "max_median": args.max_median,
                "page": args.paging.page,
                "per_page": args.paging.per_page,
            })),
        ),
        Commands::Foundation(args) => ein_request(CommandAction::GetFoundationDetail, args),
        Commands::FoundationStats(args) => ein_request(CommandAction::GetFoundationStats, args),
        Commands::Officers(args) => ein_request(CommandAction::GetFoundationOfficers, args),
        Commands::States(args) => ein_request(CommandAction::GetFoundationStateBreakdown, args),
        Commands::Names(args) => action_request(
            CommandAction::FoundationNames,
            compact(json!({ "query": args.query })),
        ),
    };

    run_command(&handler, request, pretty).await
}

fn action_request(action: CommandAction, payload: Value) -> CommandRequest {
    CommandRequest { action, payload }
}

fn ein_request(action: CommandAction, args: EinArgs) -> CommandRequest {
    action_request(action, json!({ "ein": args.ein }))
}

/// Drops unset flags so the payload only carries what the user passed.
fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .collect::<Map<_, _>>(),
        ),
        other => other,
    }
}

async fn run_command(handler: &CommandHandler, request: CommandRequest, pretty: bool) -> Result<()> {
    let response = handler.execute(request).await;

    let output = if pretty {
        serialize_json_pretty(&response)?
    } else {
        serialize_json(&response)?
    };
    print_stdout(&output)?;

    if response.is_error() {
        std::process::exit(1);
    }
    Ok(())
}

fn read_payload(args: &CommandArgs) -> Result<String> {
    if let Some(raw) = &args.json {
        return Ok(raw.clone());
    }
    if let Some(path) = &args.file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read JSON from {}", path.display()));
    }

    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read JSON from stdin")?;

    if buffer.trim().is_empty() {
        anyhow::bail!("Command request is empty. Provide --json, --file, or pipe JSON via stdin.");
    }

    Ok(buffer)
}

struct HttpState {
    handler: CommandHandler,
    auth_token: Option<server_security::AuthToken>,
}

async fn serve_http(args: ServeArgs, handler: CommandHandler, settings: &Settings) -> Result<()> {
    let addrs = server_security::resolve_guarded_bind_addrs(&args.bind, args.public).await?;
    let auth_token_raw = args
        .auth_token
        .clone()
        .or_else(|| std::env::var(server_security::AUTH_TOKEN_ENV).ok());
    let auth_token = server_security::AuthToken::parse(auth_token_raw.as_deref())?;
    if args.public && auth_token.is_none() {
        anyhow::bail!(
            "--public requires an auth token: set --auth-token or export {}",
            server_security::AUTH_TOKEN_ENV
        );
    }

    let engine = handler.engine().clone();
    match engine.ensure_loaded().await {
        Ok(snapshot) => log::info!(
            "snapshot v{} ready: {} foundations",
            snapshot.version(),
            snapshot.entries().len()
        ),
        Err(err) => log::warn!("initial snapshot build failed, retrying on first request: {err}"),
    }

    let refresh_secs = args.refresh_secs.or(settings.refresh_secs).unwrap_or(0);
    if refresh_secs > 0 {
        spawn_refresh_loop(engine, Duration::from_secs(refresh_secs));
    }

    let state = Arc::new(HttpState {
        handler,
        auth_token,
    });
    let app = Router::new()
        .route(
            "/command",
            post({
                let state = state.clone();
                move |headers, body| http_handler(headers, body, state.clone())
            }),
        )
        .route(
            "/health",
            get({
                let state = state.clone();
                move |headers| http_health(headers, state.clone())
            }),
        );

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    let local_addr = listener.local_addr()?;
    let base_url = format!("http://{local_addr}");

    print_stdout(&format!("Serving Command API: {base_url}/command"))?;
    print_stdout(&format!("Health endpoint: {base_url}/health"))?;

    if state.auth_token.is_some() {
        print_stdout(&format!(
            "Auth enabled: add header 'Authorization: Bearer ${}'",
            server_security::AUTH_TOKEN_ENV
        ))?;
    }
    if args.public {
        let addrs = addrs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        print_stdout(&format!(
            "Public bind enabled (--public). Resolved addresses: {addrs}"
        ))?;
    }
    if refresh_secs > 0 {
        print_stdout(&format!("Snapshot refresh every {refresh_secs}s"))?;
    }

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_refresh_loop(engine: Arc<QueryEngine>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match engine.refresh().await {
                Ok(info) => log::info!(
                    "snapshot refreshed to v{} ({} foundations)",
                    info.version,
                    info.foundations
                ),
                Err(err) => log::warn!("snapshot refresh failed, keeping previous: {err}"),
            }
        }
    });
}

fn unauthorized(state: &HttpState, headers: &HeaderMap) -> Option<Result<Response, StatusCode>> {
    let token = state.auth_token.as_ref()?;
    if http_api::is_authorized(headers, token) {
        return None;
    }
    let response = http_api::error_response(
        ErrorCode::Unauthorized,
        "Missing or invalid Authorization header".to_string(),
    );
    Some(http_api::build_response(StatusCode::UNAUTHORIZED, response))
}

async fn http_handler(
    headers: HeaderMap,
    body: Bytes,
    state: Arc<HttpState>,
) -> Result<Response, StatusCode> {
    if let Some(rejected) = unauthorized(&state, &headers) {
        return rejected;
    }

    let request: CommandRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(err) => {
            let response = http_api::error_response(
                ErrorCode::InvalidRequest,
                format!("Invalid JSON request: {err}"),
            );
            return http_api::build_response(StatusCode::BAD_REQUEST, response);
        }
    };
    let response = state.handler.execute(request).await;
    http_api::build_response(StatusCode::OK, response)
}

async fn http_health(headers: HeaderMap, state: Arc<HttpState>) -> Result<Response, StatusCode> {
    if let Some(rejected) = unauthorized(&state, &headers) {
        return rejected;
    }

    let engine = state.handler.engine();
    let snapshot = engine.snapshot_info().await;
    let report = match snapshot {
        Ok(info) => json!({
            "status": "ok",
            "provider": engine.provider_name(),
            "snapshot": info,
        }),
        Err(err) => json!({
            "status": "degraded",
            "provider": engine.provider_name(),
            "error": err.to_string(),
        }),
    };
    http_api::json_response(StatusCode::OK, &report)
}
