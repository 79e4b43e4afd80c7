use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use jobwire::board::{board_router, BoardService, InMemoryBoardRepository, JobCsvImporter};
use jobwire::config::AppConfig;
use jobwire::error::AppError;
use jobwire::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "jobwire",
    about = "Run the job board service or inspect board activity from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Offline board inspection tools
    Board {
        #[command(subcommand)]
        command: BoardCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum BoardCommand {
    /// Render an activity report from a job export
    Report(BoardReportArgs),
}

#[derive(Args, Debug)]
struct BoardReportArgs {
    /// Job export CSV to hydrate the board
    #[arg(long)]
    jobs_csv: PathBuf,
    /// Evaluation date for the report (defaults to today)
    #[arg(long, value_parser = parse_date)]
    today: Option<NaiveDate>,
    /// Include a listing of every live job in the output
    #[arg(long)]
    list_jobs: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Board {
            command: BoardCommand::Report(args),
        } => run_board_report(args),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let repository = Arc::new(InMemoryBoardRepository::new());
    let service = Arc::new(BoardService::new(
        repository,
        config.pagination.board_pagination(),
    ));

    let infra = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = board_router(service).merge(infra).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_board_report(args: BoardReportArgs) -> Result<(), AppError> {
    let BoardReportArgs {
        jobs_csv,
        today,
        list_jobs,
    } = args;

    let today = today
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .unwrap_or_else(Utc::now);

    let repository = Arc::new(InMemoryBoardRepository::new());
    let service = BoardService::new(repository, Default::default());
    let imported = JobCsvImporter::from_path(&jobs_csv, &service)?;

    let report = service.activity_report(today)?;
    let queue = service.curation_queue()?;

    println!("Job board activity");
    println!(
        "Imported {} jobs from {} (evaluated {})",
        imported,
        jobs_csv.display(),
        today.date_naive()
    );

    println!("\nCuration queue");
    println!("- {} jobs waiting on an employer", queue.need_employer);
    println!("- {} drafts waiting on publication", queue.need_publish);

    if report.hot_jobs_week.is_empty() {
        println!("\nHot jobs this week: none");
    } else {
        println!("\nHot jobs this week");
        for job in &report.hot_jobs_week {
            println!("- {} ({} views) {}", job.title, job.page_views, job.url);
        }
    }

    if report.hot_jobs_month.is_empty() {
        println!("\nHot jobs this month: none");
    } else {
        println!("\nHot jobs this month");
        for job in &report.hot_jobs_month {
            println!("- {} ({} views) {}", job.title, job.page_views, job.url);
        }
    }

    println!("\nActive subjects (last month)");
    for subject in &report.subjects_month {
        println!("- {}: {} jobs", subject.name, subject.job_count);
    }

    println!("\nActive subjects (last year)");
    for subject in &report.subjects_year {
        println!("- {}: {} jobs", subject.name, subject.job_count);
    }

    println!("\nActive employers (last month)");
    for employer in &report.employers_month {
        println!("- {}: {} jobs", employer.name, employer.job_count);
    }

    println!("\nActive employers (last year)");
    for employer in &report.employers_year {
        println!("- {}: {} jobs", employer.name, employer.job_count);
    }

    if list_jobs {
        let listing = service.feed(1)?;
        println!("\nMost recent published jobs");
        for job in &listing.paged.items {
            let published = job
                .published
                .map(|at| at.date_naive().to_string())
                .unwrap_or_default();
            println!("- {} | {} | published {}", job.title, job.url, published);
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
