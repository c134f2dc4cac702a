//! bo-search: run one case search from the command line.
//!
//! Reads connection settings from the environment (and `.env`), runs the
//! search in its own transaction and prints the response as JSON.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bo_db::{create_pool_with_config, CaseSearchPlan, DatabaseConfig, PgCaseSearch, SearchRequest};

#[derive(Parser)]
#[command(name = "bo-search")]
#[command(author, version, about = "Full-text search over validated cases")]
struct Cli {
    /// Free-text phrase to search for
    #[arg(short, long, default_value = "")]
    query: String,

    /// Subject type filter (individual, company, organization); repeatable
    #[arg(short, long = "subject-type")]
    subject_type: Vec<String>,

    /// Case type filter (verdict, blacklist, sanction); repeatable
    #[arg(short = 't', long = "type")]
    case_type: Vec<String>,

    /// Nation filter; repeatable
    #[arg(short, long)]
    nation: Vec<String>,

    /// Year filter; repeatable
    #[arg(short, long)]
    year: Vec<String>,

    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: i64,

    /// Print the generated statements and parameters without running them
    #[arg(long)]
    explain: bool,
}

impl Cli {
    fn to_request(&self) -> SearchRequest {
        SearchRequest::new(self.query.clone())
            .with_subject_types(self.subject_type.iter().cloned())
            .with_types(self.case_type.iter().cloned())
            .with_nations(self.nation.iter().cloned())
            .with_years(self.year.iter().cloned())
            .with_page(self.page)
    }
}

fn init_tracing() {
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   RUST_LOG    - standard env filter (default: "bo_db=info")
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bo_db=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let req = cli.to_request();

    if cli.explain {
        let plan = CaseSearchPlan::for_request(&req)?;
        println!("-- count\n{}\n", plan.count_sql);
        println!("-- select\n{}\n", plan.select_sql);
        println!("-- params\n{:?}", plan.select_params());
        return Ok(());
    }

    let config = DatabaseConfig::from_env()?;
    let pool = create_pool_with_config(&config).await?;
    let response = PgCaseSearch::new(pool).search(&req).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
