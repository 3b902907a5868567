//! Tradex command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Point at the analysis backend (defaults to http://localhost:8000)
//! export TRADEX_API_BASE_URL="http://localhost:8000"
//!
//! # One-shot analysis, re-rendered on every poll
//! tradex analyze aapl -f roe -f pe_ratio -t rsi
//!
//! # Interactive form
//! tradex repl
//! ```

mod repl;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tradex_analysis::{
    AnalysisApi, AnalysisConfig, AnalysisForm, AnalysisPoller, Formatter, FormatterFactory,
    Fundamental, HttpAnalysisClient, OutputFormat, SessionPhase, Technical, ToggleOutcome, present,
};
use tradex_utils::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "tradex")]
#[command(
    about = "Submit stock analyses and follow them until the interpretation is ready",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Analysis backend base URL (overrides TRADEX_API_BASE_URL)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Poll interval in milliseconds (overrides TRADEX_POLL_INTERVAL_MS)
    #[arg(long, global = true)]
    interval_ms: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit an analysis and poll it until it is ready or fails
    Analyze {
        /// Ticker symbol
        symbol: String,

        /// Fundamental indicator to include (repeatable, at most 5)
        #[arg(short = 'f', long = "fundamental", value_enum)]
        fundamentals: Vec<Fundamental>,

        /// Technical indicator to include (repeatable, at most 5)
        #[arg(short = 't', long = "technical", value_enum)]
        technicals: Vec<Technical>,

        /// Skip the interpretation; finish after the first result
        #[arg(long)]
        no_llm: bool,

        /// Attach to an existing conversation thread
        #[arg(long)]
        thread: Option<String>,
    },
    /// Fetch one analysis by id and print it
    Fetch {
        analysis_id: String,
    },
    /// List the selectable indicators
    Catalog,
    /// Interactive analysis form
    Repl,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tradex_utils::init_tracing_with("warn,tradex_analysis=info", LogFormat::from_env());

    let cli = Cli::parse();
    let formatter = FormatterFactory::create(cli.output);

    match cli.command {
        Command::Catalog => {
            let form = AnalysisForm::new();
            println!(
                "{}",
                formatter.format_catalog(&form.fundamental_chips(), &form.technical_chips())
            );
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch { analysis_id } => {
            let config = load_config(cli.api_base, cli.interval_ms)?;
            let client = HttpAnalysisClient::new(&config)?;
            match client.fetch(&analysis_id).await {
                Ok(result) => {
                    if let Some(model) = present(Some(&result)) {
                        println!("{}", formatter.format_result(&model));
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(_) => {
                    eprintln!("{}", formatter.format_error("Failed to fetch analysis."));
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Analyze {
            symbol,
            fundamentals,
            technicals,
            no_llm,
            thread,
        } => {
            let config = load_config(cli.api_base, cli.interval_ms)?;
            let form = build_form(symbol, &fundamentals, &technicals, !no_llm, thread);
            analyze(&config, &form, formatter.as_ref()).await
        }
        Command::Repl => {
            let config = load_config(cli.api_base, cli.interval_ms)?;
            let client = Arc::new(HttpAnalysisClient::new(&config)?);
            let poller = AnalysisPoller::new(client, &config);
            repl::Repl::new(poller, formatter).run().await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Form for a one-shot analysis. Repeated flags keep the indicator selected.
fn build_form(
    symbol: String,
    fundamentals: &[Fundamental],
    technicals: &[Technical],
    include_llm: bool,
    thread: Option<String>,
) -> AnalysisForm {
    let mut form = AnalysisForm::new();
    form.set_symbol(symbol);
    form.set_include_llm(include_llm);
    form.set_thread_id(thread);
    for &indicator in fundamentals {
        if form.select_fundamental(indicator) == ToggleOutcome::Rejected {
            eprintln!("Ignoring fundamental '{indicator}': at most 5 can be selected");
        }
    }
    for &indicator in technicals {
        if form.select_technical(indicator) == ToggleOutcome::Rejected {
            eprintln!("Ignoring technical '{indicator}': at most 5 can be selected");
        }
    }
    form
}

/// Environment configuration with command-line overrides applied
fn load_config(
    api_base: Option<String>,
    interval_ms: Option<u64>,
) -> anyhow::Result<AnalysisConfig> {
    let mut config = AnalysisConfig::from_env().context("invalid TRADEX_* environment")?;
    if let Some(api_base) = api_base {
        config.api_base = api_base;
    }
    if let Some(ms) = interval_ms {
        config.poll_interval = Duration::from_millis(ms);
    }
    config.validate()?;
    Ok(config)
}

async fn analyze(
    config: &AnalysisConfig,
    form: &AnalysisForm,
    formatter: &dyn Formatter,
) -> anyhow::Result<ExitCode> {
    let request = match form.request() {
        Ok(request) => request,
        Err(e) if e.is_validation() => {
            eprintln!("{}", formatter.format_error("Enter a symbol."));
            return Ok(ExitCode::FAILURE);
        }
        Err(e) => return Err(e.into()),
    };

    let client = Arc::new(HttpAnalysisClient::new(config)?);
    let mut poller = AnalysisPoller::new(client, config);
    let mut updates = poller.subscribe();
    let live = formatter.output_format() == OutputFormat::Table;

    // A failed submission is already on the snapshot
    if let Ok(session) = poller.submit(request).await {
        tracing::debug!(analysis_id = %session.analysis_id, "session started");
    }

    let snapshot = loop {
        let snapshot = updates.borrow_and_update().clone();
        if live || snapshot.phase.is_terminal() {
            println!("{}", formatter.format_snapshot(&snapshot));
        }
        if snapshot.phase.is_terminal() {
            break snapshot;
        }

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break snapshot;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                poller.shutdown();
                eprintln!("Interrupted.");
                return Ok(ExitCode::from(130));
            }
        }
    };

    Ok(match snapshot.phase {
        SessionPhase::Failed { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
