//! Interactive analysis form
//!
//! Edit the symbol, toggle indicators, submit, and watch results update as
//! the poller publishes them. Submitting again replaces the running analysis.

use anyhow::{Context, bail};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tradex_analysis::{
    AnalysisError, AnalysisForm, AnalysisPoller, Formatter, Fundamental, Indicator, Technical,
    ToggleOutcome,
};

/// Parsed line of REPL input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    /// Set the symbol input
    Symbol(String),
    /// Toggle a fundamental indicator
    Fundamental(Fundamental),
    /// Toggle a technical indicator
    Technical(Technical),
    /// Request (or skip) the interpretation
    Llm(bool),
    /// Submit the form, optionally setting the symbol first
    Submit(Option<String>),
    /// Re-render the latest snapshot
    Show,
    /// Print the form state
    Status,
    Catalog,
    /// Stop polling the current analysis
    Stop,
    Help,
    Exit,
}

impl ReplCommand {
    /// Parse one input line. Text without a leading `/` sets the symbol.
    pub fn parse(input: &str) -> anyhow::Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            bail!("Empty input");
        }

        let Some(command) = input.strip_prefix('/') else {
            return Ok(Self::Symbol(input.to_string()));
        };

        let parts: Vec<&str> = command.split_whitespace().collect();
        let Some((name, args)) = parts.split_first() else {
            bail!("Empty command");
        };

        match name.to_lowercase().as_str() {
            "symbol" | "s" => {
                let symbol = args.first().context("Missing symbol")?;
                Ok(Self::Symbol((*symbol).to_string()))
            }
            "fundamental" | "fund" | "f" => Ok(Self::Fundamental(indicator(args)?)),
            "technical" | "tech" | "t" => Ok(Self::Technical(indicator(args)?)),
            "llm" => match args.first().map(|a| a.to_lowercase()).as_deref() {
                Some("on") => Ok(Self::Llm(true)),
                Some("off") => Ok(Self::Llm(false)),
                _ => bail!("Usage: /llm on|off"),
            },
            "submit" | "analyze" | "a" => Ok(Self::Submit(args.first().map(|s| (*s).to_string()))),
            "show" => Ok(Self::Show),
            "status" => Ok(Self::Status),
            "catalog" | "list" => Ok(Self::Catalog),
            "stop" => Ok(Self::Stop),
            "help" | "h" | "?" => Ok(Self::Help),
            "exit" | "quit" | "q" => Ok(Self::Exit),
            other => bail!("Unknown command: /{other}"),
        }
    }

    pub fn help_text() -> &'static str {
        r"
Commands:
  <SYMBOL>              set the symbol (same as /symbol)
  /symbol <SYMBOL>      set the symbol
  /f <id>               toggle a fundamental indicator (max 5)
  /t <id>               toggle a technical indicator (max 5)
  /llm on|off           request the interpretation (default on)
  /submit [SYMBOL]      start the analysis; replaces a running one
  /show                 show the latest result
  /status               show the form
  /catalog              list indicator ids
  /stop                 stop polling
  /help                 this help
  /exit                 quit
"
    }
}

fn indicator<I: Indicator>(args: &[&str]) -> anyhow::Result<I> {
    let id = args.first().context("Missing indicator id")?;
    I::from_id(id).with_context(|| format!("Unknown {} indicator '{id}'", I::KIND))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Repl {
    poller: AnalysisPoller,
    form: AnalysisForm,
    formatter: Box<dyn Formatter>,
}

impl Repl {
    pub fn new(poller: AnalysisPoller, formatter: Box<dyn Formatter>) -> Self {
        Self {
            poller,
            form: AnalysisForm::new(),
            formatter,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut updates = self.poller.subscribe();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        println!("tradex analysis. Type /help for commands.");
        prompt()?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        println!();
                        break;
                    };
                    if line.trim().is_empty() {
                        prompt()?;
                        continue;
                    }
                    match ReplCommand::parse(&line) {
                        Ok(command) => {
                            if self.handle(command).await == Flow::Exit {
                                break;
                            }
                        }
                        Err(e) => println!("{}", self.formatter.format_error(&e.to_string())),
                    }
                    prompt()?;
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = updates.borrow_and_update().clone();
                    println!("\n{}", self.formatter.format_snapshot(&snapshot));
                    prompt()?;
                }
            }
        }

        self.poller.shutdown();
        println!("Goodbye!");
        Ok(())
    }

    async fn handle(&mut self, command: ReplCommand) -> Flow {
        match command {
            ReplCommand::Symbol(symbol) => {
                self.form.set_symbol(symbol);
                println!("Symbol: {}", self.form.symbol());
            }
            ReplCommand::Fundamental(indicator) => {
                let outcome = self.form.toggle_fundamental(indicator);
                report_toggle(indicator, outcome, &self.form.fundamentals().hint());
            }
            ReplCommand::Technical(indicator) => {
                let outcome = self.form.toggle_technical(indicator);
                report_toggle(indicator, outcome, &self.form.technicals().hint());
            }
            ReplCommand::Llm(on) => {
                self.form.set_include_llm(on);
                println!("Interpretation {}", if on { "on" } else { "off" });
            }
            ReplCommand::Submit(symbol) => {
                if let Some(symbol) = symbol {
                    self.form.set_symbol(symbol);
                }
                self.submit().await;
            }
            ReplCommand::Show => {
                println!("{}", self.formatter.format_snapshot(&self.poller.snapshot()));
            }
            ReplCommand::Status => self.print_form(),
            ReplCommand::Catalog => println!(
                "{}",
                self.formatter
                    .format_catalog(&self.form.fundamental_chips(), &self.form.technical_chips())
            ),
            ReplCommand::Stop => {
                self.poller.shutdown();
                println!("Stopped.");
            }
            ReplCommand::Help => println!("{}", ReplCommand::help_text()),
            ReplCommand::Exit => return Flow::Exit,
        }
        Flow::Continue
    }

    async fn submit(&mut self) {
        let request = match self.form.request() {
            Ok(request) => request,
            Err(AnalysisError::InvalidSymbol(_)) => {
                println!("{}", self.formatter.format_error("Enter a symbol first."));
                return;
            }
            Err(e) => {
                println!("{}", self.formatter.format_error(&e.to_string()));
                return;
            }
        };

        // Failures are published on the snapshot and rendered from there
        if let Ok(session) = self.poller.submit(request).await {
            tracing::debug!(analysis_id = %session.analysis_id, "session started");
        }
    }

    fn print_form(&self) {
        let symbol = match self.form.symbol().trim() {
            "" => "(none)",
            symbol => symbol,
        };
        let ids = |ids: Vec<&str>| if ids.is_empty() { "-".to_string() } else { ids.join(", ") };

        println!("Symbol:       {symbol}");
        println!(
            "Fundamentals: {} ({})",
            ids(self.form.fundamentals().iter().map(Indicator::id).collect()),
            self.form.fundamentals().hint()
        );
        println!(
            "Technicals:   {} ({})",
            ids(self.form.technicals().iter().map(Indicator::id).collect()),
            self.form.technicals().hint()
        );
        println!(
            "Interpret:    {}",
            if self.form.include_llm() { "on" } else { "off" }
        );
        println!("Phase:        {}", self.poller.phase().name());
    }
}

fn report_toggle<I: Indicator>(indicator: I, outcome: ToggleOutcome, hint: &str) {
    match outcome {
        ToggleOutcome::Added => println!("+ {indicator}  {hint}"),
        ToggleOutcome::Removed => println!("- {indicator}  {hint}"),
        ToggleOutcome::Rejected => println!("{indicator} not added, selection full. {hint}"),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("tradex> ");
    std::io::stdout().flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol() {
        assert_eq!(
            ReplCommand::parse("  aapl ").unwrap(),
            ReplCommand::Symbol("aapl".to_string())
        );
        assert_eq!(
            ReplCommand::parse("/symbol msft").unwrap(),
            ReplCommand::Symbol("msft".to_string())
        );
        assert!(ReplCommand::parse("/symbol").is_err());
    }

    #[test]
    fn test_parse_indicators() {
        assert_eq!(
            ReplCommand::parse("/f ROE").unwrap(),
            ReplCommand::Fundamental(Fundamental::Roe)
        );
        assert_eq!(
            ReplCommand::parse("/t sma_200").unwrap(),
            ReplCommand::Technical(Technical::Sma200)
        );

        let err = ReplCommand::parse("/t roe").unwrap_err();
        assert_eq!(err.to_string(), "Unknown technical indicator 'roe'");
        assert!(ReplCommand::parse("/f").is_err());
    }

    #[test]
    fn test_parse_submit_and_control() {
        assert_eq!(ReplCommand::parse("/submit").unwrap(), ReplCommand::Submit(None));
        assert_eq!(
            ReplCommand::parse("/analyze nvda").unwrap(),
            ReplCommand::Submit(Some("nvda".to_string()))
        );
        assert_eq!(ReplCommand::parse("/llm OFF").unwrap(), ReplCommand::Llm(false));
        assert!(ReplCommand::parse("/llm maybe").is_err());
        assert_eq!(ReplCommand::parse("/q").unwrap(), ReplCommand::Exit);
        assert!(ReplCommand::parse("/frobnicate").is_err());
        assert!(ReplCommand::parse("   ").is_err());
        assert!(ReplCommand::parse("/").is_err());
    }
}
