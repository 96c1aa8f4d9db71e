mod loader;
mod logic;
mod realtime;
mod timer;
mod util;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use budgetcut_game::GameState;
use logic::{GameTester, GameplayStrategy, LogicTester, ScenarioResult};
use util::{expand_strategies, parse_seeds};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored summary for terminals
    Console,
    /// Machine-readable results array
    Json,
    /// Markdown tables for CI summaries
    Markdown,
}

#[derive(Debug, Parser)]
#[command(name = "budgetcut-tester", version)]
#[command(about = "Automated strategy runs and invariant checks for the budget cut game")]
struct Args {
    /// Strategies to run (comma-separated, or `all`)
    #[arg(long, default_value = "all")]
    strategies: String,

    /// List all available strategies and exit
    #[arg(long)]
    list_strategies: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per strategy and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// JSON file with game rules and roster (defaults to the standard game)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Play one run of the first strategy against a live clock
    #[arg(long)]
    realtime: bool,

    /// Length of one game second in real-time mode
    #[arg(long, default_value_t = 1_000)]
    tick_millis: u64,
}

impl Args {
    fn shows_banner(&self) -> bool {
        self.report == ReportFormat::Console || self.output.is_some()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_strategies(&args)? {
        return Ok(());
    }

    let strategies = expand_strategies(&args.strategies)?;
    if strategies.is_empty() {
        bail!("no strategies selected");
    }
    let seeds = parse_seeds(&args.seeds)?;
    if seeds.is_empty() {
        bail!("no seeds given");
    }
    let template = loader::load_template(args.config.as_deref())?;

    if args.shows_banner() {
        announce_banner();
    }

    if args.realtime {
        return run_realtime(&args, template, strategies[0], seeds[0]).await;
    }

    let start_time = Instant::now();
    let results = run_strategies(&args, template, &strategies, &seeds);
    write_reports(&args, &results, start_time.elapsed())?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_strategies(args: &Args) -> Result<bool> {
    if !args.list_strategies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available strategies:")?;
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:10} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "💸 Budget Cut Automated Tester".bright_cyan().bold());
    println!("{}", "==============================".cyan());
}

fn run_strategies(
    args: &Args,
    template: GameState,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
) -> Vec<ScenarioResult> {
    if args.shows_banner() {
        println!("{}", "🧠 Running Strategy Simulations".bright_yellow().bold());
        println!("{}", "-".repeat(31).yellow());
    }

    let logic_tester = LogicTester::new(GameTester::new(template, args.verbose), args.verbose);
    strategies
        .iter()
        .flat_map(|&strategy| logic_tester.run_strategy(strategy, seeds, args.iterations))
        .collect()
}

async fn run_realtime(
    args: &Args,
    template: GameState,
    strategy: GameplayStrategy,
    seed: u64,
) -> Result<()> {
    let chatty = args.shows_banner();
    if chatty {
        println!(
            "{} {} (seed {seed}, {}ms per second)",
            "⏱️  Real-time run:".bright_blue().bold(),
            strategy.label(),
            args.tick_millis
        );
    }
    let tick = Duration::from_millis(args.tick_millis.max(1));
    let (state, summary) =
        realtime::play_realtime(template, strategy, seed, tick, !chatty).await?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    match summary {
        Some(summary) => match args.report {
            ReportFormat::Json => {
                writeln!(
                    &mut output_target,
                    "{}",
                    serde_json::to_string_pretty(&summary)?
                )?;
            }
            ReportFormat::Console | ReportFormat::Markdown => {
                writeln!(&mut output_target, "{}", summary.headline.bold())?;
                writeln!(&mut output_target, "{}", summary.message)?;
                if let Some(savings) = summary.tax_savings {
                    writeln!(&mut output_target, "Tax savings: ${savings}B")?;
                }
            }
        },
        None => writeln!(
            &mut output_target,
            "Run stopped while still in play (${}B cut, {}s left)",
            state.current_cuts(),
            state.time_remaining()
        )?,
    }
    output_target.flush_inner()?;
    Ok(())
}

fn write_reports(args: &Args, results: &[ScenarioResult], duration: Duration) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report {
        ReportFormat::Json => {
            logic::reports::generate_json_report(&mut output_target, results)?;
        }
        ReportFormat::Markdown => {
            logic::reports::generate_markdown_report(&mut output_target, results)?;
        }
        ReportFormat::Console => {
            logic::reports::generate_console_report(&mut output_target, results, duration)?;
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
