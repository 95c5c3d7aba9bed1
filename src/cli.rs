//! CLI definition and dispatch.

use chrono::Local;
use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fmt::Write as _;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::json_config_adapter::JsonConfigAdapter;
use crate::adapters::json_registry_adapter::JsonRegistryAdapter;
use crate::adapters::json_report_adapter::{JsonReportAdapter, DEFAULT_REPORT_FILE};
use crate::adapters::simulated_market::SimulatedMarket;
use crate::domain::analysis::MarketAnalysis;
use crate::domain::backtest::{
    run_backtest, BacktestConfig, BacktestResult, DEFAULT_BACKTEST_DAYS, MAX_BACKTEST_DAYS,
};
use crate::domain::bot::manager::{BotManager, INTERACTIVE, PROBLEM_SOLVER, TASK_AUTOMATION};
use crate::domain::bot::{BotConfig, BotInfo, BotInput};
use crate::domain::config::AppConfig;
use crate::domain::config_validation::validate_config;
use crate::domain::error::FxlabError;
use crate::domain::forex_bot::ForexBot;
use crate::domain::indicator::IndicatorType;
use crate::domain::risk::format_currency;
use crate::ports::config_port::ConfigPort;
use crate::ports::market_data_port::MarketDataPort;
use crate::ports::report_port::ReportPort;

const BOT_TYPES: [&str; 3] = [PROBLEM_SOLVER, TASK_AUTOMATION, INTERACTIVE];

#[derive(Parser, Debug)]
#[command(
    name = "fxlab",
    about = "Simulated FOREX trading bot, backtester and bot framework"
)]
pub struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
    /// Interactive shell when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new bot (problem-solver, task-automation, interactive)
    CreateBot {
        bot_type: String,
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Run a bot by id or name
    RunBot {
        bot: String,
        /// Text or JSON input
        input: Option<String>,
    },
    /// List all bots
    ListBots,
    /// Solve a problem with a problem-solver bot
    Solve { problem: String },
    /// Interactive shell
    Shell,
    /// Remove a bot
    RemoveBot { bot: String },
    /// Activate a bot
    ActivateBot { bot: String },
    /// Deactivate a bot
    DeactivateBot { bot: String },
    /// Run one pass of the simulated trading strategy
    Trade {
        #[arg(long)]
        seed: Option<u64>,
        /// Read prices from CSV files instead of simulating
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Backtest over simulated or CSV price history
    Backtest {
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_BACKTEST_DAYS,
            value_parser = RangedU64ValueParser::<usize>::new().range(1..=MAX_BACKTEST_DAYS as u64)
        )]
        days: usize,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Check the configuration for invalid values
    Validate,
    /// Write a default configuration file
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set one top-level key; the value is parsed as JSON, else taken as text
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let config_path = cli.config;
    let result = match cli.command.unwrap_or(Command::Shell) {
        Command::CreateBot { bot_type, name } => {
            run_create_bot(&config_path, &bot_type, name.as_deref())
        }
        Command::RunBot { bot, input } => run_run_bot(&config_path, &bot, input.as_deref()),
        Command::ListBots => run_list_bots(&config_path),
        Command::Solve { problem } => run_solve(&config_path, &problem),
        Command::Shell => run_shell_command(&config_path),
        Command::RemoveBot { bot } => run_set_bot(&config_path, &bot, BotChange::Remove),
        Command::ActivateBot { bot } => run_set_bot(&config_path, &bot, BotChange::Activate),
        Command::DeactivateBot { bot } => run_set_bot(&config_path, &bot, BotChange::Deactivate),
        Command::Trade { seed, data_dir } => run_trade(&config_path, seed, data_dir),
        Command::Backtest {
            days,
            seed,
            data_dir,
            output,
        } => run_backtest_command(&config_path, days, seed, data_dir, output),
        Command::Config { action } => run_config(&config_path, action),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Load the configuration at `path`, writing defaults when it does not exist.
pub fn load_config(path: &Path) -> Result<AppConfig, FxlabError> {
    JsonConfigAdapter::new(path).load()
}

/// The registry file, resolved against the config file's directory when
/// relative.
pub fn registry_path(config_path: &Path, config: &AppConfig) -> PathBuf {
    let file = Path::new(&config.framework.registry_file);
    if file.is_absolute() {
        return file.to_path_buf();
    }
    match config_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(file),
        _ => file.to_path_buf(),
    }
}

pub fn open_manager(config_path: &Path) -> Result<BotManager, FxlabError> {
    let config = load_config(config_path)?;
    let store = JsonRegistryAdapter::new(registry_path(config_path, &config));
    Ok(BotManager::new(Box::new(store)))
}

/// CSV files under `data_dir` when given, otherwise the simulated market.
pub fn build_market(seed: Option<u64>, data_dir: Option<PathBuf>) -> Box<dyn MarketDataPort> {
    match data_dir {
        Some(dir) => Box::new(CsvAdapter::new(dir)),
        None => Box::new(SimulatedMarket::new(seed)),
    }
}

fn run_create_bot(
    config_path: &Path,
    bot_type: &str,
    name: Option<&str>,
) -> Result<(), FxlabError> {
    let mut manager = open_manager(config_path)?;
    let id = manager.create_bot(bot_type, name, BotConfig::new())?;
    let name = manager
        .get_bot(&id.to_string())
        .map(|b| b.name)
        .unwrap_or_default();
    println!("Created {bot_type} bot {name} with ID: {id}");
    Ok(())
}

fn run_run_bot(config_path: &Path, bot: &str, input: Option<&str>) -> Result<(), FxlabError> {
    let mut manager = open_manager(config_path)?;
    let output = manager.run_bot(bot, BotInput::parse(input.unwrap_or_default()))?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_list_bots(config_path: &Path) -> Result<(), FxlabError> {
    let manager = open_manager(config_path)?;
    print!("{}", format_bot_list(&manager.list_bots()));
    Ok(())
}

fn run_solve(config_path: &Path, problem: &str) -> Result<(), FxlabError> {
    let mut manager = open_manager(config_path)?;
    print!("{}", solve_problem(&mut manager, problem)?);
    Ok(())
}

fn solve_problem(manager: &mut BotManager, problem: &str) -> Result<String, FxlabError> {
    let id = manager.get_or_create_bot(PROBLEM_SOLVER, None)?;
    let solution = manager.run_bot(&id.to_string(), BotInput::Text(problem.to_string()))?;
    Ok(format!(
        "Problem: {problem}\nSolution:\n{}\n",
        serde_json::to_string_pretty(&solution)?
    ))
}

enum BotChange {
    Remove,
    Activate,
    Deactivate,
}

fn run_set_bot(config_path: &Path, bot: &str, change: BotChange) -> Result<(), FxlabError> {
    let mut manager = open_manager(config_path)?;
    let (done, verb) = match change {
        BotChange::Remove => (manager.remove_bot(bot), "Removed"),
        BotChange::Activate => (manager.activate_bot(bot), "Activated"),
        BotChange::Deactivate => (manager.deactivate_bot(bot), "Deactivated"),
    };
    if !done {
        return Err(FxlabError::BotNotFound(bot.to_string()));
    }
    println!("{verb} bot {bot}");
    Ok(())
}

pub fn format_bot_list(bots: &[BotInfo]) -> String {
    if bots.is_empty() {
        return "No bots found. Create one with `fxlab create-bot <type>`.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<36}  {:<24}  {:<16}  {:<8}  {:>4}",
        "ID", "NAME", "TYPE", "STATUS", "RUNS"
    );
    for bot in bots {
        let status = if bot.active { "active" } else { "inactive" };
        let _ = writeln!(
            out,
            "{:<36}  {:<24}  {:<16}  {:<8}  {:>4}",
            bot.id, bot.name, bot.bot_type, status, bot.execution_count
        );
    }
    out
}

const SHELL_HELP: &str = "\
Commands:
  help            Show this help message
  list            List all bots
  create <type>   Create a bot (problem-solver, task-automation, interactive)
  solve <text>    Solve a problem with a problem-solver bot
  run <bot> [in]  Run a bot by id or name with optional input
  quit | exit     Leave the shell
";

fn run_shell_command(config_path: &Path) -> Result<(), FxlabError> {
    let mut manager = open_manager(config_path)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_shell(&mut manager, stdin.lock(), stdout.lock())?;
    Ok(())
}

/// Read-eval loop over `input` until EOF or `quit`. Command failures are
/// reported inline and the loop continues.
pub fn run_shell<R: BufRead, W: Write>(
    manager: &mut BotManager,
    input: R,
    mut output: W,
) -> Result<(), FxlabError> {
    writeln!(output, "fxlab bot shell. Type 'help' for commands or 'quit' to exit.")?;
    let mut lines = input.lines();

    loop {
        write!(output, "> ")?;
        output.flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let line = line.trim();
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c.to_lowercase(), r.trim()),
            None => (line.to_lowercase(), ""),
        };

        let reply = match command.as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => Ok(SHELL_HELP.to_string()),
            "list" => Ok(format_bot_list(&manager.list_bots())),
            "create" if BOT_TYPES.contains(&rest) => manager
                .create_bot(rest, None, BotConfig::new())
                .map(|id| format!("Created {rest} bot with ID: {id}\n")),
            "create" => Ok(format!(
                "Invalid bot type. Available: {}\n",
                BOT_TYPES.join(", ")
            )),
            "solve" if !rest.is_empty() => solve_problem(manager, rest),
            "run" if !rest.is_empty() => {
                let (bot, bot_input) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                manager
                    .run_bot(bot, BotInput::parse(bot_input.trim()))
                    .and_then(|v| Ok(format!("{}\n", serde_json::to_string_pretty(&v)?)))
            }
            _ => Ok("Unknown command. Type 'help' for available commands.\n".to_string()),
        };

        match reply {
            Ok(text) => write!(output, "{text}")?,
            Err(e) => writeln!(output, "error: {e}")?,
        }
    }

    writeln!(output, "Goodbye.")?;
    Ok(())
}

fn run_trade(
    config_path: &Path,
    seed: Option<u64>,
    data_dir: Option<PathBuf>,
) -> Result<(), FxlabError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    eprintln!("Running strategy over {} pairs", config.trading_pairs.len());
    let mut bot = ForexBot::new(config.clone(), build_market(seed, data_dir));
    let analyses = bot.run_strategy();
    let sizes: Vec<f64> = analyses.iter().map(|a| bot.risk_sized_amount(a)).collect();

    print!("{}", format_trade_summary(&config, &analyses, &sizes));
    let status = bot.portfolio_status();
    println!(
        "Balance: {}  Open positions: {}  Total trades: {}",
        format_currency(status.balance, 2),
        status.open_positions,
        status.total_trades
    );
    Ok(())
}

/// One line per analysis. `sizes` holds the risk-sized amount for each pair.
pub fn format_trade_summary(
    config: &AppConfig,
    analyses: &[MarketAnalysis],
    sizes: &[f64],
) -> String {
    let settings = &config.indicators;
    let labels = [
        IndicatorType::Sma(settings.sma_period),
        IndicatorType::Ema(settings.ema_period),
        IndicatorType::Rsi(settings.rsi_period),
    ];

    let mut out = String::new();
    for (a, size) in analyses.iter().zip(sizes) {
        let _ = write!(
            out,
            "{:<8} {:<4} {:<8} price {:.4} vol {:.2} size {}",
            a.pair,
            a.signal.to_string(),
            a.trend.to_string(),
            a.price,
            a.volatility,
            format_currency(*size, 2)
        );
        if let Some(ind) = &a.indicators {
            let values = [ind.sma, ind.ema, Some(ind.rsi)];
            for (label, value) in labels.iter().zip(values) {
                match value {
                    Some(v) => {
                        let _ = write!(out, "  {label} {v:.4}");
                    }
                    None => {
                        let _ = write!(out, "  {label} n/a");
                    }
                }
            }
        }
        out.push('\n');
    }
    out
}

fn run_backtest_command(
    config_path: &Path,
    days: usize,
    seed: Option<u64>,
    data_dir: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), FxlabError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let bt_config = BacktestConfig::from_app_config(&config, days, Local::now().naive_local());
    eprintln!("Running backtest for {days} days...");
    let mut market = build_market(seed, data_dir);
    let result = run_backtest(market.as_mut(), &bt_config)?;

    let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE));
    JsonReportAdapter.write(&result, &output)?;
    info!(path = %output.display(), "backtest results saved");
    eprintln!("Backtest results saved to {}", output.display());

    print!("{}", format_backtest_summary(&result));
    Ok(())
}

pub fn format_backtest_summary(result: &BacktestResult) -> String {
    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "BACKTEST RESULTS SUMMARY");
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(
        out,
        "Test Period: {} to {}",
        result.start_date.format("%Y-%m-%d"),
        result.end_date.format("%Y-%m-%d")
    );
    let _ = writeln!(out, "Initial Balance: {}", format_currency(result.initial_balance, 2));
    let _ = writeln!(out, "Final Balance: {}", format_currency(result.final_balance, 2));
    let _ = writeln!(
        out,
        "Total Return: {}",
        format_currency(result.final_balance - result.initial_balance, 2)
    );
    let _ = writeln!(out, "ROI: {:.2}%", result.roi);
    let _ = writeln!(out, "Total Trades: {}", result.total_trades);
    let _ = writeln!(out, "Winning Trades: {}", result.winning_trades);
    let _ = writeln!(out, "Losing Trades: {}", result.losing_trades);
    let _ = writeln!(out, "Win Rate: {:.1}%", result.win_rate);
    let _ = writeln!(out, "Total Profit: {}", format_currency(result.total_profit, 2));
    let _ = writeln!(out, "Total Loss: {}", format_currency(result.total_loss, 2));
    let _ = writeln!(out, "Max Drawdown: {:.2}%", result.max_drawdown);
    let _ = writeln!(out, "Pairs Tested: {}", result.pairs_tested.join(", "));
    let _ = writeln!(out, "{rule}");
    out
}

fn run_config(config_path: &Path, action: ConfigAction) -> Result<(), FxlabError> {
    let adapter = JsonConfigAdapter::new(config_path);
    match action {
        ConfigAction::Show => {
            let config = adapter.load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Validate => {
            validate_config(&adapter.load()?)?;
            println!("Configuration {} is valid", config_path.display());
        }
        ConfigAction::Init { force } => {
            if config_path.exists() && !force {
                return Err(FxlabError::ConfigInvalid {
                    key: config_path.display().to_string(),
                    reason: "file already exists (use --force to overwrite)".into(),
                });
            }
            adapter.save(&AppConfig::default())?;
            println!("Wrote default configuration to {}", config_path.display());
        }
        ConfigAction::Set { key, value } => {
            let value = serde_json::from_str::<Value>(&value).unwrap_or(Value::String(value));
            let mut patch = serde_json::Map::new();
            patch.insert(key.clone(), value);
            adapter.update(&Value::Object(patch))?;
            println!("Set {key} in {}", adapter.path().display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["fxlab", "list-bots", "--config", "x.json", "-v"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("x.json"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Command::ListBots)));
    }

    #[test]
    fn backtest_days_default() {
        let cli = Cli::try_parse_from(["fxlab", "backtest", "--seed", "7"]).unwrap();
        match cli.command {
            Some(Command::Backtest { days, seed, .. }) => {
                assert_eq!(days, DEFAULT_BACKTEST_DAYS);
                assert_eq!(seed, Some(7));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn backtest_days_out_of_range_rejected() {
        let too_long = (MAX_BACKTEST_DAYS + 1).to_string();
        for days in ["0", too_long.as_str(), "100000000000"] {
            assert!(Cli::try_parse_from(["fxlab", "backtest", "--days", days]).is_err());
        }
        let max = MAX_BACKTEST_DAYS.to_string();
        assert!(Cli::try_parse_from(["fxlab", "backtest", "--days", max.as_str()]).is_ok());
    }

    #[test]
    fn config_set_parses_key_and_value() {
        let cli = Cli::try_parse_from(["fxlab", "config", "set", "max_positions", "2"]).unwrap();
        match cli.command {
            Some(Command::Config {
                action: ConfigAction::Set { key, value },
            }) => {
                assert_eq!(key, "max_positions");
                assert_eq!(value, "2");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        let argv = ["fxlab", "config", "set", "trade_amount", "-5"];
        assert!(Cli::try_parse_from(argv).is_ok());
    }

    #[test]
    fn trade_summary_shows_risk_size() {
        use crate::domain::analysis::MarketConditions;
        use crate::domain::signal::Trend;

        let analysis = MarketAnalysis::from_conditions(
            "EUR/USD",
            1.1,
            &MarketConditions {
                trend: Trend::Bullish,
                volatility: 0.1,
                support_level: 1.0,
                resistance_level: 1.2,
            },
        );
        let summary = format_trade_summary(&AppConfig::default(), &[analysis], &[2_000.0]);
        assert!(summary.starts_with("EUR/USD"));
        assert!(summary.contains("size $2,000.00"), "{summary}");
        assert_eq!(summary.lines().count(), 1);
    }

    #[test]
    fn no_subcommand_means_shell() {
        let cli = Cli::try_parse_from(["fxlab"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn registry_path_follows_config_dir() {
        let config = AppConfig::default();
        assert_eq!(
            registry_path(Path::new("/tmp/fx/config.json"), &config),
            PathBuf::from("/tmp/fx/bot_registry.json")
        );
        assert_eq!(
            registry_path(Path::new("config.json"), &config),
            PathBuf::from("bot_registry.json")
        );
    }

    #[test]
    fn empty_bot_list_message() {
        assert!(format_bot_list(&[]).starts_with("No bots found"));
    }
}
