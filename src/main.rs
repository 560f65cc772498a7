//! expense-splitter CLI
//!
//! Run the shared-expense engine over a JSON ledger snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Net balance per participant
//! expense-splitter balances --input ledger.json
//!
//! # Who pays whom, as JSON
//! expense-splitter settle --input ledger.json --format json
//!
//! # Expenses that best fill a budget of 250
//! expense-splitter optimize --input ledger.json --target 250
//!
//! # Spread settlements over two weeks
//! expense-splitter schedule --input ledger.json --start 2024-03-01 --days 14
//!
//! # Generate a random ledger for testing
//! expense-splitter generate --participants 6 --expenses 40
//! ```

use chrono::NaiveDate;
use expense_splitter::config::EngineConfig;
use expense_splitter::core::balance::{BalanceCalculator, Balances};
use expense_splitter::core::expense::Ledger;
use expense_splitter::optimization::categorizer::Categorizer;
use expense_splitter::optimization::scheduler::PaymentScheduler;
use expense_splitter::optimization::settlement::SettlementPlan;
use expense_splitter::optimization::subset::SubsetOptimizer;
use expense_splitter::simulation::ledger_generator::{generate_random_ledger, LedgerConfig};
use rust_decimal::Decimal;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"expense-splitter — shared expenses, balances and settlements

USAGE:
    expense-splitter [GLOBAL OPTIONS] <COMMAND> [OPTIONS]

COMMANDS:
    balances    Net balance of every participant
    settle      Minimal list of transfers that settles the group
    optimize    Expenses whose total best fills a target amount
    categorize  Group expenses into categories by amount
    schedule    Assign due dates to the settlements
    generate    Generate a random ledger (for testing)
    help        Show this message

GLOBAL OPTIONS:
    --config <FILE>     JSON engine configuration
    -v, --verbose       Debug logging (RUST_LOG overrides)

OPTIONS (balances, settle, optimize, categorize, schedule):
    --input <FILE>      Path to JSON ledger file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (optimize):
    --target <AMOUNT>   Amount to fill without exceeding it

OPTIONS (categorize):
    --k <N>             Number of categories (default from config: 3)

OPTIONS (schedule):
    --start <DATE>      First day of the window, YYYY-MM-DD (default: today)
    --days <N>          Length of the window in days (default from config: 30)

OPTIONS (generate):
    --participants <N>  Number of participants (default: 5)
    --expenses <N>      Number of expenses (default: 20)
    --seed <N>          Seed for a reproducible ledger
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    expense-splitter settle --input ledger.json
    expense-splitter optimize --input ledger.json --target 120.50 --format json
    expense-splitter categorize --input ledger.json --k 4
    expense-splitter --config engine.json schedule --input ledger.json --days 14"#
    );
}

/// Options shared by the commands that read a ledger.
struct LedgerOptions {
    input: String,
    json: bool,
    /// Command-specific `--name value` pairs.
    extra: Vec<(String, String)>,
}

impl LedgerOptions {
    fn get(&self, name: &str) -> Option<&str> {
        self.extra
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn parse_ledger_options(args: &[String], allowed: &[&str]) -> LedgerOptions {
    let mut input = None;
    let mut format = "text".to_string();
    let mut extra = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = || {
            args.get(i + 1)
                .cloned()
                .unwrap_or_else(|| fail(format!("{} requires a value", flag)))
        };
        match flag {
            "--input" => input = Some(value()),
            "--format" => format = value(),
            f if allowed.contains(&f) => extra.push((f.to_string(), value())),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 2;
    }

    if format != "text" && format != "json" {
        fail(format!("--format must be 'text' or 'json', got '{}'", format));
    }

    LedgerOptions {
        input: input.unwrap_or_else(|| fail("--input <FILE> is required")),
        json: format == "json",
        extra,
    }
}

fn load_ledger(path: &str) -> Ledger {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));

    let ledger: Ledger = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "participants": [{{ "id": "1", "name": "Anannya" }}],
  "expenses": [
    {{ "id": "e1", "description": "Dinner", "amount": "90",
      "contributions": [{{ "participant_id": "1", "amount": "90" }}],
      "split_with": ["1"] }}
  ]
}}"#
        );
        process::exit(1);
    });

    if let Err(e) = ledger.validate() {
        fail(e);
    }
    log::debug!(
        "loaded {} participants and {} expenses from {}",
        ledger.participants().len(),
        ledger.expenses().len(),
        path
    );
    ledger
}

fn balances_of(ledger: &Ledger) -> Balances {
    BalanceCalculator::compute(ledger.participants(), ledger.expenses()).unwrap_or_else(|e| fail(e))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn parse_number<T: std::str::FromStr>(opts: &LedgerOptions, name: &str) -> Option<T> {
    opts.get(name).map(|raw| {
        raw.parse()
            .unwrap_or_else(|_| fail(format!("{} requires a number, got '{}'", name, raw)))
    })
}

fn cmd_balances(args: &[String]) {
    let opts = parse_ledger_options(args, &[]);
    let ledger = load_ledger(&opts.input);
    let balances = balances_of(&ledger);

    if opts.json {
        print_json(&balances);
    } else {
        print!("{}", balances);
        println!("Total spent:     {}", ledger.total_spent());
    }
}

fn cmd_settle(args: &[String]) {
    let opts = parse_ledger_options(args, &[]);
    let ledger = load_ledger(&opts.input);
    let plan = SettlementPlan::from_balances(&balances_of(&ledger), ledger.participants());

    if opts.json {
        print_json(&plan);
    } else {
        print!("{}", plan);
    }
}

fn cmd_optimize(args: &[String], config: &EngineConfig) {
    let opts = parse_ledger_options(args, &["--target"]);
    let target: Decimal =
        parse_number(&opts, "--target").unwrap_or_else(|| fail("--target <AMOUNT> is required"));
    if target <= Decimal::ZERO {
        fail("please enter a positive target amount");
    }
    let ledger = load_ledger(&opts.input);
    let selection =
        SubsetOptimizer::select(ledger.expenses(), target, config).unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&selection);
    } else {
        print!("{}", selection);
    }
}

fn cmd_categorize(args: &[String], config: &EngineConfig) {
    let opts = parse_ledger_options(args, &["--k"]);
    let k: usize = parse_number(&opts, "--k").unwrap_or(config.default_categories);
    let ledger = load_ledger(&opts.input);
    let categories = Categorizer::categorize_with(ledger.expenses(), k, config);

    if opts.json {
        print_json(&categories);
    } else if categories.is_empty() {
        println!("No expenses to categorize.");
    } else {
        let spent = ledger.total_spent();
        for category in &categories {
            print!("{}", category);
            println!("  Share of spending: {}%", category.share_of(spent));
            println!();
        }
    }
}

fn cmd_schedule(args: &[String], config: &EngineConfig) {
    let opts = parse_ledger_options(args, &["--start", "--days"]);
    let start = match opts.get("--start") {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .unwrap_or_else(|e| fail(format!("invalid --start '{}': {}", raw, e))),
        None => chrono::Local::now().date_naive(),
    };
    let days: u32 = parse_number(&opts, "--days").unwrap_or(config.default_schedule_days);

    let ledger = load_ledger(&opts.input);
    let plan = SettlementPlan::from_balances(&balances_of(&ledger), ledger.participants());
    let schedule = PaymentScheduler::schedule(plan.settlements(), start, days);

    if opts.json {
        print_json(&schedule);
    } else if schedule.is_empty() {
        println!("No payments to schedule.");
    } else {
        println!("=== Payment Schedule ===");
        for payment in &schedule {
            println!("  {}", payment);
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = LedgerConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let value = args
            .get(i + 1)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        let number = || {
            value
                .parse::<u64>()
                .unwrap_or_else(|_| fail(format!("{} requires a number", flag)))
        };
        match flag {
            "--participants" => config.participant_count = number() as usize,
            "--expenses" => config.expense_count = number() as usize,
            "--seed" => config.seed = Some(number()),
            "--output" => output_path = Some(value.clone()),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 2;
    }

    let ledger = generate_random_ledger(&config);
    let json = serde_json::to_string_pretty(&ledger).unwrap_or_else(|e| fail(e));

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            ledger.expenses().len(),
            ledger.participants().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() {
    let mut args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    args.retain(|a| a != "-v" && a != "--verbose");
    init_logging(verbose);

    let mut config = EngineConfig::default();
    if args.first().map(String::as_str) == Some("--config") {
        let path = args
            .get(1)
            .cloned()
            .unwrap_or_else(|| fail("--config requires a file path"));
        config = EngineConfig::load(&path).unwrap_or_else(|e| fail(e));
        args.drain(..2);
    }

    if args.is_empty() {
        print_usage();
        process::exit(1);
    }

    let command = args[0].as_str();
    let rest = &args[1..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "optimize" => cmd_optimize(rest, &config),
        "categorize" => cmd_categorize(rest, &config),
        "schedule" => cmd_schedule(rest, &config),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
