//! monetary-engine CLI
//!
//! Run the engine's calculations from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Split a total into installments
//! monetary-engine schedule --total 840.00 --count 4 --first-due 2024-01-31
//!
//! # Interest and penalty for a late payment
//! monetary-engine accrue --principal 1500.00 --due 2024-03-01 --date 2024-03-16 --config rates.json
//!
//! # Fund payables from a cash balance
//! monetary-engine allocate --input payables.json --cash 10000.00 --format json
//!
//! # Generate a random payables file for testing
//! monetary-engine generate --obligations 40 --counterparties 8
//! ```

use chrono::NaiveDate;
use monetary_engine::accrual::calculator::AccrualCalculator;
use monetary_engine::config::EngineConfig;
use monetary_engine::core::inventory::LineItem;
use monetary_engine::core::money::Money;
use monetary_engine::core::obligation::{Obligation, ObligationKind, PriorityClass};
use monetary_engine::core::party::CounterpartyId;
use monetary_engine::costing::proration::ProrationEngine;
use monetary_engine::schedule::installments::InstallmentScheduler;
use monetary_engine::settlement::prioritization::PaymentPrioritizationEngine;
use monetary_engine::simulation::stress_test::{generate_random_portfolio, PortfolioConfig};
use monetary_engine::tax::withholding::TaxWithholdingCalculator;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"monetary-engine: installment, accrual, costing and withholding calculations

USAGE:
    monetary-engine <COMMAND> [OPTIONS]

COMMANDS:
    schedule    Split a total into installments
    accrue      Interest, penalty or discount on a principal at a date
    withhold    Statutory withholdings on a gross amount
    prorate     Distribute freight, insurance and tax over line items
    allocate    Choose which payables a cash balance funds
    generate    Generate a random payables file (for testing)
    help        Show this message

COMMON OPTIONS:
    --config <FILE>     JSON file with rates and defaults
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (schedule):
    --total <AMOUNT>    Amount to split
    --count <N>         Number of installments (default from config)
    --first-due <DATE>  Due date of the first installment (YYYY-MM-DD)
    --interval <DAYS>   Days between installments (default from config)

OPTIONS (accrue):
    --principal <AMOUNT>
    --due <DATE>
    --date <DATE>       Reference date

OPTIONS (withhold):
    --gross <AMOUNT>
    --rate <NAME=RATE>  Withholding rate, repeatable (adds to config rates)

OPTIONS (prorate):
    --input <FILE>      JSON purchase file

OPTIONS (allocate):
    --input <FILE>      JSON payables file
    --cash <AMOUNT>     Available cash

OPTIONS (generate):
    --obligations <N>     Number of payables (default: 30)
    --counterparties <N>  Number of suppliers (default: 10)
    --output <FILE>       Write to file instead of stdout

EXAMPLES:
    monetary-engine schedule --total 1000.00 --count 3 --first-due 2024-02-01
    monetary-engine withhold --gross 5000.00 --rate irrf=0.015 --rate iss=0.05
    monetary-engine prorate --input purchase.json --format json
    monetary-engine generate --obligations 60 --output payables.json"#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Options shared by every command, plus the command-specific flags.
struct Options {
    config: EngineConfig,
    json: bool,
    flags: Vec<(String, String)>,
}

impl Options {
    fn parse(args: &[String]) -> Self {
        let mut config_path = None;
        let mut json = false;
        let mut flags = Vec::new();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            if !flag.starts_with("--") {
                fail(format!("unexpected argument '{}'", flag));
            }
            i += 1;
            let value = args
                .get(i)
                .cloned()
                .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
            match flag {
                "--config" => config_path = Some(value),
                "--format" => match value.as_str() {
                    "json" => json = true,
                    "text" => json = false,
                    other => fail(format!("unknown format '{}'", other)),
                },
                _ => flags.push((flag.to_string(), value)),
            }
            i += 1;
        }

        let config = match config_path {
            Some(path) => EngineConfig::load(&path).unwrap_or_else(|e| fail(e)),
            None => EngineConfig::default(),
        };
        Self {
            config,
            json,
            flags,
        }
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.flags
            .iter()
            .rev()
            .find(|(flag, _)| flag == name)
            .map(|(_, value)| value.as_str())
    }

    fn all(&self, name: &str) -> impl Iterator<Item = &str> {
        let name = name.to_string();
        self.flags
            .iter()
            .filter(move |(flag, _)| *flag == name)
            .map(|(_, value)| value.as_str())
    }

    fn required(&self, name: &str) -> &str {
        self.get(name)
            .unwrap_or_else(|| fail(format!("{} is required", name)))
    }

    fn money(&self, name: &str) -> Money {
        let raw = self.required(name);
        raw.parse()
            .unwrap_or_else(|e| fail(format!("{} '{}': {}", name, raw, e)))
    }

    fn date(&self, name: &str) -> NaiveDate {
        parse_date(self.required(name))
    }

    fn number(&self, name: &str, default: u32) -> u32 {
        match self.get(name) {
            Some(raw) => raw
                .parse()
                .unwrap_or_else(|_| fail(format!("{} requires a number", name))),
            None => default,
        }
    }

    fn reject_unknown(&self, known: &[&str]) {
        for (flag, _) in &self.flags {
            if !known.contains(&flag.as_str()) {
                fail(format!("unknown option: {}", flag));
            }
        }
    }
}

fn parse_date(raw: &str) -> NaiveDate {
    raw.parse()
        .unwrap_or_else(|_| fail(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(e),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str, expected: &str) -> T {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
    serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!("{}", expected);
        process::exit(1);
    })
}

fn cmd_schedule(opts: &Options) {
    opts.reject_unknown(&["--total", "--count", "--first-due", "--interval"]);
    let total = opts.money("--total");
    let count = opts.number("--count", opts.config.default_installments);
    let first_due = opts.date("--first-due");
    let interval = opts.number("--interval", opts.config.default_interval_days);

    let plan = InstallmentScheduler::schedule(total, count, first_due, interval)
        .unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&plan);
    } else {
        println!("=== Installment Plan ===");
        for installment in &plan {
            println!(
                "  #{:<3} {:>14}  due {}",
                installment.number, installment.value, installment.due_date
            );
        }
        println!("  Total {:>14}", InstallmentScheduler::total(&plan));
    }
}

fn cmd_accrue(opts: &Options) {
    opts.reject_unknown(&["--principal", "--due", "--date"]);
    let principal = opts.money("--principal");
    let due = opts.date("--due");
    let date = opts.date("--date");

    let result = AccrualCalculator::accrue(principal, due, date, &opts.config.accrual)
        .unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&result);
    } else {
        println!("=== Accrual ({:?}, {} days) ===", result.kind, result.days);
        println!("Principal: {:>14}", result.principal);
        println!("Interest:  {:>14}", result.interest);
        println!("Penalty:   {:>14}", result.penalty);
        println!("Discount:  {:>14}", result.discount);
        println!("Total:     {:>14}", result.total);
    }
}

fn cmd_withhold(opts: &Options) {
    opts.reject_unknown(&["--gross", "--rate"]);
    let gross = opts.money("--gross");

    let mut rates = opts.config.withholding.clone();
    for pair in opts.all("--rate") {
        let (name, rate) = pair
            .split_once('=')
            .unwrap_or_else(|| fail(format!("--rate expects NAME=RATE, got '{}'", pair)));
        let rate: Decimal = rate
            .parse()
            .unwrap_or_else(|e| fail(format!("rate '{}': {}", rate, e)));
        rates.insert(name.to_string(), rate);
    }

    let result = TaxWithholdingCalculator::withhold(gross, &rates).unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&result);
    } else {
        println!("=== Withholding ===");
        println!("Gross:    {:>14}", result.gross);
        for (name, amount) in &result.withheld {
            println!("  {:<7} {:>14}", name, amount);
        }
        println!("Withheld: {:>14}", result.total_withheld);
        println!("Net:      {:>14}", result.net);
    }
}

/// JSON schema for a purchase to prorate.
#[derive(serde::Deserialize)]
struct PurchaseFile {
    items: Vec<LineItem>,
    #[serde(default)]
    freight: Money,
    #[serde(default)]
    insurance: Money,
    #[serde(default)]
    tax: Money,
}

fn cmd_prorate(opts: &Options) {
    opts.reject_unknown(&["--input"]);
    let purchase: PurchaseFile = read_json(
        opts.required("--input"),
        r#"{
  "items": [ { "description": "widget", "quantity": "10", "unit_price": "25.00" } ],
  "freight": "50.00", "insurance": "10.00", "tax": "30.00"
}"#,
    );

    let allocations = ProrationEngine::prorate(
        &purchase.items,
        purchase.freight,
        purchase.insurance,
        purchase.tax,
    )
    .unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&allocations);
    } else {
        println!("=== Landed Cost ===");
        for a in &allocations {
            println!(
                "  {:<16} value {:>12}  freight {:>10}  insurance {:>10}  tax {:>10}  unit {}",
                a.description, a.line_value, a.freight_share, a.insurance_share, a.tax_share,
                a.landed_unit_cost
            );
        }
    }
}

/// JSON schema for payables to fund.
#[derive(serde::Deserialize, serde::Serialize)]
struct PayablesFile {
    obligations: Vec<PayableInput>,
}

#[derive(serde::Deserialize, serde::Serialize)]
struct PayableInput {
    counterparty: String,
    amount: Money,
    due_date: NaiveDate,
    #[serde(default)]
    priority: PriorityClass,
}

#[derive(Serialize)]
struct AllocationOutput {
    available_cash: Money,
    committed: Money,
    remaining: Money,
    utilization: f64,
    funded: Vec<AllocatedOutput>,
    deferred: Vec<AllocatedOutput>,
}

#[derive(Serialize)]
struct AllocatedOutput {
    counterparty: String,
    amount: Money,
    due_date: NaiveDate,
    priority: PriorityClass,
}

impl From<&Obligation> for AllocatedOutput {
    fn from(ob: &Obligation) -> Self {
        Self {
            counterparty: ob.counterparty().to_string(),
            amount: ob.outstanding(),
            due_date: ob.next_due_date(),
            priority: ob.priority_class(),
        }
    }
}

fn cmd_allocate(opts: &Options) {
    opts.reject_unknown(&["--input", "--cash"]);
    let file: PayablesFile = read_json(
        opts.required("--input"),
        r#"{
  "obligations": [
    { "counterparty": "SUP-001", "amount": "1200.00", "due_date": "2024-02-01", "priority": "high" }
  ]
}"#,
    );
    let cash = opts.money("--cash");

    let obligations: Vec<Obligation> = file
        .obligations
        .into_iter()
        .map(|p| {
            if !p.amount.is_positive() {
                fail(format!("amount for '{}' must be positive", p.counterparty));
            }
            Obligation::new(
                ObligationKind::Payable,
                CounterpartyId::new(p.counterparty),
                p.amount,
                p.due_date,
                p.due_date,
            )
            .with_priority(p.priority)
        })
        .collect();

    let result =
        PaymentPrioritizationEngine::allocate(cash, &obligations).unwrap_or_else(|e| fail(e));

    if opts.json {
        print_json(&AllocationOutput {
            available_cash: result.available_cash,
            committed: result.committed,
            remaining: result.remaining,
            utilization: result.utilization(),
            funded: result.funded.iter().map(AllocatedOutput::from).collect(),
            deferred: result.deferred.iter().map(AllocatedOutput::from).collect(),
        });
    } else {
        println!("{}", result);
    }
}

fn cmd_generate(opts: &Options) {
    opts.reject_unknown(&["--obligations", "--counterparties", "--output"]);
    let config = PortfolioConfig {
        obligation_count: opts.number("--obligations", 30) as usize,
        counterparty_count: opts.number("--counterparties", 10) as usize,
        max_installments: 1,
        ..Default::default()
    };

    let portfolio = generate_random_portfolio(&config);
    let output = PayablesFile {
        obligations: portfolio
            .obligations()
            .iter()
            .map(|ob| PayableInput {
                counterparty: ob.counterparty().to_string(),
                amount: ob.outstanding(),
                due_date: ob.next_due_date(),
                priority: ob.priority_class(),
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap_or_else(|e| fail(e));

    if let Some(path) = opts.get("--output") {
        fs::write(path, &json).unwrap_or_else(|e| fail(format!("writing '{}': {}", path, e)));
        eprintln!(
            "Generated {} payables across {} suppliers -> {}",
            portfolio.len(),
            portfolio.counterparties().len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    if matches!(command, "help" | "--help" | "-h") {
        print_usage();
        return;
    }

    let opts = Options::parse(&args[2..]);
    match command {
        "schedule" => cmd_schedule(&opts),
        "accrue" => cmd_accrue(&opts),
        "withhold" => cmd_withhold(&opts),
        "prorate" => cmd_prorate(&opts),
        "allocate" => cmd_allocate(&opts),
        "generate" => cmd_generate(&opts),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
