// RATG fee calculator -- itemized attorney and court fees from the command line
//
// Usage:
//   ratg 15000 TP3A --unit-rate                       # base fee + 50% unit rate + VAT
//   ratg 100000 TP3A --parties 2 --court-fee --column civil
//   ratg 10000 court-fee --column debt --appeal       # court fee only
//   ratg 15000 TP3A_SESSION --multiplier 2.5          # 3 started hours
//   ratg 15000 TP3A --json                            # machine-readable output
//   ratg --list --catalog ratv.json                   # posts of a catalog file
//   RUST_LOG=debug ratg ...                           # trace every pipeline stage

mod report;

use ratg_engine::{
    CalculationConfig, CalculatorSettings, FeeAggregator, GkgColumn, GkgTable, Money,
    PartySurchargePolicy, TariffCatalog, TariffPost,
};
use rust_decimal::Decimal;
use std::process::ExitCode;
use std::str::FromStr;

// ─── CLI Parsing ────────────────────────────────────────────────────────────

enum Command {
    Calculate { value: Money, post: TariffPost },
    List,
}

struct CliArgs {
    command: Command,
    config: CalculationConfig,
    policy: Option<PartySurchargePolicy>,
    settings_path: Option<String>,
    catalog_path: Option<String>,
    gkg_path: Option<String>,
    json: bool,
}

const USAGE: &str = "usage: ratg --list [--catalog FILE] | ratg <value> <post> [--column C] [--appeal] [--multiplier N] \
[--unit-rate] [--parties N] [--foreign] [--court-fee] [--policy flat|graduated] \
[--settings FILE] [--catalog FILE] [--gkg FILE] [--json]";

fn next_arg<'a>(args: &'a [String], i: &mut usize, flag: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} needs a value"))
}

fn parse_decimal(s: &str, what: &str) -> Result<Decimal, String> {
    // accept 1'000'000 and 1_000_000
    let cleaned: String = s.chars().filter(|c| *c != '\'' && *c != '_').collect();
    Decimal::from_str(&cleaned).map_err(|e| format!("invalid {what} {s:?}: {e}"))
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut positional = Vec::new();
    let mut config = CalculationConfig::default();
    let mut policy = None;
    let mut settings_path = None;
    let mut catalog_path = None;
    let mut gkg_path = None;
    let mut json = false;
    let mut list = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--column" => {
                let s = next_arg(args, &mut i, "--column")?;
                config.gkg_column = Some(GkgColumn::from_str(s).map_err(|e| e.to_string())?);
            }
            "--appeal" => config.is_appeal = true,
            "--multiplier" | "--hours" => {
                config.multiplier = parse_decimal(next_arg(args, &mut i, "--multiplier")?, "multiplier")?;
            }
            "--unit-rate" => config.has_unit_rate = true,
            "--parties" => {
                let s = next_arg(args, &mut i, "--parties")?;
                config.additional_parties = s.parse().map_err(|e| format!("invalid --parties {s:?}: {e}"))?;
            }
            "--foreign" => config.is_foreign_client = true,
            "--court-fee" => config.include_court_fee = true,
            "--policy" => {
                policy = Some(match next_arg(args, &mut i, "--policy")? {
                    "flat" => PartySurchargePolicy::flat(),
                    "graduated" => PartySurchargePolicy::graduated(),
                    other => return Err(format!("unknown policy {other:?}")),
                });
            }
            "--settings" => settings_path = Some(next_arg(args, &mut i, "--settings")?.to_string()),
            "--catalog" => catalog_path = Some(next_arg(args, &mut i, "--catalog")?.to_string()),
            "--gkg" => gkg_path = Some(next_arg(args, &mut i, "--gkg")?.to_string()),
            "--json" => json = true,
            "--list" => list = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            arg if !arg.starts_with("--") => positional.push(arg.to_string()),
            other => return Err(format!("unknown argument {other:?}\n{USAGE}")),
        }
        i += 1;
    }

    let command = match positional.as_slice() {
        [] if list => Command::List,
        [value, post] if !list => Command::Calculate {
            value: Money(parse_decimal(value, "value")?),
            post: TariffPost::from_str(post).map_err(|e| e.to_string())?,
        },
        _ => return Err(USAGE.to_string()),
    };

    Ok(CliArgs { command, config, policy, settings_path, catalog_path, gkg_path, json })
}

fn read_file(path: &str) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))
}

fn build_aggregator(cli: &CliArgs) -> Result<FeeAggregator, String> {
    let mut settings = match &cli.settings_path {
        Some(path) => CalculatorSettings::from_json(&read_file(path)?).map_err(|e| e.to_string())?,
        None => CalculatorSettings::default(),
    };
    if let Some(policy) = &cli.policy {
        settings = settings.with_party_surcharge(policy.clone());
    }
    let catalog = match &cli.catalog_path {
        Some(path) => TariffCatalog::from_json(&read_file(path)?).map_err(|e| e.to_string())?,
        None => TariffCatalog::rev_2025(),
    };
    let gkg = match &cli.gkg_path {
        Some(path) => GkgTable::from_json(&read_file(path)?).map_err(|e| e.to_string())?,
        None => GkgTable::rev_2025(),
    };
    log::info!("catalog {:?}, court fees {:?}", catalog.name(), gkg.name);
    Ok(FeeAggregator::new(catalog, gkg, settings))
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };
    let aggregator = match build_aggregator(&cli) {
        Ok(aggregator) => aggregator,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let (value, post) = match cli.command {
        Command::List => {
            print!("{}", report::render_posts(&aggregator));
            return ExitCode::SUCCESS;
        }
        Command::Calculate { value, post } => (value, post),
    };

    let result = match aggregator.try_calculate(value, post, &cli.config) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("cannot serialize result: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report::render(value, &result, &aggregator));
    }
    ExitCode::SUCCESS
}
