//! CLI definition and dispatch.
//!
//! Each invocation opens the ledger, runs one engine operation, and prints
//! what the engine returned. Nothing here computes domain values.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_export;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store::{JsonFileStore, DEFAULT_DATA_FILE};
use crate::domain::amount;
use crate::domain::config_validation::validate_config;
use crate::domain::error::LedgerError;
use crate::domain::export::format_cell;
use crate::domain::ledger::{Ledger, ResourceKind};
use crate::domain::record::RecordField;
use crate::domain::reference::{
    DEFAULT_ALT_CURRENCY, DEFAULT_FEED_URL, DEFAULT_ITEM_TYPES, DEFAULT_LEAGUE,
};
use crate::domain::sort::RowView;
use crate::domain::valuation::{ProfitTier, Resources, TierThresholds};
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::LedgerStore;

const FETCH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "flipledger", about = "Trade ledger for currency flips")]
pub struct Cli {
    /// INI configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Ledger document, overriding [ledger] data_file
    #[arg(short, long, global = true)]
    pub data: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a trade record
    Add {
        name: String,
        /// Buy price in chaos (decimal or a/b)
        #[arg(long)]
        buy: String,
        /// Sell price in chaos
        #[arg(long)]
        sell: String,
        /// Sell price in divines
        #[arg(long, default_value = "0")]
        alt_sell: String,
    },
    /// Change one price of a record
    Edit {
        index: usize,
        field: String,
        value: String,
    },
    /// Delete a record
    Delete { index: usize },
    /// Set on-hand currency
    SetResource {
        #[arg(value_enum)]
        kind: ResourceArg,
        quantity: String,
    },
    /// Set the divine to chaos ratio
    SetRatio { ratio: String },
    /// Set the flat side cost per unit traded
    SetAuxCost { cost: String },
    /// Set the flat fee per unit for converting divines back to chaos
    SetFee { fee: String },
    /// Show the ledger
    List {
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },
    /// Export records as CSV
    Export {
        #[arg(short, long)]
        output: PathBuf,
        /// Omit the UTF-8 byte order mark
        #[arg(long)]
        no_bom: bool,
    },
    /// Fetch reference prices and apply the alternate currency's value as the ratio
    RefreshRatio,
    /// Show the reference exchange rate between two items
    Rate {
        #[arg(long)]
        want: String,
        #[arg(long, default_value = "Chaos Orb")]
        have: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResourceArg {
    Base,
    Alt,
}

impl From<ResourceArg> for ResourceKind {
    fn from(arg: ResourceArg) -> Self {
        match arg {
            ResourceArg::Base => ResourceKind::Base,
            ResourceArg::Alt => ResourceKind::Alt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedSettings {
    pub base_url: String,
    pub league: String,
    pub item_types: Vec<String>,
    pub alt_currency: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub data_file: PathBuf,
    pub auxiliary_unit_cost: f64,
    pub conversion_fee_per_unit: f64,
    pub thresholds: TierThresholds,
    pub bom: bool,
    pub feed: FeedSettings,
}

impl Settings {
    /// Resources a brand-new ledger starts from.
    pub fn seed(&self) -> Resources {
        Resources {
            auxiliary_unit_cost: self.auxiliary_unit_cost,
            conversion_fee_per_unit: self.conversion_fee_per_unit,
            ..Resources::default()
        }
    }
}

pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flipledger=warn"));

    if std::env::var("FLIPLEDGER_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}

pub fn load_config(path: Option<&Path>) -> Result<FileConfigAdapter, LedgerError> {
    match path {
        Some(path) => FileConfigAdapter::from_file(path).map_err(|e| LedgerError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        }),
        None => Ok(FileConfigAdapter::empty()),
    }
}

pub fn build_settings(
    config: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<Settings, LedgerError> {
    validate_config(config)?;

    let data_file = match data_override {
        Some(path) => path.to_path_buf(),
        None => config
            .get_string("ledger", "data_file")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE)),
    };

    let defaults = TierThresholds::default();
    let feed = FeedSettings {
        base_url: config
            .get_string("feed", "base_url")
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string()),
        league: config
            .get_string("feed", "league")
            .unwrap_or_else(|| DEFAULT_LEAGUE.to_string()),
        item_types: config
            .get_list("feed", "item_types")
            .unwrap_or_else(|| DEFAULT_ITEM_TYPES.iter().map(|t| t.to_string()).collect()),
        alt_currency: config
            .get_string("feed", "alt_currency")
            .unwrap_or_else(|| DEFAULT_ALT_CURRENCY.to_string()),
    };

    Ok(Settings {
        data_file,
        auxiliary_unit_cost: config.get_double("ledger", "auxiliary_unit_cost", 0.0),
        conversion_fee_per_unit: config.get_double("ledger", "conversion_fee_per_unit", 0.0),
        thresholds: TierThresholds {
            elevated: config.get_double("display", "highlight_low", defaults.elevated),
            high: config.get_double("display", "highlight_high", defaults.high),
        },
        bom: config.get_bool("export", "bom", true),
        feed,
    })
}

pub fn run(cli: Cli) -> ExitCode {
    match try_run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !e.is_user_error() {
                tracing::error!(error = %e, "command failed");
            }
            eprint!("{}", describe_failure(&e));
            (&e).into()
        }
    }
}

/// Message printed for a failed command. Rejected input is reported as
/// leaving the ledger file untouched.
pub fn describe_failure(e: &LedgerError) -> String {
    if e.is_user_error() {
        format!("error: {e}\nnote: the ledger was not modified\n")
    } else {
        format!("error: {e}\n")
    }
}

fn try_run(cli: Cli) -> Result<(), LedgerError> {
    let config = load_config(cli.config.as_deref())?;
    let settings = build_settings(&config, cli.data.as_deref())?;

    if let Command::Rate { want, have } = &cli.command {
        return run_rate(&settings, want, have);
    }

    let store = JsonFileStore::new(&settings.data_file);
    let (mut ledger, load_error) = Ledger::open_or_default(store, settings.seed());
    if let Some(e) = load_error {
        eprintln!("warning: {e}");
        eprintln!("warning: continuing with an empty ledger");
    }

    execute(&mut ledger, &settings, cli.command)
}

/// Run one command against an open ledger.
pub fn execute<S: LedgerStore>(
    ledger: &mut Ledger<S>,
    settings: &Settings,
    command: Command,
) -> Result<(), LedgerError> {
    match command {
        Command::Add {
            name,
            buy,
            sell,
            alt_sell,
        } => {
            let record = ledger.add_record_text(&name, &buy, &sell, &alt_sell)?;
            println!(
                "added #{}: {} (profit c->c {:.2}, c->d {:.2}, qty {})",
                ledger.len() - 1,
                record.name,
                record.derived.profit_base_to_base,
                record.derived.profit_base_to_alt,
                record.derived.affordable_quantity,
            );
        }
        Command::Edit {
            index,
            field,
            value,
        } => {
            let record = ledger.edit_field(index, &field, &value)?;
            println!(
                "updated #{}: {} (profit c->c {:.2}, c->d {:.2}, qty {})",
                index,
                record.name,
                record.derived.profit_base_to_base,
                record.derived.profit_base_to_alt,
                record.derived.affordable_quantity,
            );
        }
        Command::Delete { index } => {
            ledger.delete_record(index)?;
            println!("deleted #{index}");
        }
        Command::SetResource { kind, quantity } => {
            let kind = ResourceKind::from(kind);
            let value = amount::parse_field(kind.key(), &quantity)?;
            ledger.set_resource(kind, value)?;
            println!("{} = {}", kind.key(), value);
        }
        Command::SetRatio { ratio } => {
            let value = amount::parse_field("dc_ratio", &ratio)?;
            ledger.set_exchange_ratio(value)?;
            println!("dc_ratio = {:.2}", value);
        }
        Command::SetAuxCost { cost } => {
            let value = amount::parse_field("item_coin_value", &cost)?;
            ledger.set_auxiliary_unit_cost(value)?;
            println!("item_coin_value = {:.2}", value);
        }
        Command::SetFee { fee } => {
            let value = amount::parse_field("conversion_coin_value", &fee)?;
            ledger.set_conversion_fee(value)?;
            println!("conversion_coin_value = {:.2}", value);
        }
        Command::List { sort, desc } => {
            if let Some(field) = sort {
                let field: RecordField = field.parse()?;
                ledger.sort_by_direction(field, desc);
            }
            print!("{}", render_table(&ledger.rows(), &settings.thresholds));
            print!("{}", render_resources(ledger.resources()));
        }
        Command::Export { output, no_bom } => {
            let bom = settings.bom && !no_bom;
            let count = csv_export::export_to_file(&output, ledger.export_records(), bom)?;
            println!("exported {} records to {}", count, output.display());
        }
        Command::RefreshRatio => {
            let ratio = refresh_ratio(ledger, settings)?;
            println!("dc_ratio = {:.2}", ratio);
        }
        Command::Rate { want, have } => run_rate(settings, &want, &have)?,
    }
    Ok(())
}

fn tier_marker(tier: ProfitTier) -> &'static str {
    match tier {
        ProfitTier::High => "**",
        ProfitTier::Elevated => "*",
        ProfitTier::Normal => "",
    }
}

const TABLE_COLUMNS: [RecordField; 10] = [
    RecordField::Name,
    RecordField::BuyPrice,
    RecordField::SellPriceBase,
    RecordField::SellPriceAlt,
    RecordField::ProfitBaseToBase,
    RecordField::ProfitBaseToAlt,
    RecordField::AffordableQuantity,
    RecordField::TotalProfitBaseToBase,
    RecordField::TotalProfitBaseToAlt,
    RecordField::AuxiliaryCostPerProfitAlt,
];

/// Plain-text table of `rows`, one line per record, marked by profit tier.
pub fn render_table(rows: &[RowView<'_>], thresholds: &TierThresholds) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:>3} {:<2}", "#", ""));
    for field in TABLE_COLUMNS {
        if field == RecordField::Name {
            out.push_str(&format!(" {:<24}", field.key()));
        } else {
            out.push_str(&format!(" {:>14}", field.key()));
        }
    }
    out.push('\n');

    for row in rows {
        let tier = thresholds.classify(&row.record.derived);
        out.push_str(&format!("{:>3} {:<2}", row.index, tier_marker(tier)));
        for field in TABLE_COLUMNS {
            let cell = format_cell(row.record, field);
            if field == RecordField::Name {
                out.push_str(&format!(" {:<24}", cell));
            } else {
                out.push_str(&format!(" {:>14}", cell));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_resources(res: &Resources) -> String {
    format!(
        "chaos: {}  divine: {}  dc_ratio: {:.2}  item_coin_value: {:.2}  conversion_coin_value: {:.2}\n",
        res.on_hand_base.floor(),
        res.on_hand_alt.floor(),
        res.exchange_ratio,
        res.auxiliary_unit_cost,
        res.conversion_fee_per_unit,
    )
}

#[cfg(feature = "fetch")]
fn build_feed(settings: &Settings) -> Result<crate::adapters::ninja_feed::NinjaFeed, LedgerError> {
    crate::adapters::ninja_feed::NinjaFeed::new(
        settings.feed.base_url.clone(),
        settings.feed.league.clone(),
        settings.feed.item_types.clone(),
    )
}

fn refresh_ratio<S: LedgerStore>(ledger: &mut Ledger<S>, settings: &Settings) -> Result<f64, LedgerError> {
    #[cfg(feature = "fetch")]
    {
        use crate::adapters::fetch_worker::spawn_fetch;

        eprintln!("Fetching reference prices for {}...", settings.feed.league);
        let pending = spawn_fetch(build_feed(settings)?);
        let prices = pending.wait_timeout(FETCH_TIMEOUT)?;
        ledger.apply_reference_prices(&prices, &settings.feed.alt_currency)
    }

    #[cfg(not(feature = "fetch"))]
    {
        let _ = (ledger, settings, FETCH_TIMEOUT);
        Err(LedgerError::fetch("fetch feature is required for refresh-ratio"))
    }
}

fn run_rate(settings: &Settings, want: &str, have: &str) -> Result<(), LedgerError> {
    #[cfg(feature = "fetch")]
    {
        use crate::adapters::fetch_worker::spawn_fetch;

        let prices = spawn_fetch(build_feed(settings)?).wait_timeout(FETCH_TIMEOUT)?;
        let rate = prices.exchange_rate(want, have)?;
        println!("1 {want} = {rate:.2} {have}");
        Ok(())
    }

    #[cfg(not(feature = "fetch"))]
    {
        let _ = (settings, want, have);
        Err(LedgerError::fetch("fetch feature is required for rate"))
    }
}
