use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use messmate::cli::{
    handle_balance_command, handle_expense_command, handle_export_command, handle_fund_command,
    handle_member_command, handle_mess_command, handle_settle_command,
};
use messmate::config::{paths::MessMatePaths, settings::Settings};
use messmate::storage::Storage;

#[derive(Parser)]
#[command(
    name = "messmate",
    version,
    about = "Shared-living expense tracker",
    long_about = "MessMate keeps the books for a shared household (a \"mess\"): \
                  a pooled fund, shared expenses split equally or by percentage, \
                  each member's running balance and the fewest transfers that \
                  settle everyone up."
)]
struct Cli {
    /// Member to act as (name or ID)
    #[arg(long = "as", global = true, env = "MESSMATE_MEMBER", value_name = "MEMBER")]
    actor: Option<String>,

    /// Log level written to stderr (ignored when RUST_LOG is set)
    #[arg(long, global = true, env = "MESSMATE_LOG", default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory
    Init,

    /// Show current configuration and paths
    Config,

    /// Member registration commands
    #[command(subcommand)]
    Member(messmate::cli::MemberCommands),

    /// Mess and roster commands
    #[command(subcommand)]
    Mess(messmate::cli::MessCommands),

    /// Expense commands
    #[command(subcommand, alias = "exp")]
    Expense(messmate::cli::ExpenseCommands),

    /// Pooled fund commands
    #[command(subcommand)]
    Fund(messmate::cli::FundCommands),

    /// Balance commands
    #[command(subcommand)]
    Balance(messmate::cli::BalanceCommands),

    /// Settlement commands
    #[command(subcommand)]
    Settle(messmate::cli::SettleCommands),

    /// Export reports
    #[command(subcommand)]
    Export(messmate::cli::ExportCommands),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);
    debug!("Log level set to {}", cli.log_level.to_string().to_lowercase());

    // Initialize paths and settings
    let paths = MessMatePaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    let actor = cli.actor.as_deref();

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing MessMate at: {}", paths.base_dir().display());
            if messmate::storage::initialize_storage(&paths)? {
                println!("Initialization complete!");
                println!();
                println!("Next steps:");
                println!("  messmate member add <name>");
                println!("  messmate --as <name> mess create <mess>");
            } else {
                println!("Already initialized; existing data was left untouched.");
            }
        }
        Some(Commands::Config) => {
            println!("MessMate Configuration");
            println!("======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Export directory: {}", paths.export_dir().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:      {}", settings.currency_symbol);
            println!("  Date format:          {}", settings.date_format);
            println!("  Default member limit: {}", settings.member_limit());
            println!("  Default split method: {}", settings.default_split_method);
        }
        Some(Commands::Member(cmd)) => {
            handle_member_command(&storage, cmd)?;
        }
        Some(Commands::Mess(cmd)) => {
            handle_mess_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            handle_expense_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Fund(cmd)) => {
            handle_fund_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Balance(cmd)) => {
            handle_balance_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Settle(cmd)) => {
            handle_settle_command(&storage, &settings, actor, cmd)?;
        }
        Some(Commands::Export(cmd)) => {
            handle_export_command(&storage, actor, cmd)?;
        }
        None => {
            println!("MessMate - Shared-living expense tracker");
            println!();
            println!("Run 'messmate --help' for usage information.");
        }
    }

    Ok(())
}

/// Log to stderr, honouring RUST_LOG when it is set
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => EnvFilter::from_default_env(),
        None => EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
