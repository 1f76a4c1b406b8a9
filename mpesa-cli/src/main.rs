use anyhow::Result;
use clap::{Parser, Subcommand};
use mpesa_finance::FlowKind;

mod analyze;
mod config;
mod explore;
mod input;
mod logging;
mod output;
mod session;
mod state;

use analyze::ViewArgs;
use input::InputArgs;
use session::Session;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MPESA_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "mpesa",
    version = VERSION,
    about = "M-Pesa statement ledger and spending analysis"
)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals, a ledger preview, and top categories
    Summary {
        #[arg(long)]
        top: Option<usize>,
    },

    /// Analyze withdrawals
    Expenses(ViewArgs),

    /// Analyze money received
    Receipts(ViewArgs),

    /// Print the normalized ledger
    Ledger {
        /// JSON with UTC timestamps
        #[arg(long)]
        json: bool,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Interactive session with sticky filters
    Explore,

    /// Manage ~/.mpesa/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(),
            ConfigCommand::Show => config::show_config(),
        },

        Command::Explore => {
            let cfg = config::load_config()?;
            explore::run_explore(&cfg, &cli.input)
        }

        Command::Summary { top } => {
            let cfg = config::load_config()?;
            with_ledger(&cfg, &cli.input, |ledger| {
                analyze::run_summary(ledger, &cfg, top);
                Ok(())
            })
        }

        Command::Expenses(args) => {
            let cfg = config::load_config()?;
            with_ledger(&cfg, &cli.input, |ledger| {
                analyze::run_view(ledger, FlowKind::Outflow, &args, &cfg)
            })
        }

        Command::Receipts(args) => {
            let cfg = config::load_config()?;
            with_ledger(&cfg, &cli.input, |ledger| {
                analyze::run_view(ledger, FlowKind::Inflow, &args, &cfg)
            })
        }

        Command::Ledger { json, limit } => {
            let cfg = config::load_config()?;
            with_ledger(&cfg, &cli.input, |ledger| {
                analyze::run_ledger(ledger, &cfg, json, limit)
            })
        }
    }
}

fn with_ledger(
    cfg: &config::Config,
    args: &InputArgs,
    f: impl FnOnce(&mpesa_core::Ledger) -> Result<()>,
) -> Result<()> {
    let source = args.require_source()?;
    let password = input::resolve_password(&source, args.password.as_deref())?;
    let mut session = Session::new(cfg.ledger_builder(args.policy, args.strict_nulls));
    let ledger = session.ledger(source.upload_key(&password)?, || {
        source.load_tables(cfg, &password)
    })?;
    f(ledger)
}
