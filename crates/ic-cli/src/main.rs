//! CLI frontend for the Ironclaw dice pool engine.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ic",
    about = "Ironclaw dice pools, gift rules and derived stats",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which preset pool to build.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ActionArg {
    /// Attack with --item
    Attack,
    /// Dodge
    Dodge,
    /// Parry with --item
    Parry,
    /// Any other defense
    Defense,
    /// Counterattack with --item
    Counter,
    /// Resist an effect
    Resist,
    /// Soak damage
    Soak,
    /// Roll initiative
    Initiative,
    /// Sprint
    Sprint,
    /// Check with --stats
    Skill,
    /// Roll --gifts
    Gifts,
}

#[derive(Subcommand)]
enum Commands {
    /// Show traits, skills and derived stats of an actor
    Stats {
        /// Actor JSON file
        actor: PathBuf,

        /// Engine configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Build a dice pool for a roll
    Pool {
        /// Actor JSON file
        actor: PathBuf,

        /// The roll to build
        #[arg(short, long, value_enum, default_value = "skill")]
        action: ActionArg,

        /// Weapon used for attack, parry and counter
        #[arg(short, long)]
        item: Option<String>,

        /// Stats for skill checks, comma separated
        #[arg(short, long, default_value = "")]
        stats: String,

        /// Gifts to roll, comma separated
        #[arg(short, long, default_value = "")]
        gifts: String,

        /// Extra dice, such as "d6, 2d4"
        #[arg(short, long, default_value = "")]
        extra: String,

        /// Cap every die at a stat, die or face number
        #[arg(short, long)]
        limit: Option<String>,

        /// Descriptors of the opposing item, comma separated
        #[arg(long)]
        against: Option<String>,

        /// Extra active conditions, comma separated
        #[arg(long, default_value = "")]
        conditions: String,

        /// Roll every die twice
        #[arg(long)]
        weak: bool,

        /// Treat the actor as burdened
        #[arg(long)]
        burdened: bool,

        /// Leave worn armor unchecked on soak rolls
        #[arg(long)]
        no_armor: bool,

        /// Engine configuration JSON file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate an actor's stats and gift rules
    Check {
        /// Actor JSON file
        actor: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Stats { actor, config } => commands::stats::run(&actor, config.as_deref()),
        Commands::Pool {
            actor,
            action,
            item,
            stats,
            gifts,
            extra,
            limit,
            against,
            conditions,
            weak,
            burdened,
            no_armor,
            config,
        } => commands::pool::run(commands::pool::PoolArgs {
            actor: &actor,
            config: config.as_deref(),
            action,
            item: item.as_deref(),
            stats: &stats,
            gifts: &gifts,
            extra: &extra,
            limit: limit.as_deref(),
            against: against.as_deref(),
            conditions: &conditions,
            weak,
            burdened,
            autocheck_armor: !no_armor,
        }),
        Commands::Check { actor } => commands::check::run(&actor),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
