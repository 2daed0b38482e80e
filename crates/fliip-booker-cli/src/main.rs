use clap::{ArgAction, Parser, Subcommand};
use class_booking_config::PathManager;
use commands::{config, daemon, plan, register};

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "fliip-booker")]
#[command(about = "fliip-booker - Book your recurring Fliip gym classes automatically")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register for the configured classes (one-time run)
    #[command(long_about = "Log in to the gym portal, page through the weekly calendars and register for every configured class whose registration window is open. Exits with an error when the run is aborted (for example when the membership has no sessions left).")]
    Register {
        /// Number of calendar weeks to process (overrides booking.max_weeks)
        #[arg(long, value_name = "N")]
        weeks: Option<usize>,

        /// Show the browser window instead of running headless
        #[arg(long, action = ArgAction::SetTrue)]
        show_browser: bool,
    },
    /// List the classes the next run would consider, without opening a browser
    Plan {
        /// Number of calendar weeks to list (overrides booking.max_weeks)
        #[arg(long, value_name = "N")]
        weeks: Option<usize>,
    },
    /// Run registrations on a schedule
    #[command(long_about = "Run fliip-booker in the foreground and register on a cron schedule. Each run uses a fresh browser session. Logs go to a daily-rotating file in the logs directory.")]
    Daemon {
        /// Cron schedule with seconds (e.g. '0 0 12 * * *' for every day at noon)
        #[arg(long, value_name = "SCHEDULE")]
        schedule: Option<String>,

        /// Skip the registration run on startup
        #[arg(long, action = ArgAction::SetTrue)]
        no_startup_run: bool,
    },
    /// Manage configuration and credentials
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the current configuration
    Show,

    /// Write a starter configuration file
    Init {
        /// Gym subdomain, as in https://<gym>.fliipapp.com
        #[arg(long)]
        gym: String,

        /// Portal username (e-mail)
        #[arg(long)]
        username: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },

    /// Store the portal password in the credentials file
    SetPassword,

    /// Print the directories and files fliip-booker uses
    Path,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let paths = PathManager::default();

    // The daemon writes to rotating log files; everything else logs to stderr
    let log_file = match cli.command {
        Commands::Daemon { .. } => Some(paths.daemon_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Register { weeks, show_browser } => {
            register::run_register(&paths, weeks, show_browser, &output).await
        }
        Commands::Plan { weeks } => plan::run_plan(&paths, weeks, &output),
        Commands::Daemon {
            schedule,
            no_startup_run,
        } => daemon::run_daemon(paths, schedule, no_startup_run, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &paths, &output),
    }
}
