//! Command-line host for the heads-up poker tools.
//!
//! Invokes the tool façade against an in-memory or PostgreSQL game store and
//! prints results as JSON.

use anyhow::{Error, bail};
use log::info;
use pico_args::Arguments;
use pt_cli::{
    commands,
    config::{AppConfig, StoreBackend},
    logging,
};
use serde_json::json;

const HELP: &str = "\
Drive heads-up Texas Hold'em hands through the poker tools

USAGE:
  pt_cli [OPTIONS] <COMMAND>

COMMANDS:
  tools                    Print the tool catalog
  call <TOOL>              Invoke one tool (see --args)
  session                  Run `<tool> <json>` lines read from stdin in one process
  list                     List stored games, newest first
  delete <GAME_ID>         Delete a stored game
  demo                     Play one complete hand and print every call

OPTIONS:
  --store      KIND        memory | postgres  [default: env POKER_STORE or memory]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --args       JSON        Arguments for `call`  [default: none]
  --limit      N           Rows for `list`  [default: 20]
  --bet        N           Matched bet per street for `demo`  [default: 20]

FLAGS:
  --fold                   End the `demo` hand with a fold after the flop
  -h, --help               Print help information

ENVIRONMENT:
  POKER_STORE              Game store backend
  DATABASE_URL             PostgreSQL connection string
  TABLE_MAILBOX_CAPACITY   Queued calls per game before callers wait
  RUST_LOG                 Log filter (logs go to stderr)
  (See DB_* variables for pool tuning)

The memory store lives only as long as the process: use `session` or `demo`
to play a hand with it.
";

enum Command {
    Tools,
    Call { tool: String, args: String },
    Session,
    List { limit: usize },
    Delete { game_id: String },
    Demo { bet: i64, fold: bool },
}

struct Args {
    store: Option<StoreBackend>,
    database_url: Option<String>,
    command: Command,
}

fn parse_args(mut pargs: Arguments) -> Result<Args, Error> {
    let store = pargs.opt_value_from_str("--store")?;
    let database_url = pargs.opt_value_from_str("--db-url")?;
    let call_args: Option<String> = pargs.opt_value_from_str("--args")?;
    let limit = pargs.opt_value_from_str("--limit")?.unwrap_or(20);
    let bet = pargs.opt_value_from_str("--bet")?.unwrap_or(20);
    let fold = pargs.contains("--fold");

    let subcommand: Option<String> = pargs.subcommand()?;
    let command = match subcommand.as_deref() {
        Some("tools") => Command::Tools,
        Some("call") => Command::Call {
            tool: pargs.free_from_str()?,
            args: call_args.unwrap_or_default(),
        },
        Some("session") => Command::Session,
        Some("list") => Command::List { limit },
        Some("delete") => Command::Delete {
            game_id: pargs.free_from_str()?,
        },
        Some("demo") => Command::Demo { bet, fold },
        Some(other) => bail!("Unknown command {other:?}, see --help"),
        None => bail!("No command given, see --help"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        bail!("Unexpected arguments: {remaining:?}");
    }

    Ok(Args {
        store,
        database_url,
        command,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = parse_args(pargs)?;

    logging::init();

    if let Command::Tools = args.command {
        println!("{}", serde_json::to_string_pretty(&commands::list_tools())?);
        return Ok(());
    }

    let config = AppConfig::from_env(args.store, args.database_url)?;
    config.validate()?;
    info!("Using {} game store", config.store);

    let tools = commands::build_tools(&config).await?;

    match args.command {
        Command::Tools => {}
        Command::Call { tool, args } => {
            let output = commands::call(&tools, &tool, &args).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Session => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let results = commands::session(&tools, stdin).await?;
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        Command::List { limit } => {
            let games = commands::list_games(&tools, limit).await?;
            println!("{}", serde_json::to_string_pretty(&games)?);
        }
        Command::Delete { game_id } => {
            commands::delete_game(&tools, &game_id).await?;
            println!("{}", json!({ "deleted": game_id }));
        }
        Command::Demo { bet, fold } => {
            for (tool, output) in commands::demo(&tools, bet, fold).await? {
                println!("{}", json!({ "tool": tool.as_str(), "output": output }));
            }
        }
    }

    Ok(())
}
