pub mod aggregate;
pub mod bar_cmd;
pub mod chart;
pub mod clean;
pub mod cli;
pub mod error;
pub mod flow;
pub mod frame;
pub mod ingest;
pub mod io_utils;
pub mod preview;
pub mod roles;
pub mod roles_cmd;
pub mod sankey_cmd;
pub mod session;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands, InputArgs, RoleArgs},
    frame::Table,
    session::Session,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("sankey_flow", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sankey(args) => sankey_cmd::execute(&args),
        Commands::Bar(args) => bar_cmd::execute(&args),
        Commands::Preview(args) => preview::execute(&args),
        Commands::Roles(args) => roles_cmd::execute(&args),
    }
}

pub(crate) fn load_table(args: &InputArgs) -> Result<Table> {
    let options = args.ingest_options()?;
    let source = ingest::open_source(&args.input, &options);
    info!("Loading {}", source.describe());
    let table = source
        .load()
        .with_context(|| format!("Reading input {:?}", args.input))?;
    debug!(
        "Loaded {} row(s) across {} column(s)",
        table.row_count(),
        table.column_count()
    );
    Ok(table)
}

pub(crate) fn open_session(input: &InputArgs, roles: &RoleArgs) -> Result<Session> {
    let table = load_table(input)?;
    let roles = roles.resolve(table.headers())?;
    Session::new(&table, roles).with_context(|| format!("Classifying columns of {:?}", input.input))
}

pub(crate) fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        b'\n' => "\\n".to_string(),
        other => (other as char).to_string(),
    }
}
