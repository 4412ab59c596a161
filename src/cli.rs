use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{
    aggregate::AggregateMode,
    chart::DEFAULT_SANKEY_TITLE,
    ingest::{IngestOptions, RowWindow},
    io_utils,
    roles::{ColumnRoles, RoleOverride},
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Build Sankey flows and bar-chart summaries from CSV or Excel files", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Aggregate ordered categorical stages into Sankey nodes and links
    Sankey(SankeyArgs),
    /// Sum or average a numeric column per category
    Bar(BarArgs),
    /// Preview the first rows of the loaded table
    Preview(PreviewArgs),
    /// List columns with their assigned roles, or write them to a roles file
    Roles(RolesArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input CSV or Excel file (`-` reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (defaults to ';')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of a CSV input (defaults to iso-8859-1)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Worksheet to read from an Excel input (defaults to the first sheet)
    #[arg(long)]
    pub sheet: Option<String>,
    /// 1-based row holding the column names in an Excel input
    #[arg(long = "header-row", default_value_t = 1)]
    pub header_row: usize,
    /// First 1-based data row of an Excel input (defaults to the row after the header)
    #[arg(long = "start-row")]
    pub start_row: Option<usize>,
    /// Last 1-based data row of an Excel input (defaults to the last used row)
    #[arg(long = "end-row")]
    pub end_row: Option<usize>,
}

impl InputArgs {
    pub fn ingest_options(&self) -> Result<IngestOptions> {
        let encoding = io_utils::resolve_encoding(self.input_encoding.as_deref())?;
        Ok(IngestOptions {
            delimiter: self.delimiter,
            encoding,
            sheet: self.sheet.clone(),
            rows: RowWindow {
                header_row: self.header_row,
                start_row: self.start_row,
                end_row: self.end_row,
            },
        })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct RoleArgs {
    /// YAML file assigning roles to columns (see the `roles` command)
    #[arg(long = "roles")]
    pub roles: Option<PathBuf>,
    /// Override one column's role, e.g. `Valor=numeric` (repeatable)
    #[arg(long = "role", value_parser = parse_role_override, action = clap::ArgAction::Append)]
    pub overrides: Vec<RoleOverride>,
    /// Seed roles from the fixed column positions of the legacy export layout
    #[arg(long = "legacy-layout")]
    pub legacy_layout: bool,
}

impl RoleArgs {
    /// Seeds roles for `headers`, then layers the roles file and overrides on top.
    pub fn resolve(&self, headers: &[String]) -> Result<ColumnRoles> {
        let mut roles = if self.legacy_layout {
            ColumnRoles::legacy_layout(headers)
        } else {
            ColumnRoles::from_hints(headers)
        };
        if let Some(path) = &self.roles {
            let file = ColumnRoles::load(path)
                .with_context(|| format!("Loading roles from {path:?}"))?;
            roles.merge(&file);
        }
        roles.apply_overrides(&self.overrides);
        Ok(roles)
    }
}

#[derive(Debug, Args)]
pub struct SankeyArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub roles: RoleArgs,
    /// Categorical stage column, in flow order (repeat at least twice)
    #[arg(short = 's', long = "stage", required = true, action = clap::ArgAction::Append)]
    pub stages: Vec<String>,
    /// Numeric column whose values weight the links
    #[arg(short = 'v', long = "value")]
    pub value: String,
    /// Emit the chart payload as JSON instead of tables
    #[arg(long)]
    pub json: bool,
    /// Write JSON output to this file instead of stdout (implies --json); written even when empty
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Title carried in the chart payload
    #[arg(long, default_value = DEFAULT_SANKEY_TITLE)]
    pub title: String,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum Aggregation {
    Sum,
    Mean,
}

impl From<Aggregation> for AggregateMode {
    fn from(value: Aggregation) -> Self {
        match value {
            Aggregation::Sum => AggregateMode::Sum,
            Aggregation::Mean => AggregateMode::Mean,
        }
    }
}

#[derive(Debug, Args)]
pub struct BarArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub roles: RoleArgs,
    /// Categorical column for the x axis
    #[arg(short = 'x', long = "category")]
    pub category: String,
    /// Numeric column for the y axis
    #[arg(short = 'y', long = "value")]
    pub value: String,
    /// Aggregation applied per category
    #[arg(long = "agg", value_enum, default_value = "sum")]
    pub aggregation: Aggregation,
    /// Emit the chart payload as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Write JSON output to this file instead of stdout (implies --json); written even when empty
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Number of rows to display
    #[arg(long, default_value_t = 100)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct RolesArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub roles: RoleArgs,
    /// Write the resolved roles as YAML to this file
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

pub fn parse_role_override(value: &str) -> Result<RoleOverride, String> {
    value.parse().map_err(|err: crate::error::RoleError| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delimiter_aliases_resolve() {
        assert_eq!(parse_delimiter("semicolon"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn role_args_layer_overrides_over_hints() {
        let args = RoleArgs {
            roles: None,
            overrides: vec![parse_role_override("Valor=numeric").expect("override")],
            legacy_layout: false,
        };
        let headers = vec!["Etapa".to_string(), "Valor".to_string()];
        let roles = args.resolve(&headers).expect("resolve");
        assert_eq!(roles.role("Etapa"), crate::roles::ColumnRole::Categorical);
        assert_eq!(roles.role("Valor"), crate::roles::ColumnRole::Numeric);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
