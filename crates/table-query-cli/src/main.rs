//! table-query CLI
//!
//! Parses Synapse table queries and applies the query rewrites from the
//! command line. Results go to stdout, logs to stderr.

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

use table_query::rewrite::{
    build_sql_select_row_ids_and_versions, convert_to_sorted_query, create_count_sql,
    override_pagination, SortItem,
};
use table_query::{Fragment, Parser as QueryParser};

/// Row limit of `row-ids` when none is given.
const DEFAULT_MAX_LIMIT: u64 = 1000;

/// Parse and rewrite Synapse table queries.
#[derive(Parser)]
#[command(name = "table-query")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output format.
    #[arg(short, long, env = "TABLE_QUERY_FORMAT", value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The SQL alone.
    Text,
    /// A JSON object with a `sql` field.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of a query.
    Render {
        /// The query.
        sql: String,
    },

    /// Print the SQL counting the rows a query returns.
    Count {
        /// The query.
        sql: String,
    },

    /// Apply a page to a query, relative to its own LIMIT/OFFSET.
    Paginate {
        /// The query.
        sql: String,

        /// Rows to skip.
        #[arg(long)]
        offset: Option<u64>,

        /// Rows to return.
        #[arg(long)]
        limit: Option<u64>,

        /// Upper bound on the resulting limit.
        #[arg(long, env = "TABLE_QUERY_MAX_ROWS_PER_PAGE")]
        max_rows_per_page: Option<u64>,
    },

    /// Put sorts ahead of the ORDER BY of a query.
    Sort {
        /// The query.
        sql: String,

        /// JSON array of sorts, e.g. `[{"column":"foo","direction":"DESC"}]`.
        #[arg(long)]
        by: String,
    },

    /// Print the SQL selecting the row ids and versions a query matches.
    RowIds {
        /// The query.
        sql: String,

        /// Most rows to select.
        #[arg(long, default_value_t = DEFAULT_MAX_LIMIT)]
        max_limit: u64,
    },
}

#[derive(Debug, Serialize)]
struct Output {
    sql: Option<String>,
}

fn parse(sql: &str) -> anyhow::Result<Fragment> {
    QueryParser::parse_query(sql).with_context(|| format!("Failed to parse query: {sql}"))
}

/// Runs a subcommand. `None` means the query has no answer of that kind.
fn run(command: &Commands) -> anyhow::Result<Option<String>> {
    match command {
        Commands::Render { sql } => Ok(Some(parse(sql)?.to_sql())),

        Commands::Count { sql } => {
            let count = create_count_sql(&parse(sql)?).context("Failed to build count query")?;
            Ok(Some(count))
        }

        Commands::Paginate {
            sql,
            offset,
            limit,
            max_rows_per_page,
        } => {
            let page = override_pagination(&parse(sql)?, *offset, *limit, *max_rows_per_page)
                .context("Failed to paginate query")?;
            Ok(Some(page.to_sql()))
        }

        Commands::Sort { sql, by } => {
            let items: Vec<SortItem> =
                serde_json::from_str(by).with_context(|| format!("Invalid sort items: {by}"))?;
            debug!(?items, "sorting");
            let sorted =
                convert_to_sorted_query(&parse(sql)?, &items).context("Failed to sort query")?;
            Ok(Some(sorted.to_sql()))
        }

        Commands::RowIds { sql, max_limit } => {
            build_sql_select_row_ids_and_versions(&parse(sql)?, *max_limit)
                .context("Failed to build row id query")
        }
    }
}

fn format_output(format: Format, sql: Option<String>) -> anyhow::Result<String> {
    match format {
        Format::Text => Ok(sql.unwrap_or_default()),
        Format::Json => Ok(serde_json::to_string(&Output { sql })?),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let sql = run(&cli.command)?;
    if sql.is_none() {
        info!("Aggregate queries have no row ids.");
    }
    println!("{}", format_output(cli.format, sql)?);
    Ok(())
}
