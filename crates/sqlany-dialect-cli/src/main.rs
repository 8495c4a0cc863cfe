//! sqlany-dialect CLI - SQL Anywhere statement translation and introspection.

use clap::{Parser, Subcommand};
use sqlany_dialect::{Config, DialectError, DialectTranslator, TypeMap};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "sqlany-dialect")]
#[command(about = "SQL Anywhere dialect translation and schema introspection")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the abstract to physical type table
    Types {
        /// Print as a JSON object
        #[arg(long)]
        json: bool,
    },

    /// Apply ordering and TOP/START AT pagination to a SELECT
    Paginate {
        /// Base SELECT statement
        #[arg(long)]
        sql: String,

        /// Ordering expressions or a full ORDER BY clause
        #[arg(long, default_value = "")]
        order_by: String,

        /// Maximum number of rows
        #[arg(long)]
        limit: Option<u64>,

        /// Row offset passed to START AT
        #[arg(long)]
        offset: Option<u64>,
    },

    /// Wrap a SELECT as a 1/0 existence check
    Exists {
        /// Inner SELECT statement
        #[arg(long)]
        sql: String,
    },

    /// Build a table rename statement
    RenameTable { old: String, new: String },

    /// Build a column rename statement
    RenameColumn {
        table: String,
        old: String,
        new: String,
    },

    /// Build a column type change statement
    AlterColumn {
        table: String,
        column: String,
        /// Abstract type (e.g. "string(64) NOT NULL") or physical type
        column_type: String,
    },

    /// Build a statement setting or dropping a table or column comment
    Comment {
        #[arg(long)]
        table: String,

        #[arg(long)]
        column: Option<String>,

        /// Comment text
        #[arg(long, conflicts_with = "drop", required_unless_present = "drop")]
        text: Option<String>,

        /// Drop the comment instead of setting it
        #[arg(long)]
        drop: bool,
    },

    /// Load a table's metadata from a live database and print it as JSON
    #[cfg(feature = "odbc")]
    Inspect {
        /// Table name, optionally schema-qualified
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), DialectError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(DialectError::Config)?;

    let config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            debug!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    let translator = DialectTranslator::new(config.dialect.clone());

    match cli.command {
        Commands::Types { json } => {
            let types = TypeMap::new();
            if json {
                let map: serde_json::Map<String, serde_json::Value> = types
                    .declarations()
                    .map(|(t, physical)| (t.to_string(), physical.into()))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&map)?);
            } else {
                for (t, physical) in types.declarations() {
                    println!("{}\t{}", t, physical);
                }
            }
        }
        Commands::Paginate {
            sql,
            order_by,
            limit,
            offset,
        } => {
            println!(
                "{}",
                translator.build_order_by_and_limit(&sql, &order_by, limit, offset)
            );
        }
        Commands::Exists { sql } => {
            println!("{}", translator.select_exists(&sql));
        }
        Commands::RenameTable { old, new } => {
            println!("{}", translator.rename_table(&old, &new));
        }
        Commands::RenameColumn { table, old, new } => {
            println!("{}", translator.rename_column(&table, &old, &new));
        }
        Commands::AlterColumn {
            table,
            column,
            column_type,
        } => {
            println!("{}", translator.alter_column(&table, &column, &column_type));
        }
        Commands::Comment {
            table,
            column,
            text,
            drop,
        } => {
            let sql = match (column, text) {
                (Some(column), _) if drop => translator.drop_comment_from_column(&table, &column),
                (None, _) if drop => translator.drop_comment_from_table(&table),
                (Some(column), Some(text)) => {
                    translator.add_comment_on_column(&table, &column, &text)
                }
                (None, Some(text)) => translator.add_comment_on_table(&table, &text),
                (_, None) => {
                    return Err(DialectError::parameter("comment needs --text or --drop"));
                }
            };
            println!("{}", sql);
        }
        #[cfg(feature = "odbc")]
        Commands::Inspect { table } => {
            inspect(&config, &table).await?;
        }
    }

    Ok(())
}

#[cfg(feature = "odbc")]
async fn inspect(config: &Config, table: &str) -> Result<(), DialectError> {
    use sqlany_dialect::{OdbcExecutor, SchemaIntrospector};
    use std::sync::Arc;
    use tracing::info;

    let connection = config.connection.as_ref().ok_or_else(|| {
        DialectError::Config("inspect needs a connection section in --config".into())
    })?;

    let executor = OdbcExecutor::connect(connection)?;
    let introspector = SchemaIntrospector::new(Arc::new(executor), &config.dialect);

    let Some(loaded) = introspector.load_table(table).await? else {
        return Err(DialectError::parameter(format!("Table not found: {}", table)));
    };
    let unique_indexes = introspector.find_unique_indexes(&loaded).await?;
    info!(
        "Loaded {} with {} columns",
        loaded.full_name,
        loaded.columns.len()
    );

    let output = serde_json::json!({
        "table": loaded,
        "unique_indexes": unique_indexes,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the generated SQL
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("unknown log format '{}', use text or json", other)),
    }

    Ok(())
}
