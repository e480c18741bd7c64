use std::path::PathBuf;

use clap::Parser;
use forgetthemilk::config::{ConvertOptions, DEFAULT_COMPLETED, DEFAULT_INCOMPLETE, LineBreak};
use forgetthemilk::output::Format;

#[derive(Parser)]
#[command(
    name = "forgetthemilk",
    version,
    about = "Convert a Remember The Milk JSON export into Todoist import CSV files"
)]
struct Cli {
    /// The JSON file exported from Remember The Milk
    rtm_json: PathBuf,
    /// Base path for *incomplete* tasks; one `{base}_{list}.csv` is written per list
    #[arg(default_value = DEFAULT_INCOMPLETE)]
    csv_incomplete: String,
    /// CSV file for *completed* tasks
    #[arg(default_value = DEFAULT_COMPLETED)]
    csv_completed: PathBuf,
    /// Report format
    #[arg(long, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, hide = true)]
    pretty: bool,
    /// Work out every file and row without writing anything
    #[arg(long)]
    dry_run: bool,
    /// Write line breaks inside cells as the two characters `\n`
    #[arg(long)]
    escape_newlines: bool,
    /// Indent later occurrences of a recurring task under the first
    #[arg(long)]
    indent_repeats: bool,
    /// Log level filter (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, default_value = "warn", env = "FORGETTHEMILK_LOG")]
    log_level: String,
}

impl Cli {
    fn options(&self) -> ConvertOptions {
        ConvertOptions {
            source: self.rtm_json.clone(),
            incomplete_base: self.csv_incomplete.clone(),
            completed_path: self.csv_completed.clone(),
            line_break: if self.escape_newlines {
                LineBreak::Escaped
            } else {
                LineBreak::Literal
            },
            indent_repeats: self.indent_repeats,
            dry_run: self.dry_run,
        }
    }
}

fn init_tracing(level: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = forgetthemilk::commands::convert::run(&cli.options(), format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
