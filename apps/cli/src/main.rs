use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use textpad_core::{Document, SaveFilter};
use textpad_search::find_first;
use textpad_settings::EditorSettings;

#[derive(Parser)]
#[command(
    name = "textpad-cli",
    about = "Headless commands for TextPad documents",
    author,
    version
)]
struct Cli {
    /// 設定檔路徑（PDF 版面）。 / JSON configuration file (PDF layout).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 讀取檔案並輸出解碼後的內容。 / Print a file's decoded contents (RTF becomes plain text).
    Open(OpenArgs),
    /// 以文字或 PDF 格式另存檔案。 / Save a file as text or PDF.
    Save(SaveArgs),
    /// 尋找第一個符合的字串。 / Report the first occurrence of a literal query.
    Find(FindArgs),
}

#[derive(Args)]
struct OpenArgs {
    file: PathBuf,
}

#[derive(Args)]
struct SaveArgs {
    input: PathBuf,
    output: PathBuf,
    /// 輸出格式；省略時依副檔名判斷。 / Output format; inferred from OUTPUT when omitted.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,
}

#[derive(Args)]
struct FindArgs {
    file: PathBuf,
    query: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    #[value(alias = "txt")]
    Text,
    Pdf,
}

impl From<FormatChoice> for SaveFilter {
    fn from(choice: FormatChoice) -> Self {
        match choice {
            FormatChoice::Text => SaveFilter::Text,
            FormatChoice::Pdf => SaveFilter::Pdf,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli { config, command } = Cli::parse();
    match command {
        Commands::Open(args) => execute_open(args),
        Commands::Save(args) => {
            let settings = EditorSettings::load(config.as_deref())?;
            execute_save(args, &settings)
        }
        Commands::Find(args) => execute_find(args),
    }
}

fn execute_open(args: OpenArgs) -> Result<()> {
    let document = Document::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    info!("decoded {} as {}", args.file.display(), document.encoding());
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(document.contents().as_bytes())
        .context("failed to write to stdout")?;
    stdout.flush().context("failed to write to stdout")
}

fn execute_save(args: SaveArgs, settings: &EditorSettings) -> Result<()> {
    let mut document = Document::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let filter = args
        .format
        .map(SaveFilter::from)
        .unwrap_or_else(|| SaveFilter::infer(&args.output, SaveFilter::Text));
    let written = document
        .save_as_with(&args.output, filter, &settings.page_setup())
        .with_context(|| format!("failed to save {}", args.output.display()))?;
    info!("saved {} as {}", written.display(), filter.label());
    println!("{}", written.display());
    Ok(())
}

fn execute_find(args: FindArgs) -> Result<()> {
    let document = Document::open(&args.file)
        .with_context(|| format!("failed to open {}", args.file.display()))?;
    match find_first(document.contents(), &args.query)? {
        Some(found) => println!(
            "Match at byte {} (len {}), line {}, column {}",
            found.start, found.len, found.line, found.column
        ),
        None => println!("No match"),
    }
    Ok(())
}
