use std::io::{IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::{CommandFactory, Parser as ClapParser};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use httpspan::{
    format_debug, format_headers_only, format_json, Document, DocumentKind, ParseStatus,
    ParserConfig,
};

/// httpspan CLI: resumable HTTP/1.x message parser.
///
/// Reads a raw HTTP request or response from a file, --raw string, or stdin,
/// feeds it to the parser (optionally in small fragments) and outputs a
/// structured representation in the chosen format.
///
/// Escape sequences (\r, \n, \t, \\) in the --raw value are interpreted so
/// you can pass a full HTTP message as a single shell argument.
#[derive(ClapParser)]
#[command(name = "httpspan-cli", version, about, long_about = None)]
struct Cli {
    /// Path to a file containing a raw HTTP message.
    /// Reads from stdin when neither FILE nor --raw is given.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Raw HTTP message string (escape sequences \r \n \t \\ are expanded).
    #[arg(long)]
    raw: Option<String>,

    /// Whether the input is a request or a response.
    #[arg(short, long, default_value = "request", value_enum)]
    kind: KindArg,

    /// Output format.
    #[arg(short, long, default_value = "json", value_enum)]
    format: OutputFormat,

    /// Pretty-print JSON output (ignored for other formats).
    #[arg(short, long)]
    pretty: bool,

    /// Feed the input to the parser in fragments of this many bytes.
    #[arg(long, value_name = "BYTES")]
    fragment_size: Option<usize>,

    /// JSON file with parser settings; flags below override it.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Accept status lines without a reason phrase.
    #[arg(long)]
    allow_empty_reason: bool,

    /// Accept any whitespace after a header colon.
    #[arg(long)]
    lenient_fields: bool,

    /// Stop after the header block instead of reading the body.
    #[arg(long)]
    no_body: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum KindArg {
    Request,
    Response,
}

impl From<KindArg> for DocumentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Request => DocumentKind::Request,
            KindArg::Response => DocumentKind::Response,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable debug output
    Debug,
    /// Start line + headers only
    Headers,
    /// Canonical wire form, re-serialized
    Wire,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("httpspan=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // When no input source is provided and stdin is a terminal (not piped),
    // show help instead of blocking.
    if cli.file.is_none() && cli.raw.is_none() && std::io::stdin().is_terminal() {
        Cli::command().print_help().ok();
        println!();
        process::exit(0);
    }

    let config = match load_config(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    let data = match read_input(&cli) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error reading input: {e}");
            process::exit(1);
        }
    };

    if data.is_empty() {
        eprintln!("Error: empty input");
        process::exit(1);
    }

    let mut doc = Document::with_config(cli.kind.into(), config);
    let fragment_size = cli.fragment_size.unwrap_or(data.len()).max(1);

    let mut done = false;
    for fragment in data.chunks(fragment_size) {
        match doc.parse(fragment) {
            Ok(ParseStatus::Done(consumed)) => {
                if consumed < fragment.len() {
                    info!(trailing = fragment.len() - consumed, "ignoring bytes after message");
                }
                done = true;
                break;
            }
            Ok(ParseStatus::Progress(consumed)) => {
                debug!(consumed, "need more input");
            }
            Err(e) => {
                eprintln!("Parse error: {e}");
                process::exit(2);
            }
        }
    }

    if !done && !doc.parse_eof() {
        eprintln!("Error: incomplete HTTP message");
        process::exit(3);
    }

    let output = match cli.format {
        OutputFormat::Json => format_json(&doc, cli.pretty).into_bytes(),
        OutputFormat::Debug => format_debug(&doc).into_bytes(),
        OutputFormat::Headers => format_headers_only(&doc).into_bytes(),
        OutputFormat::Wire => match doc.serialize_to_vec() {
            Ok(wire) => wire,
            Err(e) => {
                eprintln!("Serialize error: {e}");
                process::exit(3);
            }
        },
    };

    if let Err(e) = std::io::stdout().write_all(&output) {
        eprintln!("Error writing output: {e}");
        process::exit(1);
    }
}

/// Start from the config file (if any), then apply flag overrides.
fn load_config(cli: &Cli) -> Result<ParserConfig, httpspan::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => ParserConfig::from_file(path)?,
        None => ParserConfig::default(),
    };
    if cli.allow_empty_reason {
        config.allow_empty_reason = true;
    }
    if cli.lenient_fields {
        config.lenient_field_separator = true;
    }
    if cli.no_body {
        config.frame_bodies = false;
    }
    Ok(config)
}

/// Read raw HTTP bytes from --raw, a file, or stdin.
fn read_input(cli: &Cli) -> Result<Vec<u8>, std::io::Error> {
    if let Some(raw) = &cli.raw {
        return Ok(unescape(raw).into_bytes());
    }
    match &cli.file {
        Some(path) => std::fs::read(path),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Expand C-style escape sequences (`\r`, `\n`, `\t`, `\\`) in a string.
///
/// Any other `\X` sequence is kept as-is (both the backslash and `X`).
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('r') => out.push('\r'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
