use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use news_extract_core::{
    ExtractError, ExtractionResult, FetchConfig, Fetcher, Pipeline, RawDocument, SanitizeOptions, fetch_file,
    fetch_stdin, parse_source_url,
};
use owo_colors::OwoColorize;
use url::Url;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Source reported for stdin input when no `--url` is given.
const STDIN_SOURCE: &str = "file:///dev/stdin";

/// Output format for the extraction result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

/// Extract clean article text and metadata from news pages
#[derive(Parser, Debug)]
#[command(name = "news-extract")]
#[command(version)]
#[command(about = "Extract clean article text and metadata from news pages", long_about = None)]
struct Args {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT", required_unless_present = "url")]
    input: Option<String>,

    /// Source URL. Fetched when INPUT is absent, otherwise reported as the
    /// source of a file or stdin input
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Collapse the body into a single line
    #[arg(long)]
    trim_newlines: bool,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "15", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Print progress details to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Where the HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Remote(Url),
    File(PathBuf),
    Stdin,
}

impl Input {
    fn from_args(input: Option<&str>, url: Option<&str>) -> anyhow::Result<Self> {
        match (input, url) {
            (Some("-"), _) => Ok(Self::Stdin),
            (Some(value), _) if value.starts_with("http://") || value.starts_with("https://") => {
                Ok(Self::Remote(parse_source_url(value)?))
            }
            (Some(path), _) => Ok(Self::File(PathBuf::from(path))),
            (None, Some(url)) => Ok(Self::Remote(parse_source_url(url)?)),
            (None, None) => anyhow::bail!("either INPUT or --url is required"),
        }
    }
}

/// Source URL for local input: `--url` when given, else a `file://` URL.
fn local_source(path: Option<&Path>, url: Option<&str>) -> anyhow::Result<Url> {
    if let Some(url) = url {
        return Ok(parse_source_url(url)?);
    }

    let Some(path) = path else {
        return Url::parse(STDIN_SOURCE).context("Invalid stdin source URL");
    };
    let absolute = fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))?;
    Url::from_file_path(&absolute).map_err(|_| anyhow::anyhow!("Cannot express {} as a URL", absolute.display()))
}

async fn load(args: &Args, input: &Input) -> anyhow::Result<RawDocument> {
    match input {
        Input::Remote(url) => {
            let mut config = FetchConfig::with_total_timeout(args.timeout);
            if let Some(user_agent) = &args.user_agent {
                config.user_agent = user_agent.clone();
            }

            let fetcher = Fetcher::new(config).context("Failed to build HTTP client")?;
            fetcher.fetch(url).await.context("Failed to fetch URL")
        }
        Input::File(path) => {
            let html = fetch_file(&path.to_string_lossy())
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            Ok(RawDocument::new(local_source(Some(path), args.url.as_deref())?, html))
        }
        Input::Stdin => {
            let html = fetch_stdin().context("Failed to read from stdin")?;
            Ok(RawDocument::new(local_source(None, args.url.as_deref())?, html))
        }
    }
}

fn render(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Text => Ok(format!("{}\n", result.text)),
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let started = Instant::now();
    let mut timings: Vec<(String, Duration)> = Vec::new();

    if args.verbose {
        echo::print_banner();
    }

    let input = Input::from_args(args.input.as_deref(), args.url.as_deref())?;

    if args.verbose {
        let message = match &input {
            Input::Remote(url) => format!("Fetching from {}", url.as_str().bright_white().underline()),
            Input::File(path) => format!("Reading from file {}", path.display().bright_white()),
            Input::Stdin => "Reading from stdin".to_string(),
        };
        echo::print_step(1, 3, &message);
    }

    let step = Instant::now();
    let doc = load(&args, &input).await?;
    timings.push(("Load".to_string(), step.elapsed()));

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(doc.html.len()).bright_white());
        eprintln!();
        echo::print_step(2, 3, "Extracting article");
    }

    let step = Instant::now();
    let pipeline = Pipeline::new().context("Failed to build extraction pipeline")?;
    let options = SanitizeOptions { trim_newlines: args.trim_newlines };
    let result = match pipeline.run(&doc, options) {
        Ok(result) => result,
        Err(ExtractError::NoContent) => anyhow::bail!("No content extracted from {}", doc.url),
        Err(err) => return Err(err).context("Extraction failed"),
    };
    timings.push(("Extract".to_string(), step.elapsed()));

    if args.verbose {
        echo::print_extraction_details(&result);
        if result.title.is_none() {
            echo::print_warning("No title found");
        }
        echo::print_step(3, 3, "Writing output");
    }

    let output = render(&result, args.format)?;

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", output),
    }

    if args.verbose {
        echo::print_info(&format!("Format: {:?}", args.format));
        echo::print_timing_summary(started.elapsed(), &timings);
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(err) = run(args).await {
        echo::print_error(&format!("{:#}", err));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("TXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("markdown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_input_classification() {
        assert_eq!(Input::from_args(Some("-"), None).unwrap(), Input::Stdin);
        assert_eq!(
            Input::from_args(Some("page.html"), Some("https://example.com/")).unwrap(),
            Input::File(PathBuf::from("page.html"))
        );
        assert!(matches!(
            Input::from_args(None, Some("https://example.com/a")).unwrap(),
            Input::Remote(url) if url.as_str() == "https://example.com/a"
        ));
        assert!(Input::from_args(Some("https://"), None).is_err());
        assert!(Input::from_args(None, None).is_err());
    }

    #[test]
    fn test_local_source_prefers_url_flag() {
        let url = local_source(None, Some("https://example.com/story")).unwrap();
        assert_eq!(url.as_str(), "https://example.com/story");

        let stdin = local_source(None, None).unwrap();
        assert_eq!(stdin.scheme(), "file");
    }
}
