//! ddg-search CLI - DuckDuckGo search from the command line.

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ddg_search::{
    Ddgs, ImagesQuery, NewsQuery, SafeSearch, TextBackend, TextQuery, TimeLimit, VideosQuery,
};

/// DuckDuckGo search CLI
#[derive(Parser)]
#[command(name = "ddg-search")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Request timeout in seconds
    #[arg(short, long, global = true, default_value = "10")]
    timeout: u64,

    /// Proxy URL (e.g. http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(short, long, global = true)]
    proxy: Option<String>,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Web text search
    Text(TextArgs),
    /// Image search
    Images(MediaArgs),
    /// Video search
    Videos(MediaArgs),
    /// News search
    News(MediaArgs),
    /// Instant answers
    Answers { keywords: String },
    /// Query completion suggestions
    Suggestions {
        keywords: String,
        /// Region code
        #[arg(short, long, default_value = "wt-wt")]
        region: String,
    },
    /// Translate text
    Translate {
        /// Text to translate (repeatable)
        keywords: Vec<String>,
        /// Source language (detected when omitted)
        #[arg(long)]
        from: Option<String>,
        /// Target language
        #[arg(long, default_value = "en")]
        to: String,
    },
}

#[derive(Parser)]
struct TextArgs {
    /// Search keywords
    keywords: String,

    /// Region code, e.g. wt-wt, us-en, uk-en
    #[arg(short, long, default_value = "wt-wt")]
    region: String,

    /// Safe search level
    #[arg(short, long, default_value = "moderate")]
    safesearch: SafeSearchArg,

    /// Time window filter
    #[arg(long)]
    timelimit: Option<TimeLimitArg>,

    /// Response backend
    #[arg(short, long, default_value = "api")]
    backend: String,

    /// Maximum number of results (0 = first page only)
    #[arg(short, long, default_value = "0")]
    max_results: usize,
}

#[derive(Parser)]
struct MediaArgs {
    /// Search keywords
    keywords: String,

    /// Region code
    #[arg(short, long, default_value = "wt-wt")]
    region: String,

    /// Safe search level
    #[arg(short, long, default_value = "moderate")]
    safesearch: SafeSearchArg,

    /// Maximum number of results (0 = first page only)
    #[arg(short, long, default_value = "0")]
    max_results: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum SafeSearchArg {
    On,
    Moderate,
    Off,
}

impl From<SafeSearchArg> for SafeSearch {
    fn from(arg: SafeSearchArg) -> Self {
        match arg {
            SafeSearchArg::On => SafeSearch::On,
            SafeSearchArg::Moderate => SafeSearch::Moderate,
            SafeSearchArg::Off => SafeSearch::Off,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum TimeLimitArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<TimeLimitArg> for TimeLimit {
    fn from(arg: TimeLimitArg) -> Self {
        match arg {
            TimeLimitArg::Day => TimeLimit::Day,
            TimeLimitArg::Week => TimeLimit::Week,
            TimeLimitArg::Month => TimeLimit::Month,
            TimeLimitArg::Year => TimeLimit::Year,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    let mut builder = Ddgs::builder().timeout(Duration::from_secs(cli.timeout));
    if let Some(proxy) = &cli.proxy {
        builder = builder.proxy(proxy);
    }
    let client = builder.build()?;

    match cli.command {
        Commands::Text(args) => {
            let backend: TextBackend = args.backend.parse()?;
            let mut query = TextQuery::new(args.keywords)
                .with_region(args.region)
                .with_safesearch(args.safesearch.into())
                .with_backend(backend)
                .with_max_results(args.max_results);
            if let Some(limit) = args.timelimit {
                query = query.with_timelimit(limit.into());
            }
            let results = client.text(&query).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for (i, result) in results.iter().enumerate() {
                        println!("{}. {}", i + 1, result.title);
                        println!("   {}", result.href);
                        if !result.body.is_empty() {
                            println!("   {}", result.body);
                        }
                        println!();
                    }
                }
            }
        }
        Commands::Images(args) => {
            let query = ImagesQuery::new(args.keywords)
                .with_region(args.region)
                .with_safesearch(args.safesearch.into())
                .with_max_results(args.max_results);
            let results = client.images(&query).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for (i, result) in results.iter().enumerate() {
                        println!(
                            "{}. {} ({}x{}, {})",
                            i + 1,
                            result.title,
                            result.width,
                            result.height,
                            result.source
                        );
                        println!("   {}", result.image);
                    }
                }
            }
        }
        Commands::Videos(args) => {
            let query = VideosQuery::new(args.keywords)
                .with_region(args.region)
                .with_safesearch(args.safesearch.into())
                .with_max_results(args.max_results);
            let results = client.videos(&query).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for (i, result) in results.iter().enumerate() {
                        println!("{}. {} [{}]", i + 1, result.title, result.duration);
                        println!("   {}", result.content);
                    }
                }
            }
        }
        Commands::News(args) => {
            let query = NewsQuery::new(args.keywords)
                .with_region(args.region)
                .with_safesearch(args.safesearch.into())
                .with_max_results(args.max_results);
            let results = client.news(&query).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for (i, result) in results.iter().enumerate() {
                        println!("{}. [{}] {} ({})", i + 1, result.date, result.title, result.source);
                        println!("   {}", result.url);
                    }
                }
            }
        }
        Commands::Answers { keywords } => {
            let results = client.answers(&keywords).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for result in &results {
                        if result.topic.is_empty() {
                            println!("- {}", result.text);
                        } else {
                            println!("- [{}] {}", result.topic, result.text);
                        }
                        if !result.url.is_empty() {
                            println!("  {}", result.url);
                        }
                    }
                }
            }
        }
        Commands::Suggestions { keywords, region } => {
            let results = client.suggestions(&keywords, &region).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for suggestion in &results {
                        println!("{}", suggestion.phrase);
                    }
                }
            }
        }
        Commands::Translate { keywords, from, to } => {
            let results = client.translate(&keywords, from.as_deref(), &to).await?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
                OutputFormat::Text => {
                    for translation in &results {
                        println!("{} -> {}", translation.original, translation.translated);
                    }
                }
            }
        }
    }

    Ok(())
}
