//! quire - package Markdown documents into EPUB 3 ebooks

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDate;
use clap::Parser;
use serde::Deserialize;

use quire::{
    AssetFetcher, CommonMarkRenderer, Document, Error, HtmlPassthrough, HttpFetcher,
    OfflineFetcher, PackageConfig, PackagedBook, Packager, decode_text,
};

#[derive(Parser)]
#[command(name = "quire")]
#[command(version, about = "Package Markdown documents into EPUB 3 ebooks", long_about = None)]
#[command(after_help = "EXAMPLES:
    quire notes.md --title \"Notes\"        Package a Markdown file
    quire article.json -o article.epub    Package a JSON document
    quire notes.md --offline              Keep images as remote links")]
struct Cli {
    /// Input document: a `.json` document or a Markdown file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (defaults to the title with an .epub extension)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Book title (Markdown input; overrides JSON)
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Source URL of the content
    #[arg(long)]
    source: Option<String>,

    /// Publication date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Language tag, e.g. `en` or `pl`
    #[arg(long)]
    language: Option<String>,

    /// Cover image file
    #[arg(long, value_name = "FILE")]
    cover: Option<PathBuf>,

    /// Stylesheet replacing the built-in one
    #[arg(long, value_name = "FILE")]
    css: Option<PathBuf>,

    /// Treat the body as pre-rendered HTML
    #[arg(long)]
    html: bool,

    /// Render raw HTML in Markdown as text
    #[arg(long)]
    no_raw_html: bool,

    /// Do not download images
    #[arg(long)]
    offline: bool,

    /// Deflate level (0-9)
    #[arg(long, value_name = "LEVEL", value_parser = clap::value_parser!(i64).range(0..=9))]
    compression_level: Option<i64>,

    /// Maximum concurrent image downloads per chapter
    #[arg(long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-image download timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Verbose logging
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

/// JSON input format. `cover` is base64.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentFile {
    title: String,
    author: Option<String>,
    description: Option<String>,
    source: Option<String>,
    date: Option<NaiveDate>,
    language: Option<String>,
    cover: Option<String>,
    body: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: &Cli) -> quire::Result<()> {
    let document = load_document(cli)?;
    let config = build_config(cli)?;

    let fetcher: Arc<dyn AssetFetcher> = if cli.offline {
        Arc::new(OfflineFetcher)
    } else {
        Arc::new(HttpFetcher::new(&config)?)
    };

    let mut packager = Packager::new(fetcher).with_config(config);
    packager = if cli.html {
        packager.with_renderer(HtmlPassthrough)
    } else {
        packager.with_renderer(CommonMarkRenderer::new().with_raw_html(!cli.no_raw_html))
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let book = runtime.block_on(packager.package(&document))?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&book.filename));
    book.write_to(fs::File::create(&output)?)?;

    if !cli.quiet {
        report(&book, &output);
    }
    Ok(())
}

fn report(book: &PackagedBook, output: &Path) {
    println!("Wrote {} ({} bytes)", output.display(), book.bytes.len());
    if !book.skipped_assets.is_empty() {
        println!("{} image(s) left as remote links:", book.skipped_assets.len());
        for skipped in &book.skipped_assets {
            println!("  {} ({})", skipped.url, skipped.reason);
        }
    }
}

fn build_config(cli: &Cli) -> quire::Result<PackageConfig> {
    let mut config = PackageConfig::default();
    if let Some(level) = cli.compression_level {
        config = config.with_compression_level(Some(level));
    }
    if let Some(n) = cli.concurrency {
        config = config.with_fetch_concurrency(n);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_fetch_timeout(Duration::from_secs(secs));
    }
    if let Some(path) = &cli.css {
        let bytes = fs::read(path)?;
        config = config.with_stylesheet(decode_text(&bytes, None));
    }
    Ok(config)
}

fn load_document(cli: &Cli) -> quire::Result<Document> {
    let bytes = fs::read(&cli.input)?;
    let is_json = cli
        .input
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let mut document = if is_json {
        parse_json_document(&bytes)?
    } else {
        let title = cli
            .input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Document::new(title, decode_text(&bytes, None))
    };

    if let Some(title) = &cli.title {
        document.title = title.clone();
    }
    if let Some(author) = &cli.author {
        document.author = Some(author.clone());
    }
    if let Some(description) = &cli.description {
        document.description = Some(description.clone());
    }
    if let Some(source) = &cli.source {
        document.source = Some(source.clone());
    }
    if let Some(date) = cli.date {
        document.date = Some(date);
    }
    if let Some(language) = &cli.language {
        document.language = Some(language.clone());
    }
    if let Some(path) = &cli.cover {
        document.cover = Some(fs::read(path)?);
    }

    Ok(document)
}

fn parse_json_document(bytes: &[u8]) -> quire::Result<Document> {
    let file: DocumentFile =
        serde_json::from_slice(bytes).map_err(|e| Error::InvalidDocument(e.to_string()))?;

    let cover = match file.cover.as_deref().map(str::trim) {
        Some(encoded) if !encoded.is_empty() => Some(
            BASE64
                .decode(encoded)
                .map_err(|e| Error::InvalidDocument(format!("cover: {e}")))?,
        ),
        _ => None,
    };

    Ok(Document {
        title: file.title,
        author: file.author,
        description: file.description,
        source: file.source,
        date: file.date,
        language: file.language,
        cover,
        body: file.body,
    })
}
