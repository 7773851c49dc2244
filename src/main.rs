//! Muffet command-line entry point

use clap::{Parser, ValueEnum};
use muffet::checker::{
    LinkFetcher, LinkFinder, LinkValidator, PageChecker, PageParser, RobotsPolicy, SitemapSet,
};
use muffet::config::{self, ClientOptions, ThrottleOptions};
use muffet::http::{HttpClient, RedirectClient, ThrottledClient};
use muffet::output::{format_json, TextFormatter};
use muffet::{robots, sitemap, MuffetError};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Check a website for broken links
#[derive(Parser, Debug)]
#[command(name = "muffet", version, about = "Check a website for broken links")]
struct Cli {
    /// Seed URL to start checking from
    #[arg(value_name = "URL")]
    url: String,

    /// Response body limit in bytes
    #[arg(short, long, default_value_t = config::DEFAULT_BUFFER_SIZE)]
    buffer_size: usize,

    /// Maximum concurrent HTTP connections
    #[arg(short = 'c', long, default_value_t = config::DEFAULT_MAX_CONNECTIONS)]
    max_connections: usize,

    /// Maximum concurrent HTTP connections per host
    #[arg(long, default_value_t = config::DEFAULT_MAX_CONNECTIONS_PER_HOST)]
    max_connections_per_host: usize,

    /// Maximum requests per second per host
    #[arg(short = 'r', long, value_name = "N")]
    rate_limit: Option<u32>,

    /// Maximum number of redirections to follow
    #[arg(long, default_value_t = config::DEFAULT_MAX_REDIRECTIONS)]
    max_redirections: usize,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Static request header ("Key: Value"); repeatable
    #[arg(long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Proxy URL
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,

    /// Do not verify TLS certificates
    #[arg(long)]
    skip_tls_verification: bool,

    /// Exclude URLs matching the pattern; repeatable
    #[arg(short = 'e', long = "exclude", value_name = "REGEX")]
    exclude: Vec<String>,

    /// Check only URLs matching the pattern; repeatable
    #[arg(short = 'i', long = "include", value_name = "REGEX")]
    include: Vec<String>,

    /// Do not check the existence of #fragment targets
    #[arg(short = 'f', long)]
    ignore_fragments: bool,

    /// Respect the site's robots.txt when expanding pages
    #[arg(long)]
    follow_robots_txt: bool,

    /// Expand only pages listed in the site's sitemap.xml
    #[arg(long)]
    follow_sitemap_xml: bool,

    /// Check the links of the seed page only, without recursing
    #[arg(short = 'x', long)]
    one_page_only: bool,

    /// Also show successful links
    #[arg(short, long, conflicts_with = "json")]
    verbose: bool,

    /// Emit results as JSON
    #[arg(long)]
    json: bool,

    /// When to color the output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    color: ColorMode,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("muffet=warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => console::set_colors_enabled(true),
        ColorMode::Never => console::set_colors_enabled(false),
        ColorMode::Auto => {}
    }

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(error) => {
            eprintln!("{}", console::Style::new().for_stderr().red().apply_to(error));
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> muffet::Result<bool> {
    let client = Arc::new(ThrottledClient::new(
        RedirectClient::new(
            HttpClient::new(&ClientOptions {
                buffer_size: cli.buffer_size,
                timeout: Duration::from_secs(cli.timeout),
                proxy: cli.proxy.clone(),
                skip_tls_verification: cli.skip_tls_verification,
                headers: parse_headers(&cli.headers)?,
            })?,
            cli.max_redirections,
        ),
        &ThrottleOptions {
            max_connections: cli.max_connections,
            max_connections_per_host: cli.max_connections_per_host,
            rate_limit: cli.rate_limit,
        },
    ));

    let finder = LinkFinder::new(
        compile_patterns(&cli.exclude)?,
        compile_patterns(&cli.include)?,
    );

    let fetcher = Arc::new(LinkFetcher::new(
        client.clone(),
        PageParser::new(finder),
        cli.ignore_fragments,
    ));

    // strip embedded CR/LF from copy-pasted seed URLs
    let seed = cli.url.replace(['\r', '\n'], "");

    let outcome = fetcher
        .fetch(&seed)
        .await
        .map_err(MuffetError::RootFetch)?;
    let root = outcome.page.ok_or(MuffetError::RootNotHtml)?;

    let hostname = root
        .url()
        .host_str()
        .ok_or_else(|| MuffetError::Argument(format!("no hostname in URL: {}", root.url())))?
        .to_string();

    let robots: Option<Box<dyn RobotsPolicy>> = if cli.follow_robots_txt {
        Some(Box::new(robots::fetch(&client, root.url()).await?))
    } else {
        None
    };

    let sitemap: Option<Box<dyn SitemapSet>> = if cli.follow_sitemap_xml {
        let urls = sitemap::fetch(&client, root.url()).await?;
        tracing::info!("sitemap lists {} URLs", urls.len());

        if urls.is_empty() {
            None
        } else {
            Some(Box::new(urls))
        }
    } else {
        None
    };

    let validator = LinkValidator::new(hostname, robots, sitemap);
    let (checker, mut results) = PageChecker::new(fetcher, validator, cli.one_page_only);

    let crawl = tokio::spawn(checker.check(root));
    let mut ok = true;

    if cli.json {
        let mut failed = Vec::new();

        while let Some(result) = results.recv().await {
            if !result.ok() {
                ok = false;
                failed.push(result);
            }
        }

        println!("{}", format_json(&failed)?);
    } else {
        let formatter = TextFormatter::new(cli.verbose);

        while let Some(result) = results.recv().await {
            if !result.ok() {
                ok = false;
            }

            if !result.ok() || cli.verbose {
                println!("{}", formatter.format(&result));
            }
        }
    }

    let _ = crawl.await;

    Ok(ok)
}

fn parse_headers(entries: &[String]) -> muffet::Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for entry in entries {
        let (name, value) = entry
            .split_once(':')
            .ok_or_else(|| MuffetError::Argument(format!("invalid header: {}", entry)))?;

        let name = HeaderName::from_bytes(name.trim().as_bytes())
            .map_err(|_| MuffetError::Argument(format!("invalid header name: {}", name)))?;
        let value = HeaderValue::from_str(value.trim())
            .map_err(|_| MuffetError::Argument(format!("invalid header value in: {}", entry)))?;

        headers.insert(name, value);
    }

    Ok(headers)
}

fn compile_patterns(patterns: &[String]) -> muffet::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| Regex::new(pattern).map_err(MuffetError::from))
        .collect()
}
