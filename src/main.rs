//! SEO Audit CLI - Audit a website or serve the audit API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use url::Url;

use seo_audit::{
    AuditConfig, Auditor,
    config::{API_KEY_ENV, DEFAULT_API_BASE, DEFAULT_PAGESPEED_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS},
    health::REFERENCE_URL,
    output::{OutputConfig, OutputFormat, OutputSort, output_report},
    server::{self, AppState},
};

/// Website SEO and performance auditor backed by Google PageSpeed Insights
#[derive(Parser, Debug)]
#[command(name = "seo-audit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log audit progress and per-analyzer details to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit a single URL and print the report
    Audit {
        /// URL of the site to audit
        url: String,

        /// Output format
        #[arg(short = 'o', long = "output", default_value = "human", value_enum)]
        output_format: OutputFormatArg,

        /// Sort order for technical issues
        #[arg(long = "sort", default_value = "rule", value_enum)]
        sort: OutputSortArg,

        #[command(flatten)]
        audit: AuditArgs,
    },
    /// Serve the audit HTTP API
    Serve {
        /// Address to listen on
        #[arg(long = "bind", default_value = "127.0.0.1:5000")]
        bind: SocketAddr,

        /// URL the health check audits
        #[arg(long = "health-url", default_value = REFERENCE_URL)]
        health_url: Url,

        #[command(flatten)]
        audit: AuditArgs,
    },
}

/// Settings shared by both subcommands
#[derive(Args, Debug)]
struct AuditArgs {
    /// Google PageSpeed Insights API key
    #[arg(long = "api-key", env = API_KEY_ENV, hide_env_values = true)]
    api_key: Option<String>,

    /// PageSpeed Insights endpoint
    #[arg(long = "api-base", default_value = DEFAULT_API_BASE)]
    api_base: String,

    /// Timeout for each outbound request, in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Timeout for each PageSpeed call, in seconds
    #[arg(long = "pagespeed-timeout", default_value_t = DEFAULT_PAGESPEED_TIMEOUT_SECS)]
    pagespeed_timeout: u64,

    /// Allow auditing private/internal IP addresses (localhost, 192.168.x.x, etc.)
    #[arg(long = "allow-private")]
    allow_private: bool,
}

impl AuditArgs {
    fn config(&self) -> AuditConfig {
        AuditConfig::builder()
            .maybe_api_key(self.api_key.clone())
            .api_base(&self.api_base)
            .request_timeout(Duration::from_secs(self.timeout))
            .pagespeed_timeout(Duration::from_secs(self.pagespeed_timeout))
            .allow_private(self.allow_private)
            .build()
    }
}

/// Output format argument
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormatArg {
    Human,
    Json,
    None,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::None => OutputFormat::None,
        }
    }
}

/// Output sort argument
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputSortArg {
    /// Order in which the checks run (default)
    Rule,
    /// Most severe first
    Severity,
}

impl From<OutputSortArg> for OutputSort {
    fn from(arg: OutputSortArg) -> Self {
        match arg {
            OutputSortArg::Rule => OutputSort::Rule,
            OutputSortArg::Severity => OutputSort::Severity,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Audit {
            url,
            output_format,
            sort,
            audit,
        } => {
            init_logging("warn", cli.verbose);

            // Print banner for human output
            if matches!(output_format, OutputFormatArg::Human) {
                print_banner();
            }

            let output_config = OutputConfig::new(output_format.into(), sort.into());
            run_audit(&url, audit.config(), &output_config).await
        }
        Command::Serve {
            bind,
            health_url,
            audit,
        } => {
            init_logging("info", cli.verbose);
            run_server(bind, health_url, audit.config()).await
        }
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging on stderr; `RUST_LOG` overrides the directives built here
fn init_logging(default: &str, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directives(default, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Filter directives: `default` for everything, crate debug output under
/// `--verbose`, and the HTML parser crates kept to errors
fn log_directives(default: &str, verbose: bool) -> String {
    let mut directives = vec![default.to_string()];
    if verbose {
        directives.push("seo_audit=debug".to_string());
    }
    directives.push("html5ever=error".to_string());
    directives.push("selectors=error".to_string());
    directives.join(",")
}

async fn run_audit(
    url: &str,
    config: AuditConfig,
    output_config: &OutputConfig,
) -> seo_audit::Result<()> {
    let auditor = Auditor::new(config)?;
    let report = auditor.audit(&with_default_scheme(url)).await?;

    let stdout = std::io::stdout();
    let mut writer = stdout.lock();
    output_report(&report, output_config, &mut writer)?;

    Ok(())
}

async fn run_server(bind: SocketAddr, health_url: Url, config: AuditConfig) -> seo_audit::Result<()> {
    if !config.has_api_key() {
        tracing::warn!("{} is not set; audits will fail until it is", API_KEY_ENV);
    }

    let auditor = Auditor::new(config)?;
    server::serve(bind, AppState::new(auditor, health_url)).await
}

/// Auto-add https:// if no scheme provided
fn with_default_scheme(url: &str) -> String {
    if url.contains("://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

fn print_banner() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("SEO Audit v{}", VERSION);
    println!("by Robert F. Ecker <robert@robdotec.com>");
    println!();
}
