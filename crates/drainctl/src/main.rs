// # drainctl - DNS drain command line tool
//
// Removes or replaces a matching value across the DNS record sets of a
// project's zones and reverses previous runs from a persisted changelog.
//
// The binary is a thin integration layer: argument parsing, filter
// compilation, provider client construction, and changelog file handling.
// All reconciliation logic lives in drain-core.
//
// ## Configuration
//
// - `GCLOUD_ACCESS_TOKEN`: OAuth2 bearer token for the Cloud DNS API
//   (e.g. `export GCLOUD_ACCESS_TOKEN=$(gcloud auth print-access-token)`)
// - `DRAIN_LOG_LEVEL`: log level (trace, debug, info, warn, error)
//
// ## Examples
//
// Drain IP 1.2.3.4 in project api-project-xxx by removing it from records:
//
// ```bash
// drainctl google-cloud --project api-project-xxx drain 1.2.3.4/32 -f drain.json
// ```
//
// Drain by replacing the IP with 1.2.3.5:
//
// ```bash
// drainctl google-cloud --project api-project-xxx drain 1.2.3.4/32 --replace-by 1.2.3.5
// ```
//
// Undrain using the json file written by the drain run:
//
// ```bash
// drainctl google-cloud --project api-project-xxx undrain -f drain.json
// ```

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use drain_core::{
    DrainOptions, Drainer, FileChangeLog, UNLIMITED, UndrainOptions, Undrainer,
};
use drain_provider_gcloud::GoogleCloudDnsProvider;
use ipnet::IpNet;
use regex::Regex;
use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(
    name = "drainctl",
    about = "Drain by removing/replacing IP/net from DNS records with ease"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Drain and undrain DNS records using the Google Cloud DNS API
    #[command(name = "google-cloud", alias = "gcloud")]
    GoogleCloud(GoogleCloudArgs),

    /// Show version information
    Version,
}

#[derive(Args)]
struct GoogleCloudArgs {
    /// Name of the Google Cloud project
    #[arg(long)]
    project: String,

    #[command(subcommand)]
    command: GoogleCloudCommand,
}

#[derive(Subcommand)]
enum GoogleCloudCommand {
    /// Removes or replaces DNS record values
    Drain(DrainArgs),

    /// Rollback DNS changes by using the changelog file
    Undrain(UndrainArgs),
}

#[derive(Args)]
struct DrainArgs {
    /// Pattern to match record values: CIDR/IP when it parses as one,
    /// regex with --use-regex, literal value otherwise
    pattern: String,

    /// Do not modify DNS records (simulation only)
    #[arg(long)]
    dry: bool,

    /// Changelog file
    #[arg(short, long, default_value = "drain.json")]
    file: String,

    /// Apply only to zones matching the specified regex
    #[arg(short, long)]
    zone: Option<String>,

    /// Skip zones matching the specified regex
    #[arg(long)]
    skip: Option<String>,

    /// Apply only to records whose name matches the specified regex
    #[arg(long)]
    name: Option<String>,

    /// Record type to change
    #[arg(long = "type")]
    record_type: Option<String>,

    /// Max number of records to change (-1 = unlimited)
    #[arg(long, default_value_t = UNLIMITED, allow_hyphen_values = true)]
    limit: i64,

    /// Remove value from record even if it is the only value
    #[arg(long)]
    force: bool,

    /// Interpret the pattern as a regex
    #[arg(long)]
    use_regex: bool,

    /// Value to replace the matched data by (empty = no replacement)
    #[arg(long)]
    replace_by: Option<String>,
}

#[derive(Args)]
struct UndrainArgs {
    /// Do not modify DNS records (simulation only)
    #[arg(long)]
    dry: bool,

    /// File containing changes to revert
    #[arg(short, long, default_value = "drain.json")]
    file: String,

    /// Apply only to zones matching the specified regex
    #[arg(short, long)]
    zone: Option<String>,

    /// Skip zones matching the specified regex
    #[arg(long)]
    skip: Option<String>,

    /// Max number of records to change (-1 = unlimited)
    #[arg(long, default_value_t = UNLIMITED, allow_hyphen_values = true)]
    limit: i64,
}

fn main() -> ExitCode {
    // Render clap's own output but keep the exit code contract: 0 on
    // success (including help), 1 on any error
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let is_error = e.use_stderr();
            let _ = e.print();
            return if is_error {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(e) = init_tracing() {
        eprintln!("failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let rt = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();

    let result = rt.block_on(async {
        match cli.command {
            Command::GoogleCloud(args) => run_google_cloud(args).await,
            Command::Version => {
                println!("drainctl");
                println!("Version: {}", VERSION);
                Ok(())
            }
        }
    });

    match result {
        Ok(()) => {
            info!("finished after {:?}", start.elapsed());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() -> Result<()> {
    let level = match std::env::var("DRAIN_LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => bail!("DRAIN_LOG_LEVEL '{}' is not valid", other),
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}

async fn run_google_cloud(args: GoogleCloudArgs) -> Result<()> {
    let provider = build_provider(&args.project)?;

    match args.command {
        GoogleCloudCommand::Drain(drain_args) => run_drain(provider, drain_args).await,
        GoogleCloudCommand::Undrain(undrain_args) => run_undrain(provider, undrain_args).await,
    }
}

fn build_provider(project: &str) -> Result<Arc<GoogleCloudDnsProvider>> {
    let token = std::env::var("GCLOUD_ACCESS_TOKEN").context(
        "GCLOUD_ACCESS_TOKEN is required. \
        Set it via: export GCLOUD_ACCESS_TOKEN=$(gcloud auth print-access-token)",
    )?;

    let provider = GoogleCloudDnsProvider::new(project, token)
        .context("failed to construct the Cloud DNS client")?;

    Ok(Arc::new(provider))
}

async fn run_drain(provider: Arc<GoogleCloudDnsProvider>, args: DrainArgs) -> Result<()> {
    let options = drain_options(&args)?;

    if options.dry_run {
        info!("using dry run, no records will be changed");
    }

    if options.force {
        warn!("last-value guard disabled, records may end up empty");
    }

    let changelog = FileChangeLog::new(&args.file);
    let drainer = Drainer::new(provider, options);

    let result = match drain_mode(&args)? {
        DrainMode::IpNetwork(network) => {
            let replacement = args
                .replace_by
                .as_deref()
                .map(|r| {
                    r.parse::<IpAddr>().map_err(|_| {
                        anyhow::anyhow!(
                            "please specify a valid IP for replacement when using an IP matcher"
                        )
                    })
                })
                .transpose()?;
            drainer.drain_ip_network(network, replacement).await
        }
        DrainMode::Regex(regex) => drainer.drain_regex(regex, args.replace_by.clone()).await,
        DrainMode::Value(value) => drainer.drain_value(value, args.replace_by.clone()).await,
    };

    // Persist whatever was journaled, even when the run timed out: applied
    // changes must stay revertable
    let changes = drainer.changes();
    if let Err(e) = changelog.write(&changes).await {
        error!("failed to persist changelog: {}", e);
    } else {
        info!("{} change(s) written to {}", changes.len(), args.file);
    }

    result.context("drain failed")?;
    Ok(())
}

async fn run_undrain(provider: Arc<GoogleCloudDnsProvider>, args: UndrainArgs) -> Result<()> {
    let options = undrain_options(&args)?;

    if options.dry_run {
        info!("using dry run, no records will be changed");
    }

    let changes = FileChangeLog::new(&args.file)
        .load()
        .await
        .context("failed to load the changelog")?;

    info!("reverting {} change(s) from {}", changes.len(), args.file);

    Undrainer::new(provider, options)
        .undrain(&changes)
        .await
        .context("undrain failed")?;

    Ok(())
}

/// How the positional pattern is interpreted
enum DrainMode {
    IpNetwork(IpNet),
    Regex(Regex),
    Value(String),
}

fn drain_mode(args: &DrainArgs) -> Result<DrainMode> {
    if args.use_regex {
        let regex = Regex::new(&args.pattern)
            .with_context(|| format!("invalid regex pattern '{}'", args.pattern))?;
        return Ok(DrainMode::Regex(regex));
    }

    if let Some(network) = extract_ip_network(&args.pattern) {
        return Ok(DrainMode::IpNetwork(network));
    }

    Ok(DrainMode::Value(args.pattern.clone()))
}

/// Parse a pattern as CIDR, falling back to a bare IP as a host network
fn extract_ip_network(pattern: &str) -> Option<IpNet> {
    if let Ok(network) = pattern.parse::<IpNet>() {
        return Some(network);
    }

    pattern.parse::<IpAddr>().ok().map(IpNet::from)
}

fn drain_options(args: &DrainArgs) -> Result<DrainOptions> {
    let mut options = DrainOptions::new()
        .with_dry_run(args.dry)
        .with_force(args.force)
        .with_limit(args.limit);

    if let Some(pattern) = &args.zone {
        options = options.with_zone_filter(compile_filter("zone", pattern)?);
    }

    if let Some(pattern) = &args.skip {
        options = options.with_skip_filter(compile_filter("skip", pattern)?);
    }

    if let Some(pattern) = &args.name {
        options = options.with_name_filter(compile_filter("name", pattern)?);
    }

    if let Some(record_type) = &args.record_type {
        options = options.with_type_filter(record_type);
    }

    Ok(options)
}

fn undrain_options(args: &UndrainArgs) -> Result<UndrainOptions> {
    let mut options = UndrainOptions::new()
        .with_dry_run(args.dry)
        .with_limit(args.limit);

    if let Some(pattern) = &args.zone {
        options = options.with_zone_filter(compile_filter("zone", pattern)?);
    }

    if let Some(pattern) = &args.skip {
        options = options.with_skip_filter(compile_filter("skip", pattern)?);
    }

    Ok(options)
}

fn compile_filter(kind: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid {} filter regex '{}'", kind, pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_patterns_parse_as_networks() {
        let network = extract_ip_network("10.0.0.0/24").unwrap();
        assert_eq!(network.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn bare_ipv4_becomes_a_host_network() {
        let network = extract_ip_network("1.2.3.4").unwrap();
        assert_eq!(network.to_string(), "1.2.3.4/32");
    }

    #[test]
    fn bare_ipv6_becomes_a_host_network() {
        let network = extract_ip_network("2001:db8::1").unwrap();
        assert_eq!(network.to_string(), "2001:db8::1/128");
    }

    #[test]
    fn non_ip_patterns_are_not_networks() {
        assert!(extract_ip_network("mail.example.com.").is_none());
        assert!(extract_ip_network("10.0.0.0/999").is_none());
    }
}
