//! CLI binary for briefpress.
//!
//! A thin shim over the library crate: parses flags, loads inputs, and
//! prints JSON reports. Exit codes are part of the contract — preflight
//! exits 0 on PASS, 2 on FAIL, 1 on operational error; route exits 4
//! when the connector leaves a manual step pending.

use anyhow::{Context, Result};
use briefpress::{
    build_connector_prompt, load_payload, preflight_artifact, route_render, write_error_record,
    write_run_log, InputFormat, PromptProfile, RenderConfig, RenderMode, RouteStatus, RuleSet,
};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"Examples:
  # Normalize a Markdown draft into canonical payload JSON
  briefpress normalize drafts/q3-brief.md -o payload.json

  # Render through the remote service, keeping an audit log
  briefpress render payload.json -o brief.pdf --run-log run.json

  # Verify an artifact against a rule set (exit 0 PASS, 2 FAIL)
  briefpress preflight brief.pdf --rules rules.json

  # Route automatically: local writer first, remote on failure
  briefpress route payload.json -o brief.pdf --mode auto

Credentials are resolved from, in order: --credentials-json, the
PDF_SERVICES_CREDENTIALS_JSON file path, the default config-dir file,
then the PDF_SERVICES_CLIENT_ID/PDF_SERVICES_CLIENT_SECRET environment
pair (legacy ADOBE_-prefixed names also accepted).
"#;

/// Render executive briefs to PDF and verify them before release.
#[derive(Parser, Debug)]
#[command(
    name = "briefpress",
    version,
    about = "Render executive briefs to PDF and run compliance preflight",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging.
    #[arg(short, long, env = "BRIEFPRESS_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all logging.
    #[arg(short, long, env = "BRIEFPRESS_QUIET", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize a JSON/YAML/Markdown brief into canonical payload JSON.
    Normalize {
        /// Input file; format detected from the extension.
        input: PathBuf,

        /// Write the payload here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Force the input format: json, yaml, or markdown.
        #[arg(long)]
        format: Option<String>,
    },

    /// Render a payload through the remote service.
    Render {
        /// Normalized payload (or any accepted input format).
        input: PathBuf,

        /// Destination PDF path.
        #[arg(short, long, env = "BRIEFPRESS_OUTPUT")]
        output: PathBuf,

        #[command(flatten)]
        remote: RemoteArgs,

        /// Persist the run log (or error record on failure) here.
        #[arg(long, env = "BRIEFPRESS_RUN_LOG")]
        run_log: Option<PathBuf>,
    },

    /// Verify an artifact against a compliance rule set.
    Preflight {
        /// The PDF to verify.
        artifact: PathBuf,

        /// Rule document (JSON or YAML).
        #[arg(long, env = "BRIEFPRESS_RULES")]
        rules: PathBuf,

        /// Write the report here as well as stdout.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print the human-in-the-loop connector prompt for a payload.
    Prompt {
        input: PathBuf,

        /// Prompt profile: strict-legal, standard, or fast.
        #[arg(long, default_value = "standard")]
        profile: String,
    },

    /// Route a render to a backend, with fallback in auto mode.
    Route {
        input: PathBuf,

        /// Destination PDF path.
        #[arg(short, long, env = "BRIEFPRESS_OUTPUT")]
        output: PathBuf,

        /// Backend: auto, local, remote, or connector.
        #[arg(long, env = "BRIEFPRESS_MODE", default_value = "auto")]
        mode: String,

        /// Connector prompt profile.
        #[arg(long, default_value = "standard")]
        profile: String,

        #[command(flatten)]
        remote: RemoteArgs,

        /// Write the routing report here as well as stdout.
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

/// Flags shared by every command that can reach the remote service.
#[derive(clap::Args, Debug)]
struct RemoteArgs {
    /// OAuth token endpoint.
    #[arg(long, env = "BRIEFPRESS_TOKEN_URL")]
    token_url: Option<String>,

    /// API base URL.
    #[arg(long, env = "BRIEFPRESS_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Credentials JSON file, overriding the resolution chain.
    #[arg(long, env = "BRIEFPRESS_CREDENTIALS_JSON")]
    credentials_json: Option<PathBuf>,

    /// Polling deadline in seconds.
    #[arg(long, env = "BRIEFPRESS_POLL_TIMEOUT", default_value_t = 300)]
    poll_timeout: u64,

    /// Delay between poll attempts in milliseconds (100 ms floor).
    #[arg(long, env = "BRIEFPRESS_POLL_INTERVAL", default_value_t = 2000)]
    poll_interval: u64,

    /// Per-request network timeout in seconds.
    #[arg(long, env = "BRIEFPRESS_REQUEST_TIMEOUT", default_value_t = 60)]
    request_timeout: u64,
}

impl RemoteArgs {
    fn into_config(self) -> Result<RenderConfig> {
        let mut builder = RenderConfig::builder()
            .poll_timeout_secs(self.poll_timeout)
            .poll_interval_ms(self.poll_interval)
            .request_timeout_secs(self.request_timeout);
        if let Some(url) = self.token_url {
            builder = builder.token_url(url);
        }
        if let Some(url) = self.api_base_url {
            builder = builder.api_base_url(url);
        }
        if let Some(path) = self.credentials_json {
            builder = builder.credentials_json(path);
        }
        builder.build().context("invalid remote configuration")
    }
}

fn parse_format(raw: Option<&str>) -> Result<InputFormat> {
    Ok(match raw {
        None => InputFormat::Auto,
        Some("json") => InputFormat::Json,
        Some("yaml") | Some("yml") => InputFormat::Yaml,
        Some("markdown") | Some("md") => InputFormat::Markdown,
        Some(other) => anyhow::bail!("unknown format '{other}' (expected json, yaml, or markdown)"),
    })
}

fn emit(text: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Normalize {
            input,
            output,
            format,
        } => {
            let payload = load_payload(&input, parse_format(format.as_deref())?)?;
            emit(&serde_json::to_string_pretty(&payload)?, output.as_ref())?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Render {
            input,
            output,
            remote,
            run_log,
        } => {
            let payload = load_payload(&input, InputFormat::Auto)?;
            let config = remote.into_config()?;
            match briefpress::render_remote(&payload, &output, &config).await {
                Ok(log) => {
                    if let Some(path) = &run_log {
                        write_run_log(path, &log)?;
                    }
                    println!("{}", serde_json::to_string_pretty(&log)?);
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    if let Some(path) = &run_log {
                        write_error_record(path, "createpdf", "remote", &err)?;
                    }
                    Err(err.into())
                }
            }
        }

        Command::Preflight {
            artifact,
            rules,
            report,
        } => {
            let rules = RuleSet::load(&rules)?;
            let result = preflight_artifact(&artifact, &rules)?;
            let rendered = serde_json::to_string_pretty(&result)?;
            if let Some(path) = &report {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            println!("{rendered}");
            Ok(if result.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            })
        }

        Command::Prompt { input, profile } => {
            let payload = load_payload(&input, InputFormat::Auto)?;
            let profile = PromptProfile::parse(&profile)?;
            println!("{}", build_connector_prompt(&payload, profile));
            Ok(ExitCode::SUCCESS)
        }

        Command::Route {
            input,
            output,
            mode,
            profile,
            remote,
            report,
        } => {
            let payload = load_payload(&input, InputFormat::Auto)?;
            let mode = RenderMode::parse(&mode)?;
            let profile = PromptProfile::parse(&profile)?;
            let config = remote.into_config()?;
            let routed = route_render(&payload, &output, &config, mode, profile).await;
            let rendered = serde_json::to_string_pretty(&routed)?;
            if let Some(path) = &report {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
            println!("{rendered}");
            Ok(match routed.status {
                RouteStatus::Rendered => ExitCode::SUCCESS,
                RouteStatus::PendingManualRun => ExitCode::from(4),
                RouteStatus::Failed => ExitCode::FAILURE,
            })
        }
    }
}
