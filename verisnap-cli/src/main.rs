use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use url::Url;

mod analyze;
mod client;
mod error;
mod serve;

use analyze::{AnalyzeOptions, ReportTarget, run_analyze};
use serve::run_serve;

#[derive(Parser, Debug)]
#[command(name = "verisnap", version)]
#[command(about = "verisnap - product photo authenticity checker")]
struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the web UI and analysis API
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0:3000")]
        addr: SocketAddr,
    },
    /// Analyze a product photo against a running server
    Analyze {
        /// Image file to upload
        file: PathBuf,
        /// Base URL of the server; a path prefix such as `/verisnap` is kept
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
        /// Use the demo endpoint (no provider credentials needed)
        #[arg(long)]
        demo: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Write the report to this file
        #[arg(long, conflicts_with = "report_dir")]
        report: Option<PathBuf>,
        /// Write the report into this directory under its generated name
        #[arg(long)]
        report_dir: Option<PathBuf>,
    },
}

fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let outcome = match cli.command {
        Commands::Serve { addr } => run_serve(addr).await,
        Commands::Analyze {
            file,
            server,
            demo,
            json,
            report,
            report_dir,
        } => match Url::parse(&server) {
            Ok(server) => {
                run_analyze(AnalyzeOptions {
                    file,
                    server,
                    demo,
                    report: ReportTarget::from_args(report, report_dir),
                    json,
                })
                .await
            }
            Err(e) => Err(e.into()),
        },
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
