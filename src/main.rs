//! @ai:module:intent CLI entry point for the provider audit
//! @ai:module:layer presentation
//! @ai:module:public_api main
//! @ai:module:depends_on audit, config, output

use clap::{Args, Parser, Subcommand};
use provaudit::{audit, format_summary, AuditConfig, Checks, Reporter, Settings, WriterSink};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "provaudit")]
#[command(author, version, about = "Audit a Terraform provider's schemas and documentation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the design rules and the documentation cross-check
    Check {
        #[command(flatten)]
        docs: DocsArgs,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run the design rules only
    Schema {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Run the documentation cross-check only
    Docs {
        #[command(flatten)]
        docs: DocsArgs,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Path to the terraform provider to check
    #[arg(long)]
    provider_path: PathBuf,

    /// Optional TOML file with classifier, docs and rule settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, default_value = "false")]
    debug: bool,
}

#[derive(Args)]
struct DocsArgs {
    /// Prefix name of the provider, e.g. "acme" for acme_widget
    #[arg(long)]
    provider_name: String,

    /// Documentation root; defaults to <provider-path>/../website
    #[arg(long)]
    docs_path: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let level = if debug { "provaudit=debug" } else { "provaudit=info" };
    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = level.parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(
    docs: Option<DocsArgs>,
    common: CommonArgs,
    checks: Checks,
) -> provaudit::Result<AuditConfig> {
    let prefix = docs
        .as_ref()
        .map(|d| d.provider_name.clone())
        .unwrap_or_default();
    let mut config = AuditConfig::new(prefix, common.provider_path)
        .with_verbose(common.debug)
        .with_checks(checks);

    if let Some(docs_path) = docs.and_then(|d| d.docs_path) {
        config = config.with_docs_path(docs_path);
    }
    if let Some(path) = common.config {
        config = config.with_settings(Settings::load(&path)?);
    }
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let (docs, common, checks) = match cli.command {
        Commands::Check { docs, common } => (Some(docs), common, Checks::default()),
        Commands::Schema { common } => (
            None,
            common,
            Checks {
                rules: true,
                docs: false,
            },
        ),
        Commands::Docs { docs, common } => (
            Some(docs),
            common,
            Checks {
                rules: false,
                docs: true,
            },
        ),
    };

    init_tracing(common.debug);

    let config = match build_config(docs, common, checks) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(2);
        }
    };

    let mut sink = WriterSink::new(std::io::stdout().lock());
    let mut reporter = Reporter::new(&mut sink, config.verbose);

    match audit::run(&config, &mut reporter) {
        Ok(summary) => {
            eprintln!("{}", format_summary(&summary));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}
