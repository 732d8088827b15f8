//! volscope
//!
//! Read-only inspection of OpenEBS volume plugins: lists and describes
//! ZFS LocalPV, LVM LocalPV and Jiva volumes and prints the logs of
//! upgrade jobs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use volscope::upgrade::DEFAULT_OPENEBS_NAMESPACE;
use volscope::{
    describe_volumes, get_volumes, job_status, print_volumes, CasType, ClusterConfig,
    KubeCluster, OutputFormat, Result,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// volscope - inspect OpenEBS volumes and upgrades
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the kubeconfig file (defaults to in-cluster or ~/.kube/config)
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long, global = true)]
    context: Option<String>,

    /// Namespace OpenEBS is installed in
    #[arg(
        long,
        env = "OPENEBS_NAMESPACE",
        default_value = DEFAULT_OPENEBS_NAMESPACE,
        global = true
    )]
    openebs_namespace: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON", global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Display one or many resources
    Get {
        #[command(subcommand)]
        resource: GetResource,
    },
    /// Show details of a specific resource
    Describe {
        #[command(subcommand)]
        resource: DescribeResource,
    },
    /// Inspect upgrades
    Upgrade {
        #[command(subcommand)]
        action: UpgradeAction,
    },
}

#[derive(Subcommand, Debug)]
enum GetResource {
    /// List volumes of one or every plugin
    #[command(alias = "volume", alias = "vol")]
    Volumes {
        /// Only show volumes of this plugin (jiva, lvm, zfs)
        #[arg(long)]
        cas_type: Option<CasType>,

        /// Only show volumes whose plugin resource lives in this namespace
        #[arg(short, long, default_value = "")]
        namespace: String,

        /// Output format (table, json, yaml)
        #[arg(short, long, default_value = "table")]
        output: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
enum DescribeResource {
    /// Describe volumes by PersistentVolume name
    #[command(alias = "volumes", alias = "vol")]
    Volume {
        #[arg(required = true)]
        names: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum UpgradeAction {
    /// Show the logs of the upgrade jobs
    Status {
        /// Follow the live log of the first upgrade pod
        #[arg(short, long)]
        wait: bool,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<()> {
    debug!("Starting {} {}", volscope::NAME, volscope::VERSION);

    let config = ClusterConfig {
        kubeconfig: args.kubeconfig,
        context: args.context,
    };
    let cluster = KubeCluster::connect(&config).await?;
    let mut out = std::io::stdout();

    match args.command {
        Command::Get {
            resource:
                GetResource::Volumes {
                    cas_type,
                    namespace,
                    output,
                },
        } => {
            let rows = get_volumes(&cluster, cas_type, &namespace).await?;
            print_volumes(&mut out, &rows, output, &namespace, cas_type)
        }
        Command::Describe {
            resource: DescribeResource::Volume { names },
        } => describe_volumes(&cluster, &names, &mut out).await,
        Command::Upgrade {
            action: UpgradeAction::Status { wait },
        } => job_status(&cluster, &args.openebs_namespace, wait, &mut out).await,
    }
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let mut filter = EnvFilter::from_default_env().add_directive(level.into());
    for directive in ["hyper=warn", "tower=warn", "kube=warn"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    // stdout carries command output only
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_volumes() {
        let args = Args::try_parse_from([
            "volscope", "get", "volumes", "--cas-type", "zfs", "-n", "openebs", "-o", "json",
        ])
        .unwrap();

        match args.command {
            Command::Get {
                resource:
                    GetResource::Volumes {
                        cas_type,
                        namespace,
                        output,
                    },
            } => {
                assert_eq!(cas_type, Some(CasType::Zfs));
                assert_eq!(namespace, "openebs");
                assert_eq!(output, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_upgrade_status() {
        let args = Args::try_parse_from(["volscope", "upgrade", "status", "--wait"]).unwrap();
        assert_eq!(args.openebs_namespace, "openebs");
        assert!(matches!(
            args.command,
            Command::Upgrade {
                action: UpgradeAction::Status { wait: true }
            }
        ));
    }

    #[test]
    fn test_describe_requires_name() {
        assert!(Args::try_parse_from(["volscope", "describe", "volume"]).is_err());
        assert!(
            Args::try_parse_from(["volscope", "get", "volumes", "--cas-type", "cstor"]).is_err()
        );
    }
}
