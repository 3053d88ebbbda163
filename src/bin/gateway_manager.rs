//! Gateway lifecycle CLI: create, delete, list, and inspect gateways.

use agentcore_gateway::aws::{get_current_account_id, AgentCoreClient, AwsContext};
use agentcore_gateway::config::GatewayConfig;
use agentcore_gateway::orchestrator::GatewayOrchestrator;
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gateway-manager")]
#[command(about = "Manage Bedrock AgentCore gateways and their lambda targets")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// AWS region
    #[arg(long, global = true, default_value = "us-west-2")]
    region: String,

    /// AWS profile to use (overrides the default credential chain)
    #[arg(long, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a gateway from a JSON config file and attach its lambda target
    Create {
        /// JSON file matching the GatewayConfig schema
        #[arg(long)]
        config_file: PathBuf,
    },

    /// Delete a gateway and all of its targets, children first
    Delete {
        #[arg(long)]
        gateway_id: String,
    },

    /// List all gateways
    List,

    /// Show a single gateway
    Info {
        #[arg(long)]
        gateway_id: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print the error and its cause chain to stderr.
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();
    let _ = writeln!(stderr, "\nError: {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  Caused by: {cause}");
        source = cause.source();
    }
}

async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    // Ctrl-C aborts the current poll wait instead of killing mid-request.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Interrupt received, cancelling");
                cancel.cancel();
            }
        });
    }

    if let Some(profile) = &args.profile {
        info!(profile = %profile, "Using AWS profile");
    }

    let ctx = AwsContext::with_profile(&args.region, args.profile.as_deref()).await;
    let account = get_current_account_id(ctx.sdk_config()).await?;
    let orchestrator = GatewayOrchestrator::new(AgentCoreClient::from_context(&ctx), account)
        .with_cancellation(cancel);

    match args.command {
        Command::Create { config_file } => {
            let config = GatewayConfig::from_file(&config_file)?;
            let gateway = orchestrator.create_gateway(&config).await?;
            let target = orchestrator
                .add_lambda_target(&gateway.gateway_id, &config)
                .await?;

            let result = serde_json::json!({ "gateway": gateway, "target": target });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Delete { gateway_id } => {
            orchestrator.delete_gateway(&gateway_id).await?;
            let result = serde_json::json!({ "status": "deleted" });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::List => {
            let gateways = orchestrator.list_gateways().await?;
            println!("{}", serde_json::to_string_pretty(&gateways)?);
        }

        Command::Info { gateway_id } => match orchestrator.gateway_info(&gateway_id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => bail!("gateway {gateway_id} not found"),
        },
    }

    Ok(())
}
