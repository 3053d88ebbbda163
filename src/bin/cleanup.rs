//! Cleanup CLI: inventory and best-effort teardown of managed resources.

use agentcore_gateway::aws::{
    get_current_account_id, AgentCoreClient, AwsContext, CloudFormationClient, S3Client,
};
use agentcore_gateway::cleanup::{ConfirmPolicy, ForceApprove, InteractivePrompt, ResourceCleanup};
use agentcore_gateway::inventory::take_inventory;
use agentcore_gateway::matcher::KeywordMatcher;
use agentcore_gateway::orchestrator::GatewayOrchestrator;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gateway-cleanup")]
#[command(about = "Inventory and clean up gateways, bucket data, and the auth stack")]
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

    /// CloudFormation stack backing the Cognito authorizer
    #[arg(long, global = true, default_value = "McpCognitoOauthStack")]
    stack_name: String,

    /// Delete without prompting for each resource
    #[arg(long, global = true)]
    force: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show managed resources without touching anything
    List,

    /// Delete managed gateways (and their targets) only
    CleanupGateways,

    /// Delete gateways, bucket data, and the auth stack
    CleanupAll,
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

    let ctx = AwsContext::with_profile(&args.region, args.profile.as_deref()).await;
    let control = AgentCoreClient::from_context(&ctx);
    let store = S3Client::from_context(&ctx);
    let stacks = CloudFormationClient::from_context(&ctx);

    if let Command::List = args.command {
        let inventory = take_inventory(
            &control,
            &store,
            &stacks,
            &args.stack_name,
            &KeywordMatcher::gateway_defaults(),
            &KeywordMatcher::bucket_defaults(),
        )
        .await;
        println!("{}", serde_json::to_string_pretty(&inventory)?);
        return Ok(());
    }

    let account = get_current_account_id(ctx.sdk_config()).await?;
    let orchestrator =
        GatewayOrchestrator::new(control, account).with_cancellation(cancel.clone());

    let confirm: Box<dyn ConfirmPolicy> = if args.force {
        Box::new(ForceApprove)
    } else {
        Box::new(InteractivePrompt)
    };

    let cleanup = ResourceCleanup::new(orchestrator, store, stacks, &args.stack_name, confirm)
        .with_cancellation(cancel);

    let report = match args.command {
        Command::CleanupGateways => cleanup.cleanup_gateways().await,
        Command::CleanupAll => cleanup.cleanup_all().await,
        Command::List => unreachable!(),
    };

    // The report is the result, even when individual items failed.
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.errors.is_empty() {
        info!(count = report.errors.len(), "Sweep finished with errors");
    }

    Ok(())
}
