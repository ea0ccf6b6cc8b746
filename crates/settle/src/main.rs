//! settle: wait for asynchronous AWS resources to reach a stable state
//!
//! Also drives the create/delete lifecycles that need such waits and sweeps
//! leftover Global Accelerator accelerators.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use settle::aws::globalaccelerator::accelerator as ga_lifecycle;
use settle::aws::globalaccelerator::sweep::{
    DEFAULT_SWEEP_CONCURRENCY, SweepConfig, sweep_accelerators,
};
use settle::aws::globalaccelerator::{
    AcceleratorAttributes, CreateAcceleratorInput, GlobalAcceleratorClient,
    find_accelerator_attributes_by_arn, find_accelerator_by_arn, status_accelerator,
    wait_accelerator_deployed,
};
use settle::aws::memorydb::snapshot::{self as snapshot_lifecycle, SnapshotSpec};
use settle::aws::memorydb::status::{
    status_acl, status_cluster, status_cluster_parameter_group, status_cluster_security_groups,
    status_cluster_shards, status_cluster_sns_topic, status_snapshot, status_user,
};
use settle::aws::memorydb::{self, MemoryDbClient};
use settle::aws::xray::{self, EncryptionType, XRayClient, status_encryption_config};
use settle::aws::{AwsContext, AwsError};
use settle::config::TimeoutOverrides;
use settle::wait::Settled;
use settle_common::ResourceKind;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when `RUST_LOG` is not set
const DEFAULT_LOG_FILTER: &str = "info,aws_config=warn,aws_smithy_runtime=warn,\
    aws_smithy_runtime_api=warn,aws_sdk_memorydb=warn,aws_sdk_globalaccelerator=warn,\
    aws_sdk_xray=warn";

#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(about = "Wait for asynchronous AWS resources to settle")]
#[command(version)]
struct Args {
    /// AWS region
    #[arg(long, global = true, env = "AWS_REGION", default_value = "us-east-1")]
    region: String,

    /// AWS profile to use
    #[arg(long, global = true, env = "AWS_PROFILE")]
    aws_profile: Option<String>,

    /// JSON file with per-resource timeout overrides
    #[arg(long, global = true, env = "SETTLE_TIMEOUTS")]
    timeouts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Resources the CLI can wait on or describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Kind {
    MemorydbSnapshot,
    MemorydbCluster,
    MemorydbAcl,
    MemorydbUser,
    Accelerator,
    XrayEncryption,
}

impl Kind {
    fn resource_kind(self) -> ResourceKind {
        match self {
            Kind::MemorydbSnapshot => ResourceKind::MemorydbSnapshot,
            Kind::MemorydbCluster => ResourceKind::MemorydbCluster,
            Kind::MemorydbAcl => ResourceKind::MemorydbAcl,
            Kind::MemorydbUser => ResourceKind::MemorydbUser,
            Kind::Accelerator => ResourceKind::GlobalacceleratorAccelerator,
            Kind::XrayEncryption => ResourceKind::XrayEncryptionConfig,
        }
    }
}

/// State to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, strum::Display)]
#[strum(serialize_all = "kebab-case")]
enum Goal {
    /// available, active or deployed, depending on the resource
    #[default]
    Ready,
    /// gone
    Deleted,
    /// cluster parameter group in-sync
    ParameterGroupInSync,
    /// all cluster security groups active
    SecurityGroupsActive,
}

#[derive(clap::Args, Debug)]
struct WaitArgs {
    #[arg(value_enum)]
    kind: Kind,

    /// Name or ARN; X-Ray defaults to the region
    id: Option<String>,

    #[arg(long, value_enum, default_value_t = Goal::Ready)]
    until: Goal,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Wait for a resource to reach a state
    Wait(WaitArgs),

    /// Look a resource up once and print it as JSON
    Describe {
        #[arg(value_enum)]
        kind: Kind,

        /// Name or ARN; X-Ray defaults to the region
        id: Option<String>,
    },

    /// MemoryDB snapshots
    #[command(subcommand)]
    Snapshot(SnapshotCommand),

    /// Global Accelerator accelerators
    #[command(subcommand)]
    Accelerator(AcceleratorCommand),

    /// X-Ray encryption configuration
    #[command(subcommand)]
    Xray(XrayCommand),

    /// Delete leftover accelerators with their listeners and endpoint groups
    SweepAccelerators {
        /// Only sweep accelerators whose name starts with this prefix
        #[arg(long)]
        name_prefix: Option<String>,

        /// Actually delete accelerators (default is dry-run)
        #[arg(long)]
        execute: bool,

        /// Accelerators swept at once
        #[arg(long, default_value_t = DEFAULT_SWEEP_CONCURRENCY)]
        concurrency: usize,
    },
}

#[derive(Subcommand, Debug)]
enum SnapshotCommand {
    /// Create a snapshot and wait until it is available
    Create {
        /// Cluster to snapshot
        #[arg(long)]
        cluster: String,

        /// Snapshot name
        #[arg(long, conflicts_with = "name_prefix")]
        name: Option<String>,

        /// Generate a unique name with this prefix
        #[arg(long)]
        name_prefix: Option<String>,

        /// KMS key used to encrypt the snapshot
        #[arg(long)]
        kms_key_id: Option<String>,

        /// Tag as KEY=VALUE, repeatable
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Delete a snapshot and wait until it is gone
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
enum AcceleratorCommand {
    /// Create an accelerator and wait until it is deployed
    Create {
        name: String,

        /// IPV4 or DUAL_STACK
        #[arg(long, default_value = "IPV4")]
        ip_address_type: String,

        /// Create the accelerator disabled
        #[arg(long)]
        disabled: bool,

        /// Enable flow logs into this S3 bucket
        #[arg(long)]
        flow_logs_bucket: Option<String>,

        /// Key prefix for flow logs
        #[arg(long, requires = "flow_logs_bucket")]
        flow_logs_prefix: Option<String>,

        /// Tag as KEY=VALUE, repeatable
        #[arg(long = "tag", value_parser = parse_tag)]
        tags: Vec<(String, String)>,
    },

    /// Disable and delete an accelerator
    Delete { arn: String },
}

#[derive(Subcommand, Debug)]
enum XrayCommand {
    /// Set the region's encryption configuration and wait until it is active
    Put {
        /// KMS or NONE
        #[arg(long = "type")]
        encryption_type: EncryptionType,

        /// KMS key, only with --type KMS
        #[arg(long)]
        key_id: Option<String>,
    },
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&e);
        std::process::exit(1);
    }
}

/// Print error in a user-friendly way
fn print_error(e: &anyhow::Error) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    let _ = writeln!(stderr, "\n\x1b[1;31mError:\x1b[0m {e}");

    let mut source = e.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "  \x1b[33mCaused by:\x1b[0m {cause}");
        source = cause.source();
    }

    let suggestion = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<AwsError>())
        .and_then(AwsError::suggestion);
    if let Some(suggestion) = suggestion {
        let _ = writeln!(stderr, "\n\x1b[36mHint:\x1b[0m {suggestion}");
    }
}

fn init_tracing() -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(DEFAULT_LOG_FILTER)?,
    };

    // stdout carries the JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Cancel every running wait on Ctrl-C
fn cancel_on_interrupt() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
    cancel
}

async fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing()?;

    let overrides = match &args.timeouts {
        Some(path) => TimeoutOverrides::load(path)?,
        None => TimeoutOverrides::default(),
    };

    let aws = AwsContext::new(&args.region, args.aws_profile.as_deref()).await;
    if let Some(profile) = aws.profile() {
        info!(profile = %profile, region = %aws.region(), "Using AWS profile");
    }
    let cancel = cancel_on_interrupt();

    match args.command {
        Command::Wait(wait) => handle_wait(&aws, wait, &overrides, &cancel).await,
        Command::Describe { kind, id } => handle_describe(&aws, kind, id).await,
        Command::Snapshot(command) => handle_snapshot(&aws, command, &overrides, &cancel).await,
        Command::Accelerator(command) => {
            handle_accelerator(&aws, command, &overrides, &cancel).await
        }
        Command::Xray(XrayCommand::Put {
            encryption_type,
            key_id,
        }) => {
            let ops = XRayClient::from_context(&aws);
            let options = overrides.wait_options(ResourceKind::XrayEncryptionConfig, &cancel);
            let config = xray::put_encryption_config(
                &ops,
                aws.region(),
                encryption_type,
                key_id.as_deref(),
                &options,
            )
            .await?;
            print_json(&config)
        }
        Command::SweepAccelerators {
            name_prefix,
            execute,
            concurrency,
        } => {
            let ops = GlobalAcceleratorClient::from_context(&aws);
            let options =
                overrides.wait_options(ResourceKind::GlobalacceleratorAccelerator, &cancel);
            let config = SweepConfig {
                name_prefix,
                dry_run: !execute,
                concurrency: concurrency.max(1),
            };

            let report = sweep_accelerators(&ops, &config, &options).await;
            println!("{report}");
            if !report.is_success() {
                bail!("sweep finished with {} errors", report.errors.len());
            }
            Ok(())
        }
    }
}

/// The identifier to act on; X-Ray's singleton configuration is keyed by region.
fn resolve_id(aws: &AwsContext, kind: Kind, id: Option<String>) -> Result<String> {
    match (kind, id) {
        (_, Some(id)) => Ok(id),
        (Kind::XrayEncryption, None) => Ok(aws.region().to_string()),
        (kind, None) => bail!("an identifier is required for {}", kind.resource_kind()),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_settled<S: Serialize>(settled: Settled<S>) -> Result<()> {
    info!(
        ticks = settled.ticks,
        elapsed_ms = settled.elapsed.as_millis() as u64,
        "Resource settled"
    );
    print_json(&settled.snapshot)
}

/// Handle the wait command
async fn handle_wait(
    aws: &AwsContext,
    args: WaitArgs,
    overrides: &TimeoutOverrides,
    cancel: &CancellationToken,
) -> Result<()> {
    let kind = args.kind;
    let goal = args.until;
    let id = resolve_id(aws, kind, args.id)?;
    let options = overrides.wait_options(kind.resource_kind(), cancel);
    let label = kind.resource_kind().describe(&id);
    let failed = || format!("error waiting for {label} to become {goal}");

    info!(resource = %label, goal = %goal, "Waiting");

    match (kind, goal) {
        (Kind::MemorydbSnapshot, Goal::Ready) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_snapshot_available(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbSnapshot, Goal::Deleted) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_snapshot_deleted(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbCluster, Goal::Ready) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_cluster_available(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbCluster, Goal::Deleted) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_cluster_deleted(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbCluster, Goal::ParameterGroupInSync) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_cluster_parameter_group_in_sync(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbCluster, Goal::SecurityGroupsActive) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_cluster_security_groups_active(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbAcl, Goal::Ready) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_acl_active(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbAcl, Goal::Deleted) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_acl_deleted(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbUser, Goal::Ready) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_user_active(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::MemorydbUser, Goal::Deleted) => {
            let ops = MemoryDbClient::from_context(aws);
            let settled = memorydb::wait_user_deleted(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::Accelerator, Goal::Ready) => {
            let ops = GlobalAcceleratorClient::from_context(aws);
            let settled = wait_accelerator_deployed(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (Kind::XrayEncryption, Goal::Ready) => {
            let ops = XRayClient::from_context(aws);
            let settled = xray::wait_encryption_config_available(&ops, &id, &options)
                .await
                .with_context(failed)?;
            print_settled(settled)
        }
        (kind, goal) => bail!("{} cannot be waited on until {goal}", kind.resource_kind()),
    }
}

/// Handle the describe command
async fn handle_describe(aws: &AwsContext, kind: Kind, id: Option<String>) -> Result<()> {
    let id = resolve_id(aws, kind, id)?;
    let label = kind.resource_kind().describe(&id);
    let failed = || format!("error reading {label}");

    let output = match kind {
        Kind::MemorydbSnapshot => {
            let ops = MemoryDbClient::from_context(aws);
            let snapshot = memorydb::find_snapshot_by_name(&ops, &id)
                .await
                .with_context(failed)?;
            serde_json::json!({
                "status": status_snapshot(&snapshot).as_str(),
                "snapshot": snapshot,
            })
        }
        Kind::MemorydbCluster => {
            let ops = MemoryDbClient::from_context(aws);
            let cluster = memorydb::find_cluster_by_name(&ops, &id)
                .await
                .with_context(failed)?;
            serde_json::json!({
                "status": status_cluster(&cluster).as_str(),
                "parameter_group_status": status_cluster_parameter_group(&cluster).as_str(),
                "security_group_status": status_cluster_security_groups(&cluster).as_str(),
                "shard_status": status_cluster_shards(&cluster).as_str(),
                "sns_topic_status": status_cluster_sns_topic(&cluster).as_str(),
                "cluster": cluster,
            })
        }
        Kind::MemorydbAcl => {
            let ops = MemoryDbClient::from_context(aws);
            let acl = memorydb::find_acl_by_name(&ops, &id).await.with_context(failed)?;
            serde_json::json!({ "status": status_acl(&acl).as_str(), "acl": acl })
        }
        Kind::MemorydbUser => {
            let ops = MemoryDbClient::from_context(aws);
            let user = memorydb::find_user_by_name(&ops, &id).await.with_context(failed)?;
            serde_json::json!({ "status": status_user(&user).as_str(), "user": user })
        }
        Kind::Accelerator => {
            let ops = GlobalAcceleratorClient::from_context(aws);
            let accelerator = find_accelerator_by_arn(&ops, &id).await.with_context(failed)?;
            let attributes = find_accelerator_attributes_by_arn(&ops, &id)
                .await
                .with_context(failed)?;
            serde_json::json!({
                "status": status_accelerator(&accelerator).as_str(),
                "accelerator": accelerator,
                "attributes": attributes,
            })
        }
        Kind::XrayEncryption => {
            let ops = XRayClient::from_context(aws);
            let config = xray::find_encryption_config(&ops).await.with_context(failed)?;
            serde_json::json!({
                "status": status_encryption_config(&config).as_str(),
                "encryption_config": config,
            })
        }
    };

    print_json(&output)
}

/// Handle the snapshot commands
async fn handle_snapshot(
    aws: &AwsContext,
    command: SnapshotCommand,
    overrides: &TimeoutOverrides,
    cancel: &CancellationToken,
) -> Result<()> {
    let ops = MemoryDbClient::from_context(aws);
    let options = overrides.wait_options(ResourceKind::MemorydbSnapshot, cancel);

    match command {
        SnapshotCommand::Create {
            cluster,
            name,
            name_prefix,
            kms_key_id,
            tags,
        } => {
            let spec = SnapshotSpec {
                cluster_name: cluster,
                name,
                name_prefix,
                kms_key_id,
                tags: tags.into_iter().collect::<BTreeMap<_, _>>(),
            };
            let snapshot = snapshot_lifecycle::create_snapshot(&ops, &spec, &options).await?;
            print_json(&snapshot)
        }
        SnapshotCommand::Delete { name } => {
            snapshot_lifecycle::delete_snapshot(&ops, &name, &options).await?;
            info!(snapshot = %name, "Snapshot deleted");
            Ok(())
        }
    }
}

/// Handle the accelerator commands
async fn handle_accelerator(
    aws: &AwsContext,
    command: AcceleratorCommand,
    overrides: &TimeoutOverrides,
    cancel: &CancellationToken,
) -> Result<()> {
    let ops = GlobalAcceleratorClient::from_context(aws);
    let options = overrides.wait_options(ResourceKind::GlobalacceleratorAccelerator, cancel);

    match command {
        AcceleratorCommand::Create {
            name,
            ip_address_type,
            disabled,
            flow_logs_bucket,
            flow_logs_prefix,
            tags,
        } => {
            let mut input = CreateAcceleratorInput::new(name)
                .with_ip_address_type(ip_address_type)
                .with_enabled(!disabled);
            if let Some(bucket) = flow_logs_bucket {
                input = input.with_attributes(AcceleratorAttributes {
                    flow_logs_enabled: true,
                    flow_logs_s3_bucket: Some(bucket),
                    flow_logs_s3_prefix: flow_logs_prefix,
                });
            }
            for (key, value) in tags {
                input = input.with_tag(key, value);
            }

            let accelerator = ga_lifecycle::create_accelerator(&ops, &input, &options).await?;
            print_json(&accelerator)
        }
        AcceleratorCommand::Delete { arn } => {
            ga_lifecycle::delete_accelerator(&ops, &arn, &options).await?;
            info!(arn = %arn, "Accelerator deleted");
            Ok(())
        }
    }
}
