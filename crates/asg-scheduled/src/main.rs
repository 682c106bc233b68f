//! asg-scheduled: scheduled scale-to-zero for autoscaling groups.
//!
//! Runs as an AWS Lambda function (the default) or as a one-shot operator
//! command. Either way a single pass is made over every autoscaling group
//! whose name starts with one of the `ASG_PREFIX` prefixes:
//!
//! - `scale-down` zeroes the group and records its prior capacity in the
//!   `asg-schedule` tag
//! - `scale-up` restores the capacity recorded in that tag
//!
//! # Usage
//!
//! ```text
//! ASG_PREFIX=prod-,stage- asg-scheduled               # Lambda runtime
//! ASG_PREFIX=prod-,stage- asg-scheduled invoke scale-down
//! ```

#![recursion_limit = "256"]

use clap::{Parser, Subcommand};
use tracing::{Instrument, error, info, info_span, warn};

use asg_schedule_aws::AwsAutoScaling;
use asg_schedule_controller::{ScaleAction, ScaleController};
use asg_schedule_core::{LogFormat, ScheduleConfig, config::DEFAULT_CALL_TIMEOUT_SECS};

mod dispatch;
mod handler;
mod logging;

#[derive(Parser)]
#[command(
    name = "asg-scheduled",
    about = "Scale autoscaling groups to zero and restore them from their asg-schedule tag",
    version
)]
struct Cli {
    /// Comma separated name prefixes of managed autoscaling groups.
    #[arg(long, env = "ASG_PREFIX", global = true)]
    asg_prefix: Option<String>,

    /// Timeout for each individual Auto Scaling API call, in seconds.
    #[arg(long, env = "ASG_SCHEDULE_CALL_TIMEOUT_SECS", default_value_t = DEFAULT_CALL_TIMEOUT_SECS, global = true)]
    call_timeout_secs: u64,

    /// Log format: text or json.
    #[arg(long, env = "LOG_FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve Lambda invocations (default).
    Lambda,
    /// Run a single pass now and exit.
    Invoke {
        /// scale-up or scale-down.
        #[arg(value_parser = dispatch::parse_action)]
        action: ScaleAction,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let config = ScheduleConfig::new(cli.asg_prefix.as_deref(), cli.call_timeout_secs)
        .inspect_err(|e| error!(error = %e, "invalid configuration"))?;
    if config.matcher().is_empty() {
        warn!("no usable ASG_PREFIX entries, no autoscaling group will be managed");
    }
    info!(
        prefixes = %config.prefixes.join(","),
        call_timeout = ?config.call_timeout,
        "configuration loaded"
    );

    let api = AwsAutoScaling::from_env().await;
    let controller = ScaleController::new(api, &config);

    match cli.command.unwrap_or(Command::Lambda) {
        Command::Lambda => handler::serve(controller)
            .await
            .map_err(|e| anyhow::anyhow!(e)),
        Command::Invoke { action } => {
            controller
                .run(action)
                .instrument(info_span!("invocation", %action))
                .await?;
            Ok(())
        }
    }
}
