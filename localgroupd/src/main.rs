// ABOUTME: runs the daemon that keeps one account in one local group of this host.
// ABOUTME: maps argument errors, fatal poll failures and task panics to process exit codes.

mod identity;
mod logging;
mod membership;
mod poller;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use localgroup_common::platform::LocalDirectory;
use localgroup_common::{GroupDirectory, Target};
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{error, Dispatch};

use crate::poller::Poller;

const EXIT_FAILURE: u8 = 1;

/// Monitors whether the user is in the selected group and adds it when it is not.
#[derive(Debug, Parser)]
#[command(name = "localgroupd", version)]
struct Args {
    /// Account that must stay in the group, as DOMAIN\user
    account: String,

    /// Local group name
    group: String,

    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    interval_secs: u64,

    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => return ExitCode::from(usage_exit(err)),
    };

    let dispatch = logging::dispatch(&args.log_level);
    let poller = Poller::new(
        LocalDirectory::default(),
        Target::new(args.account, args.group),
        Duration::from_secs(args.interval_secs),
    );
    ExitCode::from(supervise(poller, CancellationToken::new(), dispatch).await)
}

fn usage_exit(err: clap::Error) -> u8 {
    let _ = err.print();
    EXIT_FAILURE
}

async fn supervise<D>(poller: Poller<D>, cancel: CancellationToken, dispatch: Dispatch) -> u8
where
    D: GroupDirectory + Send + 'static,
{
    let task = tokio::spawn(poller.run(cancel).with_subscriber(dispatch.clone()));

    match task.await {
        Ok(Ok(())) => 0,
        Ok(Err(err)) => {
            tracing::dispatcher::with_default(&dispatch, || error!("{err:#}"));
            EXIT_FAILURE
        }
        Err(err) => {
            tracing::dispatcher::with_default(&dispatch, || error!("EXCEPTION: {err}"));
            EXIT_FAILURE
        }
    }
}
