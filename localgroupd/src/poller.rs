// ABOUTME: runs the level-triggered reconciliation loop: read membership, add if missing, wait, repeat.
// ABOUTME: an empty membership read ends the loop with an error; everything else is retried next tick.

use std::time::Duration;

use anyhow::bail;
use localgroup_common::{reconcile, GroupDirectory, Principal, Target, Verdict};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{identity, membership};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    AlreadyMember,
    Added,
    AddFailed,
}

pub struct Poller<D> {
    directory: D,
    target: Target,
    interval: Duration,
    identity: Principal,
}

impl<D: GroupDirectory> Poller<D> {
    pub fn new(directory: D, target: Target, interval: Duration) -> Self {
        Self {
            directory,
            target,
            interval,
            identity: Principal::default(),
        }
    }

    pub fn report_identity(&mut self) {
        self.identity = identity::report(&self.directory);
    }

    /// One reconciliation pass. Errors only when no user members could be read.
    pub fn cycle(&self) -> anyhow::Result<CycleOutcome> {
        let snapshot = membership::read(&self.directory, &self.target.group);
        if snapshot.is_empty() {
            bail!("no user members could be read from group {}", self.target.group);
        }

        match reconcile(&self.target, &snapshot) {
            Verdict::Member => {
                debug!("{} is a member of {}", self.target.account, self.target.group);
                Ok(CycleOutcome::AlreadyMember)
            }
            Verdict::Missing => {
                if membership::add(&self.directory, &self.identity, &self.target) {
                    Ok(CycleOutcome::Added)
                } else {
                    Ok(CycleOutcome::AddFailed)
                }
            }
        }
    }

    pub async fn run(mut self, cancel: CancellationToken) -> anyhow::Result<()> {
        if !self.target.account.is_qualified() {
            warn!("account {} is not in DOMAIN\\name form", self.target.account);
        }
        self.report_identity();

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("cancellation requested, stopping");
                    return Ok(());
                }
                _ = ticker.tick() => {}
            }

            self.cycle()?;
        }
    }
}
