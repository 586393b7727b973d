use std::time::Duration;

use color_eyre::eyre::{eyre, Result};
use rand::Rng;
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};
use tracing::{debug, trace};

use super::{Simulation, Snapshot};

#[derive(Debug)]
pub enum SimCommand {
    Tick(Duration),
    Tap,
    Restart,
    /// Replies once every earlier command has been applied.
    Sync(oneshot::Sender<Snapshot>),
}

/// Owner side of a simulation running on its own task. Ticks and taps are
/// queued on one channel, so they are applied strictly one after another;
/// readers only ever see the snapshot published after a whole command.
pub struct SimulationHandle {
    tx: mpsc::UnboundedSender<SimCommand>,
    snapshot: watch::Receiver<Snapshot>,
    task: JoinHandle<()>,
}

pub fn spawn<R>(mut simulation: Simulation<R>) -> SimulationHandle
where
    R: Rng + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot) = watch::channel(simulation.snapshot());

    let task = tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                SimCommand::Tick(dt) => {
                    for event in simulation.tick(dt) {
                        trace!(?event, "simulation event");
                    }
                },
                SimCommand::Tap => {
                    let outcome = simulation.tap();
                    trace!(?outcome, "tap");
                },
                SimCommand::Restart => {
                    if !simulation.restart() {
                        debug!("restart ignored while playing");
                    }
                },
                SimCommand::Sync(reply) => {
                    let _ = reply.send(simulation.snapshot());
                    continue;
                },
            }
            snapshot_tx.send_replace(simulation.snapshot());
        }
        debug!("simulation task stopped");
    });

    SimulationHandle { tx, snapshot, task }
}

impl SimulationHandle {
    pub fn tick(&self, dt: Duration) -> Result<()> {
        self.send(SimCommand::Tick(dt))
    }

    pub fn tap(&self) -> Result<()> {
        self.send(SimCommand::Tap)
    }

    pub fn restart(&self) -> Result<()> {
        self.send(SimCommand::Restart)
    }

    /// Most recently published snapshot. Never waits.
    pub fn latest(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    /// Snapshot taken after everything queued so far has been applied.
    pub async fn sync(&self) -> Result<Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(SimCommand::Sync(reply))?;
        Ok(response.await?)
    }

    /// Closes the queue and waits for the task to drain it.
    pub async fn shutdown(self) -> Result<()> {
        let Self { tx, task, .. } = self;
        drop(tx);
        task.await?;
        Ok(())
    }

    fn send(&self, command: SimCommand) -> Result<()> {
        self.tx.send(command).map_err(|_| eyre!("simulation task has stopped"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::simulation::SimulationConfig;

    const FRAME: Duration = Duration::from_millis(16);

    #[tokio::test]
    async fn test_commands_apply_in_order() -> Result<()> {
        let mut reference = Simulation::new(SimulationConfig::default(), Some(21));
        let handle = spawn(Simulation::new(SimulationConfig::default(), Some(21)));

        for tick in 0..120 {
            if tick % 15 == 0 {
                handle.tap()?;
                reference.tap();
            }
            handle.tick(FRAME)?;
            reference.tick(FRAME);
        }

        assert_eq!(handle.sync().await?, reference.snapshot());
        handle.shutdown().await
    }

    #[tokio::test]
    async fn test_latest_follows_applied_commands() -> Result<()> {
        let handle = spawn(Simulation::new(SimulationConfig::default(), Some(1)));
        let initial = handle.latest();

        handle.tick(FRAME)?;
        let synced = handle.sync().await?;
        assert_eq!(handle.latest(), synced);
        assert!(synced.bird_velocity > initial.bird_velocity);
        handle.shutdown().await
    }

    #[tokio::test]
    async fn test_restart_through_handle() -> Result<()> {
        let handle = spawn(Simulation::new(SimulationConfig::default(), Some(2)));
        for _ in 0..200 {
            handle.tick(FRAME)?;
        }
        assert!(handle.sync().await?.game_over);

        handle.restart()?;
        let snapshot = handle.sync().await?;
        assert!(!snapshot.game_over);
        assert_eq!(snapshot.score, 0);
        handle.shutdown().await
    }
}
