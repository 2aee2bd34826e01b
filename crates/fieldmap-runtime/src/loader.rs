use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use fieldmap_index::TileDescriptor;
use fieldmap_pack::{Archive, ResourceLayout, TileError, TileResources, load_resources};

struct LoadJob {
    job_id: u64,
    tile: TileDescriptor,
}

struct LoadOut {
    job_id: u64,
    result: Result<TileResources, TileError>,
}

/// Archive reads on a dedicated worker thread, awaited with a deadline.
///
/// A worker that misses a deadline is abandoned and replaced, so a stalled
/// read costs only its own tile. The abandoned thread exits once its read
/// returns and finds the result channel closed.
pub struct TileLoader {
    archive: Arc<dyn Archive>,
    layout: ResourceLayout,
    job_tx: Sender<LoadJob>,
    res_rx: Receiver<LoadOut>,
    next_job_id: u64,
    timeout: Duration,
    respawns: usize,
}

fn spawn_worker(
    archive: Arc<dyn Archive>,
    layout: ResourceLayout,
) -> io::Result<(Sender<LoadJob>, Receiver<LoadOut>)> {
    let (job_tx, job_rx) = unbounded::<LoadJob>();
    let (res_tx, res_rx) = unbounded::<LoadOut>();
    thread::Builder::new()
        .name("fieldmap-loader".into())
        .spawn(move || {
            while let Ok(job) = job_rx.recv() {
                let result = load_resources(archive.as_ref(), &job.tile, &layout);
                if res_tx
                    .send(LoadOut {
                        job_id: job.job_id,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }
        })?;
    Ok((job_tx, res_rx))
}

impl TileLoader {
    pub fn new(
        archive: Arc<dyn Archive>,
        layout: ResourceLayout,
        timeout: Duration,
    ) -> io::Result<Self> {
        let (job_tx, res_rx) = spawn_worker(Arc::clone(&archive), layout)?;
        Ok(Self {
            archive,
            layout,
            job_tx,
            res_rx,
            next_job_id: 0,
            timeout,
            respawns: 0,
        })
    }

    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Workers abandoned after a timeout so far.
    #[inline]
    pub fn respawns(&self) -> usize {
        self.respawns
    }

    /// Drops the channels to a stuck worker and starts a fresh one.
    fn replace_worker(&mut self) -> io::Result<()> {
        let (job_tx, res_rx) = spawn_worker(Arc::clone(&self.archive), self.layout)?;
        self.job_tx = job_tx;
        self.res_rx = res_rx;
        self.respawns += 1;
        Ok(())
    }

    /// Loads one tile, waiting at most the configured timeout.
    pub fn load(&mut self, tile: &TileDescriptor) -> Result<TileResources, TileError> {
        self.next_job_id += 1;
        let job_id = self.next_job_id;
        let job = LoadJob {
            job_id,
            tile: tile.clone(),
        };
        if self.job_tx.send(job).is_err() {
            return Err(TileError::WorkerUnavailable {
                name: tile.name.clone(),
            });
        }

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.res_rx.recv_timeout(remaining) {
                Ok(out) if out.job_id == job_id => return out.result,
                Ok(stale) => {
                    log::debug!(target: "loader", "discarding late result for job {}", stale.job_id);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(e) = self.replace_worker() {
                        log::warn!(target: "loader", "could not replace stalled loader: {e}");
                    } else {
                        log::warn!(target: "loader", "tile {} stalled; loader replaced", tile.name);
                    }
                    return Err(TileError::Timeout {
                        name: tile.name.clone(),
                        millis: self.timeout.as_millis().min(u128::from(u64::MAX)) as u64,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(TileError::WorkerUnavailable {
                        name: tile.name.clone(),
                    });
                }
            }
        }
    }
}
