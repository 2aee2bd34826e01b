use crossbeam_channel::Sender;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressEvent {
    Status(String),
    Info(String),
}

/// Receives sweep progress text. Implementations must not block.
pub trait Progress {
    fn set_status(&self, text: &str);
    fn set_info(&self, text: &str);

    /// Per-tile info. `index` counts from 1, so a section's first tile
    /// reports `Tile 1 / n` and its last `Tile n / n`.
    fn tile(&self, index: usize, total: usize) {
        self.set_info(&format!("Tile {index} / {total}"));
    }
}

impl Progress for () {
    fn set_status(&self, _text: &str) {}
    fn set_info(&self, _text: &str) {}
}

/// Forwards progress to the `log` facade.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogProgress;

impl Progress for LogProgress {
    fn set_status(&self, text: &str) {
        log::info!(target: "sweep", "{text}");
    }

    fn set_info(&self, text: &str) {
        log::debug!(target: "sweep", "{text}");
    }
}

/// Sends progress over a channel to a UI or another thread.
#[derive(Clone, Debug)]
pub struct ChannelProgress {
    tx: Sender<ProgressEvent>,
}

impl ChannelProgress {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl Progress for ChannelProgress {
    fn set_status(&self, text: &str) {
        let _ = self.tx.send(ProgressEvent::Status(text.to_string()));
    }

    fn set_info(&self, text: &str) {
        let _ = self.tx.send(ProgressEvent::Info(text.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn tile_info_format() {
        let (tx, rx) = unbounded();
        let p = ChannelProgress::new(tx);
        p.set_status("Get Terrain Tiles");
        p.tile(3, 4);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                ProgressEvent::Status("Get Terrain Tiles".into()),
                ProgressEvent::Info("Tile 3 / 4".into()),
            ]
        );
    }

    #[test]
    fn dropped_receiver_is_ignored() {
        let (tx, rx) = unbounded();
        drop(rx);
        ChannelProgress::new(tx).set_info("still fine");
    }
}
