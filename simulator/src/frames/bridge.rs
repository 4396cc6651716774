use crate::frames::model::{FrameModel, TickFrame};
use anyhow::{Context, Result};
use fleetcore::telemetry::MetricsSnapshot;
use log::info;
use std::io::Write;
use std::sync::{Arc, RwLock};

/// Hands finished frames to the rendering side: keeps the latest frame for
/// on-demand inspection and optionally streams every frame as a JSON line.
pub struct FrameBridge {
    state: Arc<RwLock<FrameModel>>,
    sink: Option<Box<dyn Write + Send>>,
}

impl FrameBridge {
    pub fn new(sink: Option<Box<dyn Write + Send>>) -> Self {
        Self {
            state: Arc::new(RwLock::new(FrameModel::default())),
            sink,
        }
    }

    pub fn publish(
        &mut self,
        frame: &TickFrame,
        metrics: MetricsSnapshot,
        recent_corrections: Vec<String>,
    ) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            serde_json::to_writer(&mut *sink, frame).context("encoding tick frame")?;
            sink.write_all(b"\n").context("writing tick frame")?;
        }

        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow::anyhow!("frame state lock poisoned"))?;
        guard.latest = Some(frame.clone());
        guard.frames_published += 1;
        guard.metrics = metrics;
        guard.recent_corrections = recent_corrections;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush().context("flushing frame output")?;
        }
        Ok(())
    }

    pub fn publish_status(&self, message: &str) {
        info!("[bridge] {}", message);
    }

    pub fn snapshot(&self) -> FrameModel {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}
