use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use ringbuf::HeapConsumer;
use tracing::{debug, info};

use crate::session::Session;
use crate::types::{FrameUpdate, SessionCommand, SessionSummary};

#[derive(Clone)]
pub(crate) struct ProcessingConfig {
    pub(crate) sample_rate: u32,
    pub(crate) frame_len: usize,
    pub(crate) hop_len: usize,
    pub(crate) max_session: Duration,
}

impl ProcessingConfig {
    /// Analysis window in samples.
    pub(crate) const FRAME_LEN: usize = 2048;
    /// One hop per display tick.
    pub(crate) const HOP_SEC: f32 = 0.016;
    pub(crate) const MAX_SESSION_SECS: u64 = 30;

    pub(crate) fn new(sample_rate: u32) -> Self {
        let hop_len = ((sample_rate as f32) * Self::HOP_SEC) as usize;
        Self {
            sample_rate,
            frame_len: Self::FRAME_LEN,
            hop_len,
            max_session: Duration::from_secs(Self::MAX_SESSION_SECS),
        }
    }
}

pub(crate) fn spawn_processing_thread(
    mut consumer: HeapConsumer<f32>,
    cmd_rx: Receiver<SessionCommand>,
    update_tx: Sender<FrameUpdate>,
    summary_tx: Sender<SessionSummary>,
    cfg: ProcessingConfig,
) {
    thread::spawn(move || {
        let mut buffer = VecDeque::<f32>::with_capacity(cfg.frame_len * 2);
        let mut frame = vec![0.0f32; cfg.frame_len];
        let mut active: Option<(Session, Instant)> = None;

        loop {
            // Commands are drained before any frame work, so a stop/reset
            // never interleaves with a frame in flight.
            while let Ok(cmd) = cmd_rx.try_recv() {
                match cmd {
                    SessionCommand::Start => {
                        buffer.clear();
                        while consumer.pop().is_some() {}
                        active = Some((Session::new(cfg.sample_rate), Instant::now()));
                        info!(sample_rate = cfg.sample_rate, "session started");
                    }
                    SessionCommand::Stop => {
                        if let Some((session, started)) = active.take() {
                            finish_session(session, started, &summary_tx);
                        }
                    }
                }
            }

            if active.is_none() {
                // keep the ring drained so a new session starts on fresh audio
                while consumer.pop().is_some() {}
                thread::sleep(Duration::from_millis(10));
                continue;
            }

            let timed_out = active
                .as_ref()
                .map(|(_, started)| started.elapsed() >= cfg.max_session)
                .unwrap_or(false);
            if timed_out {
                let (session, started) = active.take().unwrap();
                debug!("session hit the duration cap");
                finish_session(session, started, &summary_tx);
                continue;
            }

            if consumer.len() < cfg.hop_len {
                thread::sleep(Duration::from_millis(1));
                continue;
            }
            for _ in 0..cfg.hop_len {
                if let Some(s) = consumer.pop() {
                    buffer.push_back(s);
                }
            }

            if buffer.len() >= cfg.frame_len {
                let (session, started) = active.as_mut().unwrap();
                for (dst, src) in frame.iter_mut().zip(buffer.iter()) {
                    *dst = *src;
                }
                let outcome = session.process_frame(&frame);
                let _ = update_tx.try_send(FrameUpdate {
                    t: started.elapsed().as_secs_f64(),
                    hz: outcome.display_hz,
                    label: outcome.label,
                    rms: outcome.rms,
                });
                for _ in 0..cfg.hop_len {
                    buffer.pop_front();
                }
            }
        }
    });
}

fn finish_session(session: Session, started: Instant, summary_tx: &Sender<SessionSummary>) {
    let summary = session.finish();
    info!(
        label = summary.label.map(|l| l.label()).unwrap_or("unset"),
        certainty = summary.certainty,
        voiced_frames = summary.voiced_frames,
        elapsed_secs = started.elapsed().as_secs(),
        "session finished"
    );
    let _ = summary_tx.send(summary);
}
