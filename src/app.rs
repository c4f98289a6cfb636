use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui_plot::{HLine, Line, Plot, PlotPoints};

use crate::analysis::classify::REGISTER_SPLIT_HZ;
use crate::audio::setup_audio;
use crate::processing::ProcessingConfig;
use crate::types::{FrameUpdate, Gender, SessionCommand, SessionSummary};

const MALE_BADGE: egui::Color32 = egui::Color32::from_rgb(86, 156, 255);
const FEMALE_BADGE: egui::Color32 = egui::Color32::from_rgb(240, 120, 180);

pub(crate) struct PitchApp {
    update_rx: Receiver<FrameUpdate>,
    summary_rx: Receiver<SessionSummary>,
    cmd_tx: Sender<SessionCommand>,
    device_name: String,
    sample_rate: u32,
    _stream: cpal::Stream,

    recording: bool,
    recording_since: Option<Instant>,
    points: Vec<(f64, f64)>,
    last_hz: Option<f64>,
    last_rms: f32,
    last_label: Option<Gender>,
    summary: Option<SessionSummary>,
}

impl PitchApp {
    pub(crate) fn new() -> anyhow::Result<Self> {
        let frontend = setup_audio()?;
        Ok(Self {
            update_rx: frontend.update_rx,
            summary_rx: frontend.summary_rx,
            cmd_tx: frontend.cmd_tx,
            device_name: frontend.device_name,
            sample_rate: frontend.sample_rate,
            _stream: frontend.stream,
            recording: false,
            recording_since: None,
            points: Vec::new(),
            last_hz: None,
            last_rms: 0.0,
            last_label: None,
            summary: None,
        })
    }

    fn start_session(&mut self) {
        self.points.clear();
        self.last_hz = None;
        self.last_label = None;
        self.summary = None;
        self.recording = true;
        self.recording_since = Some(Instant::now());
        let _ = self.cmd_tx.send(SessionCommand::Start);
    }

    fn pitch_line(&self) -> Line {
        let mut pts: Vec<[f64; 2]> = Vec::with_capacity(self.points.len() + 8);
        let gap = 0.3;
        let mut last_t: Option<f64> = None;
        for &(t, hz) in &self.points {
            if let Some(prev) = last_t {
                if t - prev > gap {
                    pts.push([f64::NAN, f64::NAN]);
                }
            }
            pts.push([t, hz]);
            last_t = Some(t);
        }
        Line::new(PlotPoints::from(pts)).name("pitch")
    }

    fn badge(&self, ui: &mut egui::Ui, label: Option<Gender>) {
        match label {
            Some(Gender::Male) => ui.colored_label(MALE_BADGE, "male voice"),
            Some(Gender::Female) => ui.colored_label(FEMALE_BADGE, "female voice"),
            None => ui.label("listening..."),
        };
    }
}

impl eframe::App for PitchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for u in self.update_rx.try_iter() {
            self.last_rms = u.rms;
            self.last_label = u.label;
            if let Some(hz) = u.hz {
                self.last_hz = Some(hz);
                self.points.push((u.t, hz));
            }
        }
        for s in self.summary_rx.try_iter() {
            self.summary = Some(s);
            self.recording = false;
            self.recording_since = None;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Real-time Voice Pitch");
            ui.label(format!(
                "input: {} @ {} Hz",
                self.device_name, self.sample_rate
            ));
            ui.label(format!("level: {:.4}", self.last_rms));

            ui.separator();

            let hz_text = match self.last_hz {
                Some(hz) => format!("{:.0} Hz", hz),
                None => "-- Hz".to_string(),
            };
            ui.label(egui::RichText::new(hz_text).size(40.0).strong());
            self.badge(ui, self.last_label);

            if self.recording {
                let elapsed = self
                    .recording_since
                    .map(|t| t.elapsed().as_secs())
                    .unwrap_or(0);
                ui.label(format!(
                    "recording: {}s / {}s",
                    elapsed,
                    ProcessingConfig::MAX_SESSION_SECS
                ));
                if ui.button("stop").clicked() {
                    self.recording = false;
                    let _ = self.cmd_tx.send(SessionCommand::Stop);
                }
            } else if self.summary.is_none() {
                if ui.button("start session").clicked() {
                    self.start_session();
                }
            }

            if let Some(summary) = self.summary {
                ui.separator();
                ui.heading("session result");
                match summary.label {
                    Some(label) => {
                        ui.label(format!(
                            "detected a {} voice ({}% certainty, {} voiced frames)",
                            label.label(),
                            summary.certainty,
                            summary.voiced_frames
                        ));
                    }
                    None => {
                        ui.label("not enough voiced audio to decide");
                    }
                }
                if ui.button("record again").clicked() {
                    self.start_session();
                }
            }

            ui.separator();

            Plot::new("pitch-trace")
                .legend(egui_plot::Legend::default())
                .height(300.0)
                .allow_drag(false)
                .allow_scroll(false)
                .include_x(0.0)
                .include_x(ProcessingConfig::MAX_SESSION_SECS as f64)
                .include_y(60.0)
                .include_y(260.0)
                .show(ui, |plot_ui| {
                    plot_ui.hline(HLine::new(REGISTER_SPLIT_HZ).name("register split"));
                    plot_ui.line(self.pitch_line());
                });
        });

        ctx.request_repaint_after(Duration::from_millis(16));
    }
}
