//! soundsurf — play a track and surf its spectrum.
//!
//! The top panel is the transport; the rest of the window belongs to the
//! visualization. Steer the surfer with W/A/S/D or the arrow keys, hold
//! the mouse button to pull particles toward the pointer.

use crate::audio::{Player, TapFeed};
use crate::viz::VizView;
use egui::{Context, Key};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use surfcore::spectrum::SpectrumSource;
use surfcore::storage;

/// Persisted app settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct Settings {
    particle_count: usize,
    volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            particle_count: 80,
            volume: 0.8,
        }
    }
}

impl Settings {
    fn path() -> PathBuf {
        storage::config_dir("soundsurf").join("settings.json")
    }

    fn load() -> Self {
        storage::load_json(&Self::path()).unwrap_or_default()
    }

    fn save(&self) {
        let _ = storage::save_json(&Self::path(), self);
    }
}

pub struct SoundSurfApp {
    player: Player,
    feed: TapFeed,
    viz: VizView,
    settings: Settings,
    track_name: Option<String>,
    error_msg: Option<String>,
}

impl SoundSurfApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::load();
        let player = Player::new();
        let feed = TapFeed::new(player.tap());
        Self {
            viz: VizView::new(settings.particle_count),
            player,
            feed,
            settings,
            track_name: None,
            error_msg: None,
        }
    }

    pub fn play_file(&mut self, path: PathBuf) {
        match self.player.play_file(&path, self.settings.volume) {
            Ok(()) => {
                self.track_name = Some(
                    path.file_stem()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "unknown".into()),
                );
                self.error_msg = None;
            }
            Err(e) => self.error_msg = Some(e),
        }
    }

    fn handle_keys(&mut self, ctx: &Context) {
        ctx.input(|i| {
            if i.key_pressed(Key::Space) {
                self.player.toggle();
            }
        });
    }

    fn handle_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        if let Some(path) = dropped.into_iter().filter_map(|f| f.path).next() {
            self.play_file(path);
        }
    }

    fn render_transport(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let play_label = if self.player.is_playing() { "pause" } else { "play" };
            if ui.button(play_label).clicked() {
                self.player.toggle();
            }
            if ui.button("stop").clicked() {
                self.player.stop();
            }

            let elapsed = self.player.elapsed();
            ui.label(format_time(elapsed));
            self.render_scrubber(ui, elapsed);
            ui.label(
                self.player
                    .duration()
                    .map(format_time)
                    .unwrap_or_else(|| "--:--".into()),
            );

            ui.label("vol:");
            if ui
                .add(egui::Slider::new(&mut self.settings.volume, 0.0..=1.0).show_value(false))
                .changed()
            {
                self.player.set_volume(self.settings.volume);
                self.settings.save();
            }

            ui.label("particles:");
            let mut count = self.settings.particle_count;
            if ui.add(egui::Slider::new(&mut count, 0..=400)).changed() {
                self.settings.particle_count = count;
                self.viz.set_particle_count(count);
                self.settings.save();
            }

            let status = self
                .error_msg
                .clone()
                .or_else(|| self.track_name.clone())
                .unwrap_or_else(|| "drop an audio file to play".into());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(status);
            });
        });
    }

    /// Progress bar with click-to-seek. A track without a known length
    /// gets a nominal three-minute scale.
    fn render_scrubber(&mut self, ui: &mut egui::Ui, elapsed: Duration) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(140.0, 14.0), egui::Sense::click());
        let duration_secs = self
            .player
            .duration()
            .map(|d| d.as_secs_f32())
            .unwrap_or(180.0)
            .max(1.0);

        if ui.is_rect_visible(rect) {
            let painter = ui.painter();
            let visuals = ui.visuals();
            painter.rect_filled(rect, 2.0, visuals.extreme_bg_color);
            let progress = (elapsed.as_secs_f32() / duration_secs).min(1.0);
            let fill = egui::Rect::from_min_size(
                rect.min,
                egui::vec2(rect.width() * progress, rect.height()),
            );
            painter.rect_filled(fill, 2.0, visuals.selection.bg_fill);
            painter.rect_stroke(rect, 2.0, visuals.widgets.noninteractive.bg_stroke);
        }

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let rel = ((pos.x - rect.min.x) / rect.width()).clamp(0.0, 1.0);
                let target = Duration::from_secs_f32(rel * duration_secs);
                if let Err(e) = self.player.seek_to(target) {
                    self.error_msg = Some(e);
                }
            }
        }
    }
}

fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl eframe::App for SoundSurfApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("transport").show(ctx, |ui| {
            self.render_transport(ui);
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                // Spectrum only while something is audible; otherwise the
                // field runs in silence.
                let spectrum = if self.player.is_playing() {
                    self.feed.sample()
                } else {
                    None
                };
                self.viz.show(ui, spectrum.as_ref());
            });
    }
}
