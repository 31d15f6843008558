//! Particle Field - decorative animated background layer
//!
//! Hosts the particle field simulation as a full-window background with a
//! small settings panel. The field never intercepts clicks; the panel is a
//! separate floating window.

mod config;
mod field;
mod lifecycle;
mod render;

use eframe::egui;
use rand::rngs::ThreadRng;

use config::{ColorScheme, FieldConfig};
use lifecycle::FieldLifecycle;

const CONFIG_PATH: &str = "particle_field.json";

struct ParticleFieldApp {
    config: FieldConfig,
    lifecycle: FieldLifecycle,
    rng: ThreadRng,

    show_settings: bool,
    scheme_names: Vec<String>,
    last_size: egui::Vec2,
}

impl ParticleFieldApp {
    fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = egui::Visuals::dark();
        visuals.window_fill = egui::Color32::from_rgba_unmultiplied(15, 15, 25, 245);
        cc.egui_ctx.set_visuals(visuals);

        let config = match FieldConfig::load(CONFIG_PATH) {
            Ok(config) => {
                log::info!("loaded config from {}", CONFIG_PATH);
                config
            }
            Err(_) => FieldConfig::default(),
        };

        let scheme_names = ColorScheme::all_schemes()
            .iter()
            .map(|s| s.name.clone())
            .collect();

        Self {
            config,
            lifecycle: FieldLifecycle::new(),
            rng: rand::thread_rng(),
            show_settings: false,
            scheme_names,
            last_size: egui::Vec2::ZERO,
        }
    }

    fn settings_window(&mut self, ctx: &egui::Context) -> bool {
        let mut rebuild = false;
        let mut show = self.show_settings;

        egui::Window::new("Field Settings")
            .open(&mut show)
            .resizable(false)
            .show(ctx, |ui| {
                let scheme_before = self.config.scheme_index;
                egui::ComboBox::from_label("Color scheme")
                    .selected_text(
                        self.scheme_names
                            .get(self.config.scheme_index)
                            .cloned()
                            .unwrap_or_default(),
                    )
                    .show_ui(ui, |ui| {
                        for (i, name) in self.scheme_names.iter().enumerate() {
                            ui.selectable_value(&mut self.config.scheme_index, i, name);
                        }
                    });
                rebuild |= self.config.scheme_index != scheme_before;

                let mut override_density = self.config.density.is_some();
                if ui
                    .checkbox(&mut override_density, "Override density")
                    .changed()
                {
                    self.config.density = if override_density {
                        Some(self.config.density_for_width(self.last_size.x))
                    } else {
                        None
                    };
                    rebuild = true;
                }
                if let Some(density) = &mut self.config.density {
                    // Connection drawing is an O(n^2) pass; the slider stays
                    // capped so it remains interactive
                    if ui
                        .add(egui::Slider::new(density, 10..=150).text("particles"))
                        .changed()
                    {
                        rebuild = true;
                    }
                }

                ui.add(
                    egui::Slider::new(&mut self.config.mouse_influence_radius, 50.0..=400.0)
                        .text("influence radius"),
                );
                ui.add(
                    egui::Slider::new(&mut self.config.repulsion_strength, 0.0..=2.0)
                        .text("repulsion"),
                );
                ui.add(
                    egui::Slider::new(&mut self.config.pulse_speed, 0.0..=0.05)
                        .text("pulse speed"),
                );

                ui.checkbox(&mut self.config.connections.enabled, "Connections");
                if self.config.connections.enabled {
                    ui.add(
                        egui::Slider::new(&mut self.config.connections.max_distance, 50.0..=300.0)
                            .text("max distance"),
                    );
                    ui.checkbox(
                        &mut self.config.connections.gradient_enabled,
                        "Blend endpoint colors",
                    );
                }

                ui.separator();
                if ui.button("Save config").clicked() {
                    if let Err(e) = self.config.save(CONFIG_PATH) {
                        log::error!("failed to save config: {e:#}");
                    } else {
                        log::info!("saved config to {}", CONFIG_PATH);
                    }
                }
            });

        self.show_settings = show;
        rebuild
    }
}

impl eframe::App for ParticleFieldApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.viewport().close_requested()) {
            self.lifecycle.unmount();
            return;
        }

        // Minimization is the desktop analogue of scrolling out of view
        let minimized = ctx.input(|i| i.viewport().minimized.unwrap_or(false));
        self.lifecycle.set_visible(!minimized);

        if ctx.input(|i| i.key_pressed(egui::Key::S)) {
            self.show_settings = !self.show_settings;
        }

        let mut rebuild = false;
        if self.show_settings {
            rebuild = self.settings_window(ctx);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                let size = rect.size();

                if self.lifecycle.state() == lifecycle::LoopState::Stopped {
                    self.lifecycle
                        .mount(size.x, size.y, &self.config, &mut self.rng);
                    self.last_size = size;
                } else if size != self.last_size || rebuild {
                    self.lifecycle
                        .resize(size.x, size.y, &self.config, &mut self.rng);
                    self.last_size = size;
                }

                // Hover only: the layer must never swallow clicks
                let response = ui.allocate_rect(rect, egui::Sense::hover());
                match response.hover_pos() {
                    Some(pos) => self.lifecycle.pointer_moved(pos - rect.min),
                    None => self.lifecycle.pointer_left(),
                }

                self.lifecycle.tick(&self.config, &mut self.rng);
                render::render_field(ui.painter(), rect, self.lifecycle.field(), &self.config);

                ui.painter().text(
                    rect.right_bottom() - egui::vec2(8.0, 8.0),
                    egui::Align2::RIGHT_BOTTOM,
                    "S: settings",
                    egui::FontId::monospace(11.0),
                    egui::Color32::from_white_alpha(40),
                );
            });

        // Keep the frame loop alive only while running; a suspended field
        // repaints on the next host event (e.g. window restore)
        if self.lifecycle.is_running() {
            ctx.request_repaint();
        }
    }
}

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Particle Field")
            .with_min_inner_size([400.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Particle Field",
        options,
        Box::new(|cc| Box::new(ParticleFieldApp::new(cc))),
    )
}
