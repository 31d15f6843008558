//! Painting the particle field to an egui painter
//!
//! Drawn back to front each frame: background fill, glow halos, particle
//! bodies, then connection lines. Nothing accumulates between frames.

use egui::{Color32, Painter, Rect, Stroke};

use crate::config::{ConnectionConfig, FieldConfig};
use crate::field::ParticleField;

/// Halo extends to this multiple of the particle size
const GLOW_RADIUS_FACTOR: f32 = 3.0;

/// Concentric circles approximating the radial falloff; egui has no radial
/// gradient primitive
const GLOW_STEPS: usize = 6;

pub fn render_field(painter: &Painter, rect: Rect, field: &ParticleField, config: &FieldConfig) {
    let scheme = config.color_scheme();
    painter.rect_filled(rect, 0.0, scheme.background_color());

    for p in &field.particles {
        let pos = rect.min + p.pos;

        if p.glow > 0.0 {
            draw_glow(painter, pos, p.size, p.color, p.glow);
        }

        painter.circle_filled(pos, p.size, p.color);
    }

    if config.connections.enabled {
        render_connections(painter, rect, field, &config.connections);
    }
}

/// Soft halo fading from `glow * 0.5` alpha at the body to transparent at
/// three times the particle size.
fn draw_glow(painter: &Painter, pos: egui::Pos2, size: f32, color: Color32, glow: f32) {
    let max_radius = size * GLOW_RADIUS_FACTOR;

    for i in (0..GLOW_STEPS).rev() {
        let t = (i + 1) as f32 / GLOW_STEPS as f32;
        let radius = size + (max_radius - size) * t;
        let alpha = glow_ring_alpha(glow, t);
        if alpha == 0 {
            continue;
        }
        painter.circle_filled(pos, radius, with_alpha(color, alpha));
    }
}

/// Alpha of one glow ring; rings stack, so each carries its share of the
/// total `glow * 0.5` peak. `t` runs from ~0 at the body to 1.0 at the rim.
fn glow_ring_alpha(glow: f32, t: f32) -> u8 {
    let falloff = 1.0 - t;
    (255.0 * glow * 0.5 * falloff / GLOW_STEPS as f32).round() as u8
}

fn render_connections(
    painter: &Painter,
    rect: Rect,
    field: &ParticleField,
    config: &ConnectionConfig,
) {
    // O(n^2) pair scan, bounded by the density tiers
    for conn in field.connections(config.max_distance) {
        let a = &field.particles[conn.a];
        let b = &field.particles[conn.b];

        let alpha = connection_alpha(conn.strength, config.base_alpha);
        if alpha < 2 {
            continue;
        }

        let color = if config.gradient_enabled {
            with_alpha(blend(a.color, b.color), alpha)
        } else {
            with_alpha(a.color, alpha)
        };

        painter.line_segment(
            [rect.min + a.pos, rect.min + b.pos],
            Stroke::new(1.0, color),
        );
    }
}

/// Line alpha: base alpha at distance zero, linear fade to zero at the
/// maximum connection distance.
pub fn connection_alpha(strength: f32, base_alpha: f32) -> u8 {
    (strength.clamp(0.0, 1.0) * base_alpha * 255.0).round() as u8
}

/// Channel-wise midpoint of the two endpoint colors.
pub fn blend(a: Color32, b: Color32) -> Color32 {
    Color32::from_rgb(
        ((a.r() as u16 + b.r() as u16) / 2) as u8,
        ((a.g() as u16 + b.g() as u16) / 2) as u8,
        ((a.b() as u16 + b.b() as u16) / 2) as u8,
    )
}

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}
