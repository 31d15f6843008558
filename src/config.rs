//! Configuration for the particle field background layer

use egui::Color32;
use serde::{Deserialize, Serialize};

/// Default density tiers by viewport width (px)
pub const DENSITY_MOBILE: usize = 30;
pub const DENSITY_TABLET: usize = 50;
pub const DENSITY_DESKTOP: usize = 70;

const MOBILE_BREAKPOINT: f32 = 768.0;
const TABLET_BREAKPOINT: f32 = 1024.0;

/// Fallback when a palette entry fails to parse: faint white
pub const FALLBACK_COLOR: Color32 = Color32::from_rgba_premultiplied(26, 26, 26, 26);

// ============================================================================
// Color Scheme
// ============================================================================

/// Named palette. Particle colors are kept as CSS-style strings so schemes
/// can be edited in the saved JSON; malformed entries fall back to
/// [`FALLBACK_COLOR`] instead of aborting the frame.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ColorScheme {
    pub name: String,
    pub background: [u8; 3],
    pub particles: Vec<String>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::auditor()
    }
}

impl ColorScheme {
    /// The site palette: teal, violet, faint white on near-black.
    pub fn auditor() -> Self {
        Self {
            name: "Auditor".to_string(),
            background: [8, 9, 16],
            particles: vec![
                "rgba(0, 223, 216, 0.1)".to_string(),
                "rgba(145, 94, 255, 0.1)".to_string(),
                "rgba(255, 255, 255, 0.05)".to_string(),
            ],
        }
    }

    pub fn ember() -> Self {
        Self {
            name: "Ember".to_string(),
            background: [12, 6, 2],
            particles: vec![
                "rgba(255, 160, 60, 0.12)".to_string(),
                "rgba(255, 80, 40, 0.1)".to_string(),
                "rgba(255, 230, 180, 0.06)".to_string(),
            ],
        }
    }

    pub fn ocean() -> Self {
        Self {
            name: "Ocean".to_string(),
            background: [2, 10, 18],
            particles: vec![
                "rgba(60, 160, 255, 0.12)".to_string(),
                "rgba(0, 210, 200, 0.1)".to_string(),
                "rgba(160, 255, 220, 0.06)".to_string(),
            ],
        }
    }

    pub fn all_schemes() -> Vec<ColorScheme> {
        vec![Self::auditor(), Self::ember(), Self::ocean()]
    }

    /// Parse the particle color strings, substituting the fallback for any
    /// entry that fails. An empty palette still yields one usable color.
    pub fn resolve_palette(&self) -> Vec<Color32> {
        let mut palette: Vec<Color32> = self
            .particles
            .iter()
            .map(|s| {
                parse_color(s).unwrap_or_else(|| {
                    log::warn!("unparseable palette color {:?}, using fallback", s);
                    FALLBACK_COLOR
                })
            })
            .collect();

        if palette.is_empty() {
            palette.push(FALLBACK_COLOR);
        }
        palette
    }

    pub fn background_color(&self) -> Color32 {
        Color32::from_rgb(self.background[0], self.background[1], self.background[2])
    }
}

/// Accepts `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` and `rgba(r, g, b, a)`
/// with a fractional alpha.
pub fn parse_color(s: &str) -> Option<Color32> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return match hex.len() {
            6 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Color32::from_rgb(
                    (v >> 16) as u8,
                    (v >> 8) as u8,
                    v as u8,
                ))
            }
            8 => {
                let v = u32::from_str_radix(hex, 16).ok()?;
                Some(Color32::from_rgba_unmultiplied(
                    (v >> 24) as u8,
                    (v >> 16) as u8,
                    (v >> 8) as u8,
                    v as u8,
                ))
            }
            _ => None,
        };
    }

    let (body, has_alpha) = if let Some(rest) = s.strip_prefix("rgba(") {
        (rest.strip_suffix(')')?, true)
    } else if let Some(rest) = s.strip_prefix("rgb(") {
        (rest.strip_suffix(')')?, false)
    } else {
        return None;
    };

    let parts: Vec<&str> = body.split(',').map(str::trim).collect();
    if parts.len() != if has_alpha { 4 } else { 3 } {
        return None;
    }

    let r: u8 = parts[0].parse().ok()?;
    let g: u8 = parts[1].parse().ok()?;
    let b: u8 = parts[2].parse().ok()?;
    let a = if has_alpha {
        let a: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&a) {
            return None;
        }
        (a * 255.0).round() as u8
    } else {
        255
    };

    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}

// ============================================================================
// Connections
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub enabled: bool,
    /// Pairs farther apart than this draw no line
    pub max_distance: f32,
    /// Line alpha at distance zero; fades linearly to zero at max_distance
    pub base_alpha: f32,
    /// Blend the two endpoint colors instead of using the first one
    pub gradient_enabled: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_distance: 150.0,
            base_alpha: 0.15,
            gradient_enabled: true,
        }
    }
}

// ============================================================================
// Field configuration
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Explicit particle count; `None` uses the width-tier defaults
    pub density: Option<usize>,
    /// Scale applied to free-particle velocities at spawn
    pub speed: f32,
    /// Size change per frame while pulsing
    pub pulse_speed: f32,
    /// Glow intensity change per frame
    pub glow_speed: f32,
    /// Per-axis bound of the orbital jitter, px per frame
    pub jitter: f32,
    /// Pointer distance below which repulsion applies
    pub mouse_influence_radius: f32,
    /// Repulsion displacement at (the limit of) zero distance
    pub repulsion_strength: f32,
    pub connections: ConnectionConfig,
    pub scheme_index: usize,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            density: None,
            speed: 1.0,
            pulse_speed: 0.01,
            glow_speed: 0.005,
            jitter: 0.5,
            mouse_influence_radius: 200.0,
            repulsion_strength: 0.5,
            connections: ConnectionConfig::default(),
            scheme_index: 0,
        }
    }
}

impl FieldConfig {
    /// Particle count for the given viewport width, honoring an override.
    pub fn density_for_width(&self, width: f32) -> usize {
        if let Some(d) = self.density {
            return d;
        }
        if width <= MOBILE_BREAKPOINT {
            DENSITY_MOBILE
        } else if width <= TABLET_BREAKPOINT {
            DENSITY_TABLET
        } else {
            DENSITY_DESKTOP
        }
    }

    pub fn color_scheme(&self) -> ColorScheme {
        ColorScheme::all_schemes()
            .get(self.scheme_index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }
}
