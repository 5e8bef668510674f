//! Rendu temps réel des shaders générés
//!
//! Un seul contexte graphique est partagé par tous les pipelines. Chaque
//! pipeline :
//! - compile une fois son programme (vertex plein écran + fragment généré)
//! - possède son propre buffer d'uniformes (temps écoulé, résolution)
//! - produit au plus une frame par intervalle cible, tant qu'il est attaché

pub mod context;
pub mod pipeline;
pub mod renderer;
pub mod target;
pub mod timing;
pub mod validation;

use bytemuck::{Pod, Zeroable};
use std::collections::VecDeque;

pub use context::*;
pub use pipeline::*;
pub use renderer::*;
pub use target::*;
pub use timing::*;
pub use validation::*;

/// Format de pixel de sortie
pub const OUTPUT_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

/// Couleur d'effacement avant chaque dessin
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.0,
    g: 0.0,
    b: 0.0,
    a: 1.0,
};

/// Nombre de frames conservées pour la moyenne FPS
const FPS_WINDOW: usize = 60;

/// Uniformes par frame, disposés comme `struct Uniforms` côté WGSL
///
/// `resolution` est un `vec2<f32>` aligné sur 8 octets, d'où le bourrage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    pub time: f32,
    _padding: f32,
    pub resolution: [f32; 2],
}

impl FrameUniforms {
    pub fn new(time: f32, width: f32, height: f32) -> Self {
        Self {
            time,
            _padding: 0.0,
            resolution: [width, height],
        }
    }
}

/// Statistiques de rendu pour le débogage
#[derive(Debug, Clone)]
pub struct RenderStats {
    /// Nombre de frames présentées
    pub frames_rendered: u64,

    /// Ticks ignorés car trop rapprochés
    pub ticks_throttled: u64,

    /// Ticks sans surface présentable
    pub ticks_without_drawable: u64,

    /// Intervalle entre les deux dernières frames (en secondes)
    pub last_frame_interval: f64,

    /// FPS moyen
    pub average_fps: f32,

    /// Historique des intervalles entre frames
    frame_intervals: VecDeque<f64>,
}

impl RenderStats {
    pub fn new() -> Self {
        Self {
            frames_rendered: 0,
            ticks_throttled: 0,
            ticks_without_drawable: 0,
            last_frame_interval: 0.0,
            average_fps: 0.0,
            frame_intervals: VecDeque::with_capacity(FPS_WINDOW),
        }
    }

    /// Enregistre une frame présentée, `interval` depuis la précédente
    pub fn record_frame(&mut self, interval: Option<f64>) {
        self.frames_rendered += 1;

        let Some(interval) = interval else {
            return;
        };
        self.last_frame_interval = interval;

        // Maintenir un historique des 60 dernières frames
        self.frame_intervals.push_back(interval);
        if self.frame_intervals.len() > FPS_WINDOW {
            self.frame_intervals.pop_front();
        }

        let average = self.frame_intervals.iter().sum::<f64>() / self.frame_intervals.len() as f64;
        self.average_fps = if average > 0.0 {
            (1.0 / average) as f32
        } else {
            0.0
        };
    }

    /// FPS instantanés
    pub fn instant_fps(&self) -> f32 {
        if self.last_frame_interval > 0.0 {
            (1.0 / self.last_frame_interval) as f32
        } else {
            0.0
        }
    }
}

impl Default for RenderStats {
    fn default() -> Self {
        Self::new()
    }
}
