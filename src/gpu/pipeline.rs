//! Pipeline de rendu: compilation unique et production de frames cadencée

use super::target::{FrameStatus, RenderTarget};
use super::timing::{Clock, FrameGate, ManualTickSource, MonotonicClock, TickSource};
use super::{FrameUniforms, RenderStats};
use crate::diagnostics::{self, HeavyError};
use crate::shader::ShaderProgram;
use log::{debug, info, warn};

/// État de compilation, orthogonal à l'état attaché/détaché
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Compiling,
    Ready,
    Failed,
}

/// Ce qu'un tick a produit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Pipeline détaché: tick ignoré
    Detached,

    /// Aucun pipeline compilé: tick ignoré
    NotCompiled,

    /// Trop tôt par rapport à la cadence cible
    Throttled,

    /// Pas de surface présentable disponible
    NoDrawable,

    /// Frame soumise et présentée
    Presented,
}

/// Compile un `ShaderProgram` et produit des frames à cadence plafonnée
///
/// Une frame n'est produite que si le pipeline est `Ready` et attaché.
pub struct RenderPipeline<T: RenderTarget> {
    target: T,
    compiled: Option<T::Pipeline>,
    uniforms: T::UniformBuffer,
    state: PipelineState,
    last_error: Option<HeavyError>,
    target_fps: u32,
    gate: FrameGate,
    attached: bool,
    attach_time: f64,
    ticks: Box<dyn TickSource>,
    clock: Box<dyn Clock>,
    stats: RenderStats,
}

impl<T: RenderTarget> RenderPipeline<T> {
    /// Crée le pipeline et compile immédiatement le programme
    pub fn new(target: T, program: &ShaderProgram, target_fps: u32) -> Self {
        let mut pipeline = Self::uncompiled(target, target_fps);
        pipeline.compile(program);
        pipeline
    }

    /// Crée le pipeline sans compiler
    pub fn uncompiled(target: T, target_fps: u32) -> Self {
        if target_fps == 0 {
            warn!("FPS cible nul, ramené à 1");
        }
        let target_fps = target_fps.max(1);
        let uniforms = target.create_uniform_buffer();

        Self {
            target,
            compiled: None,
            uniforms,
            state: PipelineState::Uninitialized,
            last_error: None,
            target_fps,
            gate: FrameGate::new(target_fps),
            attached: false,
            attach_time: 0.0,
            ticks: Box::new(ManualTickSource::new()),
            clock: Box::new(MonotonicClock::new()),
            stats: RenderStats::new(),
        }
    }

    /// Remplace la source de ticks
    pub fn with_tick_source(mut self, ticks: impl TickSource + 'static) -> Self {
        if self.attached {
            self.ticks.stop();
            self.ticks = Box::new(ticks);
            self.ticks.start(self.target_fps);
        } else {
            self.ticks = Box::new(ticks);
        }
        self
    }

    /// Remplace l'horloge utilisée pour l'instant d'attachement
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Compile le programme; un pipeline déjà prêt n'est jamais recompilé
    pub fn compile(&mut self, program: &ShaderProgram) -> PipelineState {
        if self.state == PipelineState::Ready {
            warn!("Pipeline déjà compilé, recompilation ignorée");
            return self.state;
        }

        self.state = PipelineState::Compiling;
        match self.target.compile(&program.module_source()) {
            Ok(compiled) => {
                self.compiled = Some(compiled);
                self.last_error = None;
                self.state = PipelineState::Ready;
                info!("Pipeline compilé ({} FPS cible)", self.target_fps);
            }
            Err(err) => {
                diagnostics::report(&err);
                self.compiled = None;
                self.last_error = Some(err);
                self.state = PipelineState::Failed;
            }
        }
        self.state
    }

    /// La surface hôte dispose d'une cible d'affichage: démarre les ticks
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.attach_time = self.clock.now();
        self.gate.reset();
        self.ticks.start(self.target_fps);
        debug!("Pipeline attaché à t={:.3}s", self.attach_time);
    }

    /// La surface hôte a perdu sa cible: plus aucun tick ne produit de frame
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        self.attached = false;
        self.ticks.stop();
        debug!("Pipeline détaché");
    }

    /// Nouvelles dimensions de la surface, à tout moment
    pub fn resize(&mut self, width: u32, height: u32) {
        self.target.resize(width, height);
    }

    /// Appelé par la source de ticks à sa cadence native
    pub fn on_tick(&mut self, now: f64) -> TickOutcome {
        if !self.attached {
            return TickOutcome::Detached;
        }
        let Some(compiled) = self.compiled.as_ref() else {
            return TickOutcome::NotCompiled;
        };
        if !self.gate.is_due(now) {
            self.stats.ticks_throttled += 1;
            return TickOutcome::Throttled;
        }

        let (width, height) = self.target.size();
        let elapsed = (now - self.attach_time).max(0.0);
        let frame = FrameUniforms::new(elapsed as f32, width as f32, height as f32);

        match self.target.render_frame(compiled, &self.uniforms, &frame) {
            FrameStatus::Presented => {
                let interval = self.gate.last_frame().map(|last| now - last);
                self.stats.record_frame(interval);
                self.gate.mark(now);
                TickOutcome::Presented
            }
            FrameStatus::NoDrawable => {
                self.stats.ticks_without_drawable += 1;
                TickOutcome::NoDrawable
            }
        }
    }

    /// Instant (horloge du pipeline) où un tick produira la prochaine frame
    ///
    /// `None` tant qu'aucun tick ne peut en produire (détaché ou non compilé).
    pub fn next_frame_due(&self) -> Option<f64> {
        if !self.attached || self.compiled.is_none() {
            return None;
        }
        Some(self.gate.next_due().unwrap_or(self.attach_time))
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == PipelineState::Ready
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// La source de ticks tourne-t-elle encore
    pub fn ticks_running(&self) -> bool {
        self.ticks.is_running()
    }

    /// Dernière erreur de compilation de cette instance
    pub fn last_error(&self) -> Option<&HeavyError> {
        self.last_error.as_ref()
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Intervalle minimal entre deux frames, en secondes
    pub fn target_interval(&self) -> f64 {
        self.gate.interval()
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }
}

impl<T: RenderTarget> Drop for RenderPipeline<T> {
    fn drop(&mut self) {
        self.detach();
    }
}
