//! Horloges, source de ticks et limitation du nombre de frames

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Horloge monotone en secondes
pub trait Clock {
    fn now(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Horloge réelle, origine à la création
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Horloge avancée à la main (tests, rendu hors temps réel)
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, seconds: f64) {
        self.now.set(self.now.get() + seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// Pilote externe qui déclenche `on_tick` à sa propre cadence
pub trait TickSource {
    /// Démarre la livraison des ticks; `preferred_fps` est un indice pour les
    /// pilotes capables de limiter eux-mêmes leur cadence
    fn start(&mut self, preferred_fps: u32);

    /// Arrête la livraison; aucun tick ne doit suivre
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}

/// Source dont les ticks sont déclenchés par l'appelant
#[derive(Debug, Default, Clone)]
pub struct ManualTickSource {
    running: bool,
    preferred_fps: Option<u32>,
}

impl ManualTickSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preferred_fps(&self) -> Option<u32> {
        self.preferred_fps
    }
}

impl TickSource for ManualTickSource {
    fn start(&mut self, preferred_fps: u32) {
        self.running = true;
        self.preferred_fps = Some(preferred_fps);
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Plafond de cadence: une frame au plus par intervalle cible
///
/// Les ticks trop rapprochés sont ignorés, les ticks en retard ne sont pas
/// compensés.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval: f64,
    last_frame: Option<f64>,
}

impl FrameGate {
    pub fn new(target_fps: u32) -> Self {
        Self {
            interval: 1.0 / f64::from(target_fps.max(1)),
            last_frame: None,
        }
    }

    /// Intervalle minimal entre deux frames, en secondes
    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn last_frame(&self) -> Option<f64> {
        self.last_frame
    }

    /// Instant à partir duquel la prochaine frame sera acceptée
    pub fn next_due(&self) -> Option<f64> {
        self.last_frame.map(|last| last + self.interval)
    }

    /// Vrai si une frame peut être produite à l'instant `now`
    pub fn is_due(&self, now: f64) -> bool {
        match self.last_frame {
            Some(last) => now - last >= self.interval,
            None => true,
        }
    }

    /// Enregistre une frame produite à l'instant `now`
    pub fn mark(&mut self, now: f64) {
        self.last_frame = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_first_tick_is_due() {
        let gate = FrameGate::new(24);
        assert!(gate.is_due(0.0));
        assert_eq!(gate.next_due(), None);
        assert!((gate.interval() - 1.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_gate_drops_early_ticks() {
        let mut gate = FrameGate::new(10);
        gate.mark(1.0);

        assert!(!gate.is_due(1.05));
        assert!(gate.is_due(1.1));
        assert_eq!(gate.next_due(), Some(1.1));
        assert!(gate.is_due(5.0));
    }

    #[test]
    fn test_gate_zero_fps_is_clamped() {
        let gate = FrameGate::new(0);
        assert_eq!(gate.interval(), 1.0);
    }

    #[test]
    fn test_manual_clock_through_rc() {
        let clock = Rc::new(ManualClock::new(2.0));
        let shared: Box<dyn Clock> = Box::new(clock.clone());
        clock.advance(0.5);
        assert_eq!(shared.now(), 2.5);
    }

    #[test]
    fn test_manual_tick_source() {
        let mut ticks = ManualTickSource::new();
        assert!(!ticks.is_running());
        ticks.start(30);
        assert!(ticks.is_running());
        assert_eq!(ticks.preferred_fps(), Some(30));
        ticks.stop();
        assert!(!ticks.is_running());
    }
}
