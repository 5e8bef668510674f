//! Cible de rendu: frontière entre le pipeline et le backend graphique

use super::FrameUniforms;
use crate::diagnostics::HeavyError;

/// Résultat d'une tentative de production de frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// La frame a été soumise et présentée
    Presented,

    /// Aucune surface présentable disponible (redimensionnement, surface perdue)
    NoDrawable,
}

/// Ce que le pipeline attend d'un backend
///
/// L'implémentation wgpu est `SurfaceTarget`; les tests fournissent leur
/// propre cible sans GPU.
pub trait RenderTarget {
    /// Pipeline compilé, prêt à exécuter
    type Pipeline;

    /// Buffer d'uniformes propre à une instance de pipeline
    type UniformBuffer;

    /// Compile la source complète (vertex + fragment) en pipeline
    fn compile(&self, source: &str) -> Result<Self::Pipeline, HeavyError>;

    fn create_uniform_buffer(&self) -> Self::UniformBuffer;

    /// Nouvelles dimensions en pixels de la surface présentable
    fn resize(&mut self, width: u32, height: u32);

    fn size(&self) -> (u32, u32);

    /// Acquiert une surface, écrit les uniformes, dessine le triangle et présente
    fn render_frame(
        &mut self,
        pipeline: &Self::Pipeline,
        uniforms: &Self::UniformBuffer,
        frame: &FrameUniforms,
    ) -> FrameStatus;
}
