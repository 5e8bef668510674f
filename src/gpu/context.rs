//! Contexte graphique partagé: device et file de commandes

use crate::diagnostics::HeavyError;
use log::info;
use std::sync::Arc;
use wgpu::*;

/// Device et queue uniques, partagés par tous les pipelines
///
/// Créé une fois par l'application hôte puis passé par `Arc` à chaque
/// cible de rendu. Son device et sa queue ne changent plus après création.
pub struct GraphicsContext {
    /// Instance wgpu
    pub instance: Instance,

    /// Adaptateur choisi
    pub adapter: Adapter,

    /// Device wgpu
    pub device: Arc<Device>,

    /// Queue de commandes
    pub queue: Arc<Queue>,
}

impl GraphicsContext {
    /// Instance wgpu pour tous les backends disponibles
    pub fn create_instance() -> Instance {
        Instance::new(InstanceDescriptor {
            backends: Backends::all(),
            flags: InstanceFlags::default(),
            dx12_shader_compiler: Dx12Compiler::Fxc,
            gles_minor_version: Gles3MinorVersion::Automatic,
        })
    }

    /// Crée le contexte, compatible avec la surface donnée si fournie
    ///
    /// L'absence d'adaptateur ou le refus du device donnent
    /// `HeavyError::ContextUnavailable`.
    pub async fn new(
        instance: Instance,
        compatible_surface: Option<&Surface<'_>>,
    ) -> Result<Self, HeavyError> {
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::HighPerformance,
                compatible_surface,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| {
                HeavyError::ContextUnavailable("aucun adaptateur graphique compatible".to_string())
            })?;

        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    required_features: Features::empty(),
                    required_limits: Limits::default(),
                    label: Some("Pixel Shader Device"),
                },
                None,
            )
            .await
            .map_err(|err| HeavyError::ContextUnavailable(format!("device refusé: {}", err)))?;

        let adapter_info = adapter.get_info();
        info!(
            "Contexte graphique prêt: {} ({:?})",
            adapter_info.name, adapter_info.backend
        );

        Ok(Self {
            instance,
            adapter,
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    /// Version bloquante de `new`
    pub fn new_blocking(
        instance: Instance,
        compatible_surface: Option<&Surface<'_>>,
    ) -> Result<Self, HeavyError> {
        pollster::block_on(Self::new(instance, compatible_surface))
    }

    /// Contexte sans surface, pour la compilation seule
    pub fn headless() -> Result<Self, HeavyError> {
        Self::new_blocking(Self::create_instance(), None)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }
}
