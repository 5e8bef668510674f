//! Erreurs et journalisation
//!
//! Un seul emplacement global conserve la dernière erreur, un observateur
//! optionnel est notifié à chaque enregistrement, et le niveau de log
//! contrôle la sévérité minimale affichée.

pub mod error;
pub mod sink;

pub use error::*;
pub use sink::*;
