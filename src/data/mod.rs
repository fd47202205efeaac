// ============================================================================
// Module : data
// ============================================================================
// Accès au dataset local : lecture du CSV et cache en mémoire
// ============================================================================

pub mod loader; // Lecture du fichier CSV
pub mod cache;  // Cache explicite avec invalidation

// Re-export des fonctions principales
pub use cache::{CachePolicy, DataCache};
pub use loader::{load, LoadReport, LoadedDataset};
