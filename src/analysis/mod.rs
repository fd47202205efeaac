// ============================================================================
// Module : analysis
// ============================================================================
// Transformations pures de la table : filtrage par dates, agrégation,
// indicateurs et statistiques descriptives.
//
// CONCEPT : Fonctions pures
// - Entrée : &OhlcvTable (lecture seule)
// - Sortie : nouvelle valeur, la table source n'est jamais modifiée
// ============================================================================

pub mod filter;   // Fenêtre de dates inclusive
pub mod resample; // Agrégation OHLCV par buckets
pub mod metrics;  // Indicateurs de synthèse
pub mod stats;    // Statistiques descriptives par colonne

pub use filter::filter;
pub use metrics::{summarize, Metrics};
pub use resample::resample;
pub use stats::{describe, ColumnStats};
