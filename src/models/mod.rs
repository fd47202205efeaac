// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module publique (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod ohlc;       // Observations OHLCV, table et granularités
pub mod date_range; // Fenêtre de dates inclusive

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use btcdash::models::ohlc::OhlcvTable;
// On peut faire : use btcdash::models::OhlcvTable;
pub use date_range::DateRange;
pub use ohlc::{Granularity, OhlcvTable, OHLCV};
