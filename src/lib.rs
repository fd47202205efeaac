// ============================================================================
// BtcDash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod analysis; // Filtrage, agrégation, indicateurs, statistiques
pub mod app;      // État de l'application
pub mod config;   // Configuration (btcdash.json)
pub mod data;     // Lecture du CSV et cache
pub mod error;    // Erreurs typées
pub mod handler;  // Pipeline requête → vue
pub mod models;   // Structures de données
pub mod ui;       // Interface utilisateur
