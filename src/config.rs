// ============================================================================
// Configuration
// ============================================================================
// Fichier optionnel `btcdash.json` dans le répertoire courant. Tous les champs
// sont facultatifs ; un fichier absent donne la configuration par défaut.
//
// Exemple :
// {
//   "data_path": "data/btcusd_1-min_data.csv",
//   "default_granularity": "h4",
//   "cache_policy": "on_file_change"
// }
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::CachePolicy;
use crate::models::Granularity;

/// Nom du fichier de configuration cherché au démarrage
pub const CONFIG_FILE: &str = "btcdash.json";

/// Emplacement attendu du dataset Kaggle
pub const DEFAULT_DATA_PATH: &str = "data/btcusd_1-min_data.csv";

/// Configuration de l'application
///
/// CONCEPT RUST : #[serde(default)]
/// - Chaque champ absent du JSON prend la valeur de Default::default()
/// - Un fichier `{}` est donc valide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Chemin du CSV minute
    pub data_path: PathBuf,
    /// Granularité sélectionnée au lancement
    pub default_granularity: Granularity,
    /// Répertoire des fichiers de logs
    pub log_dir: PathBuf,
    /// Politique d'invalidation du cache
    pub cache_policy: CachePolicy,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_granularity: Granularity::default(),
            log_dir: default_log_dir(),
            cache_policy: CachePolicy::default(),
        }
    }
}

impl DashboardConfig {
    /// Charge la configuration ; fichier absent → valeurs par défaut
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Échec de la lecture de {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Configuration invalide dans {}", path.display()))
    }
}

/// Répertoire de logs par défaut
///
/// Les logs sont écrits dans :
/// - Linux/WSL : ~/.local/share/btcdash/logs/
/// - macOS : ~/Library/Application Support/btcdash/logs/
/// - Windows : C:\Users\<user>\AppData\Local\btcdash\logs\
/// - Sinon : ./logs
pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("btcdash").join("logs"))
        .unwrap_or_else(|| PathBuf::from("./logs"))
}
