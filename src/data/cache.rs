// ============================================================================
// DataCache : cache explicite des datasets chargés
// ============================================================================
// Le fichier minute fait plusieurs millions de lignes : on ne le parse qu'une
// fois, puis chaque interaction réutilise la table en mémoire.
//
// CONCEPTS RUST :
// 1. Rc<T> : partage en lecture seule sans copie (un seul thread)
// 2. HashMap<PathBuf, _> : un dataset par chemin
// 3. Invalidation explicite : refresh manuel ou date de modification
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::data::loader::{self, LoadedDataset};
use crate::error::DataError;

/// Politique d'invalidation du cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePolicy {
    /// Le dataset reste en cache jusqu'à un refresh explicite
    Manual,
    /// Recharge si la date de modification du fichier a changé
    #[default]
    OnFileChange,
}

/// Entrée du cache
#[derive(Debug)]
struct CacheEntry {
    dataset: Rc<LoadedDataset>,
    /// Date de modification au moment du chargement
    modified: Option<SystemTime>,
}

/// Cache des datasets, injecté dans le handler
#[derive(Debug, Default)]
pub struct DataCache {
    policy: CachePolicy,
    entries: HashMap<PathBuf, CacheEntry>,
    /// Nombre de chargements effectifs (parse du fichier)
    loads: usize,
}

impl DataCache {
    /// Crée un cache vide avec la politique donnée
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            entries: HashMap::new(),
            loads: 0,
        }
    }

    /// Retourne le dataset du chemin, en le chargeant si nécessaire
    ///
    /// CONCEPT RUST : Rc::clone
    /// - Copie un pointeur, pas la table
    /// - Le cache reste propriétaire, l'appelant a une vue en lecture seule
    pub fn get(&mut self, path: &Path) -> Result<Rc<LoadedDataset>, DataError> {
        if let Some(entry) = self.entries.get(path) {
            if !self.is_stale(path, entry) {
                debug!(path = %path.display(), "Cache hit");
                return Ok(Rc::clone(&entry.dataset));
            }
            info!(path = %path.display(), "Dataset changed on disk, reloading");
        }

        let modified = file_modified(path);
        match loader::load(path) {
            Ok(dataset) => {
                self.loads += 1;
                let dataset = Rc::new(dataset);
                self.entries.insert(
                    path.to_path_buf(),
                    CacheEntry {
                        dataset: Rc::clone(&dataset),
                        modified,
                    },
                );
                Ok(dataset)
            }
            Err(e) => {
                // Une entrée périmée ne doit pas survivre à un rechargement raté
                self.entries.remove(path);
                Err(e)
            }
        }
    }

    /// Invalide l'entrée d'un chemin ; retourne true si elle existait
    pub fn invalidate(&mut self, path: &Path) -> bool {
        let removed = self.entries.remove(path).is_some();
        if removed {
            info!(path = %path.display(), "Cache entry invalidated");
        }
        removed
    }

    /// Vérifie si un chemin est en cache
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Nombre de fois où un fichier a réellement été parsé
    pub fn load_count(&self) -> usize {
        self.loads
    }

    fn is_stale(&self, path: &Path, entry: &CacheEntry) -> bool {
        match self.policy {
            CachePolicy::Manual => false,
            CachePolicy::OnFileChange => file_modified(path) != entry.modified,
        }
    }
}

/// Date de modification du fichier (None si indisponible)
fn file_modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
