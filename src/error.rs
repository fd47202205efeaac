// ============================================================================
// Module : error
// ============================================================================
// Erreurs typées de la bibliothèque
//
// CONCEPTS RUST :
// 1. thiserror : dérive Display et Error à partir d'attributs
// 2. #[from] : conversion automatique pour l'opérateur ?
// 3. Aucune erreur n'est fatale : l'UI affiche un message et continue
// ============================================================================

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Erreurs du chargement du fichier CSV
#[derive(Debug, Error)]
pub enum DataError {
    /// Le fichier n'existe pas (condition récupérable, jamais un panic)
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Erreur d'I/O à l'ouverture ou à la lecture
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erreur de format CSV (guillemets, encodage, nombre de champs...)
    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    /// Une colonne obligatoire manque dans l'en-tête
    #[error("missing column `{0}` in header")]
    MissingColumn(&'static str),

    /// Valeur numérique illisible dans une colonne de prix/volume
    #[error("line {line}: invalid {column} value `{value}`")]
    Parse {
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Étape du pipeline qui a produit une sélection vide
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStage {
    /// Aucune ligne dans la fenêtre de dates
    Period,
    /// La granularité n'a produit aucun bucket
    Granularity,
}

/// Gravité d'une erreur pour l'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// Erreurs d'une requête du dashboard
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("empty selection ({0:?})")]
    EmptySelection(SelectionStage),

    #[error("failed to load dataset")]
    Data(#[source] DataError),
}

// CONCEPT RUST : From manuel
// - NotFound remonte au niveau requête (message d'instruction dédié)
// - Les autres erreurs de chargement restent enveloppées
impl From<DataError> for DashboardError {
    fn from(error: DataError) -> Self {
        match error {
            DataError::NotFound(path) => DashboardError::NotFound(path),
            other => DashboardError::Data(other),
        }
    }
}

impl DashboardError {
    /// Gravité pour le style du message (jaune ou rouge)
    pub fn severity(&self) -> Severity {
        match self {
            DashboardError::InvalidRange { .. } | DashboardError::EmptySelection(_) => {
                Severity::Warning
            }
            DashboardError::NotFound(_) | DashboardError::Data(_) => Severity::Error,
        }
    }

    /// Message affiché à l'utilisateur
    pub fn user_message(&self) -> String {
        match self {
            DashboardError::NotFound(path) => format!(
                "Le fichier `{}` est introuvable. Placez-le depuis Kaggle puis appuyez sur [r].",
                path.display()
            ),
            DashboardError::InvalidRange { .. } => {
                "La date de début dépasse la date de fin.".to_string()
            }
            DashboardError::EmptySelection(SelectionStage::Period) => {
                "Aucune donnée sur cette période.".to_string()
            }
            DashboardError::EmptySelection(SelectionStage::Granularity) => {
                "La granularité choisie ne contient pas de points pour cette période.".to_string()
            }
            DashboardError::Data(source) => {
                format!("Impossible de lire le dataset : {}", source)
            }
        }
    }
}
