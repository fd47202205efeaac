// ============================================================================
// DashboardHandler : une requête = une passe du pipeline
// ============================================================================
// Chaque interaction (lancement, changement de dates ou de granularité)
// appelle handle() avec la sélection courante et reçoit de quoi dessiner.
//
// PIPELINE :
//   cache (chargement si absent) → validation du range → filtre
//   → agrégation → indicateurs + statistiques
//
// Chaque étape peut court-circuiter avec une DashboardError récupérable.
// ============================================================================

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::analysis::{describe, filter, resample, summarize, ColumnStats, Metrics};
use crate::data::{DataCache, LoadReport};
use crate::error::{DashboardError, SelectionStage};
use crate::models::{DateRange, Granularity, OhlcvTable};

/// Sélection de l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardRequest {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

/// Résultat prêt à afficher
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: DateRange,
    pub granularity: Granularity,
    /// Table filtrée puis agrégée (un point par bucket)
    pub table: OhlcvTable,
    pub metrics: Metrics,
    pub stats: Vec<ColumnStats>,
    /// Nombre de lignes minute dans la fenêtre, avant agrégation
    pub selected_rows: usize,
    /// Rapport du chargement du fichier
    pub report: LoadReport,
}

/// Handler de requêtes du dashboard
///
/// CONCEPT : Dépendance injectée
/// - Le cache est passé au constructeur, pas une variable globale
/// - Les tests peuvent fournir leur propre cache et leur propre fichier
pub struct DashboardHandler {
    data_path: PathBuf,
    cache: DataCache,
}

impl DashboardHandler {
    pub fn new(data_path: impl Into<PathBuf>, cache: DataCache) -> Self {
        Self {
            data_path: data_path.into(),
            cache,
        }
    }

    /// Chemin du dataset servi par ce handler
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Accès en lecture au cache (diagnostic)
    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Premier et dernier jour du dataset (bornes des sélecteurs de dates)
    pub fn date_bounds(&mut self) -> Result<(NaiveDate, NaiveDate), DashboardError> {
        let dataset = self.cache.get(&self.data_path)?;
        dataset
            .table
            .date_span()
            .ok_or(DashboardError::EmptySelection(SelectionStage::Period))
    }

    /// Force le rechargement du fichier à la prochaine requête
    pub fn refresh(&mut self) -> bool {
        self.cache.invalidate(&self.data_path)
    }

    /// Exécute le pipeline pour une sélection
    #[instrument(
        skip_all,
        fields(start = %request.start, end = %request.end, granularity = request.granularity.label())
    )]
    pub fn handle(&mut self, request: &DashboardRequest) -> Result<DashboardView, DashboardError> {
        let dataset = self.cache.get(&self.data_path)?;
        let range = DateRange::new(request.start, request.end)?;

        let filtered = filter(&dataset.table, &range);
        if filtered.is_empty() {
            debug!("No rows in the selected period");
            return Err(DashboardError::EmptySelection(SelectionStage::Period));
        }
        let selected_rows = filtered.len();

        // CONCEPT RUST : Move plutôt que clone
        // - Native : la table filtrée est déjà le résultat, on la déplace
        // - Sinon : resample() retourne Cow::Owned, into_owned() ne copie rien
        let sampled = match request.granularity {
            Granularity::Native => filtered,
            granularity => resample(&filtered, granularity).into_owned(),
        };

        let metrics = summarize(&sampled)
            .ok_or(DashboardError::EmptySelection(SelectionStage::Granularity))?;
        let stats = describe(&sampled);

        info!(rows = selected_rows, points = sampled.len(), "Dashboard view ready");

        Ok(DashboardView {
            range,
            granularity: request.granularity,
            table: sampled,
            metrics,
            stats,
            selected_rows,
            report: dataset.report,
        })
    }
}
