// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de l'application TUI : sélection courante (dates, granularité),
// dernier résultat du pipeline et messages pour l'utilisateur
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Une modification de la sélection marque l'état "à recalculer" ;
//   la boucle principale appelle alors refresh() une seule fois
// ============================================================================

use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, Severity};
use crate::handler::{DashboardHandler, DashboardRequest, DashboardView};
use crate::models::Granularity;

/// Pas des flèches gauche/droite sur une date (jours)
pub const SMALL_STEP_DAYS: i64 = 1;

/// Pas de PageUp/PageDown sur une date (jours)
pub const LARGE_STEP_DAYS: i64 = 30;

// ============================================================================
// Enum : Control
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Un seul contrôle de la barre latérale a le focus
// - Tab / Shift-Tab font tourner le focus
// ============================================================================

/// Contrôles de la barre latérale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    StartDate,
    EndDate,
    Granularity,
}

impl Control {
    pub fn next(&self) -> Control {
        match self {
            Control::StartDate => Control::EndDate,
            Control::EndDate => Control::Granularity,
            Control::Granularity => Control::StartDate,
        }
    }

    pub fn previous(&self) -> Control {
        match self {
            Control::StartDate => Control::Granularity,
            Control::EndDate => Control::StartDate,
            Control::Granularity => Control::EndDate,
        }
    }
}

/// Message affiché dans la zone de notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Two-step quit : première pression de 'q' → confirmation
    pub confirm_quit: bool,

    /// Contrôle actif dans la barre latérale
    pub focus: Control,

    /// Date de début sélectionnée (None tant que le dataset n'est pas lu)
    pub start_date: Option<NaiveDate>,

    /// Date de fin sélectionnée
    pub end_date: Option<NaiveDate>,

    /// Granularité sélectionnée
    pub granularity: Granularity,

    /// Premier et dernier jour du dataset
    /// CONCEPT : Bornes des sélecteurs
    /// - Les dates sont toujours ramenées dans [min, max]
    /// - start > end reste possible : le pipeline le signale
    pub bounds: Option<(NaiveDate, NaiveDate)>,

    /// Dernier résultat valide du pipeline
    pub view: Option<DashboardView>,

    /// Avertissement ou erreur à afficher
    pub notice: Option<Notice>,

    /// Affiche le tableau des statistiques descriptives
    pub show_stats: bool,

    /// La sélection a changé depuis le dernier calcul
    pub needs_refresh: bool,

    /// Chemin du dataset (affiché dans l'en-tête)
    pub data_path: PathBuf,

    /// Nombre de chargements du cache lors du dernier calcul des bornes
    seen_loads: usize,
}

impl App {
    /// Crée l'état initial ; le premier refresh() lira le dataset
    pub fn new(granularity: Granularity, data_path: PathBuf) -> Self {
        Self {
            running: true,
            confirm_quit: false,
            focus: Control::StartDate,
            start_date: None,
            end_date: None,
            granularity,
            bounds: None,
            view: None,
            notice: None,
            show_stats: false,
            needs_refresh: true,
            data_path,
            seen_loads: 0,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }

    // ========================================================================
    // Sélection
    // ========================================================================

    /// Passe au contrôle suivant
    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    /// Passe au contrôle précédent
    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    /// Installe les bornes du dataset
    ///
    /// Première fois : la sélection couvre tout le dataset.
    /// Ensuite (rechargement) : la sélection existante est ramenée dans les
    /// nouvelles bornes. Une date de fin posée sur l'ancien dernier jour suit
    /// le nouveau dernier jour (fichier complété).
    pub fn set_bounds(&mut self, bounds: (NaiveDate, NaiveDate)) {
        let (min, max) = bounds;
        let end_follows = matches!(
            (self.bounds, self.end_date),
            (Some((_, old_max)), Some(end)) if end == old_max
        );

        self.bounds = Some(bounds);
        self.start_date = Some(self.start_date.map_or(min, |d| d.clamp(min, max)));
        self.end_date = if end_follows {
            Some(max)
        } else {
            Some(self.end_date.map_or(max, |d| d.clamp(min, max)))
        };
    }

    /// Ramène la sélection sur toute la période du dataset
    pub fn reset_dates(&mut self) {
        if let Some((min, max)) = self.bounds {
            self.start_date = Some(min);
            self.end_date = Some(max);
            self.needs_refresh = true;
        }
    }

    /// Ajuste le contrôle actif
    ///
    /// - Dates : décalage de `days` jours, borné au dataset
    /// - Granularité : un cran dans le sens du signe
    pub fn adjust(&mut self, days: i64) {
        match self.focus {
            Control::StartDate => self.start_date = self.shifted(self.start_date, days),
            Control::EndDate => self.end_date = self.shifted(self.end_date, days),
            Control::Granularity => {
                self.granularity = if days >= 0 {
                    self.granularity.next()
                } else {
                    self.granularity.previous()
                };
            }
        }
        self.needs_refresh = true;
    }

    /// Change la granularité directement
    pub fn set_granularity(&mut self, granularity: Granularity) {
        if self.granularity != granularity {
            self.granularity = granularity;
            self.needs_refresh = true;
        }
    }

    fn shifted(&self, date: Option<NaiveDate>, days: i64) -> Option<NaiveDate> {
        let (min, max) = self.bounds?;
        let date = date?;
        let moved = date
            .checked_add_signed(Duration::days(days))
            .unwrap_or(if days >= 0 { max } else { min });
        Some(moved.clamp(min, max))
    }

    /// Requête correspondant à la sélection (None si dates inconnues)
    pub fn request(&self) -> Option<DashboardRequest> {
        Some(DashboardRequest {
            start: self.start_date?,
            end: self.end_date?,
            granularity: self.granularity,
        })
    }

    /// Affiche/masque les statistiques descriptives
    pub fn toggle_stats(&mut self) {
        self.show_stats = !self.show_stats;
    }

    // ========================================================================
    // Pipeline
    // ========================================================================

    /// Demande un rechargement complet (bornes + vue)
    pub fn request_reload(&mut self) {
        self.bounds = None;
        self.needs_refresh = true;
    }

    /// Recalcule la vue à partir de la sélection courante
    ///
    /// CONCEPT : Requête / réponse explicite
    /// - Un appel = une passe du pipeline
    /// - Pas de ré-exécution implicite : seulement si needs_refresh
    ///
    /// Les bornes sont relues quand le cache a rechargé le fichier
    /// (load_count a changé), y compris sans [r] avec OnFileChange.
    pub fn refresh(&mut self, handler: &mut DashboardHandler) {
        self.needs_refresh = false;

        // date_bounds() passe par le cache : c'est lui qui détecte un fichier modifié
        let bounds = match handler.date_bounds() {
            Ok(bounds) => bounds,
            Err(e) => {
                self.apply(Err(e));
                return;
            }
        };

        let loads = handler.cache().load_count();
        if self.bounds.is_none() || loads != self.seen_loads {
            if self.bounds.is_some_and(|current| current != bounds) {
                info!(?bounds, "Dataset span changed");
            }
            self.set_bounds(bounds);
            self.seen_loads = loads;
        }

        match self.request() {
            Some(request) => {
                let result = handler.handle(&request);
                self.apply(result);
            }
            None => debug!("No selection yet, nothing to compute"),
        }
    }

    /// Applique le résultat du pipeline
    ///
    /// En cas d'erreur, la vue est retirée : aucun graphique n'est dessiné
    /// pour une sélection invalide ou vide.
    pub fn apply(&mut self, result: Result<DashboardView, DashboardError>) {
        match result {
            Ok(view) => {
                self.view = Some(view);
                self.notice = None;
            }
            Err(e) => {
                warn!(error = %e, "Request did not produce a view");
                self.view = None;
                self.notice = Some(Notice {
                    severity: e.severity(),
                    message: e.user_message(),
                });
            }
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataCache;
    use crate::error::SelectionStage;
    use std::fs::File;
    use std::io::Write;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_with_bounds() -> App {
        let mut app = App::new(Granularity::H4, PathBuf::from("data.csv"));
        app.set_bounds((day(2024, 1, 1), day(2024, 3, 31)));
        app
    }

    #[test]
    fn test_bounds_initialize_selection() {
        let app = app_with_bounds();
        assert_eq!(app.start_date, Some(day(2024, 1, 1)));
        assert_eq!(app.end_date, Some(day(2024, 3, 31)));

        let request = app.request().unwrap();
        assert_eq!(request.granularity, Granularity::H4);
    }

    #[test]
    fn test_no_request_without_bounds() {
        let app = App::new(Granularity::H4, PathBuf::from("data.csv"));
        assert!(app.request().is_none());
    }

    #[test]
    fn test_adjust_dates_is_clamped() {
        let mut app = app_with_bounds();

        app.adjust(-LARGE_STEP_DAYS);
        assert_eq!(app.start_date, Some(day(2024, 1, 1)));

        app.adjust(LARGE_STEP_DAYS);
        assert_eq!(app.start_date, Some(day(2024, 1, 31)));

        app.focus_next();
        app.adjust(SMALL_STEP_DAYS);
        assert_eq!(app.end_date, Some(day(2024, 3, 31)));
        assert!(app.needs_refresh);
    }

    #[test]
    fn test_adjust_granularity() {
        let mut app = app_with_bounds();
        app.focus_previous();
        assert_eq!(app.focus, Control::Granularity);

        app.adjust(SMALL_STEP_DAYS);
        assert_eq!(app.granularity, Granularity::D1);
        app.adjust(-SMALL_STEP_DAYS);
        app.adjust(-SMALL_STEP_DAYS);
        assert_eq!(app.granularity, Granularity::H1);
    }

    #[test]
    fn test_start_after_end_is_allowed_in_selection() {
        let mut app = app_with_bounds();
        app.focus = Control::EndDate;
        app.adjust(-200);
        app.focus = Control::StartDate;
        app.adjust(10);

        let request = app.request().unwrap();
        assert!(request.start > request.end);
    }

    #[test]
    fn test_reload_keeps_selection_within_new_bounds() {
        let mut app = app_with_bounds();
        app.focus = Control::EndDate;
        app.adjust(-10);

        app.request_reload();
        app.set_bounds((day(2024, 2, 1), day(2024, 2, 29)));
        assert_eq!(app.start_date, Some(day(2024, 2, 1)));
        assert_eq!(app.end_date, Some(day(2024, 2, 29)));
    }

    #[test]
    fn test_end_date_follows_extended_dataset() {
        let mut app = app_with_bounds();
        app.set_bounds((day(2024, 1, 1), day(2024, 4, 30)));
        assert_eq!(app.end_date, Some(day(2024, 4, 30)));

        app.focus = Control::EndDate;
        app.adjust(-10);
        app.set_bounds((day(2024, 1, 1), day(2024, 5, 31)));
        assert_eq!(app.end_date, Some(day(2024, 4, 20)));
    }

    #[test]
    fn test_apply_error_clears_view() {
        let mut app = app_with_bounds();
        app.apply(Err(DashboardError::EmptySelection(SelectionStage::Period)));

        assert!(app.view.is_none());
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.severity, Severity::Warning);
    }

    #[test]
    fn test_refresh_with_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut handler = DashboardHandler::new(dir.path().join("absent.csv"), DataCache::default());
        let mut app = App::new(Granularity::H4, handler.data_path().to_path_buf());

        app.refresh(&mut handler);
        assert!(!app.needs_refresh);
        assert!(app.view.is_none());
        assert_eq!(app.notice.as_ref().unwrap().severity, Severity::Error);
    }

    #[test]
    fn test_refresh_builds_view() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Timestamp,Open,High,Low,Close,Volume").unwrap();
        for i in 0..600 {
            writeln!(file, "{},1,2,0.5,1.5,1", 1_704_067_200 + i * 60).unwrap();
        }

        let mut handler = DashboardHandler::new(path.clone(), DataCache::default());
        let mut app = App::new(Granularity::H1, path);
        app.refresh(&mut handler);

        let view = app.view.as_ref().unwrap();
        assert_eq!(view.table.len(), 10);
        assert!(app.notice.is_none());
        assert_eq!(app.bounds, Some((day(2024, 1, 1), day(2024, 1, 1))));
    }

    #[test]
    fn test_refresh_picks_up_grown_file() {
        use std::time::{Duration, SystemTime};

        fn write(path: &std::path::Path, minutes: i64, mtime: u64) {
            let mut file = File::create(path).unwrap();
            writeln!(file, "Timestamp,Open,High,Low,Close,Volume").unwrap();
            for i in 0..minutes {
                writeln!(file, "{},1,2,0.5,1.5,1", 1_704_067_200 + i * 60).unwrap();
            }
            file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(mtime))
                .unwrap();
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc.csv");
        write(&path, 1440, 1_000);

        let mut handler = DashboardHandler::new(path.clone(), DataCache::default());
        let mut app = App::new(Granularity::H1, path.clone());
        app.refresh(&mut handler);
        assert_eq!(app.bounds, Some((day(2024, 1, 1), day(2024, 1, 1))));

        // Deux jours de plus, sans passer par request_reload()
        write(&path, 3 * 1440, 2_000);
        app.refresh(&mut handler);

        assert_eq!(app.bounds, Some((day(2024, 1, 1), day(2024, 1, 3))));
        assert_eq!(app.end_date, Some(day(2024, 1, 3)));
        assert_eq!(app.view.as_ref().unwrap().table.len(), 72);
        assert_eq!(handler.cache().load_count(), 2);
    }
}
