// ============================================================================
// Structure : OHLCV (Open, High, Low, Close, Volume)
// ============================================================================
// Représente une observation du dataset BTC-USD (une minute dans le fichier
// brut, un bucket après agrégation)
//
// CONCEPTS RUST :
// 1. DateTime<Utc> : type de chrono pour dates avec timezone UTC
// 2. f64 : floating point 64 bits pour les prix et le volume
// 3. NaN : une cellule vide du CSV est conservée comme f64::NAN
// ============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Granularité d'agrégation des données minute
///
/// CONCEPT : Granularité vs période
/// - Granularity : largeur des buckets (5m, 1h, 1j...)
/// - DateRange : fenêtre de dates sélectionnée par l'utilisateur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Données brutes (1 minute), aucune agrégation
    Native,
    /// 5 minutes
    M5,
    /// 15 minutes
    M15,
    /// 1 heure
    H1,
    /// 4 heures
    H4,
    /// 1 jour
    D1,
}

impl Granularity {
    /// Largeur d'un bucket en secondes
    ///
    /// CONCEPT : Option pour le cas "pas de bucket"
    /// - Native n'agrège rien, donc pas de largeur
    /// - Toutes les largeurs divisent 86 400 : un alignement sur l'epoch Unix
    ///   est aussi un alignement sur minuit UTC
    pub fn bucket_seconds(&self) -> Option<i64> {
        match self {
            Granularity::Native => None,
            Granularity::M5 => Some(5 * 60),
            Granularity::M15 => Some(15 * 60),
            Granularity::H1 => Some(60 * 60),
            Granularity::H4 => Some(4 * 60 * 60),
            Granularity::D1 => Some(24 * 60 * 60),
        }
    }

    /// Retourne le label court pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Granularity::Native => "1m",
            Granularity::M5 => "5m",
            Granularity::M15 => "15m",
            Granularity::H1 => "1h",
            Granularity::H4 => "4h",
            Granularity::D1 => "1d",
        }
    }

    /// Retourne le libellé long (sélecteur de la barre latérale)
    pub fn description(&self) -> &'static str {
        match self {
            Granularity::Native => "1 minute",
            Granularity::M5 => "5 minutes",
            Granularity::M15 => "15 minutes",
            Granularity::H1 => "1 heure",
            Granularity::H4 => "4 heures",
            Granularity::D1 => "1 jour",
        }
    }

    /// Retourne toutes les granularités disponibles (pour UI de sélection)
    pub fn all() -> Vec<Granularity> {
        vec![
            Granularity::Native,
            Granularity::M5,
            Granularity::M15,
            Granularity::H1,
            Granularity::H4,
            Granularity::D1,
        ]
    }

    /// Retourne la granularité suivante (cycle)
    pub fn next(&self) -> Granularity {
        match self {
            Granularity::Native => Granularity::M5,
            Granularity::M5 => Granularity::M15,
            Granularity::M15 => Granularity::H1,
            Granularity::H1 => Granularity::H4,
            Granularity::H4 => Granularity::D1,
            Granularity::D1 => Granularity::Native, // Boucle
        }
    }

    /// Retourne la granularité précédente (cycle)
    pub fn previous(&self) -> Granularity {
        match self {
            Granularity::Native => Granularity::D1, // Boucle
            Granularity::M5 => Granularity::Native,
            Granularity::M15 => Granularity::M5,
            Granularity::H1 => Granularity::M15,
            Granularity::H4 => Granularity::H1,
            Granularity::D1 => Granularity::H4,
        }
    }

    /// Retourne true si les points sont plus fins qu'une journée
    pub fn is_intraday(&self) -> bool {
        !matches!(self, Granularity::D1)
    }
}

impl Default for Granularity {
    /// Granularité par défaut : 4 heures (lisible sur plusieurs années)
    fn default() -> Self {
        Granularity::H4
    }
}

/// Une observation OHLCV
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OHLCV {
    /// Date (UTC) dérivée du timestamp Unix, clé primaire de la ligne
    pub date: DateTime<Utc>,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Volume échangé (BTC)
    pub volume: f64,
}

impl OHLCV {
    /// Constructeur : crée une nouvelle observation
    pub fn new(date: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Timestamp Unix en secondes
    pub fn timestamp(&self) -> i64 {
        self.date.timestamp()
    }

    /// Jour calendaire (UTC) de l'observation
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Table ordonnée d'observations, triée par date croissante
///
/// CONCEPT RUST : Ownership
/// - La table brute appartient au cache (voir data::cache)
/// - Le reste du pipeline reçoit &OhlcvTable et construit de nouvelles tables
/// - Aucune étape ne modifie la table source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhlcvTable {
    rows: Vec<OHLCV>,
}

impl OhlcvTable {
    /// Crée une table vide
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Crée une table en triant les lignes par date
    ///
    /// CONCEPT RUST : sort_by_key est stable
    /// - Deux lignes avec la même date gardent leur ordre d'origine
    pub fn from_rows(mut rows: Vec<OHLCV>) -> Self {
        rows.sort_by_key(|row| row.date);
        Self { rows }
    }

    /// Crée une table à partir de lignes déjà triées (usage interne)
    pub(crate) fn from_sorted(rows: Vec<OHLCV>) -> Self {
        debug_assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));
        Self { rows }
    }

    /// Retourne les lignes en lecture seule
    pub fn rows(&self) -> &[OHLCV] {
        &self.rows
    }

    /// Retourne le nombre de lignes
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Vérifie si la table est vide
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Première ligne (la plus ancienne)
    pub fn first(&self) -> Option<&OHLCV> {
        self.rows.first()
    }

    /// Dernière ligne (la plus récente)
    pub fn last(&self) -> Option<&OHLCV> {
        self.rows.last()
    }

    /// Premier et dernier jour couverts par la table
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some((first.day(), last.day())),
            _ => None,
        }
    }

    /// Itérateur sur les lignes
    pub fn iter(&self) -> std::slice::Iter<'_, OHLCV> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a OhlcvTable {
    type Item = &'a OHLCV;
    type IntoIter = std::slice::Iter<'a, OHLCV>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, close: f64) -> OHLCV {
        let date = Utc.timestamp_opt(secs, 0).unwrap();
        OHLCV::new(date, close, close, close, close, 1.0)
    }

    #[test]
    fn test_granularity_cycle() {
        assert_eq!(Granularity::Native.next(), Granularity::M5);
        assert_eq!(Granularity::Native.previous(), Granularity::D1);
        assert_eq!(Granularity::D1.next(), Granularity::Native); // Boucle

        for g in Granularity::all() {
            assert_eq!(g.next().previous(), g);
        }
    }

    #[test]
    fn test_bucket_seconds_divide_a_day() {
        assert_eq!(Granularity::Native.bucket_seconds(), None);
        for g in Granularity::all() {
            if let Some(width) = g.bucket_seconds() {
                assert_eq!(86_400 % width, 0, "{} ne divise pas un jour", g.label());
            }
        }
    }

    #[test]
    fn test_default_granularity() {
        assert_eq!(Granularity::default(), Granularity::H4);
    }

    #[test]
    fn test_from_rows_sorts_by_date() {
        let table = OhlcvTable::from_rows(vec![at(120, 3.0), at(0, 1.0), at(60, 2.0)]);

        let closes: Vec<f64> = table.iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_date_span() {
        assert!(OhlcvTable::new().date_span().is_none());

        let table = OhlcvTable::from_rows(vec![at(0, 1.0), at(86_400 * 3 + 10, 2.0)]);
        let (first, last) = table.date_span().unwrap();
        assert_eq!(first, NaiveDate::from_ymd_opt(1970, 1, 1).unwrap());
        assert_eq!(last, NaiveDate::from_ymd_opt(1970, 1, 4).unwrap());
    }
}
