// ============================================================================
// MetricsSummarizer : indicateurs de la sélection
// ============================================================================
// Dernière clôture, variation vs point précédent, min/max des clôtures,
// volume total. Les NaN sont ignorés pour les extrema et la somme.
// ============================================================================

use crate::models::OhlcvTable;

/// Indicateurs affichés sous la courbe de prix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Clôture de la dernière ligne
    pub latest_close: f64,
    /// Variation (%) de la dernière clôture vs la précédente
    pub change_pct: f64,
    /// Plus basse clôture
    pub min_close: f64,
    /// Plus haute clôture
    pub max_close: f64,
    /// Somme des volumes
    pub total_volume: f64,
}

impl Metrics {
    /// Retourne true si la dernière variation est positive ou nulle
    pub fn is_positive(&self) -> bool {
        self.change_pct >= 0.0
    }
}

/// Calcule les indicateurs ; None si la table est vide
///
/// CONCEPT RUST : Option au lieu d'une précondition
/// - Une table vide n'a pas de "dernière clôture"
/// - L'appelant a normalement déjà court-circuité ce cas
pub fn summarize(table: &OhlcvTable) -> Option<Metrics> {
    let rows = table.rows();
    let last = rows.last()?;

    // CONCEPT : Variation avec garde
    // - Moins de deux lignes : pas de point de comparaison → 0.0
    // - Clôture précédente nulle ou NaN : résultat non fini → 0.0
    let change_pct = match rows {
        [.., previous, current] => {
            let change = (current.close - previous.close) / previous.close * 100.0;
            if change.is_finite() {
                change
            } else {
                0.0
            }
        }
        _ => 0.0,
    };

    let (min_close, max_close) = rows.iter().fold((f64::NAN, f64::NAN), |(min, max), r| {
        (min.min(r.close), max.max(r.close))
    });

    let total_volume = rows
        .iter()
        .map(|r| r.volume)
        .filter(|v| !v.is_nan())
        .sum();

    Some(Metrics {
        latest_close: last.close,
        change_pct,
        min_close,
        max_close,
        total_volume,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OHLCV;
    use chrono::{TimeZone, Utc};

    fn table(closes: &[f64]) -> OhlcvTable {
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = Utc.timestamp_opt(i as i64 * 60, 0).unwrap();
                OHLCV::new(date, c, c, c, c, 2.0)
            })
            .collect();
        OhlcvTable::from_rows(rows)
    }

    #[test]
    fn test_empty_table() {
        assert!(summarize(&OhlcvTable::new()).is_none());
    }

    #[test]
    fn test_single_row_has_zero_change() {
        let m = summarize(&table(&[42_000.0])).unwrap();
        assert_eq!(m.latest_close, 42_000.0);
        assert_eq!(m.change_pct, 0.0);
        assert_eq!(m.min_close, 42_000.0);
        assert_eq!(m.max_close, 42_000.0);
        assert_eq!(m.total_volume, 2.0);
    }

    #[test]
    fn test_change_against_previous_point() {
        let m = summarize(&table(&[100.0, 105.0, 95.0, 100.0])).unwrap();
        assert_eq!(m.latest_close, 100.0);
        assert!((m.change_pct - 5.263157).abs() < 1e-4);
        assert_eq!(m.min_close, 95.0);
        assert_eq!(m.max_close, 105.0);
        assert_eq!(m.total_volume, 8.0);
        assert!(m.is_positive());
    }

    #[test]
    fn test_zero_previous_close() {
        let m = summarize(&table(&[0.0, 10.0])).unwrap();
        assert_eq!(m.change_pct, 0.0);
    }
}
