// ============================================================================
// Statistiques descriptives
// ============================================================================
// Pour chaque colonne : nombre de valeurs, moyenne, écart-type (n-1),
// minimum, quartiles (interpolation linéaire) et maximum.
// ============================================================================

use crate::models::{OhlcvTable, OHLCV};

/// Statistiques d'une colonne
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub column: &'static str,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

/// Colonnes décrites et leur extracteur
///
/// CONCEPT RUST : Pointeurs de fonction
/// - fn(&OHLCV) -> f64 : une closure sans capture se convertit en pointeur
const COLUMNS: [(&str, fn(&OHLCV) -> f64); 5] = [
    ("Open", |r| r.open),
    ("High", |r| r.high),
    ("Low", |r| r.low),
    ("Close", |r| r.close),
    ("Volume", |r| r.volume),
];

/// Décrit les cinq colonnes de la table
pub fn describe(table: &OhlcvTable) -> Vec<ColumnStats> {
    COLUMNS
        .iter()
        .map(|&(column, extract)| {
            let values: Vec<f64> = table.iter().map(extract).filter(|v| !v.is_nan()).collect();
            column_stats(column, values)
        })
        .collect()
}

fn column_stats(column: &'static str, mut values: Vec<f64>) -> ColumnStats {
    let count = values.len();
    if count == 0 {
        return ColumnStats {
            column,
            count,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            p25: f64::NAN,
            p50: f64::NAN,
            p75: f64::NAN,
            max: f64::NAN,
        };
    }

    values.sort_by(|a, b| a.total_cmp(b));

    let mean = values.iter().sum::<f64>() / count as f64;
    let std = if count < 2 {
        f64::NAN
    } else {
        let squares: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (squares / (count - 1) as f64).sqrt()
    };

    ColumnStats {
        column,
        count,
        mean,
        std,
        min: values[0],
        p25: quantile(&values, 0.25),
        p50: quantile(&values, 0.50),
        p75: quantile(&values, 0.75),
        max: values[count - 1],
    }
}

/// Quantile par interpolation linéaire sur des valeurs triées (non vides)
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}
