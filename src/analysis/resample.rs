// ============================================================================
// Resampler : agrégation des minutes en buckets
// ============================================================================
// Règles par bucket (valeurs NaN ignorées) :
// - open   = premier open du bucket
// - high   = plus haut high
// - low    = plus bas low
// - close  = dernier close
// - volume = somme des volumes
//
// Un bucket sans close défini n'est pas émis. Les buckets sans ligne
// n'existent jamais : on ne parcourt que les lignes présentes.
// ============================================================================

use std::borrow::Cow;

use chrono::DateTime;

use crate::models::{Granularity, OhlcvTable, OHLCV};

/// Agrège la table selon la granularité
///
/// CONCEPT RUST : Cow (Clone on Write)
/// - Native : Cow::Borrowed, la table d'entrée est rendue telle quelle
/// - Autres : Cow::Owned, une nouvelle table agrégée
/// - Aucune copie inutile des millions de lignes minute
pub fn resample(table: &OhlcvTable, granularity: Granularity) -> Cow<'_, OhlcvTable> {
    match granularity.bucket_seconds() {
        None => Cow::Borrowed(table),
        Some(width) => Cow::Owned(aggregate(table.rows(), width)),
    }
}

/// Début du bucket (aligné sur l'epoch) contenant le timestamp
pub fn bucket_start(timestamp: i64, width: i64) -> i64 {
    timestamp.div_euclid(width) * width
}

/// Accumulateur d'un bucket en cours
#[derive(Debug, Clone, Copy)]
struct Bucket {
    start: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl Bucket {
    fn new(start: i64) -> Self {
        Self {
            start,
            open: f64::NAN,
            high: f64::NAN,
            low: f64::NAN,
            close: f64::NAN,
            volume: 0.0,
        }
    }

    /// Intègre une ligne au bucket
    ///
    /// CONCEPT : f64::max / f64::min ignorent NaN
    /// - NAN.max(x) == x, donc l'état initial NaN disparaît au premier point
    fn observe(&mut self, row: &OHLCV) {
        if self.open.is_nan() {
            self.open = row.open;
        }
        self.high = self.high.max(row.high);
        self.low = self.low.min(row.low);
        if !row.close.is_nan() {
            self.close = row.close;
        }
        if !row.volume.is_nan() {
            self.volume += row.volume;
        }
    }

    /// Ferme le bucket ; None si le close est indéfini
    fn finish(self) -> Option<OHLCV> {
        if self.close.is_nan() {
            return None;
        }
        let date = DateTime::from_timestamp(self.start, 0)?;
        Some(OHLCV::new(date, self.open, self.high, self.low, self.close, self.volume))
    }
}

/// Regroupe des lignes triées en buckets consécutifs
fn aggregate(rows: &[OHLCV], width: i64) -> OhlcvTable {
    let mut output = Vec::new();
    let mut current: Option<Bucket> = None;

    for row in rows {
        let start = bucket_start(row.timestamp(), width);

        match current.as_mut() {
            Some(bucket) if bucket.start == start => bucket.observe(row),
            _ => {
                // Nouveau bucket : on ferme le précédent
                if let Some(done) = current.take().and_then(Bucket::finish) {
                    output.push(done);
                }
                let mut bucket = Bucket::new(start);
                bucket.observe(row);
                current = Some(bucket);
            }
        }
    }

    // Ne pas oublier le dernier bucket
    if let Some(done) = current.and_then(Bucket::finish) {
        output.push(done);
    }

    OhlcvTable::from_sorted(output)
}

// ============================================================================
// Tests unitaires
// ============================================================================
