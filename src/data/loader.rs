// ============================================================================
// DataLoader : lecture du CSV BTC-USD minute
// ============================================================================
// Charge le fichier `Timestamp,Open,High,Low,Close,Volume` en OhlcvTable
//
// RÈGLES DE CHARGEMENT :
// - Les colonnes sont retrouvées par nom dans l'en-tête (insensible à la casse)
// - Timestamp : secondes Unix (entier ou flottant) converties en DateTime<Utc>
// - Timestamp illisible : ligne ignorée silencieusement, mais comptée
// - Cellule de prix/volume vide : conservée comme NaN
// - Valeur de prix/volume non numérique : erreur de parsing
// - Les lignes sont triées par date croissante
// ============================================================================

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info, instrument, warn};

use crate::error::DataError;
use crate::models::{OhlcvTable, OHLCV};

/// Colonnes attendues, dans l'ordre du fichier Kaggle
const COLUMNS: [&str; 6] = ["Timestamp", "Open", "High", "Low", "Close", "Volume"];

/// Statistiques de chargement
///
/// CONCEPT : Diagnostic des lignes ignorées
/// - La politique "drop silencieux" est conservée
/// - Le nombre de lignes écartées reste consultable (UI + logs)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nombre de records lus dans le fichier (hors en-tête)
    pub total_rows: usize,
    /// Nombre de records écartés pour timestamp invalide
    pub dropped_rows: usize,
}

impl LoadReport {
    /// Nombre de lignes conservées
    pub fn kept_rows(&self) -> usize {
        self.total_rows - self.dropped_rows
    }
}

/// Dataset chargé : table + provenance + rapport
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub path: PathBuf,
    pub table: OhlcvTable,
    pub report: LoadReport,
}

/// Index des colonnes dans l'en-tête
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    timestamp: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl ColumnIndex {
    /// Retrouve chaque colonne obligatoire dans l'en-tête
    fn from_headers(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &'static str| -> Result<usize, DataError> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or(DataError::MissingColumn(name))
        };

        Ok(Self {
            timestamp: find(COLUMNS[0])?,
            open: find(COLUMNS[1])?,
            high: find(COLUMNS[2])?,
            low: find(COLUMNS[3])?,
            close: find(COLUMNS[4])?,
            volume: find(COLUMNS[5])?,
        })
    }
}

/// Charge le dataset depuis un fichier
///
/// CONCEPT RUST : Result au lieu d'exception
/// - Fichier absent → Err(DataError::NotFound), jamais de panic
/// - L'appelant décide comment l'afficher
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load(path: &Path) -> Result<LoadedDataset, DataError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => DataError::NotFound(path.to_path_buf()),
        _ => DataError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    debug!("Parsing CSV dataset");
    let (table, report) = read_table(file)?;

    if report.dropped_rows > 0 {
        warn!(
            dropped = report.dropped_rows,
            total = report.total_rows,
            "Dropped rows with invalid timestamps"
        );
    }
    info!(rows = report.kept_rows(), "Dataset loaded");

    Ok(LoadedDataset {
        path: path.to_path_buf(),
        table,
        report,
    })
}

/// Parse un CSV depuis n'importe quel lecteur
///
/// CONCEPT RUST : Généricité sur Read
/// - Fichier en production, &[u8] dans les tests
pub fn read_table<R: Read>(reader: R) -> Result<(OhlcvTable, LoadReport), DataError> {
    // flexible : une ligne tronquée (téléchargement interrompu) n'invalide pas
    // tout le fichier ; les cellules absentes sont traitées comme vides
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns = ColumnIndex::from_headers(csv_reader.headers()?)?;

    let mut rows = Vec::new();
    let mut report = LoadReport::default();
    let mut record = StringRecord::new();

    // CONCEPT : Réutilisation du buffer
    // - read_record() remplit le même StringRecord à chaque itération
    // - Évite une allocation par ligne (millions de lignes)
    while csv_reader.read_record(&mut record)? {
        report.total_rows += 1;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        let date = match record.get(columns.timestamp).and_then(parse_timestamp) {
            Some(date) => date,
            None => {
                report.dropped_rows += 1;
                continue;
            }
        };

        rows.push(OHLCV::new(
            date,
            parse_value(&record, columns.open, "Open", line)?,
            parse_value(&record, columns.high, "High", line)?,
            parse_value(&record, columns.low, "Low", line)?,
            parse_value(&record, columns.close, "Close", line)?,
            parse_value(&record, columns.volume, "Volume", line)?,
        ));
    }

    Ok((OhlcvTable::from_rows(rows), report))
}

/// Convertit des secondes Unix (entier ou flottant) en DateTime<Utc>
///
/// Retourne None pour une valeur vide, non numérique, non finie ou hors
/// de la plage représentable par chrono.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let seconds: f64 = raw.trim().parse().ok()?;
    if !seconds.is_finite() {
        return None;
    }

    let whole = seconds.floor();
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }

    let mut secs = whole as i64;
    let mut nanos = ((seconds - whole) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        secs = secs.checked_add(1)?;
        nanos = 0;
    }

    DateTime::from_timestamp(secs, nanos)
}

/// Lit une cellule numérique ; vide → NaN
fn parse_value(
    record: &StringRecord,
    index: usize,
    column: &'static str,
    line: u64,
) -> Result<f64, DataError> {
    let raw = record.get(index).unwrap_or("");
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| DataError::Parse {
        line,
        column,
        value: raw.to_string(),
    })
}

// ============================================================================
// Tests unitaires
// ============================================================================
