// ============================================================================
// RangeFilter : restriction à une fenêtre de dates
// ============================================================================
// Garde les lignes dont le jour (UTC) est dans [start, end], bornes incluses.
// La journée de fin est entière : 2024-01-31 inclut 23:59.
// ============================================================================

use crate::models::{DateRange, OhlcvTable};

/// Retourne la sous-table incluse dans le range
///
/// CONCEPT RUST : partition_point (recherche binaire)
/// - La table est triée par date, donc aussi par jour
/// - Deux recherches O(log n) délimitent la tranche à copier
/// - Un résultat vide est une table vide (is_empty() == true), pas une erreur
pub fn filter(table: &OhlcvTable, range: &DateRange) -> OhlcvTable {
    let rows = table.rows();
    let lo = rows.partition_point(|row| row.day() < range.start());
    let hi = rows.partition_point(|row| row.day() <= range.end());

    if lo >= hi {
        return OhlcvTable::new();
    }
    OhlcvTable::from_sorted(rows[lo..hi].to_vec())
}
