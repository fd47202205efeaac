// ============================================================================
// Structure : DateRange
// ============================================================================
// Fenêtre de dates inclusive choisie par l'utilisateur
//
// CONCEPT RUST : Constructeur qui valide (smart constructor)
// - Les champs sont privés : impossible de construire un range inversé
// - new() retourne un Result, l'invariant start <= end est garanti ensuite
// ============================================================================

use chrono::NaiveDate;

use crate::error::DashboardError;

/// Intervalle de dates inclusif [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Crée un range après vérification de start <= end
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DashboardError> {
        if start > end {
            return Err(DashboardError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Date de début (incluse)
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Date de fin (incluse, journée entière)
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Vérifie si un jour appartient au range
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Nombre de jours couverts (bornes incluses)
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_valid_range() {
        let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 31)).unwrap();
        assert_eq!(range.days(), 31);
        assert!(range.contains(day(2024, 1, 31)));
        assert!(!range.contains(day(2024, 2, 1)));
    }

    #[test]
    fn test_single_day_range() {
        let range = DateRange::new(day(2024, 3, 5), day(2024, 3, 5)).unwrap();
        assert_eq!(range.days(), 1);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = DateRange::new(day(2024, 2, 1), day(2024, 1, 1)).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRange { .. }));
    }
}
