// ============================================================================
// Tests d'intégration : CSV → filtre → agrégation → indicateurs
// ============================================================================

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use btcdash::analysis::{filter, resample, summarize};
use btcdash::data::{load, CachePolicy, DataCache};
use btcdash::error::{DashboardError, DataError, SelectionStage};
use btcdash::handler::{DashboardHandler, DashboardRequest};
use btcdash::models::{DateRange, Granularity};
use chrono::NaiveDate;

/// 2024-01-01T00:00:00Z
const JAN_1: i64 = 1_704_067_200;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Écrit un CSV au format Kaggle : `minutes` lignes à partir de JAN_1
fn write_minutes(dir: &Path, minutes: i64) -> PathBuf {
    let path = dir.join("btcusd_1-min_data.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "Timestamp,Open,High,Low,Close,Volume").unwrap();
    for i in 0..minutes {
        let price = 40_000.0 + i as f64;
        writeln!(
            file,
            "{}.0,{},{},{},{},0.5",
            JAN_1 + i * 60,
            price,
            price + 2.0,
            price - 2.0,
            price + 1.0
        )
        .unwrap();
    }
    path
}

#[test]
fn missing_dataset_is_reported_not_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");

    assert!(matches!(load(&path), Err(DataError::NotFound(_))));

    let mut handler = DashboardHandler::new(path, DataCache::default());
    let request = DashboardRequest {
        start: day(2024, 1, 1),
        end: day(2024, 1, 2),
        granularity: Granularity::H4,
    };
    assert!(matches!(handler.handle(&request), Err(DashboardError::NotFound(_))));
}

#[test]
fn three_minutes_aggregate_into_one_five_minute_bar() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("small.csv");
    let mut file = File::create(&path).unwrap();
    writeln!(file, "Timestamp,Open,High,Low,Close,Volume").unwrap();
    writeln!(file, "{},100,101,99,100,1", JAN_1).unwrap();
    writeln!(file, "{},100,106,100,105,2", JAN_1 + 60).unwrap();
    writeln!(file, "{},105,105,94,95,3", JAN_1 + 120).unwrap();

    let dataset = load(&path).unwrap();
    let range = DateRange::new(day(2024, 1, 1), day(2024, 1, 1)).unwrap();
    let selected = filter(&dataset.table, &range);
    let bars = resample(&selected, Granularity::M5);

    assert_eq!(bars.len(), 1);
    let bar = bars.rows()[0];
    assert_eq!(bar.timestamp(), JAN_1);
    assert_eq!((bar.open, bar.high, bar.low, bar.close), (100.0, 106.0, 94.0, 95.0));
    assert_eq!(bar.volume, 6.0);

    let metrics = summarize(&selected).unwrap();
    assert_eq!(metrics.latest_close, 95.0);
    assert!((metrics.change_pct - (95.0 / 105.0 - 1.0) * 100.0).abs() < 1e-9);
    assert_eq!(metrics.min_close, 95.0);
    assert_eq!(metrics.max_close, 105.0);
}

#[test]
fn every_granularity_conserves_volume() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_minutes(dir.path(), 3 * 1440);
    let dataset = load(&path).unwrap();
    let total: f64 = dataset.table.iter().map(|r| r.volume).sum();

    for granularity in Granularity::all() {
        let bars = resample(&dataset.table, granularity);
        let volume: f64 = bars.iter().map(|r| r.volume).sum();
        assert!((volume - total).abs() < 1e-6, "{:?}", granularity);
        assert!(bars.rows().windows(2).all(|w| w[0].date < w[1].date));
    }

    assert_eq!(resample(&dataset.table, Granularity::D1).len(), 3);
    assert_eq!(resample(&dataset.table, Granularity::H4).len(), 18);
}

#[test]
fn end_day_is_included_in_full() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_minutes(dir.path(), 3 * 1440);
    let dataset = load(&path).unwrap();

    let range = DateRange::new(day(2024, 1, 2), day(2024, 1, 2)).unwrap();
    let selected = filter(&dataset.table, &range);
    assert_eq!(selected.len(), 1440);
    assert_eq!(selected.first().unwrap().day(), day(2024, 1, 2));
    assert_eq!(selected.last().unwrap().day(), day(2024, 1, 2));
}

#[test]
fn handler_reports_each_failure_stage() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_minutes(dir.path(), 1440);
    let mut handler = DashboardHandler::new(path, DataCache::new(CachePolicy::Manual));

    let reversed = DashboardRequest {
        start: day(2024, 1, 2),
        end: day(2024, 1, 1),
        granularity: Granularity::H1,
    };
    assert!(matches!(
        handler.handle(&reversed),
        Err(DashboardError::InvalidRange { .. })
    ));

    let outside = DashboardRequest {
        start: day(2023, 6, 1),
        end: day(2023, 6, 30),
        granularity: Granularity::H1,
    };
    assert!(matches!(
        handler.handle(&outside),
        Err(DashboardError::EmptySelection(SelectionStage::Period))
    ));

    let valid = DashboardRequest {
        start: day(2024, 1, 1),
        end: day(2024, 1, 1),
        granularity: Granularity::H1,
    };
    let view = handler.handle(&valid).unwrap();
    assert_eq!(view.selected_rows, 1440);
    assert_eq!(view.table.len(), 24);
    assert_eq!(view.stats.len(), 5);

    // Un seul chargement du fichier pour les trois requêtes
    assert_eq!(handler.cache().load_count(), 1);
}
