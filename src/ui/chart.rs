// ============================================================================
// Chart - Courbe de prix et vue prix/volume
// ============================================================================
// Deux rendus à partir de la même table agrégée :
// - Courbe des clôtures (Chart ratatui, axe X en temps réel)
// - Vue combinée : courbe de prix en haut, volumes en barres en bas,
//   sur le même axe temporel
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne
// 2. Dataset : série de points (x, y)
// 3. Sparkline : barres verticales compactes pour le volume
// ============================================================================

use chrono::DateTime;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Sparkline},
    Frame,
};

use crate::handler::DashboardView;
use crate::models::{Granularity, OhlcvTable};
use crate::ui::format;

/// Nombre maximum de points envoyés au widget Chart
/// (un terminal n'affiche de toute façon que quelques centaines de colonnes)
const MAX_POINTS: usize = 2_000;

const PRICE_COLOR: Color = Color::Rgb(31, 119, 180);
const VOLUME_COLOR: Color = Color::Rgb(173, 181, 189);

// ============================================================================
// Préparation des données
// ============================================================================

/// Convertit la table en points (timestamp, close), NaN exclus
///
/// CONCEPT : Sous-échantillonnage par pas fixe
/// - Au-delà de max_points, on garde une ligne sur `step`
/// - La dernière ligne est toujours conservée (prix le plus récent)
pub fn close_points(table: &OhlcvTable, max_points: usize) -> Vec<(f64, f64)> {
    let points: Vec<(f64, f64)> = table
        .iter()
        .filter(|r| !r.close.is_nan())
        .map(|r| (r.timestamp() as f64, r.close))
        .collect();

    if points.len() <= max_points || max_points < 2 {
        return points;
    }

    let step = points.len().div_ceil(max_points - 1);
    let mut sampled: Vec<(f64, f64)> = points.iter().step_by(step).copied().collect();
    if let (Some(&last), Some(&kept)) = (points.last(), sampled.last()) {
        if kept != last {
            sampled.push(last);
        }
    }
    sampled
}

/// Répartit les volumes sur `columns` colonnes de même durée (somme par colonne)
///
/// CONCEPT : Axe temporel commun avec la courbe
/// - La colonne d'une ligne dépend de son timestamp dans `bounds`, pas de son rang
/// - Un trou dans les données laisse des colonnes à zéro au bon endroit
/// - Les lignes hors de `bounds` sont ramenées sur la première/dernière colonne
pub fn volume_columns(table: &OhlcvTable, bounds: [f64; 2], columns: usize) -> Vec<f64> {
    if table.is_empty() || columns == 0 {
        return Vec::new();
    }

    let [start, end] = bounds;
    let span = end - start;
    let last = columns - 1;
    let mut sums = vec![0.0; columns];

    for row in table.iter().filter(|r| !r.volume.is_nan()) {
        let index = if span > 0.0 {
            let position = (row.timestamp() as f64 - start) / span * columns as f64;
            (position.max(0.0) as usize).min(last)
        } else {
            0
        };
        sums[index] += row.volume;
    }
    sums
}

/// Bornes [min, max] des y avec une marge de 5%
fn y_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let (min, max) = points
        .iter()
        .fold((f64::MAX, f64::MIN), |(min, max), &(_x, y)| (min.min(y), max.max(y)));

    // Série plate : on ouvre artificiellement la fenêtre
    let margin = if max > min { (max - min) * 0.05 } else { min.abs() * 0.01 + 1.0 };
    [(min - margin).max(0.0), max + margin]
}

/// Bornes des x ; une série d'un seul point reçoit une largeur minimale
fn x_bounds(points: &[(f64, f64)]) -> [f64; 2] {
    let first = points.first().map(|p| p.0).unwrap_or(0.0);
    let last = points.last().map(|p| p.0).unwrap_or(first);
    if last > first {
        [first, last]
    } else {
        [first - 60.0, first + 60.0]
    }
}

/// Label de date selon la granularité
fn time_label(timestamp: f64, granularity: Granularity) -> String {
    let format = if granularity.is_intraday() {
        "%d/%m/%y %H:%M"
    } else {
        "%d/%m/%Y"
    };
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|d| d.format(format).to_string())
        .unwrap_or_default()
}

fn x_axis<'a>(bounds: [f64; 2], granularity: Granularity) -> Axis<'a> {
    Axis::default()
        .title("Date")
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![
            Span::raw(time_label(bounds[0], granularity)),
            Span::raw(time_label((bounds[0] + bounds[1]) / 2.0, granularity)),
            Span::raw(time_label(bounds[1], granularity)),
        ])
}

fn y_axis<'a>(bounds: [f64; 2]) -> Axis<'a> {
    Axis::default()
        .title("Prix (USD)")
        .style(Style::default().fg(Color::Gray))
        .bounds(bounds)
        .labels(vec![
            Span::raw(format::usd(bounds[0])),
            Span::raw(format::usd((bounds[0] + bounds[1]) / 2.0)),
            Span::raw(format::usd(bounds[1])),
        ])
}

// ============================================================================
// Courbe de prix
// ============================================================================

/// Dessine la courbe des clôtures
pub fn render_price_chart(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let points = close_points(&view.table, MAX_POINTS);
    if points.is_empty() {
        render_no_data(frame, area, "Pas de données à afficher");
        return;
    }

    let datasets = vec![Dataset::default()
        .name("Clôture")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(PRICE_COLOR))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(
                    " BTC-USD - courbe de prix ({}) ",
                    view.granularity.description()
                )),
        )
        .x_axis(x_axis(x_bounds(&points), view.granularity))
        .y_axis(y_axis(y_bounds(&points)));

    frame.render_widget(chart, area);
}

// ============================================================================
// Vue prix / volume
// ============================================================================

/// Dessine la vue combinée prix + volume
///
/// CONCEPT : Axe temporel partagé
/// - Les deux zones couvrent la même période, de gauche à droite
/// - Les volumes sont agrégés selon la même granularité que les prix
pub fn render_price_volume_chart(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(" Prix et volume agrégés ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(inner)
        .to_vec();

    let points = close_points(&view.table, MAX_POINTS);
    if points.is_empty() {
        render_no_data(frame, inner, "Pas de données à afficher");
        return;
    }

    let datasets = vec![Dataset::default()
        .name("Clôture")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Rgb(13, 110, 253)))
        .data(&points)];

    let price = Chart::new(datasets)
        .x_axis(x_axis(x_bounds(&points), view.granularity))
        .y_axis(y_axis(y_bounds(&points)));
    frame.render_widget(price, chunks[0]);

    // Les barres du Sparkline sont des u64 relatives au maximum :
    // on garde deux décimales de BTC en multipliant par 100
    let volume_area = chunks[1];
    let volumes = volume_columns(
        &view.table,
        x_bounds(&points),
        volume_area.width.saturating_sub(2) as usize,
    );
    let bars: Vec<u64> = volumes.iter().map(|v| (v * 100.0).round() as u64).collect();
    let peak = volumes.iter().copied().fold(0.0, f64::max);

    let sparkline = Sparkline::default()
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(format!(" Volume (BTC) - max {} ", format::thousands(peak, 0))),
        )
        .data(&bars)
        .style(Style::default().fg(VOLUME_COLOR));
    frame.render_widget(sparkline, volume_area);
}

// ============================================================================
// Helper : Message quand pas de données
// ============================================================================

/// Affiche un message quand il n'y a rien à dessiner
pub fn render_no_data(frame: &mut Frame, area: Rect, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OHLCV;
    use chrono::{TimeZone, Utc};

    fn table(count: usize) -> OhlcvTable {
        let rows = (0..count)
            .map(|i| {
                let date = Utc.timestamp_opt(i as i64 * 60, 0).unwrap();
                OHLCV::new(date, 1.0, 1.0, 1.0, i as f64, 1.0)
            })
            .collect();
        OhlcvTable::from_rows(rows)
    }

    #[test]
    fn test_close_points_small_table_untouched() {
        let points = close_points(&table(10), 100);
        assert_eq!(points.len(), 10);
        assert_eq!(points[3], (180.0, 3.0));
    }

    #[test]
    fn test_close_points_downsampled_keeps_last() {
        let points = close_points(&table(10_000), 500);
        assert!(points.len() <= 501);
        assert_eq!(points.first().unwrap().1, 0.0);
        assert_eq!(points.last().unwrap().1, 9_999.0);
    }

    #[test]
    fn test_volume_columns_conserve_total() {
        let t = table(1_000);
        let columns = volume_columns(&t, [0.0, 999.0 * 60.0], 37);
        assert_eq!(columns.len(), 37);
        assert_eq!(columns.iter().sum::<f64>(), 1_000.0);

        assert!(volume_columns(&OhlcvTable::new(), [0.0, 60.0], 10).is_empty());
        assert!(volume_columns(&t, [0.0, 60.0], 0).is_empty());
    }

    #[test]
    fn test_volume_columns_follow_time_with_gaps() {
        // 10 minutes au début, 10 minutes à la fin, rien entre les deux
        let rows = (0..10)
            .chain(90..100)
            .map(|i| {
                let date = Utc.timestamp_opt(i * 60, 0).unwrap();
                OHLCV::new(date, 1.0, 1.0, 1.0, 1.0, 1.0)
            })
            .collect();
        let t = OhlcvTable::from_rows(rows);

        let columns = volume_columns(&t, [0.0, 99.0 * 60.0], 10);
        assert_eq!(columns.len(), 10);
        assert_eq!(columns[0], 10.0);
        assert_eq!(columns[9], 10.0);
        assert!(columns[1..9].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_bounds_for_flat_series() {
        let [low, high] = y_bounds(&[(0.0, 100.0), (60.0, 100.0)]);
        assert!(low < 100.0 && high > 100.0);

        let [left, right] = x_bounds(&[(120.0, 1.0)]);
        assert!(left < 120.0 && right > 120.0);
    }
}
