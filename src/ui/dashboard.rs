// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine l'écran unique du dashboard :
//
//   ┌ header ────────────────────────────────────────────┐
//   │ filtres    │ courbe de prix                        │
//   │ (sidebar)  │ indicateurs (3 colonnes)              │
//   │            │ prix/volume  | statistiques           │
//   ├ notification ──────────────────────────────────────┤
//   └ footer (raccourcis) ───────────────────────────────┘
//
// CONCEPTS RATATUI :
// 1. Layout : découpage de l'espace en zones
// 2. Widgets : Block, Paragraph, Table
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::app::{App, Control};
use crate::error::Severity;
use crate::handler::DashboardView;
use crate::ui::{chart, format};

/// Largeur de la barre latérale des filtres
const SIDEBAR_WIDTH: u16 = 32;

/// Dessine l'interface complète
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Sidebar + contenu
            Constraint::Length(3), // Notification
            Constraint::Length(3), // Footer
        ])
        .split(frame.size())
        .to_vec();

    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(chunks[1])
        .to_vec();

    render_sidebar(frame, app, body[0]);
    render_main_content(frame, app, body[1]);
    render_notice(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" 📈 Dashboard Bitcoin ")
        .title_alignment(Alignment::Center);

    let text = vec![Line::from(vec![
        Span::styled(
            "Courbe de prix interactive et vue prix/volume avec filtres temporels",
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  [{}]", app.data_path.display()),
            Style::default().fg(Color::DarkGray),
        ),
    ])];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

// ============================================================================
// Sidebar : filtres temporels
// ============================================================================

/// Dessine les filtres et les informations sur le dataset
fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Filtres temporels ");

    let date_text = |date: Option<chrono::NaiveDate>| {
        date.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "--".to_string())
    };

    let mut lines = vec![
        Line::from(""),
        control_line(app, Control::StartDate, "Date de début", date_text(app.start_date)),
        control_line(app, Control::EndDate, "Date de fin", date_text(app.end_date)),
        control_line(
            app,
            Control::Granularity,
            "Granularité",
            app.granularity.description().to_string(),
        ),
        Line::from(""),
    ];

    // Informations sur le dataset
    if let Some((min, max)) = app.bounds {
        lines.push(Line::from(Span::styled(
            "Dataset",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(info_line("Du", min.format("%Y-%m-%d").to_string()));
        lines.push(info_line("Au", max.format("%Y-%m-%d").to_string()));
    }

    if let Some(view) = &app.view {
        lines.push(info_line("Lignes lues", format::thousands(view.report.total_rows as f64, 0)));
        lines.push(info_line("Ignorées", format::thousands(view.report.dropped_rows as f64, 0)));
        lines.push(info_line("Retenues", format::thousands(view.report.kept_rows() as f64, 0)));
        lines.push(info_line("Sélection", format::thousands(view.selected_rows as f64, 0)));
        lines.push(info_line("Points", format::thousands(view.table.len() as f64, 0)));
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}

/// Une ligne de contrôle ; le contrôle actif est en vidéo inverse
fn control_line<'a>(app: &App, control: Control, label: &'a str, value: String) -> Line<'a> {
    let focused = app.focus == control;
    let marker = if focused { "▶ " } else { "  " };
    let value_style = if focused {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
            .add_modifier(Modifier::REVERSED)
    } else {
        Style::default().fg(Color::White)
    };

    Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::raw(format!("{:<14}", label)),
        Span::styled(format!(" {} ", value), value_style),
    ])
}

fn info_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", label), Style::default().fg(Color::Gray)),
        Span::raw(value),
    ])
}

// ============================================================================
// Contenu principal
// ============================================================================

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // Pas de vue : rien à dessiner, le message est dans la notification
    let view = match &app.view {
        Some(view) => view,
        None => {
            let message = if app.notice.is_some() {
                "Aucun graphique pour cette sélection"
            } else {
                "Chargement..."
            };
            chart::render_no_data(frame, area, message);
            return;
        }
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Courbe de prix
            Constraint::Length(4),      // Indicateurs
            Constraint::Min(0),         // Prix / volume (+ statistiques)
        ])
        .split(area)
        .to_vec();

    chart::render_price_chart(frame, view, chunks[0]);
    render_metrics(frame, view, chunks[1]);

    if app.show_stats {
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2])
            .to_vec();
        chart::render_price_volume_chart(frame, view, bottom[0]);
        render_stats(frame, view, bottom[1]);
    } else {
        chart::render_price_volume_chart(frame, view, chunks[2]);
    }
}

/// Trois indicateurs côte à côte
fn render_metrics(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area)
        .to_vec();

    let metrics = &view.metrics;
    let change_color = if metrics.is_positive() {
        Color::Green
    } else {
        Color::Red
    };

    let latest = Line::from(vec![
        Span::styled(
            format::usd(metrics.latest_close),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} vs précéd.", format::change(metrics.change_pct)),
            Style::default().fg(change_color),
        ),
    ]);
    let range = Line::from(Span::styled(
        format!("{} / {}", format::usd(metrics.min_close), format::usd(metrics.max_close)),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    let volume = Line::from(Span::styled(
        format!("{} BTC", format::thousands(metrics.total_volume, 0)),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));

    let cards = [
        (" Clôture la plus récente ", latest),
        (" Clôture min / max ", range),
        (" Volume total ", volume),
    ];

    for ((title, line), column) in cards.into_iter().zip(columns) {
        let paragraph = Paragraph::new(vec![line])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(title),
            )
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, column);
    }
}

/// Tableau des statistiques descriptives (une ligne par colonne OHLCV)
fn render_stats(frame: &mut Frame, view: &DashboardView, area: Rect) {
    let header = Row::new(
        ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .into_iter()
            .map(Cell::from),
    )
    .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

    let rows: Vec<Row> = view
        .stats
        .iter()
        .map(|s| {
            Row::new(vec![
                Cell::from(s.column),
                Cell::from(s.count.to_string()),
                Cell::from(format::thousands(s.mean, 2)),
                Cell::from(format::thousands(s.std, 2)),
                Cell::from(format::thousands(s.min, 2)),
                Cell::from(format::thousands(s.p25, 2)),
                Cell::from(format::thousands(s.p50, 2)),
                Cell::from(format::thousands(s.p75, 2)),
                Cell::from(format::thousands(s.max, 2)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
        Constraint::Min(8),
    ];

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Statistiques descriptives "),
    );

    frame.render_widget(table, area);
}

// ============================================================================
// Notification et footer
// ============================================================================

/// Dessine le message courant (avertissement en jaune, erreur en rouge)
fn render_notice(frame: &mut Frame, app: &App, area: Rect) {
    let (color, text) = match &app.notice {
        Some(notice) => {
            let color = match notice.severity {
                Severity::Warning => Color::Yellow,
                Severity::Error => Color::Red,
            };
            (color, format!("⚠  {}", notice.message))
        }
        None => match &app.view {
            Some(view) => (
                Color::Gray,
                format!(
                    "{} → {} ({} j) · {} · volumes agrégés selon la même granularité que la courbe",
                    view.range.start(),
                    view.range.end(),
                    view.range.days(),
                    view.granularity.description()
                ),
            ),
            None => (Color::Gray, String::new()),
        },
    };

    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    );

    frame.render_widget(paragraph, area);
}

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let key = |k: &'static str| {
        Span::styled(k, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    };

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled(
                "⚠  Appuyez sur ",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        Line::from(vec![
            key("[q]"),
            Span::raw(" Quit  "),
            key("[Tab / ↑↓]"),
            Span::raw(" Filtre  "),
            key("[←→ / h l]"),
            Span::raw(" ±1 j  "),
            key("[PgUp PgDn / H L]"),
            Span::raw(" ±30 j  "),
            key("[1-6]"),
            Span::raw(" Granularité  "),
            key("[Home]"),
            Span::raw(" Tout  "),
            key("[s]"),
            Span::raw(" Stats  "),
            key("[r]"),
            Span::raw(" Recharger"),
        ])
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DataCache;
    use crate::handler::DashboardHandler;
    use crate::models::Granularity;
    use ratatui::{backend::TestBackend, Terminal};
    use std::fs::File;
    use std::io::Write;

    /// Concatène le contenu du buffer pour y chercher du texte
    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_render_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut handler = DashboardHandler::new(dir.path().join("absent.csv"), DataCache::default());
        let mut app = App::new(Granularity::H4, handler.data_path().to_path_buf());
        app.refresh(&mut handler);

        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("introuvable"));
        assert!(text.contains("Filtres temporels"));
    }

    #[test]
    fn test_render_view_with_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("btc.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "Timestamp,Open,High,Low,Close,Volume").unwrap();
        for i in 0..3 * 1440 {
            let price = 42_000.0 + (i % 90) as f64;
            writeln!(file, "{},{},{},{},{},1.5", 1_704_067_200 + i * 60, price, price + 1.0, price - 1.0, price).unwrap();
        }

        let mut handler = DashboardHandler::new(path.clone(), DataCache::default());
        let mut app = App::new(Granularity::H1, path);
        app.refresh(&mut handler);
        app.toggle_stats();
        assert!(app.view.is_some());

        let mut terminal = Terminal::new(TestBackend::new(160, 50)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Volume total"));
        assert!(text.contains("Statistiques descriptives"));
        assert!(text.contains("Granularité"));
        assert!(text.contains("Retenues"));
        assert!(text.contains("(3 j)"));
    }
}
