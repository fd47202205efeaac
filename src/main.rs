// ============================================================================
// BtcDash - Dashboard Bitcoin dans le terminal
// ============================================================================
// Lit l'historique minute BTC-USD depuis un CSV local et affiche :
// - la courbe de prix sur une période choisie
// - une vue prix/volume agrégée selon la granularité choisie
// - des indicateurs et des statistiques descriptives
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Ownership : App et DashboardHandler empruntés en &mut par la boucle
// 4. Restauration du terminal même en cas d'erreur
// ============================================================================

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use btcdash::app::{App, LARGE_STEP_DAYS, SMALL_STEP_DAYS};
use btcdash::config::{DashboardConfig, CONFIG_FILE};
use btcdash::data::DataCache;
use btcdash::handler::DashboardHandler;
use btcdash::ui::{events::EventHandler, render, Event};

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// CONCEPT RUST : Tracing subscriber
/// - Registry : point central des logs
/// - Layer : transforme et route les logs
/// - EnvFilter : filtre par niveau (RUST_LOG env var)
/// - RollingFileAppender : rotation automatique
///
/// Par défaut les logs vont dans le répertoire de données local :
/// - Linux/WSL : ~/.local/share/btcdash/logs/btcdash.log
/// - macOS : ~/Library/Application Support/btcdash/logs/btcdash.log
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/btcdash/logs/btcdash.log
/// RUST_LOG=btcdash=trace cargo run
/// ```
fn init_logging(log_dir: &Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "btcdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour btcdash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "btcdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // La configuration d'abord : elle fixe le répertoire de logs
    let config = DashboardConfig::load(Path::new(CONFIG_FILE))?;

    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(
        data_path = %config.data_path.display(),
        granularity = config.default_granularity.label(),
        cache_policy = ?config.cache_policy,
        "BtcDash starting up"
    );

    let data_path: PathBuf = config.data_path.clone();
    let mut handler = DashboardHandler::new(data_path.clone(), DataCache::new(config.cache_policy));
    let mut app = App::new(config.default_granularity, data_path);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &mut handler, &events);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!(loads = handler.cache().load_count(), "Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// CONCEPT : Render → Input → Update
// - Le pipeline ne tourne que si la sélection a changé (needs_refresh)
// - Tout est synchrone : le CSV est mis en cache après la première lecture
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    handler: &mut DashboardHandler,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        if app.needs_refresh {
            app.refresh(handler);
        }

        terminal.draw(|frame| render(frame, app))?;

        let event = events.next()?;
        handle_event(app, event, handler);
    }

    Ok(())
}

/// Traduit un événement clavier en action sur App
fn handle_event(app: &mut App, event: Event, handler: &mut DashboardHandler) {
    use btcdash::ui::events::{
        granularity_shortcut, is_decrease_event, is_escape_event, is_focus_next_event,
        is_focus_previous_event, is_increase_event, is_large_decrease_event,
        is_large_increase_event, is_quit_event, is_reload_event, is_reset_event, is_stats_event,
    };

    if let Event::Tick = event {
        return;
    }

    // Touche 'q' : quit confirmation two-step
    // - Première pression : active confirm_quit
    // - Deuxième pression : quit réel
    if is_quit_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la demande de quit
    if app.is_awaiting_quit_confirmation() {
        debug!("Quit cancelled");
        app.cancel_quit();
        return;
    }

    if is_escape_event(&event) {
        // Rien à fermer : Échap sert seulement à annuler le quit
    } else if is_focus_next_event(&event) {
        app.focus_next();
    } else if is_focus_previous_event(&event) {
        app.focus_previous();
    } else if is_increase_event(&event) {
        app.adjust(SMALL_STEP_DAYS);
    } else if is_decrease_event(&event) {
        app.adjust(-SMALL_STEP_DAYS);
    } else if is_large_increase_event(&event) {
        app.adjust(LARGE_STEP_DAYS);
    } else if is_large_decrease_event(&event) {
        app.adjust(-LARGE_STEP_DAYS);
    } else if is_reset_event(&event) {
        app.reset_dates();
    } else if is_stats_event(&event) {
        app.toggle_stats();
    } else if is_reload_event(&event) {
        let evicted = handler.refresh();
        info!(evicted, "User requested reload");
        app.request_reload();
    } else if let Some(granularity) = granularity_shortcut(&event) {
        debug!(granularity = granularity.label(), "Granularity shortcut");
        app.set_granularity(granularity);
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Passe le terminal en mode TUI (raw mode + écran alternatif)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    // Écran secondaire : l'écran précédent est restauré à la sortie
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
