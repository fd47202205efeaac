// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching : reconnaître une touche et ses alias (Vim)
// 3. Error handling avec Result
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind};

use crate::models::Granularity;

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée pendant le délai de poll)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend au plus tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),

                // Resize, souris, Release... : un simple redraw suffit
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

/// Extrait le KeyCode d'un événement clavier
fn key_code(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) => Some(key.code),
        Event::Tick => None,
    }
}

/// Vérifie si l'événement est la touche 'q' (quitter)
pub fn is_quit_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Vérifie si l'événement est Échap
pub fn is_escape_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Esc))
}

/// Contrôle suivant : Tab, flèche bas ou 'j' (vim)
pub fn is_focus_next_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::Tab | KeyCode::Down | KeyCode::Char('j'))
    )
}

/// Contrôle précédent : Shift-Tab, flèche haut ou 'k' (vim)
pub fn is_focus_previous_event(event: &Event) -> bool {
    matches!(
        key_code(event),
        Some(KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k'))
    )
}

/// +1 jour / granularité suivante : flèche droite ou 'l'
pub fn is_increase_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Right | KeyCode::Char('l')))
}

/// -1 jour / granularité précédente : flèche gauche ou 'h'
pub fn is_decrease_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Left | KeyCode::Char('h')))
}

/// +30 jours : PageUp ou 'L'
pub fn is_large_increase_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageUp | KeyCode::Char('L')))
}

/// -30 jours : PageDown ou 'H'
pub fn is_large_decrease_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::PageDown | KeyCode::Char('H')))
}

/// Remet la période sur tout le dataset : Home ou End
pub fn is_reset_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Home | KeyCode::End))
}

/// Affiche/masque les statistiques : 's'
pub fn is_stats_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('s') | KeyCode::Char('S')))
}

/// Recharge le fichier : 'r'
pub fn is_reload_event(event: &Event) -> bool {
    matches!(key_code(event), Some(KeyCode::Char('r') | KeyCode::Char('R')))
}

/// Raccourci direct de granularité : touches 1 à 6
///
/// CONCEPT RUST : Option + to_digit
/// - '1' → Native ... '6' → D1, dans l'ordre de Granularity::all()
pub fn granularity_shortcut(event: &Event) -> Option<Granularity> {
    match key_code(event)? {
        KeyCode::Char(c) => {
            let index = c.to_digit(10)?.checked_sub(1)? as usize;
            Granularity::all().get(index).copied()
        }
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&key(KeyCode::Char('q'))));
        assert!(!is_quit_event(&key(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_adjust_keys() {
        assert!(is_increase_event(&key(KeyCode::Right)));
        assert!(is_decrease_event(&key(KeyCode::Char('h'))));
        assert!(is_large_decrease_event(&key(KeyCode::Char('H'))));
        assert!(!is_decrease_event(&key(KeyCode::Char('H'))));
        assert!(is_focus_previous_event(&key(KeyCode::BackTab)));
    }

    #[test]
    fn test_granularity_shortcut() {
        assert_eq!(granularity_shortcut(&key(KeyCode::Char('1'))), Some(Granularity::Native));
        assert_eq!(granularity_shortcut(&key(KeyCode::Char('6'))), Some(Granularity::D1));
        assert_eq!(granularity_shortcut(&key(KeyCode::Char('0'))), None);
        assert_eq!(granularity_shortcut(&key(KeyCode::Char('7'))), None);
        assert_eq!(granularity_shortcut(&Event::Tick), None);
    }
}
