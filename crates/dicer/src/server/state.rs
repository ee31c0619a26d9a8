//! Shared application state injected into every Axum handler.

use crate::dice::Dice;

/// Application state shared across all request handlers.
///
/// Cheaply cloneable: the die is `Arc`-backed, so every clone rolls from the
/// same generator.
#[derive(Clone)]
pub struct AppState {
    /// Process-wide random source for `/rolldice`.
    pub dice: Dice,
}

impl AppState {
    pub fn new(dice: Dice) -> Self {
        Self { dice }
    }
}

impl Default for AppState {
    /// Creates an [`AppState`] with a clock-seeded die.
    fn default() -> Self {
        Self::new(Dice::seeded_from_clock())
    }
}
