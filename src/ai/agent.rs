use crate::game::{GameState, Side};

/// Universal interface for all agents, consumed by the game orchestration.
///
/// The round loop calls `select_action` for the side to move, applies the
/// move itself, and calls `observe` on learning agents once per transition
/// they caused (after the opponent's reply resolves, or at terminal).
pub trait Agent {
    /// Select an action (column) given the current game state. When
    /// `training` is true, the agent may explore; otherwise it exploits.
    fn select_action(&mut self, state: &GameState, training: bool) -> usize;

    /// Observe the state reached after this agent's last move resolved.
    /// `winner` is `None` both for non-terminal states and for draws.
    fn observe(&mut self, _next_state: &GameState, _terminal: bool, _winner: Option<Side>) {}

    /// Return the agent's display name.
    fn name(&self) -> &str;

    /// Reset per-game bookkeeping (e.g. cumulative shaped reward).
    fn reset(&mut self) {}
}
