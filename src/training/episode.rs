//! Game orchestration: sequences turns between two agents through the
//! move/observe contract and reports the outcome. An agent's observation
//! fires once per transition it caused — after the opponent's reply
//! resolves, or immediately at terminal.

use crate::ai::Agent;
use crate::error::TrainingError;
use crate::game::{GameOutcome, GameState, Rules, Side};

/// Outcome of one completed game.
#[derive(Debug, Clone)]
pub struct GameRecord {
    pub winner: Option<Side>,
    pub moves: usize,
}

fn side_index(side: Side) -> usize {
    match side {
        Side::X => 0,
        Side::O => 1,
    }
}

/// Play one game between two agents. `agent_x` moves first.
///
/// An illegal move aborts the round as a programming error; it is never
/// converted into a game outcome.
pub fn play_game(
    agent_x: &mut dyn Agent,
    agent_o: &mut dyn Agent,
    rules: Rules,
    training: bool,
) -> Result<GameRecord, TrainingError> {
    let mut state = GameState::initial(rules);
    let mut moves = 0;
    let mut has_moved = [false, false]; // [X, O]

    while !state.is_terminal() {
        let mover = state.current_side();
        let action = match mover {
            Side::X => agent_x.select_action(&state, training),
            Side::O => agent_o.select_action(&state, training),
        };

        let legal = state.legal_actions();
        let next = state
            .apply_move(action)
            .map_err(|_| TrainingError::IllegalAction { action, legal })?;
        moves += 1;
        has_moved[side_index(mover)] = true;

        let winner = match next.outcome() {
            Some(GameOutcome::Winner(w)) => Some(w),
            _ => None,
        };
        let terminal = next.is_terminal();

        // The opponent's previous move, if any, has now fully resolved.
        let opponent = mover.other();
        if has_moved[side_index(opponent)] {
            match opponent {
                Side::X => agent_x.observe(&next, terminal, winner),
                Side::O => agent_o.observe(&next, terminal, winner),
            }
        }
        // At terminal the mover's own transition also resolves here.
        if terminal {
            match mover {
                Side::X => agent_x.observe(&next, terminal, winner),
                Side::O => agent_o.observe(&next, terminal, winner),
            }
        }

        state = next;
    }

    let winner = match state.outcome() {
        Some(GameOutcome::Winner(w)) => Some(w),
        Some(GameOutcome::Draw) => None,
        None => return Err(TrainingError::MissingOutcome),
    };

    Ok(GameRecord { winner, moves })
}
