//! Value-table persistence: the Q table, visit counts, and epsilon are
//! written as one JSON document headed by the board configuration, so a
//! table trained under one geometry can never be silently loaded into
//! another. Saves go through a temporary file and an atomic rename.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ai::qlearning::QLearningAgent;
use crate::ai::state_encoding::{decode_board, StateKey};
use crate::error::CheckpointError;
use crate::game::Rules;

/// One state's row in the serialized table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TableEntry {
    key: StateKey,
    actions: HashMap<usize, f64>,
    visits: u64,
}

/// On-disk representation of an agent's learned state.
#[derive(Debug, Serialize, Deserialize)]
struct ValueTableFile {
    width: usize,
    height: usize,
    streak: usize,
    epsilon: f64,
    entries: Vec<TableEntry>,
}

/// Save an agent's value table, visit counts, and epsilon to `path`.
pub fn save_value_table(agent: &QLearningAgent, rules: Rules, path: &Path) -> Result<(), CheckpointError> {
    let (q, visits) = agent.table();
    let entries: Vec<TableEntry> = q
        .iter()
        .map(|(key, actions)| TableEntry {
            key: key.clone(),
            actions: actions.clone(),
            visits: visits.get(key).copied().unwrap_or(0),
        })
        .collect();

    let file = ValueTableFile {
        width: rules.width,
        height: rules.height,
        streak: rules.streak,
        epsilon: agent.epsilon(),
        entries,
    };

    let json = serde_json::to_string(&file)?;
    let tmp_path = path.with_extension("tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Load a value table into an agent, rejecting any file whose recorded
/// board configuration disagrees with `rules`. The load is all-or-nothing:
/// on any error the agent is left untouched.
pub fn load_value_table(
    agent: &mut QLearningAgent,
    rules: Rules,
    path: &Path,
) -> Result<(), CheckpointError> {
    let json = fs::read_to_string(path)?;
    let file: ValueTableFile = serde_json::from_str(&json)?;

    if file.width != rules.width || file.height != rules.height || file.streak != rules.streak {
        return Err(CheckpointError::StateKeyMismatch {
            path: path.to_path_buf(),
            expected_width: rules.width,
            expected_height: rules.height,
            expected_streak: rules.streak,
            found_width: file.width,
            found_height: file.height,
            found_streak: file.streak,
        });
    }

    let mut q = HashMap::with_capacity(file.entries.len());
    let mut visits = HashMap::with_capacity(file.entries.len());
    for entry in file.entries {
        // Every stored key must decode under the running configuration.
        decode_board(&entry.key, rules.width, rules.height)?;
        // Unvisited states carry no visits entry in a live agent; keep the
        // restored maps identical to the saved ones.
        if entry.visits > 0 {
            visits.insert(entry.key.clone(), entry.visits);
        }
        q.insert(entry.key, entry.actions);
    }

    agent.restore_table(q, visits, file.epsilon);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::qlearning::QConfig;
    use crate::ai::Agent;
    use crate::game::{GameOutcome, GameState, Side};

    fn rules() -> Rules {
        Rules::new(3, 3, 3)
    }

    fn trained_agent() -> QLearningAgent {
        let config = QConfig {
            batch_size: 8,
            ..QConfig::default()
        };
        let mut agent = QLearningAgent::with_seed(Side::X, rules(), config, 21);
        let mut state = GameState::initial(rules());
        while !agent.is_updatable() {
            if state.is_terminal() {
                state = GameState::initial(rules());
            }
            let action = agent.select_action(&state, true);
            let next = state.apply_move(action).unwrap();
            let winner = match next.outcome() {
                Some(GameOutcome::Winner(w)) => Some(w),
                _ => None,
            };
            agent.observe(&next, next.is_terminal(), winner);
            state = next;
        }
        agent.update().unwrap();
        agent
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");

        let agent = trained_agent();
        assert!(agent.states_seen() > 0);
        save_value_table(&agent, rules(), &path).unwrap();

        let mut restored = QLearningAgent::with_seed(Side::X, rules(), QConfig::default(), 5);
        load_value_table(&mut restored, rules(), &path).unwrap();

        assert_eq!(restored.states_seen(), agent.states_seen());
        assert!((restored.epsilon() - agent.epsilon()).abs() < 1e-12);
        let (orig_q, orig_visits) = agent.table();
        let (new_q, new_visits) = restored.table();
        assert_eq!(orig_q, new_q);
        assert_eq!(orig_visits, new_visits);
    }

    #[test]
    fn test_load_rejects_mismatched_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");

        let agent = trained_agent();
        save_value_table(&agent, rules(), &path).unwrap();

        let other_rules = Rules::new(7, 6, 4);
        let mut target = QLearningAgent::with_seed(Side::X, other_rules, QConfig::default(), 5);
        let err = load_value_table(&mut target, other_rules, &path).unwrap_err();
        assert!(matches!(err, CheckpointError::StateKeyMismatch { .. }));
        // Nothing was loaded.
        assert_eq!(target.states_seen(), 0);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = QLearningAgent::with_seed(Side::X, rules(), QConfig::default(), 5);
        let err = load_value_table(&mut agent, rules(), &dir.path().join("absent.json"));
        assert!(matches!(err, Err(CheckpointError::Io(_))));
    }

    #[test]
    fn test_save_leaves_no_tmp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");
        save_value_table(&trained_agent(), rules(), &path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
