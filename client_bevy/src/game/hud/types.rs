use bevy::prelude::*;

use arena_shared::config::ArenaConfig;

use crate::constants::{color_from_hex, Colors};
use crate::shared::connection::ConnectionState;

pub(super) const STATUS_LEFT: f32 = 44.0;
pub(super) const STATUS_TOP: f32 = 24.0;
pub(super) const PLAYERS_TOP: f32 = 10.0;
pub(super) const HINTS_BOTTOM: f32 = 12.0;

pub(super) const UI_TEXT: u32 = 0xffffff;
pub(super) const UI_DIM: u32 = 0x888888;
pub(super) const OVERLAY_ALPHA: f32 = 0.7;

pub(super) const CONTROL_HINTS: &str =
    "WASD / Arrows to roll\nDrag to orbit, mouse wheel to zoom\nH for rules";

pub(super) const RULES_TOGGLE_KEYS: [KeyCode; 2] = [KeyCode::KeyH, KeyCode::F1];

#[derive(Resource, Default)]
pub(crate) struct HudUiState {
    pub(crate) rules_visible: bool,
}

#[derive(Component)]
pub(super) struct HudConnectionGlow;

#[derive(Component)]
pub(super) struct HudConnectionDot;

#[derive(Component)]
pub(super) struct HudStatusText;

#[derive(Component)]
pub(super) struct HudPlayersText;

#[derive(Component)]
pub(super) struct HudGameOverOverlay;

#[derive(Component)]
pub(super) struct HudFinalScoreText;

#[derive(Component)]
pub(super) struct HudRulesPanel;

pub(super) fn connection_color(state: ConnectionState, protocol_mismatch: bool) -> Color {
    if protocol_mismatch {
        return color_from_hex(Colors::STATUS_DISCONNECTED);
    }
    match state {
        ConnectionState::Connected => color_from_hex(Colors::STATUS_CONNECTED),
        ConnectionState::Connecting => color_from_hex(Colors::STATUS_CONNECTING),
        ConnectionState::Disconnected => color_from_hex(Colors::STATUS_DISCONNECTED),
    }
}

pub(super) fn status_line(score: u32, lives: u8) -> String {
    format!("Score: {} | Lives: {}", score, lives)
}

pub(super) fn players_line(others: usize) -> String {
    match others {
        0 => "Alone in the arena".to_string(),
        1 => "1 other player".to_string(),
        n => format!("{} other players", n),
    }
}

pub(super) fn final_score_line(score: u32) -> String {
    format!("Final Score: {}\nPress R to restart", score)
}

pub(super) fn rules_text(config: &ArenaConfig) -> String {
    format!(
        "Roll into the coin to collect it, +1 score each.\n\
         Every {} points another AI ball joins.\n\
         Touching an AI costs a life, then {}s of invincibility.\n\
         You start with {} lives. At zero the game is over, press R to restart.",
        config.points_per_ai, config.invincibility_duration, config.initial_lives
    )
}
