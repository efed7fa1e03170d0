use bevy::prelude::*;

use crate::constants::color_from_hex;
use crate::shared::connection::ConnectionState;

use crate::game::core::Settings;

use super::types::{
    connection_color, final_score_line, players_line, rules_text, status_line, HudConnectionDot,
    HudConnectionGlow, HudFinalScoreText, HudGameOverOverlay, HudPlayersText, HudRulesPanel,
    HudStatusText, CONTROL_HINTS, HINTS_BOTTOM, OVERLAY_ALPHA, PLAYERS_TOP, STATUS_LEFT,
    STATUS_TOP, UI_DIM, UI_TEXT,
};

pub(super) fn spawn_hud(mut commands: Commands, settings: Res<Settings>) {
    let small = TextFont::from_font_size(12.0);
    let medium = TextFont::from_font_size(18.0);
    let large = TextFont::from_font_size(48.0);
    let connecting = connection_color(ConnectionState::Connecting, false);

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(17.0),
            top: Val::Px(STATUS_TOP + 4.0),
            width: Val::Px(16.0),
            height: Val::Px(16.0),
            ..default()
        },
        BackgroundColor(connecting.with_alpha(0.45)),
        BorderRadius::MAX,
        HudConnectionGlow,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            top: Val::Px(STATUS_TOP + 7.0),
            width: Val::Px(10.0),
            height: Val::Px(10.0),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
        BackgroundColor(connecting),
        BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.6)),
        BorderRadius::MAX,
        HudConnectionDot,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(STATUS_LEFT),
            top: Val::Px(STATUS_TOP),
            ..default()
        },
        Text::new(status_line(0, 0)),
        medium.clone(),
        TextColor(color_from_hex(UI_TEXT)),
        HudStatusText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(16.0),
            top: Val::Px(PLAYERS_TOP),
            ..default()
        },
        Text::new(players_line(0)),
        small.clone(),
        TextColor(color_from_hex(UI_DIM)),
        HudPlayersText,
    ));

    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(16.0),
            bottom: Val::Px(HINTS_BOTTOM),
            ..default()
        },
        Text::new(CONTROL_HINTS),
        small.clone(),
        TextColor(color_from_hex(UI_DIM)),
    ));

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                top: Val::Px(STATUS_TOP + 36.0),
                flex_direction: FlexDirection::Column,
                border: UiRect::all(Val::Px(1.0)),
                padding: UiRect::axes(Val::Px(10.0), Val::Px(8.0)),
                row_gap: Val::Px(4.0),
                ..default()
            },
            BackgroundColor(Color::BLACK.with_alpha(OVERLAY_ALPHA)),
            BorderColor::all(Color::srgba(1.0, 1.0, 1.0, 0.3)),
            BorderRadius::all(Val::Px(6.0)),
            Visibility::Hidden,
            HudRulesPanel,
        ))
        .with_children(|panel| {
            panel.spawn((
                Text::new("Rules"),
                medium.clone(),
                TextColor(color_from_hex(UI_TEXT)),
            ));
            panel.spawn((
                Text::new(rules_text(&settings.0)),
                small,
                TextColor(color_from_hex(UI_TEXT)),
            ));
        });

    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                justify_content: JustifyContent::Center,
                align_items: AlignItems::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::BLACK.with_alpha(OVERLAY_ALPHA)),
            Visibility::Hidden,
            HudGameOverOverlay,
        ))
        .with_children(|overlay| {
            overlay.spawn((
                Text::new("Game Over"),
                large,
                TextColor(color_from_hex(UI_TEXT)),
            ));
            overlay.spawn((
                Text::new(final_score_line(0)),
                medium,
                TextColor(color_from_hex(UI_TEXT)),
                HudFinalScoreText,
            ));
        });
}
