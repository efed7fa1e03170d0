use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::game::network::NetworkState;
use crate::game::sim::ArenaSim;
use crate::shared::connection::{ConnectionState, ServerConnection};

use super::types::{
    connection_color, final_score_line, players_line, status_line, HudConnectionDot,
    HudConnectionGlow, HudFinalScoreText, HudGameOverOverlay, HudPlayersText, HudRulesPanel,
    HudStatusText, HudUiState, RULES_TOGGLE_KEYS,
};

type ConnectionColorsSet<'w, 's> = ParamSet<
    'w,
    's,
    (
        Query<'w, 's, &'static mut BackgroundColor, With<HudConnectionGlow>>,
        Query<'w, 's, &'static mut BackgroundColor, With<HudConnectionDot>>,
    ),
>;

#[derive(SystemParam)]
pub(super) struct ConnectionUiQueries<'w, 's> {
    colors: ConnectionColorsSet<'w, 's>,
}

fn set_text(text: &mut Text, value: String) {
    if text.0 != value {
        text.0 = value;
    }
}

pub(super) fn update_connection_ui(
    conn: Res<ServerConnection>,
    net: Res<NetworkState>,
    mut queries: ConnectionUiQueries,
) {
    let color = connection_color(conn.state, net.protocol_mismatch);
    for mut glow in &mut queries.colors.p0() {
        glow.0 = color.with_alpha(0.45);
    }
    for mut dot in &mut queries.colors.p1() {
        dot.0 = color.with_alpha(1.0);
    }
}

pub(super) fn update_status_ui(
    arena: Option<Res<ArenaSim>>,
    mut q_text: Query<&mut Text, With<HudStatusText>>,
) {
    let Some(arena) = arena else {
        return;
    };
    let line = status_line(arena.sim.score(), arena.sim.lives().lives());
    for mut text in &mut q_text {
        set_text(&mut text, line.clone());
    }
}

pub(super) fn update_players_ui(
    conn: Res<ServerConnection>,
    net: Res<NetworkState>,
    mut q_text: Query<&mut Text, With<HudPlayersText>>,
) {
    let line = if net.protocol_mismatch {
        "Protocol mismatch, offline".to_string()
    } else if conn.state == ConnectionState::Connected {
        players_line(net.roster.len())
    } else {
        "Offline".to_string()
    };
    for mut text in &mut q_text {
        set_text(&mut text, line.clone());
    }
}

pub(super) fn update_game_over_ui(
    arena: Option<Res<ArenaSim>>,
    mut q_overlay: Query<&mut Visibility, With<HudGameOverOverlay>>,
    mut q_text: Query<&mut Text, With<HudFinalScoreText>>,
) {
    let game_over = arena.as_ref().is_some_and(|a| a.sim.is_game_over());
    let wanted = if game_over {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut q_overlay {
        if *visibility != wanted {
            *visibility = wanted;
        }
    }

    if let Some(arena) = arena.filter(|_| game_over) {
        for mut text in &mut q_text {
            set_text(&mut text, final_score_line(arena.sim.score()));
        }
    }
}

pub(super) fn toggle_rules_ui(keys: Res<ButtonInput<KeyCode>>, mut hud_ui: ResMut<HudUiState>) {
    if keys.any_just_pressed(RULES_TOGGLE_KEYS) {
        hud_ui.rules_visible = !hud_ui.rules_visible;
    }
}

pub(super) fn update_rules_panel_ui(
    hud_ui: Res<HudUiState>,
    mut q_panel: Query<&mut Visibility, With<HudRulesPanel>>,
) {
    let wanted = if hud_ui.rules_visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    };
    for mut visibility in &mut q_panel {
        if *visibility != wanted {
            *visibility = wanted;
        }
    }
}

#[cfg(test)]
mod tests {
    use arena_shared::config::ArenaConfig;
    use arena_shared::protocol::{BodyState, BootstrapMsg, ServerMsg, PROTOCOL_VERSION};
    use arena_shared::vec3::Vec3;
    use arena_sim::SeededSampler;

    use crate::constants::{color_from_hex, Colors};
    use crate::game::core::Settings;

    use super::*;

    fn assert_color_close(actual: Color, expected: Color) {
        let a = actual.to_srgba();
        let e = expected.to_srgba();
        let eps = 1e-4;
        assert!((a.red - e.red).abs() < eps, "red {} != {}", a.red, e.red);
        assert!(
            (a.green - e.green).abs() < eps,
            "green {} != {}",
            a.green,
            e.green
        );
        assert!(
            (a.blue - e.blue).abs() < eps,
            "blue {} != {}",
            a.blue,
            e.blue
        );
    }

    fn make_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        let (conn, _tx) = ServerConnection::test_stub_with_sender();
        app.insert_resource(conn);
        app.init_resource::<NetworkState>();
        app
    }

    fn text_of<M: Component>(app: &mut App) -> String {
        let mut q = app.world_mut().query_filtered::<&Text, With<M>>();
        q.single(app.world()).map(|t| t.0.clone()).unwrap_or_default()
    }

    #[test]
    fn connection_ui_uses_state_color() {
        let mut app = make_test_app();
        app.add_systems(Update, update_connection_ui);
        let dot = app
            .world_mut()
            .spawn((HudConnectionDot, BackgroundColor(Color::NONE)))
            .id();

        app.world_mut().resource_mut::<ServerConnection>().state = ConnectionState::Connected;
        app.update();

        let bg = app.world().get::<BackgroundColor>(dot).unwrap().0;
        assert_color_close(bg, color_from_hex(Colors::STATUS_CONNECTED));
    }

    #[test]
    fn connection_ui_protocol_mismatch_forces_disconnected_color() {
        let mut app = make_test_app();
        app.add_systems(Update, update_connection_ui);
        let glow = app
            .world_mut()
            .spawn((HudConnectionGlow, BackgroundColor(Color::NONE)))
            .id();

        app.world_mut().resource_mut::<ServerConnection>().state = ConnectionState::Connected;
        app.world_mut().resource_mut::<NetworkState>().protocol_mismatch = true;
        app.update();

        let bg = app.world().get::<BackgroundColor>(glow).unwrap().0;
        assert_color_close(bg, color_from_hex(Colors::STATUS_DISCONNECTED));
    }

    #[test]
    fn status_ui_shows_score_and_lives() {
        let mut app = make_test_app();
        let settings = Settings(ArenaConfig::default());
        app.insert_resource(ArenaSim::new(&settings, SeededSampler::new(7)));
        app.world_mut().spawn((HudStatusText, Text::new("")));
        app.add_systems(Update, update_status_ui);
        app.update();

        assert_eq!(
            text_of::<HudStatusText>(&mut app),
            format!("Score: 0 | Lives: {}", settings.0.initial_lives)
        );
    }

    #[test]
    fn players_ui_counts_others_only_when_connected() {
        let mut app = make_test_app();
        app.world_mut().spawn((HudPlayersText, Text::new("")));
        app.add_systems(Update, update_players_ui);

        let mut players = std::collections::BTreeMap::new();
        for id in 1..=3 {
            players.insert(id, BodyState::spawn(Vec3::new(0.0, 4.0, 0.0)));
        }
        let bootstrap = ServerMsg::Bootstrap(BootstrapMsg {
            protocol_version: PROTOCOL_VERSION,
            self_id: 1,
            players,
        });
        app.world_mut()
            .resource_mut::<NetworkState>()
            .roster
            .apply(&bootstrap);

        app.update();
        assert_eq!(text_of::<HudPlayersText>(&mut app), "Offline");

        app.world_mut().resource_mut::<ServerConnection>().state = ConnectionState::Connected;
        app.update();
        assert_eq!(text_of::<HudPlayersText>(&mut app), "2 other players");
    }

    fn press(app: &mut App, key: KeyCode) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.clear();
        keys.press(key);
    }

    fn release_all(app: &mut App) {
        let mut keys = app.world_mut().resource_mut::<ButtonInput<KeyCode>>();
        keys.release_all();
        keys.clear();
    }

    #[test]
    fn rules_panel_toggles_with_h_and_f1() {
        let mut app = make_test_app();
        app.init_resource::<HudUiState>();
        app.init_resource::<ButtonInput<KeyCode>>();
        app.add_systems(Update, (toggle_rules_ui, update_rules_panel_ui).chain());
        let panel = app
            .world_mut()
            .spawn((HudRulesPanel, Visibility::Hidden))
            .id();

        press(&mut app, KeyCode::KeyH);
        app.update();
        assert!(app.world().resource::<HudUiState>().rules_visible);
        assert_eq!(
            *app.world().get::<Visibility>(panel).unwrap(),
            Visibility::Inherited
        );

        // Held, not newly pressed: no flicker.
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .clear();
        app.update();
        assert!(app.world().resource::<HudUiState>().rules_visible);

        release_all(&mut app);
        press(&mut app, KeyCode::F1);
        app.update();
        assert!(!app.world().resource::<HudUiState>().rules_visible);
        assert_eq!(
            *app.world().get::<Visibility>(panel).unwrap(),
            Visibility::Hidden
        );
    }

    #[test]
    fn game_over_overlay_hidden_without_simulation() {
        let mut app = make_test_app();
        let overlay = app
            .world_mut()
            .spawn((HudGameOverOverlay, Visibility::Inherited))
            .id();
        app.add_systems(Update, update_game_over_ui);
        app.update();

        assert_eq!(
            *app.world().get::<Visibility>(overlay).unwrap(),
            Visibility::Hidden
        );
    }
}
