//! Status HUD: a small always-on text overlay with the arena vitals.

use bevy::prelude::*;

use crate::config::SimConfig;
use crate::simulation::SphereSim;

/// Marker component for the HUD line that carries live simulation state.
#[derive(Component)]
pub struct StatusHud;

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the top-left status overlay: one live status line plus a static
/// key-binding hint underneath.
pub fn setup_status_hud(mut commands: Commands, config: Res<SimConfig>) {
    commands
        .spawn(Node {
            position_type: PositionType::Absolute,
            left: Val::Px(10.0),
            top: Val::Px(10.0),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(4.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                StatusHud,
                Text::new("Markers: 0"),
                TextFont {
                    font_size: config.hud_font_size,
                    ..default()
                },
                TextColor(Color::srgb(0.0, 1.0, 1.0)),
            ));
            parent.spawn((
                Text::new(
                    "Space pause | G generate | C clear | Tab select | H highlight | \
                     F follow | =/- time | F5/F9 save/load",
                ),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::srgb(0.42, 0.42, 0.52)),
            ));
        });
}

// ── Update ────────────────────────────────────────────────────────────────────

/// Refresh the status line whenever the simulation state changed.
pub fn status_hud_display_system(
    sim: Res<SphereSim>,
    mut status_texts: Query<&mut Text, With<StatusHud>>,
) {
    if !sim.is_changed() {
        return;
    }
    for mut text in status_texts.iter_mut() {
        *text = Text::new(status_line(&sim));
    }
}

/// Compose the status line: marker count, animation state with time scale,
/// and the selected marker's radius / density / speed.
fn status_line(sim: &SphereSim) -> String {
    let state = if sim.animation_enabled {
        "Running"
    } else {
        "Paused"
    };
    let selection = match sim
        .selected()
        .and_then(|index| sim.markers.get(index).map(|marker| (index, marker)))
    {
        Some((index, marker)) => format!(
            "Marker {index}: r {:.2}, d {:.2}, v {:.2}",
            marker.radius,
            marker.density,
            marker.speed()
        ),
        None => "No selection".to_string(),
    };
    format!(
        "Markers: {} | {state} ×{:.1} | {selection}",
        sim.marker_count(),
        sim.time_scale
    )
}
