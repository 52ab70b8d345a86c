use bevy::prelude::*;

use crate::config::SimConfig;
use crate::constants::CAMERA_FOV_DEG;
use crate::simulation::SphereSim;

/// Spawn the fixed observation camera and scene lighting.
///
/// The camera sits on the +Z axis looking at the sphere center; a point light
/// above and to the side gives the surface some relief, with a mild ambient
/// fill so the dark hemisphere stays readable.
pub fn setup_camera(mut commands: Commands, config: Res<SimConfig>) {
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: CAMERA_FOV_DEG.to_radians(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, config.camera_distance).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        PointLight {
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(3.0, 3.0, 3.0),
    ));

    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 120.0,
        ..default()
    });

    eprintln!("[SETUP] Camera and lighting spawned");
}

/// Ride the camera above the followed marker, or sit at the default pose.
///
/// While following, the camera hangs on the marker's surface normal so the
/// marker stays centered against the sphere.  Near the poles the up reference
/// switches axes to keep the look-at well defined.
pub fn camera_follow_system(
    sim: Res<SphereSim>,
    config: Res<SimConfig>,
    mut cameras: Query<&mut Transform, With<Camera3d>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };

    match sim.follow_target().and_then(|i| sim.markers.get(i)) {
        Some(marker) => {
            let up = if marker.position.dot(Vec3::Y).abs() > 0.99 {
                Vec3::Z
            } else {
                Vec3::Y
            };
            *transform = Transform::from_translation(marker.position * config.follow_distance)
                .looking_at(Vec3::ZERO, up);
        }
        None => {
            *transform = Transform::from_xyz(0.0, 0.0, config.camera_distance)
                .looking_at(Vec3::ZERO, Vec3::Y);
        }
    }
}
