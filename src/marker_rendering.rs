//! Retained-mesh display layer for the sphere and its markers.
//!
//! Marker discs are GPU-retained `Mesh3d` entities: the unit disc mesh is
//! built once at startup and entities are rebuilt only when the arena is
//! structurally replaced (tracked through [`SphereSim::revision`]).  The
//! per-frame systems touch only transforms and material colors, so a large
//! marker field costs no geometry re-uploads.
//!
//! No simulation type holds an `Entity` or `Handle`; this module owns the
//! entire bridge from arena indices to renderables.

use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use std::f32::consts::TAU;

use crate::config::SimConfig;
use crate::constants::*;
use crate::marker::Marker;
use crate::simulation::SphereSim;

/// Tag for the central unit sphere entity.
#[derive(Component)]
pub struct CentralSphere;

/// One rendered marker disc, keyed back to its arena index.
#[derive(Component)]
pub struct MarkerDisc {
    pub index: usize,
}

/// Shared unit disc mesh handle, created once at startup.
#[derive(Resource)]
pub struct DiscAssets {
    pub mesh: Handle<Mesh>,
}

/// Arena revision the current disc entities were built for.
#[derive(Resource, Default)]
pub struct DisplayedRevision(pub Option<u64>);

pub fn channel_color(channels: [u8; 3]) -> Color {
    Color::srgb_u8(channels[0], channels[1], channels[2])
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Spawn the central sphere and prepare the shared disc mesh.
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let sphere_mesh = meshes.add(
        Sphere::new(1.0)
            .mesh()
            .uv(SPHERE_SEGMENTS, SPHERE_SEGMENTS),
    );
    commands.spawn((
        CentralSphere,
        Mesh3d(sphere_mesh),
        MeshMaterial3d(materials.add(StandardMaterial::from(channel_color(SPHERE_COLOR)))),
        Transform::IDENTITY,
    ));

    commands.insert_resource(DiscAssets {
        mesh: meshes.add(marker_disc_mesh(MARKER_DISC_SEGMENTS)),
    });

    eprintln!("[SETUP] Central sphere spawned");
}

// ── Per-frame systems ─────────────────────────────────────────────────────────

/// Slow ornamental spin of the sphere surface.  Visual only; marker dynamics
/// never see this rotation.
pub fn spin_sphere_system(
    time: Res<Time>,
    config: Res<SimConfig>,
    mut spheres: Query<&mut Transform, With<CentralSphere>>,
) {
    let Ok(mut transform) = spheres.single_mut() else {
        return;
    };
    transform.rotate_y(config.sphere_spin_deg_per_sec.to_radians() * time.delta_secs());
}

/// Rebuild the disc entity set whenever the arena was structurally replaced.
pub fn sync_marker_entities_system(
    mut commands: Commands,
    sim: Res<SphereSim>,
    disc_assets: Res<DiscAssets>,
    mut displayed: ResMut<DisplayedRevision>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    discs: Query<Entity, With<MarkerDisc>>,
) {
    if displayed.0 == Some(sim.revision()) {
        return;
    }

    for entity in discs.iter() {
        commands.entity(entity).despawn();
    }

    for (index, marker) in sim.markers.iter().enumerate() {
        commands.spawn((
            MarkerDisc { index },
            Mesh3d(disc_assets.mesh.clone()),
            MeshMaterial3d(materials.add(StandardMaterial::from(channel_color(
                marker.display_color,
            )))),
            disc_transform(marker),
        ));
    }

    displayed.0 = Some(sim.revision());
}

/// Track marker motion: every disc follows its marker's surface pose.
pub fn update_marker_transforms_system(
    sim: Res<SphereSim>,
    mut discs: Query<(&MarkerDisc, &mut Transform)>,
) {
    for (disc, mut transform) in discs.iter_mut() {
        let Some(marker) = sim.markers.get(disc.index) else {
            continue;
        };
        *transform = disc_transform(marker);
    }
}

/// Push display colors (collision, selection, highlight) into the disc
/// materials.  Writes only on change so unchanged assets are not re-uploaded.
pub fn update_marker_colors_system(
    sim: Res<SphereSim>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    discs: Query<(&MarkerDisc, &MeshMaterial3d<StandardMaterial>)>,
) {
    for (disc, material_handle) in discs.iter() {
        let Some(marker) = sim.markers.get(disc.index) else {
            continue;
        };
        let Some(material) = materials.get_mut(&material_handle.0) else {
            continue;
        };
        let next = channel_color(marker.display_color);
        if material.base_color != next {
            material.base_color = next;
        }
    }
}

// ── Geometry helpers ──────────────────────────────────────────────────────────

/// Pose for one marker disc: lifted slightly off the surface along the
/// normal (`(1 + 0.1·radius)·position`), rotated so the disc's +Y face
/// points along that normal, scaled by the marker radius.
pub fn disc_transform(marker: &Marker) -> Transform {
    let lift = 1.0 + MARKER_LIFT_FACTOR * marker.radius;
    Transform {
        translation: marker.position * lift,
        rotation: Quat::from_rotation_arc(Vec3::Y, marker.position),
        scale: Vec3::splat(marker.radius),
    }
}

/// Fan-triangulate a unit disc in the XZ plane facing +Y.
///
/// Vertex 0 is the center; rim vertices `1..=segments` sit on the unit
/// circle.  Triangles wind counter-clockwise seen from +Y so the face
/// survives backface culling when rotated onto the sphere's outward normal.
pub fn marker_disc_mesh(segments: u32) -> Mesh {
    debug_assert!(segments >= 3, "disc needs ≥ 3 rim segments");

    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(segments as usize + 1);
    let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(segments as usize + 1);
    positions.push([0.0, 0.0, 0.0]);
    uvs.push([0.5, 0.5]);
    for i in 0..segments {
        let angle = i as f32 / segments as f32 * TAU;
        let (sin, cos) = angle.sin_cos();
        positions.push([cos, 0.0, sin]);
        uvs.push([(cos + 1.0) * 0.5, (sin + 1.0) * 0.5]);
    }
    let normals: Vec<[f32; 3]> = vec![[0.0, 1.0, 0.0]; segments as usize + 1];

    let mut indices: Vec<u32> = Vec::with_capacity(segments as usize * 3);
    for i in 1..segments {
        indices.extend_from_slice(&[0, i + 1, i]);
    }
    indices.extend_from_slice(&[0, 1, segments]);

    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::RENDER_WORLD,
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
    mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    mesh.insert_indices(Indices::U32(indices));
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_mesh::VertexAttributeValues;

    #[test]
    fn disc_mesh_has_center_plus_rim_layout() {
        let mesh = marker_disc_mesh(16);

        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("disc mesh must carry Float32x3 positions");
        };
        assert_eq!(positions.len(), 17, "center vertex plus one per segment");
        assert_eq!(positions[0], [0.0, 0.0, 0.0]);
        for p in &positions[1..] {
            assert_eq!(p[1], 0.0, "rim must lie in the XZ plane");
            let rim = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!((rim - 1.0).abs() < 1e-6, "rim vertex off the unit circle");
        }

        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("disc mesh must carry u32 indices");
        };
        assert_eq!(indices.len(), 16 * 3, "one triangle per segment");
    }

    #[test]
    fn disc_triangles_face_positive_y() {
        let mesh = marker_disc_mesh(8);
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            panic!("disc mesh must carry Float32x3 positions");
        };
        let Some(Indices::U32(indices)) = mesh.indices() else {
            panic!("disc mesh must carry u32 indices");
        };

        for triangle in indices.chunks(3) {
            let a = Vec3::from_array(positions[triangle[0] as usize]);
            let b = Vec3::from_array(positions[triangle[1] as usize]);
            let c = Vec3::from_array(positions[triangle[2] as usize]);
            let normal = (b - a).cross(c - a);
            assert!(
                normal.y > 0.0,
                "triangle {triangle:?} winds away from +Y"
            );
        }
    }

    #[test]
    fn disc_transform_lifts_and_orients_along_the_normal() {
        let marker = Marker::new(Vec3::X, Vec3::ZERO, 0.2, 1.0, [1, 2, 3]);
        let transform = disc_transform(&marker);

        let expected_lift = 1.0 + MARKER_LIFT_FACTOR * 0.2;
        assert!((transform.translation - Vec3::X * expected_lift).length() < 1e-6);
        assert!(
            (transform.rotation * Vec3::Y - Vec3::X).length() < 1e-5,
            "disc face must rotate onto the surface normal"
        );
        assert_eq!(transform.scale, Vec3::splat(0.2));
    }

    #[test]
    fn disc_transform_handles_the_antiparallel_normal() {
        let marker = Marker::new(-Vec3::Y, Vec3::ZERO, 0.1, 1.0, [1, 2, 3]);
        let transform = disc_transform(&marker);
        assert!(
            (transform.rotation * Vec3::Y - (-Vec3::Y)).length() < 1e-4,
            "rotation must cover the 180° case"
        );
    }
}
