//! Hard-coded room used by the headless driver.

use std::f32::consts::{FRAC_PI_2, PI};

use shared::{Quat, RoomSurfaceDef, SurfaceLabel, SurfaceShapeDef, Vec3};

const ROOM_HALF_WIDTH: f32 = 2.5;
const ROOM_HEIGHT: f32 = 2.6;

fn plane(id: u32, translation: Vec3, rotation: Quat, label: SurfaceLabel) -> RoomSurfaceDef {
    RoomSurfaceDef {
        id,
        translation,
        rotation,
        label,
        shape: SurfaceShapeDef::Plane,
    }
}

/// Floor, ceiling, four inward-facing walls, a table, and a scanned rug patch on the floor.
pub fn default_room() -> Vec<RoomSurfaceDef> {
    let w = ROOM_HALF_WIDTH;
    let mut defs = vec![
        plane(1, Vec3::zeros(), Quat::identity(), SurfaceLabel::Floor),
        plane(
            2,
            Vec3::new(0.0, ROOM_HEIGHT, 0.0),
            Quat::from_axis_angle(&Vec3::x_axis(), PI),
            SurfaceLabel::Ceiling,
        ),
    ];

    // Walls: +Y rotated to face the room center.
    let walls = [
        (Vec3::new(w, 0.0, 0.0), Quat::from_axis_angle(&Vec3::z_axis(), FRAC_PI_2)),
        (Vec3::new(-w, 0.0, 0.0), Quat::from_axis_angle(&Vec3::z_axis(), -FRAC_PI_2)),
        (Vec3::new(0.0, 0.0, w), Quat::from_axis_angle(&Vec3::x_axis(), -FRAC_PI_2)),
        (Vec3::new(0.0, 0.0, -w), Quat::from_axis_angle(&Vec3::x_axis(), FRAC_PI_2)),
    ];
    for (i, (translation, rotation)) in walls.into_iter().enumerate() {
        defs.push(plane(10 + i as u32, translation, rotation, SurfaceLabel::WallFace));
    }

    defs.push(RoomSurfaceDef {
        id: 20,
        translation: Vec3::new(1.2, 0.72, -1.0),
        rotation: Quat::identity(),
        label: SurfaceLabel::Table,
        shape: SurfaceShapeDef::Cuboid {
            half_extents: Vec3::new(0.6, 0.03, 0.4),
        },
    });

    // Low ridge in the global mesh under the spawn area.
    defs.push(RoomSurfaceDef {
        id: 30,
        translation: Vec3::new(0.0, 0.0, 0.35),
        rotation: Quat::identity(),
        label: SurfaceLabel::GlobalMesh,
        shape: SurfaceShapeDef::TriMesh {
            vertices: vec![
                Vec3::new(-0.6, 0.0, -0.6),
                Vec3::new(0.6, 0.0, -0.6),
                Vec3::new(0.6, 0.0, 0.6),
                Vec3::new(-0.6, 0.0, 0.6),
                Vec3::new(0.0, 0.04, 0.0),
            ],
            indices: vec![[0, 4, 1], [1, 4, 2], [2, 4, 3], [3, 4, 0]],
        },
    });

    defs
}
