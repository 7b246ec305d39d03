//! End-to-end: geo.toml → origin → vector and terrain meshes

use bevy::prelude::Mesh;
use eustress_geomesh::vector_render::ring;
use eustress_geomesh::{
    line_string_to_ribbon_mesh, tessellate_multi_polygon, GeoMeshConfig, Heightmap,
};
use geo::{MultiPolygon, Polygon};

const CONFIG: &str = r#"
[origin]
x = 13.0
y = 52.0
name = "Berlin"

[terrain]
scale_x = 30.0
scale_z = 30.0
cell_size = 30.0
vertical_exaggeration = 2.0

[vector]
line_width = 4.0
polygon_elevation = 0.25
"#;

#[test]
fn test_config_to_vector_meshes() {
    let config = GeoMeshConfig::from_toml_str(CONFIG).unwrap();
    let origin = config.origin().unwrap();

    let courtyard = Polygon::new(
        ring(&[(13.0, 52.0), (13.002, 52.0), (13.002, 52.002), (13.0, 52.002), (13.0, 52.0)]),
        vec![ring(&[
            (13.0005, 52.0005),
            (13.0015, 52.0005),
            (13.0015, 52.0015),
            (13.0005, 52.0015),
            (13.0005, 52.0005),
        ])],
    );
    let plaza = Polygon::new(
        ring(&[(13.003, 52.0), (13.004, 52.0), (13.004, 52.001), (13.003, 52.0)]),
        vec![],
    );
    let blocks = MultiPolygon::new(vec![courtyard, plaza]);

    let mesh = tessellate_multi_polygon(&blocks, &origin, config.vector.polygon_elevation).unwrap();
    assert!(!mesh.is_empty());
    assert_eq!(*mesh.indices().iter().max().unwrap() as usize, mesh.vertex_count() - 1);
    assert!(mesh.positions().iter().all(|p| p[1] == 0.25));

    let road = ring(&[(13.0, 52.0), (13.001, 52.0), (13.001, 52.001)]);
    let ribbon = line_string_to_ribbon_mesh(&road, &origin, config.vector.line_width, 0.0).unwrap();
    assert_eq!(ribbon.vertex_count(), 8);
    assert_eq!(ribbon.indices().len(), 12);

    let bevy_mesh: Mesh = ribbon.into();
    assert_eq!(bevy_mesh.count_vertices(), 8);
}

#[test]
fn test_config_to_terrain_mesh() {
    let config = GeoMeshConfig::from_toml_str(CONFIG).unwrap();
    let grid: Vec<Vec<f32>> = (0..4)
        .map(|row| (0..5).map(|col| (row * 5 + col) as f32).collect())
        .collect();

    let heightmap = Heightmap::from_grid(&grid)
        .unwrap()
        .scaled(config.terrain.vertical_exaggeration);
    let normalized = heightmap.normalize();
    assert_eq!(normalized.min_elevation, 0.0);
    assert_eq!(normalized.max_elevation, 38.0);

    let terrain = &config.terrain;
    let mesh = heightmap
        .to_lit_mesh(terrain.scale_x, terrain.scale_z, terrain.cell_size)
        .unwrap();
    assert_eq!(mesh.vertex_count(), 20);
    assert_eq!(mesh.triangle_count(), 4 * 3 * 2);
    assert_eq!(mesh.normals().unwrap().len(), 20);
    assert_eq!(mesh.positions()[0], [-60.0, 0.0, -45.0]);
    assert_eq!(
        mesh.normals().unwrap(),
        heightmap.generate_normals(30.0).unwrap().as_slice()
    );
}
