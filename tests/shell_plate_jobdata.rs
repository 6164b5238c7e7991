use fea_model::prelude::*;

fn env_usize(name: &str, default_val: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_val)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Structured grid of S4 shells in the XY plane, nodes numbered row by row
fn build_plate_part(nx: usize, ny: usize) -> Part {
    // Plate size: 2m x 1m, 10 mm steel
    let lx = 2.0_f64;
    let ly = 1.0_f64;
    let steel = Material::elastic_isotropic("steel", 200e9, 0.27, 7850.0);

    let mut part = Part::new("plate");
    part.add_section(Section::shell("t10", steel, 0.01)).unwrap();

    for j in 0..=ny {
        let y = ly * (j as f64) / (ny as f64);
        for i in 0..=nx {
            let x = lx * (i as f64) / (nx as f64);
            part.add_node(Node::new(x, y, 0.0).with_name(format!("N_{i}_{j}")))
                .unwrap();
        }
    }

    let key = |i: usize, j: usize| j * (nx + 1) + i;
    for j in 0..ny {
        for i in 0..nx {
            let nodes = vec![key(i, j), key(i + 1, j), key(i + 1, j + 1), key(i, j + 1)];
            part.add_element(Element::shell(nodes, "t10")).unwrap();
        }
    }

    let corners = [key(0, 0), key(nx, 0), key(nx, ny), key(0, ny)];
    part.add_group(NodesGroup::new("corners").with_keys(corners)).unwrap();
    part
}

#[test]
fn single_quad_deck() {
    init_logging();
    let mut model = Model::new("quad");
    model.add_part(build_plate_part(1, 1)).unwrap();

    let mut problem = Problem::new("quad-static");
    problem
        .add_bc(BoundaryCondition::pinned("pins", NodeTarget::part_set("plate-1", "corners")))
        .unwrap();
    let text = InputFile::new(&model, &problem).jobdata().to_string();

    let node_block: Vec<&str> = text
        .lines()
        .skip_while(|l| *l != "*Node")
        .skip(1)
        .take_while(|l| !l.starts_with('*'))
        .collect();
    assert_eq!(node_block.len(), 4);
    for (i, line) in node_block.iter().enumerate() {
        assert!(line.starts_with(&format!("{}, ", i + 1)));
    }
    assert!(text.contains("*Element, type=S4\n1, 1, 2, 4, 3\n"));
    assert!(text.contains("plate-1.corners, PINNED\n"));
}

#[test]
fn coincident_nodes_are_merged() {
    let mut part = build_plate_part(1, 1);
    let key = part.add_node(Node::new(0.0, 0.0, 0.0)).unwrap();
    assert_eq!(key, 0);
    assert_eq!(part.node_count(), 4);
    // Below the default key precision
    let key = part.add_node(Node::new(1e-4, 0.0, 0.0)).unwrap();
    assert_eq!(key, 0);
    assert_eq!(part.node_count(), 4);
}

#[test]
fn removal_renumbers_densely() {
    let mut part = Part::new("loose");
    part.add_nodes([
        Node::new(0.0, 0.0, 0.0),
        Node::new(1.0, 0.0, 0.0),
        Node::new(2.0, 0.0, 0.0),
    ])
    .unwrap();
    part.remove_node(1).unwrap();
    let keys: Vec<Option<usize>> = part.nodes().iter().map(Node::key).collect();
    assert_eq!(keys, vec![Some(0), Some(1)]);
    assert_eq!(part.find_node_by_location([2.0, 0.0, 0.0]), Some(1));
}

#[test]
fn one_element_block_per_bucket() {
    let mut part = build_plate_part(2, 1);
    let steel = Material::elastic_isotropic("steel", 200e9, 0.27, 7850.0);
    let beams = [(0, 1), (1, 2)];
    for (a, b) in beams {
        part.add_element(Element::beam(a, b, Section::rectangular("edge", &steel, 0.05, 0.1)))
            .unwrap();
    }
    part.add_element(Element::beam(3, 4, "edge").with_orientation([0.0, 1.0, 0.0]))
        .unwrap();

    let grouping = group_elements(&part);
    assert_eq!(grouping.len(), 3);

    let mut model = Model::new("mixed");
    model.add_part(part).unwrap();
    let text = InputFile::new(&model, &Problem::new("mixed")).jobdata().to_string();
    let blocks = text.lines().filter(|l| l.starts_with("*Element, type=")).count();
    assert_eq!(blocks, grouping.len());
}

#[test]
fn nearest_queries_on_grid() {
    let nx = env_usize("FEA_PLATE_MESH_NX", 10);
    let ny = env_usize("FEA_PLATE_MESH_NY", 5);
    let part = build_plate_part(nx, ny);

    let closest = part.find_closest_nodes_to_point([0.01, 0.01, 0.0], 1).unwrap();
    assert_eq!(closest, vec![0]);

    let around = part.find_closest_nodes_to_node(0, 2).unwrap();
    assert_eq!(around.len(), 2);
    assert!(!around.contains(&0));

    let edge = part.find_nodes_by_attribute(Axis::Y, 0.0, 1e-6);
    assert_eq!(edge.len(), nx + 1);
}

#[test]
fn full_deck_written_to_disk() {
    init_logging();
    let mut model = Model::new("plate");
    model.add_part(build_plate_part(4, 2)).unwrap();

    let mut problem = Problem::new("plate-job");
    let corners = NodeTarget::part_set("plate-1", "corners");
    problem.add_bc(BoundaryCondition::pinned("pins", corners)).unwrap();
    problem
        .add_step(
            StaticStep::new("gravity")
                .with_load(GravityLoad::standard("g"))
                .with_load(PointLoad::force("centre", NodeTarget::nodes("plate-1", [7]), 0.0, 0.0, -500.0)),
        )
        .unwrap();
    problem.add_step(ModalStep::new("modes", 5)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = problem.write_input_file(&model, dir.path()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();

    let order = ["** PARTS", "** ASSEMBLY", "** MATERIALS", "** BOUNDARY", "** STEPS"];
    let positions: Vec<usize> = order.iter().map(|s| text.find(s).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(text.contains("*Material, name=steel\n"));
    assert!(text.contains("*Instance, name=plate-1, part=plate\n"));
    assert_eq!(text.matches("*End Step").count(), 2);
    assert!(text.contains("_aux_centre_plate-1, 3, -500\n"));
}

#[test]
fn invalid_targets_block_writing() {
    let mut model = Model::new("plate");
    model.add_part(build_plate_part(1, 1)).unwrap();
    let mut problem = Problem::new("bad");
    problem
        .add_bc(BoundaryCondition::fixed("fix", NodeTarget::part_set("plate-1", "missing")))
        .unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = problem.write_input_file(&model, dir.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ReferentialIntegrity);
    assert!(!dir.path().join("bad.inp").exists());
}
