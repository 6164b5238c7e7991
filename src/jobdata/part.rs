//! `*Part` block

use std::collections::HashSet;

use super::{fixed, key_lines, reals};
use crate::elements::{BeamProfile, Group, Section, SectionKind};
use crate::grouping::{group_elements, Bucket};
use crate::part::Part;

/// Data line entries allowed before a continuation line
const ENTRIES_PER_LINE: usize = 16;

/// Default local 1-axis for general beam sections
const DEFAULT_BEAM_AXIS: [f64; 3] = [0.0, 0.0, -1.0];

/// Render one part: nodes, element blocks with their sections, user sets,
/// releases and the rigid body definition. Coordinates use the part's own
/// `output_precision`.
pub fn part_block(part: &Part) -> String {
    let digits = part.config().output_precision;
    let mut out = format!("*Part, name={}\n", part.name());
    let mut names = ElsetNames::new(part);

    out.push_str("*Node\n");
    for (key, node) in part.nodes().iter().enumerate() {
        out.push_str(&format!(
            "{}, {}, {}, {}\n",
            key + 1,
            fixed(node.x, digits),
            fixed(node.y, digits),
            fixed(node.z, digits)
        ));
    }

    for bucket in group_elements(part).buckets() {
        let elset = names.claim(bucket.elset_name());
        out.push_str(&format!("*Element, type={}\n", bucket.key.element_type));
        for &key in &bucket.elements {
            if let Some(element) = part.element(key) {
                let entries: Vec<String> = std::iter::once(key + 1)
                    .chain(element.nodes.iter().map(|n| n + 1))
                    .map(|v| v.to_string())
                    .collect();
                out.push_str(&data_lines(&entries));
            }
        }
        out.push_str(&format!("*Elset, elset={elset}\n"));
        out.push_str(&key_lines(bucket.elements.iter().copied()));

        if part.is_rigid() {
            continue;
        }
        if let Some(section) = part.find_section_by_name(&bucket.key.section) {
            out.push_str(&section_block(part, section, &bucket, &elset));
        }
    }

    for group in part.groups() {
        out.push_str(&group_block(group));
    }

    let releases: Vec<_> = part.releases().iter().filter(|r| !r.release.is_empty()).collect();
    if !releases.is_empty() {
        out.push_str("*Release\n");
        for r in releases {
            out.push_str(&format!(
                "{}, {}, {}\n",
                r.element + 1,
                r.location.label(),
                r.release.label()
            ));
        }
    }

    if let Some(reference) = part.reference_point() {
        let elset = names.claim("aux_rigid".to_string());
        out.push_str(&format!("*Elset, elset={elset}\n"));
        out.push_str(&key_lines(0..part.element_count()));
        out.push_str(&format!("*Rigid Body, ref node={}, elset={}\n", reference + 1, elset));
    }

    out.push_str("*End Part\n**\n");
    out
}

/// Element set names in use within one part
struct ElsetNames {
    taken: HashSet<String>,
}

impl ElsetNames {
    fn new(part: &Part) -> Self {
        Self {
            taken: part.groups().iter().map(|g| g.name().to_string()).collect(),
        }
    }

    /// `base`, or `base_{n}` with the smallest free `n`
    fn claim(&mut self, base: String) -> String {
        let mut name = base.clone();
        let mut n = 1;
        while self.taken.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

fn data_lines(entries: &[String]) -> String {
    let chunks: Vec<String> = entries.chunks(ENTRIES_PER_LINE).map(|c| c.join(", ")).collect();
    let mut out = chunks.join(",\n");
    out.push('\n');
    out
}

fn section_block(part: &Part, section: &Section, bucket: &Bucket, elset: &str) -> String {
    let material = section.material_name().unwrap_or_default();
    match &section.kind {
        SectionKind::Beam(BeamProfile::General { area, i11, i12, i22, j }) => {
            let axis = bucket.orientation.unwrap_or(DEFAULT_BEAM_AXIS);
            let mut out = format!(
                "*Beam General Section, elset={elset}, section=GENERAL\n{}\n{}\n",
                reals(&[*area, *i11, *i12, *i22, *j]),
                reals(&axis)
            );
            let found = part.find_material_by_name(material);
            if let Some((e, g)) = found.and_then(|m| Some((m.youngs_modulus()?, m.shear_modulus()?))) {
                out.push_str(&format!("{}\n", reals(&[e, g])));
            }
            out
        }
        SectionKind::Beam(profile) => {
            let mut out = format!(
                "*Beam Section, elset={elset}, material={material}, section={}\n{}\n",
                profile.solver_shape(),
                reals(&profile.dimensions())
            );
            if let Some(axis) = bucket.orientation {
                out.push_str(&format!("{}\n", reals(&axis)));
            }
            out
        }
        SectionKind::Truss { area } => {
            format!("*Solid Section, elset={elset}, material={material}\n{},\n", reals(&[*area]))
        }
        SectionKind::Shell {
            thickness,
            integration_points,
        } => format!(
            "*Shell Section, elset={elset}, material={material}\n{}, {}\n",
            reals(&[*thickness]),
            integration_points
        ),
        SectionKind::Membrane { thickness } => format!(
            "*Membrane Section, elset={elset}, material={material}\n{},\n",
            reals(&[*thickness])
        ),
        SectionKind::Solid => format!("*Solid Section, elset={elset}, material={material}\n,\n"),
        SectionKind::Mass { mass } => format!("*Mass, elset={elset}\n{},\n", reals(&[*mass])),
    }
}

fn group_block(group: &Group) -> String {
    match group {
        Group::Nodes(g) => format!("*Nset, nset={}\n{}", g.name, key_lines(g.keys())),
        Group::Elements(g) => format!("*Elset, elset={}\n{}", g.name, key_lines(g.keys())),
        Group::Faces(g) => {
            let mut out = format!("*Surface, type=ELEMENT, name={}\n", g.name);
            for (key, face) in g.keys() {
                out.push_str(&format!("{}, {}\n", key + 1, face));
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{
        BeamEnd, Element, ElementsGroup, FacesGroup, Material, Node, NodesGroup, Release,
    };
    use crate::config::ModelConfig;

    fn render(part: &Part) -> String {
        part_block(part)
    }

    fn steel() -> Material {
        Material::elastic_isotropic("steel", 210e9, 0.3, 7850.0)
    }

    fn square(part: &mut Part) {
        part.add_nodes([
            Node::new(0.0, 0.0, 0.0),
            Node::new(1.0, 0.0, 0.0),
            Node::new(1.0, 1.0, 0.0),
            Node::new(0.0, 1.0, 0.0),
        ])
        .unwrap();
    }

    #[test]
    fn test_shell_part() {
        let mut part = Part::new("plate");
        square(&mut part);
        part.add_element(Element::shell(vec![0, 1, 2, 3], Section::shell("t10", steel(), 0.01)))
            .unwrap();
        let text = render(&part);
        assert!(text.starts_with("*Part, name=plate\n*Node\n1, 0.000000, 0.000000, 0.000000\n"));
        assert!(text.contains("4, 0.000000, 1.000000, 0.000000\n"));
        assert!(text.contains("*Element, type=S4\n1, 1, 2, 3, 4\n*Elset, elset=aux_S4_t10\n1\n"));
        assert!(text.contains("*Shell Section, elset=aux_S4_t10, material=steel\n0.01, 5\n"));
        assert!(text.ends_with("*End Part\n**\n"));
    }

    #[test]
    fn test_coordinates_follow_part_precision() {
        let config = ModelConfig::default().with_output_precision(2);
        let mut part = Part::with_config("coarse", config);
        part.add_node(Node::new(1.0, -0.0, 2.5)).unwrap();
        assert!(render(&part).contains("*Node\n1, 1.00, 0.00, 2.50\n"));
    }

    #[test]
    fn test_beam_orientations_split_blocks() {
        let mut part = Part::new("frame");
        square(&mut part);
        let rect = Section::rectangular("rect", steel(), 0.1, 0.2);
        part.add_element(Element::beam(0, 1, rect.clone())).unwrap();
        part.add_element(Element::beam(1, 2, "rect").with_orientation([0.0, 1.0, 0.0]))
            .unwrap();
        part.add_element(Element::beam(2, 3, "rect")).unwrap();
        let text = render(&part);
        assert_eq!(text.matches("*Element, type=B31\n").count(), 2);
        assert!(text.contains(
            "*Elset, elset=aux_B31_rect_0_0_m1000\n1, 3\n\
             *Beam Section, elset=aux_B31_rect_0_0_m1000, material=steel, section=RECT\n\
             0.1, 0.2\n0, 0, -1\n"
        ));
        assert!(text.contains("*Elset, elset=aux_B31_rect_0_1000_0\n2\n"));
    }

    #[test]
    fn test_general_beam_section() {
        let mut part = Part::new("frame");
        square(&mut part);
        let profile = BeamProfile::General {
            area: 0.01,
            i11: 2e-5,
            i12: 0.0,
            i22: 1e-5,
            j: 3e-5,
        };
        let section = Section::beam("gen", steel(), profile);
        part.add_element(Element::beam(0, 1, section).without_orientation()).unwrap();
        let text = render(&part);
        assert!(text.contains(
            "*Beam General Section, elset=aux_B31_gen, section=GENERAL\n\
             0.01, 0.00002, 0, 0.00001, 0.00003\n0, 0, -1\n210000000000, 8076923"
        ));
    }

    #[test]
    fn test_user_groups_and_collisions() {
        let mut part = Part::new("bars");
        square(&mut part);
        part.add_element(Element::truss(0, 1, Section::truss("bar", steel(), 1e-4)))
            .unwrap();
        part.add_element(Element::truss(1, 2, "bar")).unwrap();
        part.add_group(ElementsGroup::new("aux_T3D2_bar").with_keys([1])).unwrap();
        part.add_group(NodesGroup::new("ends").with_keys([0, 2])).unwrap();
        part.add_group(FacesGroup::new("skin").with_face(0, "S1")).unwrap();
        let text = render(&part);
        assert!(text.contains("*Elset, elset=aux_T3D2_bar_1\n1, 2\n"));
        assert!(text.contains("*Solid Section, elset=aux_T3D2_bar_1, material=steel\n0.0001,\n"));
        assert!(text.contains("*Elset, elset=aux_T3D2_bar\n2\n"));
        assert!(text.contains("*Nset, nset=ends\n1, 3\n"));
        assert!(text.contains("*Surface, type=ELEMENT, name=skin\n1, S1\n"));
    }

    #[test]
    fn test_releases() {
        let mut part = Part::new("frame");
        square(&mut part);
        part.add_element(Element::beam(0, 1, Section::rectangular("rect", steel(), 0.1, 0.2)))
            .unwrap();
        part.add_beam_release(0, BeamEnd::End, Release::pin(true, true, false))
            .unwrap();
        assert!(render(&part).contains("*Release\n1, S2, M1-M2\n"));
    }

    #[test]
    fn test_rigid_part() {
        let mut part = Part::rigid("die");
        square(&mut part);
        part.add_element(Element::shell(vec![0, 1, 2, 3], Section::shell("skin", steel(), 0.001)).rigid())
            .unwrap();
        part.set_reference_point(Node::new(0.5, 0.5, 1.0)).unwrap();
        let text = render(&part);
        assert!(text.contains("*Element, type=R3D4\n"));
        assert!(!text.contains("*Shell Section"));
        assert!(text.contains("*Elset, elset=aux_rigid\n1\n*Rigid Body, ref node=5, elset=aux_rigid\n"));
    }

    #[test]
    fn test_long_connectivity_wraps() {
        let entries: Vec<String> = (1..=21).map(|v| v.to_string()).collect();
        let text = data_lines(&entries);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("16,"));
        assert_eq!(lines[1], "17, 18, 19, 20, 21");
    }
}
