use super::*;
use crate::foundation::core::Point;

const PUPPET: &str = include_str!("../../data/puppet.svg");

fn approx_pt(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
}

#[test]
fn resolves_document_size() {
    let g = RigGeometry::from_markup(PUPPET, ["torso"]).unwrap();
    assert_eq!(g.size, Size2::new(100.0, 200.0));
}

#[test]
fn static_transforms_include_own_transform_attribute() {
    let g = RigGeometry::from_markup(PUPPET, ["torso", "head"]).unwrap();
    let torso = g.part_transform("torso").unwrap();
    assert!(approx_pt(torso * Point::new(1.0, 1.0), Point::new(1.0, 1.0)));
    let head = g.part_transform("head").unwrap();
    assert!(approx_pt(head * Point::new(50.0, 25.0), Point::new(50.0, 20.0)));
}

#[test]
fn nested_translate_accumulates() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="50" height="50">
        <g id="outer" transform="translate(10,0)">
            <g id="inner" transform="translate(0,5)">
                <rect width="4" height="4" fill="red"/>
            </g>
        </g>
    </svg>"#;
    let g = RigGeometry::from_markup(svg, ["outer", "inner", "ghost"]).unwrap();
    let inner = g.part_transform("inner").unwrap();
    assert!(approx_pt(inner * Point::ORIGIN, Point::new(10.0, 5.0)));
    assert!(g.part_transform("ghost").is_none());
}

#[test]
fn non_svg_markup_is_an_error() {
    assert!(RigGeometry::from_markup("<html/>", []).is_err());
}
