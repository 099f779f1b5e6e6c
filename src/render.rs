//! Overlay drawing for the polygon builder.
//!
//! Each call builds the full shape list from scratch, so a frame never
//! carries strokes from an earlier one.

use egui::{Color32, Mesh, Pos2, Shape, Stroke};

use crate::config::Settings;
use crate::mapper::{CoordinateMapper, Point, Size};
use crate::polygon::{PolygonBuilder, PolygonState};

#[derive(Clone, Copy, Debug)]
pub struct OverlayStyle {
    pub open_stroke: Stroke,
    pub closed_stroke: Stroke,
    pub fill: Color32,
    pub marker_radius: f32,
    pub marker_color: Color32,
}

impl From<&Settings> for OverlayStyle {
    fn from(s: &Settings) -> Self {
        Self {
            open_stroke: Stroke::new(s.stroke_width, s.open_stroke.to_egui()),
            closed_stroke: Stroke::new(s.stroke_width, s.closed_stroke.to_egui()),
            fill: s.fill.to_egui(),
            marker_radius: s.marker_radius,
            marker_color: s.marker_color.to_egui(),
        }
    }
}

/// Shapes for the current point list in screen space. `origin` is the
/// on-screen top-left of the displayed image.
pub fn overlay_shapes(
    builder: &PolygonBuilder,
    mapper: &CoordinateMapper,
    display: Size,
    origin: Pos2,
    style: &OverlayStyle,
) -> Vec<Shape> {
    if builder.is_empty() {
        return Vec::new();
    }
    if mapper.scale_factors(display).is_none() {
        log::debug!("display size {display:?} not laid out, skipping overlay");
        return Vec::new();
    }
    let to_screen = |p: Point| {
        let d = mapper.to_displayed(p, display).unwrap_or(p);
        origin + d.to_pos2().to_vec2()
    };
    let screen: Vec<Pos2> = builder.points().iter().map(|&p| to_screen(p)).collect();

    let mut shapes = Vec::new();
    if screen.len() >= 2 {
        match builder.state() {
            PolygonState::Open => {
                shapes.extend(builder.segments().map(|(a, b)| {
                    Shape::line_segment([to_screen(a), to_screen(b)], style.open_stroke)
                }));
            }
            PolygonState::Closed => closed_polygon(&screen, style, &mut shapes),
        }
    }
    if style.marker_radius > 0.0 {
        shapes.extend(
            screen
                .iter()
                .map(|&p| Shape::circle_filled(p, style.marker_radius, style.marker_color)),
        );
    }
    shapes
}

fn closed_polygon(screen: &[Pos2], style: &OverlayStyle, shapes: &mut Vec<Shape>) {
    let ring = open_ring(screen);
    let mut mesh = Mesh::default();
    for lobe in simple_rings(ring.clone()) {
        let Some(indices) = triangulate(&lobe) else {
            continue;
        };
        let base = mesh.vertices.len() as u32;
        for &p in &lobe {
            mesh.colored_vertex(p, style.fill);
        }
        for tri in indices.chunks_exact(3) {
            mesh.add_triangle(base + tri[0] as u32, base + tri[1] as u32, base + tri[2] as u32);
        }
    }
    if mesh.indices.is_empty() {
        log::debug!("polygon with {} vertices has no area, outline only", ring.len());
    } else {
        shapes.push(Shape::mesh(mesh));
    }
    if ring.len() >= 2 {
        shapes.push(Shape::closed_line(ring, style.closed_stroke));
    }
}

/// Splits a self-intersecting ring at each crossing until every piece is
/// simple, so every lobe of the outline gets filled.
fn simple_rings(ring: Vec<Pos2>) -> Vec<Vec<Pos2>> {
    let mut pending = vec![ring];
    let mut simple = Vec::new();
    while let Some(r) = pending.pop() {
        if r.len() < 3 {
            continue;
        }
        match first_crossing(&r) {
            // Both halves have fewer edges than `r`, so this terminates.
            Some((i, j, x)) => {
                let mut outer = r[..=i].to_vec();
                outer.push(x);
                outer.extend_from_slice(&r[j + 1..]);
                let mut inner = vec![x];
                inner.extend_from_slice(&r[i + 1..=j]);
                pending.push(outer);
                pending.push(inner);
            }
            None => simple.push(r),
        }
    }
    simple
}

/// First pair of non-adjacent edges `(i, j)` that cross, with the crossing point.
/// Edge `k` runs from `ring[k]` to `ring[(k + 1) % n]`.
fn first_crossing(ring: &[Pos2]) -> Option<(usize, usize, Pos2)> {
    let n = ring.len();
    for i in 0..n {
        for j in i + 2..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let hit = segment_crossing(ring[i], ring[(i + 1) % n], ring[j], ring[(j + 1) % n]);
            if let Some(x) = hit {
                return Some((i, j, x));
            }
        }
    }
    None
}

fn segment_crossing(a: Pos2, b: Pos2, c: Pos2, d: Pos2) -> Option<Pos2> {
    const EPS: f32 = 1e-6;
    let r = b - a;
    let s = d - c;
    let denom = r.x * s.y - r.y * s.x;
    if denom.abs() < EPS {
        return None;
    }
    let ac = c - a;
    let t = (ac.x * s.y - ac.y * s.x) / denom;
    let u = (ac.x * r.y - ac.y * r.x) / denom;
    if t > EPS && t < 1.0 - EPS && u > EPS && u < 1.0 - EPS {
        Some(a + r * t)
    } else {
        None
    }
}

/// Vertices without the snapped closing copy and without consecutive repeats.
fn open_ring(points: &[Pos2]) -> Vec<Pos2> {
    let mut ring: Vec<Pos2> = Vec::with_capacity(points.len());
    for &p in points {
        if ring.last() != Some(&p) {
            ring.push(p);
        }
    }
    while ring.len() >= 2 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

/// Ear-clipped triangle indices into `ring`. egui only fills convex paths,
/// so concave outlines go through earcut instead.
fn triangulate(ring: &[Pos2]) -> Option<Vec<usize>> {
    if ring.len() < 3 {
        return None;
    }
    let coords: Vec<f64> = ring
        .iter()
        .flat_map(|p| [p.x as f64, p.y as f64])
        .collect();
    let indices = earcutr::earcut(&coords, &[], 2).ok()?;
    if indices.len() < 3 || indices.len() % 3 != 0 {
        return None;
    }
    Some(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::PushOutcome;

    fn style() -> OverlayStyle {
        OverlayStyle::from(&Settings::default())
    }

    fn no_markers() -> OverlayStyle {
        OverlayStyle {
            marker_radius: 0.0,
            ..style()
        }
    }

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(Size::new(100.0, 100.0))
    }

    fn open_square() -> PolygonBuilder {
        let mut b = PolygonBuilder::default();
        b.push(Point::new(10.0, 10.0));
        b.push(Point::new(90.0, 10.0));
        b.push(Point::new(90.0, 90.0));
        b
    }

    fn segments(shapes: &[Shape]) -> Vec<[Pos2; 2]> {
        shapes
            .iter()
            .filter_map(|s| match s {
                Shape::LineSegment { points, .. } => Some(*points),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn fewer_than_two_points_draws_no_lines() {
        let mut b = PolygonBuilder::default();
        let display = Size::new(200.0, 200.0);
        assert!(overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &no_markers()).is_empty());

        b.push(Point::new(5.0, 5.0));
        assert!(overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &no_markers()).is_empty());

        let with_marker = overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &style());
        assert_eq!(with_marker.len(), 1);
        assert!(matches!(with_marker[0], Shape::Circle(_)));
    }

    #[test]
    fn open_polyline_is_scaled_and_offset() {
        let shapes = overlay_shapes(
            &open_square(),
            &mapper(),
            Size::new(200.0, 200.0),
            egui::pos2(5.0, 7.0),
            &no_markers(),
        );
        assert_eq!(
            segments(&shapes),
            vec![
                [egui::pos2(25.0, 27.0), egui::pos2(185.0, 27.0)],
                [egui::pos2(185.0, 27.0), egui::pos2(185.0, 187.0)],
            ]
        );
    }

    #[test]
    fn redraw_is_idempotent() {
        let b = open_square();
        let display = Size::new(320.0, 240.0);
        let first = overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &style());
        let second = overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &style());
        assert_eq!(first, second);
    }

    #[test]
    fn resize_rescales_without_touching_points() {
        let b = open_square();
        let before = b.points().to_vec();
        let small = overlay_shapes(&b, &mapper(), Size::new(100.0, 100.0), Pos2::ZERO, &no_markers());
        let large = overlay_shapes(&b, &mapper(), Size::new(300.0, 150.0), Pos2::ZERO, &no_markers());

        assert_eq!(segments(&small).len(), 2);
        assert_eq!(
            segments(&large),
            vec![
                [egui::pos2(30.0, 15.0), egui::pos2(270.0, 15.0)],
                [egui::pos2(270.0, 15.0), egui::pos2(270.0, 135.0)],
            ]
        );
        assert_eq!(b.points(), before.as_slice());
    }

    #[test]
    fn closed_polygon_is_filled_and_outlined() {
        let mut b = open_square();
        b.push(Point::new(10.0, 90.0));
        b.push(Point::new(11.0, 11.0));
        assert!(b.is_closed());

        let shapes = overlay_shapes(&b, &mapper(), Size::new(100.0, 100.0), Pos2::ZERO, &no_markers());
        assert!(segments(&shapes).is_empty());
        assert_eq!(shapes.len(), 2);
        match &shapes[0] {
            Shape::Mesh(mesh) => {
                assert_eq!(mesh.vertices.len(), 4);
                assert_eq!(mesh.indices.len(), 6);
                assert!(mesh.vertices.iter().all(|v| v.color == style().fill));
            }
            other => panic!("expected fill mesh, got {other:?}"),
        }
        match &shapes[1] {
            Shape::Path(path) => {
                assert!(path.closed);
                assert_eq!(path.points.len(), 4);
            }
            other => panic!("expected outline, got {other:?}"),
        }
    }

    #[test]
    fn concave_outline_triangulates_fully() {
        let l_shape = [
            egui::pos2(0.0, 0.0),
            egui::pos2(20.0, 0.0),
            egui::pos2(20.0, 10.0),
            egui::pos2(10.0, 10.0),
            egui::pos2(10.0, 20.0),
            egui::pos2(0.0, 20.0),
        ];
        let indices = triangulate(&l_shape).unwrap();
        assert_eq!(indices.len(), 12);
    }

    #[test]
    fn degenerate_closed_loop_draws_outline_only() {
        let mut b = PolygonBuilder::default();
        b.push(Point::new(20.0, 20.0));
        b.push(Point::new(50.0, 50.0));
        b.push(Point::new(21.0, 20.0));
        assert!(b.is_closed());

        let shapes = overlay_shapes(&b, &mapper(), Size::new(100.0, 100.0), Pos2::ZERO, &no_markers());
        assert_eq!(shapes.len(), 1);
        assert!(matches!(shapes[0], Shape::Path(_)));
    }

    fn mesh_area(mesh: &Mesh) -> f32 {
        mesh.indices
            .chunks_exact(3)
            .map(|t| {
                let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[t[k] as usize].pos);
                ((b - a).x * (c - a).y - (b - a).y * (c - a).x).abs() / 2.0
            })
            .sum()
    }

    #[test]
    fn bowtie_fills_both_lobes() {
        let mut b = PolygonBuilder::default();
        b.push(Point::new(10.0, 10.0));
        b.push(Point::new(90.0, 90.0));
        b.push(Point::new(90.0, 10.0));
        b.push(Point::new(10.0, 90.0));
        assert_eq!(b.push(Point::new(11.0, 11.0)), PushOutcome::Closed);

        let shapes = overlay_shapes(&b, &mapper(), Size::new(100.0, 100.0), Pos2::ZERO, &no_markers());
        assert_eq!(shapes.len(), 2);
        match &shapes[0] {
            Shape::Mesh(mesh) => {
                assert_eq!(mesh.indices.len(), 6);
                assert!((mesh_area(mesh) - 3200.0).abs() < 1e-2);
            }
            other => panic!("expected fill mesh, got {other:?}"),
        }
        match &shapes[1] {
            Shape::Path(path) => assert_eq!(path.points.len(), 4),
            other => panic!("expected outline, got {other:?}"),
        }
    }

    #[test]
    fn crossing_ring_splits_into_simple_lobes() {
        let lobes = simple_rings(vec![
            egui::pos2(0.0, 0.0),
            egui::pos2(20.0, 20.0),
            egui::pos2(20.0, 0.0),
            egui::pos2(0.0, 20.0),
        ]);
        assert_eq!(lobes.len(), 2);
        assert!(lobes.iter().all(|l| l.len() == 3 && first_crossing(l).is_none()));
        assert!(lobes.iter().all(|l| l.contains(&egui::pos2(10.0, 10.0))));
    }

    #[test]
    fn two_point_closure_draws_only_markers() {
        let mut b = PolygonBuilder::default();
        b.push(Point::new(20.0, 20.0));
        assert_eq!(b.push(Point::new(21.0, 21.0)), PushOutcome::Closed);

        let display = Size::new(100.0, 100.0);
        assert!(overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &no_markers()).is_empty());
        let shapes = overlay_shapes(&b, &mapper(), display, Pos2::ZERO, &style());
        assert_eq!(shapes.len(), 2);
        assert!(shapes.iter().all(|s| matches!(s, Shape::Circle(_))));
    }

    #[test]
    fn unlaid_out_display_draws_nothing() {
        let shapes = overlay_shapes(&open_square(), &mapper(), Size::new(0.0, 0.0), Pos2::ZERO, &style());
        assert!(shapes.is_empty());
    }

    #[test]
    fn ring_drops_snapped_copy_and_repeats() {
        let ring = open_ring(&[
            egui::pos2(0.0, 0.0),
            egui::pos2(1.0, 0.0),
            egui::pos2(1.0, 0.0),
            egui::pos2(1.0, 1.0),
            egui::pos2(0.0, 0.0),
        ]);
        assert_eq!(ring.len(), 3);
    }
}
