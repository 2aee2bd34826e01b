use fieldmap_geom::{Rect, Vec2};
use proptest::prelude::*;

fn coord() -> impl Strategy<Value = f32> {
    -1_000.0f32..1_000.0
}

fn arb_vec2() -> impl Strategy<Value = Vec2> {
    (coord(), coord()).prop_map(|(x, y)| Vec2::new(x, y))
}

proptest! {
    // A box built around a point always contains it
    #[test]
    fn rect_contains_its_center(c in arb_vec2(), half in 0.0f32..64.0) {
        let r = Rect::from_center_half(c, half);
        prop_assert!(r.contains(c));
        prop_assert!(r.contains(r.center()));
    }

    // Points further than the half-width on either axis are outside
    #[test]
    fn rect_rejects_points_past_half_width(c in arb_vec2(), half in 0.0f32..64.0, d in 0.5f32..64.0) {
        let r = Rect::from_center_half(c, half);
        prop_assert!(!r.contains(c + Vec2::new(half + d, 0.0)));
        prop_assert!(!r.contains(c - Vec2::new(0.0, half + d)));
    }

    #[test]
    fn vec2_add_sub_roundtrip(a in arb_vec2(), b in arb_vec2()) {
        let c = (a + b) - b;
        prop_assert!((c.x - a.x).abs() <= 1e-3 && (c.y - a.y).abs() <= 1e-3);
    }
}
