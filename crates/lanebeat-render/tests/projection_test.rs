use lanebeat_render::{
    CommandRecorder, DIVIDER_OFFSETS, HighwayFrame, HighwayRenderer, LANE_SLOTS, NoteSprite,
    Orientation, Projector, ProjectorConfig, lane_offset, time_to_normalized_depth,
};
use proptest::prelude::*;

fn projector(orientation: Orientation) -> Projector {
    let (w, h) = match orientation {
        Orientation::Landscape => (1920.0, 1080.0),
        Orientation::Portrait => (1080.0, 1920.0),
    };
    Projector::new(ProjectorConfig::for_canvas(w, h, orientation))
}

proptest! {
    // A gem always lies between the two dividers of its lane at its own depth.
    #[test]
    fn gem_stays_between_its_lane_dividers(lane in 0usize..LANE_SLOTS, depth in 0.0f32..=1.0f32) {
        for orientation in [Orientation::Landscape, Orientation::Portrait] {
            let p = projector(orientation);
            let gem = p.project(lane_offset(lane), depth);
            let left = p.project(DIVIDER_OFFSETS[lane], depth);
            let right = p.project(DIVIDER_OFFSETS[lane + 1], depth);
            prop_assert!(left.x < gem.x && gem.x < right.x);
            prop_assert_eq!(gem.y, left.y);
        }
    }

    // X is linear in depth so a note tracks its fixed lane geometry.
    #[test]
    fn lane_x_is_linear_in_depth(lane in 0usize..LANE_SLOTS, depth in 0.0f32..=1.0f32) {
        let p = projector(Orientation::Landscape);
        let offset = lane_offset(lane);
        let near = p.project(offset, 0.0).x;
        let far = p.project(offset, 1.0).x;
        let expected = near + (far - near) * depth;
        prop_assert!((p.project(offset, depth).x - expected).abs() < 1e-2);
    }
}

#[test]
fn travel_time_maps_depth_consistently() {
    let p = projector(Orientation::Landscape);
    let travel = 1400.0;
    let at_spawn = time_to_normalized_depth(travel, travel) as f32;
    let at_hit = time_to_normalized_depth(0.0, travel) as f32;
    assert!((p.project(0.0, at_spawn).y - p.config().horizon_y).abs() < 1e-3);
    assert_eq!(p.project(0.0, at_hit).y, p.config().hit_y);
}

#[test]
fn renders_all_lanes_through_recorder() {
    let renderer = HighwayRenderer::new(projector(Orientation::Portrait));
    let frame = HighwayFrame {
        notes: (0..LANE_SLOTS)
            .map(|lane| NoteSprite {
                lane,
                depth: 0.5,
                tail_depth: None,
                is_star_power: lane == 2,
                hold_active: false,
            })
            .collect(),
        ..Default::default()
    };
    let mut recorder = CommandRecorder::new(1080.0, 1920.0);
    renderer.draw(&frame, &mut recorder).unwrap();

    let gems = recorder.ellipses();
    assert_eq!(gems.len(), LANE_SLOTS);
    let mut xs: Vec<f32> = gems.iter().map(|(c, _)| c.x).collect();
    xs.sort_by(f32::total_cmp);
    xs.dedup();
    assert_eq!(xs.len(), LANE_SLOTS);
}

#[test]
fn out_of_range_lane_sprites_are_skipped() {
    let renderer = HighwayRenderer::new(projector(Orientation::Landscape));
    let frame = HighwayFrame {
        notes: vec![NoteSprite {
            lane: 9,
            depth: 0.3,
            tail_depth: Some(0.5),
            is_star_power: false,
            hold_active: false,
        }],
        ..Default::default()
    };
    let mut recorder = CommandRecorder::new(1920.0, 1080.0);
    renderer.draw(&frame, &mut recorder).unwrap();
    assert!(recorder.ellipses().is_empty());
}
