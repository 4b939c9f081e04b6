use beidou_grid::{children_2d, decode_2d, decode_3d, encode_2d, encode_3d, GeoPoint};

const SAMPLE_POINTS: &[(f64, f64)] = &[
    (120.5830508, 31.1415575),
    (-73.9857, 40.7484),
    (2.3488, 48.8534),
    (-0.1278, 51.5074),
    (139.6917, 35.6895),
    (-58.3816, -34.6037),
    (18.4241, -33.9249),
    (0.0, 0.0),
    (179.9, 87.9),
    (-179.9, -87.9),
];

#[test]
fn every_sample_point_round_trips_within_one_cell_at_every_level() {
    for &(lon, lat) in SAMPLE_POINTS {
        let p = GeoPoint::try_new(lon, lat).unwrap();
        for level in 1..=10u8 {
            let code = encode_2d(&p, level).unwrap();
            let sw = decode_2d(&code).unwrap();
            let re = encode_2d(&sw, level).unwrap();
            assert_eq!(re, code, "point ({lon},{lat}) level {level}");
        }
    }
}

#[test]
fn every_2d_code_has_the_right_length_for_its_level() {
    for &(lon, lat) in SAMPLE_POINTS {
        let p = GeoPoint::try_new(lon, lat).unwrap();
        for level in 1..=10u8 {
            let code = encode_2d(&p, level).unwrap();
            assert_eq!(
                code.chars().count(),
                beidou_grid::constants::cumulative_2d_len(level)
            );
        }
    }
}

#[test]
fn hemisphere_prefix_matches_sign_of_coordinates() {
    let cases = [
        (10.0, 10.0, 'N'),
        (-10.0, 10.0, 'N'),
        (10.0, -10.0, 'S'),
        (-10.0, -10.0, 'S'),
    ];
    for (lon, lat, expected) in cases {
        let p = GeoPoint::try_new(lon, lat).unwrap();
        let code = encode_2d(&p, 4).unwrap();
        assert_eq!(code.chars().next(), Some(expected), "({lon},{lat})");
    }
}

#[test]
fn children_of_a_cell_all_nest_inside_their_parent_code() {
    let p = GeoPoint::try_new(120.5830508, 31.1415575).unwrap();
    for parent_level in 1..=9u8 {
        let parent = encode_2d(&p, parent_level).unwrap();
        let kids = children_2d(&parent).unwrap();
        assert!(!kids.is_empty());
        for kid in &kids {
            assert!(kid.starts_with(&parent));
        }
        let matching = encode_2d(&p, parent_level + 1).unwrap();
        assert!(kids.contains(&matching));
    }
}

#[test]
fn grid_sweep_across_levels_and_hemispheres_round_trips_in_3d() {
    let heights = [0.0, 100.0, -50.0, 8848.86, -400.0];
    for &(lon, lat) in SAMPLE_POINTS {
        for &height in &heights {
            let p = GeoPoint::try_new_with_height(lon, lat, height).unwrap();
            for level in [1u8, 2, 5, 10] {
                let code = encode_3d(&p, level).unwrap();
                let back = decode_3d(&code).unwrap();
                let re = encode_3d(&back, level).unwrap();
                assert_eq!(re, code, "point ({lon},{lat},{height}) level {level}");
            }
        }
    }
}

#[test]
fn invalid_codes_are_rejected_not_panicked_on() {
    assert!(decode_2d("").is_err());
    assert!(decode_2d("XYZ").is_err());
    assert!(decode_2d("N999999999999999999999").is_err());
}
