use diffmatch::{
    CancelFlag, ColourRange, DiffMatchError, DiffusionWeight, EndpointDistance, NoProgress,
    RangeDiffusionSlice, RangeImage,
};

fn textured_image(width: usize, height: usize) -> RangeImage {
    let mut colours = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let value = (((x * 31) ^ (y * 17) ^ (x * y)) & 0xFF) as f32;
            colours.push([value, 0.0, value * 0.25]);
        }
    }
    RangeImage::from_colours(colours, width, height).unwrap()
}

fn build_slice(img: &RangeImage, y: usize, steps: usize) -> RangeDiffusionSlice {
    let weights = DiffusionWeight::create(img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let mut slice = RangeDiffusionSlice::new();
    slice.create(y, steps, img, &weights, &NoProgress).unwrap();
    slice
}

fn mask_sum(slice: &RangeDiffusionSlice, x: usize) -> f32 {
    let steps = slice.steps() as i32;
    let mut sum = 0.0;
    for v in -steps..=steps {
        for u in -steps..=steps {
            sum += slice.get(x, u, v);
        }
    }
    sum
}

#[test]
fn masks_conserve_unit_weight_for_valid_pixels() {
    let img = textured_image(8, 8);
    let slice = build_slice(&img, 3, 3);

    for x in 0..8 {
        let sum = mask_sum(&slice, x);
        assert!((sum - 1.0).abs() < 1e-4, "sum {sum} at x {x}");
    }
}

#[test]
fn conservation_holds_next_to_masked_regions() {
    let width = 8;
    let height = 8;
    let ranges = vec![ColourRange::point([40.0, 0.0, 0.0]); width * height];
    let mut valid = vec![true; width * height];
    // Mask a 2x2 block touching the scanline.
    for (mx, my) in [(4, 3), (5, 3), (4, 4), (5, 4)] {
        valid[my * width + mx] = false;
    }
    let img = RangeImage::new(ranges, valid, width, height).unwrap();
    let weights = DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let mut slice = RangeDiffusionSlice::new();
    slice.create(3, 3, &img, &weights, &NoProgress).unwrap();

    for x in 0..width {
        if !img.valid(x, 3) {
            assert_eq!(mask_sum(&slice, x), 0.0);
        } else {
            let sum = mask_sum(&slice, x);
            assert!((sum - 1.0).abs() < 1e-4, "sum {sum} at x {x}");
        }
    }
    // No weight ever lands on a masked pixel.
    assert_eq!(slice.get(3, 1, 0), 0.0);
    assert_eq!(slice.get(6, -1, 0), 0.0);
}

#[test]
fn offsets_beyond_the_step_budget_read_zero() {
    let img = textured_image(8, 8);
    let slice = build_slice(&img, 2, 3);

    assert_eq!(slice.get(4, 4, 0), 0.0);
    assert_eq!(slice.get(4, 3, 1), 0.0);
    assert_eq!(slice.get(4, -2, -2), 0.0);
    assert_eq!(slice.get(4, 0, 4), 0.0);
}

#[test]
fn out_of_range_source_pixels_read_zero() {
    let img = textured_image(6, 6);
    let slice = build_slice(&img, 2, 2);

    assert_eq!(slice.get(6, 0, 0), 0.0);
    assert_eq!(slice.get(100, 1, 0), 0.0);
}

#[test]
fn accessors_reflect_the_build() {
    let img = textured_image(7, 5);
    let slice = build_slice(&img, 4, 2);

    assert_eq!(slice.width(), 7);
    assert_eq!(slice.steps(), 2);
    assert_eq!(slice.y(), 4);
}

#[test]
fn reuse_reflects_only_the_latest_create() {
    let width = 8;
    let height = 6;

    // First build: row 2 fully masked, so every mask is empty.
    let ranges = vec![ColourRange::point([25.0, 0.0, 0.0]); width * height];
    let mut valid = vec![true; width * height];
    for x in 0..width {
        valid[2 * width + x] = false;
    }
    let masked_img = RangeImage::new(ranges, valid, width, height).unwrap();
    let masked_weights =
        DiffusionWeight::create(&masked_img, &EndpointDistance, 1.0, &NoProgress).unwrap();

    let open_img = textured_image(width, height);
    let open_weights =
        DiffusionWeight::create(&open_img, &EndpointDistance, 1.0, &NoProgress).unwrap();

    let mut slice = RangeDiffusionSlice::new();
    slice
        .create(2, 3, &masked_img, &masked_weights, &NoProgress)
        .unwrap();
    for x in 0..width {
        assert_eq!(mask_sum(&slice, x), 0.0);
    }

    // Same (width, steps): storage is reused, old zeros must not leak.
    slice
        .create(2, 3, &open_img, &open_weights, &NoProgress)
        .unwrap();
    for x in 0..width {
        let sum = mask_sum(&slice, x);
        assert!((sum - 1.0).abs() < 1e-4, "sum {sum} at x {x}");
    }

    // And back: previous non-zero masks must not survive either.
    slice
        .create(2, 3, &masked_img, &masked_weights, &NoProgress)
        .unwrap();
    for x in 0..width {
        assert_eq!(mask_sum(&slice, x), 0.0);
    }
}

#[test]
fn geometry_change_rebuilds_the_tables() {
    let img = textured_image(8, 8);
    let weights = DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let mut slice = RangeDiffusionSlice::new();

    slice.create(1, 3, &img, &weights, &NoProgress).unwrap();
    assert!(slice.get(4, 3, 0) >= 0.0);

    slice.create(1, 1, &img, &weights, &NoProgress).unwrap();
    assert_eq!(slice.steps(), 1);
    assert_eq!(slice.get(4, 2, 0), 0.0);
    let sum = mask_sum(&slice, 4);
    assert!((sum - 1.0).abs() < 1e-4);
}

#[test]
fn row_out_of_range_is_rejected() {
    let img = textured_image(4, 4);
    let weights = DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let mut slice = RangeDiffusionSlice::new();

    let err = slice.create(4, 2, &img, &weights, &NoProgress).err().unwrap();
    assert_eq!(err, DiffMatchError::RowOutOfRange { y: 4, height: 4 });
}

#[test]
fn cancellation_aborts_the_build() {
    let img = textured_image(8, 8);
    let weights = DiffusionWeight::create(&img, &EndpointDistance, 1.0, &NoProgress).unwrap();
    let flag = CancelFlag::new();
    flag.cancel();

    let mut slice = RangeDiffusionSlice::new();
    let err = slice.create(1, 2, &img, &weights, &flag).err().unwrap();
    assert_eq!(err, DiffMatchError::Cancelled);
}
