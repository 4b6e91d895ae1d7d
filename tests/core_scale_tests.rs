use approx::assert_relative_eq;
use chart_svg::core::primitives::year_to_unix_seconds;
use chart_svg::core::scale::{nice_domain, ticks};
use chart_svg::core::{
    AxisType, BandPadding, BandScale, DomainOptions, LinearScale, TimeScale, resolve_domain,
};

#[test]
fn linear_scale_round_trip_within_tolerance() {
    let scale = LinearScale::new((10.0, 110.0), (0.0, 1000.0)).expect("valid scale");

    let value = 42.5;
    let px = scale.scale(value);
    let recovered = scale.invert(px);

    assert!((recovered - value).abs() <= 1e-9);
}

#[test]
fn inverted_range_maps_bottom_up() {
    let scale = LinearScale::new((0.0, 100.0), (400.0, 0.0)).expect("valid scale");
    assert_relative_eq!(scale.scale(0.0), 400.0);
    assert_relative_eq!(scale.scale(25.0), 300.0);
}

#[test]
fn non_finite_domain_is_rejected() {
    assert!(LinearScale::new((f64::NAN, 1.0), (0.0, 1.0)).is_err());
    assert!(LinearScale::new((0.0, 1.0), (0.0, f64::INFINITY)).is_err());
}

#[test]
fn nice_domain_rounds_outward_to_tick_step() {
    assert_eq!(nice_domain((0.13, 9.7), 5), (0.0, 10.0));
    assert_eq!(nice_domain((-3.0, 47.0), 5), (-10.0, 50.0));
}

#[test]
fn ticks_follow_one_two_five_steps() {
    assert_eq!(ticks((0.0, 10.0), 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
    assert_eq!(ticks((0.0, 1.0), 2), vec![0.0, 0.5, 1.0]);
}

#[test]
fn domain_resolution_applies_zero_overrides_and_clamp() {
    let values = [3.0, 7.5, f64::NAN];

    assert_eq!(resolve_domain(values, DomainOptions::default()), (3.0, 8.0));
    assert_eq!(resolve_domain(values, DomainOptions::zero_based()), (0.0, 8.0));
    assert_eq!(
        resolve_domain(
            values,
            DomainOptions::default().with_bounds(None, Some(20.0))
        ),
        (0.0, 20.0),
        "the free side is still rounded to the tick step"
    );
    assert_eq!(
        resolve_domain(
            values,
            DomainOptions::zero_based().with_clamp(1.0, 5.0)
        ),
        (1.0, 5.0)
    );
}

#[test]
fn empty_values_fall_back_to_unit_domain() {
    let domain = resolve_domain(std::iter::empty(), DomainOptions::default().with_nice(false));
    assert_eq!(domain, (0.0, 1.0));
}

#[test]
fn band_scale_splits_range_with_padding() {
    let band = BandScale::new(["a", "b", "c"], (0.0, 300.0), BandPadding::default())
        .expect("valid band scale");

    assert_relative_eq!(band.step(), 300.0 / 3.0);
    assert_relative_eq!(band.bandwidth(), 80.0);
    assert_relative_eq!(band.position("a").unwrap_or_default(), 10.0);
    assert_relative_eq!(band.center("c").unwrap_or_default(), 250.0);
    assert!(band.position("missing").is_none());
}

#[test]
fn band_scale_deduplicates_labels() {
    let band = BandScale::new(["a", "b", "a"], (0.0, 100.0), BandPadding::default())
        .expect("valid band scale");
    assert_eq!(band.domain(), ["a", "b"]);
}

#[test]
fn annual_time_scale_ticks_land_on_year_starts() {
    let start = year_to_unix_seconds(2000).expect("2000");
    let end = year_to_unix_seconds(2010).expect("2010");
    let scale = TimeScale::new((start, end), (0.0, 500.0), AxisType::DateAnnual)
        .expect("valid time scale");

    let ticks = scale.ticks(5).expect("ticks");
    assert_eq!(ticks.first().copied(), Some(start));
    assert_eq!(ticks.last().copied(), Some(end));
    assert_eq!(ticks.len(), 6);
}
