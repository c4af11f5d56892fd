use feed_personalizer::config::DecayFactor;
use feed_personalizer::model::InterestProfile;
use feed_personalizer::profile::decay;
use proptest::prelude::*;

fn profile() -> impl Strategy<Value = InterestProfile> {
    let dimension = || prop::collection::vec(("[a-z]{1,6}", 0.0f64..1_000.0), 0..8);
    (dimension(), dimension(), dimension(), dimension()).prop_map(
        |(categories, sources, keywords, locations)| InterestProfile {
            categories: categories.into_iter().collect(),
            sources: sources.into_iter().collect(),
            keywords: keywords.into_iter().collect(),
            locations: locations.into_iter().collect(),
        },
    )
}

fn factor() -> impl Strategy<Value = DecayFactor> {
    (0.000_1f64..=1.0).prop_map(|value| DecayFactor::new(value).expect("factor in range"))
}

fn assert_close(a: &InterestProfile, b: &InterestProfile) -> Result<(), TestCaseError> {
    for (left, right) in [
        (&a.categories, &b.categories),
        (&a.sources, &b.sources),
        (&a.keywords, &b.keywords),
        (&a.locations, &b.locations),
    ] {
        prop_assert_eq!(left.len(), right.len());
        for (key, weight) in left.iter() {
            let other = right.get(key);
            prop_assert!((weight - other).abs() <= 1e-9 * weight.abs().max(1.0), "{key}: {weight} vs {other}");
        }
    }
    Ok(())
}

#[test]
fn test_decay_factor_validation() {
    assert!(DecayFactor::new(0.0).is_none());
    assert!(DecayFactor::new(1.5).is_none());
    assert!(DecayFactor::new(f64::NAN).is_none());
    assert!(DecayFactor::new(1.0).is_some());
}

proptest! {
    #[test]
    fn prop_decay_composes(profile in profile(), f in factor()) {
        let twice = decay(&decay(&profile, f), f);
        let once = decay(&profile, f.compose(f));
        assert_close(&twice, &once)?;
    }

    #[test]
    fn prop_decay_is_monotonic(profile in profile(), f in factor()) {
        let decayed = decay(&profile, f);
        for (key, weight) in profile.keywords.iter() {
            prop_assert!(decayed.keywords.get(key) <= weight);
            prop_assert!(decayed.keywords.get(key) >= 0.0);
        }
    }

    #[test]
    fn prop_unit_factor_is_identity(profile in profile()) {
        let unit = DecayFactor::new(1.0).expect("unit factor");
        prop_assert_eq!(decay(&profile, unit), profile);
    }
}
