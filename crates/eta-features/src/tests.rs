//! Unit tests for eta-features.

use eta_core::{CityGrid, EtaConfig, RequestTime, TripId, ZoneId};
use eta_synth::{DurationFactors, TripRecord, TripRequest, Weather};

use crate::{FeatureEngineer, ZonePairStatsStore};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn trip(id: u32, pickup: u16, dropoff: u16, time: &str, minutes: f64) -> TripRecord {
    TripRecord {
        id:                TripId(id),
        pickup:            ZoneId(pickup),
        dropoff:           ZoneId(dropoff),
        request_time:      RequestTime::parse(time).unwrap(),
        weather:           Weather::Clear,
        special_event:     false,
        driver_efficiency: 1.0,
        distance:          0,
        factors:           DurationFactors::default(),
        duration_minutes:  minutes,
    }
}

fn request(pickup: u16, dropoff: u16, time: &str, weather: Weather) -> TripRequest {
    TripRequest {
        pickup:       ZoneId(pickup),
        dropoff:      ZoneId(dropoff),
        request_time: RequestTime::parse(time).unwrap(),
        weather,
    }
}

/// Tuesday/Wednesday trips: 44→55 twice, 55→44 once, 11→99 once.
fn small_corpus() -> Vec<TripRecord> {
    vec![
        trip(0, 44, 55, "2024-01-16T08:10:00", 10.0),
        trip(1, 44, 55, "2024-01-16T08:40:00", 14.0),
        trip(2, 55, 44, "2024-01-17T09:00:00", 30.0),
        trip(3, 11, 99, "2024-01-17T14:00:00", 46.0),
    ]
}

fn store() -> ZonePairStatsStore {
    ZonePairStatsStore::fit(CityGrid::default(), &small_corpus()).unwrap()
}

fn engineer() -> FeatureEngineer {
    FeatureEngineer::new(&EtaConfig::default(), store())
}

// ── ZonePairStatsStore ────────────────────────────────────────────────────────

#[cfg(test)]
mod stats {
    use super::*;
    use crate::FeatureError;
    use eta_core::ZoneType;

    #[test]
    fn pair_statistics_use_sample_std() {
        let s = store().pair(ZoneId(44), ZoneId(55));
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 12.0);
        assert!((s.std - 8.0_f64.sqrt()).abs() < 1e-12);
        assert!(!s.is_fallback());
    }

    #[test]
    fn pairs_are_ordered() {
        let s = store().pair(ZoneId(55), ZoneId(44));
        assert_eq!(s.count, 1);
        assert_eq!(s.mean, 30.0);
        assert_eq!(s.std, 0.0);
    }

    #[test]
    fn unseen_pair_falls_back_to_global() {
        let st = store();
        let s = st.pair(ZoneId(3), ZoneId(4));
        assert_eq!(s.count, 0);
        assert!(s.is_fallback());
        assert_eq!(s.mean, 25.0);
        assert_eq!(s.std, st.global().std);
        assert!(s.std > 0.0);
        assert_eq!(st.global().count, 4);
        assert_eq!(st.pair_count(), 3);
    }

    #[test]
    fn auxiliary_means_fall_back_to_global() {
        let st = store();
        assert_eq!(st.hour_mean(8), 12.0);
        assert_eq!(st.hour_mean(14), 46.0);
        assert_eq!(st.hour_mean(3), 25.0);
        assert_eq!(st.dow_mean(1), 12.0);
        assert_eq!(st.dow_mean(2), 38.0);
        assert_eq!(st.dow_mean(6), 25.0);
        assert_eq!(st.type_pair_mean(ZoneType::Business, ZoneType::Business), 18.0);
        assert_eq!(st.type_pair_mean(ZoneType::Residential, ZoneType::Airport), 46.0);
        assert_eq!(st.type_pair_mean(ZoneType::Coastal, ZoneType::Coastal), 25.0);
    }

    #[test]
    fn excluding_a_trip_recomputes_the_pair() {
        let trips = vec![
            trip(0, 1, 2, "2024-01-16T08:10:00", 10.0),
            trip(1, 1, 2, "2024-01-16T09:10:00", 14.0),
            trip(2, 1, 2, "2024-01-16T10:10:00", 18.0),
        ];
        let st = ZonePairStatsStore::fit(CityGrid::default(), &trips).unwrap();
        let s = st.pair_excluding(ZoneId(1), ZoneId(2), 18.0);
        assert_eq!(s.count, 2);
        assert!((s.mean - 12.0).abs() < 1e-12);
        assert!((s.std - 8.0_f64.sqrt()).abs() < 1e-9);

        let s = st.pair_excluding(ZoneId(1), ZoneId(2), 10.0);
        assert!((s.mean - 16.0).abs() < 1e-12);
        assert!((s.std - 8.0_f64.sqrt()).abs() < 1e-9);
        assert_eq!(st.pair(ZoneId(1), ZoneId(2)).count, 3);
    }

    #[test]
    fn excluding_the_only_trip_falls_back() {
        let st = store();
        let s = st.pair_excluding(ZoneId(55), ZoneId(44), 30.0);
        assert!(s.is_fallback());
        assert_eq!(s.mean, 25.0);

        let s = st.pair_excluding(ZoneId(44), ZoneId(55), 10.0);
        assert_eq!((s.count, s.mean, s.std), (1, 14.0, 0.0));
    }

    #[test]
    fn empty_corpus_is_rejected() {
        assert!(matches!(
            ZonePairStatsStore::fit(CityGrid::default(), &[]),
            Err(FeatureError::EmptyCorpus)
        ));
    }

    #[test]
    fn out_of_grid_trip_is_rejected() {
        let trips = vec![trip(0, 44, 150, "2024-01-16T08:10:00", 10.0)];
        assert!(matches!(
            ZonePairStatsStore::fit(CityGrid::default(), &trips),
            Err(FeatureError::Validation(_))
        ));
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod schema {
    use std::collections::HashSet;

    use crate::{FEATURE_COUNT, FEATURE_NAMES, feature_index, matches_schema, schema};

    #[test]
    fn names_are_unique_and_plentiful() {
        let unique: HashSet<&str> = FEATURE_NAMES.iter().copied().collect();
        assert_eq!(unique.len(), FEATURE_COUNT);
        assert!(FEATURE_COUNT >= 40);
        assert_eq!(schema().len(), FEATURE_COUNT);
    }

    #[test]
    fn lookup_and_matching() {
        assert_eq!(feature_index("distance"), Some(0));
        assert_eq!(feature_index("distance_x_rain"), Some(FEATURE_COUNT - 1));
        assert_eq!(feature_index("nope"), None);

        let owned: Vec<String> = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
        assert!(matches_schema(&owned));
        assert!(!matches_schema(&owned[1..]));
        let mut swapped = owned.clone();
        swapped.swap(0, 1);
        assert!(!matches_schema(&swapped));
    }
}

// ── FeatureEngineer ───────────────────────────────────────────────────────────

#[cfg(test)]
mod engineer {
    use super::*;
    use crate::{FEATURE_COUNT, FeatureError, targets};

    #[test]
    fn rush_hour_business_trip() {
        let v = engineer().transform(&request(44, 55, "2024-01-16T08:30:00", Weather::Clear)).unwrap();
        let f = |n: &str| v.get(n).unwrap();

        assert_eq!(v.as_slice().len(), FEATURE_COUNT);
        assert_eq!(f("distance"), 2.0);
        assert_eq!(f("distance_sq"), 4.0);
        assert_eq!(f("is_rush_hour"), 1.0);
        assert_eq!(f("is_weekend"), 0.0);
        assert_eq!(f("is_morning"), 1.0);
        assert_eq!(f("is_night"), 0.0);
        assert_eq!(f("pickup_business"), 1.0);
        assert_eq!(f("dropoff_business"), 1.0);
        assert_eq!(f("pair_business_business"), 1.0);
        assert_eq!(f("pair_business_coastal"), 0.0);
        assert_eq!(f("same_zone_type"), 1.0);
        assert_eq!(f("involves_airport"), 0.0);
        assert_eq!((f("pickup_row"), f("pickup_col")), (4.0, 4.0));
        assert_eq!((f("dropoff_row"), f("dropoff_col")), (5.0, 5.0));
        assert_eq!(f("zone_pair_mean"), 12.0);
        assert_eq!(f("zone_pair_count"), 2.0);
        assert_eq!(f("zone_pair_is_fallback"), 0.0);
        assert_eq!(f("hour_mean"), 12.0);
        assert_eq!(f("weather_clear"), 1.0);
        assert_eq!(f("distance_x_rush"), 2.0);
        assert_eq!(f("distance_x_airport"), 0.0);
        // Tuesday is day 1.
        assert!((f("dow_sin") - (std::f64::consts::TAU / 7.0).sin()).abs() < 1e-12);
    }

    #[test]
    fn exactly_one_pairing_is_hot() {
        let v = engineer().transform(&request(11, 99, "2024-01-20T23:00:00", Weather::Sandstorm)).unwrap();
        let first = crate::feature_index("pair_business_business").unwrap();
        let hot: f64 = v.as_slice()[first..first + 16].iter().sum();
        assert_eq!(hot, 1.0);
        assert_eq!(v.get("pair_residential_airport"), Some(1.0));
        assert_eq!(v.get("involves_airport"), Some(1.0));
        assert_eq!(v.get("is_weekend"), Some(1.0));
        assert_eq!(v.get("is_rush_hour"), Some(0.0));
        assert_eq!(v.get("is_night"), Some(1.0));
        assert_eq!(v.get("weather_sandstorm"), Some(1.0));
        assert_eq!(v.get("distance_x_sandstorm"), Some(16.0));
        assert_eq!(v.get("distance_x_airport"), Some(16.0));
    }

    #[test]
    fn unseen_pair_sets_fallback_flag() {
        let v = engineer().transform(&request(3, 4, "2024-01-16T12:00:00", Weather::Rain)).unwrap();
        assert_eq!(v.get("zone_pair_is_fallback"), Some(1.0));
        assert_eq!(v.get("zone_pair_count"), Some(0.0));
        assert_eq!(v.get("zone_pair_mean"), Some(25.0));
        assert_eq!(v.get("weather_rain"), Some(1.0));
        assert_eq!(v.get("distance_x_rain"), Some(1.0));
    }

    #[test]
    fn transform_is_deterministic() {
        let e = engineer();
        let r = request(20, 87, "2024-02-02T12:45:00", Weather::Clear);
        assert_eq!(e.transform(&r).unwrap(), e.transform(&r).unwrap());
        assert_eq!(e.transform(&r).unwrap().get("is_friday_prayer"), Some(1.0));
    }

    #[test]
    fn out_of_range_zone_fails_fast() {
        let r = request(20, 150, "2024-01-16T08:30:00", Weather::Clear);
        assert!(matches!(engineer().transform(&r), Err(FeatureError::Validation(_))));
    }

    #[test]
    fn batch_rows_match_single_transforms() {
        let e = engineer();
        let trips = small_corpus();
        let m = e.transform_batch(&trips).unwrap();
        assert_eq!(m.n_rows(), trips.len());
        assert_eq!(m.n_cols(), FEATURE_COUNT);
        for (i, t) in trips.iter().enumerate() {
            assert_eq!(m.row(i), e.transform(&t.request()).unwrap().as_slice());
        }
        assert_eq!(targets(&trips), vec![10.0, 14.0, 30.0, 46.0]);
    }

    #[test]
    fn training_rows_leave_their_own_duration_out() {
        let e = engineer();
        let trips = small_corpus();

        let own = e.transform_training(&trips[0]).unwrap();
        assert_eq!(own.get("zone_pair_mean"), Some(14.0));
        assert_eq!(own.get("zone_pair_count"), Some(1.0));
        assert_eq!(own.get("zone_pair_is_fallback"), Some(0.0));
        assert_eq!(e.transform(&trips[0].request()).unwrap().get("zone_pair_mean"), Some(12.0));

        let single = e.transform_training(&trips[3]).unwrap();
        assert_eq!(single.get("zone_pair_is_fallback"), Some(1.0));
        assert_eq!(single.get("zone_pair_mean"), Some(25.0));

        let m = e.transform_training_batch(&trips).unwrap();
        for (i, t) in trips.iter().enumerate() {
            assert_eq!(m.row(i), e.transform_training(t).unwrap().as_slice());
        }
    }
}

// ── FeatureMatrix ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod matrix {
    use crate::{FeatureError, FeatureMatrix};

    #[test]
    fn rows_and_columns() {
        let m = FeatureMatrix::from_rows(2, &[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]).unwrap();
        assert_eq!(m.n_rows(), 3);
        assert_eq!(m.row(1), &[3.0, 4.0]);
        assert_eq!(m.column(1).collect::<Vec<_>>(), vec![2.0, 4.0, 6.0]);
        assert_eq!(m.rows().count(), 3);
    }

    #[test]
    fn width_is_enforced() {
        let mut m = FeatureMatrix::new(3);
        assert!(m.is_empty());
        assert!(matches!(
            m.push_row(&[1.0, 2.0]),
            Err(FeatureError::WidthMismatch { expected: 3, found: 2 })
        ));
    }
}
