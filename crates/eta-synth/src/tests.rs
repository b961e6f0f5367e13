//! Unit tests for eta-synth.

use chrono::{NaiveDate, NaiveDateTime};

use eta_core::{EtaConfig, RequestTime, TripId, ZoneId};

use crate::{SyntheticTripGenerator, TripRecord, TripRequest, Weather};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn at(s: &str) -> RequestTime {
    RequestTime::parse(s).unwrap()
}

fn request(pickup: u16, dropoff: u16, time: &str) -> TripRequest {
    TripRequest {
        pickup:       ZoneId(pickup),
        dropoff:      ZoneId(dropoff),
        request_time: at(time),
        weather:      Weather::Clear,
    }
}

fn config(seed: u64) -> EtaConfig {
    let mut c = EtaConfig::default();
    c.generator.seed = seed;
    c.generator.n_trips = 2_000;
    c
}

fn corpus(seed: u64) -> Vec<TripRecord> {
    SyntheticTripGenerator::new(&config(seed)).unwrap().generate_corpus().unwrap()
}

// ── DurationRules ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod rules {
    use super::*;
    use crate::DurationRules;

    fn rules() -> DurationRules {
        DurationRules::from_config(&EtaConfig::default())
    }

    #[test]
    fn business_rush_hour_scenario() {
        // Tuesday 08:30, 44 → 55: two business endpoints, two steps apart.
        let f = rules().expected(&request(44, 55, "2024-01-16T08:30:00")).unwrap();
        assert_eq!(f.base, 6.0);
        assert!((f.traffic - 8.4).abs() < 1e-9);
        assert_eq!(f.weather, 0.0);
        assert_eq!(f.zone, 6.0);
        assert!((15.0..=25.0).contains(&f.total()));
    }

    #[test]
    fn airport_off_peak_scenario() {
        // Tuesday 14:00, residential 11 → airport 99.
        let f = rules().expected(&request(11, 99, "2024-01-16T14:00:00")).unwrap();
        assert_eq!(f.base, 48.0);
        assert_eq!(f.traffic, 0.0);
        assert_eq!(f.zone, 2.0 - 12.0);
        assert!((30.0..=45.0).contains(&f.total()));
    }

    #[test]
    fn weekend_has_no_rush_hour() {
        // Saturday 08:30 is outside leisure hours: relief only.
        let f = rules().expected(&request(44, 55, "2024-01-20T08:30:00")).unwrap();
        assert!((f.traffic + 0.6).abs() < 1e-9);

        // Saturday 11:00 is leisure.
        let f = rules().expected(&request(44, 55, "2024-01-20T11:00:00")).unwrap();
        assert!((f.traffic - 1.2).abs() < 1e-9);
    }

    #[test]
    fn friday_prayer_and_late_night() {
        let f = rules().expected(&request(12, 16, "2024-01-19T12:30:00")).unwrap();
        assert!((f.traffic - 0.3 * 12.0).abs() < 1e-9);

        let f = rules().expected(&request(12, 16, "2024-01-17T03:00:00")).unwrap();
        assert!((f.traffic + 0.2 * 12.0).abs() < 1e-9);
    }

    #[test]
    fn weather_penalties() {
        let r = rules();
        let mut req = request(12, 16, "2024-01-16T14:00:00");
        req.weather = Weather::Sandstorm;
        assert!((r.expected(&req).unwrap().weather - 4.8).abs() < 1e-9);
        req.weather = Weather::Rain;
        assert!((r.expected(&req).unwrap().weather - 3.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_zone_is_rejected() {
        assert!(rules().expected(&request(12, 150, "2024-01-16T14:00:00")).is_err());
    }

    #[test]
    fn event_minutes() {
        assert_eq!(rules().event_minutes(6.0), 8.0);
    }
}

// ── EventCalendar ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod events {
    use super::*;
    use eta_core::{CityGrid, SimRng, ZoneType};

    use crate::EventCalendar;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn certain_events_fill_every_day_with_eligible_venues() {
        let grid = CityGrid::default();
        let cal = EventCalendar::generate(grid, start(), 30, 1.0, &mut SimRng::new(1));
        assert_eq!(cal.event_days(), 30);
        for d in 0..30 {
            let date = start() + chrono::Days::new(d);
            let venue = cal.venue_on(date).unwrap();
            let t = grid.zone_type(venue).unwrap();
            assert!(matches!(t, ZoneType::Business | ZoneType::Coastal));
        }
        assert!(cal.venue_on(start() + chrono::Days::new(30)).is_none());
        assert!(cal.venue_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()).is_none());
    }

    #[test]
    fn zero_probability_means_no_events() {
        let cal = EventCalendar::generate(CityGrid::default(), start(), 30, 0.0, &mut SimRng::new(1));
        assert_eq!(cal.event_days(), 0);
    }

    #[test]
    fn only_evening_trips_near_the_venue_are_affected() {
        let grid = CityGrid::default();
        let cal = EventCalendar::generate(grid, start(), 1, 1.0, &mut SimRng::new(5));
        let venue = cal.venue_on(start()).unwrap();
        let far = grid.zones().map(|z| z.id).find(|&z| grid.distance(z, venue).unwrap() > 3).unwrap();

        assert!(cal.affects(&grid, start(), 19, venue, far));
        assert!(cal.affects(&grid, start(), 19, far, venue));
        assert!(!cal.affects(&grid, start(), 14, venue, far));
        assert!(!cal.affects(&grid, start(), 19, far, far));
        assert!(!EventCalendar::default().affects(&grid, start(), 19, venue, far));
    }
}

// ── SyntheticTripGenerator ────────────────────────────────────────────────────

#[cfg(test)]
mod generator {
    use super::*;
    use crate::{SynthError, check_corpus};

    #[test]
    fn same_seed_same_corpus() {
        assert_eq!(corpus(7), corpus(7));
    }

    #[test]
    fn different_seed_different_corpus() {
        assert_ne!(corpus(7), corpus(8));
    }

    #[test]
    fn corpus_is_sorted_and_well_formed() {
        let cfg = config(42);
        let trips = corpus(42);
        assert_eq!(trips.len(), 2_000);

        let start = NaiveDateTime::new(cfg.generator.start_date, chrono::NaiveTime::MIN);
        let end = start + chrono::Days::new(cfg.generator.simulated_days as u64);
        for w in trips.windows(2) {
            assert!((w[0].request_time, w[0].id) < (w[1].request_time, w[1].id));
        }
        for t in &trips {
            assert_ne!(t.pickup, t.dropoff);
            assert!(t.pickup.index() < 100 && t.dropoff.index() < 100);
            assert!(t.request_time.naive() >= start && t.request_time.naive() < end);
            assert!(t.duration_minutes >= 1.0 && t.duration_minutes.is_finite());
            assert!((0.7..=1.3).contains(&t.driver_efficiency));
            let expected = (t.factors.total() * t.driver_efficiency).max(1.0);
            assert!((t.duration_minutes - expected).abs() < 1e-9);
            assert_eq!(t.factors.base, t.distance as f64 * 3.0);
            if !t.special_event {
                assert_eq!(t.factors.event, 0.0);
            }
            if t.weather == Weather::Clear {
                assert_eq!(t.factors.weather, 0.0);
            }
        }
        check_corpus(&trips).unwrap();
    }

    #[test]
    fn weather_and_events_occur_at_plausible_rates() {
        let trips = corpus(42);
        let sandstorms = trips.iter().filter(|t| t.weather == Weather::Sandstorm).count();
        // Expected 100 of 2000.
        assert!((50..=160).contains(&sandstorms), "sandstorms = {sandstorms}");
        for t in trips.iter().filter(|t| t.special_event) {
            assert!(t.request_time.hour() >= 18);
        }
    }

    #[test]
    fn trips_are_independent_of_generation_order() {
        let generator = SyntheticTripGenerator::new(&config(3)).unwrap();
        let mut reversed: Vec<TripRecord> = (0..500u32)
            .rev()
            .map(|i| generator.generate_trip(TripId(i)).unwrap())
            .collect();
        reversed.sort_by_key(|t| (t.request_time, t.id));
        assert_eq!(generator.generate(500).unwrap(), reversed);
    }

    #[test]
    fn growing_the_corpus_keeps_existing_trips() {
        let generator = SyntheticTripGenerator::new(&config(3)).unwrap();
        let small = generator.generate(100).unwrap();
        let large = generator.generate(300).unwrap();
        for t in &small {
            assert!(large.contains(t));
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_matches_sequential() {
        let generator = SyntheticTripGenerator::new(&config(11)).unwrap();
        let mut sequential: Vec<TripRecord> = (0..1_000u32)
            .map(|i| generator.generate_trip(TripId(i)).unwrap())
            .collect();
        sequential.sort_by_key(|t| (t.request_time, t.id));
        assert_eq!(generator.generate(1_000).unwrap(), sequential);
    }

    #[test]
    fn simulate_is_deterministic_and_validates() {
        let generator = SyntheticTripGenerator::new(&config(1)).unwrap();
        let t = at("2024-01-16T08:30:00");
        let a = generator.simulate(TripId(9), ZoneId(44), ZoneId(55), t).unwrap();
        let b = generator.simulate(TripId(9), ZoneId(44), ZoneId(55), t).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.distance, 2);

        assert!(matches!(
            generator.simulate(TripId(9), ZoneId(20), ZoneId(20), t),
            Err(SynthError::Validation(_))
        ));
        assert!(generator.simulate(TripId(9), ZoneId(20), ZoneId(150), t).is_err());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut cfg = config(1);
        cfg.weather.rain_probability = 1.5;
        assert!(matches!(SyntheticTripGenerator::new(&cfg), Err(SynthError::Config(_))));
    }

    #[test]
    fn degenerate_corpora_are_rejected() {
        assert!(check_corpus(&[]).is_err());
        let trips = corpus(2);
        let mut flat = trips[..10].to_vec();
        for t in &mut flat {
            t.duration_minutes = 12.0;
        }
        assert!(check_corpus(&flat).is_err());
        let mut bad = trips[..10].to_vec();
        bad[3].duration_minutes = f64::NAN;
        assert!(check_corpus(&bad).is_err());
    }
}

// ── CorpusSplit ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod split {
    use std::collections::HashSet;

    use super::*;
    use crate::CorpusSplit;

    #[test]
    fn chronological_disjoint_and_complete() {
        let trips = corpus(42);
        let split = CorpusSplit::chronological(trips.clone(), 0.70, 0.15);
        assert_eq!(split.train.len(), 1_400);
        assert_eq!(split.validation.len(), 300);
        assert_eq!(split.test.len(), 300);
        assert_eq!(split.len(), trips.len());

        let ids: HashSet<TripId> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .map(|t| t.id)
            .collect();
        assert_eq!(ids.len(), trips.len());

        let last_train = split.train.last().unwrap().request_time;
        let first_val = split.validation.first().unwrap().request_time;
        let last_val = split.validation.last().unwrap().request_time;
        let first_test = split.test.first().unwrap().request_time;
        assert!(last_train <= first_val && last_val <= first_test);
    }

    #[test]
    fn empty_corpus_splits_into_nothing() {
        let split = CorpusSplit::chronological(Vec::new(), 0.7, 0.15);
        assert!(split.is_empty());
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_io {
    use std::io::Cursor;

    use super::*;
    use crate::{SynthError, read_trips, read_trips_csv, write_trips, write_trips_csv};

    #[test]
    fn corpus_survives_export_and_import() {
        let trips = corpus(5);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trips.csv");
        write_trips_csv(&path, &trips).unwrap();
        assert_eq!(read_trips_csv(&path).unwrap(), trips);
    }

    #[test]
    fn header_is_fixed() {
        let mut buf = Vec::new();
        write_trips(&mut buf, &corpus(5)[..1]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with(
            "trip_id,pickup_zone,dropoff_zone,request_time,weather,special_event,driver_efficiency,"
        ));
    }

    #[test]
    fn malformed_rows_are_errors() {
        let header = "trip_id,pickup_zone,dropoff_zone,request_time,weather,special_event,driver_efficiency,distance,base_minutes,traffic_minutes,weather_minutes,zone_minutes,event_minutes,duration_minutes\n";
        let bad_time = format!("{header}1,44,55,yesterday,clear,0,1.0,2,6,0,0,6,0,12\n");
        assert!(matches!(read_trips(Cursor::new(bad_time)), Err(SynthError::Validation(_))));

        let bad_flag = format!("{header}1,44,55,2024-01-16T08:30:00,clear,7,1.0,2,6,0,0,6,0,12\n");
        assert!(matches!(read_trips(Cursor::new(bad_flag)), Err(SynthError::Parse(_))));

        let bad_weather = format!("{header}1,44,55,2024-01-16T08:30:00,fog,0,1.0,2,6,0,0,6,0,12\n");
        assert!(matches!(read_trips(Cursor::new(bad_weather)), Err(SynthError::Csv(_))));
    }
}
