//! Special-event calendar.
//!
//! Each simulated day independently hosts one event with the configured
//! probability.  The venue is a business or coastal zone; during
//! [`EVENING_HOURS`] trips starting or ending within one grid step of it are
//! slowed down.  The calendar is drawn once per corpus from its own
//! [`SimRng`] stream, before any trip is generated.

use chrono::NaiveDate;

use eta_core::time::EVENING_HOURS;
use eta_core::{CityGrid, SimRng, ZoneId, ZoneType};

/// Grid distance from the venue within which trips are affected.
pub const EVENT_RADIUS: u32 = 1;

#[derive(Clone, Debug, Default)]
pub struct EventCalendar {
    start: Option<NaiveDate>,
    /// Indexed by day offset from `start`.
    venues: Vec<Option<ZoneId>>,
}

impl EventCalendar {
    pub fn generate(
        grid: CityGrid,
        start: NaiveDate,
        days: u32,
        probability: f64,
        rng: &mut SimRng,
    ) -> Self {
        let candidates: Vec<ZoneId> = grid
            .zones()
            .filter(|z| matches!(z.zone_type, ZoneType::Business | ZoneType::Coastal))
            .map(|z| z.id)
            .collect();

        let venues = (0..days)
            .map(|_| {
                if rng.gen_bool(probability) { rng.choose(&candidates).copied() } else { None }
            })
            .collect();

        Self { start: Some(start), venues }
    }

    /// Venue of the event on `date`, if there is one.
    pub fn venue_on(&self, date: NaiveDate) -> Option<ZoneId> {
        let start = self.start?;
        let offset = usize::try_from((date - start).num_days()).ok()?;
        self.venues.get(offset).copied().flatten()
    }

    pub fn event_days(&self) -> usize {
        self.venues.iter().filter(|v| v.is_some()).count()
    }

    /// Whether a trip between `pickup` and `dropoff` at (`date`, `hour`) is
    /// caught in event traffic.
    pub fn affects(
        &self,
        grid: &CityGrid,
        date: NaiveDate,
        hour: u32,
        pickup: ZoneId,
        dropoff: ZoneId,
    ) -> bool {
        if !EVENING_HOURS.contains(hour) {
            return false;
        }
        let Some(venue) = self.venue_on(date) else {
            return false;
        };
        [pickup, dropoff]
            .into_iter()
            .any(|z| grid.distance(z, venue).is_ok_and(|d| d <= EVENT_RADIUS))
    }
}
