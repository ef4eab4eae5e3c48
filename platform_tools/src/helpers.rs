use chrono::{DateTime, Duration, Utc};
use osim_common::round_money;
use rand::{seq::SliceRandom, Rng};

use crate::{
    fixtures::{Product, PRODUCTS},
    SynthesisError,
};

/// Offset of the channels' local time (America/Bogota) from UTC, in hours.
pub const LOCAL_UTC_OFFSET_HOURS: i64 = -5;

/// Picks one entry of a fixture table.
pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, table: &'a [T], name: &'static str) -> Result<&'a T, SynthesisError> {
    table.choose(rng).ok_or(SynthesisError::EmptyFixtureTable(name))
}

/// Picks between one and `max` distinct products, each paired with a quantity in `1..=max_quantity`.
pub fn pick_lines<R: Rng + ?Sized>(
    rng: &mut R,
    max: usize,
    max_quantity: i64,
) -> Result<Vec<(&'static Product, i64)>, SynthesisError> {
    if PRODUCTS.is_empty() {
        return Err(SynthesisError::EmptyFixtureTable("products"));
    }
    let n = rng.gen_range(1..=max.min(PRODUCTS.len()).max(1));
    let lines = PRODUCTS.choose_multiple(rng, n).map(|p| (p, rng.gen_range(1..=max_quantity.max(1)))).collect();
    Ok(lines)
}

/// A moment up to two hours before `now`, truncated to whole seconds.
pub fn random_past<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    let t = now - Duration::seconds(rng.gen_range(0..=7200));
    t - Duration::nanoseconds(i64::from(t.timestamp_subsec_nanos()))
}

/// Shipping cost in `[3000, 8000)`, rounded to the hundred.
pub fn random_shipping_cost<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    f64::from(rng.gen_range(30..80_u32)) * 100.0
}

/// ISO-8601 in channel local time with millisecond precision, e.g. `2024-05-01T10:22:33.000-05:00`.
pub fn local_timestamp_millis(t: DateTime<Utc>) -> String {
    format!("{}-05:00", (t + Duration::hours(LOCAL_UTC_OFFSET_HOURS)).format("%Y-%m-%dT%H:%M:%S%.3f"))
}

/// ISO-8601 in channel local time, e.g. `2024-05-01T10:22:33-05:00`.
pub fn local_timestamp(t: DateTime<Utc>) -> String {
    format!("{}-05:00", (t + Duration::hours(LOCAL_UTC_OFFSET_HOURS)).format("%Y-%m-%dT%H:%M:%S"))
}

/// Zone-less local timestamp, e.g. `2024-05-01T10:22:33`.
pub fn naive_local_timestamp(t: DateTime<Utc>) -> String {
    (t + Duration::hours(LOCAL_UTC_OFFSET_HOURS)).format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Zone-less UTC timestamp, e.g. `2024-05-01T15:22:33`.
pub fn naive_utc_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn tax_on(amount: f64, rate: f64) -> f64 {
    round_money(amount * rate)
}

/// A string of `len` random decimal digits.
pub fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len).map(|_| char::from(b'0' + rng.gen_range(0..10_u8))).collect()
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;

    #[test]
    fn timestamps() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 15, 22, 33).unwrap();
        assert_eq!(local_timestamp_millis(t), "2024-05-01T10:22:33.000-05:00");
        assert_eq!(local_timestamp(t), "2024-05-01T10:22:33-05:00");
        assert_eq!(naive_local_timestamp(t), "2024-05-01T10:22:33");
        assert_eq!(naive_utc_timestamp(t), "2024-05-01T15:22:33");
        assert_eq!(DateTime::parse_from_rfc3339(&local_timestamp(t)).unwrap(), t);
    }

    #[test]
    fn random_values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        let now = Utc::now();
        for _ in 0..200 {
            let cost = random_shipping_cost(&mut rng);
            assert!((3000.0..8000.0).contains(&cost));
            let past = random_past(&mut rng, now);
            assert!(past <= now);
            assert_eq!(past.timestamp_subsec_nanos(), 0);
            let lines = pick_lines(&mut rng, 3, 3).unwrap();
            assert!((1..=3).contains(&lines.len()));
            assert!(lines.iter().all(|(_, q)| (1..=3).contains(q)));
        }
        assert_eq!(random_digits(&mut rng, 12).len(), 12);
    }

    #[test]
    fn pick_from_empty_table() {
        let mut rng = StdRng::seed_from_u64(1);
        let empty: [u8; 0] = [];
        assert_eq!(pick(&mut rng, &empty, "nothing"), Err(SynthesisError::EmptyFixtureTable("nothing")));
    }
}
