use crate::types::compass::CompassSector;
use crate::types::region::WindRose;
use crate::types::zone::Zone;
use crate::utils::round_to;

/// Decimals kept for each sector mean.
pub const WIND_ROSE_DECIMALS: i32 = 2;

/// Buckets zones by the sector of their wind direction and averages their wind speed.
///
/// Zones without wind data are left out. Empty sectors hold 0.0.
pub fn compute_wind_rose<'a>(zones: impl IntoIterator<Item = &'a Zone>) -> WindRose {
    let mut sums = [0.0f64; 8];
    let mut counts = [0usize; 8];
    for zone in zones {
        let (Some(direction), Some(speed)) =
            (zone.metrics.wind_direction, zone.metrics.avg_wind_speed)
        else {
            continue;
        };
        let slot = CompassSector::from_degrees(direction).index();
        sums[slot] += speed;
        counts[slot] += 1;
    }

    let mut rose = WindRose::default();
    for sector in CompassSector::ALL {
        let slot = sector.index();
        if counts[slot] > 0 {
            rose.set(
                sector,
                round_to(sums[slot] / counts[slot] as f64, WIND_ROSE_DECIMALS),
            );
        }
    }
    rose
}
