//! Few common places in the city of Wrocław, used in the demo.

use geo_types::Point;
use mapgl::{Feature, FeatureCollection};

/// Main train station of the city of Wrocław.
/// https://en.wikipedia.org/wiki/Wroc%C5%82aw_G%C5%82%C3%B3wny_railway_station
pub fn wroclaw_glowny() -> [f64; 2] {
    [17.03664, 51.09916]
}

/// Musical Theatre Capitol.
/// https://www.teatr-capitol.pl/
pub fn capitol() -> [f64; 2] {
    [17.03018, 51.10073]
}

/// Shopping center, and the main intercity bus station.
pub fn wroclavia() -> [f64; 2] {
    [17.03471, 51.09648]
}

pub fn market_square() -> [f64; 2] {
    [17.03203, 51.10995]
}

/// The places above with a made-up number of daily visitors.
pub fn visitors() -> FeatureCollection {
    [
        ("Wrocław Główny", wroclaw_glowny(), 52_000),
        ("Capitol", capitol(), 1_200),
        ("Wroclavia", wroclavia(), 31_000),
        ("Market Square", market_square(), 44_000),
    ]
    .into_iter()
    .map(|(name, [lon, lat], visitors)| {
        Feature::new(Point::new(lon, lat))
            .with_property("name", name)
            .with_property("visitors", visitors)
    })
    .collect()
}
