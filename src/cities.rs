//! Preset Indonesian cities used when a principal has no stored coordinates.

pub struct City {
    pub name: &'static str,
    pub timezone: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    /// Meters above sea level.
    pub elevation: f64,
}

pub const INDONESIAN_CITIES: [City; 10] = [
    City {
        name: "Jakarta",
        timezone: "Asia/Jakarta",
        latitude: -6.2088,
        longitude: 106.8456,
        elevation: 8.0,
    },
    City {
        name: "Bandung",
        timezone: "Asia/Jakarta",
        latitude: -6.9175,
        longitude: 107.6191,
        elevation: 768.0,
    },
    City {
        name: "Surabaya",
        timezone: "Asia/Jakarta",
        latitude: -7.2575,
        longitude: 112.7521,
        elevation: 3.0,
    },
    City {
        name: "Yogyakarta",
        timezone: "Asia/Jakarta",
        latitude: -7.7956,
        longitude: 110.3695,
        elevation: 114.0,
    },
    City {
        name: "Semarang",
        timezone: "Asia/Jakarta",
        latitude: -6.9667,
        longitude: 110.4167,
        elevation: 3.0,
    },
    City {
        name: "Medan",
        timezone: "Asia/Jakarta",
        latitude: 3.5952,
        longitude: 98.6722,
        elevation: 25.0,
    },
    City {
        name: "Makassar",
        timezone: "Asia/Makassar",
        latitude: -5.1477,
        longitude: 119.4327,
        elevation: 5.0,
    },
    City {
        name: "Palembang",
        timezone: "Asia/Jakarta",
        latitude: -2.9761,
        longitude: 104.7754,
        elevation: 8.0,
    },
    City {
        name: "Bali",
        timezone: "Asia/Makassar",
        latitude: -8.4095,
        longitude: 115.1889,
        elevation: 75.0,
    },
    City {
        name: "Malang",
        timezone: "Asia/Jakarta",
        latitude: -7.9797,
        longitude: 112.6304,
        elevation: 506.0,
    },
];

pub fn find(name: &str) -> Option<&'static City> {
    INDONESIAN_CITIES.iter().find(|c| c.name.eq_ignore_ascii_case(name))
}

/// Jakarta, the fallback when nothing else resolves.
pub fn default_city() -> &'static City {
    &INDONESIAN_CITIES[0]
}
