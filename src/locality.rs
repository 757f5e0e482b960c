use serde::Deserialize;

/// LocalityQuery
///
/// `(region, locality)` key used for both content and weather lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LocalityQuery {
    pub region: String,
    pub locality: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

struct Region {
    name: &'static str,
    localities: &'static [(&'static str, f64, f64)],
}

// Fixed table; coordinates are city-hall positions, not derived from anything.
const REGIONS: &[Region] = &[
    Region {
        name: "Seoul",
        localities: &[
            ("Jongno", 37.5735, 126.9790),
            ("Gangnam", 37.5172, 127.0473),
            ("Mapo", 37.5663, 126.9016),
        ],
    },
    Region {
        name: "Gyeonggi",
        localities: &[
            ("Suwon", 37.2636, 127.0286),
            ("Gapyeong", 37.8315, 127.5105),
            ("Paju", 37.7600, 126.7800),
        ],
    },
    Region {
        name: "Gangwon",
        localities: &[
            ("Chuncheon", 37.8813, 127.7298),
            ("Gangneung", 37.7519, 128.8761),
            ("Sokcho", 38.2070, 128.5918),
        ],
    },
    Region {
        name: "Chungcheong",
        localities: &[
            ("Daejeon", 36.3504, 127.3845),
            ("Gongju", 36.4465, 127.1190),
            ("Danyang", 36.9845, 128.3655),
        ],
    },
    Region {
        name: "Jeolla",
        localities: &[
            ("Jeonju", 35.8242, 127.1480),
            ("Yeosu", 34.7604, 127.6622),
            ("Suncheon", 34.9507, 127.4872),
        ],
    },
    Region {
        name: "Gyeongsang",
        localities: &[
            ("Busan", 35.1796, 129.0756),
            ("Gyeongju", 35.8562, 129.2247),
            ("Tongyeong", 34.8544, 128.4332),
        ],
    },
    Region {
        name: "Jeju",
        localities: &[
            ("Jeju City", 33.4996, 126.5312),
            ("Seogwipo", 33.2541, 126.5600),
        ],
    },
];

fn find_region(region: &str) -> Option<&'static Region> {
    REGIONS.iter().find(|r| r.name == region)
}

pub fn regions() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|r| r.name)
}

/// The fixed set of localities shown on a region page, in display order.
pub fn localities_of(region: &str) -> Option<Vec<&'static str>> {
    find_region(region).map(|r| r.localities.iter().map(|(name, _, _)| *name).collect())
}

pub fn coordinates(query: &LocalityQuery) -> Option<Coordinates> {
    find_region(&query.region)?
        .localities
        .iter()
        .find(|(name, _, _)| *name == query.locality)
        .map(|(_, lat, lon)| Coordinates {
            lat: *lat,
            lon: *lon,
        })
}
