//! Small in-memory gazetteer shaped like an extract of Bremerhaven.
//!
//! Two places share the name "Test" but lie in different districts and
//! postcodes; "Gartenstraße" carries house number "13".

use crate::{Area, AreaLevel, Coordinates, Gazetteer, HouseNumber, Place, RecordId, Street};

/// "Test" in Mitte, postcode 27568.
pub const TEST_MITTE: RecordId = 0;
/// "Test" in Lehe, postcode 27570.
pub const TEST_LEHE: RecordId = 1;
/// "Am Wasserturm" in Geestemünde, postcode 27570.
pub const WASSERTURM: RecordId = 2;
/// "Gartenstraße" in Mitte, postcode 27568.
pub const GARTENSTRASSE: RecordId = 3;
/// "Hochschulstraße" in Lehe, postcode 27570.
pub const HOCHSCHULSTRASSE: RecordId = 4;
/// "Bürgermeister-Smidt-Straße" in Mitte, postcode 27568.
pub const SMIDT_STRASSE: RecordId = 5;

pub const AREA_BREMEN: u32 = 0;
pub const AREA_BREMERHAVEN: u32 = 1;
pub const AREA_MITTE: u32 = 2;
pub const AREA_LEHE: u32 = 3;
pub const AREA_PLZ_27568: u32 = 4;
pub const AREA_PLZ_27570: u32 = 5;
pub const AREA_GEESTEMUENDE: u32 = 6;

/// Latitude/longitude of Gartenstraße 13.
pub const GARTENSTRASSE_13: (f64, f64) = (53.551_2, 8.579_5);

fn admin(level: u8) -> AreaLevel {
    AreaLevel::admin(level).unwrap_or(AreaLevel::POSTCODE)
}

/// Builds the fixture gazetteer.
#[must_use]
pub fn bremerhaven() -> Gazetteer {
    let c = Coordinates::from_degrees;
    let all = |district: u32, postcode: u32| vec![AREA_BREMEN, AREA_BREMERHAVEN, district, postcode];

    Gazetteer {
        names: [
            "Test",
            "Am Wasserturm",
            "Gartenstraße",
            "Hochschulstraße",
            "Bürgermeister-Smidt-Straße",
        ]
        .map(String::from)
        .to_vec(),
        area_names: ["Bremen", "Bremerhaven", "Mitte", "Lehe", "Geestemünde"]
            .map(String::from)
            .to_vec(),
        house_numbers: ["13", "7a", "21", "1"].map(String::from).to_vec(),
        places: vec![
            Place {
                name_id: 0,
                coordinates: c(53.548_0, 8.579_0),
                areas: all(AREA_MITTE, AREA_PLZ_27568),
            },
            Place {
                name_id: 0,
                coordinates: c(53.567_0, 8.592_0),
                areas: all(AREA_LEHE, AREA_PLZ_27570),
            },
            Place {
                name_id: 1,
                coordinates: c(53.529_0, 8.599_0),
                areas: all(AREA_GEESTEMUENDE, AREA_PLZ_27570),
            },
        ],
        streets: vec![
            Street {
                name_id: 2,
                house_numbers: vec![
                    HouseNumber {
                        house_number_id: 0,
                        coordinates: c(GARTENSTRASSE_13.0, GARTENSTRASSE_13.1),
                    },
                    HouseNumber {
                        house_number_id: 1,
                        coordinates: c(53.551_6, 8.580_1),
                    },
                ],
                areas: all(AREA_MITTE, AREA_PLZ_27568),
            },
            Street {
                name_id: 3,
                house_numbers: vec![HouseNumber {
                    house_number_id: 2,
                    coordinates: c(53.540_5, 8.583_0),
                }],
                areas: all(AREA_LEHE, AREA_PLZ_27570),
            },
            Street {
                name_id: 4,
                house_numbers: vec![HouseNumber {
                    house_number_id: 3,
                    coordinates: c(53.545_0, 8.576_0),
                }],
                areas: all(AREA_MITTE, AREA_PLZ_27568),
            },
        ],
        areas: vec![
            Area::admin(0, admin(4), 1.0),
            Area::admin(1, admin(6), 1.0),
            Area::admin(2, admin(10), 1.0),
            Area::admin(3, admin(10), 1.0),
            Area::postcode(27568),
            Area::postcode(27570),
            Area::admin(4, admin(10), 1.0),
        ],
    }
}
