use serde::Deserialize;

/// Merchant category with its ISO 18245 merchant category code.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MerchantCategory {
    pub name: String,
    pub mcc_code: String
}

/// A city centre that generated locations are scattered around.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct City {
    pub name: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64
}

const MERCHANT_CATEGORIES: [(&str, &str); 15] = [
    ("Grocery", "5411"),
    ("Restaurant", "5812"),
    ("Gas Station", "5541"),
    ("Online Shopping", "5964"),
    ("Entertainment", "7832"),
    ("Travel", "4722"),
    ("Healthcare", "8062"),
    ("Utilities", "4900"),
    ("Electronics", "5732"),
    ("Clothing", "5651"),
    ("Home Improvement", "5200"),
    ("Insurance", "6300"),
    ("Subscription Services", "5968"),
    ("Financial Services", "6012"),
    ("Education", "8220")
];

const CITIES: [(&str, &str, f64, f64); 24] = [
    ("New York", "US", 40.7128, -74.0060),
    ("San Francisco", "US", 37.7749, -122.4194),
    ("Chicago", "US", 41.8781, -87.6298),
    ("Toronto", "CA", 43.6532, -79.3832),
    ("Vancouver", "CA", 49.2827, -123.1207),
    ("Mexico City", "MX", 19.4326, -99.1332),
    ("Sao Paulo", "BR", -23.5505, -46.6333),
    ("Buenos Aires", "AR", -34.6037, -58.3816),
    ("London", "GB", 51.5074, -0.1278),
    ("Manchester", "GB", 53.4808, -2.2426),
    ("Paris", "FR", 48.8566, 2.3522),
    ("Berlin", "DE", 52.5200, 13.4050),
    ("Madrid", "ES", 40.4168, -3.7038),
    ("Amsterdam", "NL", 52.3676, 4.9041),
    ("Zurich", "CH", 47.3769, 8.5417),
    ("Geneva", "CH", 46.2044, 6.1432),
    ("Stockholm", "SE", 59.3293, 18.0686),
    ("Dubai", "AE", 25.2048, 55.2708),
    ("Mumbai", "IN", 19.0760, 72.8777),
    ("Singapore", "SG", 1.3521, 103.8198),
    ("Tokyo", "JP", 35.6762, 139.6503),
    ("Sydney", "AU", -33.8688, 151.2093),
    ("Melbourne", "AU", -37.8136, 144.9631),
    ("Cape Town", "ZA", -33.9249, 18.4241)
];

pub const NAME_PREFIXES: [&str; 12] = [
    "Blue", "Golden", "Northern", "Silver", "Evergreen", "Harbor",
    "Summit", "Red", "Pioneer", "Urban", "Coastal", "Granite"
];

pub const NAME_STEMS: [&str; 12] = [
    "Oak", "River", "Peak", "Lantern", "Meadow", "Anchor",
    "Maple", "Falcon", "Bridge", "Cedar", "Orchard", "Harvest"
];

pub const NAME_SUFFIXES: [&str; 10] = [
    "Market", "Group", "Supply Co.", "Holdings", "Outfitters",
    "Trading", "& Sons", "Partners", "Collective", "Inc."
];

pub fn default_merchant_categories() -> Vec<MerchantCategory> {
    MERCHANT_CATEGORIES.iter()
        .map(|(name, mcc_code)| MerchantCategory {
            name: name.to_string(),
            mcc_code: mcc_code.to_string()
        })
        .collect()
}

pub fn default_cities() -> Vec<City> {
    CITIES.iter()
        .map(|(name, country, latitude, longitude)| City {
            name: name.to_string(),
            country: country.to_string(),
            latitude: *latitude,
            longitude: *longitude
        })
        .collect()
}
