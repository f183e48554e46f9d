/// Environment variable holding the Wunderground API key
pub const API_KEY_ENV: &str = "WUNDERGROUND_APIKEY";

/// Prefix for settings read from the environment (e.g. `WXDATA_DAYS=30`)
pub const SETTINGS_ENV_PREFIX: &str = "WXDATA";

/// API defaults
pub const DEFAULT_API_BASE_URL: &str = "http://api.wunderground.com/api";
pub const DEFAULT_API_PRODUCT: &str = "history";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Free tier allows 10 calls per minute
pub const DEFAULT_RATE_LIMIT_SECS: u64 = 7;

/// Query window
pub const DEFAULT_DAYS: u32 = 14;

/// Output locations
pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_DATASET_FILE: &str = "dataset.csv";
pub const DEFAULT_UNLABELED_FILE: &str = "dataset_unlabeled.csv";
pub const DEFAULT_LOG_FILE: &str = "weather-dataset.log";
pub const CACHE_FILE_EXTENSION: &str = "json";

/// Date and time formats used in keys and cache file names
pub const DATE_FORMAT: &str = "%Y%m%d";
pub const TIME_FORMAT: &str = "%H:%M";

/// Place identifiers are `Region/City`
pub const PLACE_SEPARATOR: char = '/';

pub const DEFAULT_PLACES: &[&str] = &[
    "Norway/Oslo",
    "Norway/Stavanger",
    "Norway/Kristiansand",
    "Norway/Bergen",
    "Norway/Trondheim",
];

/// Observation fields kept per place (purely informative fields excluded)
pub const DEFAULT_FIELDS: &[&str] = &[
    "conds",
    "dewpti",
    "dewptm",
    "fog",
    "hail",
    "heatindexi",
    "heatindexm",
    "hum",
    "precipi",
    "precipm",
    "pressurei",
    "pressurem",
    "rain",
    "snow",
    "tempi",
    "tempm",
    "thunder",
    "tornado",
    "visi",
    "vism",
    "wdird",
    "wdire",
    "wgusti",
    "wgustm",
    "windchilli",
    "windchillm",
    "wspdi",
    "wspdm",
];

/// Raw values the API uses for "no reading"
pub const DEFAULT_SENTINELS: &[&str] = &["999", "-999", "-9999", "-9999.0", "-9999.00"];

/// Fields whose name contains this are never sentinel-filtered
pub const PRESSURE_FIELD_MARKER: &str = "pressure";

/// Label defaults: tomorrow's noon temperature in Oslo
pub const DEFAULT_TARGET_PLACE: &str = "Norway/Oslo";
pub const DEFAULT_TARGET_TIME: &str = "12:00";
pub const DEFAULT_TARGET_FIELD: &str = "tempm";

/// CSV column names
pub const DATETIME_COLUMN: &str = "datetime";
pub const TARGET_COLUMN_PREFIX: &str = "target";
pub const LONG_LAYOUT_KEY_COLUMNS: &[&str] = &["place", "date", "utctime"];
