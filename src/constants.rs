//! Application constants and configuration

pub const APP_NAME: &str = "Slooze";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when neither settings.json nor the environment names one
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
/// Environment override for the backend base URL
pub const API_URL_ENV: &str = "SLOOZE_API_URL";

/// Name of the session cookie issued by `POST /auth/login`
pub const SESSION_COOKIE: &str = "access_token";

/// Restaurants shown per page
pub const DEFAULT_PAGE_SIZE: u32 = 3;

/// Countries a new restaurant can be created in
pub const COUNTRIES: [&str; 2] = ["INDIA", "AMERICA"];

/// Currency symbol used for every price
pub const CURRENCY: &str = "₹";

pub const REQUEST_TIMEOUT_SECS: u64 = 15;
