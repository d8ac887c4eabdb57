//! Icons used by navigation and property feature lists.
//!
//! Keys coming from the backend (feature names) are mapped onto a closed set of
//! icons; anything unknown renders the generic icon.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Home,
    Dashboard,
    Building,
    Calendar,
    Receipt,
    Coins,
    User,
    Bell,
    Wifi,
    Pool,
    Parking,
    Power,
    AirConditioning,
    Kitchen,
    Security,
    Gym,
    Bed,
    Bath,
    Location,
    Verified,
    Generic,
}

impl Icon {
    /// Maps a free-form key such as `"Swimming Pool"` or `"wifi"` to an icon.
    pub fn from_key(key: &str) -> Icon {
        let key = key.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "home" => Icon::Home,
            "dashboard" | "overview" => Icon::Dashboard,
            "properties" | "property" | "building" => Icon::Building,
            "bookings" | "booking" | "calendar" => Icon::Calendar,
            "transactions" | "transaction" | "receipt" => Icon::Receipt,
            "credits" | "credit" | "subscription" => Icon::Coins,
            "profile" | "user" | "account" => Icon::User,
            "notifications" | "notification" | "bell" => Icon::Bell,
            "wifi" | "wi fi" | "internet" => Icon::Wifi,
            "pool" | "swimming pool" => Icon::Pool,
            "parking" | "car park" | "garage" => Icon::Parking,
            "power" | "24/7 power" | "generator" | "electricity" => Icon::Power,
            "ac" | "air conditioning" | "air conditioner" => Icon::AirConditioning,
            "kitchen" => Icon::Kitchen,
            "security" | "24/7 security" | "cctv" => Icon::Security,
            "gym" | "fitness" => Icon::Gym,
            "bed" | "beds" => Icon::Bed,
            "bath" | "baths" => Icon::Bath,
            "location" => Icon::Location,
            "verified" => Icon::Verified,
            _ => Icon::Generic,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Icon::Home => "🏠",
            Icon::Dashboard => "📊",
            Icon::Building => "🏢",
            Icon::Calendar => "📅",
            Icon::Receipt => "🧾",
            Icon::Coins => "🪙",
            Icon::User => "👤",
            Icon::Bell => "🔔",
            Icon::Wifi => "📶",
            Icon::Pool => "🏊",
            Icon::Parking => "🅿️",
            Icon::Power => "⚡",
            Icon::AirConditioning => "❄️",
            Icon::Kitchen => "🍳",
            Icon::Security => "🛡️",
            Icon::Gym => "🏋️",
            Icon::Bed => "🛏️",
            Icon::Bath => "🛁",
            Icon::Location => "📍",
            Icon::Verified => "✅",
            Icon::Generic => "•",
        }
    }

    pub fn render(&self) -> String {
        format!(r#"<span class="icon" aria-hidden="true">{}</span>"#, self.glyph())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_are_case_and_separator_insensitive() {
        assert_eq!(Icon::from_key("Swimming_Pool"), Icon::Pool);
        assert_eq!(Icon::from_key(" WiFi "), Icon::Wifi);
        assert_eq!(Icon::from_key("air-conditioning"), Icon::AirConditioning);
    }

    #[test]
    fn test_unknown_keys_fall_back_to_generic() {
        assert_eq!(Icon::from_key("helipad"), Icon::Generic);
        assert_eq!(Icon::from_key(""), Icon::Generic);
    }
}
