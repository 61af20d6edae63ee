//! Mapping of stats-provider status vocabularies onto the store's own.

/// Map a provider game status code to the internal vocabulary
/// (`NS`, `IP`, `FT`, `PPD`, `CANC`). Unrecognized codes pass through
/// uppercased.
pub fn map_game_status(api_status: &str) -> String {
    match api_status.to_lowercase().as_str() {
        "ns" => "NS".to_string(),
        "live" | "1q" | "2q" | "3q" | "4q" | "ht" | "ot" => "IP".to_string(),
        "ft" => "FT".to_string(),
        "ppd" => "PPD".to_string(),
        "canc" => "CANC".to_string(),
        _ => api_status.to_uppercase(),
    }
}

/// Map a provider injury status to `OUT`, `DOUBTFUL`, `QUESTIONABLE` or
/// `PROBABLE`. Unknown values default to `QUESTIONABLE`.
pub fn map_injury_status(api_status: &str) -> String {
    match api_status.to_lowercase().as_str() {
        "out" | "injured reserve" => "OUT".to_string(),
        "doubtful" => "DOUBTFUL".to_string(),
        "questionable" => "QUESTIONABLE".to_string(),
        "probable" => "PROBABLE".to_string(),
        _ => "QUESTIONABLE".to_string(),
    }
}
