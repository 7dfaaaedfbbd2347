/// Parse an optional numeric id. The values "none", "false", "off" and "" explicitly disable the setting and return
/// `Ok(None)`. Anything else must be a valid integer.
pub fn parse_optional_id(value: &str) -> Result<Option<i64>, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "none" | "false" | "off" => Ok(None),
        s => s.parse::<i64>().map(Some).map_err(|e| format!("'{value}' is not a valid id. {e}")),
    }
}
