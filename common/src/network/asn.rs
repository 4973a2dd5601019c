/// Origin autonomous system of an address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsInfo {
    /// Plain digits, e.g. `15169`.
    pub number: String,
    pub name: String,
}

impl AsInfo {
    pub fn new(number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            name: name.into(),
        }
    }
}

/// Strips a leading `AS`/`as` from an AS token. `AS64500` and `64500` both
/// become `64500`.
pub fn strip_as_prefix(token: &str) -> &str {
    let token = token.trim();
    token
        .strip_prefix("AS")
        .or_else(|| token.strip_prefix("as"))
        .unwrap_or(token)
}
