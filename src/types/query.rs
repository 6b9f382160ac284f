//! Query types
//!
//! Two request shapes map onto the same hybrid contract: a structured
//! shipment description used by the rule engine (and, through its free-text
//! fields, by the document catalog), and a free-text lookup used for
//! classification code suggestions.

use serde::{Deserialize, Deserializer, Serialize};

/// Number of suggestions returned when the caller does not pass `k`
pub const DEFAULT_SUGGESTION_COUNT: i64 = 5;

/// Treat an explicit JSON `null` the same as an absent field
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn default_k() -> i64 {
    DEFAULT_SUGGESTION_COUNT
}

/// `k` as sent by the caller; `null` means the default
fn nullable_k<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(|k| k.unwrap_or(DEFAULT_SUGGESTION_COUNT))
}

/// Structured shipment query evaluated by the rule engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredQuery {
    #[serde(default, deserialize_with = "nullable")]
    pub origin_country: String,
    #[serde(default, deserialize_with = "nullable")]
    pub destination_country: String,
    #[serde(default, deserialize_with = "nullable")]
    pub hs_code: String,
    #[serde(default, deserialize_with = "nullable")]
    pub hts_flag: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub product_category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub product_description: String,
    #[serde(default, deserialize_with = "nullable")]
    pub package_type_weight: String,
    #[serde(default, deserialize_with = "nullable")]
    pub mode_of_transport: String,
}

impl StructuredQuery {
    /// The five fields that carry signal for either engine
    pub fn signal_fields(&self) -> [&str; 5] {
        [
            self.origin_country.as_str(),
            self.destination_country.as_str(),
            self.hs_code.as_str(),
            self.product_category.as_str(),
            self.product_description.as_str(),
        ]
    }

    /// At least one signal field is non-blank
    pub fn has_signal(&self) -> bool {
        self.signal_fields().iter().any(|f| !f.trim().is_empty())
    }

    /// Free-text fields fed to the document catalog search
    pub fn semantic_fields(&self) -> [&str; 3] {
        [
            self.product_category.as_str(),
            self.product_description.as_str(),
            self.hs_code.as_str(),
        ]
    }
}

/// Free-text lookup against the classification code catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeTextQuery {
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(default, deserialize_with = "nullable")]
    pub description: String,
    /// Requested count; zero or negative yields no suggestions
    #[serde(default = "default_k", deserialize_with = "nullable_k")]
    pub k: i64,
}

impl FreeTextQuery {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
        k: i64,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            description: description.into(),
            k,
        }
    }

    pub fn fields(&self) -> [&str; 3] {
        [self.name.as_str(), self.category.as_str(), self.description.as_str()]
    }

    /// Number of neighbors to request, zero when `k` is not positive
    pub fn limit(&self) -> usize {
        usize::try_from(self.k.max(0)).unwrap_or(usize::MAX)
    }
}

impl Default for FreeTextQuery {
    fn default() -> Self {
        Self::new("", "", "", DEFAULT_SUGGESTION_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_query_null_fields() {
        let query: StructuredQuery = serde_json::from_str(
            r#"{"origin_country": "US", "hs_code": null, "hts_flag": null}"#,
        )
        .unwrap();
        assert_eq!(query.origin_country, "US");
        assert_eq!(query.hs_code, "");
        assert!(!query.hts_flag);
    }

    #[test]
    fn test_has_signal_ignores_whitespace() {
        let mut query = StructuredQuery {
            product_description: "   ".to_string(),
            mode_of_transport: "sea".to_string(),
            ..Default::default()
        };
        // transport mode alone is not a signal field
        assert!(!query.has_signal());

        query.hs_code = "8471".to_string();
        assert!(query.has_signal());
    }

    #[test]
    fn test_free_text_default_k() {
        let query: FreeTextQuery = serde_json::from_str(r#"{"name": "bike"}"#).unwrap();
        assert_eq!(query.k, DEFAULT_SUGGESTION_COUNT);
        assert_eq!(query.category, "");

        let query: FreeTextQuery = serde_json::from_str(r#"{"name": "bike", "k": null}"#).unwrap();
        assert_eq!(query.limit(), 5);
    }

    #[test]
    fn test_non_positive_k_limits_to_zero() {
        let query: FreeTextQuery = serde_json::from_str(r#"{"name": "bike", "k": -1}"#).unwrap();
        assert_eq!(query.k, -1);
        assert_eq!(query.limit(), 0);
        assert_eq!(FreeTextQuery::new("bike", "", "", 0).limit(), 0);
        assert_eq!(FreeTextQuery::new("bike", "", "", i64::MIN).limit(), 0);
        assert_eq!(FreeTextQuery::new("bike", "", "", 1 << 40).limit(), 1usize << 40);
    }
}
