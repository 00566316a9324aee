//! Attribute sets produced by the image classifier.
//!
//! A classifier answers with a JSON object mapping open-vocabulary categories
//! (`age`, `hair`, `interest`, ...) to freeform descriptions. The values are
//! flattened into strings so the scorer can run substring matches on them.

use std::collections::BTreeMap;

use serde_json::Value;

/// Mapping from a normalised category to its freeform value.
///
/// Keys are trimmed and lower-cased on insertion, so each category holds at
/// most one value and a later insert for `Age` replaces an earlier `age`.
///
/// # Examples
///
/// ```
/// use swipe_core::AttributeSet;
///
/// let mut attrs = AttributeSet::default();
/// attrs.insert(" Age ", "25 years");
/// attrs.insert("age", "26 years");
/// assert_eq!(attrs.get("AGE"), Some("26 years"));
/// assert_eq!(attrs.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    values: BTreeMap<String, String>,
}

impl AttributeSet {
    /// Insert or replace the value for `category`.
    ///
    /// Blank categories are ignored.
    pub fn insert(&mut self, category: &str, value: impl Into<String>) {
        let key = normalise_key(category);
        if key.is_empty() {
            return;
        }
        self.values.insert(key, value.into());
    }

    /// Look up a category, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn get(&self, category: &str) -> Option<&str> {
        self.values.get(&normalise_key(category)).map(String::as_str)
    }

    /// Iterate over `(category, value)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of categories present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set holds no categories.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a set from a decoded JSON object.
    ///
    /// Returns `None` when `value` is not an object. Scalars are rendered as
    /// text, arrays of scalars are joined with `", "`, and `null` or nested
    /// objects are skipped.
    #[must_use]
    pub fn from_json_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut attrs = Self::default();
        for (category, raw) in object {
            if let Some(text) = render_value(raw) {
                attrs.insert(category, text);
            }
        }
        Some(attrs)
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut attrs = Self::default();
        for (category, value) in iter {
            attrs.insert(category.as_ref(), value);
        }
        attrs
    }
}

fn normalise_key(category: &str) -> String {
    category.trim().to_lowercase()
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_scalar).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        other => render_scalar(other),
    }
}

/// Remove Markdown code-fence markers that models wrap around JSON answers.
///
/// Both ```` ```json ```` and bare ```` ``` ```` fences are stripped, along
/// with surrounding whitespace.
///
/// # Examples
///
/// ```
/// use swipe_core::strip_code_fences;
///
/// assert_eq!(strip_code_fences("```json\n{\"age\": 25}\n```"), "{\"age\": 25}");
/// assert_eq!(strip_code_fences("{}"), "{}");
/// ```
#[must_use]
pub fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        text = rest
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric())
            .trim();
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn keys_are_normalised_and_last_value_wins() {
        let attrs: AttributeSet = [("Hair", "brown"), (" hair ", "black")].into_iter().collect();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("HAIR"), Some("black"));
    }

    #[rstest]
    fn blank_categories_are_ignored() {
        let mut attrs = AttributeSet::default();
        attrs.insert("   ", "anything");
        assert!(attrs.is_empty());
    }

    #[rstest]
    fn json_values_are_flattened() {
        let value = json!({
            "age": 25,
            "smiling": true,
            "interest": ["travel", "food", null],
            "style": "casual",
            "unknown": null,
            "nested": {"a": 1}
        });

        let attrs = AttributeSet::from_json_value(&value).expect("object input");

        assert_eq!(attrs.get("age"), Some("25"));
        assert_eq!(attrs.get("smiling"), Some("true"));
        assert_eq!(attrs.get("interest"), Some("travel, food"));
        assert_eq!(attrs.get("style"), Some("casual"));
        assert!(attrs.get("unknown").is_none());
        assert!(attrs.get("nested").is_none());
    }

    #[rstest]
    #[case(json!([1, 2]))]
    #[case(json!("text"))]
    #[case(json!(null))]
    fn non_objects_are_rejected(#[case] value: Value) {
        assert!(AttributeSet::from_json_value(&value).is_none());
    }

    #[rstest]
    #[case("```json\n{\"a\":1}\n```", "{\"a\":1}")]
    #[case("```\n{\"a\":1}```", "{\"a\":1}")]
    #[case("  {\"a\":1}  ", "{\"a\":1}")]
    #[case("```JSON {\"a\":1} ```", "{\"a\":1}")]
    fn code_fences_are_stripped(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(strip_code_fences(raw), expected);
    }
}
