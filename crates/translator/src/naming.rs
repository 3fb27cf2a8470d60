//! Identifier normalization and service naming

use once_cell::sync::Lazy;
use regex::Regex;

static VERSION_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}_\d{2}_\d{2}$").expect("valid version suffix pattern"));

/// Convert a raw (PascalCase) name to an underscored identifier
///
/// Already-underscored names are returned unchanged.
///
/// # Examples
/// ```
/// use svcmodel_translator::underscore;
///
/// assert_eq!(underscore("DeploymentId"), "deployment_id");
/// assert_eq!(underscore("deployment_id"), "deployment_id");
/// ```
pub fn underscore(name: &str) -> String {
    let mut result = String::new();
    let chars: Vec<char> = name.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            // Break before an uppercase letter that follows a lowercase
            // letter or digit, or that starts a new word after an acronym
            // (HTTPServer -> http_server)
            let should_add_underscore = i > 0
                && (chars[i - 1].is_lowercase()
                    || chars[i - 1].is_ascii_digit()
                    || (i + 1 < chars.len() && chars[i + 1].is_lowercase()));

            if should_add_underscore && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch == '-' || ch == ' ' || ch == '.' {
            if !result.is_empty() && !result.ends_with('_') {
                result.push('_');
            }
        } else {
            result.push(ch);
        }
    }

    while result.contains("__") {
        result = result.replace("__", "_");
    }

    result.trim_matches('_').to_string()
}

/// Strip a trailing `YYYY_MM_DD` API-version suffix from an operation name
///
/// # Examples
/// ```
/// use svcmodel_translator::strip_version_suffix;
///
/// assert_eq!(strip_version_suffix("GetObject2006_03_01"), "GetObject");
/// assert_eq!(strip_version_suffix("GetObjectV2"), "GetObjectV2");
/// ```
pub fn strip_version_suffix(name: &str) -> &str {
    match VERSION_SUFFIX.find(name) {
        Some(m) => &name[..m.start()],
        None => name,
    }
}

/// Derived naming metadata for a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    pub full_name: String,
    pub abbreviation: String,
    /// Always a valid identifier
    pub class_name: String,
}

/// Policy deriving service names from the endpoint and raw naming metadata
#[cfg_attr(test, mockall::automock)]
pub trait NamingPolicy {
    fn service_names<'a>(
        &self,
        endpoint: Option<&'a str>,
        full_name: Option<&'a str>,
        abbreviation: Option<&'a str>,
    ) -> ServiceNames;
}

/// Deterministic default naming policy
///
/// - full name: the raw full name, else the first endpoint label
/// - abbreviation: the raw abbreviation, else the full name
/// - class name: the abbreviation without leading `Amazon`/`AWS` words,
///   reduced to ASCII alphanumerics with the first letter upper-cased
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultNamingPolicy;

impl DefaultNamingPolicy {
    const VENDOR_WORDS: [&'static str; 2] = ["Amazon", "AWS"];

    fn endpoint_label(endpoint: &str) -> Option<&str> {
        let host = endpoint
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(endpoint);
        host.split('.').next().filter(|label| !label.is_empty())
    }

    fn class_name(abbreviation: &str) -> String {
        let words: Vec<&str> = abbreviation.split_whitespace().collect();
        let start = words
            .iter()
            .take_while(|w| Self::VENDOR_WORDS.contains(w))
            .count();
        // Keep the name when it consists of nothing but vendor words
        let kept = if start == words.len() {
            &words[..]
        } else {
            &words[start..]
        };

        let mut name: String = kept
            .iter()
            .flat_map(|w| w.chars())
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();

        if let Some(first) = name.chars().next() {
            name.replace_range(..1, &first.to_ascii_uppercase().to_string());
        }

        if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
            name.insert_str(0, "Svc");
        }
        name
    }
}

impl NamingPolicy for DefaultNamingPolicy {
    fn service_names(
        &self,
        endpoint: Option<&str>,
        full_name: Option<&str>,
        abbreviation: Option<&str>,
    ) -> ServiceNames {
        let full_name = full_name
            .or_else(|| endpoint.and_then(Self::endpoint_label))
            .unwrap_or_default()
            .to_string();
        let abbreviation = abbreviation
            .map(str::to_string)
            .unwrap_or_else(|| full_name.clone());
        let class_name = Self::class_name(&abbreviation);

        ServiceNames {
            full_name,
            abbreviation,
            class_name,
        }
    }
}
