//! JSON-LD and microdata detection

use crate::error::Result;
use crate::fetch::Fetcher;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::LazyLock;
use url::Url;

static JSON_LD: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"script[type="application/ld+json"]"#).expect("valid selector")
});
static MICRODATA: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[itemtype]").expect("valid selector"));

/// Error recorded for each JSON-LD block that fails to parse
pub const INVALID_JSON_LD: &str = "Invalid JSON-LD syntax found";

/// Schema markup found on a page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredDataResult {
    pub has_schema: bool,
    pub types: Vec<String>,
    pub errors: Vec<String>,
}

impl StructuredDataResult {
    /// Result used when the page could not be fetched
    pub fn fallback() -> Self {
        Self {
            errors: vec!["Could not analyze structured data".to_string()],
            ..Self::default()
        }
    }

    /// Fetch `url` and look for schema markup
    pub async fn analyze(fetcher: &Fetcher, url: &Url) -> Result<Self> {
        let page = fetcher.get(url).await?;
        Ok(Self::from_html(&page.body))
    }

    /// Look for JSON-LD blocks and microdata in an HTML document
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut types = Vec::new();
        let mut errors = Vec::new();

        for script in document.select(&JSON_LD) {
            let source = script.text().collect::<String>();
            match serde_json::from_str::<Value>(source.trim()) {
                Ok(data) => match data.get("@type") {
                    Some(Value::String(kind)) => types.push(kind.clone()),
                    Some(Value::Array(kinds)) => types.extend(
                        kinds
                            .iter()
                            .filter_map(Value::as_str)
                            .map(str::to_string),
                    ),
                    _ => {}
                },
                Err(_) => errors.push(INVALID_JSON_LD.to_string()),
            }
        }

        let has_microdata = document.select(&MICRODATA).next().is_some();

        Self {
            has_schema: !types.is_empty() || has_microdata,
            types,
            errors,
        }
    }
}
