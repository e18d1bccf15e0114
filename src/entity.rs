//! Wire shapes of the entity-search response and their normalized form.
//!
//! The upstream payload treats every field as optional. Defaults are resolved
//! exactly once, in [`Entity::from`], so the rendering layer never has to ask
//! whether a value exists beyond the genuinely optional ones.

use serde::{Deserialize, Serialize};

pub const UNKNOWN_ENTITY: &str = "Unknown Entity";
pub const DEFAULT_TYPE: &str = "Thing";
const KG_PREFIX: &str = "kg:";
const KG_SEARCH_URL: &str = "https://www.google.com/search?kgmid=";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchResponse {
    #[serde(rename = "itemListElement", default)]
    pub item_list_element: Option<Vec<RawResultItem>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResultItem {
    #[serde(default)]
    pub result: Option<RawEntity>,
    #[serde(rename = "resultScore", default)]
    pub result_score: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "@type", default)]
    pub types: Option<TypeLabels>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "detailedDescription", default)]
    pub detailed_description: Option<RawDetailedDescription>,
    #[serde(default)]
    pub image: Option<RawImage>,
    #[serde(rename = "@id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDetailedDescription {
    #[serde(rename = "articleBody", default)]
    pub article_body: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(rename = "contentUrl", default)]
    pub content_url: Option<String>,
}

/// `@type` arrives either as a bare string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TypeLabels {
    One(String),
    Many(Vec<String>),
}

impl TypeLabels {
    fn into_labels(self) -> Vec<String> {
        let raw = match self {
            TypeLabels::One(label) => vec![label],
            TypeLabels::Many(labels) => labels,
        };
        let mut labels: Vec<String> = Vec::with_capacity(raw.len());
        for label in raw {
            if !label.is_empty() && !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

/// Knowledge Graph identifier, kept as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KgId(String);

impl KgId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The identifier with a leading `kg:` removed once; anything else passes through.
    pub fn normalized(&self) -> &str {
        self.0.strip_prefix(KG_PREFIX).unwrap_or(&self.0)
    }

    pub fn search_url(&self) -> String {
        format!("{KG_SEARCH_URL}{}", self.normalized())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    pub types: Vec<String>,
    pub description: Option<String>,
    pub article_body: Option<String>,
    pub image_url: Option<String>,
    pub id: Option<KgId>,
    pub website: Option<String>,
    pub more_info: Option<String>,
}

impl From<RawEntity> for Entity {
    fn from(raw: RawEntity) -> Self {
        let (article_body, more_info) = raw
            .detailed_description
            .map(|detail| (present(detail.article_body), present(detail.url)))
            .unwrap_or((None, None));
        let mut types = raw.types.map(TypeLabels::into_labels).unwrap_or_default();
        if types.is_empty() {
            types.push(DEFAULT_TYPE.to_string());
        }
        Self {
            name: present(raw.name).unwrap_or_else(|| UNKNOWN_ENTITY.to_string()),
            types,
            description: present(raw.description),
            article_body,
            image_url: raw.image.and_then(|image| present(image.content_url)),
            id: present(raw.id).map(KgId::new),
            website: present(raw.url),
            more_info,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItem {
    pub entity: Entity,
    pub score: f64,
}

/// Result of normalizing one response. `Empty` is a valid outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Empty,
    Found(Vec<ResultItem>),
}

impl SearchOutcome {
    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Empty => 0,
            SearchOutcome::Found(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn parse_response(body: &[u8]) -> Result<SearchOutcome, serde_json::Error> {
    let raw: RawSearchResponse = serde_json::from_slice(body)?;
    Ok(normalize(raw))
}

/// Keeps upstream order; the API already returns items by relevance.
pub fn normalize(raw: RawSearchResponse) -> SearchOutcome {
    let items = raw.item_list_element.unwrap_or_default();
    if items.is_empty() {
        return SearchOutcome::Empty;
    }
    SearchOutcome::Found(
        items
            .into_iter()
            .map(|item| ResultItem {
                entity: Entity::from(item.result.unwrap_or_default()),
                score: item.result_score.unwrap_or(0.0),
            })
            .collect(),
    )
}

// Empty strings are treated like missing values.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}
