//! View-models for result cards.
//!
//! Building a [`CardView`] is pure: the same entity, score and position always
//! produce the same view. Markup is produced elsewhere from these values.

use crate::entity::{Entity, ResultItem};
use crate::query::Query;
use reqwest::Url;
use serde::Serialize;

pub const DESCRIPTION_LIMIT: usize = 300;
pub const STAGGER_STEP_MS: usize = 100;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    KnowledgeGraph,
    Website,
    MoreInfo,
}

impl LinkKind {
    pub fn title(&self) -> &'static str {
        match self {
            LinkKind::KnowledgeGraph => "Knowledge Graph ID",
            LinkKind::Website => "Official Website",
            LinkKind::MoreInfo => "More Info",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            LinkKind::KnowledgeGraph => "fingerprint",
            LinkKind::Website => "globe",
            LinkKind::MoreInfo => "info-circle",
        }
    }

    pub fn tooltip(&self) -> &'static str {
        match self {
            LinkKind::KnowledgeGraph => "Unique identifier in Google's Knowledge Graph database",
            LinkKind::Website => "Primary website for this entity",
            LinkKind::MoreInfo => "Additional information source (usually Wikipedia)",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            LinkKind::KnowledgeGraph => "purple",
            LinkKind::Website => "green",
            LinkKind::MoreInfo => "blue",
        }
    }

    pub fn gradient(&self) -> &'static str {
        match self {
            LinkKind::KnowledgeGraph => "from-purple-500 to-indigo-500 border-purple-200",
            LinkKind::Website => "from-green-500 to-emerald-500 border-green-200",
            LinkKind::MoreInfo => "from-blue-500 to-cyan-500 border-blue-200",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCard {
    pub kind: LinkKind,
    pub label: String,
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub title: String,
    pub subtitle: Option<String>,
    pub types: Vec<String>,
    pub score: f64,
    pub confidence: f64,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub links: Vec<LinkCard>,
    pub delay_ms: usize,
}

impl CardView {
    pub fn build(entity: &Entity, score: f64, index: usize) -> Self {
        let mut links = Vec::with_capacity(3);
        if let Some(id) = &entity.id {
            links.push(LinkCard {
                kind: LinkKind::KnowledgeGraph,
                label: id.normalized().to_string(),
                href: id.search_url(),
            });
        }
        if let Some(website) = &entity.website {
            links.push(LinkCard {
                kind: LinkKind::Website,
                label: domain_label(website),
                href: website.clone(),
            });
        }
        if let Some(more_info) = &entity.more_info {
            links.push(LinkCard {
                kind: LinkKind::MoreInfo,
                label: domain_label(more_info),
                href: more_info.clone(),
            });
        }
        Self {
            title: entity.name.clone(),
            subtitle: entity.description.clone(),
            types: entity.types.clone(),
            score,
            confidence: round_score(score),
            description: entity
                .article_body
                .as_deref()
                .map(|body| truncate(body, DESCRIPTION_LIMIT)),
            image_url: entity.image_url.clone(),
            links,
            delay_ms: index * STAGGER_STEP_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub query: String,
    pub total: usize,
    pub results: Vec<CardView>,
}

impl ResultsView {
    pub fn build(query: &Query, items: &[ResultItem]) -> Self {
        Self {
            query: query.as_str().to_string(),
            total: items.len(),
            results: items
                .iter()
                .enumerate()
                .map(|(index, item)| CardView::build(&item.entity, item.score, index))
                .collect(),
        }
    }

    pub fn noun(&self) -> &'static str {
        result_noun(self.total)
    }

    pub fn headline(&self) -> String {
        results_headline(self.total, &self.query)
    }
}

pub fn result_noun(count: usize) -> &'static str {
    if count == 1 { "result" } else { "results" }
}

pub fn results_headline(count: usize, query: &str) -> String {
    format!("Found {count} {} for \"{query}\"", result_noun(count))
}

/// Straight character cut: words may be split at the boundary.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", text[..cut].trim()),
        None => text.to_string(),
    }
}

/// Host of `url` without a leading `www.`. Anything unparsable, or without a
/// host, is shown as given.
pub fn domain_label(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => match host.strip_prefix("www.").unwrap_or(host) {
                "" => url.to_string(),
                label => label.to_string(),
            },
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Nearest integer, halves rounding up. Kept as `f64` so huge scores stay exact.
pub fn round_score(score: f64) -> f64 {
    (score + 0.5).floor()
}
