//! In-memory catalog index serving the `other` feed and search pages.
//!
//! [`CatalogIndex`] keeps the published part of the catalog in source order.
//! The `other` feed is that order sliced into batches. Search runs the Skim
//! fuzzy matcher over each model's title, author, category and tags: every
//! whitespace-separated token must match at least one field, and results rank
//! by the summed best score per token, then by likes.

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::domain::{Model, ProductRecord, Result};
use crate::feed::source::{Page, PageSource, SearchProvider};

#[derive(Default)]
pub struct CatalogIndex {
    models: Vec<Model>,
    matcher: SkimMatcherV2,
}

impl std::fmt::Debug for CatalogIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogIndex")
            .field("models", &self.models.len())
            .finish_non_exhaustive()
    }
}

impl CatalogIndex {
    #[must_use]
    pub fn new(records: &[ProductRecord]) -> Self {
        let mut index = Self::default();
        index.rebuild(records);
        index
    }

    /// Replaces the indexed catalog.
    pub fn rebuild(&mut self, records: &[ProductRecord]) {
        self.models = records
            .iter()
            .filter(|r| r.is_published())
            .map(Model::from)
            .collect();
        tracing::debug!(models = self.models.len(), "catalog index rebuilt");
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    fn score(&self, model: &Model, tokens: &[String]) -> Option<i64> {
        let fields = std::iter::once(model.title.as_str())
            .chain(std::iter::once(model.author.as_str()))
            .chain(model.category.as_deref())
            .chain(model.tags.iter().map(String::as_str))
            .map(str::to_lowercase)
            .collect::<Vec<_>>();

        tokens.iter().try_fold(0_i64, |total, token| {
            fields
                .iter()
                .filter_map(|field| self.matcher.fuzzy_match(field, token))
                .max()
                .map(|best| total + best)
        })
    }

    /// All models matching `query`, best first.
    #[must_use]
    pub fn matches(&self, query: &str) -> Vec<&Model> {
        let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(i64, &Model)> = self
            .models
            .iter()
            .filter_map(|model| self.score(model, &tokens).map(|score| (score, model)))
            .collect();
        scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| b.likes.cmp(&a.likes)));
        scored.into_iter().map(|(_, model)| model).collect()
    }
}

/// Slices `items` into the 1-based `page` of `batch_size` entries.
fn paginate<'a>(items: impl ExactSizeIterator<Item = &'a Model>, page: u32, batch_size: usize) -> Page {
    let total = items.len();
    let start = (page.saturating_sub(1) as usize).saturating_mul(batch_size);
    let models: Vec<Model> = items.skip(start).take(batch_size).cloned().collect();
    Page {
        exhausted: start.saturating_add(models.len()) >= total,
        models,
    }
}

impl PageSource for CatalogIndex {
    fn other_page(&self, page: u32, batch_size: usize) -> Result<Page> {
        Ok(paginate(self.models.iter(), page, batch_size))
    }
}

impl SearchProvider for CatalogIndex {
    fn search(&self, query: &str, page: u32, batch_size: usize) -> Result<Page> {
        let _span = tracing::debug_span!("search", query, page).entered();
        let results = self.matches(query);
        let page = paginate(results.into_iter(), page, batch_size);
        tracing::debug!(returned = page.models.len(), exhausted = page.exhausted, "search page");
        Ok(page)
    }
}
