//! Topic-scoped random selection over the question bank.
//!
//! Matching is loose on purpose: a tag and a keyword match when either one
//! contains the other. When nothing matches, the whole bank is the pool, so
//! `select` always returns an item.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::content::ContentRepository;
use crate::domain::{CodeSnippet, QuestionItem, Topic};
use crate::topics::{fallback_snippet, TopicConfig, TopicTable};

/// Decides whether an item's tags fall under a topic's keywords.
pub type TagMatcher = fn(&[String], &[String]) -> bool;

/// True if any tag contains any keyword, or any keyword contains any tag.
/// Case-insensitive.
pub fn tags_overlap_keywords(tags: &[String], keywords: &[String]) -> bool {
  let tags: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
  keywords.iter().map(|k| k.to_lowercase()).any(|k| {
    tags.iter().any(|tag| tag.contains(k.as_str()) || k.contains(tag.as_str()))
  })
}

/// Strict alternative: some tag equals some keyword, ignoring case.
pub fn tags_match_exactly(tags: &[String], keywords: &[String]) -> bool {
  tags.iter().any(|tag| keywords.iter().any(|k| k.eq_ignore_ascii_case(tag)))
}

/// Where the pool a selection was drawn from came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
  TopicMatch,
  FullRepository,
}

#[derive(Clone, Debug)]
pub struct Selection<'a> {
  pub item: &'a QuestionItem,
  pub code: CodeSnippet,
  pub origin: SelectionOrigin,
}

#[derive(Clone)]
pub struct Selector {
  repo: Arc<ContentRepository>,
  topics: Arc<TopicTable>,
  matcher: TagMatcher,
}

impl Selector {
  pub fn new(repo: Arc<ContentRepository>, topics: Arc<TopicTable>) -> Self {
    Self { repo, topics, matcher: tags_overlap_keywords }
  }

  pub fn with_matcher(mut self, matcher: TagMatcher) -> Self {
    self.matcher = matcher;
    self
  }

  pub fn topics(&self) -> &TopicTable {
    &self.topics
  }

  /// Items whose tags match the topic keywords, without any fallback.
  pub fn topic_candidates(&self, topic: Topic) -> Vec<&QuestionItem> {
    let keywords = &self.topics.get(topic).keywords;
    self.repo
      .all()
      .iter()
      .filter(|q| (self.matcher)(&q.tags, keywords))
      .collect()
  }

  /// Pick one item for the topic and resolve its code sample.
  #[instrument(level = "debug", skip(self, rng))]
  pub fn select<R: Rng + ?Sized>(&self, topic: Topic, rng: &mut R) -> Selection<'_> {
    let matching = self.topic_candidates(topic);
    let (pool, origin) = if matching.is_empty() {
      (self.repo.all().iter().collect::<Vec<_>>(), SelectionOrigin::FullRepository)
    } else {
      (matching, SelectionOrigin::TopicMatch)
    };

    // The repository is never empty, so the pool is never empty either.
    let item = match pool.choose(rng) {
      Some(item) => *item,
      None => &self.repo.all()[0],
    };
    debug!(target: "flashcard", ?topic, ?origin, pool = pool.len(), title = %item.tags.first().map(String::as_str).unwrap_or(""), "Question selected");

    Selection { item, code: resolve_code(item, self.topics.get(topic)), origin }
  }
}

/// Item snippet first, then the topic default, then the generic fallback.
pub fn resolve_code(item: &QuestionItem, config: &TopicConfig) -> CodeSnippet {
  item.code.clone().unwrap_or_else(|| topic_code(config))
}

/// The topic default, or the generic fallback when the topic has none.
pub fn topic_code(config: &TopicConfig) -> CodeSnippet {
  config.code_defaults.clone().unwrap_or_else(fallback_snippet)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::tests::item;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
  }

  fn selector(items: Vec<QuestionItem>) -> Selector {
    Selector::new(
      Arc::new(ContentRepository::new(items).unwrap()),
      Arc::new(TopicTable::builtin()),
    )
  }

  #[test]
  fn overlap_is_symmetric_substring_match() {
    assert!(tags_overlap_keywords(&strs(&["solid"]), &strs(&["solid"])));
    assert!(tags_overlap_keywords(&strs(&["design patterns, behavioral"]), &strs(&["design patterns"])));
    assert!(tags_overlap_keywords(&strs(&["patterns"]), &strs(&["design patterns"])));
    assert!(!tags_overlap_keywords(&strs(&["react"]), &strs(&["angular", "rxjs"])));
  }

  #[test]
  fn matching_ignores_case_on_both_sides() {
    assert!(tags_overlap_keywords(&strs(&["solid"]), &strs(&["SOLID"])));
    assert!(tags_overlap_keywords(&strs(&["Design Patterns"]), &strs(&["patterns"])));
    assert!(tags_match_exactly(&strs(&["srp"]), &strs(&["SRP"])));

    let shouty = TopicTable::from_fn(|_| TopicConfig { keywords: strs(&["SOLID", "SRP"]), code_defaults: None });
    let s = Selector::new(
      Arc::new(ContentRepository::new(vec![item("srp", &["srp"], None), item("hooks", &["react"], None)]).unwrap()),
      Arc::new(shouty),
    );
    let candidates = s.topic_candidates(Topic::Solid);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].question, "srp");
  }

  #[test]
  fn exact_matcher_ignores_substrings() {
    assert!(tags_match_exactly(&strs(&["srp"]), &strs(&["solid", "srp"])));
    assert!(!tags_match_exactly(&strs(&["patterns"]), &strs(&["design patterns"])));
  }

  #[test]
  fn select_is_total_for_every_topic_over_the_bundled_bank() {
    let s = Selector::new(
      Arc::new(ContentRepository::builtin().unwrap()),
      Arc::new(TopicTable::builtin()),
    );
    for seed in 0..50 {
      let mut rng = StdRng::seed_from_u64(seed);
      for topic in Topic::ALL {
        let sel = s.select(topic, &mut rng);
        assert!(!sel.item.answer.en.is_empty() && !sel.item.answer.mm.is_empty());
        assert!(!sel.code.initial.is_empty() && !sel.code.solution.is_empty());
      }
    }
  }

  #[test]
  fn solid_draws_only_from_matching_items() {
    let s = selector(vec![
      item("srp", &["solid", "srp"], None),
      item("hooks", &["react"], None),
      item("signals", &["angular", "signals"], None),
      item("ocp", &["ocp"], None),
    ]);
    let solid = ["solid", "srp", "ocp", "lsp", "isp", "dip"];
    for seed in 0..100 {
      let sel = s.select(Topic::Solid, &mut StdRng::seed_from_u64(seed));
      assert_eq!(sel.origin, SelectionOrigin::TopicMatch);
      assert!(sel.item.tags.iter().any(|t| solid.contains(&t.as_str())));
    }
  }

  #[test]
  fn falls_back_to_full_repository_when_nothing_matches() {
    let s = selector(vec![item("rust", &["rust"], None), item("go", &["golang"], None)]);
    let sel = s.select(Topic::ReactPatterns, &mut StdRng::seed_from_u64(7));
    assert_eq!(sel.origin, SelectionOrigin::FullRepository);
    assert!(["rust", "go"].contains(&sel.item.question.as_str()));
  }

  #[test]
  fn same_seed_gives_same_pick() {
    let s = Selector::new(
      Arc::new(ContentRepository::builtin().unwrap()),
      Arc::new(TopicTable::builtin()),
    );
    let a = s.select(Topic::DesignPatterns, &mut StdRng::seed_from_u64(42)).item.question.clone();
    let b = s.select(Topic::DesignPatterns, &mut StdRng::seed_from_u64(42)).item.question.clone();
    assert_eq!(a, b);
  }

  #[test]
  fn code_resolution_prefers_item_then_topic_then_generic() {
    let own = item("own", &["react"], Some(("before", "after")));
    let bare = item("bare", &["react"], None);
    let table = TopicTable::builtin();
    let react = table.get(Topic::ReactPatterns);

    assert_eq!(resolve_code(&own, react), own.code.clone().unwrap());
    assert_eq!(resolve_code(&bare, react), react.code_defaults.clone().unwrap());

    let bare_table = TopicTable::from_fn(|_| TopicConfig { keywords: strs(&["react"]), code_defaults: None });
    assert_eq!(resolve_code(&bare, bare_table.get(Topic::ReactPatterns)), fallback_snippet());
  }

  #[test]
  fn swapping_the_matcher_changes_the_pool() {
    let items = vec![item("broad", &["patterns"], None), item("exact", &["design patterns"], None)];
    let loose = selector(items.clone());
    assert_eq!(loose.topic_candidates(Topic::DesignPatterns).len(), 2);

    let strict = selector(items).with_matcher(tags_match_exactly);
    let picked = strict.topic_candidates(Topic::DesignPatterns);
    assert_eq!(picked.len(), 1);
    assert_eq!(picked[0].question, "exact");
  }
}
