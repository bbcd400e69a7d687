//! Turns a selected bank item into a display-ready flashcard.

use crate::domain::{Difficulty, FlashcardData, QuestionItem};
use crate::util::fill_template;

pub const TITLE_PLACEHOLDER: &str = "CONCEPT";

pub const META_QUESTION_ENG: &str = "How would you explain this to a junior developer?";
pub const META_QUESTION_MM: &str = "ဒါကို Junior developer တစ်ယောက်ကို ဘယ်လိုရှင်းပြမလဲ?";

const TAKEAWAY_ENG_TEMPLATE: &str = "Mastering {tags} is essential for writing maintainable, senior-level code.";
const TAKEAWAY_MM_TEMPLATE: &str = "{tags} ကို သေချာနားလည်ထားရင် maintain လုပ်ရလွယ်တဲ့ senior-level code တွေ ရေးနိုင်မှာနော်။";

pub fn assemble(item: &QuestionItem, initial_code: &str, solution_code: &str) -> FlashcardData {
  let title = item
    .tags
    .first()
    .map(|t| t.to_uppercase())
    .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string());

  let (scenario_mm, scenario_mm_translated) = match &item.question_mm {
    Some(mm) if !mm.trim().is_empty() => (mm.clone(), true),
    _ => (item.question.clone(), false),
  };

  let tags = item.tags.join(", ");

  FlashcardData {
    title,
    difficulty: Difficulty::Senior,
    scenario_eng: item.question.clone(),
    scenario_mm,
    scenario_mm_translated,
    question_eng: META_QUESTION_ENG.into(),
    question_mm: META_QUESTION_MM.into(),
    code_snippet_initial: initial_code.into(),
    code_snippet_solution: solution_code.into(),
    solution_eng: item.answer.en.clone(),
    solution_mm: item.answer.mm.clone(),
    key_takeaway_eng: fill_template(TAKEAWAY_ENG_TEMPLATE, &[("tags", tags.as_str())]),
    key_takeaway_mm: fill_template(TAKEAWAY_MM_TEMPLATE, &[("tags", tags.as_str())]),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::content::tests::item;

  #[test]
  fn builds_card_from_item() {
    let q = item("Define SRP.", &["solid", "srp"], None);
    let card = assemble(&q, "before", "after");

    assert_eq!(card.title, "SOLID");
    assert_eq!(card.difficulty, Difficulty::Senior);
    assert_eq!(card.scenario_eng, "Define SRP.");
    assert_eq!(card.question_eng, META_QUESTION_ENG);
    assert_eq!(card.question_mm, META_QUESTION_MM);
    assert_eq!(card.code_snippet_initial, "before");
    assert_eq!(card.code_snippet_solution, "after");
    assert_eq!(card.solution_eng, q.answer.en);
    assert_eq!(card.solution_mm, q.answer.mm);
    assert!(card.key_takeaway_eng.contains("solid, srp"));
    assert!(card.key_takeaway_mm.contains("solid, srp"));
  }

  #[test]
  fn untranslated_scenario_is_flagged() {
    let q = item("Define OCP.", &["ocp"], None);
    let card = assemble(&q, "", "");
    assert_eq!(card.scenario_mm, "Define OCP.");
    assert!(!card.scenario_mm_translated);

    let mut translated = q.clone();
    translated.question_mm = Some("OCP ဆိုတာ ဘာလဲ?".into());
    let card = assemble(&translated, "", "");
    assert_eq!(card.scenario_mm, "OCP ဆိုတာ ဘာလဲ?");
    assert!(card.scenario_mm_translated);
  }

  #[test]
  fn empty_tags_get_placeholder_title() {
    let mut q = item("Orphan", &["x"], None);
    q.tags.clear();
    assert_eq!(assemble(&q, "", "").title, TITLE_PLACEHOLDER);
  }
}
