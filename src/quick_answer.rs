use lazy_static::lazy_static;
use regex::Regex;

use crate::knowledge::KnowledgeFacts;
use crate::topic_filter::APOSTROPHES;

lazy_static! {
    static ref COURSE_DIRECTION: Regex =
        Regex::new(&format!("yo{}nalish", APOSTROPHES)).expect("invalid course pattern");
}

/// Answer common questions straight from the knowledge base.
///
/// Checks run in a fixed order (address, phone, hours, courses) so a question
/// touching several topics always gets the same single answer. `None` means
/// the question needs the remote model.
pub fn quick_answer(question: &str, facts: &KnowledgeFacts) -> Option<String> {
    let n = question.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| n.contains(w));

    if has(&["manzil", "qaerda", "joylashuv"]) {
        return Some(facts.address.clone());
    }
    if has(&["telefon", "raqam"]) {
        return Some(facts.phone.clone());
    }
    if has(&["ish vaqti", "soat"]) {
        return Some(facts.hours.clone());
    }
    if has(&["kurs", "dasturlash", "ingliz"]) || COURSE_DIRECTION.is_match(&n) {
        return Some(format!("Hozirgi yo‘nalishlar: {}", facts.course_list()));
    }
    None
}
