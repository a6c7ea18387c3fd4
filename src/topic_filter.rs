use regex::Regex;

/// Apostrophe forms seen in Latin-script Uzbek: ASCII, curly quotes and the
/// modifier letter turned comma, plus the backtick some keyboards produce.
pub(crate) const APOSTROPHES: &str = "['‘’ʻ`]";

enum Pattern {
    Regex(Regex),
    Substring(&'static str),
}

impl Pattern {
    fn matches(&self, text: &str) -> bool {
        match self {
            Pattern::Regex(re) => re.is_match(text),
            Pattern::Substring(s) => text.contains(s),
        }
    }
}

fn pattern(fragment: &str) -> Pattern {
    let source = fragment.replace('\'', APOSTROPHES);
    // Fragments are compile-time literals; a bad one is a programming error.
    Pattern::Regex(Regex::new(&source).expect("invalid topic pattern"))
}

lazy_static::lazy_static! {
    static ref ALLOWED: Vec<Pattern> = vec![
        pattern("kurs"),
        pattern("yo'nalish"),
        pattern("dars"),
        pattern("jadval"),
        pattern("manzil"),
        pattern("telefon"),
        pattern("raqam"),
        pattern("aloqa"),
        pattern("ish vaqti"),
        pattern("soat"),
        pattern("o'qituvchi"),
        pattern("turon"),
        Pattern::Substring("dasturlash"),
        Pattern::Substring("ingliz"),
        Pattern::Substring("matematika"),
        Pattern::Substring("fizika"),
        Pattern::Substring("kompyuter"),
    ];
}

/// Whether a question is about the learning centre at all.
pub fn is_in_scope(question: &str) -> bool {
    if question.trim().is_empty() {
        return false;
    }
    let lowercase = question.to_lowercase();
    ALLOWED.iter().any(|pattern| pattern.matches(&lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_out_of_scope() {
        assert!(!is_in_scope(""));
        assert!(!is_in_scope("   "));
    }

    #[test]
    fn test_domain_vocabulary() {
        assert!(is_in_scope("Qanday kurslar bor?"));
        assert!(is_in_scope("ish vaqti qachon?"));
        assert!(is_in_scope("Telefon raqamingiz?"));
        assert!(is_in_scope("Matematika darslari"));
        assert!(is_in_scope("KOMPYUTER savodxonligi"));
        assert!(is_in_scope("TURON haqida"));
    }

    #[test]
    fn test_apostrophe_variants() {
        assert!(is_in_scope("Qaysi yo'nalishlar bor?"));
        assert!(is_in_scope("Qaysi yo‘nalishlar bor?"));
        assert!(is_in_scope("Qaysi yoʻnalishlar bor?"));
        assert!(is_in_scope("O’qituvchilar kim?"));
    }

    #[test]
    fn test_off_topic() {
        assert!(!is_in_scope("What is the weather today?"));
        assert!(!is_in_scope("Bugun ob-havo qanday?"));
    }
}
