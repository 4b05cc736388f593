/// Grades a response against required and forbidden answer substrings.
///
/// Correct iff the text contains at least one required answer and none of the
/// forbidden ones, compared case-insensitively. No required answers means the
/// test case is malformed; it grades as incorrect.
pub fn grade(text: &str, answers: &[String], negative_answers: &[String]) -> bool {
    if answers.is_empty() {
        return false;
    }
    let haystack = text.to_lowercase();

    let hit = answers
        .iter()
        .any(|a| !a.is_empty() && haystack.contains(&a.to_lowercase()));
    if !hit {
        return false;
    }

    !negative_answers
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(&n.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &[&str]) -> Vec<String> {
        v.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn required_answer_present() {
        assert!(grade("The answer is 42", &s(&["42"]), &[]));
    }

    #[test]
    fn required_answer_absent() {
        assert!(!grade("The answer is 42", &s(&["7"]), &[]));
    }

    #[test]
    fn forbidden_answer_wins() {
        assert!(!grade("42 is not it", &s(&["42"]), &s(&["not it"])));
    }

    #[test]
    fn case_insensitive_both_ways() {
        assert!(grade("It uses SHA-256 twice", &s(&["sha-256"]), &[]));
        assert!(!grade("Uses OP_RETURN", &s(&["op_return"]), &s(&["Op_Return"])));
    }

    #[test]
    fn any_required_answer_suffices() {
        assert!(grade("forty-two", &s(&["42", "Forty-Two"]), &[]));
    }

    #[test]
    fn empty_required_answers_is_incorrect() {
        assert!(!grade("anything", &[], &[]));
        assert!(!grade("", &[], &s(&["x"])));
    }

    #[test]
    fn empty_strings_never_match() {
        assert!(!grade("text", &s(&[""]), &[]));
        assert!(grade("text", &s(&["text"]), &s(&[""])));
    }
}
