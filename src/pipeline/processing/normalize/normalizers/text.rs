/// Capitalize the first letter of every alphabetic run and lower-case the rest,
/// so `"node.js developer"` becomes `"Node.Js Developer"`.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Truncate to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("node.js"), "Node.Js");
        assert_eq!(title_case("MACHINE learning"), "Machine Learning");
        assert_eq!(title_case("c++ / 3d modelling"), "C++ / 3D Modelling");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn truncate_respects_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
    }
}
