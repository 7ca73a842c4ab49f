use regex::Regex;

const MARK_OPEN: &str = "<mark>";
const MARK_CLOSE: &str = "</mark>";

/// Wrap every case-insensitive occurrence of every matched term in
/// `<mark>` tags.
///
/// All match ranges are collected first and overlapping or adjacent ranges
/// are merged before any markup is emitted, so terms that contain one
/// another (or abut in the text) produce a single flat marker instead of
/// the nested tags naive sequential replacement would yield.
#[must_use]
pub fn highlight(text: &str, matched_terms: &[String]) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for term in matched_terms {
        if term.trim().is_empty() {
            continue;
        }
        let Ok(pattern) = Regex::new(&format!("(?i){}", regex::escape(term))) else {
            continue;
        };
        for hit in pattern.find_iter(text) {
            ranges.push((hit.start(), hit.end()));
        }
    }
    if ranges.is_empty() {
        return text.to_string();
    }

    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = vec![ranges[0]];
    for (start, end) in ranges.into_iter().skip(1) {
        let last = merged.last_mut().expect("merged is non-empty");
        if start <= last.1 {
            last.1 = last.1.max(end);
        } else {
            merged.push((start, end));
        }
    }

    let mut out = String::with_capacity(text.len() + merged.len() * (MARK_OPEN.len() + MARK_CLOSE.len()));
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&text[cursor..start]);
        out.push_str(MARK_OPEN);
        out.push_str(&text[start..end]);
        out.push_str(MARK_CLOSE);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn wraps_a_single_match() {
        let out = highlight("sunrise at Doi Suthep", &terms(&["Suthep"]));
        assert_eq!(out, "sunrise at Doi <mark>Suthep</mark>");
    }

    #[test]
    fn matching_is_case_insensitive() {
        let out = highlight("Doi Suthep and doi suthep", &terms(&["doi"]));
        assert_eq!(out, "<mark>Doi</mark> Suthep and <mark>doi</mark> suthep");
    }

    #[test]
    fn substring_terms_merge_instead_of_nesting() {
        // "ดอย" is contained in "ดอยสุเทพ"; naive replacement would nest.
        let out = highlight("เพิ่งกลับจากดอยสุเทพ", &terms(&["ดอยสุเทพ", "ดอย"]));
        assert_eq!(out, "เพิ่งกลับจาก<mark>ดอยสุเทพ</mark>");
        assert!(!out.contains("<mark><mark>"));
    }

    #[test]
    fn adjacent_matches_merge() {
        let out = highlight("ดอยสุเทพ", &terms(&["ดอย", "สุเทพ"]));
        assert_eq!(out, "<mark>ดอยสุเทพ</mark>");
    }

    #[test]
    fn no_terms_leaves_text_untouched() {
        assert_eq!(highlight("unchanged", &[]), "unchanged");
        assert_eq!(highlight("unchanged", &terms(&["", "  "])), "unchanged");
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let out = highlight("price (today) is 50", &terms(&["(today)"]));
        assert_eq!(out, "price <mark>(today)</mark> is 50");
    }

    #[test]
    fn thai_multibyte_boundaries_are_respected() {
        let out = highlight("ทะเลหมอกสวยมาก", &terms(&["ทะเลหมอก"]));
        assert_eq!(out, "<mark>ทะเลหมอก</mark>สวยมาก");
    }
}
