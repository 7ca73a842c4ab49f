use crate::config::{FuzzyConfig, LocationMatchConfig, PostMatchConfig};
use nucleo_matcher::pattern::{Atom, AtomKind, CaseMatching, Normalization};
use nucleo_matcher::{Config, Matcher, Utf32String};
use std::collections::HashSet;
use wander_protocol::{Location, Post};

/// Fuzzy matcher over weighted entity fields using nucleo-matcher.
///
/// The pattern string is split into atoms (one per expanded term); a field
/// matches when any atom matches it. Scores are normalized against each
/// atom's self-match score, so a perfect single-field hit yields distance 0
/// regardless of which other candidates exist.
pub struct FuzzyMatcher {
    config: FuzzyConfig,
}

/// One matching candidate: its index into the input slice, a normalized
/// distance (0 = perfect), and the character spans that triggered the match.
#[derive(Debug, Clone)]
pub struct FuzzyMatch {
    pub index: usize,
    pub distance: f32,
    pub spans: Vec<MatchSpan>,
}

/// A contiguous run of matched characters within one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    pub field: &'static str,
    /// Character (not byte) offsets into the field text.
    pub start: usize,
    pub end: usize,
    pub text: String,
}

struct PreparedTerm {
    atom: Atom,
    self_score: f32,
}

impl FuzzyMatcher {
    pub fn new(config: FuzzyConfig) -> Self {
        Self { config }
    }

    /// Match posts against the (already expanded) pattern string.
    /// Returns hits in input order; callers sort by distance or score.
    pub fn match_posts(&self, pattern: &str, posts: &[Post]) -> Vec<FuzzyMatch> {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let terms = prepare_terms(pattern, &mut matcher);
        if terms.is_empty() {
            return Vec::new();
        }

        let cfg = &self.config.posts;
        posts
            .iter()
            .enumerate()
            .filter_map(|(index, post)| {
                let fields = post_fields(post, cfg);
                match_fields(&terms, &fields, cfg.threshold, cfg.min_match_chars, &mut matcher)
                    .map(|(distance, spans)| FuzzyMatch {
                        index,
                        distance,
                        spans,
                    })
            })
            .collect()
    }

    /// Match gazetteer locations; the lighter configuration used by
    /// location search and autocomplete.
    pub fn match_locations(&self, pattern: &str, locations: &[Location]) -> Vec<FuzzyMatch> {
        let mut matcher = Matcher::new(Config::DEFAULT);
        let terms = prepare_terms(pattern, &mut matcher);
        if terms.is_empty() {
            return Vec::new();
        }

        let cfg = &self.config.locations;
        locations
            .iter()
            .enumerate()
            .filter_map(|(index, location)| {
                let fields = location_fields(location, cfg);
                match_fields(&terms, &fields, cfg.threshold, cfg.min_match_chars, &mut matcher)
                    .map(|(distance, spans)| FuzzyMatch {
                        index,
                        distance,
                        spans,
                    })
            })
            .collect()
    }
}

fn prepare_terms(pattern: &str, matcher: &mut Matcher) -> Vec<PreparedTerm> {
    pattern
        .split_whitespace()
        .map(|term| {
            let atom = Atom::new(
                term,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Fuzzy,
                false,
            );
            let own = Utf32String::from(term);
            let self_score = atom.score(own.slice(..), matcher).unwrap_or(1) as f32;
            PreparedTerm {
                atom,
                self_score: self_score.max(1.0),
            }
        })
        .collect()
}

fn post_fields(post: &Post, cfg: &PostMatchConfig) -> Vec<(&'static str, f32, String)> {
    let mut fields = vec![
        ("caption", cfg.caption, post.caption.clone()),
        ("tags", cfg.tags, post.tags.join(" ")),
    ];
    if let Some(location) = &post.location {
        fields.push(("location.name", cfg.location_name, location.name.clone()));
        if let Some(local) = &location.name_local {
            fields.push(("location.nameLocal", cfg.location_local_name, local.clone()));
        }
    }
    fields.push(("author.name", cfg.author_name, post.author.name.clone()));
    fields
}

fn location_fields(location: &Location, cfg: &LocationMatchConfig) -> Vec<(&'static str, f32, String)> {
    let mut fields = vec![("name", cfg.name, location.name.clone())];
    if let Some(local) = &location.name_local {
        fields.push(("nameLocal", cfg.local_name, local.clone()));
    }
    fields.push(("aliases", cfg.aliases, location.aliases.join(" ")));
    fields.push(("tags", cfg.tags, location.tags.join(" ")));
    fields.push(("province", cfg.province, location.province.clone()));
    fields
}

/// Score one candidate's fields. Returns the normalized distance and the
/// matched spans, or `None` when no field matches or the candidate falls
/// outside the acceptance threshold.
fn match_fields(
    terms: &[PreparedTerm],
    fields: &[(&'static str, f32, String)],
    threshold: f32,
    min_match_chars: usize,
    matcher: &mut Matcher,
) -> Option<(f32, Vec<MatchSpan>)> {
    let mut weighted = 0.0f32;
    let mut weight_sum = 0.0f32;
    let mut spans = Vec::new();
    let mut indices = Vec::new();

    for &(field, weight, ref text) in fields {
        if text.is_empty() || weight <= 0.0 {
            continue;
        }
        let haystack = Utf32String::from(text.as_str());
        let chars: Vec<char> = text.chars().collect();
        let mut best: Option<f32> = None;
        let mut seen: HashSet<(usize, usize)> = HashSet::new();

        for term in terms {
            indices.clear();
            let Some(score) = term.atom.indices(haystack.slice(..), matcher, &mut indices) else {
                continue;
            };
            let normalized = (score as f32 / term.self_score).min(1.0);
            best = Some(best.map_or(normalized, |b| b.max(normalized)));
            collect_spans(field, &chars, &mut indices, min_match_chars, &mut seen, &mut spans);
        }

        if let Some(best) = best {
            weighted += weight * best;
            weight_sum += weight;
        }
    }

    if weight_sum <= 0.0 {
        return None;
    }
    let distance = (1.0 - weighted / weight_sum).clamp(0.0, 1.0);
    (distance <= threshold).then_some((distance, spans))
}

/// Turn matched character indices into contiguous spans, dropping runs
/// shorter than `min_match_chars` and duplicates already recorded for this
/// field.
fn collect_spans(
    field: &'static str,
    chars: &[char],
    indices: &mut Vec<u32>,
    min_match_chars: usize,
    seen: &mut HashSet<(usize, usize)>,
    out: &mut Vec<MatchSpan>,
) {
    if indices.is_empty() {
        return;
    }
    indices.sort_unstable();
    indices.dedup();

    let mut run_start = indices[0] as usize;
    let mut prev = indices[0] as usize;
    let flush = |start: usize, end: usize, out: &mut Vec<MatchSpan>, seen: &mut HashSet<(usize, usize)>| {
        if end - start >= min_match_chars && seen.insert((start, end)) {
            out.push(MatchSpan {
                field,
                start,
                end,
                text: chars[start..end].iter().collect(),
            });
        }
    };

    for &idx in indices.iter().skip(1) {
        let idx = idx as usize;
        if idx == prev + 1 {
            prev = idx;
            continue;
        }
        flush(run_start, prev + 1, out, seen);
        run_start = idx;
        prev = idx;
    }
    flush(run_start, prev + 1, out, seen);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, caption: &str, tags: &[&str]) -> Post {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "author": {"id": "u1", "name": "Mint"},
            "caption": caption,
            "tags": tags,
        }))
        .unwrap()
    }

    #[test]
    fn exact_caption_hit_has_zero_distance() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![
            post("p1", "sunrise at Doi Suthep", &[]),
            post("p2", "street food crawl in Yaowarat", &[]),
        ];

        let matches = fuzzy.match_posts("Suthep", &posts);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 0);
        assert!(matches[0].distance < 0.05, "distance {}", matches[0].distance);
    }

    #[test]
    fn spans_point_at_the_matched_run() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![post("p1", "sunrise at Doi Suthep", &[])];

        let matches = fuzzy.match_posts("Suthep", &posts);
        let span = matches[0]
            .spans
            .iter()
            .find(|s| s.field == "caption")
            .unwrap();
        assert_eq!(span.text, "Suthep");
        assert_eq!(span.start, 15);
        assert_eq!(span.end, 21);
    }

    #[test]
    fn typo_tolerance() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![post("p1", "snorkeling day trip", &[])];

        // Dropped character still matches the caption.
        let matches = fuzzy.match_posts("snorkling", &posts);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn thai_text_matches() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![
            post("p1", "เพิ่งกลับจากดอยสุเทพ วิวสวยมาก", &["เชียงใหม่"]),
            post("p2", "ตลาดน้ำอัมพวาวันนี้", &["สายกิน"]),
        ];

        let matches = fuzzy.match_posts("ดอยสุเทพ", &posts);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 0);
        assert!(matches[0]
            .spans
            .iter()
            .any(|s| s.field == "caption" && s.text == "ดอยสุเทพ"));
    }

    #[test]
    fn unmatched_posts_are_dropped() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![post("p1", "mountain hike", &[])];
        assert!(fuzzy.match_posts("ทะเล", &posts).is_empty());
    }

    #[test]
    fn empty_pattern_matches_nothing() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let posts = vec![post("p1", "anything", &[])];
        assert!(fuzzy.match_posts("   ", &posts).is_empty());
    }

    #[test]
    fn location_matching_covers_aliases() {
        let fuzzy = FuzzyMatcher::new(FuzzyConfig::default());
        let locations = wander_corpus::Gazetteer::builtin().locations().to_vec();

        let matches = fuzzy.match_locations("Koh Phi Phi", &locations);
        assert!(matches
            .iter()
            .any(|m| locations[m.index].id == "krabi-phi-phi"));
    }
}
