use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use fxhash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;

use super::{nicknames, phonetic};

/// Confidence tier of a name match. Ordering is ascending, so `Exact`
/// compares greater than `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    Low,
    Medium,
    High,
    Exact,
}

impl MatchConfidence {
    /// Accepted without surfacing anything beyond a cosmetic note.
    pub fn is_auto_accept(&self) -> bool {
        matches!(self, MatchConfidence::Exact | MatchConfidence::High)
    }

    /// Accepted, but the caller should surface a "please verify" warning.
    pub fn needs_review(&self) -> bool {
        matches!(self, MatchConfidence::Medium)
    }
}

impl fmt::Display for MatchConfidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchConfidence::Low => write!(f, "low"),
            MatchConfidence::Medium => write!(f, "medium"),
            MatchConfidence::High => write!(f, "high"),
            MatchConfidence::Exact => write!(f, "exact"),
        }
    }
}

/// Outcome of scoring one input against one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameScore {
    pub score: f64,
    pub confidence: MatchConfidence,
    pub reason: String,
}

impl NameScore {
    fn none() -> Self {
        Self { score: 0.0, confidence: MatchConfidence::Low, reason: "no match".to_string() }
    }

    fn new(score: f64, confidence: MatchConfidence, reason: &str) -> Self {
        Self { score, confidence, reason: reason.to_string() }
    }
}

/// A scored candidate returned by [`NameResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameMatch {
    pub candidate: String,
    pub score: f64,
    pub confidence: MatchConfidence,
    pub reason: String,
}

/// Lowercased, whitespace-collapsed form of a name.
pub fn normalize(name: &str) -> String {
    name.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

/// Normalized form with everything but letters and digits removed.
fn squash(name: &str) -> String {
    name.chars().filter(|c| c.is_alphanumeric()).flat_map(char::to_lowercase).collect()
}

fn initial(word: &str) -> String {
    word.chars().take(1).collect()
}

/// Score `input` against a single `candidate` name.
///
/// Checks run strongest-first: exact, concatenation, nickname. The weaker
/// signals (phonetic, edit distance, substring) can disagree with each
/// other, so the best of those wins rather than the first.
pub fn score_pair(input: &str, candidate: &str) -> NameScore {
    let input_n = normalize(input);
    let cand_n = normalize(candidate);
    if input_n.is_empty() || cand_n.is_empty() {
        return NameScore::none();
    }

    if input_n == cand_n {
        return NameScore::new(1.0, MatchConfidence::Exact, "exact match");
    }
    if let Some(hit) = concatenation_score(&input_n, &cand_n) {
        return hit;
    }
    if let Some(hit) = nickname_score(&input_n, &cand_n) {
        return hit;
    }

    let mut best = NameScore::none();

    let code_in = phonetic::soundex(&squash(&input_n));
    let code_cand = phonetic::soundex(&squash(&cand_n));
    if !code_in.is_empty() && code_in == code_cand {
        best = NameScore::new(0.7, MatchConfidence::Medium, "phonetic match");
    }

    let similarity = normalized_levenshtein(&input_n, &cand_n);
    if similarity >= 0.8 && similarity > best.score {
        best = NameScore::new(similarity, MatchConfidence::High, "close spelling");
    } else if similarity >= 0.6 && similarity > best.score {
        best = NameScore::new(similarity, MatchConfidence::Medium, "similar spelling");
    }

    let (shorter, longer) =
        if input_n.len() <= cand_n.len() { (&input_n, &cand_n) } else { (&cand_n, &input_n) };
    if longer.contains(shorter.as_str()) {
        let ratio = shorter.chars().count() as f64 / longer.chars().count() as f64;
        let score = ratio * 0.7;
        if ratio >= 0.5 && score > best.score {
            best = NameScore::new(score, MatchConfidence::Medium, "partial name");
        }
    }

    best
}

/// Handles requests written as one run-together word: "mikesmith",
/// "msmith", "mikes", including nickname variants of the first name.
fn concatenation_score(input_n: &str, cand_n: &str) -> Option<NameScore> {
    if input_n.contains(' ') {
        return None;
    }
    let words: Vec<&str> = cand_n.split(' ').collect();
    if words.len() < 2 {
        return None;
    }
    let key = squash(input_n);
    if key.is_empty() {
        return None;
    }

    let first = words[0];
    let last = words[words.len() - 1];
    let first_initial = initial(first);
    let last_initial = initial(last);

    let mut forms: Vec<String> = vec![
        words.concat(),
        format!("{first}{last_initial}"),
        format!("{first_initial}{last}"),
    ];
    for nick in nicknames::variants(first) {
        forms.push(format!("{nick}{last}"));
        forms.push(format!("{nick}{last_initial}"));
    }

    if forms.iter().any(|form| *form == key) {
        Some(NameScore::new(0.95, MatchConfidence::High, "concatenated name"))
    } else {
        None
    }
}

/// Bidirectional nickname lookup: "Mike Smith" vs "Michael Smith", or a
/// bare "Mike" against "Michael Smith".
fn nickname_score(input_n: &str, cand_n: &str) -> Option<NameScore> {
    let in_words: Vec<&str> = input_n.split(' ').collect();
    let cand_words: Vec<&str> = cand_n.split(' ').collect();

    let first_in = in_words[0];
    let first_cand = cand_words[0];
    if !nicknames::are_variants(first_in, first_cand) {
        return None;
    }

    // A differing surname on both sides rules the pair out.
    if in_words.len() > 1 && cand_words.len() > 1 {
        let last_in = in_words[in_words.len() - 1];
        let last_cand = cand_words[cand_words.len() - 1];
        if last_in != last_cand {
            return None;
        }
    } else if first_in == first_cand && in_words.len() == cand_words.len() {
        // Identical single tokens are the exact check's business.
        return None;
    }

    Some(NameScore::new(0.85, MatchConfidence::High, "nickname match"))
}

type CacheKey = (String, u64, u64);

/// Resolver with a per-instance cache.
///
/// The same lookups repeat across players (every roster member resolves
/// against nearly the same candidate set), so results are cached by
/// (normalized input, candidate-set hash, threshold bits).
#[derive(Debug, Default)]
pub struct NameResolver {
    cache: FxHashMap<CacheKey, Vec<NameMatch>>,
}

impl NameResolver {
    pub fn new() -> Self {
        Self { cache: FxHashMap::default() }
    }

    /// Candidates scoring at or above `threshold`, best first.
    pub fn resolve(&mut self, input: &str, candidates: &[String], threshold: f64) -> Vec<NameMatch> {
        let key = (normalize(input), candidate_set_hash(candidates), threshold.to_bits());
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }

        let mut matches: Vec<NameMatch> = candidates
            .iter()
            .map(|candidate| {
                let scored = score_pair(input, candidate);
                NameMatch {
                    candidate: candidate.clone(),
                    score: scored.score,
                    confidence: scored.confidence,
                    reason: scored.reason,
                }
            })
            .filter(|m| m.score >= threshold)
            .collect();
        sort_matches(&mut matches);

        self.cache.insert(key, matches.clone());
        matches
    }

    /// Best candidate at or above `threshold`, if any.
    pub fn best(&mut self, input: &str, candidates: &[String], threshold: f64) -> Option<NameMatch> {
        self.resolve(input, candidates, threshold).into_iter().next()
    }

    /// Scored candidates below any acceptance bar, for surfacing as
    /// suggestions only. Never auto-applied.
    pub fn suggestions(&mut self, input: &str, candidates: &[String], limit: usize) -> Vec<NameMatch> {
        let mut matches: Vec<NameMatch> = candidates
            .iter()
            .map(|candidate| {
                let scored = score_pair(input, candidate);
                NameMatch {
                    candidate: candidate.clone(),
                    score: scored.score,
                    confidence: scored.confidence,
                    reason: scored.reason,
                }
            })
            .filter(|m| m.score > 0.0)
            .collect();
        sort_matches(&mut matches);
        matches.truncate(limit);
        matches
    }
}

fn sort_matches(matches: &mut [NameMatch]) {
    matches.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.candidate.cmp(&b.candidate))
    });
}

fn candidate_set_hash(candidates: &[String]) -> u64 {
    let mut hasher = FxHasher::default();
    for candidate in candidates {
        candidate.hash(&mut hasher);
    }
    hasher.finish()
}
