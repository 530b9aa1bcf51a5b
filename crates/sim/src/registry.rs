//! Process-wide match directory: owns every live `Match`, maps private
//! join codes to match ids, and decides (but does not itself schedule)
//! when an empty match is eligible for disposal.

use std::collections::HashMap;

use rand::Rng;

use crate::config::{JOIN_CODE_ALPHABET, JOIN_CODE_LEN, JOIN_CODE_MAX_ATTEMPTS, MatchConfig};
use crate::error::MatchError;
use crate::match_state::Match;

pub struct MatchRegistry {
    matches: HashMap<String, Match>,
    codes: HashMap<String, String>,
    empty_since: HashMap<String, f32>,
    next_seq: u64,
}

impl Default for MatchRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchRegistry {
    pub fn new() -> Self {
        Self {
            matches: HashMap::new(),
            codes: HashMap::new(),
            empty_since: HashMap::new(),
            next_seq: 0,
        }
    }

    fn next_match_id(&mut self) -> String {
        self.next_seq += 1;
        format!("match-{}", self.next_seq)
    }

    /// Create a new public match, or a private one with a caller-supplied
    /// or generated join code.
    pub fn create_match(
        &mut self,
        config: MatchConfig,
        seed: u64,
        selected_map: String,
        requested_code: Option<String>,
    ) -> Result<&mut Match, MatchError> {
        let id = self.next_match_id();
        let mut match_ = Match::new(id.clone(), config, seed, selected_map);

        if let Some(code) = requested_code {
            match_.join_code = Some(code.clone());
            self.codes.insert(code, id.clone());
        }

        self.matches.insert(id.clone(), match_);
        Ok(self.matches.get_mut(&id).unwrap())
    }

    /// Create a private match, generating a unique join code from the
    /// configured alphabet (up to `JOIN_CODE_MAX_ATTEMPTS` tries before a
    /// sequence-suffixed fallback).
    pub fn create_private_match(
        &mut self,
        config: MatchConfig,
        seed: u64,
        selected_map: String,
        rng: &mut impl Rng,
    ) -> Result<&mut Match, MatchError> {
        let code = self.generate_unique_code(rng)?;
        let id = self.next_match_id();
        let mut match_ = Match::new(id.clone(), config, seed, selected_map);
        match_.join_code = Some(code.clone());
        self.codes.insert(code, id.clone());
        self.matches.insert(id.clone(), match_);
        Ok(self.matches.get_mut(&id).unwrap())
    }

    fn generate_unique_code(&mut self, rng: &mut impl Rng) -> Result<String, MatchError> {
        let alphabet: Vec<char> = JOIN_CODE_ALPHABET.chars().collect();
        for _ in 0..JOIN_CODE_MAX_ATTEMPTS {
            let candidate: String = (0..JOIN_CODE_LEN)
                .map(|_| alphabet[rng.random_range(0..alphabet.len())])
                .collect();
            if !self.codes.contains_key(&candidate) {
                return Ok(candidate);
            }
        }
        self.next_seq += 1;
        let fallback = format!("{}{}", &JOIN_CODE_ALPHABET[0..1], self.next_seq);
        if self.codes.contains_key(&fallback) {
            Err(MatchError::JoinCodeExhausted(JOIN_CODE_MAX_ATTEMPTS))
        } else {
            Ok(fallback)
        }
    }

    pub fn by_code(&self, code: &str) -> Option<&str> {
        self.codes.get(code).map(|s| s.as_str())
    }

    pub fn get(&self, match_id: &str) -> Option<&Match> {
        self.matches.get(match_id)
    }

    pub fn get_mut(&mut self, match_id: &str) -> Option<&mut Match> {
        self.matches.get_mut(match_id)
    }

    pub fn remove(&mut self, match_id: &str) -> Option<Match> {
        let removed = self.matches.remove(match_id);
        self.codes.retain(|_, v| v != match_id);
        self.empty_since.remove(match_id);
        removed
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Track empty matches and return the ids of any that have now been
    /// empty for at least `delay_secs`. Callers are expected to invoke
    /// this periodically (e.g. alongside a housekeeping timer) and then
    /// `remove` whatever comes back, unless a new join raced in first.
    pub fn sweep_disposable(&mut self, now_secs: f32, delay_secs: f32) -> Vec<String> {
        let mut disposable = Vec::new();
        for (id, match_) in self.matches.iter() {
            if match_.is_empty() {
                let since = *self.empty_since.entry(id.clone()).or_insert(now_secs);
                if now_secs - since >= delay_secs {
                    disposable.push(id.clone());
                }
            } else {
                self.empty_since.remove(id);
            }
        }
        disposable
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn private_match_gets_unique_code() {
        let mut registry = MatchRegistry::new();
        let mut rng = StdRng::seed_from_u64(7);
        let id = registry
            .create_private_match(MatchConfig::default(), 1, "classic".into(), &mut rng)
            .unwrap()
            .id
            .clone();
        let code = registry.get(&id).unwrap().join_code.clone().unwrap();
        assert_eq!(registry.by_code(&code), Some(id.as_str()));
    }

    #[test]
    fn empty_match_becomes_disposable_after_delay() {
        let mut registry = MatchRegistry::new();
        let id = registry
            .create_match(MatchConfig::default(), 1, "classic".into(), None)
            .unwrap()
            .id
            .clone();
        assert!(registry.sweep_disposable(0.0, 30.0).is_empty());
        assert_eq!(registry.sweep_disposable(29.0, 30.0), Vec::<String>::new());
        assert_eq!(registry.sweep_disposable(30.0, 30.0), vec![id]);
    }
}
