//! Lexicon-based binary sentiment model.
//!
//! Fallback used when no ONNX model is available. Scores tokens against
//! positive and negative word lists (Chinese and English), with intensifiers
//! that boost the next sentiment word and negations that flip sentiment
//! within a short window.

use std::collections::{HashMap, HashSet};

use super::{Polarity, Prediction, SentimentModel, TokenSequence};
use crate::error::CapabilityError;

/// Tokens after a negation that it still affects.
const NEGATION_WINDOW: usize = 3;

/// Damping weight added to the denominator so a single word cannot saturate.
const PRIOR_WEIGHT: f32 = 1.0;

/// Longest multi-character Chinese entry, in characters.
const MAX_PHRASE_CHARS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct LexiconEntry {
    /// Valence score (-1.0 to 1.0).
    valence: f32,
    /// Weight/importance of this word.
    weight: f32,
}

/// What a lexicon lookup found at a token position.
enum Term {
    Sentiment(LexiconEntry),
    Intensifier(f32),
    Negation,
}

/// Word-list sentiment model.
pub struct LexiconModel {
    lexicon: HashMap<String, LexiconEntry>,
    intensifiers: HashMap<String, f32>,
    negations: HashSet<String>,
}

impl LexiconModel {
    /// Creates a model with the default lexicons.
    pub fn new() -> Self {
        let mut model = Self {
            lexicon: HashMap::new(),
            intensifiers: HashMap::new(),
            negations: HashSet::new(),
        };
        model.load_default_lexicons();
        model
    }

    /// Overall valence of the token sequence, in [-1, 1].
    pub fn valence(&self, tokens: &TokenSequence) -> f32 {
        let pieces = &tokens.pieces;
        let mut total_score = 0.0f32;
        let mut total_weight = 0.0f32;
        let mut negation_distance: Option<usize> = None;
        let mut pending_intensifier = 1.0f32;

        let mut i = 0;
        while i < pieces.len() {
            let Some((term, consumed)) = self.lookup(&pieces[i..]) else {
                negation_distance = advance_negation(negation_distance);
                i += 1;
                continue;
            };
            i += consumed;

            match term {
                Term::Negation => negation_distance = Some(0),
                Term::Intensifier(boost) => pending_intensifier = boost,
                Term::Sentiment(entry) => {
                    let mut score = entry.valence * entry.weight * pending_intensifier;
                    if negation_distance.is_some() {
                        // Dampen and flip negated sentiment
                        score = -score * 0.7;
                    }
                    total_score += score;
                    total_weight += entry.weight;
                    pending_intensifier = 1.0;
                    negation_distance = advance_negation(negation_distance);
                }
            }
        }

        if total_weight > 0.0 {
            (total_score / (total_weight + PRIOR_WEIGHT)).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Finds the longest entry starting at the first piece.
    ///
    /// Consecutive single-ideograph pieces are joined so multi-character
    /// Chinese words match; Latin words are looked up one piece at a time.
    fn lookup(&self, pieces: &[String]) -> Option<(Term, usize)> {
        let joinable = pieces
            .iter()
            .take(MAX_PHRASE_CHARS)
            .take_while(|p| is_single_ideograph(p))
            .count();

        for len in (2..=joinable).rev() {
            let candidate: String = pieces[..len].concat();
            if let Some(term) = self.term(&candidate) {
                return Some((term, len));
            }
        }
        pieces.first().and_then(|p| self.term(p)).map(|t| (t, 1))
    }

    fn term(&self, word: &str) -> Option<Term> {
        if let Some(entry) = self.lexicon.get(word) {
            Some(Term::Sentiment(*entry))
        } else if let Some(&boost) = self.intensifiers.get(word) {
            Some(Term::Intensifier(boost))
        } else if self.negations.contains(word) {
            Some(Term::Negation)
        } else {
            None
        }
    }

    fn load_default_lexicons(&mut self) {
        self.load_intensifiers();
        self.load_negations();
        self.load_word_lexicon();
    }

    fn load_intensifiers(&mut self) {
        let intensifiers = [
            ("很", 1.3),
            ("非常", 1.3),
            ("太", 1.3),
            ("超", 1.3),
            ("超级", 1.4),
            ("特别", 1.3),
            ("十分", 1.3),
            ("真", 1.2),
            ("最", 1.5),
            ("极其", 1.5),
            ("very", 1.3),
            ("really", 1.3),
            ("extremely", 1.5),
            ("absolutely", 1.5),
            ("so", 1.2),
            ("super", 1.3),
            ("totally", 1.3),
        ];
        for (word, boost) in intensifiers {
            self.intensifiers.insert(word.to_string(), boost);
        }
    }

    fn load_negations(&mut self) {
        let negations = [
            "不", "没", "没有", "别", "无", "未", "not", "no", "never", "don", "didn", "isn",
            "wasn", "cannot",
        ];
        self.negations
            .extend(negations.iter().map(|w| w.to_string()));
    }

    fn load_word_lexicon(&mut self) {
        // (word, valence, weight)
        let words: &[(&str, f32, f32)] = &[
            // Positive
            ("好", 0.8, 1.0),
            ("好用", 0.9, 1.0),
            ("好吃", 0.9, 1.0),
            ("喜欢", 0.9, 1.0),
            ("满意", 0.9, 1.0),
            ("推荐", 0.8, 1.0),
            ("不错", 0.8, 1.0),
            ("棒", 0.9, 1.0),
            ("赞", 0.9, 1.0),
            ("优秀", 0.9, 1.0),
            ("完美", 1.0, 1.5),
            ("值得", 0.7, 1.0),
            ("惊喜", 0.9, 1.0),
            ("舒服", 0.8, 1.0),
            ("漂亮", 0.8, 1.0),
            ("实惠", 0.7, 1.0),
            ("开心", 0.8, 1.0),
            ("good", 0.8, 1.0),
            ("great", 0.9, 1.0),
            ("excellent", 1.0, 1.5),
            ("love", 0.9, 1.0),
            ("amazing", 0.9, 1.0),
            ("wonderful", 0.9, 1.0),
            ("awesome", 0.9, 1.0),
            ("perfect", 1.0, 1.5),
            ("best", 1.0, 1.5),
            ("nice", 0.7, 1.0),
            ("recommend", 0.8, 1.0),
            ("happy", 0.8, 1.0),
            // Negative
            ("差", -0.8, 1.0),
            ("烂", -0.9, 1.0),
            ("垃圾", -1.0, 1.5),
            ("失望", -0.9, 1.0),
            ("难用", -0.9, 1.0),
            ("难吃", -0.9, 1.0),
            ("糟糕", -0.9, 1.0),
            ("后悔", -0.8, 1.0),
            ("退货", -0.7, 1.0),
            ("坑", -0.8, 1.0),
            ("讨厌", -0.9, 1.0),
            ("生气", -0.8, 1.0),
            ("假货", -1.0, 1.5),
            ("破", -0.6, 1.0),
            ("bad", -0.8, 1.0),
            ("terrible", -1.0, 1.5),
            ("awful", -1.0, 1.5),
            ("hate", -0.9, 1.0),
            ("horrible", -1.0, 1.5),
            ("worst", -1.0, 1.5),
            ("disappointed", -0.9, 1.0),
            ("disappointing", -0.9, 1.0),
            ("poor", -0.7, 1.0),
            ("broken", -0.8, 1.0),
            ("useless", -0.9, 1.0),
            ("refund", -0.6, 1.0),
        ];
        for &(word, valence, weight) in words {
            self.lexicon
                .insert(word.to_string(), LexiconEntry { valence, weight });
        }
    }
}

impl Default for LexiconModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentModel for LexiconModel {
    fn classify(&self, tokens: &TokenSequence) -> Result<Prediction, CapabilityError> {
        let valence = self.valence(tokens);
        let polarity = if valence >= 0.0 {
            Polarity::Positive
        } else {
            Polarity::Negative
        };
        Ok(Prediction::new(polarity, 0.5 + valence.abs() / 2.0))
    }

    fn name(&self) -> &'static str {
        "lexicon"
    }
}

fn advance_negation(distance: Option<usize>) -> Option<usize> {
    distance
        .map(|d| d + 1)
        .filter(|&d| d < NEGATION_WINDOW)
}

fn is_single_ideograph(piece: &str) -> bool {
    let mut chars = piece.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_han(c))
}

fn is_han(c: char) -> bool {
    matches!(c,
        '\u{4E00}'..='\u{9FFF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{20000}'..='\u{2A6DF}'
        | '\u{F900}'..='\u{FAFF}')
}
