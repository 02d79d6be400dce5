//! Post-game mistake review
//!
//! Sends the run's mistakes to an explanation service and keeps the
//! returned explanations keyed by active sentence. Failures stay local to
//! the review; the run state is never touched.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::sim::{GameStatus, Mistake};

/// Failure from an explanation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    Unavailable(String),
    BadResponse(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "explanation service unavailable: {msg}"),
            Self::BadResponse(msg) => write!(f, "bad explanation response: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {}

/// One mistake as sent to the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MistakeEntry {
    pub active: String,
    pub passive: String,
    pub student_answer: String,
}

impl From<&Mistake> for MistakeEntry {
    fn from(m: &Mistake) -> Self {
        Self {
            active: m.question.active.to_string(),
            passive: m.question.passive.to_string(),
            student_answer: m.selected_answer.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExplanationItem {
    question: String,
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct ExplanationResponse {
    #[serde(default)]
    explanations: Vec<ExplanationItem>,
}

/// Parse a `{"explanations": [{"question", "explanation"}]}` response
pub fn parse_explanations(json: &str) -> Result<BTreeMap<String, String>, ServiceError> {
    let response: ExplanationResponse =
        serde_json::from_str(json).map_err(|e| ServiceError::BadResponse(e.to_string()))?;
    Ok(response
        .explanations
        .into_iter()
        .map(|item| (item.question, item.explanation))
        .collect())
}

/// Teacher-style prompt for a batch of mistakes
pub fn build_prompt(entries: &[MistakeEntry]) -> Result<String, ServiceError> {
    let data = serde_json::to_string(entries).map_err(|e| ServiceError::BadResponse(e.to_string()))?;
    Ok(format!(
        "You are an English Grammar Teacher. A student made the following mistakes in converting \
         Active Voice to Passive Voice.\n\
         Explain simply why their answer is wrong or how the correct passive form is constructed \
         (focus on verb to be + past participle).\n\n\
         Data: {data}\n\n\
         Return a JSON object where keys are the \"active\" sentences and values are the short \
         explanation string."
    ))
}

/// Anything that can explain a batch of mistakes
pub trait ExplanationService {
    /// Explanations keyed by active sentence
    fn explain(&self, entries: &[MistakeEntry]) -> Result<BTreeMap<String, String>, ServiceError>;
}

/// Offline explainer: points at the correct form and the auxiliary it uses
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedExplainer;

const AUXILIARIES: [&str; 12] = [
    "has been", "have been", "had been", "is being", "are being", "was being", "will be", "can be",
    "must be", "was", "were", "is",
];

impl ExplanationService for RuleBasedExplainer {
    fn explain(&self, entries: &[MistakeEntry]) -> Result<BTreeMap<String, String>, ServiceError> {
        Ok(entries
            .iter()
            .map(|e| {
                let hint = AUXILIARIES
                    .iter()
                    .find(|aux| e.passive.contains(&format!(" {aux} ")) || e.passive.starts_with(*aux))
                    .map(|aux| format!(" It uses \"{aux}\" followed by the past participle."))
                    .unwrap_or_default();
                let text = format!(
                    "You chose \"{}\", but the passive form is \"{}\".{}",
                    e.student_answer, e.passive, hint
                );
                (e.active.clone(), text)
            })
            .collect())
    }
}

/// Review screen state
#[derive(Debug, Default, Clone, Serialize)]
pub struct MistakeReview {
    explanations: BTreeMap<String, String>,
    generating: bool,
    last_error: Option<String>,
}

impl MistakeReview {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the review may call the service in `status`
    pub fn available_in(status: GameStatus) -> bool {
        matches!(
            status,
            GameStatus::Menu | GameStatus::ArtRoom | GameStatus::GameOver | GameStatus::Victory
        )
    }

    /// Request explanations for `mistakes`. Returns false when nothing was
    /// requested (wrong screen, no mistakes, already generating, or the
    /// service failed; see `last_error`).
    pub fn generate(&mut self, status: GameStatus, mistakes: &[Mistake], service: &dyn ExplanationService) -> bool {
        if !Self::available_in(status) || mistakes.is_empty() || self.generating {
            return false;
        }

        self.generating = true;
        let entries: Vec<MistakeEntry> = mistakes.iter().map(MistakeEntry::from).collect();
        let result = service.explain(&entries);
        self.generating = false;

        match result {
            Ok(explanations) => {
                log::info!("Received {} explanations", explanations.len());
                self.explanations = explanations;
                self.last_error = None;
                true
            }
            Err(e) => {
                log::error!("Explanation request failed: {e}");
                self.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// Explanation for an active sentence, if one came back
    pub fn explanation(&self, active: &str) -> Option<&str> {
        self.explanations.get(active).map(String::as_str)
    }

    pub fn explanations(&self) -> &BTreeMap<String, String> {
        &self.explanations
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::questions::TIER_1;

    struct FailingService;

    impl ExplanationService for FailingService {
        fn explain(&self, _: &[MistakeEntry]) -> Result<BTreeMap<String, String>, ServiceError> {
            Err(ServiceError::Unavailable("offline".into()))
        }
    }

    fn mistakes() -> Vec<Mistake> {
        vec![Mistake {
            question: TIER_1[0],
            selected_answer: "A room booked me".into(),
        }]
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = MistakeEntry::from(&mistakes()[0]);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["studentAnswer"], "A room booked me");
        assert_eq!(json["active"], "I booked a room");

        let prompt = build_prompt(&[entry]).unwrap();
        assert!(prompt.contains("\"studentAnswer\":\"A room booked me\""));
    }

    #[test]
    fn test_parse_explanations() {
        let json = r#"{"explanations":[{"question":"I booked a room","explanation":"Use was + booked."}]}"#;
        let map = parse_explanations(json).unwrap();
        assert_eq!(map["I booked a room"], "Use was + booked.");

        assert!(parse_explanations("{}").unwrap().is_empty());
        assert!(matches!(parse_explanations("nope"), Err(ServiceError::BadResponse(_))));
    }

    #[test]
    fn test_generate_with_rule_explainer() {
        let mut review = MistakeReview::new();
        assert!(review.generate(GameStatus::GameOver, &mistakes(), &RuleBasedExplainer));
        let text = review.explanation("I booked a room").unwrap();
        assert!(text.contains("A room was booked by me"));
        assert!(text.contains("\"was\""));
        assert!(!review.is_generating());
    }

    #[test]
    fn test_explanations_in_sentence_order() {
        let mistakes: Vec<Mistake> = [TIER_1[2], TIER_1[0], TIER_1[1]]
            .into_iter()
            .map(|question| Mistake {
                question,
                selected_answer: question.distractors[0].into(),
            })
            .collect();

        let mut review = MistakeReview::new();
        assert!(review.generate(GameStatus::Victory, &mistakes, &RuleBasedExplainer));
        let keys: Vec<&String> = review.explanations().keys().collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_generate_not_during_play() {
        let mut review = MistakeReview::new();
        assert!(!review.generate(GameStatus::Playing, &mistakes(), &RuleBasedExplainer));
        assert!(!review.generate(GameStatus::GameOver, &[], &RuleBasedExplainer));
        assert!(review.explanations().is_empty());
    }

    #[test]
    fn test_failure_stays_local() {
        let mut review = MistakeReview::new();
        assert!(!review.generate(GameStatus::GameOver, &mistakes(), &FailingService));
        assert!(review.last_error().unwrap().contains("offline"));
        assert!(!review.is_generating());
    }
}
