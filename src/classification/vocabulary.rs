// Controlled category vocabulary
// The documented label set presented to the backend, plus strict-mode
// filtering of whatever the backend actually returns.

/// Default label set with the explanations shown to the backend
pub const DEFAULT_VOCABULARY: &[(&str, &str)] = &[
    ("Hello", "Greetings and expressions used to initiate a conversation or acknowledge someone's presence."),
    ("Goodbye", "Phrases used to end a conversation or to bid farewell."),
    ("Yes", "Affirmative responses expressing agreement, confirmation, or willingness."),
    ("No", "Negative responses expressing disagreement, refusal, or denial."),
    ("I'm good", "Expressions indicating a positive state of being, happiness, or satisfaction."),
    ("Thank You", "Phrases expressing gratitude or appreciation."),
    ("Sorry", "Expressions of apology or regret."),
    ("Love You", "Phrases expressing affection or strong positive feelings towards someone."),
    ("Miss You", "Expressions conveying a longing for someone's presence or company."),
    ("I Don't Know", "Phrases indicating uncertainty, lack of knowledge, or inability to answer a question."),
    ("Wanna Hang?", "Invitations to spend time together or engage in a social activity."),
    ("Hook-Up", "Expressions suggesting a casual sexual encounter or romantic interest."),
    ("Looking Good", "Compliments on someone's physical appearance."),
    ("BRB", "Acronym indicating a brief absence or pause in the conversation."),
    ("On My Way", "Phrases signaling that the person is en route or ready to meet."),
    ("Party Time", "Expressions associated with celebrations, weekends, or festive occasions."),
    ("OMG", "Exclamations of surprise, shock, or strong emotional reactions."),
    ("Excited", "Expressions of enthusiasm or anticipation."),
    ("Stressed Out", "Phrases indicating feelings of anxiety, pressure, or being overwhelmed."),
    ("Mad", "Expressions of anger, frustration, or annoyance."),
    ("Sad", "Phrases conveying feelings of unhappiness, loneliness, or emotional distress."),
    ("Who Cares", "Expressions of indifference or dismissal."),
    ("Where Are You?", "Questions inquiring about someone's location or urging them to hurry."),
    ("Hungover", "Phrases related to the aftereffects of excessive alcohol consumption."),
    ("Break-Up", "Expressions associated with ending a romantic relationship."),
    ("Call Me", "Requests for communication or a phone call."),
    ("Others", "Expressions, phrases, or statements that do not fit into any of the above mentioned categories."),
];

/// The label set in effect for one classifier instance
#[derive(Debug, Clone)]
pub struct Vocabulary {
    entries: Vec<(String, String)>,
}

impl Vocabulary {
    /// The built-in default label set
    pub fn default_set() -> Self {
        Self {
            entries: DEFAULT_VOCABULARY
                .iter()
                .map(|(name, desc)| (name.to_string(), desc.to_string()))
                .collect(),
        }
    }

    /// Custom label names from configuration (no explanations available).
    /// An empty list means use the default set.
    pub fn from_config(names: &[String]) -> Self {
        if names.is_empty() {
            return Self::default_set();
        }
        Self {
            entries: names
                .iter()
                .map(|name| (name.trim().to_string(), String::new()))
                .filter(|(name, _)| !name.is_empty())
                .collect(),
        }
    }

    /// The "Name: explanation" block embedded in the backend prompt
    pub fn instruction_block(&self) -> String {
        self.entries
            .iter()
            .map(|(name, desc)| {
                if desc.is_empty() {
                    name.clone()
                } else {
                    format!("{}: {}", name, desc)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Canonical name for a label, matched case-insensitively
    pub fn canonical(&self, label: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label.trim()))
            .map(|(name, _)| name.as_str())
    }

    /// Apply vocabulary policy to backend output. Strict mode drops labels
    /// outside the set; otherwise unknown labels pass through as free-form
    /// categories. Known labels are normalized to canonical casing and the
    /// result is deduplicated preserving order.
    pub fn filter(&self, labels: Vec<String>, strict: bool) -> Vec<String> {
        let mut seen = Vec::new();
        for label in labels {
            let resolved = match self.canonical(&label) {
                Some(canonical) => Some(canonical.to_string()),
                None if strict => {
                    log::debug!("Dropping out-of-vocabulary label: {}", label);
                    None
                }
                None => {
                    let trimmed = label.trim().to_string();
                    if trimmed.is_empty() { None } else { Some(trimmed) }
                }
            };
            if let Some(resolved) = resolved {
                if !seen.iter().any(|s: &String| s.eq_ignore_ascii_case(&resolved)) {
                    seen.push(resolved);
                }
            }
        }
        seen
    }
}
