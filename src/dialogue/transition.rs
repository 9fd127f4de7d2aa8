//! Pure turn function
//!
//! Given the same session, utterance and context, `advance` always produces
//! the same result and performs no I/O.

use super::departments::DepartmentTable;
use super::hospital;
use super::state::{AppointmentData, ConversationState, Session};

/// Opening question, also used to re-prompt in `greeting`
pub const OPENING_PROMPT: &str =
    "Welcome to the hospital. I can help you book an appointment. How may I help you today?";

const BOOKING_PROMPT: &str =
    "I can help you book a consultation. Please describe your symptoms or the reason for your call.";
const SYMPTOMS_REPROMPT: &str = "Please describe your symptoms or the reason for your visit.";
const NAME_REPROMPT: &str = "Sorry, I didn't catch that. Please tell me your full name.";
const TIME_REPROMPT: &str = "Please tell me when you would like to come in, for example tomorrow at 10 AM.";

const CLOSING_WORDS: [&str; 5] = ["no", "nope", "done", "bye", "thanks"];

/// Words that make up a bare hello or "I'd like to book", with no reason given
const SMALL_TALK_WORDS: &[&str] = &[
    "hello", "hi", "hey", "good", "morning", "afternoon", "evening", "yes", "yeah", "please",
    "i", "i'd", "id", "i'm", "im", "would", "like", "want", "need", "to", "book", "booking",
    "make", "schedule", "an", "a", "the", "appointment", "consultation", "can", "could", "you",
    "help", "me", "with", "there", "um", "uh",
];

/// Immutable configuration shared by every turn
#[derive(Debug, Clone, Default)]
pub struct DialogueContext {
    pub departments: DepartmentTable,
}

impl DialogueContext {
    #[must_use]
    pub fn new(departments: DepartmentTable) -> Self {
        Self { departments }
    }
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub new_state: ConversationState,
    pub new_data: AppointmentData,
    /// What to say back to the caller; never empty
    pub reply: String,
}

impl TurnResult {
    fn new(new_state: ConversationState, new_data: AppointmentData, reply: impl Into<String>) -> Self {
        Self {
            new_state,
            new_data,
            reply: reply.into(),
        }
    }

    #[must_use]
    pub fn into_session(self) -> (Session, String) {
        (Session::new(self.new_state, self.new_data), self.reply)
    }
}

/// Advance the conversation by one caller utterance.
///
/// At most one slot is written, the one `session.state` collects, and only
/// when the trimmed utterance is non-empty. An empty utterance re-prompts
/// without touching state or data. In `greeting` a stated reason for the
/// call is taken straight into the symptoms slot.
#[must_use]
pub fn advance(session: &Session, utterance: &str, context: &DialogueContext) -> TurnResult {
    let state = session.state;
    let mut data = session.data.clone();
    let text = utterance.trim();

    if text.is_empty() {
        return TurnResult::new(state, data, reprompt(state, &session.data));
    }

    match state {
        ConversationState::Greeting => {
            let answers: Vec<String> = hospital::detect_topics(text)
                .into_iter()
                .map(|topic| hospital::answer(topic, &context.departments))
                .collect();
            let info_only = !answers.is_empty() && !context.departments.recognizes(text);

            if is_booking_request(text) || info_only {
                let mut parts = answers;
                parts.push(BOOKING_PROMPT.to_string());
                return TurnResult::new(state.successor(), data, parts.join(" "));
            }

            // The answer to the opening question is the reason for calling
            let mut result = collect_symptoms(data, text, context);
            if !answers.is_empty() {
                result.reply = format!("{} {}", answers.join(" "), result.reply);
            }
            result
        }

        ConversationState::CollectSymptoms => collect_symptoms(data, text, context),

        ConversationState::CollectName => {
            data.caller_name = text.to_string();
            let reply = format!(
                "Thank you, {}. What is your preferred appointment time, for example tomorrow at 10 AM?",
                data.caller_name
            );
            TurnResult::new(state.successor(), data, reply)
        }

        ConversationState::CollectTime => {
            data.requested_time = text.to_string();
            let reply = format!(
                "{} Is there anything else I can help you with?",
                confirmation_summary(&data)
            );
            TurnResult::new(state.successor(), data, reply)
        }

        ConversationState::Confirmation => {
            let reply = if is_closing(text) {
                farewell(&data)
            } else {
                confirmation_summary(&data)
            };
            TurnResult::new(state, data, reply)
        }
    }
}

/// Store the symptoms, route them to a department and ask for the name
fn collect_symptoms(mut data: AppointmentData, text: &str, context: &DialogueContext) -> TurnResult {
    let explicit = context.departments.mentioned(text).is_some();
    data.symptoms = text.to_string();
    data.department = context.departments.resolve(text).to_string();
    let reply = if explicit {
        format!(
            "You've selected {}. Please provide your full name.",
            data.department
        )
    } else {
        format!(
            "Based on your symptoms, I recommend the {} department. Please provide your full name.",
            data.department
        )
    };
    TurnResult::new(ConversationState::CollectName, data, reply)
}

/// Fresh session for a new (or ended) call
#[must_use]
pub fn reset() -> Session {
    Session::default()
}

fn reprompt(state: ConversationState, data: &AppointmentData) -> String {
    match state {
        ConversationState::Greeting => OPENING_PROMPT.to_string(),
        ConversationState::CollectSymptoms => SYMPTOMS_REPROMPT.to_string(),
        ConversationState::CollectName => NAME_REPROMPT.to_string(),
        ConversationState::CollectTime => TIME_REPROMPT.to_string(),
        ConversationState::Confirmation => confirmation_summary(data),
    }
}

/// Summary of the booking, filling gaps with placeholders
fn confirmation_summary(data: &AppointmentData) -> String {
    let name = non_empty_or(&data.caller_name, "you");
    let department = non_empty_or(&data.department, "the next available department");
    let time = non_empty_or(&data.requested_time, "the next available time");
    format!("Your appointment with {department} is set for {name} at {time}.")
}

fn farewell(data: &AppointmentData) -> String {
    if data.caller_name.is_empty() {
        "Thank you for contacting us. Have a great day!".to_string()
    } else {
        format!(
            "Thank you for contacting us, {}. Have a great day!",
            data.caller_name
        )
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}

fn words(lowered: &str) -> impl Iterator<Item = &str> {
    lowered
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|word| !word.is_empty())
}

/// A greeting that asks to book without saying why
fn is_booking_request(text: &str) -> bool {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    let all_small_talk = words(&lowered).all(|word| SMALL_TALK_WORDS.contains(&word));
    all_small_talk
}

fn is_closing(text: &str) -> bool {
    let lowered = text.to_lowercase();
    if lowered.contains("thank you") {
        return true;
    }
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| CLOSING_WORDS.contains(&word))
}
