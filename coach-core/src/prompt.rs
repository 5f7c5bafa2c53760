//! Prompt builder: coach persona + profile block + history + new query.

use crate::{
    profile::{ExperienceLevel, FitnessGoal, UserProfile},
    transcript::ChatMessage,
};

/// Stand-in for any profile field that is not set.
pub const NOT_PROVIDED: &str = "Not provided";

const PERSONA: &str = r#"You are "CoachFit AI", an expert personal trainer and nutritionist.
Your goal is to provide safe, effective, and personalized fitness and diet advice."#;

const TASK: &str = r#"**Your Task:**
1. **Always** use the user's profile to tailor your advice.
2. Be encouraging, clear, and professional.
3. If you provide a workout plan, format it clearly (e.g., using Markdown tables or lists).
4. If the user asks for something outside of fitness, nutrition, or wellness,
   gently remind them you are a fitness coach and cannot help with that.
5. Keep your answers concise but informative."#;

/// Profile as seen by the prompt: any field may be missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptProfile {
    pub age: Option<u32>,
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub goal: Option<FitnessGoal>,
    pub experience: Option<ExperienceLevel>,
}

impl From<&UserProfile> for PromptProfile {
    fn from(p: &UserProfile) -> Self {
        Self {
            age: Some(p.age),
            weight: Some(p.weight),
            height: Some(p.height),
            goal: Some(p.goal),
            experience: Some(p.experience),
        }
    }
}

/// Builds the full text sent to the completion service.
///
/// `prior` is the transcript *without* the message carrying `query`.
/// The output is deterministic and always ends with `query` verbatim.
///
/// # Example
/// ```
/// use coach_core::prompt::{PromptProfile, build_prompt};
///
/// let prompt = build_prompt(&PromptProfile::default(), &[], "Hi coach");
/// assert!(prompt.contains("- Age: Not provided"));
/// assert!(prompt.ends_with("Hi coach"));
/// ```
pub fn build_prompt(profile: &PromptProfile, prior: &[ChatMessage], query: &str) -> String {
    let age = or_missing(profile.age.map(|a| a.to_string()));
    let weight = or_missing(profile.weight.map(format_measure));
    let height = or_missing(profile.height.map(format_measure));
    let goal = or_missing(profile.goal.map(|g| g.label().to_string()));
    let experience = or_missing(profile.experience.map(|e| e.label().to_string()));

    format!(
        "{PERSONA}\n\
         \n\
         **Your User's Profile:**\n\
         - Age: {age}\n\
         - Weight: {weight} kg\n\
         - Height: {height} cm\n\
         - Fitness Goal: {goal}\n\
         - Experience Level: {experience}\n\
         \n\
         {TASK}\n\
         \n\
         **Conversation History:**\n\
         {history}\n\
         **User's New Query:**\n\
         {query}",
        history = render_history(prior),
    )
}

/// Serializes messages as `**Role**: content` blocks, each followed by a blank line.
pub fn render_history(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("**{}**: {}\n\n", m.role.title(), m.content))
        .collect()
}

fn or_missing(value: Option<String>) -> String {
    value.unwrap_or_else(|| NOT_PROVIDED.to_string())
}

/// Renders a measurement with at least one decimal: `70` → `70.0`, `72.25` → `72.25`.
fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
