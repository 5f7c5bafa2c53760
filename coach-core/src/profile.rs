//! User profile: the validated attributes that personalize every prompt.

use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

pub const AGE_RANGE: RangeInclusive<u32> = 16..=100;
pub const WEIGHT_RANGE_KG: RangeInclusive<f64> = 40.0..=200.0;
pub const HEIGHT_RANGE_CM: RangeInclusive<f64> = 140.0..=230.0;

pub const DEFAULT_AGE: u32 = 25;
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 175.0;

/// Primary fitness goal; serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FitnessGoal {
    #[serde(rename = "Lose Weight")]
    LoseWeight,
    #[serde(rename = "Build Muscle")]
    BuildMuscle,
    #[serde(rename = "Improve Endurance")]
    ImproveEndurance,
    #[default]
    #[serde(rename = "General Fitness")]
    GeneralFitness,
    #[serde(rename = "Learn a specific skill (e.g., pull-up)")]
    LearnSkill,
}

impl FitnessGoal {
    pub const ALL: [FitnessGoal; 5] = [
        FitnessGoal::LoseWeight,
        FitnessGoal::BuildMuscle,
        FitnessGoal::ImproveEndurance,
        FitnessGoal::GeneralFitness,
        FitnessGoal::LearnSkill,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FitnessGoal::LoseWeight => "Lose Weight",
            FitnessGoal::BuildMuscle => "Build Muscle",
            FitnessGoal::ImproveEndurance => "Improve Endurance",
            FitnessGoal::GeneralFitness => "General Fitness",
            FitnessGoal::LearnSkill => "Learn a specific skill (e.g., pull-up)",
        }
    }
}

impl fmt::Display for FitnessGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FitnessGoal {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FitnessGoal::ALL
            .into_iter()
            .find(|g| g.label() == s)
            .ok_or_else(|| ProfileError::UnknownGoal(s.to_string()))
    }
}

/// Training experience; serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 3] = [
        ExperienceLevel::Beginner,
        ExperienceLevel::Intermediate,
        ExperienceLevel::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExperienceLevel {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExperienceLevel::ALL
            .into_iter()
            .find(|e| e.label() == s)
            .ok_or_else(|| ProfileError::UnknownExperience(s.to_string()))
    }
}

/// Raw SaveProfile payload, exactly as the form submits it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileForm {
    pub age: i64,
    pub weight: f64,
    pub height: f64,
    pub goal: String,
    pub experience: String,
}

/// A fully validated profile. Replaced wholesale on every save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub height: f64,
    pub goal: FitnessGoal,
    pub experience: ExperienceLevel,
}

impl TryFrom<ProfileForm> for UserProfile {
    type Error = ProfileError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let age = u32::try_from(form.age)
            .ok()
            .filter(|a| AGE_RANGE.contains(a))
            .ok_or(ProfileError::OutOfRange {
                field: "age",
                min: f64::from(*AGE_RANGE.start()),
                max: f64::from(*AGE_RANGE.end()),
                value: form.age as f64,
            })?;
        let weight = check_range("weight", form.weight, &WEIGHT_RANGE_KG)?;
        let height = check_range("height", form.height, &HEIGHT_RANGE_CM)?;

        Ok(UserProfile {
            age,
            weight,
            height,
            goal: form.goal.trim().parse()?,
            experience: form.experience.trim().parse()?,
        })
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    range: &RangeInclusive<f64>,
) -> Result<f64, ProfileError> {
    if value.is_finite() && range.contains(&value) {
        Ok(value)
    } else {
        Err(ProfileError::OutOfRange {
            field,
            min: *range.start(),
            max: *range.end(),
            value,
        })
    }
}

/// One numeric input of the profile form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberField<T> {
    pub label: &'static str,
    pub min: T,
    pub max: T,
    pub value: T,
}

/// One select input of the profile form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectField {
    pub label: &'static str,
    pub options: Vec<&'static str>,
    pub value: &'static str,
}

/// Everything a profile form needs to render: ranges, options, current values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileFormView {
    pub age: NumberField<u32>,
    pub weight: NumberField<f64>,
    pub height: NumberField<f64>,
    pub goal: SelectField,
    pub experience: SelectField,
}

impl ProfileFormView {
    /// Prefills from `current`, falling back to the form defaults.
    pub fn prefilled(current: Option<&UserProfile>) -> Self {
        let age = current.map_or(DEFAULT_AGE, |p| p.age);
        let weight = current.map_or(DEFAULT_WEIGHT_KG, |p| p.weight);
        let height = current.map_or(DEFAULT_HEIGHT_CM, |p| p.height);
        let goal = current.map(|p| p.goal).unwrap_or_default();
        let experience = current.map(|p| p.experience).unwrap_or_default();

        Self {
            age: NumberField {
                label: "Age",
                min: *AGE_RANGE.start(),
                max: *AGE_RANGE.end(),
                value: age,
            },
            weight: NumberField {
                label: "Weight (kg)",
                min: *WEIGHT_RANGE_KG.start(),
                max: *WEIGHT_RANGE_KG.end(),
                value: weight,
            },
            height: NumberField {
                label: "Height (cm)",
                min: *HEIGHT_RANGE_CM.start(),
                max: *HEIGHT_RANGE_CM.end(),
                value: height,
            },
            goal: SelectField {
                label: "Primary Fitness Goal",
                options: FitnessGoal::ALL.iter().map(|g| g.label()).collect(),
                value: goal.label(),
            },
            experience: SelectField {
                label: "Experience Level",
                options: ExperienceLevel::ALL.iter().map(|e| e.label()).collect(),
                value: experience.label(),
            },
        }
    }
}
