//! Profile form steps 1–7: prompt copy, validation, and storage into the profile.

use serde::Deserialize;

use crate::models::candidate::CandidateProfile;
use crate::models::session::FormStep;
use crate::screening::anonymizer::anonymize;
use crate::screening::ScreeningError;

pub const MAX_EXPERIENCE_YEARS: u8 = 50;

/// A submitted form value. Experience accepts either a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Text(String),
}

/// Candidate-facing prompt for a step.
pub fn step_prompt(step: FormStep) -> &'static str {
    match step {
        FormStep::FullName => "Let's start with your full name. What's your name? 😊",
        FormStep::Email => {
            "Great! Now, could you please share your email address? 📧 This will help us contact you if needed."
        }
        FormStep::Phone => {
            "Next, could you please provide your phone number? 📱 It's optional, but it would be helpful in case we need to reach you quickly."
        }
        FormStep::Experience => {
            "How many years of professional experience do you have? 🧑‍💻 Please enter a number (e.g., 3 years)."
        }
        FormStep::Position => {
            "What position(s) are you applying for? Feel free to mention one or more roles you're interested in. 🧐"
        }
        FormStep::Location => {
            "Where are you currently located? 🌍 Knowing your location helps us with scheduling and potential relocation needs."
        }
        FormStep::TechStack => {
            "Finally, let's talk about your tech stack! 💻 What technologies do you specialize in? Please list them (e.g., Python, Django, SQL)."
        }
        FormStep::Questions => "Step 8: Technical Questions",
    }
}

/// Validates `value` for `step` and stores it into `profile`.
///
/// Returns the acknowledgement shown to the candidate. On error the profile is untouched.
pub fn apply_field(
    profile: &mut CandidateProfile,
    step: FormStep,
    value: &FieldValue,
) -> Result<String, ScreeningError> {
    match step {
        FormStep::FullName => {
            let name = required_text(step, value)?;
            profile.name_hash = Some(anonymize(name));
            Ok(format!(
                "Thank you, {name}! Welcome {name}, let's move to the next question."
            ))
        }
        FormStep::Email => {
            let email = required_text(step, value)?;
            profile.email_hash = Some(anonymize(email));
            Ok(format!(
                "Got it! We've recorded your email as {email} for further updates. Next, let's move on."
            ))
        }
        FormStep::Phone => {
            let phone = required_text(step, value)?;
            profile.phone_hash = Some(anonymize(phone));
            Ok(format!(
                "Thanks! We've noted your phone number as {phone} for further communication. Moving on!"
            ))
        }
        FormStep::Experience => {
            let years = experience_years(value)?;
            profile.experience_years = Some(years);
            Ok(format!(
                "Got it! You have {years} years of experience, wonderful. Let's continue."
            ))
        }
        FormStep::Position => {
            let position = required_text(step, value)?;
            profile.position = Some(position.to_string());
            Ok(format!(
                "Thank you! You've applied for the {position} position. Let's move to the next."
            ))
        }
        FormStep::Location => {
            let location = required_text(step, value)?;
            profile.location = Some(location.to_string());
            Ok(format!(
                "Thanks! We have your location as {location}. We're almost done!"
            ))
        }
        FormStep::TechStack => {
            let tech_stack = required_text(step, value)?;
            profile.tech_stack = Some(tech_stack.to_string());
            Ok(format!(
                "Awesome! You've listed your tech stack as {tech_stack}. You're all set! Just answer a few questions to complete the screening round."
            ))
        }
        FormStep::Questions => Err(ScreeningError::InvalidAction(
            "The profile form is complete; submit answers instead".to_string(),
        )),
    }
}

fn required_text(step: FormStep, value: &FieldValue) -> Result<&str, ScreeningError> {
    match value {
        FieldValue::Text(text) if !text.trim().is_empty() => Ok(text.trim()),
        FieldValue::Text(_) => Err(ScreeningError::Validation(format!(
            "{} cannot be empty",
            step.label()
        ))),
        FieldValue::Integer(_) => Err(ScreeningError::Validation(format!(
            "{} must be text",
            step.label()
        ))),
    }
}

fn experience_years(value: &FieldValue) -> Result<u8, ScreeningError> {
    let years = match value {
        FieldValue::Integer(n) => *n,
        FieldValue::Text(text) => text.trim().parse::<i64>().map_err(|_| {
            ScreeningError::Validation("Years of Experience must be a whole number".to_string())
        })?,
    };

    u8::try_from(years)
        .ok()
        .filter(|y| *y <= MAX_EXPERIENCE_YEARS)
        .ok_or_else(|| {
            ScreeningError::Validation(format!(
                "Years of Experience must be between 0 and {MAX_EXPERIENCE_YEARS}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    #[test]
    fn test_name_is_stored_hashed() {
        let mut profile = CandidateProfile::default();
        let ack = apply_field(&mut profile, FormStep::FullName, &text("Alice")).unwrap();
        assert!(ack.contains("Alice"));
        assert_eq!(profile.name_hash.as_deref(), Some(anonymize("Alice").as_str()));
        assert!(!serde_json::to_string(&profile).unwrap().contains("Alice"));
    }

    #[test]
    fn test_identifying_fields_are_trimmed_before_hashing() {
        let mut profile = CandidateProfile::default();
        apply_field(&mut profile, FormStep::Email, &text("  a@b.io ")).unwrap();
        assert_eq!(profile.email_hash, Some(anonymize("a@b.io")));
    }

    #[test]
    fn test_empty_text_is_rejected_without_mutation() {
        let mut profile = CandidateProfile::default();
        for value in [text(""), text("   \n")] {
            let err = apply_field(&mut profile, FormStep::Position, &value).unwrap_err();
            assert!(matches!(err, ScreeningError::Validation(_)));
        }
        assert_eq!(profile, CandidateProfile::default());
    }

    #[test]
    fn test_number_for_text_field_is_rejected() {
        let mut profile = CandidateProfile::default();
        let err = apply_field(&mut profile, FormStep::Location, &FieldValue::Integer(3)).unwrap_err();
        assert!(matches!(err, ScreeningError::Validation(_)));
    }

    #[test]
    fn test_zero_experience_is_valid() {
        let mut profile = CandidateProfile::default();
        apply_field(&mut profile, FormStep::Experience, &FieldValue::Integer(0)).unwrap();
        assert_eq!(profile.experience_years, Some(0));
    }

    #[test]
    fn test_experience_accepts_numeric_string() {
        let mut profile = CandidateProfile::default();
        apply_field(&mut profile, FormStep::Experience, &text(" 12 ")).unwrap();
        assert_eq!(profile.experience_years, Some(12));
    }

    #[test]
    fn test_experience_bounds() {
        let mut profile = CandidateProfile::default();
        assert!(apply_field(&mut profile, FormStep::Experience, &FieldValue::Integer(50)).is_ok());
        for bad in [FieldValue::Integer(-1), FieldValue::Integer(51), text("three"), text("")] {
            let err = apply_field(&mut profile, FormStep::Experience, &bad).unwrap_err();
            assert!(matches!(err, ScreeningError::Validation(_)), "{bad:?}");
        }
        assert_eq!(profile.experience_years, Some(50));
    }

    #[test]
    fn test_questions_step_takes_no_field() {
        let mut profile = CandidateProfile::default();
        let err = apply_field(&mut profile, FormStep::Questions, &text("x")).unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidAction(_)));
    }

    #[test]
    fn test_field_value_deserializes_number_or_text() {
        let n: FieldValue = serde_json::from_str("7").unwrap();
        assert_eq!(n, FieldValue::Integer(7));
        let s: FieldValue = serde_json::from_str("\"Rust\"").unwrap();
        assert_eq!(s, text("Rust"));
    }
}
