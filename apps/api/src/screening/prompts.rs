// All LLM prompt templates and candidate-facing copy for the screening flow.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Question generation. Replace: {experience_years}, {position}, {tech_stack}
pub const QUESTION_GENERATION_TEMPLATE: &str = r#"You are an expert technical recruiter. Your task is to assess a candidate's technical skills and work experience.

Candidate Details:
- Years of Experience: {experience_years} years
- Desired Position: {position}
- Tech Stack: {tech_stack}

Follow these rules:
- Do not include the name of the technology in the question itself.
- Directly generate technical questions related to the candidate's specified technologies, based on their experience level and desired position.
- The questions should be specific to the technologies they have experience with.
- Each question should be a standalone prompt.

**Generate only 3 technical questions tailored to assess the candidate's proficiency based on their tech stack, years of experience, and desired position.**"#;

/// Marker the alignment template asks for when the answer is mostly correct.
pub const ALIGNED_MARKER: &str = "mostly correct and aligns well with the question";
/// Marker the alignment template asks for when the answer is partially correct.
pub const PARTIALLY_ALIGNED_MARKER: &str = "partially correct but could use some improvement";

/// Alignment feedback. Replace: {question}, {answer}
pub const ALIGNMENT_TEMPLATE: &str = r#"You are an AI assistant evaluating a candidate's answer to a technical interview question. Your task is to assess the relevance, accuracy, and completeness of the candidate's answer, and provide detailed feedback that helps improve their response.
Question: {question}
Answer: {answer}

Please follow these steps:
1. Review the question and the candidate's answer.
2. Evaluate the answer based on:
    - **Relevance**: Does the answer address the question properly?
    - **Accuracy**: Is the information in the answer correct and aligned with the question?
    - **Completeness**: Does the answer cover all aspects of the question?
3. Provide feedback with one of the following:
    - **If the answer is mostly correct**: "Thank you for your response. Your answer is mostly correct and aligns well with the question. You can proceed to the next question."
    - **If the answer is partially correct**: "Thank you for your response. Your answer is partially correct but could use some improvement. Here's a hint to guide you: [Provide specific suggestions to improve the answer]. Please refine your response or proceed to the next question."
    - **If the answer is incorrect**: "Thank you for your response. It's a good attempt, but the answer is not correct. Here's a hint to help you improve: [Provide suggestions to correct or enhance the answer]. Please refine your response or proceed to the next question."

Provide professional and constructive feedback to encourage the candidate's improvement or help them proceed confidently to the next step."#;

/// Numeric scoring. Replace: {question}, {answer}
pub const SCORING_TEMPLATE: &str = r#"You are an AI assistant tasked with evaluating a candidate's response to a technical interview question. **Your goal is to provide a score between 0 and 10 based on the following criteria**:

**1. Relevance (0-3 points)**:
- Does the answer directly address the question asked?
- Is the response aligned with the intent of the question?

**2. Accuracy (0-4 points)**:
- Is the information factually correct and technically sound?
- Are there any misconceptions or errors in the explanation?

**3. Completeness (0-3 points)**:
- Does the answer sufficiently cover all necessary aspects of the question?
- Are there any missing components or incomplete explanations?

**Scoring Breakdown:**
- 0-3: Poor (Incorrect, irrelevant, or very incomplete)
- 4-6: Fair (Partially correct, but with notable gaps)
- 7-8: Good (Mostly correct and covers key points, but minor details missing)
- 9-10: Excellent (Accurate, complete, and highly relevant)

**Instructions:**
- Review the question and answer thoroughly.
- Provide only the final score in numerical form between 0 and 10, with one decimal point if necessary (e.g., 7.5, 9.0).
- Do **not** include any explanations, comments, or additional text in your response.
- **Always return a score and only return the score.**
- If you cannot evaluate, return a score of 0.0.
- The score must be in the format: number (e.g., 7.5 or 9.0).

**Question:** {question}
**Answer:** {answer}"#;

pub const GREETING: &str = "Hello and welcome! 👋 I'm your TalentScout Assistant, here to guide you through the screening process. I'll ask you a few questions to gather some basic information and evaluate your technical skills. This is a great opportunity for you to showcase your abilities and experience.\n\nLet's get started! 😊 If you need any assistance, feel free to ask.";

pub const CLOSING: &str = "Thank you for your time and effort today! 🙏 It was great getting to know more about you and your skills. We appreciate your responses and will review your answers carefully. Our team will reach out to you with the next steps in the hiring process soon. If you have any further questions or need additional information, feel free to contact us. Best of luck, and we hope to speak with you again soon! 😊";

pub const OVERRIDE_PROMPT: &str =
    "Your answer is not aligned. Use 'Continue Anyway' if you'd like to proceed.";

pub const ALIGNED_MESSAGE: &str = "Great! Your answer aligns with the question.";
pub const PARTIALLY_ALIGNED_MESSAGE: &str = "Great! Your answer is partially correct.";
pub const UNPARSEABLE_MESSAGE: &str =
    "Thanks! Your answer has been recorded. Let's move to the next question.";

pub const GENERATION_FAILED: &str =
    "Failed to generate questions. Please start a new screening session later.";

pub fn question_generation_prompt(experience_years: u8, position: &str, tech_stack: &str) -> String {
    QUESTION_GENERATION_TEMPLATE
        .replace("{experience_years}", &experience_years.to_string())
        .replace("{position}", position)
        .replace("{tech_stack}", tech_stack)
}

pub fn alignment_prompt(question: &str, answer: &str) -> String {
    fill_question_answer(ALIGNMENT_TEMPLATE, question, answer)
}

pub fn scoring_prompt(question: &str, answer: &str) -> String {
    fill_question_answer(SCORING_TEMPLATE, question, answer)
}

static QUESTION_ANSWER_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(question|answer)\}").expect("placeholder pattern is valid")
});

// Single pass: braces inside the question or the answer are never treated as placeholders.
fn fill_question_answer(template: &str, question: &str, answer: &str) -> String {
    QUESTION_ANSWER_PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "question" => question,
            _ => answer,
        })
        .into_owned()
}
