//! Prompt composition for the two outreach styles.
//!
//! Both prompts embed the CV, the extracted position text, and the resolved
//! language name. The instructions are deliberately explicit about output
//! hygiene (no markdown, no placeholders, no AI disclaimer) because the
//! result is pasted or sent as-is.

use missive_types::{Language, MessageStyle};

/// Compose the generation prompt.
///
/// `today` is the display date embedded in the cover-letter variant
/// (`%d/%m/%Y`); the LinkedIn note does not use it.
#[must_use]
pub fn compose_prompt(
    style: MessageStyle,
    cv: &str,
    job_text: &str,
    language: Language,
    today: &str,
) -> String {
    match style {
        MessageStyle::LinkedInNote => linkedin_note(cv, job_text, language.name()),
        MessageStyle::CoverLetter => cover_letter(cv, job_text, language.name(), today),
    }
}

fn linkedin_note(cv: &str, job_text: &str, language: &str) -> String {
    format!(
        "\
CV:
{cv}

Position:
{job_text}

Write a SHORT, ENGAGING LinkedIn message in {language} that I can send directly to a recruiter or hiring manager for this position.
- The message should be concise (150-200 words max) and professional yet personable.
- Highlight 2-3 key skills from my CV that match the job requirements.
- Show genuine interest in the role and company.
- Include a clear call-to-action (e.g., \"I'd love to discuss how I can contribute to your team\").
- Use natural, conversational language suitable for LinkedIn (not formal like a cover letter).
- Do NOT use markdown, brackets, or placeholders - write as if ready to paste directly into LinkedIn.
- Do NOT mention that the message was generated by AI.
- Do NOT use generic phrases like \"[Company Name]\" - use specific details if available from the job description.
- Keep it human, authentic, and compelling.
- The message must be in {language}.
- Do NOT include a subject line or \"Dear [Name]\" - just write the message body.

Write only the message, nothing else.
"
    )
}

fn cover_letter(cv: &str, job_text: &str, language: &str, today: &str) -> String {
    format!(
        "\
CV:
{cv}

Position:
{job_text}

Write a complete, professional cover letter in {language} that is directly ready to send.
- Include relevant elements from my CV to highlight my skills and experience for the position.
- Use natural, readable language with standard paragraph formatting (no markdown, no brackets, no bullet points).
- Keep the letter concise, clear, and polite, ready to be sent by email.
- The letter must be in {language}.
- The letter must be between 250 and 400 words.
- Use the job title and the company name in the subject line if possible.
- Use a professional tone suitable for a job application.
- Do not mention that the letter was generated by AI.
- Do not include any notes or explanations outside the letter content.
- Do NOT use any placeholders or text in brackets (e.g., [Your Address], [City], etc.).
- If the information is not provided in the CV, simply omit it.
Date: {today}
"
    )
}

#[cfg(test)]
mod tests {
    use missive_types::{Language, MessageStyle};

    use super::compose_prompt;

    #[test]
    fn note_embeds_cv_position_and_language() {
        let prompt = compose_prompt(
            MessageStyle::LinkedInNote,
            "ten years of Rust",
            "Senior Engineer at Acme",
            Language::German,
            "07/08/2026",
        );

        assert!(prompt.contains("CV:\nten years of Rust"));
        assert!(prompt.contains("Position:\nSenior Engineer at Acme"));
        assert!(prompt.contains("LinkedIn message in German"));
        assert!(prompt.contains("must be in German"));
        assert!(!prompt.contains("Date:"));
    }

    #[test]
    fn unknown_language_code_composes_in_english() {
        let prompt = compose_prompt(
            MessageStyle::LinkedInNote,
            "cv",
            "job",
            Language::from_code("xx"),
            "",
        );
        assert!(prompt.contains("LinkedIn message in English"));
    }

    #[test]
    fn cover_letter_carries_the_date() {
        let prompt = compose_prompt(
            MessageStyle::CoverLetter,
            "cv",
            "job",
            Language::French,
            "07/08/2026",
        );

        assert!(prompt.contains("cover letter in French"));
        assert!(prompt.contains("between 250 and 400 words"));
        assert!(prompt.contains("Date: 07/08/2026"));
    }
}
