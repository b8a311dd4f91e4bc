//! Recruiter prompt used for the qualitative fit assessment

use regex::Regex;

const FIT_ASSESSMENT_TEMPLATE: &str = r#"You are an expert recruiter. Given the following job description (JD) and a candidate's resume, assess whether the candidate is a good fit for the job.

Job Description:
{job}

Resume Content:
{resume}

Your analysis should:
1. Assess the overall fit of the candidate for the job.
2. Provide specific reasons for the fit or lack thereof.
3. If the candidate is a good fit, mention specific skills, experience, or qualifications that align with the JD.
4. If the candidate is not a good fit, explain the gaps and suggest improvements or training areas.
5. Provide a recommendation (Yes/No) along with detailed reasoning.

End your answer with a single line of the form "Recommendation: Yes" or "Recommendation: No"."#;

pub struct PromptTemplates {
    fit_assessment: String,
    recommendation: Regex,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            fit_assessment: FIT_ASSESSMENT_TEMPLATE.to_string(),
            recommendation: Regex::new(r"(?i)\brecommendation\b[^a-z\n]{0,20}\b(yes|no)\b")
                .expect("Invalid recommendation regex"),
        }
    }
}

impl PromptTemplates {
    /// Single pass, so braces inside either text are never treated as markers.
    pub fn render_fit_assessment(&self, resume: &str, job: &str) -> String {
        let pieces = self.fit_assessment.split_once("{job}").and_then(|(head, tail)| {
            tail.split_once("{resume}")
                .map(|(middle, end)| (head, middle, end))
        });

        match pieces {
            Some((head, middle, end)) => format!("{}{}{}{}{}", head, job, middle, resume, end),
            None => self.fit_assessment.clone(),
        }
    }

    /// The final Yes/No recommendation in an answer, if the model gave one.
    pub fn parse_recommendation(&self, answer: &str) -> Option<bool> {
        self.recommendation
            .captures_iter(answer)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().eq_ignore_ascii_case("yes"))
    }
}
