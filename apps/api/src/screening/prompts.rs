// Prompt constants for resume screening.

/// Scoring should be repeatable across re-runs of the same resume.
pub const EVALUATION_TEMPERATURE: f32 = 0.3;

/// Question generation benefits from variety.
pub const INTERVIEW_TEMPERATURE: f32 = 0.7;

/// Separator used when a list is inlined into a prompt.
pub const LIST_SEPARATOR: &str = "、";

/// Default evaluation prompt. Replace `{jd}`, `{resume}` and
/// `{json_instruction}` before sending. Custom templates need `{jd}` and `{resume}`.
pub const EVALUATION_PROMPT_TEMPLATE: &str = r#"You are an experienced recruiter. Compare the job description with the candidate's resume.

Return a JSON object with this EXACT schema:
{
  "name": "the candidate's full name as written on the resume",
  "score": 0-100 integer match score,
  "tags": ["core highlight 1", "highlight 2", "highlight 3"],
  "strengths": ["key strength 1", "key strength 2", "key strength 3"],
  "risks": ["risk or gap 1", "risk or gap 2"],
  "summary": "one-sentence verdict"
}

{json_instruction}

JOB DESCRIPTION:
{jd}

RESUME:
{resume}"#;

/// Interview question prompt. Answer is free-form markdown, not JSON.
pub const INTERVIEW_PROMPT_TEMPLATE: &str = r#"You are a senior interviewer. Using the job description and the candidate's resume below, write 5 targeted interview questions.

Requirements:
1. Tie each question to both the role's requirements and the candidate's background
2. Cover technical ability, project experience and soft skills
3. After each question add **What it assesses** and **Strong answer signals**
4. Format the whole answer as Markdown with clear headings

JOB DESCRIPTION:
{jd}

RESUME:
{resume}

SCREENING SUMMARY:
- Match score: {score}
- Core tags: {tags}
- Strengths: {strengths}
- Risks: {risks}"#;
