// Prompts for the two document calls: extraction (raw text → Document) and
// optimization (Document → rewritten Document). Both demand the exact Document shape.

/// JSON shape the model must return. Mirrors `models::document::Document`.
pub const DOCUMENT_SCHEMA: &str = r#"{
  "personalInfo": { "fullName": "", "jobTitle": "", "email": "", "phone": "", "location": "" },
  "summary": "",
  "experiences": [{ "role": "", "company": "", "duration": "", "location": "", "description": [""] }],
  "education": [{ "degree": "", "school": "", "year": "", "location": "" }],
  "skills": [""],
  "additionalInfo": { "languages": [""], "certifications": [""], "interests": [""] }
}"#;

/// Fragment that enforces JSON-only output.
pub const JSON_ONLY: &str = "You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

pub fn extraction_system(language: &str) -> String {
    format!(
        "You are an expert ATS résumé parser. Extract the data from the raw text \
         into this exact JSON structure.\n\
         Output language: {language}.\n\n\
         RULES:\n\
         - If a piece of information is missing, use \"\" or [].\n\
         - Split each experience into precise points in the \"description\" array.\n\
         - Never invent employers, dates or degrees that are not in the text.\n\
         - {JSON_ONLY}\n\n\
         JSON STRUCTURE:\n{DOCUMENT_SCHEMA}"
    )
}

pub fn extraction_user(resume_text: &str) -> String {
    format!("Here is the text to parse:\n{resume_text}")
}

pub fn optimization_system(language: &str) -> String {
    format!(
        "You are an expert career coach. Optimize this résumé JSON to make it impactful.\n\n\
         TASKS:\n\
         1. WRITING: use action verbs (\"Led\", \"Optimized\" rather than \"Did\").\n\
         2. SUMMARY: write a compelling three-line profile.\n\
         3. SKILLS: group skills logically.\n\
         4. LANGUAGE: everything must be in {language}.\n\n\
         STRICT RULE: keep EXACTLY the same JSON structure as the input. \
         Do not add or remove experiences or education entries.\n\
         {JSON_ONLY}"
    )
}

pub fn optimization_user(document_json: &str) -> String {
    format!("JSON TO OPTIMIZE:\n{document_json}")
}
