pub const MULTIPLE_CHOICE_SCHEMA: &str = r#"{
  "book_title": "string",
  "difficulty": "easy | medium | hard",
  "quizzes": [
    {
      "id": 1,
      "question": "string",
      "options": ["string", "string", "string", "string"],
      "correct_answer_index": 0,
      "explanation": "string"
    }
  ]
}"#;

pub const TRUE_FALSE_SCHEMA: &str = r#"{
  "book_title": "string",
  "difficulty": "easy | medium | hard",
  "quizzes": [
    {
      "id": 1,
      "question": "string",
      "answer": true,
      "explanation": "string"
    }
  ]
}"#;

pub const SHORT_ANSWER_SCHEMA: &str = r#"{
  "book_title": "string",
  "difficulty": "easy | medium | hard",
  "quizzes": [
    {
      "id": 1,
      "question": "string",
      "answer": "string",
      "explanation": "string"
    }
  ]
}"#;

pub const QUIZ_OUTPUT_RULES: &str = "## OUTPUT RULES

- Return ONLY raw JSON. Do not wrap it in markdown code fences (no ```).
- No prose, commentary or text before or after the JSON object.
- Use exactly the keys shown in the format below. Do not add keys.
- Number the `id` field sequentially starting at 1.
- Never leave `answer` or `explanation` empty. Every item needs both.
- Keep each explanation to one concise sentence.
- Avoid spoilers. If a question cannot avoid one, start the question with \"[Spoiler]\".";

pub const CHAT_RESPONSE_RULES: &str = "Response rules:
- Answer exactly what is asked
- Use clear, student-friendly language
- Do NOT include spoilers
- If the question requires spoilers, answer at a high level only and say up front that the answer touches on plot details
- If information is uncertain or unavailable, say so and stay general
- Keep the response under 120 words

Return only the answer.";

pub const NOTE_INSIGHT_RULES: &str = "CRITICAL INSTRUCTIONS:
- Provide ONLY the explanation.
- DO NOT use any Markdown formatting (no **, #, or lists).
- DO NOT start with labels like \"Summary:\" or \"Explanation:\".
- Use plain text only.
- Max 150 words.";
