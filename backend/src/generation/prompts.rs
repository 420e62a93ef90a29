//! Prompt templates
//!
//! One template per generation-backed operation. Placeholders use
//! `{{name}}`; `{{document}}` receives the document text cut to the
//! template's character budget.

use crate::config::{DOUBT_CONTEXT_CHARS, MAX_TEXT_FOR_AI, PLANNER_CONTEXT_CHARS};

/// A parameterized system + user prompt
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub system: &'static str,
    pub user: &'static str,
    /// Maximum characters of document text inserted into the prompt
    pub document_budget: usize,
}

pub const FLASHCARDS: PromptTemplate = PromptTemplate {
    name: "flashcards",
    system: r#"You are an expert study assistant. Generate flashcards from the provided
text, covering its key concepts, definitions and important facts.
Reply with a single JSON object with one key, "flashcards", whose value is a
list of objects with the keys "q" (the question) and "a" (the answer).
Do not write anything outside the JSON object."#,
    user: r#"Text to analyze:
--- TEXT START ---
{{document}}
--- TEXT END ---
Generate 5-10 high-quality flashcards in the JSON format described above."#,
    document_budget: MAX_TEXT_FOR_AI,
};

pub const QUIZ: PromptTemplate = PromptTemplate {
    name: "quiz",
    system: r#"You are an expert quiz designer. Write a {{count}}-question quiz about the
provided text. The difficulty must be {{difficulty}}.
- Easy questions ask for simple definitions or "what is" facts.
- Medium questions ask to explain a concept or describe a process.
- Hard questions ask for analysis, comparison, or why something works.
Reply with a single JSON object with one key, "questions", whose value is a
list of exactly {{count}} objects with the keys "q" (the question) and "a"
(the correct answer). Do not write anything outside the JSON object."#,
    user: r#"Text to analyze:
--- TEXT START ---
{{document}}
--- TEXT END ---"#,
    document_budget: MAX_TEXT_FOR_AI,
};

pub const GRADING: PromptTemplate = PromptTemplate {
    name: "grading",
    system: r#"You are a strict but fair teaching assistant grading a student's quiz.
You receive a JSON list of items, each with "question", "correct_answer" and
"user_answer". An answer is correct when it captures the main idea; it does
not need to match word for word.
Reply with a single JSON object with one key, "results": a list with exactly
one object per item, in the same order, each with the keys
"is_correct" (boolean), "feedback" (one or two sentences explaining the
judgment) and "topic" (a short name, two to four words, for the subject the
question tests; reuse the same name for questions on the same subject)."#,
    user: r#"Quiz to grade:
{{items}}"#,
    document_budget: 0,
};

pub const DOUBT: PromptTemplate = PromptTemplate {
    name: "doubt",
    system: r#"You are a tutor answering a student's question using only the supplied
[Context].
Rules:
1. Find the answer to the [Question] inside the [Context].
2. Give a clear, helpful explanation, using the context's examples if any.
3. Do not use any outside knowledge.
4. If the context does not contain the answer, reply that the information is
   not available in the provided document.
5. Quote the exact passage(s) of the context you relied on.
Reply with a single JSON object with the keys "answer" (your explanation) and
"reference" (the verbatim quote, or an empty string if nothing applies)."#,
    user: r#"[Context]:
{{document}}

---
[Question]:
{{question}}"#,
    document_budget: DOUBT_CONTEXT_CHARS,
};

pub const TOPICS: PromptTemplate = PromptTemplate {
    name: "topics",
    system: r#"You analyze study material. List the major topics of the provided text
and rate each topic's importance for an exam from 1 (minor) to 10 (central).
Reply with a single JSON object with one key, "topics": a list of objects with
the keys "name", "weight" (an integer from 1 to 10) and "description" (one
sentence)."#,
    user: r#"Study material:
{{document}}"#,
    document_budget: PLANNER_CONTEXT_CHARS,
};

/// Values substituted into a template
#[derive(Debug, Default, Clone)]
pub struct PromptVars<'a> {
    document: Option<&'a str>,
    values: Vec<(&'static str, String)>,
}

impl<'a> PromptVars<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(mut self, text: &'a str) -> Self {
        self.document = Some(text);
        self
    }

    pub fn set(mut self, key: &'static str, value: impl ToString) -> Self {
        self.values.push((key, value.to_string()));
        self
    }
}

impl PromptTemplate {
    /// Render (system, user) in a single pass over each template. Only
    /// placeholders written in the template are filled; text coming from
    /// the document or from a value is copied as is.
    pub fn render(&self, vars: &PromptVars<'_>) -> (String, String) {
        (self.fill(self.system, vars), self.fill(self.user, vars))
    }

    fn fill(&self, template: &str, vars: &PromptVars<'_>) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                rest = &rest[start..];
                break;
            };

            let key = &after[..end];
            match self.lookup(key, vars) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + end + 4]),
            }
            rest = &after[end + 2..];
        }
        out.push_str(rest);

        out
    }

    fn lookup<'v>(&self, key: &str, vars: &'v PromptVars<'_>) -> Option<&'v str> {
        if key == "document" {
            return vars
                .document
                .map(|text| truncate_chars(text, self.document_budget));
        }
        vars.values
            .iter()
            .rev()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }
}

/// Cut `text` to at most `max_chars` characters on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
