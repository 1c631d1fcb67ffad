//! Prompt and template construction. Pure string building, no I/O.

use serde_json::Value as JsonValue;

/// Build the model prompt for a structured bid proposal.
///
/// The project record is the raw (or shaped) marketplace JSON; only title,
/// description, budget bounds and currency code are read. The budget line is
/// included only when both bounds are non-zero.
#[must_use]
pub fn proposal_prompt(project: &JsonValue, agency: &str) -> String {
    let title = project.get("title").and_then(JsonValue::as_str).unwrap_or("");
    let description = project
        .get("description")
        .and_then(JsonValue::as_str)
        .unwrap_or("");
    let currency = project
        .pointer("/currency/code")
        .and_then(JsonValue::as_str)
        .unwrap_or("USD");
    let min_budget = project
        .pointer("/budget/minimum")
        .and_then(JsonValue::as_f64)
        .unwrap_or(0.0);
    let max_budget = project
        .pointer("/budget/maximum")
        .and_then(JsonValue::as_f64)
        .unwrap_or(0.0);

    let budget_line = if min_budget != 0.0 && max_budget != 0.0 {
        format!("Budget: {min_budget}-{max_budget} {currency}")
    } else {
        String::new()
    };

    format!(
        "\
You are a professional bid writer at {agency}.
Your job is to create a highly persuasive bid under 1500 characters
based on the project details below.

Project Title: {title}
Description: {description}
{budget_line}

Write the bid in this exact structure (strictly maintain formatting):

Dear Hiring Manager,
Greetings from {agency}!

Project Scope:
Summarize in 2-3 lines what this project is about and what the client needs.

Our Approach:
Describe in 3-4 lines how we'll deliver it successfully in a clear, confident, human tone.

We specialize in:
- Web & Mobile App Development
- UI/UX Design
- Frontend (React.js, Next.js) and Backend (Node.js, JAVA)
- Python, AI/ML
- DevOps, AWS, GCP, Azure
- SEO & Digital Marketing

Questions for you:
1. [First simple question based on the project]
2. [Second simple question based on the project]

We look forward to collaborating with you. Please feel free to reach out for any clarifications.
Warm regards,
{agency}

Rules:
- Keep the total bid under 1500 characters.
- Do NOT use markdown symbols (** or _).
- Use a natural, human-friendly tone.
- Avoid emojis, hashtags, or robotic language.
- Ensure the result looks like it was typed by a professional business development manager.
- Keep Project Scope concise (2-3 lines).
- Keep Our Approach focused (3-4 lines).
- Ask TWO simple, easy-to-answer questions that are directly relevant to the project description.
- Each question must be on a SEPARATE LINE numbered as 1. and 2.
- Questions should demonstrate you understand the requirements and want basic clarifications.
- Keep questions straightforward and non-technical.
"
    )
}

/// Static proposal for graphics projects. Never goes through the model.
#[must_use]
pub fn graphics_proposal(project: &JsonValue, agency: &str) -> String {
    let title = project
        .get("title")
        .and_then(JsonValue::as_str)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or("your project");

    format!(
        "\
Hello,
We will create a classic logo for {title}, and we are excited to say that we can deliver this project with perfection.

We have a talented graphic design team for exclusive premium logos and all printing materials.

Here's what we offer:
- Within 24 hrs we will send you 6 logo options from 6 different designers to choose from.
- All artwork will be custom, with no use of clipart.
- Unlimited revisions; don't hesitate to request as many as you need.
- All source files provided (AI, PSD, PDF, EPS, JPEG, PNG).
- High-resolution quality; you will own the full copyright of the final design.

Please message us to discuss this.

Warm regards,
{agency}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prompt_includes_project_details() {
        let project = json!({
            "title": "Build a site",
            "description": "A marketing site with a blog.",
            "budget": {"minimum": 250.0, "maximum": 750.0},
            "currency": {"code": "EUR"}
        });

        let prompt = proposal_prompt(&project, "Northline Digital");

        assert!(prompt.contains("Project Title: Build a site"));
        assert!(prompt.contains("A marketing site with a blog."));
        assert!(prompt.contains("Budget: 250-750 EUR"));
        assert!(prompt.contains("Greetings from Northline Digital!"));
        assert!(prompt.contains("under 1500 characters"));
    }

    #[test]
    fn prompt_omits_budget_line_when_a_bound_is_zero() {
        let project = json!({
            "title": "Build a site",
            "description": "A marketing site.",
            "budget": {"minimum": 0.0, "maximum": 750.0}
        });

        let prompt = proposal_prompt(&project, "Northline Digital");
        assert!(!prompt.contains("Budget:"));
    }

    #[test]
    fn prompt_tolerates_an_empty_project() {
        let prompt = proposal_prompt(&json!({}), "Northline Digital");
        assert!(prompt.contains("Project Title: \n"));
        assert!(!prompt.contains("Budget:"));
    }

    #[test]
    fn graphics_proposal_interpolates_title() {
        let text = graphics_proposal(&json!({"title": " Acme rebrand "}), "Northline Digital");
        assert!(text.contains("a classic logo for Acme rebrand"));
        assert!(text.ends_with("Northline Digital"));

        let fallback = graphics_proposal(&json!({}), "Northline Digital");
        assert!(fallback.contains("a classic logo for your project"));
    }
}
