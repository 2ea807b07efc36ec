//! Prompt composition for the BrandPulse agent.
//!
//! Everything here is deterministic string building: identical inputs always
//! produce byte-identical prompts. The model call happens elsewhere.

/// Fixed persona and formatting rules prepended to every request.
const SYSTEM_INSTRUCTIONS: &str = r#"You are BrandPulse Assistant, an expert AI agent specialized in analyzing products and their public perception.

## Response Format Requirements:
- **Keep responses concise** (maximum 500 words)
- **Use clear markdown formatting** with proper headers, bullet points, and emphasis
- **Structure responses** with specific sections: Overview, Key Strengths, Key Weaknesses, Competitive Position, Recommendations
- **Use bullet points** for easy scanning
- **Bold important metrics** and key findings
- **Avoid lengthy paragraphs** - use short, punchy statements

## Analysis Guidelines:
- Focus on **specific, actionable insights** rather than generic statements
- Provide **data-driven observations** when possible
- Highlight **competitive advantages and disadvantages**
- Offer **concrete recommendations** for improvement
- Be **honest about limitations** and data sources

## Markdown Formatting Rules:
- Use `##` for main sections
- Use `###` for subsections
- Use `**bold**` for emphasis on key points
- Use bullet points (`-`) for lists
- Use numbered lists (`1.`) for recommendations
- Keep paragraphs short (2-3 sentences max)"#;

/// Combines the user's message with the optional product and context fields.
fn compose_user_input(text: &str, product_name: Option<&str>, context: Option<&str>) -> String {
    let mut user_input = match product_name {
        Some(product) => format!("Product: {product}\nQuestion: {text}"),
        None => text.to_string(),
    };
    if let Some(context) = context {
        user_input.push_str(&format!("\nAdditional Context: {context}"));
    }
    user_input
}

/// Builds the full prompt for a chat turn.
pub fn chat_prompt(text: &str, product_name: Option<&str>, context: Option<&str>) -> String {
    let user_input = compose_user_input(text, product_name, context);
    format!("{SYSTEM_INSTRUCTIONS}\n\nUser question: {user_input}")
}

/// Builds the full prompt for the standalone product-perception analysis.
pub fn product_analysis_prompt(product_name: &str) -> String {
    let analysis_request = format!(
        r#"Please provide a comprehensive analysis of the public perception for the product: {product_name}

Include the following in your analysis:
1. Current market sentiment and public opinion
2. Key strengths and weaknesses based on customer feedback
3. Competitive positioning
4. Recent trends and developments
5. Recommendations for improvement

Please search for recent information to ensure accuracy."#
    );

    format!(
        r#"{SYSTEM_INSTRUCTIONS}

## Product Analysis Request:
Please provide a comprehensive analysis of the public perception for: **{product_name}**

Include the following sections:
1. **Overview** - Brief market sentiment summary
2. **Key Strengths** - What customers love most
3. **Key Weaknesses** - Main pain points and complaints
4. **Competitive Position** - How it compares to competitors
5. **Recommendations** - Actionable improvement suggestions

{analysis_request}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passes_through() {
        let prompt = chat_prompt("How is this perceived?", None, None);
        assert!(prompt.ends_with("User question: How is this perceived?"));
        assert!(prompt.starts_with("You are BrandPulse Assistant"));
    }

    #[test]
    fn test_product_name_prefixes_question() {
        let prompt = chat_prompt("Summarize sentiment", Some("Acme Widget"), None);
        assert!(prompt.contains("Product: Acme Widget\nQuestion: Summarize sentiment"));
    }

    #[test]
    fn test_context_is_appended_last() {
        let prompt = chat_prompt("Why?", Some("Acme Widget"), Some("launched last week"));
        assert!(prompt.ends_with("\nAdditional Context: launched last week"));
        assert!(prompt.contains("Product: Acme Widget\nQuestion: Why?"));
    }

    #[test]
    fn test_context_without_product() {
        let prompt = chat_prompt("Why?", None, Some("EU market only"));
        assert!(prompt.contains("User question: Why?\nAdditional Context: EU market only"));
    }

    #[test]
    fn test_chat_prompt_is_deterministic() {
        let a = chat_prompt("Summarize", Some("Acme"), Some("ctx"));
        let b = chat_prompt("Summarize", Some("Acme"), Some("ctx"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_analysis_prompt_embeds_product_and_sections() {
        let prompt = product_analysis_prompt("Acme Widget");
        assert!(prompt.contains("**Acme Widget**"));
        assert!(prompt.contains("the product: Acme Widget"));
        for section in [
            "**Overview**",
            "**Key Strengths**",
            "**Key Weaknesses**",
            "**Competitive Position**",
            "**Recommendations**",
        ] {
            assert!(prompt.contains(section), "missing section {section}");
        }
        assert!(prompt.contains("Please search for recent information"));
    }

    #[test]
    fn test_analysis_prompt_is_deterministic() {
        assert_eq!(
            product_analysis_prompt("Acme Widget"),
            product_analysis_prompt("Acme Widget")
        );
    }
}
