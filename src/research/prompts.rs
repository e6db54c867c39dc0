//! Fixed prompt text sent to the backends

/// Ask the fast backend for a JSON array of subtopics
pub fn decompose_prompt(topic: &str, count: usize) -> String {
    format!(
        "Break the following research topic into exactly {count} focused subtopics. \
         Return ONLY a JSON array of strings, no other text.\n\nTopic: {topic}"
    )
}

/// Research one subtopic; identical for the fast and slow backends
pub fn research_prompt(subtopic: &str) -> String {
    format!(
        "Research the following subtopic thoroughly. Use any available tools (web search, etc). \
         Be concise but informative, with source attribution where possible.\n\nSubtopic: {subtopic}"
    )
}

/// Merge attributed findings into the final report
pub fn synthesis_prompt(topic: &str, findings: &str) -> String {
    format!(
        "You are a research synthesis expert. Combine the following parallel research findings \
         into a single, well-structured markdown report. Cross-reference where the agents agree, \
         note where they differ, and produce a coherent narrative.

# Research Topic: {topic}

{findings}

Write the final report with:
1. Executive summary (2-3 paragraphs)
2. Sections for each subtopic with synthesized findings
3. Source attribution where available
4. Brief coverage notes at the end"
    )
}

/// Reframe a question about code repositories, optionally naming the repos to focus on
pub fn repo_query(query: &str, repos: &[String]) -> String {
    let focus = if repos.is_empty() {
        String::new()
    } else {
        format!("\n\nFocus on these repositories: {}", repos.join(", "))
    };

    format!(
        "Research the following about code repositories: {query}{focus}\n\n\
         Prioritize repo-aware tools like DeepWiki, Nia, and GitHub MCP tools."
    )
}
