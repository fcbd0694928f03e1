mod support;

use epaper::llm::summarizer::Summarizer;
use epaper::models::{ArticleRecord, Section, SummaryMethod, SummaryOutcome};
use support::{articles, body, ScriptedLlm};

fn exact_chars(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

#[tokio::test]
async fn empty_section_is_an_error() {
    let llm = ScriptedLlm::new().reply("should not be used").shared();
    let summarizer = Summarizer::new(Some(llm.clone()));

    let outcome = summarizer.summarize("THE_HINDU", "Front Page", &[]).await;

    assert_eq!(outcome, SummaryOutcome::Error("No articles to summarize".to_string()));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn ai_tier_wins_when_available() {
    let llm = ScriptedLlm::new().reply("  • Budget passed\n• Rain alert  ").shared();
    let summarizer = Summarizer::new(Some(llm.clone()));

    let outcome = summarizer
        .summarize("THE_HINDU", "Front Page", &articles(&["Budget passed", "Rain alert"]))
        .await;

    assert_eq!(
        outcome,
        SummaryOutcome::Summary {
            text: "• Budget passed\n• Rain alert".to_string(),
            translated: None,
            method: SummaryMethod::Ai,
        }
    );
    let prompts = llm.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("THE_HINDU - Front Page"));
    assert!(prompts[0].contains("- Rain alert"));
}

#[tokio::test]
async fn bilingual_response_is_split() {
    let llm = ScriptedLlm::new()
        .reply("Chennai metro expands\n|||\nசென்னை மெட்ரோ விரிவாக்கம்")
        .shared();
    let summarizer = Summarizer::new(Some(llm)).with_bilingual_sources(["DINAMANI"]);

    let outcome = summarizer
        .summarize("DINAMANI", "Latest News", &articles(&["மெட்ரோ"]))
        .await;

    assert_eq!(
        outcome,
        SummaryOutcome::Summary {
            text: "Chennai metro expands".to_string(),
            translated: Some("சென்னை மெட்ரோ விரிவாக்கம்".to_string()),
            method: SummaryMethod::Ai,
        }
    );
}

#[tokio::test]
async fn bilingual_response_without_delimiter_keeps_whole_text() {
    let llm = ScriptedLlm::new().reply("Only one language came back").shared();
    let summarizer = Summarizer::new(Some(llm)).with_bilingual_sources(["DINAMANI"]);

    let outcome = summarizer
        .summarize("DINAMANI", "Latest News", &articles(&["செய்தி"]))
        .await;

    assert_eq!(
        outcome,
        SummaryOutcome::Summary {
            text: "Only one language came back".to_string(),
            translated: None,
            method: SummaryMethod::Ai,
        }
    );
}

#[tokio::test]
async fn quota_failure_falls_through_to_extractive() {
    let llm = ScriptedLlm::new()
        .fail("LLM API error 429 Too Many Requests: quota")
        .shared();
    let summarizer = Summarizer::new(Some(llm));

    let section: Vec<ArticleRecord> = articles(&["Budget", "Metro"])
        .into_iter()
        .zip([body("budget", 4), body("metro", 4)])
        .map(|(a, b)| a.with_body(b))
        .collect();

    let outcome = summarizer.summarize("THE_HINDU", "Business", &section).await;

    assert_eq!(outcome.method(), Some(SummaryMethod::Extractive));
    let SummaryOutcome::Summary { text, translated, .. } = outcome else {
        panic!("expected a summary");
    };
    assert!(text.contains("committee reviewed item number"));
    assert!(translated.is_none());
}

#[tokio::test]
async fn short_bodies_skip_extractive() {
    let summarizer = Summarizer::new(None);
    let long = body("water", 10);
    let section: Vec<ArticleRecord> = articles(&["Water cuts", "Reservoir low"])
        .into_iter()
        .zip([exact_chars(&long, 100), exact_chars(&long, 99)])
        .map(|(a, b)| a.with_body(b))
        .collect();

    let outcome = summarizer.summarize("THE_HINDU", "Cities", &section).await;

    assert_eq!(
        outcome,
        SummaryOutcome::Summary {
            text: "• Water cuts\n• Reservoir low".to_string(),
            translated: None,
            method: SummaryMethod::Headlines,
        }
    );
}

#[tokio::test]
async fn two_hundred_body_chars_are_enough() {
    let summarizer = Summarizer::new(None);
    let long = body("water", 10);
    let section: Vec<ArticleRecord> = articles(&["Water cuts", "Reservoir low"])
        .into_iter()
        .zip([exact_chars(&long, 100), exact_chars(&long, 100)])
        .map(|(a, b)| a.with_body(b))
        .collect();

    let outcome = summarizer.summarize("THE_HINDU", "Cities", &section).await;
    assert_eq!(outcome.method(), Some(SummaryMethod::Extractive));
}

#[tokio::test]
async fn disabled_extractive_goes_to_headlines() {
    let summarizer = Summarizer::new(None).with_extractive(false);
    let section: Vec<ArticleRecord> = articles(&["A long day"])
        .into_iter()
        .map(|a| a.with_body(body("council", 10)))
        .collect();

    let outcome = summarizer.summarize("INDIAN_EXPRESS", "India", &section).await;
    assert_eq!(outcome.method(), Some(SummaryMethod::Headlines));
}

#[tokio::test]
async fn quota_label_is_dropped_when_headlines_succeed() {
    let llm = ScriptedLlm::new().fail("LLM API error 429: slow down").shared();
    let summarizer = Summarizer::new(Some(llm));

    let outcome = summarizer
        .summarize("INDIAN_EXPRESS", "World", &articles(&["Summit opens"]))
        .await;

    let mut section = Section::new("World", articles(&["Summit opens"]));
    section.apply_outcome(outcome);
    assert_eq!(section.summary.as_deref(), Some("• Summit opens"));
    assert_eq!(section.summary_method, Some(SummaryMethod::Headlines));
    assert!(section.error.is_none());
}

#[tokio::test]
async fn auth_label_surfaces_when_nothing_else_works() {
    let llm = ScriptedLlm::new()
        .fail("LLM API error 403 Forbidden: bad key")
        .shared();
    let summarizer = Summarizer::new(Some(llm));

    let outcome = summarizer
        .summarize("INDIAN_EXPRESS", "World", &articles(&["   ", ""]))
        .await;

    assert_eq!(outcome, SummaryOutcome::Error("Invalid API Key".to_string()));
}

#[tokio::test]
async fn quota_label_surfaces_when_nothing_else_works() {
    let llm = ScriptedLlm::new().fail("LLM API error 429: quota").shared();
    let summarizer = Summarizer::new(Some(llm));

    let outcome = summarizer
        .summarize("INDIAN_EXPRESS", "World", &articles(&[" "]))
        .await;

    assert_eq!(outcome, SummaryOutcome::Error("Quota Exceeded".to_string()));
}

#[tokio::test]
async fn generic_failure_with_nothing_left() {
    let llm = ScriptedLlm::new().fail("connection reset").shared();
    let summarizer = Summarizer::new(Some(llm));

    let outcome = summarizer
        .summarize("INDIAN_EXPRESS", "World", &articles(&[""]))
        .await;

    assert_eq!(outcome, SummaryOutcome::Error("No summary generated".to_string()));
}

#[tokio::test]
async fn headlines_cap_at_ten() {
    let titles: Vec<String> = (1..=12).map(|i| format!("Story {}", i)).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();

    let outcome = Summarizer::new(None)
        .summarize("THE_HINDU", "Opinion", &articles(&refs))
        .await;

    let SummaryOutcome::Summary { text, method, .. } = outcome else {
        panic!("expected a summary");
    };
    assert_eq!(method, SummaryMethod::Headlines);
    assert_eq!(text.lines().count(), 10);
    assert_eq!(text.lines().last(), Some("• Story 10"));
}
