use epaper::ingestion;
use std::path::PathBuf;

/// Smoke-test every configured feed and print what the brief would see.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.default.toml"));
    let config = common::Config::from_file(&config_path).await?;

    let feeds = config
        .brief
        .sources
        .iter()
        .flat_map(|s| s.feeds.iter().map(move |f| (s.key.as_str(), f.page.as_str(), f.url.as_str())))
        .chain(config.up_ahead.feeds.iter().map(|url| ("UP_AHEAD", "-", url.as_str())));

    for (source, page, url) in feeds {
        println!("\n{}", "=".repeat(60));
        println!("Testing: {} / {} ({})", source, page, url);
        println!("{}", "=".repeat(60));

        match ingestion::fetch_and_parse_feed(url, config.politeness.feed_timeout_seconds).await {
            Ok(feed) => {
                let section = ingestion::section_from_feed(&feed, page, config.brief.max_articles_per_section);
                println!("✓ Success!");
                println!("  Title: {:?}", feed.title.as_ref().map(|t| &t.content));
                println!("  Entries: {} ({} usable)", feed.entries.len(), section.articles.len());

                for (i, article) in section.articles.iter().take(3).enumerate() {
                    println!("    {}. {}", i + 1, article.title);
                    println!("       URL: {}", article.link);
                }
            }
            Err(e) => {
                println!("✗ Failed: {:#}", e);
            }
        }
    }

    Ok(())
}
