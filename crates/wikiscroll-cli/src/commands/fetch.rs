use anyhow::Result;

use wikiscroll_core::{AppConfig, FeedController, FetchOutcome, HeadlessFactory, Source, WikipediaClient};

/// Page through `source` with the same controller the terminal feed uses
pub async fn run(config: &AppConfig, source: Source, pages: u32) -> Result<()> {
    let mut config = config.clone();
    config.general.initial_source = source;

    let client = WikipediaClient::new(&config)?;
    let mut feed = FeedController::from_config(&config, HeadlessFactory);

    for page_no in 1..=pages {
        let before = feed.store().len();

        match feed.load_next_page(&client).await {
            Some(FetchOutcome::Appended { count }) => {
                println!("Page {} ({} items, {}):\n", page_no, count, source.label());
                for item in &feed.store().all()[before..] {
                    println!("  {:>10}  {}", item.page_id().0, item.title());
                }
                match feed.cursor(source).token() {
                    Some(token) => println!("\n  continue: {}\n", token),
                    None => println!("\n  continue: (none)\n"),
                }
            }
            Some(FetchOutcome::Failed(e)) => return Err(e.into()),
            Some(FetchOutcome::Stale) => {}
            None => {
                println!("{} has no more pages.", source.label());
                break;
            }
        }
    }

    Ok(())
}
