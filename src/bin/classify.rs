use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use market_mirror::classifier::{self, questionnaire, Answers, QUESTIONS};
use market_mirror::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    // Answers in question order: item, feeling, recency, need, trigger
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("Usage: classify <item> <feeling> <when> <need 1-10> <trigger>");
        println!();
        for q in QUESTIONS {
            if q.options.is_empty() {
                println!("  Q{}: {}", q.id, q.prompt);
            } else {
                println!("  Q{}: {} [{}]", q.id, q.prompt, q.options.join(" | "));
            }
        }
        return Ok(());
    }

    let answers = Answers::from_positional(&args);
    let classifier = classifier::from_config(&cfg);
    let result = classifier.classify(&answers).await;

    let item = answers
        .get(questionnaire::ITEM_QUESTION)
        .unwrap_or("this purchase");
    println!("Item:       {}", item);
    println!("Decision:   {}", result.decision);
    println!("Score:      {:.1}", result.score);
    println!("Source:     {:?}", result.source);
    if let Some(reasoning) = &result.reasoning {
        println!("Reasoning:  {}", reasoning);
    }

    Ok(())
}
