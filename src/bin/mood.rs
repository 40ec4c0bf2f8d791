use anyhow::{Context, Result};

use market_mirror::mood::{analyze_mood, random_check_in, scores_for_choices, MOOD_QUESTIONS};

fn main() -> Result<()> {
    // Option index per question (0-4); random picks when none are given
    let args: Vec<String> = std::env::args().skip(1).collect();
    let choices: Vec<usize> = if args.is_empty() {
        random_check_in(&mut rand::rng())
    } else {
        args.iter()
            .map(|a| a.parse::<usize>().with_context(|| format!("invalid choice: {}", a)))
            .collect::<Result<_>>()?
    };

    for (q, &c) in MOOD_QUESTIONS.iter().zip(&choices) {
        let answer = q.options.get(c).map(|o| o.text).unwrap_or("(skipped)");
        println!("{} {}", q.question, answer);
    }

    let result = analyze_mood(&scores_for_choices(&choices));
    println!();
    println!("Mood:    {} ({:+.2})", result.mood, result.average);
    println!("{}", result.advice);
    if result.mood.should_delay_purchases() {
        println!("Consider waiting before any non-essential purchase.");
    }

    Ok(())
}
