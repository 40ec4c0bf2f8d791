mod mirror;

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use market_mirror::config::Config;
use market_mirror::trading::sample_trading_day;

use crate::mirror::{MirrorSession, SessionReport};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let user_id = args
        .get(1)
        .cloned()
        .unwrap_or_else(|| "demo@marketmirror.app".to_string());
    let notes = args.get(2).cloned();

    let session = MirrorSession::new(&cfg, &user_id);
    let report = session.run(&sample_trading_day(), notes).await?;
    print_report(&report);

    Ok(())
}

fn print_report(report: &SessionReport) {
    let r = &report.replay;
    let a = &report.analysis;

    println!("Market Mirror");
    println!("The market didn't beat you. You beat yourself.");
    println!();
    println!("Emotional You:  {} trades | P&L ${:+.2}", r.emotional.trades, r.emotional.pnl);
    println!("Rational You:   {} trades | P&L ${:+.2}", r.rational.trades, r.rational.pnl);
    if let Some(verdict) = r.verdict() {
        println!("{}", verdict);
    }
    println!();
    println!("Emotional score:  {:.1}", a.emotional_score);
    println!("Rational score:   {:.1}", a.rational_score);
    println!("Dominant bias:    {}", a.dominant_bias);
    println!("Market:           {}", a.market_condition);
    println!("Duration:         {} min", a.duration_minutes);
    println!("Snapshot saved:   {}", if report.saved { "yes" } else { "no" });
    println!();
    println!("Tip: {}", r.coaching_tip());
    if let Some(badge) = r.badge() {
        println!("Badge earned: {}", badge);
    }
    println!();
    println!("Evolution:");
    for p in &report.evolution {
        let improvement = p
            .discipline_improvement
            .map(|d| format!("{:+.1}", d))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{} {} | delta {:+.1} | change {} | {}",
            p.session_number, p.timestamp, p.discipline_delta, improvement, p.dominant_bias
        );
    }

    let profile = &report.insights.trader_profile;
    println!();
    println!(
        "Profile: {:?} over {} sessions (avg delta {:+.1}, trend {:?})",
        profile.dominant_profile,
        profile.total_sessions,
        profile.avg_discipline_delta,
        profile.improvement_trend
    );
    println!(
        "Emotional trades: {:.0}% of all recorded trades",
        report.insights.recent_behavior.emotional_trade_ratio * 100.0
    );
}
