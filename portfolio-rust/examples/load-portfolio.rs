use dotenvy::dotenv;
use portfolio_data::{format_tenure, PortfolioContext};
use portfolio_session::{MemoryStore, SessionOptions};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let options = SessionOptions::from_env()?;
    let context = PortfolioContext::from_options(options, Arc::new(MemoryStore::new()))?;

    let outcome = context.start().await?;
    println!("session: {}", outcome.as_str());

    let snapshot = context.portfolio_data()?;
    let today = chrono::Local::now().date_naive();

    println!("{}", snapshot.general_details.name);
    for role in &snapshot.work_experience {
        println!(
            "  {} at {} ({})",
            role.job_title,
            role.employer,
            role.tenure(today)
        );
    }
    for school in &snapshot.education {
        println!(
            "  {} - {} ({})",
            school.degree,
            school.school,
            format_tenure(school.start_date, school.end_date)
        );
    }

    println!("blogs:");
    for article in &snapshot.blogs {
        println!("  {} <{}>", article.title, article.url);
    }

    Ok(())
}
