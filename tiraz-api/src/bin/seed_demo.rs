//! seed-demo - populate the `items` table with bilingual demo data
//!
//! Usage:
//!   seed-demo              # asks before clearing existing items
//!   seed-demo --clear      # clear without asking
//!   seed-demo --keep       # keep existing items, append the demo set
//!
//! Ctrl-C exits cleanly with status 0.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tiraz_api::seed;
use tiraz_common::Settings;

#[derive(Debug, Parser)]
#[command(name = "seed-demo", version, about = "Populate Tiraz with demo items")]
struct Args {
    /// Database URL; falls back to the full settings chain when unset
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Clear existing items without prompting
    #[arg(long, conflicts_with = "keep")]
    clear: bool,

    /// Keep existing items without prompting
    #[arg(long)]
    keep: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    tokio::select! {
        result = run(args) => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\n\nDemo setup cancelled / تم إلغاء الإعداد التجريبي");
            // A pending stdin read would keep the runtime alive on drop
            std::process::exit(0);
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let rule = "=".repeat(60);
    println!("{}", rule);
    println!("TIRAZ APPLICATION DEMO SETUP");
    println!("تشغيل تجريبي لتطبيق طراز");
    println!("{}", rule);

    let database_url = match args.database_url {
        Some(url) => url,
        None => Settings::from_env()?.database_url,
    };
    println!("\nDatabase: {}", database_url);

    let pool = tiraz_common::db::init_database(&database_url)
        .await
        .context("Failed to open database")?;

    let clear = if args.clear {
        true
    } else if args.keep {
        false
    } else {
        ask_clear().await?
    };

    if clear {
        println!("Clearing existing data... / تنظيف البيانات الموجودة...");
        seed::clear_items(&pool).await?;
        println!("Database cleared / تم تنظيف قاعدة البيانات");
    } else {
        println!("Keeping existing data... / الإبقاء على البيانات الموجودة...");
    }

    println!("\nCreating demo items... / إنشاء عناصر تجريبية...");
    let items = seed::insert_demo_items(&pool, chrono::Utc::now()).await?;
    println!(
        "Created {} demo items / تم إنشاء {} عنصر تجريبي",
        items.len(),
        items.len()
    );

    print!("\n{}", seed::render_summary(&items));
    println!("\nDemo setup complete! / اكتمل الإعداد التجريبي!");

    pool.close().await;
    info!("Seeding finished");
    Ok(())
}

/// "Clear existing data? (y/N)" on stdin; only `y`/`Y` means yes
async fn ask_clear() -> Result<bool> {
    print!("\nClear existing data? (y/N) / مسح البيانات الموجودة؟ (y/N): ");
    std::io::stdout().flush()?;

    let answer = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await??;

    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
