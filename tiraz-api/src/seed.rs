//! Bilingual demo data for the `items` table
//!
//! Used by the `seed-demo` binary. Records come in Arabic/English pairs and
//! are back-dated across the past week so listings look lived-in.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::db::items::{self, Item};

/// Style reported for items stored without one
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Names listed per style in the summary before eliding the rest
const SUMMARY_NAMES_PER_STYLE: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct DemoItem {
    pub name: &'static str,
    pub description: &'static str,
    pub style: &'static str,
}

pub const DEMO_ITEMS: [DemoItem; 12] = [
    DemoItem {
        name: "ثوب رجالي كلاسيكي",
        description: "ثوب تقليدي بتصميم عصري، مناسب للمناسبات الرسمية وغير الرسمية. مصنوع من قماش قطني عالي الجودة.",
        style: "Traditional",
    },
    DemoItem {
        name: "Classic Men's Thobe",
        description: "Traditional thobe with modern design, suitable for formal and informal occasions. Made from high-quality cotton fabric.",
        style: "Traditional",
    },
    DemoItem {
        name: "قميص رسمي أبيض",
        description: "قميص أبيض كلاسيكي مع ياقة إيطالية، مثالي للعمل والمناسبات الرسمية.",
        style: "Formal",
    },
    DemoItem {
        name: "White Formal Shirt",
        description: "Classic white shirt with Italian collar, perfect for work and formal events.",
        style: "Formal",
    },
    DemoItem {
        name: "ثوب صيفي خفيف",
        description: "ثوب صيفي مريح مصنوع من قماش خفيف ومسامي، مثالي للطقس الحار.",
        style: "Casual",
    },
    DemoItem {
        name: "Summer Light Thobe",
        description: "Comfortable summer thobe made from lightweight breathable fabric, ideal for hot weather.",
        style: "Casual",
    },
    DemoItem {
        name: "قميص كاجوال منقوش",
        description: "قميص منقوش بألوان متناسقة، مريح للاستخدام اليومي والخروجات غير الرسمية.",
        style: "Casual",
    },
    DemoItem {
        name: "Casual Patterned Shirt",
        description: "Patterned shirt with harmonious colors, comfortable for daily wear and casual outings.",
        style: "Casual",
    },
    DemoItem {
        name: "ثوب عيد فاخر",
        description: "ثوب فاخر مطرز بتصميم خاص، مثالي للأعياد والمناسبات الخاصة.",
        style: "Luxury",
    },
    DemoItem {
        name: "Luxury Eid Thobe",
        description: "Luxury embroidered thobe with special design, perfect for Eid and special occasions.",
        style: "Luxury",
    },
    DemoItem {
        name: "قميص دينم كاجوال",
        description: "قميص دينم عصري بتصميم مريح، مناسب للإطلالات اليومية.",
        style: "Modern",
    },
    DemoItem {
        name: "Modern Denim Shirt",
        description: "Modern denim shirt with comfortable design, suitable for everyday looks.",
        style: "Modern",
    },
];

/// `now - (6 - i/2) days - 2i hours`, integer division
pub fn staggered_created_at(now: DateTime<Utc>, index: usize) -> DateTime<Utc> {
    let index = index as i64;
    now - Duration::days(6 - index / 2) - Duration::hours(index * 2)
}

/// Remove every demo item; returns the number removed
pub async fn clear_items(pool: &SqlitePool) -> Result<u64> {
    let removed = items::delete_all_items(pool).await?;
    tracing::info!(removed, "Cleared existing items");
    Ok(removed)
}

/// Insert the demo set and return what was written
pub async fn insert_demo_items(pool: &SqlitePool, now: DateTime<Utc>) -> Result<Vec<Item>> {
    let mut created = Vec::with_capacity(DEMO_ITEMS.len());

    for (i, demo) in DEMO_ITEMS.iter().enumerate() {
        let created_at = staggered_created_at(now, i);
        let id = items::insert_item(pool, demo.name, demo.description, demo.style, created_at)
            .await?;

        created.push(Item {
            id,
            name: demo.name.to_string(),
            description: Some(demo.description.to_string()),
            style: Some(demo.style.to_string()),
            created_at,
        });
    }

    tracing::info!(count = created.len(), "Inserted demo items");
    Ok(created)
}

/// Items grouped by style, styles in first-seen order
pub fn group_by_style(items: &[Item]) -> Vec<(String, Vec<&Item>)> {
    let mut groups: Vec<(String, Vec<&Item>)> = Vec::new();

    for item in items {
        let style = item.style.as_deref().unwrap_or(UNCATEGORIZED);
        match groups.iter_mut().find(|(name, _)| name == style) {
            Some((_, members)) => members.push(item),
            None => groups.push((style.to_string(), vec![item])),
        }
    }

    groups
}

/// Plain-text summary printed after seeding
pub fn render_summary(items: &[Item]) -> String {
    let rule = "=".repeat(60);
    let mut out = String::new();

    out.push_str(&rule);
    out.push_str("\nDEMO DATA SUMMARY / ملخص البيانات التجريبية\n");
    out.push_str(&rule);
    out.push('\n');

    for (style, members) in group_by_style(items) {
        out.push_str(&format!("\n{}: {} items\n", style, members.len()));
        for item in members.iter().take(SUMMARY_NAMES_PER_STYLE) {
            out.push_str(&format!("  - {}\n", item.name));
        }
        if members.len() > SUMMARY_NAMES_PER_STYLE {
            out.push_str(&format!(
                "  ... and {} more\n",
                members.len() - SUMMARY_NAMES_PER_STYLE
            ));
        }
    }

    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
    out
}
