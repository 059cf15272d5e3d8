//! Plain text rendering of a session outcome

use std::fmt::{self, Write};

use sa_core::{RequestClass, StateTree};
use sa_views::{engagement_series, platform_distribution, stat_cards, PostQuery, PostsProjection};

use crate::session::Outcome;

const CONTENT_WIDTH: usize = 36;

pub fn render(outcome: &Outcome) -> Result<String, fmt::Error> {
    let mut out = String::new();
    let tree = &outcome.tree;

    write_header(&mut out, tree)?;
    write_cards(&mut out, tree)?;
    write_distribution(&mut out, tree)?;
    write_series(&mut out, tree)?;
    write_posts(&mut out, &outcome.query, &outcome.posts)?;
    write_notices(&mut out, &outcome.notices)?;
    Ok(out)
}

fn write_notices(out: &mut String, notices: &[String]) -> fmt::Result {
    if notices.is_empty() {
        return Ok(());
    }
    writeln!(out, "\nNotices")?;
    for notice in notices {
        writeln!(out, "  ! {notice}")?;
    }
    Ok(())
}

fn write_header(out: &mut String, tree: &StateTree) -> fmt::Result {
    let data = tree.data();
    writeln!(out, "Social Media Dashboard")?;
    match tree.fetched_at() {
        Some(at) => writeln!(out, "Fetched at {}", at.format("%Y-%m-%d %H:%M:%S UTC"))?,
        None => writeln!(out, "No data fetched")?,
    }
    writeln!(
        out,
        "Total followers: {}   Avg. engagement: {:.1}%   Range: {}",
        data.total_followers,
        data.total_engagement,
        tree.selected_time_range().label()
    )?;

    for class in RequestClass::ALL {
        if let Some(error) = tree.request(class).error() {
            writeln!(out, "[{class}] {error}")?;
        }
    }
    Ok(())
}

fn write_cards(out: &mut String, tree: &StateTree) -> fmt::Result {
    writeln!(out, "\nPlatforms")?;
    for card in stat_cards(tree.data()) {
        let marker = if tree.selected_platform() == Some(card.platform) { '*' } else { ' ' };
        writeln!(
            out,
            " {marker}{:<10} {:>8} followers  {:>4.1}% engagement  {} {:+.1}%",
            card.title,
            card.followers,
            card.engagement,
            card.trend.arrow(),
            card.growth
        )?;
    }
    Ok(())
}

fn write_distribution(out: &mut String, tree: &StateTree) -> fmt::Result {
    writeln!(out, "\nAudience")?;
    for slice in platform_distribution(tree.data()) {
        let bar = "#".repeat((slice.share * 40.0).round() as usize);
        writeln!(
            out,
            "  {:<10} {:>5.1}% {bar}",
            slice.platform.label(),
            slice.share * 100.0
        )?;
    }
    Ok(())
}

fn write_series(out: &mut String, tree: &StateTree) -> fmt::Result {
    writeln!(out, "\nEngagement over time")?;
    let chart = engagement_series(&tree.data().historical);
    if chart.is_empty() {
        return writeln!(out, "  (no historical data)");
    }

    write!(out, "  {:<10}", "")?;
    for label in &chart.labels {
        write!(out, " {label:>6}")?;
    }
    writeln!(out)?;
    for series in &chart.series {
        write!(out, "  {:<10}", series.platform.label())?;
        for value in &series.values {
            write!(out, " {value:>6}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_posts(out: &mut String, query: &PostQuery, posts: &PostsProjection) -> fmt::Result {
    writeln!(
        out,
        "\nRecent posts (platform: {}, search: '{}', sort: {} {:?})",
        query.platform, query.search, query.sort.key, query.sort.direction
    )?;

    match posts {
        PostsProjection::NotLoaded => writeln!(out, "  Posts have not been loaded"),
        PostsProjection::NoResults { total } => {
            writeln!(out, "  No posts match the current filters ({total} in total)")
        }
        PostsProjection::Rows(rows) => {
            for post in rows {
                writeln!(
                    out,
                    "  {} {:<10} {:<width$} {:>6} {:<6}",
                    post.date,
                    post.platform.label(),
                    truncate(&post.content, CONTENT_WIDTH),
                    post.engagement,
                    post.status.as_str(),
                    width = CONTENT_WIDTH
                )?;
            }
            Ok(())
        }
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sa_core::FilterState;
    use std::sync::Arc;

    fn outcome(posts: PostsProjection, notices: Vec<String>) -> Outcome {
        Outcome {
            tree: StateTree::new(FilterState::default()),
            query: PostQuery::default(),
            posts: Arc::new(posts),
            notices,
        }
    }

    #[test]
    fn test_empty_session() {
        let text = render(&outcome(PostsProjection::NotLoaded, Vec::new())).unwrap();
        assert!(text.contains("No data fetched"));
        assert!(text.contains("(no historical data)"));
        assert!(text.contains("Posts have not been loaded"));
        assert!(!text.contains("Notices"));
    }

    #[test]
    fn test_no_results_and_notices() {
        let text = render(&outcome(
            PostsProjection::NoResults { total: 8 },
            vec!["platform request failed: boom".to_string()],
        ))
        .unwrap();
        assert!(text.contains("No posts match the current filters (8 in total)"));
        assert!(text.contains("! platform request failed: boom"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer sentence", 8), "a longe…");
    }
}
