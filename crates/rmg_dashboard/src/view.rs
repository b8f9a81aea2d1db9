//! Terminal rendering of the dashboard.
//!
//! ```text
//! ┌ RMG News Dashboard ─────────────────────────────────────────┐
//! │ 47 articles · updated 10:42:07                              │
//! ├ Sources ────────────────────────────────────────────────────┤
//! │ All │ BGMEA │ Textile Today                                 │
//! ├ Search [/] ─────────────────────────────────────────────────┤
//! ├ Articles ───────────────────────────────────────────────────┤
//! │ title / source · author · date / AI summary / impact        │
//! ├─────────────────────────────────────────────────────────────┤
//! │ « Prev  1 2 [3] 4 5  Next »   Page 3 of 5    keys           │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use rmg_core::{Article, MarketImpact};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::state::{DashboardState, Phase, SourceFilter};

const KEYS: &str = "[f]etch [/]search [\u{2190}\u{2192}]source [n/p]page [\u{2191}\u{2193}]select [r]etry [q]uit";

/// UI-local state that is not part of the dashboard itself.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Search text being typed, if the search box has focus
    pub editing: Option<String>,
    pub selected: usize,
}

pub fn render<B: Backend>(frame: &mut Frame<B>, state: &DashboardState, view: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(frame.size());

    render_header(frame, chunks[0], state);
    render_tabs(frame, chunks[1], state);
    render_search(frame, chunks[2], state, view);
    render_articles(frame, chunks[3], state, view);
    render_footer(frame, chunks[4], state);
}

fn render_header<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let status = if let Some(err) = &state.error {
        let hint = if state.phase == Phase::Unavailable {
            "  [r] Try again"
        } else {
            ""
        };
        Span::styled(format!("\u{26a0} {}{}", err, hint), Style::default().fg(Color::Red))
    } else {
        Span::styled(status_line(state), Style::default().fg(Color::DarkGray))
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            " RMG News Dashboard ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    frame.render_widget(Paragraph::new(Spans::from(status)).block(block), area);
}

/// One-line status shown when there is no error banner.
pub fn status_line(state: &DashboardState) -> String {
    match state.phase {
        Phase::Checking => "Checking backend...".to_string(),
        Phase::Unavailable => "Backend unavailable".to_string(),
        Phase::Ready if state.loading => "Loading...".to_string(),
        Phase::Ready => {
            let mut parts = Vec::new();
            if let Some(notice) = &state.notice {
                parts.push(notice.clone());
            }
            if state.last_updated.is_some() || state.total > 0 {
                parts.push(format!("{} articles", state.total));
            } else {
                parts.push("Press [f] to fetch the latest news".to_string());
            }
            if state.analyzing {
                parts.push("AI analysis running...".to_string());
            }
            if let Some(updated) = state.last_updated {
                parts.push(format!("updated {}", updated.format("%H:%M:%S")));
            }
            parts.join(" \u{b7} ")
        }
    }
}

fn render_tabs<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let titles = state
        .source_tabs()
        .iter()
        .map(|tab| {
            let label = match tab {
                SourceFilter::All => "All".to_string(),
                SourceFilter::Source(id) => state.source_name(id).to_string(),
            };
            Spans::from(label)
        })
        .collect();

    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title(" Sources "))
        .select(state.selected_tab())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn render_search<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState, view: &ViewState) {
    let (text, style) = match &view.editing {
        Some(input) => (format!("{}_", input), Style::default().fg(Color::Yellow)),
        None if state.query.is_empty() => (
            "Search RMG news...".to_string(),
            Style::default().fg(Color::DarkGray),
        ),
        None => (state.query.clone(), Style::default()),
    };
    let block = Block::default().borders(Borders::ALL).title(" Search [/] ");
    frame.render_widget(Paragraph::new(Span::styled(text, style)).block(block), area);
}

fn render_articles<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState, view: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title(" Articles ");

    if state.articles.is_empty() {
        let message = if state.phase != Phase::Ready || state.loading {
            ""
        } else if state.last_updated.is_some() {
            "No articles found."
        } else {
            "No articles loaded yet. Press [f] to fetch news."
        };
        let empty = Paragraph::new(message)
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .articles
        .iter()
        .map(|article| article_item(article, state))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut list_state = ListState::default();
    list_state.select(Some(view.selected.min(state.articles.len() - 1)));
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn article_item<'a>(article: &'a Article, state: &'a DashboardState) -> ListItem<'a> {
    let mut lines = vec![
        Spans::from(Span::styled(
            article.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Spans::from(Span::styled(
            article_meta(article, state),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let summary = match &article.ai_summary {
        Some(summary) => Span::styled(format!("AI: {}", summary), Style::default().fg(Color::Green)),
        None if state.analyzing && !article.is_processed => Span::styled(
            "AI: analyzing...",
            Style::default().fg(Color::DarkGray),
        ),
        None => Span::styled("AI: summary unavailable", Style::default().fg(Color::DarkGray)),
    };
    lines.push(Spans::from(summary));

    let mut impact = Vec::new();
    if let Some(level) = article.market_impact {
        impact.push(Span::raw("Impact: "));
        impact.push(Span::styled(level.to_string(), impact_style(level)));
    }
    if let Some(confidence) = article.confidence_score {
        if !impact.is_empty() {
            impact.push(Span::raw("  "));
        }
        impact.push(Span::raw(format!("Confidence: {}", format_confidence(confidence))));
    }
    if !impact.is_empty() {
        lines.push(Spans::from(impact));
    }
    lines.push(Spans::from(""));

    ListItem::new(lines)
}

/// "Source · author · date"
pub fn article_meta(article: &Article, state: &DashboardState) -> String {
    let mut parts = vec![state.source_name(&article.source).to_string()];
    if let Some(author) = article.author.as_deref().filter(|a| !a.trim().is_empty()) {
        parts.push(author.to_string());
    }
    parts.push(article.published_at.format("%Y-%m-%d").to_string());
    parts.join(" \u{b7} ")
}

pub fn format_confidence(score: f64) -> String {
    format!("{:.0}%", score.clamp(0.0, 1.0) * 100.0)
}

fn impact_style(level: MarketImpact) -> Style {
    let color = match level {
        MarketImpact::High => Color::Red,
        MarketImpact::Medium => Color::Yellow,
        MarketImpact::Low => Color::Green,
        MarketImpact::Unknown => Color::DarkGray,
    };
    Style::default().fg(color)
}

/// "« Prev  1 2 [3] 4 5  Next »   Page 3 of 5"
pub fn pagination_line(state: &DashboardState) -> String {
    if state.total_pages == 0 {
        return String::new();
    }
    let window = state
        .page_window()
        .into_iter()
        .map(|page| {
            if page == state.current_page {
                format!("[{}]", page)
            } else {
                page.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    let prev = if state.has_prev() { "\u{ab} Prev" } else { "      " };
    let next = if state.has_next() { "Next \u{bb}" } else { "      " };
    format!(
        "{}  {}  {}   Page {} of {}",
        prev, window, next, state.current_page, state.total_pages
    )
}

fn render_footer<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &DashboardState) {
    let line = Spans::from(vec![
        Span::styled(pagination_line(state), Style::default().fg(Color::Cyan)),
        Span::raw("   "),
        Span::styled(KEYS, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(
        Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
        area,
    );
}
