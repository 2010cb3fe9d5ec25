//! Single-screen dashboard layout: status, metrics, agents, logs, chat.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, Paragraph},
};

use crate::app::App;
use crate::types::Snapshot;

pub fn draw(f: &mut ratatui::Frame<'_>, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(8),
            Constraint::Min(6),
            Constraint::Length(8),
        ])
        .split(f.area());

    draw_header(f, rows[0], app);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[1]);
    draw_orchestrator(f, top[0], app.snapshot.as_ref());
    draw_metrics(f, top[1], app.snapshot.as_ref());
    draw_agents(f, top[2], app.snapshot.as_ref());

    draw_logs(f, rows[2], app);
    draw_chat(f, rows[3], app);
}

fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let title = match (&app.snapshot, app.disconnected) {
        (_, true) => "jarvys monitor — disconnected (press 'q' to quit)".to_string(),
        (Some(s), _) => format!(
            "jarvys monitor — {} | viewers: {} | 'r' refresh, 'q' quit",
            s.timestamp.format("%H:%M:%S"),
            s.connected_viewers
        ),
        (None, _) => "jarvys monitor — waiting for first snapshot (press 'q' to quit)".to_string(),
    };
    f.render_widget(Block::default().title(title).borders(Borders::BOTTOM), area);
}

fn status_color(status: &str) -> Color {
    match status {
        "running" => Color::Green,
        "stopped" | "error" => Color::Red,
        _ => Color::Yellow,
    }
}

fn draw_orchestrator(f: &mut ratatui::Frame<'_>, area: Rect, snapshot: Option<&Snapshot>) {
    let lines: Vec<Line> = match snapshot {
        Some(s) => {
            let o = &s.orchestrator;
            vec![
                Line::styled(
                    format!("state: {}", o.status),
                    Style::default().fg(status_color(&o.status)),
                ),
                Line::raw(format!(
                    "pid: {}",
                    o.pid.map(|p| p.to_string()).unwrap_or_else(|| "-".into())
                )),
                Line::raw(format!(
                    "cpu: {}",
                    o.cpu_percent
                        .map(|c| format!("{c:.1}%"))
                        .unwrap_or_else(|| "-".into())
                )),
                Line::raw(format!(
                    "mem: {}",
                    o.memory_mb
                        .map(|m| format!("{m:.1} MB"))
                        .unwrap_or_else(|| "-".into())
                )),
                Line::raw(format!("up: {}", o.uptime.as_deref().unwrap_or("-"))),
            ]
        }
        None => vec![Line::raw("waiting...")],
    };
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Orchestrator"));
    f.render_widget(p, area);
}

fn draw_metrics(f: &mut ratatui::Frame<'_>, area: Rect, snapshot: Option<&Snapshot>) {
    let block = Block::default().borders(Borders::ALL).title("Metrics (24h)");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let lines: Vec<Line> = match snapshot {
        Some(s) => vec![
            Line::raw(format!("cost: ${:.4}", s.metrics.daily_cost_usd)),
            Line::raw(format!("calls: {}", s.metrics.daily_calls)),
            Line::raw(format!("avg rt: {:.0} ms", s.metrics.avg_response_time_ms)),
            Line::raw(format!(
                "commits: {}  tasks: {}",
                s.activity.recent_commits, s.activity.recent_tasks
            )),
        ],
        None => vec![Line::raw("waiting...")],
    };
    f.render_widget(Paragraph::new(lines), parts[0]);

    let pct = snapshot
        .map(|s| (s.metrics.success_rate * 100.0).clamp(0.0, 100.0) as u16)
        .unwrap_or(0);
    let g = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(pct)
        .label(format!("success {pct}%"));
    f.render_widget(g, parts[1]);
}

fn draw_agents(f: &mut ratatui::Frame<'_>, area: Rect, snapshot: Option<&Snapshot>) {
    let items: Vec<ListItem> = match snapshot {
        Some(s) => s
            .agents
            .iter()
            .map(|a| {
                let env = a.environment.as_deref().unwrap_or("?");
                ListItem::new(Line::styled(
                    format!("{} [{}] {}", a.agent_name, a.status, env),
                    Style::default().fg(if a.status == "online" {
                        Color::Green
                    } else {
                        Color::DarkGray
                    }),
                ))
            })
            .collect(),
        None => vec![ListItem::new("waiting...")],
    };
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Agents"));
    f.render_widget(list, area);
}

fn draw_logs(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    // Show the newest lines that fit
    let visible = area.height.saturating_sub(2) as usize;
    let start = app.logs.len().saturating_sub(visible);
    let items: Vec<ListItem> = app.logs[start..]
        .iter()
        .map(|l| ListItem::new(l.as_str()))
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Logs"));
    f.render_widget(list, area);
}

fn draw_chat(f: &mut ratatui::Frame<'_>, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    let start = app.chat.len().saturating_sub(visible);
    let items: Vec<ListItem> = app
        .chat
        .iter()
        .skip(start)
        .map(|m| {
            ListItem::new(format!(
                "{} [{}] {}",
                m.timestamp.format("%H:%M:%S"),
                m.sender,
                m.message
            ))
        })
        .collect();
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Chat"));
    f.render_widget(list, area);
}
