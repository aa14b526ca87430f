//! src/view/ui.rs
//! ============================================================
//! Frame renderer that draws the registration form from an
//! immutable `FormSnapshot` plus the host `UIState`.

use std::time::{Duration, Instant};

use ratatui::{
    prelude::*,
    widgets::{Block, List, ListItem, ListState, Paragraph, Tabs, Wrap},
};
use tracing::instrument;

use crate::model::form_state::RegistrationTab;
use crate::model::ui_state::{NotificationLevel, UIState};
use crate::view::snapshots::FormSnapshot;

const HELP: &str = "←/→ tab  f FOP  c country  ↑/↓ Enter region  a avatar  q quit";

#[derive(Debug, Default)]
pub struct RenderStats {
    pub frames: u64,
    pub total: Duration,
}

impl RenderStats {
    pub fn avg(&self) -> Duration {
        if self.frames == 0 {
            Duration::ZERO
        } else {
            self.total / u32::try_from(self.frames).unwrap_or(u32::MAX)
        }
    }
}

#[derive(Debug, Default)]
pub struct FormRenderer {
    stats: RenderStats,
}

impl FormRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &RenderStats {
        &self.stats
    }

    #[instrument(level = "trace", skip_all)]
    pub fn render(&mut self, f: &mut Frame<'_>, snap: &FormSnapshot, ui: &UIState) {
        let start = Instant::now();

        let [tabs, body, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .areas(f.area());

        let [left, right] =
            Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body);

        self.draw_tabs(f, snap, tabs);
        self.draw_location(f, snap, ui, left);
        self.draw_details(f, snap, right);
        self.draw_status(f, ui, status);

        self.stats.total += start.elapsed();
        self.stats.frames += 1;
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, snap: &FormSnapshot, area: Rect) {
        let selected = RegistrationTab::ALL
            .iter()
            .position(|tab| snap.tab_active(*tab))
            .unwrap_or(0);

        let user_type = snap.user_type.map_or("-", |t| t.as_str());
        let tabs = Tabs::new(vec!["Legal entity", "Individual"])
            .select(selected)
            .style(Style::new().fg(Color::Gray))
            .highlight_style(Style::new().fg(Color::Green).add_modifier(Modifier::BOLD))
            .block(Block::bordered().title(format!(" Registration · type: {user_type} ")));

        f.render_widget(tabs, area);
    }

    fn draw_location(&self, f: &mut Frame<'_>, snap: &FormSnapshot, ui: &UIState, area: Rect) {
        let fop_height = if snap.fop_block_visible { 3 } else { 0 };
        let [fop, country, region] = Layout::vertical([
            Constraint::Length(fop_height),
            Constraint::Length(3),
            Constraint::Min(3),
        ])
        .areas(area);

        if snap.fop_block_visible {
            let mark = if snap.fop_checked { "[x]" } else { "[ ]" };
            f.render_widget(
                Paragraph::new(format!("{mark} I am a FOP (individual entrepreneur)"))
                    .block(Block::bordered().title(" FOP ")),
                fop,
            );
        }

        let country_text = snap.country.as_deref().unwrap_or("(none)");
        f.render_widget(
            Paragraph::new(country_text).block(Block::bordered().title(" Country ")),
            country,
        );

        let item_style = if snap.region_enabled {
            Style::new()
        } else {
            Style::new().fg(Color::DarkGray)
        };
        let items: Vec<ListItem<'_>> = snap
            .region_options
            .iter()
            .map(|opt| {
                let chosen = !opt.is_placeholder()
                    && snap.region_value.as_deref() == Some(opt.value.as_str());
                let prefix = if chosen { "● " } else { "  " };
                ListItem::new(format!("{prefix}{}", opt.label)).style(item_style)
            })
            .collect();

        let title = if snap.region_enabled {
            " Region "
        } else {
            " Region (disabled) "
        };
        let list = List::new(items)
            .block(Block::bordered().title(title))
            .highlight_style(Style::new().add_modifier(Modifier::REVERSED));

        let mut state = ListState::default();
        if snap.region_enabled {
            state.select(Some(ui.region_cursor));
        }
        f.render_stateful_widget(list, region, &mut state);
    }

    fn draw_details(&self, f: &mut Frame<'_>, snap: &FormSnapshot, area: Rect) {
        let [requisites, avatar] =
            Layout::vertical([Constraint::Min(4), Constraint::Length(4)]).areas(area);

        let required = |on: bool| if on { " *" } else { "" };
        let text = if snap.requisites_visible {
            vec![
                Line::from(format!("Company name{}", required(snap.company_required))),
                Line::from(format!("OKPO{}", required(snap.okpo_required))),
            ]
        } else {
            vec![Line::from(Span::styled(
                "not needed for this registration type",
                Style::new().fg(Color::DarkGray),
            ))]
        };
        f.render_widget(
            Paragraph::new(text).block(Block::bordered().title(" Requisites ")),
            requisites,
        );

        let avatar_text = match (&snap.avatar_src, snap.avatar_placeholder_visible) {
            (Some(src), _) => format!("preview loaded ({} bytes encoded)", src.len()),
            (None, true) => "[ placeholder ]".to_string(),
            (None, false) => String::new(),
        };
        f.render_widget(
            Paragraph::new(avatar_text)
                .wrap(Wrap { trim: true })
                .block(Block::bordered().title(" Avatar ")),
            avatar,
        );
    }

    fn draw_status(&self, f: &mut Frame<'_>, ui: &UIState, area: Rect) {
        let (title, line) = if let Some(prompt) = &ui.prompt {
            (prompt.kind.title(), Line::from(format!("{}_", prompt.buffer)))
        } else if let Some(note) = &ui.notification {
            let color = match note.level {
                NotificationLevel::Info => Color::Cyan,
                NotificationLevel::Error => Color::Red,
            };
            (
                "Status",
                Line::from(Span::styled(note.message.to_string(), Style::new().fg(color))),
            )
        } else {
            ("Keys", Line::from(HELP))
        };

        f.render_widget(
            Paragraph::new(line).block(Block::bordered().title(format!(" {title} "))),
            area,
        );
    }
}
