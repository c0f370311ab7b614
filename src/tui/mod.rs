//! Interactive chat surface.
//!
//! One render loop owns all mutable state (the conversation and the sending
//! flag). The completion request is the only suspension point: it runs on a
//! spawned task holding an owned history snapshot, and its outcome comes
//! back over an mpsc channel as exactly one assistant reply.

mod theme;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use tokio::sync::mpsc;

use crate::application::SendMessageUseCase;
use crate::domain::{Conversation, Message};

use self::theme::Theme;

const INPUT_PLACEHOLDER: &str = "Digite sua mensagem ou dúvida...";
const FOOTER: &str = "Inspirado nos ensinamentos de Allan Kardec";

struct ChatApp {
    conversation: Conversation,
    use_case: Arc<SendMessageUseCase>,

    input: String,
    scroll_offset: usize,
    total_content_lines: usize,

    /// True while a completion request is outstanding. Submission is a
    /// no-op until the reply (or its fallback) arrives and clears it.
    sending: bool,
    should_quit: bool,

    model_label: String,
    theme: Theme,
}

impl ChatApp {
    fn new(use_case: Arc<SendMessageUseCase>, model_label: String) -> Self {
        Self {
            conversation: Conversation::new(),
            use_case,
            input: String::new(),
            scroll_offset: usize::MAX,
            total_content_lines: 0,
            sending: false,
            should_quit: false,
            model_label,
            theme: Theme::default(),
        }
    }

    fn handle_key(&mut self, key: KeyEvent, reply_tx: &mpsc::UnboundedSender<String>) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => self.submit(reply_tx),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            KeyCode::Char(c) => self.input.push(c),
            _ => {}
        }
    }

    /// Submit the current input. No-op while a request is outstanding (the
    /// draft is kept) and on blank input (the draft is discarded).
    fn submit(&mut self, reply_tx: &mpsc::UnboundedSender<String>) {
        if self.sending {
            return;
        }

        let input = std::mem::take(&mut self.input);
        if self.conversation.append_user(&input).is_none() {
            return;
        }
        self.sending = true;
        self.scroll_to_bottom();

        let history = self.conversation.snapshot();
        let use_case = self.use_case.clone();
        let tx = reply_tx.clone();
        tokio::spawn(async move {
            let (_, reply) = use_case.request_reply(&history).await;
            // The receiver only drops when the loop is shutting down.
            let _ = tx.send(reply);
        });
    }

    fn deliver_reply(&mut self, reply: String) {
        self.conversation.append_assistant(reply);
        self.sending = false;
        self.scroll_to_bottom();
    }

    fn scroll_to_bottom(&mut self) {
        // Resolved against the viewport on next draw.
        self.scroll_offset = usize::MAX;
    }

    fn scroll_up(&mut self, lines: usize) {
        if self.scroll_offset == usize::MAX {
            self.scroll_offset = self.total_content_lines;
        }
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }
}

/// Run the interactive chat until the user quits.
pub async fn run(use_case: Arc<SendMessageUseCase>, model_label: String) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, use_case, model_label).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    use_case: Arc<SendMessageUseCase>,
    model_label: String,
) -> Result<()> {
    let mut app = ChatApp::new(use_case, model_label);
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<String>();
    let mut events = EventStream::new();

    loop {
        terminal.draw(|f| draw_ui(f, &mut app))?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => app.handle_key(key, &reply_tx),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            Some(reply) = reply_rx.recv() => app.deliver_reply(reply),
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn draw_ui(f: &mut ratatui::Frame, app: &mut ChatApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // conversation
            Constraint::Length(3), // input
            Constraint::Length(1), // status
        ])
        .split(f.area());

    draw_conversation(f, chunks[0], app);
    draw_input(f, chunks[1], app);
    draw_status_bar(f, chunks[2], app);
}

fn draw_conversation(f: &mut ratatui::Frame, area: Rect, app: &mut ChatApp) {
    let theme = &app.theme;
    let lines = build_chat_lines(app.conversation.messages(), app.sending, theme);
    let total_lines = lines.len();
    app.total_content_lines = total_lines;

    let visible_height = area.height.saturating_sub(2) as usize;
    let max_scroll = total_lines.saturating_sub(visible_height);
    if app.scroll_offset > max_scroll {
        app.scroll_offset = max_scroll;
    }

    let chat = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Kardec Chat ")
                .border_style(Style::default().fg(theme.border)),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.scroll_offset as u16, 0));
    f.render_widget(chat, area);
}

fn build_chat_lines<'a>(messages: &'a [Message], sending: bool, theme: &Theme) -> Vec<Line<'a>> {
    let mut lines: Vec<Line> = Vec::new();

    for message in messages {
        let (label, color) = if message.is_user() {
            ("Você", theme.user_color)
        } else {
            ("Assistente", theme.assistant_color)
        };

        lines.push(Line::from(vec![
            Span::styled(
                label,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", message.time_of_day()),
                Style::default().fg(theme.muted),
            ),
        ]));
        for text_line in message.text().lines() {
            lines.push(Line::from(Span::styled(
                text_line,
                Style::default().fg(theme.fg),
            )));
        }
        lines.push(Line::raw(""));
    }

    if sending {
        lines.push(Line::from(Span::styled(
            "Assistente está digitando...",
            Style::default()
                .fg(theme.muted)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn draw_input(f: &mut ratatui::Frame, area: Rect, app: &ChatApp) {
    let theme = &app.theme;
    let border_color = if app.sending { theme.muted } else { theme.accent };

    let content = if app.input.is_empty() {
        Line::from(Span::styled(
            INPUT_PLACEHOLDER,
            Style::default().fg(theme.muted),
        ))
    } else {
        Line::from(Span::styled(
            app.input.as_str(),
            Style::default().fg(theme.fg),
        ))
    };

    let input = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Mensagem ")
            .border_style(Style::default().fg(border_color)),
    );
    f.render_widget(input, area);

    if !app.sending {
        let cursor_x = area.x + 1 + app.input.chars().count() as u16;
        f.set_cursor_position((cursor_x.min(area.x + area.width.saturating_sub(2)), area.y + 1));
    }
}

fn draw_status_bar(f: &mut ratatui::Frame, area: Rect, app: &ChatApp) {
    let theme = &app.theme;
    let state = if app.sending {
        "Enviando..."
    } else {
        "Enter enviar · ↑/↓ rolar · Esc sair"
    };

    let status = Line::from(vec![
        Span::styled(
            format!(" {} ", app.model_label),
            Style::default().fg(theme.accent),
        ),
        Span::styled(format!("· {FOOTER} · "), Style::default().fg(theme.muted)),
        Span::styled(state, Style::default().fg(theme.fg)),
    ]);
    f.render_widget(Paragraph::new(status), area);
}
