use anyhow::Result;
use churn_advisor::encoder::{FieldSpec, FIELDS};
use churn_advisor::profile::{
    Categorical, CustomerProfile, YesNo, MONTHLY_CHARGES, TENURE, TOTAL_CHARGES,
};
use churn_advisor::display::GAUGE_REFERENCE;
use churn_advisor::{Assessment, BannerColor, Predictor, RiskLevel};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, List, ListItem, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};
use std::io;

/// Shift+←/→ moves numerics this many steps at once
const FAST_STEPS: f64 = 10.0;

#[derive(Debug, Clone)]
pub enum Outcome {
    Assessed(Box<Assessment>),
    /// Non-fatal: the form stays usable
    Failed(String),
}

pub struct App {
    pub profile: CustomerProfile,
    pub state: TableState,
    pub outcome: Option<Outcome>,
    predictor: Predictor,
}

fn cycle<T: Categorical>(value: T, delta: i32) -> T {
    let n = T::LABELS.len() as i32;
    let code = (value.code() as i32 + delta).rem_euclid(n);
    T::from_code(code as u8).unwrap_or(value)
}

impl App {
    pub fn new(predictor: Predictor) -> Self {
        let mut state = TableState::default();
        state.select(Some(0));

        Self {
            profile: CustomerProfile::default(),
            state,
            outcome: None,
            predictor,
        }
    }

    pub fn selected(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    pub fn selected_field(&self) -> &'static FieldSpec {
        &FIELDS[self.selected()]
    }

    /// Help text for the highlighted field
    pub fn selected_description(&self) -> &'static str {
        self.selected_field().description()
    }

    pub fn next(&mut self) {
        let i = (self.selected() + 1) % FIELDS.len();
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let i = (self.selected() + FIELDS.len() - 1) % FIELDS.len();
        self.state.select(Some(i));
    }

    fn yes_no(&mut self, name: &str) -> Option<&mut YesNo> {
        let p = &mut self.profile;
        match name {
            "SeniorCitizen" => Some(&mut p.senior_citizen),
            "Partner" => Some(&mut p.partner),
            "Dependents" => Some(&mut p.dependents),
            "PhoneService" => Some(&mut p.phone_service),
            "MultipleLines" => Some(&mut p.multiple_lines),
            "OnlineSecurity" => Some(&mut p.online_security),
            "OnlineBackup" => Some(&mut p.online_backup),
            "DeviceProtection" => Some(&mut p.device_protection),
            "TechSupport" => Some(&mut p.tech_support),
            "StreamingTV" => Some(&mut p.streaming_tv),
            "StreamingMovies" => Some(&mut p.streaming_movies),
            "PaperlessBilling" => Some(&mut p.paperless_billing),
            _ => None,
        }
    }

    /// Move the selected field's value; categoricals wrap, numerics clamp
    pub fn adjust(&mut self, delta: i32, fast: bool) {
        let name = self.selected_field().name();
        if let Some(flag) = self.yes_no(name) {
            *flag = cycle(*flag, delta);
            return;
        }

        let steps = (if fast { FAST_STEPS } else { 1.0 }) * delta as f64;
        let p = &mut self.profile;
        match name {
            "gender" => p.gender = cycle(p.gender, delta),
            "InternetService" => p.internet_service = cycle(p.internet_service, delta),
            "Contract" => p.contract = cycle(p.contract, delta),
            "PaymentMethod" => p.payment_method = cycle(p.payment_method, delta),
            "tenure" => p.tenure = TENURE.clamp(p.tenure as f64 + steps * TENURE.step) as u32,
            "MonthlyCharges" => {
                p.monthly_charges = MONTHLY_CHARGES.clamp(p.monthly_charges + steps * MONTHLY_CHARGES.step)
            }
            "TotalCharges" => {
                p.total_charges = TOTAL_CHARGES.clamp(p.total_charges + steps * TOTAL_CHARGES.step)
            }
            _ => {}
        }
    }

    pub fn value_label(&self, name: &str) -> String {
        let p = &self.profile;
        match name {
            "gender" => p.gender.label().to_string(),
            "SeniorCitizen" => p.senior_citizen.label().to_string(),
            "Partner" => p.partner.label().to_string(),
            "Dependents" => p.dependents.label().to_string(),
            "tenure" => format!("{} months", p.tenure),
            "PhoneService" => p.phone_service.label().to_string(),
            "MultipleLines" => p.multiple_lines.label().to_string(),
            "InternetService" => p.internet_service.label().to_string(),
            "OnlineSecurity" => p.online_security.label().to_string(),
            "OnlineBackup" => p.online_backup.label().to_string(),
            "DeviceProtection" => p.device_protection.label().to_string(),
            "TechSupport" => p.tech_support.label().to_string(),
            "StreamingTV" => p.streaming_tv.label().to_string(),
            "StreamingMovies" => p.streaming_movies.label().to_string(),
            "Contract" => p.contract.label().to_string(),
            "PaperlessBilling" => p.paperless_billing.label().to_string(),
            "PaymentMethod" => p.payment_method.label().to_string(),
            "MonthlyCharges" => format!("${:.2}", p.monthly_charges),
            "TotalCharges" => format!("${:.2}", p.total_charges),
            _ => String::new(),
        }
    }

    pub fn predict(&mut self) {
        self.outcome = Some(match self.predictor.assess_profile(&self.profile) {
            Ok(assessment) => Outcome::Assessed(Box::new(assessment)),
            Err(e) => Outcome::Failed(e.to_string()),
        });
    }

    pub fn reset(&mut self) {
        self.profile = CustomerProfile::default();
        self.outcome = None;
        self.state.select(Some(0));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let fast = key.modifiers.contains(KeyModifiers::SHIFT);
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Enter => app.predict(),
                KeyCode::Char('r') => app.reset(),
                KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.next(),
                KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => app.previous(),
                KeyCode::Right | KeyCode::Char('l') => app.adjust(1, fast),
                KeyCode::Left | KeyCode::Char('h') => app.adjust(-1, fast),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form + result
            Constraint::Length(4), // Field help + status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_form(f, content[0], app);
    render_result(f, content[1], app);
    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let spans = vec![
        Span::styled(
            "Customer Churn Advisor",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  |  "),
        Span::styled(
            format!("Model: {}", app.predictor.model_kind()),
            Style::default().fg(Color::White),
        ),
        Span::raw("  "),
        Span::styled(
            format!("({})", app.predictor.fingerprint().chars().take(12).collect::<String>()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_form(f: &mut Frame, area: Rect, app: &mut App) {
    let header_cells = ["Field", "Value"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).height(1).bottom_margin(1);

    let rows: Vec<Row> = FIELDS
        .iter()
        .map(|def| {
            let value_style = match def {
                FieldSpec::Categorical { .. } => Style::default().fg(Color::Green),
                FieldSpec::Numeric { .. } => Style::default().fg(Color::Cyan),
            };
            Row::new(vec![
                Cell::from(def.name()),
                Cell::from(format!("◀ {} ▶", app.value_label(def.name()))).style(value_style),
            ])
        })
        .collect();

    let table = Table::new(rows, [Constraint::Length(18), Constraint::Min(20)])
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(" Customer Profile "))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_result(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Banner
            Constraint::Length(3), // Gauge
            Constraint::Min(0),    // Recommendations
        ])
        .split(area);

    match &app.outcome {
        None => {
            let hint = Paragraph::new("Fill in the profile and press Enter to predict.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(" Prediction "));
            f.render_widget(hint, area);
        }
        Some(Outcome::Failed(message)) => {
            let error = Paragraph::new(format!("Prediction failed: {}\n\nAdjust the form and press Enter to retry.", message))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(Block::default().borders(Borders::ALL).title(" Prediction "));
            f.render_widget(error, area);
        }
        Some(Outcome::Assessed(assessment)) => {
            let color = match assessment.banner.color {
                BannerColor::Red => Color::Red,
                BannerColor::Green => Color::Green,
            };

            let banner = Paragraph::new(vec![
                Line::from(assessment.banner.title.as_str()),
                Line::from(assessment.banner.detail.as_str()),
            ])
                .style(Style::default().fg(color).add_modifier(Modifier::BOLD))
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(color)));
            f.render_widget(banner, chunks[0]);

            let gauge = Gauge::default()
                .block(Block::default().borders(Borders::ALL).title(format!(
                    " Churn Probability ({} risk) ",
                    assessment.risk_level.name()
                )))
                .gauge_style(Style::default().fg(band_color(assessment.risk_level)).bg(Color::Black))
                .ratio(assessment.gauge_value / 100.0)
                .label(format!(
                    "{} ({:+.2} vs {})",
                    assessment.probability_display, assessment.gauge_delta, GAUGE_REFERENCE
                ));
            f.render_widget(gauge, chunks[1]);

            let items: Vec<ListItem> = assessment
                .recommendations
                .iter()
                .enumerate()
                .map(|(i, r)| ListItem::new(format!("{}. {}", i + 1, r)))
                .collect();
            let list = List::new(items)
                .block(Block::default().borders(Borders::ALL).title(" Recommendations "));
            f.render_widget(list, chunks[2]);
        }
    }
}

fn band_color(level: RiskLevel) -> Color {
    match level {
        RiskLevel::Low => Color::LightGreen,
        RiskLevel::Medium => Color::LightYellow,
        RiskLevel::High => Color::LightRed,
    }
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let key = Style::default().fg(Color::Yellow);
    let status_spans = vec![
        Span::styled(" ↑/↓", key),
        Span::raw(" Field | "),
        Span::styled("←/→", key),
        Span::raw(" Change | "),
        Span::styled("Shift", key),
        Span::raw(" Fast | "),
        Span::styled("Enter", key),
        Span::raw(" Predict | "),
        Span::styled("r", key),
        Span::raw(" Reset | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let help = Line::from(vec![
        Span::styled(format!(" {}: ", app.selected_field().name()), Style::default().fg(Color::Cyan)),
        Span::styled(app.selected_description(), Style::default().fg(Color::Gray)),
    ]);

    let status_bar = Paragraph::new(vec![help, Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
