// src/app.rs

use ratatui::widgets::ListState;

use crate::core::models::{Finding, ScanResult};

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

pub struct App {
    pub should_quit: bool,
    pub state: AppState,
    pub input: String,
    pub scan_result: Option<ScanResult>,
    /// Selection in the findings list.
    pub findings_list_state: ListState,
    spinner_frame: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            should_quit: false,
            state: AppState::Idle,
            input: String::new(),
            scan_result: None,
            findings_list_state: ListState::default(),
            spinner_frame: 0,
        }
    }

    pub fn finish_scan(&mut self, result: ScanResult) {
        let selected = if result.findings.is_empty() { None } else { Some(0) };
        self.findings_list_state.select(selected);
        self.scan_result = Some(result);
        self.state = AppState::Finished;
    }

    pub fn findings(&self) -> &[Finding] {
        self.scan_result
            .as_ref()
            .map(|r| r.findings.as_slice())
            .unwrap_or_default()
    }

    pub fn selected_finding(&self) -> Option<&Finding> {
        self.findings_list_state
            .selected()
            .and_then(|i| self.findings().get(i))
    }

    pub fn select_next(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let next = match self.findings_list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.findings_list_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        let len = self.findings().len();
        if len == 0 {
            return;
        }
        let previous = match self.findings_list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.findings_list_state.select(Some(previous));
    }

    pub fn spinner(&self) -> char {
        SPINNER_CHARS[self.spinner_frame % SPINNER_CHARS.len()]
    }

    pub fn on_tick(&mut self) {
        if self.state == AppState::Scanning {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        self.state = AppState::Idle;
        self.input = String::new();
        self.scan_result = None;
        self.findings_list_state = ListState::default();
        self.spinner_frame = 0;
    }
}
