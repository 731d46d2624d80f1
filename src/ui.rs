use anyhow::Result;
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

use reduzo::quotation::{Quotation, QuotationKind, QuotationStatus};
use reduzo::quotation_book::QuotationFilter;
use reduzo::shopping_list::{ListFilter, ListStatus, ListTab, MoveDirection, ShoppingList};
use reduzo::statistics::{QuotationStats, ResponseRateBand};
use reduzo::{Supplier, Workspace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Quotations,
    ShoppingLists,
    Suppliers,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Quotations => Page::ShoppingLists,
            Page::ShoppingLists => Page::Suppliers,
            Page::Suppliers => Page::Quotations,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Quotations => Page::Suppliers,
            Page::ShoppingLists => Page::Quotations,
            Page::Suppliers => Page::ShoppingLists,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Quotations => "Quotations",
            Page::ShoppingLists => "Shopping Lists",
            Page::Suppliers => "Suppliers",
        }
    }
}

pub struct App {
    pub workspace: Workspace,
    pub public_base_url: String,
    pub current_page: Page,
    pub show_detail: bool,

    pub quotation_filter: QuotationFilter,
    pub quotation_state: TableState,

    pub list_filter: ListFilter,
    pub list_state: TableState,
    /// Supplier order highlighted in the list detail panel
    pub selected_order: usize,
    pub searching: bool,

    pub supplier_state: TableState,

    /// Outcome of the last action, shown in the status bar
    pub message: Option<String>,
}

fn select_first(state: &mut TableState, len: usize) {
    state.select(if len == 0 { None } else { Some(0) });
}

fn money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

impl App {
    pub fn new(workspace: Workspace, public_base_url: impl Into<String>) -> Self {
        let mut app = Self {
            workspace,
            public_base_url: public_base_url.into(),
            current_page: Page::Quotations,
            show_detail: false,
            quotation_filter: QuotationFilter::kind(QuotationKind::Automatic),
            quotation_state: TableState::default(),
            list_filter: ListFilter::default(),
            list_state: TableState::default(),
            selected_order: 0,
            searching: false,
            supplier_state: TableState::default(),
            message: None,
        };

        let (quotations, lists, suppliers) = (
            app.visible_quotations().len(),
            app.visible_lists().len(),
            app.workspace.suppliers.count(),
        );
        select_first(&mut app.quotation_state, quotations);
        select_first(&mut app.list_state, lists);
        select_first(&mut app.supplier_state, suppliers);
        app
    }

    // ========================================================================
    // VIEW DATA
    // ========================================================================

    pub fn visible_quotations(&self) -> Vec<&Quotation> {
        self.workspace.quotations.list(&self.quotation_filter)
    }

    pub fn visible_lists(&self) -> Vec<&ShoppingList> {
        self.workspace.lists.search(&self.list_filter)
    }

    pub fn suppliers(&self) -> Vec<Supplier> {
        self.workspace.suppliers.all_suppliers()
    }

    pub fn stats(&self) -> QuotationStats {
        self.workspace.quotation_stats()
    }

    pub fn selected_quotation(&self) -> Option<&Quotation> {
        self.quotation_state
            .selected()
            .and_then(|i| self.visible_quotations().get(i).copied())
    }

    pub fn selected_list(&self) -> Option<&ShoppingList> {
        self.list_state
            .selected()
            .and_then(|i| self.visible_lists().get(i).copied())
    }

    fn row_count(&self) -> usize {
        match self.current_page {
            Page::Quotations => self.visible_quotations().len(),
            Page::ShoppingLists => self.visible_lists().len(),
            Page::Suppliers => self.workspace.suppliers.count(),
        }
    }

    fn table_state(&mut self) -> &mut TableState {
        match self.current_page {
            Page::Quotations => &mut self.quotation_state,
            Page::ShoppingLists => &mut self.list_state,
            Page::Suppliers => &mut self.supplier_state,
        }
    }

    /// Keep the selection inside the (possibly shrunk) row set
    fn clamp_selection(&mut self) {
        let len = self.row_count();
        let state = self.table_state();
        match state.selected() {
            _ if len == 0 => state.select(None),
            Some(i) if i >= len => state.select(Some(len - 1)),
            None => state.select(Some(0)),
            _ => {}
        }
    }

    fn reset_selection(&mut self) {
        let len = self.row_count();
        select_first(self.table_state(), len);
        if self.current_page == Page::ShoppingLists {
            self.selected_order = 0;
        }
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.clamp_selection();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.clamp_selection();
    }

    pub fn next(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(i) if i >= len - 1 => 0,
            Some(i) => i + 1,
            None => 0,
        };
        state.select(Some(i));
        self.selected_order = 0;
    }

    pub fn previous(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = match state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        state.select(Some(i));
        self.selected_order = 0;
    }

    pub fn page_down(&mut self) {
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let state = self.table_state();
        let i = state.selected().map_or(0, |i| (i + 20).min(len - 1));
        state.select(Some(i));
        self.selected_order = 0;
    }

    pub fn page_up(&mut self) {
        let state = self.table_state();
        let i = state.selected().map_or(0, |i| i.saturating_sub(20));
        state.select(Some(i));
        self.selected_order = 0;
    }

    pub fn last_row(&mut self) {
        let len = self.row_count();
        if len > 0 {
            self.table_state().select(Some(len - 1));
            self.selected_order = 0;
        }
    }

    // ========================================================================
    // QUOTATION ACTIONS
    // ========================================================================

    pub fn toggle_kind(&mut self) {
        let kind = self
            .quotation_filter
            .kind
            .unwrap_or(QuotationKind::Automatic)
            .toggle();
        self.quotation_filter.kind = Some(kind);
        self.reset_selection();
    }

    pub fn set_status_filter(&mut self, status: Option<QuotationStatus>) {
        self.quotation_filter.status = status;
        self.reset_selection();
    }

    pub fn cycle_deadline(&mut self) {
        let Some((id, next)) = self.selected_quotation().map(|q| (q.id.clone(), q.deadline.cycle())) else {
            return;
        };
        self.message = Some(match self.workspace.quotations.update_deadline(&id, next) {
            Ok(quotation) => format!("{} deadline: {}", quotation.code, next.label()),
            Err(e) => e.to_string(),
        });
    }

    pub fn delete_quotation(&mut self) {
        let Some(id) = self.selected_quotation().map(|q| q.id.clone()) else {
            return;
        };
        self.message = Some(match self.workspace.quotations.delete(&id) {
            Ok(removed) => format!("{} deleted", removed.code),
            Err(e) => e.to_string(),
        });
        self.clamp_selection();
    }

    // ========================================================================
    // SHOPPING LIST ACTIONS
    // ========================================================================

    pub fn set_list_tab(&mut self, tab: ListTab) {
        self.list_filter.tab = tab;
        self.reset_selection();
    }

    pub fn start_search(&mut self) {
        self.searching = true;
    }

    pub fn end_search(&mut self) {
        self.searching = false;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.list_filter.term.push(c);
        self.reset_selection();
    }

    pub fn pop_search_char(&mut self) {
        self.list_filter.term.pop();
        self.reset_selection();
    }

    pub fn select_order(&mut self, forward: bool) {
        let count = self.selected_list().map_or(0, |l| l.orders.len());
        if count == 0 {
            return;
        }
        self.selected_order = if forward {
            (self.selected_order + 1).min(count - 1)
        } else {
            self.selected_order.saturating_sub(1)
        };
    }

    fn selected_order_ids(&self) -> Option<(String, String)> {
        let list = self.selected_list()?;
        let order = list.orders.get(self.selected_order)?;
        Some((list.id.clone(), order.supplier_id.clone()))
    }

    pub fn move_order(&mut self, direction: MoveDirection) {
        let Some((list_id, supplier_id)) = self.selected_order_ids() else {
            return;
        };
        let Ok(list) = self.workspace.lists.get_mut(&list_id) else {
            return;
        };
        if list.move_supplier(&supplier_id, direction) {
            self.selected_order = match direction {
                MoveDirection::Up => self.selected_order - 1,
                MoveDirection::Down => self.selected_order + 1,
            };
        }
    }

    pub fn finalize_selected_order(&mut self) {
        let Some((list_id, supplier_id)) = self.selected_order_ids() else {
            return;
        };
        let result = self
            .workspace
            .lists
            .get_mut(&list_id)
            .and_then(|list| list.finalize_supplier(&supplier_id));
        self.message = Some(match result {
            Ok(receipt) => format!(
                "Purchase registered: {} products, {}",
                receipt.summary.product_count,
                money(receipt.summary.grand_total)
            ),
            Err(e) => e.to_string(),
        });
        self.clamp_selection();
    }

    pub fn finalize_selected_list(&mut self) {
        let Some(list_id) = self.selected_list().map(|l| l.id.clone()) else {
            return;
        };
        let result = self
            .workspace
            .lists
            .get_mut(&list_id)
            .and_then(|list| list.finalize());
        self.message = Some(match result {
            Ok(receipt) => format!(
                "List #{} finalized: {} suppliers, {} products, {} added to stock",
                receipt.list_id,
                receipt.summary.supplier_count,
                receipt.summary.product_count,
                money(receipt.summary.grand_total)
            ),
            Err(e) => e.to_string(),
        });
        self.clamp_selection();
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    /// Apply one key press; returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if self.searching {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.end_search(),
                KeyCode::Backspace => self.pop_search_char(),
                KeyCode::Char(c) => self.push_search_char(c),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Enter => self.toggle_detail(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    self.previous_page();
                } else {
                    self.next_page();
                }
            }
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            KeyCode::PageDown => self.page_down(),
            KeyCode::PageUp => self.page_up(),
            KeyCode::Home => self.reset_selection(),
            KeyCode::End => self.last_row(),
            code => match self.current_page {
                Page::Quotations => self.handle_quotation_key(code),
                Page::ShoppingLists => self.handle_list_key(code),
                Page::Suppliers => {}
            },
        }
        false
    }

    fn handle_quotation_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('k') => self.toggle_kind(),
            KeyCode::Char('1') => self.set_status_filter(None),
            KeyCode::Char('2') => self.set_status_filter(Some(QuotationStatus::Open)),
            KeyCode::Char('3') => self.set_status_filter(Some(QuotationStatus::Answered)),
            KeyCode::Char('4') => self.set_status_filter(Some(QuotationStatus::Unanswered)),
            KeyCode::Char('d') => self.cycle_deadline(),
            KeyCode::Char('x') => self.delete_quotation(),
            _ => {}
        }
    }

    fn handle_list_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('1') => self.set_list_tab(ListTab::Pending),
            KeyCode::Char('2') => self.set_list_tab(ListTab::Finalized),
            KeyCode::Char('3') => self.set_list_tab(ListTab::All),
            KeyCode::Char('/') => self.start_search(),
            KeyCode::Char('[') => self.select_order(false),
            KeyCode::Char(']') => self.select_order(true),
            KeyCode::Char('K') => self.move_order(MoveDirection::Up),
            KeyCode::Char('J') => self.move_order(MoveDirection::Down),
            KeyCode::Char('p') => self.finalize_selected_order(),
            KeyCode::Char('f') => self.finalize_selected_list(),
            _ => {}
        }
    }
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.map_err(Into::into)
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        app.workspace.quotations.refresh_statuses(Utc::now());
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let with_detail = app.show_detail && app.current_page != Page::Suppliers;
    let (main, detail) = if with_detail {
        let content_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);
        (content_chunks[0], Some(content_chunks[1]))
    } else {
        (chunks[1], None)
    };

    match app.current_page {
        Page::Quotations => render_quotations(f, main, app),
        Page::ShoppingLists => render_lists(f, main, app),
        Page::Suppliers => render_suppliers(f, main, app),
    }
    if let Some(area) = detail {
        match app.current_page {
            Page::Quotations => render_quotation_detail(f, area, app),
            Page::ShoppingLists => render_list_detail(f, area, app),
            Page::Suppliers => {}
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn header_style() -> Style {
    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|h| Cell::from(*h).style(header_style())))
        .style(Style::default().bg(Color::DarkGray))
        .height(1)
}

fn framed(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White))
        .title(title)
}

fn highlight() -> Style {
    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
}

fn label(text: &str) -> Span<'static> {
    Span::styled(
        format!("  {}: ", text),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let stats = app.stats();

    let mut tab_spans = vec![];
    for (i, page) in [Page::Quotations, Page::ShoppingLists, Page::Suppliers].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }
        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    let rate_color = match stats.response_rate_band {
        ResponseRateBand::Good => Color::Green,
        ResponseRateBand::Fair => Color::Yellow,
        ResponseRateBand::Poor => Color::Red,
    };

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Quotations: {}", stats.total),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Response rate: {:.1}%", stats.response_rate),
        Style::default().fg(rate_color),
    ));
    if let Some(best) = stats.best_price {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(format!("Best: {}", money(best)), Style::default().fg(Color::Green)));
    }
    if let Some(fastest) = stats.fastest_suppliers.first() {
        tab_spans.push(Span::raw("  "));
        tab_spans.push(Span::styled(
            format!("Fastest: {} ({})", fastest.supplier_name, fastest.label),
            Style::default().fg(Color::Cyan),
        ));
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn status_color(status: QuotationStatus) -> Color {
    match status {
        QuotationStatus::Open => Color::Yellow,
        QuotationStatus::Answered => Color::Green,
        QuotationStatus::Unanswered => Color::Red,
    }
}

fn render_quotations(f: &mut Frame, area: Rect, app: &mut App) {
    let now = Utc::now();
    let rows: Vec<Row> = app
        .visible_quotations()
        .into_iter()
        .map(|q| {
            let color = status_color(q.status);
            Row::new(vec![
                Cell::from(q.code.clone()),
                Cell::from(truncate(&q.name, 24)),
                Cell::from(truncate(&q.supplier_name, 20)),
                Cell::from(q.issued_at.format("%d/%m %H:%M").to_string()),
                Cell::from(q.deadline.label()),
                Cell::from(q.item_count().to_string()),
                Cell::from(money(q.estimated_total())),
                Cell::from(q.status.as_str()).style(Style::default().fg(color)),
                Cell::from(q.remaining_label(now)),
            ])
        })
        .collect();

    let title = format!(
        " {} quotations ({}) ",
        app.quotation_filter.kind.map_or("All", |k| k.as_str()),
        app.quotation_filter.status.map_or("all statuses", |s| s.as_str())
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(25),
            Constraint::Length(21),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(6),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Min(10),
        ],
    )
    .header(header_row(&[
        "Code", "Name", "Supplier", "Issued", "Deadline", "Items", "Estimated", "Status", "Due",
    ]))
    .block(framed(title))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.quotation_state);
}

fn render_quotation_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Quotation Details ");

    let Some(q) = app.selected_quotation() else {
        f.render_widget(Paragraph::new("No quotation selected").block(block), area);
        return;
    };

    let mut content = vec![
        Line::from(""),
        Line::from(vec![label("Code"), Span::raw(q.code.clone())]),
        Line::from(vec![label("Supplier"), Span::raw(q.supplier_name.clone())]),
        Line::from(vec![label("Kind"), Span::raw(q.kind.as_str())]),
        Line::from(vec![
            label("Status"),
            Span::styled(q.status.as_str(), Style::default().fg(status_color(q.status))),
        ]),
        Line::from(vec![label("Deadline"), Span::raw(q.deadline.label())]),
        Line::from(""),
        Line::from(Span::styled("  ITEMS", header_style().add_modifier(Modifier::UNDERLINED))),
    ];

    for item in &q.items {
        let quoted = q
            .response
            .as_ref()
            .and_then(|r| r.price_for(&item.product_id))
            .map(|p| format!("  quoted {}", money(p)))
            .unwrap_or_default();
        content.push(Line::from(format!(
            "  {} × {} @ {}{}",
            item.quantity,
            item.name,
            money(item.average_price),
            quoted
        )));
    }

    content.push(Line::from(""));
    content.push(Line::from(vec![label("Estimated"), Span::raw(money(q.estimated_total()))]));
    if let Some(total) = q.response_total() {
        content.push(Line::from(vec![
            label("Quoted"),
            Span::styled(money(total), Style::default().fg(Color::Green)),
        ]));
    }
    if let Some(note) = &q.note {
        content.push(Line::from(vec![label("Note"), Span::raw(note.clone())]));
    }

    content.push(Line::from(""));
    content.push(Line::from(Span::styled("  SHARE", header_style().add_modifier(Modifier::UNDERLINED))));
    content.push(Line::from(format!(
        "  {}{}",
        app.public_base_url.trim_end_matches('/'),
        q.form_path()
    )));
    content.push(Line::from(Span::styled(
        format!("  {}", truncate(&q.whatsapp_link(&app.public_base_url), 60)),
        Style::default().fg(Color::DarkGray),
    )));
    if let Some(url) = &q.supplier_url {
        content.push(Line::from(vec![label("Website"), Span::raw(url.clone())]));
    }

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn list_status_color(status: ListStatus) -> Color {
    match status {
        ListStatus::Pending => Color::Yellow,
        ListStatus::Finalized => Color::Green,
        ListStatus::Cancelled => Color::Red,
    }
}

fn render_lists(f: &mut Frame, area: Rect, app: &mut App) {
    let rows: Vec<Row> = app
        .visible_lists()
        .into_iter()
        .map(|list| {
            Row::new(vec![
                Cell::from(format!("#{}", list.id)),
                Cell::from(list.issued_on.format("%d/%m/%Y").to_string()),
                Cell::from(list.supplier_count().to_string()),
                Cell::from(list.product_count().to_string()),
                Cell::from(money(list.grand_total())),
                Cell::from(list.status.as_str()).style(Style::default().fg(list_status_color(list.status))),
            ])
        })
        .collect();

    let mut title = format!(" Shopping lists: {} ", app.list_filter.tab.as_str());
    if !app.list_filter.term.is_empty() || app.searching {
        title.push_str(&format!("| search: {}{} ", app.list_filter.term, if app.searching { "_" } else { "" }));
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Min(10),
        ],
    )
    .header(header_row(&["List", "Issued", "Suppliers", "Products", "Total", "Status"]))
    .block(framed(title))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.list_state);
}

fn render_list_detail(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Purchase Route ");

    let Some(list) = app.selected_list() else {
        f.render_widget(Paragraph::new("No shopping list selected").block(block), area);
        return;
    };

    let mut content = vec![Line::from("")];
    for (index, order) in list.orders.iter().enumerate() {
        let marker = if index == app.selected_order { "▶ " } else { "  " };
        let name_style = if index == app.selected_order {
            header_style()
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };

        let mut title = vec![
            Span::raw(marker),
            Span::styled(format!("{}. {}", index + 1, order.supplier_name), name_style),
        ];
        if order.homologated {
            title.push(Span::styled(" ✓", Style::default().fg(Color::Green)));
        }
        if order.purchased {
            title.push(Span::styled(" [purchased]", Style::default().fg(Color::Green)));
        }
        content.push(Line::from(title));
        content.push(Line::from(Span::styled(
            format!("    {} · {}", order.supplier_kind.as_str(), order.location),
            Style::default().fg(Color::DarkGray),
        )));

        for item in &order.items {
            content.push(Line::from(format!(
                "    {} {} {} × {} = {}",
                item.code,
                truncate(&item.name, 18),
                item.quantity,
                money(item.unit_price),
                money(item.total())
            )));
        }

        let minimum = match order.shortfall() {
            Some(missing) => Span::styled(
                format!("    below minimum {} (missing {})", money(order.minimum_order), money(missing)),
                Style::default().fg(Color::Red),
            ),
            None => Span::styled(
                format!("    minimum {} reached", money(order.minimum_order)),
                Style::default().fg(Color::Green),
            ),
        };
        content.push(Line::from(vec![label("Total"), Span::raw(money(order.total()))]));
        content.push(Line::from(minimum));
        content.push(Line::from(""));
    }

    let summary = list.summary();
    content.push(Line::from(vec![
        label("Grand total"),
        Span::styled(money(summary.grand_total), header_style()),
    ]));
    content.push(Line::from(Span::styled(
        format!(
            "  f buys {} products from {} suppliers",
            summary.product_count, summary.supplier_count
        ),
        Style::default().fg(Color::DarkGray),
    )));

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_suppliers(f: &mut Frame, area: Rect, app: &mut App) {
    let suppliers = app.suppliers();
    let rows: Vec<Row> = suppliers
        .iter()
        .map(|s| {
            let (approved, color) = if s.homologated {
                ("Homologated", Color::Green)
            } else {
                ("Not homologated", Color::Red)
            };
            Row::new(vec![
                Cell::from(truncate(&s.name, 32)),
                Cell::from(s.kind.as_str()),
                Cell::from(truncate(&s.location(), 30)),
                Cell::from(money(s.minimum_order)),
                Cell::from(approved).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(33),
            Constraint::Length(14),
            Constraint::Length(31),
            Constraint::Length(14),
            Constraint::Min(15),
        ],
    )
    .header(header_row(&["Supplier", "Kind", "Location", "Min. order", "Status"]))
    .block(framed(format!(" Suppliers ({}) ", suppliers.len())))
    .highlight_style(highlight())
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.supplier_state);
}

fn key_hint(spans: &mut Vec<Span<'static>>, key: &'static str, text: &'static str) {
    spans.push(Span::styled(key, Style::default().fg(Color::Yellow)));
    spans.push(Span::raw(text));
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = match app.current_page {
        Page::Quotations => app.quotation_state.selected(),
        Page::ShoppingLists => app.list_state.selected(),
        Page::Suppliers => app.supplier_state.selected(),
    }
    .map(|i| i + 1)
    .unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.row_count()),
        Style::default().fg(Color::Cyan),
    )];
    spans.push(Span::raw("| "));

    match app.current_page {
        Page::Quotations => {
            key_hint(&mut spans, "k", " Kind | ");
            key_hint(&mut spans, "1-4", " Status | ");
            key_hint(&mut spans, "d", " Deadline | ");
            key_hint(&mut spans, "x", " Delete | ");
        }
        Page::ShoppingLists if app.searching => {
            key_hint(&mut spans, "Enter/Esc", " End search | ");
        }
        Page::ShoppingLists => {
            key_hint(&mut spans, "1-3", " Tab | ");
            key_hint(&mut spans, "/", " Search | ");
            key_hint(&mut spans, "[ ]", " Supplier | ");
            key_hint(&mut spans, "K/J", " Move | ");
            key_hint(&mut spans, "p", " Buy supplier | ");
            key_hint(&mut spans, "f", " Finalize | ");
        }
        Page::Suppliers => {}
    }
    key_hint(&mut spans, "Enter", " Details | ");
    key_hint(&mut spans, "Tab", " Page | ");
    spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    spans.push(Span::raw(" Quit"));

    if let Some(message) = &app.message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Green)));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );
    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

// ============================================================================
// TESTS
// ============================================================================
