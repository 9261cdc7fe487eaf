//! Client-side state of the worker listing screen.

use std::fmt::Write as _;

use crate::catalog::Role;
use crate::client::{ClientError, WorkerSource};
use crate::models::{ListWorkersParams, Salary, WorkerPage, WorkerRecord};
use crate::query::WorkerFilter;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch workers. Please try again later.";
pub const NO_MATCHES_MESSAGE: &str = "No workers found matching your criteria.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Loaded,
    /// Carries the message shown next to the retry affordance.
    Errored(String),
}

/// Identifies one fetch. Only the most recently issued ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// Summary shown for each worker in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerCard {
    pub id: String,
    pub name: String,
    pub role: String,
    pub location: String,
    pub salary: String,
    pub availability: Option<String>,
    pub verified: bool,
    pub languages: Vec<String>,
    pub skills: Vec<String>,
}

impl From<&WorkerRecord> for WorkerCard {
    fn from(worker: &WorkerRecord) -> Self {
        Self {
            id: worker.id.clone(),
            name: worker.name.clone(),
            role: worker.role.to_string(),
            location: worker.location.summary(),
            salary: format_salary(&worker.salary),
            availability: worker.availability.map(|a| a.to_string()),
            verified: worker.verified,
            languages: worker.languages.iter().map(|l| l.to_string()).collect(),
            skills: worker.skills.clone(),
        }
    }
}

/// The contact overlay: the card plus details withheld from the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerDetail {
    pub card: WorkerCard,
    pub full_location: String,
    pub phone: String,
}

/// "₹15000/Monthly"
pub fn format_salary(salary: &Salary) -> String {
    format!("₹{}/{}", salary.amount, salary.kind)
}

/// Listing screen: fetch lifecycle, local filters and the contact overlay.
#[derive(Debug, Clone)]
pub struct ListingView {
    state: ViewState,
    workers: Vec<WorkerRecord>,
    search: String,
    role: Option<Role>,
    selected: Option<String>,
    page_size: u32,
    latest_ticket: u64,
}

impl ListingView {
    pub fn new(page_size: u32) -> Self {
        Self {
            state: ViewState::Idle,
            workers: Vec::new(),
            search: String::new(),
            role: None,
            selected: None,
            page_size,
            latest_ticket: 0,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Parameters of the initial fetch: first page, configured size.
    pub fn fetch_params(&self) -> ListWorkersParams {
        ListWorkersParams {
            page: Some("1".to_string()),
            limit: Some(self.page_size.to_string()),
            ..ListWorkersParams::default()
        }
    }

    /// Enters `Loading` and supersedes any fetch already in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_ticket += 1;
        self.state = ViewState::Loading;
        FetchTicket(self.latest_ticket)
    }

    /// Applies a fetch result. Returns false when the ticket was superseded,
    /// in which case nothing changes.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<WorkerPage, ClientError>,
    ) -> bool {
        if ticket.0 != self.latest_ticket || self.state != ViewState::Loading {
            tracing::debug!("Ignoring superseded fetch {}", ticket.0);
            return false;
        }

        match result {
            Ok(page) => {
                tracing::debug!("Fetched {} of {} workers", page.data.len(), page.total);
                self.workers = page.data;
                self.state = ViewState::Loaded;
            }
            Err(e) => {
                tracing::error!("Error fetching workers: {}", e);
                self.state = ViewState::Errored(FETCH_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Runs the initial fetch.
    pub async fn mount(&mut self, source: &dyn WorkerSource) {
        let ticket = self.begin_fetch();
        let params = self.fetch_params();
        let result = source.fetch_workers(&params).await;
        self.complete_fetch(ticket, result);
    }

    /// Fetches again after a failure. Does nothing in any other state.
    pub async fn retry(&mut self, source: &dyn WorkerSource) -> bool {
        if !matches!(self.state, ViewState::Errored(_)) {
            return false;
        }
        self.mount(source).await;
        true
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
    }

    pub fn set_role(&mut self, role: Option<Role>) {
        self.role = role;
    }

    pub fn reset_filters(&mut self) {
        self.search.clear();
        self.role = None;
    }

    pub fn filter(&self) -> WorkerFilter {
        WorkerFilter::new(Some(&self.search), self.role)
    }

    /// Fetched workers that pass the local filters, in fetch order.
    pub fn visible_workers(&self) -> Vec<&WorkerRecord> {
        let filter = self.filter();
        self.workers.iter().filter(|w| filter.matches(w)).collect()
    }

    pub fn cards(&self) -> Vec<WorkerCard> {
        self.visible_workers()
            .into_iter()
            .map(WorkerCard::from)
            .collect()
    }

    /// Opens the contact overlay. Unknown ids leave the selection unchanged.
    pub fn open_contact(&mut self, id: &str) -> bool {
        if self.workers.iter().any(|w| w.id == id) {
            self.selected = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn close_contact(&mut self) {
        self.selected = None;
    }

    pub fn detail(&self) -> Option<WorkerDetail> {
        let id = self.selected.as_deref()?;
        let worker = self.workers.iter().find(|w| w.id == id)?;
        let full_location = [
            &worker.location.city,
            &worker.location.state,
            &worker.location.pincode,
        ]
        .iter()
        .filter_map(|part| part.as_deref())
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        Some(WorkerDetail {
            card: WorkerCard::from(worker),
            full_location,
            phone: worker.phone.clone(),
        })
    }

    /// Plain-text rendering of the whole screen.
    pub fn render(&self) -> String {
        let mut out = String::new();
        match &self.state {
            ViewState::Idle => {}
            ViewState::Loading => out.push_str("Loading workers...\n"),
            ViewState::Errored(message) => {
                let _ = writeln!(out, "{}", message);
                out.push_str("[Retry]\n");
            }
            ViewState::Loaded => {
                let cards = self.cards();
                if cards.is_empty() {
                    let _ = writeln!(out, "{}", NO_MATCHES_MESSAGE);
                }
                for card in &cards {
                    render_card(&mut out, card);
                }
                if let Some(detail) = self.detail() {
                    render_detail(&mut out, &detail);
                }
            }
        }
        out
    }
}

fn render_card(out: &mut String, card: &WorkerCard) {
    let badge = if card.verified { " [Verified]" } else { "" };
    let _ = writeln!(out, "{} ({}){}", card.name, card.role, badge);
    let _ = writeln!(out, "  {}", card.location);
    let _ = writeln!(out, "  {}", card.salary);
    if let Some(availability) = &card.availability {
        let _ = writeln!(out, "  {}", availability);
    }
    if !card.languages.is_empty() {
        let _ = writeln!(out, "  Languages: {}", card.languages.join(", "));
    }
    if !card.skills.is_empty() {
        let _ = writeln!(out, "  Skills: {}", card.skills.join(", "));
    }
    out.push_str("  [Contact Worker]\n");
}

fn render_detail(out: &mut String, detail: &WorkerDetail) {
    let card = &detail.card;
    out.push_str("---\n");
    let _ = writeln!(out, "{}", card.name);
    let _ = writeln!(out, "{}", card.role);
    if card.verified {
        out.push_str("Verified\n");
    }
    let _ = writeln!(out, "Location: {}", detail.full_location);
    let _ = writeln!(out, "Salary: {}", card.salary);
    let _ = writeln!(
        out,
        "Availability: {}",
        card.availability.as_deref().unwrap_or("-")
    );
    let _ = writeln!(out, "Languages: {}", card.languages.join(", "));
    let _ = writeln!(out, "Skills: {}", card.skills.join(", "));
    let _ = writeln!(out, "Phone Number: {}", detail.phone);
    out.push_str("[Close]\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Availability, Language, SalaryType};
    use crate::models::{Documents, Location};
    use chrono::Utc;

    fn worker(id: &str, name: &str, role: Role) -> WorkerRecord {
        let now = Utc::now();
        WorkerRecord {
            id: id.to_string(),
            name: name.to_string(),
            phone: "9800000000".to_string(),
            email: format!("{}@example.com", id),
            role,
            experience: 2,
            location: Location {
                city: Some("Mumbai".to_string()),
                state: Some("Maharashtra".to_string()),
                pincode: Some("400001".to_string()),
            },
            languages: vec![Language::Hindi, Language::Marathi],
            skills: vec!["Cooking".to_string()],
            salary: Salary {
                amount: 15000.0,
                kind: SalaryType::Monthly,
            },
            availability: Some(Availability::FullTime),
            documents: Documents::default(),
            rating: 0.0,
            verified: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn page(workers: Vec<WorkerRecord>) -> WorkerPage {
        let total = workers.len() as u64;
        WorkerPage::new(workers, total, 1, 100)
    }

    fn loaded_view() -> ListingView {
        let mut view = ListingView::new(100);
        let ticket = view.begin_fetch();
        view.complete_fetch(
            ticket,
            Ok(page(vec![
                worker("1", "Raju", Role::Driver),
                worker("2", "Asha", Role::Maid),
            ])),
        );
        view
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut view = ListingView::new(100);
        assert_eq!(view.state(), &ViewState::Idle);

        let ticket = view.begin_fetch();
        assert_eq!(view.state(), &ViewState::Loading);
        assert!(view.render().contains("Loading"));

        assert!(view.complete_fetch(ticket, Err(ClientError::Transport("down".to_string()))));
        assert_eq!(
            view.state(),
            &ViewState::Errored(FETCH_FAILED_MESSAGE.to_string())
        );
        assert!(view.render().contains("[Retry]"));
    }

    #[test]
    fn test_superseded_fetch_is_ignored() {
        let mut view = ListingView::new(100);
        let stale = view.begin_fetch();
        let fresh = view.begin_fetch();

        assert!(!view.complete_fetch(stale, Ok(page(vec![worker("1", "Raju", Role::Driver)]))));
        assert_eq!(view.state(), &ViewState::Loading);

        assert!(view.complete_fetch(fresh, Ok(page(vec![]))));
        assert_eq!(view.state(), &ViewState::Loaded);
        assert!(view.visible_workers().is_empty());
    }

    #[test]
    fn test_local_filters_narrow_fetched_set() {
        let mut view = loaded_view();
        view.set_search("ASH");
        let names: Vec<&str> = view.visible_workers().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Asha"]);

        view.set_search("");
        view.set_role(Some(Role::Driver));
        let names: Vec<&str> = view.visible_workers().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Raju"]);

        view.set_role(None);
        view.set_search(" a");
        assert!(view.visible_workers().is_empty());
        view.set_search("   ");
        assert_eq!(view.visible_workers().len(), 2);

        view.set_role(Some(Role::Driver));
        view.set_search("asha");
        assert!(view.visible_workers().is_empty());
        assert!(view.render().contains(NO_MATCHES_MESSAGE));

        view.reset_filters();
        assert_eq!(view.visible_workers().len(), 2);
        assert_eq!(view.state(), &ViewState::Loaded);
    }

    #[test]
    fn test_cards_show_listing_fields() {
        let view = loaded_view();
        let cards = view.cards();
        assert_eq!(cards[0].name, "Raju");
        assert_eq!(cards[0].location, "Mumbai, Maharashtra");
        assert_eq!(cards[0].salary, "₹15000/Monthly");
        assert_eq!(cards[0].availability.as_deref(), Some("Full-time"));
        assert_eq!(cards[0].languages, vec!["Hindi", "Marathi"]);
        assert!(!view.render().contains("9800000000"));
    }

    #[test]
    fn test_contact_overlay() {
        let mut view = loaded_view();
        assert!(!view.open_contact("missing"));
        assert!(view.detail().is_none());

        assert!(view.open_contact("2"));
        let detail = view.detail().unwrap();
        assert_eq!(detail.card.name, "Asha");
        assert_eq!(detail.phone, "9800000000");
        assert_eq!(detail.full_location, "Mumbai, Maharashtra, 400001");
        assert!(view.render().contains("Phone Number: 9800000000"));

        view.close_contact();
        assert!(view.detail().is_none());
    }
}
