/// Property-based tests using proptest
/// Tests listing invariants that should hold for any collection and page
use proptest::prelude::*;
use std::sync::Arc;

use rust_workers_api::catalog::Role;
use rust_workers_api::models::{ListWorkersParams, Location, SalaryInput, WorkerDraft};
use rust_workers_api::query::WorkerFilter;
use rust_workers_api::services::WorkerService;
use rust_workers_api::store::InMemoryWorkerStore;
use rust_workers_api::validation::is_valid_email;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn draft(i: usize, name: &str, role: Role) -> WorkerDraft {
    WorkerDraft {
        name: Some(name.to_string()),
        phone: Some("9800000000".to_string()),
        email: Some(format!("worker{}@example.com", i)),
        role: Some(role.to_string()),
        experience: Some(1),
        location: Some(Location {
            city: Some("Delhi".to_string()),
            ..Location::default()
        }),
        salary: Some(SalaryInput {
            amount: Some(10000.0),
            kind: Some("Monthly".to_string()),
        }),
        ..WorkerDraft::default()
    }
}

fn seeded(rt: &tokio::runtime::Runtime, names: &[(String, Role)]) -> WorkerService {
    let service = WorkerService::new(Arc::new(InMemoryWorkerStore::new()), 100);
    rt.block_on(async {
        for (i, (name, role)) in names.iter().enumerate() {
            service.create(draft(i, name, *role)).await.unwrap();
        }
    });
    service
}

fn role_strategy() -> impl Strategy<Value = Role> {
    prop::sample::select(Role::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // Property: page length and page count follow from total and limit
    #[test]
    fn page_length_matches_formula(
        names in prop::collection::vec(("[A-Za-z]{1,8}", role_strategy()), 0..25),
        page in 1u32..8,
        limit in 1u32..10,
    ) {
        let rt = runtime();
        let service = seeded(&rt, &names);
        let params = ListWorkersParams {
            page: Some(page.to_string()),
            limit: Some(limit.to_string()),
            ..ListWorkersParams::default()
        };
        let result = rt.block_on(service.list(&params)).unwrap();

        let total = names.len() as u64;
        let skipped = u64::from(page - 1) * u64::from(limit);
        let expected_len = u64::from(limit).min(total.saturating_sub(skipped));
        prop_assert_eq!(result.total, total);
        prop_assert_eq!(result.data.len() as u64, expected_len);
        prop_assert_eq!(result.total_pages, total.div_ceil(u64::from(limit)));
        prop_assert_eq!(result.page, page);
    }

    // Property: search ignores case
    #[test]
    fn search_is_case_insensitive(
        names in prop::collection::vec(("[A-Za-z]{1,8}", role_strategy()), 1..15),
        needle in "[a-z]{1,3}",
    ) {
        let rt = runtime();
        let service = seeded(&rt, &names);
        let lower = ListWorkersParams {
            search: Some(needle.clone()),
            limit: Some("100".to_string()),
            ..ListWorkersParams::default()
        };
        let upper = ListWorkersParams {
            search: Some(needle.to_uppercase()),
            ..lower.clone()
        };

        let a = rt.block_on(service.list(&lower)).unwrap();
        let b = rt.block_on(service.list(&upper)).unwrap();
        prop_assert_eq!(a.total, b.total);
        prop_assert_eq!(a.data, b.data);
    }

    // Property: a role filter only ever returns that role, ANDed with search
    #[test]
    fn role_filter_is_exact(
        names in prop::collection::vec(("[A-Za-z]{1,8}", role_strategy()), 0..15),
        role in role_strategy(),
    ) {
        let rt = runtime();
        let service = seeded(&rt, &names);
        let params = ListWorkersParams {
            role: Some(role.to_string()),
            limit: Some("100".to_string()),
            ..ListWorkersParams::default()
        };
        let result = rt.block_on(service.list(&params)).unwrap();

        let expected = names.iter().filter(|(_, r)| *r == role).count() as u64;
        prop_assert_eq!(result.total, expected);
        let filter = WorkerFilter { search: None, role: Some(role) };
        prop_assert!(result.data.iter().all(|w| filter.matches(w)));
    }
}

// Property: Email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_pass(
        local in "[a-z]{1,10}",
        domain in "[a-z]{1,10}",
        tld in "[a-z]{2,4}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }
}
