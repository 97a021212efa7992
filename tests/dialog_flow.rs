//! End-to-end conversation scenarios against in-memory stores.

use std::sync::Arc;

use cubebot::catalog::ScheduleEntry;
use cubebot::channels::{InboundEvent, Reply};
use cubebot::render;
use cubebot::router::ConversationRouter;
use cubebot::search::DirectoryEntry;
use cubebot::session::DialogState;
use cubebot::store::{MemoryCredentialTable, StaticDirectory, StaticScheduleSource};

fn entry(
    direction: &str,
    cabinet: &str,
    group: &str,
    supervisor: &str,
    weekday: &str,
    time: &str,
) -> ScheduleEntry {
    ScheduleEntry {
        direction: direction.into(),
        cabinet: cabinet.into(),
        group: group.into(),
        supervisor: supervisor.into(),
        weekday: weekday.into(),
        time: time.into(),
    }
}

fn schedule() -> Vec<ScheduleEntry> {
    vec![
        entry("Robotics", "12", "R-1", "Иванов Сергей", "Mon", "16:00"),
        entry("Robotics", "12", "R-1", "Иванов Сергей", "Wed", "16:00"),
        entry("Robotics", "14", "R-2", "Иванова Мария", "Tue", "17:00"),
        entry("Python", "7", "G1", "Сидоров Олег", "Thu", "15:00"),
    ]
}

fn directory() -> Vec<DirectoryEntry> {
    vec![DirectoryEntry {
        full_name: "Петров Иван Ильич".into(),
        group: "G1".into(),
    }]
}

fn router() -> ConversationRouter {
    router_with_page_size(4000)
}

fn router_with_page_size(page_size: usize) -> ConversationRouter {
    ConversationRouter::new(
        Arc::new(MemoryCredentialTable::default()),
        Arc::new(StaticScheduleSource::new(schedule())),
        Arc::new(StaticDirectory::new(directory())),
        page_size,
    )
}

fn event(identity: &str, text: &str) -> InboundEvent {
    InboundEvent::new(identity, "Test User", text)
}

async fn send(router: &ConversationRouter, identity: &str, text: &str) -> Vec<Reply> {
    router.handle(&event(identity, text)).await
}

/// Drive an identity from first contact through registration to the menu.
async fn register(router: &ConversationRouter, identity: &str, login: &str, password: &str) {
    send(router, identity, "/start").await;
    send(router, identity, render::REGISTER).await;
    send(router, identity, login).await;
    send(router, identity, password).await;
    let replies = send(router, identity, password).await;
    assert!(
        replies[0].text.contains("Registration complete"),
        "registration should succeed, got: {}",
        replies[0].text
    );
}

#[tokio::test]
async fn register_then_login_reaches_main_menu() {
    let router = router();
    register(&router, "device-a", "ivan", "1234").await;
    assert_eq!(router.state_of("device-a").await, Some(DialogState::MainMenu));

    // Same login from a new device identity.
    send(&router, "device-b", "/start").await;
    send(&router, "device-b", render::LOGIN).await;
    send(&router, "device-b", "ivan").await;
    let replies = send(&router, "device-b", "1234").await;

    assert!(replies[0].text.contains("You are logged in"));
    assert!(replies[1].text.contains("Main menu"));
    assert_eq!(router.state_of("device-b").await, Some(DialogState::MainMenu));
}

#[tokio::test]
async fn unique_name_search_renders_schedule_directly() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::SEARCH_FIO).await;
    let replies = send(&router, "u1", "Петров").await;

    // Direct render: the found group's schedule, then the menu — no
    // disambiguation prompt.
    assert!(replies[0].text.contains("Found a group"));
    assert!(replies[0].text.contains("👥 Group: G1"));
    assert!(replies[0].text.contains("🕒 15:00"));
    assert!(replies[1].text.contains("Main menu"));
    assert_eq!(router.state_of("u1").await, Some(DialogState::MainMenu));
}

#[tokio::test]
async fn ambiguous_search_offers_sorted_group_choice() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::SEARCH_FIO).await;
    // "Иван" matches supervisors Иванов (R-1) and Иванова (R-2); the
    // directory has no hit, so the supervisor fallback applies.
    let replies = send(&router, "u1", "Иван").await;

    assert!(replies[0].text.contains("Several groups match"));
    let option_rows = &replies[0].keyboard.rows;
    assert_eq!(option_rows[0], vec!["R-1"]);
    assert_eq!(option_rows[1], vec!["R-2"]);
    assert_eq!(option_rows[2], vec![render::BACK]);
    assert_eq!(router.state_of("u1").await, Some(DialogState::GroupSelect));

    // Picking one of the offered groups renders its schedule.
    let replies = send(&router, "u1", "R-2").await;
    assert!(replies[0].text.contains("👥 Group: R-2"));
    assert_eq!(router.state_of("u1").await, Some(DialogState::MainMenu));
}

#[tokio::test]
async fn failed_search_reprompts_search_state() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::SEARCH_FIO).await;
    let replies = send(&router, "u1", "Нечаев").await;
    assert!(replies[0].text.contains("was not found"));
    assert_eq!(router.state_of("u1").await, Some(DialogState::SearchFioInput));
}

#[tokio::test]
async fn direction_and_group_selection_flow() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    let replies = send(&router, "u1", render::PICK_DIRECTION).await;
    assert!(replies[0].text.contains("Choose a direction"));
    let labels: Vec<&str> = replies[0].keyboard.labels().collect();
    assert!(labels.contains(&"Python"));
    assert!(labels.contains(&"Robotics"));

    let replies = send(&router, "u1", "Robotics").await;
    assert!(replies[0].text.contains("Direction selected: Robotics"));
    let labels: Vec<&str> = replies[0].keyboard.labels().collect();
    assert!(labels.contains(&"R-1"));
    assert!(labels.contains(&"R-2"));
    assert!(labels.contains(&render::ALL_GROUPS));

    let replies = send(&router, "u1", "R-1").await;
    assert!(replies[0].text.contains("👥 Group: R-1"));
    assert!(replies[0].text.contains("📅 Mon | 🕒 16:00"));
    assert!(replies[0].text.contains("📅 Wed | 🕒 16:00"));
    assert!(replies.last().unwrap().text.contains("Main menu"));
}

#[tokio::test]
async fn all_groups_renders_whole_direction() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::PICK_DIRECTION).await;
    send(&router, "u1", "Robotics").await;
    let replies = send(&router, "u1", render::ALL_GROUPS).await;

    assert!(replies[0].text.contains("Schedule for direction Robotics"));
    assert!(replies[0].text.contains("R-1"));
    assert!(replies[0].text.contains("R-2"));
    assert!(!replies[0].text.contains("G1"), "other directions excluded");
}

#[tokio::test]
async fn unknown_direction_still_offers_all_groups_and_back() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::PICK_DIRECTION).await;
    // Free-typed direction with zero groups.
    let replies = send(&router, "u1", "Chess").await;

    let labels: Vec<&str> = replies[0].keyboard.labels().collect();
    assert!(labels.contains(&render::ALL_GROUPS));
    assert!(labels.contains(&render::BACK));
    assert_eq!(router.state_of("u1").await, Some(DialogState::GroupSelect));
}

#[tokio::test]
async fn unknown_group_is_informational_not_fatal() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    send(&router, "u1", render::PICK_DIRECTION).await;
    send(&router, "u1", "Robotics").await;
    let replies = send(&router, "u1", "R-9").await;
    assert!(replies[0].text.contains("No classes found for group R-9"));
    assert_eq!(router.state_of("u1").await, Some(DialogState::MainMenu));
}

#[tokio::test]
async fn full_schedule_pages_reassemble_in_order() {
    // Tiny pages force chunking of the full listing.
    let router = router_with_page_size(64);
    register(&router, "u1", "ivan", "1234").await;

    let replies = send(&router, "u1", render::FULL_SCHEDULE).await;
    assert!(replies.len() > 2, "expected multiple pages plus the menu");

    let pages: Vec<&str> = replies[..replies.len() - 1]
        .iter()
        .map(|r| r.text.as_str())
        .collect();
    for page in &pages {
        assert!(page.chars().count() <= 64);
    }
    let reassembled: String = pages.concat();
    assert!(reassembled.starts_with("📋 Full schedule:"));
    assert!(reassembled.contains("🌟 Direction: Robotics"));
    assert!(reassembled.contains("🌟 Direction: Python"));

    // Every page keeps the back option; the tail is the menu again.
    for reply in &replies[..replies.len() - 1] {
        assert_eq!(reply.keyboard.rows, vec![vec![render::BACK.to_string()]]);
    }
    assert!(replies.last().unwrap().text.contains("Main menu"));
}

#[tokio::test]
async fn profile_shows_credential_fields() {
    let router = router();
    register(&router, "u1", "ivan", "1234").await;

    let replies = send(&router, "u1", render::PROFILE).await;
    assert!(replies[0].text.contains("🆔 ID: u1"));
    assert!(replies[0].text.contains("📛 Login: ivan"));
    assert_eq!(router.state_of("u1").await, Some(DialogState::MainMenu));
}

#[tokio::test]
async fn password_digest_is_never_echoed() {
    let router = router();
    register(&router, "u1", "ivan", "sup3rsecret").await;

    let replies = send(&router, "u1", render::PROFILE).await;
    assert!(!replies[0].text.contains("sup3rsecret"));
}
