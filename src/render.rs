//! Presentation layer — message texts, option keyboards, pagination.
//!
//! All user-visible copy lives here so handlers stay logic-only.

use crate::auth::Credential;
use crate::catalog::ScheduleEntry;
use crate::channels::Keyboard;

// Button labels. Recognition is exact-match on the full label.
pub const BACK: &str = "⬅️ Back";
pub const LOGIN: &str = "🔑 Log in";
pub const REGISTER: &str = "📝 Sign up";
pub const ABOUT: &str = "ℹ️ About";
pub const PICK_DIRECTION: &str = "📅 Pick a direction";
pub const SEARCH_FIO: &str = "🔍 Search by name";
pub const FULL_SCHEDULE: &str = "📋 Full schedule";
pub const DEVELOPER: &str = "👨‍💻 Developer";
pub const PROFILE: &str = "⚙️ Profile";
pub const ALL_GROUPS: &str = "All groups";

const RULE: &str = "────────────────────";

// ── Keyboards ───────────────────────────────────────────────────────

pub fn back_keyboard() -> Keyboard {
    Keyboard::new(vec![vec![BACK.to_string()]])
}

pub fn auth_keyboard() -> Keyboard {
    Keyboard::new(vec![
        vec![LOGIN.to_string(), REGISTER.to_string()],
        vec![ABOUT.to_string()],
    ])
}

pub fn main_menu_keyboard() -> Keyboard {
    Keyboard::new(vec![
        vec![PICK_DIRECTION.to_string(), SEARCH_FIO.to_string()],
        vec![FULL_SCHEDULE.to_string(), DEVELOPER.to_string()],
        vec![PROFILE.to_string()],
    ])
}

/// Direction options, two per row, with a trailing back row.
pub fn direction_keyboard(directions: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<String>> = directions.chunks(2).map(<[String]>::to_vec).collect();
    rows.push(vec![BACK.to_string()]);
    Keyboard::new(rows)
}

/// Group options, three per row, with a trailing "all groups"/back row.
/// Present even when the direction has no groups.
pub fn group_keyboard(groups: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<String>> = groups.chunks(3).map(<[String]>::to_vec).collect();
    rows.push(vec![ALL_GROUPS.to_string(), BACK.to_string()]);
    Keyboard::new(rows)
}

/// Disambiguation list after an ambiguous name search: one group per row.
pub fn group_choice_keyboard(groups: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<String>> = groups.iter().map(|g| vec![g.clone()]).collect();
    rows.push(vec![BACK.to_string()]);
    Keyboard::new(rows)
}

// ── Static texts ────────────────────────────────────────────────────

pub fn auth_prompt() -> String {
    "🔒 Authorization is required to use the bot.\nChoose an action:".to_string()
}

pub fn main_menu_prompt() -> String {
    "Main menu. Choose an action:".to_string()
}

pub fn about_text() -> String {
    "🤖 This bot shows the class schedule at IT-Cube.\n\n\
     Log in or sign up to get started."
        .to_string()
}

pub fn developer_text() -> String {
    "👨‍💻 Developer info:\n\n\
     📌 IT-Cube schedule assistant\n\
     🛠️ Built by the IT-Cube student lab\n\
     📧 Questions: ask your supervisor or the admins"
        .to_string()
}

pub fn source_unavailable_text() -> String {
    "Schedule file not found. Make sure the schedule source is in place and restart the bot."
        .to_string()
}

pub fn profile_text(credential: &Credential) -> String {
    format!(
        "👤 Your profile:\n\n\
         🆔 ID: {}\n\
         👤 Name: {}\n\
         📛 Login: {}\n\n\
         Use the buttons below to navigate:",
        credential.identity.as_deref().unwrap_or("—"),
        credential.display_name,
        credential.login,
    )
}

// ── Schedule blocks ─────────────────────────────────────────────────

fn session_lines(row: &ScheduleEntry) -> String {
    format!("📅 {} | 🕒 {}\n{RULE}\n", row.weekday, row.time)
}

/// Schedule for one group: a header read from the first row, then one line
/// per session.
pub fn group_schedule(rows: &[&ScheduleEntry]) -> Option<String> {
    let first = rows.first()?;
    let mut out = format!(
        "📋 Schedule for group:\n\
         🌟 Direction: {}\n\
         📍 Cabinet: {}\n\
         👥 Group: {}\n\
         👨‍🏫 Supervisor: {}\n\n",
        first.direction, first.cabinet, first.group, first.supervisor,
    );
    for row in rows {
        out.push_str(&session_lines(row));
    }
    Some(out)
}

/// Schedule for every group in one direction.
pub fn direction_schedule(direction: &str, rows: &[&ScheduleEntry]) -> String {
    let mut out = format!("📋 Schedule for direction {direction}:\n\n");
    for row in rows {
        out.push_str(&format!(
            "👥 Group: {}\n👨‍🏫 Supervisor: {}\n",
            row.group, row.supervisor
        ));
        out.push_str(&session_lines(row));
    }
    out
}

/// The full listing, in source order. A direction header (with its cabinet)
/// is emitted whenever the direction differs from the immediately preceding
/// row — a direction repeated non-contiguously gets its header again.
pub fn full_schedule(rows: &[ScheduleEntry]) -> String {
    let mut out = String::from("📋 Full schedule:\n\n");
    let mut current_direction: Option<&str> = None;
    for row in rows {
        if !row.direction.is_empty() && current_direction != Some(row.direction.as_str()) {
            current_direction = Some(row.direction.as_str());
            out.push_str(&format!(
                "\n🌟 Direction: {}\n📍 Cabinet: {}\n{RULE}\n",
                row.direction, row.cabinet
            ));
        }
        out.push_str(&format!(
            "👥 Group: {}\n👨‍🏫 Supervisor: {}\n",
            row.group, row.supervisor
        ));
        out.push_str(&session_lines(row));
    }
    out
}

/// A unique name-search hit: group header plus its session times.
pub fn search_found(rows: &[&ScheduleEntry]) -> Option<String> {
    let first = rows.first()?;
    let mut out = format!(
        "🔍 Found a group for your search:\n\n\
         🌟 Direction: {}\n\
         📍 Cabinet: {}\n\
         👥 Group: {}\n\
         👨‍🏫 Supervisor: {}\n\n\
         📋 Schedule:\n",
        first.direction, first.cabinet, first.group, first.supervisor,
    );
    for row in rows {
        out.push_str(&format!("\n📅 {} | 🕒 {}", row.weekday, row.time));
    }
    Some(out)
}

// ── Pagination ──────────────────────────────────────────────────────

/// Split text into ordered pages of at most `page_size` characters.
/// Concatenating the pages reproduces the input exactly.
pub fn paginate(text: &str, page_size: usize) -> Vec<String> {
    if page_size == 0 {
        return vec![text.to_string()];
    }
    let mut pages = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        if count == page_size {
            pages.push(std::mem::take(&mut current));
            count = 0;
        }
        current.push(ch);
        count += 1;
    }
    if !current.is_empty() {
        pages.push(current);
    }
    pages
}
