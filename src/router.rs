//! Conversation router — dispatches inbound events against the dialog state.
//!
//! `handle` is the single transport-agnostic entry point: any delivery loop
//! (long-poll, webhook, test harness) feeds it one `InboundEvent` and sends
//! back the returned replies in order. Handlers mutate the caller's Session
//! and consult the stores; all user-visible copy comes from `render`.

use std::sync::Arc;

use crate::auth::{CallerIdentity, CredentialStore, RegisterOutcome, VerifyOutcome};
use crate::catalog::ScheduleCatalog;
use crate::channels::{InboundEvent, Reply};
use crate::render;
use crate::search::{self, Resolution};
use crate::session::{DialogState, Session, SessionMap};
use crate::store::{CredentialRepository, DirectoryRepository, ScheduleSource};

/// Enforced by the registration flow, not by the credential store.
const MIN_PASSWORD_LEN: usize = 4;

pub struct ConversationRouter {
    credentials: CredentialStore,
    schedule: Arc<dyn ScheduleSource>,
    directory: Arc<dyn DirectoryRepository>,
    sessions: SessionMap,
    page_size: usize,
}

impl ConversationRouter {
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        schedule: Arc<dyn ScheduleSource>,
        directory: Arc<dyn DirectoryRepository>,
        page_size: usize,
    ) -> Self {
        Self {
            credentials: CredentialStore::new(credentials),
            schedule,
            directory,
            sessions: SessionMap::new(),
            page_size,
        }
    }

    /// Process one inbound event to completion and return the replies.
    ///
    /// The session map lock is held for the whole call, so successive events
    /// for the same identity can never interleave session mutation.
    pub async fn handle(&self, event: &InboundEvent) -> Vec<Reply> {
        let mut sessions = self.sessions.lock().await;

        // First contact: create the session and greet; the text is ignored.
        if !sessions.contains_key(&event.identity) {
            let (session, replies) = self.first_contact(event).await;
            sessions.insert(event.identity.clone(), session);
            return replies;
        }
        let Some(session) = sessions.get_mut(&event.identity) else {
            return Vec::new();
        };

        if session.state.is_terminal() {
            return vec![Reply::plain(render::source_unavailable_text())];
        }

        // Unauthorized input landing on an authenticated-only state is
        // redirected to the auth menu before any handler runs.
        if session.state.requires_auth() && !session.authorized {
            session.enter(DialogState::AuthChoice);
            return auth_replies();
        }

        let text = event.text.trim().to_string();

        // "Back" routes to the fixed predecessor of the current state.
        if text == render::BACK && session.state != DialogState::AuthChoice {
            let target = session.state.back_target();
            session.enter(target);
            return match target {
                DialogState::AuthChoice => auth_replies(),
                _ => vec![main_menu_reply()],
            };
        }

        match session.state {
            DialogState::AuthChoice => self.on_auth_choice(session, &text),
            DialogState::AuthLoginInput => on_auth_login(session, &text),
            DialogState::AuthPasswordInput => self.on_auth_password(session, event, &text).await,
            DialogState::RegisterLoginInput => self.on_register_login(session, &text).await,
            DialogState::RegisterPasswordInput => on_register_password(session, &text),
            DialogState::RegisterPasswordConfirm => {
                self.on_register_confirm(session, event, &text).await
            }
            DialogState::MainMenu => self.on_main_menu(session, event, &text).await,
            DialogState::DirectionSelect => self.on_direction_select(session, &text).await,
            DialogState::GroupSelect => self.on_group_select(session, &text).await,
            DialogState::SearchFioInput => self.on_search_fio(session, &text).await,
            DialogState::End => vec![Reply::plain(render::source_unavailable_text())],
        }
    }

    /// Current state of an identity's session, if one exists.
    pub async fn state_of(&self, identity: &str) -> Option<DialogState> {
        self.sessions.lock().await.get(identity).map(|s| s.state)
    }

    async fn first_contact(&self, event: &InboundEvent) -> (Session, Vec<Reply>) {
        // Without a schedule source the bot has nothing to offer.
        if let Err(e) = self.schedule.load().await {
            tracing::error!(error = %e, identity = %event.identity, "schedule source unavailable");
            return (
                Session::new(DialogState::End, false),
                vec![Reply::plain(render::source_unavailable_text())],
            );
        }

        if self.credentials.find_by_identity(&event.identity).await.is_some() {
            (Session::new(DialogState::MainMenu, true), vec![main_menu_reply()])
        } else {
            (Session::new(DialogState::AuthChoice, false), auth_replies())
        }
    }

    /// Load the schedule snapshot, or end the conversation if the source is
    /// gone.
    async fn load_catalog(&self, session: &mut Session) -> Result<ScheduleCatalog, Vec<Reply>> {
        match self.schedule.load().await {
            Ok(rows) => Ok(ScheduleCatalog::new(rows)),
            Err(e) => {
                tracing::error!(error = %e, "schedule source unavailable mid-conversation");
                session.enter(DialogState::End);
                Err(vec![Reply::plain(render::source_unavailable_text())])
            }
        }
    }

    // ── Auth flow ───────────────────────────────────────────────────

    fn on_auth_choice(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        match text {
            render::LOGIN => {
                session.enter(DialogState::AuthLoginInput);
                vec![Reply::new("Enter your login:", render::back_keyboard())]
            }
            render::REGISTER => {
                session.enter(DialogState::RegisterLoginInput);
                vec![Reply::new(
                    "Choose a login to sign up:",
                    render::back_keyboard(),
                )]
            }
            render::ABOUT => vec![Reply::new(render::about_text(), render::auth_keyboard())],
            _ => auth_replies(),
        }
    }

    async fn on_auth_password(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        text: &str,
    ) -> Vec<Reply> {
        let Some(login) = session.pending_login.clone() else {
            // Staged login lost; restart the flow.
            session.enter(DialogState::AuthChoice);
            return auth_replies();
        };
        match self.credentials.verify(&login, text, &caller(event)).await {
            VerifyOutcome::Verified(_) => {
                session.authorized = true;
                session.enter(DialogState::MainMenu);
                vec![Reply::plain("✅ You are logged in!"), main_menu_reply()]
            }
            // Login stays staged; the password is never kept on failure.
            VerifyOutcome::NotFound => vec![Reply::new(
                "❌ Wrong login or password. Try again or sign up.",
                render::back_keyboard(),
            )],
        }
    }

    async fn on_register_login(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        if self.credentials.login_taken(text).await {
            return vec![Reply::new(
                "❌ This login is taken. Pick another one:",
                render::back_keyboard(),
            )];
        }
        session.pending_login = Some(text.to_string());
        session.enter(DialogState::RegisterPasswordInput);
        vec![Reply::new(
            format!("Create a password (at least {MIN_PASSWORD_LEN} characters):"),
            render::back_keyboard(),
        )]
    }

    async fn on_register_confirm(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        text: &str,
    ) -> Vec<Reply> {
        let (Some(login), Some(password)) = (
            session.pending_login.clone(),
            session.pending_password.clone(),
        ) else {
            session.enter(DialogState::AuthChoice);
            return auth_replies();
        };
        if text != password {
            session.enter(DialogState::RegisterPasswordInput);
            return vec![Reply::new(
                "❌ Passwords do not match. Try again:",
                render::back_keyboard(),
            )];
        }
        match self
            .credentials
            .register(&login, &password, &caller(event))
            .await
        {
            Ok(RegisterOutcome::Created(_)) => {
                session.authorized = true;
                session.enter(DialogState::MainMenu);
                vec![
                    Reply::plain("🎉 Registration complete! You are logged in."),
                    main_menu_reply(),
                ]
            }
            // Raced by another registration of the same login.
            Ok(RegisterOutcome::AlreadyExists) => {
                session.enter(DialogState::RegisterLoginInput);
                vec![Reply::new(
                    "❌ This login is taken. Pick another one:",
                    render::back_keyboard(),
                )]
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to persist registration");
                vec![Reply::new(
                    "⚠️ Could not save your registration. Repeat the password to retry:",
                    render::back_keyboard(),
                )]
            }
        }
    }

    // ── Menus ───────────────────────────────────────────────────────

    async fn on_main_menu(
        &self,
        session: &mut Session,
        event: &InboundEvent,
        text: &str,
    ) -> Vec<Reply> {
        match text {
            render::PICK_DIRECTION => {
                let catalog = match self.load_catalog(session).await {
                    Ok(c) => c,
                    Err(replies) => return replies,
                };
                let directions = catalog.directions();
                if directions.is_empty() {
                    return vec![Reply::new(
                        "No directions found in the schedule",
                        render::main_menu_keyboard(),
                    )];
                }
                session.enter(DialogState::DirectionSelect);
                vec![Reply::new(
                    "Choose a direction:",
                    render::direction_keyboard(&directions),
                )]
            }
            render::SEARCH_FIO => {
                session.enter(DialogState::SearchFioInput);
                vec![Reply::new(
                    "Enter a full name to find the group:",
                    render::back_keyboard(),
                )]
            }
            render::FULL_SCHEDULE => {
                let catalog = match self.load_catalog(session).await {
                    Ok(c) => c,
                    Err(replies) => return replies,
                };
                let listing = render::full_schedule(catalog.all_rows());
                self.paged(listing, main_menu_reply())
            }
            render::DEVELOPER => {
                vec![Reply::new(render::developer_text(), render::back_keyboard())]
            }
            render::PROFILE => match self.credentials.find_by_identity(&event.identity).await {
                Some(credential) => vec![Reply::new(
                    render::profile_text(&credential),
                    render::back_keyboard(),
                )],
                None => {
                    // The login was rebound to another client identity.
                    tracing::warn!(identity = %event.identity, "authorized session without credential");
                    session.authorized = false;
                    session.enter(DialogState::AuthChoice);
                    auth_replies()
                }
            },
            _ => vec![main_menu_reply()],
        }
    }

    async fn on_direction_select(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let catalog = match self.load_catalog(session).await {
            Ok(c) => c,
            Err(replies) => return replies,
        };
        session.selected_direction = Some(text.to_string());
        session.enter(DialogState::GroupSelect);
        let groups = catalog.groups(Some(text));
        vec![Reply::new(
            format!("Direction selected: {text}\nChoose a group:"),
            render::group_keyboard(&groups),
        )]
    }

    async fn on_group_select(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let catalog = match self.load_catalog(session).await {
            Ok(c) => c,
            Err(replies) => return replies,
        };

        if text == render::ALL_GROUPS {
            let Some(direction) = session.selected_direction.clone() else {
                // Reached via search disambiguation; there is no direction.
                session.enter(DialogState::MainMenu);
                return vec![Reply::plain("Direction is not selected."), main_menu_reply()];
            };
            let rows = catalog.rows_for_direction(&direction);
            let listing = render::direction_schedule(&direction, &rows);
            session.enter(DialogState::MainMenu);
            return self.paged(listing, main_menu_reply());
        }

        let rows = catalog.rows_for_group(text);
        session.enter(DialogState::MainMenu);
        match render::group_schedule(&rows) {
            Some(block) => self.paged(block, main_menu_reply()),
            None => vec![
                Reply::plain(format!("No classes found for group {text}")),
                main_menu_reply(),
            ],
        }
    }

    // ── Search ──────────────────────────────────────────────────────

    async fn on_search_fio(&self, session: &mut Session, text: &str) -> Vec<Reply> {
        let catalog = match self.load_catalog(session).await {
            Ok(c) => c,
            Err(replies) => return replies,
        };
        let directory = match self.directory.load().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(error = %e, "directory table unreadable, searching supervisors only");
                Vec::new()
            }
        };

        match search::resolve(text, &directory, &catalog) {
            Resolution::NotFound => vec![Reply::new(
                format!(
                    "'{text}' was not found. Try entering the full name, \
                     or contact an administrator."
                ),
                render::back_keyboard(),
            )],
            Resolution::Unique(group) => {
                let rows = catalog.rows_for_group(&group);
                session.enter(DialogState::MainMenu);
                match render::search_found(&rows) {
                    Some(block) => vec![
                        Reply::new(block, render::back_keyboard()),
                        main_menu_reply(),
                    ],
                    None => vec![
                        Reply::plain(format!("No classes found for group {group}")),
                        main_menu_reply(),
                    ],
                }
            }
            Resolution::Ambiguous(groups) => {
                session.enter(DialogState::GroupSelect);
                vec![Reply::new(
                    format!("Several groups match '{text}'.\nChoose your group:"),
                    render::group_choice_keyboard(&groups),
                )]
            }
        }
    }

    /// Split long output into ordered pages, each carrying the back option,
    /// followed by the trailing reply.
    fn paged(&self, text: String, tail: Reply) -> Vec<Reply> {
        let mut replies: Vec<Reply> = render::paginate(&text, self.page_size)
            .into_iter()
            .map(|page| Reply::new(page, render::back_keyboard()))
            .collect();
        replies.push(tail);
        replies
    }
}

fn caller(event: &InboundEvent) -> CallerIdentity {
    CallerIdentity {
        identity: event.identity.clone(),
        handle: event.handle.clone(),
        display_name: event.display_name.clone(),
    }
}

fn on_auth_login(session: &mut Session, text: &str) -> Vec<Reply> {
    session.pending_login = Some(text.to_string());
    session.enter(DialogState::AuthPasswordInput);
    vec![Reply::new("Enter your password:", render::back_keyboard())]
}

fn on_register_password(session: &mut Session, text: &str) -> Vec<Reply> {
    if text.chars().count() < MIN_PASSWORD_LEN {
        return vec![Reply::new(
            format!("❌ The password must be at least {MIN_PASSWORD_LEN} characters. Try again:"),
            render::back_keyboard(),
        )];
    }
    session.pending_password = Some(text.to_string());
    session.enter(DialogState::RegisterPasswordConfirm);
    vec![Reply::new(
        "Repeat the password to confirm:",
        render::back_keyboard(),
    )]
}

fn auth_replies() -> Vec<Reply> {
    vec![Reply::new(render::auth_prompt(), render::auth_keyboard())]
}

fn main_menu_reply() -> Reply {
    Reply::new(render::main_menu_prompt(), render::main_menu_keyboard())
}
