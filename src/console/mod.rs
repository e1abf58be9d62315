//! Line-oriented console over the views.
//!
//! [`Shell::execute`] runs one parsed [`Command`] and returns the text to
//! print; [`Shell::run`] drives it from stdin and interrupts with a login
//! prompt when the session expires.

pub mod command;
pub mod render;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::app::AppContext;
use crate::cache::QueryFilter;
use crate::model::{Field, UserId};
use crate::session::{Credentials, SessionEvent};
use crate::ui::delete::{DeleteDialog, DeleteDialogState, DeleteOutcome};
use crate::ui::editor::{EditorMode, EditorStatus, SubmitOutcome, UserEditor};
use crate::ui::list::UserListView;
use crate::ui::login::LoginView;
use crate::ui::route::{guard, Route};

pub use command::{parse, Command, CommandError};

const PROMPT: &str = "> ";
const LOGIN_HINT: &str = "Please log in: login <email> <password>";

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quit: false,
        }
    }
}

pub struct Shell {
    ctx: AppContext,
    list: UserListView,
    editor: UserEditor,
    delete: DeleteDialog,
    login: LoginView,
}

impl Shell {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            list: ctx.user_list(),
            editor: ctx.user_editor(),
            delete: ctx.delete_dialog(),
            login: ctx.login_view(),
            ctx,
        }
    }

    fn route_for(&self, command: &Command) -> Route {
        match command {
            Command::Login { .. } | Command::Logout | Command::Help | Command::Quit => Route::Login,
            Command::Create { .. } => Route::NewUser,
            Command::Edit { id, .. } => Route::EditUser(id.clone()),
            Command::Retry | Command::Discard => match &self.editor.state().mode {
                EditorMode::Edit { id } => Route::EditUser(id.clone()),
                EditorMode::Create => Route::NewUser,
            },
            _ => Route::Users,
        }
    }

    /// Runs `command` and returns what to print, toasts included.
    pub async fn execute(&mut self, command: Command) -> Reply {
        let requested = self.route_for(&command);
        if guard(requested.clone(), &self.ctx.session) != requested {
            return Reply::text(LOGIN_HINT);
        }

        let mut reply = self.dispatch(command).await;
        let toasts: Vec<String> = self
            .ctx
            .notifier
            .drain()
            .iter()
            .map(render::toast)
            .collect();
        if !toasts.is_empty() {
            if !reply.text.is_empty() {
                reply.text.push('\n');
            }
            reply.text.push_str(&toasts.join("\n"));
        }
        reply
    }

    async fn dispatch(&mut self, command: Command) -> Reply {
        match command {
            Command::Login { email, password } => {
                // Both outcomes are reported by the login toast.
                if let Err(err) = self.login.submit(Credentials::new(email, password)).await {
                    tracing::debug!(error_type = err.error_type(), "Login command failed");
                }
                Reply::default()
            }
            Command::Logout => {
                let text = match self.ctx.session.sign_out() {
                    Ok(()) => "Signed out.".to_string(),
                    Err(err) => format!("Signed out, but the saved session remains: {}", err),
                };
                self.ctx.cache.invalidate(&QueryFilter::All);
                self.login.reset();
                Reply::text(text)
            }
            Command::List { search } => {
                let state = self.list.search(search.as_deref()).await;
                Reply::text(render::list(state))
            }
            Command::Refresh => {
                let state = self.list.refresh().await;
                Reply::text(render::list(state))
            }
            Command::Show { id } => self.show(&id).await,
            Command::Create { fields } => {
                self.editor.open_create();
                self.edit_and_submit(fields).await
            }
            Command::Edit { id, fields } => {
                let state = self.editor.open_edit(id).await;
                if state.status == EditorStatus::Failed || fields.is_empty() {
                    return Reply::text(render::editor(state));
                }
                self.edit_and_submit(fields).await
            }
            Command::Retry => {
                if self.editor.can_retry() {
                    let outcome = self.editor.retry().await;
                    return self.submit_reply(outcome);
                }
                if matches!(self.delete.state(), DeleteDialogState::Failed { .. }) {
                    return self.confirm_delete().await;
                }
                Reply::text("Nothing to retry.")
            }
            Command::Discard => {
                self.editor.discard();
                Reply::text(format!(
                    "Discarded local changes.\n{}",
                    render::editor(self.editor.state())
                ))
            }
            Command::Delete { id, confirmed } => {
                let name = self.display_name(&id).await;
                self.delete.request(id, name);
                if confirmed {
                    return self.confirm_delete().await;
                }
                Reply::text(render::delete_prompt(self.delete.state()))
            }
            Command::Confirm => self.confirm_delete().await,
            Command::Cancel => {
                self.delete.cancel();
                Reply::text("Cancelled.")
            }
            Command::Help => Reply::text(render::HELP),
            Command::Quit => Reply {
                text: String::new(),
                quit: true,
            },
        }
    }

    async fn show(&self, id: &UserId) -> Reply {
        let entry = self.ctx.queries.user(id).await;
        match (entry.user(), &entry.error) {
            (Some(user), None) => Reply::text(render::user(user)),
            (Some(user), Some(error)) => Reply::text(format!(
                "{}\n(showing last known data: {})",
                render::user(user),
                error
            )),
            (None, Some(error)) => Reply::text(format!("Error: {}", error)),
            (None, None) => Reply::text(format!("User {} not found.", id)),
        }
    }

    async fn edit_and_submit(&mut self, fields: Vec<(Field, String)>) -> Reply {
        for (field, value) in fields {
            self.editor.set_field(field, value);
        }
        let outcome = self.editor.submit().await;
        self.submit_reply(outcome)
    }

    fn submit_reply(&self, outcome: SubmitOutcome) -> Reply {
        match outcome {
            SubmitOutcome::Saved(output) => match output.user() {
                Some(user) => Reply::text(render::user(user)),
                None => Reply::default(),
            },
            SubmitOutcome::Invalid => Reply::text(render::editor(self.editor.state())),
            SubmitOutcome::Failed(_) => {
                let mut text = render::editor(self.editor.state());
                if self.editor.can_retry() {
                    text.push_str("\nType 'retry' to try again or 'discard' to drop the changes.");
                }
                Reply::text(text)
            }
        }
    }

    async fn confirm_delete(&mut self) -> Reply {
        match self.delete.confirm().await {
            DeleteOutcome::Ignored => Reply::text("Nothing to confirm."),
            DeleteOutcome::Deleted(_) => {
                let state = self.list.load().await;
                Reply::text(render::list(state))
            }
            DeleteOutcome::Failed(_) => Reply::text(render::delete_prompt(self.delete.state())),
        }
    }

    /// Name for the delete prompt: from the list if shown, else the cache.
    async fn display_name(&self, id: &UserId) -> String {
        if let Some(user) = self.list.state().find(id) {
            return user.full_name();
        }
        self.ctx
            .queries
            .user(id)
            .await
            .user()
            .map(|user| user.full_name())
            .unwrap_or_else(|| format!("user {}", id))
    }

    /// Reads commands from stdin until `quit`, EOF, or Ctrl-C.
    pub async fn run(mut self) -> std::io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        let mut greeting = String::from("User console. Type 'help' for commands.\n");
        if !self.ctx.session.is_authenticated() {
            greeting.push_str(LOGIN_HINT);
            greeting.push('\n');
        }
        stdout.write_all(greeting.as_bytes()).await?;

        let mut session_events = self.ctx.session.subscribe();
        session_events.borrow_and_update();
        let gc = self.ctx.cache.spawn_gc(self.ctx.config.cache.gc_interval());

        loop {
            stdout.write_all(PROMPT.as_bytes()).await?;
            stdout.flush().await?;

            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        break;
                    };
                    let reply = match parse(&line) {
                        Ok(None) => continue,
                        Ok(Some(command)) => self.execute(command).await,
                        Err(err) => Reply::text(err.to_string()),
                    };
                    if !reply.text.is_empty() {
                        stdout.write_all(reply.text.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                    }
                    if reply.quit {
                        break;
                    }
                }
                Ok(()) = session_events.changed() => {
                    if *session_events.borrow_and_update() == SessionEvent::Expired {
                        let text = format!("\nYour session has expired. {}\n", LOGIN_HINT);
                        stdout.write_all(text.as_bytes()).await?;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("Interrupted");
                    break;
                }
            }
        }

        gc.abort();
        stdout.write_all(b"Bye.\n").await?;
        stdout.flush().await
    }
}
