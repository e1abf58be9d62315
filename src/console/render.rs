//! Plain-text rendering of view state.

use std::fmt::Write;

use crate::model::{Field, User};
use crate::ui::delete::DeleteDialogState;
use crate::ui::editor::{EditorMode, EditorState, EditorStatus};
use crate::ui::list::UserListState;
use crate::ui::notify::{Toast, ToastLevel};

pub const HELP: &str = "\
Commands:
  login <email> <password>      sign in
  logout                        sign out
  list [search]                 list users, optionally filtered
  refresh                       reload the current list
  show <id>                     show one user
  create key=value...           create a user
  edit <id> [key=value...]      edit a user (no fields: show the form)
  retry                         resend the last failed save or delete
  discard                       drop unsaved edits
  delete <id> [--yes]           delete a user (asks unless --yes)
  yes | no                      answer a delete prompt
  help                          this text
  quit                          leave

Fields: first, last, email, status (active|locked), dob (YYYY-MM-DD).
Quote values with spaces: first=\"Ada Mae\"";

pub fn list(state: &UserListState) -> String {
    let mut out = String::new();
    match &state.search {
        Some(search) => {
            let _ = writeln!(out, "Users matching '{}':", search);
        }
        None => {
            let _ = writeln!(out, "Users:");
        }
    }

    if state.users.is_empty() {
        let _ = writeln!(
            out,
            "  {}",
            if state.is_loading() {
                "Loading..."
            } else {
                "No users found."
            }
        );
    }
    for user in &state.users {
        let _ = writeln!(
            out,
            "  {:<10} {:<28} {:<32} {}",
            user.id.as_str(),
            user.full_name(),
            user.email,
            user.status
        );
    }

    if let Some(error) = &state.error {
        let _ = writeln!(out, "Error: {} (type 'refresh' to retry)", error);
    }
    if state.stale {
        let _ = writeln!(out, "(list is outdated; 'refresh' to reload)");
    }
    out.trim_end().to_string()
}

pub fn user(user: &User) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{}] {}", user.initials(), user.full_name());
    let _ = writeln!(out, "  id:            {}", user.id);
    let _ = writeln!(out, "  email:         {}", user.email);
    let _ = writeln!(out, "  status:        {}", user.status);
    let _ = write!(out, "  date of birth: {}", user.date_of_birth);
    out
}

pub fn editor(state: &EditorState) -> String {
    let mut out = String::new();
    let title = match &state.mode {
        EditorMode::Create => "New user".to_string(),
        EditorMode::Edit { id } => format!("Edit user {}", id),
    };
    let suffix = match state.status {
        EditorStatus::Loading => " (loading)",
        EditorStatus::Submitting => " (saving)",
        EditorStatus::Saved => " (saved)",
        _ if state.dirty => " (unsaved changes)",
        _ => "",
    };
    let _ = writeln!(out, "{}{}", title, suffix);

    if let Some(banner) = &state.banner {
        let _ = writeln!(out, "! {}", banner);
    }
    for field in Field::all() {
        let _ = write!(
            out,
            "  {:<7} {}",
            field.short_name(),
            state.form.get(*field)
        );
        if let Some(message) = state.error_for(*field) {
            let _ = write!(out, "   <- {}", message);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

pub fn delete_prompt(state: &DeleteDialogState) -> String {
    match state {
        DeleteDialogState::Hidden => String::new(),
        DeleteDialogState::Confirming { name, .. } => {
            format!("Delete {}? This cannot be undone. [yes/no]", name)
        }
        DeleteDialogState::Deleting { name, .. } => format!("Deleting {}...", name),
        DeleteDialogState::Failed { name, error, .. } => format!(
            "Failed to delete {}: {}\nType 'yes' to try again or 'no' to cancel.",
            name, error
        ),
    }
}

pub fn toast(toast: &Toast) -> String {
    let marker = match toast.level {
        ToastLevel::Success => "✓",
        ToastLevel::Error => "✗",
        ToastLevel::Info => "•",
    };
    format!("{} {}", marker, toast.message)
}
