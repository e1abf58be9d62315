mod common;

use common::{context, context_with, sample_users, FakeGateway, Op, PASSWORD};
use user_console::console::{parse, Shell};
use user_console::session::SessionStore;
use user_console::ui::drafts::DraftStore;

async fn run(shell: &mut Shell, line: &str) -> String {
    let command = parse(line)
        .unwrap_or_else(|e| panic!("parse '{}': {}", line, e))
        .expect("non-empty line");
    shell.execute(command).await.text
}

#[tokio::test]
async fn test_signed_out_shell_asks_for_login() {
    let gateway = FakeGateway::with_users(sample_users());
    let ctx = context_with(gateway.clone(), SessionStore::in_memory(), DraftStore::disabled());
    let mut shell = Shell::new(ctx);

    let text = run(&mut shell, "list").await;
    assert_eq!(text, "Please log in: login <email> <password>");
    assert_eq!(gateway.calls(Op::List), 0);

    let text = run(&mut shell, "help").await;
    assert!(text.starts_with("Commands:"));

    let text = run(&mut shell, "login ada@example.com wrong").await;
    assert_eq!(text, "✗ Invalid Credentials!");

    let text = run(&mut shell, &format!("login ada@example.com {}", PASSWORD)).await;
    assert_eq!(text, "✓ Login successful!");

    let text = run(&mut shell, "ls").await;
    assert!(text.starts_with("Users:"));
    assert!(text.contains("Grace Hopper"));
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway));

    run(&mut shell, "list").await;
    assert_eq!(run(&mut shell, "logout").await, "Signed out.");
    assert_eq!(
        run(&mut shell, "show 7").await,
        "Please log in: login <email> <password>"
    );
}

/// A session cut short by a 401 leaves no fresh data behind for the next login.
#[tokio::test]
async fn test_relogin_after_expiry_refetches() {
    let gateway = FakeGateway::with_users(sample_users());
    let session = common::signed_in_session();
    let ctx = context_with(gateway.clone(), session.clone(), DraftStore::disabled());
    let mut shell = Shell::new(ctx);

    run(&mut shell, "list").await;
    assert_eq!(gateway.calls(Op::List), 1);

    session.invalidate();
    assert_eq!(
        run(&mut shell, "list").await,
        "Please log in: login <email> <password>"
    );

    let text = run(&mut shell, &format!("login ada@example.com {}", PASSWORD)).await;
    assert_eq!(text, "✓ Login successful!");
    let text = run(&mut shell, "list").await;
    assert!(text.contains("Grace Hopper"));
    assert_eq!(gateway.calls(Op::List), 2);
}

#[tokio::test]
async fn test_list_search_and_show() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway));

    let text = run(&mut shell, "list turing").await;
    assert!(text.starts_with("Users matching 'turing':"));
    assert!(text.contains("Alan Turing"));
    assert!(!text.contains("Ada Lovelace"));

    let text = run(&mut shell, "list nobody").await;
    assert!(text.contains("No users found."));

    let text = run(&mut shell, "show 42").await;
    assert!(text.starts_with("[AT] Alan Turing"));
    assert!(text.contains("status:        active"));

    let text = run(&mut shell, "show 999").await;
    assert!(text.starts_with("Error: "));
}

#[tokio::test]
async fn test_delete_with_prompt() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway.clone()));
    run(&mut shell, "list").await;

    let text = run(&mut shell, "delete 7").await;
    assert_eq!(text, "Delete Grace Hopper? This cannot be undone. [yes/no]");
    assert_eq!(run(&mut shell, "no").await, "Cancelled.");
    assert_eq!(gateway.calls(Op::Delete), 0);

    run(&mut shell, "delete 7").await;
    let text = run(&mut shell, "yes").await;
    assert!(!text.contains("Grace Hopper"));
    assert!(text.contains("Alan Turing"));
    assert!(text.ends_with("✓ User deleted successfully"));
}

#[tokio::test]
async fn test_delete_confirmed_inline() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway.clone()));

    let text = run(&mut shell, "delete 7 --yes").await;
    assert!(!text.contains("Grace Hopper"));
    assert!(text.ends_with("✓ User deleted successfully"));
    assert_eq!(gateway.calls(Op::Delete), 1);
    assert_eq!(run(&mut shell, "yes").await, "Nothing to confirm.");
}

#[tokio::test]
async fn test_failed_delete_can_be_retried() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway.clone()));
    run(&mut shell, "list").await;

    gateway.fail_next_with(Op::Delete, user_console::gateway::ErrorKind::Network);
    let text = run(&mut shell, "delete 7 --yes").await;
    assert!(text.starts_with("Failed to delete Grace Hopper:"));

    let text = run(&mut shell, "retry").await;
    assert!(text.ends_with("✓ User deleted successfully"));
    assert_eq!(gateway.calls(Op::Delete), 2);
}

#[tokio::test]
async fn test_edit_and_create() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway.clone()));

    let text = run(&mut shell, "edit 42").await;
    assert!(text.starts_with("Edit user 42"));
    assert!(text.contains("first   Alan"));

    let text = run(&mut shell, "edit 42 status=locked").await;
    assert!(text.contains("status:        locked"));
    assert!(text.ends_with("✓ User updated successfully"));

    let text = run(&mut shell, r#"create first="Ada Mae" email=bad dob=2000-01-01"#).await;
    assert!(text.starts_with("New user (unsaved changes)"));
    assert!(text.contains("first   Ada Mae"));
    assert!(text.contains("<- Invalid email format"));
    assert_eq!(gateway.calls(Op::Create), 0);

    let text = run(&mut shell, "create first=Ada email=ada2@example.com dob=2000-01-01").await;
    assert!(text.starts_with("[A] Ada"));
    assert!(text.ends_with("✓ User created successfully"));
}

#[tokio::test]
async fn test_edit_network_failure_offers_retry() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway.clone()));

    gateway.fail_next_with(Op::Update, user_console::gateway::ErrorKind::Network);
    let text = run(&mut shell, "edit 1 last=Byron").await;
    assert!(text.contains("Type 'retry' to try again"));

    let text = run(&mut shell, "retry").await;
    assert!(text.starts_with("[AB] Ada Byron"));
    assert_eq!(gateway.calls(Op::Update), 2);

    assert_eq!(run(&mut shell, "retry").await, "Nothing to retry.");
}

#[tokio::test]
async fn test_quit() {
    let gateway = FakeGateway::with_users(sample_users());
    let mut shell = Shell::new(context(gateway));
    let command = parse("exit").unwrap().unwrap();
    assert!(shell.execute(command).await.quit);
}
