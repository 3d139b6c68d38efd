//! Chat command flow over the composed context and a SQLite store.

mod harness;

use std::sync::Arc;

use insiderwatch::adapter::outbound::feed::SimulatedTradeFeed;
use insiderwatch::application::vault::BROKER_PLATFORM;
use insiderwatch::domain::{ChatId, NewUser};
use insiderwatch::infrastructure::context::AppContext;
use insiderwatch::port::{CredentialStore, SessionStore, UserStore};
use insiderwatch::testkit::broker::ScriptedBroker;
use insiderwatch::testkit::config::config_from_pairs;
use insiderwatch::testkit::notifier::RecordingNotifier;

use harness::temp_db::TempDb;

const CHAT: ChatId = ChatId::new(777);

fn contact() -> NewUser {
    NewUser::new(CHAT).with_names("Dana", None)
}

fn context(db: &TempDb, broker: &Arc<ScriptedBroker>) -> AppContext {
    let path = db.path().display().to_string();
    let config = config_from_pairs(&[("DATABASE_URL", path.as_str())]);
    AppContext::with_parts(config, db.store(), broker.clone()).expect("context")
}

async fn say(ctx: &AppContext, text: &str) -> String {
    ctx.control()
        .respond(contact(), text)
        .await
        .unwrap_or_else(|| panic!("no reply to {text}"))
}

#[tokio::test]
async fn connect_portfolio_disconnect_round() {
    let db = TempDb::create("bot-flow");
    let broker = Arc::new(ScriptedBroker::accepting());
    let ctx = context(&db, &broker);

    assert!(say(&ctx, "/portfolio").await.contains("not enabled"));
    assert!(say(&ctx, "/start")
        .await
        .starts_with("🎉 Welcome to Insider Watch, Dana!"));

    let reply = say(&ctx, "/connect dana hunter2").await;
    assert_eq!(reply, "✅ Brokerage account connected.");
    assert!(ctx.client.is_connected());

    let store = db.store();
    let user = store.get_user_by_chat_id(CHAT).await.unwrap().unwrap();
    let session = store.get_active_session(user.id).await.unwrap().unwrap();
    assert!(session.expires_at.is_some());

    let sealed = store
        .get_credentials(user.id, BROKER_PLATFORM)
        .await
        .unwrap()
        .unwrap();
    assert!(!sealed.contains("hunter2"));
    let opened = ctx.vault.load(user.id).await.unwrap().unwrap();
    assert_eq!(opened.username, "dana");
    assert_eq!(opened.password, "hunter2");

    assert!(!say(&ctx, "/portfolio").await.starts_with('❌'));
    assert!(!say(&ctx, "/funds").await.starts_with('❌'));
    assert_eq!(broker.portfolio_calls(), 1);

    let status = say(&ctx, "/status").await;
    assert!(status.contains("Active Users: 1"));
    assert!(status.contains("Brokerage Connection: Connected"));

    assert_eq!(
        say(&ctx, "/disconnect").await,
        "✅ Successfully disconnected your brokerage account."
    );
    assert!(!ctx.client.is_connected());
    assert!(store.get_active_session(user.id).await.unwrap().is_none());
    assert!(say(&ctx, "/disconnect").await.starts_with("⚠️"));

    assert!(say(&ctx, "/start").await.starts_with("🎉 Welcome back, Dana!"));
}

#[tokio::test]
async fn plain_text_gets_no_reply_and_bad_commands_get_help() {
    let db = TempDb::create("bot-parse");
    let broker = Arc::new(ScriptedBroker::accepting());
    let ctx = context(&db, &broker);

    assert!(ctx.control().respond(contact(), "hello").await.is_none());
    let reply = say(&ctx, "/connect onlyuser").await;
    assert!(reply.starts_with("Invalid command"));
    assert!(reply.contains("/connect <username> <password>"));
    assert_eq!(broker.login_calls(), 0);
}

#[tokio::test]
async fn trade_check_alerts_registered_users_once() {
    let db = TempDb::create("bot-alerts");
    let broker = Arc::new(ScriptedBroker::accepting());
    let ctx = context(&db, &broker);
    say(&ctx, "/start").await;

    let notifier = Arc::new(RecordingNotifier::default());
    let scheduler = ctx.scheduler(Arc::new(SimulatedTradeFeed::new()), notifier.clone());

    let first = scheduler.check_trades().await.unwrap();
    assert!(first > 0);
    assert_eq!(notifier.sent_to(CHAT).len(), first);
    assert_eq!(scheduler.check_trades().await.unwrap(), 0);
    assert_eq!(notifier.sent().len(), first);

    let status = say(&ctx, "/status").await;
    assert!(!status.contains("Last Trade Check: Never"));
}
