#![allow(dead_code)]

pub mod temp_db;

use insiderwatch::domain::{ChatId, NewUser, User};
use insiderwatch::port::UserStore;

/// Register a user with a first name derived from the chat id.
pub async fn register<S: UserStore + ?Sized>(store: &S, chat_id: i64) -> User {
    store
        .create_user(NewUser::new(ChatId::new(chat_id)).with_names(format!("user{chat_id}"), None))
        .await
        .expect("create user")
}
