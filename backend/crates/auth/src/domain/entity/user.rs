//! User Entity
//!
//! The only user data the auth flows need: identity and stored credentials.

use platform::password::HashedPassword;

use crate::domain::value_object::email::Email;

/// ログイン照合用のユーザー資格情報
///
/// `user_id` は `users.id` の文字列表現。トークンやセッションキーには
/// この文字列をそのまま使う。
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: String,
    pub email: Email,
    pub password_hash: HashedPassword,
}
