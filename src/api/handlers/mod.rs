pub mod health;
pub use self::health::health;

pub mod login;
pub use self::login::login;

pub mod sessions;
pub use self::sessions::block_session;

pub mod tokens;
pub use self::tokens::renew_access_token;

pub mod users;
pub use self::users::{create_user, me};
