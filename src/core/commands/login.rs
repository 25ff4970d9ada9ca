// src/core/commands/login.rs

use super::{CMD_LOGIN, CommandHandler};
use crate::core::protocol::{ApiError, Request, Response};
use crate::core::storage::{DataStore, PERSON_PASSWORD_FIELD};
use async_trait::async_trait;
use tracing::{debug, warn};

/// `login`: looks up the person owning `people_password`.
///
/// On a match the person's fields are merged into the envelope. Every request
/// is checked on its own; nothing is remembered for the session.
#[derive(Debug, Clone, Default)]
pub struct Login;

#[async_trait]
impl CommandHandler for Login {
    fn name(&self) -> &'static str {
        CMD_LOGIN
    }

    async fn execute(&self, request: &Request, store: &dyn DataStore) -> Response {
        let password = request.str_field(PERSON_PASSWORD_FIELD);

        match store.get_person(password).await {
            Ok(Some(person)) => Response::success(CMD_LOGIN).merge(person),
            Ok(None) => {
                debug!("Login rejected: no person matches the supplied password.");
                Response::failure(CMD_LOGIN, ApiError::Login)
            }
            Err(e) => {
                warn!("Login lookup failed: {}", e);
                Response::failure(CMD_LOGIN, ApiError::Database)
            }
        }
    }
}
