use crate::{
    error::{AppError, AppResult},
    models::{AccountUpdate, Session, Watchlist, WatchlistItem},
    services::providers::firebase::FirebaseClient,
};

/// Returns the session if one is present and live
///
/// Every account operation goes through here, so a missing session fails
/// with [`AppError::NotAuthenticated`] before anything is sent.
pub fn require_session(session: Option<&Session>) -> AppResult<&Session> {
    match session {
        Some(session) if session.is_live() => Ok(session),
        _ => Err(AppError::NotAuthenticated),
    }
}

pub async fn add_to_watchlist(
    client: &FirebaseClient,
    session: Option<&Session>,
    id: &str,
    item: &WatchlistItem,
) -> AppResult<()> {
    let session = require_session(session)?;
    client.add_to_watchlist(session, id, item).await
}

pub async fn get_watchlist(client: &FirebaseClient, session: Option<&Session>) -> AppResult<Watchlist> {
    let session = require_session(session)?;
    client.get_watchlist(session).await
}

pub async fn remove_from_watchlist(
    client: &FirebaseClient,
    session: Option<&Session>,
    id: &str,
) -> AppResult<()> {
    let session = require_session(session)?;
    client.remove_from_watchlist(session, id).await
}

pub async fn clear_watchlist(client: &FirebaseClient, session: Option<&Session>) -> AppResult<()> {
    let session = require_session(session)?;
    client.clear_watchlist(session).await
}

pub async fn update_account(
    client: &FirebaseClient,
    session: Option<&Session>,
    update: &AccountUpdate,
) -> AppResult<Session> {
    let session = require_session(session)?;
    client.update_account(session, update).await
}

pub async fn update_profile(
    client: &FirebaseClient,
    session: Option<&Session>,
    display_name: &str,
) -> AppResult<()> {
    let session = require_session(session)?;
    client.update_profile(session, display_name).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_session_none() {
        assert!(matches!(
            require_session(None),
            Err(AppError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_require_session_blank_token() {
        let session = Session::new("", "uid");
        assert!(matches!(
            require_session(Some(&session)),
            Err(AppError::NotAuthenticated)
        ));
    }

    #[test]
    fn test_require_session_live() {
        let session = Session::new("tok", "uid");
        assert_eq!(require_session(Some(&session)).unwrap().local_id, "uid");
    }
}
