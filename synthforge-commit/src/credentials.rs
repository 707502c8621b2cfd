//! Token-based auth for the shared state remote. GitHub (and compatible forges)
//! accept any non-empty username alongside a PAT/installation token as the password
//! over HTTPS.

use git2::{Cred, RemoteCallbacks};

pub fn callbacks_with_token(token: String) -> RemoteCallbacks<'static> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, _allowed| {
        Cred::userpass_plaintext(username_from_url.unwrap_or("x-access-token"), &token)
    });
    callbacks
}
