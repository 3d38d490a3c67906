use crate::{BooruClient, BooruError};
use common::{AuthStatus, LoginResponse, PasswordRequest};

pub struct AuthApi<'a> {
    client: &'a BooruClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) const fn new(client: &'a BooruClient) -> Self {
        Self { client }
    }

    pub fn status(&self) -> Result<AuthStatus, BooruError> {
        self.client.get("auth/status")
    }

    /// Logs in and installs the returned token on the client.
    pub fn login(&self, password: &str) -> Result<LoginResponse, BooruError> {
        let response: LoginResponse = self
            .client
            .post("auth/login", Some(&PasswordRequest::new(password)))?;
        self.client.set_token(&response.token);
        Ok(response)
    }

    /// First-time password setup; rejected once the system is initialized.
    pub fn setup(&self, password: &str) -> Result<(), BooruError> {
        self.client
            .post_unit("auth/setup", Some(&PasswordRequest::new(password)))
    }

    pub fn update_password(&self, password: &str) -> Result<(), BooruError> {
        self.client
            .post_unit("auth/password", Some(&PasswordRequest::new(password)))
    }
}
