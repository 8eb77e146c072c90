//! Authentication, profile and saved addresses.

use reqwest::Method;
use serde_json::Map;
use tracing::{info, instrument};

use autopecas_core::AddressId;

use crate::client::{Access, ApiClient};
use crate::error::Result;
use crate::types::{
    AddressInput, AuthResponse, LoginRequest, PasswordChange, ProfileUpdate, RegisterRequest,
    User, UserAddress,
};

impl ApiClient {
    /// Create an account and keep its token in the session.
    ///
    /// # Errors
    ///
    /// Returns error if registration is rejected or the token cannot be
    /// stored.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<User> {
        let auth: AuthResponse = self
            .post(Access::Public, "/auth/register", request)
            .await?;
        self.set_token(auth.token)?;
        info!(user_id = %auth.user.id, "Registered");
        Ok(auth.user)
    }

    /// Log in and keep the returned token in the session.
    ///
    /// # Errors
    ///
    /// Returns error if the credentials are rejected or the token cannot be
    /// stored.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<User> {
        let auth: AuthResponse = self.post(Access::Public, "/auth/login", request).await?;
        self.set_token(auth.token)?;
        info!(user_id = %auth.user.id, "Logged in");
        Ok(auth.user)
    }

    /// Forget the session token. Nothing is sent to the backend.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be cleared.
    #[instrument(skip(self))]
    pub fn logout(&self) -> Result<()> {
        self.remove_token()
    }

    /// The signed-in account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` with status 401 when not signed in.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User> {
        self.get(Access::Authenticated, "/auth/profile").await
    }

    /// Change name, email or phone.
    ///
    /// # Errors
    ///
    /// Returns error if the update is rejected.
    #[instrument(skip(self))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.put(Access::Authenticated, "/auth/profile", update).await
    }

    /// Replace the account password.
    ///
    /// # Errors
    ///
    /// Returns error if the current password is wrong or the new one is
    /// rejected.
    #[instrument(skip(self, change))]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<()> {
        self.send_unit(Access::Authenticated, Method::PUT, "/auth/password", change)
            .await
    }

    /// Saved addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<Vec<UserAddress>> {
        let mut addresses: Vec<UserAddress> =
            self.get(Access::Authenticated, "/users/addresses").await?;
        addresses.sort_by_key(|address| !address.is_default);
        Ok(addresses)
    }

    /// Save a new address.
    ///
    /// # Errors
    ///
    /// Returns error if the address is rejected.
    #[instrument(skip(self, input))]
    pub async fn create_address(&self, input: &AddressInput) -> Result<UserAddress> {
        self.post(Access::Authenticated, "/users/addresses", input)
            .await
    }

    /// Replace a saved address.
    ///
    /// # Errors
    ///
    /// Returns error if the address is not found or rejected.
    #[instrument(skip(self, input), fields(address_id = %id))]
    pub async fn update_address(&self, id: AddressId, input: &AddressInput) -> Result<UserAddress> {
        self.put(Access::Authenticated, &format!("/users/addresses/{id}"), input)
            .await
    }

    /// Delete a saved address.
    ///
    /// # Errors
    ///
    /// Returns error if the address is not found.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn delete_address(&self, id: AddressId) -> Result<()> {
        self.delete(Access::Authenticated, &format!("/users/addresses/{id}"))
            .await
    }

    /// Make `id` the default address; the backend unsets the previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the address is not found.
    #[instrument(skip(self), fields(address_id = %id))]
    pub async fn set_default_address(&self, id: AddressId) -> Result<UserAddress> {
        self.patch(
            Access::Authenticated,
            &format!("/users/addresses/{id}/default"),
            &Map::new(),
        )
        .await
    }
}
