//! Credential locator contract.
//!
//! Pure seam definition: no implementation ships with the library.

use std::error::Error;

/// Resolves principals either by credentials or by identifier.
pub trait CredentialLocator {
    type Principal;
    type Credentials: ?Sized;
    type Identifier: ?Sized;
    type Error: Error;

    /// Returns the principal matching `credentials`.
    fn validate(&self, credentials: &Self::Credentials) -> Result<Self::Principal, Self::Error>;

    /// Returns the principal identified by `identifier`.
    fn locate(&self, identifier: &Self::Identifier) -> Result<Self::Principal, Self::Error>;
}
