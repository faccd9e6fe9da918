use lazier_core::CredentialLocator;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
struct User {
    id: String,
    display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Login {
    username: String,
    password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UserLookupError {
    BadCredentials,
    UnknownUser(String),
}

impl Display for UserLookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadCredentials => write!(f, "credentials rejected"),
            Self::UnknownUser(id) => write!(f, "user not found: {id}"),
        }
    }
}

impl Error for UserLookupError {}

#[derive(Default)]
struct InMemoryUsers {
    users: BTreeMap<String, (String, User)>,
}

impl InMemoryUsers {
    fn with_user(mut self, id: &str, password: &str, display_name: &str) -> Self {
        self.users.insert(
            id.to_string(),
            (
                password.to_string(),
                User {
                    id: id.to_string(),
                    display_name: display_name.to_string(),
                },
            ),
        );
        self
    }
}

impl CredentialLocator for InMemoryUsers {
    type Principal = User;
    type Credentials = Login;
    type Identifier = str;
    type Error = UserLookupError;

    fn validate(&self, credentials: &Login) -> Result<User, UserLookupError> {
        match self.users.get(credentials.username.as_str()) {
            Some((password, user)) if *password == credentials.password => Ok(user.clone()),
            _ => Err(UserLookupError::BadCredentials),
        }
    }

    fn locate(&self, identifier: &str) -> Result<User, UserLookupError> {
        self.users
            .get(identifier)
            .map(|(_, user)| user.clone())
            .ok_or_else(|| UserLookupError::UnknownUser(identifier.to_string()))
    }
}

fn display_name_of<L>(locator: &L, id: &str) -> Option<String>
where
    L: CredentialLocator<Principal = User, Identifier = str>,
{
    locator.locate(id).ok().map(|user| user.display_name)
}

fn users() -> InMemoryUsers {
    InMemoryUsers::default().with_user("ada", "engine", "Ada Lovelace")
}

#[test]
fn validate_returns_principal_for_matching_credentials() {
    let user = users()
        .validate(&Login {
            username: "ada".to_string(),
            password: "engine".to_string(),
        })
        .expect("valid login");
    assert_eq!(user.id, "ada");
}

#[test]
fn validate_rejects_wrong_password_and_unknown_user() {
    let locator = users();
    for (username, password) in [("ada", "wrong"), ("bob", "engine")] {
        let err = locator
            .validate(&Login {
                username: username.to_string(),
                password: password.to_string(),
            })
            .expect_err("login must fail");
        assert_eq!(err, UserLookupError::BadCredentials);
    }
}

#[test]
fn locate_finds_principal_by_identifier() {
    let locator = users();
    assert_eq!(
        display_name_of(&locator, "ada").as_deref(),
        Some("Ada Lovelace")
    );

    let err = locator.locate("bob").expect_err("unknown user");
    assert_eq!(err.to_string(), "user not found: bob");
}
