//! Shared source samples for unit tests.

/// A small service class with a documented business method.
pub const USER_SERVICE_SOURCE: &str = r#"
class UserService:
    """
    A service that handles user-related business logic.
    Responsible for creating, querying and deleting users.
    Relies on UserRepository for database operations.
    """
    def __init__(self, db_session):
        self.user_repository = UserRepository(db_session)

    def create_user(self, username: str, email: str, age: int) -> dict:
        """
        Create a new user and save it to the database.

        Before the user is created, the username and email are checked
        for existing records. If either exists, a ValueError is raised.
        On success the user info dict is returned, without the password.
        """
        if self.user_repository.find_by_username(username):
            raise ValueError(f"Username {username} already exists.")
        if self.user_repository.find_by_email(email):
            raise ValueError(f"Email {email} already exists.")

        # new_user = User(username=username, email=email, age=age)
        # saved_user = self.user_repository.save(new_user)
        print(f"User {username} created successfully.")
        return {"id": 1, "username": username, "email": email}

"#;

/// Full cleaned docstring of `UserService.create_user`.
pub const CREATE_USER_DOCSTRING: &str = "Create a new user and save it to the database.

Before the user is created, the username and email are checked
for existing records. If either exists, a ValueError is raised.
On success the user info dict is returned, without the password.";

/// Two classes that both declare `process`.
pub const DUPLICATE_METHOD_SOURCE: &str = r#"
class FirstHandler:
    def process(self, item):
        """Handle the item in the first stage."""
        return item

class SecondHandler:
    def process(self, item):
        """Handle the item in the second stage."""
        return item
"#;
