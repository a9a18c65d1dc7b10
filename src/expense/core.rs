//! Defines the core data model and database queries for expenses.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    category::{Category, CategoryId, CategoryName, get_category},
    user::UserId,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// How an expense was paid for.
///
/// This is an open enumeration: the common values are "Cash", "Credit Card",
/// "Debit Card" and "Bank Transfer", but clients may supply any non-empty
/// string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Create a payment method.
    ///
    /// Leading and trailing whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyPaymentMethod] if `method`
    /// is an empty string.
    pub fn new(method: &str) -> Result<Self, Error> {
        let method = method.trim();

        if method.is_empty() {
            Err(Error::EmptyPaymentMethod)
        } else {
            Ok(Self(method.to_string()))
        }
    }

    /// Create a payment method without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(method: &str) -> Self {
        Self(method.to_string())
    }
}

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single spending record owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// The ID of the user that owns the expense. Immutable after creation.
    pub user_id: UserId,
    /// What the expense was for, e.g. "Lunch".
    pub name: String,
    /// The amount of money spent.
    pub amount: f64,
    /// The calendar date the expense happened on.
    pub date: Date,
    /// An optional longer description.
    pub description: Option<String>,
    /// The ID of the category the expense belongs to.
    pub category_id: CategoryId,
    /// How the expense was paid for.
    pub payment_method: PaymentMethod,
    /// The category the expense belongs to.
    pub category: Category,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The JSON draft accepted when creating or replacing an expense.
///
/// Partial updates are not supported: replacing an expense requires the full
/// draft.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseData {
    /// What the expense was for. Must not be empty.
    pub name: String,
    /// The amount of money spent. Must be finite.
    pub amount: f64,
    /// The calendar date the expense happened on.
    pub date: Date,
    /// An optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// The ID of one of the user's own categories.
    pub category_id: CategoryId,
    /// How the expense was paid for. Must not be empty.
    pub payment_method: String,
}

/// The SELECT column list shared by every query that returns an [Expense]
/// with its embedded category.
pub(crate) const EXPENSE_COLUMNS: &str = "expense.id, expense.user_id, expense.name, \
     expense.amount, expense.date, expense.description, expense.category_id, \
     expense.payment_method, expense.created_at, expense.updated_at, \
     category.id, category.user_id, category.name";

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Validate a draft and resolve its category against the acting user's
/// categories.
///
/// The category lookup is scoped to `user_id`, so a category owned by
/// another user produces the same error as a category that does not exist.
fn validate_draft(
    draft: &ExpenseData,
    user_id: UserId,
    connection: &Connection,
) -> Result<(String, PaymentMethod, Category), Error> {
    let name = draft.name.trim();
    if name.is_empty() {
        return Err(Error::EmptyExpenseName);
    }

    if !draft.amount.is_finite() {
        return Err(Error::NonFiniteAmount);
    }

    let payment_method = PaymentMethod::new(&draft.payment_method)?;

    let category = get_category(draft.category_id, user_id, connection).map_err(|error| {
        match error {
            Error::NotFound => Error::InvalidCategory(draft.category_id),
            error => error,
        }
    })?;

    Ok((name.to_string(), payment_method, category))
}

/// Create a new expense owned by `user_id` from a draft.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyExpenseName] if the name is empty,
/// - [Error::NonFiniteAmount] if the amount is NaN or infinite,
/// - [Error::EmptyPaymentMethod] if the payment method is empty,
/// - [Error::InvalidCategory] if the category is not one of the user's own,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    draft: ExpenseData,
    user_id: UserId,
    connection: &Connection,
) -> Result<Expense, Error> {
    let (name, payment_method, _category) = validate_draft(&draft, user_id, connection)?;

    let now = OffsetDateTime::now_utc();
    connection.execute(
        "INSERT INTO expense
            (user_id, name, amount, date, description, category_id, payment_method,
             created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        (
            user_id.as_i64(),
            &name,
            draft.amount,
            draft.date,
            &draft.description,
            draft.category_id,
            payment_method.as_ref(),
            now,
            now,
        ),
    )?;

    let id = connection.last_insert_rowid();

    // Re-read the row so the returned record reflects exactly what was
    // stored, timestamps included.
    get_expense(id, user_id, connection)
}

/// Retrieve an expense owned by `user_id` with its embedded category.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_expense(
    id: ExpenseId,
    user_id: UserId,
    connection: &Connection,
) -> Result<Expense, Error> {
    let query = format!(
        "SELECT {EXPENSE_COLUMNS} FROM expense
         INNER JOIN category ON expense.category_id = category.id
         WHERE expense.id = :id AND expense.user_id = :user_id"
    );

    let expense = connection
        .prepare(&query)?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Replace all mutable fields of an expense owned by `user_id`.
///
/// The full draft is required; partial updates are not supported. The
/// `updated_at` timestamp is refreshed, `created_at` and the owner are
/// preserved.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by
///   `user_id`,
/// - any of the draft validation errors listed on [create_expense],
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(
    id: ExpenseId,
    draft: ExpenseData,
    user_id: UserId,
    connection: &Connection,
) -> Result<Expense, Error> {
    // The ownership check runs before draft validation, so a foreign
    // expense is indistinguishable from a missing one regardless of the
    // draft's contents.
    get_expense(id, user_id, connection)?;

    let (name, payment_method, _category) = validate_draft(&draft, user_id, connection)?;

    connection.execute(
        "UPDATE expense
         SET name = ?1, amount = ?2, date = ?3, description = ?4, category_id = ?5,
             payment_method = ?6, updated_at = ?7
         WHERE id = ?8 AND user_id = ?9",
        (
            &name,
            draft.amount,
            draft.date,
            &draft.description,
            draft.category_id,
            payment_method.as_ref(),
            OffsetDateTime::now_utc(),
            id,
            user_id.as_i64(),
        ),
    )?;

    get_expense(id, user_id, connection)
}

/// Delete an expense owned by `user_id`.
///
/// Deletion is not idempotent: deleting the same ID twice fails the second
/// time.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an expense owned by
///   `user_id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(id: ExpenseId, user_id: UserId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL
/// error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            description TEXT,
            category_id INTEGER NOT NULL,
            payment_method TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, date);",
    )?;

    Ok(())
}

/// Map a joined expense/category row to an [Expense].
pub(crate) fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_category_name: String = row.get(12)?;
    let category = Category {
        id: row.get(10)?,
        user_id: UserId::new(row.get(11)?),
        name: CategoryName::new_unchecked(&raw_category_name),
    };

    let raw_payment_method: String = row.get(7)?;

    Ok(Expense {
        id: row.get(0)?,
        user_id: UserId::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        description: row.get(5)?,
        category_id: row.get(6)?,
        payment_method: PaymentMethod::new_unchecked(&raw_payment_method),
        category,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod payment_method_tests {
    use crate::{Error, expense::core::PaymentMethod};

    #[test]
    fn new_fails_on_empty_string() {
        let method = PaymentMethod::new("");

        assert_eq!(method, Err(Error::EmptyPaymentMethod));
    }

    #[test]
    fn new_accepts_values_outside_the_common_set() {
        let method = PaymentMethod::new("Carrier Pigeon");

        assert!(method.is_ok());
    }
}

#[cfg(test)]
mod expense_database_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        category::{Category, CategoryName, create_category},
        db::initialize,
        expense::{
            ExpenseData,
            core::{create_expense, delete_expense, get_expense, update_expense},
        },
        test_utils::insert_test_user,
        user::{User, UserId},
    };

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn insert_user_and_category(
        connection: &Connection,
        email: &str,
        category_name: &str,
    ) -> (User, Category) {
        let user = insert_test_user(connection, email);
        let category = create_category(
            CategoryName::new_unchecked(category_name),
            user.id,
            connection,
        )
        .expect("Could not create test category");

        (user, category)
    }

    fn lunch_draft(category_id: i64) -> ExpenseData {
        ExpenseData {
            name: "Lunch".to_string(),
            amount: 12.5,
            date: date!(2024 - 03 - 05),
            description: Some("Sandwich and coffee".to_string()),
            category_id,
            payment_method: "Cash".to_string(),
        }
    }

    #[test]
    fn create_then_get_round_trips() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");

        let created = create_expense(lunch_draft(category.id), user.id, &connection)
            .expect("Could not create expense");

        assert!(created.id > 0);
        assert_eq!(created.name, "Lunch");
        assert_eq!(created.amount, 12.5);
        assert_eq!(created.date, date!(2024 - 03 - 05));
        assert_eq!(created.description.as_deref(), Some("Sandwich and coffee"));
        assert_eq!(created.category, category);
        assert_eq!(created.payment_method.as_ref(), "Cash");
        assert_eq!(created.created_at, created.updated_at);

        let fetched = get_expense(created.id, user.id, &connection);

        assert_eq!(fetched, Ok(created));
    }

    #[test]
    fn create_fails_on_empty_name() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let draft = ExpenseData {
            name: "  ".to_string(),
            ..lunch_draft(category.id)
        };

        let result = create_expense(draft, user.id, &connection);

        assert_eq!(result, Err(Error::EmptyExpenseName));
    }

    #[test]
    fn create_fails_on_non_finite_amount() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let draft = ExpenseData {
            amount: f64::NAN,
            ..lunch_draft(category.id)
        };

        let result = create_expense(draft, user.id, &connection);

        assert_eq!(result, Err(Error::NonFiniteAmount));
    }

    #[test]
    fn create_fails_on_empty_payment_method() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let draft = ExpenseData {
            payment_method: "".to_string(),
            ..lunch_draft(category.id)
        };

        let result = create_expense(draft, user.id, &connection);

        assert_eq!(result, Err(Error::EmptyPaymentMethod));
    }

    #[test]
    fn create_fails_on_unknown_category() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");

        let result = create_expense(lunch_draft(category.id + 42), user.id, &connection);

        assert_eq!(result, Err(Error::InvalidCategory(category.id + 42)));
    }

    #[test]
    fn create_fails_on_category_owned_by_someone_else() {
        let connection = get_test_connection();
        let (_owner, foreign_category) =
            insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let other_user = insert_test_user(&connection, "bar@baz.qux");

        let result = create_expense(lunch_draft(foreign_category.id), other_user.id, &connection);

        // The error must not reveal that the category exists for another
        // user.
        assert_eq!(result, Err(Error::InvalidCategory(foreign_category.id)));
    }

    #[test]
    fn get_expense_owned_by_someone_else_returns_not_found() {
        let connection = get_test_connection();
        let (owner, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let other_user = insert_test_user(&connection, "bar@baz.qux");
        let expense = create_expense(lunch_draft(category.id), owner.id, &connection)
            .expect("Could not create expense");

        let result = get_expense(expense.id, other_user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_replaces_all_mutable_fields() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let other_category = create_category(
            CategoryName::new_unchecked("Transport"),
            user.id,
            &connection,
        )
        .expect("Could not create test category");
        let created = create_expense(lunch_draft(category.id), user.id, &connection)
            .expect("Could not create expense");

        let replacement = ExpenseData {
            name: "Bus".to_string(),
            amount: 2.75,
            date: date!(2024 - 03 - 20),
            description: None,
            category_id: other_category.id,
            payment_method: "Debit Card".to_string(),
        };
        let updated = update_expense(created.id, replacement, user.id, &connection)
            .expect("Could not update expense");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.name, "Bus");
        assert_eq!(updated.amount, 2.75);
        assert_eq!(updated.date, date!(2024 - 03 - 20));
        assert_eq!(updated.description, None);
        assert_eq!(updated.category, other_category);
        assert_eq!(updated.payment_method.as_ref(), "Debit Card");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_missing_expense_returns_not_found() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");

        let result = update_expense(999, lunch_draft(category.id), user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn update_expense_owned_by_someone_else_returns_not_found() {
        let connection = get_test_connection();
        let (owner, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let (other_user, other_category) =
            insert_user_and_category(&connection, "bar@baz.qux", "Food");
        let expense = create_expense(lunch_draft(category.id), owner.id, &connection)
            .expect("Could not create expense");

        let result = update_expense(
            expense.id,
            lunch_draft(other_category.id),
            other_user.id,
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_the_expense() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let expense = create_expense(lunch_draft(category.id), user.id, &connection)
            .expect("Could not create expense");

        let result = delete_expense(expense.id, user.id, &connection);

        assert_eq!(result, Ok(()));
        assert_eq!(
            get_expense(expense.id, user.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn second_delete_returns_not_found() {
        let connection = get_test_connection();
        let (user, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let expense = create_expense(lunch_draft(category.id), user.id, &connection)
            .expect("Could not create expense");

        delete_expense(expense.id, user.id, &connection).expect("Could not delete expense");

        let second_delete = delete_expense(expense.id, user.id, &connection);

        assert_eq!(second_delete, Err(Error::NotFound));
    }

    #[test]
    fn delete_expense_owned_by_someone_else_returns_not_found() {
        let connection = get_test_connection();
        let (owner, category) = insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let other_user = insert_test_user(&connection, "bar@baz.qux");
        let expense = create_expense(lunch_draft(category.id), owner.id, &connection)
            .expect("Could not create expense");

        let result = delete_expense(expense.id, other_user.id, &connection);

        assert_eq!(result, Err(Error::NotFound));
        // The record must still exist for its owner.
        assert!(get_expense(expense.id, owner.id, &connection).is_ok());
    }

    #[test]
    fn ids_are_not_reachable_across_users() {
        let connection = get_test_connection();
        let (first_user, first_category) =
            insert_user_and_category(&connection, "foo@bar.baz", "Food");
        let (second_user, _second_category) =
            insert_user_and_category(&connection, "bar@baz.qux", "Transport");
        let expense = create_expense(lunch_draft(first_category.id), first_user.id, &connection)
            .expect("Could not create expense");

        assert_eq!(
            get_expense(expense.id, second_user.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_expense(expense.id, UserId::new(999), &connection),
            Err(Error::NotFound)
        );
    }
}
