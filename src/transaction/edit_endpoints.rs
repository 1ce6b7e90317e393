//! Endpoints for editing a transaction in place: updating the amount and
//! toggling the reconciled flag.
//!
//! Both endpoints return the re-rendered transaction row so HTMX can swap it
//! into the list without a full page reload.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::UserID,
    transaction::{
        TransactionId, get_transaction, set_transaction_reconciled, update_transaction_amount,
    },
};

use super::transactions_page::transaction_row;

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The form data for updating a transaction's amount.
#[derive(Debug, Deserialize)]
pub struct AmountForm {
    /// The new amount in rupees.
    pub amount: f64,
}

/// A route handler that sets a transaction's amount and returns the updated row.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn update_amount_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<AmountForm>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    if let Err(error) = update_transaction_amount(transaction_id, user_id, form.amount, &connection)
    {
        return error.into_alert_response();
    }

    render_row(transaction_id, user_id, &connection)
}

/// A route handler that flips a transaction's reconciled flag and returns the updated row.
///
/// # Panics
///
/// Panics if the lock for the database connection is already held by the same thread.
pub async fn toggle_reconciled_endpoint(
    State(state): State<EditTransactionState>,
    Extension(user_id): Extension<UserID>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    let connection = state.db_connection.lock().unwrap();

    let transaction = match get_transaction(transaction_id, user_id, &connection) {
        Ok(transaction) => transaction,
        Err(Error::NotFound) => return Error::UpdateMissingTransaction.into_alert_response(),
        Err(error) => return error.into_alert_response(),
    };

    if let Err(error) = set_transaction_reconciled(
        transaction_id,
        user_id,
        !transaction.is_reconciled,
        &connection,
    ) {
        return error.into_alert_response();
    }

    render_row(transaction_id, user_id, &connection)
}

fn render_row(transaction_id: TransactionId, user_id: UserID, connection: &Connection) -> Response {
    match get_transaction(transaction_id, user_id, connection) {
        Ok(transaction) => transaction_row(&transaction).into_response(),
        Err(error) => {
            tracing::error!("Could not re-render transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        str::FromStr,
        sync::{Arc, Mutex},
    };

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use email_address::EmailAddress;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        auth::{PasswordHash, UserID, create_user},
        db::initialize,
        transaction::{Transaction, TransactionKind, create_transaction, get_transaction},
    };

    use super::{
        AmountForm, EditTransactionState, toggle_reconciled_endpoint, update_amount_endpoint,
    };

    fn get_test_state() -> (EditTransactionState, UserID) {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let user = create_user(
            EmailAddress::from_str("foo@bar.baz").unwrap(),
            PasswordHash::new_unchecked("hunter2"),
            &conn,
        )
        .unwrap();

        (
            EditTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            user.id,
        )
    }

    fn insert_test_transaction(state: &EditTransactionState, user_id: UserID) -> i64 {
        let connection = state.db_connection.lock().unwrap();
        create_transaction(
            Transaction::build(
                TransactionKind::Expense,
                400.0,
                date!(2024 - 01 - 01),
                "Rent",
            ),
            user_id,
            &connection,
        )
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn update_amount_returns_updated_row() {
        let (state, user_id) = get_test_state();
        let transaction_id = insert_test_transaction(&state, user_id);

        let response = update_amount_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction_id),
            Form(AmountForm { amount: 450.0 }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);

        let connection = state.db_connection.lock().unwrap();
        let transaction = get_transaction(transaction_id, user_id, &connection).unwrap();
        assert_eq!(transaction.amount, 450.0);
    }

    #[tokio::test]
    async fn update_amount_fails_for_unknown_transaction() {
        let (state, user_id) = get_test_state();

        let response = update_amount_endpoint(
            State(state),
            Extension(user_id),
            Path(42),
            Form(AmountForm { amount: 450.0 }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn toggle_reconciled_flips_flag() {
        let (state, user_id) = get_test_state();
        let transaction_id = insert_test_transaction(&state, user_id);

        let response = toggle_reconciled_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(transaction_id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        {
            let connection = state.db_connection.lock().unwrap();
            assert!(
                get_transaction(transaction_id, user_id, &connection)
                    .unwrap()
                    .is_reconciled
            );
        }

        toggle_reconciled_endpoint(State(state.clone()), Extension(user_id), Path(transaction_id))
            .await;

        let connection = state.db_connection.lock().unwrap();
        assert!(
            !get_transaction(transaction_id, user_id, &connection)
                .unwrap()
                .is_reconciled
        );
    }
}
