use chrono::NaiveDate;
use uuid::Uuid;

use crate::ledger::{Budget, Transaction, TransactionKind};

use super::{ServiceError, ServiceResult};

/// Fields for a manually entered ledger row. Manual entries are recorded
/// facts and are created already cleared.
#[derive(Debug, Clone)]
pub struct ManualTransactionDraft {
    pub account_id: Uuid,
    pub kind: TransactionKind,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub to_account_id: Option<Uuid>,
    pub member_id: Option<Uuid>,
}

/// Validated CRUD for ledger transactions. Confirm/undo of scheduled
/// instances live in the engine; this service covers manual entry and the
/// plain edits the budget UI performs.
pub struct TransactionService;

impl TransactionService {
    pub fn add_manual(budget: &mut Budget, draft: ManualTransactionDraft) -> ServiceResult<Uuid> {
        if draft.amount_cents <= 0 {
            return Err(ServiceError::Invalid(
                "transaction amount must be positive".into(),
            ));
        }
        if budget.account(draft.account_id).is_none() {
            return Err(ServiceError::Invalid(format!(
                "account {} not found",
                draft.account_id
            )));
        }
        if let Some(category_id) = draft.category_id {
            if budget.category(category_id).is_none() {
                return Err(ServiceError::Invalid(format!(
                    "category {category_id} not found"
                )));
            }
        }
        match (draft.kind, draft.to_account_id) {
            (TransactionKind::Transfer, None) => {
                return Err(ServiceError::Invalid(
                    "transfers need a destination account".into(),
                ));
            }
            (TransactionKind::Transfer, Some(to_account)) => {
                if budget.account(to_account).is_none() {
                    return Err(ServiceError::Invalid(format!(
                        "account {to_account} not found"
                    )));
                }
            }
            (_, Some(_)) => {
                return Err(ServiceError::Invalid(
                    "only transfers carry a destination account".into(),
                ));
            }
            _ => {}
        }

        let mut txn = Transaction::manual(
            draft.account_id,
            draft.kind,
            draft.amount_cents,
            draft.date,
            draft.description,
        );
        txn.category_id = draft.category_id;
        txn.to_account_id = draft.to_account_id;
        txn.member_id = draft.member_id;
        Ok(budget.add_transaction(txn))
    }

    pub fn update<F>(budget: &mut Budget, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut Transaction),
    {
        let txn = budget
            .transaction_mut(id)
            .ok_or_else(|| ServiceError::Invalid(format!("transaction {id} not found")))?;
        mutator(txn);
        txn.touch();
        budget.touch();
        Ok(())
    }

    /// Hard delete. Reverting a confirmed scheduled instance is the engine's
    /// separately named operation, not a deletion.
    pub fn remove(budget: &mut Budget, id: Uuid) -> ServiceResult<Transaction> {
        budget
            .remove_transaction(id)
            .ok_or_else(|| ServiceError::Invalid(format!("transaction {id} not found")))
    }
}
