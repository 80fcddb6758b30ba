use uuid::Uuid;

use crate::ledger::{Budget, IncomeKind, IncomeSource, Schedule, TemplateRef};

use super::{ServiceError, ServiceResult};

/// Fields a caller supplies when creating an income source.
#[derive(Debug, Clone)]
pub struct IncomeDraft {
    pub name: String,
    pub kind: IncomeKind,
    pub amount_cents: i64,
    pub schedule: Schedule,
    pub member_id: Option<Uuid>,
    pub account_id: Option<Uuid>,
    pub is_auto_confirm: bool,
}

/// Validated CRUD for income sources.
pub struct IncomeService;

impl IncomeService {
    pub fn create(budget: &mut Budget, draft: IncomeDraft) -> ServiceResult<Uuid> {
        validate_source(
            budget,
            &draft.name,
            draft.amount_cents,
            &draft.schedule,
            draft.member_id,
            draft.account_id,
        )?;
        let mut source = IncomeSource::new(
            draft.name.trim(),
            draft.kind,
            draft.amount_cents,
            draft.schedule,
        );
        source.member_id = draft.member_id;
        source.account_id = draft.account_id;
        source.is_auto_confirm = draft.is_auto_confirm;
        source.display_order = budget.next_income_order();
        Ok(budget.add_income_source(source))
    }

    /// Clone-validate-commit, mirroring bill updates: a rejected edit leaves
    /// the stored source untouched.
    pub fn update<F>(budget: &mut Budget, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut IncomeSource),
    {
        let mut edited = budget
            .income_source(id)
            .cloned()
            .ok_or_else(|| ServiceError::Invalid(format!("income source {id} not found")))?;
        mutator(&mut edited);
        edited.id = id;
        validate_source(
            budget,
            &edited.name,
            edited.amount_cents,
            &edited.schedule,
            edited.member_id,
            edited.account_id,
        )?;
        if let Some(source) = budget.income_source_mut(id) {
            *source = edited;
        }
        budget.touch();
        Ok(())
    }

    pub fn archive(budget: &mut Budget, id: Uuid) -> ServiceResult<()> {
        let source = budget
            .income_source_mut(id)
            .ok_or_else(|| ServiceError::Invalid(format!("income source {id} not found")))?;
        source.archive();
        budget.touch();
        Ok(())
    }

    pub fn remove(budget: &mut Budget, id: Uuid) -> ServiceResult<IncomeSource> {
        if budget.income_source(id).is_none() {
            return Err(ServiceError::Invalid(format!(
                "income source {id} not found"
            )));
        }
        if budget.template_has_instances(TemplateRef::Income(id)) {
            return Err(ServiceError::Invalid(
                "income source has materialized transactions; archive it instead".into(),
            ));
        }
        let index = budget
            .income_sources
            .iter()
            .position(|source| source.id == id)
            .ok_or_else(|| ServiceError::Invalid(format!("income source {id} not found")))?;
        let removed = budget.income_sources.remove(index);
        budget.touch();
        Ok(removed)
    }

    pub fn list(budget: &Budget) -> Vec<&IncomeSource> {
        let mut sources: Vec<&IncomeSource> = budget.income_sources.iter().collect();
        sources.sort_by_key(|source| source.display_order);
        sources
    }
}

fn validate_source(
    budget: &Budget,
    name: &str,
    amount_cents: i64,
    schedule: &Schedule,
    member_id: Option<Uuid>,
    account_id: Option<Uuid>,
) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::Invalid(
            "income source name must not be empty".into(),
        ));
    }
    if amount_cents <= 0 {
        return Err(ServiceError::Invalid(
            "income amount must be positive".into(),
        ));
    }
    if matches!(schedule, Schedule::Yearly { .. }) {
        return Err(ServiceError::Invalid(
            "income recurs monthly, every two weeks, or weekly".into(),
        ));
    }
    if let Some(member_id) = member_id {
        if budget.member(member_id).is_none() {
            return Err(ServiceError::Invalid(format!(
                "member {member_id} not found"
            )));
        }
    }
    if let Some(account_id) = account_id {
        if budget.account(account_id).is_none() {
            return Err(ServiceError::Invalid(format!(
                "account {account_id} not found"
            )));
        }
    }
    Ok(())
}
