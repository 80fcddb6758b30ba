use uuid::Uuid;

use crate::ledger::{Budget, CategoryKind, RecurringBill, Schedule, TemplateRef};

use super::{ServiceError, ServiceResult};

/// Fields a caller supplies when creating a recurring bill.
#[derive(Debug, Clone)]
pub struct BillDraft {
    pub category_id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub amount_cents: i64,
    pub schedule: Schedule,
    pub is_auto_debit: bool,
    pub is_variable: bool,
}

/// Validated CRUD for recurring bills.
pub struct BillService;

impl BillService {
    pub fn create(budget: &mut Budget, draft: BillDraft) -> ServiceResult<Uuid> {
        validate_bill(
            budget,
            &draft.name,
            draft.amount_cents,
            &draft.schedule,
            draft.category_id,
            draft.account_id,
        )?;
        let mut bill = RecurringBill::new(
            draft.category_id,
            draft.account_id,
            draft.name.trim(),
            draft.amount_cents,
            draft.schedule,
        );
        bill.is_auto_debit = draft.is_auto_debit;
        bill.is_variable = draft.is_variable;
        bill.display_order = budget.next_bill_order();
        Ok(budget.add_bill(bill))
    }

    /// Applies `mutator` to a copy, validates the result, and only then
    /// commits, so a rejected edit leaves the stored template untouched.
    pub fn update<F>(budget: &mut Budget, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut RecurringBill),
    {
        let mut edited = budget
            .bill(id)
            .cloned()
            .ok_or_else(|| ServiceError::Invalid(format!("recurring bill {id} not found")))?;
        mutator(&mut edited);
        edited.id = id;
        validate_bill(
            budget,
            &edited.name,
            edited.amount_cents,
            &edited.schedule,
            edited.category_id,
            edited.account_id,
        )?;
        if let Some(bill) = budget.bill_mut(id) {
            *bill = edited;
        }
        budget.touch();
        Ok(())
    }

    /// Archival keeps the template for reconciliation history; the engine
    /// reads active templates only.
    pub fn archive(budget: &mut Budget, id: Uuid) -> ServiceResult<()> {
        let bill = budget
            .bill_mut(id)
            .ok_or_else(|| ServiceError::Invalid(format!("recurring bill {id} not found")))?;
        bill.archive();
        budget.touch();
        Ok(())
    }

    /// Hard deletion is refused while transactions still reference the
    /// template; archive instead.
    pub fn remove(budget: &mut Budget, id: Uuid) -> ServiceResult<RecurringBill> {
        if budget.bill(id).is_none() {
            return Err(ServiceError::Invalid(format!(
                "recurring bill {id} not found"
            )));
        }
        if budget.template_has_instances(TemplateRef::Bill(id)) {
            return Err(ServiceError::Invalid(
                "bill has materialized transactions; archive it instead".into(),
            ));
        }
        let index = budget
            .bills
            .iter()
            .position(|bill| bill.id == id)
            .ok_or_else(|| ServiceError::Invalid(format!("recurring bill {id} not found")))?;
        let removed = budget.bills.remove(index);
        budget.touch();
        Ok(removed)
    }

    /// Bills in display order.
    pub fn list(budget: &Budget) -> Vec<&RecurringBill> {
        let mut bills: Vec<&RecurringBill> = budget.bills.iter().collect();
        bills.sort_by_key(|bill| bill.display_order);
        bills
    }
}

fn validate_bill(
    budget: &Budget,
    name: &str,
    amount_cents: i64,
    schedule: &Schedule,
    category_id: Uuid,
    account_id: Uuid,
) -> ServiceResult<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::Invalid("bill name must not be empty".into()));
    }
    if amount_cents <= 0 {
        return Err(ServiceError::Invalid(
            "bill amount must be positive".into(),
        ));
    }
    if matches!(schedule, Schedule::EveryTwoWeeks { .. }) {
        return Err(ServiceError::Invalid(
            "bills recur weekly, monthly, or yearly".into(),
        ));
    }
    let category = budget
        .category(category_id)
        .ok_or_else(|| ServiceError::Invalid(format!("category {category_id} not found")))?;
    if category.kind != CategoryKind::Expense {
        return Err(ServiceError::Invalid(
            "bills must use an expense category".into(),
        ));
    }
    if budget.account(account_id).is_none() {
        return Err(ServiceError::Invalid(format!(
            "account {account_id} not found"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::materialize;
    use crate::ledger::{Account, AccountKind, Category};
    use chrono::NaiveDate;

    fn base_budget() -> (Budget, Uuid, Uuid) {
        let mut budget = Budget::new("Home");
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let category =
            budget.add_category(Category::new("Housing", "home", CategoryKind::Expense));
        (budget, category, account)
    }

    fn rent_draft(category: Uuid, account: Uuid) -> BillDraft {
        BillDraft {
            category_id: category,
            account_id: account,
            name: "Rent".into(),
            amount_cents: 150_000,
            schedule: Schedule::monthly(5).unwrap(),
            is_auto_debit: true,
            is_variable: false,
        }
    }

    #[test]
    fn create_assigns_sequential_display_order() {
        let (mut budget, category, account) = base_budget();
        BillService::create(&mut budget, rent_draft(category, account)).unwrap();
        let mut second = rent_draft(category, account);
        second.name = "Water".into();
        let id = BillService::create(&mut budget, second).unwrap();
        assert_eq!(budget.bill(id).unwrap().display_order, 1);
    }

    #[test]
    fn create_rejects_biweekly_schedule() {
        let (mut budget, category, account) = base_budget();
        let mut draft = rent_draft(category, account);
        draft.schedule =
            Schedule::every_two_weeks(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        let err = BillService::create(&mut budget, draft).expect_err("biweekly bill");
        assert!(matches!(err, ServiceError::Invalid(_)));
    }

    #[test]
    fn create_rejects_income_category() {
        let (mut budget, _, account) = base_budget();
        let income_cat =
            budget.add_category(Category::new("Wages", "coins", CategoryKind::Income));
        let draft = rent_draft(income_cat, account);
        assert!(BillService::create(&mut budget, draft).is_err());
    }

    #[test]
    fn rejected_update_leaves_the_stored_bill_unchanged() {
        let (mut budget, category, account) = base_budget();
        let id = BillService::create(&mut budget, rent_draft(category, account)).unwrap();
        let err = BillService::update(&mut budget, id, |bill| bill.amount_cents = 0)
            .expect_err("zero amount");
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(budget.bill(id).unwrap().amount_cents, 150_000);
    }

    #[test]
    fn remove_is_refused_once_instances_exist() {
        let (mut budget, category, account) = base_budget();
        let id = BillService::create(&mut budget, rent_draft(category, account)).unwrap();
        materialize(&mut budget, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        assert!(BillService::remove(&mut budget, id).is_err());
        BillService::archive(&mut budget, id).unwrap();
        assert!(!budget.bill(id).unwrap().is_active);
    }

    #[test]
    fn remove_succeeds_for_untouched_template() {
        let (mut budget, category, account) = base_budget();
        let id = BillService::create(&mut budget, rent_draft(category, account)).unwrap();
        let removed = BillService::remove(&mut budget, id).unwrap();
        assert_eq!(removed.id, id);
        assert!(budget.bill(id).is_none());
    }
}
