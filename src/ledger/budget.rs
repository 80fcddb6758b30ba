use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Account;
use super::category::Category;
use super::income_source::IncomeSource;
use super::member::Member;
use super::period::DateRange;
use super::recurring_bill::RecurringBill;
use super::transaction::{TemplateRef, Transaction};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The shared financial workspace: members, accounts, categories, recurring
/// templates, and the transaction ledger. Persisted as one document per
/// budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub bills: Vec<RecurringBill>,
    #[serde(default)]
    pub income_sources: Vec<IncomeSource>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Budget::schema_version_default")]
    pub schema_version: u8,
}

impl Budget {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
            accounts: Vec::new(),
            categories: Vec::new(),
            bills: Vec::new(),
            income_sources: Vec::new(),
            transactions: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_member(&mut self, member: Member) -> Uuid {
        let id = member.id;
        self.members.push(member);
        self.touch();
        id
    }

    pub fn add_account(&mut self, account: Account) -> Uuid {
        let id = account.id;
        self.accounts.push(account);
        self.touch();
        id
    }

    pub fn add_category(&mut self, category: Category) -> Uuid {
        let id = category.id;
        self.categories.push(category);
        self.touch();
        id
    }

    pub fn add_bill(&mut self, bill: RecurringBill) -> Uuid {
        let id = bill.id;
        self.bills.push(bill);
        self.touch();
        id
    }

    pub fn add_income_source(&mut self, source: IncomeSource) -> Uuid {
        let id = source.id;
        self.income_sources.push(source);
        self.touch();
        id
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Uuid {
        let id = transaction.id;
        self.transactions.push(transaction);
        self.touch();
        id
    }

    pub fn member(&self, id: Uuid) -> Option<&Member> {
        self.members.iter().find(|member| member.id == id)
    }

    pub fn account(&self, id: Uuid) -> Option<&Account> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn bill(&self, id: Uuid) -> Option<&RecurringBill> {
        self.bills.iter().find(|bill| bill.id == id)
    }

    pub fn bill_mut(&mut self, id: Uuid) -> Option<&mut RecurringBill> {
        self.bills.iter_mut().find(|bill| bill.id == id)
    }

    pub fn income_source(&self, id: Uuid) -> Option<&IncomeSource> {
        self.income_sources.iter().find(|source| source.id == id)
    }

    pub fn income_source_mut(&mut self, id: Uuid) -> Option<&mut IncomeSource> {
        self.income_sources.iter_mut().find(|source| source.id == id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_mut(&mut self, id: Uuid) -> Option<&mut Transaction> {
        self.transactions.iter_mut().find(|txn| txn.id == id)
    }

    pub fn remove_transaction(&mut self, id: Uuid) -> Option<Transaction> {
        let index = self.transactions.iter().position(|txn| txn.id == id)?;
        let removed = self.transactions.remove(index);
        self.touch();
        Some(removed)
    }

    /// Active bills only; archived templates never reach the engine.
    pub fn active_bills(&self) -> impl Iterator<Item = &RecurringBill> {
        self.bills.iter().filter(|bill| bill.is_active)
    }

    pub fn active_income_sources(&self) -> impl Iterator<Item = &IncomeSource> {
        self.income_sources.iter().filter(|source| source.is_active)
    }

    /// The materializer's dedup check: an instance already exists for this
    /// (template, date) pair.
    pub fn has_instance(&self, template: TemplateRef, date: NaiveDate) -> bool {
        self.transactions
            .iter()
            .any(|txn| txn.template() == Some(template) && txn.date == date)
    }

    pub fn instances_of(&self, template: TemplateRef) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.template() == Some(template))
            .collect()
    }

    pub fn transactions_in(&self, range: &DateRange) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|txn| range.contains_day(txn.date))
            .collect()
    }

    pub fn template_has_instances(&self, template: TemplateRef) -> bool {
        self.transactions
            .iter()
            .any(|txn| txn.template() == Some(template))
    }

    pub fn next_bill_order(&self) -> u32 {
        self.bills
            .iter()
            .map(|bill| bill.display_order + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn next_income_order(&self) -> u32 {
        self.income_sources
            .iter()
            .map(|source| source.display_order + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::schedule::Schedule;
    use crate::ledger::{AccountKind, CategoryKind, TransactionKind};
    use chrono::NaiveDate;

    #[test]
    fn has_instance_matches_template_and_date() {
        let mut budget = Budget::new("Home");
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let category =
            budget.add_category(Category::new("Housing", "home", CategoryKind::Expense));
        let bill = RecurringBill::new(
            category,
            account,
            "Rent",
            150_000,
            Schedule::monthly(5).unwrap(),
        );
        let bill_id = budget.add_bill(bill);

        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let bill_ref = budget.bill(bill_id).unwrap().clone();
        budget.add_transaction(Transaction::from_bill(&bill_ref, date));

        assert!(budget.has_instance(TemplateRef::Bill(bill_id), date));
        assert!(!budget.has_instance(
            TemplateRef::Bill(bill_id),
            NaiveDate::from_ymd_opt(2024, 4, 5).unwrap()
        ));
    }

    #[test]
    fn manual_transactions_have_no_template() {
        let mut budget = Budget::new("Home");
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let id = budget.add_transaction(Transaction::manual(
            account,
            TransactionKind::Expense,
            2_500,
            NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            "Coffee",
        ));
        assert_eq!(budget.transaction(id).unwrap().template(), None);
    }
}
