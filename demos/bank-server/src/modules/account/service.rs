use super::model::{Account, OpenAccountRequest};
use bankapp_problem::{FailureCondition, Result};
use anyhow::Context;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// In-memory accounts, just enough to raise every account failure.
#[derive(Default)]
pub struct AccountService {
    accounts: DashMap<String, Account>,
    sequence: AtomicU64,
}

impl AccountService {
    pub fn open(&self, req: OpenAccountRequest) -> Account {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let account = Account {
            number: format!("ACC-{seq:04}"),
            owner: req.owner,
            balance: req.initial_deposit,
            frozen: false,
        };
        self.accounts.insert(account.number.clone(), account.clone());
        tracing::info!("Opened account {}", account.number);
        account
    }

    pub fn get(&self, number: &str) -> Result<Account> {
        self.accounts
            .get(number)
            .map(|a| a.clone())
            .ok_or_else(|| FailureCondition::account_not_found(format!("Account {number} not found")))
    }

    pub fn freeze(&self, number: &str) -> Result<Account> {
        let mut account = self
            .accounts
            .get_mut(number)
            .ok_or_else(|| FailureCondition::account_not_found(format!("Account {number} not found")))?;
        account.frozen = true;
        Ok(account.clone())
    }

    pub fn withdraw(&self, number: &str, amount: i64) -> Result<Account> {
        let mut account = self
            .accounts
            .get_mut(number)
            .ok_or_else(|| FailureCondition::account_not_found(format!("Account {number} not found")))?;

        if account.frozen {
            return Err(FailureCondition::business(format!("Account {number} is frozen")));
        }
        if account.balance < amount {
            return Err(FailureCondition::insufficient_balance(format!(
                "Balance {} is lower than requested {}",
                account.balance, amount
            )));
        }
        account.balance -= amount;
        Ok(account.clone())
    }

    pub fn statement(&self, number: &str) -> Result<String> {
        let account = self.get(number)?;
        let rendered = render_statement(&account)
            .with_context(|| format!("rendering statement for {number}"))?;
        Ok(rendered)
    }
}

/// Statements need a renderer this demo does not ship.
fn render_statement(account: &Account) -> anyhow::Result<String> {
    anyhow::bail!("no statement renderer configured for {}", account.owner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankapp_problem::FailureKind;

    fn open(service: &AccountService, deposit: i64) -> Account {
        service.open(OpenAccountRequest {
            owner: "Dana".to_string(),
            initial_deposit: deposit,
        })
    }

    #[test]
    fn test_withdraw_rules() {
        let service = AccountService::default();
        let account = open(&service, 100);

        assert_eq!(service.withdraw(&account.number, 40).unwrap().balance, 60);
        assert_eq!(
            service.withdraw(&account.number, 61).unwrap_err().kind(),
            FailureKind::InsufficientBalance
        );

        service.freeze(&account.number).unwrap();
        assert_eq!(
            service.withdraw(&account.number, 1).unwrap_err().kind(),
            FailureKind::GenericBusiness
        );
        assert_eq!(
            service.withdraw("ACC-9999", 1).unwrap_err().kind(),
            FailureKind::AccountNotFound
        );
    }

    #[test]
    fn test_statement_failure_is_unexpected() {
        let service = AccountService::default();
        let account = open(&service, 5);
        assert_eq!(
            service.statement(&account.number).unwrap_err().kind(),
            FailureKind::Unknown
        );
    }
}
