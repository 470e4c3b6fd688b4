use super::model::{CreateEmployeeRequest, Employee};
use bankapp_problem::{FailureCondition, Result};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

#[derive(Default)]
pub struct EmployeeService {
    by_id: DashMap<i64, Employee>,
    usernames: DashMap<String, i64>,
    sequence: AtomicI64,
}

impl EmployeeService {
    pub fn create(&self, req: CreateEmployeeRequest) -> Result<Employee> {
        // Claim the username first so two concurrent creates cannot both win.
        let id = match self.usernames.entry(req.username.clone()) {
            Entry::Occupied(_) => {
                return Err(FailureCondition::duplicate_username(format!(
                    "Username {} already exists",
                    req.username
                )));
            }
            Entry::Vacant(slot) => {
                let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
                slot.insert(id);
                id
            }
        };

        let employee = Employee {
            id,
            username: req.username,
            email: req.email,
            age: req.age,
        };
        self.by_id.insert(id, employee.clone());
        tracing::info!("Registered employee {} ({})", employee.id, employee.username);
        Ok(employee)
    }

    pub fn get(&self, id: i64) -> Result<Employee> {
        self.by_id
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| FailureCondition::employee_not_found(format!("Employee {id} not found")))
    }
}
