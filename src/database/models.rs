use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee row as stored in the relational table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "id", alias = "Id")]
    pub id: i64,
    #[serde(rename = "nome", alias = "Nome")]
    pub name: String,
    #[serde(rename = "dataAdmissao", alias = "DataAdmissao")]
    pub admission_date: NaiveDate,
    /// Exact amount; read and written as a JSON number without going
    /// through a float.
    #[serde(
        rename = "salario",
        alias = "Salario",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    pub salary: Decimal,
    #[serde(rename = "departamento", alias = "Departamento")]
    pub department: String,
    #[serde(rename = "ramal", alias = "Ramal")]
    pub extension: String,
}

/// Client-supplied employee fields for create and update. An `id` in the
/// body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDraft {
    #[serde(rename = "nome", alias = "Nome")]
    pub name: String,
    #[serde(rename = "dataAdmissao", alias = "DataAdmissao")]
    pub admission_date: NaiveDate,
    #[serde(
        rename = "salario",
        alias = "Salario",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    pub salary: Decimal,
    #[serde(rename = "departamento", alias = "Departamento")]
    pub department: String,
    #[serde(rename = "ramal", alias = "Ramal")]
    pub extension: String,
}

impl Employee {
    pub fn from_draft(id: i64, draft: &EmployeeDraft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            admission_date: draft.admission_date,
            salary: draft.salary,
            department: draft.department.clone(),
            extension: draft.extension.clone(),
        }
    }

    /// Overwrite every mutable field. The id is left untouched.
    pub fn apply(&mut self, draft: EmployeeDraft) {
        self.name = draft.name;
        self.admission_date = draft.admission_date;
        self.salary = draft.salary;
        self.department = draft.department;
        self.extension = draft.extension;
    }
}
